//! Service-level tests for tree CRUD, integrity, listing, and paths.

mod common;

use atelier_core::config::vfs::VfsConfig;
use atelier_core::error::ErrorKind;
use atelier_service::node::{CreateNodeRequest, UpdateNodeRequest};
use common::TestBench;
use uuid::Uuid;

#[tokio::test]
async fn create_list_and_resolve_scenario() {
    let bench = TestBench::new();

    let project = bench.folder(None, "project").await;
    let main_sw = bench.file(Some(project.id), "main.sw", "andika").await;

    let roots = bench.nodes.list(&bench.ctx, None, None, None).await.unwrap();
    assert_eq!(roots.items.len(), 1);
    assert_eq!(roots.items[0].name, "project");
    assert!(roots.items[0].is_folder);

    let children = bench
        .nodes
        .list(&bench.ctx, Some(project.id), None, None)
        .await
        .unwrap();
    assert_eq!(children.items.len(), 1);
    assert_eq!(children.items[0].name, "main.sw");
    assert!(!children.items[0].is_folder);
    assert_eq!(children.items[0].content.as_deref(), Some("andika"));

    let path = bench.paths.resolve(&bench.ctx, main_sw.id).await.unwrap();
    assert_eq!(path, "/project/main.sw");
}

#[tokio::test]
async fn path_segments_match_depth() {
    let bench = TestBench::new();

    let mut parent = None;
    let mut leaf = None;
    for name in ["a", "b", "c", "d"] {
        let folder = bench.folder(parent, name).await;
        parent = Some(folder.id);
        leaf = Some(folder);
    }

    let path = bench
        .paths
        .resolve(&bench.ctx, leaf.unwrap().id)
        .await
        .unwrap();
    assert_eq!(path, "/a/b/c/d");
    assert_eq!(path.split('/').skip(1).count(), 4);
}

#[tokio::test]
async fn move_into_own_descendant_is_a_cycle() {
    let bench = TestBench::new();

    let project = bench.folder(None, "project").await;
    let sub = bench.folder(Some(project.id), "sub").await;

    let err = bench
        .nodes
        .update(
            &bench.ctx,
            project.id,
            UpdateNodeRequest {
                parent_id: Some(Some(sub.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cycle);
}

#[tokio::test]
async fn self_parenting_is_rejected_immediately() {
    let bench = TestBench::new();
    let folder = bench.folder(None, "loop").await;

    let err = bench
        .nodes
        .update(
            &bench.ctx,
            folder.id,
            UpdateNodeRequest {
                parent_id: Some(Some(folder.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cycle);
}

#[tokio::test]
async fn depth_bound_fails_at_the_boundary() {
    let bench = TestBench::with_config(VfsConfig {
        max_depth: 4,
        ..VfsConfig::default()
    });

    // Depths 0..=4 are fine, the next create must fail.
    let mut parent = None;
    for i in 0..=4 {
        let folder = bench.folder(parent, &format!("level{i}")).await;
        parent = Some(folder.id);
    }

    let err = bench
        .nodes
        .create(
            &bench.ctx,
            CreateNodeRequest {
                parent_id: parent,
                name: "too-deep".to_string(),
                is_folder: true,
                content: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Depth);
}

#[tokio::test]
async fn moving_a_subtree_respects_the_depth_bound() {
    let bench = TestBench::with_config(VfsConfig {
        max_depth: 4,
        ..VfsConfig::default()
    });

    // A chain of height 2 (top/mid/leaf) and a separate chain to depth 2.
    let top = bench.folder(None, "top").await;
    let mid = bench.folder(Some(top.id), "mid").await;
    let _leaf = bench.folder(Some(mid.id), "leaf").await;

    let base = bench.folder(None, "base").await;
    let deep = bench.folder(Some(base.id), "deep").await;
    let deeper = bench.folder(Some(deep.id), "deeper").await;

    // top under deeper: leaf would land on depth 5 > 4.
    let err = bench
        .nodes
        .update(
            &bench.ctx,
            top.id,
            UpdateNodeRequest {
                parent_id: Some(Some(deeper.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Depth);

    // top under deep: leaf lands exactly on the bound.
    let moved = bench
        .nodes
        .update(
            &bench.ctx,
            top.id,
            UpdateNodeRequest {
                parent_id: Some(Some(deep.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.parent_id, Some(deep.id));
}

#[tokio::test]
async fn listing_orders_folders_before_files_lexicographically() {
    let bench = TestBench::new();

    // Inserted deliberately out of order.
    bench.file(None, "zeta.sw", "").await;
    bench.folder(None, "beta").await;
    bench.file(None, "alpha.sw", "").await;
    bench.folder(None, "delta").await;

    let page = bench.nodes.list(&bench.ctx, None, None, None).await.unwrap();
    let names: Vec<&str> = page.items.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, ["beta", "delta", "alpha.sw", "zeta.sw"]);
}

#[tokio::test]
async fn pagination_concatenates_to_the_full_listing() {
    let bench = TestBench::new();

    for i in 0..7 {
        bench.folder(None, &format!("dir{i}")).await;
    }
    for i in 0..6 {
        bench.file(None, &format!("file{i}.sw"), "").await;
    }

    let mut collected = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = bench
            .nodes
            .list(&bench.ctx, None, cursor.as_deref(), Some(5))
            .await
            .unwrap();
        collected.extend(page.items);
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    let full = bench
        .nodes
        .list(&bench.ctx, None, None, Some(200))
        .await
        .unwrap();
    assert_eq!(collected, full.items);

    // No duplicates.
    let mut ids: Vec<Uuid> = collected.iter().map(|n| n.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 13);
}

#[tokio::test]
async fn cursor_survives_anchor_deletion() {
    let bench = TestBench::new();

    let mut created = Vec::new();
    for i in 0..6 {
        created.push(bench.file(None, &format!("f{i}.sw"), "").await);
    }

    let first = bench
        .nodes
        .list(&bench.ctx, None, None, Some(2))
        .await
        .unwrap();
    let cursor = first.next_cursor.clone().expect("page was full");

    // Delete the anchor (last item of the first page).
    let anchor_id = first.items[1].id;
    bench.nodes.delete(&bench.ctx, anchor_id).await.unwrap();

    // Continuation still yields every remaining item exactly once.
    let mut rest = Vec::new();
    let mut cursor = Some(cursor);
    while let Some(raw) = cursor {
        let page = bench
            .nodes
            .list(&bench.ctx, None, Some(raw.as_str()), Some(2))
            .await
            .unwrap();
        rest.extend(page.items);
        cursor = page.next_cursor;
    }

    let expected: Vec<&str> = vec!["f2.sw", "f3.sw", "f4.sw", "f5.sw"];
    let got: Vec<&str> = rest.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(got, expected);
}

#[tokio::test]
async fn corrupt_cursor_degrades_to_first_page() {
    let bench = TestBench::new();
    bench.folder(None, "only").await;

    let page = bench
        .nodes
        .list(&bench.ctx, None, Some("!!not-a-cursor!!"), None)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn delete_cascades_to_descendants() {
    let bench = TestBench::new();

    let project = bench.folder(None, "project").await;
    let sub = bench.folder(Some(project.id), "sub").await;
    let file = bench.file(Some(sub.id), "notes.md", "text").await;

    bench.nodes.delete(&bench.ctx, project.id).await.unwrap();

    for id in [project.id, sub.id, file.id] {
        let err = bench.nodes.get(&bench.ctx, id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}

#[tokio::test]
async fn sibling_name_collision_is_a_conflict() {
    let bench = TestBench::new();
    bench.folder(None, "src").await;

    let err = bench
        .nodes
        .create(
            &bench.ctx,
            CreateNodeRequest {
                parent_id: None,
                name: "src".to_string(),
                is_folder: false,
                content: Some(String::new()),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn invalid_names_and_folder_content_are_rejected() {
    let bench = TestBench::new();

    for bad_name in ["", "  ", "a/b"] {
        let err = bench
            .nodes
            .create(
                &bench.ctx,
                CreateNodeRequest {
                    parent_id: None,
                    name: bad_name.to_string(),
                    is_folder: true,
                    content: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation, "name {bad_name:?}");
    }

    let err = bench
        .nodes
        .create(
            &bench.ctx,
            CreateNodeRequest {
                parent_id: None,
                name: "folder".to_string(),
                is_folder: true,
                content: Some("nope".to_string()),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn new_file_content_defaults_to_empty() {
    let bench = TestBench::new();

    let node = bench
        .nodes
        .create(
            &bench.ctx,
            CreateNodeRequest {
                parent_id: None,
                name: "empty.sw".to_string(),
                is_folder: false,
                content: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(node.content.as_deref(), Some(""));
}

#[tokio::test]
async fn stale_update_token_is_a_conflict() {
    let bench = TestBench::new();

    let file = bench.file(None, "draft.sw", "v1").await;

    // A concurrent session saves first.
    let winner = bench
        .nodes
        .update(
            &bench.ctx,
            file.id,
            UpdateNodeRequest {
                content: Some("v2".to_string()),
                expected_updated_at: Some(file.updated_at),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Our save still carries the original token and must not win silently.
    let err = bench
        .nodes
        .update(
            &bench.ctx,
            file.id,
            UpdateNodeRequest {
                content: Some("v2-lost".to_string()),
                expected_updated_at: Some(file.updated_at),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    // Refreshing the token unblocks the save.
    let saved = bench
        .nodes
        .update(
            &bench.ctx,
            file.id,
            UpdateNodeRequest {
                content: Some("v3".to_string()),
                expected_updated_at: Some(winner.updated_at),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(saved.content.as_deref(), Some("v3"));
}

#[tokio::test]
async fn other_users_nodes_are_invisible() {
    let bench = TestBench::new();
    let theirs = bench.folder(None, "private").await;

    let stranger = atelier_service::context::RequestContext::new(Uuid::new_v4());
    let err = bench.nodes.get(&stranger, theirs.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = bench.nodes.delete(&stranger, theirs.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn rename_and_move_update_the_resolved_path() {
    let bench = TestBench::new();

    let docs = bench.folder(None, "docs").await;
    let archive = bench.folder(None, "archive").await;
    let file = bench.file(Some(docs.id), "plan.md", "…").await;

    let renamed = bench
        .nodes
        .update(
            &bench.ctx,
            file.id,
            UpdateNodeRequest {
                name: Some("roadmap.md".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(renamed.updated_at >= file.updated_at);

    bench
        .nodes
        .update(
            &bench.ctx,
            file.id,
            UpdateNodeRequest {
                parent_id: Some(Some(archive.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let path = bench.paths.resolve(&bench.ctx, file.id).await.unwrap();
    assert_eq!(path, "/archive/roadmap.md");
}
