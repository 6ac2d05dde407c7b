//! Service-level tests for share issuance, expiry, and scoped traversal.

mod common;

use chrono::{Duration, Utc};
use uuid::Uuid;

use atelier_core::error::ErrorKind;
use atelier_entity::share::NewShare;
use atelier_entity::store::ShareStore;
use atelier_service::share::CreateShareRequest;
use common::TestBench;

#[tokio::test]
async fn share_resolves_to_its_root_node() {
    let bench = TestBench::new();
    let project = bench.folder(None, "project").await;

    let share = bench
        .shares
        .create_share(
            &bench.ctx,
            CreateShareRequest {
                node_id: project.id,
                title: Some("My project".to_string()),
                expires_at: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(share.token.len(), 24);
    assert!(share.is_active);

    let (resolved, node) = bench.access.resolve(&share.token).await.unwrap();
    assert_eq!(resolved.id, share.id);
    assert_eq!(node.id, project.id);
}

#[tokio::test]
async fn traversal_is_scoped_to_the_shared_subtree() {
    let bench = TestBench::new();

    // shared folder F with child C, sibling folder S outside F.
    let parent = bench.folder(None, "workspace").await;
    let shared = bench.folder(Some(parent.id), "shared").await;
    let child = bench.file(Some(shared.id), "inside.sw", "ok").await;
    let sibling = bench.folder(Some(parent.id), "private").await;

    let share = bench
        .shares
        .create_share(
            &bench.ctx,
            CreateShareRequest {
                node_id: shared.id,
                title: None,
                expires_at: None,
            },
        )
        .await
        .unwrap();

    // Root view lists the shared folder's children.
    let listing = bench
        .access
        .traverse(&share.token, None, None, None)
        .await
        .unwrap();
    assert_eq!(listing.node.id, shared.id);
    let children = listing.children.expect("shared root is a folder");
    assert_eq!(children.items.len(), 1);
    assert_eq!(children.items[0].name, "inside.sw");

    // A descendant is reachable.
    let inner = bench
        .access
        .traverse(&share.token, Some(child.id), None, None)
        .await
        .unwrap();
    assert_eq!(inner.node.id, child.id);
    assert!(inner.children.is_none());

    // Sibling, ancestor, and unknown ids all fail identically.
    for outside in [sibling.id, parent.id, Uuid::new_v4()] {
        let err = bench
            .access
            .traverse(&share.token, Some(outside), None, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ShareInvalid);
    }
}

#[tokio::test]
async fn expired_share_behaves_like_deactivated() {
    let bench = TestBench::new();
    let node = bench.folder(None, "old").await;

    // Insert directly at the store level: the service refuses to mint
    // already-expired shares, but rows age into this state in place.
    let expired = ShareStore::insert(
        bench.store.as_ref(),
        &NewShare {
            node_id: node.id,
            owner_id: bench.ctx.user_id,
            token: "expiredexpiredexpired000".to_string(),
            title: None,
            expires_at: Some(Utc::now() - Duration::minutes(5)),
        },
    )
    .await
    .unwrap();

    let err = bench.access.resolve(&expired.token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ShareInvalid);

    // Same outcome as a revoked share.
    let other = bench.folder(None, "revoked").await;
    let share = bench
        .shares
        .create_share(
            &bench.ctx,
            CreateShareRequest {
                node_id: other.id,
                title: None,
                expires_at: None,
            },
        )
        .await
        .unwrap();
    bench
        .shares
        .revoke_share(&bench.ctx, share.id)
        .await
        .unwrap();
    let err = bench.access.resolve(&share.token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ShareInvalid);
}

#[tokio::test]
async fn unknown_token_is_invalid() {
    let bench = TestBench::new();
    let err = bench.access.resolve("nosuchtoken").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ShareInvalid);
}

#[tokio::test]
async fn share_creation_is_idempotent_per_node() {
    let bench = TestBench::new();
    let node = bench.folder(None, "project").await;

    let req = CreateShareRequest {
        node_id: node.id,
        title: None,
        expires_at: None,
    };
    let first = bench.shares.create_share(&bench.ctx, req.clone()).await.unwrap();
    let second = bench.shares.create_share(&bench.ctx, req).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.token, second.token);
}

#[tokio::test]
async fn revoking_frees_the_active_slot() {
    let bench = TestBench::new();
    let node = bench.folder(None, "project").await;

    let req = CreateShareRequest {
        node_id: node.id,
        title: None,
        expires_at: None,
    };
    let first = bench.shares.create_share(&bench.ctx, req.clone()).await.unwrap();
    bench
        .shares
        .revoke_share(&bench.ctx, first.id)
        .await
        .unwrap();

    let replacement = bench.shares.create_share(&bench.ctx, req).await.unwrap();
    assert_ne!(replacement.id, first.id);
    assert_ne!(replacement.token, first.token);

    // The audit trail keeps both rows, newest first.
    let all = bench.shares.list_shares(&bench.ctx).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn past_expiry_is_rejected_on_create() {
    let bench = TestBench::new();
    let node = bench.folder(None, "project").await;

    let err = bench
        .shares
        .create_share(
            &bench.ctx,
            CreateShareRequest {
                node_id: node.id,
                title: None,
                expires_at: Some(Utc::now() - Duration::seconds(1)),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn sharing_someone_elses_node_fails() {
    let bench = TestBench::new();
    let node = bench.folder(None, "mine").await;

    let stranger = atelier_service::context::RequestContext::new(Uuid::new_v4());
    let err = bench
        .shares
        .create_share(
            &stranger,
            CreateShareRequest {
                node_id: node.id,
                title: None,
                expires_at: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn deleting_the_node_takes_the_share_with_it() {
    let bench = TestBench::new();
    let node = bench.folder(None, "project").await;

    let share = bench
        .shares
        .create_share(
            &bench.ctx,
            CreateShareRequest {
                node_id: node.id,
                title: None,
                expires_at: None,
            },
        )
        .await
        .unwrap();

    bench.nodes.delete(&bench.ctx, node.id).await.unwrap();

    let err = bench.access.resolve(&share.token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ShareInvalid);
}

#[tokio::test]
async fn shared_listing_paginates_with_cursors() {
    let bench = TestBench::new();
    let folder = bench.folder(None, "big").await;
    for i in 0..5 {
        bench.file(Some(folder.id), &format!("f{i}.sw"), "").await;
    }

    let share = bench
        .shares
        .create_share(
            &bench.ctx,
            CreateShareRequest {
                node_id: folder.id,
                title: None,
                expires_at: None,
            },
        )
        .await
        .unwrap();

    let mut names = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let listing = bench
            .access
            .traverse(&share.token, None, cursor.as_deref(), Some(2))
            .await
            .unwrap();
        let page = listing.children.expect("folder listing");
        names.extend(page.items.into_iter().map(|n| n.name));
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    assert_eq!(names, ["f0.sw", "f1.sw", "f2.sw", "f3.sw", "f4.sw"]);
}
