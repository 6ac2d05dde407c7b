//! The session tree cache driving the listing flow the way a tree view
//! consumes it: expand, respond, mutate, invalidate, refresh.

mod common;

use atelier_service::node::UpdateNodeRequest;
use atelier_service::tree::{SubtreeState, TreeCache};
use common::TestBench;

#[tokio::test]
async fn expand_mutate_invalidate_refresh_flow() {
    let bench = TestBench::new();
    let cache = TreeCache::new();

    let project = bench.folder(None, "project").await;
    bench.file(Some(project.id), "main.sw", "andika").await;

    // First expand issues the fetch.
    assert!(cache.begin_load(Some(project.id)));
    let page = bench
        .nodes
        .list(&bench.ctx, Some(project.id), None, None)
        .await
        .unwrap();
    cache.complete_load(Some(project.id), page.items);

    match cache.state(Some(project.id)) {
        SubtreeState::Loaded(children) => {
            assert_eq!(children.len(), 1);
            assert_eq!(children[0].name, "main.sw");
        }
        state => panic!("expected loaded children, got {state:?}"),
    }

    // Re-expanding a loaded folder does not re-fetch.
    assert!(!cache.begin_load(Some(project.id)));

    // A mutation runs under the action gate and invalidates only the
    // parent it touched.
    {
        let _guard = cache.begin_action().expect("no other action in flight");
        bench
            .nodes
            .update(
                &bench.ctx,
                project.id,
                UpdateNodeRequest {
                    name: Some("workspace".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        cache.invalidate(None);
    }
    assert!(!cache.is_performing_action());
    assert_eq!(cache.state(None), SubtreeState::Unloaded);
    assert!(matches!(
        cache.state(Some(project.id)),
        SubtreeState::Loaded(_)
    ));

    // Refresh re-fetches an already loaded listing.
    assert!(cache.begin_refresh(Some(project.id)));
    let page = bench
        .nodes
        .list(&bench.ctx, Some(project.id), None, None)
        .await
        .unwrap();
    cache.complete_load(Some(project.id), page.items);
    assert!(matches!(
        cache.state(Some(project.id)),
        SubtreeState::Loaded(_)
    ));
}
