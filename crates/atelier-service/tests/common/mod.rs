//! Shared test fixtures: services wired over the in-memory store.

use std::sync::Arc;

use uuid::Uuid;

use atelier_core::config::vfs::VfsConfig;
use atelier_database::memory::MemoryStore;
use atelier_service::context::RequestContext;
use atelier_service::node::{CreateNodeRequest, NodeService, PathService};
use atelier_service::share::{AccessService, ShareService};

/// Everything a test needs: one user, one store, all services.
pub struct TestBench {
    pub ctx: RequestContext,
    pub store: Arc<MemoryStore>,
    pub nodes: NodeService,
    pub paths: PathService,
    pub shares: ShareService,
    pub access: AccessService,
}

impl TestBench {
    pub fn new() -> Self {
        Self::with_config(VfsConfig::default())
    }

    pub fn with_config(config: VfsConfig) -> Self {
        let store = Arc::new(MemoryStore::new(config.max_depth));
        Self {
            ctx: RequestContext::new(Uuid::new_v4()),
            nodes: NodeService::new(store.clone(), config.clone()),
            paths: PathService::new(store.clone()),
            shares: ShareService::new(store.clone(), store.clone(), config),
            access: AccessService::new(store.clone(), store.clone()),
            store,
        }
    }

    /// Create a folder under `parent`.
    pub async fn folder(
        &self,
        parent: Option<Uuid>,
        name: &str,
    ) -> atelier_entity::node::Node {
        self.nodes
            .create(
                &self.ctx,
                CreateNodeRequest {
                    parent_id: parent,
                    name: name.to_string(),
                    is_folder: true,
                    content: None,
                },
            )
            .await
            .expect("folder create should succeed")
    }

    /// Create a file under `parent`.
    pub async fn file(
        &self,
        parent: Option<Uuid>,
        name: &str,
        content: &str,
    ) -> atelier_entity::node::Node {
        self.nodes
            .create(
                &self.ctx,
                CreateNodeRequest {
                    parent_id: parent,
                    name: name.to_string(),
                    is_folder: false,
                    content: Some(content.to_string()),
                },
            )
            .await
            .expect("file create should succeed")
    }
}
