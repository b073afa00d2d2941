//! Common test setup functions.

use api::{router, AppState};
use axum::Router;
use clicker_core::Banner;
use clickhouse_client::{
    init_schema, insert_banners, query::truncate_clicks, ClickHouseClient, ClickHouseConfig,
    ClickHouseStore,
};
use std::sync::Arc;
use std::time::Duration;
use worker::{AggregatorReport, ClickPipeline, PipelineConfig};

use crate::containers::TestContainers;
use crate::mocks::MockStore;

/// Test context with the real router and pipeline over a `MockStore`.
///
/// The flush timer is set far out, so clicks reach the store only when the
/// test calls [`TestContext::stop`] (or flushes through the pipeline).
pub struct TestContext {
    pub store: Arc<MockStore>,
    pub pipeline: Arc<ClickPipeline>,
    pub router: Router,
}

impl TestContext {
    /// Create a context where `banners` exist.
    pub fn new(banners: Vec<Banner>) -> Self {
        let config = PipelineConfig::default().with_flush_interval(Duration::from_secs(3600));
        Self::with_config(banners, config)
    }

    pub fn with_config(banners: Vec<Banner>, config: PipelineConfig) -> Self {
        let store = MockStore::with_banners(banners);
        let pipeline = Arc::new(
            ClickPipeline::start(&config, store.clone()).expect("Failed to start pipeline"),
        );
        let state = AppState::new(&pipeline, store.clone(), store.clone(), &config);
        let router = router(state);

        Self {
            store,
            pipeline,
            router,
        }
    }

    /// Stop the pipeline, forcing the final flush.
    pub async fn stop(&self) -> AggregatorReport {
        self.pipeline.stop().await.expect("Failed to stop pipeline")
    }
}

/// Real ClickHouse behind a `ClickHouseStore`.
pub struct ClickHouseContext {
    pub containers: TestContainers,
    pub client: ClickHouseClient,
    pub store: Arc<ClickHouseStore>,
}

impl ClickHouseContext {
    pub async fn new() -> Self {
        let containers = TestContainers::start().await;

        let config = ClickHouseConfig {
            url: containers.clickhouse_url.clone(),
            database: containers.clickhouse_database.clone(),
            username: containers.clickhouse_username.clone(),
            password: containers.clickhouse_password.clone(),
            timeout_secs: 30,
        };
        let client = ClickHouseClient::new(config).expect("Failed to create ClickHouse client");

        init_schema(&client)
            .await
            .expect("Failed to initialize schema");
        truncate_clicks(&client).await.ok();

        let store = Arc::new(ClickHouseStore::new(client.clone()));

        Self {
            containers,
            client,
            store,
        }
    }

    pub async fn seed_banners(&self, banners: &[Banner]) {
        insert_banners(&self.client, banners)
            .await
            .expect("Failed to insert banners");
    }
}
