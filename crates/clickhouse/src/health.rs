//! ClickHouse health checks.

use crate::client::ClickHouseClient;
use telemetry::health;
use tracing::{debug, error};

/// Check ClickHouse connection health and record it in the health registry.
pub async fn check_connection(client: &ClickHouseClient) -> bool {
    match client.inner().query("SELECT 1").fetch_one::<u8>().await {
        Ok(_) => {
            debug!("ClickHouse connection healthy");
            health().clickhouse.set_healthy();
            true
        }
        Err(e) => {
            error!("ClickHouse health check failed: {}", e);
            health().clickhouse.set_unhealthy(e.to_string());
            false
        }
    }
}
