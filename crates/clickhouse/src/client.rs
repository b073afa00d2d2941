//! ClickHouse client wrapper.

use crate::config::ClickHouseConfig;
use clickhouse::Client;
use clicker_core::{Error, Result};
use tracing::info;
use validator::Validate;

/// ClickHouse client bound to the configured database.
#[derive(Clone)]
pub struct ClickHouseClient {
    inner: Client,
    config: ClickHouseConfig,
}

impl ClickHouseClient {
    /// Creates a new ClickHouse client.
    ///
    /// No connection is made until the first query.
    pub fn new(config: ClickHouseConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::config(format!("invalid clickhouse config: {}", e)))?;

        let mut client = Client::default()
            .with_url(&config.url)
            .with_database(&config.database)
            .with_option("max_execution_time", config.timeout_secs.to_string());

        if let Some(ref user) = config.username {
            client = client.with_user(user);
        }

        if let Some(ref pass) = config.password {
            client = client.with_password(pass);
        }

        info!(
            url = %config.url,
            database = %config.database,
            "Created ClickHouse client"
        );

        Ok(Self {
            inner: client,
            config,
        })
    }

    /// Returns the inner clickhouse client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Same connection settings, pointed at the server's `default` database.
    ///
    /// Used to create the configured database before anything selects it.
    pub fn server(&self) -> Client {
        self.inner.clone().with_database("default")
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClickHouseConfig {
        &self.config
    }
}
