//! ClickHouse storage for the banner click counter.

pub mod client;
pub mod config;
pub mod health;
pub mod insert;
pub mod query;
pub mod schema;
pub mod store;

pub use client::*;
pub use config::*;
pub use health::check_connection;
pub use insert::{insert_banners, insert_click_counts};
pub use schema::init_schema;
pub use store::ClickHouseStore;
