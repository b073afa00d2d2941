//! Core types, storage traits, and errors for the banner click counter.

pub mod banner;
pub mod bucket;
pub mod click;
pub mod error;
pub mod sink;

pub use banner::*;
pub use bucket::*;
pub use click::*;
pub use error::{
    DbErrorCode, Error, Result, ValidationErrorCode, BANNER_NOT_FOUND_CODE, INGESTION_CANCELLED_CODE,
};
pub use sink::*;
