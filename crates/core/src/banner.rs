//! Banner identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, ValidationErrorCode};

/// Opaque 128-bit banner identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BannerId(Uuid);

impl BannerId {
    /// Random id, used for seeding and tests.
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for BannerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for BannerId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self).map_err(|e| {
            Error::validation_code(
                ValidationErrorCode::InvalidBannerId,
                format!("invalid banner id '{}': {}", s, e),
            )
        })
    }
}

impl From<Uuid> for BannerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// A banner that clicks are recorded against.
///
/// The pipeline only ever checks that a banner exists; banners are managed
/// outside this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Banner {
    pub id: BannerId,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

impl Banner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BannerId::new_v4(),
            name: name.into(),
        }
    }
}
