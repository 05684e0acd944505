//! Registration data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Registration data for one registrable domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationRecord {
    /// Domain creation (registration) date
    pub creation_date: Option<DateTime<Utc>>,
    /// Domain expiration date
    pub expiration_date: Option<DateTime<Utc>>,
    /// Last time the registration was changed
    pub updated_date: Option<DateTime<Utc>>,
}

/// Metadata about a cached registration lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WhoisCacheEntry {
    pub(crate) result: WhoisCacheResult,
    pub(crate) cached_at: SystemTime,
    pub(crate) domain: String,
}

/// Serializable version of RegistrationRecord for caching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WhoisCacheResult {
    creation_date: Option<i64>,
    expiration_date: Option<i64>,
    updated_date: Option<i64>,
}

impl From<&RegistrationRecord> for WhoisCacheResult {
    fn from(record: &RegistrationRecord) -> Self {
        WhoisCacheResult {
            creation_date: record.creation_date.map(|dt| dt.timestamp_millis()),
            expiration_date: record.expiration_date.map(|dt| dt.timestamp_millis()),
            updated_date: record.updated_date.map(|dt| dt.timestamp_millis()),
        }
    }
}

impl From<WhoisCacheResult> for RegistrationRecord {
    fn from(cache: WhoisCacheResult) -> Self {
        RegistrationRecord {
            creation_date: cache.creation_date.and_then(DateTime::<Utc>::from_timestamp_millis),
            expiration_date: cache.expiration_date.and_then(DateTime::<Utc>::from_timestamp_millis),
            updated_date: cache.updated_date.and_then(DateTime::<Utc>::from_timestamp_millis),
        }
    }
}
