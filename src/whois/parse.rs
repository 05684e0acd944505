//! RDAP response parsing and date conversion.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::types::RegistrationRecord;

/// The subset of an RDAP domain object (RFC 9083) we read.
#[derive(Debug, Deserialize)]
struct RdapDomain {
    #[serde(default)]
    events: Vec<RdapEvent>,
}

#[derive(Debug, Deserialize)]
struct RdapEvent {
    #[serde(rename = "eventAction")]
    action: String,
    #[serde(rename = "eventDate")]
    date: Option<String>,
}

/// Converts an RDAP domain response body into a `RegistrationRecord`.
///
/// # Errors
///
/// Returns an error if the body is not a JSON object.
pub(crate) fn parse_rdap_response(body: &str) -> Result<RegistrationRecord> {
    let domain: RdapDomain =
        serde_json::from_str(body).context("Failed to parse RDAP response")?;

    let mut record = RegistrationRecord::default();
    for event in &domain.events {
        let Some(date) = event.date.as_deref().and_then(parse_date_string) else {
            continue;
        };
        match event.action.to_ascii_lowercase().as_str() {
            "registration" => record.creation_date = Some(date),
            "expiration" => record.expiration_date = Some(date),
            "last changed" => record.updated_date = Some(date),
            _ => {}
        }
    }
    Ok(record)
}

/// Attempts to parse a date string in various formats
pub(crate) fn parse_date_string(date_str: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Some(dt.with_timezone(&Utc));
    }

    // Registries do not all follow RFC 3339
    let formats = [
        "%Y-%m-%dT%H:%M:%S%.fZ",
        "%Y-%m-%dT%H:%M:%SZ",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d",
        "%d-%b-%Y",
        "%d/%m/%Y",
    ];

    for format in &formats {
        if let Ok(naive_dt) = chrono::NaiveDateTime::parse_from_str(date_str, format) {
            return Some(naive_dt.and_utc());
        }
        if let Ok(naive_date) = chrono::NaiveDate::parse_from_str(date_str, format) {
            return Some(naive_date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}
