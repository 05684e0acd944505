//! Error categorization.
//!
//! Maps `reqwest` failures onto the fetch error kinds the redirect resolver
//! distinguishes.

use super::types::FetchError;

/// Categorizes a `reqwest::Error` into a `FetchError`.
///
/// Timeouts are reported separately from every other transport failure
/// (connect, TLS, body, protocol) so the redirect chain can say which one
/// ended resolution.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> FetchError {
    let message = describe(error);
    if error.is_timeout() {
        FetchError::Timeout(message)
    } else {
        FetchError::Transport(message)
    }
}

fn describe(error: &reqwest::Error) -> String {
    // reqwest's top-level message omits the cause ("error sending request"),
    // so append the source chain.
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
