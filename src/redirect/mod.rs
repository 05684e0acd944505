//! HTTP redirect chain resolution.
//!
//! This module follows redirect chains manually, one hop at a time, so the
//! engine can see every intermediate URL and tell a clean destination from a
//! loop, an overlong chain, or a dead link.

mod fetcher;

use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;
use strum_macros::{AsRefStr, Display};
use tokio::time::Instant;

use crate::error_handling::FetchError;
use crate::input::NormalizedUrl;

pub use fetcher::{HopFetcher, HopResponse, ReqwestHopFetcher};

/// How a redirect chain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ChainTermination {
    /// A non-redirect response was reached.
    Completed,
    /// Following the next redirect would exceed the configured maximum.
    HopLimitExceeded,
    /// A redirect pointed back to a URL already in the chain.
    CycleDetected,
    /// A hop failed (transport error, timeout, or invalid destination).
    ResolutionFailed,
}

/// Category of a `ResolutionFailed` chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FailureKind {
    /// Connection, TLS, or protocol failure
    Transport,
    /// The hop or the request deadline timed out
    Timeout,
    /// The `Location` header could not be turned into an http(s) URL with a host
    InvalidDestination,
}

/// Why resolution failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionFailure {
    /// Failure category
    pub kind: FailureKind,
    /// Human-readable diagnostic
    pub message: String,
}

/// The URLs visited while resolving a link, in order.
///
/// Never empty: the first element is always the starting URL. For failed
/// chains the last element is the last URL that answered (or the start URL if
/// nothing did).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectChain {
    hops: Vec<NormalizedUrl>,
    termination: ChainTermination,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<ResolutionFailure>,
}

impl RedirectChain {
    /// A chain that ended normally or at a guard (hop limit, cycle).
    pub(crate) fn finished(hops: Vec<NormalizedUrl>, termination: ChainTermination) -> Self {
        Self {
            hops,
            termination,
            failure: None,
        }
    }

    /// A chain that ended on a failed hop.
    fn failed(
        mut hops: Vec<NormalizedUrl>,
        start: &NormalizedUrl,
        failure: ResolutionFailure,
    ) -> Self {
        if hops.is_empty() {
            hops.push(start.clone());
        }
        Self {
            hops,
            termination: ChainTermination::ResolutionFailed,
            failure: Some(failure),
        }
    }

    /// A completed chain with no redirects: the start URL is the destination.
    pub fn direct(url: NormalizedUrl) -> Self {
        Self::finished(vec![url], ChainTermination::Completed)
    }

    /// Every URL in the chain, start first.
    pub fn hops(&self) -> &[NormalizedUrl] {
        &self.hops
    }

    /// The last URL reached.
    pub fn final_url(&self) -> &NormalizedUrl {
        // `hops` is non-empty by construction
        &self.hops[self.hops.len() - 1]
    }

    /// How the chain ended.
    pub fn termination(&self) -> ChainTermination {
        self.termination
    }

    /// Failure details for `ResolutionFailed` chains.
    pub fn failure(&self) -> Option<&ResolutionFailure> {
        self.failure.as_ref()
    }

    /// Number of redirects followed.
    pub fn redirect_count(&self) -> usize {
        self.hops.len() - 1
    }

    /// Whether resolution stopped before reaching a settled destination.
    pub fn is_unresolved(&self) -> bool {
        self.termination != ChainTermination::Completed
    }
}

/// Follows redirects one hop at a time through a [`HopFetcher`].
#[derive(Clone)]
pub struct RedirectResolver {
    fetcher: Arc<dyn HopFetcher>,
    max_hops: usize,
}

impl RedirectResolver {
    /// Creates a resolver keeping at most `max_hops` URLs per chain (minimum 1).
    pub fn new(fetcher: Arc<dyn HopFetcher>, max_hops: usize) -> Self {
        Self {
            fetcher,
            max_hops: max_hops.max(1),
        }
    }

    /// Resolves the redirect chain starting at `start`.
    ///
    /// Every hop is bounded by `deadline`. Resolution never fails as a whole:
    /// errors, loops, and overlong chains are reported through the chain's
    /// termination.
    pub async fn resolve(&self, start: &NormalizedUrl, deadline: Instant) -> RedirectChain {
        let mut hops: Vec<NormalizedUrl> = Vec::new();
        let mut current = start.clone();

        loop {
            debug!("Fetching hop {} of chain for {}: {}", hops.len() + 1, start, current);
            let response =
                match tokio::time::timeout_at(deadline, self.fetcher.fetch(current.as_url())).await
                {
                    Ok(Ok(response)) => response,
                    Ok(Err(error)) => {
                        let kind = match error {
                            FetchError::Timeout(_) => FailureKind::Timeout,
                            FetchError::Transport(_) => FailureKind::Transport,
                        };
                        warn!("Redirect resolution failed at {}: {}", current, error);
                        return RedirectChain::failed(
                            hops,
                            start,
                            ResolutionFailure {
                                kind,
                                message: format!("{current}: {error}"),
                            },
                        );
                    }
                    Err(_) => {
                        warn!("Request deadline elapsed while fetching {}", current);
                        return RedirectChain::failed(
                            hops,
                            start,
                            ResolutionFailure {
                                kind: FailureKind::Timeout,
                                message: format!("{current}: request deadline elapsed"),
                            },
                        );
                    }
                };

            hops.push(current);
            let base = &hops[hops.len() - 1];

            if !response.is_redirect() {
                return RedirectChain::finished(hops, ChainTermination::Completed);
            }
            let Some(location) = response.location.as_deref() else {
                // Redirect status but no Location header - unusual, treat the hop as final
                warn!(
                    "Redirect status {} for {} but no Location header",
                    response.status, base
                );
                return RedirectChain::finished(hops, ChainTermination::Completed);
            };

            let next = match resolve_location(base, location) {
                Ok(next) => next,
                Err(message) => {
                    warn!("Invalid redirect target from {}: {}", base, message);
                    return RedirectChain::failed(
                        hops,
                        start,
                        ResolutionFailure {
                            kind: FailureKind::InvalidDestination,
                            message,
                        },
                    );
                }
            };

            if hops.iter().any(|seen| same_resource(seen, &next)) {
                warn!("Redirect cycle detected: {} points back to {}", base, next);
                return RedirectChain::finished(hops, ChainTermination::CycleDetected);
            }
            if hops.len() >= self.max_hops {
                warn!(
                    "Redirect chain for {} exceeds {} hops, stopping before {}",
                    start, self.max_hops, next
                );
                return RedirectChain::finished(hops, ChainTermination::HopLimitExceeded);
            }
            current = next;
        }
    }
}

/// Resolves a `Location` header against the URL that returned it.
fn resolve_location(base: &NormalizedUrl, location: &str) -> Result<NormalizedUrl, String> {
    let joined = base
        .as_url()
        .join(location.trim())
        .map_err(|e| format!("cannot parse Location '{location}': {e}"))?;
    NormalizedUrl::from_url(joined).map_err(|e| format!("Location '{location}' rejected: {e}"))
}

/// URLs that differ only in their fragment address the same resource.
fn same_resource(a: &NormalizedUrl, b: &NormalizedUrl) -> bool {
    let mut a = a.as_url().clone();
    let mut b = b.as_url().clone();
    a.set_fragment(None);
    b.set_fragment(None);
    a == b
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
