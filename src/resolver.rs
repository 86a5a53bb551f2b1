//! Panorama resolution service abstraction
//!
//! The street view data service maps an opaque panorama identifier to a
//! geographic coordinate and the canonical form of that identifier. The
//! coordination core only ever talks to it through [`PanoResolver`], so
//! tests (and alternative backends) can substitute their own.

use std::future::Future;

use crate::coord::Coordinate;
use crate::map::events::PanoId;

/// Errors that can occur while resolving a panorama identifier.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    /// The service has no panorama for this identifier
    #[error("no panorama found for '{0}'")]
    NotFound(PanoId),
    /// The service itself failed (network, quota, backend outage)
    #[error("resolver backend error: {0}")]
    Backend(String),
}

/// A successfully resolved panorama.
///
/// Carries the canonical identifier, which may differ from the one the
/// caller asked about (the service normalizes aliases).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPano {
    /// Canonical panorama identifier
    pub pano_id: PanoId,
    /// Location of the panorama
    pub coordinate: Coordinate,
}

/// Trait for panorama resolution services.
///
/// Resolution is asynchronous and fallible; a failure is an ordinary
/// non-success result, never a panic. Callers decide what a failure means
/// for them - the coordination core logs it and leaves its state untouched.
pub trait PanoResolver: Send + Sync {
    /// Resolves a panorama identifier to its canonical id and coordinate.
    fn resolve(
        &self,
        pano_id: &PanoId,
    ) -> impl Future<Output = Result<ResolvedPano, ResolveError>> + Send;
}
