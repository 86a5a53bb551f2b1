//! Map coordination error types.

use thiserror::Error;

/// Errors that can occur while setting up the map.
///
/// Resolution failures are deliberately absent: they are terminal at the
/// operation that detected them (logged, state untouched) and never
/// propagate past it. See [`crate::resolver::ResolveError`].
#[derive(Debug, Error)]
pub enum MapError {
    /// The mapping library is not available. Fatal - the map cannot
    /// degrade gracefully without a rendering engine, so this is reported
    /// immediately and never retried.
    #[error("mapping engine unavailable: {0}")]
    EngineUnavailable(String),

    /// `init` was called on an already-initialized map.
    #[error("map already initialized")]
    AlreadyInitialized,
}
