use std::collections::TryReserveError;
use thiserror::Error;

/// Failures surfaced by the containers in this crate. Every fallible operation leaves the
/// container it was called on exactly as usable as before the call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("allocation failed: {0}")]
    Alloc(#[from] TryReserveError),

    #[error("container handle space exhausted")]
    CapacityOverflow,

    #[error("invalid table configuration: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
