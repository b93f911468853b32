//! Consensus-side errors.

use shardline_core::CryptoError;
use thiserror::Error;

/// Failures while constructing the candidate header.
///
/// These never escape the subround; `job` logs them and reports no progress.
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("chain tip header present but its hash is unavailable")]
    MissingTipHash,
}
