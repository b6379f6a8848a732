// Error types for tlru
//
// This module defines the error types returned by cache operations.
// Misuse never corrupts cache state: a failing call is a no-op.

use crate::types::Policy;
use thiserror::Error;

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in cache operations
#[derive(Error, Debug)]
pub enum Error {
    /// `set` under the LRA policy with a key that is already cached
    #[error("Duplicate key: {0} is already cached (LRA rejects re-insertion; use the LRI policy for update-in-place)")]
    DuplicateKey(String),

    /// `set_state` with a state extracted under a different policy
    #[error("Policy mismatch: cache runs {expected}, state was extracted under {found}")]
    PolicyMismatch {
        /// Policy the cache was constructed with
        expected: Policy,
        /// Policy recorded in the rejected state
        found: Policy,
    },
}
