//! Error type threaded through fragment resolution.
//!
//! Failures raised inside fragments surface unmodified from
//! [`crate::Message::resolve`]: the source error is wrapped transparently,
//! never reworded, so callers can still match or downcast to the original
//! value. Resolution aborts at the first failing fragment.

use shipnote_changelog::ChangelogError;
use shipnote_git::GitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    #[error(transparent)]
    Git(#[from] GitError),

    /// Any failure raised by a user-supplied fragment or format function.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
