use crate::{Error, Result};
use std::fmt;

/// Why the store refused a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The key is unknown, does not apply to this entity's type,
    /// or the entity no longer exists.
    Unsupported,
    /// The key can only be changed by the host.
    ReadOnly,
    /// The key's validator refused the value.
    Invalid,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RejectReason::Unsupported => "key not supported by this entity",
            RejectReason::ReadOnly => "key is read-only",
            RejectReason::Invalid => "value outside the accepted domain",
        })
    }
}

/// Outcome of `offer`, `remove` and `sync`.
///
/// A rejection is an ordinary outcome, not an error; use
/// `into_result` to propagate it with `?`.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum DataTransactionResult<T> {
    Success {
        /// The value that was in effect before the write.
        replaced: Option<T>,
    },
    Rejected {
        key: &'static str,
        /// The refused value; `None` for a refused removal.
        rejected: Option<T>,
        reason: RejectReason,
    },
}

impl<T> DataTransactionResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, DataTransactionResult::Success { .. })
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            DataTransactionResult::Success { .. } => None,
            DataTransactionResult::Rejected { reason, .. } => Some(*reason),
        }
    }

    pub fn replaced(&self) -> Option<&T> {
        match self {
            DataTransactionResult::Success { replaced } => replaced.as_ref(),
            DataTransactionResult::Rejected { .. } => None,
        }
    }

    pub fn into_result(self) -> Result<Option<T>> {
        match self {
            DataTransactionResult::Success { replaced } => Ok(replaced),
            DataTransactionResult::Rejected { key, reason, .. } => {
                Err(Error::RejectedValue { key, reason })
            }
        }
    }
}
