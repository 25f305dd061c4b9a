// Copyright 2023 The Fairq Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Queue error types
//!
//! A timed `poll` running out of budget is not an error, it reports `Ok(None)`. Enqueue
//! failures carry the rejected item and live in `offer_error`.

use thiserror::Error;

/// Queue error types
///
/// Errors that can occur while building or waiting on a bounded queue:
/// - Construction with a capacity that cannot hold a single item
/// - A blocked call released by an external interrupt
/// - Configuration sources that cannot be loaded
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Capacity must be positive
    #[error("Invalid capacity: {capacity}, capacity must be greater than 0")]
    InvalidCapacity { capacity: usize },

    /// The calling thread was released from a wait by `interrupt_waiters`
    #[error("Wait interrupted before the operation could complete")]
    Interrupted,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QueueError {
    #[inline]
    pub fn invalid_capacity(capacity: usize) -> Self {
        QueueError::InvalidCapacity { capacity }
    }

    #[inline]
    pub fn config(msg: impl Into<String>) -> Self {
        QueueError::Config(msg.into())
    }

    /// Returns `true` if the caller may simply retry the operation.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, QueueError::Interrupted)
    }
}

/// Result type alias for queue operations
pub type QueueResult<T> = std::result::Result<T, QueueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_error_display() {
        let err = QueueError::invalid_capacity(0);
        assert_eq!(
            err.to_string(),
            "Invalid capacity: 0, capacity must be greater than 0"
        );

        let err = QueueError::Interrupted;
        assert_eq!(
            err.to_string(),
            "Wait interrupted before the operation could complete"
        );

        let err = QueueError::config("missing field `items`");
        assert_eq!(err.to_string(), "Configuration error: missing field `items`");
    }

    #[test]
    fn test_queue_error_retryable() {
        assert!(QueueError::Interrupted.is_retryable());
        assert!(!QueueError::invalid_capacity(0).is_retryable());
        assert!(!QueueError::config("bad").is_retryable());
    }
}
