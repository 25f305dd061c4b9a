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

//! Enqueue outcomes that hand the rejected item back to the caller.

use std::fmt;

use thiserror::Error;

/// An item `offer` could not enqueue, returned so the caller can retry with it.
///
/// `Timeout` is the expected outcome of a timed offer on a full queue, not a fault.
#[derive(Error, Clone, Copy, PartialEq, Eq)]
pub enum OfferError<T> {
    /// No room became available before the timeout elapsed
    #[error("Timed out waiting for space in the queue")]
    Timeout(T),

    /// The wait was released by `interrupt_waiters`
    #[error("Wait interrupted before the item could be enqueued")]
    Interrupted(T),
}

impl<T> OfferError<T> {
    /// Takes back the item that was not enqueued.
    #[inline]
    pub fn into_inner(self) -> T {
        match self {
            OfferError::Timeout(item) | OfferError::Interrupted(item) => item,
        }
    }

    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, OfferError::Timeout(_))
    }

    #[inline]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, OfferError::Interrupted(_))
    }
}

impl<T> fmt::Debug for OfferError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OfferError::Timeout(_) => f.write_str("Timeout(..)"),
            OfferError::Interrupted(_) => f.write_str("Interrupted(..)"),
        }
    }
}

/// An item `put` could not enqueue because its wait was released by `interrupt_waiters`.
#[derive(Error, Clone, Copy, PartialEq, Eq)]
#[error("Wait interrupted before the item could be enqueued")]
pub struct PutError<T>(pub T);

impl<T> PutError<T> {
    /// Takes back the item that was not enqueued.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PutError(..)")
    }
}

impl<T> From<PutError<T>> for OfferError<T> {
    fn from(err: PutError<T>) -> Self {
        OfferError::Interrupted(err.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Job(u32);

    #[test]
    fn test_offer_error_returns_item() {
        let err = OfferError::Timeout(Job(7));
        assert!(err.is_timeout());
        assert!(!err.is_interrupted());
        assert_eq!(err.to_string(), "Timed out waiting for space in the queue");
        assert_eq!(format!("{err:?}"), "Timeout(..)");
        assert_eq!(err.into_inner().0, 7);

        let err = OfferError::Interrupted(Job(8));
        assert!(err.is_interrupted());
        assert_eq!(
            err.to_string(),
            "Wait interrupted before the item could be enqueued"
        );
        assert_eq!(err.into_inner().0, 8);
    }

    #[test]
    fn test_put_error_converts_to_interrupted_offer() {
        let err = PutError(Job(3));
        assert_eq!(
            err.to_string(),
            "Wait interrupted before the item could be enqueued"
        );
        let err = OfferError::from(err);
        assert!(err.is_interrupted());
        assert_eq!(err.into_inner().0, 3);
    }
}
