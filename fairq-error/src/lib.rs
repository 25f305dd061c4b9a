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

//! # Fairq Error Handling
//!
//! Error types shared by the `fairq` queue and its benchmark driver.
//!
//! ```rust
//! use fairq_error::QueueError;
//! use fairq_error::QueueResult;
//!
//! fn checked_capacity(capacity: usize) -> QueueResult<usize> {
//!     if capacity == 0 {
//!         return Err(QueueError::invalid_capacity(capacity));
//!     }
//!     Ok(capacity)
//! }
//! # assert!(checked_capacity(0).is_err());
//! ```

mod offer_error;
mod queue_error;

pub use offer_error::OfferError;
pub use offer_error::PutError;
pub use queue_error::QueueError;
pub use queue_error::QueueResult;
