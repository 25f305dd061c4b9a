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

//! A bounded FIFO queue for coordinating producer and consumer threads.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use fairq::BoundedBlockingQueue;
//!
//! let queue = BoundedBlockingQueue::new(2).unwrap();
//! queue.offer(1, Duration::from_millis(10)).unwrap();
//! queue.offer(2, Duration::from_millis(10)).unwrap();
//! let rejected = queue.offer(3, Duration::from_millis(10)).unwrap_err();
//! assert_eq!(queue.take().unwrap(), 1);
//! queue.offer(rejected.into_inner(), Duration::from_millis(10)).unwrap();
//! ```

mod blocking_queue;
pub mod config;
pub mod count_down_latch;

pub use blocking_queue::BoundedBlockingQueue;
pub use config::QueueConfig;
pub use count_down_latch::CountDownLatch;
/// Re-export error types.
pub use fairq_error::OfferError;
pub use fairq_error::PutError;
pub use fairq_error::QueueError;
pub use fairq_error::QueueResult;
