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

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use parking_lot::Condvar;
use parking_lot::Mutex;

/// A synchronization aid that allows one or more threads to wait until a set of operations being
/// performed in other threads completes.
#[derive(Clone)]
pub struct CountDownLatch {
    /// The current count of the latch.
    count: Arc<Mutex<u32>>,
    /// Broadcast once the count reaches zero.
    released: Arc<Condvar>,
}

impl CountDownLatch {
    /// A new `CountDownLatch`.
    #[inline]
    pub fn new(count: u32) -> Self {
        CountDownLatch {
            count: Arc::new(Mutex::new(count)),
            released: Arc::new(Condvar::new()),
        }
    }

    #[inline]
    pub fn count_down(&self) {
        let mut count = self.count.lock();
        if *count == 0 {
            return;
        }
        *count -= 1;
        if *count == 0 {
            self.released.notify_all();
        }
    }

    #[inline]
    pub fn count(&self) -> u32 {
        *self.count.lock()
    }

    #[inline]
    pub fn wait(&self) {
        let mut count = self.count.lock();
        while *count > 0 {
            self.released.wait(&mut count);
        }
    }

    /// Returns `false` if the count is still above zero once `timeout` has passed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait();
            return true;
        };
        let mut count = self.count.lock();
        while *count > 0 {
            if self.released.wait_until(&mut count, deadline).timed_out() {
                return *count == 0;
            }
        }
        true
    }
}
