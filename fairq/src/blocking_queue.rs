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

use std::collections::VecDeque;
use std::convert::Infallible;
use std::fmt;
use std::time::Duration;
use std::time::Instant;

use fairq_error::OfferError;
use fairq_error::PutError;
use fairq_error::QueueError;
use fairq_error::QueueResult;
use parking_lot::Condvar;
use parking_lot::Mutex;
use parking_lot::MutexGuard;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::config::QueueConfig;

/// Upper bound on the buffer allocated up front, larger queues grow on demand.
const MAX_PREALLOCATED: usize = 1 << 16;

struct State<T> {
    items: VecDeque<T>,
    /// Advanced by `interrupt_waiters`, releases every call blocked before the advance.
    interrupt_epoch: u64,
}

/// Why a wait ended without the operation going through.
enum WaitError<E> {
    Interrupted,
    /// The park step gave up, `E` is `TimedOut` for timed waits and `Infallible` otherwise.
    Expired(E),
}

struct TimedOut;

/// A thread-safe bounded blocking queue. To replace Java `ArrayBlockingQueue`.
///
/// Producers block while the queue is full and consumers block while it is empty. All state
/// sits behind one `parking_lot::Mutex` with two condition variables: `space_available` for
/// producers and `item_available` for consumers. An ordinary insert or removal wakes a single
/// waiter on the opposite side, `clear` wakes every blocked producer.
///
/// With `fair` enabled (the default) the lock is released with
/// [`MutexGuard::unlock_fair`], handing it to the longest waiting thread instead of letting the
/// releasing thread barge back in.
pub struct BoundedBlockingQueue<T> {
    /// The buffered items and the interrupt epoch.
    state: Mutex<State<T>>,
    /// The maximum capacity of the queue.
    capacity: usize,
    fair: bool,
    spin_tries: u32,
    /// Signaled when an item is removed or the queue is cleared.
    space_available: Condvar,
    /// Signaled when an item is inserted.
    item_available: Condvar,
}

impl<T> BoundedBlockingQueue<T> {
    /// Creates a new `BoundedBlockingQueue` with the specified capacity and default options.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidCapacity`] if `capacity` is 0.
    pub fn new(capacity: usize) -> QueueResult<Self> {
        Self::with_config(QueueConfig::with_capacity(capacity))
    }

    /// Creates a new `BoundedBlockingQueue` from a [`QueueConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidCapacity`] if `config.capacity` is 0.
    pub fn with_config(config: QueueConfig) -> QueueResult<Self> {
        config.validate()?;
        Ok(BoundedBlockingQueue {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(config.capacity.min(MAX_PREALLOCATED)),
                interrupt_epoch: 0,
            }),
            capacity: config.capacity,
            fair: config.fair,
            spin_tries: config.spin_tries,
            space_available: Condvar::new(),
            item_available: Condvar::new(),
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Attempts to add an item to the queue within a specified timeout.
    ///
    /// The timeout is a total budget: waking up without room available only re-checks the
    /// queue against what is left of it. A timeout too large to be represented as an
    /// [`Instant`] waits without a deadline.
    ///
    /// # Errors
    ///
    /// The item comes back inside the error so the caller can retry with it:
    /// - [`OfferError::Timeout`] if no room became available in time
    /// - [`OfferError::Interrupted`] if [`interrupt_waiters`](Self::interrupt_waiters) was called
    ///   while this call was waiting, including when the deadline passed at the same time
    pub fn offer(&self, item: T, timeout: Duration) -> Result<(), OfferError<T>> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.put(item).map_err(OfferError::from);
        };
        self.enqueue(item, |state| self.park_until(&self.space_available, state, deadline))
            .map_err(|(item, e)| match e {
                WaitError::Interrupted => OfferError::Interrupted(item),
                WaitError::Expired(TimedOut) => OfferError::Timeout(item),
            })
    }

    /// Adds an item to the queue, waiting as long as necessary for space to become available.
    ///
    /// # Errors
    ///
    /// [`PutError`] holding the item if [`interrupt_waiters`](Self::interrupt_waiters) was
    /// called while this call was waiting for room.
    pub fn put(&self, item: T) -> Result<(), PutError<T>> {
        self.enqueue(item, |state| self.park(&self.space_available, state))
            .map_err(|(item, e)| match e {
                WaitError::Interrupted => PutError(item),
                WaitError::Expired(never) => match never {},
            })
    }

    /// Attempts to remove and return the head of the queue within a specified timeout.
    ///
    /// # Returns
    ///
    /// `Ok(Some(item))` if an item was removed, `Ok(None)` if the timeout was reached first.
    ///
    /// # Errors
    ///
    /// [`QueueError::Interrupted`] if [`interrupt_waiters`](Self::interrupt_waiters) was called
    /// while this call was waiting for an item, including when the deadline passed at the same
    /// time.
    pub fn poll(&self, timeout: Duration) -> QueueResult<Option<T>> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.take().map(Some);
        };
        match self.dequeue(|state| self.park_until(&self.item_available, state, deadline)) {
            Ok(item) => Ok(Some(item)),
            Err(WaitError::Interrupted) => Err(QueueError::Interrupted),
            Err(WaitError::Expired(TimedOut)) => Ok(None),
        }
    }

    /// Removes and returns the head of the queue, waiting as long as necessary for an item.
    ///
    /// # Errors
    ///
    /// [`QueueError::Interrupted`] if [`interrupt_waiters`](Self::interrupt_waiters) was called
    /// while this call was waiting for an item.
    pub fn take(&self) -> QueueResult<T> {
        self.dequeue(|state| self.park(&self.item_available, state))
            .map_err(|e| match e {
                WaitError::Interrupted => QueueError::Interrupted,
                WaitError::Expired(never) => match never {},
            })
    }

    /// Discards every buffered item and wakes all blocked producers.
    pub fn clear(&self) {
        let mut state = self.lock();
        let discarded = state.items.len();
        state.items.clear();
        self.space_available.notify_all();
        self.unlock(state);
        debug!(discarded, capacity = self.capacity, "bounded queue cleared");
    }

    /// Checks if the queue is empty.
    ///
    /// The answer is a snapshot taken under the lock and may be stale as soon as this returns.
    pub fn is_empty(&self) -> bool {
        let state = self.lock();
        let empty = state.items.is_empty();
        self.unlock(state);
        empty
    }

    /// Releases every thread currently blocked in `offer`, `put`, `poll` or `take`.
    ///
    /// Each of them fails with an interrupted error without touching the buffer, unless the
    /// operation it waits for became possible at the same time. Calls made after this returns
    /// are not affected.
    pub fn interrupt_waiters(&self) {
        let mut state = self.lock();
        state.interrupt_epoch = state.interrupt_epoch.wrapping_add(1);
        self.space_available.notify_all();
        self.item_available.notify_all();
        self.unlock(state);
    }

    fn enqueue<E, P>(&self, item: T, park: P) -> Result<(), (T, WaitError<E>)>
    where
        P: FnMut(&mut MutexGuard<'_, State<T>>) -> Result<(), E>,
    {
        let capacity = self.capacity;
        let mut state = self.lock();
        let result = match self.wait_for(
            &mut state,
            |state| (state.items.len() < capacity).then_some(()),
            park,
        ) {
            Ok(()) => {
                state.items.push_back(item);
                self.item_available.notify_one();
                Ok(())
            }
            Err(e) => Err((item, e)),
        };
        self.unlock(state);
        result
    }

    fn dequeue<E, P>(&self, park: P) -> Result<T, WaitError<E>>
    where
        P: FnMut(&mut MutexGuard<'_, State<T>>) -> Result<(), E>,
    {
        let mut state = self.lock();
        let result = self.wait_for(&mut state, |state| state.items.pop_front(), park);
        if result.is_ok() {
            self.space_available.notify_one();
        }
        self.unlock(state);
        result
    }

    /// Runs `attempt` until it succeeds, parking between tries.
    ///
    /// The attempt is re-run after every wakeup, spurious or not, and once more after `park`
    /// gives up. A successful attempt wins over an interrupt, an interrupt wins over an expired
    /// park.
    fn wait_for<R, E, A, P>(
        &self,
        state: &mut MutexGuard<'_, State<T>>,
        mut attempt: A,
        mut park: P,
    ) -> Result<R, WaitError<E>>
    where
        A: FnMut(&mut State<T>) -> Option<R>,
        P: FnMut(&mut MutexGuard<'_, State<T>>) -> Result<(), E>,
    {
        let epoch = state.interrupt_epoch;
        let mut expired = None;
        loop {
            if let Some(done) = attempt(&mut **state) {
                return Ok(done);
            }
            if state.interrupt_epoch != epoch {
                warn!(capacity = self.capacity, "blocked queue operation interrupted");
                return Err(WaitError::Interrupted);
            }
            if let Some(e) = expired.take() {
                trace!(capacity = self.capacity, "queue wait timed out");
                return Err(WaitError::Expired(e));
            }
            if let Err(e) = park(&mut *state) {
                expired = Some(e);
            }
        }
    }

    /// Parks on `condition` until notified, the deadline stays fixed across wakeups.
    fn park_until(
        &self,
        condition: &Condvar,
        state: &mut MutexGuard<'_, State<T>>,
        deadline: Instant,
    ) -> Result<(), TimedOut> {
        if condition.wait_until(state, deadline).timed_out() {
            return Err(TimedOut);
        }
        Ok(())
    }

    fn park(
        &self,
        condition: &Condvar,
        state: &mut MutexGuard<'_, State<T>>,
    ) -> Result<(), Infallible> {
        condition.wait(state);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        for _ in 0..self.spin_tries {
            if let Some(state) = self.state.try_lock() {
                return state;
            }
            std::hint::spin_loop();
        }
        self.state.lock()
    }

    #[inline]
    fn unlock(&self, state: MutexGuard<'_, State<T>>) {
        if self.fair {
            MutexGuard::unlock_fair(state);
        } else {
            drop(state);
        }
    }
}

impl<T> fmt::Debug for BoundedBlockingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedBlockingQueue")
            .field("capacity", &self.capacity)
            .field("fair", &self.fair)
            .field("spin_tries", &self.spin_tries)
            .finish()
    }
}
