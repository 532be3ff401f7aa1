//! Single-threaded cooperative event loop with a virtual clock.
//!
//! Everything the orchestrator does happens on this loop: spawned local tasks, one-shot timers and
//! animation-frame callbacks. Time only moves when the host calls [`Runtime::advance`], so every
//! interleaving is reproducible.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use futures::FutureExt as _;
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::{AbortHandle, abortable};
use futures::task::LocalSpawnExt as _;

/// Interval between animation frames while [`Runtime::advance`] moves the clock.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Handle for a pending [`RuntimeHandle::set_timeout`] callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

enum TimerEntry {
    Callback(Box<dyn FnOnce()>),
    Wake(Waker),
}

#[derive(Default)]
struct Clock {
    now: Duration,
    seq: u64,
    frame: u64,
    timers: BTreeMap<(Duration, u64), TimerEntry>,
    deadlines: HashMap<u64, Duration>,
    frame_waiters: Vec<Waker>,
}

impl Clock {
    fn insert(&mut self, deadline: Duration, entry: TimerEntry) -> u64 {
        let seq = self.seq;
        self.seq += 1;
        self.timers.insert((deadline, seq), entry);
        self.deadlines.insert(seq, deadline);
        seq
    }

    fn remove(&mut self, seq: u64) -> Option<TimerEntry> {
        let deadline = self.deadlines.remove(&seq)?;
        self.timers.remove(&(deadline, seq))
    }

    fn pop_due(&mut self, until: Duration) -> Option<(Duration, TimerEntry)> {
        let (&(deadline, seq), _) = self.timers.first_key_value()?;
        if deadline > until {
            return None;
        }
        self.deadlines.remove(&seq);
        let entry = self.timers.remove(&(deadline, seq))?;
        Some((deadline, entry))
    }
}

/// Owner of the event loop. Hosts drive it; tasks only ever see a [`RuntimeHandle`].
pub struct Runtime {
    pool: LocalPool,
    handle: RuntimeHandle,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("now", &self.handle.now())
            .field("pending_timers", &self.handle.pending_timers())
            .finish()
    }
}

impl Runtime {
    /// Create an idle loop at time zero.
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let handle = RuntimeHandle {
            clock: Rc::new(RefCell::new(Clock::default())),
            spawner: pool.spawner(),
        };
        Self { pool, handle }
    }

    /// Cloneable handle for spawning tasks and scheduling timers.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Run ready tasks until none can make progress. The clock does not move.
    pub fn run_until_stalled(&mut self) {
        self.pool.run_until_stalled();
    }

    /// Deliver one animation frame without moving the clock.
    pub fn frame(&mut self) {
        let waiters = {
            let mut clock = self.handle.clock.borrow_mut();
            clock.frame += 1;
            std::mem::take(&mut clock.frame_waiters)
        };
        for w in waiters {
            w.wake();
        }
        self.pool.run_until_stalled();
    }

    fn fire_due(&mut self, until: Duration) {
        loop {
            let due = self.handle.clock.borrow_mut().pop_due(until);
            let Some((deadline, entry)) = due else {
                break;
            };
            self.handle.clock.borrow_mut().now = deadline;
            match entry {
                TimerEntry::Callback(cb) => cb(),
                TimerEntry::Wake(w) => w.wake(),
            }
            self.pool.run_until_stalled();
        }
    }

    /// Move the clock forward by `by`, firing timers in deadline order and delivering an
    /// animation frame at every [`FRAME_INTERVAL`] boundary crossed.
    pub fn advance(&mut self, by: Duration) {
        self.pool.run_until_stalled();
        let target = self.handle.now() + by;
        loop {
            let now = self.handle.now();
            let frame_ms = FRAME_INTERVAL.as_millis();
            let next_frame = Duration::from_millis(
                u64::try_from((now.as_millis() / frame_ms + 1) * frame_ms).unwrap_or(u64::MAX),
            );
            let step_end = next_frame.min(target);
            self.fire_due(step_end);
            self.handle.clock.borrow_mut().now = step_end;
            if step_end == next_frame {
                self.frame();
            }
            if step_end >= target {
                break;
            }
        }
        self.pool.run_until_stalled();
    }
}

/// Cheap cloneable access to the loop from inside tasks.
#[derive(Clone)]
pub struct RuntimeHandle {
    clock: Rc<RefCell<Clock>>,
    spawner: LocalSpawner,
}

impl std::fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeHandle")
            .field("now", &self.now())
            .finish_non_exhaustive()
    }
}

impl RuntimeHandle {
    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.clock.borrow().now
    }

    /// Number of animation frames delivered so far.
    pub fn frames(&self) -> u64 {
        self.clock.borrow().frame
    }

    /// Spawn a local task. The returned handle aborts it; aborted tasks are dropped the next time
    /// the loop runs.
    pub fn spawn(&self, fut: impl Future<Output = ()> + 'static) -> AbortHandle {
        let (fut, handle) = abortable(fut);
        if let Err(err) = self.spawner.spawn_local(fut.map(|_| ())) {
            tracing::warn!(%err, "runtime rejected task");
        }
        handle
    }

    /// Run `cb` once after `delay`.
    pub fn set_timeout(&self, delay: Duration, cb: impl FnOnce() + 'static) -> TimerId {
        let mut clock = self.clock.borrow_mut();
        let deadline = clock.now + delay;
        TimerId(clock.insert(deadline, TimerEntry::Callback(Box::new(cb))))
    }

    /// Cancel a pending timeout. Returns `false` when it already fired or was cleared.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        self.clock.borrow_mut().remove(id.0).is_some()
    }

    /// Timers and sleeps still waiting for their deadline.
    pub fn pending_timers(&self) -> usize {
        self.clock.borrow().timers.len()
    }

    /// Future resolving once `delay` has elapsed on the virtual clock.
    pub fn sleep(&self, delay: Duration) -> Sleep {
        Sleep {
            clock: self.clock.clone(),
            deadline: self.now() + delay,
            seq: None,
        }
    }

    /// Future resolving at the next animation frame.
    pub fn next_frame(&self) -> NextFrame {
        NextFrame {
            clock: self.clock.clone(),
            after: self.frames(),
        }
    }
}

/// See [`RuntimeHandle::sleep`].
#[must_use = "futures do nothing unless polled"]
pub struct Sleep {
    clock: Rc<RefCell<Clock>>,
    deadline: Duration,
    seq: Option<u64>,
}

impl Future for Sleep {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let clock = self.clock.clone();
        let mut clock = clock.borrow_mut();
        if let Some(seq) = self.seq.take() {
            clock.remove(seq);
        }
        if clock.now >= self.deadline {
            return Poll::Ready(());
        }
        let seq = clock.insert(self.deadline, TimerEntry::Wake(cx.waker().clone()));
        self.seq = Some(seq);
        Poll::Pending
    }
}

impl Drop for Sleep {
    fn drop(&mut self) {
        if let Some(seq) = self.seq.take()
            && let Ok(mut clock) = self.clock.try_borrow_mut()
        {
            clock.remove(seq);
        }
    }
}

/// See [`RuntimeHandle::next_frame`].
#[must_use = "futures do nothing unless polled"]
pub struct NextFrame {
    clock: Rc<RefCell<Clock>>,
    after: u64,
}

impl Future for NextFrame {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut clock = self.clock.borrow_mut();
        if clock.frame > self.after {
            return Poll::Ready(());
        }
        clock.frame_waiters.push(cx.waker().clone());
        Poll::Pending
    }
}

#[cfg(test)]
#[path = "../tests/unit/runtime/runtime.rs"]
mod tests;
