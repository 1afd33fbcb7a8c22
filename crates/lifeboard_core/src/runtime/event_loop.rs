//! Cooperative event loop with a virtual millisecond clock.
//!
//! The host drives time explicitly (`advance_to`/`advance_by`), which keeps
//! timer behavior deterministic for both embedding and tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};

type Task = Box<dyn FnOnce()>;

/// Handle for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Timer scheduling seam used by debounced components.
pub trait TimerHost {
    /// Current loop time in milliseconds.
    fn now_ms(&self) -> u64;
    /// Schedules `task` to run once after `delay_ms`.
    fn set_timeout(&self, delay_ms: u64, task: Box<dyn FnOnce()>) -> TimerId;
    /// Cancels a pending timer. Returns `false` when it already ran or was
    /// cancelled.
    fn clear_timeout(&self, id: TimerId) -> bool;
}

#[derive(Default)]
struct LoopState {
    now_ms: u64,
    next_seq: u64,
    ready: VecDeque<Task>,
    timers: BTreeMap<(u64, u64), Task>,
    due_by_seq: HashMap<u64, u64>,
}

/// Single-threaded task and timer queue.
#[derive(Default)]
pub struct EventLoop {
    state: RefCell<LoopState>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `task` for the next turn.
    pub fn post(&self, task: impl FnOnce() + 'static) {
        self.state.borrow_mut().ready.push_back(Box::new(task));
    }

    /// Number of queued, not yet run, tasks.
    pub fn pending_tasks(&self) -> usize {
        self.state.borrow().ready.len()
    }

    /// Number of scheduled, not yet fired, timers.
    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Runs queued tasks, including ones they post, until the queue is empty.
    ///
    /// Does not advance the clock. Returns the number of tasks run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.state.borrow_mut().ready.pop_front();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// Advances the clock to `target_ms`, firing due timers in order and
    /// draining posted tasks after each one.
    pub fn advance_to(&self, target_ms: u64) {
        self.run_until_idle();
        while let Some(task) = self.pop_due_timer(target_ms) {
            task();
            self.run_until_idle();
        }

        let mut state = self.state.borrow_mut();
        if target_ms > state.now_ms {
            state.now_ms = target_ms;
        }
    }

    /// Advances the clock by `delta_ms`.
    pub fn advance_by(&self, delta_ms: u64) {
        let target = self.now_ms().saturating_add(delta_ms);
        self.advance_to(target);
    }

    fn pop_due_timer(&self, target_ms: u64) -> Option<Task> {
        let mut state = self.state.borrow_mut();
        let (due, seq) = *state.timers.keys().next()?;
        if due > target_ms {
            return None;
        }
        let task = state.timers.remove(&(due, seq))?;
        state.due_by_seq.remove(&seq);
        if due > state.now_ms {
            state.now_ms = due;
        }
        Some(task)
    }
}

impl TimerHost for EventLoop {
    fn now_ms(&self) -> u64 {
        self.state.borrow().now_ms
    }

    fn set_timeout(&self, delay_ms: u64, task: Box<dyn FnOnce()>) -> TimerId {
        let mut state = self.state.borrow_mut();
        let seq = state.next_seq;
        state.next_seq += 1;
        let due = state.now_ms.saturating_add(delay_ms);
        state.timers.insert((due, seq), task);
        state.due_by_seq.insert(seq, due);
        TimerId(seq)
    }

    fn clear_timeout(&self, id: TimerId) -> bool {
        let mut state = self.state.borrow_mut();
        match state.due_by_seq.remove(&id.0) {
            Some(due) => state.timers.remove(&(due, id.0)).is_some(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EventLoop, TimerHost};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn posted_tasks_run_in_order_including_nested_posts() {
        let event_loop = Rc::new(EventLoop::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_loop = Rc::clone(&event_loop);
        let inner_log = Rc::clone(&log);
        event_loop.post(move || {
            inner_log.borrow_mut().push("first");
            let nested_log = Rc::clone(&inner_log);
            inner_loop.post(move || nested_log.borrow_mut().push("nested"));
        });
        let second_log = Rc::clone(&log);
        event_loop.post(move || second_log.borrow_mut().push("second"));

        assert_eq!(event_loop.run_until_idle(), 3);
        assert_eq!(*log.borrow(), vec!["first", "second", "nested"]);
    }

    #[test]
    fn timers_fire_in_due_order_and_set_the_clock() {
        let event_loop = EventLoop::new();
        let fired = Rc::new(RefCell::new(Vec::new()));

        for (delay, label) in [(30, "c"), (10, "a"), (10, "b")] {
            let fired = Rc::clone(&fired);
            event_loop.set_timeout(delay, Box::new(move || fired.borrow_mut().push(label)));
        }

        event_loop.advance_to(10);
        assert_eq!(*fired.borrow(), vec!["a", "b"]);
        assert_eq!(event_loop.now_ms(), 10);

        event_loop.advance_by(100);
        assert_eq!(*fired.borrow(), vec!["a", "b", "c"]);
        assert_eq!(event_loop.now_ms(), 110);
        assert_eq!(event_loop.pending_timers(), 0);
    }

    #[test]
    fn cleared_timer_never_fires() {
        let event_loop = EventLoop::new();
        let fired = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&fired);
        let id = event_loop.set_timeout(5, Box::new(move || *flag.borrow_mut() = true));

        assert!(event_loop.clear_timeout(id));
        assert!(!event_loop.clear_timeout(id));
        event_loop.advance_by(10);
        assert!(!*fired.borrow());
    }
}
