//! Trailing-edge debounce over a `TimerHost`.
//!
//! # Invariants
//! - Every `call` restarts the delay; only the last value is delivered.
//! - At most one timer is pending per debouncer.
//! - Dropping the debouncer cancels the pending timer, if any, exactly once.

use crate::runtime::event_loop::{TimerHost, TimerId};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

struct Shared<V> {
    callback: RefCell<Box<dyn FnMut(V)>>,
    pending: Cell<Option<TimerId>>,
    value: RefCell<Option<V>>,
}

impl<V> Shared<V> {
    fn fire(&self) {
        self.pending.set(None);
        let value = self.value.borrow_mut().take();
        if let Some(value) = value {
            (self.callback.borrow_mut())(value);
        }
    }
}

/// Delivers the last value passed to `call` once `delay_ms` passes without
/// another call.
pub struct Debouncer<V: 'static> {
    host: Rc<dyn TimerHost>,
    delay_ms: u64,
    shared: Rc<Shared<V>>,
}

impl<V: 'static> Debouncer<V> {
    pub fn new(host: Rc<dyn TimerHost>, delay_ms: u64, callback: impl FnMut(V) + 'static) -> Self {
        Self {
            host,
            delay_ms,
            shared: Rc::new(Shared {
                callback: RefCell::new(Box::new(callback)),
                pending: Cell::new(None),
                value: RefCell::new(None),
            }),
        }
    }

    /// Records `value` and restarts the quiet period.
    pub fn call(&self, value: V) {
        self.clear_pending();
        *self.shared.value.borrow_mut() = Some(value);

        let weak = Rc::downgrade(&self.shared);
        let id = self.host.set_timeout(
            self.delay_ms,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.fire();
                }
            }),
        );
        self.shared.pending.set(Some(id));
    }

    /// Delivers a pending value immediately.
    pub fn flush(&self) {
        if self.clear_pending() {
            self.shared.fire();
        }
    }

    /// Drops a pending value without delivering it.
    pub fn cancel(&self) {
        self.clear_pending();
        self.shared.value.borrow_mut().take();
    }

    pub fn is_pending(&self) -> bool {
        self.shared.pending.get().is_some()
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    fn clear_pending(&self) -> bool {
        match self.shared.pending.take() {
            Some(id) => {
                self.host.clear_timeout(id);
                true
            }
            None => false,
        }
    }
}

impl<V: 'static> Drop for Debouncer<V> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::Debouncer;
    use crate::runtime::event_loop::{EventLoop, TimerHost, TimerId};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct CountingHost {
        inner: EventLoop,
        clears: Cell<usize>,
    }

    impl TimerHost for CountingHost {
        fn now_ms(&self) -> u64 {
            self.inner.now_ms()
        }

        fn set_timeout(&self, delay_ms: u64, task: Box<dyn FnOnce()>) -> TimerId {
            self.inner.set_timeout(delay_ms, task)
        }

        fn clear_timeout(&self, id: TimerId) -> bool {
            self.clears.set(self.clears.get() + 1);
            self.inner.clear_timeout(id)
        }
    }

    fn recording_debouncer(
        host: &Rc<CountingHost>,
        delay_ms: u64,
    ) -> (Debouncer<&'static str>, Rc<RefCell<Vec<(&'static str, u64)>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let clock = Rc::clone(host);
        let debouncer = Debouncer::new(
            Rc::clone(host) as Rc<dyn TimerHost>,
            delay_ms,
            move |value| sink.borrow_mut().push((value, clock.now_ms())),
        );
        (debouncer, calls)
    }

    #[test]
    fn only_last_value_fires_after_quiet_period() {
        let host = Rc::new(CountingHost::default());
        let (debouncer, calls) = recording_debouncer(&host, 100);

        for (at, value) in [(0, "A"), (50, "B"), (100, "C"), (150, "D")] {
            host.inner.advance_to(at);
            debouncer.call(value);
        }

        host.inner.advance_to(249);
        assert!(calls.borrow().is_empty());

        host.inner.advance_to(250);
        assert_eq!(*calls.borrow(), vec![("D", 250)]);

        host.inner.advance_to(1_000);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn drop_cancels_pending_timer_exactly_once() {
        let host = Rc::new(CountingHost::default());
        let (debouncer, calls) = recording_debouncer(&host, 100);

        debouncer.call("A");
        drop(debouncer);
        assert_eq!(host.clears.get(), 1);

        host.inner.advance_to(500);
        assert!(calls.borrow().is_empty());
        assert_eq!(host.inner.pending_timers(), 0);
    }

    #[test]
    fn drop_after_fire_does_not_cancel() {
        let host = Rc::new(CountingHost::default());
        let (debouncer, calls) = recording_debouncer(&host, 100);

        debouncer.call("A");
        host.inner.advance_to(100);
        assert!(!debouncer.is_pending());
        drop(debouncer);

        assert_eq!(host.clears.get(), 0);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn flush_delivers_immediately() {
        let host = Rc::new(CountingHost::default());
        let (debouncer, calls) = recording_debouncer(&host, 100);

        debouncer.call("A");
        debouncer.flush();
        assert_eq!(*calls.borrow(), vec![("A", 0)]);
        host.inner.advance_to(200);
        assert_eq!(calls.borrow().len(), 1);
    }
}
