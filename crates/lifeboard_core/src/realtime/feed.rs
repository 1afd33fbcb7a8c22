use crate::model::UserId;
use crate::runtime::EventLoop;
use log::debug;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// One change pushed through the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent<T> {
    Insert(T),
    Update(T),
    Delete(Uuid),
}

impl<T> ChangeEvent<T> {
    /// Stable label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
        }
    }
}

type Callback<T> = Rc<dyn Fn(&ChangeEvent<T>)>;

struct Subscriber<T> {
    user_id: UserId,
    callback: Callback<T>,
}

struct FeedInner<T> {
    event_loop: Rc<EventLoop>,
    next_id: Cell<u64>,
    subscribers: RefCell<BTreeMap<u64, Subscriber<T>>>,
}

/// Change channel for one record type. Cloning shares the channel.
pub struct ChangeFeed<T> {
    inner: Rc<FeedInner<T>>,
}

impl<T> Clone for ChangeFeed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> ChangeFeed<T> {
    pub fn new(event_loop: Rc<EventLoop>) -> Self {
        Self {
            inner: Rc::new(FeedInner {
                event_loop,
                next_id: Cell::new(1),
                subscribers: RefCell::new(BTreeMap::new()),
            }),
        }
    }

    /// Registers `on_change` for changes of `user_id`.
    ///
    /// The callback stays registered until the returned guard is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(
        &self,
        user_id: UserId,
        on_change: impl Fn(&ChangeEvent<T>) + 'static,
    ) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.subscribers.borrow_mut().insert(
            id,
            Subscriber {
                user_id,
                callback: Rc::new(on_change),
            },
        );

        let weak: Weak<FeedInner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.subscribers.borrow_mut().remove(&id);
            }
        })
    }

    /// Queues `event` for every current subscriber of `user_id`.
    pub fn publish(&self, user_id: UserId, event: ChangeEvent<T>) {
        let targets: Vec<u64> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .filter(|(_, subscriber)| subscriber.user_id == user_id)
            .map(|(id, _)| *id)
            .collect();
        debug!(
            "event=realtime_publish module=realtime status=queued kind={} subscribers={}",
            event.kind(),
            targets.len()
        );
        if targets.is_empty() {
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        self.inner.event_loop.post(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            for id in targets {
                // Looked up per delivery so an unsubscribe made by an earlier
                // callback in this batch is honored.
                let callback = inner
                    .subscribers
                    .borrow()
                    .get(&id)
                    .map(|subscriber| Rc::clone(&subscriber.callback));
                if let Some(callback) = callback {
                    callback(&event);
                }
            }
        });
    }

    /// Number of live subscriptions for `user_id`.
    pub fn subscriber_count(&self, user_id: UserId) -> usize {
        self.inner
            .subscribers
            .borrow()
            .values()
            .filter(|subscriber| subscriber.user_id == user_id)
            .count()
    }
}

/// Guard returned by `subscribe`; unsubscribes on drop.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Unsubscribes now instead of at drop.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeEvent, ChangeFeed};
    use crate::runtime::EventLoop;
    use std::cell::RefCell;
    use std::rc::Rc;
    use uuid::Uuid;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&ChangeEvent<String>) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let callback = move |event: &ChangeEvent<String>| {
            let label = match event {
                ChangeEvent::Insert(value) => format!("insert:{value}"),
                ChangeEvent::Update(value) => format!("update:{value}"),
                ChangeEvent::Delete(id) => format!("delete:{id}"),
            };
            sink.borrow_mut().push(label);
        };
        (seen, callback)
    }

    #[test]
    fn delivers_on_next_turn_to_matching_user_only() {
        let event_loop = Rc::new(EventLoop::new());
        let feed: ChangeFeed<String> = ChangeFeed::new(Rc::clone(&event_loop));
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let (alice_seen, alice_cb) = recorder();
        let (bob_seen, bob_cb) = recorder();
        let _a = feed.subscribe(alice, alice_cb);
        let _b = feed.subscribe(bob, bob_cb);

        feed.publish(alice, ChangeEvent::Insert("milk".to_string()));
        assert!(alice_seen.borrow().is_empty());

        event_loop.run_until_idle();
        assert_eq!(*alice_seen.borrow(), vec!["insert:milk"]);
        assert!(bob_seen.borrow().is_empty());
    }

    #[test]
    fn queued_event_is_dropped_after_unsubscribe() {
        let event_loop = Rc::new(EventLoop::new());
        let feed: ChangeFeed<String> = ChangeFeed::new(Rc::clone(&event_loop));
        let user = Uuid::new_v4();
        let (seen, callback) = recorder();
        let subscription = feed.subscribe(user, callback);

        feed.publish(user, ChangeEvent::Update("eggs".to_string()));
        drop(subscription);
        assert_eq!(feed.subscriber_count(user), 0);

        event_loop.run_until_idle();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn late_subscriber_misses_earlier_publish() {
        let event_loop = Rc::new(EventLoop::new());
        let feed: ChangeFeed<String> = ChangeFeed::new(Rc::clone(&event_loop));
        let user = Uuid::new_v4();
        let (first_seen, first_cb) = recorder();
        let _first = feed.subscribe(user, first_cb);
        feed.publish(user, ChangeEvent::Insert("bread".to_string()));

        let (late_seen, late_cb) = recorder();
        let _late = feed.subscribe(user, late_cb);
        event_loop.run_until_idle();

        assert_eq!(first_seen.borrow().len(), 1);
        assert!(late_seen.borrow().is_empty());
    }
}
