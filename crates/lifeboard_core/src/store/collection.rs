use crate::model::{now_epoch_ms, UserId};
use crate::realtime::{ChangeEvent, ChangeFeed, Subscription};
use crate::runtime::EventLoop;
use crate::store::notify::{Notification, Notifier};
use crate::store::record::{Record, Toggle};
use crate::store::remote::{RemoteCollection, RemoteError};
use crate::store::StoreError;
use log::{debug, warn};
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

struct StoreState<T> {
    records: Vec<T>,
    loading: bool,
    error: Option<String>,
}

impl<T: Record> StoreState<T> {
    fn position(&self, id: Uuid) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    /// Replaces the record with the same id, or prepends it.
    fn upsert(&mut self, record: T) {
        match self.position(record.id()) {
            Some(idx) => self.records[idx] = record,
            None => self.records.insert(0, record),
        }
    }

    fn remove(&mut self, id: Uuid) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id() != id);
        self.records.len() != before
    }

    fn apply_event(&mut self, event: &ChangeEvent<T>) {
        match event {
            ChangeEvent::Insert(record) | ChangeEvent::Update(record) => {
                self.upsert(record.clone());
            }
            ChangeEvent::Delete(id) => {
                self.remove(*id);
            }
        }
    }
}

/// Cached, optimistically mutated collection of one user's records.
pub struct CollectionStore<T: Record> {
    state: Rc<RefCell<StoreState<T>>>,
    remote: Rc<dyn RemoteCollection<T>>,
    notifier: Rc<dyn Notifier>,
    user_id: UserId,
    _subscription: Subscription,
}

impl<T: Record> CollectionStore<T> {
    /// Subscribes to `feed` for `user_id` and queues the initial fetch on
    /// `event_loop`.
    pub fn mount(
        event_loop: &EventLoop,
        remote: Rc<dyn RemoteCollection<T>>,
        feed: &ChangeFeed<T>,
        notifier: Rc<dyn Notifier>,
        user_id: UserId,
    ) -> Self {
        let state = Rc::new(RefCell::new(StoreState {
            records: Vec::new(),
            loading: true,
            error: None,
        }));

        let weak_state = Rc::downgrade(&state);
        let subscription = feed.subscribe(user_id, move |event| {
            if let Some(state) = weak_state.upgrade() {
                state.borrow_mut().apply_event(event);
            }
        });

        let weak_state = Rc::downgrade(&state);
        let fetch_remote = Rc::clone(&remote);
        let fetch_notifier = Rc::clone(&notifier);
        event_loop.post(move || {
            let Some(state) = weak_state.upgrade() else {
                debug!(
                    "event=store_fetch module=store status=discarded record={}",
                    T::LABEL
                );
                return;
            };
            let result = fetch_remote.fetch_all(user_id);
            let mut state = state.borrow_mut();
            state.loading = false;
            match result {
                Ok(records) => {
                    debug!(
                        "event=store_fetch module=store status=ok record={} count={}",
                        T::LABEL,
                        records.len()
                    );
                    state.records = records;
                    state.error = None;
                }
                Err(err) => {
                    warn!(
                        "event=store_fetch module=store status=error record={}",
                        T::LABEL
                    );
                    state.error = Some(err.message().to_string());
                    drop(state);
                    fetch_notifier.notify(Notification::error(format!(
                        "Failed to load {}s: {err}",
                        T::LABEL
                    )));
                }
            }
        });

        Self {
            state,
            remote,
            notifier,
            user_id,
            _subscription: subscription,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// `true` until the initial fetch resolves.
    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Message of the last failed fetch, if any.
    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Snapshot of the cached records in display order.
    pub fn records(&self) -> Vec<T> {
        self.state.borrow().records.clone()
    }

    pub fn get(&self, id: Uuid) -> Option<T> {
        let state = self.state.borrow();
        state.position(id).map(|idx| state.records[idx].clone())
    }

    pub fn len(&self) -> usize {
        self.state.borrow().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().records.is_empty()
    }

    /// Validates, prepends optimistically, then inserts remotely.
    pub fn add(&self, input: T::Input) -> Result<T, StoreError> {
        T::validate_input(&input)?;
        let record = T::build(input, self.user_id, now_epoch_ms());
        self.state.borrow_mut().upsert(record.clone());

        match self.remote.insert(&record) {
            Ok(canonical) => {
                self.state.borrow_mut().upsert(canonical.clone());
                Ok(canonical)
            }
            Err(err) => Err(self.fail("create", err)),
        }
    }

    /// Validates and replaces the editable fields of one cached record.
    pub fn update(&self, id: Uuid, input: T::Input) -> Result<T, StoreError> {
        T::validate_input(&input)?;
        self.modify(id, |record| record.apply(input, now_epoch_ms()))
    }

    /// Applies `change` to one cached record, then saves it remotely.
    pub fn modify(&self, id: Uuid, change: impl FnOnce(&mut T)) -> Result<T, StoreError> {
        let mut record = self.get(id).ok_or(StoreError::NotFound(id))?;
        change(&mut record);
        self.state.borrow_mut().upsert(record.clone());

        match self.remote.update(&record) {
            Ok(canonical) => {
                self.state.borrow_mut().upsert(canonical.clone());
                Ok(canonical)
            }
            Err(err) => Err(self.fail("update", err)),
        }
    }

    /// Removes one record locally, then deletes it remotely.
    pub fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        if !self.state.borrow_mut().remove(id) {
            return Err(StoreError::NotFound(id));
        }
        self.remote
            .delete(self.user_id, id)
            .map_err(|err| self.fail("delete", err))
    }

    /// Replaces the cache with the remote collection.
    pub fn refetch(&self) -> Result<(), StoreError> {
        match self.remote.fetch_all(self.user_id) {
            Ok(records) => {
                let mut state = self.state.borrow_mut();
                state.records = records;
                state.loading = false;
                state.error = None;
                Ok(())
            }
            Err(err) => {
                {
                    let mut state = self.state.borrow_mut();
                    state.loading = false;
                    state.error = Some(err.message().to_string());
                }
                Err(self.fail("load", err))
            }
        }
    }

    fn fail(&self, action: &str, err: RemoteError) -> StoreError {
        warn!(
            "event=store_mutation module=store status=error action={action} record={}",
            T::LABEL
        );
        self.notifier.notify(Notification::error(format!(
            "Failed to {action} {}: {err}",
            T::LABEL
        )));
        StoreError::Remote(err)
    }
}

impl<T: Toggle> CollectionStore<T> {
    /// Flips the done state of one record.
    pub fn toggle(&self, id: Uuid) -> Result<T, StoreError> {
        self.modify(id, |record| record.toggle(now_epoch_ms()))
    }
}
