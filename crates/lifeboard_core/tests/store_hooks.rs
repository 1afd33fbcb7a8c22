use chrono::NaiveDate;
use lifeboard_core::auth::ensure_user;
use lifeboard_core::model::recurrence::{Frequency, Recurrence};
use lifeboard_core::open_db_in_memory;
use lifeboard_core::store::{NotificationLog, RemoteCollection, RemoteError, SqliteRemote};
use lifeboard_core::validation::TaskInput;
use lifeboard_core::{ChangeEvent, ChangeFeed, EventLoop, StoreError, Task, TaskStore, UserId};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use uuid::Uuid;

#[derive(Default)]
struct FakeRemote {
    rows: RefCell<Vec<Task>>,
    failing: Cell<bool>,
    fetches: Cell<usize>,
}

impl FakeRemote {
    fn check(&self) -> Result<(), RemoteError> {
        if self.failing.get() {
            Err(RemoteError::new("network unreachable"))
        } else {
            Ok(())
        }
    }
}

impl RemoteCollection<Task> for FakeRemote {
    fn fetch_all(&self, user_id: UserId) -> Result<Vec<Task>, RemoteError> {
        self.fetches.set(self.fetches.get() + 1);
        self.check()?;
        Ok(self
            .rows
            .borrow()
            .iter()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .collect())
    }

    fn insert(&self, record: &Task) -> Result<Task, RemoteError> {
        self.check()?;
        self.rows.borrow_mut().insert(0, record.clone());
        Ok(record.clone())
    }

    fn update(&self, record: &Task) -> Result<Task, RemoteError> {
        self.check()?;
        let mut rows = self.rows.borrow_mut();
        let row = rows
            .iter_mut()
            .find(|task| task.id == record.id)
            .ok_or_else(|| RemoteError::new("not found"))?;
        *row = record.clone();
        Ok(record.clone())
    }

    fn delete(&self, _user_id: UserId, id: Uuid) -> Result<(), RemoteError> {
        self.check()?;
        self.rows.borrow_mut().retain(|task| task.id != id);
        Ok(())
    }
}

struct Harness {
    event_loop: Rc<EventLoop>,
    feed: ChangeFeed<Task>,
    remote: Rc<FakeRemote>,
    notifications: Rc<NotificationLog>,
    user_id: UserId,
}

fn harness() -> Harness {
    let event_loop = Rc::new(EventLoop::new());
    let user_id = Uuid::new_v4();
    let remote = Rc::new(FakeRemote::default());
    let mut finished = Task::new(user_id, "Task 2", 1_000);
    finished.set_completed(true);
    remote
        .rows
        .borrow_mut()
        .extend([Task::new(user_id, "Task 1", 2_000), finished]);
    Harness {
        feed: ChangeFeed::new(Rc::clone(&event_loop)),
        event_loop,
        remote,
        notifications: Rc::new(NotificationLog::new()),
        user_id,
    }
}

impl Harness {
    fn mount(&self) -> TaskStore {
        TaskStore::mount(
            &self.event_loop,
            self.remote.clone(),
            &self.feed,
            self.notifications.clone(),
            self.user_id,
        )
    }
}

fn titles(store: &TaskStore) -> Vec<String> {
    store.records().into_iter().map(|task| task.title).collect()
}

#[test]
fn loads_on_the_next_turn() {
    let h = harness();
    let store = h.mount();

    assert!(store.loading());
    assert!(store.is_empty());

    h.event_loop.run_until_idle();
    assert!(!store.loading());
    assert_eq!(store.error(), None);
    assert_eq!(store.records(), *h.remote.rows.borrow());
    assert!(!store.records()[0].is_completed);
    assert!(store.records()[1].is_completed);
}

#[test]
fn failed_load_records_error_and_notifies() {
    let h = harness();
    h.remote.failing.set(true);
    let store = h.mount();
    h.event_loop.run_until_idle();

    assert!(!store.loading());
    assert_eq!(store.error().as_deref(), Some("network unreachable"));
    assert_eq!(
        h.notifications.errors(),
        vec!["Failed to load tasks: network unreachable".to_string()]
    );

    h.remote.failing.set(false);
    store.refetch().unwrap();
    assert_eq!(store.error(), None);
    assert_eq!(store.len(), 2);
}

#[test]
fn add_prepends_and_confirms() {
    let h = harness();
    let store = h.mount();
    h.event_loop.run_until_idle();

    let task = store.add(TaskInput::titled("Task 3")).unwrap();
    assert_eq!(task.user_id, h.user_id);
    assert_eq!(titles(&store), vec!["Task 3", "Task 1", "Task 2"]);
    assert_eq!(h.remote.rows.borrow().len(), 3);
}

#[test]
fn invalid_input_is_rejected_locally() {
    let h = harness();
    let store = h.mount();
    h.event_loop.run_until_idle();

    let err = store.add(TaskInput::titled("   ")).unwrap_err();
    assert!(matches!(err, StoreError::Validation(ref errors) if errors.has_field("title")));
    assert_eq!(store.len(), 2);
    assert!(h.notifications.entries().is_empty());
}

#[test]
fn failed_mutation_notifies_and_keeps_local_change() {
    let h = harness();
    let store = h.mount();
    h.event_loop.run_until_idle();
    let first = store.records()[0].clone();

    h.remote.failing.set(true);
    let err = store.update(first.id, TaskInput::titled("Renamed")).unwrap_err();
    assert!(matches!(err, StoreError::Remote(_)));
    assert_eq!(store.get(first.id).unwrap().title, "Renamed");
    assert_eq!(
        h.notifications.errors(),
        vec!["Failed to update task: network unreachable".to_string()]
    );

    assert!(store.delete(first.id).is_err());
    assert!(store.get(first.id).is_none());

    h.remote.failing.set(false);
    store.refetch().unwrap();
    assert_eq!(store.get(first.id).unwrap().title, "Task 1");
}

#[test]
fn toggle_flips_completion() {
    let h = harness();
    let store = h.mount();
    h.event_loop.run_until_idle();
    let id = store.records()[1].id;

    assert!(!store.toggle(id).unwrap().is_completed);
    assert!(store.toggle(id).unwrap().is_completed);
    assert!(matches!(store.toggle(Uuid::new_v4()), Err(StoreError::NotFound(_))));
}

#[test]
fn realtime_events_are_folded_in() {
    let h = harness();
    let store = h.mount();
    h.event_loop.run_until_idle();

    let incoming = Task::new(h.user_id, "From another tab", 3_000);
    h.feed.publish(h.user_id, ChangeEvent::Insert(incoming.clone()));
    h.feed.publish(h.user_id, ChangeEvent::Insert(incoming.clone()));
    h.feed
        .publish(Uuid::new_v4(), ChangeEvent::Insert(Task::new(Uuid::new_v4(), "Stranger", 0)));
    assert_eq!(store.len(), 2);

    h.event_loop.run_until_idle();
    assert_eq!(titles(&store), vec!["From another tab", "Task 1", "Task 2"]);

    let mut renamed = incoming.clone();
    renamed.title = "Edited elsewhere".to_string();
    h.feed.publish(h.user_id, ChangeEvent::Update(renamed));
    h.feed.publish(h.user_id, ChangeEvent::Delete(store.records()[2].id));
    h.event_loop.run_until_idle();
    assert_eq!(titles(&store), vec!["Edited elsewhere", "Task 1"]);
}

#[test]
fn dropping_the_store_discards_the_fetch_and_unsubscribes() {
    let h = harness();
    let store = h.mount();
    assert_eq!(h.feed.subscriber_count(h.user_id), 1);

    drop(store);
    assert_eq!(h.feed.subscriber_count(h.user_id), 0);
    h.event_loop.run_until_idle();
    assert_eq!(h.remote.fetches.get(), 0);
}

#[test]
fn completing_a_recurring_task_surfaces_the_next_occurrence() {
    let conn = Rc::new(open_db_in_memory().unwrap());
    let user_id = Uuid::new_v4();
    ensure_user(&conn, user_id, "owner@example.com").unwrap();

    let event_loop = Rc::new(EventLoop::new());
    let feed = ChangeFeed::new(Rc::clone(&event_loop));
    let remote = Rc::new(SqliteRemote::<Task>::new(Rc::clone(&conn)).with_feed(feed.clone()));
    let notifications = Rc::new(NotificationLog::new());
    let store = TaskStore::mount(&event_loop, remote, &feed, notifications.clone(), user_id);
    event_loop.run_until_idle();
    assert!(store.is_empty());

    let mut input = TaskInput::titled("Stretch");
    input.due_date = NaiveDate::from_ymd_opt(2024, 1, 31);
    input.recurrence = Some(Recurrence::new(Frequency::Monthly, 1));
    let task = store.add(input).unwrap();

    store.toggle(task.id).unwrap();
    event_loop.run_until_idle();

    let records = store.records();
    assert_eq!(records.len(), 2);
    let next = records.iter().find(|t| t.id != task.id).unwrap();
    assert_eq!(next.due_date, NaiveDate::from_ymd_opt(2024, 2, 29));
    assert!(!next.is_completed);
    assert!(store.get(task.id).unwrap().is_completed);
    assert!(notifications.entries().is_empty());
}
