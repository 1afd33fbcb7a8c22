use crate::model::goal::Goal;
use crate::model::journal::JournalEntry;
use crate::model::task::Task;
use crate::model::UserId;
use crate::validation::{GoalInput, JournalInput, TaskInput, ValidationError};
use uuid::Uuid;

/// Record type a `CollectionStore` can cache and mutate.
pub trait Record: Clone + 'static {
    /// Form input accepted by `add` and `update`.
    type Input;

    /// Lowercase noun used in notifications.
    const LABEL: &'static str;

    fn id(&self) -> Uuid;
    fn validate_input(input: &Self::Input) -> Result<(), ValidationError>;
    fn build(input: Self::Input, user_id: UserId, now_ms: i64) -> Self;
    fn apply(&mut self, input: Self::Input, now_ms: i64);
}

/// Records with a binary done state.
pub trait Toggle: Record {
    fn toggle(&mut self, now_ms: i64);
}

impl Record for Task {
    type Input = TaskInput;
    const LABEL: &'static str = "task";

    fn id(&self) -> Uuid {
        self.id
    }

    fn validate_input(input: &TaskInput) -> Result<(), ValidationError> {
        input.validate()
    }

    fn build(input: TaskInput, user_id: UserId, now_ms: i64) -> Self {
        input.into_task(user_id, now_ms)
    }

    fn apply(&mut self, input: TaskInput, now_ms: i64) {
        input.apply_to(self, now_ms);
    }
}

impl Toggle for Task {
    fn toggle(&mut self, now_ms: i64) {
        self.toggle_completed();
        self.updated_at = now_ms;
    }
}

impl Record for Goal {
    type Input = GoalInput;
    const LABEL: &'static str = "goal";

    fn id(&self) -> Uuid {
        self.id
    }

    fn validate_input(input: &GoalInput) -> Result<(), ValidationError> {
        input.validate()
    }

    fn build(input: GoalInput, user_id: UserId, now_ms: i64) -> Self {
        input.into_goal(user_id, now_ms)
    }

    fn apply(&mut self, input: GoalInput, now_ms: i64) {
        input.apply_to(self, now_ms);
    }
}

impl Toggle for Goal {
    fn toggle(&mut self, now_ms: i64) {
        self.toggle_completed();
        self.updated_at = now_ms;
    }
}

impl Record for JournalEntry {
    type Input = JournalInput;
    const LABEL: &'static str = "journal entry";

    fn id(&self) -> Uuid {
        self.id
    }

    fn validate_input(input: &JournalInput) -> Result<(), ValidationError> {
        input.validate()
    }

    fn build(input: JournalInput, user_id: UserId, now_ms: i64) -> Self {
        input.into_entry(user_id, now_ms)
    }

    fn apply(&mut self, input: JournalInput, now_ms: i64) {
        input.apply_to(self, now_ms);
    }
}
