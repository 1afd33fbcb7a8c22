use chrono::NaiveDate;
use lifeboard_api::{Api, MultipartForm, RequestContext};
use lifeboard_core::assistant::{ChatMessage, ChatRequest};
use lifeboard_core::model::recurrence::{Frequency, Recurrence};
use lifeboard_core::repo::journal_repo::JournalListQuery;
use lifeboard_core::repo::task_repo::TaskListQuery;
use lifeboard_core::storage::{list_uploads, FileStore};
use lifeboard_core::validation::{DependencyInput, GoalInput, JournalInput, MilestoneInput, TaskInput};
use lifeboard_core::TaskStatus;
use rusqlite::params;
use uuid::Uuid;

struct Fixture {
    api: Api,
    ctx: RequestContext,
    user_id: Uuid,
    _dir: tempfile::TempDir,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let files = FileStore::new(
        dir.path(),
        "http://localhost/uploads",
        16,
        vec!["image/*".into(), "application/pdf".into()],
    );
    let api = Api::new(lifeboard_core::open_db_in_memory().unwrap(), files);
    let user_id = Uuid::new_v4();
    let token = api.sign_in(user_id, "owner@example.com").into_data().unwrap().token;
    Fixture {
        api,
        ctx: RequestContext::with_token(token),
        user_id,
        _dir: dir,
    }
}

fn other_user(api: &Api) -> RequestContext {
    let token = api
        .sign_in(Uuid::new_v4(), "other@example.com")
        .into_data()
        .unwrap()
        .token;
    RequestContext::with_token(token)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn task_crud_uses_stable_status_codes() {
    let f = fixture();

    let created = f.api.create_task(&f.ctx, TaskInput::titled("Write report"));
    assert_eq!(created.status, 201);
    let task = created.into_data().unwrap();
    assert_eq!(task.user_id, f.user_id);

    let invalid = f.api.create_task(&f.ctx, TaskInput::titled("   "));
    assert_eq!(invalid.status, 400);
    assert!(invalid.issues.iter().any(|issue| issue.field == "title"));

    let mut input = TaskInput::titled("Write final report");
    input.tags = vec!["Work".into(), "work".into()];
    let updated = f.api.update_task(&f.ctx, task.id, input).into_data().unwrap();
    assert_eq!(updated.task.title, "Write final report");
    assert_eq!(updated.task.tags, vec!["work".to_string()]);

    assert_eq!(f.api.get_task(&f.ctx, task.id).status, 200);
    assert_eq!(f.api.delete_task(&f.ctx, task.id).status, 200);
    assert_eq!(f.api.get_task(&f.ctx, task.id).status, 404);
    assert_eq!(f.api.delete_task(&f.ctx, task.id).status, 404);
}

#[test]
fn records_of_other_users_are_not_found() {
    let f = fixture();
    let task = f
        .api
        .create_task(&f.ctx, TaskInput::titled("Private"))
        .into_data()
        .unwrap();
    let stranger = other_user(&f.api);

    assert_eq!(f.api.get_task(&stranger, task.id).status, 404);
    assert_eq!(f.api.toggle_task(&stranger, task.id).status, 404);
    assert_eq!(f.api.delete_task(&stranger, task.id).status, 404);
    let listed = f
        .api
        .list_tasks(&stranger, &TaskListQuery::default())
        .into_data()
        .unwrap();
    assert!(listed.is_empty());
    assert_eq!(f.api.get_task(&f.ctx, task.id).status, 200);
}

#[test]
fn completing_a_recurring_task_returns_the_next_occurrence() {
    let f = fixture();
    let mut input = TaskInput::titled("Water plants");
    input.due_date = Some(date(2024, 3, 1));
    input.recurrence = Some(Recurrence::new(Frequency::Weekly, 1));
    let task = f.api.create_task(&f.ctx, input).into_data().unwrap();

    let change = f.api.toggle_task(&f.ctx, task.id).into_data().unwrap();
    assert!(change.task.is_completed);
    let next = change.next_occurrence.unwrap();
    assert_eq!(next.due_date, Some(date(2024, 3, 8)));
    assert!(!next.is_completed);

    let all = f
        .api
        .list_tasks(&f.ctx, &TaskListQuery::default())
        .into_data()
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn archive_hides_a_task_from_default_listing() {
    let f = fixture();
    let task = f
        .api
        .create_task(&f.ctx, TaskInput::titled("Old idea"))
        .into_data()
        .unwrap();

    let archived = f.api.archive_task(&f.ctx, task.id, true).into_data().unwrap();
    assert!(archived.is_archived);
    let visible = f
        .api
        .list_tasks(&f.ctx, &TaskListQuery::default())
        .into_data()
        .unwrap();
    assert!(visible.is_empty());

    let query = TaskListQuery {
        include_archived: true,
        ..TaskListQuery::default()
    };
    assert_eq!(f.api.list_tasks(&f.ctx, &query).into_data().unwrap().len(), 1);
}

#[test]
fn move_task_changes_column() {
    let f = fixture();
    let task = f
        .api
        .create_task(&f.ctx, TaskInput::titled("Card"))
        .into_data()
        .unwrap();

    let moved = f
        .api
        .move_task(&f.ctx, task.id, TaskStatus::Done, 0)
        .into_data()
        .unwrap();
    let card = moved.iter().find(|t| t.id == task.id).unwrap();
    assert_eq!(card.status, TaskStatus::Done);
    assert!(card.is_completed);

    assert_eq!(f.api.move_task(&f.ctx, Uuid::new_v4(), TaskStatus::Todo, 0).status, 404);
}

#[test]
fn move_task_writes_nothing_when_a_renumbered_card_is_invalid() {
    let f = fixture();
    let conn = f.api.connection();
    let mut ids = Vec::new();
    for (position, title) in ["t0", "t1", "t2"].into_iter().enumerate() {
        let task = f.api.create_task(&f.ctx, TaskInput::titled(title)).into_data().unwrap();
        conn.execute(
            "UPDATE tasks SET position = ?1 WHERE id = ?2;",
            params![position as i64, task.id.to_string()],
        )
        .unwrap();
        ids.push(task.id);
    }
    conn.execute(
        "UPDATE tasks SET title = '' WHERE id = ?1;",
        params![ids[1].to_string()],
    )
    .unwrap();

    let moved = f.api.move_task(&f.ctx, ids[2], TaskStatus::Todo, 0);
    assert_eq!(moved.status, 400);

    let mut stmt = conn
        .prepare("SELECT title, position FROM tasks ORDER BY position ASC;")
        .unwrap();
    let rows: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        rows,
        vec![("t0".to_string(), 0), (String::new(), 1), ("t2".to_string(), 2)]
    );
}

#[test]
fn task_goal_must_belong_to_the_caller() {
    let f = fixture();
    let goal = f
        .api
        .create_goal(&f.ctx, GoalInput::titled("Learn Rust"))
        .into_data()
        .unwrap();
    let stranger = other_user(&f.api);

    let mut borrowed = TaskInput::titled("Borrowed goal");
    borrowed.goal_id = Some(goal.id);
    assert_eq!(f.api.create_task(&stranger, borrowed.clone()).status, 404);

    let theirs = f
        .api
        .create_task(&stranger, TaskInput::titled("Their task"))
        .into_data()
        .unwrap();
    assert_eq!(f.api.update_task(&stranger, theirs.id, borrowed).status, 404);
    assert_eq!(f.api.get_task(&stranger, theirs.id).into_data().unwrap().goal_id, None);

    let mut unknown = TaskInput::titled("Unknown goal");
    unknown.goal_id = Some(Uuid::new_v4());
    let response = f.api.create_task(&f.ctx, unknown);
    assert_eq!(response.status, 404);
    assert!(f
        .api
        .list_tasks(&f.ctx, &TaskListQuery::default())
        .into_data()
        .unwrap()
        .is_empty());

    let mut linked = TaskInput::titled("Read the book");
    linked.goal_id = Some(goal.id);
    let task = f.api.create_task(&f.ctx, linked).into_data().unwrap();
    assert_eq!(task.goal_id, Some(goal.id));
}

#[test]
fn dependency_cycles_are_rejected() {
    let f = fixture();
    let a = f.api.create_task(&f.ctx, TaskInput::titled("A")).into_data().unwrap();
    let b = f.api.create_task(&f.ctx, TaskInput::titled("B")).into_data().unwrap();

    let edge = f.api.create_dependency(
        &f.ctx,
        DependencyInput {
            task_id: b.id,
            depends_on_id: a.id,
        },
    );
    assert_eq!(edge.status, 201);
    let edge = edge.into_data().unwrap();

    let cycle = f.api.create_dependency(
        &f.ctx,
        DependencyInput {
            task_id: a.id,
            depends_on_id: b.id,
        },
    );
    assert_eq!(cycle.status, 400);

    assert_eq!(f.api.task_blockers(&f.ctx, b.id).into_data().unwrap(), vec![a.id]);
    f.api.toggle_task(&f.ctx, a.id);
    assert!(f.api.task_blockers(&f.ctx, b.id).into_data().unwrap().is_empty());

    assert_eq!(f.api.list_dependencies(&f.ctx, Some(a.id)).into_data().unwrap().len(), 1);
    assert_eq!(f.api.delete_dependency(&f.ctx, edge.id).status, 200);
    assert!(f.api.list_dependencies(&f.ctx, None).into_data().unwrap().is_empty());
}

#[test]
fn goal_milestones_drive_progress() {
    let f = fixture();
    let mut input = GoalInput::titled("Run a marathon");
    input.milestones = vec![
        MilestoneInput {
            title: "10k".into(),
            ..MilestoneInput::default()
        },
        MilestoneInput {
            title: "Half".into(),
            ..MilestoneInput::default()
        },
    ];
    let goal = f.api.create_goal(&f.ctx, input);
    assert_eq!(goal.status, 201);
    let goal = goal.into_data().unwrap();
    assert_eq!(goal.progress, 0);

    let first = goal.milestones[0].id;
    let goal = f.api.toggle_milestone(&f.ctx, goal.id, first).into_data().unwrap();
    assert_eq!(goal.progress, 50);

    assert_eq!(f.api.toggle_milestone(&f.ctx, goal.id, Uuid::new_v4()).status, 404);
    assert_eq!(f.api.list_goals(&f.ctx, false).into_data().unwrap().len(), 1);
    assert_eq!(f.api.delete_goal(&f.ctx, goal.id).status, 200);
    assert_eq!(f.api.get_goal(&f.ctx, goal.id).status, 404);
}

#[test]
fn journal_entries_list_newest_first() {
    let f = fixture();
    for day in [1, 3, 2] {
        let response = f
            .api
            .create_journal_entry(&f.ctx, JournalInput::new(date(2024, 5, day), format!("Day {day}")));
        assert_eq!(response.status, 201);
    }
    let empty = f
        .api
        .create_journal_entry(&f.ctx, JournalInput::new(date(2024, 5, 4), ""));
    assert_eq!(empty.status, 400);

    let entries = f
        .api
        .list_journal(&f.ctx, &JournalListQuery::default())
        .into_data()
        .unwrap();
    let days: Vec<_> = entries.iter().map(|entry| entry.entry_date).collect();
    assert_eq!(days, vec![date(2024, 5, 3), date(2024, 5, 2), date(2024, 5, 1)]);

    let updated = f
        .api
        .update_journal_entry(&f.ctx, entries[0].id, JournalInput::new(date(2024, 5, 3), "Edited"))
        .into_data()
        .unwrap();
    assert_eq!(updated.content, "Edited");
    assert_eq!(f.api.delete_journal_entry(&f.ctx, entries[0].id).status, 200);
}

#[test]
fn layout_round_trips_through_defaults() {
    let f = fixture();
    let mut layout = f.api.get_layout(&f.ctx).into_data().unwrap();
    assert!(!layout.is_empty());

    layout[0].is_visible = false;
    let saved = f.api.save_layout(&f.ctx, &layout).into_data().unwrap();
    assert!(!saved[0].is_visible);
    assert!(!f.api.get_layout(&f.ctx).into_data().unwrap()[0].is_visible);

    let reset = f.api.reset_layout(&f.ctx).into_data().unwrap();
    assert!(reset[0].is_visible);
}

#[test]
fn upload_validates_and_records_the_file() {
    let f = fixture();

    let missing = f.api.upload(&f.ctx, MultipartForm::new().with_text("note", "hi"));
    assert_eq!(missing.status, 400);

    let too_big = MultipartForm::new().with_file("file", "big.png", "image/png", vec![1; 64]);
    assert_eq!(f.api.upload(&f.ctx, too_big).status, 400);

    let wrong_type = MultipartForm::new().with_file("file", "a.txt", "text/plain", vec![1; 4]);
    assert_eq!(f.api.upload(&f.ctx, wrong_type).status, 400);

    let form = MultipartForm::new().with_file("file", "cat photo.png", "image/png", vec![7; 8]);
    let stored = f.api.upload(&f.ctx, form);
    assert_eq!(stored.status, 201);
    let stored = stored.into_data().unwrap();
    assert!(stored.public_url.starts_with("http://localhost/uploads/"));
    assert_eq!(stored.size, 8);

    let listed = list_uploads(&f.api.connection(), f.user_id).unwrap();
    assert_eq!(listed, vec![stored]);

    let anonymous = MultipartForm::new().with_file("file", "a.png", "image/png", vec![1]);
    assert_eq!(f.api.upload(&RequestContext::anonymous(), anonymous).status, 401);
}

#[test]
fn upload_removes_the_object_when_indexing_fails() {
    let f = fixture();
    f.api.connection().execute("DROP TABLE uploads;", []).unwrap();

    let form = MultipartForm::new().with_file("file", "scan.pdf", "application/pdf", vec![3; 8]);
    assert_eq!(f.api.upload(&f.ctx, form).status, 500);

    let user_dir = f._dir.path().join(f.user_id.to_string());
    let leftover = std::fs::read_dir(&user_dir)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftover, 0);
}

#[test]
fn chat_validates_and_replies() {
    let f = fixture();
    let reply = f
        .api
        .chat(
            &f.ctx,
            ChatRequest {
                messages: vec![ChatMessage::user("Plan my week")],
                model: None,
            },
        )
        .into_data()
        .unwrap();
    assert!(reply.message.content.contains("Plan my week"));

    let empty = f.api.chat(&f.ctx, ChatRequest::default());
    assert_eq!(empty.status, 400);
}

#[test]
fn dashboard_summary_counts_open_work() {
    let f = fixture();
    let mut overdue = TaskInput::titled("Late");
    overdue.due_date = Some(date(2024, 1, 1));
    f.api.create_task(&f.ctx, overdue);
    let done = f.api.create_task(&f.ctx, TaskInput::titled("Done")).into_data().unwrap();
    f.api.toggle_task(&f.ctx, done.id);

    let summary = f
        .api
        .dashboard_summary(&f.ctx, date(2024, 1, 2))
        .into_data()
        .unwrap();
    assert_eq!(summary.total_tasks, 2);
    assert_eq!(summary.completed_tasks, 1);
    assert_eq!(summary.overdue_tasks, 1);
    assert_eq!(summary.completion_rate, 50);
}
