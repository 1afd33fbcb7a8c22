use chrono::NaiveDate;
use lifeboard_core::auth::ensure_user;
use lifeboard_core::open_db_in_memory;
use lifeboard_core::repo::goal_repo::SqliteGoalRepository;
use lifeboard_core::repo::journal_repo::{JournalListQuery, SqliteJournalRepository};
use lifeboard_core::repo::layout_repo::{LayoutRepository, SqliteLayoutRepository};
use lifeboard_core::repo::profile_repo::SqliteProfileRepository;
use lifeboard_core::repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
use lifeboard_core::service::{
    DependencyService, GoalService, JournalService, LayoutService, ProfileService, ServiceError,
    TaskService,
};
use lifeboard_core::validation::{DependencyInput, GoalInput, JournalInput, ProfileInput, TaskInput};
use lifeboard_core::{default_layout, RepoError, Task};
use rusqlite::Connection;
use uuid::Uuid;

fn user(conn: &Connection, email: &str) -> Uuid {
    let id = Uuid::new_v4();
    ensure_user(conn, id, email).unwrap();
    id
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn task_rows_are_invisible_to_other_users() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice@example.com");
    let bob = user(&conn, "bob@example.com");
    let repo = SqliteTaskRepository::new(&conn);

    let task = Task::new(alice, "Alice only", 1_000);
    repo.create_task(&task).unwrap();

    assert!(repo.get_task(bob, task.id).unwrap().is_none());
    assert!(repo.list_tasks(bob, &TaskListQuery::default()).unwrap().is_empty());
    assert!(matches!(
        repo.delete_task(bob, task.id),
        Err(RepoError::NotFound(id)) if id == task.id
    ));

    let mut hijacked = task.clone();
    hijacked.user_id = bob;
    hijacked.title = "Stolen".to_string();
    assert!(matches!(repo.update_task(&hijacked), Err(RepoError::NotFound(_))));
    assert_eq!(repo.get_task(alice, task.id).unwrap().unwrap().title, "Alice only");
}

#[test]
fn batch_task_update_is_all_or_nothing() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice@example.com");
    let bob = user(&conn, "bob@example.com");
    let repo = SqliteTaskRepository::new(&conn);

    let mine = Task::new(alice, "Mine", 1_000);
    let theirs = Task::new(bob, "Theirs", 1_000);
    repo.create_task(&mine).unwrap();
    repo.create_task(&theirs).unwrap();

    let mut moved = mine.clone();
    moved.position = 7;
    let mut hijacked = theirs.clone();
    hijacked.user_id = alice;
    assert!(matches!(
        repo.update_tasks(&[moved.clone(), hijacked]),
        Err(RepoError::NotFound(id)) if id == theirs.id
    ));
    assert_eq!(repo.get_task(alice, mine.id).unwrap().unwrap().position, 0);

    repo.update_tasks(&[moved]).unwrap();
    assert_eq!(repo.get_task(alice, mine.id).unwrap().unwrap().position, 7);
}

#[test]
fn task_goal_links_resolve_only_through_the_owner() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice@example.com");
    let bob = user(&conn, "bob@example.com");
    let goal = GoalService::new(SqliteGoalRepository::new(&conn))
        .create_goal(alice, GoalInput::titled("Alice's goal"))
        .unwrap();
    let tasks = TaskService::new(SqliteTaskRepository::new(&conn));

    let mut input = TaskInput::titled("Linked");
    input.goal_id = Some(goal.id);
    assert!(matches!(
        tasks.create_task(bob, input.clone()),
        Err(ServiceError::NotFound(id)) if id == goal.id
    ));
    assert_eq!(tasks.create_task(alice, input).unwrap().goal_id, Some(goal.id));
}

#[test]
fn task_list_is_newest_first_with_pagination() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner@example.com");
    let repo = SqliteTaskRepository::new(&conn);
    for (title, created_at) in [("first", 1_000), ("second", 2_000), ("third", 3_000)] {
        repo.create_task(&Task::new(owner, title, created_at)).unwrap();
    }

    let all = repo.list_tasks(owner, &TaskListQuery::default()).unwrap();
    let titles: Vec<_> = all.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["third", "second", "first"]);

    let page = repo
        .list_tasks(
            owner,
            &TaskListQuery {
                limit: Some(1),
                offset: 1,
                ..TaskListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].title, "second");
}

#[test]
fn task_fields_survive_a_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner@example.com");
    let service = TaskService::new(SqliteTaskRepository::new(&conn));

    let mut input = TaskInput::titled("  Plan trip ");
    input.notes = Some("book flights".into());
    input.tags = vec!["Travel".into(), "fun".into(), "travel".into()];
    input.due_date = Some(date(2024, 7, 1));
    let created = service.create_task(owner, input).unwrap();

    let loaded = service.get_task(owner, created.id).unwrap();
    assert_eq!(loaded.title, "Plan trip");
    assert_eq!(loaded.tags, vec!["fun".to_string(), "travel".to_string()]);
    assert_eq!(loaded.due_date, Some(date(2024, 7, 1)));
    assert_eq!(loaded, created);
}

#[test]
fn invalid_task_input_never_reaches_storage() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner@example.com");
    let service = TaskService::new(SqliteTaskRepository::new(&conn));

    let err = service.create_task(owner, TaskInput::titled("")).unwrap_err();
    match err {
        ServiceError::Validation(errors) => assert!(errors.has_field("title")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.list_tasks(owner, &TaskListQuery::default()).unwrap().is_empty());
}

#[test]
fn goals_are_scoped_and_keep_milestones() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice@example.com");
    let bob = user(&conn, "bob@example.com");
    let service = GoalService::new(SqliteGoalRepository::new(&conn));

    let mut input = GoalInput::titled("Learn Rust");
    input.progress = Some(30);
    let goal = service.create_goal(alice, input).unwrap();
    assert_eq!(goal.progress, 30);

    assert!(matches!(service.get_goal(bob, goal.id), Err(ServiceError::NotFound(_))));
    assert!(matches!(service.delete_goal(bob, goal.id), Err(ServiceError::NotFound(_))));
    assert_eq!(service.list_goals(alice, false).unwrap().len(), 1);

    let done = service.toggle_goal(alice, goal.id).unwrap();
    assert_eq!(done.progress, 100);
}

#[test]
fn journal_range_filter_is_inclusive() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner@example.com");
    let service = JournalService::new(SqliteJournalRepository::new(&conn));
    for day in 1..=5 {
        service
            .create_entry(owner, JournalInput::new(date(2024, 2, day), format!("day {day}")))
            .unwrap();
    }

    let query = JournalListQuery {
        from: Some(date(2024, 2, 2)),
        to: Some(date(2024, 2, 4)),
        ..JournalListQuery::default()
    };
    let days: Vec<_> = service
        .list_entries(owner, &query)
        .unwrap()
        .iter()
        .map(|entry| entry.entry_date)
        .collect();
    assert_eq!(days, vec![date(2024, 2, 4), date(2024, 2, 3), date(2024, 2, 2)]);
}

#[test]
fn dependencies_reject_self_foreign_and_cyclic_edges() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice@example.com");
    let bob = user(&conn, "bob@example.com");
    let tasks = TaskService::new(SqliteTaskRepository::new(&conn));
    let a = tasks.create_task(alice, TaskInput::titled("A")).unwrap();
    let b = tasks.create_task(alice, TaskInput::titled("B")).unwrap();
    let c = tasks.create_task(alice, TaskInput::titled("C")).unwrap();
    let foreign = tasks.create_task(bob, TaskInput::titled("Bob's")).unwrap();

    let deps = DependencyService::new(
        lifeboard_core::repo::dependency_repo::SqliteDependencyRepository::new(&conn),
        SqliteTaskRepository::new(&conn),
    );
    let edge = |task_id, depends_on_id| DependencyInput {
        task_id,
        depends_on_id,
    };

    assert!(matches!(
        deps.create_dependency(alice, edge(a.id, a.id)),
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        deps.create_dependency(alice, edge(a.id, foreign.id)),
        Err(ServiceError::NotFound(id)) if id == foreign.id
    ));

    deps.create_dependency(alice, edge(b.id, a.id)).unwrap();
    deps.create_dependency(alice, edge(c.id, b.id)).unwrap();
    assert!(matches!(
        deps.create_dependency(alice, edge(a.id, c.id)),
        Err(ServiceError::Conflict(_))
    ));
    assert!(matches!(
        deps.create_dependency(alice, edge(b.id, a.id)),
        Err(ServiceError::Conflict(_))
    ));

    tasks.delete_task(alice, b.id).unwrap();
    assert!(deps.list_dependencies(alice, None).unwrap().is_empty());
}

#[test]
fn layout_service_tolerates_corrupt_documents() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner@example.com");
    SqliteLayoutRepository::new(&conn)
        .save_layout(owner, "{ definitely not json", 1_000)
        .unwrap();

    let service = LayoutService::new(SqliteLayoutRepository::new(&conn), default_layout());
    let loaded = service.load(owner).unwrap();
    let ids: Vec<_> = loaded.iter().map(|widget| widget.id.clone()).collect();
    let default_ids: Vec<_> = default_layout().into_iter().map(|widget| widget.id).collect();
    assert_eq!(ids, default_ids);
}

#[test]
fn layout_service_persists_camel_case_overrides() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner@example.com");
    let service = LayoutService::new(SqliteLayoutRepository::new(&conn), default_layout());

    let mut layout = service.load(owner).unwrap();
    layout[1].width = 4;
    layout[1].is_visible = false;
    service.save(owner, &layout).unwrap();

    let raw = SqliteLayoutRepository::new(&conn)
        .load_layout(owner)
        .unwrap()
        .unwrap();
    assert!(raw.contains("\"isVisible\":false"));

    let reloaded = service.load(owner).unwrap();
    assert_eq!(reloaded[1].width, 4);
    assert!(!reloaded[1].is_visible);

    service.reset(owner).unwrap();
    assert!(SqliteLayoutRepository::new(&conn).load_layout(owner).unwrap().is_none());
}

#[test]
fn profile_upsert_replaces_fields() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner@example.com");
    let service = ProfileService::new(SqliteProfileRepository::new(&conn));
    assert!(service.get_profile(owner).unwrap().is_none());

    let input = |name: &str| ProfileInput {
        display_name: name.to_string(),
        avatar_url: None,
        timezone: "Europe/Berlin".to_string(),
        bio: None,
    };
    service.upsert_profile(owner, input("Ada")).unwrap();
    service.upsert_profile(owner, input("Ada L.")).unwrap();

    let profile = service.get_profile(owner).unwrap().unwrap();
    assert_eq!(profile.display_name, "Ada L.");
    assert_eq!(profile.timezone, "Europe/Berlin");
}
