use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tempfile::TempDir;

use crondeck::db;
use crondeck::db::services::crontab_entry_service::{
    CrontabEntryError, NewCrontabEntry, UpdateCrontabEntry,
};
use crondeck::services::crontab_file::CrontabPublisher;
use crondeck::services::crontab_sync_service::CrontabSyncManager;

async fn setup_db() -> DatabaseConnection {
    // A single connection keeps every query on the same in-memory database.
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1);
    let db = Database::connect(opt).await.expect("connect to sqlite");
    db::init_schema(&db).await.expect("create schema");
    db
}

fn manager(db: &DatabaseConnection, dir: &TempDir) -> CrontabSyncManager {
    CrontabSyncManager::new(
        db.clone(),
        CrontabPublisher::new(dir.path().join("crontab.txt")),
        "/app/logs",
    )
}

fn new_entry(
    name: &str,
    schedule: &str,
    command: &str,
    description: Option<&str>,
) -> NewCrontabEntry {
    NewCrontabEntry {
        name: name.to_string(),
        schedule: schedule.to_string(),
        command: command.to_string(),
        description: description.map(str::to_string),
    }
}

fn update_fields(
    name: &str,
    schedule: &str,
    command: &str,
    description: Option<&str>,
    is_active: bool,
) -> UpdateCrontabEntry {
    UpdateCrontabEntry {
        name: name.to_string(),
        schedule: schedule.to_string(),
        command: command.to_string(),
        description: description.map(str::to_string),
        is_active,
    }
}

fn published(dir: &TempDir) -> String {
    std::fs::read_to_string(dir.path().join("crontab.txt")).expect("read published file")
}

#[tokio::test]
async fn create_publishes_entry_end_to_end() {
    let db = setup_db().await;
    let dir = TempDir::new().unwrap();
    let sync = manager(&db, &dir);

    let outcome = sync
        .create_entry(new_entry(
            "nightly-backup",
            "0 2 * * *",
            "backup.sh",
            Some("nightly"),
        ))
        .await
        .unwrap();
    assert!(outcome.sync_warning.is_none());
    assert!(outcome.value.is_active);

    let content = published(&dir);
    assert!(content.starts_with(
        "SHELL=/bin/sh\nPATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin\n\n"
    ));
    assert!(content.contains("# nightly\n"));
    assert!(content.contains("0 2 * * * backup.sh >> /app/logs/nightly-backup.log 2>&1\n"));
}

#[tokio::test]
async fn duplicate_name_is_rejected_and_store_keeps_one_row() {
    let db = setup_db().await;
    let dir = TempDir::new().unwrap();
    let sync = manager(&db, &dir);

    sync.create_entry(new_entry("daily-report", "0 8 * * *", "report.sh", None))
        .await
        .unwrap();
    let err = sync
        .create_entry(new_entry("daily-report", "0 9 * * *", "other.sh", None))
        .await
        .unwrap_err();

    assert!(matches!(err, CrontabEntryError::DuplicateName(_)));
    let entries = sync.list_entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].command, "report.sh");
}

#[tokio::test]
async fn missing_required_field_is_rejected_before_the_store() {
    let db = setup_db().await;
    let dir = TempDir::new().unwrap();
    let sync = manager(&db, &dir);

    let err = sync
        .create_entry(new_entry("broken", "* * * * *", "   ", None))
        .await
        .unwrap_err();
    assert!(matches!(err, CrontabEntryError::Validation(_)));

    assert!(sync.list_entries().await.unwrap().is_empty());
    // No mutation succeeded, so nothing was published.
    assert!(!dir.path().join("crontab.txt").exists());
}

#[tokio::test]
async fn unsafe_name_is_slugged_in_redirection() {
    let db = setup_db().await;
    let dir = TempDir::new().unwrap();
    let sync = manager(&db, &dir);

    sync.create_entry(new_entry("Weird/Name!!", "* * * * *", "weird.sh", None))
        .await
        .unwrap();

    let content = published(&dir);
    assert!(content.contains(">> /app/logs/weird-name.log 2>&1"));
    assert!(!content.contains("Weird/Name"));
    assert!(!content.contains("!.log"));
}

#[tokio::test]
async fn deactivated_entry_is_listed_but_not_rendered() {
    let db = setup_db().await;
    let dir = TempDir::new().unwrap();
    let sync = manager(&db, &dir);

    let created = sync
        .create_entry(new_entry("cleanup", "0 4 * * *", "cleanup.sh", None))
        .await
        .unwrap();
    assert!(published(&dir).contains("cleanup.sh"));

    let outcome = sync
        .update_entry(
            created.value.id,
            update_fields("cleanup", "0 4 * * *", "cleanup.sh", None, false),
        )
        .await
        .unwrap();
    assert!(!outcome.value.is_active);

    assert!(!published(&dir).contains("cleanup.sh"));
    let entries = sync.list_entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "cleanup");
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let db = setup_db().await;
    let dir = TempDir::new().unwrap();
    let sync = manager(&db, &dir);

    let err = sync
        .update_entry(999, update_fields("x", "* * * * *", "x.sh", None, true))
        .await
        .unwrap_err();
    assert!(matches!(err, CrontabEntryError::NotFound(999)));
}

#[tokio::test]
async fn delete_unknown_id_leaves_store_and_file_untouched() {
    let db = setup_db().await;
    let dir = TempDir::new().unwrap();
    let sync = manager(&db, &dir);

    sync.create_entry(new_entry("keeper", "* * * * *", "keep.sh", None))
        .await
        .unwrap();
    let before = published(&dir);

    let err = sync.delete_entry(12345).await.unwrap_err();
    assert!(matches!(err, CrontabEntryError::NotFound(12345)));

    assert_eq!(sync.list_entries().await.unwrap().len(), 1);
    assert_eq!(published(&dir), before);
}

#[tokio::test]
async fn delete_removes_entry_from_store_and_file() {
    let db = setup_db().await;
    let dir = TempDir::new().unwrap();
    let sync = manager(&db, &dir);

    let created = sync
        .create_entry(new_entry("short-lived", "* * * * *", "tmp.sh", None))
        .await
        .unwrap();
    let outcome = sync.delete_entry(created.value.id).await.unwrap();
    assert!(outcome.sync_warning.is_none());

    assert!(sync.list_entries().await.unwrap().is_empty());
    assert!(!published(&dir).contains("tmp.sh"));
}

#[tokio::test]
async fn rename_onto_existing_name_is_rejected() {
    let db = setup_db().await;
    let dir = TempDir::new().unwrap();
    let sync = manager(&db, &dir);

    sync.create_entry(new_entry("job-a", "* * * * *", "a.sh", None))
        .await
        .unwrap();
    let second = sync
        .create_entry(new_entry("job-b", "* * * * *", "b.sh", None))
        .await
        .unwrap();

    let err = sync
        .update_entry(
            second.value.id,
            update_fields("job-a", "* * * * *", "b.sh", None, true),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CrontabEntryError::DuplicateName(_)));
}

#[tokio::test]
async fn publish_failure_yields_warning_then_self_heals() {
    let db = setup_db().await;
    let dir = TempDir::new().unwrap();
    let target_dir = dir.path().join("cron.d");
    let sync = CrontabSyncManager::new(
        db.clone(),
        CrontabPublisher::new(target_dir.join("crontab.txt")),
        "/app/logs",
    );

    // Parent directory does not exist yet, so publishing fails while the
    // insert itself is durable.
    let outcome = sync
        .create_entry(new_entry("first-job", "* * * * *", "one.sh", None))
        .await
        .unwrap();
    assert!(outcome.sync_warning.is_some());
    assert_eq!(sync.list_entries().await.unwrap().len(), 1);

    std::fs::create_dir_all(&target_dir).unwrap();
    let outcome = sync
        .create_entry(new_entry("second-job", "* * * * *", "two.sh", None))
        .await
        .unwrap();
    assert!(outcome.sync_warning.is_none());

    // The regenerated file reflects the full store, including the entry
    // whose original publish failed.
    let content = std::fs::read_to_string(target_dir.join("crontab.txt")).unwrap();
    assert!(content.contains("one.sh"));
    assert!(content.contains("two.sh"));
}

#[tokio::test]
async fn render_order_is_creation_order_while_list_is_newest_first() {
    let db = setup_db().await;
    let dir = TempDir::new().unwrap();
    let sync = manager(&db, &dir);

    sync.create_entry(new_entry("older", "* * * * *", "older.sh", None))
        .await
        .unwrap();
    sync.create_entry(new_entry("newer", "* * * * *", "newer.sh", None))
        .await
        .unwrap();

    let content = published(&dir);
    assert!(content.find("older.sh").unwrap() < content.find("newer.sh").unwrap());

    let entries = sync.list_entries().await.unwrap();
    assert_eq!(entries[0].name, "newer");
    assert_eq!(entries[1].name, "older");
}
