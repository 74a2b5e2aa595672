//! Integration tests for directory reconciliation.

mod helpers;

use std::sync::Arc;

use tagspace_core::config::MountConfig;
use tagspace_core::events::{EntryChange, SyncEvent};
use tagspace_storage::MemoryFileSystem;

#[tokio::test]
async fn test_first_sync_indexes_mount() {
    let (app, fs) = helpers::TestApp::with_memory_fs().await;
    fs.add_file("/data/pics/a.jpg", 100, 1000.0);
    fs.add_file("/data/pics/2024/summer/b.jpg", 200, 2000.0);

    let (report, observer) = app.sync().await;

    assert_eq!(report.added, 5);
    assert_eq!(report.changed, 0);
    assert_eq!(report.deleted, 0);
    assert!(!report.has_failures());
    assert_eq!(observer.paths_with(EntryChange::Add).len(), 5);

    let b = app.require("pics/2024/summer/b.jpg").await;
    assert_eq!(b.size, Some(200));
    assert_eq!(b.mtime, Some(2000.0));
    assert!(!b.is_dir);
    assert!(app.require("pics/2024").await.is_dir);
}

#[tokio::test]
async fn test_second_sync_is_idempotent() {
    let (app, fs) = helpers::TestApp::with_memory_fs().await;
    fs.add_file("/data/pics/a.jpg", 100, 1000.0);
    fs.add_file("/data/pics/sub/b.jpg", 1, 1.0);
    fs.add_dir("/data/pics/empty");
    app.sync().await;
    let count = app.ctx.entries.count().await.unwrap();

    let (report, observer) = app.sync().await;

    assert_eq!(report.added, 0);
    assert_eq!(report.deleted, 0);
    assert_eq!(report.changed, report.processed);
    assert!(observer.paths_with(EntryChange::Add).is_empty());
    assert!(observer.paths_with(EntryChange::Delete).is_empty());
    assert_eq!(app.ctx.entries.count().await.unwrap(), count);
    assert!(app.entry("<recycle>").await.is_none());
}

#[tokio::test]
async fn test_metadata_refreshed_on_change() {
    let (app, fs) = helpers::TestApp::with_memory_fs().await;
    fs.add_file("/data/pics/a.jpg", 100, 1000.0);
    app.sync().await;
    let before = app.require("pics/a.jpg").await;

    fs.set_meta("/data/pics/a.jpg", 150, 1500.0).unwrap();
    app.sync().await;

    let after = app.require("pics/a.jpg").await;
    assert_eq!(after.id, before.id);
    assert_eq!(after.size, Some(150));
    assert_eq!(after.mtime, Some(1500.0));
    assert!(after.ctime >= before.ctime);
}

#[tokio::test]
async fn test_mounts_sync_independently() {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.add_file("/data/pics/a.jpg", 1, 1.0);
    fs.add_file("/data/docs/readme.txt", 2, 2.0);
    let app = helpers::TestApp::new(
        vec![
            MountConfig::new("/data/pics", "pics"),
            MountConfig::new("/data/docs", "docs"),
            MountConfig::new("/data/missing", "missing"),
        ],
        fs.clone(),
    )
    .await;

    let (report, _) = app.sync().await;

    assert!(app.entry("pics/a.jpg").await.is_some());
    assert!(app.entry("docs/readme.txt").await.is_some());
    // The missing root gets an entry but neither stat nor listing succeed.
    assert!(app.entry("missing").await.is_some());
    assert_eq!(report.stat_failures, 1);
    assert_eq!(report.dir_failures, 1);
}

#[tokio::test]
async fn test_unreadable_directory_is_isolated() {
    let (app, fs) = helpers::TestApp::with_memory_fs().await;
    fs.add_file("/data/pics/locked/a.jpg", 1, 1.0);
    fs.add_file("/data/pics/open/b.jpg", 1, 1.0);
    app.sync().await;

    fs.fail_read_dir("/data/pics/locked");
    fs.add_file("/data/pics/open/c.jpg", 1, 1.0);
    let (report, observer) = app.sync().await;

    assert_eq!(report.dir_failures, 1);
    assert_eq!(report.deleted, 0);
    assert!(app.entry("pics/locked/a.jpg").await.is_some());
    assert!(app.entry("pics/open/c.jpg").await.is_some());
    assert!(observer
        .events()
        .iter()
        .any(|e| matches!(e, SyncEvent::Failed { path, .. } if path == "/data/pics/locked")));

    // Once readable again, the directory picks up what it missed.
    fs.add_file("/data/pics/locked/d.jpg", 1, 1.0);
    fs.clear_failures();
    let (report, _) = app.sync().await;
    assert!(!report.has_failures());
    assert!(app.entry("pics/locked/d.jpg").await.is_some());
}

#[tokio::test]
async fn test_hidden_files_are_scanned_by_default() {
    let (app, fs) = helpers::TestApp::with_memory_fs().await;
    fs.add_file("/data/pics/.album", 10, 1.0);
    fs.add_file("/data/pics/.cache/x", 10, 1.0);

    app.sync().await;

    assert!(app.entry("pics/.album").await.is_some());
    assert!(app.entry("pics/.cache/x").await.is_some());
}

#[tokio::test]
async fn test_every_stat_is_reported() {
    let (app, fs) = helpers::TestApp::with_memory_fs().await;
    fs.add_file("/data/pics/a.jpg", 10, 1.0);
    fs.add_file("/data/pics/b.jpg", 20, 1.0);

    let (_, observer) = app.sync().await;

    let stats: Vec<(String, u64)> = observer
        .events()
        .into_iter()
        .filter_map(|e| match e {
            SyncEvent::Stat { path, size } => Some((path, size)),
            _ => None,
        })
        .collect();
    assert_eq!(stats.len(), 3);
    assert!(stats.contains(&("/data/pics/b.jpg".to_string(), 20)));
}

#[tokio::test]
async fn test_real_directory_sync() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("2024")).unwrap();
    std::fs::write(dir.path().join("a.jpg"), vec![0u8; 100]).unwrap();
    std::fs::write(dir.path().join("2024/b.jpg"), vec![0u8; 7]).unwrap();
    let app = helpers::TestApp::with_local_fs(dir.path(), "pics").await;

    let (report, _) = app.sync().await;

    assert_eq!(report.added, 4);
    assert!(!report.has_failures());
    let a = app.require("pics/a.jpg").await;
    assert_eq!(a.size, Some(100));
    assert_eq!(app.require("pics/2024/b.jpg").await.size, Some(7));

    std::fs::remove_file(dir.path().join("2024/b.jpg")).unwrap();
    let (report, _) = app.sync().await;
    assert_eq!(report.deleted, 1);
    assert!(app.entry("pics/2024/b.jpg").await.is_none());
}
