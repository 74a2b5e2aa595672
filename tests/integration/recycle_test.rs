//! Integration tests for the recycle directory.

mod helpers;

use tagspace_core::error::ErrorKind;
use tagspace_core::events::EntryChange;

#[tokio::test]
async fn test_vanished_file_is_recycled_with_tags() {
    let (app, fs) = helpers::TestApp::with_memory_fs().await;
    fs.add_file("/data/pics/a.jpg", 100, 1000.0);
    app.sync().await;
    let a = app.require("pics/a.jpg").await;
    app.tag(a.id, &["holiday"]).await;
    app.ctx
        .entry_service
        .describe(a.id, Some("beach"))
        .await
        .unwrap();

    fs.remove("/data/pics/a.jpg");
    let (report, observer) = app.sync().await;

    assert_eq!(report.deleted, 1);
    assert_eq!(
        observer.paths_with(EntryChange::Delete),
        vec!["/data/pics/a.jpg".to_string()]
    );
    assert!(app.entry("pics/a.jpg").await.is_none());
    assert_eq!(app.path_of(a.id).await, "<recycle>/aaaaaa/a.jpg");

    let recycled = app.ctx.entry_service.get(a.id).await.unwrap();
    assert_eq!(recycled.description.as_deref(), Some("beach"));
    assert_eq!(app.tag_names(a.id).await, vec!["holiday"]);
}

#[tokio::test]
async fn test_vanished_directory_keeps_subtree() {
    let (app, fs) = helpers::TestApp::with_memory_fs().await;
    fs.add_file("/data/pics/2024/summer/b.jpg", 1, 1.0);
    fs.add_file("/data/pics/2024/c.jpg", 1, 1.0);
    app.sync().await;
    let b = app.require("pics/2024/summer/b.jpg").await;

    fs.remove("/data/pics/2024");
    let (report, _) = app.sync().await;

    // Only the top of the vanished subtree is moved.
    assert_eq!(report.deleted, 1);
    assert_eq!(app.path_of(b.id).await, "<recycle>/aaaaaa/2024/summer/b.jpg");
    assert!(app.entry("<recycle>/aaaaaa/2024/c.jpg").await.is_some());
}

#[tokio::test]
async fn test_successive_deletions_get_distinct_containers() {
    let (app, fs) = helpers::TestApp::with_memory_fs().await;
    fs.add_file("/data/pics/a.jpg", 1, 1.0);
    fs.add_file("/data/pics/b.jpg", 2, 2.0);
    fs.add_file("/data/pics/c.jpg", 3, 3.0);
    app.sync().await;

    fs.remove("/data/pics/a.jpg");
    fs.remove("/data/pics/b.jpg");
    app.sync().await;
    fs.remove("/data/pics/c.jpg");
    app.sync().await;

    let slots = app.ctx.recycler.list_slots().await.unwrap();
    let names: Vec<&str> = slots.iter().map(|s| s.slot.name.as_str()).collect();
    assert_eq!(names, vec!["aaaaaa", "aaaaab", "aaaaac"]);
    // Stale children are recycled in name order.
    assert_eq!(slots[0].contents[0].name, "a.jpg");
    assert_eq!(slots[1].contents[0].name, "b.jpg");
    assert_eq!(slots[2].contents[0].name, "c.jpg");
}

#[tokio::test]
async fn test_recycle_directory_is_not_scanned_as_mount() {
    let (app, fs) = helpers::TestApp::with_memory_fs().await;
    fs.add_file("/data/pics/a.jpg", 1, 1.0);
    app.sync().await;
    fs.remove("/data/pics/a.jpg");
    app.sync().await;

    let (report, _) = app.sync().await;

    assert_eq!(report.deleted, 0);
    assert!(app.entry("<recycle>/aaaaaa/a.jpg").await.is_some());
    assert!(app.entry("<recycle>/aaaaab").await.is_none());
}

#[tokio::test]
async fn test_restore_recycled_entry() {
    let (app, fs) = helpers::TestApp::with_memory_fs().await;
    fs.add_file("/data/pics/a.jpg", 1, 1.0);
    app.sync().await;
    let pics = app.require("pics").await;
    let a = app.require("pics/a.jpg").await;
    fs.remove("/data/pics/a.jpg");
    app.sync().await;

    let restored = app
        .ctx
        .entry_service
        .restore(a.id, Some(pics.id), Some("restored.jpg"))
        .await
        .unwrap();

    assert_eq!(restored.id, a.id);
    assert_eq!(app.path_of(a.id).await, "pics/restored.jpg");

    let err = app
        .ctx
        .entry_service
        .restore(a.id, Some(pics.id), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_recycled_file_reappearing_recovers_metadata() {
    let (app, fs) = helpers::TestApp::with_memory_fs().await;
    let ino = fs.add_file("/data/pics/a.jpg", 100, 1000.0);
    app.sync().await;
    let old = app.require("pics/a.jpg").await;
    app.tag(old.id, &["keep"]).await;
    app.ctx
        .entry_service
        .describe(old.id, Some("original"))
        .await
        .unwrap();

    fs.remove("/data/pics/a.jpg");
    app.sync().await;
    fs.add_file_with_identity("/data/pics/a.jpg", 1, ino, 100, 1000.0);
    let (report, _) = app.sync().await;

    assert_eq!(report.added, 1);
    assert_eq!(report.recovered, 1);
    let new = app.require("pics/a.jpg").await;
    assert_ne!(new.id, old.id);
    assert_eq!(new.description.as_deref(), Some("original"));
    assert_eq!(app.tag_names(new.id).await, vec!["keep"]);
    assert_eq!(app.path_of(old.id).await, "<recycle>/aaaaaa/a.jpg");
}
