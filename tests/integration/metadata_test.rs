//! Integration tests for carrying descriptions and tags across renames.

mod helpers;

use tagspace_core::events::{MatchReason, SyncEvent};

#[tokio::test]
async fn test_rename_carries_metadata() {
    let (app, fs) = helpers::TestApp::with_memory_fs().await;
    fs.add_file_with_identity("/data/pics/a.jpg", 1, 1, 100, 1000.0);
    app.sync().await;
    let a = app.require("pics/a.jpg").await;
    app.tag(a.id, &["beach", "family"]).await;
    app.ctx
        .entry_service
        .describe(a.id, Some("Summer 2024"))
        .await
        .unwrap();

    fs.rename("/data/pics/a.jpg", "/data/pics/b.jpg").unwrap();
    let (report, observer) = app.sync().await;

    assert_eq!(report.added, 1);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.recovered, 1);

    let b = app.require("pics/b.jpg").await;
    assert_ne!(b.id, a.id);
    assert_eq!(b.description.as_deref(), Some("Summer 2024"));
    assert_eq!(app.tag_names(b.id).await, vec!["beach", "family"]);

    // The prior entry keeps its own copy of everything.
    assert_eq!(app.path_of(a.id).await, "<recycle>/aaaaaa/a.jpg");
    assert_eq!(app.tag_names(a.id).await, vec!["beach", "family"]);
    let old = app.ctx.entry_service.get(a.id).await.unwrap();
    assert_eq!(old.description.as_deref(), Some("Summer 2024"));

    assert!(observer.events().iter().any(|e| matches!(
        e,
        SyncEvent::Recovered { donor_id, reason: MatchReason::DevIno, .. } if *donor_id == a.id
    )));
}

#[tokio::test]
async fn test_move_across_directories_carries_metadata() {
    let (app, fs) = helpers::TestApp::with_memory_fs().await;
    fs.add_file("/data/pics/inbox/a.jpg", 100, 1000.0);
    fs.add_dir("/data/pics/sorted");
    app.sync().await;
    let a = app.require("pics/inbox/a.jpg").await;
    app.tag(a.id, &["todo"]).await;

    fs.rename("/data/pics/inbox/a.jpg", "/data/pics/sorted/a.jpg")
        .unwrap();
    let (report, _) = app.sync().await;

    assert_eq!(report.recovered, 1);
    let moved = app.require("pics/sorted/a.jpg").await;
    assert_eq!(app.tag_names(moved.id).await, vec!["todo"]);
    assert!(app.entry("pics/inbox/a.jpg").await.is_none());
}

#[tokio::test]
async fn test_copy_with_same_name_size_and_mtime_matches() {
    let (app, fs) = helpers::TestApp::with_memory_fs().await;
    fs.add_file("/data/pics/old/a.jpg", 100, 1000.0);
    app.sync().await;
    let a = app.require("pics/old/a.jpg").await;
    app.tag(a.id, &["scan"]).await;
    app.ctx
        .entry_service
        .describe(a.id, Some("first scan"))
        .await
        .unwrap();

    // A fresh inode: only name, size and mtime line up.
    fs.remove("/data/pics/old");
    fs.add_file("/data/pics/new/a.jpg", 100, 1000.0);
    let (report, observer) = app.sync().await;

    assert_eq!(report.recovered, 1);
    let copy = app.require("pics/new/a.jpg").await;
    assert_eq!(copy.description.as_deref(), Some("first scan"));
    assert_eq!(app.tag_names(copy.id).await, vec!["scan"]);
    assert!(observer.events().iter().any(|e| matches!(
        e,
        SyncEvent::Recovered { reason: MatchReason::NameSizeMtime, .. }
    )));
}

#[tokio::test]
async fn test_unrelated_file_gets_nothing() {
    let (app, fs) = helpers::TestApp::with_memory_fs().await;
    fs.add_file("/data/pics/a.jpg", 100, 1000.0);
    app.sync().await;
    let a = app.require("pics/a.jpg").await;
    app.tag(a.id, &["beach"]).await;
    app.ctx
        .entry_service
        .describe(a.id, Some("beach"))
        .await
        .unwrap();

    fs.add_file("/data/pics/b.jpg", 100, 2000.0);
    let (report, _) = app.sync().await;

    assert_eq!(report.recovered, 0);
    let b = app.require("pics/b.jpg").await;
    assert_eq!(b.description, None);
    assert!(app.tag_names(b.id).await.is_empty());
}

#[tokio::test]
async fn test_existing_description_survives_refresh() {
    let (app, fs) = helpers::TestApp::with_memory_fs().await;
    fs.add_file("/data/pics/a.jpg", 100, 1000.0);
    app.sync().await;
    let a = app.require("pics/a.jpg").await;
    app.ctx
        .entry_service
        .describe(a.id, Some("kept"))
        .await
        .unwrap();

    fs.set_meta("/data/pics/a.jpg", 101, 1001.0).unwrap();
    app.sync().await;

    let a = app.require("pics/a.jpg").await;
    assert_eq!(a.description.as_deref(), Some("kept"));
    assert_eq!(a.size, Some(101));
}

#[tokio::test]
async fn test_real_rename_carries_metadata() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.jpg"), b"jpeg bytes").unwrap();
    let app = helpers::TestApp::with_local_fs(dir.path(), "pics").await;
    app.sync().await;
    let a = app.require("pics/a.jpg").await;
    app.tag(a.id, &["real"]).await;

    std::fs::rename(dir.path().join("a.jpg"), dir.path().join("b.jpg")).unwrap();
    let (report, _) = app.sync().await;

    assert!(report.recovered >= 1);
    let b = app.require("pics/b.jpg").await;
    assert_eq!(app.tag_names(b.id).await, vec!["real"]);
    assert_eq!(app.path_of(a.id).await, "<recycle>/aaaaaa/a.jpg");
}
