use placebook_core::db::Database;
use placebook_core::{Bookmark, BookmarkRepository, ImageStore, SqliteBookmarkRepository};
use std::sync::mpsc::{channel, Receiver};

fn repo() -> SqliteBookmarkRepository {
    SqliteBookmarkRepository::new(Database::open_in_memory().unwrap())
}

fn named(name: &str) -> Bookmark {
    let mut bookmark = Bookmark::new();
    bookmark.name = name.to_string();
    bookmark
}

fn names(snapshot: &[Bookmark]) -> Vec<&str> {
    snapshot.iter().map(|bookmark| bookmark.name.as_str()).collect()
}

fn drain<T>(rx: &Receiver<T>) -> Vec<T> {
    rx.try_iter().collect()
}

#[test]
fn observe_all_emits_initial_snapshot_and_after_each_write() {
    let repo = repo();
    repo.insert_bookmark(&named("Existing")).unwrap();

    let (tx, rx) = channel();
    let _subscription = repo
        .observe_all(move |snapshot| {
            let _ = tx.send(snapshot);
        })
        .unwrap();

    let initial = drain(&rx);
    assert_eq!(initial.len(), 1);
    assert_eq!(names(&initial[0]), vec!["Existing"]);

    let id = repo.insert_bookmark(&named("Added")).unwrap().unwrap();
    let after_insert = drain(&rx);
    assert_eq!(after_insert.len(), 1);
    assert_eq!(names(&after_insert[0]), vec!["Existing", "Added"]);

    let mut edited = repo.load_bookmark(id).unwrap().unwrap();
    edited.name = "Renamed".to_string();
    repo.update_bookmark(&edited).unwrap();
    let after_update = drain(&rx);
    assert_eq!(after_update.len(), 1);
    assert_eq!(names(&after_update[0]), vec!["Existing", "Renamed"]);

    repo.delete_bookmark(id).unwrap();
    let after_delete = drain(&rx);
    assert_eq!(after_delete.len(), 1);
    assert_eq!(names(&after_delete[0]), vec!["Existing"]);
}

#[test]
fn writes_that_change_nothing_do_not_emit() {
    let repo = repo();
    let id = repo.insert_bookmark(&named("Only")).unwrap().unwrap();

    let (tx, rx) = channel();
    let _subscription = repo
        .observe_all(move |snapshot| {
            let _ = tx.send(snapshot);
        })
        .unwrap();
    assert_eq!(drain(&rx).len(), 1);

    let mut ghost = named("Ghost");
    ghost.id = Some(id + 100);
    assert!(!repo.update_bookmark(&ghost).unwrap());

    let mut clash = named("Clash");
    clash.id = Some(id);
    assert_eq!(repo.insert_bookmark(&clash).unwrap(), None);

    assert!(!repo.delete_bookmark(id + 100).unwrap());
    assert!(drain(&rx).is_empty());
}

#[test]
fn image_writes_do_not_emit() {
    let repo = repo();
    let id = repo.insert_bookmark(&named("Photo")).unwrap().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let images = ImageStore::open(dir.path()).unwrap();

    let (tx, rx) = channel();
    let _subscription = repo
        .observe_all(move |snapshot| {
            let _ = tx.send(snapshot);
        })
        .unwrap();
    assert_eq!(drain(&rx).len(), 1);

    let image = image::DynamicImage::new_rgb8(4, 4);
    images.save(id, &image).unwrap();
    assert!(drain(&rx).is_empty());
}

#[test]
fn cancelled_subscription_stops_delivery() {
    let repo = repo();
    let (tx, rx) = channel();
    let subscription = repo
        .observe_all(move |snapshot| {
            let _ = tx.send(snapshot);
        })
        .unwrap();
    assert_eq!(drain(&rx).len(), 1);
    assert_eq!(repo.database().observer_count(), 1);

    subscription.cancel();
    assert_eq!(repo.database().observer_count(), 0);

    repo.insert_bookmark(&named("Unseen")).unwrap();
    assert!(drain(&rx).is_empty());
}

#[test]
fn dropped_subscription_stops_delivery() {
    let repo = repo();
    let (tx, rx) = channel();
    {
        let _subscription = repo
            .observe_all(move |snapshot| {
                let _ = tx.send(snapshot);
            })
            .unwrap();
    }

    repo.insert_bookmark(&named("Unseen")).unwrap();
    assert_eq!(drain(&rx).len(), 1);
}

#[test]
fn observe_bookmark_tracks_one_record_until_deleted() {
    let repo = repo();
    let watched = repo.insert_bookmark(&named("Watched")).unwrap().unwrap();
    let other = repo.insert_bookmark(&named("Other")).unwrap().unwrap();

    let (tx, rx) = channel();
    let _subscription = repo
        .observe_bookmark(watched, move |bookmark| {
            let _ = tx.send(bookmark);
        })
        .unwrap();

    let initial = drain(&rx);
    assert_eq!(initial.len(), 1);
    assert_eq!(initial[0].as_ref().unwrap().name, "Watched");

    let mut edited_other = repo.load_bookmark(other).unwrap().unwrap();
    edited_other.notes = "unrelated".to_string();
    repo.update_bookmark(&edited_other).unwrap();
    assert!(drain(&rx).is_empty());

    let mut edited = repo.load_bookmark(watched).unwrap().unwrap();
    edited.notes = "updated".to_string();
    repo.update_bookmark(&edited).unwrap();
    let after_update = drain(&rx);
    assert_eq!(after_update.len(), 1);
    assert_eq!(after_update[0].as_ref().unwrap().notes, "updated");

    repo.delete_bookmark(watched).unwrap();
    let after_delete = drain(&rx);
    assert_eq!(after_delete, vec![None]);
}

#[test]
fn observers_on_clones_share_one_tracker() {
    let repo = repo();
    let writer = repo.clone();

    let (tx, rx) = channel();
    let _subscription = repo
        .observe_all(move |snapshot| {
            let _ = tx.send(snapshot.len());
        })
        .unwrap();

    writer.insert_bookmark(&named("Shared")).unwrap();
    assert_eq!(drain(&rx), vec![0, 1]);
}
