use image::{DynamicImage, Rgba, RgbaImage};
use placebook_core::db::Database;
use placebook_core::media::{load_downsampled, ImageSource};
use placebook_core::{BookmarkService, ImageStore, LatLng, SqliteBookmarkRepository};
use std::sync::mpsc::channel;

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255])
    }))
}

#[test]
fn delete_removes_both_image_and_record() {
    let dir = tempfile::tempdir().unwrap();
    let images = ImageStore::open(dir.path().join("images")).unwrap();
    let service = BookmarkService::new(
        SqliteBookmarkRepository::new(Database::open_in_memory().unwrap()),
        images.clone(),
    );

    let id = service
        .add_from_location(LatLng::new(51.5074, -0.1278))
        .unwrap()
        .unwrap();
    assert!(service.set_image(id, &gradient(20, 10)));
    assert!(images.exists(id));
    assert!(images.image_path(id).ends_with(format!("bookmark{id}.png")));

    let bookmark = service.get(id).unwrap().unwrap();
    service.delete(&bookmark).unwrap();

    assert!(!images.exists(id));
    assert!(service.get(id).unwrap().is_none());
}

#[test]
fn delete_without_image_still_removes_record() {
    let dir = tempfile::tempdir().unwrap();
    let service = BookmarkService::new(
        SqliteBookmarkRepository::new(Database::open_in_memory().unwrap()),
        ImageStore::open(dir.path()).unwrap(),
    );

    let id = service
        .add_from_location(LatLng::new(1.0, 1.0))
        .unwrap()
        .unwrap();
    assert!(service.delete_by_id(id).unwrap());
    assert!(!service.delete_by_id(id).unwrap());
}

#[test]
fn image_replacement_emits_no_record_change() {
    let dir = tempfile::tempdir().unwrap();
    let service = BookmarkService::new(
        SqliteBookmarkRepository::new(Database::open_in_memory().unwrap()),
        ImageStore::open(dir.path()).unwrap(),
    );
    let id = service
        .add_from_location(LatLng::new(1.0, 1.0))
        .unwrap()
        .unwrap();

    let (tx, rx) = channel();
    let _subscription = service
        .observe_details(id, move |view| {
            let _ = tx.send(view);
        })
        .unwrap();
    assert_eq!(rx.try_iter().count(), 1);

    assert!(service.set_image(id, &gradient(4, 4)));
    assert!(service.set_image(id, &gradient(8, 8)));
    assert_eq!(rx.try_iter().count(), 0);

    let stored = service.load_image(id).unwrap();
    assert_eq!((stored.width(), stored.height()), (8, 8));
}

#[test]
fn detail_view_photo_round_trips_through_store() {
    let dir = tempfile::tempdir().unwrap();
    let images = ImageStore::open(dir.path()).unwrap();
    let service = BookmarkService::new(
        SqliteBookmarkRepository::new(Database::open_in_memory().unwrap()),
        images.clone(),
    );
    let id = service
        .add_from_location(LatLng::new(3.0, 4.0))
        .unwrap()
        .unwrap();
    let view = service.details_view(id).unwrap().unwrap();

    assert!(view.image(&images).unwrap().is_none());
    let photo = gradient(7, 3);
    view.set_image(&images, &photo).unwrap();
    assert_eq!(
        view.image(&images).unwrap().unwrap().to_rgba8(),
        photo.to_rgba8()
    );
}

#[test]
fn stored_photo_can_be_reloaded_downsampled() {
    let dir = tempfile::tempdir().unwrap();
    let images = ImageStore::open(dir.path()).unwrap();
    images.save(1, &gradient(400, 300)).unwrap();

    let reduced = load_downsampled(ImageSource::Path(&images.image_path(1)), 120, 120).unwrap();
    assert_eq!((reduced.width(), reduced.height()), (100, 75));
}

#[test]
fn marker_view_loads_the_bookmark_photo() {
    let dir = tempfile::tempdir().unwrap();
    let images = ImageStore::open(dir.path()).unwrap();
    let service = BookmarkService::new(
        SqliteBookmarkRepository::new(Database::open_in_memory().unwrap()),
        images.clone(),
    );
    let with_photo = service
        .add_from_location(LatLng::new(8.0, 9.0))
        .unwrap()
        .unwrap();
    service
        .add_from_location(LatLng::new(8.5, 9.5))
        .unwrap()
        .unwrap();
    assert!(service.set_image(with_photo, &gradient(6, 6)));

    let markers = service.marker_views().unwrap();
    let loaded = markers[0].image(&images).unwrap().expect("photo stored");
    assert_eq!((loaded.width(), loaded.height()), (6, 6));
    assert!(markers[1].image(&images).unwrap().is_none());
}
