//! Driving-directions deep links for sharing a bookmark.
//!
//! Pin-drop bookmarks link to raw coordinates; bookmarks created from a
//! place link to the place id with the name as destination label.

use super::projection::BookmarkDetailsView;
use url::form_urlencoded::byte_serialize;

const DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/dir/?api=1";

pub fn directions_url(view: &BookmarkDetailsView) -> String {
    match view.place_id.as_deref() {
        Some(place_id) => format!(
            "{DIRECTIONS_BASE_URL}&destination={}&destination_place_id={}",
            form_encode(&view.name),
            form_encode(place_id)
        ),
        None => {
            let location = format!("{},{}", view.latitude, view.longitude);
            format!(
                "{DIRECTIONS_BASE_URL}&destination={}",
                form_encode(&location)
            )
        }
    }
}

/// Text payload for the platform share sheet.
pub fn share_text(view: &BookmarkDetailsView) -> String {
    format!("Check out {} at:\n{}", view.name, directions_url(view))
}

fn form_encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::{directions_url, share_text};
    use crate::model::bookmark::Bookmark;
    use crate::view::projection::to_details;

    #[test]
    fn pin_drop_bookmark_links_to_coordinates() {
        let mut bookmark = Bookmark::new();
        bookmark.latitude = 40.5;
        bookmark.longitude = -74.25;
        let url = directions_url(&to_details(&bookmark));
        assert_eq!(
            url,
            "https://www.google.com/maps/dir/?api=1&destination=40.5%2C-74.25"
        );
    }

    #[test]
    fn place_bookmark_links_to_place_id_with_encoded_name() {
        let mut bookmark = Bookmark::new();
        bookmark.name = "Joe's Diner & Bar".to_string();
        bookmark.place_id = Some("ChIJabc".to_string());
        let view = to_details(&bookmark);

        assert_eq!(
            directions_url(&view),
            "https://www.google.com/maps/dir/?api=1&destination=Joe%27s+Diner+%26+Bar&destination_place_id=ChIJabc"
        );
        assert!(share_text(&view).starts_with("Check out Joe's Diner & Bar at:\nhttps://"));
    }
}
