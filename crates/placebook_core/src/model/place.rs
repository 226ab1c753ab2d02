//! External place boundary.
//!
//! Places are owned by a third-party search/detail service. Core only sees
//! the fields it copies into a bookmark.

use crate::model::bookmark::LatLng;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Place details as returned by the place provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceDetails {
    pub id: String,
    pub name: String,
    pub address: String,
    /// `None` when the provider did not return coordinates.
    pub lat_lng: Option<LatLng>,
    pub phone: String,
    /// Provider type tags, e.g. `restaurant`, `gas_station`.
    pub types: Vec<String>,
    /// Encoded photo bytes, when the provider returned one.
    pub photo: Option<Vec<u8>>,
}

/// Place lookup failure reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceLookupError {
    /// Provider status code; `None` for transport failures.
    pub status_code: Option<i32>,
    pub message: String,
}

impl Display for PlaceLookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "place lookup failed (status {code}): {}", self.message),
            None => write!(f, "place lookup failed: {}", self.message),
        }
    }
}

impl Error for PlaceLookupError {}

/// Place search/detail collaborator.
pub trait PlaceProvider {
    fn fetch_place(&self, place_id: &str) -> Result<PlaceDetails, PlaceLookupError>;
}
