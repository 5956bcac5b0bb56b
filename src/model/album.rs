//! All objects related to album

use super::{
    AlbumGroup, AlbumType, CopyrightType, DatePrecision, Restrictions, SimplifiedArtist,
    idtypes::AlbumId, image::Image, page::Page, track::SimplifiedTrack,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Simplified album object, as embedded in tracks and listings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimplifiedAlbum {
    /// Only present when the album comes from an artist's discography.
    pub album_group: Option<AlbumGroup>,
    pub album_type: Option<AlbumType>,
    pub artists: Vec<SimplifiedArtist>,
    #[serde(default)]
    pub available_markets: Vec<String>,
    pub href: Option<String>,
    /// Local tracks reference albums without an id.
    pub id: Option<AlbumId>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub name: String,
    pub release_date: Option<String>,
    pub release_date_precision: Option<DatePrecision>,
    pub restrictions: Option<Restrictions>,
    pub total_tracks: Option<u32>,
}

/// Full album object, with the first page of its tracks embedded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FullAlbum {
    pub album_type: AlbumType,
    pub artists: Vec<SimplifiedArtist>,
    #[serde(default)]
    pub available_markets: Vec<String>,
    #[serde(default)]
    pub copyrights: Vec<Copyright>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub href: String,
    pub id: AlbumId,
    pub images: Vec<Image>,
    pub label: Option<String>,
    pub name: String,
    pub popularity: u32,
    pub release_date: String,
    pub release_date_precision: DatePrecision,
    pub total_tracks: u32,
    pub tracks: Page<SimplifiedTrack>,
}

/// Copyright object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Copyright {
    pub text: String,
    #[serde(rename = "type")]
    pub _type: CopyrightType,
}

/// An album saved in a user's library, with the instant it was saved.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedAlbum {
    pub added_at: DateTime<Utc>,
    pub album: FullAlbum,
}

/// Intermediate album wrapper object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Albums {
    pub albums: Vec<FullAlbum>,
}

/// The envelope of the new-releases endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageSimplifiedAlbums {
    pub albums: Page<SimplifiedAlbum>,
}
