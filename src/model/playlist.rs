//! All objects related to playlist

use super::{
    Followers, PublicUser, idtypes::PlaylistId, image::Image, page::Page, player::PlayableItem,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A link to a playlist's tracks plus their count, as embedded in listings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaylistTracksRef {
    pub href: Option<String>,
    pub total: u32,
}

/// Simplified playlist object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimplifiedPlaylist {
    pub collaborative: bool,
    /// Only returned for modified, verified playlists.
    pub description: Option<String>,
    pub href: String,
    pub id: PlaylistId,
    #[serde(default)]
    pub images: Vec<Image>,
    pub name: String,
    pub owner: PublicUser,
    /// `None` when the playlist status is not relevant.
    pub public: Option<bool>,
    /// The version identifier of the playlist; other requests can target
    /// this specific version.
    pub snapshot_id: String,
    pub tracks: PlaylistTracksRef,
}

/// Full playlist object, with the first page of its items embedded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FullPlaylist {
    pub collaborative: bool,
    pub description: Option<String>,
    pub followers: Followers,
    pub href: String,
    pub id: PlaylistId,
    #[serde(default)]
    pub images: Vec<Image>,
    pub name: String,
    pub owner: PublicUser,
    pub public: Option<bool>,
    pub snapshot_id: String,
    pub tracks: Page<PlaylistItem>,
}

/// One entry of a playlist. Very old playlists may have null `added_at` and
/// `added_by`, and a track that is no longer available is null itself.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaylistItem {
    pub added_at: Option<DateTime<Utc>>,
    pub added_by: Option<PublicUser>,
    #[serde(default)]
    pub is_local: bool,
    pub track: Option<PlayableItem>,
}

/// The snapshot id a playlist mutation leaves behind.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaylistResult {
    pub snapshot_id: String,
}

/// The envelope of the featured- and category-playlists endpoints.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeaturedPlaylists {
    /// The localized message of the set, e.g. "Popular Playlists". Absent
    /// for category playlists.
    pub message: Option<String>,
    pub playlists: Page<SimplifiedPlaylist>,
}
