//! All objects related to track

use super::{
    Restrictions, SimplifiedAlbum, SimplifiedArtist, idtypes::TrackId,
};
use crate::custom_serde::duration_ms;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Simplified track object, as embedded in albums.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimplifiedTrack {
    pub artists: Vec<SimplifiedArtist>,
    #[serde(default)]
    pub available_markets: Vec<String>,
    pub disc_number: u32,
    #[serde(with = "duration_ms", rename = "duration_ms")]
    pub duration: Duration,
    pub explicit: bool,
    pub href: Option<String>,
    /// Local tracks carry no id.
    pub id: Option<TrackId>,
    #[serde(default)]
    pub is_local: bool,
    /// Only present when a market was applied to the request.
    pub is_playable: Option<bool>,
    pub name: String,
    pub preview_url: Option<String>,
    pub restrictions: Option<Restrictions>,
    pub track_number: u32,
}

/// Full track object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FullTrack {
    pub album: SimplifiedAlbum,
    pub artists: Vec<SimplifiedArtist>,
    #[serde(default)]
    pub available_markets: Vec<String>,
    pub disc_number: u32,
    #[serde(with = "duration_ms", rename = "duration_ms")]
    pub duration: Duration,
    pub explicit: bool,
    pub href: Option<String>,
    pub id: Option<TrackId>,
    #[serde(default)]
    pub is_local: bool,
    pub is_playable: Option<bool>,
    pub name: String,
    pub popularity: u32,
    pub preview_url: Option<String>,
    pub restrictions: Option<Restrictions>,
    pub track_number: u32,
}

/// A track saved in a user's library, with the instant it was saved.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedTrack {
    pub added_at: DateTime<Utc>,
    pub track: FullTrack,
}

/// Intermediate tracks wrapper object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tracks {
    pub tracks: Vec<FullTrack>,
}
