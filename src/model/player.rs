//! All objects related to the playback state of a user

use super::{
    ContextType, CurrentlyPlayingType, DeviceType, RepeatState, show::FullEpisode,
    track::FullTrack,
};
use crate::custom_serde::{millisecond_timestamp, option_duration_ms};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Device object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Device {
    /// May be unset for some devices.
    pub id: Option<String>,
    pub is_active: bool,
    pub is_private_session: bool,
    /// A restricted device accepts no Web API commands.
    pub is_restricted: bool,
    pub name: String,
    #[serde(rename = "type")]
    pub _type: DeviceType,
    pub volume_percent: Option<u32>,
}

/// Intermediate device wrapper object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DevicePayload {
    pub devices: Vec<Device>,
}

/// Context object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Context {
    pub href: Option<String>,
    #[serde(rename = "type")]
    pub _type: ContextType,
    pub uri: String,
}

/// The currently playing item: a music track or a podcast episode. The wire
/// carries no tag; the two shapes are told apart structurally.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PlayableItem {
    Track(FullTrack),
    Episode(FullEpisode),
}

/// Currently playing object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CurrentlyPlayingContext {
    pub context: Option<Context>,
    /// When the playback state was sampled.
    #[serde(with = "millisecond_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, with = "option_duration_ms", rename = "progress_ms")]
    pub progress: Option<Duration>,
    pub is_playing: bool,
    pub item: Option<PlayableItem>,
    pub currently_playing_type: CurrentlyPlayingType,
}

/// Full playback state object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CurrentPlaybackContext {
    pub device: Device,
    pub repeat_state: RepeatState,
    pub shuffle_state: bool,
    pub context: Option<Context>,
    #[serde(with = "millisecond_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, with = "option_duration_ms", rename = "progress_ms")]
    pub progress: Option<Duration>,
    pub is_playing: bool,
    pub item: Option<PlayableItem>,
    pub currently_playing_type: CurrentlyPlayingType,
}

/// Playing history object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlayHistory {
    pub track: FullTrack,
    pub played_at: DateTime<Utc>,
    pub context: Option<Context>,
}

/// The user's queue: what's playing now and what comes next.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CurrentUserQueue {
    pub currently_playing: Option<PlayableItem>,
    pub queue: Vec<PlayableItem>,
}

/// Where playback should start inside a context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Offset {
    /// A zero-based position in the context.
    Position(u32),
    /// The URI of the item to start at.
    Uri(String),
}
