//! All objects related to show and episode

use super::{DatePrecision, idtypes::EpisodeId, idtypes::ShowId, image::Image};
use crate::custom_serde::duration_ms;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Simplified episode object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimplifiedEpisode {
    pub description: String,
    #[serde(with = "duration_ms", rename = "duration_ms")]
    pub duration: Duration,
    pub explicit: bool,
    pub href: String,
    pub id: EpisodeId,
    #[serde(default)]
    pub images: Vec<Image>,
    pub is_externally_hosted: bool,
    pub is_playable: bool,
    #[serde(default)]
    pub languages: Vec<String>,
    pub name: String,
    pub release_date: String,
    pub release_date_precision: DatePrecision,
    /// Requires the user-read-playback-position scope.
    pub resume_point: Option<ResumePoint>,
}

/// Full episode object, with its show embedded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FullEpisode {
    pub description: String,
    #[serde(with = "duration_ms", rename = "duration_ms")]
    pub duration: Duration,
    pub explicit: bool,
    pub href: String,
    pub id: EpisodeId,
    #[serde(default)]
    pub images: Vec<Image>,
    pub is_externally_hosted: bool,
    pub is_playable: bool,
    #[serde(default)]
    pub languages: Vec<String>,
    pub name: String,
    pub release_date: String,
    pub release_date_precision: DatePrecision,
    pub resume_point: Option<ResumePoint>,
    pub show: SimplifiedShow,
}

/// Simplified show object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimplifiedShow {
    pub description: String,
    pub explicit: bool,
    pub href: String,
    pub id: ShowId,
    #[serde(default)]
    pub images: Vec<Image>,
    pub is_externally_hosted: Option<bool>,
    #[serde(default)]
    pub languages: Vec<String>,
    pub media_type: String,
    pub name: String,
    pub publisher: String,
    pub total_episodes: Option<u32>,
}

/// Where a user last stopped in an episode.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResumePoint {
    pub fully_played: bool,
    #[serde(with = "duration_ms", rename = "resume_position_ms")]
    pub resume_position: Duration,
}
