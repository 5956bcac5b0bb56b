//! Enumerated wire values. Sets the server controls and extends over time
//! carry an `Unknown` fallback so new values don't break deserialization.

use serde::{Deserialize, Serialize};

/// The type of an album.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlbumType {
    Album,
    Single,
    Compilation,
    // Undocumented, but returned frequently enough to matter.
    Ep,
}

/// The relationship between the artist and the album.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlbumGroup {
    Album,
    Single,
    Compilation,
    AppearsOn,
}

impl AlbumGroup {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Single => "single",
            Self::Compilation => "compilation",
            Self::AppearsOn => "appears_on",
        }
    }
}

/// The precision of a release date.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DatePrecision {
    Year,
    Month,
    Day,
}

/// The reason a piece of content is restricted. The server may introduce
/// reasons this crate doesn't know about yet.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionReason {
    Market,
    Product,
    Explicit,
    #[serde(other)]
    Unknown,
}

/// Content restrictions.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Restrictions {
    pub reason: RestrictionReason,
}

/// The repeat state of a playback session.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RepeatState {
    Off,
    Track,
    Context,
}

impl RepeatState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Track => "track",
            Self::Context => "context",
        }
    }
}

/// The type of the currently playing item.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CurrentlyPlayingType {
    Track,
    Episode,
    #[serde(rename = "ad")]
    Advertisement,
    #[serde(other)]
    Unknown,
}

/// Item types a client can declare support for beyond tracks.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdditionalType {
    Track,
    Episode,
}

impl AdditionalType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Episode => "episode",
        }
    }
}

/// An item type to search for.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    Artist,
    Album,
    Track,
    Playlist,
    Show,
    Episode,
}

impl SearchType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Track => "track",
            Self::Playlist => "playlist",
            Self::Show => "show",
            Self::Episode => "episode",
        }
    }
}

/// The time frame a user's top items are computed over.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    LongTerm,
    MediumTerm,
    ShortTerm,
}

impl TimeRange {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LongTerm => "long_term",
            Self::MediumTerm => "medium_term",
            Self::ShortTerm => "short_term",
        }
    }
}

/// What a follow operation targets.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FollowType {
    Artist,
    User,
}

impl FollowType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::User => "user",
        }
    }
}

/// The user's subscription level. Only visible to the user themselves.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionLevel {
    Premium,
    #[serde(alias = "open")]
    Free,
}

/// The type of copyright.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CopyrightType {
    #[serde(rename = "C")]
    Copyright,
    #[serde(rename = "P")]
    PerformanceCopyright,
}

/// A context's item type.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    Artist,
    Playlist,
    Album,
    Show,
    #[serde(other)]
    Unknown,
}

/// The kind of device playback can happen on.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeviceType {
    Computer,
    Tablet,
    Smartphone,
    Speaker,
    #[serde(rename = "TV")]
    Tv,
    #[serde(rename = "AVR")]
    Avr,
    #[serde(rename = "STB")]
    Stb,
    AudioDongle,
    GameConsole,
    CastVideo,
    CastAudio,
    Automobile,
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_wire_values_fall_back() {
        let reason: RestrictionReason = serde_json::from_str("\"payment_required\"").unwrap();
        assert_eq!(reason, RestrictionReason::Unknown);

        let device: DeviceType = serde_json::from_str("\"HologramProjector\"").unwrap();
        assert_eq!(device, DeviceType::Unknown);

        let playing: CurrentlyPlayingType = serde_json::from_str("\"ad\"").unwrap();
        assert_eq!(playing, CurrentlyPlayingType::Advertisement);
    }

    #[test]
    fn query_values_match_the_wire_strings() {
        assert_eq!(TimeRange::LongTerm.as_str(), "long_term");
        assert_eq!(AlbumGroup::AppearsOn.as_str(), "appears_on");
        assert_eq!(RepeatState::Off.as_str(), "off");
    }
}
