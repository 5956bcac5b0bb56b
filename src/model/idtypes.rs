//! Typed aliases for the fixed-length base-62 ids Spotify assigns to
//! catalog resources. User and category ids are free-form strings and stay
//! plain [`String`]s.

use arrayvec::ArrayString;

pub type AlbumId = ArrayString<22>;
pub type ArtistId = ArrayString<22>;
pub type EpisodeId = ArrayString<22>;
pub type PlaylistId = ArrayString<22>;
pub type ShowId = ArrayString<22>;
pub type TrackId = ArrayString<22>;
