//! All objects related to artist

use super::{idtypes::ArtistId, image::Image, page::CursorBasedPage};
use serde::{Deserialize, Serialize};

/// Simplified artist object, as embedded in albums and tracks.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimplifiedArtist {
    pub href: Option<String>,
    /// Local tracks reference artists without an id.
    pub id: Option<ArtistId>,
    pub name: String,
}

/// Full artist object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FullArtist {
    pub followers: Followers,
    #[serde(default)]
    pub genres: Vec<String>,
    pub href: String,
    pub id: ArtistId,
    #[serde(default)]
    pub images: Vec<Image>,
    pub name: String,
    pub popularity: u32,
}

/// Followers object
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Followers {
    pub total: u32,
}

/// Intermediate artists wrapper object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artists {
    pub artists: Vec<FullArtist>,
}

/// The envelope of the followed-artists endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CursorPageFullArtists {
    pub artists: CursorBasedPage<FullArtist>,
}
