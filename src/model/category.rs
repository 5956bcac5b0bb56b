//! All objects related to browsing the catalog

use super::{image::Image, page::Page};
use serde::{Deserialize, Serialize};

/// Category object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub href: String,
    #[serde(default)]
    pub icons: Vec<Image>,
    pub id: String,
    pub name: String,
}

/// Intermediate category wrapper object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageCategory {
    pub categories: Page<Category>,
}

/// The envelope of the genre-seeds endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailableGenreSeeds {
    pub genres: Vec<String>,
}

/// The envelope of the available-markets endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailableMarkets {
    pub markets: Vec<String>,
}
