//! All objects related to user

use super::{Followers, SubscriptionLevel, image::Image};
use serde::{Deserialize, Serialize};

/// Publicly available information about a user.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicUser {
    pub display_name: Option<String>,
    pub followers: Option<Followers>,
    pub href: String,
    pub id: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// The current user's profile. Country, email and subscription level are
/// only filled in when the matching scopes were granted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrivateUser {
    pub country: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub explicit_content: Option<ExplicitContent>,
    pub followers: Option<Followers>,
    pub href: String,
    pub id: String,
    #[serde(default)]
    pub images: Vec<Image>,
    pub product: Option<SubscriptionLevel>,
}

/// The user's explicit content settings.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExplicitContent {
    pub filter_enabled: bool,
    pub filter_locked: bool,
}
