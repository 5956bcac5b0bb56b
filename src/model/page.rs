//! The two pagination envelopes the API wraps list results in. These are
//! plain data: advancing is issuing another request against the carried
//! `next`/`previous` link or cursor.

use serde::{Deserialize, Serialize};

/// Offset-based paging object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page<T> {
    /// A link to the endpoint returning the full result of the request.
    pub href: String,
    pub items: Vec<T>,
    /// The maximum number of items in the response.
    pub limit: u32,
    /// URL to the next page of items, if any.
    pub next: Option<String>,
    /// The offset of the items returned.
    pub offset: u32,
    /// URL to the previous page of items, if any.
    pub previous: Option<String>,
    /// The total number of items available to return.
    pub total: u32,
}

/// Cursor-based paging object
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CursorBasedPage<T> {
    pub href: String,
    pub items: Vec<T>,
    pub limit: u32,
    pub next: Option<String>,
    /// The cursors used to find the next set of items.
    #[serde(default)]
    pub cursors: Cursor,
    /// Absent for some endpoints.
    pub total: Option<u32>,
}

/// Cursor object
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cursor {
    pub after: Option<String>,
    pub before: Option<String>,
}
