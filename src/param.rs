//! The optional-parameter convention used by every endpoint method.
//!
//! Spotify treats an absent query parameter differently from a present but
//! empty one (`market` omitted vs `market=`), so optionals can't be plain
//! `Option`s defaulted to "empty". [`MissingOr`] keeps the two cases apart:
//! [`MissingOr::Missing`] is stripped from the wire entirely, while
//! `Present("")` and `Present(false)` are sent as-is.

use crate::http::Query;
use serde::Serialize;
use serde_json::{Map, Value};

/// An optional request parameter: either left out by the caller or supplied
/// with a value (including empty ones).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingOr<T> {
    /// Not supplied; the key is omitted from the request entirely.
    #[default]
    Missing,
    /// Explicitly supplied, empty values included.
    Present(T),
}

impl<T> MissingOr<T> {
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> MissingOr<U> {
        match self {
            Self::Missing => MissingOr::Missing,
            Self::Present(value) => MissingOr::Present(f(value)),
        }
    }

    pub const fn as_ref(&self) -> MissingOr<&T> {
        match self {
            Self::Missing => MissingOr::Missing,
            Self::Present(value) => MissingOr::Present(value),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Missing => None,
            Self::Present(value) => Some(value),
        }
    }

    pub fn from_option(option: Option<T>) -> Self {
        option.map_or(Self::Missing, Self::Present)
    }
}

impl<T: AsRef<str>> MissingOr<T> {
    pub fn as_deref(&self) -> MissingOr<&str> {
        match self {
            Self::Missing => MissingOr::Missing,
            Self::Present(value) => MissingOr::Present(value.as_ref()),
        }
    }
}

impl<T> From<T> for MissingOr<T> {
    fn from(value: T) -> Self {
        Self::Present(value)
    }
}

/// Build a query map from key/parameter pairs, dropping the missing ones.
pub(crate) fn build_query<'a, const N: usize>(
    params: [(&'a str, MissingOr<&'a str>); N],
) -> Query<'a> {
    params
        .into_iter()
        .filter_map(|(key, value)| value.into_option().map(|value| (key, value)))
        .collect()
}

/// Builds JSON bodies the same way [`build_query`] builds query strings:
/// required entries always serialize, optional ones only when present.
#[derive(Debug, Default)]
pub(crate) struct JsonBuilder {
    map: Map<String, Value>,
}

impl JsonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, key: &str, value: impl Serialize) -> Self {
        self.map.insert(
            key.to_owned(),
            serde_json::to_value(value).expect("infallible serialization"),
        );
        self
    }

    pub fn optional<T: Serialize>(mut self, key: &str, value: MissingOr<T>) -> Self {
        if let MissingOr::Present(value) = value {
            self.map.insert(
                key.to_owned(),
                serde_json::to_value(value).expect("infallible serialization"),
            );
        }
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_params_are_stripped_from_queries() {
        let limit = MissingOr::Present(50_u32).map(|x| x.to_string());
        let query = build_query([
            ("market", MissingOr::Missing),
            ("limit", limit.as_deref()),
            ("fields", MissingOr::Missing),
        ]);
        assert_eq!(query.len(), 1);
        assert_eq!(query.get("limit").copied(), Some("50"));
        assert!(!query.contains_key("market"));
    }

    #[test]
    fn present_but_empty_values_are_kept() {
        let query = build_query([("fields", MissingOr::Present(""))]);
        assert_eq!(query.get("fields").copied(), Some(""));
    }

    #[test]
    fn json_builder_skips_missing_and_keeps_falsy() {
        let body = JsonBuilder::new()
            .required("name", "road trip")
            .optional("public", MissingOr::Present(false))
            .optional("collaborative", MissingOr::<bool>::Missing)
            .optional("description", MissingOr::Present(""))
            .build();

        assert_eq!(body["name"], "road trip");
        assert_eq!(body["public"], false);
        assert_eq!(body["description"], "");
        assert!(body.get("collaborative").is_none());
    }

    #[test]
    fn conversions_round_trip() {
        assert_eq!(MissingOr::from("US").into_option(), Some("US"));
        assert_eq!(MissingOr::<&str>::from_option(None), MissingOr::Missing);
        assert!(MissingOr::<u32>::default().is_missing());
    }
}
