//! The request pipeline and the endpoint methods layered on top of it.
//!
//! Every endpoint method goes through [`Client::send`]: validate the access
//! token, issue exactly one HTTP call with a bearer header, and either hand
//! back the raw response text or raise [`ClientError::Api`] built from
//! Spotify's error envelope. Nothing is retried and nothing is cached.

use crate::{
    ClientError, ClientResult, Config,
    auth::AccessFlow,
    http::{Headers, HttpClient, Query},
    model::*,
    param::{JsonBuilder, MissingOr, build_query},
};
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt::Write as _;

/// Converts a JSON response from Spotify into its model.
fn convert_result<'a, T: Deserialize<'a>>(input: &'a str) -> ClientResult<T> {
    serde_json::from_str::<T>(input).map_err(Into::into)
}

/// Append device ID to an API path.
fn append_device_id(path: &str, device_id: MissingOr<&str>) -> String {
    let mut new_path = path.to_owned();
    if let MissingOr::Present(device_id) = device_id {
        if path.contains('?') {
            let _ = write!(new_path, "&device_id={device_id}");
        } else {
            let _ = write!(new_path, "?device_id={device_id}");
        }
    }
    new_path
}

/// The error envelope failed responses carry in their body.
#[derive(Deserialize)]
struct ApiErrorPayload {
    status: u16,
    message: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorPayload,
}

/// A client for the Spotify Web API, generic over the access flow that owns
/// the bearer token.
#[derive(Debug, Default)]
pub struct Client<F: AccessFlow> {
    pub access_flow: F,
    pub config: Config,
    http: HttpClient,
}

impl<F: AccessFlow> Client<F> {
    pub fn new(access_flow: F) -> Self {
        Self::with_config(access_flow, Config::default())
    }

    /// Same as [`Self::new`] but with an extra parameter to configure the
    /// endpoint locations.
    pub fn with_config(access_flow: F, config: Config) -> Self {
        Self {
            access_flow,
            config,
            http: HttpClient::default(),
        }
    }

    /// The headers required for authenticated requests to the API.
    ///
    /// Since this is accessed by authenticated requests always, it's where
    /// the automatic reauthentication takes place.
    async fn auth_headers(&self) -> ClientResult<Headers> {
        self.access_flow.validate_token().await?;
        let mut headers = Headers::new();
        headers.insert(
            "authorization".to_owned(),
            format!("Bearer {}", self.access_flow.access_token()?),
        );
        headers.insert("content-type".to_owned(), "application/json".to_owned());
        Ok(headers)
    }

    /// Issues one request against the resource API and applies the response
    /// rules every endpoint shares.
    ///
    /// Returns `Ok(None)` for a success with an empty body (mutation
    /// endpoints), `Ok(Some(text))` for a success with a payload, and
    /// [`ClientError::Api`] otherwise — built from the JSON error envelope
    /// when the body carries one, from the bare status line when it doesn't.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &Query<'_>,
        json: Option<&Value>,
        data: Option<Vec<u8>>,
    ) -> ClientResult<Option<String>> {
        let headers = self.auth_headers().await?;
        let url = format!("{}{path}", self.config.api_base_url);
        tracing::debug!(%method, path, "sending api request");

        let response = self
            .http
            .request(method, &url, Some(&headers), query, json, data)
            .await?;

        if response.status.is_success() {
            if response.body.is_empty() {
                return Ok(None);
            }
            return Ok(Some(String::from_utf8_lossy(&response.body).into_owned()));
        }

        if response.is_json() {
            if let Ok(envelope) = serde_json::from_slice::<ApiErrorEnvelope>(&response.body) {
                return Err(ClientError::Api {
                    status: envelope.error.status,
                    message: envelope.error.message,
                });
            }
        }
        Err(ClientError::Api {
            status: response.status.as_u16(),
            message: response.status.canonical_reason().map(ToOwned::to_owned),
        })
    }

    /// Convenience method to send GET requests related to an endpoint in the API.
    async fn api_get(&self, path: &str, query: &Query<'_>) -> ClientResult<String> {
        Ok(self
            .send(Method::GET, path, query, None, None)
            .await?
            .unwrap_or_default())
    }

    /// Convenience method to send POST requests related to an endpoint in the API.
    async fn api_post(
        &self,
        path: &str,
        query: &Query<'_>,
        payload: Option<&Value>,
    ) -> ClientResult<String> {
        Ok(self
            .send(Method::POST, path, query, payload, None)
            .await?
            .unwrap_or_default())
    }

    /// Convenience method to send PUT requests related to an endpoint in the API.
    async fn api_put(
        &self,
        path: &str,
        query: &Query<'_>,
        payload: Option<&Value>,
    ) -> ClientResult<String> {
        Ok(self
            .send(Method::PUT, path, query, payload, None)
            .await?
            .unwrap_or_default())
    }

    /// Convenience method to send DELETE requests related to an endpoint in the API.
    async fn api_delete(
        &self,
        path: &str,
        query: &Query<'_>,
        payload: Option<&Value>,
    ) -> ClientResult<String> {
        Ok(self
            .send(Method::DELETE, path, query, payload, None)
            .await?
            .unwrap_or_default())
    }

    // Albums

    /// Returns a single album given the album's ID.
    ///
    /// Parameters:
    /// - album_id - the album ID
    /// - market - an ISO 3166-1 alpha-2 country code; only content available
    ///   in that market is returned
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-an-album)
    pub async fn album(
        &self,
        album_id: AlbumId,
        market: MissingOr<&str>,
    ) -> ClientResult<FullAlbum> {
        let params = build_query([("market", market)]);
        let result = self.api_get(&format!("albums/{album_id}"), &params).await?;
        convert_result(&result)
    }

    /// Returns a list of albums given their IDs.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-multiple-albums)
    pub async fn albums(
        &self,
        album_ids: &[AlbumId],
        market: MissingOr<&str>,
    ) -> ClientResult<Vec<FullAlbum>> {
        let ids = album_ids.join(",");
        let params = build_query([("ids", MissingOr::Present(&ids)), ("market", market)]);
        let result = self.api_get("albums", &params).await?;
        convert_result::<Albums>(&result).map(|x| x.albums)
    }

    /// Returns the tracks of an album.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-an-albums-tracks)
    pub async fn album_tracks(
        &self,
        album_id: AlbumId,
        market: MissingOr<&str>,
        limit: MissingOr<u32>,
        offset: MissingOr<u32>,
    ) -> ClientResult<Page<SimplifiedTrack>> {
        let limit = limit.map(|x| x.to_string());
        let offset = offset.map(|x| x.to_string());
        let params = build_query([
            ("market", market),
            ("limit", limit.as_deref()),
            ("offset", offset.as_deref()),
        ]);
        let result = self
            .api_get(&format!("albums/{album_id}/tracks"), &params)
            .await?;
        convert_result(&result)
    }

    /// Gets the albums saved in the current user's library.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-users-saved-albums)
    pub async fn current_user_saved_albums(
        &self,
        market: MissingOr<&str>,
        limit: MissingOr<u32>,
        offset: MissingOr<u32>,
    ) -> ClientResult<Page<SavedAlbum>> {
        let limit = limit.map(|x| x.to_string());
        let offset = offset.map(|x| x.to_string());
        let params = build_query([
            ("market", market),
            ("limit", limit.as_deref()),
            ("offset", offset.as_deref()),
        ]);
        let result = self.api_get("me/albums", &params).await?;
        convert_result(&result)
    }

    /// Saves one or more albums to the current user's library.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/save-albums-user)
    pub async fn current_user_saved_albums_add(&self, album_ids: &[AlbumId]) -> ClientResult<()> {
        let ids = album_ids.join(",");
        let params = build_query([("ids", MissingOr::Present(&ids))]);
        self.api_put("me/albums", &params, None).await?;
        Ok(())
    }

    /// Removes one or more albums from the current user's library.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/remove-albums-user)
    pub async fn current_user_saved_albums_delete(
        &self,
        album_ids: &[AlbumId],
    ) -> ClientResult<()> {
        let ids = album_ids.join(",");
        let params = build_query([("ids", MissingOr::Present(&ids))]);
        self.api_delete("me/albums", &params, None).await?;
        Ok(())
    }

    /// Checks whether one or more albums are saved in the current user's
    /// library.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/check-users-saved-albums)
    pub async fn current_user_saved_albums_contains(
        &self,
        album_ids: &[AlbumId],
    ) -> ClientResult<Vec<bool>> {
        let ids = album_ids.join(",");
        let params = build_query([("ids", MissingOr::Present(&ids))]);
        let result = self.api_get("me/albums/contains", &params).await?;
        convert_result(&result)
    }

    /// Gets a list of new album releases featured in Spotify.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-new-releases)
    pub async fn new_releases(
        &self,
        country: MissingOr<&str>,
        limit: MissingOr<u32>,
        offset: MissingOr<u32>,
    ) -> ClientResult<Page<SimplifiedAlbum>> {
        let limit = limit.map(|x| x.to_string());
        let offset = offset.map(|x| x.to_string());
        let params = build_query([
            ("country", country),
            ("limit", limit.as_deref()),
            ("offset", offset.as_deref()),
        ]);
        let result = self.api_get("browse/new-releases", &params).await?;
        convert_result::<PageSimplifiedAlbums>(&result).map(|x| x.albums)
    }

    // Artists

    /// Returns a single artist given the artist's ID.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-an-artist)
    pub async fn artist(&self, artist_id: ArtistId) -> ClientResult<FullArtist> {
        let result = self
            .api_get(&format!("artists/{artist_id}"), &Query::new())
            .await?;
        convert_result(&result)
    }

    /// Returns a list of artists given the artist IDs.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-multiple-artists)
    pub async fn artists(&self, artist_ids: &[ArtistId]) -> ClientResult<Vec<FullArtist>> {
        let ids = artist_ids.join(",");
        let params = build_query([("ids", MissingOr::Present(&ids))]);
        let result = self.api_get("artists", &params).await?;
        convert_result::<Artists>(&result).map(|x| x.artists)
    }

    /// Gets an artist's albums.
    ///
    /// Parameters:
    /// - artist_id - the artist ID
    /// - include_groups - the relationships between the artist and the
    ///   albums to include
    /// - market, limit, offset - the usual listing parameters
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-an-artists-albums)
    pub async fn artist_albums(
        &self,
        artist_id: ArtistId,
        include_groups: MissingOr<&[AlbumGroup]>,
        market: MissingOr<&str>,
        limit: MissingOr<u32>,
        offset: MissingOr<u32>,
    ) -> ClientResult<Page<SimplifiedAlbum>> {
        let include_groups = include_groups.map(|groups| {
            groups
                .iter()
                .map(|group| group.as_str())
                .collect::<Vec<_>>()
                .join(",")
        });
        let limit = limit.map(|x| x.to_string());
        let offset = offset.map(|x| x.to_string());
        let params = build_query([
            ("include_groups", include_groups.as_deref()),
            ("market", market),
            ("limit", limit.as_deref()),
            ("offset", offset.as_deref()),
        ]);
        let result = self
            .api_get(&format!("artists/{artist_id}/albums"), &params)
            .await?;
        convert_result(&result)
    }

    /// Gets an artist's top tracks by country.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-an-artists-top-tracks)
    pub async fn artist_top_tracks(
        &self,
        artist_id: ArtistId,
        market: MissingOr<&str>,
    ) -> ClientResult<Vec<FullTrack>> {
        let params = build_query([("market", market)]);
        let result = self
            .api_get(&format!("artists/{artist_id}/top-tracks"), &params)
            .await?;
        convert_result::<Tracks>(&result).map(|x| x.tracks)
    }

    /// Gets artists similar to an artist.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-an-artists-related-artists)
    pub async fn artist_related_artists(
        &self,
        artist_id: ArtistId,
    ) -> ClientResult<Vec<FullArtist>> {
        let result = self
            .api_get(&format!("artists/{artist_id}/related-artists"), &Query::new())
            .await?;
        convert_result::<Artists>(&result).map(|x| x.artists)
    }

    // Tracks

    /// Returns a single track given the track's ID.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-track)
    pub async fn track(
        &self,
        track_id: TrackId,
        market: MissingOr<&str>,
    ) -> ClientResult<FullTrack> {
        let params = build_query([("market", market)]);
        let result = self.api_get(&format!("tracks/{track_id}"), &params).await?;
        convert_result(&result)
    }

    /// Returns a list of tracks given their IDs.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-several-tracks)
    pub async fn tracks(
        &self,
        track_ids: &[TrackId],
        market: MissingOr<&str>,
    ) -> ClientResult<Vec<FullTrack>> {
        let ids = track_ids.join(",");
        let params = build_query([("ids", MissingOr::Present(&ids)), ("market", market)]);
        let result = self.api_get("tracks", &params).await?;
        convert_result::<Tracks>(&result).map(|x| x.tracks)
    }

    /// Gets the tracks saved in the current user's library.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-users-saved-tracks)
    pub async fn current_user_saved_tracks(
        &self,
        market: MissingOr<&str>,
        limit: MissingOr<u32>,
        offset: MissingOr<u32>,
    ) -> ClientResult<Page<SavedTrack>> {
        let limit = limit.map(|x| x.to_string());
        let offset = offset.map(|x| x.to_string());
        let params = build_query([
            ("market", market),
            ("limit", limit.as_deref()),
            ("offset", offset.as_deref()),
        ]);
        let result = self.api_get("me/tracks", &params).await?;
        convert_result(&result)
    }

    /// Saves one or more tracks to the current user's library.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/save-tracks-user)
    pub async fn current_user_saved_tracks_add(&self, track_ids: &[TrackId]) -> ClientResult<()> {
        let ids = track_ids.join(",");
        let params = build_query([("ids", MissingOr::Present(&ids))]);
        self.api_put("me/tracks", &params, None).await?;
        Ok(())
    }

    /// Removes one or more tracks from the current user's library.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/remove-tracks-user)
    pub async fn current_user_saved_tracks_delete(
        &self,
        track_ids: &[TrackId],
    ) -> ClientResult<()> {
        let ids = track_ids.join(",");
        let params = build_query([("ids", MissingOr::Present(&ids))]);
        self.api_delete("me/tracks", &params, None).await?;
        Ok(())
    }

    /// Checks whether one or more tracks are saved in the current user's
    /// library.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/check-users-saved-tracks)
    pub async fn current_user_saved_tracks_contains(
        &self,
        track_ids: &[TrackId],
    ) -> ClientResult<Vec<bool>> {
        let ids = track_ids.join(",");
        let params = build_query([("ids", MissingOr::Present(&ids))]);
        let result = self.api_get("me/tracks/contains", &params).await?;
        convert_result(&result)
    }

    /// Gets the audio features of a track.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-audio-features)
    pub async fn track_features(&self, track_id: TrackId) -> ClientResult<AudioFeatures> {
        let result = self
            .api_get(&format!("audio-features/{track_id}"), &Query::new())
            .await?;
        convert_result(&result)
    }

    /// Gets the audio features of several tracks.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-several-audio-features)
    pub async fn tracks_features(
        &self,
        track_ids: &[TrackId],
    ) -> ClientResult<Vec<AudioFeatures>> {
        let ids = track_ids.join(",");
        let params = build_query([("ids", MissingOr::Present(&ids))]);
        let result = self.api_get("audio-features", &params).await?;
        convert_result::<AudioFeaturesPayload>(&result).map(|x| x.audio_features)
    }

    /// Gets the low-level audio analysis of a track.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-audio-analysis)
    pub async fn track_analysis(&self, track_id: TrackId) -> ClientResult<AudioAnalysis> {
        let result = self
            .api_get(&format!("audio-analysis/{track_id}"), &Query::new())
            .await?;
        convert_result(&result)
    }

    // Search

    /// Searches the catalog for one kind of item.
    ///
    /// Parameters:
    /// - q - the search query; must not be empty
    /// - item_type - the kind of item to search for
    /// - market, include_external, limit, offset - the usual listing
    ///   parameters; `include_external` currently only accepts `audio`
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/search)
    pub async fn search(
        &self,
        q: &str,
        item_type: SearchType,
        market: MissingOr<&str>,
        include_external: MissingOr<&str>,
        limit: MissingOr<u32>,
        offset: MissingOr<u32>,
    ) -> ClientResult<SearchResult> {
        let result = self
            .search_raw(q, &[item_type], market, include_external, limit, offset)
            .await?;
        convert_result(&result)
    }

    /// Searches the catalog for several kinds of items at once.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/search)
    pub async fn search_multiple(
        &self,
        q: &str,
        item_types: &[SearchType],
        market: MissingOr<&str>,
        include_external: MissingOr<&str>,
        limit: MissingOr<u32>,
        offset: MissingOr<u32>,
    ) -> ClientResult<SearchMultipleResult> {
        let result = self
            .search_raw(q, item_types, market, include_external, limit, offset)
            .await?;
        convert_result(&result)
    }

    async fn search_raw(
        &self,
        q: &str,
        item_types: &[SearchType],
        market: MissingOr<&str>,
        include_external: MissingOr<&str>,
        limit: MissingOr<u32>,
        offset: MissingOr<u32>,
    ) -> ClientResult<String> {
        if q.is_empty() {
            return Err(ClientError::InvalidArgument(
                "the search query must not be empty".to_owned(),
            ));
        }
        let item_types = item_types
            .iter()
            .map(|item_type| item_type.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let limit = limit.map(|x| x.to_string());
        let offset = offset.map(|x| x.to_string());
        let params = build_query([
            ("q", MissingOr::Present(q)),
            ("type", MissingOr::Present(&item_types)),
            ("market", market),
            ("include_external", include_external),
            ("limit", limit.as_deref()),
            ("offset", offset.as_deref()),
        ]);
        self.api_get("search", &params).await
    }

    // Playlists

    /// Gets a playlist.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-playlist)
    pub async fn playlist(
        &self,
        playlist_id: PlaylistId,
        fields: MissingOr<&str>,
        market: MissingOr<&str>,
    ) -> ClientResult<FullPlaylist> {
        let params = build_query([("fields", fields), ("market", market)]);
        let result = self
            .api_get(&format!("playlists/{playlist_id}"), &params)
            .await?;
        convert_result(&result)
    }

    /// Changes a playlist's name and/or public/private state.
    ///
    /// Note: the Web API cannot clear the description. Setting it to an
    /// empty string is accepted but has no effect upstream.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/change-playlist-details)
    pub async fn playlist_change_detail(
        &self,
        playlist_id: PlaylistId,
        name: MissingOr<&str>,
        public: MissingOr<bool>,
        collaborative: MissingOr<bool>,
        description: MissingOr<&str>,
    ) -> ClientResult<()> {
        let params = JsonBuilder::new()
            .optional("name", name)
            .optional("public", public)
            .optional("collaborative", collaborative)
            .optional("description", description)
            .build();
        self.api_put(&format!("playlists/{playlist_id}"), &Query::new(), Some(&params))
            .await?;
        Ok(())
    }

    /// Gets full details of the items of a playlist.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-playlists-tracks)
    pub async fn playlist_items(
        &self,
        playlist_id: PlaylistId,
        fields: MissingOr<&str>,
        market: MissingOr<&str>,
        limit: MissingOr<u32>,
        offset: MissingOr<u32>,
    ) -> ClientResult<Page<PlaylistItem>> {
        let limit = limit.map(|x| x.to_string());
        let offset = offset.map(|x| x.to_string());
        let params = build_query([
            ("fields", fields),
            ("market", market),
            ("limit", limit.as_deref()),
            ("offset", offset.as_deref()),
        ]);
        let result = self
            .api_get(&format!("playlists/{playlist_id}/tracks"), &params)
            .await?;
        convert_result(&result)
    }

    /// Adds items to a playlist.
    ///
    /// Parameters:
    /// - playlist_id - the id of the playlist
    /// - item_uris - a list of track or episode URIs
    /// - position - the position to insert the items at, a zero-based index
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/add-tracks-to-playlist)
    pub async fn playlist_add_items(
        &self,
        playlist_id: PlaylistId,
        item_uris: &[&str],
        position: MissingOr<u32>,
    ) -> ClientResult<PlaylistResult> {
        let params = JsonBuilder::new()
            .required("uris", item_uris)
            .optional("position", position)
            .build();
        let result = self
            .api_post(&format!("playlists/{playlist_id}/tracks"), &Query::new(), Some(&params))
            .await?;
        convert_result(&result)
    }

    /// Removes all occurrences of the given items from the given playlist.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/remove-tracks-playlist)
    pub async fn playlist_remove_items(
        &self,
        playlist_id: PlaylistId,
        item_uris: &[&str],
        snapshot_id: MissingOr<&str>,
    ) -> ClientResult<PlaylistResult> {
        let tracks = item_uris
            .iter()
            .map(|uri| json!({ "uri": uri }))
            .collect::<Vec<_>>();
        let params = JsonBuilder::new()
            .required("tracks", tracks)
            .optional("snapshot_id", snapshot_id)
            .build();
        let result = self
            .api_delete(&format!("playlists/{playlist_id}/tracks"), &Query::new(), Some(&params))
            .await?;
        convert_result(&result)
    }

    /// Gets the current user's playlists without requiring their profile.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-a-list-of-current-users-playlists)
    pub async fn current_user_playlists(
        &self,
        limit: MissingOr<u32>,
        offset: MissingOr<u32>,
    ) -> ClientResult<Page<SimplifiedPlaylist>> {
        let limit = limit.map(|x| x.to_string());
        let offset = offset.map(|x| x.to_string());
        let params = build_query([("limit", limit.as_deref()), ("offset", offset.as_deref())]);
        let result = self.api_get("me/playlists", &params).await?;
        convert_result(&result)
    }

    /// Gets the playlists of a user.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-list-users-playlists)
    pub async fn user_playlists(
        &self,
        user_id: &str,
        limit: MissingOr<u32>,
        offset: MissingOr<u32>,
    ) -> ClientResult<Page<SimplifiedPlaylist>> {
        let limit = limit.map(|x| x.to_string());
        let offset = offset.map(|x| x.to_string());
        let params = build_query([("limit", limit.as_deref()), ("offset", offset.as_deref())]);
        let result = self
            .api_get(&format!("users/{user_id}/playlists"), &params)
            .await?;
        convert_result(&result)
    }

    /// Creates a playlist for a user.
    ///
    /// Parameters:
    /// - user_id - the id of the user
    /// - name - the name of the playlist
    /// - public - is the created playlist public
    /// - collaborative - if the playlist will be collaborative. Note: to
    ///   create a collaborative playlist you must also set public to false
    /// - description - the description of the playlist
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/create-playlist)
    pub async fn user_playlist_create(
        &self,
        user_id: &str,
        name: &str,
        public: MissingOr<bool>,
        collaborative: MissingOr<bool>,
        description: MissingOr<&str>,
    ) -> ClientResult<FullPlaylist> {
        debug_assert!(
            !(matches!(collaborative, MissingOr::Present(true))
                && matches!(public, MissingOr::Present(true))),
            "To create a collaborative playlist you must also set public to \
            false. See the reference for more information."
        );
        let params = JsonBuilder::new()
            .required("name", name)
            .optional("public", public)
            .optional("collaborative", collaborative)
            .optional("description", description)
            .build();
        let result = self
            .api_post(&format!("users/{user_id}/playlists"), &Query::new(), Some(&params))
            .await?;
        convert_result(&result)
    }

    /// Gets a list of Spotify featured playlists.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-featured-playlists)
    pub async fn featured_playlists(
        &self,
        locale: MissingOr<&str>,
        country: MissingOr<&str>,
        limit: MissingOr<u32>,
        offset: MissingOr<u32>,
    ) -> ClientResult<FeaturedPlaylists> {
        let limit = limit.map(|x| x.to_string());
        let offset = offset.map(|x| x.to_string());
        let params = build_query([
            ("locale", locale),
            ("country", country),
            ("limit", limit.as_deref()),
            ("offset", offset.as_deref()),
        ]);
        let result = self.api_get("browse/featured-playlists", &params).await?;
        convert_result(&result)
    }

    /// Gets a category's playlists.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-a-categories-playlists)
    pub async fn category_playlists(
        &self,
        category_id: &str,
        country: MissingOr<&str>,
        limit: MissingOr<u32>,
        offset: MissingOr<u32>,
    ) -> ClientResult<Page<SimplifiedPlaylist>> {
        let limit = limit.map(|x| x.to_string());
        let offset = offset.map(|x| x.to_string());
        let params = build_query([
            ("country", country),
            ("limit", limit.as_deref()),
            ("offset", offset.as_deref()),
        ]);
        let result = self
            .api_get(&format!("browse/categories/{category_id}/playlists"), &params)
            .await?;
        convert_result::<FeaturedPlaylists>(&result).map(|x| x.playlists)
    }

    /// Gets the current cover image of a playlist.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-playlist-cover)
    pub async fn playlist_cover_image(&self, playlist_id: PlaylistId) -> ClientResult<Vec<Image>> {
        let result = self
            .api_get(&format!("playlists/{playlist_id}/images"), &Query::new())
            .await?;
        convert_result(&result)
    }

    /// Replaces the cover image of a playlist with a JPEG of at most 256 KB.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/upload-custom-playlist-cover)
    pub async fn playlist_upload_cover_image(
        &self,
        playlist_id: PlaylistId,
        image: &[u8],
    ) -> ClientResult<()> {
        // The endpoint wants the raw JPEG re-encoded as base64 in the body.
        let body = general_purpose::STANDARD.encode(image).into_bytes();
        self.send(
            Method::PUT,
            &format!("playlists/{playlist_id}/images"),
            &Query::new(),
            None,
            Some(body),
        )
        .await?;
        Ok(())
    }

    /// Adds the current user as a follower of a playlist.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/follow-playlist)
    pub async fn playlist_follow(
        &self,
        playlist_id: PlaylistId,
        public: MissingOr<bool>,
    ) -> ClientResult<()> {
        let params = JsonBuilder::new().optional("public", public).build();
        self.api_put(&format!("playlists/{playlist_id}/followers"), &Query::new(), Some(&params))
            .await?;
        Ok(())
    }

    /// Unfollows (deletes) a playlist for the current user.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/unfollow-playlist)
    pub async fn playlist_unfollow(&self, playlist_id: PlaylistId) -> ClientResult<()> {
        self.api_delete(&format!("playlists/{playlist_id}/followers"), &Query::new(), None)
            .await?;
        Ok(())
    }

    /// Checks whether the given users follow a playlist.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/check-if-user-follows-playlist)
    pub async fn playlist_check_follow(
        &self,
        playlist_id: PlaylistId,
        user_ids: &[&str],
    ) -> ClientResult<Vec<bool>> {
        let ids = user_ids.join(",");
        let params = build_query([("ids", MissingOr::Present(&ids))]);
        let result = self
            .api_get(&format!("playlists/{playlist_id}/followers/contains"), &params)
            .await?;
        convert_result(&result)
    }

    // Player

    /// Gets information about the user's current playback, or `None` when
    /// nothing is playing on any device.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-information-about-the-users-current-playback)
    pub async fn current_playback(
        &self,
        market: MissingOr<&str>,
        additional_types: MissingOr<&[AdditionalType]>,
    ) -> ClientResult<Option<CurrentPlaybackContext>> {
        let additional_types = additional_types.map(join_additional_types);
        let params = build_query([
            ("market", market),
            ("additional_types", additional_types.as_deref()),
        ]);
        let result = self.api_get("me/player", &params).await?;
        if result.is_empty() {
            Ok(None)
        } else {
            convert_result(&result)
        }
    }

    /// Gets the item currently playing for the user, or `None` when nothing
    /// is playing.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-the-users-currently-playing-track)
    pub async fn current_user_playing_item(
        &self,
        market: MissingOr<&str>,
        additional_types: MissingOr<&[AdditionalType]>,
    ) -> ClientResult<Option<CurrentlyPlayingContext>> {
        let additional_types = additional_types.map(join_additional_types);
        let params = build_query([
            ("market", market),
            ("additional_types", additional_types.as_deref()),
        ]);
        let result = self.api_get("me/player/currently-playing", &params).await?;
        if result.is_empty() {
            Ok(None)
        } else {
            convert_result(&result)
        }
    }

    /// Transfers playback to another device.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/transfer-a-users-playback)
    pub async fn transfer_playback(
        &self,
        device_id: &str,
        play: MissingOr<bool>,
    ) -> ClientResult<()> {
        let params = JsonBuilder::new()
            .required("device_ids", [device_id])
            .optional("play", play)
            .build();
        self.api_put("me/player", &Query::new(), Some(&params)).await?;
        Ok(())
    }

    /// Gets the user's available devices.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-a-users-available-devices)
    pub async fn device(&self) -> ClientResult<Vec<Device>> {
        let result = self.api_get("me/player/devices", &Query::new()).await?;
        convert_result::<DevicePayload>(&result).map(|x| x.devices)
    }

    /// Starts or resumes the user's playback, either inside a context (an
    /// album, playlist or artist URI) or over an explicit list of item URIs.
    /// Supplying both is an error. With neither, playback resumes where it
    /// was.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/start-a-users-playback)
    pub async fn start_playback(
        &self,
        device_id: MissingOr<&str>,
        context_uri: MissingOr<&str>,
        uris: MissingOr<&[&str]>,
        offset: MissingOr<Offset>,
        position: MissingOr<Duration>,
    ) -> ClientResult<()> {
        if !context_uri.is_missing() && !uris.is_missing() {
            return Err(ClientError::InvalidArgument(
                "only one of `context_uri` and `uris` may be supplied".to_owned(),
            ));
        }
        let params = JsonBuilder::new()
            .optional("context_uri", context_uri)
            .optional("uris", uris)
            .optional(
                "offset",
                offset.map(|offset| match offset {
                    Offset::Position(position) => json!({ "position": position }),
                    Offset::Uri(uri) => json!({ "uri": uri }),
                }),
            )
            .optional("position_ms", position.map(|x| x.num_milliseconds()))
            .build();
        self.api_put(&append_device_id("me/player/play", device_id), &Query::new(), Some(&params))
            .await?;
        Ok(())
    }

    /// Pauses the user's playback.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/pause-a-users-playback)
    pub async fn pause_playback(&self, device_id: MissingOr<&str>) -> ClientResult<()> {
        self.api_put(&append_device_id("me/player/pause", device_id), &Query::new(), None)
            .await?;
        Ok(())
    }

    /// Skips the user's playback to the next track.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/skip-users-playback-to-next-track)
    pub async fn next_track(&self, device_id: MissingOr<&str>) -> ClientResult<()> {
        self.api_post(&append_device_id("me/player/next", device_id), &Query::new(), None)
            .await?;
        Ok(())
    }

    /// Skips the user's playback to the previous track.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/skip-users-playback-to-previous-track)
    pub async fn previous_track(&self, device_id: MissingOr<&str>) -> ClientResult<()> {
        self.api_post(&append_device_id("me/player/previous", device_id), &Query::new(), None)
            .await?;
        Ok(())
    }

    /// Seeks to a position in the currently playing track.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/seek-to-position-in-currently-playing-track)
    pub async fn seek_track(
        &self,
        position: Duration,
        device_id: MissingOr<&str>,
    ) -> ClientResult<()> {
        let path = format!("me/player/seek?position_ms={}", position.num_milliseconds());
        self.api_put(&append_device_id(&path, device_id), &Query::new(), None)
            .await?;
        Ok(())
    }

    /// Sets the repeat mode for the user's playback.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/set-repeat-mode-on-users-playback)
    pub async fn repeat(
        &self,
        state: RepeatState,
        device_id: MissingOr<&str>,
    ) -> ClientResult<()> {
        let path = format!("me/player/repeat?state={}", state.as_str());
        self.api_put(&append_device_id(&path, device_id), &Query::new(), None)
            .await?;
        Ok(())
    }

    /// Sets the volume of the user's playback.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/set-volume-for-users-playback)
    pub async fn volume(
        &self,
        volume_percent: u8,
        device_id: MissingOr<&str>,
    ) -> ClientResult<()> {
        debug_assert!(
            volume_percent <= 100_u8,
            "volume must be between 0 and 100, inclusive"
        );
        let path = format!("me/player/volume?volume_percent={volume_percent}");
        self.api_put(&append_device_id(&path, device_id), &Query::new(), None)
            .await?;
        Ok(())
    }

    /// Toggles shuffle for the user's playback.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/toggle-shuffle-for-users-playback)
    pub async fn shuffle(&self, state: bool, device_id: MissingOr<&str>) -> ClientResult<()> {
        let path = format!("me/player/shuffle?state={state}");
        self.api_put(&append_device_id(&path, device_id), &Query::new(), None)
            .await?;
        Ok(())
    }

    /// Gets tracks from the current user's recently played tracks. At most
    /// one of `after` and `before` may bound the cursor.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-recently-played)
    pub async fn current_user_recently_played(
        &self,
        limit: MissingOr<u32>,
        after: MissingOr<DateTime<Utc>>,
        before: MissingOr<DateTime<Utc>>,
    ) -> ClientResult<CursorBasedPage<PlayHistory>> {
        if !after.is_missing() && !before.is_missing() {
            return Err(ClientError::InvalidArgument(
                "only one of `after` and `before` may be supplied".to_owned(),
            ));
        }
        let limit = limit.map(|x| x.to_string());
        let after = after.map(|x| x.timestamp_millis().to_string());
        let before = before.map(|x| x.timestamp_millis().to_string());
        let params = build_query([
            ("limit", limit.as_deref()),
            ("after", after.as_deref()),
            ("before", before.as_deref()),
        ]);
        let result = self.api_get("me/player/recently-played", &params).await?;
        convert_result(&result)
    }

    /// Gets the current user's queue.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-queue)
    pub async fn current_user_queue(&self) -> ClientResult<CurrentUserQueue> {
        let result = self.api_get("me/player/queue", &Query::new()).await?;
        convert_result(&result)
    }

    /// Adds an item to the end of the user's playback queue.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/add-to-queue)
    pub async fn add_item_to_queue(
        &self,
        uri: &str,
        device_id: MissingOr<&str>,
    ) -> ClientResult<()> {
        let params = build_query([("uri", MissingOr::Present(uri)), ("device_id", device_id)]);
        self.api_post("me/player/queue", &params, None).await?;
        Ok(())
    }

    // Users

    /// Gets detailed profile information about the current user.
    /// An alias for the [`Self::current_user`] method.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-current-users-profile)
    pub async fn me(&self) -> ClientResult<PrivateUser> {
        let result = self.api_get("me", &Query::new()).await?;
        convert_result(&result)
    }

    /// Gets detailed profile information about the current user.
    /// An alias for the [`Self::me`] method.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-current-users-profile)
    pub async fn current_user(&self) -> ClientResult<PrivateUser> {
        self.me().await
    }

    /// Gets public profile information about a user.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-users-profile)
    pub async fn user(&self, user_id: &str) -> ClientResult<PublicUser> {
        let result = self.api_get(&format!("users/{user_id}"), &Query::new()).await?;
        convert_result(&result)
    }

    /// Gets the current user's top artists.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-users-top-artists-and-tracks)
    pub async fn current_user_top_artists(
        &self,
        time_range: MissingOr<TimeRange>,
        limit: MissingOr<u32>,
        offset: MissingOr<u32>,
    ) -> ClientResult<Page<FullArtist>> {
        let limit = limit.map(|x| x.to_string());
        let offset = offset.map(|x| x.to_string());
        let params = build_query([
            ("time_range", time_range.map(TimeRange::as_str)),
            ("limit", limit.as_deref()),
            ("offset", offset.as_deref()),
        ]);
        let result = self.api_get("me/top/artists", &params).await?;
        convert_result(&result)
    }

    /// Gets the current user's top tracks.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-users-top-artists-and-tracks)
    pub async fn current_user_top_tracks(
        &self,
        time_range: MissingOr<TimeRange>,
        limit: MissingOr<u32>,
        offset: MissingOr<u32>,
    ) -> ClientResult<Page<FullTrack>> {
        let limit = limit.map(|x| x.to_string());
        let offset = offset.map(|x| x.to_string());
        let params = build_query([
            ("time_range", time_range.map(TimeRange::as_str)),
            ("limit", limit.as_deref()),
            ("offset", offset.as_deref()),
        ]);
        let result = self.api_get("me/top/tracks", &params).await?;
        convert_result(&result)
    }

    /// Gets the artists followed by the current user.
    ///
    /// Parameters:
    /// - after - the last artist ID retrieved from the previous request
    /// - limit - the number of artists to return
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-followed)
    pub async fn current_user_followed_artists(
        &self,
        after: MissingOr<&str>,
        limit: MissingOr<u32>,
    ) -> ClientResult<CursorBasedPage<FullArtist>> {
        let limit = limit.map(|x| x.to_string());
        let params = build_query([
            ("type", MissingOr::Present(FollowType::Artist.as_str())),
            ("after", after),
            ("limit", limit.as_deref()),
        ]);
        let result = self.api_get("me/following", &params).await?;
        convert_result::<CursorPageFullArtists>(&result).map(|x| x.artists)
    }

    /// Follows one or more artists or users as the current user.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/follow-artists-users)
    pub async fn user_follow(&self, follow_type: FollowType, ids: &[&str]) -> ClientResult<()> {
        let ids = ids.join(",");
        let params = build_query([
            ("type", MissingOr::Present(follow_type.as_str())),
            ("ids", MissingOr::Present(&ids)),
        ]);
        self.api_put("me/following", &params, None).await?;
        Ok(())
    }

    /// Unfollows one or more artists or users as the current user.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/unfollow-artists-users)
    pub async fn user_unfollow(&self, follow_type: FollowType, ids: &[&str]) -> ClientResult<()> {
        let ids = ids.join(",");
        let params = build_query([
            ("type", MissingOr::Present(follow_type.as_str())),
            ("ids", MissingOr::Present(&ids)),
        ]);
        self.api_delete("me/following", &params, None).await?;
        Ok(())
    }

    /// Checks whether the current user follows the given artists or users.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/check-current-user-follows)
    pub async fn user_check_follow(
        &self,
        follow_type: FollowType,
        ids: &[&str],
    ) -> ClientResult<Vec<bool>> {
        let ids = ids.join(",");
        let params = build_query([
            ("type", MissingOr::Present(follow_type.as_str())),
            ("ids", MissingOr::Present(&ids)),
        ]);
        let result = self.api_get("me/following/contains", &params).await?;
        convert_result(&result)
    }

    // Browse

    /// Gets a list of categories used to tag items in Spotify.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-categories)
    pub async fn categories(
        &self,
        locale: MissingOr<&str>,
        limit: MissingOr<u32>,
        offset: MissingOr<u32>,
    ) -> ClientResult<Page<Category>> {
        let limit = limit.map(|x| x.to_string());
        let offset = offset.map(|x| x.to_string());
        let params = build_query([
            ("locale", locale),
            ("limit", limit.as_deref()),
            ("offset", offset.as_deref()),
        ]);
        let result = self.api_get("browse/categories", &params).await?;
        convert_result::<PageCategory>(&result).map(|x| x.categories)
    }

    /// Gets a single category used to tag items in Spotify.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-a-category)
    pub async fn category(
        &self,
        category_id: &str,
        locale: MissingOr<&str>,
    ) -> ClientResult<Category> {
        let params = build_query([("locale", locale)]);
        let result = self
            .api_get(&format!("browse/categories/{category_id}"), &params)
            .await?;
        convert_result(&result)
    }

    /// Gets the genre seeds available for recommendations.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-recommendation-genres)
    pub async fn available_genre_seeds(&self) -> ClientResult<Vec<String>> {
        let result = self
            .api_get("recommendations/available-genre-seeds", &Query::new())
            .await?;
        convert_result::<AvailableGenreSeeds>(&result).map(|x| x.genres)
    }

    /// Gets the markets where Spotify is available.
    ///
    /// [Reference](https://developer.spotify.com/documentation/web-api/reference/get-available-markets)
    pub async fn available_markets(&self) -> ClientResult<Vec<String>> {
        let result = self.api_get("markets", &Query::new()).await?;
        convert_result::<AvailableMarkets>(&result).map(|x| x.markets)
    }
}

fn join_additional_types(additional_types: &[AdditionalType]) -> String {
    additional_types
        .iter()
        .map(|additional_type| additional_type.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_lands_in_the_right_place() {
        assert_eq!(
            append_device_id("me/player/pause", MissingOr::Present("abc")),
            "me/player/pause?device_id=abc"
        );
        assert_eq!(
            append_device_id("me/player/seek?position_ms=1000", MissingOr::Present("abc")),
            "me/player/seek?position_ms=1000&device_id=abc"
        );
        assert_eq!(
            append_device_id("me/player/pause", MissingOr::Missing),
            "me/player/pause"
        );
    }

    #[test]
    fn malformed_payloads_surface_as_parse_errors() {
        let result = convert_result::<Followers>("{\"total\": \"not-a-number\"}");
        assert!(matches!(result, Err(ClientError::ParseJson(_))));
    }

    #[test]
    fn error_envelopes_deserialize() {
        let envelope: ApiErrorEnvelope =
            serde_json::from_str(r#"{"error": {"status": 404, "message": "Not found."}}"#).unwrap();
        assert_eq!(envelope.error.status, 404);
        assert_eq!(envelope.error.message.as_deref(), Some("Not found."));
    }
}
