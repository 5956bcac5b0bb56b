//! Request pipeline tests against a mock resource API.

use cadenza::{
    AuthCodeFlow, Client, ClientError, Config, Credentials, MissingOr, OAuth, Token,
    http::{Method, Query},
    model::{AlbumId, PlayableItem, TrackId},
};
use chrono::{Duration, Utc};
use mockito::{Matcher, Server, ServerGuard};

fn live_token() -> Token {
    Token {
        access_token: "live-access".to_owned(),
        expires_in: Duration::seconds(3600),
        expires_at: Some(Utc::now() + Duration::seconds(3600)),
        ..Token::default()
    }
}

fn client_for(server: &ServerGuard) -> Client<AuthCodeFlow> {
    let flow = AuthCodeFlow::from_token(
        Credentials::new_pkce("clientid"),
        OAuth::default(),
        live_token(),
    );
    let config = Config {
        api_base_url: format!("{}/", server.url()),
        token_url: format!("{}/api/token", server.url()),
        authorize_url: format!("{}/authorize", server.url()),
    };
    Client::with_config(flow, config)
}

const ALBUM_ID: &str = "4aawyAB9vmqN3uQ7FjRGTy";

fn album_body() -> String {
    serde_json::json!({
        "album_type": "album",
        "artists": [
            {"href": null, "id": "0TnOYISbd1XYRBk9myaseg", "name": "Pitbull"}
        ],
        "available_markets": ["US"],
        "copyrights": [],
        "genres": [],
        "href": format!("https://api.spotify.com/v1/albums/{ALBUM_ID}"),
        "id": ALBUM_ID,
        "images": [],
        "label": "Mr.305/Polo Grounds Music/RCA Records",
        "name": "Global Warming",
        "popularity": 55,
        "release_date": "2012-11-16",
        "release_date_precision": "day",
        "total_tracks": 18,
        "tracks": {
            "href": format!("https://api.spotify.com/v1/albums/{ALBUM_ID}/tracks"),
            "items": [],
            "limit": 50,
            "next": null,
            "offset": 0,
            "previous": null,
            "total": 18
        }
    })
    .to_string()
}

#[tokio::test]
async fn an_unset_market_never_reaches_the_query_string() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", format!("/albums/{ALBUM_ID}").as_str())
        // The query must be completely empty, not `market=`.
        .match_query(Matcher::Exact(String::new()))
        .with_header("content-type", "application/json")
        .with_body(album_body())
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let album_id: AlbumId = ALBUM_ID.parse().unwrap();
    let album = client.album(album_id, MissingOr::Missing).await.unwrap();
    assert_eq!(album.name, "Global Warming");
    assert_eq!(album.tracks.total, 18);
    mock.assert_async().await;
}

#[tokio::test]
async fn a_set_market_is_sent_verbatim() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", format!("/albums/{ALBUM_ID}").as_str())
        .match_query(Matcher::UrlEncoded("market".into(), "US".into()))
        .with_header("content-type", "application/json")
        .with_body(album_body())
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let album_id: AlbumId = ALBUM_ID.parse().unwrap();
    client
        .album(album_id, MissingOr::Present("US"))
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn a_present_but_empty_market_is_still_sent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", format!("/albums/{ALBUM_ID}").as_str())
        .match_query(Matcher::UrlEncoded("market".into(), String::new()))
        .with_header("content-type", "application/json")
        .with_body(album_body())
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let album_id: AlbumId = ALBUM_ID.parse().unwrap();
    client
        .album(album_id, MissingOr::Present(""))
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn a_success_with_an_empty_body_yields_no_value() {
    let mut server = Server::new_async().await;
    server
        .mock("PUT", "/me/player/pause")
        .with_status(204)
        .expect_at_least(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let raw = client
        .send(Method::PUT, "me/player/pause", &Query::new(), None, None)
        .await
        .unwrap();
    assert!(raw.is_none());

    // The typed wrapper maps the same response to a plain unit.
    client.pause_playback(MissingOr::Missing).await.unwrap();
}

#[tokio::test]
async fn the_error_envelope_beats_the_status_line() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", format!("/albums/{ALBUM_ID}").as_str())
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"status": 404, "message": "Non existing id."}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let album_id: AlbumId = ALBUM_ID.parse().unwrap();
    let err = client.album(album_id, MissingOr::Missing).await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message.as_deref(), Some("Non existing id."));
        }
        other => panic!("expected an api error, got {other:?}"),
    }
}

#[tokio::test]
async fn a_json_error_without_an_envelope_falls_back_to_the_status() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/markets")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"unexpected": "shape"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.available_markets().await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message.as_deref(), Some("Internal Server Error"));
        }
        other => panic!("expected an api error, got {other:?}"),
    }
}

#[tokio::test]
async fn a_non_json_error_uses_the_bare_status() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/markets")
        .with_status(503)
        .with_header("content-type", "text/html")
        .with_body("<html>upstream unavailable</html>")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.available_markets().await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message.as_deref(), Some("Service Unavailable"));
        }
        other => panic!("expected an api error, got {other:?}"),
    }
}

#[tokio::test]
async fn a_malformed_success_payload_is_a_parse_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", format!("/albums/{ALBUM_ID}").as_str())
        .with_header("content-type", "application/json")
        .with_body(r#"{"wrong": "shape"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let album_id: AlbumId = ALBUM_ID.parse().unwrap();
    let err = client.album(album_id, MissingOr::Missing).await.unwrap_err();
    assert!(matches!(err, ClientError::ParseJson(_)));
}

#[tokio::test]
async fn saved_track_mutations_carry_ids_in_the_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/me/tracks")
        .match_query(Matcher::UrlEncoded(
            "ids".into(),
            "11dFghVXANMlKmJXsNCbNl,7xGfFoTpQ2E7fRF5lN10tr".into(),
        ))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let track_ids: Vec<TrackId> = vec![
        "11dFghVXANMlKmJXsNCbNl".parse().unwrap(),
        "7xGfFoTpQ2E7fRF5lN10tr".parse().unwrap(),
    ];
    client
        .current_user_saved_tracks_add(&track_ids)
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn queue_items_discriminate_tracks_from_episodes() {
    let track = serde_json::json!({
        "album": {
            "album_type": "single",
            "artists": [],
            "href": null,
            "id": "5ht7ItJgpBH7W6vJ5BqpPr",
            "images": [],
            "name": "Cut To The Feeling",
            "release_date": "2017-05-26",
            "release_date_precision": "day",
            "total_tracks": 1
        },
        "artists": [{"href": null, "id": "6sFIWsNpZYqfjUpaCgueju", "name": "Carly Rae Jepsen"}],
        "disc_number": 1,
        "duration_ms": 207959,
        "explicit": false,
        "href": null,
        "id": "11dFghVXANMlKmJXsNCbNl",
        "name": "Cut To The Feeling",
        "popularity": 63,
        "preview_url": null,
        "track_number": 1
    });
    let episode = serde_json::json!({
        "description": "A Soviet science fiction classic.",
        "duration_ms": 1686230,
        "explicit": false,
        "href": "https://api.spotify.com/v1/episodes/512ojhOuo1ktJprKbVcKyQ",
        "id": "512ojhOuo1ktJprKbVcKyQ",
        "images": [],
        "is_externally_hosted": false,
        "is_playable": true,
        "languages": ["en"],
        "name": "Roadside Picnic",
        "release_date": "2020-03-08",
        "release_date_precision": "day",
        "resume_point": null,
        "show": {
            "description": "Stories from beyond.",
            "explicit": false,
            "href": "https://api.spotify.com/v1/shows/38bS44xjbVVZ3No3ByF1dJ",
            "id": "38bS44xjbVVZ3No3ByF1dJ",
            "images": [],
            "is_externally_hosted": false,
            "languages": ["en"],
            "media_type": "audio",
            "name": "Beyond",
            "publisher": "Beyond Media",
            "total_episodes": 12
        }
    });

    let mut server = Server::new_async().await;
    server
        .mock("GET", "/me/player/queue")
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({"currently_playing": track, "queue": [episode]}).to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let queue = client.current_user_queue().await.unwrap();
    match queue.currently_playing {
        Some(PlayableItem::Track(track)) => assert_eq!(track.name, "Cut To The Feeling"),
        other => panic!("expected a track, got {other:?}"),
    }
    match queue.queue.as_slice() {
        [PlayableItem::Episode(episode)] => {
            assert_eq!(episode.name, "Roadside Picnic");
            assert_eq!(episode.show.name, "Beyond");
        }
        other => panic!("expected one episode, got {other:?}"),
    }
}

#[tokio::test]
async fn an_empty_search_query_fails_before_any_request() {
    // No mock registered: reaching the server would fail the test anyway.
    let server = Server::new_async().await;
    let client = client_for(&server);
    let err = client
        .search(
            "",
            cadenza::model::SearchType::Track,
            MissingOr::Missing,
            MissingOr::Missing,
            MissingOr::Missing,
            MissingOr::Missing,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));
}

#[tokio::test]
async fn both_cursor_bounds_together_are_rejected() {
    let server = Server::new_async().await;
    let client = client_for(&server);
    let now = Utc::now();
    let err = client
        .current_user_recently_played(
            MissingOr::Missing,
            MissingOr::Present(now - Duration::hours(2)),
            MissingOr::Present(now),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));
}

#[tokio::test]
async fn change_playlist_detail_omits_unset_fields_from_the_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/playlists/3cEYpjA9oz9GiPac4AsH4n")
        .match_header("content-type", "application/json")
        // `public: false` must survive serialization; unset fields must not.
        .match_body(Matcher::Json(serde_json::json!({
            "name": "New name",
            "public": false
        })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let playlist_id = "3cEYpjA9oz9GiPac4AsH4n".parse().unwrap();
    client
        .playlist_change_detail(
            playlist_id,
            MissingOr::Present("New name"),
            MissingOr::Present(false),
            MissingOr::Missing,
            MissingOr::Missing,
        )
        .await
        .unwrap();
    mock.assert_async().await;
}
