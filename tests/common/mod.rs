//! Common Test Utilities
//!
//! Builds the real router over an in-memory room registry, issues tokens
//! signed with the test secret and drives WebSocket clients.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, Router};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use watch_party_server::application::services::{issue_token, JwtTokenVerifier};
use watch_party_server::config::Settings;
use watch_party_server::domain::{MediaType, Room, RoomId};
use watch_party_server::infrastructure::repositories::InMemoryRoomRegistry;
use watch_party_server::presentation::http::routes;
use watch_party_server::startup::AppState;

pub const TEST_SECRET: &str = "integration-secret-0123456789abcdef";

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Test application builder
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a test application whose registry already holds `rooms`.
    pub fn with_rooms(rooms: &[&str]) -> Self {
        Self::configured(rooms, |_| {})
    }

    /// Like `with_rooms`, with a hook to adjust settings first.
    pub fn configured(rooms: &[&str], adjust: impl FnOnce(&mut Settings)) -> Self {
        let mut settings = Settings::with_secret(TEST_SECRET).unwrap();
        adjust(&mut settings);
        let registry = InMemoryRoomRegistry::with_rooms(rooms.iter().map(|id| room(id)));
        let verifier = JwtTokenVerifier::new(&settings.jwt);
        let state = AppState::new(Arc::new(settings), Arc::new(registry), Arc::new(verifier));

        Self {
            router: routes::create_router(state.clone()),
            state,
        }
    }

    pub fn new() -> Self {
        Self::with_rooms(&[])
    }

    /// Serve the router on an ephemeral local port.
    pub async fn spawn(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> axum::response::Response {
        self.request(Request::builder().method("GET").uri(uri), Body::empty())
            .await
    }

    /// Make an authenticated GET request
    pub async fn get_auth(&self, uri: &str, token: &str) -> axum::response::Response {
        self.request(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header("Authorization", format!("Bearer {}", token)),
            Body::empty(),
        )
        .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, uri: &str, body: &str) -> axum::response::Response {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json"),
            Body::from(body.to_string()),
        )
        .await
    }

    /// Make an authenticated POST request with JSON body
    pub async fn post_json_auth(
        &self,
        uri: &str,
        body: &str,
        token: &str,
    ) -> axum::response::Response {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", token)),
            Body::from(body.to_string()),
        )
        .await
    }

    async fn request(
        &self,
        builder: axum::http::request::Builder,
        body: Body,
    ) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }
}

pub fn room(id: &str) -> Room {
    Room {
        room_id: RoomId::parse(id).unwrap(),
        name: format!("Movie night {id}"),
        media_type: MediaType::Stream,
        media_ref: Some("https://cdn.example.com/live/master.m3u8".into()),
        created_by: None,
        created_at: Utc::now(),
    }
}

/// Token for `username`, valid for ten minutes.
pub fn token_for(username: &str) -> String {
    issue_token(
        TEST_SECRET,
        &format!("user-{username}"),
        Some(username),
        chrono::Duration::minutes(10),
    )
    .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn ws_url(addr: SocketAddr, token: &str, room_id: &str) -> String {
    format!("ws://{addr}/ws?token={token}&roomId={room_id}")
}

/// Open a socket and send `join-room`; returns before any event is read.
pub async fn connect_and_join(addr: SocketAddr, username: &str, room_id: &str) -> WsClient {
    let (mut ws, _) = tokio_tungstenite::connect_async(ws_url(addr, &token_for(username), room_id))
        .await
        .unwrap();
    send_json(
        &mut ws,
        serde_json::json!({"type": "join-room", "roomId": room_id}),
    )
    .await;
    ws
}

pub async fn send_json(ws: &mut WsClient, value: Value) {
    ws.send(Message::text(value.to_string())).await.unwrap();
}

/// Next JSON event, skipping control frames. Panics after two seconds.
pub async fn next_event(ws: &mut WsClient) -> Value {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => return serde_json::from_str::<Value>(&text).unwrap(),
                Some(Ok(Message::Close(frame))) => panic!("socket closed: {frame:?}"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => panic!("socket error: {e}"),
                None => panic!("socket ended"),
            }
        }
    })
    .await
    .expect("no event within two seconds")
}

/// Skip events until one of type `kind` arrives.
pub async fn next_event_of(ws: &mut WsClient, kind: &str) -> Value {
    loop {
        let event = next_event(ws).await;
        if event["type"] == kind {
            return event;
        }
    }
}

/// Read the three join events and return them in order.
pub async fn join_events(ws: &mut WsClient) -> [Value; 3] {
    [
        next_event(ws).await,
        next_event(ws).await,
        next_event(ws).await,
    ]
}

/// Read until the server closes the socket. Panics after two seconds.
pub async fn expect_closed(ws: &mut WsClient) {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await
    .expect("socket still open after two seconds")
}

/// Poll `condition` every 20ms for up to two seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}
