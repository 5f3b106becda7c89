//! Application Startup
//!
//! Wires the room registry, token verifier and live room services together
//! and binds the HTTP/WebSocket listener.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;

use crate::application::services::{
    ChatRelay, JwtTokenVerifier, PlaybackSynchronizer, RoomSessionManager, SignalingRelay,
    TokenVerifier,
};
use crate::config::Settings;
use crate::domain::RoomRegistry;
use crate::infrastructure::database;
use crate::infrastructure::repositories::{InMemoryRoomRegistry, PgRoomRegistry};
use crate::presentation::http::{handlers::health, routes};
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::Gateway;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub gateway: Arc<Gateway>,
    pub rooms: Arc<RoomSessionManager>,
    pub sync: PlaybackSynchronizer,
    pub signaling: SignalingRelay,
    pub chat: ChatRelay,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(
        settings: Arc<Settings>,
        registry: Arc<dyn RoomRegistry>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        let gateway = Arc::new(Gateway::new(settings.websocket.outbound_queue_capacity));
        let rooms = RoomSessionManager::new(registry, gateway.clone(), &settings.rooms);

        Self {
            sync: PlaybackSynchronizer::new(rooms.clone()),
            signaling: SignalingRelay::new(rooms.clone()),
            chat: ChatRelay::new(rooms.clone(), settings.websocket.max_chat_length),
            gateway,
            rooms,
            verifier,
            settings,
        }
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let registry = build_registry(&settings).await?;
        let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtTokenVerifier::new(&settings.jwt));
        let state = AppState::new(Arc::new(settings.clone()), registry, verifier);

        health::init_server_start();

        // Build router with middleware
        let router = routes::create_router(state)
            .layer(logging::create_trace_layer())
            .layer(cors::create_cors_layer(&settings.cors));

        let listener = TcpListener::bind(settings.server_addr()).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn build_registry(settings: &Settings) -> Result<Arc<dyn RoomRegistry>> {
    match settings.database.url.as_deref() {
        Some(url) => {
            let pool = database::create_pool(url, &settings.database).await?;
            tracing::info!("Database connection pool created");
            database::run_migrations(&pool).await?;
            tracing::info!("Database migrations applied");
            Ok(Arc::new(PgRoomRegistry::new(pool)))
        }
        None => {
            tracing::warn!("No database URL configured, rooms are kept in memory");
            Ok(Arc::new(InMemoryRoomRegistry::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
