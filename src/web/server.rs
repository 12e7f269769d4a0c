//! Web server for Credo.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::auth::TokenIssuer;
use crate::config::Config;
use crate::db::Database;
use crate::mail::Mailer;
use crate::{CredoError, Result};

use super::handlers::AppState;
use super::middleware::JwtState;
use super::router::{create_health_router, create_router, create_swagger_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// JWT state.
    jwt_state: Arc<JwtState>,
    /// CORS allowed origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, db: &Database, mailer: Arc<dyn Mailer>) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|_| {
                CredoError::Config(format!(
                    "invalid server address {}:{}",
                    config.server.host, config.server.port
                ))
            })?;

        let issuer = Arc::new(TokenIssuer::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry_secs,
            config.jwt.refresh_token_expiry_days,
        ));

        let app_state = Arc::new(AppState::new(db, issuer.clone(), mailer));
        let jwt_state = Arc::new(JwtState::new(issuer));

        Ok(Self {
            addr,
            app_state,
            jwt_state,
            cors_origins: config.server.cors_origins.clone(),
        })
    }

    /// Run the server until shutdown.
    pub async fn run(self) -> Result<()> {
        let router = create_router(self.app_state, self.jwt_state, &self.cors_origins)
            .merge(create_health_router())
            .merge(create_swagger_router());

        let listener = TcpListener::bind(self.addr).await?;
        info!("Web API listening on {}", self.addr);

        axum::serve(listener, router)
            .await
            .map_err(|e| CredoError::Io(e))?;

        Ok(())
    }
}
