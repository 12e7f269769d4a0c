use tracing::{error, info, warn};

use credo::{Config, Database, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = credo::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        credo::logging::init_console_only(&config.logging.level);
    }

    info!("Credo user-identity service");
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    if config.jwt.secret.is_empty() {
        warn!("jwt.secret is not set; using an ephemeral secret, tokens will not survive restart");
        config.jwt.secret = uuid::Uuid::new_v4().to_string();
    }

    // Open the database
    #[cfg(feature = "sqlite")]
    let db = Database::open(&config.database.path).await;
    #[cfg(feature = "postgres")]
    let db = Database::connect(&config.database.path).await;

    let db = match db {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    let mailer = credo::mail::from_config(&config.mail);

    let server = match WebServer::new(&config, &db, mailer) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to configure server: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}
