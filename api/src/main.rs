use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sm_api::{create_app, ApiConfig, AppState};
use sm_core::services::{AuthService, CaptchaVerifier, IdentityVerifier};
use sm_infra::{
    mail::create_email_sender, DatabasePool, GoogleIdentityVerifier, MySqlLoginAttemptRepository,
    MySqlOneTimeTokenRepository, MySqlSessionRepository, MySqlUserRepository, RecaptchaVerifier,
};
use sm_shared::config::{AppConfig, LogFormat, LoggingConfig};

fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    let layer = fmt::layer()
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    match config.format {
        LogFormat::Json => registry.with(layer.json()).init(),
        LogFormat::Pretty => registry.with(layer.pretty()).init(),
        LogFormat::Compact => registry.with(layer.compact()).init(),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    tracing::info!(environment = %config.environment, "Starting SlimmerMetAI auth server");

    let database = DatabasePool::new(config.database.clone())
        .await
        .context("failed to connect to the database")?;
    if config.database.run_migrations {
        database
            .run_migrations()
            .await
            .context("failed to run database migrations")?;
    }
    let pool = database.get_pool().clone();

    let email_sender = create_email_sender(&config.mail)?;
    let mut auth_service = AuthService::new(
        Arc::new(MySqlUserRepository::new(pool.clone())),
        Arc::new(MySqlSessionRepository::new(pool.clone())),
        Arc::new(MySqlLoginAttemptRepository::new(pool.clone())),
        Arc::new(MySqlOneTimeTokenRepository::new(pool)),
        email_sender,
        &config.auth,
    )
    .context("invalid authentication settings")?;

    match RecaptchaVerifier::from_config(&config.captcha)? {
        Some(verifier) => {
            let verifier: Arc<dyn CaptchaVerifier> = Arc::new(verifier);
            auth_service = auth_service.with_captcha_verifier(verifier);
        }
        None => tracing::warn!("CAPTCHA secret not configured, CAPTCHA escalation disabled"),
    }
    match GoogleIdentityVerifier::from_config(&config.auth.google)? {
        Some(verifier) => {
            let verifier: Arc<dyn IdentityVerifier> = Arc::new(verifier);
            auth_service = auth_service.with_identity_verifier(verifier);
        }
        None => tracing::info!("Google client id not configured, Google sign-in disabled"),
    }

    Arc::new(auth_service.maintenance(config.maintenance.clone())).start_background_task();

    let state = web::Data::new(AppState::new(
        Arc::new(auth_service),
        ApiConfig::from_app_config(&config),
    ));

    let bind_address = config.server.bind_address();
    tracing::info!(address = %bind_address, workers = config.server.workers, "Binding HTTP server");

    let cors = config.server.cors.clone();
    let environment = config.environment;
    HttpServer::new(move || create_app(state.clone(), &cors, environment))
        .workers(config.server.workers.max(1))
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    database.close().await;
    tracing::info!("Server stopped");
    Ok(())
}
