//! Application factory
//!
//! Builds the Actix-web application around an already wired `AppState`.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    error::InternalError,
    web, App, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use sm_core::repositories::{
    LoginAttemptRepository, OneTimeTokenRepository, SessionRepository, UserRepository,
};
use sm_shared::config::{CorsConfig, Environment};
use sm_shared::{error_codes, ErrorResponse};

use crate::middleware::{auth::JwtAuth, cors::create_cors};
use crate::routes::auth::{
    login::{google_login, login},
    logout::{logout, logout_all},
    me::me,
    password::{change_password, forgot_password, reset_password},
    refresh::refresh_token,
    register::register,
    verification::{resend_verification, verify_email},
    AppState,
};

/// Create and configure the application with all dependencies
pub fn create_app<U, S, L, O>(
    app_state: web::Data<AppState<U, S, L, O>>,
    cors: &CorsConfig,
    environment: Environment,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    L: LoginAttemptRepository + 'static,
    O: OneTimeTokenRepository + 'static,
{
    let codec = app_state.auth_service.token_codec();
    let json_config = web::JsonConfig::default()
        .limit(app_state.config.max_payload_size)
        .error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(ErrorResponse::new(
                error_codes::VALIDATION_ERROR,
                err.to_string(),
            ));
            InternalError::from_response(err, response).into()
        });

    App::new()
        .app_data(app_state)
        .app_data(json_config)
        .wrap(create_cors(cors, environment))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/auth")
                .route("/register", web::post().to(register::<U, S, L, O>))
                .route("/login", web::post().to(login::<U, S, L, O>))
                .route("/google", web::post().to(google_login::<U, S, L, O>))
                .route("/refresh-token", web::post().to(refresh_token::<U, S, L, O>))
                .route("/logout", web::post().to(logout::<U, S, L, O>))
                .route("/forgot-password", web::post().to(forgot_password::<U, S, L, O>))
                .route("/reset-password", web::post().to(reset_password::<U, S, L, O>))
                .route("/verify-email", web::post().to(verify_email::<U, S, L, O>))
                .route(
                    "/resend-verification",
                    web::post().to(resend_verification::<U, S, L, O>),
                )
                .route("/me", web::get().to(me::<U, S, L, O>))
                .service(
                    web::resource("/logout-all")
                        .wrap(JwtAuth::new(codec.clone()))
                        .route(web::post().to(logout_all::<U, S, L, O>)),
                )
                .service(
                    web::resource("/change-password")
                        .wrap(JwtAuth::new(codec))
                        .route(web::post().to(change_password::<U, S, L, O>)),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "slimmermetai-auth",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
