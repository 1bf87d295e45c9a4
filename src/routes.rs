use crate::{
    api::{attendance, subject},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::ApiError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Per-peer limiter refilling `requests_per_min` tokens a minute
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst are clamped to non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let auth_limiter = Arc::new(build_limiter(config.rate_auth_per_min));
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Malformed JSON bodies become ValidationFailure instead of actix's plain-text 400
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into()),
    );

    // Public routes
    cfg.service(
        web::scope(&format!("{}/auth", config.api_prefix))
            .service(
                web::resource("/register")
                    .wrap(auth_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/login")
                    .wrap(auth_limiter)
                    .route(web::post().to(handlers::login)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::post().to(attendance::record_attendance))
                            .route(web::get().to(attendance::list_attendance)),
                    )
                    // /attendance/calendar
                    .service(
                        web::resource("/calendar")
                            .route(web::get().to(attendance::attendance_calendar)),
                    ),
            )
            .service(
                web::scope("/subjects")
                    // /subjects
                    .service(
                        web::resource("")
                            .route(web::get().to(subject::list_subjects))
                            .route(web::post().to(subject::create_subject)),
                    )
                    // /subjects/{id}/attendance
                    .service(
                        web::resource("/{id}/attendance")
                            .route(web::put().to(subject::mark_subject)),
                    )
                    // /subjects/{id}/classes
                    .service(
                        web::resource("/{id}/classes").route(web::post().to(subject::add_class)),
                    ),
            ),
    );
}

// REGISTER
//  └─ POST /api/auth/register {username, password}

// LOGIN
//  └─ POST /api/auth/login -> access_token

// API REQUEST
//  └─ Authorization: Bearer access_token
