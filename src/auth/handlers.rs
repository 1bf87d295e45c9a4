use crate::{
    auth::{
        jwt::generate_access_token,
        password::{burn_verification, hash_password, verify_password},
    },
    config::Config,
    error::ApiError,
    model::user::User,
    models::{CredentialsReq, LoginResponse, RegisterResponse},
    store::{RecordStore, StoreError},
};
use actix_web::{HttpResponse, web};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Register a user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = CredentialsReq,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Username or password missing"),
        (status = 409, description = "Username already taken")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_register", skip(store, body), fields(username = %body.username))]
pub async fn register(
    body: web::Json<CredentialsReq>,
    store: web::Data<RecordStore>,
) -> Result<HttpResponse, ApiError> {
    let username = normalize_username(&body.username);
    if username.is_empty() || body.password.is_empty() {
        return Err(ApiError::Validation(
            "Username and password must not be empty".to_string(),
        ));
    }

    let hashed = hash_password(&body.password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        ApiError::Internal
    })?;

    let user = User {
        id: Uuid::new_v4().to_string(),
        username,
        password: hashed,
    };

    match store.insert_user(&user).await {
        Ok(()) => {
            info!(user_id = %user.id, "User registered");
            Ok(HttpResponse::Created().json(RegisterResponse {
                id: user.id,
                username: user.username,
            }))
        }
        Err(StoreError::Conflict) => Err(ApiError::Conflict("Username already taken".to_string())),
        Err(e) => Err(ApiError::from_write(e, "Failed to register user")),
    }
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = CredentialsReq,
    responses(
        (status = 200, description = "Access token issued", body = LoginResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(store, config, body), fields(username = %body.username))]
pub async fn login(
    body: web::Json<CredentialsReq>,
    store: web::Data<RecordStore>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    let username = normalize_username(&body.username);
    if username.is_empty() || body.password.is_empty() {
        return Err(ApiError::Validation(
            "Username or password required".to_string(),
        ));
    }

    let user = store
        .find_user_by_username(&username)
        .await
        .map_err(|e| ApiError::from_read(e, "Could not verify credentials"))?
        .ok_or_else(|| {
            burn_verification(&body.password);
            info!("Invalid credentials: user not found");
            ApiError::Unauthorized("Invalid credentials".to_string())
        })?;

    if let Err(e) = verify_password(&body.password, &user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    debug!(user_id = %user.id, "Generating access token");

    let access_token = generate_access_token(
        &user.id,
        &user.username,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, "Failed to sign access token");
        ApiError::Internal
    })?;

    info!("Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: config.access_token_ttl,
    }))
}
