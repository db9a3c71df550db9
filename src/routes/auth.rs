use crate::{
    auth::{CredentialStore, Credentials, RegisterResponse, TokenResponse, TokenService},
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Register a new user
///
/// Stores a bcrypt hash of the password. Responds `201 {username}`, or `400` if the
/// username is already taken.
#[post("/register")]
pub async fn register(
    credentials: web::Data<CredentialStore>,
    register_data: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    let Credentials { username, password } = register_data.into_inner();

    // bcrypt is deliberately slow; keep it off the async workers.
    let store = credentials.clone();
    let name = username.clone();
    web::block(move || store.register(&name, &password))
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))??;

    log::info!("Registered user {}", username);
    Ok(HttpResponse::Created().json(RegisterResponse { username }))
}

/// Login user
///
/// Checks the password and returns a bearer token. Unknown users and wrong
/// passwords both get the same `401 Invalid credentials`.
#[post("/login")]
pub async fn login(
    credentials: web::Data<CredentialStore>,
    tokens: web::Data<TokenService>,
    login_data: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    let Credentials { username, password } = login_data.into_inner();

    let store = credentials.clone();
    let name = username.clone();
    let valid = web::block(move || store.verify(&name, &password))
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))??;

    if !valid {
        log::warn!("Failed login attempt for {}", username);
        return Err(AppError::invalid_credentials());
    }

    let token = tokens.issue(&username)?;
    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token)))
}
