use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, MessageResponse, SignupRequest, TokenResponse, UpdateMeRequest},
        extractors::AuthUser,
        password::{hash_password, verify_password},
        repo_types::{NewUser, User, UserChanges},
    },
    error::AppError,
    extract::{ApiForm, ApiJson},
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    /// Checked against when the email is unknown, so both login failures cost one Argon2 run.
    static ref DUMMY_HASH: String = hash_password("no-such-user-password").unwrap_or_default();
}

pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(
            "password",
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

fn clean_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me).put(update_me))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<Json<User>, AppError> {
    let email = normalize_email(&payload.email);
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::validation("email", "invalid email"));
    }
    check_password(&payload.password)?;

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .users
        .create(NewUser {
            email,
            password_hash,
            full_name: clean_name(payload.full_name),
        })
        .await
        .inspect_err(|e| {
            if matches!(e, AppError::Conflict(_)) {
                warn!("signup with registered email");
            }
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(user))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let email = normalize_email(&form.username);

    let Some(user) = state.users.find_by_email(&email).await? else {
        verify_password(&form.password, &DUMMY_HASH);
        warn!(%email, "login unknown email");
        return Err(AppError::Authentication);
    };

    if !verify_password(&form.password, &user.password_hash) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Authentication);
    }

    if !user.is_active {
        warn!(user_id = %user.id, "login for inactive account");
        return Err(AppError::Authentication);
    }

    let access_token = state.tokens.issue(&user.email)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse::bearer(access_token)))
}

/// Tokens are stateless; the client just forgets its copy.
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logged out. Please delete your token on the client.",
    })
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
) -> Result<Json<User>, AppError> {
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
    ApiJson(payload): ApiJson<UpdateMeRequest>,
) -> Result<Json<User>, AppError> {
    let password_hash = match payload.password.as_deref() {
        Some(p) => {
            check_password(p)?;
            Some(hash_password(p)?)
        }
        None => None,
    };
    let changes = UserChanges {
        full_name: payload.full_name.map(clean_name),
        password_hash,
    };
    let user = state
        .users
        .update(&email, changes)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    info!(user_id = %user.id, "profile updated");
    Ok(Json(user))
}
