use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::CookieJar;
use nanoid::nanoid;
use serde_json::json;
use tracing::{debug, info};

use abi::errors::Error;
use abi::model::{Onboarding, User};

use crate::api_utils::custom_extract::{AuthUser, JsonExtractor};
use crate::handlers::users::{
    expired_cookie, gen_token, hash_password, random_avatar, session_cookie, verify_password,
    LoginRequest, SignupRequest, UserResponse,
};
use crate::AppState;

pub async fn signup(
    State(app_state): State<AppState>,
    jar: CookieJar,
    JsonExtractor(req): JsonExtractor<SignupRequest>,
) -> Result<impl IntoResponse, Error> {
    req.validate()?;
    let email = req.email.trim().to_string();

    if app_state.db.user.get_user_by_email(&email).await?.is_some() {
        return Err(Error::email_taken());
    }

    let user = User {
        id: nanoid!(),
        full_name: req.full_name.trim().to_string(),
        email,
        password: hash_password(&req.password)?,
        profile_pic: random_avatar(),
        ..Default::default()
    };
    // a concurrent signup with the same email still fails on the unique index
    let user = app_state.db.user.create_user(user).await?;
    info!("user {} signed up", user.id);

    let token = gen_token(&app_state, &user.id)?;
    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(&app_state, token)),
        Json(UserResponse {
            success: true,
            user,
        }),
    ))
}

pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    JsonExtractor(req): JsonExtractor<LoginRequest>,
) -> Result<impl IntoResponse, Error> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(Error::bad_request("All fields are required"));
    }

    let user = app_state
        .db
        .user
        .get_user_by_email(req.email.trim())
        .await?
        .ok_or_else(Error::account_or_pwd)?;

    if !verify_password(&req.password, &user.password) {
        debug!("wrong password for user {}", user.id);
        return Err(Error::account_or_pwd());
    }

    let token = gen_token(&app_state, &user.id)?;
    let user = app_state.relation.user_with_friends(&user.id).await?;
    Ok((
        jar.add(session_cookie(&app_state, token)),
        Json(UserResponse {
            success: true,
            user,
        }),
    ))
}

pub async fn logout(State(app_state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (
        jar.add(expired_cookie(&app_state)),
        Json(json!({"success": true, "message": "Logout successful"})),
    )
}

pub async fn onboard(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonExtractor(profile): JsonExtractor<Onboarding>,
) -> Result<Json<UserResponse>, Error> {
    let missing = profile.missing_fields();
    if !missing.is_empty() {
        return Err(Error::bad_request(format!(
            "All fields are required, missing: {}",
            missing.join(", ")
        )));
    }

    app_state.db.user.update_onboarding(&user.id, &profile).await?;
    info!("user {} onboarded", user.id);

    let user = app_state.relation.user_with_friends(&user.id).await?;
    Ok(Json(UserResponse {
        success: true,
        user,
    }))
}

pub async fn me(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserResponse>, Error> {
    let user = app_state.relation.user_with_friends(&user.id).await?;
    Ok(Json(UserResponse {
        success: true,
        user,
    }))
}
