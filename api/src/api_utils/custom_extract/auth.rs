use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use jsonwebtoken::{decode, DecodingKey, Validation};
use tracing::debug;

use abi::errors::Error;
use abi::model::User;

use crate::handlers::users::{Claims, TOKEN_COOKIE};
use crate::AppState;

const BEARER: &str = "Bearer ";

/// The user a request was made on behalf of.
///
/// The session token is read from the `jwt` cookie first and from an
/// `Authorization: Bearer` header otherwise. A token whose user has since been
/// removed is rejected like a missing one.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = session_token(&parts.headers)
            .ok_or_else(|| Error::unauthorized_with_details("Unauthorized - No token provided"))?;

        let claims = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(app_state.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|err| Error::unauthorized(err, "Unauthorized - Invalid token"))?
        .claims;

        let user = app_state
            .db
            .user
            .get_user_by_id(&claims.sub)
            .await?
            .ok_or_else(|| {
                debug!("token subject {} no longer exists", claims.sub);
                Error::unauthorized_with_details("Unauthorized - User not found")
            })?;

        Ok(AuthUser(user))
    }
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    cookie_token(headers).or_else(|| bearer_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
