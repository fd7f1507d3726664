use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{encode, EncodingKey, Header};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::Duration;

use abi::errors::Error;
use abi::model::User;

use crate::AppState;

mod user_handlers;

pub use user_handlers::*;

pub const TOKEN_COOKIE: &str = "jwt";

const MIN_PASSWORD_LEN: usize = 6;
const AVATAR_COUNT: u32 = 100;
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

// request models
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), Error> {
        let blank = self.full_name.trim().is_empty() || self.email.trim().is_empty();
        if blank || self.password.is_empty() {
            return Err(Error::bad_request("All fields are required"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::bad_request(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let email_re = Regex::new(EMAIL_PATTERN).map_err(Error::internal)?;
        if !email_re.is_match(self.email.trim()) {
            return Err(Error::bad_request("Invalid email format"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: String, expires_days: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        let exp = now + expires_days * 24 * 60 * 60;
        Self { sub, exp, iat: now }
    }
}

pub fn gen_token(app_state: &AppState, user_id: &str) -> Result<String, Error> {
    let claims = Claims::new(user_id.to_string(), app_state.jwt_expires_days);
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(app_state.jwt_secret.as_bytes()),
    )?)
}

/// the session cookie handed out on signup and login
pub fn session_cookie(app_state: &AppState, token: String) -> Cookie<'static> {
    let mut cookie = base_cookie(app_state, token);
    cookie.set_max_age(Duration::days(app_state.jwt_expires_days));
    cookie
}

/// a cookie that makes the browser drop the session token
pub fn expired_cookie(app_state: &AppState) -> Cookie<'static> {
    let mut cookie = base_cookie(app_state, String::new());
    cookie.make_removal();
    cookie
}

fn base_cookie(app_state: &AppState, value: String) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(app_state.cookie_secure)
        .build()
}

pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub fn random_avatar() -> String {
    let idx = rand::thread_rng().gen_range(1..=AVATAR_COUNT);
    format!("https://avatar.iran.liara.run/public/{idx}.png")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use abi::config::Config;
    use db::DbRepo;

    use crate::stream::StreamTokenIssuer;

    use super::*;

    fn state(cookie_secure: bool) -> AppState {
        let mut config = Config::load("../abi/fixtures/config.yml").unwrap();
        config.server.cookie_secure = cookie_secure;
        let chat = Arc::new(StreamTokenIssuer::new(&config.stream));
        AppState::from_parts(&config, DbRepo::memory(), chat)
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie(&state(false), "token".into()).to_string();
        assert!(cookie.starts_with("jwt=token;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(!cookie.contains("Secure"));

        let cookie = session_cookie(&state(true), "token".into()).to_string();
        assert!(cookie.contains("Secure"));
    }

    #[test]
    fn expired_cookie_clears_token() {
        let cookie = expired_cookie(&state(false)).to_string();
        assert!(cookie.starts_with("jwt=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("Path=/"));
    }

    fn signup(full_name: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            full_name: full_name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn signup_validation() {
        assert!(signup("Ana", "ana@example.com", "secret1").validate().is_ok());

        let err = signup("", "ana@example.com", "secret1").validate().unwrap_err();
        assert_eq!(err.public_message(), "All fields are required");

        let err = signup("Ana", "ana@example.com", "12345").validate().unwrap_err();
        assert_eq!(err.public_message(), "Password must be at least 6 characters");

        let err = signup("Ana", "ana.example.com", "secret1").validate().unwrap_err();
        assert_eq!(err.public_message(), "Invalid email format");
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
        assert!(!verify_password("secret1", "not-a-hash"));
    }

    #[test]
    fn avatar_in_range() {
        for _ in 0..50 {
            let url = random_avatar();
            let idx: u32 = url
                .trim_start_matches("https://avatar.iran.liara.run/public/")
                .trim_end_matches(".png")
                .parse()
                .unwrap();
            assert!((1..=AVATAR_COUNT).contains(&idx));
        }
    }
}
