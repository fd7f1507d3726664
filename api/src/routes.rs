use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use abi::config::CorsConfig;

use crate::handlers::chat::get_chat_token;
use crate::handlers::friends::{
    accept_friend_request, get_friend_requests, get_my_friends, get_outgoing_friend_requests,
    get_recommended_users, reject_friend_request, send_friend_request,
};
use crate::handlers::users::{login, logout, me, onboard, signup};
use crate::AppState;

pub fn app_routes(state: AppState, cors: &CorsConfig) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/chat", chat_routes())
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/onboarding", post(onboard))
        .route("/me", get(me))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_recommended_users))
        .route("/friends", get(get_my_friends))
        .route("/friend-requests", get(get_friend_requests))
        .route("/friend-requests/:id", post(send_friend_request))
        .route("/friend-requests/:id/accept", put(accept_friend_request))
        .route("/friend-requests/:id/reject", put(reject_friend_request))
        .route(
            "/outgoing-friend-requests",
            get(get_outgoing_friend_requests),
        )
}

fn chat_routes() -> Router<AppState> {
    Router::new().route("/token", get(get_chat_token))
}

// the session cookie only travels cross-origin with credentials allowed, which
// rules out wildcard origins
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid cors origin {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
