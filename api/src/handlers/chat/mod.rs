use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::debug;

use abi::errors::Error;

use crate::api_utils::custom_extract::AuthUser;
use crate::AppState;

#[derive(Serialize)]
pub struct ChatToken {
    pub token: String,
}

pub async fn get_chat_token(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ChatToken>, Error> {
    let token = app_state.chat.issue(&user.id)?;
    debug!("issued chat token for {}", user.id);
    Ok(Json(ChatToken { token }))
}
