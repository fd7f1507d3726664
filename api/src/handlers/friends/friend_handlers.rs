use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use abi::errors::Error;

use crate::api_utils::custom_extract::{AuthUser, PathExtractor};
use crate::handlers::friends::{
    FriendRequestsResponse, FriendsResponse, OutgoingResponse, RecommendedResponse,
    RequestResponse,
};
use crate::AppState;

pub async fn get_recommended_users(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<RecommendedResponse>, Error> {
    let recommended_users = app_state.relation.list_recommended(&user.id).await?;
    Ok(Json(RecommendedResponse { recommended_users }))
}

pub async fn get_my_friends(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<FriendsResponse>, Error> {
    let friends = app_state.relation.list_friends(&user.id).await?;
    Ok(Json(FriendsResponse { friends }))
}

pub async fn send_friend_request(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    PathExtractor(recipient_id): PathExtractor<String>,
) -> Result<(StatusCode, Json<RequestResponse>), Error> {
    let request = app_state
        .relation
        .send_request(&user.id, &recipient_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RequestResponse {
            message: "Friend request sent",
            request,
        }),
    ))
}

pub async fn accept_friend_request(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    PathExtractor(request_id): PathExtractor<String>,
) -> Result<Json<RequestResponse>, Error> {
    let request = app_state
        .relation
        .accept_request(&user.id, &request_id)
        .await?;
    Ok(Json(RequestResponse {
        message: "Friend request accepted",
        request,
    }))
}

pub async fn reject_friend_request(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    PathExtractor(request_id): PathExtractor<String>,
) -> Result<Json<RequestResponse>, Error> {
    let request = app_state
        .relation
        .reject_request(&user.id, &request_id)
        .await?;
    Ok(Json(RequestResponse {
        message: "Friend request rejected",
        request,
    }))
}

pub async fn get_friend_requests(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<FriendRequestsResponse>, Error> {
    let incoming_requests = app_state.relation.list_incoming(&user.id).await?;
    let accepted_requests = app_state.relation.list_accepted(&user.id).await?;
    Ok(Json(FriendRequestsResponse {
        incoming_requests,
        accepted_requests,
    }))
}

pub async fn get_outgoing_friend_requests(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<OutgoingResponse>, Error> {
    let outgoing_requests = app_state.relation.list_outgoing(&user.id).await?;
    Ok(Json(OutgoingResponse { outgoing_requests }))
}
