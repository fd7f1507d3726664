use serde::Serialize;

use abi::model::{FriendRequest, IncomingRequest, OutgoingRequest, PublicUser};

mod friend_handlers;

pub use friend_handlers::*;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedResponse {
    pub recommended_users: Vec<PublicUser>,
}

#[derive(Serialize)]
pub struct FriendsResponse {
    pub friends: Vec<PublicUser>,
}

#[derive(Serialize)]
pub struct RequestResponse {
    pub message: &'static str,
    pub request: FriendRequest,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestsResponse {
    pub incoming_requests: Vec<IncomingRequest>,
    pub accepted_requests: Vec<OutgoingRequest>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingResponse {
    pub outgoing_requests: Vec<OutgoingRequest>,
}
