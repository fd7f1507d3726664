use std::fmt::Debug;

use async_trait::async_trait;

use abi::errors::Result;
use abi::model::{FriendRequest, FriendRequestStatus};

#[async_trait]
pub trait FriendRepo: Send + Sync + Debug {
    /// create a pending request; the store rejects a second request for the
    /// same unordered pair with `DuplicateRequest`, whatever the first one's status
    async fn create_request(&self, sender_id: &str, recipient_id: &str) -> Result<FriendRequest>;

    async fn get_request(&self, id: &str) -> Result<Option<FriendRequest>>;

    /// the request between two users, in either direction
    async fn find_request_between(&self, a: &str, b: &str) -> Result<Option<FriendRequest>>;

    /// mark the request accepted and add the friendship edge in one step.
    /// the edge is inserted only if absent, so calling this twice is harmless
    async fn accept_request(&self, id: &str) -> Result<FriendRequest>;

    /// pending -> rejected; anything else fails with `RequestNotPending`
    async fn reject_request(&self, id: &str) -> Result<FriendRequest>;

    async fn are_friends(&self, a: &str, b: &str) -> Result<bool>;

    async fn friend_ids(&self, user_id: &str) -> Result<Vec<String>>;

    /// pending requests addressed to `user_id`
    async fn incoming(&self, user_id: &str) -> Result<Vec<FriendRequest>>;

    /// requests sent by `user_id` that are in `status`
    async fn outgoing(&self, user_id: &str, status: FriendRequestStatus)
        -> Result<Vec<FriendRequest>>;
}
