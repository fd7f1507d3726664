use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use abi::errors::{Error, Result};
use abi::model::{
    FriendRequest, FriendRequestStatus, IncomingRequest, OutgoingRequest, PublicUser, User,
};

use crate::friend::FriendRepo;
use crate::user::UserRepo;
use crate::DbRepo;

/// Validates and applies friend-request state changes.
///
/// Callers pass an already authenticated user id; nothing here re-checks
/// credentials.
#[derive(Clone, Debug)]
pub struct RelationService {
    user: Arc<dyn UserRepo>,
    friend: Arc<dyn FriendRepo>,
}

impl RelationService {
    pub fn new(db: &DbRepo) -> Self {
        Self {
            user: db.user.clone(),
            friend: db.friend.clone(),
        }
    }

    pub async fn send_request(
        &self,
        requester_id: &str,
        recipient_id: &str,
    ) -> Result<FriendRequest> {
        if requester_id == recipient_id {
            return Err(Error::self_request());
        }

        if self.user.get_user_by_id(recipient_id).await?.is_none() {
            return Err(Error::not_found_with_details("recipient not found"));
        }

        if self.friend.are_friends(requester_id, recipient_id).await? {
            return Err(Error::already_friends());
        }

        // history of any status blocks a new request; the store enforces the
        // same rule so a racing sender gets DuplicateRequest too
        if let Some(existing) = self
            .friend
            .find_request_between(requester_id, recipient_id)
            .await?
        {
            debug!(
                "friend request {} already exists with status {}",
                existing.id, existing.status
            );
            return Err(Error::duplicate_request());
        }

        let fs = self
            .friend
            .create_request(requester_id, recipient_id)
            .await?;
        info!(
            "friend request {} created: {} -> {}",
            fs.id, requester_id, recipient_id
        );
        Ok(fs)
    }

    pub async fn accept_request(
        &self,
        accepter_id: &str,
        request_id: &str,
    ) -> Result<FriendRequest> {
        let fs = self.recipient_request(accepter_id, request_id, "accept").await?;

        if fs.status == FriendRequestStatus::Rejected {
            return Err(Error::request_not_pending(
                "this friend request was already rejected",
            ));
        }

        // also for an accepted request: the edge insert is a no-op if present
        let fs = self.friend.accept_request(&fs.id).await?;
        info!(
            "friend request {} accepted: {} <-> {}",
            fs.id, fs.sender_id, fs.recipient_id
        );
        Ok(fs)
    }

    pub async fn reject_request(
        &self,
        rejecter_id: &str,
        request_id: &str,
    ) -> Result<FriendRequest> {
        let fs = self.recipient_request(rejecter_id, request_id, "reject").await?;

        if !fs.is_pending() {
            return Err(Error::request_not_pending(format!(
                "this friend request is already {}",
                fs.status.to_string().to_lowercase()
            )));
        }

        let fs = self.friend.reject_request(&fs.id).await?;
        info!("friend request {} rejected by {}", fs.id, rejecter_id);
        Ok(fs)
    }

    pub async fn list_incoming(&self, user_id: &str) -> Result<Vec<IncomingRequest>> {
        let requests = self.friend.incoming(user_id).await?;
        let profiles = self
            .profiles(requests.iter().map(|r| r.sender_id.clone()))
            .await?;
        Ok(requests
            .into_iter()
            .filter_map(|request| {
                let sender = profiles.get(&request.sender_id)?.clone();
                Some(IncomingRequest { request, sender })
            })
            .collect())
    }

    /// pending requests the user has sent
    pub async fn list_outgoing(&self, user_id: &str) -> Result<Vec<OutgoingRequest>> {
        self.outgoing_with_recipient(user_id, FriendRequestStatus::Pending)
            .await
    }

    /// requests the user sent that the other side accepted
    pub async fn list_accepted(&self, user_id: &str) -> Result<Vec<OutgoingRequest>> {
        self.outgoing_with_recipient(user_id, FriendRequestStatus::Accepted)
            .await
    }

    pub async fn list_friends(&self, user_id: &str) -> Result<Vec<PublicUser>> {
        let ids = self.friend.friend_ids(user_id).await?;
        let users = self.user.get_users_by_ids(&ids).await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }

    pub async fn list_recommended(&self, user_id: &str) -> Result<Vec<PublicUser>> {
        let users = self.user.recommended(user_id).await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }

    /// the user record with its friend ids filled in
    pub async fn user_with_friends(&self, user_id: &str) -> Result<User> {
        let mut user = self
            .user
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| Error::not_found_with_details("user not found"))?;
        user.friends = self.friend.friend_ids(user_id).await?;
        Ok(user)
    }

    async fn recipient_request(
        &self,
        user_id: &str,
        request_id: &str,
        action: &str,
    ) -> Result<FriendRequest> {
        let fs = self
            .friend
            .get_request(request_id)
            .await?
            .ok_or_else(|| Error::not_found_with_details("friend request not found"))?;

        if fs.recipient_id != user_id {
            return Err(Error::forbidden(format!(
                "you are not authorized to {action} this request"
            )));
        }
        Ok(fs)
    }

    async fn outgoing_with_recipient(
        &self,
        user_id: &str,
        status: FriendRequestStatus,
    ) -> Result<Vec<OutgoingRequest>> {
        let requests = self.friend.outgoing(user_id, status).await?;
        let profiles = self
            .profiles(requests.iter().map(|r| r.recipient_id.clone()))
            .await?;
        Ok(requests
            .into_iter()
            .filter_map(|request| {
                let recipient = profiles.get(&request.recipient_id)?.clone();
                Some(OutgoingRequest { request, recipient })
            })
            .collect())
    }

    async fn profiles(
        &self,
        ids: impl Iterator<Item = String>,
    ) -> Result<HashMap<String, PublicUser>> {
        let mut ids: Vec<String> = ids.collect();
        ids.sort();
        ids.dedup();
        let users = self.user.get_users_by_ids(&ids).await?;
        Ok(users
            .into_iter()
            .map(|u| (u.id.clone(), PublicUser::from(u)))
            .collect())
    }
}
