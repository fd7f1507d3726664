//! In-process relationship store.
//!
//! Every mutation takes the single write lock, so the pair-uniqueness check and
//! the insert it guards cannot interleave with another writer.

use std::collections::HashSet;

use async_trait::async_trait;
use nanoid::nanoid;
use tokio::sync::RwLock;

use abi::errors::{Error, Result};
use abi::model::{FriendRequest, FriendRequestStatus, Onboarding, PairKey, User};

use crate::friend::FriendRepo;
use crate::user::UserRepo;

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    requests: Vec<FriendRequest>,
    edges: HashSet<PairKey>,
    // insertion order of edges, so friend lists come back oldest first
    edge_log: Vec<PairKey>,
}

impl State {
    fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn request_mut(&mut self, id: &str) -> Result<&mut FriendRequest> {
        self.requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::not_found_with_details(format!("friend request {id} not found")))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn create_user(&self, mut user: User) -> Result<User> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(Error::email_taken());
        }
        let now = chrono::Utc::now().timestamp_millis();
        user.create_time = now;
        user.update_time = now;
        user.friends.clear();
        state.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.state.read().await.user(id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn update_onboarding(&self, id: &str, profile: &Onboarding) -> Result<User> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Error::not_found_with_details(format!("user {id} not found")))?;
        user.full_name.clone_from(&profile.full_name);
        user.bio.clone_from(&profile.bio);
        user.native_language.clone_from(&profile.native_language);
        user.learning_language.clone_from(&profile.learning_language);
        user.location.clone_from(&profile.location);
        user.is_onboarded = true;
        user.update_time = chrono::Utc::now().timestamp_millis();
        Ok(user.clone())
    }

    async fn recommended(&self, user_id: &str) -> Result<Vec<User>> {
        let state = self.state.read().await;
        // newest first, like the postgres query
        Ok(state
            .users
            .iter()
            .rev()
            .filter(|u| u.id != user_id && u.is_onboarded)
            .filter(|u| !state.edges.contains(&PairKey::new(user_id, &u.id)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FriendRepo for MemoryStore {
    async fn create_request(&self, sender_id: &str, recipient_id: &str) -> Result<FriendRequest> {
        let key = PairKey::new(sender_id, recipient_id);
        let mut state = self.state.write().await;
        if state.requests.iter().any(|r| r.pair_key() == key) {
            return Err(Error::duplicate_request());
        }
        let now = chrono::Utc::now().timestamp_millis();
        let fs = FriendRequest {
            id: nanoid!(),
            sender_id: sender_id.to_string(),
            recipient_id: recipient_id.to_string(),
            status: FriendRequestStatus::Pending,
            create_time: now,
            update_time: now,
        };
        state.requests.push(fs.clone());
        Ok(fs)
    }

    async fn get_request(&self, id: &str) -> Result<Option<FriendRequest>> {
        let state = self.state.read().await;
        Ok(state.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn find_request_between(&self, a: &str, b: &str) -> Result<Option<FriendRequest>> {
        let key = PairKey::new(a, b);
        let state = self.state.read().await;
        Ok(state.requests.iter().find(|r| r.pair_key() == key).cloned())
    }

    async fn accept_request(&self, id: &str) -> Result<FriendRequest> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut state = self.state.write().await;
        let fs = state.request_mut(id)?;
        match fs.status {
            FriendRequestStatus::Rejected => {
                return Err(Error::request_not_pending(format!(
                    "friend request {id} was rejected"
                )))
            }
            FriendRequestStatus::Pending => {
                fs.status = FriendRequestStatus::Accepted;
                fs.update_time = now;
            }
            FriendRequestStatus::Accepted => {}
        }
        let fs = fs.clone();

        let key = fs.pair_key();
        if state.edges.insert(key.clone()) {
            state.edge_log.push(key);
        }
        Ok(fs)
    }

    async fn reject_request(&self, id: &str) -> Result<FriendRequest> {
        let mut state = self.state.write().await;
        let fs = state.request_mut(id)?;
        if !fs.is_pending() {
            return Err(Error::request_not_pending(format!(
                "friend request {id} is not pending"
            )));
        }
        fs.status = FriendRequestStatus::Rejected;
        fs.update_time = chrono::Utc::now().timestamp_millis();
        Ok(fs.clone())
    }

    async fn are_friends(&self, a: &str, b: &str) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.edges.contains(&PairKey::new(a, b)))
    }

    async fn friend_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let state = self.state.read().await;
        Ok(state
            .edge_log
            .iter()
            .filter_map(|key| key.other(user_id))
            .map(str::to_string)
            .collect())
    }

    async fn incoming(&self, user_id: &str) -> Result<Vec<FriendRequest>> {
        let state = self.state.read().await;
        Ok(state
            .requests
            .iter()
            .filter(|r| r.recipient_id == user_id && r.is_pending())
            .cloned()
            .collect())
    }

    async fn outgoing(
        &self,
        user_id: &str,
        status: FriendRequestStatus,
    ) -> Result<Vec<FriendRequest>> {
        let state = self.state.read().await;
        Ok(state
            .requests
            .iter()
            .filter(|r| r.sender_id == user_id && r.status == status)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use abi::errors::ErrorKind;

    use super::*;

    fn user(id: &str, onboarded: bool) -> User {
        User {
            id: id.to_string(),
            full_name: id.to_uppercase(),
            email: format!("{id}@example.com"),
            is_onboarded: onboarded,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store.create_user(user("a", true)).await.unwrap();
        let mut other = user("b", true);
        other.email = "a@example.com".into();
        let err = store.create_user(other).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmailTaken);
    }

    #[tokio::test]
    async fn pair_uniqueness_holds_in_both_directions() {
        let store = MemoryStore::new();
        store.create_request("a", "b").await.unwrap();
        let err = store.create_request("b", "a").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateRequest);
        assert!(store.find_request_between("b", "a").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn concurrent_sends_create_one_request() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    if i % 2 == 0 {
                        store.create_request("a", "b").await
                    } else {
                        store.create_request("b", "a").await
                    }
                })
            })
            .collect();
        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn accept_twice_keeps_one_edge() {
        let store = MemoryStore::new();
        let fs = store.create_request("a", "b").await.unwrap();
        let first = store.accept_request(&fs.id).await.unwrap();
        let second = store.accept_request(&fs.id).await.unwrap();
        assert_eq!(first.status, FriendRequestStatus::Accepted);
        assert_eq!(first.update_time, second.update_time);
        assert_eq!(store.friend_ids("a").await.unwrap(), vec!["b"]);
        assert_eq!(store.friend_ids("b").await.unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn rejected_request_cannot_be_accepted() {
        let store = MemoryStore::new();
        let fs = store.create_request("a", "b").await.unwrap();
        store.reject_request(&fs.id).await.unwrap();
        let err = store.accept_request(&fs.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestNotPending);
        let err = store.reject_request(&fs.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestNotPending);
        assert!(!store.are_friends("a", "b").await.unwrap());
    }

    #[tokio::test]
    async fn recommended_skips_self_friends_and_unonboarded() {
        let store = MemoryStore::new();
        for u in [user("a", true), user("b", true), user("c", true), user("d", false)] {
            store.create_user(u).await.unwrap();
        }
        let fs = store.create_request("a", "b").await.unwrap();
        store.accept_request(&fs.id).await.unwrap();

        let ids: Vec<_> = store
            .recommended("a")
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec!["c"]);
    }
}
