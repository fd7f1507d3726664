use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::PublicUser;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, sqlx::Type)]
#[sqlx(type_name = "friend_request_status")]
pub enum FriendRequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl Display for FriendRequestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FriendRequestStatus::Pending => f.write_str("Pending"),
            FriendRequestStatus::Accepted => f.write_str("Accepted"),
            FriendRequestStatus::Rejected => f.write_str("Rejected"),
        }
    }
}

/// An unordered pair of user ids, stored as `(low, high)`.
///
/// Requests and friendship edges are keyed by this so that `{a, b}` and `{b, a}`
/// collide in storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    low: String,
    high: String,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self {
                low: a.to_string(),
                high: b.to_string(),
            }
        } else {
            Self {
                low: b.to_string(),
                high: a.to_string(),
            }
        }
    }

    pub fn low(&self) -> &str {
        &self.low
    }

    pub fn high(&self) -> &str {
        &self.high
    }

    /// the member of the pair that is not `user_id`
    pub fn other(&self, user_id: &str) -> Option<&str> {
        if self.low == user_id {
            Some(&self.high)
        } else if self.high == user_id {
            Some(&self.low)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub status: FriendRequestStatus,
    pub create_time: i64,
    pub update_time: i64,
}

impl FriendRequest {
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(&self.sender_id, &self.recipient_id)
    }

    pub fn is_pending(&self) -> bool {
        self.status == FriendRequestStatus::Pending
    }
}

/// incoming request with the sender's profile attached
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingRequest {
    #[serde(flatten)]
    pub request: FriendRequest,
    pub sender: PublicUser,
}

/// request the caller sent, with the recipient's profile attached
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingRequest {
    #[serde(flatten)]
    pub request: FriendRequest,
    pub recipient: PublicUser,
}
