use async_trait::async_trait;
use nanoid::nanoid;
use sqlx::PgPool;
use tracing::debug;

use abi::errors::{Error, Result};
use abi::model::{FriendRequest, FriendRequestStatus, PairKey};

use crate::friend::FriendRepo;

#[derive(Debug)]
pub struct PostgresFriend {
    pool: PgPool,
}

impl PostgresFriend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// friend_requests_pair is the only unique key a racing insert can hit
fn map_pair_conflict(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Error::duplicate_request()
        }
        _ => err.into(),
    }
}

#[async_trait]
impl FriendRepo for PostgresFriend {
    async fn create_request(&self, sender_id: &str, recipient_id: &str) -> Result<FriendRequest> {
        let key = PairKey::new(sender_id, recipient_id);
        let now = chrono::Utc::now().timestamp_millis();
        debug!("create friend request: {} -> {}", sender_id, recipient_id);

        let fs = sqlx::query_as(
            "INSERT INTO friend_requests
                (id, sender_id, recipient_id, user_low, user_high, status, create_time, update_time)
             VALUES
                ($1, $2, $3, $4, $5, 'Pending', $6, $6)
             RETURNING *",
        )
        .bind(nanoid!())
        .bind(sender_id)
        .bind(recipient_id)
        .bind(key.low())
        .bind(key.high())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_pair_conflict)?;
        Ok(fs)
    }

    async fn get_request(&self, id: &str) -> Result<Option<FriendRequest>> {
        let fs = sqlx::query_as("SELECT * FROM friend_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(fs)
    }

    async fn find_request_between(&self, a: &str, b: &str) -> Result<Option<FriendRequest>> {
        let key = PairKey::new(a, b);
        let fs = sqlx::query_as(
            "SELECT * FROM friend_requests WHERE user_low = $1 AND user_high = $2",
        )
        .bind(key.low())
        .bind(key.high())
        .fetch_optional(&self.pool)
        .await?;
        Ok(fs)
    }

    async fn accept_request(&self, id: &str) -> Result<FriendRequest> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut transaction = self.pool.begin().await?;

        // an already accepted request keeps its original update_time
        let fs: FriendRequest = sqlx::query_as(
            "UPDATE friend_requests
            SET
                update_time = CASE WHEN status = 'Accepted' THEN update_time ELSE $2 END,
                status = 'Accepted'
            WHERE id = $1 AND status IN ('Pending', 'Accepted')
            RETURNING *",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&mut *transaction)
        .await?
        .ok_or_else(|| Error::request_not_pending(format!("friend request {id} was rejected")))?;

        let key = fs.pair_key();
        sqlx::query(
            "INSERT INTO friendships (user_low, user_high, request_id, create_time)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_low, user_high) DO NOTHING",
        )
        .bind(key.low())
        .bind(key.high())
        .bind(&fs.id)
        .bind(now)
        .execute(&mut *transaction)
        .await?;

        transaction.commit().await?;
        Ok(fs)
    }

    async fn reject_request(&self, id: &str) -> Result<FriendRequest> {
        let fs = sqlx::query_as(
            "UPDATE friend_requests
            SET status = 'Rejected', update_time = $2
            WHERE id = $1 AND status = 'Pending'
            RETURNING *",
        )
        .bind(id)
        .bind(chrono::Utc::now().timestamp_millis())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::request_not_pending(format!("friend request {id} is not pending")))?;
        Ok(fs)
    }

    async fn are_friends(&self, a: &str, b: &str) -> Result<bool> {
        let key = PairKey::new(a, b);
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM friendships WHERE user_low = $1 AND user_high = $2)",
        )
        .bind(key.low())
        .bind(key.high())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn friend_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar(
            "SELECT CASE WHEN user_low = $1 THEN user_high ELSE user_low END AS friend_id
            FROM friendships
            WHERE user_low = $1 OR user_high = $1
            ORDER BY create_time",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn incoming(&self, user_id: &str) -> Result<Vec<FriendRequest>> {
        let list = sqlx::query_as(
            "SELECT * FROM friend_requests
            WHERE recipient_id = $1 AND status = 'Pending'
            ORDER BY create_time",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(list)
    }

    async fn outgoing(
        &self,
        user_id: &str,
        status: FriendRequestStatus,
    ) -> Result<Vec<FriendRequest>> {
        let list = sqlx::query_as(
            "SELECT * FROM friend_requests
            WHERE sender_id = $1 AND status = $2
            ORDER BY create_time",
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(list)
    }
}
