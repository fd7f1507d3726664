use std::fmt::Debug;

use async_trait::async_trait;

use abi::errors::Result;
use abi::model::{Onboarding, User};

#[async_trait]
pub trait UserRepo: Sync + Send + Debug {
    /// create user; a taken email fails with `EmailTaken`
    async fn create_user(&self, user: User) -> Result<User>;

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// unknown ids are skipped
    async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>>;

    /// fill in the profile fields and mark the user onboarded
    async fn update_onboarding(&self, id: &str, profile: &Onboarding) -> Result<User>;

    /// onboarded users other than `user_id` who are not already its friends
    async fn recommended(&self, user_id: &str) -> Result<Vec<User>>;
}
