use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Default, Deserialize, Debug, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(skip)]
    pub password: String,
    pub bio: String,
    pub profile_pic: String,
    pub native_language: String,
    pub learning_language: String,
    pub location: String,
    pub is_onboarded: bool,
    /// resolved from the friendship edges, not a column
    #[sqlx(skip)]
    #[serde(default)]
    pub friends: Vec<String>,
    pub create_time: i64,
    pub update_time: i64,
}

/// profile fields other users are allowed to see
#[derive(Clone, Serialize, Default, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub full_name: String,
    pub profile_pic: String,
    pub bio: String,
    pub native_language: String,
    pub learning_language: String,
    pub location: String,
}

impl From<User> for PublicUser {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            full_name: value.full_name,
            profile_pic: value.profile_pic,
            bio: value.bio,
            native_language: value.native_language,
            learning_language: value.learning_language,
            location: value.location,
        }
    }
}

/// the profile fields onboarding fills in
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Onboarding {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub native_language: String,
    #[serde(default)]
    pub learning_language: String,
    #[serde(default)]
    pub location: String,
}

impl Onboarding {
    /// names of the required fields left blank, in camelCase as the client sent them
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("fullName", &self.full_name),
            ("bio", &self.bio),
            ("nativeLanguage", &self.native_language),
            ("learningLanguage", &self.learning_language),
            ("location", &self.location),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_never_serialized() {
        let user = User {
            id: "u1".into(),
            email: "a@b.c".into(),
            password: "$argon2id$secret".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["isOnboarded"], false);
    }

    #[test]
    fn public_projection_drops_private_fields() {
        let user = User {
            id: "u1".into(),
            full_name: "Ana".into(),
            email: "a@b.c".into(),
            friends: vec!["u2".into()],
            ..Default::default()
        };
        let json = serde_json::to_value(PublicUser::from(user)).unwrap();
        assert_eq!(json["fullName"], "Ana");
        assert!(json.get("email").is_none());
        assert!(json.get("friends").is_none());
    }

    #[test]
    fn onboarding_reports_blank_fields() {
        let onboarding = Onboarding {
            full_name: "Ana".into(),
            bio: "  ".into(),
            native_language: "spanish".into(),
            ..Default::default()
        };
        assert_eq!(
            onboarding.missing_fields(),
            vec!["bio", "learningLanguage", "location"]
        );
    }
}
