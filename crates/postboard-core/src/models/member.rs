use serde::{Deserialize, Serialize};

/// The logged-in member, from `GET /api/v1/members/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "memberId", alias = "id")]
    pub member_id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(rename = "profileImageUrl", default)]
    pub profile_image_url: Option<String>,
}

/// Fields of the signup form, before the profile image is uploaded
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub nickname: String,
}

impl SignupForm {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        password_confirm: impl Into<String>,
        nickname: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
            password_confirm: password_confirm.into(),
            nickname: nickname.into().trim().to_string(),
        }
    }
}
