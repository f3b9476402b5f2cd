use serde::{Deserialize, Serialize};

use super::null_as_default;
use super::post::display_author;

pub type CommentId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(alias = "commentId")]
    pub id: CommentId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(rename = "memberId", default)]
    pub member_id: Option<i64>,
    #[serde(rename = "memberNickname", default)]
    pub member_nickname: Option<String>,
    #[serde(rename = "memberProfileImageUrl", default)]
    pub member_profile_image_url: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

impl Comment {
    pub fn author_display(&self) -> &str {
        display_author(&self.member_nickname)
    }

    pub fn is_written_by(&self, member_id: i64) -> bool {
        self.member_id == Some(member_id)
    }
}
