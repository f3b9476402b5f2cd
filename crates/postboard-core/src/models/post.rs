use serde::{Deserialize, Serialize};

use super::null_as_default;

pub type PostId = i64;

/// Feed entry as returned by the post list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    #[serde(alias = "postId")]
    pub id: PostId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "likeCount", default, deserialize_with = "null_as_default")]
    pub like_count: u64,
    #[serde(rename = "commentCount", default, deserialize_with = "null_as_default")]
    pub comment_count: u64,
    #[serde(rename = "viewCount", default, deserialize_with = "null_as_default")]
    pub view_count: u64,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "memberNickname", default)]
    pub member_nickname: Option<String>,
    #[serde(rename = "memberProfileImageUrl", default)]
    pub member_profile_image_url: Option<String>,
}

impl PostSummary {
    pub fn author_display(&self) -> &str {
        display_author(&self.member_nickname)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostImage {
    pub id: i64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    #[serde(alias = "postId")]
    pub id: PostId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
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
    // GET /posts/{id} returns "imageUrls" for display and "images" for editing
    #[serde(rename = "imageUrls", default, deserialize_with = "null_as_default")]
    pub image_urls: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<PostImage>,
    #[serde(rename = "viewCount", default, deserialize_with = "null_as_default")]
    pub view_count: u64,
    #[serde(rename = "likeCount", default, deserialize_with = "null_as_default")]
    pub like_count: u64,
    #[serde(rename = "commentCount", default, deserialize_with = "null_as_default")]
    pub comment_count: u64,
    #[serde(alias = "isLiked", default)]
    pub liked: Option<bool>,
}

impl PostDetail {
    pub fn author_display(&self) -> &str {
        display_author(&self.member_nickname)
    }

    pub fn image_ids(&self) -> Vec<i64> {
        self.images.iter().map(|img| img.id).collect()
    }

    /// Image URLs to show, whichever field the server filled
    pub fn display_image_urls(&self) -> Vec<&str> {
        if !self.image_urls.is_empty() {
            self.image_urls.iter().map(String::as_str).collect()
        } else {
            self.images.iter().map(|img| img.url.as_str()).collect()
        }
    }
}

/// Title and body typed by the user for a new or edited post
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into().trim().to_string(),
            content: content.into().trim().to_string(),
        }
    }
}

pub(crate) fn display_author(nickname: &Option<String>) -> &str {
    match nickname.as_deref() {
        Some(name) if !name.trim().is_empty() => name,
        _ => "Anonymous",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_post_summary_with_nulls() {
        let json = r#"{"id": 1, "title": "Hello", "likeCount": null, "commentCount": 5, "createdAt": "2024-03-01T10:20:30", "memberNickname": null}"#;
        let post: PostSummary = serde_json::from_str(json).expect("Failed to parse post summary");
        assert_eq!(post.id, 1);
        assert_eq!(post.like_count, 0);
        assert_eq!(post.comment_count, 5);
        assert_eq!(post.view_count, 0);
        assert_eq!(post.author_display(), "Anonymous");
    }

    #[test]
    fn test_parse_post_detail() {
        let json = r#"{
            "id": 12,
            "title": "Trip",
            "content": "Photos from the trip",
            "memberId": 3,
            "memberNickname": "kim",
            "imageUrls": [],
            "images": [{"id": 40, "url": "https://cdn.example.com/40.png"}],
            "viewCount": 9,
            "likeCount": 2,
            "commentCount": 1
        }"#;
        let post: PostDetail = serde_json::from_str(json).expect("Failed to parse post detail");
        assert_eq!(post.member_id, Some(3));
        assert_eq!(post.image_ids(), vec![40]);
        assert_eq!(post.display_image_urls(), vec!["https://cdn.example.com/40.png"]);
        assert_eq!(post.liked, None);
        assert_eq!(post.author_display(), "kim");
    }

    #[test]
    fn test_draft_trims_input() {
        let draft = PostDraft::new("  Title ", "\nBody\n");
        assert_eq!(draft.title, "Title");
        assert_eq!(draft.content, "Body");
    }
}
