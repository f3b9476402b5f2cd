use serde::{Deserialize, Serialize};

/// Body of a like/unlike response. Both fields are optional; some backend
/// versions answer with an empty body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LikeResponse {
    #[serde(rename = "likeCount", default)]
    pub like_count: Option<u64>,
    #[serde(alias = "isLiked", default)]
    pub liked: Option<bool>,
}

/// Whether the viewer currently likes a post.
///
/// The presentation layer owns this value; requests only ever carry the
/// transition the caller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LikeState {
    Liked,
    #[default]
    NotLiked,
}

impl LikeState {
    pub fn from_flag(liked: bool) -> Self {
        if liked {
            LikeState::Liked
        } else {
            LikeState::NotLiked
        }
    }

    pub fn is_liked(self) -> bool {
        self == LikeState::Liked
    }

    pub fn toggled(self) -> Self {
        match self {
            LikeState::Liked => LikeState::NotLiked,
            LikeState::NotLiked => LikeState::Liked,
        }
    }
}

impl std::fmt::Display for LikeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LikeState::Liked => write!(f, "Liked"),
            LikeState::NotLiked => write!(f, "Not liked"),
        }
    }
}
