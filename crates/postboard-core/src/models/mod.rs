//! Data models for postboard entities.
//!
//! This module contains the payloads exchanged with the backend:
//!
//! - `PostSummary`, `PostDetail`, `PostDraft`: posts in the feed and in detail
//! - `Comment`: comments under a post
//! - `Member`, `SignupForm`: the account
//! - `LikeResponse`, `LikeState`: like/unlike results and state
//! - `ImageFile`, `UploadedImage`: image uploads
//! - `Page`, `Cursor`: cursor pagination

pub mod comment;
pub mod image;
pub mod like;
pub mod member;
pub mod page;
pub mod post;

pub use comment::{Comment, CommentId};
pub use image::{ImageFile, UploadedImage};
pub use like::{LikeResponse, LikeState};
pub use member::{Member, SignupForm};
pub use page::{Cursor, Page};
pub use post::{PostDetail, PostDraft, PostId, PostImage, PostSummary};

use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
