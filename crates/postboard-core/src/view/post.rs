use crate::models::{Comment, LikeResponse, LikeState, Member, PostDetail, PostId};

use super::comments::CommentEdits;

/// State of one post detail page.
#[derive(Debug, Clone)]
pub struct PostView {
    pub post_id: PostId,
    pub viewer_id: Option<i64>,
    pub author_id: Option<i64>,
    pub like_state: LikeState,
    pub like_count: u64,
    pub comment_count: u64,
    /// Image ids sent back unchanged when the post is edited without a new image
    pub existing_image_ids: Vec<i64>,
    pub comment_edits: CommentEdits,
}

impl PostView {
    pub fn from_detail(detail: &PostDetail, viewer: Option<&Member>) -> Self {
        Self {
            post_id: detail.id,
            viewer_id: viewer.map(|m| m.member_id),
            author_id: detail.member_id,
            like_state: LikeState::from_flag(detail.liked.unwrap_or(false)),
            like_count: detail.like_count,
            comment_count: detail.comment_count,
            existing_image_ids: detail.image_ids(),
            comment_edits: CommentEdits::new(),
        }
    }

    fn is_viewer(&self, member_id: Option<i64>) -> bool {
        matches!((self.viewer_id, member_id), (Some(viewer), Some(id)) if viewer == id)
    }

    /// Edit and delete are offered only to the author
    pub fn can_modify(&self) -> bool {
        self.is_viewer(self.author_id)
    }

    pub fn can_modify_comment(&self, comment: &Comment) -> bool {
        self.is_viewer(comment.member_id)
    }

    /// Apply a successful like/unlike response. The state flips unless the
    /// server says otherwise; the count follows the server when it reports one.
    pub fn apply_like(&mut self, response: &LikeResponse) {
        let next = response
            .liked
            .map(LikeState::from_flag)
            .unwrap_or_else(|| self.like_state.toggled());

        self.like_count = match response.like_count {
            Some(count) => count,
            None if next == self.like_state => self.like_count,
            None => match next {
                LikeState::Liked => self.like_count + 1,
                LikeState::NotLiked => self.like_count.saturating_sub(1),
            },
        };
        self.like_state = next;
    }

    pub fn comment_added(&mut self) {
        self.comment_count += 1;
    }

    pub fn comment_removed(&mut self) {
        self.comment_count = self.comment_count.saturating_sub(1);
    }
}
