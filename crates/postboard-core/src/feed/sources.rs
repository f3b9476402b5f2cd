use async_trait::async_trait;

use crate::api::{ApiClient, ApiError};
use crate::models::{Comment, Cursor, Page, PostId, PostSummary};

use super::loader::PageSource;

/// The post feed, `GET /api/v1/posts`
#[derive(Clone, Debug)]
pub struct PostFeed {
    client: ApiClient,
}

impl PostFeed {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for PostFeed {
    type Item = PostSummary;

    async fn fetch_page(&self, cursor: Option<Cursor>, size: u32) -> Result<Page<PostSummary>, ApiError> {
        self.client.list_posts(cursor.as_ref(), size).await
    }
}

/// Comments under one post, `GET /api/v1/posts/{id}/comments`
#[derive(Clone, Debug)]
pub struct CommentFeed {
    client: ApiClient,
    post_id: PostId,
}

impl CommentFeed {
    pub fn new(client: ApiClient, post_id: PostId) -> Self {
        Self { client, post_id }
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }
}

#[async_trait]
impl PageSource for CommentFeed {
    type Item = Comment;

    async fn fetch_page(&self, cursor: Option<Cursor>, size: u32) -> Result<Page<Comment>, ApiError> {
        self.client
            .list_comments(self.post_id, cursor.as_ref(), size)
            .await
    }
}
