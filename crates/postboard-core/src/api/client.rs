//! Typed client for the postboard REST API.
//!
//! `ApiClient` validates input, sends the descriptor built by
//! [`operations`](super::operations) through the shared `HttpClient`, and
//! decodes the result. Session side effects (saving the token after login,
//! clearing it on logout) happen here and nowhere else.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::auth::TokenStore;
use crate::config::{Config, Endpoints};
use crate::models::{
    Comment, CommentId, Cursor, ImageFile, LikeResponse, LikeState, Member, Page, PostDetail,
    PostDraft, PostId, PostSummary, SignupForm, UploadedImage,
};
use crate::validation::{
    validate_comment, validate_image, validate_login, validate_post, validate_signup,
    ValidationError,
};

use super::http::{HttpClient, ACCESS_HEADER};
use super::operations;
use super::request::RequestDescriptor;
use super::response::ApiResponse;
use super::ApiError;

/// Body of a create response. Older servers answer with no body at all.
#[derive(Debug, Deserialize)]
struct Created {
    #[serde(alias = "postId", alias = "commentId")]
    id: Option<i64>,
}

/// API client for the postboard backend.
/// Clone is cheap - the underlying HttpClient shares its connection pool.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: HttpClient,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(http: HttpClient, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    pub fn from_config(config: &Config, tokens: TokenStore) -> Result<Self, ApiError> {
        let http = HttpClient::from_config(config, tokens)?;
        Ok(Self::new(http, config.endpoints.clone()))
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn tokens(&self) -> &TokenStore {
        self.http.tokens()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens().is_authenticated()
    }

    async fn send(&self, descriptor: RequestDescriptor) -> Result<ApiResponse, ApiError> {
        self.http.request(descriptor).await?.error_for_status()
    }

    async fn send_json<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Result<T, ApiError> {
        self.send(descriptor).await?.json()
    }

    async fn send_empty(&self, descriptor: RequestDescriptor) -> Result<(), ApiError> {
        self.send(descriptor).await.map(|_| ())
    }

    // ===== Session =====

    /// Log in and persist the access token the server returns in the
    /// `access` response header.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        validate_login(email, password)?;

        let response = self
            .http
            .request(operations::login(&self.endpoints, email, password))
            .await?;
        if response.status == StatusCode::UNAUTHORIZED {
            warn!("Login rejected");
            return Err(ApiError::InvalidCredentials);
        }
        let response = response.error_for_status()?;

        let token = response
            .header(ACCESS_HEADER)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ApiError::InvalidResponse("login response carried no access token".to_string())
            })?
            .to_string();

        self.tokens().save(&token)?;
        info!("Login successful");
        Ok(())
    }

    /// Log out. The server is told best-effort; the local token is cleared
    /// whatever it answers.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if self.is_authenticated() {
            match self.http.request(operations::logout(&self.endpoints)).await {
                Ok(response) if response.is_success() => debug!("Server session ended"),
                Ok(response) => warn!(status = %response.status, "Logout request rejected"),
                Err(e) => warn!(error = %e, "Logout request failed"),
            }
        }
        self.tokens().clear()?;
        info!("Logged out");
        Ok(())
    }

    /// Upload the profile image, then register the account with its id.
    pub async fn signup(&self, form: &SignupForm, profile_image: Option<&ImageFile>) -> Result<(), ApiError> {
        validate_signup(form, profile_image)?;
        let image = profile_image.ok_or(ValidationError::ImageRequired)?;

        let image_id = self.upload_image(image).await?;
        self.send_empty(operations::signup(&self.endpoints, form, image_id))
            .await?;
        info!("Signup successful");
        Ok(())
    }

    pub async fn me(&self) -> Result<Member, ApiError> {
        self.send_json(operations::me(&self.endpoints)).await
    }

    /// Upload one image and return the id the server assigned to it
    pub async fn upload_image(&self, image: &ImageFile) -> Result<i64, ApiError> {
        validate_image(image)?;
        let uploaded: UploadedImage = self
            .send_json(operations::upload_image(&self.endpoints, image))
            .await?;
        debug!(image_id = uploaded.image_id(), size = image.size(), "Image uploaded");
        Ok(uploaded.image_id())
    }

    async fn upload_optional(&self, image: Option<&ImageFile>) -> Result<Option<i64>, ApiError> {
        match image {
            Some(image) => Ok(Some(self.upload_image(image).await?)),
            None => Ok(None),
        }
    }

    // ===== Posts =====

    pub async fn list_posts(&self, cursor: Option<&Cursor>, size: u32) -> Result<Page<PostSummary>, ApiError> {
        self.send_json(operations::list_posts(&self.endpoints, cursor, size))
            .await
    }

    pub async fn post(&self, post_id: PostId) -> Result<PostDetail, ApiError> {
        self.send_json(operations::get_post(&self.endpoints, post_id))
            .await
    }

    /// Fetch a post together with the logged-in member, concurrently
    pub async fn post_with_viewer(&self, post_id: PostId) -> Result<(PostDetail, Member), ApiError> {
        futures::future::try_join(self.post(post_id), self.me()).await
    }

    /// Create a post, uploading its image first when one is given.
    /// Returns the new post's id if the server reports it.
    pub async fn create_post(
        &self,
        draft: &PostDraft,
        image: Option<&ImageFile>,
    ) -> Result<Option<PostId>, ApiError> {
        validate_post(draft)?;
        let image_id = self.upload_optional(image).await?;

        let response = self
            .send(operations::create_post(&self.endpoints, draft, image_id))
            .await?;
        let id = response.json::<Created>().ok().and_then(|c| c.id);
        info!(post_id = ?id, "Post created");
        Ok(id)
    }

    /// Update a post. A new image replaces the existing ones; without one
    /// the existing image ids are sent back unchanged.
    pub async fn update_post(
        &self,
        post_id: PostId,
        draft: &PostDraft,
        existing_image_ids: &[i64],
        image: Option<&ImageFile>,
    ) -> Result<(), ApiError> {
        validate_post(draft)?;
        let image_ids = match self.upload_optional(image).await? {
            Some(id) => vec![id],
            None => existing_image_ids.to_vec(),
        };

        self.send_empty(operations::update_post(&self.endpoints, post_id, draft, &image_ids))
            .await?;
        info!(post_id, "Post updated");
        Ok(())
    }

    pub async fn delete_post(&self, post_id: PostId) -> Result<(), ApiError> {
        self.send_empty(operations::delete_post(&self.endpoints, post_id))
            .await?;
        info!(post_id, "Post deleted");
        Ok(())
    }

    // ===== Likes =====

    async fn send_like(&self, descriptor: RequestDescriptor) -> Result<LikeResponse, ApiError> {
        let response = self.send(descriptor).await?;
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(LikeResponse::default());
        }
        response.json()
    }

    pub async fn like(&self, post_id: PostId) -> Result<LikeResponse, ApiError> {
        self.send_like(operations::like_post(&self.endpoints, post_id))
            .await
    }

    pub async fn unlike(&self, post_id: PostId) -> Result<LikeResponse, ApiError> {
        self.send_like(operations::unlike_post(&self.endpoints, post_id))
            .await
    }

    /// Send the transition away from `current`: unlike when liked, like otherwise
    pub async fn toggle_like(&self, post_id: PostId, current: LikeState) -> Result<LikeResponse, ApiError> {
        match current {
            LikeState::Liked => self.unlike(post_id).await,
            LikeState::NotLiked => self.like(post_id).await,
        }
    }

    // ===== Comments =====

    pub async fn list_comments(
        &self,
        post_id: PostId,
        cursor: Option<&Cursor>,
        size: u32,
    ) -> Result<Page<Comment>, ApiError> {
        self.send_json(operations::list_comments(&self.endpoints, post_id, cursor, size))
            .await
    }

    pub async fn create_comment(&self, post_id: PostId, content: &str) -> Result<(), ApiError> {
        validate_comment(content)?;
        self.send_empty(operations::create_comment(&self.endpoints, post_id, content))
            .await?;
        debug!(post_id, "Comment created");
        Ok(())
    }

    pub async fn update_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        content: &str,
    ) -> Result<(), ApiError> {
        validate_comment(content)?;
        self.send_empty(operations::update_comment(
            &self.endpoints,
            post_id,
            comment_id,
            content,
        ))
        .await?;
        debug!(post_id, comment_id, "Comment updated");
        Ok(())
    }

    pub async fn delete_comment(&self, post_id: PostId, comment_id: CommentId) -> Result<(), ApiError> {
        self.send_empty(operations::delete_comment(&self.endpoints, post_id, comment_id))
            .await?;
        debug!(post_id, comment_id, "Comment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::time::Duration;

    fn client_for(server: &Server, tokens: TokenStore) -> ApiClient {
        let http = HttpClient::new(&server.url(), Duration::from_secs(5), tokens).unwrap();
        ApiClient::new(http, Endpoints::default())
    }

    fn png() -> ImageFile {
        ImageFile::new("me.png", "image/png", vec![0x89, b'P', b'N', b'G'])
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let mut server = Server::new_async().await;
        let login = server
            .mock("POST", "/login")
            .match_header("access", Matcher::Missing)
            .match_body(Matcher::Json(json!({"username": "a@b.co", "password": "pw"})))
            .with_status(200)
            .with_header("access", "abc")
            .create_async()
            .await;
        let logout = server
            .mock("POST", "/logout")
            .match_header("access", "abc")
            .with_status(200)
            .create_async()
            .await;

        let tokens = TokenStore::in_memory();
        let client = client_for(&server, tokens.clone());

        client.login("a@b.co", "pw").await.unwrap();
        assert!(tokens.is_authenticated());
        assert_eq!(tokens.get().as_deref(), Some("abc"));

        client.logout().await.unwrap();
        assert!(!tokens.is_authenticated());

        login.assert_async().await;
        logout.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_rejected_is_invalid_credentials() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/login")
            .with_status(401)
            .create_async()
            .await;

        let tokens = TokenStore::in_memory();
        let client = client_for(&server, tokens.clone());
        let err = client.login("a@b.co", "wrong").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));
        assert!(!tokens.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_without_access_header_is_invalid_response() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/login")
            .with_status(200)
            .create_async()
            .await;

        let tokens = TokenStore::in_memory();
        let client = client_for(&server, tokens.clone());
        let err = client.login("a@b.co", "pw").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
        assert!(!tokens.is_authenticated());
    }

    #[tokio::test]
    async fn test_invalid_login_input_sends_nothing() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/login")
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server, TokenStore::in_memory());
        let err = client.login("not-an-email", "pw").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::InvalidEmail)
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_logout_clears_token_when_server_fails() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/logout")
            .with_status(500)
            .create_async()
            .await;

        let tokens = TokenStore::in_memory();
        tokens.save("abc").unwrap();
        let client = client_for(&server, tokens.clone());
        client.logout().await.unwrap();
        assert!(!tokens.is_authenticated());
    }

    #[tokio::test]
    async fn test_signup_uploads_image_then_registers() {
        let mut server = Server::new_async().await;
        let upload = server
            .mock("POST", "/api/v1/images")
            .with_status(200)
            .with_body(r#"{"metadata": {"imageId": 42}, "s3Url": "https://img/42"}"#)
            .create_async()
            .await;
        let register = server
            .mock("POST", "/api/v1/members")
            .match_body(Matcher::Json(json!({
                "email": "a@b.co",
                "password": "abcd123!",
                "nickname": "nick",
                "profileImageId": 42,
            })))
            .with_status(201)
            .create_async()
            .await;

        let client = client_for(&server, TokenStore::in_memory());
        let form = SignupForm::new("a@b.co", "abcd123!", "abcd123!", "nick");
        client.signup(&form, Some(&png())).await.unwrap();

        upload.assert_async().await;
        register.assert_async().await;
    }

    #[tokio::test]
    async fn test_signup_surfaces_server_message() {
        let mut server = Server::new_async().await;
        let _upload = server
            .mock("POST", "/api/v1/images")
            .with_status(200)
            .with_body(r#"{"imageId": 1}"#)
            .create_async()
            .await;
        let _register = server
            .mock("POST", "/api/v1/members")
            .with_status(409)
            .with_body(r#"{"status": 409, "message": "Email already registered"}"#)
            .create_async()
            .await;

        let client = client_for(&server, TokenStore::in_memory());
        let form = SignupForm::new("a@b.co", "abcd123!", "abcd123!", "nick");
        let err = client.signup(&form, Some(&png())).await.unwrap_err();
        assert_eq!(err.user_message(), "Email already registered");
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    }

    #[tokio::test]
    async fn test_create_post_with_image() {
        let mut server = Server::new_async().await;
        let _upload = server
            .mock("POST", "/api/v1/images")
            .with_status(200)
            .with_body(r#"{"imageId": 9}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/v1/posts")
            .match_header("access", "abc")
            .match_body(Matcher::Json(json!({"title": "t", "content": "c", "imageId": 9})))
            .with_status(201)
            .with_body(r#"{"postId": 77}"#)
            .create_async()
            .await;

        let tokens = TokenStore::in_memory();
        tokens.save("abc").unwrap();
        let client = client_for(&server, tokens);
        let id = client
            .create_post(&PostDraft::new("t", "c"), Some(&png()))
            .await
            .unwrap();
        assert_eq!(id, Some(77));
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_post_keeps_existing_images() {
        let mut server = Server::new_async().await;
        let update = server
            .mock("PATCH", "/api/v1/posts/3")
            .match_body(Matcher::Json(json!({"title": "t", "content": "c", "imageIds": [5, 6]})))
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server, TokenStore::in_memory());
        client
            .update_post(3, &PostDraft::new("t", "c"), &[5, 6], None)
            .await
            .unwrap();
        update.assert_async().await;
    }

    #[tokio::test]
    async fn test_toggle_like_sends_transition() {
        let mut server = Server::new_async().await;
        let like = server
            .mock("POST", "/api/v1/posts/4/likes")
            .with_status(200)
            .with_body(r#"{"likeCount": 5}"#)
            .create_async()
            .await;
        let unlike = server
            .mock("DELETE", "/api/v1/posts/4/likes")
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server, TokenStore::in_memory());
        let liked = client.toggle_like(4, LikeState::NotLiked).await.unwrap();
        assert_eq!(liked.like_count, Some(5));

        let unliked = client.toggle_like(4, LikeState::Liked).await.unwrap();
        assert_eq!(unliked, LikeResponse::default());

        like.assert_async().await;
        unlike.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_with_viewer() {
        let mut server = Server::new_async().await;
        let _post = server
            .mock("GET", "/api/v1/posts/2")
            .with_status(200)
            .with_body(r#"{"id": 2, "title": "t", "content": "c", "memberId": 8}"#)
            .create_async()
            .await;
        let _me = server
            .mock("GET", "/api/v1/members/me")
            .with_status(200)
            .with_body(r#"{"memberId": 8, "nickname": "kim"}"#)
            .create_async()
            .await;

        let client = client_for(&server, TokenStore::in_memory());
        let (post, viewer) = client.post_with_viewer(2).await.unwrap();
        assert_eq!(post.member_id, Some(viewer.member_id));
    }

    #[tokio::test]
    async fn test_expired_session_is_unauthorized() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/members/me")
            .with_status(401)
            .create_async()
            .await;

        let client = client_for(&server, TokenStore::in_memory());
        let err = client.me().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn test_empty_comment_rejected_locally() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/posts/1/comments")
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server, TokenStore::in_memory());
        let err = client.create_comment(1, "   ").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::EmptyComment)
        ));
        mock.assert_async().await;
    }
}
