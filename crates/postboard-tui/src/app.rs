//! Application state management for the postboard TUI.
//!
//! This module contains the `App` struct holding all UI state: the current
//! screen, form contents, the loaded feed and post, and the channel through
//! which background tasks report back. Every network call runs on a spawned
//! task; `check_background_tasks` applies the results between frames.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use postboard_core::api::error::SESSION_EXPIRED_MESSAGE;
use postboard_core::api::ApiClient;
use postboard_core::auth::TokenStore;
use postboard_core::config::Config;
use postboard_core::feed::{CommentFeed, FeedLoader, PostFeed};
use postboard_core::models::{
    Comment, CommentId, ImageFile, PostDetail, PostDraft, PostId, PostSummary, SignupForm,
};
use postboard_core::view::PostView;

use crate::events::{ChannelRenderer, FeedKind, FeedUpdate, UiEvent};

// ============================================================================
// Constants
// ============================================================================

const MAX_EMAIL_LENGTH: usize = 100;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_NICKNAME_LENGTH: usize = 32;
const MAX_TITLE_LENGTH: usize = 64;
const MAX_CONTENT_LENGTH: usize = 10_000;
pub const MAX_COMMENT_LENGTH: usize = 1_000;
const MAX_PATH_LENGTH: usize = 512;

/// Number of rows to move on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Request the next page once the selection is this close to the end of
/// what is loaded.
pub const LOAD_AHEAD: usize = 3;

// ============================================================================
// UI State Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Feed,
    Detail,
    Compose,
}

/// Which half of the detail screen has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailFocus {
    Post,
    Comments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    Post(PostId),
    Comment(PostId, CommentId),
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    LoggingIn,
    SigningUp,
    WritingComment,
    ConfirmingDelete(DeleteTarget),
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginFocus {
    #[default]
    Email,
    Password,
    Button,
    Signup,
}

impl LoginFocus {
    pub fn next(self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Signup,
            LoginFocus::Signup => LoginFocus::Email,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Signup,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::Button => LoginFocus::Password,
            LoginFocus::Signup => LoginFocus::Button,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: LoginFocus,
    pub error: Option<String>,
    pub submitting: bool,
}

impl LoginForm {
    /// The text field under focus and its length limit
    pub fn focused_field(&mut self) -> Option<(&mut String, usize)> {
        match self.focus {
            LoginFocus::Email => Some((&mut self.email, MAX_EMAIL_LENGTH)),
            LoginFocus::Password => Some((&mut self.password, MAX_PASSWORD_LENGTH)),
            LoginFocus::Button | LoginFocus::Signup => None,
        }
    }
}

/// Signup form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignupFocus {
    #[default]
    Email,
    Password,
    Confirm,
    Nickname,
    Image,
    Button,
}

impl SignupFocus {
    pub fn next(self) -> Self {
        match self {
            SignupFocus::Email => SignupFocus::Password,
            SignupFocus::Password => SignupFocus::Confirm,
            SignupFocus::Confirm => SignupFocus::Nickname,
            SignupFocus::Nickname => SignupFocus::Image,
            SignupFocus::Image => SignupFocus::Button,
            SignupFocus::Button => SignupFocus::Email,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            SignupFocus::Email => SignupFocus::Button,
            SignupFocus::Password => SignupFocus::Email,
            SignupFocus::Confirm => SignupFocus::Password,
            SignupFocus::Nickname => SignupFocus::Confirm,
            SignupFocus::Image => SignupFocus::Nickname,
            SignupFocus::Button => SignupFocus::Image,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignupFields {
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub nickname: String,
    pub image_path: String,
    pub focus: SignupFocus,
    pub error: Option<String>,
    pub submitting: bool,
}

impl SignupFields {
    pub fn focused_field(&mut self) -> Option<(&mut String, usize)> {
        match self.focus {
            SignupFocus::Email => Some((&mut self.email, MAX_EMAIL_LENGTH)),
            SignupFocus::Password => Some((&mut self.password, MAX_PASSWORD_LENGTH)),
            SignupFocus::Confirm => Some((&mut self.confirm, MAX_PASSWORD_LENGTH)),
            SignupFocus::Nickname => Some((&mut self.nickname, MAX_NICKNAME_LENGTH)),
            SignupFocus::Image => Some((&mut self.image_path, MAX_PATH_LENGTH)),
            SignupFocus::Button => None,
        }
    }
}

/// Post editor focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeFocus {
    #[default]
    Title,
    Content,
    Image,
    Button,
}

impl ComposeFocus {
    pub fn next(self) -> Self {
        match self {
            ComposeFocus::Title => ComposeFocus::Content,
            ComposeFocus::Content => ComposeFocus::Image,
            ComposeFocus::Image => ComposeFocus::Button,
            ComposeFocus::Button => ComposeFocus::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ComposeFocus::Title => ComposeFocus::Button,
            ComposeFocus::Content => ComposeFocus::Title,
            ComposeFocus::Image => ComposeFocus::Content,
            ComposeFocus::Button => ComposeFocus::Image,
        }
    }
}

/// New or edited post
#[derive(Debug, Clone, Default)]
pub struct ComposeForm {
    /// Set when editing an existing post
    pub editing: Option<PostId>,
    pub title: String,
    pub content: String,
    pub image_path: String,
    pub existing_image_ids: Vec<i64>,
    pub focus: ComposeFocus,
    pub error: Option<String>,
    pub submitting: bool,
}

impl ComposeForm {
    pub fn edit(detail: &PostDetail) -> Self {
        Self {
            editing: Some(detail.id),
            title: detail.title.clone(),
            content: detail.content.clone(),
            existing_image_ids: detail.image_ids(),
            ..Self::default()
        }
    }

    pub fn focused_field(&mut self) -> Option<(&mut String, usize)> {
        match self.focus {
            ComposeFocus::Title => Some((&mut self.title, MAX_TITLE_LENGTH)),
            ComposeFocus::Content => Some((&mut self.content, MAX_CONTENT_LENGTH)),
            ComposeFocus::Image => Some((&mut self.image_path, MAX_PATH_LENGTH)),
            ComposeFocus::Button => None,
        }
    }
}

/// Comment being written or edited
#[derive(Debug, Clone, Default)]
pub struct CommentInput {
    pub text: String,
    /// Set when editing an existing comment
    pub editing: Option<CommentId>,
    pub error: Option<String>,
    pub submitting: bool,
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub api: ApiClient,

    // UI State
    pub state: AppState,
    pub screen: Screen,
    pub status_message: Option<String>,

    // Forms
    pub login: LoginForm,
    pub signup: SignupFields,
    pub compose: ComposeForm,
    pub comment_input: CommentInput,

    // Feed
    feed: Arc<FeedLoader<PostFeed>>,
    pub posts: Vec<PostSummary>,
    pub post_selection: usize,
    pub feed_empty: bool,
    pub feed_error: Option<String>,
    feed_refresh_pending: bool,

    // Post detail
    pub detail: Option<PostDetail>,
    pub post_view: Option<PostView>,
    pub detail_focus: DetailFocus,
    pub detail_scroll: u16,
    pub detail_error: Option<String>,
    pub comments: Vec<Comment>,
    pub comment_selection: usize,
    pub comments_empty: bool,
    comment_feed: Option<Arc<FeedLoader<CommentFeed>>>,
    comments_refresh_pending: bool,
    pending_detail: Option<PostId>,
    like_in_flight: bool,

    // Background task channel
    events_tx: mpsc::UnboundedSender<UiEvent>,
    events_rx: mpsc::UnboundedReceiver<UiEvent>,
}

impl App {
    /// Create a new application instance from the saved configuration
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        debug!(api = %config.api_base_url, "Config loaded");

        let tokens = TokenStore::from_config(&config)?;
        let api = ApiClient::from_config(&config, tokens)?;
        Ok(Self::with_client(config, api))
    }

    pub fn with_client(config: Config, api: ApiClient) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let feed = FeedLoader::new(PostFeed::new(api.clone()), config.effective_page_size())
            .with_deadline(config.feed_deadline());

        let login = LoginForm {
            email: config.last_email.clone().unwrap_or_default(),
            ..LoginForm::default()
        };

        Self {
            config,
            api,

            state: AppState::Normal,
            screen: Screen::Feed,
            status_message: None,

            login,
            signup: SignupFields::default(),
            compose: ComposeForm::default(),
            comment_input: CommentInput::default(),

            feed: Arc::new(feed),
            posts: Vec::new(),
            post_selection: 0,
            feed_empty: false,
            feed_error: None,
            feed_refresh_pending: false,

            detail: None,
            post_view: None,
            detail_focus: DetailFocus::Post,
            detail_scroll: 0,
            detail_error: None,
            comments: Vec::new(),
            comment_selection: 0,
            comments_empty: false,
            comment_feed: None,
            comments_refresh_pending: false,
            pending_detail: None,
            like_in_flight: false,

            events_tx,
            events_rx,
        }
    }

    /// Show the feed for a stored session, or the login form
    pub fn start(&mut self) {
        if self.is_authenticated() {
            self.refresh_feed();
        } else {
            self.start_login();
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.is_authenticated()
    }

    /// Run `task` in the background and deliver its event to the UI loop
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let event = task.await;
            if tx.send(event).is_err() {
                debug!("UI loop gone, dropping event");
            }
        });
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Show the login overlay
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login.focus = if self.login.email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login.error = None;
        self.login.submitting = false;
    }

    pub fn submit_login(&mut self) {
        if self.login.submitting {
            return;
        }
        self.login.submitting = true;
        self.login.error = None;

        let api = self.api.clone();
        let email = self.login.email.trim().to_string();
        let password = self.login.password.clone();
        self.spawn(async move {
            match api.login(&email, &password).await {
                Ok(()) => UiEvent::LoggedIn,
                Err(e) => UiEvent::LoginFailed(e.user_message()),
            }
        });
    }

    pub fn start_signup(&mut self) {
        self.signup = SignupFields {
            email: self.login.email.clone(),
            ..SignupFields::default()
        };
        self.state = AppState::SigningUp;
    }

    pub fn cancel_signup(&mut self) {
        self.signup = SignupFields::default();
        self.start_login();
    }

    pub fn submit_signup(&mut self) {
        if self.signup.submitting {
            return;
        }
        let image = match read_image(&self.signup.image_path) {
            Ok(image) => image,
            Err(message) => {
                self.signup.error = Some(message);
                return;
            }
        };
        self.signup.submitting = true;
        self.signup.error = None;

        let api = self.api.clone();
        let form = SignupForm::new(
            self.signup.email.as_str(),
            self.signup.password.as_str(),
            self.signup.confirm.as_str(),
            self.signup.nickname.as_str(),
        );
        self.spawn(async move {
            match api.signup(&form, image.as_ref()).await {
                Ok(()) => UiEvent::SignedUp,
                Err(e) => UiEvent::SignupFailed(e.user_message()),
            }
        });
    }

    pub fn logout(&mut self) {
        let api = self.api.clone();
        self.spawn(async move {
            match api.logout().await {
                Ok(()) => UiEvent::LoggedOut,
                Err(e) => UiEvent::ActionFailed(e.user_message()),
            }
        });
    }

    fn session_expired(&mut self) {
        if let Err(e) = self.api.tokens().clear() {
            warn!(error = %e, "Failed to clear expired token");
        }
        self.status_message = Some(SESSION_EXPIRED_MESSAGE.to_string());
        self.start_login();
    }

    // =========================================================================
    // Feed
    // =========================================================================

    /// Load the next feed page, or the first one when `initial`
    pub fn load_feed(&self, initial: bool) {
        let loader = self.feed.clone();
        let tx = self.events_tx.clone();
        let mut renderer = ChannelRenderer::new(tx.clone(), UiEvent::Posts);
        tokio::spawn(async move {
            let outcome = loader.load_next(initial, &mut renderer).await;
            if let Some(event) = UiEvent::load_finished(FeedKind::Posts, initial, &outcome) {
                let _ = tx.send(event);
            }
        });
    }

    pub fn refresh_feed(&mut self) {
        self.post_selection = 0;
        self.load_feed(true);
    }

    pub fn feed_loading(&self) -> bool {
        self.feed.is_loading()
    }

    pub fn feed_exhausted(&self) -> bool {
        self.feed.is_exhausted()
    }

    /// Request more posts when the selection nears the end of the list
    pub fn maybe_load_more_posts(&self) {
        if self.post_selection + LOAD_AHEAD >= self.posts.len() && !self.feed.is_exhausted() {
            self.load_feed(false);
        }
    }

    pub fn move_post_selection(&mut self, delta: isize) {
        self.post_selection = offset_selection(self.post_selection, delta, self.posts.len());
        self.maybe_load_more_posts();
    }

    pub fn selected_post(&self) -> Option<&PostSummary> {
        self.posts.get(self.post_selection)
    }

    fn apply_feed_update(&mut self, update: FeedUpdate<PostSummary>) {
        match update {
            FeedUpdate::Cleared => {
                self.posts.clear();
                self.post_selection = 0;
                self.feed_empty = false;
                self.feed_error = None;
            }
            FeedUpdate::Appended(items) => {
                self.posts.extend(items);
                self.feed_empty = false;
                self.feed_error = None;
            }
            FeedUpdate::Empty => self.feed_empty = true,
            FeedUpdate::Failed(message) => {
                self.feed_error = Some(message.clone());
                self.status_message = Some(message);
            }
            FeedUpdate::SessionExpired => self.session_expired(),
        }
    }

    // =========================================================================
    // Post Detail
    // =========================================================================

    pub fn open_selected_post(&mut self) {
        if let Some(id) = self.selected_post().map(|p| p.id) {
            self.open_post(id);
        }
    }

    /// Switch to the detail screen and load the post, viewer and comments
    pub fn open_post(&mut self, post_id: PostId) {
        self.screen = Screen::Detail;
        self.detail = None;
        self.post_view = None;
        self.detail_error = None;
        self.detail_focus = DetailFocus::Post;
        self.detail_scroll = 0;
        self.comments.clear();
        self.comment_selection = 0;
        self.comments_empty = false;
        self.like_in_flight = false;
        self.comments_refresh_pending = false;
        self.pending_detail = Some(post_id);

        let loader = FeedLoader::new(
            CommentFeed::new(self.api.clone(), post_id),
            self.config.effective_page_size(),
        )
        .with_deadline(self.config.feed_deadline());
        self.comment_feed = Some(Arc::new(loader));

        let api = self.api.clone();
        self.spawn(async move {
            match api.post_with_viewer(post_id).await {
                Ok((detail, viewer)) => UiEvent::PostLoaded(Box::new(detail), viewer),
                Err(e) => UiEvent::post_load_failure(post_id, &e),
            }
        });
        self.load_comments(true);
    }

    pub fn back_to_feed(&mut self) {
        self.screen = Screen::Feed;
        self.detail = None;
        self.post_view = None;
        self.comment_feed = None;
        self.comments_refresh_pending = false;
        self.comments.clear();
        self.pending_detail = None;
    }

    /// Leave the detail screen, reloading the feed so its counts are current
    pub fn return_to_feed(&mut self) {
        self.back_to_feed();
        self.refresh_feed();
    }

    pub fn load_comments(&self, initial: bool) {
        let Some(loader) = self.comment_feed.clone() else {
            return;
        };
        let post_id = loader.source().post_id();
        let tx = self.events_tx.clone();
        let mut renderer = ChannelRenderer::new(tx.clone(), move |u| UiEvent::Comments(post_id, u));
        tokio::spawn(async move {
            let outcome = loader.load_next(initial, &mut renderer).await;
            let feed = FeedKind::Comments(post_id);
            if let Some(event) = UiEvent::load_finished(feed, initial, &outcome) {
                let _ = tx.send(event);
            }
        });
    }

    /// Re-issue a refresh that found another load in flight, once that
    /// load has finished
    fn load_finished(&mut self, feed: FeedKind, refresh_deferred: bool) {
        match feed {
            FeedKind::Posts => {
                if refresh_deferred && self.feed.is_loading() {
                    self.feed_refresh_pending = true;
                } else if refresh_deferred || self.feed_refresh_pending {
                    self.feed_refresh_pending = false;
                    self.load_feed(true);
                }
            }
            FeedKind::Comments(post_id) => {
                let Some(loader) = self.comment_feed.as_ref() else {
                    return;
                };
                if loader.source().post_id() != post_id {
                    return;
                }
                if refresh_deferred && loader.is_loading() {
                    self.comments_refresh_pending = true;
                } else if refresh_deferred || self.comments_refresh_pending {
                    self.comments_refresh_pending = false;
                    self.load_comments(true);
                }
            }
        }
    }

    /// Copy the open post's comment count into its feed row
    fn sync_comment_count(&mut self, post_id: PostId) {
        let Some(count) = self
            .post_view
            .as_ref()
            .filter(|v| v.post_id == post_id)
            .map(|v| v.comment_count)
        else {
            return;
        };
        if let Some(post) = self.posts.iter_mut().find(|p| p.id == post_id) {
            post.comment_count = count;
        }
    }

    pub fn comments_exhausted(&self) -> bool {
        self.comment_feed
            .as_ref()
            .map(|f| f.is_exhausted())
            .unwrap_or(true)
    }

    pub fn comments_loading(&self) -> bool {
        self.comment_feed
            .as_ref()
            .map(|f| f.is_loading())
            .unwrap_or(false)
    }

    pub fn move_comment_selection(&mut self, delta: isize) {
        self.comment_selection =
            offset_selection(self.comment_selection, delta, self.comments.len());
        if self.comment_selection + LOAD_AHEAD >= self.comments.len() && !self.comments_exhausted() {
            self.load_comments(false);
        }
    }

    pub fn selected_comment(&self) -> Option<&Comment> {
        self.comments.get(self.comment_selection)
    }

    fn current_post_id(&self) -> Option<PostId> {
        self.post_view.as_ref().map(|v| v.post_id)
    }

    fn apply_comment_update(&mut self, post_id: PostId, update: FeedUpdate<Comment>) {
        let current = self.comment_feed.as_ref().map(|f| f.source().post_id());
        if current != Some(post_id) {
            debug!(post_id, "Dropping comments for a post no longer shown");
            return;
        }
        match update {
            FeedUpdate::Cleared => {
                self.comments.clear();
                self.comment_selection = 0;
                self.comments_empty = false;
            }
            FeedUpdate::Appended(items) => {
                self.comments.extend(items);
                self.comments_empty = false;
            }
            FeedUpdate::Empty => self.comments_empty = true,
            FeedUpdate::Failed(message) => self.status_message = Some(message),
            FeedUpdate::SessionExpired => self.session_expired(),
        }
    }

    /// Like or unlike the open post, based on the state shown
    pub fn toggle_like(&mut self) {
        if self.like_in_flight {
            return;
        }
        let Some(view) = self.post_view.as_ref() else {
            return;
        };
        let post_id = view.post_id;
        let current = view.like_state;
        self.like_in_flight = true;

        let api = self.api.clone();
        self.spawn(async move {
            match api.toggle_like(post_id, current).await {
                Ok(response) => UiEvent::LikeApplied(post_id, response),
                Err(e) => UiEvent::failure(&e),
            }
        });
    }

    // =========================================================================
    // Post Editing
    // =========================================================================

    pub fn start_new_post(&mut self) {
        self.compose = ComposeForm::default();
        self.screen = Screen::Compose;
    }

    pub fn start_edit_post(&mut self) {
        let can_modify = self.post_view.as_ref().map(|v| v.can_modify()).unwrap_or(false);
        match self.detail.as_ref() {
            Some(detail) if can_modify => {
                self.compose = ComposeForm::edit(detail);
                self.screen = Screen::Compose;
            }
            Some(_) => self.status_message = Some("Only the author can edit this post".to_string()),
            None => {}
        }
    }

    pub fn cancel_compose(&mut self) {
        self.screen = if self.compose.editing.is_some() && self.detail.is_some() {
            Screen::Detail
        } else {
            Screen::Feed
        };
        self.compose = ComposeForm::default();
    }

    pub fn submit_compose(&mut self) {
        if self.compose.submitting {
            return;
        }
        let image = match read_image(&self.compose.image_path) {
            Ok(image) => image,
            Err(message) => {
                self.compose.error = Some(message);
                return;
            }
        };
        self.compose.submitting = true;
        self.compose.error = None;

        let api = self.api.clone();
        let draft = PostDraft::new(self.compose.title.as_str(), self.compose.content.as_str());
        match self.compose.editing {
            Some(post_id) => {
                let existing = self.compose.existing_image_ids.clone();
                self.spawn(async move {
                    match api.update_post(post_id, &draft, &existing, image.as_ref()).await {
                        Ok(()) => UiEvent::PostSaved(Some(post_id)),
                        Err(e) => UiEvent::PostSaveFailed(e.user_message()),
                    }
                });
            }
            None => {
                self.spawn(async move {
                    match api.create_post(&draft, image.as_ref()).await {
                        Ok(id) => UiEvent::PostSaved(id),
                        Err(e) => UiEvent::PostSaveFailed(e.user_message()),
                    }
                });
            }
        }
    }

    // =========================================================================
    // Comments
    // =========================================================================

    pub fn start_comment(&mut self) {
        if self.post_view.is_none() {
            return;
        }
        self.comment_input = CommentInput::default();
        self.state = AppState::WritingComment;
    }

    /// Edit the selected comment in place, remembering its original text
    pub fn start_edit_comment(&mut self) {
        let Some(comment) = self.comments.get(self.comment_selection) else {
            return;
        };
        let Some(view) = self.post_view.as_mut() else {
            return;
        };
        if !view.can_modify_comment(comment) {
            self.status_message = Some("Only the author can edit this comment".to_string());
            return;
        }
        view.comment_edits.begin(comment.id, &comment.content);
        self.comment_input = CommentInput {
            text: comment.content.clone(),
            editing: Some(comment.id),
            ..CommentInput::default()
        };
        self.state = AppState::WritingComment;
    }

    /// Mirror the input into the comment being edited
    pub fn sync_comment_edit(&mut self) {
        if let Some(id) = self.comment_input.editing {
            if let Some(comment) = self.comments.iter_mut().find(|c| c.id == id) {
                comment.content = self.comment_input.text.clone();
            }
        }
    }

    /// Leave the comment input, restoring an edited comment's original text
    pub fn cancel_comment(&mut self) {
        if let Some(id) = self.comment_input.editing {
            let original = self
                .post_view
                .as_mut()
                .and_then(|view| view.comment_edits.cancel(id));
            if let (Some(original), Some(comment)) =
                (original, self.comments.iter_mut().find(|c| c.id == id))
            {
                comment.content = original;
            }
        }
        self.comment_input = CommentInput::default();
        self.state = AppState::Normal;
    }

    pub fn submit_comment(&mut self) {
        if self.comment_input.submitting {
            return;
        }
        let Some(post_id) = self.current_post_id() else {
            return;
        };
        self.comment_input.submitting = true;
        self.comment_input.error = None;

        let api = self.api.clone();
        let text = self.comment_input.text.clone();
        match self.comment_input.editing {
            Some(comment_id) => self.spawn(async move {
                match api.update_comment(post_id, comment_id, &text).await {
                    Ok(()) => UiEvent::CommentSaved(post_id, Some(comment_id)),
                    Err(e) => UiEvent::failure(&e),
                }
            }),
            None => self.spawn(async move {
                match api.create_comment(post_id, &text).await {
                    Ok(()) => UiEvent::CommentSaved(post_id, None),
                    Err(e) => UiEvent::failure(&e),
                }
            }),
        }
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Ask to delete the focused post or comment, if the viewer wrote it
    pub fn request_delete(&mut self) {
        let Some(view) = self.post_view.as_ref() else {
            return;
        };
        let target = match self.detail_focus {
            DetailFocus::Post if view.can_modify() => Some(DeleteTarget::Post(view.post_id)),
            DetailFocus::Comments => self
                .selected_comment()
                .filter(|c| view.can_modify_comment(c))
                .map(|c| DeleteTarget::Comment(view.post_id, c.id)),
            DetailFocus::Post => None,
        };
        match target {
            Some(target) => self.state = AppState::ConfirmingDelete(target),
            None => self.status_message = Some("You can only delete what you wrote".to_string()),
        }
    }

    pub fn confirm_delete(&mut self, target: DeleteTarget) {
        self.state = AppState::Normal;
        let api = self.api.clone();
        match target {
            DeleteTarget::Post(post_id) => self.spawn(async move {
                match api.delete_post(post_id).await {
                    Ok(()) => UiEvent::PostDeleted(post_id),
                    Err(e) => UiEvent::failure(&e),
                }
            }),
            DeleteTarget::Comment(post_id, comment_id) => self.spawn(async move {
                match api.delete_comment(post_id, comment_id).await {
                    Ok(()) => UiEvent::CommentDeleted(post_id),
                    Err(e) => UiEvent::failure(&e),
                }
            }),
        }
    }

    // =========================================================================
    // Background Results
    // =========================================================================

    /// Apply every result delivered since the last frame
    pub fn check_background_tasks(&mut self) {
        // Collect first to avoid borrow conflicts
        let mut events = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            events.push(event);
        }
        for event in events {
            self.process_event(event);
        }
    }

    pub fn process_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Posts(update) => self.apply_feed_update(update),
            UiEvent::Comments(post_id, update) => self.apply_comment_update(post_id, update),
            UiEvent::PostLoaded(detail, viewer) => {
                if self.pending_detail != Some(detail.id) {
                    debug!(post_id = detail.id, "Dropping stale post detail");
                    return;
                }
                self.pending_detail = None;
                self.post_view = Some(PostView::from_detail(&detail, Some(&viewer)));
                self.detail = Some(*detail);
            }
            UiEvent::PostLoadFailed(post_id, message) => {
                if self.pending_detail == Some(post_id) {
                    self.pending_detail = None;
                    self.detail_error = Some(message.clone());
                } else {
                    debug!(post_id, "Dropping stale post load failure");
                }
                self.status_message = Some(message);
            }
            UiEvent::LoadFinished {
                feed,
                refresh_deferred,
            } => self.load_finished(feed, refresh_deferred),
            UiEvent::LoggedIn => {
                info!("Logged in");
                self.login.password.clear();
                self.login.submitting = false;
                self.state = AppState::Normal;
                self.status_message = None;
                self.config.last_email = Some(self.login.email.trim().to_string());
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                self.back_to_feed();
                self.refresh_feed();
            }
            UiEvent::LoginFailed(message) => {
                self.login.submitting = false;
                self.login.error = Some(message);
            }
            UiEvent::SignedUp => {
                self.login.email = self.signup.email.trim().to_string();
                self.login.password.clear();
                self.signup = SignupFields::default();
                self.start_login();
                self.status_message = Some("Account created. Please log in.".to_string());
            }
            UiEvent::SignupFailed(message) => {
                self.signup.submitting = false;
                self.signup.error = Some(message);
            }
            UiEvent::LoggedOut => {
                self.back_to_feed();
                self.posts.clear();
                self.post_selection = 0;
                self.start_login();
                self.status_message = Some("Logged out".to_string());
            }
            UiEvent::PostSaved(post_id) => {
                debug!(?post_id, "Post saved");
                let edited = self.compose.editing;
                self.compose = ComposeForm::default();
                self.status_message = Some("Post saved".to_string());
                match edited {
                    Some(id) => self.open_post(id),
                    None => {
                        self.screen = Screen::Feed;
                        self.refresh_feed();
                    }
                }
            }
            UiEvent::PostSaveFailed(message) => {
                self.compose.submitting = false;
                self.compose.error = Some(message);
            }
            UiEvent::PostDeleted(post_id) => {
                debug!(post_id, "Post deleted");
                self.status_message = Some("Post deleted".to_string());
                self.back_to_feed();
                self.refresh_feed();
            }
            UiEvent::LikeApplied(post_id, response) => {
                self.like_in_flight = false;
                if let Some(view) = self.post_view.as_mut().filter(|v| v.post_id == post_id) {
                    view.apply_like(&response);
                    let count = view.like_count;
                    if let Some(post) = self.posts.iter_mut().find(|p| p.id == post_id) {
                        post.like_count = count;
                    }
                }
            }
            UiEvent::CommentSaved(post_id, edited) => {
                if let Some(view) = self.post_view.as_mut().filter(|v| v.post_id == post_id) {
                    match edited {
                        Some(comment_id) => view.comment_edits.finish(comment_id),
                        None => view.comment_added(),
                    }
                }
                self.sync_comment_count(post_id);
                self.comment_input = CommentInput::default();
                if self.state == AppState::WritingComment {
                    self.state = AppState::Normal;
                }
                self.load_comments(true);
            }
            UiEvent::CommentDeleted(post_id) => {
                if let Some(view) = self.post_view.as_mut().filter(|v| v.post_id == post_id) {
                    view.comment_removed();
                }
                self.sync_comment_count(post_id);
                self.status_message = Some("Comment deleted".to_string());
                self.load_comments(true);
            }
            UiEvent::ActionFailed(message) => {
                self.like_in_flight = false;
                self.comment_input.submitting = false;
                if self.state == AppState::WritingComment {
                    self.comment_input.error = Some(message.clone());
                }
                self.status_message = Some(message);
            }
            UiEvent::SessionExpired => {
                self.like_in_flight = false;
                self.comment_input = CommentInput::default();
                self.session_expired();
            }
        }
    }
}

#[cfg(test)]
impl App {
    /// An app whose client points at an unreachable address
    pub fn offline() -> Self {
        use postboard_core::api::HttpClient;
        use postboard_core::config::Endpoints;

        let tokens = TokenStore::in_memory();
        let http = HttpClient::new("http://127.0.0.1:1", std::time::Duration::from_secs(1), tokens)
            .expect("valid base url");
        App::with_client(Config::default(), ApiClient::new(http, Endpoints::default()))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Move a selection by `delta` rows, clamped to `[0, len)`
pub fn offset_selection(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let max = len - 1;
    if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as usize).min(max)
    }
}

/// Read an image from a typed path. An empty path means no image.
fn read_image(path: &str) -> std::result::Result<Option<ImageFile>, String> {
    let path = path.trim();
    if path.is_empty() {
        return Ok(None);
    }
    ImageFile::from_path(Path::new(path))
        .map(Some)
        .map_err(|e| format!("Could not read image: {}", e))
}

/// Check if a character should be accepted into a field of `max_len` characters
pub fn can_add_char(field: &str, max_len: usize, c: char) -> bool {
    field.chars().count() < max_len && !c.is_control()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use postboard_core::models::{LikeResponse, LikeState, Member};

    fn post(id: i64) -> PostSummary {
        PostSummary {
            id,
            title: format!("post {}", id),
            like_count: 0,
            comment_count: 0,
            view_count: 0,
            created_at: None,
            member_nickname: None,
            member_profile_image_url: None,
        }
    }

    fn comment(id: i64, member_id: i64, content: &str) -> Comment {
        Comment {
            id,
            content: content.to_string(),
            member_id: Some(member_id),
            member_nickname: None,
            member_profile_image_url: None,
            created_at: None,
        }
    }

    fn detail(id: i64, member_id: i64, like_count: u64) -> PostDetail {
        PostDetail {
            id,
            title: "t".to_string(),
            content: "c".to_string(),
            member_id: Some(member_id),
            member_nickname: None,
            member_profile_image_url: None,
            created_at: None,
            image_urls: Vec::new(),
            images: Vec::new(),
            view_count: 0,
            like_count,
            comment_count: 0,
            liked: Some(false),
        }
    }

    fn member(id: i64) -> Member {
        Member {
            member_id: id,
            email: None,
            nickname: None,
            profile_image_url: None,
        }
    }

    /// Put the app on a loaded detail page without any network calls
    fn show_detail(app: &mut App, detail: PostDetail, viewer: i64) {
        app.screen = Screen::Detail;
        app.post_view = Some(PostView::from_detail(&detail, Some(&member(viewer))));
        app.detail = Some(detail);
    }

    #[test]
    fn test_offset_selection() {
        assert_eq!(offset_selection(0, -1, 5), 0);
        assert_eq!(offset_selection(0, 1, 5), 1);
        assert_eq!(offset_selection(3, 10, 5), 4);
        assert_eq!(offset_selection(3, -10, 5), 0);
        assert_eq!(offset_selection(3, 1, 0), 0);
    }

    #[test]
    fn test_can_add_char() {
        assert!(can_add_char("", 3, 'a'));
        assert!(can_add_char("ab", 3, '한'));
        assert!(!can_add_char("abc", 3, 'd'));
        assert!(!can_add_char("", 3, '\n'));
        assert!(!can_add_char("", 3, '\x1b'));
    }

    #[test]
    fn test_form_focus_cycles() {
        assert_eq!(LoginFocus::Signup.next(), LoginFocus::Email);
        assert_eq!(LoginFocus::Email.prev(), LoginFocus::Signup);
        assert_eq!(SignupFocus::Button.next(), SignupFocus::Email);
        assert_eq!(SignupFocus::Image.prev(), SignupFocus::Nickname);
        assert_eq!(ComposeFocus::Title.prev(), ComposeFocus::Button);
        assert_eq!(ComposeFocus::Content.next(), ComposeFocus::Image);
    }

    #[test]
    fn test_missing_image_path_is_reported() {
        assert_eq!(read_image("  ").unwrap(), None);
        let err = read_image("/definitely/not/here.png").unwrap_err();
        assert!(err.starts_with("Could not read image"));
    }

    #[test]
    fn test_feed_updates_append_in_order() {
        let mut app = App::offline();
        app.process_event(UiEvent::Posts(FeedUpdate::Cleared));
        app.process_event(UiEvent::Posts(FeedUpdate::Appended(vec![post(1), post(2)])));
        app.process_event(UiEvent::Posts(FeedUpdate::Appended(vec![post(3)])));

        let ids: Vec<i64> = app.posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(!app.feed_empty);

        app.process_event(UiEvent::Posts(FeedUpdate::Cleared));
        app.process_event(UiEvent::Posts(FeedUpdate::Empty));
        assert!(app.posts.is_empty());
        assert!(app.feed_empty);
    }

    #[test]
    fn test_feed_failure_sets_status() {
        let mut app = App::offline();
        app.process_event(UiEvent::Posts(FeedUpdate::Failed("boom".to_string())));
        assert_eq!(app.feed_error.as_deref(), Some("boom"));
        assert_eq!(app.status_message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_session_expiry_returns_to_login() {
        let mut app = App::offline();
        app.api.tokens().save("stale").unwrap();
        app.process_event(UiEvent::SessionExpired);
        assert_eq!(app.state, AppState::LoggingIn);
        assert!(!app.is_authenticated());
        assert_eq!(app.status_message.as_deref(), Some(SESSION_EXPIRED_MESSAGE));
    }

    #[test]
    fn test_login_failure_keeps_form() {
        let mut app = App::offline();
        app.start_login();
        app.login.submitting = true;
        app.process_event(UiEvent::LoginFailed("Invalid email or password".to_string()));
        assert!(!app.login.submitting);
        assert_eq!(app.login.error.as_deref(), Some("Invalid email or password"));
        assert_eq!(app.state, AppState::LoggingIn);
    }

    #[test]
    fn test_like_applied_updates_view_and_feed() {
        let mut app = App::offline();
        app.posts = vec![post(4)];
        show_detail(&mut app, detail(4, 1, 4), 2);

        app.process_event(UiEvent::LikeApplied(
            4,
            LikeResponse {
                like_count: Some(5),
                liked: None,
            },
        ));
        let view = app.post_view.as_ref().unwrap();
        assert_eq!(view.like_state, LikeState::Liked);
        assert_eq!(view.like_count, 5);
        assert_eq!(app.posts[0].like_count, 5);
    }

    #[test]
    fn test_stale_detail_is_dropped() {
        let mut app = App::offline();
        app.pending_detail = Some(2);
        app.process_event(UiEvent::PostLoaded(Box::new(detail(1, 1, 0)), member(1)));
        assert!(app.detail.is_none());

        app.process_event(UiEvent::PostLoaded(Box::new(detail(2, 1, 0)), member(1)));
        assert_eq!(app.detail.as_ref().map(|d| d.id), Some(2));
        assert!(app.post_view.as_ref().unwrap().can_modify());
    }

    #[test]
    fn test_late_failure_for_other_post_keeps_pending_detail() {
        let mut app = App::offline();
        app.screen = Screen::Detail;
        app.pending_detail = Some(2);

        app.process_event(UiEvent::PostLoadFailed(1, "Post not found".to_string()));
        assert!(app.detail_error.is_none());
        assert_eq!(app.pending_detail, Some(2));

        app.process_event(UiEvent::PostLoaded(Box::new(detail(2, 1, 0)), member(1)));
        assert_eq!(app.detail.as_ref().map(|d| d.id), Some(2));
        assert!(app.detail_error.is_none());
    }

    #[test]
    fn test_post_load_failure_shows_error() {
        let mut app = App::offline();
        app.screen = Screen::Detail;
        app.pending_detail = Some(2);

        app.process_event(UiEvent::PostLoadFailed(2, "Post not found".to_string()));
        assert_eq!(app.detail_error.as_deref(), Some("Post not found"));
        assert!(app.pending_detail.is_none());

        // Unrelated failures leave the detail alone
        app.pending_detail = Some(3);
        app.process_event(UiEvent::ActionFailed("Like failed".to_string()));
        assert_eq!(app.pending_detail, Some(3));
    }

    #[test]
    fn test_comment_count_reaches_feed_row() {
        let mut app = App::offline();
        app.posts = vec![post(1), post(2)];
        show_detail(&mut app, detail(1, 9, 0), 5);

        app.process_event(UiEvent::CommentSaved(1, None));
        app.process_event(UiEvent::CommentSaved(1, None));
        assert_eq!(app.posts[0].comment_count, 2);

        app.process_event(UiEvent::CommentDeleted(1));
        assert_eq!(app.posts[0].comment_count, 1);
        assert_eq!(app.posts[1].comment_count, 0);

        // Edits don't change the count
        app.process_event(UiEvent::CommentSaved(1, Some(10)));
        assert_eq!(app.posts[0].comment_count, 1);
    }

    #[tokio::test]
    async fn test_return_to_feed_reloads_from_first_page() {
        let mut app = App::offline();
        app.posts = (1..=8).map(post).collect();
        app.post_selection = 5;
        show_detail(&mut app, detail(6, 9, 0), 5);

        app.return_to_feed();
        assert_eq!(app.screen, Screen::Feed);
        assert!(app.post_view.is_none());
        assert_eq!(app.post_selection, 0);
    }

    #[tokio::test]
    async fn test_deferred_refresh_is_reissued() {
        let mut app = App::offline();

        // Nothing pending, nothing to do
        app.process_event(UiEvent::LoadFinished {
            feed: FeedKind::Posts,
            refresh_deferred: false,
        });
        assert!(!app.feed_refresh_pending);

        app.feed_refresh_pending = true;
        app.process_event(UiEvent::LoadFinished {
            feed: FeedKind::Posts,
            refresh_deferred: false,
        });
        assert!(!app.feed_refresh_pending);

        // The loader is idle, so a deferred refresh goes out at once
        app.process_event(UiEvent::LoadFinished {
            feed: FeedKind::Posts,
            refresh_deferred: true,
        });
        assert!(!app.feed_refresh_pending);
    }

    #[test]
    fn test_deferred_comment_refresh_ignores_other_posts() {
        let mut app = App::offline();
        app.comments_refresh_pending = true;
        app.process_event(UiEvent::LoadFinished {
            feed: FeedKind::Comments(4),
            refresh_deferred: false,
        });
        // No comment list is open, so nothing is reloaded
        assert!(app.comments_refresh_pending);
    }

    #[test]
    fn test_cancel_comment_edit_restores_text() {
        let mut app = App::offline();
        show_detail(&mut app, detail(1, 9, 0), 5);
        app.comments = vec![comment(10, 5, "original"), comment(11, 6, "theirs")];
        app.detail_focus = DetailFocus::Comments;

        app.start_edit_comment();
        assert_eq!(app.state, AppState::WritingComment);
        assert_eq!(app.comment_input.editing, Some(10));

        app.comment_input.text = "changed".to_string();
        app.sync_comment_edit();
        assert_eq!(app.comments[0].content, "changed");

        app.cancel_comment();
        assert_eq!(app.comments[0].content, "original");
        assert_eq!(app.state, AppState::Normal);
        assert!(!app.post_view.as_ref().unwrap().comment_edits.is_editing(10));
    }

    #[test]
    fn test_only_authors_get_delete_confirmation() {
        let mut app = App::offline();
        show_detail(&mut app, detail(1, 9, 0), 5);
        app.comments = vec![comment(10, 5, "mine"), comment(11, 6, "theirs")];

        app.request_delete();
        assert_eq!(app.state, AppState::Normal);
        assert!(app.status_message.is_some());

        app.detail_focus = DetailFocus::Comments;
        app.request_delete();
        assert_eq!(
            app.state,
            AppState::ConfirmingDelete(DeleteTarget::Comment(1, 10))
        );

        app.state = AppState::Normal;
        app.comment_selection = 1;
        app.request_delete();
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_edit_post_requires_author() {
        let mut app = App::offline();
        show_detail(&mut app, detail(1, 9, 0), 5);
        app.start_edit_post();
        assert_eq!(app.screen, Screen::Detail);

        show_detail(&mut app, detail(1, 5, 0), 5);
        app.start_edit_post();
        assert_eq!(app.screen, Screen::Compose);
        assert_eq!(app.compose.editing, Some(1));
        assert_eq!(app.compose.title, "t");

        app.cancel_compose();
        assert_eq!(app.screen, Screen::Detail);
    }

    #[tokio::test]
    async fn test_logged_out_clears_feed() {
        let mut app = App::offline();
        app.posts = vec![post(1)];
        app.process_event(UiEvent::LoggedOut);
        assert!(app.posts.is_empty());
        assert_eq!(app.state, AppState::LoggingIn);
    }
}
