//! Messages from background tasks back to the UI loop.
//!
//! Every network call runs on a spawned task and reports through an
//! unbounded channel that the main loop drains between frames.

use tokio::sync::mpsc;
use tracing::debug;

use postboard_core::api::ApiError;
use postboard_core::feed::{FeedRenderer, LoadOutcome};
use postboard_core::models::{Comment, CommentId, LikeResponse, Member, PostDetail, PostId, PostSummary};

/// One render instruction from a feed loader.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate<T> {
    Cleared,
    Appended(Vec<T>),
    Empty,
    Failed(String),
    SessionExpired,
}

/// Which list a background load belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Posts,
    Comments(PostId),
}

/// Result types from background tasks.
#[derive(Debug)]
pub enum UiEvent {
    Posts(FeedUpdate<PostSummary>),
    /// Comments for the given post
    Comments(PostId, FeedUpdate<Comment>),
    PostLoaded(Box<PostDetail>, Member),
    /// Loading the given post failed
    PostLoadFailed(PostId, String),
    /// A feed load returned. `refresh_deferred` is set when a refresh
    /// found another load in flight and must be issued again.
    LoadFinished {
        feed: FeedKind,
        refresh_deferred: bool,
    },
    LoggedIn,
    LoginFailed(String),
    SignedUp,
    SignupFailed(String),
    LoggedOut,
    PostSaved(Option<PostId>),
    PostSaveFailed(String),
    PostDeleted(PostId),
    LikeApplied(PostId, LikeResponse),
    /// A comment was created (None) or the given comment was updated
    CommentSaved(PostId, Option<CommentId>),
    CommentDeleted(PostId),
    ActionFailed(String),
    SessionExpired,
}

impl UiEvent {
    /// Map a failed action, sending expired sessions back to the login form
    pub fn failure(error: &ApiError) -> Self {
        match error {
            ApiError::Unauthorized => UiEvent::SessionExpired,
            other => UiEvent::ActionFailed(other.user_message()),
        }
    }

    /// Map a failed post load to the post it was for
    pub fn post_load_failure(post_id: PostId, error: &ApiError) -> Self {
        match error {
            ApiError::Unauthorized => UiEvent::SessionExpired,
            other => UiEvent::PostLoadFailed(post_id, other.user_message()),
        }
    }

    /// Report a finished load. A page load that lost the race to another
    /// one needs no follow-up, so nothing is reported.
    pub fn load_finished(feed: FeedKind, initial: bool, outcome: &LoadOutcome) -> Option<Self> {
        match outcome {
            LoadOutcome::Busy if !initial => None,
            outcome => Some(UiEvent::LoadFinished {
                feed,
                refresh_deferred: matches!(outcome, LoadOutcome::Busy),
            }),
        }
    }
}

/// Feed renderer that forwards every call to the UI loop.
pub struct ChannelRenderer<T> {
    tx: mpsc::UnboundedSender<UiEvent>,
    wrap: Box<dyn Fn(FeedUpdate<T>) -> UiEvent + Send>,
}

impl<T> ChannelRenderer<T> {
    pub fn new(
        tx: mpsc::UnboundedSender<UiEvent>,
        wrap: impl Fn(FeedUpdate<T>) -> UiEvent + Send + 'static,
    ) -> Self {
        Self {
            tx,
            wrap: Box::new(wrap),
        }
    }

    fn send(&self, update: FeedUpdate<T>) {
        if self.tx.send((self.wrap)(update)).is_err() {
            debug!("UI loop gone, dropping feed update");
        }
    }
}

impl<T: Clone> FeedRenderer<T> for ChannelRenderer<T> {
    fn clear(&mut self) {
        self.send(FeedUpdate::Cleared);
    }

    fn append(&mut self, items: &[T]) {
        self.send(FeedUpdate::Appended(items.to_vec()));
    }

    fn show_empty(&mut self) {
        self.send(FeedUpdate::Empty);
    }

    fn show_error(&mut self, error: &ApiError) {
        let update = match error {
            ApiError::Unauthorized => FeedUpdate::SessionExpired,
            other => FeedUpdate::Failed(other.user_message()),
        };
        self.send(update);
    }
}
