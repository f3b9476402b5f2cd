//! Cursor-paginated list loading.
//!
//! A `FeedLoader` drives one list (the post feed, or the comments under a
//! post) page by page. It allows a single page request in flight at a time
//! and stops issuing requests once the server reports there is nothing more.

pub mod cursor;
pub mod loader;
pub mod sources;

pub use cursor::FeedCursor;
pub use loader::{FeedLoader, FeedRenderer, LoadOutcome, LoaderState, PageSource};
pub use sources::{CommentFeed, PostFeed};
