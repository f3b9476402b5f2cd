//! Per-page state owned by the presentation layer.
//!
//! A detail page keeps one `PostView`: who is looking, who wrote the post,
//! the like state the viewer believes in, and which comments are being
//! edited. Nothing here talks to the network.

pub mod comments;
pub mod post;

pub use comments::CommentEdits;
pub use post::PostView;
