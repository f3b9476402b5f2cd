use std::collections::HashMap;

use crate::models::CommentId;

/// Comments currently in edit mode, with the text each had before editing.
#[derive(Debug, Clone, Default)]
pub struct CommentEdits {
    originals: HashMap<CommentId, String>,
}

impl CommentEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter edit mode. Returns false if the comment is already being edited;
    /// the first original is kept.
    pub fn begin(&mut self, comment_id: CommentId, original: &str) -> bool {
        if self.originals.contains_key(&comment_id) {
            return false;
        }
        self.originals.insert(comment_id, original.to_string());
        true
    }

    /// Leave edit mode without saving; returns the text to restore
    pub fn cancel(&mut self, comment_id: CommentId) -> Option<String> {
        self.originals.remove(&comment_id)
    }

    /// Leave edit mode after a successful save
    pub fn finish(&mut self, comment_id: CommentId) {
        self.originals.remove(&comment_id);
    }

    pub fn is_editing(&self, comment_id: CommentId) -> bool {
        self.originals.contains_key(&comment_id)
    }

    pub fn original(&self, comment_id: CommentId) -> Option<&str> {
        self.originals.get(&comment_id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    pub fn clear(&mut self) {
        self.originals.clear();
    }
}
