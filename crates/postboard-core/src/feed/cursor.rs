use crate::config::DEFAULT_PAGE_SIZE;
use crate::models::Cursor;

/// Position within a paginated list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedCursor {
    cursor: Option<Cursor>,
    has_more: bool,
    page_size: u32,
}

impl FeedCursor {
    pub fn new(page_size: u32) -> Self {
        Self {
            cursor: None,
            has_more: true,
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    /// Back to the first page
    pub fn reset(&mut self) {
        self.cursor = None;
        self.has_more = true;
    }

    /// Replace the position with what the last page reported
    pub fn advance(&mut self, has_next: bool, next_cursor: Option<Cursor>) {
        self.has_more = has_next;
        self.cursor = next_cursor;
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn is_exhausted(&self) -> bool {
        !self.has_more
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_cursor_starts_at_first_page() {
        let cursor = FeedCursor::new(20);
        assert_eq!(cursor.cursor(), None);
        assert!(!cursor.is_exhausted());
        assert_eq!(cursor.page_size(), 20);
    }

    #[test]
    fn test_advance_and_reset() {
        let mut cursor = FeedCursor::new(0);
        assert_eq!(cursor.page_size(), DEFAULT_PAGE_SIZE);

        cursor.advance(false, Some(Cursor::new("c9")));
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.cursor(), Some(&Cursor::new("c9")));

        cursor.reset();
        assert!(!cursor.is_exhausted());
        assert_eq!(cursor.cursor(), None);
    }
}
