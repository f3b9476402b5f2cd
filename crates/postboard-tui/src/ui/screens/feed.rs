use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use postboard_core::utils::{format_date_short, truncate_string};

use crate::app::App;
use crate::ui::styles;

/// Longest title shown in the feed table
const TITLE_DISPLAY_WIDTH: usize = 40;

/// Render the post feed as a table, newest first
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" Posts ({}) ", app.posts.len()))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if app.posts.is_empty() {
        let message = if let Some(ref error) = app.feed_error {
            Line::from(Span::styled(format!(" {}", error), styles::error_style()))
        } else if app.feed_empty {
            Line::from(Span::styled(
                " No posts yet. Press n to write the first one.",
                styles::muted_style(),
            ))
        } else {
            Line::from(Span::styled(" Loading…", styles::muted_style()))
        };
        frame.render_widget(Paragraph::new(message).block(block), area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Title"),
        Cell::from("Author"),
        Cell::from("♥"),
        Cell::from("Comments"),
        Cell::from("Views"),
        Cell::from("Posted"),
    ])
    .style(styles::title_style())
    .height(1);

    let mut rows: Vec<Row> = app
        .posts
        .iter()
        .enumerate()
        .map(|(i, post)| {
            let style = if i == app.post_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(truncate_string(&post.title, TITLE_DISPLAY_WIDTH)),
                Cell::from(post.author_display().to_string()),
                Cell::from(format!("{:>4}", post.like_count)),
                Cell::from(format!("{:>8}", post.comment_count)),
                Cell::from(format!("{:>5}", post.view_count)),
                Cell::from(format_date_short(post.created_at.as_deref())),
            ])
            .style(style)
        })
        .collect();

    if app.feed_loading() {
        rows.push(Row::new(vec![Cell::from(Span::styled("Loading more…", styles::muted_style()))]));
    } else if app.feed_exhausted() {
        rows.push(Row::new(vec![Cell::from(Span::styled("End of feed", styles::muted_style()))]));
    }

    let widths = [
        Constraint::Fill(3),    // Title
        Constraint::Fill(1),    // Author
        Constraint::Length(4),  // Likes
        Constraint::Length(8),  // Comments
        Constraint::Length(5),  // Views
        Constraint::Length(16), // Posted
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.post_selection));

    frame.render_stateful_widget(table, area, &mut state);
}
