use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use postboard_core::utils::{format_date, format_date_short, sanitize_text};

use crate::app::{App, DetailFocus};
use crate::ui::styles;

/// Render an open post above its comments
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_post(frame, app, chunks[0]);
    render_comments(frame, app, chunks[1]);
}

fn render_post(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.detail_focus == DetailFocus::Post;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let (Some(detail), Some(view)) = (app.detail.as_ref(), app.post_view.as_ref()) else {
        let message = match app.detail_error {
            Some(ref error) => Line::from(Span::styled(format!(" {}", error), styles::error_style())),
            None => Line::from(Span::styled(" Loading…", styles::muted_style())),
        };
        frame.render_widget(Paragraph::new(message).block(block), area);
        return;
    };

    let liked = view.like_state.is_liked();
    let heart = if liked { "♥" } else { "♡" };

    let mut lines = vec![
        Line::from(Span::styled(detail.title.clone(), styles::title_style())),
        Line::from(vec![
            Span::styled(detail.author_display().to_string(), styles::highlight_style()),
            Span::styled(
                format!("  {}", format_date(detail.created_at.as_deref())),
                styles::muted_style(),
            ),
        ]),
        Line::from(vec![
            Span::styled(format!("{} {}", heart, view.like_count), styles::like_style(liked)),
            Span::styled(
                format!("   {} comments   {} views", view.comment_count, detail.view_count),
                styles::muted_style(),
            ),
        ]),
    ];

    let images = detail.display_image_urls();
    if !images.is_empty() {
        lines.push(Line::from(""));
        for url in images {
            lines.push(Line::from(vec![
                Span::styled("Image: ", styles::muted_style()),
                Span::raw(url.to_string()),
            ]));
        }
    }

    lines.push(Line::from(""));
    for text in sanitize_text(&detail.content).lines() {
        lines.push(Line::from(text.to_string()));
    }

    if view.can_modify() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "[e]dit  [d]elete",
            styles::muted_style(),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_comments(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.detail_focus == DetailFocus::Comments;
    let block = Block::default()
        .title(format!(" Comments ({}) ", app.comments.len()))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if app.comments.is_empty() {
        let message = if app.comments_empty {
            " No comments yet. Press c to write one."
        } else {
            " Loading…"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message, styles::muted_style())).block(block),
            area,
        );
        return;
    }

    let editing = app
        .post_view
        .as_ref()
        .map(|v| &v.comment_edits);

    let mut items: Vec<ListItem> = app
        .comments
        .iter()
        .map(|comment| {
            let mine = app
                .post_view
                .as_ref()
                .map(|v| v.can_modify_comment(comment))
                .unwrap_or(false);
            let mut header = vec![
                Span::styled(comment.author_display().to_string(), styles::highlight_style()),
                Span::styled(
                    format!("  {}", format_date_short(comment.created_at.as_deref())),
                    styles::muted_style(),
                ),
            ];
            if editing.map(|e| e.is_editing(comment.id)).unwrap_or(false) {
                header.push(Span::styled("  (editing)", styles::success_style()));
            } else if mine {
                header.push(Span::styled("  (you)", styles::muted_style()));
            }
            let mut lines = vec![Line::from(header)];
            lines.extend(comment_body(&comment.content));
            ListItem::new(lines)
        })
        .collect();

    if app.comments_loading() {
        items.push(ListItem::new(Span::styled("Loading more…", styles::muted_style())));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(styles::selected_style());

    let mut state = ListState::default();
    if focused {
        state.select(Some(app.comment_selection));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// Comment text as indented lines, one per line of content
fn comment_body(content: &str) -> Vec<Line<'static>> {
    sanitize_text(content)
        .lines()
        .map(|text| Line::from(format!("  {}", text)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_body_keeps_line_breaks() {
        let lines = comment_body("first\nsecond\u{7}\n\nlast");
        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(text, vec!["  first", "  second", "  ", "  last"]);
    }
}
