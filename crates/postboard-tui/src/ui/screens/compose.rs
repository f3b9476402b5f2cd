use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use postboard_core::validation::TITLE_MAX_LENGTH;

use crate::app::{App, ComposeFocus};
use crate::ui::styles;

/// Render the post editor
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.compose;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(5),    // Content
            Constraint::Length(3), // Image
            Constraint::Length(2), // Save / error
        ])
        .split(area);

    let cursor = |focus: ComposeFocus| if form.focus == focus { "▌" } else { "" };

    let title_len = form.title.chars().count();
    let count_style = if title_len > TITLE_MAX_LENGTH {
        styles::error_style()
    } else {
        styles::muted_style()
    };
    let title = Paragraph::new(format!("{}{}", form.title, cursor(ComposeFocus::Title))).block(
        Block::default()
            .title(Line::from(vec![
                Span::raw(" Title "),
                Span::styled(format!("{}/{} ", title_len, TITLE_MAX_LENGTH), count_style),
            ]))
            .borders(Borders::ALL)
            .border_style(styles::border_style(form.focus == ComposeFocus::Title)),
    );
    frame.render_widget(title, chunks[0]);

    let content = Paragraph::new(format!("{}{}", form.content, cursor(ComposeFocus::Content)))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(" Content ")
                .borders(Borders::ALL)
                .border_style(styles::border_style(form.focus == ComposeFocus::Content)),
        );
    frame.render_widget(content, chunks[1]);

    let image_title = if form.existing_image_ids.is_empty() {
        " Image path (optional) ".to_string()
    } else {
        format!(
            " Image path (optional, replaces {} attached) ",
            form.existing_image_ids.len()
        )
    };
    let image = Paragraph::new(format!("{}{}", form.image_path, cursor(ComposeFocus::Image))).block(
        Block::default()
            .title(image_title)
            .borders(Borders::ALL)
            .border_style(styles::border_style(form.focus == ComposeFocus::Image)),
    );
    frame.render_widget(image, chunks[2]);

    let button_focused = form.focus == ComposeFocus::Button;
    let label = match (form.submitting, form.editing.is_some()) {
        (true, _) => " Saving… ",
        (false, true) => " Save changes ",
        (false, false) => " Publish ",
    };
    let mut footer = vec![
        Span::raw(" ["),
        Span::styled(label, styles::field_style(button_focused)),
        Span::raw("]  "),
    ];
    match form.error {
        Some(ref error) => footer.push(Span::styled(error.clone(), styles::error_style())),
        None => footer.push(Span::styled("Ctrl+S to save", styles::muted_style())),
    }
    frame.render_widget(Paragraph::new(Line::from(footer)), chunks[3]);
}
