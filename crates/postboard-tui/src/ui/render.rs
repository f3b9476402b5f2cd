use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, DeleteTarget, LoginFocus, Screen, SignupFocus};

use super::screens::{compose, detail, feed};
use super::styles;

/// Visible width of a single-line form field
const FIELD_WIDTH: usize = 24;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::SigningUp => render_signup_overlay(frame, app),
        AppState::WritingComment => render_comment_overlay(frame, app),
        AppState::ConfirmingDelete(target) => render_delete_overlay(frame, target),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.screen {
        Screen::Feed => "  Postboard",
        Screen::Detail => "  Postboard › Post",
        Screen::Compose if app.compose.editing.is_some() => "  Postboard › Edit post",
        Screen::Compose => "  Postboard › New post",
    };
    let help_hint = "[?] Help";
    let title_len = title.chars().count();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title_len as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.screen {
        Screen::Feed => feed::render(frame, app, area),
        Screen::Detail => detail::render(frame, app, area),
        Screen::Compose => compose::render(frame, app, area),
    }
}

fn status_shortcuts(app: &App) -> &'static str {
    match app.screen {
        Screen::Feed => "[n]ew | [r]efresh | [L]ogout | [q]uit",
        Screen::Detail => "[l]ike | [c]omment | [e]dit | [d]elete | Esc back",
        Screen::Compose => "Tab next field | Ctrl+S save | Esc cancel",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = status_shortcuts(app);

    let loading = app.feed_loading() || app.comments_loading();
    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if loading {
        " Loading… ".to_string()
    } else if app.is_authenticated() {
        format!(" {} posts loaded ", app.posts.len())
    } else {
        " Not logged in ".to_string()
    };

    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(key, styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 26, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  Postboard", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("  ↑/↓ j/k   ", "Move selection"),
        help_line("  PgUp/PgDn ", "Move a page"),
        help_line("  Enter     ", "Open post"),
        help_line("  Tab       ", "Switch focus (post ↔ comments)"),
        help_line("  Esc       ", "Go back"),
        Line::from(""),
        Line::from(Span::styled(" Feed", styles::highlight_style())),
        help_line("  r         ", "Refresh from the first page"),
        help_line("  n         ", "Write a new post"),
        help_line("  L         ", "Log out"),
        Line::from(""),
        Line::from(Span::styled(" Post", styles::highlight_style())),
        help_line("  l         ", "Like / unlike"),
        help_line("  c         ", "Write a comment"),
        help_line("  e         ", "Edit post or selected comment"),
        help_line("  d         ", "Delete post or selected comment"),
        Line::from(""),
        help_line("  q         ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

/// The tail of `value` that fits in a field, masked for passwords
fn field_display(value: &str, masked: bool) -> String {
    let count = value.chars().count();
    let shown: String = if masked {
        "*".repeat(count.min(FIELD_WIDTH))
    } else {
        value.chars().skip(count.saturating_sub(FIELD_WIDTH)).collect()
    };
    format!("{:<width$}", shown, width = FIELD_WIDTH)
}

fn field_line(label: &str, value: &str, focused: bool, masked: bool) -> Line<'static> {
    let cursor = if focused { "▌" } else { " " };
    Line::from(vec![
        Span::styled(format!("  {:<10}[", label), styles::muted_style()),
        Span::styled(
            format!("{}{}", field_display(value, masked), cursor),
            styles::field_style(focused),
        ),
        Span::styled("]", styles::muted_style()),
    ])
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    Line::from(vec![
        Span::raw("            ["),
        Span::styled(text, styles::field_style(focused)),
        Span::raw("]"),
    ])
}

fn push_error(lines: &mut Vec<Line<'static>>, error: Option<&str>) {
    if let Some(error) = error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let form = &app.login;
    let height = if form.error.is_some() { 13 } else { 11 };
    let area = centered_rect_fixed(46, height, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("  Log in to Postboard", styles::title_style())),
        Line::from(""),
        field_line("Email:", &form.email, form.focus == LoginFocus::Email, false),
        field_line(
            "Password:",
            &form.password,
            form.focus == LoginFocus::Password,
            true,
        ),
        Line::from(""),
    ];

    let label = if form.submitting { "Logging in…" } else { "Login" };
    lines.push(button_line(label, form.focus == LoginFocus::Button));
    lines.push(button_line("Sign up", form.focus == LoginFocus::Signup));

    push_error(&mut lines, form.error.as_deref());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

fn render_signup_overlay(frame: &mut Frame, app: &App) {
    let form = &app.signup;
    let height = if form.error.is_some() { 15 } else { 13 };
    let area = centered_rect_fixed(46, height, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("  Create an account", styles::title_style())),
        Line::from(""),
        field_line("Email:", &form.email, form.focus == SignupFocus::Email, false),
        field_line(
            "Password:",
            &form.password,
            form.focus == SignupFocus::Password,
            true,
        ),
        field_line(
            "Confirm:",
            &form.confirm,
            form.focus == SignupFocus::Confirm,
            true,
        ),
        field_line(
            "Nickname:",
            &form.nickname,
            form.focus == SignupFocus::Nickname,
            false,
        ),
        field_line(
            "Image:",
            &form.image_path,
            form.focus == SignupFocus::Image,
            false,
        ),
        Line::from(""),
    ];

    let label = if form.submitting { "Signing up…" } else { "Sign up" };
    lines.push(button_line(label, form.focus == SignupFocus::Button));
    lines.push(Line::from(Span::styled(
        "  Image: path to a profile picture. Esc to go back.",
        styles::muted_style(),
    )));

    push_error(&mut lines, form.error.as_deref());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

fn render_comment_overlay(frame: &mut Frame, app: &App) {
    let input = &app.comment_input;
    let area = centered_rect_fixed(60, 10, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let title = if input.editing.is_some() {
        " Edit comment "
    } else {
        " New comment "
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(area);

    let text = Paragraph::new(format!("{}▌", input.text))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(title)
                .title_style(styles::title_style())
                .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
                .border_style(styles::border_style(true)),
        );
    frame.render_widget(text, chunks[0]);

    let footer = match (&input.error, input.submitting) {
        (_, true) => Line::from(Span::styled(" Saving…", styles::muted_style())),
        (Some(error), false) => Line::from(Span::styled(format!(" {}", error), styles::error_style())),
        (None, false) => Line::from(vec![
            Span::styled(" Enter", styles::help_key_style()),
            Span::styled(" save  ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" cancel", styles::muted_style()),
        ]),
    };
    let footer = Paragraph::new(footer).block(
        Block::default()
            .borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(footer, chunks[1]);
}

fn render_delete_overlay(frame: &mut Frame, target: DeleteTarget) {
    let area = centered_rect_fixed(46, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let question = match target {
        DeleteTarget::Post(_) => "   Delete this post?",
        DeleteTarget::Comment(..) => "   Delete this comment?",
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(question, styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to delete, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}
