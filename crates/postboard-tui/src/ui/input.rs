//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Overlays take every key while shown.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{
    can_add_char, App, AppState, ComposeFocus, DetailFocus, LoginFocus, Screen, SignupFocus,
    MAX_COMMENT_LENGTH, PAGE_SCROLL_SIZE,
};

/// Apply a typing key to a text field. Returns true if the key was used.
fn edit_field(field: &mut String, max_len: usize, key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Backspace => {
            field.pop();
            true
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if can_add_char(field, max_len, c) {
                field.push(c);
            }
            true
        }
        _ => false,
    }
}

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    match app.state {
        AppState::LoggingIn => return handle_login_input(app, key),
        AppState::SigningUp => {
            handle_signup_input(app, key);
            return false;
        }
        AppState::WritingComment => {
            handle_comment_input(app, key);
            return false;
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return false;
        }
        AppState::ConfirmingDelete(target) => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.confirm_delete(target);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return false;
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return true;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return false;
        }
        AppState::Quitting => return true,
        AppState::Normal => {}
    }

    // The editor takes letters as text, so it comes before global keys
    if app.screen == Screen::Compose {
        handle_compose_input(app, key);
        return false;
    }

    // Any key dismisses a status message
    app.status_message = None;

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return false;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return false;
        }
        _ => {}
    }

    match app.screen {
        Screen::Feed => handle_feed_input(app, key),
        Screen::Detail => handle_detail_input(app, key),
        Screen::Compose => {}
    }
    false
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> bool {
    let form = &mut app.login;
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return true;
        }
        KeyCode::Down | KeyCode::Tab => form.focus = form.focus.next(),
        KeyCode::Up | KeyCode::BackTab => form.focus = form.focus.prev(),
        KeyCode::Enter => match form.focus {
            LoginFocus::Email => form.focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => app.submit_login(),
            LoginFocus::Signup => app.start_signup(),
        },
        _ => {
            if let Some((field, max_len)) = form.focused_field() {
                if edit_field(field, max_len, &key) {
                    form.error = None;
                }
            }
        }
    }
    false
}

fn handle_signup_input(app: &mut App, key: KeyEvent) {
    let form = &mut app.signup;
    match key.code {
        KeyCode::Esc => app.cancel_signup(),
        KeyCode::Down | KeyCode::Tab => form.focus = form.focus.next(),
        KeyCode::Up | KeyCode::BackTab => form.focus = form.focus.prev(),
        KeyCode::Enter => {
            if form.focus == SignupFocus::Button {
                app.submit_signup();
            } else {
                form.focus = form.focus.next();
            }
        }
        _ => {
            if let Some((field, max_len)) = form.focused_field() {
                edit_field(field, max_len, &key);
            }
        }
    }
}

fn handle_comment_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_comment(),
        KeyCode::Enter => app.submit_comment(),
        _ => {
            if app.comment_input.submitting {
                return;
            }
            if edit_field(&mut app.comment_input.text, MAX_COMMENT_LENGTH, &key) {
                app.comment_input.error = None;
                app.sync_comment_edit();
            }
        }
    }
}

fn handle_compose_input(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
        app.submit_compose();
        return;
    }
    let form = &mut app.compose;
    match key.code {
        KeyCode::Esc => app.cancel_compose(),
        KeyCode::Tab => form.focus = form.focus.next(),
        KeyCode::BackTab => form.focus = form.focus.prev(),
        KeyCode::Enter => match form.focus {
            ComposeFocus::Content => form.content.push('\n'),
            ComposeFocus::Button => app.submit_compose(),
            ComposeFocus::Title | ComposeFocus::Image => form.focus = form.focus.next(),
        },
        _ => {
            if let Some((field, max_len)) = form.focused_field() {
                if edit_field(field, max_len, &key) {
                    form.error = None;
                }
            }
        }
    }
}

fn handle_feed_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.move_post_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_post_selection(-1),
        KeyCode::PageDown => app.move_post_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::PageUp => app.move_post_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::Home => app.post_selection = 0,
        KeyCode::End => app.move_post_selection(isize::MAX),
        KeyCode::Enter => app.open_selected_post(),
        KeyCode::Char('r') => app.refresh_feed(),
        KeyCode::Char('n') => app.start_new_post(),
        KeyCode::Char('L') => app.logout(),
        _ => {}
    }
}

fn handle_detail_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace => app.return_to_feed(),
        KeyCode::Tab | KeyCode::BackTab => {
            app.detail_focus = match app.detail_focus {
                DetailFocus::Post => DetailFocus::Comments,
                DetailFocus::Comments => DetailFocus::Post,
            };
        }
        KeyCode::Char('j') | KeyCode::Down => match app.detail_focus {
            DetailFocus::Post => app.detail_scroll = app.detail_scroll.saturating_add(1),
            DetailFocus::Comments => app.move_comment_selection(1),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.detail_focus {
            DetailFocus::Post => app.detail_scroll = app.detail_scroll.saturating_sub(1),
            DetailFocus::Comments => app.move_comment_selection(-1),
        },
        KeyCode::PageDown => match app.detail_focus {
            DetailFocus::Post => {
                app.detail_scroll = app.detail_scroll.saturating_add(PAGE_SCROLL_SIZE as u16)
            }
            DetailFocus::Comments => app.move_comment_selection(PAGE_SCROLL_SIZE as isize),
        },
        KeyCode::PageUp => match app.detail_focus {
            DetailFocus::Post => {
                app.detail_scroll = app.detail_scroll.saturating_sub(PAGE_SCROLL_SIZE as u16)
            }
            DetailFocus::Comments => app.move_comment_selection(-(PAGE_SCROLL_SIZE as isize)),
        },
        KeyCode::Char('l') => app.toggle_like(),
        KeyCode::Char('c') => app.start_comment(),
        KeyCode::Char('e') => match app.detail_focus {
            DetailFocus::Post => app.start_edit_post(),
            DetailFocus::Comments => app.start_edit_comment(),
        },
        KeyCode::Char('d') => app.request_delete(),
        KeyCode::Char('r') => {
            if let Some(id) = app.detail.as_ref().map(|d| d.id) {
                app.open_post(id);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postboard_core::models::PostSummary;

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn summary(id: i64) -> PostSummary {
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

    #[test]
    fn test_login_form_typing_and_focus() {
        let mut app = App::offline();
        app.start_login();
        assert_eq!(app.login.focus, LoginFocus::Email);

        type_str(&mut app, "me@x.co");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "secretq");
        press(&mut app, KeyCode::Backspace);

        assert_eq!(app.login.email, "me@x.co");
        assert_eq!(app.login.password, "secret");
        assert_eq!(app.state, AppState::LoggingIn);
    }

    #[test]
    fn test_escape_on_login_quits() {
        let mut app = App::offline();
        app.start_login();
        assert!(press(&mut app, KeyCode::Esc));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_quit_needs_confirmation() {
        let mut app = App::offline();
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!press(&mut app, KeyCode::Char('n')));
        assert_eq!(app.state, AppState::Normal);

        press(&mut app, KeyCode::Char('q'));
        assert!(press(&mut app, KeyCode::Char('y')));
    }

    #[test]
    fn test_feed_navigation_clamps() {
        let mut app = App::offline();
        app.posts = (1..=30).map(summary).collect();

        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.post_selection, 0);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.post_selection, 2);
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.post_selection, 12);
        press(&mut app, KeyCode::Home);
        assert_eq!(app.post_selection, 0);
    }

    #[test]
    fn test_editor_takes_letters_as_text() {
        let mut app = App::offline();
        app.start_new_post();

        type_str(&mut app, "quiet?");
        assert_eq!(app.compose.title, "quiet?");
        assert_eq!(app.state, AppState::Normal);

        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "a");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "b");
        assert_eq!(app.compose.content, "a\nb");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Feed);
    }

    #[test]
    fn test_control_chars_are_not_typed() {
        let mut app = App::offline();
        app.start_new_post();
        handle_input(&mut app, KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL));
        assert!(app.compose.title.is_empty());
    }

    #[test]
    fn test_signup_escape_returns_to_login() {
        let mut app = App::offline();
        app.login.email = "me@x.co".to_string();
        app.start_signup();
        assert_eq!(app.signup.email, "me@x.co");

        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "pw");
        assert_eq!(app.signup.password, "pw");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::LoggingIn);
        assert!(app.signup.password.is_empty());
    }

    #[tokio::test]
    async fn test_escape_from_detail_reloads_feed() {
        let mut app = App::offline();
        app.posts = (1..=10).map(summary).collect();
        app.post_selection = 6;
        app.open_post(7);
        assert_eq!(app.screen, Screen::Detail);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Feed);
        assert_eq!(app.post_selection, 0);
        assert!(app.comments.is_empty());
    }
}
