use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, FormField, InputLine, InputMode, Screen};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.on_tick(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            if let Some(screen) = Screen::from_shortcut(c) {
                app.switch_screen(screen);
            }
            return;
        }
        _ => {}
    }

    match app.screen {
        Screen::Welcome => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char('i')) {
                app.input_mode = InputMode::Editing;
            }
        }
        Screen::Dashboard => handle_dashboard(app, key),
        Screen::Videos => handle_videos(app, key),
        Screen::VideoPlayer => handle_video_player(app, key),
        Screen::Schedule => handle_schedule(app, key),
        Screen::Progress => handle_progress(app, key),
        Screen::Chat => handle_chat_normal(app, key),
        Screen::Settings => handle_settings(app, key),
    }
}

fn handle_dashboard(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.activate_selected_subject(),
        KeyCode::Char('a') => app.open_chat(None),
        _ => {}
    }
}

fn handle_videos(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.open_selected_video(),
        KeyCode::Char('f') => app.cycle_video_filter(),
        KeyCode::Char('a') => app.open_chat(None),
        KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => app.switch_screen(Screen::Dashboard),
        _ => {}
    }
}

fn handle_video_player(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('a') => app.ask_about_current_video(),
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => {
            app.switch_screen(Screen::Videos)
        }
        _ => {}
    }
}

fn handle_schedule(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.shift_schedule_day(-1),
        KeyCode::Char('l') | KeyCode::Right => app.shift_schedule_day(1),
        KeyCode::Char('H') => app.shift_schedule_day(-7),
        KeyCode::Char('L') => app.shift_schedule_day(7),
        KeyCode::Char('t') => app.schedule_date = app.today,
        KeyCode::Esc => app.switch_screen(Screen::Dashboard),
        _ => {}
    }
}

fn handle_progress(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Char('l') | KeyCode::Right => app.progress_tab = app.progress_tab.next(),
        KeyCode::BackTab | KeyCode::Char('h') | KeyCode::Left => app.progress_tab = app.progress_tab.prev(),
        KeyCode::Esc => app.switch_screen(Screen::Dashboard),
        _ => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    let page = (app.chat_height / 2).max(1);
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => app.scroll_chat_down(page),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.scroll_chat_up(page),
        KeyCode::PageDown => app.scroll_chat_down(page),
        KeyCode::PageUp => app.scroll_chat_up(page),
        KeyCode::Char('G') => app.chat_follow = true,
        KeyCode::Esc => app.switch_screen(Screen::Dashboard),
        _ => {}
    }
}

fn handle_settings(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Enter | KeyCode::Char(' ') => app.activate_settings_item(),
        KeyCode::Char('e') => app.begin_edit_profile(),
        KeyCode::Esc => app.switch_screen(Screen::Dashboard),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match app.screen {
        Screen::Welcome | Screen::Settings => handle_form_editing(app, key),
        Screen::Chat => handle_chat_editing(app, key),
        _ => {
            if key.code == KeyCode::Esc {
                app.input_mode = InputMode::Normal;
            }
        }
    }
}

/// Shared line-editing keys. Returns false for keys it does not handle.
fn edit_line(line: &mut InputLine, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Backspace => line.backspace(),
        KeyCode::Delete => line.delete(),
        KeyCode::Left => line.left(),
        KeyCode::Right => line.right(),
        KeyCode::Home => line.home(),
        KeyCode::End => line.end(),
        KeyCode::Char(c) => line.insert(c),
        _ => return false,
    }
    true
}

fn handle_form_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            // Onboarding has nowhere to go back to
            if app.screen == Screen::Settings {
                app.cancel_edit_profile();
            }
        }
        KeyCode::Enter => app.submit_profile(),
        KeyCode::Tab | KeyCode::Down => app.form.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.form.prev_field(),
        _ if app.form.field == FormField::Name => {
            edit_line(&mut app.form.name, key);
        }
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-') => app.form.step(false),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') | KeyCode::Char(' ') => {
            app.form.step(true)
        }
        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    let page = (app.chat_height / 2).max(1);
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.send_chat(),
        KeyCode::PageDown => app.scroll_chat_down(page),
        KeyCode::PageUp => app.scroll_chat_up(page),
        _ => {
            edit_line(&mut app.chat_input, key);
        }
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.nav_down(),
        MouseEventKind::ScrollUp => app.nav_up(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use skillmorphix_core::config::Config;
    use std::time::Duration;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c))).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_while_editing() {
        let (mut app, _, _dir) = test_app(false);
        assert_eq!(app.input_mode, InputMode::Editing);
        let ctrl_c = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        handle_event(&mut app, ctrl_c).await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_q_types_into_name_field() {
        let (mut app, _, _dir) = test_app(false);
        type_text(&mut app, "Quinn q").await;
        assert!(!app.should_quit);
        assert_eq!(app.form.name.value, "Quinn q");
    }

    #[tokio::test]
    async fn test_onboarding_by_keyboard() {
        let (mut app, _, dir) = test_app(false);
        type_text(&mut app, "Noor").await;
        handle_event(&mut app, key(KeyCode::Tab)).await.unwrap();
        for _ in 0..3 {
            handle_event(&mut app, key(KeyCode::Right)).await.unwrap();
        }
        handle_event(&mut app, key(KeyCode::Tab)).await.unwrap();
        handle_event(&mut app, key(KeyCode::Left)).await.unwrap();
        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();

        assert_eq!(app.screen, Screen::Dashboard);
        let profile = Config::load_from(&dir.path().join("config.json"))
            .unwrap()
            .profile
            .unwrap();
        assert_eq!(profile.name, "Noor");
        assert_eq!(profile.grade.value(), 4);
        assert_eq!(profile.summary(), "Grade 4 • Portuguese");
    }

    #[tokio::test]
    async fn test_number_keys_switch_screens() {
        let (mut app, _, _dir) = test_app(true);
        handle_event(&mut app, key(KeyCode::Char('4'))).await.unwrap();
        assert_eq!(app.screen, Screen::Progress);
        handle_event(&mut app, key(KeyCode::Char('3'))).await.unwrap();
        assert_eq!(app.screen, Screen::Schedule);
        handle_event(&mut app, key(KeyCode::Char('9'))).await.unwrap();
        assert_eq!(app.screen, Screen::Schedule);
        handle_event(&mut app, key(KeyCode::Char('q'))).await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_chat_conversation_by_keyboard() {
        let (mut app, clock, _dir) = test_app(true);
        handle_event(&mut app, key(KeyCode::Char('5'))).await.unwrap();
        assert_eq!(app.screen, Screen::Chat);
        assert_eq!(app.input_mode, InputMode::Editing);

        // digits and q are text while editing
        type_text(&mut app, "q5 algebra").await;
        assert_eq!(app.screen, Screen::Chat);
        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();

        clock.advance(Duration::from_millis(1000));
        handle_event(&mut app, AppEvent::Tick).await.unwrap();

        let conversation = app.conversation.as_ref().unwrap();
        assert!(conversation.is_math_focused());
        assert!(conversation
            .messages()
            .last()
            .unwrap()
            .content
            .starts_with("Algebra uses symbols"));

        handle_event(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.input_mode, InputMode::Normal);
        handle_event(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.screen, Screen::Dashboard);
        assert!(app.conversation.is_none());
    }

    #[tokio::test]
    async fn test_settings_escape_cancels_edit() {
        let (mut app, _, _dir) = test_app(true);
        handle_event(&mut app, key(KeyCode::Char('6'))).await.unwrap();
        handle_event(&mut app, key(KeyCode::Char('e'))).await.unwrap();
        assert_eq!(app.input_mode, InputMode::Editing);
        type_text(&mut app, "xyz").await;
        handle_event(&mut app, key(KeyCode::Esc)).await.unwrap();

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.form.name.value, "Ada");
        assert_eq!(app.profile().unwrap().name, "Ada");
    }

    #[tokio::test]
    async fn test_progress_tabs_by_keyboard() {
        let (mut app, _, _dir) = test_app(true);
        handle_event(&mut app, key(KeyCode::Char('4'))).await.unwrap();
        handle_event(&mut app, key(KeyCode::Tab)).await.unwrap();
        handle_event(&mut app, key(KeyCode::Tab)).await.unwrap();
        assert_eq!(app.progress_tab, crate::app::ProgressTab::Achievements);
        handle_event(&mut app, key(KeyCode::BackTab)).await.unwrap();
        assert_eq!(app.progress_tab, crate::app::ProgressTab::Skills);
    }

    #[tokio::test]
    async fn test_ask_ai_key_from_player() {
        let (mut app, _, _dir) = test_app(true);
        handle_event(&mut app, key(KeyCode::Char('2'))).await.unwrap();
        assert_eq!(app.screen, Screen::Videos);
        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.screen, Screen::VideoPlayer);

        handle_event(&mut app, key(KeyCode::Char('a'))).await.unwrap();
        assert_eq!(app.screen, Screen::Chat);
        let conversation = app.conversation.as_ref().unwrap();
        assert_eq!(conversation.title(), "Mathematics Tutor");
        assert_eq!(
            conversation.messages()[0].content,
            skillmorphix_core::conversation::MATH_WELCOME
        );
    }
}
