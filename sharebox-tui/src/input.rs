//! Keyboard input handling, per screen

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use sharebox_core::Route;

use crate::app::{App, AppResult, InputMode, Section};

/// Handle a key event
pub fn handle_key(app: &mut App, key: KeyEvent) -> AppResult {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return AppResult::Quit;
    }

    // Notices last until the next key
    app.notice = None;

    match app.input_mode.clone() {
        InputMode::AddPath(_) => handle_path_mode(app, key),
        InputMode::Confirm(action) => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm(action),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.input_mode = InputMode::Normal;
                }
                _ => {}
            }
            AppResult::Continue
        }
        InputMode::Normal => match app.route().clone() {
            Route::Login => handle_login(app, key),
            Route::Register => handle_register(app, key),
            Route::Dashboard => handle_dashboard(app, key),
            Route::Share => handle_share_list(app, key),
            Route::FileShare(_) => handle_file_share(app, key),
            Route::View { .. } => handle_viewer(app, key),
        },
    }
}

/// Movement keys shared by the list screens
fn movement(app: &App, key: &KeyEvent) -> Option<i8> {
    match key.code {
        KeyCode::Down => Some(1),
        KeyCode::Up => Some(-1),
        KeyCode::Char('j') if app.config.client.vim_mode => Some(1),
        KeyCode::Char('k') if app.config.client.vim_mode => Some(-1),
        _ => None,
    }
}

fn handle_login(app: &mut App, key: KeyEvent) -> AppResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return AppResult::Quit,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => app.login.next_field(),
        KeyCode::Enter => app.submit_login(),
        KeyCode::Backspace => app.login.pop_char(),
        // Link to the register page
        KeyCode::Char('r') if ctrl => app.navigate(Route::Register),
        KeyCode::Char('s') if ctrl => app.login.toggle_password(),
        KeyCode::Char(c) if !ctrl => app.login.push_char(c),
        _ => {}
    }
    AppResult::Continue
}

fn handle_register(app: &mut App, key: KeyEvent) -> AppResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.navigate(Route::Login),
        KeyCode::Tab | KeyCode::Down => app.register.next_field(),
        KeyCode::BackTab | KeyCode::Up => {
            // Two steps forward is one step back over three fields
            app.register.next_field();
            app.register.next_field();
        }
        KeyCode::Enter => app.submit_register(),
        KeyCode::Backspace => app.register.pop_char(),
        KeyCode::Char('l') if ctrl => app.navigate(Route::Login),
        KeyCode::Char('s') if ctrl => app.register.toggle_password(),
        KeyCode::Char(c) if !ctrl => app.register.push_char(c),
        _ => {}
    }
    AppResult::Continue
}

fn handle_dashboard(app: &mut App, key: KeyEvent) -> AppResult {
    match key.code {
        KeyCode::Char('q') => return AppResult::Quit,
        KeyCode::Char('1') => app.select_section(Section::Upload),
        KeyCode::Char('2') => app.select_section(Section::MyFiles),
        KeyCode::Tab => {
            let next = match app.section {
                Section::Upload => Section::MyFiles,
                Section::MyFiles => Section::Upload,
            };
            app.select_section(next);
        }
        KeyCode::Char('L') => app.logout(),
        KeyCode::Char('l') => app.navigate(Route::Share),
        _ => match app.section {
            Section::Upload => handle_upload_section(app, key),
            Section::MyFiles => handle_files_section(app, key),
        },
    }
    AppResult::Continue
}

fn handle_upload_section(app: &mut App, key: KeyEvent) {
    if let Some(step) = movement(app, &key) {
        if step > 0 {
            app.upload.cursor_down();
        } else {
            app.upload.cursor_up();
        }
        return;
    }

    match key.code {
        KeyCode::Char('a') => app.input_mode = InputMode::AddPath(String::new()),
        KeyCode::Char('x') | KeyCode::Delete => app.upload.remove_current(),
        KeyCode::Char('u') | KeyCode::Enter => app.start_upload(),
        _ => {}
    }
}

fn handle_files_section(app: &mut App, key: KeyEvent) {
    if let Some(step) = movement(app, &key) {
        if step > 0 {
            app.files.cursor_down();
        } else {
            app.files.cursor_up();
        }
        return;
    }

    match key.code {
        KeyCode::Char(' ') => {
            app.files.toggle_current();
            app.files.cursor_down();
        }
        KeyCode::Char('a') => app.files.toggle_all(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('o') | KeyCode::Enter => app.open_current_file(),
        KeyCode::Char('s') => app.share_current_file(),
        KeyCode::Char('r') => app.load_files(),
        KeyCode::Esc => app.files.clear_selection(),
        _ => {}
    }
}

fn handle_share_list(app: &mut App, key: KeyEvent) -> AppResult {
    if let Some(step) = movement(app, &key) {
        if step > 0 {
            app.shares.cursor_down();
        } else {
            app.shares.cursor_up();
        }
        return AppResult::Continue;
    }

    match key.code {
        KeyCode::Char('q') => return AppResult::Quit,
        KeyCode::Char(' ') => {
            app.shares.toggle_current();
            app.shares.cursor_down();
        }
        KeyCode::Char('a') => app.shares.toggle_all(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_revoke(),
        KeyCode::Char('o') | KeyCode::Enter => app.open_current_share(),
        KeyCode::Char('y') => app.copy_current_share_link(),
        KeyCode::Char('r') => app.load_shares(),
        KeyCode::Char('L') => app.logout(),
        KeyCode::Char('b') | KeyCode::Esc => app.back(),
        _ => {}
    }
    AppResult::Continue
}

fn handle_file_share(app: &mut App, key: KeyEvent) -> AppResult {
    match key.code {
        KeyCode::Char('e') | KeyCode::Tab => {
            if let Some(view) = app.file_share.as_mut() {
                view.cycle_duration();
            }
        }
        KeyCode::Char('g') | KeyCode::Enter => app.generate_share_link(),
        KeyCode::Char('y') => app.copy_generated_link(),
        KeyCode::Char('b') | KeyCode::Esc => app.back(),
        _ => {}
    }
    AppResult::Continue
}

fn handle_viewer(app: &mut App, key: KeyEvent) -> AppResult {
    match key.code {
        KeyCode::Char('q') => return AppResult::Quit,
        KeyCode::Char('w') => app.download_viewed_file(),
        KeyCode::Char('y') => app.copy_viewed_url(),
        KeyCode::Char('b') | KeyCode::Esc => app.back(),
        _ => {}
    }
    AppResult::Continue
}

/// Typing a local path for the upload queue
fn handle_path_mode(app: &mut App, key: KeyEvent) -> AppResult {
    let InputMode::AddPath(ref mut buffer) = app.input_mode else {
        return AppResult::Continue;
    };

    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => {
            let path = std::mem::take(buffer);
            app.input_mode = InputMode::Normal;
            app.add_upload_path(&path);
        }
        KeyCode::Backspace => {
            buffer.pop();
        }
        KeyCode::Char(c) => buffer.push(c),
        _ => {}
    }
    AppResult::Continue
}
