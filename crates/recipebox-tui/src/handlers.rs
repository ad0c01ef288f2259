//! Keyboard event handling.

use crate::app::{filter_entries, App, AppState, HomeFocus, Overlay, Screen};
use crate::forms::{EditorFocus, SignInStep, SignUpStep, TextField};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use recipebox_core::Direction;

/// Handle a key event. Returns true if the app should quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return true;
    }

    // Ctrl+P opens quick find
    if key.code == KeyCode::Char('p') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.open_quick_find();
        return false;
    }

    if app.overlay.is_some() {
        handle_overlay_key(app, key);
        return false;
    }

    if !app.is_typing() && handle_global_key(app, key) {
        return app.state == AppState::Quit;
    }

    match app.screen {
        Screen::Home => handle_home_key(app, key),
        Screen::RecipeDetail(_) => handle_detail_key(app, key),
        Screen::MyRecipes => handle_my_recipes_key(app, key),
        Screen::Editor => handle_editor_key(app, key),
        Screen::Albums => handle_albums_key(app, key),
        Screen::AlbumDetail(_) => handle_album_detail_key(app, key),
        Screen::Profile => handle_profile_key(app, key),
        Screen::SignIn => handle_sign_in_key(app, key),
        Screen::SignUp => handle_sign_up_key(app, key),
        Screen::Perks => {
            if key.code == KeyCode::Esc {
                app.back();
            }
        }
    }
    false
}

/// Screen switching. Returns true when the key was consumed.
fn handle_global_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('1') => app.navigate(Screen::Home),
        KeyCode::Char('2') => app.navigate(Screen::MyRecipes),
        KeyCode::Char('3') => app.navigate(Screen::Albums),
        KeyCode::Char('4') => app.navigate(Screen::Profile),
        KeyCode::Char('5') => app.navigate(Screen::Perks),
        KeyCode::Char('n') => app.new_recipe(),
        KeyCode::Char('i') if !app.session.is_signed_in() => app.navigate(Screen::SignIn),
        KeyCode::Char('u') if !app.session.is_signed_in() => app.navigate(Screen::SignUp),
        _ => return false,
    }
    true
}

fn edit_text(field: &mut TextField, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char(c) => field.push(c),
        KeyCode::Backspace => field.pop(),
        _ => return false,
    }
    true
}

fn handle_overlay_key(app: &mut App, key: KeyEvent) {
    let Some(overlay) = &mut app.overlay else {
        return;
    };

    match overlay {
        Overlay::Notice { .. } => app.dismiss_overlay(),
        Overlay::Confirm { .. } => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => app.confirm(),
            KeyCode::Char('n') | KeyCode::Esc => app.dismiss_overlay(),
            _ => {}
        },
        Overlay::AlbumPicker(picker) => {
            if let Some(name) = &mut picker.new_album {
                match key.code {
                    KeyCode::Esc => picker.new_album = None,
                    KeyCode::Enter => app.picker_choose(),
                    _ => {
                        edit_text(name, key);
                    }
                }
                return;
            }
            let rows = app.albums.albums().len() + 1;
            match key.code {
                KeyCode::Esc => app.dismiss_overlay(),
                KeyCode::Up | KeyCode::Char('k') => picker.cursor.up(),
                KeyCode::Down | KeyCode::Char('j') => picker.cursor.down(rows),
                KeyCode::Enter => app.picker_choose(),
                _ => {}
            }
        }
        Overlay::AlbumCreate(form) => match key.code {
            KeyCode::Esc => app.dismiss_overlay(),
            KeyCode::Enter => app.submit_album_create(),
            KeyCode::Left => form.cycle_color(-1),
            KeyCode::Right => form.cycle_color(1),
            _ => {
                edit_text(&mut form.name, key);
            }
        },
        Overlay::QuickFind(find) => match key.code {
            KeyCode::Esc => app.dismiss_overlay(),
            KeyCode::Enter => app.select_quick_find(),
            KeyCode::Up => find.cursor.up(),
            KeyCode::Down => {
                let len = find.results.len();
                find.cursor.down(len);
            }
            _ => {
                if edit_text(&mut find.query, key) {
                    app.update_quick_find();
                }
            }
        },
    }
}

fn handle_home_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Tab {
        app.home.focus = app.home.focus.next();
        return;
    }

    match app.home.focus {
        HomeFocus::Carousel => match key.code {
            KeyCode::Left | KeyCode::Char('h') => app.carousel_arrow(Direction::Left),
            KeyCode::Right | KeyCode::Char('l') => app.carousel_arrow(Direction::Right),
            KeyCode::Up | KeyCode::Down | KeyCode::Char('k') | KeyCode::Char('j') => {
                app.switch_lane()
            }
            KeyCode::Enter => {
                if let Some(id) = app.carousel_front(app.home.lane).map(|r| r.id.clone()) {
                    app.open_recipe(&id);
                }
            }
            KeyCode::Char('/') => app.home.focus = HomeFocus::Search,
            _ => {}
        },
        HomeFocus::Search => match key.code {
            KeyCode::Enter => {
                app.run_search();
                app.home.focus = HomeFocus::Results;
            }
            KeyCode::Esc => app.home.focus = HomeFocus::Carousel,
            _ => {
                edit_text(&mut app.home.query, key);
            }
        },
        HomeFocus::Filters => {
            let count = filter_entries().len();
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    app.home.filter_cursor = app.home.filter_cursor.saturating_sub(1)
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if app.home.filter_cursor + 1 < count {
                        app.home.filter_cursor += 1;
                    }
                }
                KeyCode::Char(' ') | KeyCode::Enter => app.toggle_filter_at_cursor(),
                KeyCode::Char('c') => app.clear_filters(),
                KeyCode::Esc => app.home.focus = HomeFocus::Carousel,
                _ => {}
            }
        }
        HomeFocus::Results => {
            let len = app.home_results().len();
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => app.home.results.up(),
                KeyCode::Down | KeyCode::Char('j') => app.home.results.down(len),
                KeyCode::Enter => {
                    if let Some(id) = app
                        .home_results()
                        .get(app.home.results.selected)
                        .map(|r| r.id.clone())
                    {
                        app.open_recipe(&id);
                    }
                }
                KeyCode::Esc => app.home.focus = HomeFocus::Carousel,
                _ => {}
            }
        }
    }
}

fn handle_detail_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.back(),
        KeyCode::Char('s') => app.request_save(),
        KeyCode::Char('e') => app.edit_current_recipe(),
        KeyCode::Char('d') => app.request_delete_recipe(),
        _ => {}
    }
}

fn handle_my_recipes_key(app: &mut App, key: KeyEvent) {
    let len = app.my_recipes.len();
    match key.code {
        KeyCode::Esc => app.back(),
        KeyCode::Up | KeyCode::Char('k') => app.my_recipes_cursor.up(),
        KeyCode::Down | KeyCode::Char('j') => app.my_recipes_cursor.down(len),
        KeyCode::Enter => {
            if let Some(id) = app
                .my_recipes
                .get(app.my_recipes_cursor.selected)
                .map(|r| r.id.clone())
            {
                app.open_recipe(&id);
            }
        }
        _ => {}
    }
}

fn handle_editor_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.submit_recipe();
        return;
    }

    let editor = &mut app.editor;
    match key.code {
        KeyCode::Esc => {
            app.back();
            return;
        }
        KeyCode::Tab | KeyCode::Down => {
            editor.focus = editor.focus.next();
            return;
        }
        KeyCode::BackTab | KeyCode::Up => {
            editor.focus = editor.focus.prev();
            return;
        }
        _ => {}
    }

    match editor.focus {
        EditorFocus::Tags => match key.code {
            KeyCode::Left => editor.move_tag_cursor(-1),
            KeyCode::Right => editor.move_tag_cursor(1),
            KeyCode::Char(' ') | KeyCode::Enter => editor.toggle_tag_at_cursor(),
            _ => {}
        },
        EditorFocus::Steps => match key.code {
            KeyCode::Enter => editor.add_step(),
            KeyCode::Delete => editor.remove_last_step(),
            _ => {
                edit_text(&mut editor.step_input, key);
            }
        },
        _ => {
            if let Some(field) = editor.focused_field() {
                edit_text(field, key);
            }
        }
    }
}

fn handle_albums_key(app: &mut App, key: KeyEvent) {
    let len = app.albums.albums().len();
    match key.code {
        KeyCode::Esc => app.back(),
        KeyCode::Up | KeyCode::Char('k') => app.albums_cursor.up(),
        KeyCode::Down | KeyCode::Char('j') => app.albums_cursor.down(len),
        KeyCode::Enter => app.open_selected_album(),
        KeyCode::Char('c') => app.open_album_create(),
        KeyCode::Char('d') => app.request_delete_album(),
        _ => {}
    }
}

fn handle_album_detail_key(app: &mut App, key: KeyEvent) {
    let len = app
        .album_detail
        .as_ref()
        .map_or(0, |a| a.resolved_recipes().count());
    match key.code {
        KeyCode::Esc => app.back(),
        KeyCode::Up | KeyCode::Char('k') => app.album_detail_cursor.up(),
        KeyCode::Down | KeyCode::Char('j') => app.album_detail_cursor.down(len),
        KeyCode::Enter => {
            if let Some(id) = app.album_detail_selected().map(|r| r.id.clone()) {
                app.open_recipe(&id);
            }
        }
        KeyCode::Char('r') => app.request_remove_from_album(),
        _ => {}
    }
}

fn handle_profile_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.back(),
        KeyCode::Char('l') => app.logout(),
        _ => {}
    }
}

fn handle_sign_in_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('f') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.start_forgot_password();
        return;
    }

    match key.code {
        KeyCode::Esc => match app.sign_in.step {
            SignInStep::Credentials => app.back(),
            SignInStep::ForgotRequest | SignInStep::ForgotConfirm => app.cancel_forgot_password(),
        },
        KeyCode::Enter => app.submit_sign_in(),
        KeyCode::Tab | KeyCode::Down => app.sign_in.fields_mut().next(),
        KeyCode::BackTab | KeyCode::Up => app.sign_in.fields_mut().prev(),
        _ => {
            if let Some(field) = app.sign_in.fields_mut().focused_mut() {
                edit_text(field, key);
            }
        }
    }
}

fn handle_sign_up_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => match app.sign_up.step {
            SignUpStep::Details => app.back(),
            SignUpStep::Confirm => app.sign_up.step = SignUpStep::Details,
        },
        KeyCode::Enter => app.submit_sign_up(),
        KeyCode::Tab | KeyCode::Down => app.sign_up.fields_mut().next(),
        KeyCode::BackTab | KeyCode::Up => app.sign_up.fields_mut().prev(),
        _ => {
            if let Some(field) = app.sign_up.fields_mut().focused_mut() {
                edit_text(field, key);
            }
        }
    }
}
