use crate::app::{App, MenuItem};
use crate::state::messages::WorkerRequest;
use bracket_engine::Slot;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    worker_requests: &mpsc::Sender<WorkerRequest>,
) {
    let mut guard = app.lock().await;

    if (key_event.code, key_event.modifiers) == (Char('c'), KeyModifiers::CONTROL) {
        crate::cleanup_terminal();
        std::process::exit(0);
    }

    // The picker swallows typing so team names can contain any letter.
    if guard.state.picker.open {
        match key_event.code {
            KeyCode::Esc => guard.close_team_picker(),
            KeyCode::Enter => guard.picker_select(),
            KeyCode::Delete => guard.picker_clear_slot(),
            KeyCode::Backspace => guard.picker_backspace(),
            KeyCode::Down => guard.picker_down(),
            KeyCode::Up => guard.picker_up(),
            Char(c) => guard.picker_type(c),
            _ => {}
        }
        return;
    }

    let mut request = None;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Bracket),
        (_, Char('2'), _) => {
            guard.update_tab(MenuItem::Saved);
            request = Some(WorkerRequest::ListBrackets);
        }
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Bracket navigation
        (MenuItem::Bracket, Char('l') | KeyCode::Right, _) => guard.bracket_next_round(),
        (MenuItem::Bracket, Char('h') | KeyCode::Left, _) => guard.bracket_prev_round(),
        (MenuItem::Bracket, Char('j') | KeyCode::Down, _) => guard.bracket_game_down(),
        (MenuItem::Bracket, Char('k') | KeyCode::Up, _) => guard.bracket_game_up(),

        // Bracket editing
        (MenuItem::Bracket, Char('n'), _) => guard.new_bracket(),
        (MenuItem::Bracket, Char('e'), _) => guard.toggle_edit_mode(),
        (MenuItem::Bracket, Char('a'), _) => guard.open_team_picker(Slot::Home),
        (MenuItem::Bracket, Char('b'), _) => guard.open_team_picker(Slot::Away),
        (MenuItem::Bracket, Char('A'), _) => guard.pick_winner(Slot::Home),
        (MenuItem::Bracket, Char('B'), _) => guard.pick_winner(Slot::Away),
        (MenuItem::Bracket, Char('+') | Char('='), _) => guard.adjust_score(Slot::Home, 1),
        (MenuItem::Bracket, Char('-'), _) => guard.adjust_score(Slot::Home, -1),
        (MenuItem::Bracket, Char(']'), _) => guard.adjust_score(Slot::Away, 1),
        (MenuItem::Bracket, Char('['), _) => guard.adjust_score(Slot::Away, -1),
        (MenuItem::Bracket, Char('c'), _) => guard.clear_winner(),
        (MenuItem::Bracket, Char('s'), _) => request = guard.save_request(),
        (MenuItem::Bracket, Char('x'), _) => request = guard.export_request(),

        // Saved brackets
        (MenuItem::Saved, Char('j') | KeyCode::Down, _) => guard.saved_down(),
        (MenuItem::Saved, Char('k') | KeyCode::Up, _) => guard.saved_up(),
        (MenuItem::Saved, KeyCode::Enter, _) => request = guard.load_selected_request(),
        (MenuItem::Saved, Char('d'), _) => request = guard.delete_selected_request(),
        (MenuItem::Saved, Char('r'), _) => request = Some(WorkerRequest::ListBrackets),
        (MenuItem::Saved, KeyCode::Esc, _) => guard.update_tab(MenuItem::Bracket),

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    if let Some(request) = request {
        drop(guard);
        let _ = worker_requests.send(request).await;
    }
}
