use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, NotificationKind};
use crate::state::messages::WorkerRequest;
use bracket_engine::roster::Roster;
use bracket_engine::{Bracket, BracketSummary, MatchupPatch, Slot, apply_update, create_bracket};
use log::{debug, info};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Bracket,
    Saved,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new() -> Self {
        let app = Self::with_settings(AppSettings::load());

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        Self { state: AppState::new(), settings }
    }

    // -----------------------------------------------------------------------
    // Worker response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_roster_loaded(&mut self, roster: Roster) {
        info!("roster {} loaded with {} teams", roster.year, roster.teams.len());
        self.state.roster = Some(roster);
    }

    pub fn on_brackets_listed(&mut self, brackets: Vec<BracketSummary>) {
        self.state.saved.set(brackets);
    }

    /// The store only stamps `updated_at`; picks made while the save was in
    /// flight stay in the editor.
    pub fn on_bracket_saved(&mut self, saved: Bracket) {
        if let Some(current) = self.state.editor.bracket.as_mut()
            && current.id == saved.id
        {
            current.updated_at = saved.updated_at;
            if *current == saved {
                self.state.editor.dirty = false;
            }
        }

        let mut brackets = std::mem::take(&mut self.state.saved.brackets);
        brackets.retain(|b| b.id != saved.id);
        brackets.insert(0, BracketSummary::from(&saved));
        self.state.saved.set(brackets);

        self.state.notify(NotificationKind::Success, format!("Saved \"{}\"", saved.name));
    }

    pub fn on_bracket_loaded(&mut self, bracket: Bracket) {
        let name = bracket.name.clone();
        self.state.editor.load(bracket);
        self.state.picker.close();
        self.update_tab(MenuItem::Bracket);
        self.state.notify(NotificationKind::Info, format!("Loaded \"{name}\""));
    }

    pub fn on_bracket_deleted(&mut self, bracket_id: String) {
        self.state.saved.remove(&bracket_id);
        self.state.notify(NotificationKind::Info, "Bracket deleted");
    }

    pub fn on_bracket_exported(&mut self, path: PathBuf) {
        self.state
            .notify(NotificationKind::Success, format!("Exported to {}", path.display()));
    }

    pub fn on_error(&mut self, message: String) {
        self.state.notify(NotificationKind::Error, message);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    pub fn toggle_edit_mode(&mut self) {
        self.state.edit_mode = !self.state.edit_mode;
        self.state.picker.close();
        let mode = if self.state.edit_mode { "Edit mode" } else { "View mode" };
        self.state.notify(NotificationKind::Info, mode);
    }

    // -----------------------------------------------------------------------
    // Bracket navigation, delegated to EditorState
    // -----------------------------------------------------------------------

    pub fn bracket_next_round(&mut self) {
        self.state.editor.navigate_round_next();
    }

    pub fn bracket_prev_round(&mut self) {
        self.state.editor.navigate_round_prev();
    }

    pub fn bracket_game_down(&mut self) {
        self.state.editor.navigate_game_down();
    }

    pub fn bracket_game_up(&mut self) {
        self.state.editor.navigate_game_up();
    }

    // -----------------------------------------------------------------------
    // Bracket editing
    // -----------------------------------------------------------------------

    pub fn new_bracket(&mut self) {
        let year = self.settings.default_year;
        let bracket = create_bracket(year, format!("My {year} Bracket"));
        info!("started bracket {}", bracket.id);
        self.state.editor.load(bracket);
        self.state.editor.dirty = true;
        self.state.notification = None;
    }

    pub fn open_team_picker(&mut self, slot: Slot) {
        if !self.can_edit() {
            return;
        }
        if self.state.roster.is_none() {
            self.state.notify(NotificationKind::Error, "Roster is still loading");
            return;
        }
        self.state.picker.open(slot);
    }

    pub fn close_team_picker(&mut self) {
        self.state.picker.close();
    }

    pub fn picker_type(&mut self, c: char) {
        self.state.picker.push_char(c);
    }

    pub fn picker_backspace(&mut self) {
        self.state.picker.pop_char();
    }

    pub fn picker_down(&mut self) {
        let len = self
            .state
            .roster
            .as_ref()
            .map_or(0, |r| self.state.picker.candidates(r).len());
        self.state.picker.move_down(len);
    }

    pub fn picker_up(&mut self) {
        self.state.picker.move_up();
    }

    pub fn picker_select(&mut self) {
        let slot = self.state.picker.slot;
        let team = self.state.roster.as_ref().and_then(|r| {
            self.state
                .picker
                .candidates(r)
                .get(self.state.picker.cursor)
                .map(|t| (*t).clone())
        });
        let Some(team) = team else {
            return;
        };
        self.state.picker.close();
        self.edit_selected(MatchupPatch::new().team(slot, Some(team)));
    }

    pub fn picker_clear_slot(&mut self) {
        let slot = self.state.picker.slot;
        self.state.picker.close();
        self.edit_selected(MatchupPatch::new().team(slot, None));
    }

    /// A pick whose series score does not already favour the chosen side
    /// becomes a 4 to at most 3 series in the same update.
    pub fn pick_winner(&mut self, slot: Slot) {
        if !self.can_edit() {
            return;
        }
        let Some(matchup) = self.state.editor.selected_matchup() else {
            return;
        };
        if !matchup.has_both_teams() {
            self.state.notify(
                NotificationKind::Error,
                "Both teams must be set before selecting a winner",
            );
            return;
        }

        let other = match slot {
            Slot::Home => Slot::Away,
            Slot::Away => Slot::Home,
        };
        let (won, lost) = winning_scores(
            matchup.score(slot).unwrap_or(0),
            matchup.score(other).unwrap_or(0),
        );
        let (home, away) = match slot {
            Slot::Home => (won, lost),
            Slot::Away => (lost, won),
        };
        let patch = MatchupPatch::new()
            .scores(home, away)
            .winner(matchup.team(slot).cloned());
        self.edit_selected(patch);
    }

    /// Step one side's series score, clamped to the legal range. Both scores
    /// are sent so an unplayed side reads as 0.
    pub fn adjust_score(&mut self, slot: Slot, delta: i8) {
        if !self.can_edit() {
            return;
        }
        let Some(matchup) = self.state.editor.selected_matchup() else {
            return;
        };
        let home = matchup.home_score.unwrap_or(0);
        let away = matchup.away_score.unwrap_or(0);
        let step = |score: u8| score.saturating_add_signed(delta).min(4);
        let (home, away) = match slot {
            Slot::Home => (step(home), away),
            Slot::Away => (home, step(away)),
        };
        if (Some(home), Some(away)) == (matchup.home_score, matchup.away_score) {
            return;
        }
        self.edit_selected(MatchupPatch::new().scores(home, away));
    }

    pub fn clear_winner(&mut self) {
        if !self.can_edit() {
            return;
        }
        self.edit_selected(MatchupPatch::new().winner(None));
    }

    fn can_edit(&mut self) -> bool {
        if !self.state.edit_mode {
            self.state
                .notify(NotificationKind::Info, "View mode: press e to edit");
            return false;
        }
        if self.state.editor.bracket.is_none() {
            self.state
                .notify(NotificationKind::Info, "Press n to start a bracket");
            return false;
        }
        true
    }

    fn edit_selected(&mut self, patch: MatchupPatch) {
        if !self.can_edit() {
            return;
        }
        let editor = &mut self.state.editor;
        let (round, position) = (editor.view_round, editor.selected);
        let Some(bracket) = editor.bracket.as_mut() else {
            return;
        };
        let Some(matchup_id) = bracket.matchup_at(round, position).map(|m| m.id.clone()) else {
            return;
        };

        match apply_update(bracket, &matchup_id, patch) {
            Ok(()) => {
                debug!("edited {matchup_id}");
                editor.dirty = true;
                self.state.notification = None;
            }
            Err(e) => self.state.notify(NotificationKind::Error, e.to_string()),
        }
    }

    // -----------------------------------------------------------------------
    // Requests for the storage worker
    // -----------------------------------------------------------------------

    pub fn save_request(&mut self) -> Option<WorkerRequest> {
        let Some(bracket) = self.state.editor.bracket.clone() else {
            self.state.notify(NotificationKind::Info, "Nothing to save");
            return None;
        };
        Some(WorkerRequest::SaveBracket { bracket })
    }

    pub fn export_request(&mut self) -> Option<WorkerRequest> {
        let Some(bracket) = self.state.editor.bracket.clone() else {
            self.state.notify(NotificationKind::Info, "Nothing to export");
            return None;
        };
        Some(WorkerRequest::ExportBracket { bracket })
    }

    pub fn saved_down(&mut self) {
        self.state.saved.move_down();
    }

    pub fn saved_up(&mut self) {
        self.state.saved.move_up();
    }

    pub fn load_selected_request(&self) -> Option<WorkerRequest> {
        let bracket_id = self.state.saved.selected_id()?;
        Some(WorkerRequest::LoadBracket { bracket_id })
    }

    pub fn delete_selected_request(&self) -> Option<WorkerRequest> {
        let bracket_id = self.state.saved.selected_id()?;
        Some(WorkerRequest::DeleteBracket { bracket_id })
    }
}

/// Scores to record when a side is picked as the winner: an existing lead
/// stands, anything else becomes 4 against at most 3.
fn winning_scores(winner: u8, loser: u8) -> (u8, u8) {
    if winner > loser { (winner, loser) } else { (4, loser.min(3)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_engine::Round;

    fn app() -> App {
        let settings = AppSettings {
            full_screen: false,
            log_level: None,
            data_dir: std::env::temp_dir(),
            default_year: 2024,
        };
        let mut app = App::with_settings(settings);
        app.on_roster_loaded(Roster::embedded().unwrap());
        app.new_bracket();
        app
    }

    fn assign(app: &mut App, slot: Slot, query: &str) {
        app.open_team_picker(slot);
        for c in query.chars() {
            app.picker_type(c);
        }
        app.picker_select();
    }

    fn selected_scores(app: &App) -> (Option<u8>, Option<u8>) {
        let m = app.state.editor.selected_matchup().unwrap();
        (m.home_score, m.away_score)
    }

    #[test]
    fn winning_scores_respects_an_existing_lead() {
        assert_eq!(winning_scores(0, 0), (4, 0));
        assert_eq!(winning_scores(2, 3), (4, 3));
        assert_eq!(winning_scores(1, 4), (4, 3));
        assert_eq!(winning_scores(3, 1), (3, 1));
    }

    #[test]
    fn picker_assigns_the_filtered_team() {
        let mut app = app();
        assign(&mut app, Slot::Home, "celtics");
        assign(&mut app, Slot::Away, "heat");
        let m = app.state.editor.selected_matchup().unwrap();
        assert_eq!(m.home_team.as_ref().map(|t| t.abbreviation.as_str()), Some("BOS"));
        assert_eq!(m.away_team.as_ref().map(|t| t.abbreviation.as_str()), Some("MIA"));
        assert!(!app.state.picker.open);
        assert!(app.state.editor.dirty);
    }

    #[test]
    fn picking_a_winner_sets_a_clinching_score_and_propagates() {
        let mut app = app();
        assign(&mut app, Slot::Home, "celtics");
        assign(&mut app, Slot::Away, "heat");
        app.adjust_score(Slot::Home, 1);
        app.adjust_score(Slot::Away, 1);
        app.adjust_score(Slot::Away, 1);

        app.pick_winner(Slot::Home);

        assert_eq!(selected_scores(&app), (Some(4), Some(2)));
        let bracket = app.state.editor.bracket.as_ref().unwrap();
        let next = bracket.matchup("semifinal-0").unwrap();
        assert_eq!(next.home_team.as_ref().map(|t| t.id.as_str()), Some("eastern-1"));
        assert!(app.state.notification.is_none());
    }

    #[test]
    fn picking_a_winner_without_both_teams_is_refused() {
        let mut app = app();
        assign(&mut app, Slot::Home, "celtics");
        let before = app.state.editor.bracket.clone();
        app.pick_winner(Slot::Home);
        assert_eq!(app.state.editor.bracket, before);
        assert_eq!(
            app.state.notification.as_ref().map(|n| n.kind),
            Some(NotificationKind::Error)
        );
    }

    #[test]
    fn rejected_score_leaves_bracket_untouched() {
        let mut app = app();
        assign(&mut app, Slot::Home, "celtics");
        assign(&mut app, Slot::Away, "heat");
        for _ in 0..6 {
            app.adjust_score(Slot::Home, 1);
        }
        for _ in 0..3 {
            app.adjust_score(Slot::Away, 1);
        }
        assert_eq!(selected_scores(&app), (Some(4), Some(3)));
        let before = app.state.editor.bracket.clone();

        app.adjust_score(Slot::Away, 1);

        assert_eq!(app.state.editor.bracket, before);
        let note = app.state.notification.as_ref().unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
    }

    #[test]
    fn view_mode_blocks_edits() {
        let mut app = app();
        app.toggle_edit_mode();
        let before = app.state.editor.bracket.clone();
        app.open_team_picker(Slot::Home);
        app.adjust_score(Slot::Home, 1);
        assert!(!app.state.picker.open);
        assert_eq!(app.state.editor.bracket, before);
    }

    #[test]
    fn clear_winner_keeps_downstream_slot() {
        let mut app = app();
        assign(&mut app, Slot::Home, "celtics");
        assign(&mut app, Slot::Away, "heat");
        app.pick_winner(Slot::Away);
        app.clear_winner();
        let bracket = app.state.editor.bracket.as_ref().unwrap();
        assert!(bracket.matchup("first-round-0").unwrap().winner.is_none());
        let next = bracket.matchup("semifinal-0").unwrap();
        assert_eq!(next.home_team.as_ref().map(|t| t.abbreviation.as_str()), Some("MIA"));
    }

    #[test]
    fn save_round_trip_marks_editor_clean() {
        let mut app = app();
        let Some(WorkerRequest::SaveBracket { mut bracket }) = app.save_request() else {
            panic!("expected a save request");
        };
        bracket.updated_at = bracket.updated_at + chrono::Duration::seconds(1);
        app.on_bracket_saved(bracket.clone());
        assert!(!app.state.editor.dirty);
        assert_eq!(app.state.editor.bracket.as_ref().unwrap().updated_at, bracket.updated_at);
        assert_eq!(app.state.saved.selected_id(), Some(bracket.id));
    }

    #[test]
    fn loading_a_saved_bracket_switches_to_the_bracket_tab() {
        let mut app = app();
        app.update_tab(MenuItem::Saved);
        app.state.editor.view_round = Round::Finals;
        app.on_bracket_loaded(create_bracket(2023, "old"));
        assert_eq!(app.state.active_tab, MenuItem::Bracket);
        assert_eq!(app.state.editor.view_round, Round::FirstRound);
        assert_eq!(app.state.editor.bracket.as_ref().map(|b| b.year), Some(2023));
    }
}
