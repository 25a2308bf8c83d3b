use crate::app::MenuItem;
use bracket_engine::roster::Roster;
use bracket_engine::{Bracket, BracketSummary, Matchup, Round, Slot, Team};

// ---------------------------------------------------------------------------
// Bracket editor state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct EditorState {
    /// The single mutable bracket. Every edit replaces it through the engine.
    pub bracket: Option<Bracket>,
    pub view_round: Round,
    /// Matchup position within `view_round`.
    pub selected: usize,
    pub scroll_offset: u16,
    /// Edited since the last successful save.
    pub dirty: bool,
}

impl EditorState {
    pub fn load(&mut self, bracket: Bracket) {
        self.bracket = Some(bracket);
        self.view_round = Round::FirstRound;
        self.selected = 0;
        self.scroll_offset = 0;
        self.dirty = false;
    }

    pub fn navigate_round_next(&mut self) {
        if let Some(next) = self.view_round.next() {
            self.view_round = next;
            self.selected /= 2;
        }
    }

    /// Moving left lands on the home-side feeder of the current matchup.
    pub fn navigate_round_prev(&mut self) {
        if let Some(prev) = self.view_round.prev() {
            self.view_round = prev;
            self.selected *= 2;
        }
    }

    pub fn navigate_game_down(&mut self) {
        let max = self.view_round.matchup_count().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn navigate_game_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_matchup(&self) -> Option<&Matchup> {
        self.bracket.as_ref()?.matchup_at(self.view_round, self.selected)
    }
}

// ---------------------------------------------------------------------------
// Team picker popup
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct TeamPickerState {
    pub open: bool,
    pub slot: Slot,
    pub query: String,
    pub cursor: usize,
}

impl Default for TeamPickerState {
    fn default() -> Self {
        Self { open: false, slot: Slot::Home, query: String::new(), cursor: 0 }
    }
}

impl TeamPickerState {
    pub fn open(&mut self, slot: Slot) {
        self.open = true;
        self.slot = slot;
        self.query.clear();
        self.cursor = 0;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.cursor = 0;
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
        self.cursor = 0;
    }

    pub fn candidates<'a>(&self, roster: &'a Roster) -> Vec<&'a Team> {
        roster.search(&self.query)
    }

    pub fn move_down(&mut self, len: usize) {
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Saved bracket list
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SavedListState {
    pub brackets: Vec<BracketSummary>,
    pub selected: usize,
}

impl SavedListState {
    pub fn set(&mut self, brackets: Vec<BracketSummary>) {
        self.brackets = brackets;
        self.selected = self.selected.min(self.brackets.len().saturating_sub(1));
    }

    pub fn remove(&mut self, bracket_id: &str) {
        self.brackets.retain(|b| b.id != bracket_id);
        self.selected = self.selected.min(self.brackets.len().saturating_sub(1));
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.brackets.len() {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_id(&self) -> Option<String> {
        self.brackets.get(self.selected).map(|b| b.id.clone())
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    /// View mode ignores every editing key.
    pub edit_mode: bool,
    pub roster: Option<Roster>,
    pub editor: EditorState,
    pub picker: TeamPickerState,
    pub saved: SavedListState,
    pub notification: Option<Notification>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            active_tab: MenuItem::default(),
            previous_tab: MenuItem::default(),
            show_logs: false,
            edit_mode: true,
            roster: None,
            editor: EditorState::default(),
            picker: TeamPickerState::default(),
            saved: SavedListState::default(),
            notification: None,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.notification = Some(Notification { message: message.into(), kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_engine::create_bracket;

    #[test]
    fn round_navigation_follows_the_tree() {
        let mut editor = EditorState::default();
        editor.load(create_bracket(2025, "nav"));
        editor.selected = 5;
        editor.navigate_round_next();
        assert_eq!((editor.view_round, editor.selected), (Round::ConferenceSemifinals, 2));
        editor.navigate_round_next();
        editor.navigate_round_next();
        editor.navigate_round_next();
        assert_eq!((editor.view_round, editor.selected), (Round::Finals, 0));
        editor.navigate_round_prev();
        assert_eq!((editor.view_round, editor.selected), (Round::ConferenceFinals, 0));
        assert_eq!(editor.selected_matchup().map(|m| m.id.as_str()), Some("conference-final-0"));
    }

    #[test]
    fn game_navigation_is_bounded_by_round_size() {
        let mut editor = EditorState::default();
        editor.view_round = Round::ConferenceFinals;
        editor.navigate_game_down();
        editor.navigate_game_down();
        assert_eq!(editor.selected, 1);
        editor.navigate_game_up();
        editor.navigate_game_up();
        assert_eq!(editor.selected, 0);
    }

    #[test]
    fn picker_filters_and_resets_cursor() {
        let roster = Roster::embedded().unwrap();
        let mut picker = TeamPickerState::default();
        picker.open(Slot::Away);
        picker.move_down(16);
        assert_eq!(picker.cursor, 1);
        for c in "lak".chars() {
            picker.push_char(c);
        }
        assert_eq!(picker.cursor, 0);
        let hits = picker.candidates(&roster);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].abbreviation, "LAL");
    }

    #[test]
    fn saved_list_clamps_selection_on_removal() {
        let mut saved = SavedListState::default();
        let a = create_bracket(2025, "a");
        let b = create_bracket(2025, "b");
        saved.set(vec![BracketSummary::from(&a), BracketSummary::from(&b)]);
        saved.move_down();
        assert_eq!(saved.selected_id(), Some(b.id.clone()));
        saved.remove(&b.id);
        assert_eq!(saved.selected_id(), Some(a.id));
    }
}
