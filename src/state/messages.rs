use crate::state::worker::LoadingState;
use bracket_engine::roster::Roster;
use bracket_engine::{Bracket, BracketSummary};
use crossterm::event::KeyEvent;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum WorkerRequest {
    LoadRoster,
    ListBrackets,
    SaveBracket { bracket: Bracket },
    LoadBracket { bracket_id: String },
    DeleteBracket { bracket_id: String },
    ExportBracket { bracket: Bracket },
}

#[derive(Debug)]
pub enum WorkerResponse {
    LoadingStateChanged { loading_state: LoadingState },
    RosterLoaded { roster: Roster },
    BracketsListed { brackets: Vec<BracketSummary> },
    BracketSaved { bracket: Bracket },
    BracketLoaded { bracket: Bracket },
    BracketDeleted { bracket_id: String },
    BracketExported { path: PathBuf },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
