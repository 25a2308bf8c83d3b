pub mod error;
pub mod factory;
pub mod propagate;
pub mod roster;
pub mod store;

pub use error::{BracketError, BracketResult};
pub use factory::create_bracket;
pub use propagate::{MatchupPatch, apply_update, update_matchup};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Domain types: plain records shared by the engine, roster and store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Conference {
    Eastern,
    Western,
}

impl Conference {
    pub fn label(&self) -> &'static str {
        match self {
            Conference::Eastern => "Eastern",
            Conference::Western => "Western",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,         // "Boston Celtics"
    pub abbreviation: String, // "BOS"
    pub conference: Conference,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub primary_color: String,
    #[serde(default)]
    pub secondary_color: String,
    #[serde(default)]
    pub record: Option<String>, // "64-18"
    #[serde(default)]
    pub seed: Option<u8>,
}

/// Teams are identified by id alone; visual metadata never affects identity.
impl PartialEq for Team {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Team {}

/// Ordered from earliest to latest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Round {
    #[default]
    FirstRound,
    ConferenceSemifinals,
    ConferenceFinals,
    Finals,
}

impl Round {
    pub const ALL: [Round; 4] = [
        Round::FirstRound,
        Round::ConferenceSemifinals,
        Round::ConferenceFinals,
        Round::Finals,
    ];

    /// Series wins needed to take a matchup (best-of-7 in every round).
    pub const WINS_REQUIRED: u8 = 4;

    pub fn label(&self) -> &'static str {
        match self {
            Round::FirstRound => "First Round",
            Round::ConferenceSemifinals => "Conference Semifinals",
            Round::ConferenceFinals => "Conference Finals",
            Round::Finals => "Finals",
        }
    }

    pub fn matchup_count(&self) -> usize {
        match self {
            Round::FirstRound => 8,
            Round::ConferenceSemifinals => 4,
            Round::ConferenceFinals => 2,
            Round::Finals => 1,
        }
    }

    /// 0 for the first round, 3 for the finals.
    pub fn depth(&self) -> usize {
        *self as usize
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }

    pub fn prev(self) -> Option<Self> {
        match self {
            Round::FirstRound => None,
            Round::ConferenceSemifinals => Some(Round::FirstRound),
            Round::ConferenceFinals => Some(Round::ConferenceSemifinals),
            Round::Finals => Some(Round::ConferenceFinals),
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Round::FirstRound => Some(Round::ConferenceSemifinals),
            Round::ConferenceSemifinals => Some(Round::ConferenceFinals),
            Round::ConferenceFinals => Some(Round::Finals),
            Round::Finals => None,
        }
    }
}

/// Which side of a matchup a team occupies. Even positions feed the
/// downstream home slot, odd positions feed away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    Home,
    Away,
}

impl Slot {
    pub fn for_position(position: usize) -> Self {
        if position % 2 == 0 { Slot::Home } else { Slot::Away }
    }
}

/// Where a matchup sits in its lifecycle. Edits can move a matchup back to
/// any earlier stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchupState {
    Empty,
    OneTeam,
    Ready,
    InProgress,
    Decided,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matchup {
    pub id: String,
    pub round: Round,
    pub position: usize,
    pub home_team: Option<Team>,
    pub away_team: Option<Team>,
    #[serde(default)]
    pub home_score: Option<u8>,
    #[serde(default)]
    pub away_score: Option<u8>,
    #[serde(default)]
    pub winner: Option<Team>,
    #[serde(default)]
    pub next_matchup_id: Option<String>,
}

impl Matchup {
    pub fn team(&self, slot: Slot) -> Option<&Team> {
        match slot {
            Slot::Home => self.home_team.as_ref(),
            Slot::Away => self.away_team.as_ref(),
        }
    }

    pub fn score(&self, slot: Slot) -> Option<u8> {
        match slot {
            Slot::Home => self.home_score,
            Slot::Away => self.away_score,
        }
    }

    pub fn has_both_teams(&self) -> bool {
        self.home_team.is_some() && self.away_team.is_some()
    }

    /// Side the current winner plays on, if any.
    pub fn winner_slot(&self) -> Option<Slot> {
        let winner = self.winner.as_ref()?;
        if self.home_team.as_ref() == Some(winner) {
            Some(Slot::Home)
        } else if self.away_team.as_ref() == Some(winner) {
            Some(Slot::Away)
        } else {
            None
        }
    }

    pub fn state(&self) -> MatchupState {
        if self.winner.is_some() {
            return MatchupState::Decided;
        }
        match (&self.home_team, &self.away_team) {
            (None, None) => MatchupState::Empty,
            (Some(_), None) | (None, Some(_)) => MatchupState::OneTeam,
            (Some(_), Some(_)) => {
                let played = self.home_score.unwrap_or(0) > 0 || self.away_score.unwrap_or(0) > 0;
                if played { MatchupState::InProgress } else { MatchupState::Ready }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    pub id: String,
    pub name: String,
    pub year: u16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_public: bool,
    pub matchups: Vec<Matchup>,
    pub champion: Option<Team>,
}

impl Bracket {
    pub fn matchup(&self, matchup_id: &str) -> Option<&Matchup> {
        self.matchups.iter().find(|m| m.id == matchup_id)
    }

    pub fn matchup_index(&self, matchup_id: &str) -> Option<usize> {
        self.matchups.iter().position(|m| m.id == matchup_id)
    }

    /// Matchups of one round, ordered by position for column rendering.
    pub fn matchups_in_round(&self, round: Round) -> Vec<&Matchup> {
        let mut games: Vec<&Matchup> = self.matchups.iter().filter(|m| m.round == round).collect();
        games.sort_by_key(|m| m.position);
        games
    }

    pub fn matchup_at(&self, round: Round, position: usize) -> Option<&Matchup> {
        self.matchups
            .iter()
            .find(|m| m.round == round && m.position == position)
    }

    pub fn finals(&self) -> Option<&Matchup> {
        self.matchups.iter().find(|m| m.round.is_terminal())
    }

    pub fn decided_count(&self) -> usize {
        self.matchups.iter().filter(|m| m.winner.is_some()).count()
    }

    /// Check a bracket read from outside the engine: matchup ids are unique,
    /// every downstream link resolves and every series score is legal.
    pub fn validate(&self) -> BracketResult<()> {
        let mut ids = HashSet::new();
        for m in &self.matchups {
            if !ids.insert(m.id.as_str()) {
                return Err(BracketError::InvalidBracket(format!("duplicate matchup id {}", m.id)));
            }
        }
        for m in &self.matchups {
            if let Some(next_id) = &m.next_matchup_id
                && !ids.contains(next_id.as_str())
            {
                return Err(BracketError::InvalidBracket(format!("matchup {} feeds unknown {next_id}", m.id)));
            }
            propagate::validate_scores(m)?;
        }
        Ok(())
    }
}

/// Listing entry for saved brackets; avoids cloning every matchup.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketSummary {
    pub id: String,
    pub name: String,
    pub year: u16,
    pub updated_at: DateTime<Utc>,
    pub champion: Option<String>,
    pub decided: usize,
}

impl From<&Bracket> for BracketSummary {
    fn from(bracket: &Bracket) -> Self {
        Self {
            id: bracket.id.clone(),
            name: bracket.name.clone(),
            year: bracket.year,
            updated_at: bracket.updated_at,
            champion: bracket.champion.as_ref().map(|t| t.abbreviation.clone()),
            decided: bracket.decided_count(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{Conference, Team};

    pub fn team(id: &str, abbreviation: &str, conference: Conference, seed: u8) -> Team {
        Team {
            id: id.into(),
            name: format!("{abbreviation} Team"),
            abbreviation: abbreviation.into(),
            conference,
            logo_url: String::new(),
            primary_color: String::new(),
            secondary_color: String::new(),
            record: None,
            seed: Some(seed),
        }
    }
}
