use crate::error::{BracketError, BracketResult};
use crate::{Bracket, Matchup, Round, Slot, Team};
use log::{debug, warn};

/// A partial matchup edit. Each field is tri-state:
/// `None` keeps the current value, `Some(None)` clears it, `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchupPatch {
    pub home_team: Option<Option<Team>>,
    pub away_team: Option<Option<Team>>,
    pub home_score: Option<Option<u8>>,
    pub away_score: Option<Option<u8>>,
    pub winner: Option<Option<Team>>,
}

impl MatchupPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn team(self, slot: Slot, team: Option<Team>) -> Self {
        match slot {
            Slot::Home => self.home_team(team),
            Slot::Away => self.away_team(team),
        }
    }

    pub fn home_team(mut self, team: Option<Team>) -> Self {
        self.home_team = Some(team);
        self
    }

    pub fn away_team(mut self, team: Option<Team>) -> Self {
        self.away_team = Some(team);
        self
    }

    pub fn home_score(mut self, score: Option<u8>) -> Self {
        self.home_score = Some(score);
        self
    }

    pub fn away_score(mut self, score: Option<u8>) -> Self {
        self.away_score = Some(score);
        self
    }

    pub fn scores(self, home: u8, away: u8) -> Self {
        self.home_score(Some(home)).away_score(Some(away))
    }

    pub fn winner(mut self, team: Option<Team>) -> Self {
        self.winner = Some(team);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Apply `patch` to one matchup and carry the result forward.
///
/// The input bracket is never modified: on success a new bracket is returned
/// with the patch merged, the winner pushed into its downstream slot and the
/// champion refreshed; on failure nothing has changed.
pub fn update_matchup(bracket: &Bracket, matchup_id: &str, patch: MatchupPatch) -> BracketResult<Bracket> {
    let result = try_update(bracket, matchup_id, patch);
    match &result {
        Ok(_) => debug!("bracket {}: matchup {matchup_id} updated", bracket.id),
        Err(e) => warn!("bracket {}: rejected update to {matchup_id}: {e}", bracket.id),
    }
    result
}

/// In-place form of [`update_matchup`]; `bracket` is replaced only on success.
pub fn apply_update(bracket: &mut Bracket, matchup_id: &str, patch: MatchupPatch) -> BracketResult<()> {
    *bracket = update_matchup(bracket, matchup_id, patch)?;
    Ok(())
}

fn try_update(bracket: &Bracket, matchup_id: &str, patch: MatchupPatch) -> BracketResult<Bracket> {
    let index = bracket
        .matchup_index(matchup_id)
        .ok_or_else(|| BracketError::NotFound(format!("matchup {matchup_id}")))?;

    let mut matchup = bracket.matchups[index].clone();
    let MatchupPatch { home_team, away_team, home_score, away_score, winner } = patch;
    let scores_changed = home_score.is_some() || away_score.is_some();

    if let Some(team) = home_team {
        matchup.home_team = team;
    }
    if let Some(team) = away_team {
        matchup.away_team = team;
    }
    if let Some(score) = home_score {
        matchup.home_score = score;
    }
    if let Some(score) = away_score {
        matchup.away_score = score;
    }
    validate_scores(&matchup)?;

    // Only a winner assigned by this update is validated and pushed
    // downstream. A kept winner survives only while it still plays here.
    let (winner, assigned) = match winner {
        Some(explicit) => {
            if let Some(team) = &explicit {
                validate_winner(&matchup, team)?;
            }
            let assigned = explicit.is_some();
            (explicit, assigned)
        }
        None => match clinched_side(&matchup).filter(|_| scores_changed) {
            Some(slot) => {
                if !matchup.has_both_teams() {
                    return Err(BracketError::IncompleteMatchup(matchup.id));
                }
                (matchup.team(slot).cloned(), true)
            }
            None => (kept_winner(&matchup), false),
        },
    };
    matchup.winner = winner;

    let mut next = bracket.clone();
    if assigned
        && let (Some(winner), Some(next_id)) = (&matchup.winner, &matchup.next_matchup_id)
    {
        let downstream = next
            .matchups
            .iter_mut()
            .find(|m| &m.id == next_id)
            .ok_or_else(|| BracketError::NotFound(format!("downstream matchup {next_id}")))?;
        match Slot::for_position(matchup.position) {
            Slot::Home => downstream.home_team = Some(winner.clone()),
            Slot::Away => downstream.away_team = Some(winner.clone()),
        }
        debug!("{} advances {} into {}", winner.abbreviation, matchup.id, next_id);
    }

    if matchup.round.is_terminal() {
        next.champion = matchup.winner.clone();
    }
    next.matchups[index] = matchup;
    Ok(next)
}

pub(crate) fn validate_scores(matchup: &Matchup) -> BracketResult<()> {
    let max = Round::WINS_REQUIRED;
    for score in [matchup.home_score, matchup.away_score].into_iter().flatten() {
        if score > max {
            return Err(BracketError::InvalidScore(format!("scores must be between 0 and {max}, got {score}")));
        }
    }
    if matchup.home_score == Some(max) && matchup.away_score == Some(max) {
        return Err(BracketError::InvalidScore(format!("both teams cannot have {max} wins")));
    }
    Ok(())
}

/// The current winner, dropped once its slot has been replaced or either
/// slot has been emptied.
fn kept_winner(matchup: &Matchup) -> Option<Team> {
    let winner = matchup.winner.as_ref()?;
    if matchup.has_both_teams() && matchup.winner_slot().is_some() {
        return Some(winner.clone());
    }
    debug!("{}: dropping winner {} after a slot change", matchup.id, winner.abbreviation);
    None
}

/// Side that has reached the clinching score, if exactly one has.
fn clinched_side(matchup: &Matchup) -> Option<Slot> {
    let max = Round::WINS_REQUIRED;
    match (matchup.home_score?, matchup.away_score?) {
        (home, away) if home == max && away < max => Some(Slot::Home),
        (home, away) if away == max && home < max => Some(Slot::Away),
        _ => None,
    }
}

fn validate_winner(matchup: &Matchup, winner: &Team) -> BracketResult<()> {
    if !matchup.has_both_teams() {
        return Err(BracketError::IncompleteMatchup(matchup.id.clone()));
    }
    if matchup.home_team.as_ref() != Some(winner) && matchup.away_team.as_ref() != Some(winner) {
        return Err(BracketError::WinnerNotInMatchup {
            matchup_id: matchup.id.clone(),
            winner: winner.id.clone(),
        });
    }
    Ok(())
}
