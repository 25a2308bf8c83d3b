use crate::{Bracket, Matchup, Round};
use chrono::Utc;
use log::debug;
use uuid::Uuid;

/// Stable matchup id for a (round, position) pair. Unique within a bracket.
pub fn matchup_id(round: Round, position: usize) -> String {
    match round {
        Round::FirstRound => format!("first-round-{position}"),
        Round::ConferenceSemifinals => format!("semifinal-{position}"),
        Round::ConferenceFinals => format!("conference-final-{position}"),
        Round::Finals => "finals".to_string(),
    }
}

/// Build an empty 16-team bracket: 8 + 4 + 2 + 1 matchups, every team slot
/// unset. Matchup at position `i` feeds position `i / 2` of the next round.
pub fn create_bracket(year: u16, name: impl Into<String>) -> Bracket {
    let mut matchups = Vec::with_capacity(15);
    for round in Round::ALL {
        for position in 0..round.matchup_count() {
            matchups.push(Matchup {
                id: matchup_id(round, position),
                round,
                position,
                home_team: None,
                away_team: None,
                home_score: None,
                away_score: None,
                winner: None,
                next_matchup_id: round.next().map(|next| matchup_id(next, position / 2)),
            });
        }
    }

    let now = Utc::now();
    let bracket = Bracket {
        id: Uuid::new_v4().to_string(),
        name: name.into(),
        year,
        created_at: now,
        updated_at: now,
        is_public: false,
        matchups,
        champion: None,
    };
    debug!("created bracket {} ({year}) with {} matchups", bracket.id, bracket.matchups.len());
    bracket
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bracket_has_fifteen_matchups() {
        let b = create_bracket(2025, "My Bracket");
        assert_eq!(b.matchups.len(), 15);
        assert_eq!(b.year, 2025);
        assert_eq!(b.name, "My Bracket");
    }

    #[test]
    fn test_matchup_counts_per_round() {
        let b = create_bracket(2025, "counts");
        for round in Round::ALL {
            assert_eq!(b.matchups_in_round(round).len(), round.matchup_count(), "{round:?}");
        }
    }

    #[test]
    fn positions_are_contiguous_from_zero() {
        let b = create_bracket(2025, "positions");
        for round in Round::ALL {
            let positions: Vec<usize> = b.matchups_in_round(round).iter().map(|m| m.position).collect();
            let expected: Vec<usize> = (0..round.matchup_count()).collect();
            assert_eq!(positions, expected);
        }
    }

    #[test]
    fn every_non_final_matchup_feeds_the_next_round() {
        let b = create_bracket(2025, "wiring");
        for m in &b.matchups {
            match m.round.next() {
                Some(next_round) => {
                    let next_id = m.next_matchup_id.as_deref().expect("non-final must feed forward");
                    let next = b.matchup(next_id).expect("next matchup must exist");
                    assert_eq!(next.round, next_round);
                    assert_eq!(next.position, m.position / 2);
                }
                None => assert!(m.next_matchup_id.is_none(), "finals must not feed anything"),
            }
        }
    }

    #[test]
    fn each_downstream_matchup_has_two_feeders() {
        let b = create_bracket(2025, "feeders");
        for m in b.matchups.iter().filter(|m| m.round != Round::FirstRound) {
            let feeders = b
                .matchups
                .iter()
                .filter(|f| f.next_matchup_id.as_deref() == Some(m.id.as_str()))
                .count();
            assert_eq!(feeders, 2, "{} should have two feeders", m.id);
        }
    }

    #[test]
    fn slots_and_champion_start_empty() {
        let b = create_bracket(2025, "empty");
        assert!(b.champion.is_none());
        assert!(!b.is_public);
        assert_eq!(b.created_at, b.updated_at);
        assert!(b.matchups.iter().all(|m| {
            m.home_team.is_none()
                && m.away_team.is_none()
                && m.home_score.is_none()
                && m.away_score.is_none()
                && m.winner.is_none()
        }));
    }

    #[test]
    fn matchup_ids_are_unique_and_stable() {
        let a = create_bracket(2025, "a");
        let b = create_bracket(2025, "b");
        let ids: HashSet<&str> = a.matchups.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), 15);
        let a_ids: Vec<&str> = a.matchups.iter().map(|m| m.id.as_str()).collect();
        let b_ids: Vec<&str> = b.matchups.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(a_ids, b_ids);
    }

    #[test]
    fn bracket_ids_are_fresh_per_call() {
        let a = create_bracket(2025, "same");
        let b = create_bracket(2025, "same");
        assert_ne!(a.id, b.id);
    }
}
