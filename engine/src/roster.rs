use crate::error::{BracketError, BracketResult};
use crate::{Conference, Team};
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

const EMBEDDED_ROSTER_JSON: &str = include_str!("../data/roster_2024.json");
const TEAMS_PER_CONFERENCE: usize = 8;

/// The 16 playoff teams a bracket is filled from, 8 per conference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub year: u16,
    pub teams: Vec<Team>,
}

impl Roster {
    /// Offline snapshot compiled into the binary.
    pub fn embedded() -> BracketResult<Self> {
        Self::from_json(EMBEDDED_ROSTER_JSON)
    }

    pub fn from_json(json: &str) -> BracketResult<Self> {
        let roster: Roster = serde_json::from_str(json)?;
        roster.validate()?;
        Ok(roster)
    }

    pub fn from_file(path: impl AsRef<Path>) -> BracketResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| BracketError::io(path.display(), e))?;
        Self::from_json(&content)
    }

    /// Team ids unique, 8 teams per conference, seeds 1-8 used once each
    /// within a conference.
    pub fn validate(&self) -> BracketResult<()> {
        let mut ids = HashSet::new();
        for team in &self.teams {
            if !ids.insert(team.id.as_str()) {
                return Err(BracketError::InvalidRoster(format!("duplicate team id {}", team.id)));
            }
        }

        for conference in [Conference::Eastern, Conference::Western] {
            let teams: Vec<&Team> = self.teams.iter().filter(|t| t.conference == conference).collect();
            if teams.len() != TEAMS_PER_CONFERENCE {
                return Err(BracketError::InvalidRoster(format!(
                    "{} conference has {} teams, expected {TEAMS_PER_CONFERENCE}",
                    conference.label(),
                    teams.len()
                )));
            }
            let mut seeds = HashSet::new();
            for team in teams {
                match team.seed {
                    Some(seed @ 1..=8) if seeds.insert(seed) => {}
                    Some(seed) => {
                        return Err(BracketError::InvalidRoster(format!(
                            "{} has invalid or repeated seed {seed}",
                            team.abbreviation
                        )));
                    }
                    None => {}
                }
            }
        }
        Ok(())
    }

    pub fn find(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    /// Teams of one conference ordered by seed; unseeded teams go last.
    pub fn conference(&self, conference: Conference) -> Vec<&Team> {
        let mut teams: Vec<&Team> = self.teams.iter().filter(|t| t.conference == conference).collect();
        teams.sort_by_key(|t| t.seed.unwrap_or(u8::MAX));
        teams
    }

    /// Case-insensitive match on name or abbreviation. An empty term matches
    /// every team.
    pub fn search(&self, term: &str) -> Vec<&Team> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.teams.iter().collect();
        }
        self.teams
            .iter()
            .filter(|t| t.name.to_lowercase().contains(&term) || t.abbreviation.to_lowercase().contains(&term))
            .collect()
    }
}

/// Loads the roster from wherever the user pointed us.
#[derive(Debug, Clone)]
pub struct RosterClient {
    client: Client,
    timeout: Duration,
}

impl Default for RosterClient {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent("pbtui/0.1 (terminal bracket builder)")
                .build()
                .unwrap_or_default(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl RosterClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fallback chain:
    /// 1) `PBTUI_ROSTER_JSON` env var: local roster file. Errors are reported.
    /// 2) `PBTUI_ROSTER_URL` env var: HTTP endpoint serving the same JSON.
    /// 3) Embedded 2024 snapshot.
    pub async fn fetch_roster(&self) -> BracketResult<Roster> {
        if let Ok(path) = std::env::var("PBTUI_ROSTER_JSON")
            && !path.trim().is_empty()
        {
            debug!("loading roster from {path}");
            return Roster::from_file(path.trim());
        }

        if let Ok(url) = std::env::var("PBTUI_ROSTER_URL")
            && !url.trim().is_empty()
        {
            match self.fetch_url(url.trim()).await {
                Ok(roster) => return Ok(roster),
                Err(e) => warn!("roster fetch failed, using embedded snapshot: {e}"),
            }
        }

        Roster::embedded()
    }

    pub async fn fetch_url(&self, url: &str) -> BracketResult<Roster> {
        debug!("fetching roster from {url}");
        let http = |source| BracketError::Http { url: url.to_owned(), source };
        let roster: Roster = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(http)?
            .error_for_status()
            .map_err(http)?
            .json()
            .await
            .map_err(http)?;
        roster.validate()?;
        Ok(roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_roster_parses_and_validates() {
        let roster = Roster::embedded().expect("embedded roster should parse");
        assert_eq!(roster.year, 2024);
        assert_eq!(roster.teams.len(), 16);
    }

    #[test]
    fn conference_listing_is_ordered_by_seed() {
        let roster = Roster::embedded().unwrap();
        let west = roster.conference(Conference::Western);
        let seeds: Vec<u8> = west.iter().filter_map(|t| t.seed).collect();
        assert_eq!(seeds, (1..=8).collect::<Vec<u8>>());
        assert_eq!(west[0].abbreviation, "OKC");
    }

    #[test]
    fn search_is_case_insensitive_on_name_and_abbreviation() {
        let roster = Roster::embedded().unwrap();
        let hits: Vec<&str> = roster.search("los angeles").iter().map(|t| t.abbreviation.as_str()).collect();
        assert_eq!(hits, vec!["LAC", "LAL"]);
        assert_eq!(roster.search("bos")[0].id, "eastern-1");
        assert_eq!(roster.search("  ").len(), 16);
        assert!(roster.search("raptors").is_empty());
    }

    #[test]
    fn find_looks_up_by_id() {
        let roster = Roster::embedded().unwrap();
        assert_eq!(roster.find("western-8").map(|t| t.abbreviation.as_str()), Some("LAL"));
        assert!(roster.find("western-9").is_none());
    }

    #[test]
    fn short_conference_is_rejected() {
        let mut roster = Roster::embedded().unwrap();
        roster.teams.retain(|t| t.id != "eastern-8");
        assert!(matches!(roster.validate(), Err(BracketError::InvalidRoster(_))));
    }

    #[test]
    fn repeated_seed_is_rejected() {
        let mut roster = Roster::embedded().unwrap();
        roster.teams[1].seed = Some(1);
        assert!(matches!(roster.validate(), Err(BracketError::InvalidRoster(_))));
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut roster = Roster::embedded().unwrap();
        roster.teams[1].id = roster.teams[0].id.clone();
        assert!(matches!(roster.validate(), Err(BracketError::InvalidRoster(_))));
    }

    #[tokio::test]
    async fn fetch_url_parses_served_roster() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/roster")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(EMBEDDED_ROSTER_JSON)
            .create_async()
            .await;

        let roster = RosterClient::new()
            .fetch_url(&format!("{}/roster", server.url()))
            .await
            .expect("served roster should parse");
        assert_eq!(roster.teams.len(), 16);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_url_reports_server_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/roster").with_status(500).create_async().await;

        let err = RosterClient::new()
            .fetch_url(&format!("{}/roster", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, BracketError::Http { .. }));
    }
}
