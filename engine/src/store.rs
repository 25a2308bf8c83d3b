use crate::error::{BracketError, BracketResult};
use crate::{Bracket, BracketSummary};
use chrono::Utc;
use log::debug;
use std::path::{Path, PathBuf};

/// Where finished and in-progress brackets are kept between sessions.
pub trait BracketStore {
    /// Refresh `updated_at` and upsert by id. Returns the stored copy.
    fn save(&mut self, bracket: &Bracket) -> BracketResult<Bracket>;

    fn load(&self, bracket_id: &str) -> BracketResult<Bracket>;

    /// Remove the whole bracket; matchups are never deleted on their own.
    fn delete(&mut self, bracket_id: &str) -> BracketResult<()>;

    /// Saved brackets, most recently updated first.
    fn list(&self) -> BracketResult<Vec<BracketSummary>>;
}

fn stamped(bracket: &Bracket) -> Bracket {
    let mut saved = bracket.clone();
    saved.updated_at = Utc::now().max(bracket.updated_at);
    saved
}

fn sort_summaries(summaries: &mut [BracketSummary]) {
    summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.name.cmp(&b.name)));
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryStore {
    brackets: Vec<Bracket>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BracketStore for MemoryStore {
    fn save(&mut self, bracket: &Bracket) -> BracketResult<Bracket> {
        let saved = stamped(bracket);
        match self.brackets.iter_mut().find(|b| b.id == saved.id) {
            Some(existing) => *existing = saved.clone(),
            None => self.brackets.push(saved.clone()),
        }
        Ok(saved)
    }

    fn load(&self, bracket_id: &str) -> BracketResult<Bracket> {
        self.brackets
            .iter()
            .find(|b| b.id == bracket_id)
            .cloned()
            .ok_or_else(|| BracketError::NotFound(format!("bracket {bracket_id}")))
    }

    fn delete(&mut self, bracket_id: &str) -> BracketResult<()> {
        let before = self.brackets.len();
        self.brackets.retain(|b| b.id != bracket_id);
        if self.brackets.len() == before {
            return Err(BracketError::NotFound(format!("bracket {bracket_id}")));
        }
        Ok(())
    }

    fn list(&self) -> BracketResult<Vec<BracketSummary>> {
        let mut summaries: Vec<BracketSummary> = self.brackets.iter().map(BracketSummary::from).collect();
        sort_summaries(&mut summaries);
        Ok(summaries)
    }
}

// ---------------------------------------------------------------------------
// JSON file store: one `{id}.json` per bracket
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { dir: data_dir.into().join("brackets") }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, bracket_id: &str) -> BracketResult<PathBuf> {
        let valid = !bracket_id.is_empty()
            && bracket_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(BracketError::NotFound(format!("bracket {bracket_id}")));
        }
        Ok(self.dir.join(format!("{bracket_id}.json")))
    }

    fn read(path: &Path) -> BracketResult<Bracket> {
        let content = std::fs::read_to_string(path).map_err(|e| BracketError::io(path.display(), e))?;
        let bracket: Bracket = serde_json::from_str(&content)?;
        bracket.validate()?;
        Ok(bracket)
    }
}

impl BracketStore for FileStore {
    fn save(&mut self, bracket: &Bracket) -> BracketResult<Bracket> {
        let path = self.path_for(&bracket.id)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| BracketError::io(self.dir.display(), e))?;

        let saved = stamped(bracket);
        let payload = serde_json::to_string_pretty(&saved)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, payload).map_err(|e| BracketError::io(tmp.display(), e))?;
        std::fs::rename(&tmp, &path).map_err(|e| BracketError::io(path.display(), e))?;
        debug!("saved bracket {} to {}", saved.id, path.display());
        Ok(saved)
    }

    fn load(&self, bracket_id: &str) -> BracketResult<Bracket> {
        let path = self.path_for(bracket_id)?;
        if !path.exists() {
            return Err(BracketError::NotFound(format!("bracket {bracket_id}")));
        }
        Self::read(&path)
    }

    fn delete(&mut self, bracket_id: &str) -> BracketResult<()> {
        let path = self.path_for(bracket_id)?;
        if !path.exists() {
            return Err(BracketError::NotFound(format!("bracket {bracket_id}")));
        }
        std::fs::remove_file(&path).map_err(|e| BracketError::io(path.display(), e))?;
        debug!("deleted bracket {bracket_id}");
        Ok(())
    }

    fn list(&self) -> BracketResult<Vec<BracketSummary>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BracketError::io(self.dir.display(), e)),
        };

        let mut summaries = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read(&path) {
                Ok(bracket) => summaries.push(BracketSummary::from(&bracket)),
                Err(e) => log::warn!("skipping unreadable bracket {}: {e}", path.display()),
            }
        }
        sort_summaries(&mut summaries);
        Ok(summaries)
    }
}

/// `$XDG_CONFIG_HOME/pbtui`, then `$HOME/.config/pbtui`, then `./pbtui`.
pub fn default_data_dir() -> PathBuf {
    if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
        && !config_dir.trim().is_empty()
    {
        return PathBuf::from(config_dir).join("pbtui");
    }
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return PathBuf::from(home).join(".config").join("pbtui");
    }
    PathBuf::from("pbtui")
}
