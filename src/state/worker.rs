use crate::state::messages::{WorkerRequest, WorkerResponse};
use bracket_engine::roster::RosterClient;
use bracket_engine::store::{BracketStore, FileStore};
use bracket_engine::{Bracket, BracketError, BracketResult};
use log::{debug, error};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Runs roster fetches and bracket storage off the UI loop. Brackets travel
/// whole in both directions; the worker never edits one.
pub struct StorageWorker {
    roster: RosterClient,
    store: FileStore,
    export_dir: PathBuf,
    requests: mpsc::Receiver<WorkerRequest>,
    responses: mpsc::Sender<WorkerResponse>,
    is_loading: Arc<AtomicBool>,
}

impl StorageWorker {
    pub fn new(
        data_dir: &Path,
        requests: mpsc::Receiver<WorkerRequest>,
        responses: mpsc::Sender<WorkerResponse>,
    ) -> Self {
        Self {
            roster: RosterClient::new(),
            store: FileStore::new(data_dir),
            export_dir: data_dir.join("exports"),
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = match request {
                WorkerRequest::LoadRoster => self.handle_load_roster().await,
                WorkerRequest::ListBrackets => self.handle_list().await,
                WorkerRequest::SaveBracket { bracket } => self.handle_save(bracket).await,
                WorkerRequest::LoadBracket { bracket_id } => self.handle_load(bracket_id).await,
                WorkerRequest::DeleteBracket { bracket_id } => self.handle_delete(bracket_id).await,
                WorkerRequest::ExportBracket { bracket } => self.handle_export(bracket).await,
            };

            debug!("worker request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| WorkerResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send worker response: {e}");
                break;
            }
        }
    }

    async fn handle_load_roster(&self) -> BracketResult<WorkerResponse> {
        debug!("loading roster");
        let roster = self.roster.fetch_roster().await?;
        Ok(WorkerResponse::RosterLoaded { roster })
    }

    async fn handle_list(&self) -> BracketResult<WorkerResponse> {
        let store = self.store.clone();
        let brackets = run_blocking(move || store.list()).await?;
        debug!("listed {} saved brackets from {}", brackets.len(), self.store.dir().display());
        Ok(WorkerResponse::BracketsListed { brackets })
    }

    async fn handle_save(&self, bracket: Bracket) -> BracketResult<WorkerResponse> {
        let mut store = self.store.clone();
        let bracket = run_blocking(move || store.save(&bracket)).await?;
        Ok(WorkerResponse::BracketSaved { bracket })
    }

    async fn handle_load(&self, bracket_id: String) -> BracketResult<WorkerResponse> {
        let store = self.store.clone();
        let bracket = run_blocking(move || store.load(&bracket_id)).await?;
        Ok(WorkerResponse::BracketLoaded { bracket })
    }

    async fn handle_delete(&self, bracket_id: String) -> BracketResult<WorkerResponse> {
        let mut store = self.store.clone();
        let id = bracket_id.clone();
        run_blocking(move || store.delete(&id)).await?;
        Ok(WorkerResponse::BracketDeleted { bracket_id })
    }

    async fn handle_export(&self, bracket: Bracket) -> BracketResult<WorkerResponse> {
        let dir = self.export_dir.clone();
        let path = run_blocking(move || export_bracket(&dir, &bracket)).await?;
        Ok(WorkerResponse::BracketExported { path })
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state = LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(WorkerResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(WorkerResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(WorkerResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

/// Store and export calls touch the filesystem; keep them off the runtime threads.
async fn run_blocking<T, F>(task: F) -> BracketResult<T>
where
    F: FnOnce() -> BracketResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .unwrap_or_else(|e| Err(BracketError::Io { path: "storage task".to_string(), source: std::io::Error::other(e) }))
}

/// Write a pretty-printed copy of the bracket to `<dir>/<name>-<year>.json`.
pub fn export_bracket(dir: &Path, bracket: &Bracket) -> BracketResult<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| BracketError::Io { path: dir.display().to_string(), source: e })?;
    let path = dir.join(format!("{}-{}.json", slugify(&bracket.name), bracket.year));
    let payload = serde_json::to_string_pretty(bracket)?;
    std::fs::write(&path, payload).map_err(|e| BracketError::Io { path: path.display().to_string(), source: e })?;
    debug!("exported bracket {} to {}", bracket.id, path.display());
    Ok(path)
}

fn slugify(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug.split('-').filter(|s| !s.is_empty()).collect::<Vec<_>>().join("-");
    if slug.is_empty() { "bracket".to_string() } else { slug }
}
