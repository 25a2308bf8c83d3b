mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::messages::{UiEvent, WorkerRequest, WorkerResponse};
use crate::state::worker::{LoadingState, StorageWorker};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Debug)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let app = App::new();
    info!("saving brackets under {}", app.settings.data_dir.display());
    let data_dir = app.settings.data_dir.clone();
    let app = Arc::new(Mutex::new(app));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (worker_req_tx, worker_req_rx) = mpsc::channel::<WorkerRequest>(100);
    let (worker_resp_tx, worker_resp_rx) = mpsc::channel::<WorkerResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Storage thread
    let storage_worker = StorageWorker::new(&data_dir, worker_req_rx, worker_resp_tx);
    let storage_task = tokio::spawn(storage_worker.run());

    // Fetch the roster and saved list on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, worker_req_tx, worker_resp_rx).await;

    input_handler.abort();
    storage_task.abort();

    Ok(())
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("pbtui {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "pbtui - playoff bracket builder for the terminal

Usage:
  pbtui
  pbtui --help
  pbtui --version

Environment:
  PBTUI_LOG            Log level for the log pane (error, warn, info, debug, trace)
  PBTUI_DATA_DIR       Where brackets and exports are written (default ~/.config/pbtui)
  PBTUI_YEAR           Season year for new brackets (default current year)
  PBTUI_ROSTER_JSON    Path to a roster JSON file
  PBTUI_ROSTER_URL     URL serving roster JSON"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    worker_requests: mpsc::Sender<WorkerRequest>,
    mut worker_responses: mpsc::Receiver<WorkerResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &worker_requests).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = worker_responses.recv() => {
                let should_redraw = handle_worker_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    worker_requests: &mpsc::Sender<WorkerRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let _ = worker_requests.send(WorkerRequest::LoadRoster).await;
            let _ = worker_requests.send(WorkerRequest::ListBrackets).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, worker_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_worker_response(
    response: WorkerResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    if let WorkerResponse::LoadingStateChanged { loading_state } = response {
        *loading = loading_state;
        return true;
    }

    let mut guard = app.lock().await;
    match response {
        WorkerResponse::LoadingStateChanged { .. } => {}
        WorkerResponse::RosterLoaded { roster } => guard.on_roster_loaded(roster),
        WorkerResponse::BracketsListed { brackets } => guard.on_brackets_listed(brackets),
        WorkerResponse::BracketSaved { bracket } => guard.on_bracket_saved(bracket),
        WorkerResponse::BracketLoaded { bracket } => guard.on_bracket_loaded(bracket),
        WorkerResponse::BracketDeleted { bracket_id } => guard.on_bracket_deleted(bracket_id),
        WorkerResponse::BracketExported { path } => guard.on_bracket_exported(path),
        WorkerResponse::Error { message } => {
            error!("Storage error: {message}");
            guard.on_error(message);
        }
    }
    true
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) if key_event.kind == crossterm_event::KeyEventKind::Press => {
                    Some(UiEvent::KeyPressed(key_event))
                }
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Best effort: also runs from the panic hook, where there is nowhere to
/// report a failure.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
