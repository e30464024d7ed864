use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::Local;
use log::LevelFilter;
use portal_core::{update, AppState, Msg, UploadFormat};
use portal_engine::UploadBody;
use portal_logging::{parse_level, portal_info, portal_warn};

use super::config::PortalConfig;
use super::effects::EffectRunner;
use super::ui::commands::{interpret, ShellAction};
use super::ui::render::render;
use super::{logging, Args};

const TICK_INTERVAL: Duration = Duration::from_millis(75);
const PROMPT: &str = "portal> ";

/// Everything the dispatcher thread reacts to.
pub enum AppEvent {
    Msg(Msg),
    Input(String),
    InputClosed,
}

pub fn run_app(args: Args) -> anyhow::Result<()> {
    let mut config = PortalConfig::load(&args.config)?;
    config.apply_env(|key| std::env::var(key).ok());
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }

    let level_name = args.log_level.as_deref().unwrap_or(&config.log_level);
    let level = parse_level(level_name).unwrap_or(LevelFilter::Info);
    logging::initialize(args.log, level);
    portal_info!(
        "Starting portal shell config={:?} output_dir={:?} webhook_configured={}",
        args.config,
        config.output_dir,
        !config.webhook_url.is_empty()
    );

    let (app_tx, app_rx) = mpsc::channel::<AppEvent>();
    let effects = EffectRunner::new(&config, app_tx.clone())?;

    spawn_stdin_reader(app_tx.clone());
    // Background tick to coalesce rendering.
    thread::spawn(move || {
        while app_tx.send(AppEvent::Msg(Msg::Tick)).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    let mut dispatcher = Dispatcher {
        state: AppState::with_document_limit(config.documents.limit),
        effects,
    };
    let initial_format = match config.upload_format {
        UploadBody::Multipart => UploadFormat::Multipart,
        UploadBody::Json => UploadFormat::Json,
    };
    dispatcher.dispatch(Msg::UploadFormatChanged(initial_format));
    dispatcher.render_if_dirty();

    while let Ok(event) = app_rx.recv() {
        match event {
            AppEvent::Msg(Msg::Tick) => dispatcher.render_if_dirty(),
            AppEvent::Msg(msg) => dispatcher.dispatch(msg),
            AppEvent::Input(line) => {
                if dispatcher.handle_line(&line) == LineOutcome::Quit {
                    break;
                }
            }
            AppEvent::InputClosed => break,
        }
    }

    portal_info!("Portal shell exiting");
    Ok(())
}

fn spawn_stdin_reader(app_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if app_tx.send(AppEvent::Input(line)).is_err() {
                return;
            }
        }
        let _ = app_tx.send(AppEvent::InputClosed);
    });
}

#[derive(Debug, PartialEq, Eq)]
enum LineOutcome {
    Continue,
    Quit,
}

struct Dispatcher {
    state: AppState,
    effects: EffectRunner,
}

impl Dispatcher {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.effects.enqueue(effects);
    }

    fn handle_line(&mut self, line: &str) -> LineOutcome {
        match interpret(line, Local::now()) {
            Ok(None) => prompt(),
            Ok(Some(ShellAction::Quit)) => return LineOutcome::Quit,
            Ok(Some(ShellAction::Dispatch(msgs))) => {
                for msg in msgs {
                    self.dispatch(msg);
                }
                // An unchanged state would never render; keep the prompt visible.
                if !self.state.view().dirty {
                    prompt();
                }
            }
            Ok(Some(ShellAction::Download { number, method })) => {
                match self.state.reports().get(number - 1).map(|report| report.id) {
                    Some(report_id) => self.dispatch(Msg::DownloadClicked { report_id, method }),
                    None => {
                        portal_warn!("Download requested for missing report #{}", number);
                        print_text(&format!("[error] No report #{number}; see the Reports tab.\n"));
                        prompt();
                    }
                }
            }
            Err(text) => {
                print_text(&text);
                if !text.ends_with('\n') {
                    print_text("\n");
                }
                prompt();
            }
        }
        LineOutcome::Continue
    }

    fn render_if_dirty(&mut self) {
        if self.state.consume_dirty() {
            let view = self.state.view();
            print_text(&format!("\n{}", render(&view)));
            prompt();
        }
    }
}

fn prompt() {
    print_text(PROMPT);
}

fn print_text(text: &str) {
    let mut stdout = io::stdout().lock();
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
}
