use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use engine_logging::{engine_info, engine_warn};
use transcoder_core::{update, AppState, Msg, SessionPhase};
use transcoder_engine::BlobUrl;

use super::cli::Cli;
use super::config;
use super::effects::EffectRunner;
use super::logging;
use super::ui::commands::{parse_command, read_input_file, ParseError, UserCommand};
use super::ui::constants::PROMPT_HINT;
use super::ui::render::render;

/// Render/poll cadence; progress bursts are coalesced into one frame per tick.
const TICK_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    let mut config = config::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    logging::initialize(config.log_destination, config.log_level);
    engine_info!(
        "Starting transcoder: engine {} from {}, output dir {:?}",
        config.engine_version,
        config.distribution_base_url,
        config.output_dir
    );

    let runner = EffectRunner::new(&config).context("failed to start engine worker")?;
    let (line_tx, line_rx) = mpsc::channel::<String>();
    spawn_stdin_reader(line_tx);

    let mut session = Session::new(runner, cli.input);
    print_lines(&[PROMPT_HINT.to_string()]);
    session.dispatch(Msg::SessionStarted);

    let mut input_open = true;
    loop {
        for msg in session.runner.poll_engine() {
            session.dispatch(msg);
        }
        session.select_pending_input();
        session.render_if_needed();

        if !input_open {
            // Stdin is gone: finish whatever is in flight, then leave.
            if session.is_idle() {
                break;
            }
            thread::sleep(TICK_INTERVAL);
            session.dispatch(Msg::Tick);
            continue;
        }

        match line_rx.recv_timeout(TICK_INTERVAL) {
            Ok(line) => {
                if session.handle_line(&line) == Flow::Quit {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => session.dispatch(Msg::Tick),
            Err(RecvTimeoutError::Disconnected) => input_open = false,
        }
    }

    session.dispatch(Msg::Teardown);
    session.render_if_needed();
    engine_info!(
        "Session ended; {} download(s) saved",
        session.runner.saved_paths().len()
    );
    session.runner.shutdown();
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct Session {
    state: AppState,
    runner: EffectRunner,
    pending_input: Option<PathBuf>,
    needs_render: bool,
}

impl Session {
    fn new(runner: EffectRunner, pending_input: Option<PathBuf>) -> Self {
        Self {
            state: AppState::new(),
            runner,
            pending_input,
            needs_render: false,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.needs_render |= state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);
    }

    fn render_if_needed(&mut self) {
        if !std::mem::take(&mut self.needs_render) {
            return;
        }
        let view = self.state.view();
        let preview_url = view
            .preview
            .and_then(|binding| self.runner.preview_url(binding.id))
            .map(BlobUrl::as_str);
        print_lines(&render(&view, preview_url));
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        let command = parse_command(line);
        if self.state.phase() == SessionPhase::Transcoding {
            if let Ok(rejected @ (UserCommand::Open(_)
            | UserCommand::Action
            | UserCommand::Transcode
            | UserCommand::Download)) = &command
            {
                engine_warn!("Ignoring {:?} while a transcode is in flight", rejected);
            }
        }
        match command {
            Ok(UserCommand::Quit) => return Flow::Quit,
            Ok(UserCommand::Open(path)) => self.open(path),
            Ok(UserCommand::Status) => self.needs_render = true,
            Ok(UserCommand::Help) => print_lines(&[PROMPT_HINT.to_string()]),
            Ok(command) => {
                if let Some(msg) = command.as_msg() {
                    self.dispatch(msg);
                }
            }
            Err(ParseError::Empty) => {}
            Err(ParseError::MissingPath) => print_lines(&["usage: open <path>".to_string()]),
            Err(ParseError::Unknown(word)) => {
                print_lines(&[format!("unknown command {word:?}"), PROMPT_HINT.to_string()])
            }
        }
        Flow::Continue
    }

    fn open(&mut self, path: PathBuf) {
        if self.state.phase() == SessionPhase::Bootstrapping {
            engine_info!("Engine still loading; {:?} will be opened once ready", path);
            self.pending_input = Some(path);
            return;
        }
        self.open_now(&path);
    }

    fn open_now(&mut self, path: &Path) {
        match read_input_file(path) {
            Ok(file) => {
                engine_info!(
                    "Selected {:?} ({} bytes, {:?})",
                    path,
                    file.bytes.len(),
                    file.media_type
                );
                self.dispatch(Msg::FileSelected(file));
            }
            Err(err) => {
                engine_warn!("Failed to read {:?}: {}", path, err);
                print_lines(&[format!("cannot open {}: {err}", path.display())]);
            }
        }
    }

    fn select_pending_input(&mut self) {
        let accepting = matches!(
            self.state.phase(),
            SessionPhase::Ready | SessionPhase::FileSelected | SessionPhase::Complete
        );
        if accepting {
            if let Some(path) = self.pending_input.take() {
                self.open_now(&path);
            }
        }
    }

    fn is_idle(&self) -> bool {
        match self.state.phase() {
            SessionPhase::Bootstrapping | SessionPhase::Transcoding => false,
            SessionPhase::Failed => true,
            SessionPhase::Ready | SessionPhase::FileSelected | SessionPhase::Complete => {
                self.pending_input.is_none()
            }
        }
    }
}

fn spawn_stdin_reader(tx: mpsc::Sender<String>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    engine_warn!("Stopped reading stdin: {}", err);
                    break;
                }
            }
        }
    });
}

fn print_lines(lines: &[String]) {
    let mut out = io::stdout().lock();
    for line in lines {
        let _ = writeln!(out, "{line}");
    }
    let _ = out.flush();
}
