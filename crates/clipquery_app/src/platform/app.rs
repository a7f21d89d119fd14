use std::io::{self, BufRead, Write};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use clipquery_core::{update, AppState, AppViewModel, JobPhase, Msg};
use clipquery_engine::{EngineHandle, ReqwestApiClient};
use clipquery_logging::{cq_debug, cq_info};

use super::cli::{Cli, Command};
use super::config::AppConfig;
use super::effects::EffectRunner;
use super::logging;
use super::ui::commands::{parse_line, to_msgs, LineCommand, HELP};
use super::ui::render::render;

const PUMP_INTERVAL: Duration = Duration::from_millis(200);
const INPUT_INTERVAL: Duration = Duration::from_millis(50);

pub fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::initialize(&cli.global);

    if let Some(Command::InitConfig { path, force }) = &cli.command {
        AppConfig::write_default(path, *force)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let config = AppConfig::load(&cli.global)?;
    cq_info!("Using backend {}", config.api_base_url);
    let client = ReqwestApiClient::new(&config.client_settings())
        .with_context(|| format!("configuring backend client for {}", config.api_base_url))?;
    let engine = EngineHandle::new(Arc::new(client), config.poll_settings())
        .context("starting request engine")?;

    let stdout = io::stdout();
    let mut controller = Controller::new(EffectRunner::new(engine), stdout.lock());

    match cli.command {
        Some(Command::Ask {
            url,
            questions,
            keep_session,
        }) => run_ask(&mut controller, &url, &questions, keep_session),
        Some(Command::Interactive) | Some(Command::InitConfig { .. }) | None => {
            run_interactive(&mut controller)
        }
    }
}

/// Owns the controller state and feeds it messages, one at a time.
pub(crate) struct Controller<W: Write> {
    state: AppState,
    runner: EffectRunner,
    out: W,
    last_frame: Vec<String>,
}

impl<W: Write> Controller<W> {
    pub(crate) fn new(runner: EffectRunner, out: W) -> Self {
        Self {
            state: AppState::new(),
            runner,
            out,
            last_frame: Vec::new(),
        }
    }

    pub(crate) fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub(crate) fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        cq_debug!("Dispatch {:?}", msg);
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
        self.present()
    }

    /// Waits up to `timeout` for engine results and applies all that arrived.
    pub(crate) fn pump(&mut self, timeout: Duration) -> io::Result<bool> {
        let Some(msg) = self.runner.recv_timeout(timeout) else {
            return Ok(false);
        };
        self.dispatch(msg)?;
        while let Some(msg) = self.runner.try_recv() {
            self.dispatch(msg)?;
        }
        Ok(true)
    }

    pub(crate) fn wait_until(&mut self, done: impl Fn(&AppViewModel) -> bool) -> io::Result<()> {
        while !done(&self.state.view()) {
            self.pump(PUMP_INTERVAL)?;
        }
        Ok(())
    }

    /// True while a start, poll, query or stop is outstanding.
    pub(crate) fn is_busy(&self) -> bool {
        let view = self.state.view();
        view.phase != JobPhase::Idle || !view.query_enabled || view.stop_pending
    }

    pub(crate) fn redraw(&mut self) -> io::Result<()> {
        self.last_frame.clear();
        let frame = render(&self.state.view());
        self.print_frame(frame)
    }

    pub(crate) fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    fn present(&mut self) -> io::Result<()> {
        if !self.state.consume_dirty() {
            return Ok(());
        }
        let view = self.state.view();
        if let Some(alert) = &view.alert {
            writeln!(self.out, "{} ! {}", timestamp(), alert)?;
            let state = std::mem::take(&mut self.state);
            let (mut state, _) = update(state, Msg::AlertDismissed);
            state.consume_dirty();
            self.state = state;
        }
        self.print_frame(render(&view))
    }

    /// Prints the lines that differ from the previous frame.
    fn print_frame(&mut self, frame: Vec<String>) -> io::Result<()> {
        for line in &frame {
            if !self.last_frame.contains(line) {
                writeln!(self.out, "{} {}", timestamp(), line)?;
            }
        }
        self.last_frame = frame;
        self.out.flush()
    }

    #[cfg(test)]
    pub(crate) fn into_output(self) -> W {
        self.out
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Processes `url`, asks every question, then stops the session unless asked to keep it.
pub(crate) fn run_ask<W: Write>(
    controller: &mut Controller<W>,
    url: &str,
    questions: &[String],
    keep_session: bool,
) -> Result<()> {
    controller.dispatch(Msg::UrlInputChanged(url.to_string()))?;
    controller.dispatch(Msg::StartClicked)?;
    if controller.view().phase == JobPhase::Idle {
        bail!("no job was started");
    }

    controller.wait_until(|view| view.phase == JobPhase::Idle)?;
    let view = controller.view();
    let Some(session_id) = view.session_id.clone() else {
        bail!("video processing did not finish: {}", view.status_text);
    };

    for question in questions {
        controller.dispatch(Msg::QueryInputChanged(question.clone()))?;
        controller.dispatch(Msg::QueryClicked)?;
        controller.wait_until(|view| view.query_enabled)?;
    }

    if keep_session {
        controller.say(&format!("Session {session_id} left running."))?;
        return Ok(());
    }

    controller.dispatch(Msg::StopClicked)?;
    controller.wait_until(|view| !view.stop_pending)?;
    Ok(())
}

fn run_interactive<W: Write>(controller: &mut Controller<W>) -> Result<()> {
    let (line_tx, line_rx) = mpsc::channel::<String>();
    thread::Builder::new()
        .name("clipquery-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("starting input reader")?;

    controller.say(HELP)?;
    controller.redraw()?;
    loop {
        while controller.pump(Duration::ZERO)? {}

        match line_rx.recv_timeout(INPUT_INTERVAL) {
            Ok(line) => match parse_line(&line) {
                LineCommand::Quit => break,
                LineCommand::Help => controller.say(HELP)?,
                LineCommand::Status => controller.redraw()?,
                LineCommand::Unknown(word) => {
                    controller.say(&format!("Unknown command '{word}'. Type 'help'."))?
                }
                command => {
                    for msg in to_msgs(command) {
                        controller.dispatch(msg)?;
                    }
                }
            },
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                // Input closed: let outstanding requests finish before exiting.
                while controller.is_busy() {
                    controller.pump(PUMP_INTERVAL)?;
                }
                break;
            }
        }
    }
    Ok(())
}
