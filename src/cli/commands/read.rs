//! Interactive reading session.
//!
//! One task drives everything: a tick interval pumps playback events into
//! the sync engine, stdin lines become commands, and at most one assistant
//! question is awaited alongside them.

use super::{build_assistant, chapter_end, load_chapter};
use crate::assistant::AssistantClient;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{OutputKind, Settings};
use crate::playback::{
    create_output, AudioOutput, AudioSourceRef, FilePicker, PlaybackController, ToggleOutcome,
};
use crate::shell::{view, ReaderCommand, ReaderShell};
use crate::sync::SyncEngine;
use anyhow::Result;
use console::style;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use indicatif::ProgressBar;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Segments shown on each side of the active one.
const WINDOW_RADIUS: usize = 2;

/// Picker that asks for a path on the next input line.
#[derive(Debug, Default)]
struct LinePicker {
    pending: bool,
}

impl FilePicker for LinePicker {
    fn request_file(&mut self) {
        self.pending = true;
    }
}

/// What the loop does after a line.
#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

/// Everything the session mutates between suspension points.
struct Session<O: AudioOutput> {
    controller: PlaybackController<O>,
    shell: ReaderShell,
    client: AssistantClient,
    picker: LinePicker,
    bar: ProgressBar,
    in_flight: Option<LocalBoxFuture<'static, String>>,
}

/// Run the read command.
pub async fn run_read(
    audio: Option<String>,
    chapter: Option<String>,
    no_audio: bool,
    output: Option<OutputKind>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(kind) = output {
        settings.playback.output = kind;
    }

    if let Err(e) = preflight::check(Operation::Read, &settings.assistant) {
        Output::warning(&format!("{}", e));
        Output::info("Reading works without it; the guide will reply with a fallback message.");
    }

    let chapter = load_chapter(chapter.as_deref(), &settings)?;
    let (client, prompts) = build_assistant(&settings, &chapter)?;
    let duration = chapter_end(&chapter, &settings);

    let output = create_output(&settings.playback, duration)?;
    let mut controller = PlaybackController::new(output, &chapter.title, &settings.playback);

    let source = if no_audio {
        None
    } else {
        audio
            .or_else(|| settings.playback.audio_source.clone())
            .filter(|s| !s.trim().is_empty())
            .map(|s| AudioSourceRef::parse(&s))
    };
    controller.load(source).await;

    println!("{}", view::header(&chapter));

    let shell = ReaderShell::new(
        chapter,
        SyncEngine::new(settings.playback.sync_tolerance_seconds),
        &prompts.greeting,
    );

    let mut session = Session {
        controller,
        shell,
        client,
        picker: LinePicker::default(),
        bar: Output::player_bar(duration),
        in_flight: None,
    };

    session.say(&format!(
        "{}",
        style("Press Enter to play or pause. Type 'help' for commands.").dim()
    ));
    session.print_window();
    session.refresh();

    session
        .run(Duration::from_millis(settings.playback.tick_interval_ms.max(10)))
        .await?;

    session.bar.finish_and_clear();
    Output::info("Goodbye!");
    Ok(())
}

impl<O: AudioOutput> Session<O> {
    async fn run(&mut self, tick: Duration) -> Result<()> {
        let mut ticker = tokio::time::interval(tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh();
                }

                reply = async {
                    match self.in_flight.as_mut() {
                        Some(pending) => pending.await,
                        None => std::future::pending().await,
                    }
                }, if self.in_flight.is_some() => {
                    self.in_flight = None;
                    self.shell.finish_send(reply);
                    if let Some(message) = self.shell.conversation().last() {
                        self.say(&view::message(message));
                    }
                }

                line = lines.next_line() => {
                    match line? {
                        Some(line) => {
                            if self.handle_line(&line).await == Flow::Quit {
                                break;
                            }
                            self.refresh();
                        }
                        None => {
                            debug!("stdin closed");
                            break;
                        }
                    }
                }

                _ = &mut ctrl_c => {
                    info!("Interrupted");
                    break;
                }
            }
        }

        if self.in_flight.take().is_some() {
            debug!("Dropping unanswered question");
        }
        Ok(())
    }

    /// Drain playback events, move the highlight and redraw the player bar.
    fn refresh(&mut self) {
        let mut scrolled = false;
        for position in self.controller.pump() {
            if self.shell.on_position(position).is_some() {
                scrolled = true;
            }
        }
        if scrolled {
            self.print_window();
        }

        let state = self.controller.state();
        Output::update_player_bar(&self.bar, state.current_time, state.duration);
        self.bar
            .set_message(view::player_message(state, &self.controller.status_line()));
    }

    async fn handle_line(&mut self, line: &str) -> Flow {
        if self.picker.pending {
            self.picker.pending = false;
            let path = line.trim();
            if path.is_empty() {
                self.say(&format!("{}", style("No file selected.").dim()));
            } else {
                self.open_file(path).await;
            }
            return Flow::Continue;
        }

        let command = match ReaderCommand::parse(line, self.shell.is_panel_open()) {
            Ok(command) => command,
            Err(e) => {
                self.say(&format!("{}", style(e).yellow()));
                return Flow::Continue;
            }
        };

        match command {
            ReaderCommand::TogglePlay => match self.controller.toggle_play(&mut self.picker).await {
                ToggleOutcome::FilePickerRequested => self.prompt_for_file(),
                ToggleOutcome::Failed => {
                    let status = self.controller.status_line();
                    self.say(&format!("{}", style(status).red()));
                }
                ToggleOutcome::Playing | ToggleOutcome::Paused => {}
            },
            ReaderCommand::Seek(seconds) => {
                let target = self.controller.seek(seconds);
                debug!("Seek to {:.2}s", target);
            }
            ReaderCommand::Volume(volume) => {
                self.controller.set_volume(volume);
            }
            ReaderCommand::Open(Some(path)) => self.open_file(&path).await,
            ReaderCommand::Open(None) => {
                self.picker.request_file();
                self.prompt_for_file();
            }
            ReaderCommand::ToggleChat => {
                let open = self.shell.toggle_panel();
                self.say(&view::panel_banner(open));
                if open {
                    let lines: Vec<String> =
                        self.shell.conversation().iter().map(view::message).collect();
                    for line in lines {
                        self.say(&line);
                    }
                }
            }
            ReaderCommand::Ask(question) => self.ask(question),
            ReaderCommand::Text => self.print_window(),
            ReaderCommand::Status => {
                let status = self.controller.status_line();
                let source = self
                    .controller
                    .state()
                    .source
                    .as_ref()
                    .map(|s| s.label())
                    .unwrap_or_else(|| "none".to_string());
                let report = view::status_report(&status, &source, self.shell.active_segment());
                self.say(&report);
            }
            ReaderCommand::Help => self.say(view::help().trim_end()),
            ReaderCommand::Quit => return Flow::Quit,
        }

        Flow::Continue
    }

    /// Queue a question unless one is already being answered.
    fn ask(&mut self, question: String) {
        if self.shell.is_loading() {
            self.say(&format!(
                "{}",
                style("Still waiting for the previous answer.").dim()
            ));
            return;
        }

        self.shell.set_input(question);
        let Some(pending) = self.shell.begin_send() else {
            return;
        };

        if let Some(message) = self.shell.conversation().last() {
            self.say(&view::message(message));
        }
        self.say(&format!("{}", style("The guide is thinking...").dim()));

        self.in_flight = Some(
            self.client
                .clone()
                .ask_owned(pending.question, pending.prior_turns)
                .boxed_local(),
        );
    }

    async fn open_file(&mut self, input: &str) {
        let path = Settings::expand_path(input);
        match self.controller.select_local_file(&path).await {
            Ok(()) => {
                let status = self.controller.status_line();
                self.say(&status);
            }
            Err(e) => self.say(&format!("{}", style(e).yellow())),
        }
    }

    fn prompt_for_file(&self) {
        self.say(&format!(
            "{}",
            style("Enter the path to a local audio file (empty line cancels):").cyan()
        ));
    }

    fn print_window(&self) {
        self.say("");
        for line in view::segment_window(self.shell.chapter(), self.shell.active_id(), WINDOW_RADIUS) {
            self.say(&line);
        }
    }

    fn say(&self, line: &str) {
        self.bar.println(line);
    }
}
