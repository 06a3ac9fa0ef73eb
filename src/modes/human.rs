use anyhow::{Context, Result};
use crossterm::{
    cursor::MoveToColumn,
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute, queue,
    style::Print,
    terminal::{self, disable_raw_mode, enable_raw_mode, Clear, ClearType},
};
use futures::StreamExt;
use log::info;
use std::io::{self, stderr, Stderr, Write};
use tokio::sync::mpsc;

use super::scheduler::{Scheduler, ShellInput};
use super::trace::SnapshotTrace;
use crate::game::{Action, GameEngine, GameSnapshot, Phase};
use crate::input::{InputHandler, KeyAction};

/// Terminal front-end: keyboard and mouse in, one status line out
pub struct HumanMode {
    engine: GameEngine,
    player_name: String,
    trace: Option<SnapshotTrace>,
    input_handler: InputHandler,
}

impl HumanMode {
    pub fn new(engine: GameEngine, player_name: String) -> Self {
        Self {
            engine,
            player_name,
            trace: None,
            input_handler: InputHandler::new(),
        }
    }

    /// Also record every snapshot to `trace`
    pub fn with_trace(mut self, trace: SnapshotTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Play until the player quits. Returns the final snapshot.
    pub async fn run(self) -> Result<GameSnapshot> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnableMouseCapture).context("Failed to enable mouse capture")?;

        let result = self.run_session(&mut stderr).await;

        // Cleanup terminal
        cleanup_terminal(&mut stderr)?;

        result
    }

    async fn run_session(self, out: &mut Stderr) -> Result<GameSnapshot> {
        let HumanMode {
            engine,
            player_name,
            mut trace,
            input_handler,
        } = self;

        let (scheduler, mut snapshots) = Scheduler::new(engine);
        let (inputs, receiver) = mpsc::channel(64);
        let shell = tokio::spawn(scheduler.run(receiver));

        // Name entry happens before the session starts
        inputs
            .send(Action::ConfirmName(player_name).into())
            .await
            .context("Scheduler stopped before the game began")?;

        let mut event_stream = EventStream::new();

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match next_step(&input_handler, maybe_event)? {
                        Step::Forward(input) => {
                            if inputs.send(input).await.is_err() {
                                break;
                            }
                        }
                        Step::Skip => {}
                        Step::Stop => break,
                    }
                }

                // Redraw on every published snapshot
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = snapshots.borrow_and_update().clone();
                    draw_status(out, &snapshot)?;
                    if let Some(trace) = trace.as_mut() {
                        trace.record(&snapshot)?;
                    }
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        // Closing the channel stops the scheduler
        drop(inputs);
        let last = shell.await.context("Scheduler task failed")??;
        info!(
            "Session ended in {:?} with {} fruits",
            last.phase, last.fruits_eaten
        );
        Ok(last)
    }
}

/// What the session does with one item from the terminal event stream
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Forward(ShellInput),
    Skip,
    Stop,
}

/// Map a terminal event to scheduler input. A closed stream or a quit key
/// ends the session; unreadable events are skipped.
fn next_step(handler: &InputHandler, maybe_event: Option<io::Result<Event>>) -> Result<Step> {
    let event = match maybe_event {
        Some(Ok(event)) => event,
        Some(Err(_)) => return Ok(Step::Skip),
        None => return Ok(Step::Stop),
    };

    let action = match event {
        // Only process key press events, not release
        Event::Key(key) if key.kind == KeyEventKind::Press => handler.handle_key_event(key),
        Event::Mouse(mouse) => {
            let size = terminal::size().context("Failed to read terminal size")?;
            handler.handle_mouse_event(mouse, size)
        }
        _ => KeyAction::None,
    };

    Ok(match action {
        KeyAction::GameAction(action) => Step::Forward(ShellInput::Action(action)),
        KeyAction::Quit => Step::Stop,
        KeyAction::None => Step::Skip,
    })
}

/// One-line summary of a snapshot
pub fn status_line(snapshot: &GameSnapshot) -> String {
    let name = snapshot.player_name.as_deref().unwrap_or("-");

    match snapshot.phase {
        Phase::NameEntry => format!("{} | waiting for a name", name),
        Phase::Countdown => format!("{} | starting in {}s", name, snapshot.countdown_remaining),
        Phase::Playing => {
            let mut line = format!(
                "{} | lives {} | fruits {} | {} | {}ms",
                name,
                snapshot.lives,
                snapshot.fruits_eaten,
                snapshot.format_time(),
                snapshot.speed_ms
            );
            if snapshot.boost_active {
                line.push_str(" | BOOST");
            }
            line
        }
        Phase::GameOver => format!(
            "{} | GAME OVER | fruits {} | {} | r to restart, q to quit",
            name,
            snapshot.fruits_eaten,
            snapshot.format_time()
        ),
    }
}

fn draw_status(out: &mut impl Write, snapshot: &GameSnapshot) -> Result<()> {
    queue!(
        out,
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(status_line(snapshot))
    )
    .context("Failed to draw status line")?;
    out.flush().context("Failed to flush terminal")?;
    Ok(())
}

fn cleanup_terminal(out: &mut Stderr) -> Result<()> {
    execute!(out, DisableMouseCapture, Print("\r\n")).context("Failed to release mouse")?;
    disable_raw_mode().context("Failed to disable raw mode")?;
    Ok(())
}
