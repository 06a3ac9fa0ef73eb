//! Timer-driven shell around the game engine
//!
//! The scheduler owns the engine and runs a single `tokio::select!` loop over
//! player input and three triggers:
//!
//! - movement, with a period equal to the current speed, while playing
//! - a one-second clock for the timer and boost expiry, while playing
//! - a one-second countdown, during the countdown phase
//!
//! After every transition the triggers are reconciled with the new phase and
//! speed, and a snapshot is published on a `watch` channel.

use anyhow::Result;
use log::debug;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::game::{Action, GameEngine, GameSnapshot, Phase, StepResult};

const SECOND: Duration = Duration::from_secs(1);

/// Input accepted by the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellInput {
    Action(Action),
    Quit,
}

impl From<Action> for ShellInput {
    fn from(action: Action) -> Self {
        ShellInput::Action(action)
    }
}

pub struct Scheduler {
    engine: GameEngine,
    snapshots: watch::Sender<GameSnapshot>,
    movement: Option<Interval>,
    clock: Option<Interval>,
    countdown: Option<Interval>,
}

impl Scheduler {
    /// Wrap `engine`; the receiver sees a snapshot after every transition
    pub fn new(engine: GameEngine) -> (Self, watch::Receiver<GameSnapshot>) {
        let (snapshots, receiver) = watch::channel(engine.snapshot());
        let scheduler = Self {
            engine,
            snapshots,
            movement: None,
            clock: None,
            countdown: None,
        };
        (scheduler, receiver)
    }

    /// Drive the game until `Quit` arrives or every input sender is dropped.
    /// Returns the last snapshot.
    pub async fn run(mut self, mut inputs: mpsc::Receiver<ShellInput>) -> Result<GameSnapshot> {
        self.sync_timers();

        loop {
            tokio::select! {
                maybe_input = inputs.recv() => {
                    match maybe_input {
                        Some(ShellInput::Action(action)) => {
                            self.transition(|engine| engine.apply(action));
                        }
                        Some(ShellInput::Quit) | None => break,
                    }
                }

                _ = next_tick(&mut self.movement) => {
                    self.transition(GameEngine::movement_tick);
                }

                _ = next_tick(&mut self.clock) => {
                    self.transition(GameEngine::clock_tick);
                }

                _ = next_tick(&mut self.countdown) => {
                    self.transition(GameEngine::countdown_tick);
                }
            }
        }

        debug!("Scheduler stopped");
        Ok(self.engine.snapshot())
    }

    /// Apply one engine transition, then reschedule and publish
    fn transition(&mut self, step: impl FnOnce(&mut GameEngine) -> StepResult) {
        let result = step(&mut self.engine);
        if result.is_ignored() {
            return;
        }

        self.sync_timers();
        self.snapshots.send_replace(self.engine.snapshot());
    }

    /// Bring the triggers in line with the engine's phase and speed.
    ///
    /// A changed speed replaces the movement interval outright, so at most one
    /// movement interval ever exists.
    fn sync_timers(&mut self) {
        let phase = self.engine.phase();
        let playing = phase == Phase::Playing;

        let wanted = playing.then(|| Duration::from_millis(self.engine.speed_ms()));
        let current = self.movement.as_ref().map(Interval::period);
        if wanted != current {
            debug!("Movement period {:?} -> {:?}", current, wanted);
            self.movement = None;
            self.movement = wanted.map(periodic);
        }

        toggle(&mut self.clock, playing);
        toggle(&mut self.countdown, phase == Phase::Countdown);
    }

    /// Current movement period, if the movement trigger is armed
    pub fn movement_period(&self) -> Option<Duration> {
        self.movement.as_ref().map(Interval::period)
    }
}

/// Interval whose first tick is one full period away
fn periodic(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

fn toggle(timer: &mut Option<Interval>, active: bool) {
    match (active, timer.is_some()) {
        (true, false) => *timer = Some(periodic(SECOND)),
        (false, true) => *timer = None,
        _ => {}
    }
}

/// Wait for the next tick of an armed timer; a disarmed one never fires
async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
