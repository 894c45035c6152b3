//! # Shared Session
//!
//! A `GameState` behind an async mutex, for hosts where input handling and
//! the level-clear timer run as separate tasks.
//!
//! Every access goes through the one lock. Whenever the state has a pending
//! level-clear transition, a timer task waits out the dwell and then completes
//! it with its ticket. That covers a move that clears a level as well as a
//! level that arrives with no gold. Restarting aborts the task, and the ticket
//! would be stale anyway.

use crate::{config, Direction, GameState, MoveOutcome, StateSnapshot, TransitionTicket, TurnReport};
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Runtime options for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Seed for level generation and monster movement
    pub seed: u64,
    /// How long a cleared level stays up before the next one starts
    pub dwell: Duration,
}

impl SessionConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            dwell: config::LEVEL_CLEAR_DWELL,
        }
    }

    pub fn with_dwell(mut self, dwell: Duration) -> Self {
        self.dwell = dwell;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// Cloneable handle to one shared game session.
#[derive(Clone)]
pub struct SharedSession {
    state: Arc<Mutex<GameState>>,
    timer: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SharedSession {
    /// Starts a session at level 1.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn new(config: SessionConfig) -> Self {
        Self::from_state(GameState::with_dwell(config.seed, config.dwell)).await
    }

    /// Wraps an existing state, e.g. one built from a hand-made level.
    ///
    /// A state that is already waiting on a level-clear transition gets its
    /// dwell timer straight away.
    pub async fn from_state(state: GameState) -> Self {
        let session = Self {
            state: Arc::new(Mutex::new(state)),
            timer: Arc::new(Mutex::new(None)),
        };
        session.arm_pending_transition().await;
        session
    }

    /// Resolves a move and, if it cleared the level, arms the dwell timer.
    pub async fn resolve_move(&self, direction: Direction) -> TurnReport {
        let report = self.state.lock().await.resolve_move(direction);

        if report.outcome == MoveOutcome::LevelCleared {
            self.arm_pending_transition().await;
        }

        report
    }

    /// Starts a dwell timer for the state's pending transition, if it has one.
    async fn arm_pending_transition(&self) {
        let pending = {
            let state = self.state.lock().await;
            let dwell = state.dwell();
            state.pending_transition().map(|ticket| (ticket, dwell))
        };

        if let Some((ticket, dwell)) = pending {
            self.schedule_transition(ticket, dwell).await;
        }
    }

    async fn schedule_transition(&self, ticket: TransitionTicket, dwell: Duration) {
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            let mut ticket = ticket;
            loop {
                tokio::time::sleep(dwell).await;

                let mut guard = state.lock().await;
                let completed = guard.complete_transition(ticket);
                debug!(
                    "Dwell elapsed for level {}; transition {}",
                    ticket.depth(),
                    if completed { "completed" } else { "was stale" }
                );

                // The next level may itself arrive with nothing to collect
                match guard.pending_transition() {
                    Some(next) if completed => ticket = next,
                    _ => break,
                }
            }
        });

        if let Some(previous) = self.timer.lock().await.replace(handle) {
            previous.abort();
        }
    }

    /// Cancels any pending transition and starts over at level 1.
    pub async fn restart(&self) {
        if let Some(pending) = self.timer.lock().await.take() {
            pending.abort();
        }
        self.state.lock().await.restart();
        self.arm_pending_transition().await;
    }

    /// Captures the current state for rendering.
    pub async fn snapshot(&self) -> StateSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Runs a read-only closure against the state.
    pub async fn with_state<R>(&self, read: impl FnOnce(&GameState) -> R) -> R {
        read(&*self.state.lock().await)
    }
}
