//! Batched human confirmation of tool calls.
//!
//! A model step can issue several tool calls at once, and they reach the gate
//! concurrently. The first request that needs confirmation becomes the batch
//! *opener*: it waits a short grace window so siblings can join, shows every
//! pending request in a single prompt, and publishes the answer. Later
//! requests park on the batch's decision channel and inherit that answer.
//!
//! ```text
//!   request ─▶ classify ─▶ whitelisted / toggle off ─▶ allow
//!                 │
//!                 ▼
//!          join batch ──▶ opener?  ── yes ─▶ sleep(window) ─▶ prompt ─▶ publish
//!                            │
//!                            no ─▶ wait for published decision
//! ```
//!
//! Batch state is reset at the end of every tool round so the next round
//! prompts again.

pub mod policy;
pub mod prompt;

pub use policy::{classify_tool, ConfirmationSettings, ToolCategory, ToolInput, WhitelistConfig};
pub use prompt::{parse_answer, ConfirmationPrompter, PromptFeedback, TerminalPrompter};

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::ConfirmationDenied;

/// Tool-start notification delivered before any side effect happens.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolStart {
    pub tool_name: String,
    pub raw_input: ToolInput,
}

impl ToolStart {
    pub fn new(tool_name: impl Into<String>, raw_input: impl Into<ToolInput>) -> Self {
        Self {
            tool_name: tool_name.into(),
            raw_input: raw_input.into(),
        }
    }
}

/// Hook consulted by the agent loop around tool execution.
#[async_trait]
pub trait ToolGate: Send + Sync {
    /// Resolve once the call may run, or fail to block it.
    async fn on_tool_start(&self, event: &ToolStart) -> Result<(), ConfirmationDenied>;

    /// A tool round (or the whole turn) finished.
    fn on_turn_end(&self);
}

/// Gate that lets everything through. Used when confirmation is not wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

#[async_trait]
impl ToolGate for AllowAll {
    async fn on_tool_start(&self, _event: &ToolStart) -> Result<(), ConfirmationDenied> {
        Ok(())
    }

    fn on_turn_end(&self) {}
}

// ---------------------------------------------------------------------------
// Batch state
// ---------------------------------------------------------------------------

/// One request awaiting a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToolRequest {
    pub tool_name: String,
    pub category: ToolCategory,
    /// Resolved payload shown to the user.
    pub payload: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Unset,
    Approved,
    Denied,
}

impl Decision {
    fn into_result(self) -> Result<(), ConfirmationDenied> {
        match self {
            Self::Approved => Ok(()),
            Self::Unset | Self::Denied => Err(ConfirmationDenied),
        }
    }
}

/// Read-only view of the current batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSnapshot {
    pub pending: Vec<PendingToolRequest>,
    pub decision: Decision,
    pub prompt_already_shown: bool,
    pub prompt_in_progress: bool,
}

#[derive(Debug)]
struct BatchState {
    generation: u64,
    pending: Vec<PendingToolRequest>,
    decision: Decision,
    prompt_already_shown: bool,
    prompt_in_progress: bool,
    decision_tx: Arc<watch::Sender<Decision>>,
}

impl BatchState {
    fn new(generation: u64) -> Self {
        let (decision_tx, _) = watch::channel(Decision::Unset);
        Self {
            generation,
            pending: Vec::new(),
            decision: Decision::Unset,
            prompt_already_shown: false,
            prompt_in_progress: false,
            decision_tx: Arc::new(decision_tx),
        }
    }
}

enum BatchRole {
    Opener {
        generation: u64,
        decision_tx: Arc<watch::Sender<Decision>>,
    },
    Waiter(watch::Receiver<Decision>),
}

// ---------------------------------------------------------------------------
// ConfirmationGate
// ---------------------------------------------------------------------------

/// The batching [`ToolGate`] used by interactive sessions.
pub struct ConfirmationGate {
    settings: RwLock<ConfirmationSettings>,
    prompter: Arc<dyn ConfirmationPrompter>,
    batch: Mutex<BatchState>,
}

impl ConfirmationGate {
    pub fn new(settings: ConfirmationSettings, prompter: Arc<dyn ConfirmationPrompter>) -> Self {
        Self {
            settings: RwLock::new(settings),
            prompter,
            batch: Mutex::new(BatchState::new(0)),
        }
    }

    /// Current settings (a copy).
    pub fn settings(&self) -> ConfirmationSettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mutate settings in place; takes effect for the next request.
    pub fn update_settings<R>(&self, f: impl FnOnce(&mut ConfirmationSettings) -> R) -> R {
        let mut guard = self
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn batch_snapshot(&self) -> BatchSnapshot {
        let batch = self.lock_batch();
        BatchSnapshot {
            pending: batch.pending.clone(),
            decision: batch.decision,
            prompt_already_shown: batch.prompt_already_shown,
            prompt_in_progress: batch.prompt_in_progress,
        }
    }

    fn lock_batch(&self) -> MutexGuard<'_, BatchState> {
        self.batch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append to the batch and decide, atomically, whether this caller opens it.
    fn join_batch(&self, request: PendingToolRequest) -> BatchRole {
        let mut batch = self.lock_batch();
        batch.pending.push(request);
        if batch.prompt_in_progress {
            BatchRole::Waiter(batch.decision_tx.subscribe())
        } else {
            batch.prompt_in_progress = true;
            BatchRole::Opener {
                generation: batch.generation,
                decision_tx: Arc::clone(&batch.decision_tx),
            }
        }
    }

    async fn open_batch(
        &self,
        own: PendingToolRequest,
        generation: u64,
        decision_tx: Arc<watch::Sender<Decision>>,
        settings: &ConfirmationSettings,
    ) -> Result<(), ConfirmationDenied> {
        let mut publisher = DecisionPublisher {
            gate: self,
            generation,
            decision_tx,
            published: false,
        };

        if !settings.batch_window.is_zero() {
            tokio::time::sleep(settings.batch_window).await;
        }

        let snapshot = {
            let mut batch = self.lock_batch();
            if batch.generation == generation {
                batch.prompt_already_shown = true;
                batch.pending.clone()
            } else {
                vec![own]
            }
        };
        info!(count = snapshot.len(), "requesting confirmation for tool batch");
        self.prompter.render_batch(&snapshot);

        let decision = loop {
            match self.prompter.read_answer().await {
                Ok(Some(line)) => match parse_answer(&line) {
                    Some(true) => break Decision::Approved,
                    Some(false) => break Decision::Denied,
                    None => self.prompter.acknowledge(PromptFeedback::Invalid),
                },
                Ok(None) => {
                    warn!("confirmation input closed; denying tool batch");
                    break Decision::Denied;
                }
                Err(err) => {
                    warn!(error = %err, "failed to read confirmation answer; denying tool batch");
                    break Decision::Denied;
                }
            }
        };

        self.prompter.acknowledge(match decision {
            Decision::Approved => PromptFeedback::Approved,
            _ => PromptFeedback::Denied,
        });
        publisher.publish(decision);
        decision.into_result()
    }
}

/// Publishes the opener's decision; publishes a denial if the opener is
/// dropped before answering so waiters never hang.
struct DecisionPublisher<'a> {
    gate: &'a ConfirmationGate,
    generation: u64,
    decision_tx: Arc<watch::Sender<Decision>>,
    published: bool,
}

impl DecisionPublisher<'_> {
    fn publish(&mut self, decision: Decision) {
        {
            let mut batch = self.gate.lock_batch();
            if batch.generation == self.generation {
                batch.decision = decision;
            }
        }
        self.decision_tx.send_replace(decision);
        self.published = true;
        debug!(?decision, generation = self.generation, "published batch decision");
    }
}

impl Drop for DecisionPublisher<'_> {
    fn drop(&mut self) {
        if !self.published {
            self.publish(Decision::Denied);
        }
    }
}

async fn wait_for_decision(mut rx: watch::Receiver<Decision>) -> Result<(), ConfirmationDenied> {
    let decision = match rx.wait_for(|d| *d != Decision::Unset).await {
        Ok(decision) => *decision,
        Err(_) => Decision::Denied,
    };
    decision.into_result()
}

#[async_trait]
impl ToolGate for ConfirmationGate {
    async fn on_tool_start(&self, event: &ToolStart) -> Result<(), ConfirmationDenied> {
        let settings = self.settings();
        let category = classify_tool(&event.tool_name);
        let payload = event.raw_input.resolve();

        if settings.is_whitelisted(category, &payload) {
            debug!(tool = %event.tool_name, command = %payload, "whitelisted; skipping confirmation");
            return Ok(());
        }
        if !settings.needs_confirmation(category) {
            return Ok(());
        }

        let request = PendingToolRequest {
            tool_name: event.tool_name.clone(),
            category,
            payload,
        };
        match self.join_batch(request.clone()) {
            BatchRole::Opener {
                generation,
                decision_tx,
            } => {
                self.open_batch(request, generation, decision_tx, &settings)
                    .await
            }
            BatchRole::Waiter(rx) => wait_for_decision(rx).await,
        }
    }

    fn on_turn_end(&self) {
        let mut batch = self.lock_batch();
        let next = batch.generation + 1;
        *batch = BatchState::new(next);
        debug!(generation = next, "confirmation batch reset");
    }
}
