//! Lifecycle owner for the refill and broadcast loops.
//!
//! [`Scheduler::start`] loads the registry and spawns three tasks:
//!
//! - refill: tops up the prefetch cache every `refill_interval`
//! - broadcast: reloads the registry, then fans one image out to every target
//!   every `broadcast_interval`
//! - feedback: drains reactions pushed through [`Scheduler::feedback_sender`]
//!
//! The periodic tasks wait for the readiness signal and verify the HTTP
//! session before their first tick. [`Scheduler::stop`] cancels all tasks,
//! closes the session and flushes the registry once.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::application::services::{FeedbackTracker, TargetRegistry};
use crate::application::use_cases::{BroadcastUseCase, RefillUseCase};
use crate::domain::entities::FeedbackEvent;
use crate::domain::ports::ImageSourcePort;

/// Default period between broadcast ticks.
pub const DEFAULT_BROADCAST_INTERVAL: Duration = Duration::from_secs(30);

/// Default period between refill ticks.
pub const DEFAULT_REFILL_INTERVAL: Duration = Duration::from_secs(60);

/// Scheduler lifecycle errors.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum SchedulerError {
    #[error("scheduler already started")]
    AlreadyStarted,

    #[error("scheduler has been stopped")]
    Stopped,
}

/// Tick periods for the two loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Period of the broadcast loop.
    pub broadcast_interval: Duration,
    /// Period of the refill loop.
    pub refill_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            broadcast_interval: DEFAULT_BROADCAST_INTERVAL,
            refill_interval: DEFAULT_REFILL_INTERVAL,
        }
    }
}

/// Owns every piece of mutable scheduling state and the tasks driving it.
pub struct Scheduler {
    config: SchedulerConfig,
    source: Arc<dyn ImageSourcePort>,
    registry: Arc<TargetRegistry>,
    refill: RefillUseCase,
    broadcast: BroadcastUseCase,
    feedback: Arc<FeedbackTracker>,
    feedback_tx: mpsc::UnboundedSender<FeedbackEvent>,
    feedback_rx: Mutex<Option<mpsc::UnboundedReceiver<FeedbackEvent>>>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    started: AtomicBool,
    stopped: AtomicBool,
}

impl Scheduler {
    /// Wires a scheduler from its collaborators.
    #[must_use]
    pub fn new(
        config: SchedulerConfig,
        source: Arc<dyn ImageSourcePort>,
        registry: Arc<TargetRegistry>,
        refill: RefillUseCase,
        broadcast: BroadcastUseCase,
        feedback: Arc<FeedbackTracker>,
    ) -> Self {
        let (feedback_tx, feedback_rx) = mpsc::unbounded_channel();
        Self {
            config,
            source,
            registry,
            refill,
            broadcast,
            feedback,
            feedback_tx,
            feedback_rx: Mutex::new(Some(feedback_rx)),
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }
    }

    /// Returns the registry shared with configuration front ends.
    #[must_use]
    pub fn registry(&self) -> Arc<TargetRegistry> {
        self.registry.clone()
    }

    /// Returns a sender the platform connection pushes reactions into.
    ///
    /// Nothing inside this crate produces reactions. Retraction only happens
    /// when an external gateway listener forwards its reaction events here.
    #[must_use]
    pub fn feedback_sender(&self) -> mpsc::UnboundedSender<FeedbackEvent> {
        self.feedback_tx.clone()
    }

    /// Returns whether `start` has run and `stop` has not.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::SeqCst) && !self.stopped.load(Ordering::SeqCst)
    }

    /// Opens the session, loads the registry and spawns the loops.
    ///
    /// The periodic loops hold off until `ready` reads `true`.
    ///
    /// # Errors
    /// Returns error if the scheduler was already started or stopped.
    pub async fn start(&self, ready: watch::Receiver<bool>) -> Result<(), SchedulerError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(SchedulerError::Stopped);
        }
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyStarted);
        }

        if let Err(e) = self.source.open().await {
            warn!(error = %e, "Image API session unavailable at startup");
        }
        self.registry.load().await;

        let refill = self.refill.clone();
        let refill_task = spawn_periodic(
            "refill",
            self.config.refill_interval,
            ready.clone(),
            self.source.clone(),
            self.cancel.clone(),
            move || {
                let refill = refill.clone();
                async move {
                    let _ = refill.execute().await;
                }
            },
        );

        let broadcast = self.broadcast.clone();
        let registry = self.registry.clone();
        let broadcast_task = spawn_periodic(
            "broadcast",
            self.config.broadcast_interval,
            ready,
            self.source.clone(),
            self.cancel.clone(),
            move || {
                let broadcast = broadcast.clone();
                let registry = registry.clone();
                async move {
                    registry.refresh().await;
                    let _ = broadcast.execute().await;
                }
            },
        );

        let mut tasks = self.tasks.lock();
        tasks.push(refill_task);
        tasks.push(broadcast_task);
        if let Some(rx) = self.feedback_rx.lock().take() {
            tasks.push(spawn_feedback(rx, self.feedback.clone(), self.cancel.clone()));
        }

        info!(
            broadcast_secs = self.config.broadcast_interval.as_secs(),
            refill_secs = self.config.refill_interval.as_secs(),
            "Scheduler started"
        );
        Ok(())
    }

    /// Cancels the loops, closes the session and flushes the registry.
    ///
    /// In-flight ticks are abandoned. Calling `stop` again is a no-op.
    pub async fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }

        self.cancel.cancel();
        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Scheduler task ended abnormally");
            }
        }

        self.source.close().await;
        self.registry.flush().await;
        info!("Scheduler stopped");
    }
}

fn spawn_periodic<F, Fut>(
    name: &'static str,
    period: Duration,
    mut ready: watch::Receiver<bool>,
    source: Arc<dyn ImageSourcePort>,
    cancel: CancellationToken,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            result = ready.wait_for(|ready| *ready) => {
                if result.is_err() {
                    debug!(task = name, "Readiness signal dropped before ready");
                    return;
                }
            }
        }

        if let Err(e) = source.open().await {
            error!(task = name, error = %e, "Image API session unavailable, task not started");
            return;
        }

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(task = name, "Periodic task running");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tick() => {}
            }
        }

        debug!(task = name, "Periodic task stopped");
    })
}

fn spawn_feedback(
    mut rx: mpsc::UnboundedReceiver<FeedbackEvent>,
    tracker: Arc<FeedbackTracker>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    let outcome = tracker.observe(&event).await;
                    debug!(message = %event.message, ?outcome, "Feedback observed");
                }
            }
        }
    })
}
