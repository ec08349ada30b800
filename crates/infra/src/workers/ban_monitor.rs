//! Background ban-status monitor for one client session.
//!
//! Re-runs the ban check on a fixed interval, on focus regained, and on every
//! route change. All triggers share one status; the latest started check
//! wins and results from superseded checks are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use jobgate_auth::{BanCheck, SessionHints};

use crate::backend::{ProfileDirectory, SessionSource};
use crate::ban_check::{BanCheckOutcome, check_ban_status_within};
use crate::config::GateConfig;
use crate::navigation::Navigator;

/// Monitor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanMonitorConfig {
    /// Fixed polling cadence.
    pub poll_interval: Duration,
    /// Bound on one check, and the window after which an unresolved status
    /// fails open.
    pub check_timeout: Duration,
}

impl Default for BanMonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            check_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&GateConfig> for BanMonitorConfig {
    fn from(config: &GateConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            check_timeout: config.check_timeout,
        }
    }
}

/// Collaborators the monitor reads from and acts through.
#[derive(Clone)]
pub struct BanMonitorDeps {
    pub sessions: Arc<dyn SessionSource>,
    pub profiles: Arc<dyn ProfileDirectory>,
    pub hints: Arc<dyn SessionHints + Send + Sync>,
    pub navigator: Arc<dyn Navigator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Trigger {
    Focus,
    RouteChanged(String),
}

impl Trigger {
    fn label(&self) -> &'static str {
        match self {
            Trigger::Focus => "focus",
            Trigger::RouteChanged(_) => "route",
        }
    }
}

struct Shared {
    config: BanMonitorConfig,
    deps: BanMonitorDeps,
    path: Mutex<String>,
    /// Generation of the most recently started check.
    latest: AtomicU64,
    status: watch::Sender<BanCheck>,
    /// `(path, target)` of the last navigation issued, so repeated checks on
    /// the same path do not navigate again.
    last_navigation: Mutex<Option<(String, &'static str)>>,
}

/// Spawns ban monitors.
#[derive(Debug)]
pub struct BanMonitor;

impl BanMonitor {
    /// Start monitoring at `initial_path`. The first check runs immediately.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(
        config: BanMonitorConfig,
        deps: BanMonitorDeps,
        initial_path: impl Into<String>,
    ) -> BanMonitorHandle {
        let (status_tx, status_rx) = watch::channel(BanCheck::Checking);
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let shared = Arc::new(Shared {
            config,
            deps,
            path: Mutex::new(initial_path.into()),
            latest: AtomicU64::new(0),
            status: status_tx,
            last_navigation: Mutex::new(None),
        });

        let join = tokio::spawn(monitor_loop(shared, trigger_rx, cancel.clone()));

        BanMonitorHandle {
            cancel,
            triggers: trigger_tx,
            status: status_rx,
            join: Some(join),
        }
    }
}

/// Handle to a running monitor. Dropping it stops the monitor.
#[derive(Debug)]
pub struct BanMonitorHandle {
    cancel: CancellationToken,
    triggers: mpsc::UnboundedSender<Trigger>,
    status: watch::Receiver<BanCheck>,
    join: Option<JoinHandle<()>>,
}

impl BanMonitorHandle {
    /// The routing layer moved to `path`; re-check immediately.
    pub fn route_changed(&self, path: impl Into<String>) {
        let _ = self.triggers.send(Trigger::RouteChanged(path.into()));
    }

    /// The window regained focus; re-check immediately.
    pub fn focus_gained(&self) {
        let _ = self.triggers.send(Trigger::Focus);
    }

    pub fn status(&self) -> BanCheck {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<BanCheck> {
        self.status.clone()
    }

    /// Stop the timer, drop the trigger subscription, abandon in-flight
    /// checks, and wait for the task to finish.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

impl Drop for BanMonitorHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn monitor_loop(
    shared: Arc<Shared>,
    mut triggers: mpsc::UnboundedReceiver<Trigger>,
    cancel: CancellationToken,
) {
    info!(path = %shared.current_path(), "ban monitor started");

    let mut interval = tokio::time::interval(shared.config.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            // The first tick completes immediately and doubles as the mount check.
            _ = interval.tick() => shared.spawn_check("timer", &cancel),
            Some(trigger) = triggers.recv() => {
                if let Trigger::RouteChanged(path) = &trigger {
                    shared.set_path(path.clone());
                }
                shared.spawn_check(trigger.label(), &cancel);
            }
        }
    }

    info!("ban monitor stopped");
}

impl Shared {
    fn current_path(&self) -> String {
        self.path.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_path(&self, path: String) {
        *self.path.lock().unwrap_or_else(|e| e.into_inner()) = path;
        *self.last_navigation.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn is_latest(&self, generation: u64) -> bool {
        self.latest.load(Ordering::Acquire) == generation
    }

    fn spawn_check(self: &Arc<Self>, trigger: &'static str, cancel: &CancellationToken) {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        let path = self.current_path();
        let shared = Arc::clone(self);
        let cancel = cancel.child_token();

        debug!(generation, trigger, %path, "ban check started");

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = shared.run_check(generation, &path) => {}
            }
        });
    }

    async fn run_check(&self, generation: u64, path: &str) {
        let started = Instant::now();
        let limit = self.config.check_timeout;
        let result = check_ban_status_within(
            limit,
            self.deps.sessions.as_ref(),
            self.deps.profiles.as_ref(),
            self.deps.hints.as_ref(),
            path,
        )
        .await;

        match result {
            Ok(outcome) => self.apply(generation, path, outcome),
            Err(err) => {
                warn!(generation, path, error = %err, "ban check failed");
                let resolved = self.status.borrow().is_resolved();
                if resolved {
                    // Keep the last known status.
                    return;
                }
                tokio::time::sleep_until(started + limit).await;
                self.fail_open(generation, path);
            }
        }
    }

    fn apply(&self, generation: u64, path: &str, outcome: BanCheckOutcome) {
        if !self.is_latest(generation) {
            debug!(generation, path, "stale ban check result discarded");
            return;
        }

        if let Some(target) = outcome.navigate_to {
            let mut last = self.last_navigation.lock().unwrap_or_else(|e| e.into_inner());
            let already_sent = last
                .as_ref()
                .is_some_and(|(from, to)| from == path && *to == target);
            if !already_sent {
                info!(generation, from = path, to = target, "ban status transition, reloading");
                self.deps.navigator.reload_to(target);
                *last = Some((path.to_string(), target));
            }
        }

        let previous = self.status.send_replace(outcome.status);
        if previous != outcome.status {
            info!(generation, path, ?previous, status = ?outcome.status, "ban status changed");
        }
    }

    fn fail_open(&self, generation: u64, path: &str) {
        if !self.is_latest(generation) || self.status.borrow().is_resolved() {
            return;
        }
        warn!(generation, path, "ban status unresolved after bounded wait, failing open");
        self.status.send_replace(BanCheck::NotBanned);
    }
}
