use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::{future::BoxFuture, FutureExt};
use shared::domain::DispatchId;
use tokio::{
    sync::{broadcast, mpsc, watch, RwLock},
    task::JoinHandle,
    time::{sleep, Sleep},
};
use tracing::{debug, info, warn};

pub mod config;
pub mod error;
pub mod state;
pub mod transport;

pub use config::CoalescerConfig;
pub use error::FetchError;
pub use state::Phase;
pub use transport::HttpFetcher;

use state::{Action, CoalescerState};

/// Supplies the search text at the moment a dispatch happens.
#[async_trait]
pub trait QuerySource: Send + Sync {
    async fn current_query(&self) -> String;
}

/// Performs one logical search request per call.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, query: &str) -> Result<String, FetchError>;
}

/// Replaces the result area with the content of a successful search.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, content: String);
}

/// Search field value shared between whoever edits it and the coalescer reading it.
#[derive(Debug, Clone, Default)]
pub struct SharedQuery {
    value: Arc<RwLock<String>>,
}

impl SharedQuery {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            value: Arc::new(RwLock::new(initial.into())),
        }
    }

    pub async fn set(&self, value: impl Into<String>) {
        *self.value.write().await = value.into();
    }

    pub async fn get(&self) -> String {
        self.value.read().await.clone()
    }
}

#[async_trait]
impl QuerySource for SharedQuery {
    async fn current_query(&self) -> String {
        self.get().await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoalescerEvent {
    Scheduled { delay: Duration },
    Dispatched { id: DispatchId, query: String },
    Rendered { id: DispatchId },
    Failed { id: DispatchId, error: FetchError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoalescerStatus {
    pub phase: Phase,
    pub notifications: u64,
    pub dispatches: u64,
    pub renders: u64,
    pub failures: u64,
}

enum Command {
    Changed,
}

type FetchOutcome = (DispatchId, Result<String, FetchError>);

/// Handle to a running coalescer.
///
/// All state lives in a single worker task; this handle only feeds it
/// notifications and observes what it publishes. Dropping the handle stops the
/// worker and abandons any pending timer or outstanding fetch.
pub struct SearchCoalescer {
    commands: mpsc::UnboundedSender<Command>,
    sent: AtomicU64,
    status: watch::Receiver<CoalescerStatus>,
    events: broadcast::Sender<CoalescerEvent>,
    worker: JoinHandle<()>,
}

impl SearchCoalescer {
    /// Starts the worker on the current tokio runtime.
    pub fn spawn(
        config: CoalescerConfig,
        source: Arc<dyn QuerySource>,
        fetcher: Arc<dyn Fetcher>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(CoalescerStatus::default());
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        let worker = Worker {
            config,
            state: CoalescerState::new(),
            source,
            fetcher,
            renderer,
            status: CoalescerStatus::default(),
            status_tx,
            events: events.clone(),
            last_dispatch: DispatchId(0),
        };
        let worker = tokio::spawn(worker.run(command_rx));

        Self {
            commands,
            sent: AtomicU64::new(0),
            status,
            events,
            worker,
        }
    }

    /// Records that the search text changed. Never blocks and never fails.
    pub fn notify_changed(&self) {
        if self.commands.send(Command::Changed).is_ok() {
            self.sent.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn status(&self) -> CoalescerStatus {
        *self.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<CoalescerStatus> {
        self.status.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CoalescerEvent> {
        self.events.subscribe()
    }

    /// Resolves once every notification sent so far has been handled and
    /// nothing is debouncing or in flight.
    pub async fn wait_until_idle(&self) {
        let target = self.sent.load(Ordering::SeqCst);
        let mut status = self.status.clone();
        let _ = status
            .wait_for(|status| status.notifications >= target && status.phase == Phase::Idle)
            .await;
    }

    /// Stops the worker, dropping whatever it was still waiting on.
    pub async fn shutdown(self) {
        let Self {
            commands, worker, ..
        } = self;
        drop(commands);
        let _ = worker.await;
    }
}

struct Worker {
    config: CoalescerConfig,
    state: CoalescerState,
    source: Arc<dyn QuerySource>,
    fetcher: Arc<dyn Fetcher>,
    renderer: Arc<dyn Renderer>,
    status: CoalescerStatus,
    status_tx: watch::Sender<CoalescerStatus>,
    events: broadcast::Sender<CoalescerEvent>,
    last_dispatch: DispatchId,
}

impl Worker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut timer: Option<std::pin::Pin<Box<Sleep>>> = None;
        let mut in_flight: Option<BoxFuture<'static, FetchOutcome>> = None;

        loop {
            let before = self.state.phase();

            let action = tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Changed) => {
                        self.status.notifications += 1;
                        self.state.on_changed()
                    }
                    None => {
                        debug!(
                            phase = ?self.state.phase(),
                            "search coalescer handle dropped; abandoning pending work"
                        );
                        break;
                    }
                },
                () = debounce_elapsed(&mut timer) => {
                    timer = None;
                    self.state.on_timer_fired()
                }
                (id, outcome) = fetch_finished(&mut in_flight) => {
                    in_flight = None;
                    self.complete(id, outcome).await;
                    self.state.on_completed()
                }
            };

            match action {
                Action::None => {}
                Action::StartTimer => {
                    timer = Some(Box::pin(sleep(self.config.debounce)));
                    let _ = self.events.send(CoalescerEvent::Scheduled {
                        delay: self.config.debounce,
                    });
                }
                Action::Dispatch => {
                    debug_assert!(in_flight.is_none(), "second concurrent search dispatch");
                    in_flight = Some(self.dispatch().await);
                }
            }

            debug_assert!(self.state.is_steady(), "pending search without owner");

            let after = self.state.phase();
            if before != after {
                debug!(from = ?before, to = ?after, "search coalescer phase changed");
            }
            self.status.phase = after;
            self.status_tx.send_replace(self.status);
        }
    }

    async fn dispatch(&mut self) -> BoxFuture<'static, FetchOutcome> {
        let query = self.source.current_query().await;
        self.last_dispatch = self.last_dispatch.next();
        self.status.dispatches += 1;

        let id = self.last_dispatch;
        info!(dispatch_id = %id, query = %query, "dispatching search");
        let _ = self.events.send(CoalescerEvent::Dispatched {
            id,
            query: query.clone(),
        });

        let fetcher = Arc::clone(&self.fetcher);
        let request_timeout = self.config.request_timeout;
        async move {
            let outcome = match request_timeout {
                Some(limit) => tokio::time::timeout(limit, fetcher.fetch(&query))
                    .await
                    .unwrap_or(Err(FetchError::TimedOut(limit))),
                None => fetcher.fetch(&query).await,
            };
            (id, outcome)
        }
        .boxed()
    }

    async fn complete(&mut self, id: DispatchId, outcome: Result<String, FetchError>) {
        match outcome {
            Ok(content) => {
                self.renderer.render(content).await;
                self.status.renders += 1;
                debug!(dispatch_id = %id, "rendered search results");
                let _ = self.events.send(CoalescerEvent::Rendered { id });
            }
            Err(error) => {
                self.status.failures += 1;
                warn!(dispatch_id = %id, %error, "search failed; keeping previous results");
                let _ = self.events.send(CoalescerEvent::Failed { id, error });
            }
        }
    }
}

async fn debounce_elapsed(timer: &mut Option<std::pin::Pin<Box<Sleep>>>) {
    match timer.as_mut() {
        Some(timer) => timer.await,
        None => std::future::pending().await,
    }
}

async fn fetch_finished(in_flight: &mut Option<BoxFuture<'static, FetchOutcome>>) -> FetchOutcome {
    match in_flight.as_mut() {
        Some(fetch) => fetch.await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
