use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use admin_logging::{admin_debug, admin_info, admin_warn};
use salon_core::{Collection, Generation, ListFilter, PageRequest, PageSize};
use tokio_util::sync::CancellationToken;

use crate::fetch::{ClientSettings, PageSource, ProgressSink, ReqwestPageSource};
use crate::{fetch_all, EngineEvent, FetchError, PageProgress};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Client(#[from] FetchError),
}

enum EngineCommand {
    FetchPage {
        generation: Generation,
        collection: Collection,
        request: PageRequest,
        filter: Option<ListFilter>,
    },
    FetchAll {
        generation: Generation,
        collection: Collection,
        page_size: PageSize,
        filter: Option<ListFilter>,
    },
    Cancel {
        generation: Generation,
    },
}

type InFlight = Arc<Mutex<HashMap<Generation, CancellationToken>>>;

/// Runs fetches on a background tokio runtime and reports [`EngineEvent`]s.
///
/// Dropping the handle, or calling [`EngineHandle::shutdown`], stops the
/// command loop and shuts the runtime down.
pub struct EngineHandle {
    cmd_tx: Option<mpsc::Sender<EngineCommand>>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let source = ReqwestPageSource::new(settings)?;
        Self::with_source(Arc::new(source))
    }

    pub fn with_source(source: Arc<dyn PageSource>) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("salon-engine")
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let in_flight: InFlight = Arc::new(Mutex::new(HashMap::new()));
            while let Ok(command) = cmd_rx.recv() {
                dispatch(&runtime, &source, &in_flight, command, &event_tx);
            }
            admin_debug!("Engine command loop finished");
        });

        Ok(Self {
            cmd_tx: Some(cmd_tx),
            event_rx,
        })
    }

    pub fn fetch_page(
        &self,
        generation: Generation,
        collection: Collection,
        request: PageRequest,
        filter: Option<ListFilter>,
    ) {
        self.send(EngineCommand::FetchPage {
            generation,
            collection,
            request,
            filter,
        });
    }

    pub fn fetch_all(
        &self,
        generation: Generation,
        collection: Collection,
        page_size: PageSize,
        filter: Option<ListFilter>,
    ) {
        self.send(EngineCommand::FetchAll {
            generation,
            collection,
            page_size,
            filter,
        });
    }

    /// Cancels the fetch tagged `generation` if it is still running.
    pub fn cancel(&self, generation: Generation) {
        self.send(EngineCommand::Cancel { generation });
    }

    /// Stops accepting commands. Fetches in flight are dropped with the
    /// runtime, after which the event channel reports disconnection.
    pub fn shutdown(&mut self) {
        if self.cmd_tx.take().is_some() {
            admin_info!("Engine shutting down");
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Waits up to `timeout` for the next event. `Disconnected` means the
    /// engine thread is gone and no further events will arrive.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }

    fn send(&self, command: EngineCommand) {
        match &self.cmd_tx {
            Some(tx) => {
                if tx.send(command).is_err() {
                    admin_warn!("Engine command loop is gone; command dropped");
                }
            }
            None => admin_warn!("Engine is shut down; command dropped"),
        }
    }
}

fn dispatch(
    runtime: &tokio::runtime::Runtime,
    source: &Arc<dyn PageSource>,
    in_flight: &InFlight,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    let generation = match &command {
        EngineCommand::Cancel { generation } => {
            if let Some(token) = lock(in_flight).remove(generation) {
                admin_info!("Cancelling fetch generation={}", generation);
                token.cancel();
            }
            return;
        }
        EngineCommand::FetchPage { generation, .. } | EngineCommand::FetchAll { generation, .. } => {
            *generation
        }
    };

    let token = CancellationToken::new();
    lock(in_flight).insert(generation, token.clone());

    let source = source.clone();
    let in_flight = in_flight.clone();
    let event_tx = event_tx.clone();
    runtime.spawn(async move {
        let finished = token
            .run_until_cancelled(run_command(source.as_ref(), command, &event_tx))
            .await;
        lock(&in_flight).remove(&generation);
        let event = finished.unwrap_or(EngineEvent::Cancelled { generation });
        let _ = event_tx.send(event);
    });
}

async fn run_command(
    source: &dyn PageSource,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) -> EngineEvent {
    match command {
        EngineCommand::FetchPage {
            generation,
            collection,
            request,
            filter,
        } => {
            let result = source
                .fetch_page(&collection, request, filter.as_ref())
                .await;
            EngineEvent::PageFetched { generation, result }
        }
        EngineCommand::FetchAll {
            generation,
            collection,
            page_size,
            filter,
        } => {
            let sink = ChannelProgressSink::new(generation, event_tx.clone());
            let result = fetch_all(source, &collection, page_size, filter.as_ref(), &sink).await;
            EngineEvent::CollectionFetched { generation, result }
        }
        EngineCommand::Cancel { generation } => EngineEvent::Cancelled { generation },
    }
}

/// Forwards page progress of one fetch to the event channel.
struct ChannelProgressSink {
    generation: Generation,
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    fn new(generation: Generation, tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { generation, tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn page_fetched(&self, progress: PageProgress) {
        let _ = self.tx.send(EngineEvent::Progress {
            generation: self.generation,
            progress,
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
