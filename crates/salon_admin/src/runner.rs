use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use admin_logging::{admin_debug, admin_error, admin_info, admin_warn};
use salon_core::{update, Effect, ListState, LoadFailure, Msg, Phase};
use salon_engine::{EngineEvent, EngineHandle, FailureKind, FetchError};

/// How a driven load ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    LoginRequired,
    TimedOut,
    /// The engine went away before the load finished.
    EngineStopped,
}

/// Executes controller effects on the engine and feeds engine events back
/// into the controller.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    /// Runs the effects and reports whether a login redirect was requested.
    pub fn enqueue(&self, effects: Vec<Effect>) -> bool {
        let mut login_required = false;
        for effect in effects {
            match effect {
                Effect::FetchPage {
                    generation,
                    collection,
                    request,
                    filter,
                } => {
                    admin_info!(
                        "FetchPage generation={} collection={} page={}",
                        generation,
                        collection,
                        request.page
                    );
                    self.engine
                        .fetch_page(generation, collection, request, filter);
                }
                Effect::FetchAll {
                    generation,
                    collection,
                    page_size,
                    filter,
                } => {
                    admin_info!(
                        "FetchAll generation={} collection={} page_size={}",
                        generation,
                        collection,
                        page_size.get()
                    );
                    self.engine
                        .fetch_all(generation, collection, page_size, filter);
                }
                Effect::CancelFetch { generation } => self.engine.cancel(generation),
                Effect::RedirectToLogin => {
                    login_required = true;
                }
            }
        }
        login_required
    }

    /// Applies `msg` and keeps feeding engine events until the state leaves
    /// the loading phase or `timeout` elapses.
    pub fn drive(&self, state: ListState, msg: Msg, timeout: Duration) -> (ListState, RunOutcome) {
        let deadline = Instant::now() + timeout;
        let (mut state, effects) = update(state, msg);
        let mut login_required = self.enqueue(effects);

        while state.phase() == Phase::Loading {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                admin_warn!("Load of {} timed out after {:?}", state.collection(), timeout);
                return (state, RunOutcome::TimedOut);
            }
            let event = match self.engine.recv_timeout(remaining) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    admin_error!("Engine stopped while loading {}", state.collection());
                    return (state, RunOutcome::EngineStopped);
                }
            };
            let Some(msg) = map_event(event) else {
                continue;
            };
            let (next, effects) = update(state, msg);
            state = next;
            login_required |= self.enqueue(effects);

            if let Some((loaded, total)) = state.view().progress {
                admin_info!("Loaded {}/{} {} records", loaded, total, state.collection());
            }
        }

        let outcome = if login_required {
            RunOutcome::LoginRequired
        } else {
            RunOutcome::Completed
        };
        (state, outcome)
    }
}

/// Translates an engine event into a controller message.
pub fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::Progress {
            generation,
            progress,
        } => Some(Msg::LoadProgress {
            generation,
            loaded: progress.loaded,
            total: progress.total,
        }),
        EngineEvent::PageFetched { generation, result } => Some(match result {
            Ok(response) => Msg::PageLoaded {
                generation,
                response,
            },
            Err(err) => failed(generation, &err),
        }),
        EngineEvent::CollectionFetched { generation, result } => Some(match result {
            Ok(records) => Msg::CollectionLoaded {
                generation,
                records,
            },
            Err(err) => failed(generation, &err),
        }),
        EngineEvent::Cancelled { generation } => {
            admin_debug!("Fetch generation={} cancelled", generation);
            None
        }
    }
}

fn failed(generation: u64, err: &FetchError) -> Msg {
    Msg::LoadFailed {
        generation,
        failure: map_failure(err),
    }
}

pub fn map_failure(err: &FetchError) -> LoadFailure {
    match err.kind {
        FailureKind::Unauthorized => LoadFailure::Unauthorized,
        FailureKind::Forbidden => LoadFailure::Forbidden,
        _ => LoadFailure::Other(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use salon_core::{
        Collection, ListFilter, LoadMode, PageRequest, PageResponse, Record, FORBIDDEN_NOTICE,
    };
    use salon_engine::PageSource;

    use super::*;

    struct StaticSource {
        status: Option<FailureKind>,
        total: u64,
    }

    #[async_trait::async_trait]
    impl PageSource for StaticSource {
        async fn fetch_page(
            &self,
            _collection: &Collection,
            request: PageRequest,
            _filter: Option<&ListFilter>,
        ) -> Result<PageResponse<Record>, FetchError> {
            if let Some(kind) = &self.status {
                return Err(FetchError {
                    kind: kind.clone(),
                    message: "rejected".to_string(),
                });
            }
            let size = u64::from(request.page_size.get());
            let start = (u64::from(request.page) - 1) * size;
            let end = (start + size).min(self.total);
            let items = (start..end)
                .map(|i| Record::new(i as i64 + 1).with("name", format!("client {}", i + 1)))
                .collect();
            Ok(PageResponse::new(items, self.total))
        }
    }

    fn runner(status: Option<FailureKind>, total: u64) -> EffectRunner {
        let engine = EngineHandle::with_source(Arc::new(StaticSource { status, total })).unwrap();
        EffectRunner::new(engine)
    }

    fn open(mode: LoadMode) -> Msg {
        Msg::Opened {
            collection: Collection::Clients,
            mode,
        }
    }

    #[test]
    fn drives_full_load_to_completion() {
        let runner = runner(None, 130);
        let (state, outcome) = runner.drive(
            ListState::new(Collection::Clients),
            open(LoadMode::All),
            Duration::from_secs(5),
        );

        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(state.phase(), Phase::Loaded);
        assert_eq!(state.rows().len(), 130);
    }

    #[test]
    fn unauthorized_requires_login() {
        let runner = runner(Some(FailureKind::Unauthorized), 10);
        let (state, outcome) = runner.drive(
            ListState::new(Collection::Clients),
            open(LoadMode::Paged { page: 1 }),
            Duration::from_secs(5),
        );

        assert_eq!(outcome, RunOutcome::LoginRequired);
        assert!(state.view().login_required);
    }

    #[test]
    fn forbidden_shows_notice_with_empty_rows() {
        let runner = runner(Some(FailureKind::Forbidden), 10);
        let (state, outcome) = runner.drive(
            ListState::new(Collection::Clients),
            open(LoadMode::All),
            Duration::from_secs(5),
        );

        assert_eq!(outcome, RunOutcome::Completed);
        let view = state.view();
        assert!(view.rows.is_empty());
        assert_eq!(view.notice.as_deref(), Some(FORBIDDEN_NOTICE));
    }

    #[test]
    fn stopped_engine_ends_the_load() {
        let mut engine =
            EngineHandle::with_source(Arc::new(StaticSource { status: None, total: 10 })).unwrap();
        engine.shutdown();
        let runner = EffectRunner::new(engine);

        let started = Instant::now();
        let (state, outcome) = runner.drive(
            ListState::new(Collection::Clients),
            open(LoadMode::All),
            Duration::from_secs(30),
        );

        assert_eq!(outcome, RunOutcome::EngineStopped);
        assert_eq!(state.phase(), Phase::Loading);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn other_failures_carry_the_message() {
        let failure = map_failure(&FetchError {
            kind: FailureKind::HttpStatus(502),
            message: "502 Bad Gateway".to_string(),
        });
        assert_eq!(
            failure,
            LoadFailure::Other("http status 502: 502 Bad Gateway".to_string())
        );
    }
}
