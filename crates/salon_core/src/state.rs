use crate::view_model::ListViewModel;
use crate::{
    sort_records, Collection, Effect, ListFilter, PageRequest, PageSize, Record, SortSpec,
    BULK_PAGE_SIZE, VIEW_PAGE_SIZE,
};

/// Monotonic tag attached to every fetch the controller starts. Results
/// carrying an older generation are stale and ignored.
pub type Generation = u64;

/// How the list is loaded from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// One page at a time, as a paged table does.
    Paged { page: u32 },
    /// Every page merged into one sequence before display.
    All,
}

impl LoadMode {
    pub fn page_size(self) -> PageSize {
        match self {
            LoadMode::Paged { .. } => VIEW_PAGE_SIZE,
            LoadMode::All => BULK_PAGE_SIZE,
        }
    }
}

/// Failure classes the controller reacts to differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// Credentials missing or expired; the caller must log in again.
    Unauthorized,
    /// Authenticated but not allowed to list this collection.
    Forbidden,
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

pub const FORBIDDEN_NOTICE: &str = "insufficient privileges";

/// Caller-owned state of one list view. It is moved into [`crate::update`]
/// and handed back with the effects to run.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    collection: Collection,
    filter: Option<ListFilter>,
    mode: LoadMode,
    sort: Option<SortSpec>,
    generation: Generation,
    in_flight: Option<Generation>,
    phase: Phase,
    source: Vec<Record>,
    sorted: Vec<Record>,
    total: u64,
    progress: Option<(usize, u64)>,
    notice: Option<String>,
    login_required: bool,
    dirty: bool,
}

impl Default for ListState {
    fn default() -> Self {
        Self::new(Collection::Clients)
    }
}

impl ListState {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            filter: None,
            mode: LoadMode::Paged { page: 1 },
            sort: None,
            generation: 0,
            in_flight: None,
            phase: Phase::Idle,
            source: Vec::new(),
            sorted: Vec::new(),
            total: 0,
            progress: None,
            notice: None,
            login_required: false,
            dirty: false,
        }
    }

    /// Presets the filter without starting a load.
    pub fn with_filter(mut self, filter: Option<ListFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Presets the sort without starting a load.
    pub fn with_sort(mut self, sort: Option<SortSpec>) -> Self {
        self.set_sort(sort);
        self
    }

    pub fn view(&self) -> ListViewModel {
        let page = match self.mode {
            LoadMode::Paged { page } => Some(page),
            LoadMode::All => None,
        };
        let page_count = match self.mode {
            LoadMode::Paged { .. } => self
                .total
                .div_ceil(u64::from(self.mode.page_size().get())),
            LoadMode::All => u64::from(self.total > 0),
        };
        ListViewModel {
            collection: self.collection.clone(),
            filter: self.filter.clone(),
            mode: self.mode,
            sort: self.sort.clone(),
            phase: self.phase,
            rows: self.sorted.clone(),
            total: self.total,
            page,
            page_count,
            progress: self.progress,
            notice: self.notice.clone(),
            login_required: self.login_required,
            dirty: self.dirty,
        }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn filter(&self) -> Option<&ListFilter> {
        self.filter.as_ref()
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn in_flight(&self) -> Option<Generation> {
        self.in_flight
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Loaded records in display order.
    pub fn rows(&self) -> &[Record] {
        &self.sorted
    }

    /// Returns whether the state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_current(&self, generation: Generation) -> bool {
        self.in_flight == Some(generation)
    }

    pub(crate) fn set_collection(&mut self, collection: Collection) {
        self.collection = collection;
        self.source.clear();
        self.sorted.clear();
        self.total = 0;
    }

    pub(crate) fn set_filter(&mut self, filter: Option<ListFilter>) -> bool {
        if self.filter == filter {
            return false;
        }
        self.filter = filter;
        true
    }

    pub(crate) fn set_mode(&mut self, mode: LoadMode) -> bool {
        let mode = match mode {
            LoadMode::Paged { page } => LoadMode::Paged { page: page.max(1) },
            LoadMode::All => LoadMode::All,
        };
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        true
    }

    pub(crate) fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
        self.resort();
        self.mark_dirty();
    }

    /// Starts a fetch for the current collection, filter and mode. A fetch
    /// still in flight is superseded and cancelled.
    pub(crate) fn begin_load(&mut self) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(2);
        if let Some(stale) = self.in_flight.take() {
            effects.push(Effect::CancelFetch { generation: stale });
        }

        self.generation += 1;
        let generation = self.generation;
        self.in_flight = Some(generation);
        self.phase = Phase::Loading;
        self.progress = None;
        self.notice = None;
        self.login_required = false;
        self.mark_dirty();

        let collection = self.collection.clone();
        let filter = self.filter.clone();
        effects.push(match self.mode {
            LoadMode::Paged { page } => Effect::FetchPage {
                generation,
                collection,
                request: PageRequest::new(page, VIEW_PAGE_SIZE),
                filter,
            },
            LoadMode::All => Effect::FetchAll {
                generation,
                collection,
                page_size: BULK_PAGE_SIZE,
                filter,
            },
        });
        effects
    }

    pub(crate) fn apply_progress(&mut self, loaded: usize, total: u64) {
        self.progress = Some((loaded, total));
        self.mark_dirty();
    }

    pub(crate) fn apply_loaded(&mut self, records: Vec<Record>, total: u64) {
        self.in_flight = None;
        self.phase = Phase::Loaded;
        self.progress = None;
        self.source = records;
        self.total = total;
        self.resort();
        self.mark_dirty();
    }

    pub(crate) fn apply_failure(&mut self, failure: &LoadFailure) {
        self.in_flight = None;
        self.phase = Phase::Failed;
        self.progress = None;
        self.source.clear();
        self.sorted.clear();
        self.total = 0;
        match failure {
            LoadFailure::Unauthorized => {
                self.login_required = true;
                self.notice = None;
            }
            LoadFailure::Forbidden => {
                self.notice = Some(FORBIDDEN_NOTICE.to_string());
            }
            LoadFailure::Other(message) => {
                self.notice = Some(message.clone());
            }
        }
        self.mark_dirty();
    }

    fn resort(&mut self) {
        self.sorted = match &self.sort {
            Some(spec) => sort_records(&self.source, spec),
            None => self.source.clone(),
        };
    }
}
