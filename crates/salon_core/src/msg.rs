use crate::{
    Collection, Generation, ListFilter, LoadFailure, LoadMode, PageResponse, Record, SortSpec,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Show a collection, discarding whatever was loaded before.
    Opened {
        collection: Collection,
        mode: LoadMode,
    },
    /// User changed the search/status filter.
    FilterChanged(Option<ListFilter>),
    /// User navigated to another page of a paged view.
    PageRequested(u32),
    /// Switch between paged and full-collection loading.
    ModeChanged(LoadMode),
    /// Apply a sort, or clear it with `None`.
    SortChanged(Option<SortSpec>),
    /// User clicked a column header: same column flips direction, a new
    /// column sorts ascending.
    SortColumnClicked(String),
    /// Reload with the current parameters.
    RefreshRequested,
    /// Engine progress for a full-collection fetch.
    LoadProgress {
        generation: Generation,
        loaded: usize,
        total: u64,
    },
    /// Engine delivered one page of a paged view.
    PageLoaded {
        generation: Generation,
        response: PageResponse<Record>,
    },
    /// Engine delivered a complete collection.
    CollectionLoaded {
        generation: Generation,
        records: Vec<Record>,
    },
    /// Engine failed the fetch tagged with `generation`.
    LoadFailed {
        generation: Generation,
        failure: LoadFailure,
    },
    /// Fallback for placeholder wiring.
    NoOp,
}
