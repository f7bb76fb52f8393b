//! Salon admin core: page accumulation, filters, sorting and the pure list
//! controller. Nothing in this crate performs IO.
mod effect;
mod filter;
mod msg;
mod page;
mod record;
mod sort;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use filter::{FilterError, FilterKind, ListFilter, SearchTerm, StatusFilter, MAX_SEARCH_LEN};
pub use msg::Msg;
pub use page::{
    Accumulator, DoneReason, PageRequest, PageResponse, PageSize, PageSizeError, Step,
    BULK_PAGE_SIZE, VIEW_PAGE_SIZE,
};
pub use record::{Collection, Record, RecordId};
pub use sort::{
    normalize, parse_timestamp, sort_records, FieldKind, SortDirection, SortField, SortKey,
    SortSpec, SortSpecError, Sortable,
};
pub use state::{Generation, ListState, LoadFailure, LoadMode, Phase, FORBIDDEN_NOTICE};
pub use update::update;
pub use view_model::ListViewModel;
