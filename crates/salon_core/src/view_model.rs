use crate::{Collection, ListFilter, LoadMode, Phase, Record, SortSpec};

#[derive(Debug, Clone, PartialEq)]
pub struct ListViewModel {
    pub collection: Collection,
    pub filter: Option<ListFilter>,
    pub mode: LoadMode,
    pub sort: Option<SortSpec>,
    pub phase: Phase,
    /// Records in display order.
    pub rows: Vec<Record>,
    pub total: u64,
    /// Current page for paged views.
    pub page: Option<u32>,
    pub page_count: u64,
    /// `(loaded, total)` while a full-collection fetch is running.
    pub progress: Option<(usize, u64)>,
    pub notice: Option<String>,
    pub login_required: bool,
    pub dirty: bool,
}

impl ListViewModel {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }
}
