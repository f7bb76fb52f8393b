use crate::{Collection, Generation, ListFilter, PageRequest, PageSize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch a single page for a paged view.
    FetchPage {
        generation: Generation,
        collection: Collection,
        request: PageRequest,
        filter: Option<ListFilter>,
    },
    /// Fetch every page and merge them into one sequence.
    FetchAll {
        generation: Generation,
        collection: Collection,
        page_size: PageSize,
        filter: Option<ListFilter>,
    },
    /// Abort a fetch that a newer one superseded.
    CancelFetch { generation: Generation },
    /// The API rejected the credentials; send the user to log in.
    RedirectToLogin,
}
