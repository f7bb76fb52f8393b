use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size used when loading an entire collection.
pub const BULK_PAGE_SIZE: PageSize = PageSize(100);
/// Page size used by paged table views.
pub const VIEW_PAGE_SIZE: PageSize = PageSize(20);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageSizeError {
    #[error("page size must be greater than zero")]
    Zero,
}

/// Number of records requested per page. Always greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PageSize(u32);

impl PageSize {
    pub fn new(size: u32) -> Result<Self, PageSizeError> {
        if size == 0 {
            Err(PageSizeError::Zero)
        } else {
            Ok(Self(size))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    fn as_len(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u32> for PageSize {
    type Error = PageSizeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// One page of a list endpoint. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: PageSize,
}

impl PageRequest {
    pub fn first(page_size: PageSize) -> Self {
        Self { page: 1, page_size }
    }

    /// Builds a request for `page`, clamping 0 to the first page.
    pub fn new(page: u32, page_size: PageSize) -> Self {
        Self {
            page: page.max(1),
            page_size,
        }
    }

    pub fn next(self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            page_size: self.page_size,
        }
    }

    /// Query parameters in the order the list endpoints expect them.
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("page", self.page.to_string()),
            ("page_size", self.page_size.get().to_string()),
        ]
    }
}

/// Body of a list endpoint response. `total` counts every record matching the
/// filter, independent of the page. Both fields are required: a body without
/// `total` is malformed, not an empty collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> PageResponse<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    /// Number of pages needed to hold `total` records at `page_size`.
    pub fn page_count(&self, page_size: PageSize) -> u64 {
        self.total.div_ceil(u64::from(page_size.get()))
    }
}

/// Outcome of absorbing one page into an [`Accumulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Request this page next.
    Continue { next_page: u32 },
    /// No more pages; the accumulator is complete.
    Done { reason: DoneReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneReason {
    /// The page held fewer items than requested.
    ShortPage,
    /// The accumulator reached the total observed on the first page.
    ReachedTotal,
    /// The collection is empty.
    Empty,
}

/// Pure state of a full-collection fetch.
///
/// Feed each page response to [`Accumulator::absorb`] in order and follow the
/// returned [`Step`]. The total observed on the first page decides when the
/// collection is complete; records past that total are dropped so the
/// accumulated length never exceeds it.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator<T> {
    page_size: PageSize,
    next_page: u32,
    observed_total: Option<u64>,
    items: Vec<T>,
    dropped: usize,
}

impl<T> Accumulator<T> {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page_size,
            next_page: 1,
            observed_total: None,
            items: Vec::new(),
            dropped: 0,
        }
    }

    /// The request that should be issued next.
    pub fn next_request(&self) -> PageRequest {
        PageRequest::new(self.next_page, self.page_size)
    }

    pub fn observed_total(&self) -> Option<u64> {
        self.observed_total
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Records discarded because they exceeded the first observed total.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn absorb(&mut self, response: PageResponse<T>) -> Step {
        let total = *self.observed_total.get_or_insert(response.total);
        let received = response.items.len();

        let room = usize::try_from(total)
            .unwrap_or(usize::MAX)
            .saturating_sub(self.items.len());
        let keep = received.min(room);
        self.dropped += received - keep;
        self.items.extend(response.items.into_iter().take(keep));

        if received < self.page_size.as_len() {
            return Step::Done {
                reason: DoneReason::ShortPage,
            };
        }
        if total == 0 {
            return Step::Done {
                reason: DoneReason::Empty,
            };
        }
        if self.items.len() as u64 >= total {
            return Step::Done {
                reason: DoneReason::ReachedTotal,
            };
        }

        self.next_page = self.next_page.saturating_add(1);
        Step::Continue {
            next_page: self.next_page,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
