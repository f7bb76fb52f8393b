use admin_logging::{admin_info, admin_warn};
use salon_core::{Accumulator, Collection, ListFilter, PageSize, Record, Step};

use crate::{FetchError, PageProgress, PageSource, ProgressSink};

/// Loads every record of `collection` matching `filter`, one page after the
/// other, and returns them in server order.
///
/// The first failing page aborts the load and its error is returned; records
/// already received are discarded.
pub async fn fetch_all(
    source: &dyn PageSource,
    collection: &Collection,
    page_size: PageSize,
    filter: Option<&ListFilter>,
    sink: &dyn ProgressSink,
) -> Result<Vec<Record>, FetchError> {
    let mut acc = Accumulator::new(page_size);
    loop {
        let request = acc.next_request();
        let response = source.fetch_page(collection, request, filter).await?;
        let received = response.items.len();
        let step = acc.absorb(response);

        sink.page_fetched(PageProgress {
            page: request.page,
            received,
            loaded: acc.len(),
            total: acc.observed_total().unwrap_or_default(),
        });

        if let Step::Done { reason } = step {
            if acc.dropped() > 0 {
                admin_warn!(
                    "{} grew while loading; dropped {} records past total {:?}",
                    collection,
                    acc.dropped(),
                    acc.observed_total()
                );
            }
            admin_info!(
                "Loaded {} {} records in {} pages ({:?})",
                acc.len(),
                collection,
                request.page,
                reason
            );
            return Ok(acc.into_items());
        }
    }
}
