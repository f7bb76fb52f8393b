use pretty_assertions::assert_eq;
use salon_core::{
    Accumulator, DoneReason, PageRequest, PageResponse, PageSize, Record, RecordId, Step,
    BULK_PAGE_SIZE, VIEW_PAGE_SIZE,
};

/// Serves `total` records numbered from 1, `page_size` at a time.
fn server_page(total: u64, request: PageRequest) -> PageResponse<Record> {
    let size = u64::from(request.page_size.get());
    let start = (u64::from(request.page) - 1) * size;
    let end = (start + size).min(total);
    let items = (start..end)
        .map(|i| Record::new(i as i64 + 1))
        .collect::<Vec<_>>();
    PageResponse::new(items, total)
}

/// Drives an accumulator against `server` and returns the records plus the
/// number of requests issued.
fn drain(
    page_size: PageSize,
    mut server: impl FnMut(PageRequest) -> PageResponse<Record>,
) -> (Vec<Record>, usize) {
    let mut acc = Accumulator::new(page_size);
    let mut requests = 0;
    loop {
        let request = acc.next_request();
        requests += 1;
        match acc.absorb(server(request)) {
            Step::Continue { next_page } => assert_eq!(next_page, request.page + 1),
            Step::Done { .. } => break,
        }
        assert!(requests < 10_000, "accumulator did not terminate");
    }
    (acc.into_items(), requests)
}

#[test]
fn loads_every_record_across_pages() {
    let (items, requests) = drain(BULK_PAGE_SIZE, |req| server_page(250, req));

    assert_eq!(requests, 3);
    assert_eq!(items.len(), 250);
    let ids: Vec<_> = items.iter().map(|r| r.id.to_string()).collect();
    let expected: Vec<_> = (1..=250).map(|i: i64| i.to_string()).collect();
    assert_eq!(ids, expected);
}

#[test]
fn completeness_holds_for_many_totals_and_sizes() {
    for total in [0_u64, 1, 19, 20, 21, 99, 100, 101, 399] {
        for size in [1_u32, 3, 20, 100] {
            let page_size = PageSize::new(size).unwrap();
            let (items, requests) = drain(page_size, |req| server_page(total, req));
            assert_eq!(items.len() as u64, total, "total={total} size={size}");
            let bound = total.div_ceil(u64::from(size)) + 1;
            assert!(
                requests as u64 <= bound,
                "total={total} size={size} requests={requests}"
            );
        }
    }
}

#[test]
fn exact_multiple_stops_on_total_without_extra_request() {
    let (items, requests) = drain(VIEW_PAGE_SIZE, |req| server_page(40, req));
    assert_eq!(items.len(), 40);
    assert_eq!(requests, 2);
}

#[test]
fn empty_collection_stops_after_first_request() {
    let mut acc = Accumulator::<Record>::new(BULK_PAGE_SIZE);
    let step = acc.absorb(PageResponse::new(Vec::new(), 0));

    assert!(matches!(step, Step::Done { .. }));
    assert!(acc.is_empty());
    assert_eq!(acc.observed_total(), Some(0));
}

#[test]
fn short_page_wins_over_total() {
    let mut acc = Accumulator::new(VIEW_PAGE_SIZE);
    let items = (1..=7).map(Record::new).collect();
    let step = acc.absorb(PageResponse::new(items, 50));

    assert_eq!(
        step,
        Step::Done {
            reason: DoneReason::ShortPage
        }
    );
    assert_eq!(acc.len(), 7);
}

#[test]
fn first_observed_total_bounds_the_accumulator() {
    let page_size = PageSize::new(2).unwrap();
    let mut acc = Accumulator::new(page_size);

    let first = acc.absorb(PageResponse::new(vec![Record::new(1), Record::new(2)], 3));
    assert_eq!(first, Step::Continue { next_page: 2 });

    // The server grew between reads and now reports more records.
    let second = acc.absorb(PageResponse::new(vec![Record::new(3), Record::new(4)], 10));
    assert_eq!(
        second,
        Step::Done {
            reason: DoneReason::ReachedTotal
        }
    );
    assert_eq!(acc.observed_total(), Some(3));
    assert_eq!(acc.dropped(), 1);
    let ids: Vec<_> = acc.into_items().into_iter().map(|r| r.id).collect();
    assert_eq!(
        ids,
        vec![RecordId::from(1), RecordId::from(2), RecordId::from(3)]
    );
}

#[test]
fn page_size_must_be_positive() {
    assert!(PageSize::new(0).is_err());
    assert_eq!(PageSize::try_from(20).unwrap(), VIEW_PAGE_SIZE);
}

#[test]
fn page_request_clamps_to_first_page() {
    let request = PageRequest::new(0, VIEW_PAGE_SIZE);
    assert_eq!(request.page, 1);
    assert_eq!(
        request.next().query_pairs(),
        [("page", "2".to_string()), ("page_size", "20".to_string())]
    );
}

#[test]
fn page_body_requires_total() {
    let missing =
        serde_json::from_str::<PageResponse<Record>>(r#"{"items":[{"id":1},{"id":2}]}"#);
    assert!(missing.is_err());

    let present: PageResponse<Record> =
        serde_json::from_str(r#"{"items":[{"id":1},{"id":2}],"total":2}"#).unwrap();
    let mut acc = Accumulator::new(VIEW_PAGE_SIZE);
    assert_eq!(
        acc.absorb(present),
        Step::Done {
            reason: DoneReason::ShortPage
        }
    );
    assert_eq!(acc.len(), 2);
    assert_eq!(acc.dropped(), 0);
}
