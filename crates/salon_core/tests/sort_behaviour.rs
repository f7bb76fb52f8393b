use pretty_assertions::assert_eq;
use salon_core::{
    sort_records, FieldKind, Record, RecordId, SortDirection, SortField, SortSpec,
};
use serde_json::Value;

fn names(records: &[Record]) -> Vec<String> {
    records.iter().map(|r| r.display_field("name")).collect()
}

fn ids(records: &[Record]) -> Vec<String> {
    records.iter().map(|r| r.id.to_string()).collect()
}

#[test]
fn text_sort_ignores_case() {
    let records = vec![
        Record::new(1).with("name", "bob"),
        Record::new(2).with("name", "Alice"),
    ];
    let spec = SortSpec::parse("name").unwrap();

    assert_eq!(names(&sort_records(&records, &spec)), vec!["Alice", "bob"]);
}

#[test]
fn descending_reverses_order() {
    let records = vec![
        Record::new(1).with("name", "carol"),
        Record::new(2).with("name", "Alice"),
        Record::new(3).with("name", "bob"),
    ];
    let spec = SortSpec::parse("name:desc").unwrap();

    assert_eq!(
        names(&sort_records(&records, &spec)),
        vec!["carol", "bob", "Alice"]
    );
}

#[test]
fn null_amount_sorts_as_zero() {
    let records = vec![
        Record::new(1).with("total_amount", 15.5),
        Record::new(2).with("total_amount", Value::Null),
        Record::new(3).with("total_amount", -3),
    ];
    let spec = SortSpec::new(
        SortField::new("total_amount", FieldKind::Numeric),
        SortDirection::Ascending,
    );

    assert_eq!(ids(&sort_records(&records, &spec)), vec!["3", "2", "1"]);
}

#[test]
fn missing_text_sorts_first_ascending() {
    let records = vec![
        Record::new(1).with("name", "Zed"),
        Record::new(2),
        Record::new(3).with("name", Value::Null),
    ];
    let spec = SortSpec::parse("name:asc").unwrap();
    let sorted = sort_records(&records, &spec);

    assert_eq!(sorted.last().unwrap().id, RecordId::from(1));
}

#[test]
fn dates_compare_by_timestamp() {
    let records = vec![
        Record::new(1).with("created_at", "2024-03-01T10:00:00+02:00"),
        Record::new(2).with("created_at", "2024-03-01"),
        Record::new(3).with("created_at", "2024-02-28T23:59:59Z"),
    ];
    let spec = SortSpec::parse("created_at").unwrap();

    assert_eq!(ids(&sort_records(&records, &spec)), vec!["3", "2", "1"]);
}

#[test]
fn sorting_sorted_input_is_a_no_op() {
    let records: Vec<Record> = (1..=20)
        .map(|i| Record::new(i).with("visit_count", i * 3))
        .collect();
    for raw in ["visit_count:asc", "id:asc"] {
        let spec = SortSpec::parse(raw).unwrap();
        let once = sort_records(&records, &spec);
        let twice = sort_records(&once, &spec);
        assert_eq!(once, records);
        assert_eq!(twice, once);
    }
}

#[test]
fn sort_leaves_input_untouched() {
    let records = vec![Record::new(2), Record::new(1)];
    let spec = SortSpec::parse("id").unwrap();
    let sorted = sort_records(&records, &spec);

    assert_eq!(ids(&sorted), vec!["1", "2"]);
    assert_eq!(ids(&records), vec!["2", "1"]);
}
