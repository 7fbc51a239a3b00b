use std::cell::RefCell;
use std::cmp::Ordering;
use std::io::Write;
use std::rc::Rc;

use freebase_core::{
    Column, Datasource, MemoryDatasource, Record, RowEvent, RowEventKind, Value, binary_search,
    insert_sorted, shared,
};

fn numbered(n: i64) -> Record {
    [("n", Value::from(n))].into_iter().collect()
}

fn sorted_source(values: &[i64]) -> MemoryDatasource {
    MemoryDatasource::with_rows(
        vec![Column::new("n")],
        values.iter().copied().map(numbered).collect(),
    )
}

fn by_n(target: &i64, row: &Record) -> Ordering {
    let n = row.get("n").and_then(Value::as_i64).unwrap_or_default();
    target.cmp(&n)
}

#[test]
fn test_get_returns_isolated_copy() {
    let source = sorted_source(&[1, 2, 3]);

    let mut copy = source.get(1).unwrap();
    copy.set("n", 99);
    copy.set("extra", "x");

    assert_eq!(source.get(1).unwrap(), numbered(2));
}

#[test]
fn test_inserted_record_is_isolated() {
    let mut source = sorted_source(&[]);
    let mut original = numbered(5);

    source.add(original.clone()).unwrap();
    original.set("n", 6);

    assert_eq!(source.get(0).unwrap(), numbered(5));
}

#[test]
fn test_columns_are_copies() {
    let source = sorted_source(&[]);
    let mut columns = source.columns();
    columns.push(Column::new("other"));
    assert_eq!(source.columns(), vec![Column::new("n")]);
}

#[test]
fn test_out_of_range_access_fails() {
    let mut source = sorted_source(&[1, 2]);

    assert!(source.get(2).unwrap_err().is_no_such_record());
    assert!(source.replace(2, numbered(0)).unwrap_err().is_no_such_record());
    assert!(source.remove(2).unwrap_err().is_no_such_record());
    assert!(source.insert(3, numbered(0)).unwrap_err().is_no_such_record());
    // count itself is a valid insertion point
    assert!(source.insert(2, numbered(3)).is_ok());
    assert_eq!(source.count(), 3);
}

#[test]
fn test_remove_renumbers_rows() {
    let mut source = sorted_source(&[10, 20, 30]);
    let removed = source.remove(0).unwrap();
    assert_eq!(removed, numbered(10));
    assert_eq!(source.get(0).unwrap(), numbered(20));
    assert_eq!(source.get(1).unwrap(), numbered(30));
}

#[test]
fn test_every_mutation_fires_one_event_after_mutating() {
    let source = shared(sorted_source(&[]));
    let seen = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&seen);
    source
        .borrow_mut()
        .subscribe(Box::new(move |event: &RowEvent| sink.borrow_mut().push(event.clone())));

    let index = source.borrow_mut().add(numbered(1)).unwrap();
    assert_eq!(index, 0);
    source.borrow_mut().add(numbered(2)).unwrap();
    source.borrow_mut().replace(1, numbered(3)).unwrap();
    source.borrow_mut().remove(0).unwrap();

    let seen = seen.borrow();
    assert_eq!(
        *seen,
        vec![
            RowEvent::single(RowEventKind::RowsInsert, 0, 1),
            RowEvent::single(RowEventKind::RowsInsert, 1, 2),
            RowEvent::single(RowEventKind::RowsUpdate, 1, 2),
            RowEvent::single(RowEventKind::RowsDelete, 0, 1),
        ]
    );
}

#[test]
fn test_binary_search_empty() {
    let source = sorted_source(&[]);
    let result = binary_search(&source, &5, by_n).unwrap();
    assert!(result < 0);
    assert_eq!(!result, 0);
}

#[test]
fn test_binary_search_single() {
    let source = sorted_source(&[5]);
    assert_eq!(binary_search(&source, &5, by_n).unwrap(), 0);
    assert_eq!(!binary_search(&source, &1, by_n).unwrap(), 0);
    assert_eq!(!binary_search(&source, &9, by_n).unwrap(), 1);
}

#[test]
fn test_binary_search_multi() {
    let source = sorted_source(&[10, 20, 30, 40, 50]);

    assert_eq!(binary_search(&source, &10, by_n).unwrap(), 0);
    assert_eq!(binary_search(&source, &30, by_n).unwrap(), 2);
    assert_eq!(binary_search(&source, &50, by_n).unwrap(), 4);

    // before, within, after
    assert_eq!(!binary_search(&source, &5, by_n).unwrap(), 0);
    assert_eq!(!binary_search(&source, &35, by_n).unwrap(), 3);
    assert_eq!(!binary_search(&source, &55, by_n).unwrap(), 5);
}

#[test]
fn test_insert_sorted_keeps_order() {
    let mut source = sorted_source(&[10, 30]);
    let compare = |a: &Record, b: &Record| {
        let a = a.get("n").and_then(Value::as_i64).unwrap_or_default();
        let b = b.get("n").and_then(Value::as_i64).unwrap_or_default();
        a.cmp(&b)
    };

    assert_eq!(insert_sorted(&mut source, numbered(20), compare).unwrap(), 1);
    assert_eq!(insert_sorted(&mut source, numbered(40), compare).unwrap(), 3);
    assert_eq!(insert_sorted(&mut source, numbered(0), compare).unwrap(), 0);

    let values: Vec<_> = (0..source.count())
        .map(|i| source.get(i).unwrap().get("n").and_then(Value::as_i64).unwrap())
        .collect();
    assert_eq!(values, vec![0, 10, 20, 30, 40]);
}

#[test]
fn test_load_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"_id": "1", "title": "Dune"}}, {{"_id": "2", "title": "Emma", "pages": 474}}]"#
    )
    .unwrap();

    let source = MemoryDatasource::load_json(file.path()).unwrap();
    assert_eq!(source.count(), 2);
    assert_eq!(source.columns().len(), 3);
    assert_eq!(source.get(0).unwrap().get("title"), Some(&Value::from("Dune")));

    let round = MemoryDatasource::from_json_str(&source.to_json().unwrap()).unwrap();
    assert_eq!(round.get(1).unwrap(), source.get(1).unwrap());
}

#[test]
fn test_load_json_missing_file() {
    let err = MemoryDatasource::load_json("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, freebase_core::DatasourceError::Io(_)));
}
