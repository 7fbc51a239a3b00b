use std::cell::{Cell, RefCell};
use std::rc::Rc;

use freebase_core::{Column, Datasource, MemoryDatasource, Record, SharedDatasource, Value};
use freebase_cursor::{
    Cursor, CursorError, CursorEvent, DiscardOutcome, MoveOutcome, NavCommand, NavEvent,
    NavigationBar, Position,
};

fn people(n: usize) -> Rc<RefCell<MemoryDatasource>> {
    let rows = (0..n)
        .map(|i| {
            [
                ("name", Value::from(format!("person-{i}"))),
                ("age", Value::from(20 + i as i64)),
            ]
            .into_iter()
            .collect::<Record>()
        })
        .collect();
    Rc::new(RefCell::new(MemoryDatasource::with_rows(
        vec![Column::new("name"), Column::new("age")],
        rows,
    )))
}

fn cursor_over(source: &Rc<RefCell<MemoryDatasource>>) -> Cursor {
    let shared: SharedDatasource = source.clone();
    Cursor::new(shared)
}

fn record_events(cursor: &mut Cursor) -> Rc<RefCell<Vec<CursorEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    cursor.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

#[test]
fn test_forward_visits_every_row_then_eof() {
    let source = people(4);
    let mut cursor = cursor_over(&source);

    let mut visited = Vec::new();
    let mut eof_seen = 0;
    for _ in 0..4 {
        cursor.move_forward(1).unwrap();
        if cursor.is_eof() {
            eof_seen += 1;
        }
        visited.push(cursor.position());
    }
    assert_eq!(
        visited,
        vec![
            Position::Row(0),
            Position::Row(1),
            Position::Row(2),
            Position::Row(3)
        ]
    );
    assert_eq!(eof_seen, 0);

    cursor.move_forward(1).unwrap();
    assert!(cursor.is_eof());
}

#[test]
fn test_forward_then_backward_is_identity() {
    let source = people(5);
    let mut cursor = cursor_over(&source);

    for k in 0..5 {
        cursor.set_position(Position::Row(k)).unwrap();
        cursor.move_forward(1).unwrap();
        cursor.move_backward(1).unwrap();
        assert_eq!(cursor.position(), Position::Row(k));
    }
}

#[test]
fn test_empty_source_bof_to_eof() {
    let source = people(0);
    let mut cursor = cursor_over(&source);
    let events = record_events(&mut cursor);

    let err = cursor.move_backward(1).unwrap_err();
    assert!(err.is_illegal_move());
    assert!(cursor.is_bof());
    assert!(events.borrow().is_empty());

    assert_eq!(cursor.move_forward(1).unwrap(), MoveOutcome::Moved(Position::Eof));
    events.borrow_mut().clear();

    let err = cursor.move_forward(1).unwrap_err();
    assert!(err.is_illegal_move());
    assert!(cursor.is_eof());
    assert!(events.borrow().is_empty());

    // Backward from EOF on an empty source lands on BOF
    assert_eq!(cursor.move_backward(1).unwrap(), MoveOutcome::Moved(Position::Bof));
}

#[test]
fn test_backward_clamps_to_bof() {
    let source = people(5);
    let mut cursor = cursor_over(&source);
    cursor.set_position(Position::Row(2)).unwrap();
    assert_eq!(cursor.move_backward(3).unwrap(), MoveOutcome::Moved(Position::Bof));
}

#[test]
fn test_set_position_out_of_range() {
    let source = people(3);
    let mut cursor = cursor_over(&source);
    let err = cursor.set_position(Position::Row(3)).unwrap_err();
    assert!(err.is_illegal_move());
    assert!(cursor.is_bof());

    for position in [Position::Eof, Position::New, Position::Bof, Position::Row(2)] {
        assert_eq!(cursor.set_position(position).unwrap(), MoveOutcome::Moved(position));
    }
}

#[test]
fn test_moved_event_after_state_change() {
    let source = people(3);
    let mut cursor = cursor_over(&source);
    let events = record_events(&mut cursor);

    cursor.move_last().unwrap();
    assert_eq!(
        *events.borrow(),
        vec![CursorEvent::Moved {
            from: Position::Bof,
            to: Position::Row(2),
            row_count: Some(3),
        }]
    );
    assert_eq!(cursor.field_value("name").unwrap(), Value::from("person-2"));
}

#[test]
fn test_unknown_row_count() {
    let source = people(3);
    source.borrow_mut().set_count_known(false);
    let mut cursor = cursor_over(&source);

    assert!(cursor.move_last().unwrap_err().is_illegal_move());

    // BOF with no known count goes straight to EOF
    assert_eq!(cursor.move_forward(1).unwrap(), MoveOutcome::Moved(Position::Eof));

    // EOF with no known count: best effort is BOF
    assert_eq!(cursor.move_backward(1).unwrap(), MoveOutcome::Moved(Position::Bof));

    // Explicit positions are trusted and forward moves are unbounded
    assert_eq!(cursor.move_first().unwrap(), MoveOutcome::Moved(Position::Row(0)));
    assert_eq!(cursor.move_forward(2).unwrap(), MoveOutcome::Moved(Position::Row(2)));

    // Running off the real end lands on EOF
    assert_eq!(cursor.move_forward(1).unwrap(), MoveOutcome::Moved(Position::Eof));
}

#[test]
fn test_set_field_value_at_bof_fails_for_any_field() {
    let source = people(2);
    let mut cursor = cursor_over(&source);

    assert!(matches!(
        cursor.set_field_value("name", "x"),
        Err(CursorError::NoCurrentRecord)
    ));
    assert!(matches!(
        cursor.set_field_value("not-a-field", "x"),
        Err(CursorError::NoCurrentRecord)
    ));
}

#[test]
fn test_dirty_round_trip() {
    let source = people(2);
    let mut cursor = cursor_over(&source);
    cursor.move_first().unwrap();

    cursor.set_field_value("age", 99).unwrap();
    assert!(cursor.is_dirty());

    cursor.set_field_value("age", 20).unwrap();
    assert!(!cursor.is_dirty());

    // Loose equality: "20" equals 20
    cursor.set_field_value("age", "20").unwrap();
    assert!(!cursor.is_dirty());

    cursor.set_field_value("name", "someone else").unwrap();
    assert!(cursor.is_dirty());
}

#[test]
fn test_cancel_before_discard_blocks_move() {
    let source = people(3);
    let mut cursor = cursor_over(&source);
    cursor.move_first().unwrap();

    let veto = Rc::new(Cell::new(true));
    let asked = Rc::new(Cell::new(0));
    let (v, a) = (Rc::clone(&veto), Rc::clone(&asked));
    cursor.subscribe_discard(move |check| {
        a.set(a.get() + 1);
        if v.get() {
            check.cancel();
        }
    });

    cursor.set_field_value("name", "edited").unwrap();

    assert_eq!(cursor.move_forward(1).unwrap(), MoveOutcome::Blocked);
    assert_eq!(cursor.position(), Position::Row(0));
    assert!(cursor.is_dirty());
    assert_eq!(cursor.field_value("name").unwrap(), Value::from("edited"));
    assert_eq!(asked.get(), 1);

    veto.set(false);
    assert_eq!(cursor.move_forward(1).unwrap(), MoveOutcome::Moved(Position::Row(1)));
    assert!(!cursor.is_dirty());
    assert_eq!(asked.get(), 2);

    // The edit never reached the datasource
    assert_eq!(
        source.borrow().get(0).unwrap().get("name"),
        Some(&Value::from("person-0"))
    );
}

#[test]
fn test_maybe_discard_outcomes() {
    let source = people(1);
    let mut cursor = cursor_over(&source);
    cursor.move_first().unwrap();
    assert_eq!(cursor.maybe_discard(), DiscardOutcome::NotDirty);

    let events = record_events(&mut cursor);
    cursor.set_field_value("name", "x").unwrap();
    assert_eq!(cursor.maybe_discard(), DiscardOutcome::Discarded);
    assert!(!cursor.is_dirty());
    assert!(
        events
            .borrow()
            .contains(&CursorEvent::Discarded { position: Position::Row(0) })
    );

    cursor.subscribe_discard(|check| {
        if let CursorEvent::BeforeDiscard { dirty_fields, .. } = check.event() {
            assert_eq!(dirty_fields, &vec!["name".to_string()]);
        }
        check.cancel();
    });
    cursor.set_field_value("name", "y").unwrap();
    assert_eq!(cursor.maybe_discard(), DiscardOutcome::Blocked);
    assert!(cursor.is_dirty());
}

#[test]
fn test_save_new_record_appends() {
    let source = people(2);
    let mut cursor = cursor_over(&source);
    let events = record_events(&mut cursor);

    cursor.new_record().unwrap();
    assert!(cursor.is_new());
    assert!(cursor.loaded_values().is_empty());
    cursor.set_field_value("name", "newcomer").unwrap();
    cursor.set_field_value("age", 30).unwrap();

    let index = cursor.save().unwrap();
    assert_eq!(index, 2);
    assert_eq!(cursor.position(), Position::Row(2));
    assert!(!cursor.is_dirty());
    assert_eq!(source.borrow().count(), 3);
    assert_eq!(
        source.borrow().get(2).unwrap().get("name"),
        Some(&Value::from("newcomer"))
    );

    let events = events.borrow();
    assert!(events.contains(&CursorEvent::NewRecord));
    assert!(events.contains(&CursorEvent::Saved {
        index: 2,
        created: true
    }));
}

#[test]
fn test_save_existing_replaces_in_place() {
    let source = people(3);
    let mut cursor = cursor_over(&source);
    cursor.set_position(Position::Row(1)).unwrap();
    cursor.set_field_value("age", 50).unwrap();

    assert_eq!(cursor.save().unwrap(), 1);
    assert_eq!(source.borrow().count(), 3);
    assert_eq!(source.borrow().get(1).unwrap().get("age"), Some(&Value::from(50)));
    assert!(!cursor.is_dirty());
}

#[test]
fn test_save_at_eof_fails() {
    let source = people(1);
    let mut cursor = cursor_over(&source);
    cursor.set_position(Position::Eof).unwrap();
    assert!(matches!(cursor.save(), Err(CursorError::NoCurrentRecord)));
}

#[test]
fn test_delete_current() {
    let source = people(3);
    let mut cursor = cursor_over(&source);
    cursor.set_position(Position::Row(1)).unwrap();

    assert_eq!(cursor.delete_current().unwrap(), Position::Row(1));
    assert_eq!(cursor.field_value("name").unwrap(), Value::from("person-2"));

    assert_eq!(cursor.delete_current().unwrap(), Position::Eof);
    assert_eq!(source.borrow().count(), 1);
}

#[test]
fn test_cursor_row_removed_externally_moves_to_eof() {
    let source = people(2);
    let mut cursor = cursor_over(&source);
    cursor.move_last().unwrap();

    source.borrow_mut().remove(1).unwrap();
    assert!(cursor.apply_source_events());
    assert!(cursor.is_eof());
    assert!(!cursor.apply_source_events());
}

fn named(name: &str) -> Record {
    [("name", Value::from(name)), ("age", Value::from(0))]
        .into_iter()
        .collect()
}

fn names(source: &Rc<RefCell<MemoryDatasource>>) -> Vec<Value> {
    let source = source.borrow();
    (0..source.count())
        .map(|i| source.get(i).unwrap().get("name").cloned().unwrap_or_default())
        .collect()
}

#[test]
fn test_insert_before_cursor_then_save_keeps_record() {
    let source = people(3);
    let mut cursor = cursor_over(&source);
    cursor.set_position(Position::Row(2)).unwrap();
    cursor.set_field_value("name", "edited").unwrap();

    source.borrow_mut().insert(0, named("first")).unwrap();
    assert_eq!(cursor.save().unwrap(), 3);

    assert_eq!(cursor.position(), Position::Row(3));
    assert_eq!(
        names(&source),
        vec![
            Value::from("first"),
            Value::from("person-0"),
            Value::from("person-1"),
            Value::from("edited"),
        ]
    );
}

#[test]
fn test_insert_and_delete_shift_cursor_and_publish_moved() {
    let source = people(4);
    let mut cursor = cursor_over(&source);
    cursor.set_position(Position::Row(2)).unwrap();
    let events = record_events(&mut cursor);

    source.borrow_mut().insert(2, named("wedge")).unwrap();
    source.borrow_mut().remove(0).unwrap();
    // Rows after the cursor do not move it
    source.borrow_mut().remove(3).unwrap();
    assert!(cursor.apply_source_events());

    assert_eq!(cursor.position(), Position::Row(2));
    assert_eq!(cursor.field_value("name").unwrap(), Value::from("person-2"));
    assert_eq!(
        *events.borrow(),
        vec![
            CursorEvent::Moved {
                from: Position::Row(2),
                to: Position::Row(3),
                row_count: Some(3),
            },
            CursorEvent::Moved {
                from: Position::Row(3),
                to: Position::Row(2),
                row_count: Some(3),
            },
        ]
    );
}

#[test]
fn test_own_row_deleted_externally_takes_next_record() {
    let source = people(3);
    let mut cursor = cursor_over(&source);
    cursor.set_position(Position::Row(1)).unwrap();
    cursor.set_field_value("age", 99).unwrap();

    source.borrow_mut().remove(1).unwrap();
    assert!(cursor.apply_source_events());

    assert_eq!(cursor.position(), Position::Row(1));
    assert_eq!(cursor.field_value("name").unwrap(), Value::from("person-2"));
    assert_eq!(cursor.loaded_values(), cursor.current_values());
    assert!(!cursor.is_dirty());
}

#[test]
fn test_external_replace_reloads_current_row() {
    let source = people(2);
    let mut cursor = cursor_over(&source);
    cursor.set_position(Position::Row(1)).unwrap();
    let events = record_events(&mut cursor);

    source.borrow_mut().replace(1, named("renamed")).unwrap();
    assert!(cursor.apply_source_events());
    assert_eq!(cursor.position(), Position::Row(1));

    assert_eq!(
        cursor.loaded_values().get("name"),
        Some(&Value::from("renamed"))
    );
    assert_eq!(cursor.field_value("name").unwrap(), Value::from("renamed"));
    assert_eq!(
        *events.borrow(),
        vec![CursorEvent::Moved {
            from: Position::Row(1),
            to: Position::Row(1),
            row_count: Some(2),
        }]
    );
}

#[test]
fn test_external_replace_keeps_unsaved_edits() {
    let source = people(2);
    let mut cursor = cursor_over(&source);
    cursor.set_position(Position::Row(0)).unwrap();
    cursor.set_field_value("age", 50).unwrap();

    source.borrow_mut().replace(0, named("renamed")).unwrap();
    cursor.apply_source_events();

    assert_eq!(
        cursor.loaded_values().get("name"),
        Some(&Value::from("renamed"))
    );
    assert_eq!(cursor.field_value("age").unwrap(), Value::from(50));
    assert!(cursor.dirty_fields().contains(&"age".to_string()));
}

#[test]
fn test_reload_drops_edits() {
    let source = people(1);
    let mut cursor = cursor_over(&source);
    cursor.move_first().unwrap();
    cursor.set_field_value("name", "scratch").unwrap();

    cursor.reload().unwrap();
    assert!(!cursor.is_dirty());
    assert_eq!(cursor.field_value("name").unwrap(), Value::from("person-0"));
}

#[test]
fn test_own_writes_do_not_move_cursor() {
    let source = people(3);
    let mut cursor = cursor_over(&source);
    cursor.new_record().unwrap();
    cursor.set_field_value("name", "fresh").unwrap();
    assert_eq!(cursor.save().unwrap(), 3);

    assert!(!cursor.apply_source_events());
    assert_eq!(cursor.position(), Position::Row(3));

    cursor.set_position(Position::Row(0)).unwrap();
    assert_eq!(cursor.delete_current().unwrap(), Position::Row(0));
    assert!(!cursor.apply_source_events());
    assert_eq!(cursor.field_value("name").unwrap(), Value::from("person-1"));
}

#[test]
fn test_set_position_past_data_with_unknown_count_fails() {
    let source = people(1);
    source.borrow_mut().set_count_known(false);
    let mut cursor = cursor_over(&source);
    cursor.move_first().unwrap();
    cursor.set_field_value("name", "kept").unwrap();

    let err = cursor.set_position(Position::Row(99)).unwrap_err();
    assert!(matches!(err, CursorError::Datasource(_)));
    assert_eq!(cursor.position(), Position::Row(0));
    assert!(cursor.is_dirty());
    assert_eq!(cursor.field_value("name").unwrap(), Value::from("kept"));
}

#[test]
fn test_navbar_commands() {
    let source = people(25);
    let mut cursor = cursor_over(&source);
    let mut bar = NavigationBar::new(10);
    bar.attach(&mut cursor);

    assert_eq!(bar.label(), "BOF (25 records)");

    bar.execute(NavCommand::First, &mut cursor);
    assert_eq!(cursor.position(), Position::Row(0));
    bar.execute(NavCommand::NextPage, &mut cursor);
    assert_eq!(cursor.position(), Position::Row(10));
    bar.execute(NavCommand::Next, &mut cursor);
    assert_eq!(cursor.position(), Position::Row(11));
    bar.execute(NavCommand::PrevPage, &mut cursor);
    assert_eq!(cursor.position(), Position::Row(1));
    bar.execute(NavCommand::Prev, &mut cursor);
    assert_eq!(cursor.position(), Position::Row(0));
    bar.execute(NavCommand::Last, &mut cursor);
    assert_eq!(cursor.position(), Position::Row(24));

    assert_eq!(bar.label(), "Record 25 of 25");
    assert!(bar.last_exception().is_none());
}

#[test]
fn test_navbar_republishes_illegal_move() {
    let source = people(1);
    let mut cursor = cursor_over(&source);
    let mut bar = NavigationBar::new(5);
    bar.attach(&mut cursor);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    bar.subscribe(move |event| {
        if let NavEvent::Exception { command, error } = event.event() {
            sink.borrow_mut().push((*command, error.is_illegal_move()));
        }
    });

    assert!(!bar.is_enabled(NavCommand::Prev));
    assert_eq!(bar.execute(NavCommand::Prev, &mut cursor), None);
    assert_eq!(*seen.borrow(), vec![(Some(NavCommand::Prev), true)]);
    assert!(matches!(
        bar.last_exception(),
        Some(NavEvent::Exception {
            command: Some(NavCommand::Prev),
            ..
        })
    ));
    assert!(cursor.is_bof());

    // A successful command clears the stored exception
    bar.execute(NavCommand::Next, &mut cursor);
    assert!(bar.last_exception().is_none());
}

#[test]
fn test_navbar_exception_can_be_handled() {
    let source = people(0);
    let mut cursor = cursor_over(&source);
    let mut bar = NavigationBar::new(5);
    bar.attach(&mut cursor);
    bar.subscribe(|event| event.cancel());

    cursor.set_position(Position::Eof).unwrap();
    assert_eq!(bar.execute(NavCommand::Next, &mut cursor), None);
    assert!(bar.last_exception().is_none());
}

#[test]
fn test_navbar_reports_blocked() {
    let source = people(2);
    let mut cursor = cursor_over(&source);
    let mut bar = NavigationBar::new(5);
    bar.attach(&mut cursor);
    cursor.subscribe_discard(|check| check.cancel());

    bar.execute(NavCommand::First, &mut cursor);
    cursor.set_field_value("name", "dirty").unwrap();

    let blocked = Rc::new(Cell::new(false));
    let flag = Rc::clone(&blocked);
    bar.subscribe(move |event| {
        if matches!(event.event(), NavEvent::Blocked { .. }) {
            flag.set(true);
        }
    });

    assert_eq!(bar.execute(NavCommand::Next, &mut cursor), Some(MoveOutcome::Blocked));
    assert!(blocked.get());
    assert_eq!(bar.display().position, Position::Row(0));
}

#[test]
fn test_navbar_goto() {
    let source = people(5);
    let mut cursor = cursor_over(&source);
    let mut bar = NavigationBar::new(5);
    bar.attach(&mut cursor);

    assert!(bar.goto("3", &mut cursor).is_some());
    assert_eq!(cursor.position(), Position::Row(2));
    assert!(bar.goto("new", &mut cursor).is_some());
    assert!(cursor.is_new());
    assert_eq!(bar.label(), "New record");

    assert!(bar.goto("99", &mut cursor).is_none());
    assert!(bar.goto("banana", &mut cursor).is_none());
    assert!(bar.take_exception().is_some());
    assert!(bar.take_exception().is_none());
}
