/// Persistence-layer tests against an in-memory database: the uniqueness
/// constraint, the conditional eviction, and the visibility query.
use parlor_db::models::{MessageRow, ParticipantRow};
use parlor_db::{Database, InsertOutcome};

fn participant(name: &str, last_status: i64) -> ParticipantRow {
    ParticipantRow {
        name: name.into(),
        last_status,
    }
}

fn notice(id: &str, sender: &str, posted_at: i64) -> MessageRow {
    MessageRow {
        id: id.into(),
        sender: sender.into(),
        recipient: "Todos".into(),
        body: "entra na sala...".into(),
        kind: "status".into(),
        time: "12:00:00".into(),
        posted_at,
    }
}

#[test]
fn duplicate_name_is_rejected_by_the_constraint() {
    let db = Database::open_in_memory().unwrap();

    let first = db
        .register_participant(&participant("Alice", 1_000), &notice("n1", "Alice", 1_000))
        .unwrap();
    assert_eq!(first, InsertOutcome::Inserted);

    let second = db
        .register_participant(&participant("Alice", 2_000), &notice("n2", "Alice", 2_000))
        .unwrap();
    assert_eq!(second, InsertOutcome::NameTaken);

    // The losing attempt must leave no trace: one participant, one notice.
    assert_eq!(db.list_participants().unwrap().len(), 1);
    assert_eq!(db.visible_messages("Alice", None).unwrap().len(), 1);
}

#[test]
fn rejected_registration_rolls_back_its_join_notice() {
    let db = Database::open_in_memory().unwrap();

    db.register_participant(&participant("Bob", 1_000), &notice("n1", "Bob", 1_000))
        .unwrap();
    db.register_participant(&participant("Bob", 2_000), &notice("n2", "Bob", 2_000))
        .unwrap();

    assert!(db.find_message("n1").unwrap().is_some());
    assert!(db.find_message("n2").unwrap().is_none());
}

#[test]
fn eviction_rechecks_staleness_at_delete_time() {
    let db = Database::open_in_memory().unwrap();

    db.register_participant(&participant("Stale", 1_000), &notice("n1", "Stale", 1_000))
        .unwrap();
    db.register_participant(&participant("Lively", 1_000), &notice("n2", "Lively", 1_000))
        .unwrap();

    let cutoff = 5_000;
    let snapshot = db.stale_participant_names(cutoff).unwrap();
    assert_eq!(snapshot.len(), 2);

    // A heartbeat lands between the snapshot and the delete.
    assert!(db.touch_participant("Lively", 9_000).unwrap());

    let removed = db.evict_stale(&snapshot, cutoff).unwrap();
    assert_eq!(removed, 1);
    assert!(db.find_participant("Stale").unwrap().is_none());
    assert!(db.find_participant("Lively").unwrap().is_some());
}

#[test]
fn touch_reports_unknown_names() {
    let db = Database::open_in_memory().unwrap();
    assert!(!db.touch_participant("Nobody", 1_000).unwrap());
}

#[test]
fn visible_messages_orders_most_recent_first_and_limits() {
    let db = Database::open_in_memory().unwrap();

    let mut batch = Vec::new();
    for i in 0..5 {
        let mut m = notice(&format!("m{}", i), "Alice", 1_000 + i);
        m.kind = "message".into();
        m.body = format!("msg {}", i);
        batch.push(m);
    }
    db.insert_messages(&batch).unwrap();

    let all = db.visible_messages("Bob", None).unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].id, "m4");
    assert_eq!(all[4].id, "m0");

    let top2 = db.visible_messages("Bob", Some(2)).unwrap();
    assert_eq!(top2.len(), 2);
    assert_eq!(top2[0].id, "m4");
    assert_eq!(top2[1].id, "m3");
}

#[test]
fn private_rows_only_match_their_parties() {
    let db = Database::open_in_memory().unwrap();

    let mut private = notice("p1", "Alice", 1_000);
    private.kind = "private_message".into();
    private.recipient = "Carol".into();
    db.insert_message(&private).unwrap();

    assert_eq!(db.visible_messages("Alice", None).unwrap().len(), 1);
    assert_eq!(db.visible_messages("Carol", None).unwrap().len(), 1);
    assert!(db.visible_messages("Bob", None).unwrap().is_empty());
}

#[test]
fn update_preserves_sender_and_ordinal() {
    let db = Database::open_in_memory().unwrap();

    let mut m = notice("m1", "Alice", 1_000);
    m.kind = "message".into();
    db.insert_message(&m).unwrap();

    assert!(
        db.update_message("m1", "Carol", "edited", "private_message", "13:00:00")
            .unwrap()
    );
    let row = db.find_message("m1").unwrap().unwrap();
    assert_eq!(row.sender, "Alice");
    assert_eq!(row.posted_at, 1_000);
    assert_eq!(row.recipient, "Carol");
    assert_eq!(row.body, "edited");

    assert!(!db.update_message("missing", "x", "y", "message", "13:00:00").unwrap());
    assert!(db.delete_message("m1").unwrap());
    assert!(!db.delete_message("m1").unwrap());
}
