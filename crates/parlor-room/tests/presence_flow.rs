/// Sweeper behavior: stale participants are evicted with exactly one
/// departure notice each, and a heartbeat that lands before the sweep keeps
/// its participant in the room.
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use parlor_db::Database;
use parlor_room::sweeper::DEPARTURE_NOTICE;
use parlor_room::{MessageStore, ParticipantRegistry, PresenceSweeper};
use parlor_types::{BROADCAST_TARGET, MessageKind};

const ABSENCE_TIMEOUT: Duration = Duration::from_secs(10);

fn room() -> (
    Arc<Database>,
    ParticipantRegistry,
    MessageStore,
    PresenceSweeper,
) {
    let db = Arc::new(Database::open_in_memory().unwrap());
    (
        db.clone(),
        ParticipantRegistry::new(db.clone()),
        MessageStore::new(db.clone()),
        PresenceSweeper::new(db, ABSENCE_TIMEOUT),
    )
}

/// Rewinds a participant's heartbeat by `secs` seconds.
fn backdate(db: &Database, name: &str, secs: i64) {
    let stale_ms = Local::now().timestamp_millis() - secs * 1_000;
    db.with_conn_mut(|conn| {
        conn.execute(
            "UPDATE participants SET last_status = ?1 WHERE name = ?2",
            (stale_ms, name),
        )?;
        Ok(())
    })
    .unwrap();
}

#[test]
fn fresh_participants_survive_a_sweep() {
    let (_db, registry, _store, sweeper) = room();

    registry.register("Alice").unwrap();
    assert_eq!(sweeper.sweep_once().unwrap(), 0);
    assert_eq!(registry.list().unwrap().len(), 1);
}

#[test]
fn stale_participants_are_evicted_with_one_departure_notice() {
    let (db, registry, store, sweeper) = room();

    registry.register("Alice").unwrap();
    registry.register("Bob").unwrap();
    backdate(&db, "Alice", 60);
    backdate(&db, "Bob", 30);

    let sweep_started = Local::now().timestamp_millis();
    assert_eq!(sweeper.sweep_once().unwrap(), 2);
    assert!(registry.list().unwrap().is_empty());

    for name in ["Alice", "Bob"] {
        let departures: Vec<_> = store
            .list_visible_to("observer", None)
            .unwrap()
            .into_iter()
            .filter(|m| m.from == name && m.text == DEPARTURE_NOTICE)
            .collect();
        assert_eq!(departures.len(), 1, "departures for {}", name);
        assert_eq!(departures[0].kind, MessageKind::Status);
        assert_eq!(departures[0].to, BROADCAST_TARGET);
        assert!(departures[0].posted_at >= sweep_started);
    }

    // A second sweep finds nothing left to do.
    assert_eq!(sweeper.sweep_once().unwrap(), 0);
}

#[test]
fn a_heartbeat_before_the_sweep_prevents_eviction() {
    let (db, registry, _store, sweeper) = room();

    registry.register("Alice").unwrap();
    backdate(&db, "Alice", 60);

    registry.heartbeat("Alice").unwrap();
    assert_eq!(sweeper.sweep_once().unwrap(), 0);
    assert_eq!(registry.list().unwrap().len(), 1);
}

#[test]
fn a_heartbeat_between_snapshot_and_delete_wins() {
    let (db, registry, _store, sweeper) = room();

    registry.register("Alice").unwrap();
    backdate(&db, "Alice", 60);

    // Interleave the sweep's own steps the way the scheduler could: take the
    // snapshot, let a heartbeat land, then run the eviction.
    let cutoff = Local::now().timestamp_millis() - ABSENCE_TIMEOUT.as_millis() as i64;
    let snapshot = db.stale_participant_names(cutoff).unwrap();
    assert_eq!(snapshot, vec!["Alice".to_string()]);

    registry.heartbeat("Alice").unwrap();

    assert_eq!(db.evict_stale(&snapshot, cutoff).unwrap(), 0);
    assert_eq!(registry.list().unwrap().len(), 1);
}

#[test]
fn the_full_room_scenario() {
    let (db, registry, store, sweeper) = room();

    registry.register("Alice").unwrap();
    assert!(matches!(
        registry.register("Alice"),
        Err(parlor_room::RoomError::Conflict)
    ));

    let msg = store
        .post("Alice", BROADCAST_TARGET, "hi", "message")
        .unwrap();
    assert_eq!(msg.time.len(), 8);

    store
        .post("Alice", "Carol", "secret", "private_message")
        .unwrap();

    let bob_log = store.list_visible_to("Bob", None).unwrap();
    assert!(bob_log.iter().any(|m| m.text == "hi"));
    assert!(!bob_log.iter().any(|m| m.text == "secret"));

    backdate(&db, "Alice", 60);
    assert_eq!(sweeper.sweep_once().unwrap(), 1);
    assert!(registry.list().unwrap().is_empty());

    let log = store.list_visible_to("Bob", None).unwrap();
    assert_eq!(log[0].text, DEPARTURE_NOTICE);
    assert_eq!(log[0].from, "Alice");
}
