use minutes_core::storage::envelope::{EnvelopeError, ENVELOPE_VERSION, STORAGE_KEY};
use minutes_core::{
    MeetingPatch, MeetingRepository, MeetingStatus, MeetingStore, MemorySlotStorage, RepoError,
    SlotStorage,
};
use serde_json::Value;

const LEGACY_BLOB: &str = r#"{
  "state": {
    "meetings": [
      {
        "id": "legacy-1",
        "title": "Budget review",
        "date": "2025-09-01T11:00",
        "attendees": ["Ann", "Ben"],
        "attendeesString": "Ann, Ben, Cleo",
        "agendaItems": [{ "id": "a1", "title": "Numbers", "duration": "20m" }],
        "discussionNotes": "Line one\nLine two",
        "actionItems": [
          { "id": "ac1", "task": "Send sheet", "owner": "Ann", "dueDate": "2025-09-05", "completed": false }
        ],
        "decisions": "",
        "status": "finalized"
      },
      {
        "id": "legacy-2",
        "title": "Retro",
        "date": "2025-08-20T16:00",
        "attendees": ["Dee", "Eli"],
        "agendaItems": [],
        "discussionNotes": "",
        "actionItems": [],
        "decisions": "",
        "status": "draft"
      }
    ]
  }
}"#;

#[test]
fn legacy_blob_without_version_migrates_attendee_fields() {
    let storage = MemorySlotStorage::with_item(STORAGE_KEY, LEGACY_BLOB);
    let store = MeetingStore::load(&storage).unwrap();

    let budget = store.get("legacy-1").unwrap();
    assert_eq!(budget.details.attendees_text, "Ann, Ben, Cleo");
    assert_eq!(budget.details.status, MeetingStatus::Finalized);
    assert_eq!(budget.details.action_items[0].due_date, "2025-09-05");
    assert_eq!(budget.details.discussion_notes, "Line one\nLine two");

    let retro = store.get("legacy-2").unwrap();
    assert_eq!(retro.details.attendees_text, "Dee, Eli");
    assert_eq!(retro.attendees(), vec!["Dee", "Eli"]);
}

#[test]
fn first_write_after_migration_stores_current_version_only() {
    let storage = MemorySlotStorage::with_item(STORAGE_KEY, LEGACY_BLOB);
    let mut store = MeetingStore::load(&storage).unwrap();
    store
        .update(
            "legacy-2",
            &MeetingPatch {
                decisions: Some("Keep retros biweekly".to_string()),
                ..MeetingPatch::default()
            },
        )
        .unwrap();

    let raw = storage.get_item(STORAGE_KEY).unwrap().unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["version"], ENVELOPE_VERSION);

    let first = &value["state"]["meetings"][0];
    assert_eq!(first["attendeesText"], "Ann, Ben, Cleo");
    assert!(first.get("attendees").is_none());
    assert!(first.get("attendeesString").is_none());
}

#[test]
fn newer_envelope_version_is_rejected() {
    let storage = MemorySlotStorage::with_item(
        STORAGE_KEY,
        r#"{ "state": { "meetings": [] }, "version": 99 }"#,
    );

    match MeetingStore::load(&storage) {
        Err(RepoError::Envelope(EnvelopeError::UnsupportedVersion { found, latest })) => {
            assert_eq!(found, 99);
            assert_eq!(latest, ENVELOPE_VERSION);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("newer envelope must not load"),
    }
}

#[test]
fn corrupt_slot_is_a_json_error() {
    let storage = MemorySlotStorage::with_item(STORAGE_KEY, "{not json");
    assert!(matches!(
        MeetingStore::load(&storage),
        Err(RepoError::Envelope(EnvelopeError::Json(_)))
    ));
}
