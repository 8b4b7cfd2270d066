use chrono::{NaiveDate, NaiveDateTime};
use minutes_core::service::editor::Confirmer;
use minutes_core::{
    EditorMode, MeetingDraft, MeetingEditor, MeetingRepository, MeetingStatus, MeetingStore,
    MemorySlotStorage, Navigation, Notification, NotificationLevel, Notifier, OpenOutcome, Route,
};
use std::cell::RefCell;

#[derive(Default)]
struct RecordingNotifier {
    seen: RefCell<Vec<Notification>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.borrow_mut().push(notification);
    }
}

impl RecordingNotifier {
    fn titles(&self) -> Vec<String> {
        self.seen.borrow().iter().map(|n| n.title.clone()).collect()
    }
}

struct FixedAnswer {
    answer: bool,
    prompts: RefCell<Vec<String>>,
}

impl FixedAnswer {
    fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: RefCell::new(Vec::new()),
        }
    }
}

impl Confirmer for FixedAnswer {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.answer
    }
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 18)
        .and_then(|date| date.and_hms_opt(15, 45, 0))
        .unwrap()
}

fn store_with_one() -> (MeetingStore<MemorySlotStorage>, String) {
    let mut store = MeetingStore::load(MemorySlotStorage::new()).unwrap();
    let created = store
        .add(MeetingDraft {
            title: "Ops review".to_string(),
            date: "2026-10-01T10:00".to_string(),
            ..MeetingDraft::default()
        })
        .unwrap();
    (store, created.id)
}

fn editing(outcome: OpenOutcome) -> MeetingEditor {
    match outcome {
        OpenOutcome::Editing(editor) => editor,
        OpenOutcome::Redirect(route) => panic!("unexpected redirect to {route}"),
    }
}

#[test]
fn unknown_id_and_list_route_redirect_to_list() {
    let (store, _) = store_with_one();

    assert_eq!(
        MeetingEditor::open(&Route::Meeting("nope".to_string()), &store, now()),
        OpenOutcome::Redirect(Route::List)
    );
    assert_eq!(
        MeetingEditor::open(&Route::List, &store, now()),
        OpenOutcome::Redirect(Route::List)
    );
}

#[test]
fn submitting_a_new_draft_creates_and_navigates_to_list() {
    let mut store = MeetingStore::load(MemorySlotStorage::new()).unwrap();
    let notifier = RecordingNotifier::default();

    let mut editor = editing(MeetingEditor::open(&Route::NewMeeting, &store, now()));
    assert_eq!(editor.draft().date, "2026-10-18T15:45");
    editor.draft_mut().title = "Launch prep".to_string();
    assert!(store.meetings().is_empty());

    let navigation = editor.submit(&mut store, &notifier).unwrap();

    assert_eq!(navigation, Navigation::GoTo(Route::List));
    assert_eq!(store.meetings().len(), 1);
    let stored = &store.meetings()[0];
    assert_eq!(stored.details.title, "Launch prep");
    assert_eq!(stored.details.status, MeetingStatus::Draft);
    assert_eq!(editor.mode(), &EditorMode::Existing(stored.id.clone()));
    assert_eq!(notifier.titles(), vec!["Meeting Created"]);
}

#[test]
fn submitting_an_existing_meeting_updates_in_place_and_stays() {
    let (mut store, id) = store_with_one();
    let notifier = RecordingNotifier::default();

    let mut editor = editing(MeetingEditor::open(
        &Route::Meeting(id.clone()),
        &store,
        now(),
    ));
    editor.draft_mut().status = MeetingStatus::Finalized;
    editor.draft_mut().decisions = "Ship it".to_string();
    assert_eq!(store.get(&id).unwrap().details.status, MeetingStatus::Draft);

    let navigation = editor.submit(&mut store, &notifier).unwrap();

    assert_eq!(navigation, Navigation::Stay);
    let stored = store.get(&id).unwrap();
    assert_eq!(stored.details.status, MeetingStatus::Finalized);
    assert_eq!(stored.details.decisions, "Ship it");
    assert_eq!(store.meetings().len(), 1);
    assert_eq!(editor.status_label(), "Finalized");
    assert_eq!(editor.heading(), "Ops review");

    let seen = notifier.seen.borrow();
    assert_eq!(seen[0].level, NotificationLevel::Success);
    assert_eq!(seen[0].title, "Saved");
    assert_eq!(seen[0].description, "Meeting updated successfully.");
}

#[test]
fn header_label_follows_mode_and_status() {
    let (store, id) = store_with_one();
    let fresh = MeetingEditor::new_draft(now());
    let mut saved = editing(MeetingEditor::open(&Route::Meeting(id), &store, now()));

    assert_eq!(fresh.status_label(), "Draft");
    assert_eq!(saved.draft().status, MeetingStatus::Draft);
    assert_eq!(saved.status_label(), "Last edited just now");

    saved.draft_mut().status = MeetingStatus::Finalized;
    assert_eq!(saved.status_label(), "Finalized");
}

#[test]
fn removing_a_middle_row_keeps_sibling_identity_and_content() {
    let mut editor = MeetingEditor::new_draft(now());
    let first = editor.draft().agenda_items[0].id.clone();
    let second = editor.append_agenda_item();
    let third = editor.append_agenda_item();
    editor.agenda_item_mut(&first).unwrap().title = "Welcome".to_string();
    editor.agenda_item_mut(&third).unwrap().title = "Wrap up".to_string();

    assert!(editor.remove_agenda_item(&second));
    assert!(!editor.remove_agenda_item(&second));

    let rows = &editor.draft().agenda_items;
    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].id.as_str(), rows[0].title.as_str()), (first.as_str(), "Welcome"));
    assert_eq!((rows[1].id.as_str(), rows[1].title.as_str()), (third.as_str(), "Wrap up"));
}

#[test]
fn toggling_an_action_is_draft_only_until_submit() {
    let (mut store, id) = store_with_one();
    let notifier = RecordingNotifier::default();

    let mut editor = editing(MeetingEditor::open(
        &Route::Meeting(id.clone()),
        &store,
        now(),
    ));
    let row = editor.append_action_item();
    editor.submit(&mut store, &notifier).unwrap();

    assert_eq!(editor.toggle_action_item(&row), Some(true));
    assert!(!store.get(&id).unwrap().details.action_items[0].completed);

    editor.submit(&mut store, &notifier).unwrap();
    assert!(store.get(&id).unwrap().details.action_items[0].completed);
    assert_eq!(editor.toggle_action_item("missing"), None);
}

#[test]
fn declined_delete_keeps_the_meeting() {
    let (mut store, id) = store_with_one();
    let editor = editing(MeetingEditor::open(
        &Route::Meeting(id.clone()),
        &store,
        now(),
    ));
    let confirmer = FixedAnswer::new(false);

    let navigation = editor.delete(&mut store, &confirmer).unwrap();

    assert_eq!(navigation, Navigation::Stay);
    assert!(store.get(&id).is_some());
    assert_eq!(
        confirmer.prompts.borrow().as_slice(),
        ["Are you sure you want to delete this meeting?".to_string()]
    );
}

#[test]
fn confirmed_delete_removes_and_returns_to_list() {
    let (mut store, id) = store_with_one();
    let editor = editing(MeetingEditor::open(
        &Route::Meeting(id.clone()),
        &store,
        now(),
    ));

    let navigation = editor.delete(&mut store, &FixedAnswer::new(true)).unwrap();

    assert_eq!(navigation, Navigation::GoTo(Route::List));
    assert!(store.get(&id).is_none());
    assert_eq!(
        MeetingEditor::open(&Route::Meeting(id), &store, now()),
        OpenOutcome::Redirect(Route::List)
    );
}

#[test]
fn only_saved_meetings_can_export() {
    let (store, id) = store_with_one();
    let fresh = MeetingEditor::new_draft(now());
    let saved = editing(MeetingEditor::open(&Route::Meeting(id), &store, now()));

    assert!(!fresh.can_export());
    assert!(saved.can_export());
}
