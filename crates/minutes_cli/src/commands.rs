//! Command handlers. Each drives the core editor/store the way the
//! interactive views do: open by route, edit the draft, submit.

use crate::terminal::{StderrNotifier, StdinConfirmer};
use crate::{EditArgs, FieldArgs, NewArgs};
use anyhow::{anyhow, bail, Context, Result};
use minutes_core::db::Connection;
use minutes_core::export::markup::compose;
use minutes_core::model::dates::parse_meeting_date;
use minutes_core::sample::sample_meetings;
use minutes_core::service::editor::{AlwaysConfirm, Confirmer};
use minutes_core::{
    build_list_view, failure_notification, EditorMode, ExportService, GlyphRasterizer,
    MeetingEditor, MeetingListView, MeetingRepository, MeetingStatus, MeetingStore, MinutesConfig,
    Navigation, Notifier, OpenOutcome, Route, SqliteSlotStorage,
};
use std::path::PathBuf;

pub type Store<'conn> = MeetingStore<SqliteSlotStorage<'conn>>;

pub fn open_store<'conn>(conn: &'conn Connection, config: &MinutesConfig) -> Result<Store<'conn>> {
    let seed = if config.seed_sample_meetings {
        sample_meetings()
    } else {
        Vec::new()
    };
    MeetingStore::load_from(SqliteSlotStorage::new(conn), config.storage_key.clone(), seed)
        .context("failed to load meetings")
}

pub fn list(store: &Store<'_>, query: &str) -> Result<()> {
    match build_list_view(store.meetings(), query) {
        MeetingListView::Empty { placeholder } => println!("{placeholder}"),
        MeetingListView::Rows(rows) => {
            for row in rows {
                println!(
                    "{}  {} {}  [{}]  {}  ({} attendees)",
                    row.id,
                    row.date_label,
                    row.time_label,
                    row.status.as_str(),
                    row.title,
                    row.attendee_count
                );
            }
        }
    }
    Ok(())
}

fn open_existing(store: &Store<'_>, id: &str) -> Result<MeetingEditor> {
    let now = chrono::Local::now().naive_local();
    match MeetingEditor::open(&Route::Meeting(id.to_string()), store, now) {
        OpenOutcome::Editing(editor) => Ok(editor),
        OpenOutcome::Redirect(_) => Err(anyhow!("meeting `{id}` not found")),
    }
}

pub fn show(store: &Store<'_>, id: &str) -> Result<()> {
    let editor = open_existing(store, id)?;
    let draft = editor.draft();

    println!("{} ({})", editor.heading(), editor.status_label());
    print!("{}", compose(draft).to_plain_text());
    if !draft.agenda_items.is_empty() {
        println!("\nAgenda row ids:");
        for row in &draft.agenda_items {
            println!("  {}  {}", row.id, row.title);
        }
    }
    if !draft.action_items.is_empty() {
        println!("\nAction row ids:");
        for row in &draft.action_items {
            println!("  {}  {}", row.id, row.task);
        }
    }
    Ok(())
}

pub fn create(store: &mut Store<'_>, args: NewArgs) -> Result<()> {
    let mut editor = MeetingEditor::new_draft(chrono::Local::now().naive_local());
    apply_fields(&mut editor, &args.fields)?;
    if args.finalized {
        editor.draft_mut().status = MeetingStatus::Finalized;
    }

    // The fresh draft starts with one blank agenda row; fill it first.
    let blank_row = editor.draft().agenda_items.first().map(|row| row.id.clone());
    for (index, spec) in args.agenda.iter().enumerate() {
        let (title, duration) = split_agenda(spec);
        let row_id = match (&blank_row, index) {
            (Some(id), 0) => id.clone(),
            _ => editor.append_agenda_item(),
        };
        if let Some(row) = editor.agenda_item_mut(&row_id) {
            row.title = title;
            row.duration = duration;
        }
    }
    for spec in &args.actions {
        add_action(&mut editor, spec);
    }

    editor.submit(store, &StderrNotifier)?;
    if let EditorMode::Existing(id) = editor.mode() {
        println!("{id}");
    }
    Ok(())
}

pub fn edit(store: &mut Store<'_>, args: EditArgs) -> Result<()> {
    let mut editor = open_existing(store, &args.id)?;
    apply_fields(&mut editor, &args.fields)?;

    if let Some(status) = &args.status {
        editor.draft_mut().status = MeetingStatus::parse(status)
            .ok_or_else(|| anyhow!("unknown status `{status}`; expected draft|finalized"))?;
    }
    for row_id in &args.remove_agenda {
        if !editor.remove_agenda_item(row_id) {
            bail!("agenda row `{row_id}` not found");
        }
    }
    for spec in &args.add_agenda {
        let (title, duration) = split_agenda(spec);
        let row_id = editor.append_agenda_item();
        if let Some(row) = editor.agenda_item_mut(&row_id) {
            row.title = title;
            row.duration = duration;
        }
    }
    for row_id in &args.remove_action {
        if !editor.remove_action_item(row_id) {
            bail!("action row `{row_id}` not found");
        }
    }
    for spec in &args.add_action {
        add_action(&mut editor, spec);
    }
    for row_id in &args.toggle_action {
        if editor.toggle_action_item(row_id).is_none() {
            bail!("action row `{row_id}` not found");
        }
    }

    editor.submit(store, &StderrNotifier)?;
    Ok(())
}

pub fn delete(store: &mut Store<'_>, id: &str, yes: bool) -> Result<()> {
    let editor = open_existing(store, id)?;
    let confirmer: &dyn Confirmer = if yes { &AlwaysConfirm } else { &StdinConfirmer };

    match editor.delete(store, confirmer)? {
        Navigation::GoTo(_) => eprintln!("Deleted {id}."),
        Navigation::Stay => eprintln!("Kept {id}."),
    }
    Ok(())
}

pub fn export(
    store: &Store<'_>,
    config: &MinutesConfig,
    id: &str,
    out: Option<PathBuf>,
) -> Result<()> {
    let editor = open_existing(store, id)?;
    if !editor.can_export() {
        bail!("only saved meetings can be exported");
    }

    let rasterizer =
        match GlyphRasterizer::discover(config.font_path.as_deref(), config.bold_font_path.as_deref())
        {
            Ok(rasterizer) => rasterizer,
            Err(err) => {
                StderrNotifier.notify(failure_notification(&err));
                return Err(err.into());
            }
        };
    let download_dir = out.unwrap_or_else(|| config.export_dir.clone());
    let service = ExportService::new(rasterizer, StderrNotifier, download_dir);

    let artifact = service.export(id, editor.draft())?;
    println!("{}", artifact.path.display());
    Ok(())
}

fn apply_fields(editor: &mut MeetingEditor, fields: &FieldArgs) -> Result<()> {
    let draft = editor.draft_mut();
    if let Some(title) = &fields.title {
        draft.title = title.clone();
    }
    if let Some(date) = &fields.date {
        if parse_meeting_date(date).is_none() {
            bail!("unrecognised date `{date}`; expected YYYY-MM-DDTHH:MM");
        }
        draft.date = date.clone();
    }
    if let Some(attendees) = &fields.attendees {
        draft.attendees_text = attendees.clone();
    }
    if let Some(notes) = &fields.notes {
        draft.discussion_notes = notes.clone();
    }
    if let Some(decisions) = &fields.decisions {
        draft.decisions = decisions.clone();
    }
    Ok(())
}

fn split_agenda(spec: &str) -> (String, String) {
    match spec.split_once('|') {
        Some((title, duration)) => (title.trim().to_string(), duration.trim().to_string()),
        None => (spec.trim().to_string(), String::new()),
    }
}

fn add_action(editor: &mut MeetingEditor, spec: &str) {
    let mut parts = spec.splitn(3, '|').map(str::trim);
    let task = parts.next().unwrap_or_default().to_string();
    let owner = parts.next().unwrap_or_default().to_string();
    let due_date = parts.next().unwrap_or_default().to_string();

    let row_id = editor.append_action_item();
    if let Some(row) = editor.action_item_mut(&row_id) {
        row.task = task;
        row.owner = owner;
        row.due_date = due_date;
    }
}

#[cfg(test)]
mod tests {
    use super::split_agenda;

    #[test]
    fn agenda_spec_splits_on_first_pipe() {
        assert_eq!(
            split_agenda("Roadmap | 15m"),
            ("Roadmap".to_string(), "15m".to_string())
        );
        assert_eq!(split_agenda("Intro"), ("Intro".to_string(), String::new()));
    }
}
