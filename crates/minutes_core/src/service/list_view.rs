//! Meeting list projection.
//!
//! # Invariants
//! - Filtering is a case-insensitive substring match on title or raw date.
//! - Display order is date descending; ties keep collection order.
//! - Records with unparseable dates sort after all dated records.
//! - Display order is never written back to the store.

use crate::model::dates::{format_list_date, format_list_time, parse_meeting_date};
use crate::model::meeting::{Meeting, MeetingId, MeetingStatus};
use std::cmp::Reverse;

/// Text shown when no meeting matches.
pub const EMPTY_LIST_PLACEHOLDER: &str = "No meetings found. Create one to get started.";

/// One rendered list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingListRow {
    pub id: MeetingId,
    pub title: String,
    pub status: MeetingStatus,
    /// `Oct 15, 2025`; raw date text when unparseable.
    pub date_label: String,
    /// `10:00 AM`; empty when unparseable.
    pub time_label: String,
    pub attendee_count: usize,
}

impl MeetingListRow {
    fn from_meeting(meeting: &Meeting) -> Self {
        let details = &meeting.details;
        Self {
            id: meeting.id.clone(),
            title: details.title.clone(),
            status: details.status,
            date_label: format_list_date(&details.date).unwrap_or_else(|| details.date.clone()),
            time_label: format_list_time(&details.date).unwrap_or_default(),
            attendee_count: details.attendees().len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeetingListView {
    Empty { placeholder: &'static str },
    Rows(Vec<MeetingListRow>),
}

/// Whether `meeting` matches a search query. Blank queries match everything.
pub fn matches_query(meeting: &Meeting, query: &str) -> bool {
    let needle = query.to_lowercase();
    meeting.details.title.to_lowercase().contains(&needle)
        || meeting.details.date.to_lowercase().contains(&needle)
}

/// Filters `meetings` by `query`, preserving input order.
pub fn filter_meetings<'a, I>(meetings: I, query: &str) -> Vec<&'a Meeting>
where
    I: IntoIterator<Item = &'a Meeting>,
{
    meetings
        .into_iter()
        .filter(|meeting| matches_query(meeting, query))
        .collect()
}

/// Stable sort, most recent first.
pub fn sort_by_date_desc(meetings: &mut [&Meeting]) {
    meetings.sort_by_key(|meeting| {
        let parsed = parse_meeting_date(&meeting.details.date);
        (parsed.is_none(), Reverse(parsed))
    });
}

/// Filtered and sorted display list for the list view.
pub fn build_list_view(meetings: &[Meeting], query: &str) -> MeetingListView {
    let mut visible = filter_meetings(meetings, query);
    if visible.is_empty() {
        return MeetingListView::Empty {
            placeholder: EMPTY_LIST_PLACEHOLDER,
        };
    }

    sort_by_date_desc(&mut visible);
    MeetingListView::Rows(
        visible
            .into_iter()
            .map(MeetingListRow::from_meeting)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::matches_query;
    use crate::model::meeting::{Meeting, MeetingDraft};

    fn meeting(title: &str, date: &str) -> Meeting {
        Meeting::new(
            "m",
            MeetingDraft {
                title: title.to_string(),
                date: date.to_string(),
                ..MeetingDraft::default()
            },
        )
    }

    #[test]
    fn query_matches_title_case_insensitively_or_raw_date() {
        let m = meeting("Weekly Design Sync", "2025-12-03T14:00");
        assert!(matches_query(&m, "design"));
        assert!(matches_query(&m, "2025-12"));
        assert!(matches_query(&m, ""));
        assert!(!matches_query(&m, "budget"));
    }
}
