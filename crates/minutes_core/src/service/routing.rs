//! Client-side view selection.
//!
//! `/` is the list, `/meeting/new` a fresh draft and `/meeting/:id` an
//! existing record. `new` is reserved and can never address a record.

use crate::model::meeting::MeetingId;
use std::fmt::{Display, Formatter};

const NEW_SEGMENT: &str = "new";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    List,
    NewMeeting,
    Meeting(MeetingId),
}

impl Route {
    /// Parses a path; unknown paths yield `None`.
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Some(Self::List);
        }

        let id = trimmed.strip_prefix("/meeting/")?;
        if id.is_empty() || id.contains('/') {
            return None;
        }
        if id == NEW_SEGMENT {
            return Some(Self::NewMeeting);
        }
        Some(Self::Meeting(id.to_string()))
    }

    pub fn path(&self) -> String {
        match self {
            Self::List => "/".to_string(),
            Self::NewMeeting => format!("/meeting/{NEW_SEGMENT}"),
            Self::Meeting(id) => format!("/meeting/{id}"),
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::Route;

    #[test]
    fn parses_the_three_view_paths() {
        assert_eq!(Route::parse("/"), Some(Route::List));
        assert_eq!(Route::parse("/meeting/new"), Some(Route::NewMeeting));
        assert_eq!(
            Route::parse("/meeting/abc123"),
            Some(Route::Meeting("abc123".to_string()))
        );
        assert_eq!(Route::parse("/meeting/"), None);
        assert_eq!(Route::parse("/settings"), None);
    }

    #[test]
    fn path_round_trips_for_existing_meeting() {
        let route = Route::Meeting("42".to_string());
        assert_eq!(Route::parse(&route.path()), Some(route));
    }
}
