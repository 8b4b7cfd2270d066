//! View-level use cases.
//!
//! # Responsibility
//! - Resolve routes to list or editor views.
//! - Derive the filtered/sorted list projection.
//! - Drive the headless edit form against a `MeetingRepository`.

pub mod editor;
pub mod list_view;
pub mod routing;
