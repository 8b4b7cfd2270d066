//! Domain model for meeting minutes.
//!
//! # Responsibility
//! - Define the meeting record, its agenda/action sub-rows and patches.
//! - Own date parsing/formatting shared by list, editor and export.
//!
//! # Invariants
//! - Every stored meeting is identified by an opaque, immutable id.
//! - Deletion is a hard delete; there are no tombstones.

pub mod dates;
pub mod meeting;
