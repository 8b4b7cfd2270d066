//! Repository layer over the meeting collection.
//!
//! # Responsibility
//! - Define the use-case oriented meeting access contract.
//! - Keep the durability mechanism behind an injected `SlotStorage` port.

pub mod meeting_store;

pub use meeting_store::{MeetingRepository, MeetingStore, RepoError, RepoResult};
