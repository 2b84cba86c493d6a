//! Domain model for participant viewing plans.
//!
//! # Responsibility
//! - Define the row shapes produced by the plan generators.
//! - Keep id types aligned with SQLite INTEGER storage.
//!
//! # Invariants
//! - `view_order` is 1-based and contiguous per participant.
//! - Companion item ids are primary ids shifted by the catalogue size.

pub mod assignment;
pub mod run;
