//! Use-case services over the generators and storage collaborators.
//!
//! # Responsibility
//! - Fetch the participant pool, generate, materialize, persist.
//! - Keep CLI callers free of storage details.

pub mod assignment_service;
