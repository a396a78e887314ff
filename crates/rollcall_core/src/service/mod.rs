//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into lookup and registration use cases.
//! - Translate outcomes into exactly one user-facing alert.
//! - Keep presentation and storage details behind trait seams.

pub mod attendance_recorder;
pub mod check_in;
pub mod class_lookup;
pub mod session;
