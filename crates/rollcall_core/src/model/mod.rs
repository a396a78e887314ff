//! Domain model for role resolution and attendance registration.
//!
//! # Responsibility
//! - Define identity, role, class-session and attendance records.
//! - Centralize fallback rules for optional identity fields.
//!
//! # Invariants
//! - `User` and `ClassSession` are owned externally; core only reads them.
//! - `AttendanceRecord` is created by core and never mutated afterwards.

pub mod attendance;
pub mod class_session;
pub mod user;
