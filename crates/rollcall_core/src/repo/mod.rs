//! Document-store contracts and the local SQLite adapter.
//!
//! # Responsibility
//! - Define the `classes` query and `attendance` write contracts core needs.
//! - Keep SQL details inside the adapter boundary.
//!
//! # Invariants
//! - Store faults are reported as `StoreError`, never as empty results.
//! - Attendance uniqueness on `(session_id, student_key)` surfaces as
//!   `StoreError::Duplicate`.

pub mod sqlite_store;
pub mod store;
