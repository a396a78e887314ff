//! One-shot QR scanning.
//!
//! # Responsibility
//! - Define the camera and decode-session seams.
//! - Drive permission, decode and hand-off to registration.
//!
//! # Invariants
//! - At most one decode session is active at a time.
//! - Every started decode session is stopped exactly once.

pub mod camera;
pub mod coordinator;
