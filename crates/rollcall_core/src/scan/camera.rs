//! Camera subsystem contracts.
//!
//! # Responsibility
//! - Describe permission acquisition and decode-session primitives.
//! - Carry the recognition tuning passed to every decode session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input source a decode session may use. Only live camera frames are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    Camera,
}

/// Target region, in pixels, the decoder searches for a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrBox {
    pub width: u32,
    pub height: u32,
}

/// Recognition tuning for a decode session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Frames analysed per second.
    pub fps: u32,
    pub qrbox: QrBox,
    pub scan_types: Vec<ScanType>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fps: 10,
            qrbox: QrBox {
                width: 250,
                height: 250,
            },
            scan_types: vec![ScanType::Camera],
        }
    }
}

/// Answer to a camera-access prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionDecision {
    Granted,
    Denied { reason: String },
}

/// Event emitted by a running decode session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    /// A frame yielded a payload.
    Decoded(String),
    /// A frame could not be decoded; the session keeps running.
    Fault(String),
}

/// A running camera-driven decoder bound to one viewfinder element.
#[async_trait]
pub trait DecodeSession: Send {
    /// Waits for the next event; `None` once the camera stream has ended.
    async fn next_event(&mut self) -> Option<DecodeEvent>;

    /// Stops frame consumption, detaches listeners and releases the camera.
    fn stop(&mut self);
}

/// Camera subsystem.
#[async_trait]
pub trait Camera: Send + Sync {
    async fn request_access(&self) -> PermissionDecision;

    /// Starts a decode session rendering into `target_element_id`.
    fn start(
        &self,
        target_element_id: &str,
        config: &ScanConfig,
    ) -> Result<Box<dyn DecodeSession>, CameraError>;
}

#[async_trait]
impl<T: Camera + ?Sized> Camera for std::sync::Arc<T> {
    async fn request_access(&self) -> PermissionDecision {
        (**self).request_access().await
    }

    fn start(
        &self,
        target_element_id: &str,
        config: &ScanConfig,
    ) -> Result<Box<dyn DecodeSession>, CameraError> {
        (**self).start(target_element_id, config)
    }
}

/// Camera could not start a decode session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraError {
    pub message: String,
}

impl CameraError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for CameraError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "camera error: {}", self.message)
    }
}

impl Error for CameraError {}
