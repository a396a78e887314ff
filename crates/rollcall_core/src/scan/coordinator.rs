//! Scan state machine.
//!
//! `Idle -> PermissionRequested -> (Scanning -> Decoded -> Idle) | (Denied -> Idle)`
//!
//! # Invariants
//! - Only `Idle` accepts a new scan; any other state rejects it with `Busy`.
//! - The decode session is owned by `ActiveDecode`, which calls `stop()`
//!   exactly once on every exit path, including a dropped scan future.
//! - `ScanStateReset` returns the machine to `Idle` on every exit path.
//! - The cancel flag is only written while the state cell is locked, so a
//!   cancel aimed at one attempt never lands on the next.
//! - Per-frame decode faults never end a scan.

use crate::logging::mask_code;
use crate::presenter::Presenter;
use crate::repo::store::{AttendanceStore, ClassStore};
use crate::scan::camera::{
    Camera, CameraError, DecodeEvent, DecodeSession, PermissionDecision, ScanConfig,
};
use crate::service::attendance_recorder::Outcome;
use crate::service::check_in::{CheckInDesk, CheckInError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::watch;

/// Observable scan state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    PermissionRequested,
    Denied,
    Scanning,
    Decoded,
}

/// How a scan attempt ended.
#[derive(Debug)]
pub enum ScanOutcome {
    /// A payload was decoded and handed to the check-in desk.
    Decoded {
        code: String,
        registration: Result<Outcome, CheckInError>,
    },
    PermissionDenied,
    Cancelled,
}

/// Scan attempt that could not run to a decode.
#[derive(Debug)]
pub enum ScanError {
    /// Another scan is already in progress.
    Busy,
    CameraStart(CameraError),
    /// The camera stream ended before any payload was decoded.
    CameraClosed,
}

impl Display for ScanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy => write!(f, "a scan is already in progress"),
            Self::CameraStart(err) => write!(f, "{err}"),
            Self::CameraClosed => write!(f, "camera stream ended before a code was decoded"),
        }
    }
}

impl Error for ScanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CameraStart(err) => Some(err),
            Self::Busy | Self::CameraClosed => None,
        }
    }
}

/// Drives one-shot QR scans into the check-in desk.
pub struct ScanCoordinator<K: Camera, C: ClassStore, A: AttendanceStore> {
    camera: K,
    desk: Arc<CheckInDesk<C, A>>,
    config: ScanConfig,
    state: watch::Sender<ScanState>,
    cancel: watch::Sender<bool>,
}

impl<K: Camera, C: ClassStore, A: AttendanceStore> ScanCoordinator<K, C, A> {
    pub fn new(camera: K, desk: Arc<CheckInDesk<C, A>>, config: ScanConfig) -> Self {
        let (state, _) = watch::channel(ScanState::Idle);
        let (cancel, _) = watch::channel(false);
        Self {
            camera,
            desk,
            config,
            state,
            cancel,
        }
    }

    pub fn state(&self) -> ScanState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ScanState> {
        self.state.subscribe()
    }

    /// Requests teardown of the scan in progress.
    ///
    /// Returns `false` when there is nothing to cancel.
    pub fn cancel(&self) -> bool {
        let mut requested = false;
        self.state.send_if_modified(|state| {
            if matches!(state, ScanState::PermissionRequested | ScanState::Scanning) {
                self.cancel.send_replace(true);
                requested = true;
            }
            false
        });
        if requested {
            info!("event=scan_cancel module=scan status=requested");
        }
        requested
    }

    /// Runs one scan attempt rendering into `target_element_id`.
    ///
    /// # Errors
    /// - `Busy` when another attempt is in progress; nothing is started.
    /// - `CameraStart`/`CameraClosed` after their alert was shown.
    pub async fn scan(&self, target_element_id: &str) -> Result<ScanOutcome, ScanError> {
        let _reset = self.begin()?;
        let mut cancel_rx = self.cancel.subscribe();

        info!("event=scan_permission module=scan status=start");
        if let PermissionDecision::Denied { reason } = self.camera.request_access().await {
            self.transition(ScanState::Denied);
            warn!("event=scan_permission module=scan status=denied reason={reason}");
            self.desk
                .presenter()
                .show_alert(&self.desk.messages().permission_denied);
            return Ok(ScanOutcome::PermissionDenied);
        }
        if *cancel_rx.borrow_and_update() {
            info!("event=scan_cancel module=scan status=ok stage=permission");
            return Ok(ScanOutcome::Cancelled);
        }

        let session = self
            .camera
            .start(target_element_id, &self.config)
            .map_err(|err| {
                warn!("event=scan_start module=scan status=error error={err}");
                self.camera_alert();
                ScanError::CameraStart(err)
            })?;
        let mut active = ActiveDecode::new(session);
        self.transition(ScanState::Scanning);
        info!(
            "event=scan_start module=scan status=ok target={} fps={}",
            target_element_id, self.config.fps
        );

        let code = loop {
            tokio::select! {
                biased;
                _ = cancel_rx.wait_for(|requested| *requested) => {
                    active.stop();
                    info!("event=scan_cancel module=scan status=ok stage=scanning");
                    return Ok(ScanOutcome::Cancelled);
                }
                event = active.next_event() => match event {
                    Some(DecodeEvent::Decoded(text)) => break text,
                    Some(DecodeEvent::Fault(message)) => {
                        debug!("event=scan_frame module=scan status=fault error={message}");
                    }
                    None => {
                        active.stop();
                        warn!("event=scan_decode module=scan status=camera_closed");
                        self.camera_alert();
                        return Err(ScanError::CameraClosed);
                    }
                },
            }
        };

        active.stop();
        self.transition(ScanState::Decoded);
        info!(
            "event=scan_decode module=scan status=ok code={}",
            mask_code(&code)
        );

        let registration = self.desk.accept_scan(code.clone()).await;
        Ok(ScanOutcome::Decoded { code, registration })
    }

    fn begin(&self) -> Result<ScanStateReset<'_>, ScanError> {
        let claimed = self.state.send_if_modified(|state| {
            if *state != ScanState::Idle {
                return false;
            }
            *state = ScanState::PermissionRequested;
            self.cancel.send_replace(false);
            true
        });
        if !claimed {
            warn!("event=scan_begin module=scan status=busy state={:?}", self.state());
            return Err(ScanError::Busy);
        }
        Ok(ScanStateReset { state: &self.state })
    }

    fn transition(&self, next: ScanState) {
        let previous = self.state.send_replace(next);
        debug!("event=scan_state module=scan from={previous:?} to={next:?}");
    }

    fn camera_alert(&self) {
        self.desk
            .presenter()
            .show_alert(&self.desk.messages().camera_failed);
    }
}

/// Owns the decode session for the lifetime of `Scanning`.
struct ActiveDecode {
    session: Box<dyn DecodeSession>,
    stopped: bool,
}

impl ActiveDecode {
    fn new(session: Box<dyn DecodeSession>) -> Self {
        Self {
            session,
            stopped: false,
        }
    }

    async fn next_event(&mut self) -> Option<DecodeEvent> {
        self.session.next_event().await
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.session.stop();
        debug!("event=scan_stop module=scan status=ok");
    }
}

impl Drop for ActiveDecode {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Returns the state machine to `Idle` when a scan attempt ends.
struct ScanStateReset<'a> {
    state: &'a watch::Sender<ScanState>,
}

impl Drop for ScanStateReset<'_> {
    fn drop(&mut self) {
        self.state.send_replace(ScanState::Idle);
    }
}
