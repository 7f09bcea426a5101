use thiserror::Error;
use tracing::{debug, info};

use crate::model::SessionStatus;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WakeLockError {
    #[error("wake lock not supported on this platform")]
    Unsupported,
    #[error("wake lock request denied: {0}")]
    Denied(String),
}

pub trait WakeLockProvider: Send {
    fn is_supported(&self) -> bool;

    fn acquire(&mut self) -> Result<(), WakeLockError>;

    fn release(&mut self) -> Result<(), WakeLockError>;

    /// Whether a previously acquired lock is still in force. Providers that
    /// cannot lose the lock on their own keep the default.
    fn still_held(&mut self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWakeLock;

impl WakeLockProvider for NoopWakeLock {
    fn is_supported(&self) -> bool {
        false
    }

    fn acquire(&mut self) -> Result<(), WakeLockError> {
        Err(WakeLockError::Unsupported)
    }

    fn release(&mut self) -> Result<(), WakeLockError> {
        Ok(())
    }
}

/// Holds the lock exactly while enabled, playing and visible. Failures leave
/// the lock inactive and are never returned to the caller.
pub struct WakeLockGuard {
    provider: Box<dyn WakeLockProvider>,
    enabled: bool,
    playing: bool,
    visible: bool,
    active: bool,
}

impl WakeLockGuard {
    #[must_use]
    pub fn new(provider: Box<dyn WakeLockProvider>, enabled: bool) -> Self {
        Self {
            provider,
            enabled,
            playing: false,
            visible: true,
            active: false,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.sync();
    }

    pub fn on_status(&mut self, status: SessionStatus) {
        self.playing = status == SessionStatus::Playing;
        self.sync();
    }

    /// Hiding the surface revokes the lock; showing it again re-acquires when
    /// still wanted.
    pub fn on_visibility(&mut self, visible: bool) {
        self.visible = visible;
        if visible {
            self.sync();
        } else if self.active {
            self.release();
        }
    }

    pub fn poll(&mut self) {
        if self.active && !self.provider.still_held() {
            self.on_revoked();
        }
    }

    pub fn on_revoked(&mut self) {
        if self.active {
            debug!("wake lock revoked by platform");
        }
        self.active = false;
    }

    pub fn shutdown(&mut self) {
        self.playing = false;
        self.sync();
    }

    fn sync(&mut self) {
        let wanted = self.enabled && self.playing && self.visible;
        if wanted && !self.active {
            self.acquire();
        } else if !wanted && self.active {
            self.release();
        }
    }

    fn acquire(&mut self) {
        if !self.provider.is_supported() {
            debug!("wake lock unsupported, skipping");
            return;
        }
        match self.provider.acquire() {
            Ok(()) => {
                self.active = true;
                info!("wake lock acquired");
            }
            Err(error) => debug!(%error, "wake lock acquire failed"),
        }
    }

    fn release(&mut self) {
        if let Err(error) = self.provider.release() {
            debug!(%error, "wake lock release failed");
        }
        self.active = false;
        info!("wake lock released");
    }
}

impl std::fmt::Debug for WakeLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WakeLockGuard")
            .field("enabled", &self.enabled)
            .field("playing", &self.playing)
            .field("visible", &self.visible)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}
