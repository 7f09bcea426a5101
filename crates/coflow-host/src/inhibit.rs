use std::process::{Child, Command, Stdio};

use coflow_core::{WakeLockError, WakeLockProvider};
use tracing::debug;

const INHIBIT_BINARY: &str = "systemd-inhibit";

/// Keeps the machine awake by holding a `systemd-inhibit` child process for
/// as long as the lock is held.
#[derive(Debug, Default)]
pub struct SystemdInhibitLock {
    child: Option<Child>,
}

impl SystemdInhibitLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl WakeLockProvider for SystemdInhibitLock {
    fn is_supported(&self) -> bool {
        cfg!(target_os = "linux")
    }

    fn acquire(&mut self) -> Result<(), WakeLockError> {
        if self.child.is_some() {
            return Ok(());
        }

        let child = Command::new(INHIBIT_BINARY)
            .args([
                "--what=idle:sleep",
                "--who=coflow",
                "--why=Guided session playing",
                "--mode=block",
                "sleep",
                "infinity",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|error| {
                WakeLockError::Denied(format!("failed to spawn {INHIBIT_BINARY}: {error}"))
            })?;
        debug!(pid = child.id(), "inhibitor started");
        self.child = Some(child);
        Ok(())
    }

    fn release(&mut self) -> Result<(), WakeLockError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        child
            .kill()
            .map_err(|error| WakeLockError::Denied(error.to_string()))?;
        let _status = child.wait();
        debug!("inhibitor stopped");
        Ok(())
    }

    fn still_held(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                debug!(%status, "inhibitor exited on its own");
                self.child = None;
                false
            }
            Err(error) => {
                debug!(%error, "inhibitor status unavailable");
                self.child = None;
                false
            }
        }
    }
}

impl Drop for SystemdInhibitLock {
    fn drop(&mut self) {
        if let Err(error) = self.release() {
            debug!(%error, "inhibitor cleanup failed");
        }
    }
}
