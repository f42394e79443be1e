use tokio::sync::watch;

/// Owner side of the scenario-wide stop signal.
///
/// The signal is a single boolean state rather than a message, so listeners created after the
/// signal was raised still observe it.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    sender: watch::Sender<bool>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self {
            sender: watch::channel(false).0,
        }
    }

    /// Raise the stop signal. Calling this more than once has no further effect.
    pub fn shutdown(&self) {
        let changed = self.sender.send_if_modified(|stopped| {
            if *stopped {
                false
            } else {
                *stopped = true;
                true
            }
        });

        if changed {
            log::debug!("Shutdown signal raised");
        }
    }

    pub fn is_shutdown(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn new_listener(&self) -> DelegatedShutdownListener {
        DelegatedShutdownListener::new(self.sender.subscribe())
    }
}

#[derive(Clone, Debug)]
pub struct DelegatedShutdownListener {
    receiver: watch::Receiver<bool>,
}

impl DelegatedShutdownListener {
    pub(crate) fn new(receiver: watch::Receiver<bool>) -> Self {
        Self { receiver }
    }

    /// Point in time check of the stop signal. Once this returns true, the caller should stop
    /// starting new work.
    pub fn should_shutdown(&self) -> bool {
        // A dropped handle can never signal again, treat it as a stop.
        *self.receiver.borrow() || self.receiver.has_changed().is_err()
    }

    /// Wait until the stop signal is raised. Safe to race against other futures, which is how
    /// in-flight work gets abandoned on shutdown.
    pub async fn wait_for_shutdown(&mut self) {
        if self.receiver.wait_for(|stopped| *stopped).await.is_err() {
            log::trace!("Shutdown handle dropped while waiting");
        }
    }
}

#[derive(derive_more::Error, derive_more::Display, Debug)]
pub struct ShutdownSignalError {
    msg: String,
}

impl Default for ShutdownSignalError {
    fn default() -> Self {
        Self {
            msg: "Execution cancelled by shutdown signal".to_string(),
        }
    }
}
