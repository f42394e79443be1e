use std::future::Future;
use std::time::Duration;

use squall_core::prelude::{ShutdownHandle, ShutdownSignalError};

#[derive(Debug)]
pub struct Executor {
    runtime: tokio::runtime::Runtime,
    shutdown_handle: ShutdownHandle,
}

impl Executor {
    pub(crate) fn new(runtime: tokio::runtime::Runtime, shutdown_handle: ShutdownHandle) -> Self {
        Self {
            runtime,
            shutdown_handle,
        }
    }

    /// Run async code in place, blocking until it completes.
    ///
    /// The future is dropped if the scenario stops while it is running, and a
    /// [ShutdownSignalError] is returned instead. A future that never yields will hold up
    /// shutdown.
    pub fn execute_in_place<T>(
        &self,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> anyhow::Result<T> {
        let mut shutdown_listener = self.shutdown_handle.new_listener();
        self.runtime.block_on(async move {
            tokio::select! {
                result = fut => result,
                _ = shutdown_listener.wait_for_shutdown() => {
                    Err(anyhow::anyhow!(ShutdownSignalError::default()))
                },
            }
        })
    }

    /// Block for `duration`, returning early with a [ShutdownSignalError] if the scenario stops.
    pub fn sleep_in_place(&self, duration: Duration) -> anyhow::Result<()> {
        if duration.is_zero() {
            return Ok(());
        }

        self.execute_in_place(async move {
            tokio::time::sleep(duration).await;
            Ok(())
        })
    }

    /// Submit async code to be run in the background.
    ///
    /// The future is not cancelled on shutdown and the runner does not wait for it to finish.
    /// Actions should use [Executor::execute_in_place] so that their work completes before the
    /// next action is chosen.
    pub fn spawn(&self, fut: impl Future<Output = ()> + Send + 'static) {
        self.runtime.spawn(fut);
    }
}
