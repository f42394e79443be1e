use tokio::signal;
use squall_core::prelude::ShutdownHandle;

/// Raise the shutdown signal when the process receives Ctrl-C.
pub(crate) fn start_shutdown_listener(
    runtime: &tokio::runtime::Runtime,
) -> anyhow::Result<ShutdownHandle> {
    let handle = ShutdownHandle::default();

    let listener_handle = handle.clone();
    runtime.spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                log::info!("Received Ctrl-C, stopping agents...");
                listener_handle.shutdown();
            }
            Err(e) => {
                log::error!("Cannot listen for Ctrl-C, stop the scenario another way: {e:?}");
            }
        }
    });

    Ok(handle)
}
