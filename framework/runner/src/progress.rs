use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use squall_core::prelude::DelegatedShutdownListener;
use std::fmt::Write;
use std::time::{Duration, Instant};

/// Show how much of a time bounded run is left. Runs on its own thread until shutdown.
pub(crate) fn start_progress(
    planned_runtime: Duration,
    shutdown_listener: DelegatedShutdownListener,
) -> anyhow::Result<()> {
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{wide_bar:.cyan/blue}] [{elapsed_precise} / {planned_runtime}]",
    )?
    .with_key(
        "planned_runtime",
        move |_state: &ProgressState, w: &mut dyn Write| {
            let secs = planned_runtime.as_secs();
            let _ = write!(w, "{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60);
        },
    )
    .progress_chars("#>-");

    std::thread::Builder::new()
        .name("progress".to_string())
        .spawn(move || {
            let start_time = Instant::now();
            let pb = ProgressBar::new(planned_runtime.as_secs()).with_style(style);

            while !shutdown_listener.should_shutdown() {
                pb.set_position(start_time.elapsed().as_secs().min(planned_runtime.as_secs()));
                std::thread::sleep(Duration::from_millis(500));
            }

            log::trace!("Progress thread shutting down");
            pb.finish_and_clear();
        })?;

    Ok(())
}
