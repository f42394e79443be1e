use squall_core::prelude::DelegatedShutdownListener;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Share of the machine's total CPU above which the runner warns about itself.
const HIGH_CPU_PERCENT: f32 = 10.0;

/// Watch the runner's own CPU usage and warn when it is high enough to distort the results.
///
/// Only logs, never stops the run.
pub(crate) fn start_monitor(shutdown_listener: DelegatedShutdownListener) -> anyhow::Result<()> {
    std::thread::Builder::new()
        .name("monitor".to_string())
        .spawn(move || {
            let pid = Pid::from_u32(std::process::id());
            let mut sys = System::new();

            sys.refresh_cpu_all();
            let cpu_count = sys.cpus().len().max(1);

            while !shutdown_listener.should_shutdown() {
                sys.refresh_processes_specifics(
                    ProcessesToUpdate::Some(&[pid]),
                    true,
                    ProcessRefreshKind::nothing().with_cpu(),
                );

                match sys.process(pid) {
                    Some(process) => {
                        let usage = process.cpu_usage() / cpu_count as f32;
                        if usage > HIGH_CPU_PERCENT {
                            log::warn!(
                                "High CPU usage detected. The runner is using {usage:.2}% of the CPU across {cpu_count} cores, results may be skewed"
                            );
                        }
                    }
                    None => {
                        log::debug!("Resource monitor cannot see its own process, stopping");
                        break;
                    }
                }

                std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
            }
        })?;

    Ok(())
}
