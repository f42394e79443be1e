use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use squall_core::prelude::{AgentBailError, DelegatedShutdownListener, ShutdownSignalError};
use squall_instruments::ReportConfig;

use crate::cli::ReporterOpt;
use crate::context::{AgentContext, RunnerContext, UserValuesConstraint};
use crate::definition::{ScenarioDefinition, ScenarioDefinitionBuilder};
use crate::executor::Executor;
use crate::monitor::start_monitor;
use crate::progress::start_progress;
use crate::shutdown::start_shutdown_listener;

/// Run a scenario to completion.
///
/// Returns the number of agents that were still running when the scenario stopped, which is
/// lower than the configured agent count if any agents bailed.
pub fn run<RV: UserValuesConstraint, V: UserValuesConstraint>(
    definition: ScenarioDefinitionBuilder<RV, V>,
) -> anyhow::Result<usize> {
    let definition = Arc::new(definition.build()?);

    log::info!(
        "Running scenario: {} against {} with {} agent(s)",
        definition.name,
        definition.connection_string,
        definition.agent_count
    );

    for action in definition.actions.iter() {
        log::info!("Action [{}] with weight {}", action.name(), action.weight());
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let shutdown_handle = start_shutdown_listener(&runtime)?;
    let executor = Arc::new(Executor::new(runtime, shutdown_handle.clone()));

    let report_config = match definition.reporter {
        ReporterOpt::InMemory => ReportConfig::default().enable_in_memory(),
        ReporterOpt::Noop => ReportConfig::default(),
    };
    let reporter = Arc::new(report_config.init());

    let run_id = definition
        .run_id
        .clone()
        .unwrap_or_else(|| nanoid::nanoid!());
    log::info!("Run ID: {run_id}");

    let mut runner_context = RunnerContext::new(
        executor,
        reporter,
        shutdown_handle.clone(),
        definition.connection_string.clone(),
        run_id,
    );

    if let Some(setup_fn) = definition.setup_fn {
        setup_fn(&mut runner_context)?;
    }

    if let Some(duration) = definition.duration_s {
        if !definition.no_progress {
            if let Err(e) = start_progress(
                Duration::from_secs(duration),
                shutdown_handle.new_listener(),
            ) {
                log::warn!("Failed to start progress bar: {e:?}");
            }
        }

        let shutdown_handle = shutdown_handle.clone();
        runner_context.executor().spawn(async move {
            tokio::time::sleep(Duration::from_secs(duration)).await;
            log::info!("Scenario duration elapsed, stopping agents");
            shutdown_handle.shutdown();
        });
    }

    let runner_context = Arc::new(runner_context);

    if let Err(e) = start_monitor(shutdown_handle.new_listener()) {
        log::warn!("Failed to start resource monitor: {e:?}");
    }

    let mut handles = Vec::with_capacity(definition.agent_count);
    for agent_index in 0..definition.agent_count {
        let definition = definition.clone();
        let runner_context = runner_context.clone();

        // Checked between cycles, separate from the listener handed to hooks.
        let cycle_shutdown_listener = shutdown_handle.new_listener();
        let delegated_shutdown_listener = shutdown_handle.new_listener();

        let agent_id = format!("agent-{agent_index}");
        let rng = match definition.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(agent_index as u64)),
            None => StdRng::from_entropy(),
        };

        let handle = std::thread::Builder::new()
            .name(agent_id.clone())
            .spawn(move || {
                let mut context = AgentContext::new(
                    agent_index,
                    agent_id,
                    runner_context,
                    delegated_shutdown_listener,
                    rng,
                );

                run_agent(&definition, &mut context, cycle_shutdown_listener)
            })
            .context("Failed to spawn thread for agent")?;

        handles.push(handle);
    }

    let mut running_agents = 0;
    for handle in handles {
        let still_running = handle
            .join()
            .map_err(|e| anyhow::anyhow!("Error joining thread for agent: {:?}", e))?;
        if still_running {
            running_agents += 1;
        }
    }

    // Agents can all bail before the duration is up, make sure background threads stop too.
    shutdown_handle.shutdown();

    if let Some(teardown_fn) = definition.teardown_fn {
        if let Err(e) = teardown_fn(runner_context.clone()) {
            log::error!("Teardown failed: {:?}", e);
        }
    }

    runner_context.reporter().finalize();

    log::info!(
        "Scenario {} finished with {}/{} agent(s) running",
        definition.name,
        running_agents,
        definition.agent_count
    );

    Ok(running_agents)
}

/// Drive one agent through setup, the action loop and teardown.
///
/// Returns whether the agent was still running when the scenario stopped.
fn run_agent<RV: UserValuesConstraint, V: UserValuesConstraint>(
    definition: &ScenarioDefinition<RV, V>,
    context: &mut AgentContext<RV, V>,
    cycle_shutdown_listener: DelegatedShutdownListener,
) -> bool {
    if let Some(setup_agent_fn) = definition.setup_agent_fn {
        if let Err(e) = setup_agent_fn(context) {
            log::error!("Agent setup failed for agent {}: {:?}", context.agent_id(), e);
            return false;
        }
    }

    let mut still_running = true;
    loop {
        if cycle_shutdown_listener.should_shutdown() {
            log::debug!("Stopping agent {}", context.agent_id());
            break;
        }

        let action = definition.choose_action(context.rng());
        match (action.behaviour())(context) {
            Ok(()) => {}
            Err(e) if e.is::<ShutdownSignalError>() => {
                // Abandoned by shutdown, the check at the top of the loop ends the agent.
                continue;
            }
            Err(e) if e.is::<AgentBailError>() => {
                log::warn!(
                    "Agent {} bailed during action [{}]: {}",
                    context.agent_id(),
                    action.name(),
                    e
                );
                still_running = false;
                break;
            }
            Err(e) => {
                log::error!(
                    "Action [{}] failed for agent {}: {:?}",
                    action.name(),
                    context.agent_id(),
                    e
                );
            }
        }

        let think_time = definition.sample_think_time(context.rng());
        if let Err(e) = context
            .runner_context()
            .executor()
            .sleep_in_place(think_time)
        {
            if !e.is::<ShutdownSignalError>() {
                log::error!("Think time failed for agent {}: {:?}", context.agent_id(), e);
            }
        }
    }

    if let Some(teardown_agent_fn) = definition.teardown_agent_fn {
        if let Err(e) = teardown_agent_fn(context) {
            log::error!(
                "Agent teardown failed for agent {}: {:?}",
                context.agent_id(),
                e
            );
        }
    }

    still_running
}
