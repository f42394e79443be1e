use std::{fmt::Debug, sync::Arc};

use rand::rngs::StdRng;
use squall_core::prelude::{DelegatedShutdownListener, ShutdownHandle};
use squall_instruments::Reporter;

use crate::executor::Executor;

/// Bound for the custom values that scenarios store in [RunnerContext] and [AgentContext].
pub trait UserValuesConstraint: Default + Debug + Send + Sync + 'static {}

/// State shared by every agent in a run. Mutable only during the global setup hook.
#[derive(Debug)]
pub struct RunnerContext<RV: UserValuesConstraint> {
    executor: Arc<Executor>,
    reporter: Arc<Reporter>,
    shutdown_handle: ShutdownHandle,
    connection_string: String,
    run_id: String,
    value: RV,
}

impl<RV: UserValuesConstraint> RunnerContext<RV> {
    pub(crate) fn new(
        executor: Arc<Executor>,
        reporter: Arc<Reporter>,
        shutdown_handle: ShutdownHandle,
        connection_string: String,
        run_id: String,
    ) -> Self {
        Self {
            executor,
            reporter,
            shutdown_handle,
            connection_string,
            run_id,
            value: Default::default(),
        }
    }

    /// A handle to the executor for running async code from a hook.
    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    /// The reporter that instrumented clients send operations to.
    pub fn reporter(&self) -> Arc<Reporter> {
        self.reporter.clone()
    }

    /// The base URL of the system under test.
    pub fn get_connection_string(&self) -> &str {
        &self.connection_string
    }

    pub fn get_run_id(&self) -> &str {
        &self.run_id
    }

    /// Stop the scenario, as if the configured duration had elapsed.
    pub fn force_stop_scenario(&self) {
        self.shutdown_handle.shutdown();
    }

    pub fn get_mut(&mut self) -> &mut RV {
        &mut self.value
    }

    pub fn get(&self) -> &RV {
        &self.value
    }
}

/// State owned by a single agent. Nothing in here is shared with other agents.
pub struct AgentContext<RV: UserValuesConstraint, V: UserValuesConstraint> {
    agent_index: usize,
    agent_id: String,
    runner_context: Arc<RunnerContext<RV>>,
    shutdown_listener: DelegatedShutdownListener,
    rng: StdRng,
    value: V,
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> AgentContext<RV, V> {
    pub(crate) fn new(
        agent_index: usize,
        agent_id: String,
        runner_context: Arc<RunnerContext<RV>>,
        shutdown_listener: DelegatedShutdownListener,
        rng: StdRng,
    ) -> Self {
        Self {
            agent_index,
            agent_id,
            runner_context,
            shutdown_listener,
            rng,
            value: Default::default(),
        }
    }

    /// The position of this agent in the run, starting from 0.
    pub fn agent_index(&self) -> usize {
        self.agent_index
    }

    /// A display name for the agent, unique within a run.
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn runner_context(&self) -> &Arc<RunnerContext<RV>> {
        &self.runner_context
    }

    /// Listen for the scenario stopping. Long running actions can race against this.
    pub fn shutdown_listener(&mut self) -> &mut DelegatedShutdownListener {
        &mut self.shutdown_listener
    }

    /// This agent's random source. Seeded from `--seed` when one is given.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn get_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub fn get(&self) -> &V {
        &self.value
    }
}
