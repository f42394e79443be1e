use std::sync::Arc;

use clap::Parser;

use crate::action::{Action, ActionSet};
use crate::cli::{ReporterOpt, SquallScenarioCli};
use crate::context::{AgentContext, RunnerContext, UserValuesConstraint};
use crate::think_time::{ThinkTime, ThinkTimeError};

pub type HookResult = anyhow::Result<()>;

pub type GlobalHookMut<RV> = fn(&mut RunnerContext<RV>) -> HookResult;
pub type AgentHookMut<RV, V> = fn(&mut AgentContext<RV, V>) -> HookResult;
pub type GlobalHook<RV> = fn(Arc<RunnerContext<RV>>) -> HookResult;

#[derive(derive_more::Error, derive_more::Display, Debug, PartialEq)]
pub enum DefinitionError {
    #[display("Scenario must define at least one action")]
    NoActions,
    #[display("Action [{name}] is already defined")]
    DuplicateAction { name: String },
    #[display("Action [{name}] must have a weight greater than zero")]
    ZeroWeight { name: String },
    #[display("Action weights add up to more than {}", u32::MAX)]
    WeightOverflow,
    #[display("No connection string provided, pass --connection-string or set a scenario default")]
    NoConnectionString,
    #[display("Cannot run a scenario with zero agents")]
    NoAgents,
}

/// The builder for a scenario definition.
///
/// Every scenario binary creates one of these in `main`, registers its think time, actions and
/// hooks, then hands it to [crate::prelude::run].
pub struct ScenarioDefinitionBuilder<RV: UserValuesConstraint, V: UserValuesConstraint> {
    /// The name of the scenario. Recommended value is `env!("CARGO_PKG_NAME")`.
    name: String,
    cli: SquallScenarioCli,
    default_duration_s: Option<u64>,
    default_connection_string: Option<String>,
    /// Pause between actions. The CLI can override either bound.
    think_time: ThinkTime,
    /// Global setup hook, run once before any agents are started.
    setup_fn: Option<GlobalHookMut<RV>>,
    /// Run once by each agent as it starts, before its first action.
    setup_agent_fn: Option<AgentHookMut<RV, V>>,
    /// Actions in registration order. Validated when the scenario is built.
    actions: Vec<Action<RV, V>>,
    /// Run once by each agent after it stops, whatever the reason.
    teardown_agent_fn: Option<AgentHookMut<RV, V>>,
    /// Global teardown hook, run once after all agents have stopped. Best effort: an error here
    /// is logged and does not fail the run.
    teardown_fn: Option<GlobalHook<RV>>,
}

/// A validated scenario, ready to run.
pub struct ScenarioDefinition<RV: UserValuesConstraint, V: UserValuesConstraint> {
    pub name: String,
    pub connection_string: String,
    pub agent_count: usize,
    pub duration_s: Option<u64>,
    pub no_progress: bool,
    pub reporter: ReporterOpt,
    pub run_id: Option<String>,
    pub seed: Option<u64>,
    pub think_time: ThinkTime,
    pub actions: ActionSet<RV, V>,
    pub setup_fn: Option<GlobalHookMut<RV>>,
    pub setup_agent_fn: Option<AgentHookMut<RV, V>>,
    pub teardown_agent_fn: Option<AgentHookMut<RV, V>>,
    pub teardown_fn: Option<GlobalHook<RV>>,
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> ScenarioDefinitionBuilder<RV, V> {
    /// Create a scenario definition from a name and an already parsed CLI configuration.
    pub fn new(name: &str, cli: SquallScenarioCli) -> Self {
        Self {
            name: name.to_string(),
            cli,
            default_duration_s: None,
            default_connection_string: None,
            think_time: ThinkTime::default(),
            setup_fn: None,
            setup_agent_fn: None,
            actions: Vec::new(),
            teardown_agent_fn: None,
            teardown_fn: None,
        }
    }

    /// Initialise logging, parse the command line and create a scenario definition.
    pub fn new_with_init(name: &str) -> anyhow::Result<Self> {
        env_logger::init();
        let cli = SquallScenarioCli::parse();
        Ok(Self::new(name, cli))
    }

    /// How long to run for when `--duration` is not given.
    pub fn with_default_duration_s(mut self, duration: u64) -> Self {
        self.default_duration_s = Some(duration);
        self
    }

    /// Base URL to use when `--connection-string` is not given.
    pub fn with_default_connection_string(mut self, connection_string: &str) -> Self {
        self.default_connection_string = Some(connection_string.to_string());
        self
    }

    /// Set the pause agents take between actions. Defaults to no pause.
    pub fn with_think_time(mut self, think_time: ThinkTime) -> Self {
        self.think_time = think_time;
        self
    }

    pub fn use_setup(mut self, setup_fn: GlobalHookMut<RV>) -> Self {
        self.setup_fn = Some(setup_fn);
        self
    }

    pub fn use_agent_setup(mut self, setup_agent_fn: AgentHookMut<RV, V>) -> Self {
        self.setup_agent_fn = Some(setup_agent_fn);
        self
    }

    /// Register an action with the default weight of 1.
    pub fn use_action(self, name: &str, behaviour: AgentHookMut<RV, V>) -> Self {
        self.use_weighted_action(name, 1, behaviour)
    }

    /// Register an action that is picked `weight` times as often as an action of weight 1.
    pub fn use_weighted_action(
        mut self,
        name: &str,
        weight: u32,
        behaviour: AgentHookMut<RV, V>,
    ) -> Self {
        self.actions.push(Action::new(name, weight, behaviour));
        self
    }

    pub fn use_agent_teardown(mut self, teardown_agent_fn: AgentHookMut<RV, V>) -> Self {
        self.teardown_agent_fn = Some(teardown_agent_fn);
        self
    }

    pub fn use_teardown(mut self, teardown_fn: GlobalHook<RV>) -> Self {
        self.teardown_fn = Some(teardown_fn);
        self
    }

    pub(crate) fn build(self) -> anyhow::Result<ScenarioDefinition<RV, V>> {
        let actions = ActionSet::new(self.actions)?;
        let think_time = resolve_think_time(
            self.think_time,
            self.cli.think_time_min,
            self.cli.think_time_max,
        )?;

        let connection_string = self
            .cli
            .connection_string
            .or(self.default_connection_string)
            .ok_or(DefinitionError::NoConnectionString)?;

        let agent_count = self.cli.agents.unwrap_or(1);
        if agent_count == 0 {
            return Err(DefinitionError::NoAgents.into());
        }

        let duration_s = if self.cli.soak {
            None
        } else {
            self.cli.duration.or(self.default_duration_s)
        };

        Ok(ScenarioDefinition {
            name: self.name,
            connection_string,
            agent_count,
            duration_s,
            no_progress: self.cli.no_progress,
            reporter: self.cli.reporter,
            run_id: self.cli.run_id,
            seed: self.cli.seed,
            think_time,
            actions,
            setup_fn: self.setup_fn,
            setup_agent_fn: self.setup_agent_fn,
            teardown_agent_fn: self.teardown_agent_fn,
            teardown_fn: self.teardown_fn,
        })
    }
}

fn resolve_think_time(
    default: ThinkTime,
    min_override: Option<f64>,
    max_override: Option<f64>,
) -> Result<ThinkTime, ThinkTimeError> {
    if min_override.is_none() && max_override.is_none() {
        return Ok(default);
    }

    ThinkTime::between(
        min_override.unwrap_or(default.min().as_secs_f64()),
        max_override.unwrap_or(default.max().as_secs_f64()),
    )
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> ScenarioDefinition<RV, V> {
    /// Sample the pause before an agent's next action.
    pub fn sample_think_time<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> std::time::Duration {
        self.think_time.sample(rng)
    }

    /// Pick the action an agent runs next.
    pub fn choose_action<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> &Action<RV, V> {
        self.actions.choose(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct Values;
    impl UserValuesConstraint for Values {}

    fn homepage(_ctx: &mut AgentContext<Values, Values>) -> HookResult {
        Ok(())
    }

    fn cli(args: &[&str]) -> SquallScenarioCli {
        SquallScenarioCli::try_parse_from(std::iter::once("test").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn build_with_scenario_defaults() {
        let definition = ScenarioDefinitionBuilder::<Values, Values>::new("homepage", cli(&[]))
            .with_default_connection_string("http://localhost:4000")
            .with_default_duration_s(60)
            .with_think_time(ThinkTime::between(5.0, 15.0).unwrap())
            .use_action("homepage", homepage)
            .build()
            .unwrap();

        assert_eq!("homepage", definition.name);
        assert_eq!("http://localhost:4000", definition.connection_string);
        assert_eq!(1, definition.agent_count);
        assert_eq!(Some(60), definition.duration_s);
        assert_eq!(Duration::from_secs(5), definition.think_time.min());
        assert_eq!(Duration::from_secs(15), definition.think_time.max());
        assert_eq!(1, definition.actions.iter().count());
    }

    #[test]
    fn cli_overrides_scenario_defaults() {
        let definition = ScenarioDefinitionBuilder::<Values, Values>::new(
            "homepage",
            cli(&[
                "-c",
                "http://staging.local",
                "--duration",
                "10",
                "--agents",
                "3",
                "--think-time-max",
                "8",
            ]),
        )
        .with_default_connection_string("http://localhost:4000")
        .with_default_duration_s(60)
        .with_think_time(ThinkTime::between(5.0, 15.0).unwrap())
        .use_action("homepage", homepage)
        .build()
        .unwrap();

        assert_eq!("http://staging.local", definition.connection_string);
        assert_eq!(Some(10), definition.duration_s);
        assert_eq!(3, definition.agent_count);
        assert_eq!(Duration::from_secs(5), definition.think_time.min());
        assert_eq!(Duration::from_secs(8), definition.think_time.max());
    }

    #[test]
    fn soak_ignores_durations() {
        let definition = ScenarioDefinitionBuilder::<Values, Values>::new(
            "homepage",
            cli(&["-c", "http://localhost", "--soak", "--duration", "10"]),
        )
        .with_default_duration_s(60)
        .use_action("homepage", homepage)
        .build()
        .unwrap();

        assert_eq!(None, definition.duration_s);
    }

    #[test]
    fn override_that_inverts_think_time_is_rejected() {
        let err = ScenarioDefinitionBuilder::<Values, Values>::new(
            "homepage",
            cli(&["-c", "http://localhost", "--think-time-min", "20"]),
        )
        .with_think_time(ThinkTime::between(5.0, 15.0).unwrap())
        .use_action("homepage", homepage)
        .build()
        .err()
        .unwrap();

        assert!(err.is::<ThinkTimeError>());
    }

    #[test]
    fn oversized_think_time_override_is_rejected() {
        let err = ScenarioDefinitionBuilder::<Values, Values>::new(
            "homepage",
            cli(&["-c", "http://localhost", "--think-time-max", "1e20"]),
        )
        .with_think_time(ThinkTime::between(5.0, 15.0).unwrap())
        .use_action("homepage", homepage)
        .build()
        .err()
        .unwrap();

        assert!(matches!(
            err.downcast_ref::<ThinkTimeError>(),
            Some(ThinkTimeError::OutOfRange { .. })
        ));
    }

    #[test]
    fn missing_actions_or_connection_string_are_rejected() {
        let err = ScenarioDefinitionBuilder::<Values, Values>::new(
            "homepage",
            cli(&["-c", "http://localhost"]),
        )
        .build()
        .err()
        .unwrap();
        assert_eq!(
            Some(&DefinitionError::NoActions),
            err.downcast_ref::<DefinitionError>()
        );

        let err = ScenarioDefinitionBuilder::<Values, Values>::new("homepage", cli(&[]))
            .use_action("homepage", homepage)
            .build()
            .err()
            .unwrap();
        assert_eq!(
            Some(&DefinitionError::NoConnectionString),
            err.downcast_ref::<DefinitionError>()
        );
    }

    #[test]
    fn definition_exposes_think_time_and_actions() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let definition = ScenarioDefinitionBuilder::<Values, Values>::new(
            "homepage",
            cli(&["-c", "http://localhost"]),
        )
        .with_think_time(ThinkTime::between(5.0, 15.0).unwrap())
        .use_action("homepage", homepage)
        .build()
        .unwrap();

        let mut rng = StdRng::seed_from_u64(5);
        let sample = definition.sample_think_time(&mut rng);
        assert!(sample >= Duration::from_secs(5) && sample <= Duration::from_secs(15));
        assert_eq!("homepage", definition.choose_action(&mut rng).name());
    }
}
