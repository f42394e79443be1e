mod action;
mod cli;
mod context;
mod definition;
mod executor;
mod monitor;
mod progress;
mod run;
mod shutdown;
mod think_time;
mod types;

pub mod prelude {
    pub use crate::action::{Action, ActionSet};
    pub use crate::cli::{ReporterOpt, SquallScenarioCli};
    pub use crate::context::{AgentContext, RunnerContext, UserValuesConstraint};
    pub use crate::definition::{
        AgentHookMut, DefinitionError, GlobalHook, GlobalHookMut, HookResult,
        ScenarioDefinitionBuilder,
    };
    pub use crate::executor::Executor;
    pub use crate::run::run;
    pub use crate::think_time::{ThinkTime, ThinkTimeError};
    pub use crate::types::SquallResult;

    pub use squall_core::prelude::{AgentBailError, DelegatedShutdownListener, ShutdownSignalError};
}
