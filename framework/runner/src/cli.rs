use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(about, long_about = None)]
pub struct SquallScenarioCli {
    /// Base URL of the service to test, for example `http://localhost:4000`.
    ///
    /// Overrides the scenario's default connection string, if it has one.
    #[clap(short, long)]
    pub connection_string: Option<String>,

    /// The number of agents to run
    #[clap(long)]
    pub agents: Option<usize>,

    /// The number of seconds to run the scenario for
    #[clap(long)]
    pub duration: Option<u64>,

    /// Run this test as a soak test, ignoring any configured duration and continuing to run until stopped
    #[clap(long, default_value = "false")]
    pub soak: bool,

    /// Do not show a progress bar on the CLI.
    ///
    /// This is recommended for CI/CD environments where the progress bar isn't being looked at by anyone and is just adding noise to the logs.
    #[clap(long, default_value = "false")]
    pub no_progress: bool,

    /// The reporter to use.
    #[arg(long, value_enum, default_value_t = ReporterOpt::InMemory)]
    pub reporter: ReporterOpt,

    /// Set the ID of this run
    ///
    /// If not set, a random ID is used.
    #[arg(long, short)]
    pub run_id: Option<String>,

    /// Override the lower bound of the scenario's think time, in seconds.
    #[arg(long)]
    pub think_time_min: Option<f64>,

    /// Override the upper bound of the scenario's think time, in seconds.
    #[arg(long)]
    pub think_time_max: Option<f64>,

    /// Seed for the agents' random number generators. Agent `n` is seeded with `seed + n`.
    ///
    /// If not set, every agent is seeded from system entropy.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReporterOpt {
    /// Keep operations in memory and log a tally at the end of the run.
    #[default]
    InMemory,

    /// Discard operations.
    Noop,
}
