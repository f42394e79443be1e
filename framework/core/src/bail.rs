/// Return this error from an agent hook or action to stop that agent.
///
/// Use it when an agent hits a problem it cannot recover from, such as a base URL that can never
/// produce a valid request. The agent stops running actions but the other agents in the scenario
/// keep going.
#[derive(derive_more::Error, derive_more::Display, Debug)]
#[display("Agent is bailing: {reason}")]
pub struct AgentBailError {
    reason: String,
}

impl AgentBailError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for AgentBailError {
    fn default() -> Self {
        Self::new("unrecoverable agent error")
    }
}
