use squall_core::prelude::AgentBailError;

/// The server answered with a status outside of 2xx.
#[derive(derive_more::Error, derive_more::Display, Debug, Clone, PartialEq, Eq)]
#[display("GET {url} returned status {status}")]
pub struct HttpStatusError {
    pub url: String,
    pub status: u16,
}

/// Convert a request failure into an `anyhow::Error` for the runner.
///
/// A request that cannot even be built will fail the same way on every attempt, so the agent
/// bails. Transport failures such as refused connections or timeouts are ordinary errors that get
/// counted and the agent carries on.
pub fn handle_request_err(err: reqwest::Error) -> anyhow::Error {
    if err.is_builder() {
        AgentBailError::new(format!("cannot build request: {err}")).into()
    } else {
        anyhow::anyhow!("HTTP request error: {err}")
    }
}
