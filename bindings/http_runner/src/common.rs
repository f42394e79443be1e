use http_client_instrumented::prelude::{HttpClient, HttpClientInstrumented, HttpResponse};
use squall_runner::prelude::{AgentBailError, AgentContext, HookResult};

use crate::context::HttpAgentContext;
use crate::runner_context::HttpRunnerContext;

/// Agent setup hook that creates an instrumented client for the run's base URL.
///
/// An unusable base URL makes the agent bail, since no request it makes could succeed.
pub fn connect_http_client(
    ctx: &mut AgentContext<HttpRunnerContext, HttpAgentContext>,
) -> HookResult {
    let base_url = ctx.runner_context().get_connection_string().to_string();
    let reporter = ctx.runner_context().reporter();

    let client = HttpClientInstrumented::new(&base_url, reporter)
        .map_err(|e| AgentBailError::new(format!("{e:#}")))?;

    log::debug!("Agent {} targeting {}", ctx.agent_id(), client.base_url());
    ctx.get_mut().set_client(client);

    Ok(())
}

/// Issue a GET for `path` against the run's base URL, blocking until the response is read.
///
/// Any failure, including a non-2xx status, is returned to the runner.
pub fn get<C: HttpClient>(
    ctx: &mut AgentContext<HttpRunnerContext, HttpAgentContext<C>>,
    path: &str,
) -> anyhow::Result<HttpResponse> {
    let client = ctx.get().client()?;
    let path = path.to_string();

    ctx.runner_context()
        .executor()
        .execute_in_place(async move { client.get(&path).await })
}
