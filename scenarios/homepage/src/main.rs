use http_squall_runner::prelude::*;

fn homepage<C: HttpClient>(
    ctx: &mut AgentContext<HttpRunnerContext, HttpAgentContext<C>>,
) -> HookResult {
    get(ctx, "/")?;
    Ok(())
}

fn main() -> SquallResult<()> {
    let builder =
        ScenarioDefinitionBuilder::<HttpRunnerContext, HttpAgentContext>::new_with_init(
            env!("CARGO_PKG_NAME"),
        )?
        .with_default_duration_s(60)
        .with_think_time(ThinkTime::between(5.0, 15.0)?)
        .use_agent_setup(connect_http_client)
        .use_action("homepage", homepage::<HttpClientInstrumented>);

    run(builder)?;

    Ok(())
}
