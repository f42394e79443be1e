use squall_runner::prelude::UserValuesConstraint;

/// HTTP specific runner context values.
///
/// The base URL is the runner's connection string, so nothing else needs sharing yet.
#[derive(Debug, Default)]
pub struct HttpRunnerContext;

impl UserValuesConstraint for HttpRunnerContext {}
