use anyhow::Context;
use http_client_instrumented::prelude::{HttpClient, HttpClientInstrumented};
use squall_runner::prelude::UserValuesConstraint;
use std::sync::Arc;

/// HTTP specific agent context values.
///
/// Generic over the client so that scenarios can be exercised against a stand-in client.
#[derive(Debug)]
pub struct HttpAgentContext<C: HttpClient = HttpClientInstrumented> {
    client: Option<Arc<C>>,
}

impl<C: HttpClient> Default for HttpAgentContext<C> {
    fn default() -> Self {
        Self { client: None }
    }
}

impl<C: HttpClient> UserValuesConstraint for HttpAgentContext<C> {}

impl<C: HttpClient> HttpAgentContext<C> {
    pub fn client(&self) -> anyhow::Result<Arc<C>> {
        self.client.clone().context(
            "HTTP client is not set, did you forget to call `connect_http_client` in your agent setup?",
        )
    }

    pub fn set_client(&mut self, client: C) {
        self.client = Some(Arc::new(client));
    }
}
