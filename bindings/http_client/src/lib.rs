mod client;
mod error;
mod response;

pub mod prelude {
    pub use crate::client::{HttpClient, HttpClientInstrumented};
    pub use crate::error::{handle_request_err, HttpStatusError};
    pub use crate::response::HttpResponse;
}
