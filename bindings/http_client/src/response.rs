use bytes::Bytes;

/// A successful response, with the body fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: u16,
    body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: Bytes) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}
