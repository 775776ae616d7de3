/// HTTP request methods.
///
/// Only GET is recognized; any other token on the request line is reported as
/// [`RequestError::UnsupportedMethod`] and answered with 501.
///
/// [`RequestError::UnsupportedMethod`]: crate::http::parser::RequestError::UnsupportedMethod
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    Get,
}

impl Method {
    /// Parses an HTTP method from a request-line token (case-sensitive).
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::Get),
            _ => None,
        }
    }
}

/// Represents a parsed HTTP request from a client.
///
/// This is a best-effort structure: soft parse errors leave the request
/// otherwise usable, so the caller can pick the most specific error response.
#[derive(Debug, Clone)]
pub struct Request {
    /// Byte length of the raw request the parser was given.
    pub raw_len: usize,
    /// Request lines, split on `\n` with any trailing `\r` removed.
    pub lines: Vec<String>,
    /// The request method, if the token was recognized.
    pub method: Option<Method>,
    /// The target path, if one was found and fit the configured bound.
    pub target: Option<String>,
    /// Soft errors recorded while parsing; empty for a well-formed request.
    pub errors: Vec<super::parser::RequestError>,
}

impl Request {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The most specific soft error, in the order the request line is
    /// evaluated: the method token before the target path.
    pub fn primary_error(&self) -> Option<&super::parser::RequestError> {
        use super::parser::RequestError;
        self.errors
            .iter()
            .find(|e| matches!(**e, RequestError::UnsupportedMethod))
            .or_else(|| self.errors.first())
    }
}
