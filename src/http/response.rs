use bytes::{BufMut, Bytes, BytesMut};
use chrono::Utc;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Default headers injected into every response, ahead of caller headers.
static DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("Connection", "Keep-Alive"),
    ("Server", concat!("edgehog/", env!("CARGO_PKG_VERSION"))),
];

/// HTTP status codes supported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 413 Payload Too Large
    PayloadTooLarge,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use edgehog::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::PayloadTooLarge => 413,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }
}

/// A complete HTTP response, serialized once at construction time.
///
/// The wire image is the byte sequence the streaming writer sends; its length
/// is the response's `total_len`, and it never changes after `build()`.
#[derive(Debug)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// All headers in serialization order: injected defaults, then caller headers
    pub headers: Vec<(String, String)>,
    /// Response body as bytes
    pub body: Bytes,
    wire: Bytes,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// use edgehog::http::response::{ResponseBuilder, StatusCode};
///
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/plain")
///     .body("hello")
///     .build();
/// assert_eq!(response.content_length(), 5);
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Appends a caller header. Caller headers are serialized after the
    /// injected defaults and are never dropped.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the final Response.
    ///
    /// Injects `Date`, `Content-Length` (computed from the body) and the
    /// default `Connection`/`Server` pair ahead of any caller headers, then
    /// serializes the whole response into its wire image.
    pub fn build(self) -> Response {
        let mut headers = Vec::with_capacity(self.headers.len() + 4);
        headers.push(("Date".to_string(), http_date()));
        headers.push(("Content-Length".to_string(), self.body.len().to_string()));
        for (key, value) in DEFAULT_HEADERS {
            headers.push(((*key).to_string(), (*value).to_string()));
        }
        headers.extend(self.headers);

        let wire = serialize(self.status, &headers, &self.body);

        Response {
            status: self.status,
            headers,
            body: self.body,
            wire,
        }
    }
}

/// Serialization order: status line, header lines, a blank-line separator,
/// body. Header lines end in `\n`; the separator is `\r\n`.
fn serialize(status: StatusCode, headers: &[(String, String)], body: &[u8]) -> Bytes {
    let mut buf = BytesMut::new();

    buf.put_slice(
        format!(
            "{} {} {}\n",
            HTTP_VERSION,
            status.as_u16(),
            status.reason_phrase()
        )
        .as_bytes(),
    );

    for (key, value) in headers {
        buf.put_slice(key.as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(value.as_bytes());
        buf.put_slice(b"\n");
    }

    buf.put_slice(b"\r\n");
    buf.put_slice(body);

    buf.freeze()
}

fn http_date() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

impl Response {
    /// Creates a 200 OK response with the given body and content type.
    pub fn ok(body: impl Into<Bytes>, content_type: &str) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", content_type)
            .body(body)
            .build()
    }

    /// Creates a 400 Bad Request response.
    pub fn bad_request() -> Self {
        ResponseBuilder::new(StatusCode::BadRequest)
            .body("<html><h1>400 - Bad Request</h1></html>")
            .build()
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        ResponseBuilder::new(StatusCode::NotFound)
            .body("<html><h1>404 - Not Found</h1></html>")
            .build()
    }

    /// Creates a 413 Payload Too Large response; used both for oversized
    /// request targets and for requests that outgrow the configured bound.
    pub fn payload_too_large() -> Self {
        ResponseBuilder::new(StatusCode::PayloadTooLarge)
            .body("<html><h1>413 - Payload Too Large</h1></html>")
            .build()
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_error() -> Self {
        ResponseBuilder::new(StatusCode::InternalServerError)
            .body("<html><h1>500 - Internal Server Error</h1></html>")
            .build()
    }

    /// Creates a 501 Not Implemented response.
    pub fn not_implemented() -> Self {
        ResponseBuilder::new(StatusCode::NotImplemented)
            .body("<html><h1>501 - Not Implemented</h1></html>")
            .build()
    }

    /// The serialized byte sequence sent on the wire.
    pub fn wire(&self) -> Bytes {
        self.wire.clone()
    }

    /// Total length of the serialized response.
    pub fn total_len(&self) -> usize {
        self.wire.len()
    }

    /// Body length, as advertised in `Content-Length`.
    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// Looks up the first header with the given name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}
