use crate::http::request::{Method, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    /// No bytes, or no usable request line.
    Empty,
    /// A request line with no `/`-rooted target.
    Malformed,
    /// The method token is not one the server implements.
    UnsupportedMethod,
    /// The target path exceeds the configured bound.
    TargetTooLong,
}

/// Parses an accumulated request snapshot into a [`Request`].
///
/// `Empty` and `Malformed` are hard errors. `UnsupportedMethod` and
/// `TargetTooLong` are soft: they are recorded on the returned request, which
/// stays usable for its other fields.
pub fn parse_request(bytes: &[u8], max_target_len: usize) -> Result<Request, RequestError> {
    if bytes.is_empty() {
        return Err(RequestError::Empty);
    }

    let raw = String::from_utf8_lossy(bytes);
    let mut lines: Vec<String> = raw
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect();
    // A trailing newline leaves an empty remainder behind it, not a line.
    if lines.last().is_some_and(|l| l.is_empty()) && raw.ends_with('\n') {
        lines.pop();
    }

    let Some(request_line) = lines.first().filter(|l| !l.trim().is_empty()) else {
        return Err(RequestError::Empty);
    };

    let mut errors = Vec::new();

    let method = request_line
        .split_whitespace()
        .next()
        .and_then(Method::from_token);
    if method.is_none() {
        errors.push(RequestError::UnsupportedMethod);
    }

    let Some(start) = request_line.find('/') else {
        return Err(RequestError::Malformed);
    };
    let rest = &request_line[start..];
    let raw_target = match rest.find(' ') {
        Some(end) => &rest[..end],
        None => rest,
    };

    // Oversize yields an error, never a truncated target.
    let target = if raw_target.len() > max_target_len {
        errors.push(RequestError::TargetTooLong);
        None
    } else {
        Some(raw_target.to_string())
    };

    Ok(Request {
        raw_len: bytes.len(),
        lines,
        method,
        target,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = parse_request(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n", 255).unwrap();

        assert_eq!(req.method, Some(Method::Get));
        assert_eq!(req.target.as_deref(), Some("/"));
        assert!(req.is_valid());
        assert_eq!(req.lines[1], "Host: example.com");
    }
}
