use edgehog::http::parser::{RequestError, parse_request};
use edgehog::http::request::Method;

#[test]
fn test_parse_bare_request_line() {
    let req = parse_request(b"GET /x HTTP/1.1", 255).unwrap();

    assert_eq!(req.method, Some(Method::Get));
    assert_eq!(req.target.as_deref(), Some("/x"));
    assert!(req.is_valid());
    assert!(req.primary_error().is_none());
}

#[test]
fn test_parse_full_request() {
    let raw = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nAccept: */*\r\n\r\n";
    let req = parse_request(raw, 255).unwrap();

    assert_eq!(req.method, Some(Method::Get));
    assert_eq!(req.target.as_deref(), Some("/index.html"));
    assert_eq!(req.raw_len, raw.len());
    assert!(req.is_valid());
}

#[test]
fn test_lines_are_split_on_newlines() {
    let raw = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let req = parse_request(raw, 255).unwrap();

    assert_eq!(req.lines.len(), 3);
    assert_eq!(req.lines[0], "GET / HTTP/1.1");
    assert_eq!(req.lines[1], "Host: example.com");
    assert_eq!(req.lines[2], "");
}

#[test]
fn test_unknown_method_is_a_soft_error() {
    let req = parse_request(b"POST /submit HTTP/1.1\r\n\r\n", 255).unwrap();

    assert_eq!(req.method, None);
    assert!(matches!(
        req.primary_error(),
        Some(RequestError::UnsupportedMethod)
    ));
    // The rest of the request stays usable.
    assert_eq!(req.target.as_deref(), Some("/submit"));
}

#[test]
fn test_lowercase_method_is_not_recognized() {
    let req = parse_request(b"get / HTTP/1.1\r\n\r\n", 255).unwrap();
    assert!(matches!(
        req.primary_error(),
        Some(RequestError::UnsupportedMethod)
    ));
}

#[test]
fn test_target_over_bound_is_an_error_not_a_truncation() {
    let raw = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(32));
    let req = parse_request(raw.as_bytes(), 16).unwrap();

    assert_eq!(req.method, Some(Method::Get));
    assert_eq!(req.target, None);
    assert!(matches!(
        req.primary_error(),
        Some(RequestError::TargetTooLong)
    ));
}

#[test]
fn test_target_exactly_at_bound_is_accepted() {
    // "/aaa" is 4 bytes with the bound set to 4.
    let req = parse_request(b"GET /aaa HTTP/1.1\r\n\r\n", 4).unwrap();
    assert_eq!(req.target.as_deref(), Some("/aaa"));
    assert!(req.is_valid());
}

#[test]
fn test_soft_errors_coexist_and_method_wins() {
    let raw = format!("POST /{} HTTP/1.1\r\n\r\n", "a".repeat(32));
    let req = parse_request(raw.as_bytes(), 16).unwrap();

    assert_eq!(req.errors.len(), 2);
    assert!(matches!(
        req.primary_error(),
        Some(RequestError::UnsupportedMethod)
    ));
}

#[test]
fn test_empty_input_is_a_hard_error() {
    assert!(matches!(parse_request(b"", 255), Err(RequestError::Empty)));
}

#[test]
fn test_blank_request_line_is_a_hard_error() {
    assert!(matches!(parse_request(b"\n", 255), Err(RequestError::Empty)));
    assert!(matches!(
        parse_request(b"   \r\n", 255),
        Err(RequestError::Empty)
    ));
}

#[test]
fn test_request_line_without_target_is_malformed() {
    assert!(matches!(
        parse_request(b"GET HTTP\r\n\r\n", 255),
        Err(RequestError::Malformed)
    ));
    assert!(matches!(
        parse_request(b"\x00\x01\x02garbage", 255),
        Err(RequestError::Malformed)
    ));
}

#[test]
fn test_target_runs_until_the_next_space() {
    let req = parse_request(b"GET /a/b/c.txt HTTP/1.1\r\n\r\n", 255).unwrap();
    assert_eq!(req.target.as_deref(), Some("/a/b/c.txt"));
}

#[test]
fn test_target_without_trailing_version_runs_to_end_of_line() {
    let req = parse_request(b"GET /only", 255).unwrap();
    assert_eq!(req.target.as_deref(), Some("/only"));
}
