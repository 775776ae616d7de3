use edgehog::http::mime;
use std::path::Path;

#[test]
fn test_common_web_types() {
    assert_eq!(mime::from_path(Path::new("index.html")), "text/html");
    assert_eq!(mime::from_path(Path::new("style.css")), "text/css");
    assert_eq!(mime::from_path(Path::new("app.js")), "text/javascript");
    assert_eq!(mime::from_path(Path::new("data.json")), "application/json");
}

#[test]
fn test_image_types() {
    assert_eq!(mime::from_path(Path::new("logo.png")), "image/png");
    assert_eq!(mime::from_path(Path::new("photo.jpg")), "image/jpeg");
    assert_eq!(mime::from_path(Path::new("photo.jpeg")), "image/jpeg");
    assert_eq!(mime::from_path(Path::new("icon.svg")), "image/svg+xml");
}

#[test]
fn test_extension_lookup_is_case_insensitive() {
    assert_eq!(mime::from_path(Path::new("INDEX.HTML")), "text/html");
    assert_eq!(mime::from_path(Path::new("Logo.PNG")), "image/png");
}

#[test]
fn test_unknown_or_missing_extension_falls_back() {
    assert_eq!(
        mime::from_path(Path::new("binary.xyz")),
        "application/octet-stream"
    );
    assert_eq!(
        mime::from_path(Path::new("Makefile")),
        "application/octet-stream"
    );
}
