//! Tests for the inbound request parser.

#[cfg(test)]
mod tests {
    use crate::parser::{HttpRequest, HttpVersion, Error, find_head_end, parse_request};

    #[test]
    fn test_parse_simple_get_request() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.method, "GET");
        assert_eq!(result.path, "/index.html");
        assert_eq!(result.version, HttpVersion::Http11);
        assert_eq!(result.get_header("Host"), Some("example.com"));
        assert!(result.body.is_empty());
    }

    #[test]
    fn test_headers_keep_arrival_order() {
        let request = b"GET / HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test\r\nAccept: */*\r\n\r\n";
        let result = parse_request(request).unwrap();
        let names: Vec<&str> = result.headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["Host", "User-Agent", "Accept"]);
    }

    #[test]
    fn test_case_insensitive_headers() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert!(result.has_header("host"));
        assert!(result.has_header("HOST"));
        assert!(!result.has_header("X-Missing"));
    }

    #[test]
    fn test_unknown_methods_pass_through() {
        for method in ["GET", "PROPFIND", "BREW", "get"] {
            let request = format!("{method} / HTTP/1.1\r\nHost: example.com\r\n\r\n");
            let result = parse_request(request.as_bytes()).unwrap();
            assert_eq!(result.method, method);
        }
    }

    #[test]
    fn test_missing_host_header() {
        let request = b"GET /index.html HTTP/1.1\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MissingHeader(ref h)) if h == "Host"));
    }

    #[test]
    fn test_http10_without_host() {
        let request = b"GET /index.html HTTP/1.0\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.version, HttpVersion::Http10);
        assert!(result.headers.is_empty());
    }

    #[test]
    fn test_invalid_http_version() {
        let request = b"GET /index.html HTTP/9.9\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidVersion(ref v)) if v == "HTTP/9.9"));
    }

    #[test]
    fn test_invalid_header_format() {
        let request = b"GET /index.html HTTP/1.1\r\nInvalidHeader\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidHeaderFormat)));
    }

    #[test]
    fn test_empty_request() {
        assert!(matches!(parse_request(b""), Err(Error::EmptyRequest)));
        assert!(matches!(parse_request(b"\r\n\r\n"), Err(Error::EmptyRequest)));
    }

    #[test]
    fn test_malformed_request_lines() {
        assert!(matches!(parse_request(b"GET\r\n"), Err(Error::MalformedRequestLine(_))));
        assert!(matches!(
            parse_request(b"GET  HTTP/1.1\r\nHost: example.com\r\n\r\n"),
            Err(Error::MalformedRequestLine(_))
        ));
        assert!(matches!(parse_request(b"INVALID REQUEST"), Err(Error::MalformedRequestLine(_))));
    }

    #[test]
    fn test_target_is_not_decoded() {
        let request = b"GET /search?q=test%20query&page=1 HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.path, "/search?q=test%20query&page=1");
    }

    #[test]
    fn test_headers_with_colons_and_whitespace() {
        let request = b"GET / HTTP/1.1\r\nHost:  example.com:8080  \r\nX-Test: a:b:c\r\nX-Empty:\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.get_header("Host"), Some("example.com:8080"));
        assert_eq!(result.get_header("X-Test"), Some("a:b:c"));
        assert_eq!(result.get_header("X-Empty"), Some(""));
    }

    #[test]
    fn test_duplicate_headers_are_all_kept() {
        let request = b"GET / HTTP/1.1\r\nHost: example.com\r\nX-Test: value1\r\nX-Test: value2\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers.len(), 3);
        assert_eq!(result.get_header("X-Test"), Some("value1"));
    }

    #[test]
    fn test_mixed_line_endings() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\nUser-Agent: test\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.get_header("Host"), Some("example.com"));
        assert_eq!(result.get_header("User-Agent"), Some("test"));
    }

    #[test]
    fn test_malformed_utf8_in_head() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nX-Test: \xFF\xFF\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MalformedRequestLine(ref s)) if s == "Invalid UTF-8"));
    }

    #[test]
    fn test_body_follows_content_length() {
        let request = b"POST /api HTTP/1.1\r\nHost: example.com\r\nContent-Length: 5\r\n\r\nhello world";
        let result = parse_request(request).unwrap();
        assert_eq!(result.body, b"hello");
        assert_eq!(result.content_length().unwrap(), Some(5));
    }

    #[test]
    fn test_body_may_be_binary() {
        let mut request = b"POST / HTTP/1.1\r\nHost: h\r\nContent-Length: 3\r\n\r\n".to_vec();
        request.extend_from_slice(&[0x00, 0xFF, 0x10]);
        let result = parse_request(&request).unwrap();
        assert_eq!(result.body, vec![0x00, 0xFF, 0x10]);
    }

    #[test]
    fn test_incomplete_body() {
        let request = b"POST /api HTTP/1.1\r\nHost: example.com\r\nContent-Length: 10\r\n\r\nshort";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::IncompleteBody { expected: 10, actual: 5 })));
    }

    #[test]
    fn test_invalid_content_length() {
        let request = b"POST /api HTTP/1.1\r\nHost: example.com\r\nContent-Length: ten\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidContentLength(ref v)) if v == "ten"));
    }

    #[test]
    fn test_find_head_end() {
        assert_eq!(find_head_end(b"GET / HTTP/1.0\r\n\r\nbody"), Some(18));
        assert_eq!(find_head_end(b"GET / HTTP/1.0\n\nbody"), Some(16));
        assert_eq!(find_head_end(b"GET / HTTP/1.0\r\nHost: x\r\n"), None);
        assert_eq!(find_head_end(b""), None);
    }

    #[test]
    fn test_websocket_upgrade_detection() {
        let headers = vec![
            ("Host".to_string(), "example.com".to_string()),
            ("Upgrade".to_string(), "WebSocket".to_string()),
        ];
        let request = HttpRequest::new("GET", "/ws", HttpVersion::Http11, headers);
        assert!(request.is_websocket_upgrade());

        let plain = HttpRequest::new("GET", "/", HttpVersion::Http11, Vec::new());
        assert!(!plain.is_websocket_upgrade());
    }

    #[test]
    fn test_http_version_display() {
        assert_eq!(HttpVersion::Http10.to_string(), "HTTP/1.0");
        assert_eq!(HttpVersion::Http11.to_string(), "HTTP/1.1");
    }
}
