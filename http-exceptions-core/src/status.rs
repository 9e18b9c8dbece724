//! Status registry.
//!
//! Every status code this crate can produce is listed exactly once in
//! [`REGISTRY`], together with its reason phrase and the shape of the body it
//! carries on the wire. The table is never mutated at runtime.

/// How a status code is rendered on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    /// 200/201: carries a caller-supplied JSON body.
    Body,
    /// 204/304: no body.
    Empty,
    /// 301/302: no body, `Location` header.
    Redirect,
    /// 4xx/5xx: carries `{"error": "<message>"}`.
    Error,
}

/// A single registry entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusEntry {
    pub code: u16,
    pub reason: &'static str,
    pub class: StatusClass,
}

const fn entry(code: u16, reason: &'static str, class: StatusClass) -> StatusEntry {
    StatusEntry {
        code,
        reason,
        class,
    }
}

use StatusClass::{Body, Empty, Error, Redirect};

/// All status codes known to this crate.
pub const REGISTRY: &[StatusEntry] = &[
    entry(200, "OK", Body),
    entry(201, "Created", Body),
    entry(204, "No Content", Empty),
    entry(301, "Moved Permanently", Redirect),
    entry(302, "Found", Redirect),
    entry(304, "Not Modified", Empty),
    // 4xx - client error
    entry(400, "Bad Request", Error),
    entry(401, "Unauthorized", Error),
    entry(402, "Payment Required", Error),
    entry(403, "Forbidden", Error),
    entry(404, "Not Found", Error),
    entry(405, "Method Not Allowed", Error),
    entry(406, "Not Acceptable", Error),
    entry(407, "Proxy Authentication Required", Error),
    entry(408, "Request Timeout", Error),
    entry(409, "Conflict", Error),
    entry(410, "Gone", Error),
    entry(411, "Length Required", Error),
    entry(412, "Precondition Failed", Error),
    entry(413, "Payload Too Large", Error),
    entry(414, "URI Too Long", Error),
    entry(415, "Unsupported Media Type", Error),
    entry(416, "Range Not Satisfiable", Error),
    entry(417, "Expectation Failed", Error),
    entry(418, "I'm a teapot", Error),
    entry(421, "Misdirected Request", Error),
    entry(422, "Unprocessable Entity", Error),
    entry(423, "Locked", Error),
    entry(424, "Failed Dependency", Error),
    entry(425, "Too Early", Error),
    entry(426, "Upgrade Required", Error),
    entry(428, "Precondition Required", Error),
    entry(429, "Too Many Requests", Error),
    entry(431, "Request Header Fields Too Large", Error),
    entry(451, "Unavailable For Legal Reasons", Error),
    // 5xx - server error
    entry(500, "Internal Server Error", Error),
    entry(501, "Not Implemented", Error),
    entry(502, "Bad Gateway", Error),
    entry(503, "Service Unavailable", Error),
    entry(504, "Gateway Timeout", Error),
    entry(505, "HTTP Version Not Supported", Error),
    entry(506, "Variant Also Negotiates", Error),
    entry(507, "Insufficient Storage", Error),
    entry(508, "Loop Detected", Error),
    entry(510, "Not Extended", Error),
    entry(511, "Network Authentication Required", Error),
];

/// Look up a status code in the registry.
pub fn lookup(code: u16) -> Option<&'static StatusEntry> {
    REGISTRY.iter().find(|entry| entry.code == code)
}

/// Get the wire class of a status code, if it is registered.
pub fn class_of(code: u16) -> Option<StatusClass> {
    lookup(code).map(|entry| entry.class)
}

/// Get the reason phrase of a registered status code.
pub fn reason_phrase(code: u16) -> Option<&'static str> {
    lookup(code).map(|entry| entry.reason)
}

/// Whether the code is in the registry.
pub fn is_known(code: u16) -> bool {
    lookup(code).is_some()
}

/// Whether the code carries an `{"error": ...}` body.
pub fn is_error_bearing(code: u16) -> bool {
    class_of(code) == Some(StatusClass::Error)
}

/// Whether the code is one of the special no-body codes (204/304) or a
/// redirect (301/302).
pub fn is_special(code: u16) -> bool {
    matches!(
        class_of(code),
        Some(StatusClass::Empty | StatusClass::Redirect)
    )
}

/// Whether a raised failure may carry this code: every error-bearing code and
/// the redirects.
pub fn is_failure_status(code: u16) -> bool {
    matches!(
        class_of(code),
        Some(StatusClass::Error | StatusClass::Redirect)
    )
}

/// Iterate over all error-bearing codes in ascending order.
pub fn error_status_codes() -> impl Iterator<Item = u16> {
    REGISTRY
        .iter()
        .filter(|entry| entry.class == StatusClass::Error)
        .map(|entry| entry.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_no_duplicates() {
        let mut codes: Vec<u16> = REGISTRY.iter().map(|e| e.code).collect();
        let len = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), len);
    }

    #[test]
    fn test_error_status_codes_cover_standard_4xx_and_5xx() {
        let codes: Vec<u16> = error_status_codes().collect();
        assert_eq!(codes.iter().filter(|c| (400..500).contains(*c)).count(), 29);
        assert_eq!(codes.iter().filter(|c| (500..600).contains(*c)).count(), 11);
        for code in [400, 401, 404, 429, 500, 503] {
            assert!(codes.contains(&code), "{code} should be error-bearing");
        }
    }

    #[test]
    fn test_every_registered_code_is_a_valid_http_status() {
        for entry in REGISTRY {
            assert!(
                http::StatusCode::from_u16(entry.code).is_ok(),
                "{} should be a valid status code",
                entry.code
            );
        }
    }

    #[test]
    fn test_classifications() {
        assert_eq!(class_of(200), Some(StatusClass::Body));
        assert_eq!(class_of(201), Some(StatusClass::Body));
        assert_eq!(class_of(204), Some(StatusClass::Empty));
        assert_eq!(class_of(304), Some(StatusClass::Empty));
        assert_eq!(class_of(301), Some(StatusClass::Redirect));
        assert_eq!(class_of(302), Some(StatusClass::Redirect));
        assert_eq!(class_of(409), Some(StatusClass::Error));
        assert_eq!(class_of(999), None);

        assert!(is_special(204));
        assert!(is_special(302));
        assert!(!is_special(200));
        assert!(!is_special(404));

        assert!(is_failure_status(302));
        assert!(is_failure_status(451));
        assert!(!is_failure_status(200));
        assert!(!is_failure_status(304));
        assert!(!is_failure_status(999));
    }

    #[test]
    fn test_reason_phrase() {
        assert_eq!(reason_phrase(404), Some("Not Found"));
        assert_eq!(reason_phrase(418), Some("I'm a teapot"));
        assert_eq!(reason_phrase(599), None);
    }
}
