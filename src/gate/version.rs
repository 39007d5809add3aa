//! Negotiated protocol version of a request.

use axum::http::Version;

/// Protocol versions the gate distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    Http09,
    Http10,
    Http11,
    /// HTTP/2, HTTP/3 and anything newer or unrecognized. Never blocked.
    Modern,
}

impl ProtocolVersion {
    /// Name used in rejection bodies, log records and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolVersion::Http09 => "HTTP/0.9",
            ProtocolVersion::Http10 => "HTTP/1.0",
            ProtocolVersion::Http11 => "HTTP/1.1",
            ProtocolVersion::Modern => "HTTP/2.0+",
        }
    }
}

impl From<Version> for ProtocolVersion {
    fn from(version: Version) -> Self {
        match version {
            Version::HTTP_09 => ProtocolVersion::Http09,
            Version::HTTP_10 => ProtocolVersion::Http10,
            Version::HTTP_11 => ProtocolVersion::Http11,
            _ => ProtocolVersion::Modern,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_version() {
        assert_eq!(ProtocolVersion::from(Version::HTTP_09), ProtocolVersion::Http09);
        assert_eq!(ProtocolVersion::from(Version::HTTP_10), ProtocolVersion::Http10);
        assert_eq!(ProtocolVersion::from(Version::HTTP_11), ProtocolVersion::Http11);
        assert_eq!(ProtocolVersion::from(Version::HTTP_2), ProtocolVersion::Modern);
        assert_eq!(ProtocolVersion::from(Version::HTTP_3), ProtocolVersion::Modern);
    }

    #[test]
    fn test_names() {
        assert_eq!(ProtocolVersion::Http09.as_str(), "HTTP/0.9");
        assert_eq!(ProtocolVersion::Http10.as_str(), "HTTP/1.0");
        assert_eq!(ProtocolVersion::Http11.as_str(), "HTTP/1.1");
    }
}
