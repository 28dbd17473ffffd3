use thiserror::Error;

/// Status reported when the upstream never answered.
pub const DEFAULT_FAILURE_STATUS: u16 = 500;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The retailer answered with a non-success status.
    #[error("upstream responded with HTTP {status} for {url}")]
    Upstream { status: u16, url: String },

    /// No response was received (DNS, connect, TLS, body read, timeout).
    #[error("request to upstream failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid request url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ScrapeError {
    /// HTTP status used for the failure envelope.
    pub fn status(&self) -> u16 {
        match self {
            ScrapeError::Upstream { status, .. } => *status,
            ScrapeError::Transport(e) => e
                .status()
                .map(|s| s.as_u16())
                .unwrap_or(DEFAULT_FAILURE_STATUS),
            ScrapeError::InvalidUrl { .. } => DEFAULT_FAILURE_STATUS,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_status(self.status())
    }
}

/// Coarse failure categories exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    RequestFailed,
}

const KIND_TABLE: &[(ErrorKind, Option<u16>, &str)] = &[
    (ErrorKind::NotFound, Some(404), "Not found."),
    (ErrorKind::RequestFailed, None, "Request failed."),
];

impl ErrorKind {
    /// Looks the status up in the kind table; unmatched codes fall through to
    /// the catch-all row.
    pub fn from_status(status: u16) -> Self {
        KIND_TABLE
            .iter()
            .find(|(_, code, _)| *code == Some(status))
            .or_else(|| KIND_TABLE.iter().find(|(_, code, _)| code.is_none()))
            .map(|(kind, _, _)| *kind)
            .unwrap_or(ErrorKind::RequestFailed)
    }

    pub fn message(self) -> &'static str {
        KIND_TABLE
            .iter()
            .find(|(kind, _, _)| *kind == self)
            .map(|(_, _, message)| *message)
            .unwrap_or("Request failed.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_its_own_message() {
        let err = ScrapeError::Upstream {
            status: 404,
            url: "https://www.walmart.com/ip/1".to_string(),
        };
        assert_eq!(err.status(), 404);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.kind().message(), "Not found.");
    }

    #[test]
    fn test_other_statuses_are_generic_failures() {
        for status in [400, 403, 500, 502, 503] {
            assert_eq!(ErrorKind::from_status(status), ErrorKind::RequestFailed);
        }
        assert_eq!(ErrorKind::RequestFailed.message(), "Request failed.");
    }

    #[test]
    fn test_invalid_url_defaults_to_500() {
        let err = ScrapeError::InvalidUrl {
            url: "::".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert_eq!(err.status(), DEFAULT_FAILURE_STATUS);
        assert_eq!(err.kind(), ErrorKind::RequestFailed);
    }
}
