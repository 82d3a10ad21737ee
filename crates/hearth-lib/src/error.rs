use std::path::{Path, PathBuf};

/// Failures surfaced by the resolver, the artifact store and the launch planner.
///
/// Every variant names what it was working on (a URL, an artifact, a version id
/// or a path) so a caller juggling many concurrent fetches can tell them apart.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Network failure while fetching {target}: {message}")]
    NetworkFailure { target: String, message: String },

    #[error("Secure connection failed while fetching {target}: {message}")]
    SecurityFailure { target: String, message: String },

    #[error("Malformed response from {origin}: {message}")]
    MalformedResponse { origin: String, message: String },

    #[error("Checksum mismatch for {artifact}: expected {expected}, got {actual}")]
    ArtifactCorrupt {
        artifact: String,
        expected: String,
        actual: String,
    },

    #[error("Unknown version: {0}")]
    UnknownVersion(String),

    #[error("Descriptor for {version} unreadable at {path:?}: {message}")]
    DescriptorUnreadable {
        version: String,
        path: PathBuf,
        message: String,
    },

    #[error("Java runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("Failed to extract {artifact}: {message}")]
    ExtractionFailure { artifact: String, message: String },

    #[error("Invalid configuration at {path:?}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn malformed(origin: impl Into<String>, message: impl ToString) -> Self {
        Error::MalformedResponse {
            origin: origin.into(),
            message: message.to_string(),
        }
    }

    /// Classify a transport error from reqwest.
    ///
    /// reqwest does not expose TLS failures as a distinct kind, so the source
    /// chain is scanned for certificate and handshake errors. The request URL
    /// is stripped first; it says nothing about why the request failed.
    pub(crate) fn transport(target: impl Into<String>, err: reqwest::Error) -> Self {
        let target = target.into();
        let err = err.without_url();
        let message = error_chain(&err);

        if is_tls_failure(&err) {
            Error::SecurityFailure { target, message }
        } else {
            Error::NetworkFailure { target, message }
        }
    }

    /// Whether retrying the same call later could succeed.
    ///
    /// The core never retries by itself; this is a hint for callers.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::NetworkFailure { .. } | Error::Cancelled(_))
    }
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}

fn is_tls_failure(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = err.source();
    while let Some(source) = current {
        if mentions_tls(&source.to_string()) {
            return true;
        }
        current = source.source();
    }
    false
}

fn mentions_tls(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["certificate", "handshake", "tls", "ssl"]
        .iter()
        .any(|needle| lower.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tls_messages_are_detected() {
        assert!(mentions_tls(
            "error trying to connect: invalid peer certificate: UnknownIssuer"
        ));
        assert!(mentions_tls("SSL routines:tls_process_server_certificate"));
        assert!(!mentions_tls("operation timed out"));
        assert!(!mentions_tls("connection refused"));
    }

    #[tokio::test]
    async fn url_does_not_decide_the_kind() {
        // Bind then drop to get a port nothing listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = format!(
            "http://127.0.0.1:{}/io/netty/netty-tcnative-boringssl-static/2.0/x.jar",
            port
        );

        let err = reqwest::Client::new().get(&url).send().await.unwrap_err();
        match Error::transport(url.as_str(), err) {
            Error::NetworkFailure { target, message } => {
                assert_eq!(target, url);
                assert!(!message.contains("boringssl"));
            }
            other => panic!("expected NetworkFailure, got {:?}", other),
        }
    }

    #[test]
    fn transient_kinds() {
        let network = Error::NetworkFailure {
            target: "https://example.com".to_string(),
            message: "timed out".to_string(),
        };
        assert!(network.is_transient());

        let corrupt = Error::ArtifactCorrupt {
            artifact: "client".to_string(),
            expected: "aa".to_string(),
            actual: "bb".to_string(),
        };
        assert!(!corrupt.is_transient());
    }

    #[test]
    fn display_carries_context() {
        let err = Error::UnknownVersion("1.99".to_string());
        assert_eq!(err.to_string(), "Unknown version: 1.99");

        let err = Error::ExtractionFailure {
            artifact: "org.lwjgl:lwjgl-platform:2.9.4".to_string(),
            message: "invalid zip header".to_string(),
        };
        assert!(err.to_string().contains("org.lwjgl:lwjgl-platform:2.9.4"));
    }
}
