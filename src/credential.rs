use std::fmt::{Debug, Formatter};

use serde::Deserialize;

use crate::{Error, Result};

/// Credential and endpoint information for an S3-compatible service.
///
/// Matches the JSON credential file used by the surrounding tooling:
///
/// ```json
/// {
///     "access_key": "00000000000000000000000000000000",
///     "secret_key": "11111111111111111111111111111111",
///     "protocol":   "http",
///     "host":       "localhost",
///     "port":       8000
/// }
/// ```
#[derive(Clone, Deserialize)]
pub struct Credential {
    /// Access key id.
    pub access_key: String,
    /// Secret access key. Never logged; `Debug` redacts it.
    pub secret_key: String,
    /// Endpoint scheme, "http" or "https".
    pub protocol: String,
    /// Endpoint host, without port.
    pub host: String,
    /// Endpoint port, omitted for the scheme default.
    #[serde(default)]
    pub port: Option<u16>,
}

impl Credential {
    /// Endpoint URL without path or query: `protocol://host[:port]`.
    pub fn endpoint(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}", self.protocol, self.host, port),
            None => format!("{}://{}", self.protocol, self.host),
        }
    }

    /// Check that every field signing depends on is present.
    pub(crate) fn check(&self) -> Result<()> {
        if self.access_key.is_empty() {
            return Err(Error::config_invalid("access_key is empty"));
        }
        if self.secret_key.is_empty() {
            return Err(Error::config_invalid("secret_key is empty"));
        }
        if self.protocol.is_empty() {
            return Err(Error::config_invalid("protocol is empty"));
        }
        if self.host.is_empty() {
            return Err(Error::config_invalid("host is empty"));
        }
        Ok(())
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_key", &Redact(&self.access_key))
            .field("secret_key", &Redact(&self.secret_key))
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// Redacts a string, keeping the first and last three characters only when
/// the string is long enough that they leak nothing useful.
struct Redact<'a>(&'a str);

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0.len() {
            0 => f.write_str("EMPTY"),
            1..=11 => f.write_str("***"),
            n => {
                f.write_str(&self.0[..3])?;
                f.write_str("***")?;
                f.write_str(&self.0[n - 3..])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential {
            access_key: "AKIDEXAMPLE".to_string(),
            secret_key: "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY".to_string(),
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: Some(8000),
        }
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(credential().endpoint(), "http://localhost:8000");

        let mut cred = credential();
        cred.port = None;
        cred.protocol = "https".to_string();
        assert_eq!(cred.endpoint(), "https://localhost");
    }

    #[test]
    fn test_check_rejects_empty_fields() {
        for field in ["access_key", "secret_key", "protocol", "host"] {
            let mut cred = credential();
            match field {
                "access_key" => cred.access_key.clear(),
                "secret_key" => cred.secret_key.clear(),
                "protocol" => cred.protocol.clear(),
                _ => cred.host.clear(),
            }
            let err = cred.check().expect_err("empty field must be rejected");
            assert_eq!(err.kind(), crate::ErrorKind::ConfigInvalid, "{field}");
        }
    }

    #[test]
    fn test_debug_redacts_keys() {
        let output = format!("{:?}", credential());
        assert!(!output.contains("wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY"));
        assert!(output.contains("wJa***KEY"));
        assert!(output.contains("localhost"));
    }

    #[test]
    fn test_deserialize_credential_file() {
        let cred: Credential = serde_json::from_str(
            r#"{
                "access_key": "00000000000000000000000000000000",
                "secret_key": "11111111111111111111111111111111",
                "protocol": "http",
                "host": "localhost",
                "port": 8000
            }"#,
        )
        .expect("must deserialize");
        assert_eq!(cred.port, Some(8000));
        assert!(cred.check().is_ok());

        let cred: Credential = serde_json::from_str(
            r#"{
                "access_key": "a",
                "secret_key": "b",
                "protocol": "https",
                "host": "s3.example.com"
            }"#,
        )
        .expect("port must be optional");
        assert_eq!(cred.port, None);
    }
}
