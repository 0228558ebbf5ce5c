use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use crate::{Error, Result};

/// HTTP methods the signing core accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// HTTP GET.
    Get,
    /// HTTP PUT.
    Put,
    /// HTTP POST.
    Post,
    /// HTTP DELETE.
    Delete,
    /// HTTP HEAD.
    Head,
}

impl Method {
    /// The uppercase wire form used in the canonical request.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request descriptor waiting to be signed.
///
/// The payload hash is always computed by the caller (SHA-256 of the raw
/// payload bytes, [`EMPTY_PAYLOAD_HASH`][crate::EMPTY_PAYLOAD_HASH] for
/// bodyless requests) and carried through unaltered.
#[derive(Debug, Clone)]
pub struct UnsignedRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) payload_hash: String,
}

impl UnsignedRequest {
    /// Create a request descriptor for the given method and payload hash.
    ///
    /// The payload hash must be 64 lowercase hex characters; anything else
    /// is rejected here rather than producing a signature the server will
    /// silently refuse.
    pub fn new(method: Method, payload_hash: &str) -> Result<Self> {
        if payload_hash.len() != 64
            || !payload_hash
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(Error::request_invalid(
                "payload hash must be 64 lowercase hex characters",
            ));
        }

        Ok(Self {
            method,
            path: "/".to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            payload_hash: payload_hash.to_string(),
        })
    }

    /// Specify the resource path, e.g. `/bucket/key`. Defaults to `/`.
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        self
    }

    /// Append a query parameter. Order of insertion does not matter; the
    /// canonical query string is sorted before signing.
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append an additional header to include in the signed set.
    ///
    /// `host`, `x-amz-content-sha256` and `x-amz-date` are always signed
    /// and cannot be supplied here.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// The signed request descriptor: the only externally visible output.
///
/// Hand `url` and `headers` to any HTTP client and discard; the embedded
/// signature is time-bounded and must not be reused across dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Ready-to-send request target.
    pub url: String,
    /// Headers to merge with any additional caller-supplied headers
    /// before dispatch.
    pub headers: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EMPTY_PAYLOAD_HASH;
    use test_case::test_case;

    #[test_case(EMPTY_PAYLOAD_HASH => true; "empty payload hash")]
    #[test_case("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85" => false; "too short")]
    #[test_case("E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855" => false; "uppercase hex")]
    #[test_case("g3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855" => false; "non hex byte")]
    #[test_case("" => false; "empty")]
    fn test_payload_hash_validation(hash: &str) -> bool {
        UnsignedRequest::new(Method::Get, hash).is_ok()
    }

    #[test]
    fn test_path_gets_leading_slash() {
        let req = UnsignedRequest::new(Method::Get, EMPTY_PAYLOAD_HASH)
            .unwrap()
            .with_path("bucket/key");
        assert_eq!(req.path, "/bucket/key");

        let req = UnsignedRequest::new(Method::Get, EMPTY_PAYLOAD_HASH)
            .unwrap()
            .with_path("/bucket");
        assert_eq!(req.path, "/bucket");
    }

    #[test]
    fn test_method_wire_form() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }
}
