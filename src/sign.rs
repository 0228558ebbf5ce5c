use std::collections::BTreeMap;
use std::fmt::Write;

use log::debug;
use percent_encoding::utf8_percent_encode;

use crate::constants::{
    AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET, HOST, X_AMZ_CONTENT_SHA_256, X_AMZ_DATE,
};
use crate::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use crate::time::{self, format_date, format_iso8601, DateTime};
use crate::{Credential, Error, Method, Result, SignedRequest, UnsignedRequest};

/// Signer that implements AWS SigV4 for S3-compatible stores.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// Stateless and reentrant: every call to [`sign`][Signer::sign] is a pure
/// function of its inputs plus one clock reading taken at the start of the
/// call.
#[derive(Debug)]
pub struct Signer {
    service: String,
    region: String,

    time: Option<DateTime>,
}

impl Signer {
    /// Create a new signer for the given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),

            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function when reproducible signatures are needed,
    /// e.g. in tests.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign a request, producing the URL and header set to hand to an
    /// HTTP client.
    ///
    /// The timestamp is read once here and used for both the canonical
    /// headers and the credential scope; skew between the two invalidates
    /// the signature.
    pub fn sign(&self, cred: &Credential, req: &UnsignedRequest) -> Result<SignedRequest> {
        cred.check()?;

        let now = self.time.unwrap_or_else(time::now);
        let amz_date = format_iso8601(now);
        let date_stamp = format_date(now);

        let query_string = canonical_query_string(&req.query);
        let extra_headers = merge_extra_headers(&req.headers)?;
        let headers = canonical_headers(&cred.host, &req.payload_hash, &amz_date, &extra_headers);
        let signed_header_names = headers
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(";");

        let creq = canonical_request_string(
            req.method,
            &req.path,
            &query_string,
            &headers,
            &signed_header_names,
            &req.payload_hash,
        )?;
        debug!("calculated canonical request:\n{creq}");

        // Scope: "20220313/<region>/<service>/aws4_request"
        let scope = format!(
            "{}/{}/{}/aws4_request",
            date_stamp, self.region, self.service
        );
        debug!("calculated scope: {scope}");

        let string_to_sign = string_to_sign(&amz_date, &scope, &creq)?;
        debug!("calculated string to sign:\n{string_to_sign}");

        let signing_key =
            generate_signing_key(&cred.secret_key, &date_stamp, &self.region, &self.service);
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let authorization = format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            cred.access_key, scope, signed_header_names, signature
        );

        let mut headers_out = BTreeMap::new();
        headers_out.insert("Host".to_string(), cred.host.clone());
        headers_out.insert(
            "X-Amz-Content-SHA256".to_string(),
            req.payload_hash.clone(),
        );
        headers_out.insert("X-Amz-Date".to_string(), amz_date);
        headers_out.insert("Authorization".to_string(), authorization);
        // Extra signed headers keep the caller's casing on the wire; only
        // the canonical form is lowercased. One wire header per name, so
        // the wire request matches the signed canonical form exactly.
        for header in &extra_headers {
            headers_out.insert(header.wire_name.clone(), header.value.clone());
        }

        let mut url = cred.endpoint();
        if req.path != "/" {
            write!(url, "{}", utf8_percent_encode(&req.path, &AWS_URI_ENCODE_SET))?;
        }
        if !query_string.is_empty() {
            url.push('?');
            url.push_str(&query_string);
        }

        Ok(SignedRequest {
            url,
            headers: headers_out,
        })
    }
}

impl Default for Signer {
    fn default() -> Self {
        Self::new("s3", "us-east-1")
    }
}

/// Build the canonical query string: pairs sorted by key then value, both
/// percent-encoded. A parameter with an empty value still serializes as
/// `key=`.
fn canonical_query_string(query: &[(String, String)]) -> String {
    let mut query = query.to_vec();
    query.sort();

    query
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// An extra signed header after merging: the lowercase name used in the
/// canonical form, the first-seen casing used on the wire, and the value
/// with repeats comma-joined.
#[derive(Debug)]
struct ExtraHeader {
    canonical_name: String,
    wire_name: String,
    value: String,
}

/// Merge caller-supplied headers by lowercased name. A repeated name (in
/// any casing) folds into one header whose values are comma-joined in
/// insertion order, so the canonical form and the wire request carry the
/// same single entry.
fn merge_extra_headers(extra: &[(String, String)]) -> Result<Vec<ExtraHeader>> {
    let mut merged: Vec<ExtraHeader> = Vec::with_capacity(extra.len());

    for (name, value) in extra {
        let canonical_name = name.to_ascii_lowercase();
        if canonical_name == HOST
            || canonical_name == X_AMZ_CONTENT_SHA_256
            || canonical_name == X_AMZ_DATE
        {
            return Err(Error::request_invalid(format!(
                "header {canonical_name} is always signed and cannot be supplied"
            )));
        }

        let value = normalize_header_value(value);
        match merged
            .iter_mut()
            .find(|h| h.canonical_name == canonical_name)
        {
            Some(header) => {
                header.value.push(',');
                header.value.push_str(&value);
            }
            None => merged.push(ExtraHeader {
                canonical_name,
                wire_name: name.clone(),
                value,
            }),
        }
    }

    Ok(merged)
}

/// Assemble the signed header set: the three fixed headers plus the merged
/// extras, names lowercased, values normalized, sorted by name.
fn canonical_headers(
    host: &str,
    payload_hash: &str,
    amz_date: &str,
    extra: &[ExtraHeader],
) -> Vec<(String, String)> {
    let mut headers = vec![
        (HOST.to_string(), host.to_string()),
        (X_AMZ_CONTENT_SHA_256.to_string(), payload_hash.to_string()),
        (X_AMZ_DATE.to_string(), amz_date.to_string()),
    ];

    for header in extra {
        headers.push((header.canonical_name.clone(), header.value.clone()));
    }

    headers.sort();
    headers
}

/// Normalize a header value according to step 4 of
/// <https://docs.aws.amazon.com/general/latest/gr/sigv4-create-canonical-request.html>:
/// trim and collapse internal whitespace to single spaces.
fn normalize_header_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn canonical_request_string(
    method: Method,
    path: &str,
    query_string: &str,
    headers: &[(String, String)],
    signed_header_names: &str,
    payload_hash: &str,
) -> Result<String> {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    writeln!(f, "{method}")?;
    writeln!(f, "{}", utf8_percent_encode(path, &AWS_URI_ENCODE_SET))?;
    writeln!(f, "{query_string}")?;
    for (name, value) in headers {
        writeln!(f, "{name}:{value}")?;
    }
    writeln!(f)?;
    writeln!(f, "{signed_header_names}")?;
    write!(f, "{payload_hash}")?;

    Ok(f)
}

// StringToSign:
//
// AWS4-HMAC-SHA256
// 20220313T072004Z
// 20220313/<region>/<service>/aws4_request
// <hashed_canonical_request>
fn string_to_sign(amz_date: &str, scope: &str, canonical_request: &str) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "AWS4-HMAC-SHA256")?;
    writeln!(f, "{amz_date}")?;
    writeln!(f, "{scope}")?;
    write!(f, "{}", hex_sha256(canonical_request.as_bytes()))?;

    Ok(f)
}

/// Derive the date/region/service scoped signing key.
///
/// Every stage keys the next HMAC with the raw bytes of the previous one.
/// The result is only valid for the stamped day and must never be cached
/// across dates.
fn generate_signing_key(secret: &str, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), date_stamp.as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), "aws4_request".as_bytes())
}
