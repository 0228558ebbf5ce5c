//! AWS SigV4 request signing for S3-compatible object stores.
//!
//! This crate turns an unsigned request descriptor plus credentials into a
//! ready-to-send URL and authenticated header set. It performs no network
//! I/O: dispatching the request, parsing the response, and retrying are
//! left to whichever HTTP client the caller prefers.
//!
//! ## Overview
//!
//! Signing is a pipeline of pure functions over immutable values:
//!
//! - derive the date/region/service scoped key from the long-term secret
//!   (the four-stage HMAC-SHA256 chain),
//! - serialize the request into the byte-exact canonical form AWS
//!   requires,
//! - wrap its hash into the string-to-sign,
//! - sign it and assemble the `Authorization` header.
//!
//! Every call reads the clock once; inject a fixed time with
//! [`Signer::with_time`] when reproducible output is needed.
//!
//! ## Example
//!
//! ```no_run
//! use s3_sigv4::{Credential, Method, Signer, UnsignedRequest, EMPTY_PAYLOAD_HASH};
//!
//! # fn main() -> s3_sigv4::Result<()> {
//! let cred = Credential {
//!     access_key: "access_key".to_string(),
//!     secret_key: "secret_key".to_string(),
//!     protocol: "http".to_string(),
//!     host: "localhost".to_string(),
//!     port: Some(8000),
//! };
//!
//! // List object versions in a bucket; no body, so the payload hash is
//! // the hash of the empty string.
//! let req = UnsignedRequest::new(Method::Get, EMPTY_PAYLOAD_HASH)?
//!     .with_path("/my-bucket")
//!     .with_query("versions", "");
//!
//! let signed = Signer::default().sign(&cred, &req)?;
//! // Hand signed.url and signed.headers to an HTTP client.
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;

mod constants;
pub use constants::EMPTY_PAYLOAD_HASH;

mod credential;
pub use credential::Credential;

mod error;
pub use error::{Error, ErrorKind, Result};

mod request;
pub use request::{Method, SignedRequest, UnsignedRequest};

mod sign;
pub use sign::Signer;
