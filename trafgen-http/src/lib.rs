#![forbid(unsafe_code)]

mod client;
mod dns;
mod error;
mod retry;
mod types;
mod util;
mod wire;

pub use client::HttpClient;
pub use dns::{DnsLookup, DnsRecordType, lookup, lookup_url};
pub use error::{Error, HttpTransportErrorKind, Result};
pub use retry::{Attempted, RetryPolicy};
pub use types::{HttpRequest, HttpResponse};
