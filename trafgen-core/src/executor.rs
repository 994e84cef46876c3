use std::time::{Duration, Instant};

use bytes::Bytes;
use trafgen_http::{
    DnsLookup, HttpClient, HttpRequest, HttpTransportErrorKind, RetryPolicy, lookup_url,
};

use crate::work::WorkItem;

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
/// Cap on the pre-request lookup recorded in the dns stream.
const DNS_BUDGET: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Transport failure that survived the retry budget.
    Network,
    /// The item could not be turned into a request at all.
    InvalidRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    pub status: Option<u16>,
    /// Wall time across all attempts and backoffs.
    pub latency: Duration,
    pub error: Option<ErrorKind>,
    pub cause: Option<HttpTransportErrorKind>,
    pub bytes_transferred: Option<u64>,
    pub attempts: u32,
}

impl RequestOutcome {
    /// A response below 400. Error statuses and transport failures both count as failed.
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|s| s < 400)
    }
}

/// Result of one execution: the request outcome and the DNS lookup done beforehand.
#[derive(Debug, Clone)]
pub struct Execution {
    pub outcome: RequestOutcome,
    pub dns: Option<DnsLookup>,
}

#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: HttpClient,
    retry: RetryPolicy,
}

impl RequestExecutor {
    pub fn with_client(client: HttpClient, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Upper bound on one `execute` call: the lookup budget plus every attempt timing out
    /// plus all backoffs. A stopped worker exits at most this long after its last slot.
    pub fn worst_case(&self, timeout: Duration) -> Duration {
        dns_budget(timeout).saturating_add(self.retry.worst_case(timeout))
    }

    pub async fn execute(&self, item: &WorkItem, timeout: Duration) -> Execution {
        let dns = lookup_url(&item.target, dns_budget(timeout)).await;

        let req = build_request(item, timeout);
        let started = Instant::now();
        let attempted = self.client.request_with_retry(req, &self.retry).await;
        let latency = started.elapsed();

        let outcome = match attempted.result {
            Ok(res) => RequestOutcome {
                status: Some(res.status),
                latency,
                error: None,
                cause: None,
                bytes_transferred: Some(res.bytes_transferred()),
                attempts: attempted.attempts,
            },
            Err(err) => {
                tracing::debug!(url = %item.target, error = %err, "request failed");
                let error = if err.is_retryable() {
                    ErrorKind::Network
                } else {
                    ErrorKind::InvalidRequest
                };
                RequestOutcome {
                    status: None,
                    latency,
                    error: Some(error),
                    cause: Some(err.transport_error_kind()),
                    bytes_transferred: None,
                    attempts: attempted.attempts,
                }
            }
        };

        Execution { outcome, dns }
    }
}

fn dns_budget(timeout: Duration) -> Duration {
    timeout.min(DNS_BUDGET)
}

fn build_request(item: &WorkItem, timeout: Duration) -> HttpRequest {
    let mut req = match &item.payload {
        Some(payload) => {
            let body = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("payload", payload)
                .finish();
            HttpRequest::post(&item.target, Bytes::from(body))
                .header("Content-Type", FORM_CONTENT_TYPE)
        }
        None => HttpRequest::get(&item.target),
    };
    req.method = item.method.clone();

    req = req
        .header("User-Agent", item.user_agent.as_str())
        .header("Accept", ACCEPT)
        .header("Accept-Language", ACCEPT_LANGUAGE)
        .header("DNT", "1")
        .header("Upgrade-Insecure-Requests", "1")
        .timeout(timeout);

    if let Some(referer) = &item.referer {
        req = req.header("Referer", referer.as_str());
    }

    req
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::classify::{AttackKind, Classification};

    fn item(target: &str, payload: Option<&str>) -> WorkItem {
        WorkItem {
            classification: Classification::Malicious(AttackKind::Xss),
            target: target.to_string(),
            payload: payload.map(str::to_string),
            user_agent: "trafgen-test".to_string(),
            method: if payload.is_some() {
                http::Method::POST
            } else {
                http::Method::GET
            },
            category: "attack".to_string(),
            referer: Some("https://www.example.com".to_string()),
        }
    }

    #[test]
    fn payload_goes_into_a_form_body() {
        let req = build_request(
            &item("http://t.test/comment", Some("<script>alert('XSS')</script>")),
            Duration::from_secs(1),
        );
        assert_eq!(req.method, http::Method::POST);
        assert_eq!(
            std::str::from_utf8(&req.body).unwrap(),
            "payload=%3Cscript%3Ealert%28%27XSS%27%29%3C%2Fscript%3E"
        );
        assert!(
            req.headers
                .iter()
                .any(|(k, v)| k == "Content-Type" && v == FORM_CONTENT_TYPE)
        );
        assert!(req.headers.iter().any(|(k, _)| k == "Referer"));
        assert_eq!(req.timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn plain_items_are_bodiless_gets() {
        let req = build_request(&item("http://t.test/", None), Duration::from_secs(1));
        assert_eq!(req.method, http::Method::GET);
        assert!(req.body.is_empty());
        assert!(
            req.headers
                .iter()
                .any(|(k, v)| k == "User-Agent" && v == "trafgen-test")
        );
    }

    #[test]
    fn worst_case_caps_the_lookup_budget() {
        let executor = RequestExecutor::with_client(HttpClient::default(), RetryPolicy::default());
        // 2s lookup cap + 3 x 10s attempts + 250ms + 500ms backoff.
        assert_eq!(
            executor.worst_case(Duration::from_secs(10)),
            Duration::from_millis(32_750)
        );
        // Short timeouts bound the lookup too: 1s + 3 x 1s + 750ms.
        assert_eq!(
            executor.worst_case(Duration::from_secs(1)),
            Duration::from_millis(4_750)
        );
    }

    #[tokio::test]
    async fn malformed_targets_are_invalid_requests() {
        let executor = RequestExecutor::with_client(HttpClient::default(), RetryPolicy::default());
        let exec = executor
            .execute(&item("not a url", None), Duration::from_secs(1))
            .await;

        assert_eq!(exec.outcome.error, Some(ErrorKind::InvalidRequest));
        assert_eq!(exec.outcome.attempts, 1);
        assert!(exec.outcome.status.is_none());
        assert!(exec.dns.is_none());
    }
}
