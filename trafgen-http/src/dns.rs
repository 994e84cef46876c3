use std::time::{Duration, Instant};

/// Outcome of one forward lookup, recorded whether or not resolution succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsLookup {
    pub domain: String,
    pub record_type: DnsRecordType,
    pub elapsed: Duration,
    pub addresses: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
pub enum DnsRecordType {
    #[strum(serialize = "A")]
    A,
    #[strum(serialize = "A_FAILED")]
    AFailed,
}

impl DnsLookup {
    pub fn succeeded(&self) -> bool {
        self.record_type == DnsRecordType::A
    }
}

/// Resolve the host of `url`. Returns `None` if the URL has no host component.
pub async fn lookup_url(url: &str, timeout: Duration) -> Option<DnsLookup> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_string();
    let port = parsed.port_or_known_default().unwrap_or(80);
    Some(lookup(&host, port, timeout).await)
}

pub async fn lookup(host: &str, port: u16, timeout: Duration) -> DnsLookup {
    // Bracketed IPv6 literals come back from `Url::host_str` with their brackets.
    let bare = host.trim_start_matches('[').trim_end_matches(']');

    let started = Instant::now();
    let resolved = tokio::time::timeout(timeout, tokio::net::lookup_host((bare, port))).await;
    let elapsed = started.elapsed();

    let addresses = match resolved {
        Ok(Ok(addrs)) => addrs.count(),
        _ => 0,
    };

    DnsLookup {
        domain: host.to_string(),
        record_type: if addresses > 0 {
            DnsRecordType::A
        } else {
            DnsRecordType::AFailed
        },
        elapsed,
        addresses,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[tokio::test]
    async fn ip_literal_resolves_without_network() {
        let res = lookup_url("http://127.0.0.1:8080/x", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(res.domain, "127.0.0.1");
        assert!(res.succeeded());
        assert_eq!(res.record_type.to_string(), "A");
    }

    #[tokio::test]
    async fn reserved_tld_fails() {
        let res = lookup("c2.trafgen.invalid", 80, Duration::from_secs(2)).await;
        assert_eq!(res.record_type, DnsRecordType::AFailed);
        assert_eq!(res.record_type.to_string(), "A_FAILED");
    }

    #[tokio::test]
    async fn url_without_host_is_skipped() {
        assert!(lookup_url("mailto:someone", Duration::from_secs(1)).await.is_none());
    }
}
