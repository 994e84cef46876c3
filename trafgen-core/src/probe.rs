use std::time::{Duration, Instant};

use rand::seq::IndexedRandom as _;
use tokio::task::JoinSet;
use trafgen_http::{HttpClient, HttpRequest};

use crate::catalog::{CatalogData, Site};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub url: String,
    pub status: Option<u16>,
    pub error: Option<String>,
    pub elapsed: Duration,
}

impl ProbeResult {
    pub fn reachable(&self) -> bool {
        self.status.is_some_and(|s| s < 400)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProbeReport {
    pub probed: usize,
    pub reachable: usize,
    pub results: Vec<ProbeResult>,
}

/// Request up to `sample` random benign sites once each, concurrently, without retries.
pub async fn probe_sites(
    client: &HttpClient,
    data: &CatalogData,
    sample: usize,
    user_agent: &str,
    timeout: Duration,
) -> Result<ProbeReport> {
    let sites: Vec<Site> = {
        let mut rng = rand::rng();
        data.sites
            .choose_multiple(&mut rng, sample)
            .cloned()
            .collect()
    };

    let mut set = JoinSet::new();
    for site in sites {
        let client = client.clone();
        let req = HttpRequest::get(&site.url)
            .header("User-Agent", user_agent)
            .timeout(timeout);
        set.spawn(async move {
            let started = Instant::now();
            let res = client.request(req).await;
            let elapsed = started.elapsed();
            match res {
                Ok(res) => ProbeResult {
                    url: site.url,
                    status: Some(res.status),
                    error: None,
                    elapsed,
                },
                Err(err) => ProbeResult {
                    url: site.url,
                    status: None,
                    error: Some(err.to_string()),
                    elapsed,
                },
            }
        });
    }

    let mut results = Vec::with_capacity(set.len());
    while let Some(joined) = set.join_next().await {
        results.push(joined?);
    }
    results.sort_by(|a, b| a.url.cmp(&b.url));

    let reachable = results.iter().filter(|r| r.reachable()).count();
    tracing::info!(reachable, probed = results.len(), "connectivity probe finished");

    Ok(ProbeReport {
        probed: results.len(),
        reachable,
        results,
    })
}
