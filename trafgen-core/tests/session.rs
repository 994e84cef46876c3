#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, HashSet};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use trafgen_core::{
    CatalogData, Error, LogStream, RequestExecutor, RetryPolicy, RunConfig, SessionManager,
    SessionState, Site, StatsSnapshot, TrafficClass, parse_line,
};
use trafgen_http::HttpClient;
use trafgen_testserver::TestServer;

type Record = BTreeMap<String, String>;

fn read_stream(dir: &Path, stream: LogStream) -> Vec<Record> {
    let path = dir.join(stream.file_name());
    let Ok(text) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    text.lines()
        .map(|l| parse_line(l).unwrap().into_iter().collect())
        .collect()
}

fn local_catalog(base_url: &str, addr: SocketAddr) -> CatalogData {
    CatalogData {
        sites: vec![Site::new(base_url, "local")],
        attack_targets: vec![base_url.to_string()],
        c2_domains: vec![addr.to_string()],
        ..CatalogData::builtin()
    }
}

fn config(dir: &Path, duration: Duration, target_rpm: u32, max_workers: usize) -> RunConfig {
    RunConfig {
        duration,
        target_rpm,
        max_workers,
        delay_min: Duration::ZERO,
        delay_max: Duration::from_millis(10),
        timeout: Duration::from_secs(2),
        compromise_probability: 0.0,
        malicious_probability: 0.0,
        log_directory: dir.to_path_buf(),
        retry: RetryPolicy {
            max_retries: 2,
            backoff: Duration::from_millis(10),
        },
        ..RunConfig::default()
    }
}

fn final_stats(dir: &Path) -> StatsSnapshot {
    let finals: Vec<_> = read_stream(dir, LogStream::Statistics)
        .into_iter()
        .filter(|r| r["final"] == "true")
        .collect();
    assert_eq!(finals.len(), 1, "exactly one final statistics record");
    serde_json::from_str(&finals[0]["stats"]).unwrap()
}

/// Accepts connections and never answers.
async fn blackhole() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn benign_only_run_hits_the_target_rate() {
    let server = TestServer::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();

    let manager = SessionManager::new(local_catalog(server.base_url(), server.addr()));
    let handle = manager
        .start(config(dir.path(), Duration::from_secs(3), 600, 4))
        .await
        .unwrap();
    assert_eq!(manager.state(), SessionState::Running);

    let report = handle.wait().await.unwrap();
    assert_eq!(report.state, SessionState::Completed);
    assert_eq!(manager.state(), SessionState::Completed);

    let traffic = read_stream(dir.path(), LogStream::Traffic);
    assert!(
        (24..=31).contains(&traffic.len()),
        "traffic records: {}",
        traffic.len()
    );
    assert!(traffic.iter().all(|r| r["session_id"] == report.session_id));
    assert!(traffic.iter().all(|r| r["type"] == "normal" && r["status"] == "200"));
    assert!(read_stream(dir.path(), LogStream::Compromise).is_empty());
    assert!(read_stream(dir.path(), LogStream::Security).is_empty());
    assert_eq!(read_stream(dir.path(), LogStream::Dns).len(), traffic.len());

    let stats = final_stats(dir.path());
    assert_eq!(stats.total_requests, traffic.len() as u64);
    assert!(stats.failed_requests <= stats.total_requests);
    assert_eq!(stats.total_requests, report.stats.total_requests);
    assert_eq!(server.stats().requests_total(), traffic.len() as u64);

    server.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_class_is_routed_to_its_streams() {
    let server = TestServer::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();

    let cfg = RunConfig {
        compromise_probability: 0.3,
        malicious_probability: 0.3,
        ..config(dir.path(), Duration::from_secs(2), 1200, 4)
    };
    let report = trafgen_core::run(cfg, local_catalog(server.base_url(), server.addr()))
        .await
        .unwrap();

    let traffic = read_stream(dir.path(), LogStream::Traffic);
    let security = read_stream(dir.path(), LogStream::Security);
    let compromise = read_stream(dir.path(), LogStream::Compromise);

    let count = |class: TrafficClass| {
        traffic
            .iter()
            .filter(|r| r["type"] == class.as_ref())
            .count()
    };
    assert!(count(TrafficClass::Malicious) > 0);
    assert!(count(TrafficClass::Compromised) > 0);
    assert_eq!(security.len(), count(TrafficClass::Malicious));
    assert_eq!(compromise.len(), count(TrafficClass::Compromised));

    let traffic_sessions: HashSet<_> = traffic.iter().map(|r| r["session_id"].clone()).collect();
    assert!(security.iter().all(|r| traffic_sessions.contains(&r["session_id"])));

    for r in &security {
        assert_eq!(r["severity"], "high");
        let indicators: serde_json::Value = serde_json::from_str(&r["indicators"]).unwrap();
        assert!(indicators["payload"].as_str().is_some_and(|p| !p.is_empty()));
    }
    for r in &compromise {
        assert_eq!(r["status"], "ATTEMPT");
        assert_eq!(r["payload_hash"].len(), 16);
    }

    let payload_items = (count(TrafficClass::Malicious) + count(TrafficClass::Compromised)) as u64;
    assert_eq!(server.stats().posts_with_body(), payload_items);
    assert_eq!(report.stats.security_events, security.len() as u64);
    assert_eq!(report.stats.compromise_activities, compromise.len() as u64);

    server.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stop_cancels_promptly_and_keeps_counts_consistent() {
    let server = TestServer::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();

    let manager = SessionManager::new(local_catalog(server.base_url(), server.addr()));
    let cfg = RunConfig {
        compromise_probability: 0.1,
        malicious_probability: 0.1,
        ..config(dir.path(), Duration::from_secs(60), 600, 4)
    };
    let handle = manager.start(cfg).await.unwrap();

    tokio::time::sleep(Duration::from_millis(800)).await;
    handle.stop();

    let report = tokio::time::timeout(Duration::from_secs(5), handle.wait())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(report.state, SessionState::Cancelled);

    let traffic = read_stream(dir.path(), LogStream::Traffic);
    assert!(!traffic.is_empty());
    assert_eq!(report.stats.total_requests, traffic.len() as u64);
    assert_eq!(final_stats(dir.path()).total_requests, traffic.len() as u64);

    server.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_during_an_unanswered_request_waits_at_most_the_worst_case() {
    let addr = blackhole().await;
    let base = format!("http://{addr}");
    let dir = tempfile::tempdir().unwrap();

    let retry = RetryPolicy {
        max_retries: 1,
        backoff: Duration::from_millis(50),
    };
    let cfg = RunConfig {
        timeout: Duration::from_secs(1),
        retry,
        ..config(dir.path(), Duration::from_secs(30), 60, 1)
    };
    let bound = RequestExecutor::with_client(HttpClient::default(), retry).worst_case(cfg.timeout);

    let manager = SessionManager::new(local_catalog(&base, addr));
    let handle = manager.start(cfg).await.unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    let stopped = std::time::Instant::now();
    handle.stop();

    let report = tokio::time::timeout(bound + Duration::from_secs(2), handle.wait())
        .await
        .unwrap()
        .unwrap();
    let waited = stopped.elapsed();
    assert!(
        waited <= bound + Duration::from_millis(500),
        "stop took {waited:?}, bound is {bound:?}"
    );
    assert_eq!(report.state, SessionState::Cancelled);

    let traffic = read_stream(dir.path(), LogStream::Traffic);
    assert_eq!(traffic.len(), 1, "the in-flight request is recorded once");
    assert_eq!(traffic[0]["error"], "network");
    assert_eq!(traffic[0]["attempts"], "2");
    assert_eq!(report.stats.total_requests, 1);
    assert_eq!(final_stats(dir.path()).total_requests, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_after_the_deadline_still_completes() {
    let addr = blackhole().await;
    let base = format!("http://{addr}");
    let dir = tempfile::tempdir().unwrap();

    let cfg = RunConfig {
        timeout: Duration::from_millis(1500),
        retry: RetryPolicy::none(),
        ..config(dir.path(), Duration::from_millis(300), 60, 1)
    };
    let manager = SessionManager::new(local_catalog(&base, addr));
    let handle = manager.start(cfg).await.unwrap();

    // The deadline has passed but the only request is still waiting on its timeout.
    tokio::time::sleep(Duration::from_millis(800)).await;
    handle.stop();

    let report = tokio::time::timeout(Duration::from_secs(5), handle.wait())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(report.state, SessionState::Completed);
    assert_eq!(report.stats.total_requests, 1);
    assert_eq!(read_stream(dir.path(), LogStream::Traffic).len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unresponsive_target_yields_network_failures_only() {
    let addr = blackhole().await;
    let base = format!("http://{addr}");
    let dir = tempfile::tempdir().unwrap();

    let cfg = RunConfig {
        timeout: Duration::from_millis(100),
        ..config(dir.path(), Duration::from_millis(1500), 600, 2)
    };
    let report = trafgen_core::run(cfg, local_catalog(&base, addr)).await.unwrap();
    assert_eq!(report.state, SessionState::Completed);

    let traffic = read_stream(dir.path(), LogStream::Traffic);
    assert!(!traffic.is_empty());
    for r in &traffic {
        assert_eq!(r["status"], "-");
        assert_eq!(r["error"], "network");
        assert_eq!(r["cause"], "timeout");
        assert_eq!(r["attempts"], "3");
    }

    assert_eq!(report.stats.total_requests, traffic.len() as u64);
    assert_eq!(report.stats.failed_requests, report.stats.total_requests);
    assert_eq!(report.stats.successful_requests, 0);
}

#[tokio::test]
async fn start_is_only_valid_from_idle() {
    let server = TestServer::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let manager = SessionManager::new(local_catalog(server.base_url(), server.addr()));

    let handle = manager
        .start(config(dir.path(), Duration::from_secs(30), 60, 1))
        .await
        .unwrap();

    let err = manager
        .start(config(dir.path(), Duration::from_secs(30), 60, 1))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::InvalidState(SessionState::Running)));

    handle.stop();
    handle.wait().await.unwrap();

    let err = manager
        .start(config(dir.path(), Duration::from_secs(30), 60, 1))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::InvalidState(SessionState::Cancelled)));

    server.shutdown().await;
}

#[tokio::test]
async fn rejected_configs_leave_the_session_idle() {
    let dir = tempfile::tempdir().unwrap();
    let manager = SessionManager::new(CatalogData::builtin());

    let bad = RunConfig {
        delay_min: Duration::from_secs(5),
        delay_max: Duration::from_secs(1),
        ..config(dir.path(), Duration::from_secs(1), 60, 1)
    };
    let err = manager.start(bad).await.err().unwrap();
    assert!(matches!(err, Error::Configuration(_)));
    assert_eq!(manager.state(), SessionState::Idle);

    let empty = SessionManager::new(CatalogData::default());
    let err = empty
        .start(config(dir.path(), Duration::from_secs(1), 60, 1))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::CatalogExhausted { .. }));
    assert_eq!(empty.state(), SessionState::Idle);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn periodic_statistics_and_progress_are_reported() {
    let server = TestServer::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();

    let ticks = Arc::new(AtomicU64::new(0));
    let progress = {
        let ticks = Arc::clone(&ticks);
        Arc::new(move |update: trafgen_core::ProgressUpdate| {
            assert_eq!(update.tick, ticks.fetch_add(1, Ordering::Relaxed) + 1);
        })
    };

    let cfg = RunConfig {
        stats_interval: Duration::from_millis(500),
        ..config(dir.path(), Duration::from_millis(2300), 120, 1)
    };
    let manager =
        SessionManager::new(local_catalog(server.base_url(), server.addr())).with_progress(progress);
    manager.start(cfg).await.unwrap().wait().await.unwrap();

    let stats = read_stream(dir.path(), LogStream::Statistics);
    let periodic = stats.iter().filter(|r| r["final"] == "false").count();
    assert!(periodic >= 3, "periodic statistics records: {periodic}");
    assert_eq!(stats.iter().filter(|r| r["final"] == "true").count(), 1);
    assert!(ticks.load(Ordering::Relaxed) >= 2);

    server.shutdown().await;
}
