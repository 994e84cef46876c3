use std::fmt::Write as _;
use std::time::Duration;

use trafgen_core::{ProbeReport, SessionReport, TrafficClass};

use super::format::*;

pub(crate) fn render(report: &SessionReport) -> String {
    let s = &report.stats;
    let mut out = String::new();

    out.push_str("summary\n");
    writeln!(&mut out, "  session: {} ({})", report.session_id, report.state).ok();
    writeln!(
        &mut out,
        "  elapsed: {}",
        format_duration(Duration::from_secs_f64(s.duration_secs.max(0.0)))
    )
    .ok();
    writeln!(
        &mut out,
        "  requests: {} (ok {}, failed {}, success {:.1}%)",
        s.total_requests, s.successful_requests, s.failed_requests, s.success_rate
    )
    .ok();
    writeln!(&mut out, "  rate: {} req/min", format_rate(s.requests_per_minute)).ok();

    out.push_str("  traffic:\n");
    for class in TrafficClass::ALL {
        let count = s.by_class.get(&class).copied().unwrap_or(0);
        writeln!(&mut out, "    {class}: {count}").ok();
    }

    let mut subtypes: Vec<_> = s.by_subtype.iter().filter(|(_, n)| **n > 0).collect();
    if !subtypes.is_empty() {
        subtypes.sort_by(|(a_name, a_count), (b_name, b_count)| {
            b_count.cmp(a_count).then_with(|| a_name.cmp(b_name))
        });
        out.push_str("  subtypes:\n");
        for (name, count) in subtypes {
            writeln!(&mut out, "    {name}: {count}").ok();
        }
    }

    writeln!(&mut out, "  security events: {}", s.security_events).ok();
    writeln!(&mut out, "  compromise activities: {}", s.compromise_activities).ok();
    writeln!(
        &mut out,
        "  dns: {} lookups ({} failed)",
        s.dns_lookups, s.dns_failures
    )
    .ok();
    writeln!(&mut out, "  bytes: {}", format_bytes(s.bytes_transferred)).ok();
    writeln!(
        &mut out,
        "  latency: p50 {} p95 {} p99 {}",
        format_ms_opt(s.latency_p50_ms),
        format_ms_opt(s.latency_p95_ms),
        format_ms_opt(s.latency_p99_ms)
    )
    .ok();
    writeln!(&mut out, "  logs: {}", report.log_directory.display()).ok();

    out
}

pub(crate) fn render_probe(report: &ProbeReport) -> String {
    let mut out = String::new();

    for r in &report.results {
        let outcome = match (r.status, &r.error) {
            (Some(status), _) => status.to_string(),
            (None, Some(err)) => format!("error: {err}"),
            (None, None) => "-".to_string(),
        };
        let mark = if r.reachable() { "ok" } else { "!!" };
        writeln!(
            &mut out,
            "{mark} {} {} ({}ms)",
            r.url,
            outcome,
            r.elapsed.as_millis()
        )
        .ok();
    }

    writeln!(
        &mut out,
        "reachable: {}/{}",
        report.reachable, report.probed
    )
    .ok();

    out
}
