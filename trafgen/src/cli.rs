use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

const DURATION_HINT: &str = "expected e.g. 250ms, 90s, 10m, 1h";

/// Parse `<integer><unit>`; a bare number is seconds.
pub(crate) fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err(format!("duration cannot be empty ({DURATION_HINT})"));
    }

    let number_end = s
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map_or(s.len(), |(idx, _)| idx);
    if number_end == 0 {
        return Err(format!("invalid duration '{s}' ({DURATION_HINT})"));
    }

    let (number_str, unit_str) = s.split_at(number_end);
    let value: u64 = number_str
        .parse()
        .map_err(|_| format!("invalid duration '{s}' ({DURATION_HINT})"))?;

    let multiplier = match unit_str.trim() {
        "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => {
            return Ok(Duration::from_millis(value));
        }
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hrs" | "hour" | "hours" => 60 * 60,
        _ => return Err(format!("invalid duration '{s}' ({DURATION_HINT})")),
    };

    value
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Progress bar and a human-readable summary.
    HumanReadable,
    /// Emit JSON progress lines (NDJSON) and a JSON summary to stdout.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "trafgen",
    author,
    version,
    about = "Synthetic security traffic generator",
    long_about = "trafgen generates a paced mix of benign browsing, simulated compromised-host activity and labelled attack requests for exercising SIEM rules, IDS/IPS and firewalls.\n\nNo real exploitation happens: attack payloads are fixed strings sent to test endpoints and compromised-host payloads are synthetic markers.\n\nEvery request is recorded in key=value log streams under the log directory, correlated by a per-run session id.",
    after_help = "Examples:\n  trafgen run --duration 10m --rpm 30\n  trafgen run --config trafgen.json --no-malicious\n  trafgen run --sites sites.txt --output json\n  trafgen probe --sample 5\n  trafgen init trafgen.json"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate traffic until the duration elapses or Ctrl-C
    #[command(
        long_about = "Generate traffic for the configured duration.\n\nValues come from built-in defaults, then the JSON config file, then CLI flags (flags win)."
    )]
    Run(RunArgs),

    /// Request a random sample of benign sites once each and report reachability
    Probe(ProbeArgs),

    /// Write a JSON config file populated with the defaults
    Init(InitArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// JSON config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run duration (e.g. 90s, 10m, 1h)
    #[arg(long, value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Target requests per minute across all workers
    #[arg(long)]
    pub rpm: Option<u32>,

    /// Number of concurrent workers
    #[arg(long)]
    pub workers: Option<usize>,

    /// Disable simulated compromised-host traffic
    #[arg(long)]
    pub no_compromise: bool,

    /// Disable simulated attack traffic
    #[arg(long)]
    pub no_malicious: bool,

    /// Directory for the log streams
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Replace the benign site list (one `url[,category]` per line, `#` comments)
    #[arg(long, value_name = "FILE")]
    pub sites: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// JSON config file (for its site list and user agents)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Replace the benign site list (one `url[,category]` per line)
    #[arg(long, value_name = "FILE")]
    pub sites: Option<PathBuf>,

    /// How many sites to request
    #[arg(long, default_value_t = 15)]
    pub sample: usize,

    /// Per-request timeout
    #[arg(long, value_parser = parse_duration, default_value = "10s")]
    pub timeout: Duration,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Config file to create
    #[arg(default_value = "trafgen.json")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_accepts_common_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("10s"), Ok(Duration::from_secs(10)));
        assert_eq!(parse_duration("1m"), Ok(Duration::from_secs(60)));
        assert_eq!(parse_duration("2h"), Ok(Duration::from_secs(2 * 60 * 60)));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("10x").is_err());
    }

    #[test]
    fn cli_parses_run_overrides() {
        let parsed = Cli::try_parse_from([
            "trafgen",
            "run",
            "--config",
            "cfg.json",
            "--duration",
            "5m",
            "--rpm",
            "30",
            "--workers",
            "4",
            "--no-malicious",
            "--log-dir",
            "out",
            "--output",
            "json",
        ]);

        let cli = match parsed {
            Ok(v) => v,
            Err(err) => panic!("failed to parse args: {err}"),
        };

        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.config, Some(PathBuf::from("cfg.json")));
                assert_eq!(args.duration, Some(Duration::from_secs(300)));
                assert_eq!(args.rpm, Some(30));
                assert_eq!(args.workers, Some(4));
                assert!(args.no_malicious);
                assert!(!args.no_compromise);
                assert_eq!(args.log_dir, Some(PathBuf::from("out")));
                assert_eq!(args.output, OutputFormat::Json);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn cli_parses_probe_and_init_defaults() {
        let cli = match Cli::try_parse_from(["trafgen", "probe"]) {
            Ok(v) => v,
            Err(err) => panic!("failed to parse args: {err}"),
        };
        match cli.command {
            Command::Probe(args) => {
                assert_eq!(args.sample, 15);
                assert_eq!(args.timeout, Duration::from_secs(10));
            }
            _ => panic!("expected probe command"),
        }

        let cli = match Cli::try_parse_from(["trafgen", "init"]) {
            Ok(v) => v,
            Err(err) => panic!("failed to parse args: {err}"),
        };
        match cli.command {
            Command::Init(args) => {
                assert_eq!(args.path, PathBuf::from("trafgen.json"));
                assert!(!args.force);
            }
            _ => panic!("expected init command"),
        }
    }
}
