use chrono::{DateTime, SecondsFormat, Utc};

/// Render one record as `timestamp=.. session_id=.. key=value ...`.
pub fn format_line(timestamp: DateTime<Utc>, session_id: &str, fields: &[(&str, String)]) -> String {
    let mut line = String::with_capacity(64 + fields.len() * 24);
    line.push_str("timestamp=");
    line.push_str(&timestamp.to_rfc3339_opts(SecondsFormat::Micros, true));
    push_pair(&mut line, "session_id", session_id);
    for (key, value) in fields {
        push_pair(&mut line, key, value);
    }
    line
}

fn push_pair(line: &mut String, key: &str, value: &str) {
    line.push(' ');
    line.push_str(key);
    line.push('=');
    push_value(line, value);
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '=' || c == '\\')
}

fn push_value(line: &mut String, value: &str) {
    if !needs_quotes(value) {
        line.push_str(value);
        return;
    }

    line.push('"');
    for c in value.chars() {
        match c {
            '\\' => line.push_str("\\\\"),
            '"' => line.push_str("\\\""),
            '\n' => line.push_str("\\n"),
            '\r' => line.push_str("\\r"),
            other => line.push(other),
        }
    }
    line.push('"');
}

/// Split a line produced by [`format_line`] back into ordered key/value pairs.
///
/// Returns `None` for malformed input (missing `=`, unterminated quote, bad escape).
pub fn parse_line(line: &str) -> Option<Vec<(String, String)>> {
    let mut out = Vec::new();
    let mut chars = line.trim_end_matches(['\n', '\r']).chars().peekable();

    loop {
        while chars.next_if(|c| *c == ' ').is_some() {}
        if chars.peek().is_none() {
            return Some(out);
        }

        let mut key = String::new();
        loop {
            match chars.next()? {
                '=' => break,
                ' ' => return None,
                c => key.push(c),
            }
        }
        if key.is_empty() {
            return None;
        }

        let mut value = String::new();
        if chars.next_if_eq(&'"').is_some() {
            loop {
                match chars.next()? {
                    '"' => break,
                    '\\' => match chars.next()? {
                        '\\' => value.push('\\'),
                        '"' => value.push('"'),
                        'n' => value.push('\n'),
                        'r' => value.push('\r'),
                        _ => return None,
                    },
                    c => value.push(c),
                }
            }
            if chars.peek().is_some_and(|c| *c != ' ') {
                return None;
            }
        } else {
            while let Some(c) = chars.next_if(|c| *c != ' ') {
                value.push(c);
            }
        }

        out.push((key, value));
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::TimeZone as _;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn plain_values_are_bare() {
        let line = format_line(
            ts(),
            "ab12cd34",
            &[("type", "normal".to_string()), ("status", "200".to_string())],
        );
        assert_eq!(
            line,
            "timestamp=2026-01-02T03:04:05.000000Z session_id=ab12cd34 type=normal status=200"
        );
    }

    #[test]
    fn awkward_values_are_quoted_and_survive_parsing() {
        let ua = "Mozilla/5.0 (X11; Linux x86_64)".to_string();
        let payload = "' OR 1=1--".to_string();
        let path = "..\\..\\windows \"x\"\nnext".to_string();
        let line = format_line(
            ts(),
            "ab12cd34",
            &[
                ("user_agent", ua.clone()),
                ("payload", payload.clone()),
                ("path", path.clone()),
                ("error", String::new()),
            ],
        );
        assert!(!line.contains('\n'));

        let parsed = parse_line(&line).unwrap();
        let keys: Vec<_> = parsed.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            ["timestamp", "session_id", "user_agent", "payload", "path", "error"]
        );
        assert_eq!(parsed[2].1, ua);
        assert_eq!(parsed[3].1, payload);
        assert_eq!(parsed[4].1, path);
        assert_eq!(parsed[5].1, "");
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(parse_line("novalue").is_none());
        assert!(parse_line("k=\"unterminated").is_none());
        assert!(parse_line("k=\"bad\\q\"").is_none());
        assert_eq!(parse_line("").unwrap(), Vec::<(String, String)>::new());
    }
}
