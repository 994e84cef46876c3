use std::path::Path;

use anyhow::Context as _;
use trafgen_core::Site;

const DEFAULT_CATEGORY: &str = "custom";

pub async fn load_sites(path: &Path) -> anyhow::Result<Vec<Site>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read site list: {}", path.display()))?;
    parse_sites(&text).with_context(|| format!("invalid site list: {}", path.display()))
}

/// One `url[,category]` per line. Blank lines and `#` comments are skipped.
pub fn parse_sites(text: &str) -> anyhow::Result<Vec<Site>> {
    let mut sites = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let (url, category) = match line.split_once(',') {
            Some((url, category)) => (url.trim(), category.trim()),
            None => (line, DEFAULT_CATEGORY),
        };

        let parsed = url::Url::parse(url).with_context(|| format!("line {}: bad url `{url}`", idx + 1))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("line {}: only http:// and https:// sites are supported", idx + 1);
        }

        let category = if category.is_empty() {
            DEFAULT_CATEGORY
        } else {
            category
        };
        sites.push(Site::new(url, category));
    }

    if sites.is_empty() {
        anyhow::bail!("no sites found");
    }
    Ok(sites)
}
