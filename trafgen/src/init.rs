mod fs;

use anyhow::Context as _;

use crate::cli::InitArgs;
use crate::config_file::FileConfig;

pub async fn init(args: InitArgs) -> anyhow::Result<()> {
    let mut contents = serde_json::to_string_pretty(&FileConfig::sample())
        .context("failed to serialize config")?;
    contents.push('\n');

    fs::write_file(&args.path, &contents, args.force).await?;
    eprintln!("wrote {}", args.path.display());
    Ok(())
}
