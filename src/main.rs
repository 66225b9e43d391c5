// Embed the stylesheets of an HTML file and print the result.
//
// Usage: embed-stylesheets <input.html> [resolve-to] [--no-download] [--json]

use anyhow::{Context, Result, bail};
use html_embed_stylesheets::{EmbedConfig, embed_stylesheets};

const USAGE: &str = "usage: embed-stylesheets <input.html> [resolve-to] [--no-download] [--json]";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut positional = Vec::new();
    let mut download = true;
    let mut json = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--no-download" => download = false,
            "--json" => json = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            flag if flag.starts_with("--") => bail!("unknown flag {flag}\n{USAGE}"),
            _ => positional.push(arg),
        }
    }

    let (input, resolve_to) = match positional.as_slice() {
        [input] => (input, None),
        [input, base] => (input, Some(base.clone())),
        _ => bail!(USAGE),
    };

    let html = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read {input}"))?;

    let mut builder = EmbedConfig::builder().download(download);
    if let Some(base) = resolve_to {
        builder = builder.resolve_to(base);
    }
    let config = builder.build()?;

    let result = embed_stylesheets(&html, &config).await?;

    for failure in &result.failures {
        log::warn!("Stylesheet not found: {} ({})", failure.address, failure.reason);
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialize result")?
        );
    } else {
        println!("{}", result.html);
    }

    Ok(())
}
