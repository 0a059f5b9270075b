use anyhow::{Context, Result};
use clap::Parser;
use media_transform::config::Config;
use media_transform::error::MediaError;
use media_transform::image_transform::QueryArgs;
use media_transform::pipeline::render_row;
use std::io::Write;
use std::path::PathBuf;

/// Media Transform - render a stored image the way the host would serve it
#[derive(Parser, Debug)]
#[command(name = "media-transform")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Source whose transform settings apply
    #[arg(short, long)]
    source: Option<String>,

    /// Row columns as a JSON object, inline or a path to a JSON file
    #[arg(short, long)]
    row: Option<String>,

    /// Request query string, e.g. "w=400&format=webp"
    #[arg(short, long, default_value = "")]
    query: String,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,

    /// Stored image file
    #[arg(required_unless_present = "test")]
    input: Option<PathBuf>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn parse_row(row: Option<&str>) -> Result<serde_json::Map<String, serde_json::Value>> {
    let Some(row) = row else {
        return Ok(serde_json::Map::new());
    };

    let json = if row.trim_start().starts_with('{') {
        row.to_string()
    } else {
        std::fs::read_to_string(row)
            .map_err(MediaError::from)
            .with_context(|| format!("Failed to read row file {}", row))?
    };

    serde_json::from_str(&json)
        .map_err(MediaError::from)
        .context("Row must be a JSON object")
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .map_err(MediaError::Config)
        .with_context(|| format!("Failed to load configuration {}", args.config.display()))?;
    config
        .validate()
        .map_err(MediaError::Config)
        .context("Invalid configuration")?;

    media_transform::logging::init_subscriber(&config.logging)
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize logging subsystem")?;

    tracing::info!(
        config_file = %args.config.display(),
        sources = config.sources.len(),
        "Configuration loaded successfully"
    );

    if args.test {
        return Ok(());
    }

    let source_name = args
        .source
        .as_deref()
        .context("--source is required when rendering")?;
    let source = config
        .source(source_name)
        .ok_or_else(|| MediaError::Config(format!("Unknown source '{}'", source_name)))?;

    let input = args.input.context("No input file given")?;
    let data = std::fs::read(&input)
        .map_err(MediaError::from)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let row = parse_row(args.row.as_deref())?;
    let query = QueryArgs::parse(&args.query);

    let response = render_row(&data, &row, source, &query).map_err(|e| {
        let status = e.to_http_status();
        anyhow::Error::from(MediaError::from(e)).context(format!("Render failed ({})", status))
    })?;

    tracing::info!(
        source = source_name,
        content_type = %response.content_type,
        transformed = response.transformed,
        bytes = response.body.len(),
        "Rendered"
    );

    match args.output {
        Some(path) => std::fs::write(&path, &response.body)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&response.body)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
