//! Renders a template once against JSON data and prints the result.

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgGroup, Parser};
use lightview::logging::init_tracing;
use lightview::{Node, TemplateSource, ViewConfig, ViewController, ViewError, ViewOptions};
use serde_json::{Map, Value};

#[derive(Parser, Debug)]
#[command(name = "lightview")]
#[command(version, about = "Render a Handlebars template against JSON data")]
#[command(group(ArgGroup::new("source").required(true).args(["data", "url"])))]
struct Args {
    /// Template file
    #[arg(long)]
    template: PathBuf,

    /// JSON data file
    #[arg(long)]
    data: Option<PathBuf>,

    /// URL to fetch the JSON data from
    #[arg(long)]
    url: Option<String>,

    /// Start from an empty list instead of an empty object before fetching
    #[arg(long, requires = "url")]
    list: bool,

    /// Config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ViewConfig::load_from(path)?,
        None => ViewConfig::default(),
    };

    let template = fs::read_to_string(&args.template)
        .with_context(|| format!("Failed to read template '{}'", args.template.display()))?;

    let data = match &args.data {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read data '{}'", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Data file '{}' is not valid JSON", path.display()))?
        }
        None if args.list => Value::Array(Vec::new()),
        None => Value::Object(Map::new()),
    };

    let view = ViewController::new(
        Node::element("div"),
        ViewOptions::new(TemplateSource::Inline(template), data).with_config(config),
    )
    .map_err(view_error)?;

    if let Some(url) = args.url {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;
        let local = tokio::task::LocalSet::new();

        local
            .block_on(&runtime, async {
                view.spawn_fetch_and_replace(url, Map::new(), Map::new()).await
            })
            .context("Hydration task failed")?
            .map_err(view_error)?;
    }

    println!("{}", view.mount().inner_html());
    Ok(())
}

fn view_error(err: ViewError) -> anyhow::Error {
    anyhow!("{} ({})", err, err.error_type())
}
