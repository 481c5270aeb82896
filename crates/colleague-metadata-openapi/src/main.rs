//! CLI for `colleague-metadata-openapi`.
//!
//! Works straight from a catalog file, without the HTTP service.
//!
//! # Subcommands
//!
//! ```text
//! # Print the OpenAPI documents of a resource as JSON
//! colleague-metadata-openapi generate persons --catalog catalog.yaml
//!
//! # Write them as YAML under the publish directory instead
//! colleague-metadata-openapi generate persons --catalog catalog.yaml --publish
//!
//! # Manifest CSV for a domain and API type
//! colleague-metadata-openapi manifest --catalog catalog.yaml --domain ST --api-type ethos
//!
//! # Resource discovery as JSON
//! colleague-metadata-openapi resources --catalog catalog.yaml
//! ```

#![forbid(unsafe_code)]

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use colleague_metadata_core::Catalog;
use colleague_metadata_openapi::{
    build_manifest, manifest_file_rows, publish_manifest, write_document, write_manifest_csv,
    ManifestQuery, ProjectConfig, ResourceDiscovery, Synthesizer,
};
use tracing_subscriber::EnvFilter;

/// OpenAPI, manifest and resource discovery generator for the Colleague Web API.
#[derive(Parser)]
#[command(name = "colleague-metadata-openapi", version, about)]
enum Cli {
    /// Synthesize the OpenAPI documents of one resource.
    Generate(GenerateArgs),

    /// Build the API manifest.
    Manifest(ManifestArgs),

    /// List every Ethos resource and its representations.
    Resources(CommonArgs),
}

#[derive(Parser)]
struct CommonArgs {
    /// Path to a project config YAML file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the descriptor catalog. Overrides `catalog` from the config file.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Root directory for published files. Overrides `publish_dir`.
    #[arg(long)]
    publish_dir: Option<PathBuf>,
}

#[derive(Parser)]
struct GenerateArgs {
    /// Resource name (`persons`, `x-widgets`).
    resource: String,

    #[command(flatten)]
    common: CommonArgs,

    /// Write YAML documents under the publish directory instead of
    /// printing JSON.
    #[arg(long)]
    publish: bool,
}

#[derive(Parser)]
struct ManifestArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Domain code or name. All domains when omitted.
    #[arg(long)]
    domain: Option<String>,

    /// API type (`ethos`, `web-ethos` ...). All types when omitted.
    #[arg(long)]
    api_type: Option<String>,

    /// Restrict to one resource.
    #[arg(long)]
    resource: Option<String>,

    /// Restrict to one major version.
    #[arg(long)]
    version: Option<String>,

    /// Publish the listed documents and the manifest file instead of
    /// printing CSV.
    #[arg(long)]
    publish: bool,
}

/// Catalog and settings resolved from the config file and CLI flags.
struct Loaded {
    project: ProjectConfig,
    catalog: Catalog,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse() {
        Cli::Generate(args) => run_generate(&args),
        Cli::Manifest(args) => run_manifest(&args),
        Cli::Resources(args) => run_resources(&args),
    }
}

fn load(args: &CommonArgs) -> anyhow::Result<Loaded> {
    let mut project = match &args.config {
        Some(path) => {
            eprintln!("Loading config: {}", path.display());
            ProjectConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?
        }
        None => ProjectConfig::default(),
    };
    if let Some(catalog) = &args.catalog {
        project.catalog = Some(catalog.clone());
    }
    if let Some(dir) = &args.publish_dir {
        project.publish_dir.clone_from(dir);
    }

    let Some(path) = project.catalog.clone() else {
        bail!("No catalog specified. Use --catalog or set `catalog` in the config file.");
    };
    let catalog = Catalog::load(&path)
        .with_context(|| format!("Failed to load catalog: {}", path.display()))?;
    Ok(Loaded { project, catalog })
}

fn run_generate(args: &GenerateArgs) -> anyhow::Result<()> {
    let Loaded { project, catalog } = load(&args.common)?;
    let synth = Synthesizer::from_catalog(&catalog).with_page_limit(project.page_limit);
    let documents = synth
        .openapi(&args.resource)
        .with_context(|| format!("Failed to synthesize '{}'", args.resource))?;
    if documents.is_empty() {
        bail!("No documents for '{}'", args.resource);
    }

    if args.publish {
        for document in &documents {
            let path = write_document(&project.publish_dir, document)
                .with_context(|| format!("Failed to publish '{}'", document.info.title))?;
            eprintln!("Wrote {}", path.display());
        }
        return Ok(());
    }

    let json = if documents.len() == 1 {
        serde_json::to_string_pretty(&documents[0])
    } else {
        serde_json::to_string_pretty(&documents)
    }
    .context("Failed to serialize documents")?;
    println!("{json}");
    Ok(())
}

fn run_manifest(args: &ManifestArgs) -> anyhow::Result<()> {
    let Loaded { project, catalog } = load(&args.common)?;
    let query = ManifestQuery {
        domain: args.domain.clone().unwrap_or_default(),
        api_type: args.api_type.clone().unwrap_or_default(),
        resource: args.resource.clone().unwrap_or_default(),
        version: args.version.clone().unwrap_or_default(),
    };

    let rows = build_manifest(&catalog, &query);
    eprintln!("Manifest lists {} API versions", rows.len());

    if args.publish {
        let synth = Synthesizer::from_catalog(&catalog).with_page_limit(project.page_limit);
        let today = chrono::Local::now().date_naive();
        let kept = publish_manifest(&synth, rows, &query, &project.publish_dir, today)
            .context("Failed to publish manifest")?;
        eprintln!("Published {} API versions to {}", kept.len(), project.publish_dir.display());
        return Ok(());
    }

    let selected = manifest_file_rows(&rows, &query);
    let mut stdout = std::io::stdout().lock();
    write_manifest_csv(&selected, &mut stdout).context("Failed to write manifest")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}

fn run_resources(args: &CommonArgs) -> anyhow::Result<()> {
    let Loaded { project, catalog } = load(args)?;
    let resources = ResourceDiscovery::new(&catalog, &catalog)
        .with_bulk_load_supported(project.bulk_load_supported)
        .discover();
    let json = serde_json::to_string_pretty(&resources).context("Failed to serialize resources")?;
    println!("{json}");
    Ok(())
}
