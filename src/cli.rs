use crate::manifest::Manifest;
use crate::openapi_builder::{build, OpenApiDocument};
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::source::load_sources;
use crate::swagger_ui::swagger_ui_html;
use crate::type_resolver::TypeResolver;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// Generate OpenAPI 3.0 documents from a route manifest and Rust type definitions
#[derive(Parser, Debug)]
#[command(name = "openapi-from-routes")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Route manifest (YAML, or JSON with a .json extension)
    #[arg(value_name = "MANIFEST")]
    pub manifest_path: PathBuf,

    /// Directory of Rust sources defining the body and response types (repeatable)
    #[arg(short = 's', long = "source", value_name = "DIR")]
    pub sources: Vec<PathBuf>,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Also write a Swagger UI page to this file
    #[arg(long = "ui", value_name = "FILE")]
    pub ui_path: Option<PathBuf>,

    /// URL the Swagger UI page loads the document from
    #[arg(long = "spec-url", value_name = "URL", default_value = "openapi.json")]
    pub spec_url: String,

    /// Override the document title
    #[arg(long = "title")]
    pub title: Option<String>,

    /// Override the document version
    #[arg(long = "api-version")]
    pub api_version: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest_path.is_file() {
        anyhow::bail!("Manifest file does not exist: {}", args.manifest_path.display());
    }

    for source in &args.sources {
        if !source.is_dir() {
            anyhow::bail!("Source path is not a directory: {}", source.display());
        }
    }

    info!("Manifest: {}", args.manifest_path.display());
    info!("Output format: {:?}", args.output_format);
    match &args.output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }

    Ok(args)
}

/// Build the document described by the arguments
pub fn generate(args: &CliArgs) -> Result<OpenApiDocument> {
    let mut manifest = Manifest::load(&args.manifest_path)
        .with_context(|| format!("Failed to load manifest: {}", args.manifest_path.display()))?;

    if let Some(title) = &args.title {
        manifest.config.title = title.clone();
    }
    if let Some(version) = &args.api_version {
        manifest.config.version = version.clone();
    }

    info!("Resolving types from {} source directories", args.sources.len());
    let mut resolver = TypeResolver::new(load_sources(&args.sources));

    let input = manifest
        .into_build_input(&mut resolver)
        .context("Invalid route manifest")?;

    Ok(build(&input))
}

/// Serialize the document in the requested format
pub fn render(document: &OpenApiDocument, format: OutputFormat) -> Result<String> {
    info!("Serializing to {:?} format...", format);
    match format {
        OutputFormat::Yaml => serialize_yaml(document),
        OutputFormat::Json => serialize_json(document),
    }
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    let document = generate(&args)?;
    let content = render(&document, args.output_format)?;

    if let Some(output_path) = &args.output_path {
        write_to_file(&content, output_path)?;
        info!("Wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    if let Some(ui_path) = &args.ui_path {
        write_to_file(&swagger_ui_html(&args.spec_url, &document.info.title), ui_path)?;
        info!("Wrote Swagger UI page to {}", ui_path.display());
    }

    Ok(())
}
