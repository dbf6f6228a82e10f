use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use userpack_core::config::{CliOverrides, PackConfig, CONFIG_FILE};
use userpack_core::diagnostics::{ConsoleDiagnosticHandler, DiagnosticHandler};
use userpack_core::externals::global_names;
use userpack_core::metadata;
use userpack_core::package::Packager;

/// Userpack - package a bundled script as a userscript
#[derive(Parser, Debug, Clone)]
#[command(name = "userpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to userpack.yaml configuration file
    #[arg(short, long, value_name = "FILE")]
    project: Option<PathBuf>,

    /// File holding the metadata placeholder block
    #[arg(long, value_name = "FILE")]
    header: Option<PathBuf>,

    /// Bundled script to prepend the metadata block to
    #[arg(long, value_name = "FILE")]
    payload: Option<PathBuf>,

    /// Output file (prints to stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    out_file: Option<PathBuf>,

    /// Package manifest to read versions and author from
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// CDN base URL for externals
    #[arg(long, value_name = "URL")]
    cdn_base: Option<String>,

    /// Print the external module → global name map as JSON and exit
    #[arg(long)]
    print_globals: bool,

    /// Print the resolved @require URLs and exit
    #[arg(long)]
    print_requires: bool,

    /// Parse the header placeholder and print it normalized
    #[arg(long)]
    check: bool,

    /// Initialize a new userpack project
    #[arg(long)]
    init: bool,

    /// Disable colored diagnostics
    #[arg(long)]
    no_color: bool,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    // Set RUST_LOG=debug for detailed logs, info otherwise. Logs go to stderr, stdout carries output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Handle --init flag
    if cli.init {
        init_project()?;
        return Ok(());
    }

    let config = load_config(&cli)?;
    debug!("Configuration: {:?}", config);

    if cli.print_globals {
        let globals = global_names(&config.externals);
        println!("{}", serde_json::to_string_pretty(&globals)?);
        return Ok(());
    }

    if cli.check {
        return check_header(&config);
    }

    let diagnostics = Arc::new(ConsoleDiagnosticHandler::new(!cli.no_color));
    let packager = Packager::from_config(config, diagnostics.clone())
        .context("Failed to load package manifest")?;

    if cli.print_requires {
        for url in packager.requires()? {
            println!("{}", url);
        }
        return Ok(());
    }

    let script = packager.package_files()?;

    match &packager.config().out_file {
        Some(out_file) => {
            let out_path = Path::new(out_file);
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(out_path, &script)
                .with_context(|| format!("Failed to write {}", out_path.display()))?;
            info!("Wrote {}", out_path.display());
        }
        None => print!("{}", script),
    }

    if diagnostics.warning_count() > 0 {
        info!("Finished with {} warning(s)", diagnostics.warning_count());
    }

    Ok(())
}

/// Initialize a new project with a configuration file and header placeholder
fn init_project() -> anyhow::Result<()> {
    println!("Initializing new userpack project...");

    let config = r#"# userpack configuration

header: src/meta.js        # Metadata placeholder block
payload: dist/bundle.js    # Bundled script produced by your bundler
outFile: dist/script.user.js
manifest: package.json     # Version, author and dependency versions

metadata:
  name: My Userscript
  namespace: https://example.com/user-scripts
  overrides:
    noframes: true

externals:
  # Loaded from the CDN at the version declared in package.json
  # - module: "@violentmonkey/dom"
  #   exposeAs: VM
  # Loaded from a fixed URL
  # - module: my-lib
  #   exposeAs: MyLib
  #   requireUrl: https://example.com/my-lib.js
"#;

    let meta = r#"// ==UserScript==
// @name        placeholder
// @description placeholder
// @match       https://example.com/*
// @grant       none
// ==/UserScript==
"#;

    write_new_file(Path::new(CONFIG_FILE), config)?;
    println!("Created {}", CONFIG_FILE);

    std::fs::create_dir_all("src")?;
    write_new_file(Path::new("src/meta.js"), meta)?;
    println!("Created src/meta.js");

    println!("\nProject initialized successfully!");
    println!("Run 'userpack' after bundling to produce your userscript.");

    Ok(())
}

fn write_new_file(path: &Path, content: &str) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Load configuration from file (if any) and apply command-line overrides
fn load_config(cli: &Cli) -> anyhow::Result<PackConfig> {
    let mut config = if let Some(ref project_path) = cli.project {
        PackConfig::from_file(project_path)
            .with_context(|| format!("Failed to load config file {}", project_path.display()))?
    } else {
        let default_path = PathBuf::from(CONFIG_FILE);
        if default_path.exists() {
            PackConfig::from_file(&default_path)
                .with_context(|| format!("Failed to load {}", CONFIG_FILE))?
        } else {
            PackConfig::default()
        }
    };

    let path_string = |path: &Option<PathBuf>| {
        path.as_ref()
            .map(|p| p.to_string_lossy().to_string())
    };

    config.merge(&CliOverrides {
        header: path_string(&cli.header),
        payload: path_string(&cli.payload),
        out_file: path_string(&cli.out_file),
        manifest: path_string(&cli.manifest),
        cdn_base: cli.cdn_base.clone(),
    });

    Ok(config)
}

/// Parse the placeholder on its own and print the normalized block
fn check_header(config: &PackConfig) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&config.header)
        .with_context(|| format!("Failed to read {}", config.header))?;
    let record = metadata::parse(&text)
        .with_context(|| format!("Invalid metadata block in {}", config.header))?;

    info!("{}: {} metadata key(s)", config.header, record.len());
    println!("{}", metadata::serialize(&record)?);
    Ok(())
}
