use chrono::Utc;
use clap::{Parser, Subcommand};
use pagecraft::{check, cms, config, fetch, generate, output, query};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pagecraft")]
#[command(about = "Static site builder for page-builder sites on a headless CMS")]
#[command(long_about = "\
Static site builder for page-builder sites on a headless CMS

Content lives in the CMS. Every page is an ordered list of typed modules
(heroes, text and image, lists, quotes, contact blocks, ...) that pagecraft
renders to plain HTML with inline JSON-LD.

Project layout:

  site.toml                        # Site config (run 'pagecraft gen-config')
  assets/                          # Static assets (favicon, fonts) → copied to output root
  .pagecraft-temp/manifest.json    # Written by 'fetch', read by 'generate'
  dist/                            # The generated site

Pipeline:
  fetch     CMS       → manifest.json
  generate  manifest  → dist/
  build     both stages in one go

The API token is read from --token or SANITY_API_TOKEN and is only needed
for private datasets and draft perspectives.")]
#[command(version)]
struct Cli {
    /// Site config file
    #[arg(long, default_value = "site.toml", global = true)]
    config: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (the fetched manifest)
    #[arg(long, default_value = ".pagecraft-temp", global = true)]
    temp_dir: PathBuf,

    /// CMS API token
    #[arg(long, env = "SANITY_API_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch all site content into a manifest
    Fetch,
    /// Produce the final HTML site from a fetched manifest
    Generate,
    /// Run the full pipeline: fetch → generate
    Build,
    /// Validate every stored document against the content schemas
    Check,
    /// Print a composed query
    Query {
        /// One of: page, home, not-found, navigation, footer, settings,
        /// redirects, sitemap, slugs
        name: String,
        /// Slug for the `page` query
        #[arg(long)]
        slug: Option<String>,
    },
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Fetch => {
            let site_config = config::load_config(&cli.config)?;
            init_thread_pool(&site_config.processing);
            let manifest = run_fetch(&site_config, cli.token, &cli.temp_dir)?;
            output::print_fetch_output(&manifest);
        }
        Command::Generate => {
            let manifest = fetch::read_manifest(&cli.temp_dir.join(fetch::MANIFEST_FILE))?;
            init_thread_pool(&manifest.config.processing);
            let report = generate::generate(&manifest, &cli.output, Some(&assets_dir(&cli.config)))?;
            output::print_generate_output(&report);
        }
        Command::Build => {
            let site_config = config::load_config(&cli.config)?;
            init_thread_pool(&site_config.processing);

            println!("==> Stage 1: Fetching {}", site_config.cms.dataset);
            let manifest = run_fetch(&site_config, cli.token, &cli.temp_dir)?;
            output::print_fetch_output(&manifest);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            let report = generate::generate(&manifest, &cli.output, Some(&assets_dir(&cli.config)))?;
            output::print_generate_output(&report);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let site_config = config::load_config(&cli.config)?;
            println!("==> Checking {}", site_config.cms.dataset);
            let client = cms::SanityClient::new(&site_config.cms, cli.token)?;
            let report = check::check(&client, &site_config)?;
            output::print_check_output(&report);
            if report.has_errors() {
                return Ok(ExitCode::FAILURE);
            }
            println!("==> Content is valid");
        }
        Command::Query { name, slug } => {
            let site_config = config::load_config(&cli.config)?;
            let registry = site_config.block_registry();
            let queries = query::QueryBuilder::new(&registry, &site_config.cms.page_types);
            let Some(query) = queries.by_name(&name, slug.as_deref()) else {
                eprintln!(
                    "unknown query '{name}', expected one of: {}",
                    query::QUERY_NAMES.join(", ")
                );
                return Ok(ExitCode::FAILURE);
            };
            println!("{}", query.groq);
            for (param, value) in query.encoded_params() {
                println!("{param} = {value}");
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn run_fetch(
    site_config: &config::SiteConfig,
    token: Option<String>,
    temp_dir: &Path,
) -> Result<fetch::Manifest, Box<dyn std::error::Error>> {
    let client = cms::SanityClient::new(&site_config.cms, token)?;
    let manifest = fetch::fetch(&client, site_config, Utc::now())?;
    fetch::write_manifest(&manifest, temp_dir)?;
    Ok(manifest)
}

/// The `assets/` directory next to the config file.
fn assets_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join("assets")
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
