use clap::{Parser, Subcommand};
use site_import::config::{self, ImportConfig};
use site_import::import::{self, ImportEvent};
use site_import::output;
use site_import::types::ZipImportResult;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::JoinHandle;

/// Name of the result manifest written next to the pages.
const RESULT_MANIFEST: &str = "import.json";

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "site-import")]
#[command(about = "Turn a zipped static website into self-contained pages")]
#[command(long_about = "\
Turn a zipped static website into self-contained pages

Every HTML file in the archive becomes a page. Stylesheets, scripts, images
and fonts it references are inlined: stylesheets become <style> blocks,
scripts become inline <script> elements, everything else becomes a data URI.
References that cannot be resolved are left exactly as written.

Archive layout:

  my-site.zip
  └── my-site/                 # Optional wrapper directory (stripped)
      ├── index.html           # Main page (slug \"\")
      ├── about.html           # Page (slug \"about\")
      ├── blog/Post.html       # Page (slug \"blog/post\")
      ├── css/site.css         # Inlined into pages that link it
      └── img/logo.png         # Inlined as data:image/png;base64,...

macOS metadata (__MACOSX/, ._*, .DS_Store) is ignored.

Run 'site-import gen-config' to generate a documented config file.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (TOML); stock defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import an archive and write one HTML file per page plus import.json
    Import {
        /// Zip archive to import
        zip: PathBuf,
        /// Output directory
        #[arg(long, default_value = "imported")]
        output: PathBuf,
    },
    /// Import an archive without writing anything and print its inventory
    Check {
        /// Zip archive to check
        zip: PathBuf,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Import {
            zip,
            output: output_dir,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);

            println!("==> Importing {}", zip.display());
            let (tx, printer) = spawn_printer();
            let result = import::import_file(&zip, &config, Some(tx));
            join_printer(printer);
            let result = result?;
            output::print_import_summary(&result);

            println!("==> Writing {}", output_dir.display());
            write_result(&result, &output_dir, &config)?;
            output::print_written_output(&result, RESULT_MANIFEST);
        }
        Command::Check { zip } => {
            let config = config::load_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);

            println!("==> Checking {}", zip.display());
            let result = import::import_file(&zip, &config, None)?;
            output::print_check_output(&result);
            println!("==> Archive is importable");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Route `log` output through env_logger.
///
/// `RUST_LOG` decides the level, defaulting to `warn`; `--verbose` forces `debug`.
fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Print import events as they arrive, on a dedicated thread.
fn spawn_printer() -> (mpsc::Sender<ImportEvent>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel::<ImportEvent>();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_import_event(&event) {
                println!("{}", line);
            }
        }
    });
    (tx, printer)
}

fn join_printer(printer: JoinHandle<()>) {
    if printer.join().is_err() {
        log::warn!("progress printer thread panicked");
    }
}

/// Write each page to `<output>/<slug or index>.html` and the full result to
/// `<output>/import.json`.
fn write_result(
    result: &ZipImportResult,
    output_dir: &Path,
    config: &ImportConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(output_dir)?;
    for page in &result.pages {
        let path = output_dir.join(output::page_output_name(&page.slug));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &page.html_content)?;
    }

    let json = if config.output.pretty_json {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    std::fs::write(output_dir.join(RESULT_MANIFEST), json)?;
    Ok(())
}
