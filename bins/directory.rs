use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use models::{School, SchoolDraft};
use service::storage::ImageFile;
use service::{Backend, DirectoryStore, Notifier};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "directory")]
#[command(about = "Browse and add schools in the directory")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List schools, newest first
    List {
        /// Only show schools whose name, city or state contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Add a school
    Add(AddArgs),
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    /// 10-digit phone number
    #[arg(long)]
    contact: String,
    #[arg(long = "email")]
    email_id: String,
    /// Image file to upload with the listing
    #[arg(long, value_name = "FILE")]
    image: Option<PathBuf>,
}

impl AddArgs {
    fn draft(&self) -> SchoolDraft {
        SchoolDraft {
            name: self.name.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            contact: self.contact.clone(),
            email_id: self.email_id.clone(),
            image: None,
        }
    }
}

/// Prints notifications for the person at the terminal.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        info!(event = "notify", kind = "success", %message);
        eprintln!("✔ {message}");
    }

    fn error(&self, message: &str) {
        info!(event = "notify", kind = "error", %message);
        eprintln!("✘ {message}");
    }
}

fn print_school(s: &School) {
    println!("#{:<5} {}", s.id, s.name);
    println!("       {}, {}, {}", s.address, s.city, s.state);
    println!("       {} | {}", s.contact, s.email_id);
    if let Some(image) = &s.image {
        println!("       {image}");
    }
}

async fn run(cli: Cli, backend: Backend) -> anyhow::Result<ExitCode> {
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    match cli.command {
        Commands::List { search } => {
            let store = DirectoryStore::open(backend, notifier).await;
            let snap = store.snapshot();
            if let Some(err) = &snap.error {
                eprintln!("error: {err}");
                return Ok(ExitCode::FAILURE);
            }
            let hits = snap.search(search.as_deref().unwrap_or_default());
            if hits.is_empty() {
                println!("No schools found.");
            }
            for s in hits {
                print_school(s);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Add(args) => {
            let draft = args.draft();
            let problems = draft.validation_errors();
            if !problems.is_empty() {
                for p in problems {
                    eprintln!("invalid: {p}");
                }
                return Ok(ExitCode::FAILURE);
            }
            let image = match &args.image {
                Some(path) => Some(ImageFile::from_path(path).await?),
                None => None,
            };
            let store = DirectoryStore::new(backend, notifier);
            match store.submit(draft, image.as_ref()).await {
                Ok(school) => {
                    print_school(&school);
                    Ok(ExitCode::SUCCESS)
                }
                // already reported through the notifier
                Err(_) => Ok(ExitCode::FAILURE),
            }
        }
    }
}

fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(event = "config_invalid", error = %e, "failed to load configuration");
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    common::utils::logging::init_logging(cfg.logging.json);

    std::panic::set_hook(Box::new(|info| {
        error!(event = "panic", message = %info, "unhandled panic occurred");
    }));

    let backend = match Backend::from_config(&cfg.backend()) {
        Ok(b) => b,
        Err(e) => {
            error!(event = "backend_init_failed", error = %e, "cannot build backend client");
            return ExitCode::FAILURE;
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli, backend)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
