use clap::{Parser, Subcommand};
use is_terminal::IsTerminal;
use minus::Pager;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use twig::areas::repository::Repository;
use twig::artifacts::core::PagerWriter;
use twig::commands::porcelain::log::{CommitFormat, Decoration, LogOptions};
use twig::config::Config;
use twig::errors::TwigError;

const LOG_ENV_VAR: &str = "TWIG_LOG";

#[derive(Parser)]
#[command(
    name = "twig",
    version = "0.1.0",
    about = "A small git-compatible version control tool",
    long_about = "twig keeps its objects, index and refs in a .git directory laid out \
    exactly like git's, so repositories can be inspected with either tool.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(name = "add", about = "Add file contents to the index")]
    Add {
        #[arg(index = 1, required = true, help = "Files or directories to stage")]
        paths: Vec<String>,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command records the index as a new commit on top of HEAD."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(name = "status", about = "Show the working tree status")]
    Status {
        #[arg(long, help = "Print one `XY path` line per change")]
        porcelain: bool,
    },
    #[command(name = "diff", about = "Show changes between the index and the workspace or HEAD")]
    Diff {
        #[arg(long, alias = "staged", help = "Compare HEAD with the index")]
        cached: bool,
    },
    #[command(
        name = "branch",
        about = "List, create or delete branches",
        long_about = "Without arguments, lists branches. With a name, creates a branch at the \
        optional start point (HEAD by default)."
    )]
    Branch {
        #[arg(index = 1, help = "Branch name, optionally followed by a start point")]
        args: Vec<String>,
        #[arg(short = 'd', long = "delete", help = "Delete the named branches")]
        delete: bool,
        #[arg(short = 'D', help = "Delete the named branches")]
        force_delete: bool,
        #[arg(short, long, help = "Overwrite an existing branch")]
        force: bool,
        #[arg(short, long, help = "Show the tip commit of each branch")]
        verbose: bool,
    },
    #[command(name = "checkout", about = "Switch branches or move HEAD to a commit")]
    Checkout {
        #[arg(index = 1, help = "Branch name or revision")]
        target: String,
    },
    #[command(name = "log", about = "Show the commit history")]
    Log {
        #[arg(index = 1, help = "Revision to start from (HEAD by default)")]
        revision: Option<String>,
        #[arg(long, help = "Shorthand for --format=oneline --abbrev-commit")]
        oneline: bool,
        #[arg(long, value_enum, default_value_t)]
        format: CommitFormat,
        #[arg(long, help = "Show abbreviated commit ids")]
        abbrev_commit: bool,
        #[arg(long, value_enum, num_args = 0..=1, require_equals = true, default_missing_value = "short")]
        decorate: Option<Decoration>,
        #[arg(long, help = "Do not print ref names")]
        no_decorate: bool,
    },
}

impl Commands {
    fn is_paged(&self) -> bool {
        matches!(self, Commands::Log { .. } | Commands::Diff { .. })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        std::process::exit(report(&error));
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env();
    let path = match &cli.command {
        Commands::Init { path: Some(path) } => path.clone(),
        _ => std::env::current_dir()?,
    };

    let pager = (config.use_pager && cli.command.is_paged() && std::io::stdout().is_terminal()).then(Pager::new);
    let writer: Box<dyn Write> = match &pager {
        Some(pager) => Box::new(PagerWriter::new(pager.clone())),
        None => Box::new(std::io::stdout()),
    };

    let repository = Repository::new(&path, config, writer)?;
    let result = dispatch(&repository, cli.command).await;
    repository.writer().flush()?;
    drop(repository);

    if let Some(pager) = pager {
        minus::page_all(pager)?;
    }

    result
}

async fn dispatch(repository: &Repository, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Init { .. } => repository.init().await,
        Commands::Add { paths } => repository.add(&paths).await,
        Commands::Commit { message } => repository.commit(&message).await,
        Commands::Status { porcelain } => repository.status(porcelain).await,
        Commands::Diff { cached } => repository.diff(cached).await,
        Commands::Branch {
            args,
            delete,
            force_delete,
            force,
            verbose,
        } => {
            if delete || force_delete {
                return repository.delete_branches(&args).await;
            }

            match args.as_slice() {
                [] => repository.list_branches(verbose).await,
                [name] => repository.create_branch(name, None, force).await,
                [name, start_point, ..] => repository.create_branch(name, Some(start_point.as_str()), force).await,
            }
        }
        Commands::Checkout { target } => repository.checkout(&target).await,
        Commands::Log {
            revision,
            oneline,
            format,
            abbrev_commit,
            decorate,
            no_decorate,
        } => {
            let options = LogOptions {
                revision,
                format: if oneline { CommitFormat::Oneline } else { format },
                abbrev_commit: abbrev_commit || oneline,
                decorate: match no_decorate {
                    true => Decoration::No,
                    false => decorate.unwrap_or_default(),
                },
            };
            repository.log(&options).await
        }
    }
}

/// Print `error` the way git would and return the exit code
fn report(error: &anyhow::Error) -> i32 {
    let Some(twig_error) = error.downcast_ref::<TwigError>() else {
        eprintln!("fatal: {error}");
        return 1;
    };

    match twig_error {
        TwigError::InvalidObject { .. } => {
            for hinted in twig_error.hinted_errors() {
                eprintln!("error: {}", hinted.message);
                for hint in &hinted.hints {
                    eprintln!("hint: {hint}");
                }
            }
            eprintln!("fatal: {twig_error}");
        }
        TwigError::MigrationConflict(_) => eprintln!("{twig_error}"),
        _ if error.chain().count() > 1 => {
            eprintln!("error: {}", error.root_cause());
            eprintln!("fatal: {error}");
        }
        _ => eprintln!("fatal: {twig_error}"),
    }

    twig_error.exit_code()
}
