use clap::{Parser as ClapParser, Subcommand};
use querydiff::cli::{self, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "querydiff")]
#[command(about = "querydiff - Explain which clauses of a MongoDB-style query a document fails")]
#[command(version)]
struct Cli {
    /// Log evaluation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a document against a query and print the failing clauses
    Check {
        /// The query, in notation (JSON plus regex literals, ISODate, ObjectId)
        query: String,

        /// The document (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Print plain JSON instead of notation
        #[arg(long)]
        json: bool,

        /// Only validate the query, don't evaluate
        #[arg(long)]
        syntax_only: bool,
    },

    /// List operators by the level where they are allowed
    Operators,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("QUERYDIFF_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            query,
            input,
            pretty,
            json,
            syntax_only,
        } => run_check(CheckOptions {
            query,
            input,
            pretty,
            json,
            syntax_only,
        }),
        Commands::Operators => {
            print!("{}", cli::operator_reference());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(mut options: CheckOptions) -> Result<(), CliError> {
    if options.input.is_none() && !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        options.input = Some(buffer);
    }

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Mismatch(mismatch) => println!("{}", cli::render(&mismatch, &options)?),
    }
    Ok(())
}
