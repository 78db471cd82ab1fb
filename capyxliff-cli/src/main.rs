use capyxliff_cli::{
    copy_tags::run_copy_tags_command, edit::run_edit_command, load_document, stats::print_stats,
    view::print_view,
};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Print debug logs (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the trans-units of a document.
    View {
        /// The input file to view
        #[arg(short, long)]
        input: String,

        /// Display full segments without truncation
        #[arg(long)]
        full: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Count units per target state.
    Stats {
        /// The input file to inspect
        #[arg(short, long)]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set the target text and/or state of one unit.
    Edit {
        /// The input file to edit
        #[arg(short, long)]
        input: String,

        /// Id of the trans-unit to edit
        #[arg(short, long)]
        unit: String,

        /// New target text, in inline markup
        #[arg(short, long)]
        target: Option<String>,

        /// New target state (e.g. translated, needs-review-translation)
        #[arg(short, long)]
        state: Option<String>,

        /// Output file (defaults to editing the input in place)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Copy missing source tags to the end of each target.
    CopyTags {
        /// The input file to process
        #[arg(short, long)]
        input: String,

        /// Only process this trans-unit
        #[arg(short, long)]
        unit: Option<String>,

        /// Output file (defaults to editing the input in place)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Load a document and save it back in canonical form.
    Normalize {
        /// The input file to read
        #[arg(short, long)]
        input: String,

        /// The output file to write
        #[arg(short, long)]
        output: String,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run(commands: Commands) -> Result<(), String> {
    match commands {
        Commands::View { input, full, json } => {
            let document = load_document(&input)?;
            print_view(&document, full, json)
        }
        Commands::Stats { input, json } => {
            let document = load_document(&input)?;
            print_stats(&document, json)
        }
        Commands::Edit {
            input,
            unit,
            target,
            state,
            output,
        } => run_edit_command(input, unit, target, state, output),
        Commands::CopyTags {
            input,
            unit,
            output,
        } => run_copy_tags_command(input, unit, output),
        Commands::Normalize { input, output } => {
            let document = load_document(&input)?;
            document
                .save(&output)
                .map_err(|e| format!("Error writing output: {}", e))?;
            println!("✅ Wrote {} unit(s) to {}", document.unit_count(), output);
            Ok(())
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args.commands) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
