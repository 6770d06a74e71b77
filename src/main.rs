use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use crossword_csp::{
    find_fill, generate_grid_config_from_template_string, parse_word_list, render_fill,
    CrosswordError, CrosswordResult, SolverOptions,
};
use log::{error, info, LevelFilter};

/// Fill a crossword structure with words from a word list.
#[derive(Debug, Parser)]
#[command(author, version, about, arg_required_else_help = true)]
struct Args {
    /// The structure file: one line per row, `_` for open cells and `#` for blocked cells.
    structure: PathBuf,

    /// The word list: one word per line.
    words: PathBuf,

    /// Where to write the rendered fill, in addition to printing it.
    output: Option<PathBuf>,

    /// Re-establish arc consistency after every tentative assignment.
    #[arg(long)]
    inference: bool,

    /// Print statistics about the search.
    #[arg(long)]
    statistics: bool,

    /// Log progress while solving.
    #[arg(short, long)]
    verbose: bool,
}

fn read_file(path: &Path) -> CrosswordResult<String> {
    fs::read_to_string(path)
        .map_err(|err| CrosswordError::FileRead(err, path.display().to_string()))
}

fn configure_logging(verbose: bool) {
    let level_filter = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    env_logger::Builder::new()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .filter_level(level_filter)
        .target(env_logger::Target::Stderr)
        .init();
}

fn run(args: Args) -> CrosswordResult<()> {
    let structure = read_file(&args.structure)?;
    let word_list = parse_word_list(&read_file(&args.words)?);
    info!("Loaded {} words from {}", word_list.len(), args.words.display());

    let config = generate_grid_config_from_template_string(&word_list, &structure)?;

    let options = SolverOptions { inference: args.inference };
    let result = find_fill(&config, &options);

    if args.statistics {
        println!("{:?}", result.statistics);
    }

    let rendered = render_fill(&config, result.assignment.as_ref());
    println!("{}", rendered);

    if let Some(output) = &args.output {
        if result.assignment.is_some() {
            fs::write(output, rendered + "\n")
                .map_err(|err| CrosswordError::FileWrite(err, output.display().to_string()))?;
            info!("Written fill to {}", output.display());
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    configure_logging(args.verbose);

    if let Err(e) = run(args) {
        error!("Execution failed, error: {e}");
        std::process::exit(1);
    }
}
