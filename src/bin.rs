use anyhow::{anyhow, bail, Context};
use clap::Parser;
use crossword_csp::backtracking_search::{find_fill, FillFailure, FillOptions};
use crossword_csp::crossword::Crossword;
use crossword_csp::grid_config::{generate_grid_config, render_grid_with};
use crossword_csp::grid_image::save_grid;
use crossword_csp::word_list::WordList;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// crossword-csp: fill a crossword structure from a word list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the structure file, with `_` for open cells and `#` for blocks
    structure: PathBuf,

    /// Path to the word list, one word per line
    words: PathBuf,

    /// Also save the filled grid as an image at this path (e.g. `fill.png`)
    output: Option<PathBuf>,

    /// Give up after this many seconds [default: no limit]
    #[arg(long)]
    timeout: Option<f64>,

    /// Re-establish arc consistency after every tentative choice
    #[arg(long)]
    maintain_arc_consistency: bool,

    /// Skip words longer than this [default: the larger side of the grid]
    #[arg(long)]
    max_length: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let template = fs::read_to_string(&args.structure).with_context(|| {
        format!("Couldn't read structure file '{}'", args.structure.display())
    })?;
    let crossword = Crossword::from_template(&template)
        .with_context(|| format!("Invalid structure in '{}'", args.structure.display()))?;

    let max_length = args
        .max_length
        .unwrap_or_else(|| crossword.width.max(crossword.height));
    let word_list = WordList::from_file(&args.words, Some(max_length))
        .with_context(|| format!("Couldn't load word list '{}'", args.words.display()))?;

    let timeout = args
        .timeout
        .map(Duration::try_from_secs_f64)
        .transpose()
        .map_err(|error| anyhow!("Invalid timeout: {error}"))?;

    let grid_config = generate_grid_config(word_list, &crossword)?;
    let config = grid_config.to_config_ref();

    let options = FillOptions {
        timeout,
        maintain_arc_consistency: args.maintain_arc_consistency,
    };

    match find_fill(&config, &options) {
        Ok(success) => {
            log::debug!("{:?}", success.statistics);
            println!(
                "{}",
                render_grid_with(&config, &success.assignment, '█', ' ').to_uppercase()
            );
            if let Some(output) = &args.output {
                save_grid(&config, &success.assignment, output)
                    .with_context(|| format!("Couldn't save image to '{}'", output.display()))?;
            }
        }
        Err(FillFailure::HardFailure) => println!("No solution."),
        Err(FillFailure::Timeout) => bail!("Timed out before finding a fill"),
        Err(FillFailure::Abort) => bail!("Fill was aborted"),
    }

    Ok(())
}
