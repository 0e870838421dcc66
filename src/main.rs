//! bookseg - Deterministic book structure classifier

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use bookseg::{BlockStore, Classification, ClassifierConfig, Error, classify, write_artifacts};

#[derive(Parser)]
#[command(name = "bookseg")]
#[command(version, about = "Split extracted book text into chapters", long_about = None)]
#[command(after_help = "EXAMPLES:
    bookseg blocks.jsonl out/           Write toc.json, chapters.json, front_matter.json, back_matter.json
    bookseg -i blocks.jsonl             Show the detected structure
    bookseg -c grammar.json blocks.jsonl out/
                                        Classify with a custom heading grammar")]
struct Cli {
    /// Input blocks, one {"index", "text"} JSON object per line
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Directory receiving the JSON artifacts
    #[arg(value_name = "OUTPUT_DIR", required_unless_present = "info")]
    output: Option<PathBuf>,

    /// Show the detected structure without writing artifacts
    #[arg(short, long)]
    info: bool,

    /// Classifier configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Blocks after the TOC heading searched for entries
    #[arg(long, value_name = "N")]
    toc_window: Option<usize>,

    /// Maximum edit distance of the fuzzy matching pass
    #[arg(long, value_name = "N")]
    fuzzy_distance: Option<usize>,

    /// Report failures as JSON on stderr
    #[arg(long)]
    json: bool,

    /// Suppress output messages
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log every matching decision
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match (&cli.output, cli.info) {
        (Some(output), false) => run(&cli, output),
        _ => show_info(&cli),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                match serde_json::to_string(&e.report()) {
                    Ok(json) => eprintln!("{json}"),
                    Err(_) => eprintln!("error: {e}"),
                }
            } else {
                eprintln!("error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<ClassifierConfig, Error> {
    let mut config = match &cli.config {
        Some(path) => ClassifierConfig::from_json_file(path)?,
        None => ClassifierConfig::default(),
    };
    if let Some(blocks) = cli.toc_window {
        config = config.with_toc_lookahead(blocks);
    }
    if let Some(distance) = cli.fuzzy_distance {
        config = config.with_fuzzy_distance(distance);
    }
    Ok(config)
}

fn classify_input(cli: &Cli) -> Result<Classification, Error> {
    let config = load_config(cli)?;
    let store = BlockStore::open(&cli.input)?;
    classify(&store, &config)
}

fn run(cli: &Cli, output: &Path) -> Result<(), Error> {
    let classification = classify_input(cli)?;
    let digests = write_artifacts(&classification, output)?;

    if !cli.quiet {
        println!(
            "{} chapters, {} warnings",
            classification.chapters.len(),
            classification.warnings.len()
        );
        for digest in digests {
            println!("{}  {}", digest.sha1, output.join(digest.file).display());
        }
    }
    Ok(())
}

fn show_info(cli: &Cli) -> Result<(), Error> {
    let classification = classify_input(cli)?;

    println!("File: {}", cli.input.display());
    match &classification.toc {
        Some(toc) => {
            println!(
                "TOC: blocks {}-{}, {} entries",
                toc.heading_block,
                toc.last_block,
                toc.entries.len()
            );
            for (i, entry) in toc.entries.iter().enumerate() {
                if let Some(m) = classification.match_for(i) {
                    println!(
                        "  {:<40} -> block {:>5} ({})",
                        entry.raw_text, m.heading_block_index, m.pass
                    );
                }
            }
        }
        None => println!("TOC: none"),
    }

    if let Some([start, end]) = classification.front_matter.span_blocks {
        println!("Front matter: blocks {start}-{end}");
    }
    println!("Chapters: {}", classification.chapters.len());
    for chapter in &classification.chapters {
        println!(
            "  {:>3}. {:<40} blocks {}-{}",
            chapter.chapter_number, chapter.title, chapter.start_block, chapter.end_block
        );
    }
    if let Some([start, end]) = classification.back_matter.span_blocks {
        println!("Back matter: blocks {start}-{end}");
    }

    if !classification.warnings.is_empty() {
        println!("Warnings: {}", classification.warnings.len());
        for warning in &classification.warnings {
            match warning.block_index {
                Some(index) => {
                    println!("  {} (block {index}): {}", warning.code.as_str(), warning.message)
                }
                None => println!("  {}: {}", warning.code.as_str(), warning.message),
            }
        }
    }

    Ok(())
}
