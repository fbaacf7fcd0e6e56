use anyhow::{Context, Result};
use clap::{Arg, Command};
use std::fs::File;
use std::io::BufWriter;
use tracing_subscriber::EnvFilter;
use zho_reader::Lexicon;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("dict-processor")
        .about("Convert a CEDICT file into a processed JSON lexicon")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("PATH")
                .default_value("cedict_ts.u8")
                .help("CEDICT source file"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PATH")
                .default_value("processed_dictionary.json")
                .help("Where to write the processed dictionary"),
        )
        .get_matches();

    let input = matches
        .get_one::<String>("input")
        .context("missing --input")?;
    let output = matches
        .get_one::<String>("output")
        .context("missing --output")?;

    println!("Dictionary Processor - Creating processed lexicon");
    println!("Loading {}...", input);

    let lexicon = Lexicon::from_file(input)?;
    println!("Loaded {} entries", lexicon.entry_count());

    let processed = lexicon.to_processed();

    println!("Writing {}...", output);
    let output_file =
        File::create(output).with_context(|| format!("Failed to create {}", output))?;
    let writer = BufWriter::new(output_file);
    serde_json::to_writer(writer, &processed).context("Failed to write processed dictionary")?;

    println!("\nProcessing Complete!");
    println!("Statistics:");
    println!("  Total entries: {}", processed.stats.total_entries);
    println!(
        "  Unique simplified words: {}",
        processed.stats.unique_simplified_words
    );
    println!(
        "  Unique traditional words: {}",
        processed.stats.unique_traditional_words
    );
    println!("  Maximum word length: {}", processed.stats.max_word_length);
    println!(
        "  Multi-character entries: {}",
        processed.stats.multi_char_entries
    );

    Ok(())
}
