use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::io::{self, Read};
use std::path::Path;
use tracing_subscriber::EnvFilter;
use zho_reader::chapter::Chapter;
use zho_reader::{Lexicon, OutputFormat, PhraseDictionary, Reader, ReaderConfig, SearchHit};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let matches = Command::new("zho-reader")
        .version("0.1.0")
        .about("Chinese reader: word segmentation, phrase glosses and pinyin")
        .arg(
            Arg::new("text")
                .short('t')
                .long("text")
                .value_name("TEXT")
                .help("Chinese text to read")
                .conflicts_with_all(["file", "chapter"]),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("File containing Chinese text to read")
                .conflicts_with_all(["text", "chapter"]),
        )
        .arg(
            Arg::new("stdin")
                .long("stdin")
                .help("Read text from standard input")
                .action(clap::ArgAction::SetTrue)
                .conflicts_with_all(["text", "file", "chapter"]),
        )
        .arg(
            Arg::new("chapter")
                .short('c')
                .long("chapter")
                .value_name("FILE")
                .help("Chapter file: one paragraph per line, '~' starts the next picture"),
        )
        .arg(
            Arg::new("dict")
                .short('d')
                .long("dict")
                .value_name("PATH")
                .default_value("cedict_ts.u8")
                .help("CEDICT file, or a .json file written by dict-processor"),
        )
        .arg(
            Arg::new("phrases")
                .short('p')
                .long("phrases")
                .value_name("PATH")
                .help("JSON object of phrase -> gloss for the current chapter"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .default_value("inline")
                .help("Output format: inline, json, brackets, ruby, table"),
        )
        .arg(
            Arg::new("show-alternatives")
                .long("show-alternatives")
                .help("Show alternative pronunciations")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("show-definitions")
                .long("show-definitions")
                .help("Show English definitions inline")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("exact")
                .long("exact")
                .value_name("WORD")
                .help("Look up a word exactly"),
        )
        .arg(
            Arg::new("search")
                .long("search")
                .value_name("FRAGMENT")
                .help("List every word containing FRAGMENT"),
        )
        .arg(
            Arg::new("browse")
                .long("browse")
                .value_name("WORD")
                .help("Browse a word: its parts, characters and longer words containing it"),
        )
        .arg(
            Arg::new("examples")
                .long("examples")
                .help("Show usage examples")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("examples") {
        show_examples();
        return Ok(());
    }

    let config = parse_config(&matches);
    let dict_path = matches
        .get_one::<String>("dict")
        .context("missing --dict")?;

    let lexicon = load_lexicon(dict_path)?;
    println!(
        "✅ Dictionary: {} entries, {} words",
        lexicon.entry_count(),
        lexicon.len()
    );
    let mut reader = Reader::with_lexicon(lexicon, config);

    if let Some(path) = matches.get_one::<String>("phrases") {
        let phrases = PhraseDictionary::from_json_file(path)?;
        println!("✅ Phrases: {}", phrases.len());
        reader.set_phrases(phrases);
    }

    if let Some(word) = matches.get_one::<String>("exact") {
        print_hits(&reader.search_exact(word));
        return Ok(());
    }
    if let Some(fragment) = matches.get_one::<String>("search") {
        print_hits(&reader.search_substring(fragment));
        return Ok(());
    }
    if let Some(word) = matches.get_one::<String>("browse") {
        print_hits(&reader.browse(word));
        return Ok(());
    }

    if let Some(path) = matches.get_one::<String>("chapter") {
        let chapter = Chapter::from_file(path)?;
        for (index, paragraph) in chapter.paragraphs.iter().enumerate() {
            let tokens = reader.annotate(&paragraph.text);
            println!("\n[{} · picture {}]", index + 1, paragraph.picture);
            println!("{}", reader.format_output(&tokens));
        }
        return Ok(());
    }

    let input_text = get_input_text(&matches)?;
    if input_text.trim().is_empty() {
        eprintln!("❌ Error: No input text provided");
        eprintln!("Use --help for usage information");
        return Ok(());
    }

    let tokens = reader.annotate(&input_text);
    println!("\n📝 Annotated Result:");
    println!("{}", reader.format_output(&tokens));

    let chinese = tokens.iter().filter(|t| t.is_chinese).count();
    let known = tokens.iter().filter(|t| t.pinyin.is_some()).count();
    let in_phrases = tokens.iter().filter(|t| t.phrase.is_some()).count();

    println!("\n📊 Statistics:");
    println!("- Total tokens: {}", tokens.len());
    println!("- Chinese tokens: {}", chinese);
    println!("- Dictionary words: {}", known);
    println!("- Tokens starting inside a phrase: {}", in_phrases);

    Ok(())
}

fn load_lexicon(path: &str) -> Result<Lexicon> {
    let is_processed = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_processed {
        Lexicon::from_processed_file(path)
    } else {
        Lexicon::from_file(path)
    }
}

fn parse_config(matches: &ArgMatches) -> ReaderConfig {
    let format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("inline");
    let output_format = match format {
        "inline" => OutputFormat::Inline,
        "json" => OutputFormat::Json,
        "brackets" => OutputFormat::Brackets,
        "ruby" => OutputFormat::Ruby,
        "table" => OutputFormat::Table,
        _ => {
            eprintln!("❌ Invalid format. Using 'inline'");
            OutputFormat::Inline
        }
    };

    ReaderConfig {
        output_format,
        show_alternatives: matches.get_flag("show-alternatives"),
        show_definitions: matches.get_flag("show-definitions"),
    }
}

fn get_input_text(matches: &ArgMatches) -> Result<String> {
    if let Some(text) = matches.get_one::<String>("text") {
        Ok(text.clone())
    } else if let Some(file_path) = matches.get_one::<String>("file") {
        std::fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read input file: {}", file_path))
    } else {
        if !matches.get_flag("stdin") {
            println!("💬 Enter Chinese text to read (Ctrl+D to finish):");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}

fn print_hits(hits: &[SearchHit]) {
    if hits.is_empty() {
        println!("No matches");
        return;
    }
    for hit in hits {
        println!("{}", hit);
    }
}

fn show_examples() {
    println!("🇨🇳 Chinese Reader - Usage Examples");
    println!("==================================\n");

    println!("📝 Basic Usage:");
    println!("  zho-reader -t \"你好世界\"");
    println!("  # Output: 你好(nǐhǎo)世界(shìjiè)\n");

    println!("📚 Chapters and phrases:");
    println!("  zho-reader --chapter stories/悟空/1/6中文.txt --phrases stories/悟空/1/phrasesChinese.json\n");

    println!("🔍 Lookup:");
    println!("  zho-reader --exact 好");
    println!("  zho-reader --search 中国");
    println!("  zho-reader --browse 中国人\n");

    println!("🎯 Output Formats:");
    println!("  zho-reader -t \"我爱中国\" --format json");
    println!("  zho-reader -t \"我爱中国\" --format brackets");
    println!("  zho-reader -t \"我爱中国\" --format ruby");
    println!("  zho-reader -f input.txt --format table > output.tsv\n");

    println!("⚡ Faster startup:");
    println!("  dict-processor -i cedict_ts.u8 -o processed_dictionary.json");
    println!("  zho-reader -d processed_dictionary.json -t \"学习中文\"");
}
