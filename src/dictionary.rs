use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// One CEDICT record: `TRAD SIMP [PINYIN] /def1/def2/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub traditional: String,
    pub simplified: String,
    pub pinyin_numeric: String,
    pub definitions: Vec<String>,
}

/// Why a dictionary line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("missing ' /' definition separator")]
    MissingSeparator,
    #[error("missing '[' before pinyin")]
    MissingPinyin,
    #[error("pinyin is not closed with ']'")]
    UnclosedPinyin,
    #[error("expected traditional and simplified forms")]
    MissingForms,
    #[error("no definitions between '/' delimiters")]
    NoDefinitions,
}

/// Parse a single dictionary line.
pub fn parse_entry(line: &str) -> Result<DictionaryEntry, RecordError> {
    let line = line.trim_end();
    let (head, tail) = line
        .split_once(" /")
        .ok_or(RecordError::MissingSeparator)?;
    let (pair, pinyin) = head.split_once('[').ok_or(RecordError::MissingPinyin)?;
    let pinyin = pinyin
        .trim()
        .strip_suffix(']')
        .ok_or(RecordError::UnclosedPinyin)?;

    let mut forms = pair.split_whitespace();
    let (traditional, simplified) = match (forms.next(), forms.next()) {
        (Some(tr), Some(sm)) => (tr, sm),
        _ => return Err(RecordError::MissingForms),
    };

    let definitions: Vec<String> = tail
        .split('/')
        .filter(|def| !def.trim().is_empty())
        .map(str::to_string)
        .collect();
    if definitions.is_empty() {
        return Err(RecordError::NoDefinitions);
    }

    Ok(DictionaryEntry {
        traditional: traditional.to_string(),
        simplified: simplified.to_string(),
        pinyin_numeric: pinyin.trim().to_string(),
        definitions,
    })
}

/// Parse a whole dictionary file, dropping blank and malformed lines.
pub fn parse_dictionary(text: &str) -> Vec<DictionaryEntry> {
    parse_lines(text).0
}

fn parse_lines(text: &str) -> (Vec<DictionaryEntry>, usize) {
    let mut entries = Vec::new();
    let mut skipped = 0;

    for (line_number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_entry(line) {
            Ok(entry) => entries.push(entry),
            Err(err) => {
                debug!(line = line_number + 1, %err, "skipping dictionary line");
                skipped += 1;
            }
        }
    }

    (entries, skipped)
}

/// Counts from one load pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub entries: usize,
    pub skipped: usize,
}

/// Simplified form -> entries, in dictionary file order.
///
/// Keys iterate in the order they were first inserted, so search results
/// come back in file order.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    index: HashMap<String, usize>,
    words: Vec<(String, Vec<DictionaryEntry>)>,
    entry_count: usize,
    max_word_length: usize,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and load a CEDICT text file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to open dictionary file: {}",
                path.as_ref().display()
            )
        })?;

        let mut lexicon = Self::new();
        let report = lexicon.load_text(&text);
        info!(
            path = %path.as_ref().display(),
            entries = report.entries,
            skipped = report.skipped,
            "dictionary loaded"
        );
        Ok(lexicon)
    }

    /// Load a JSON export written by `dict-processor`.
    pub fn from_processed_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).with_context(|| {
            format!(
                "Failed to open processed dictionary: {}",
                path.as_ref().display()
            )
        })?;
        let data: ProcessedData = serde_json::from_reader(BufReader::new(file))
            .context("Failed to parse processed dictionary JSON")?;

        let mut lexicon = Self::new();
        lexicon.load(data.words.into_iter().flat_map(|word| word.entries));
        Ok(lexicon)
    }

    /// Append entries under their simplified form. Existing entries are never replaced.
    pub fn load<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = DictionaryEntry>,
    {
        for entry in entries {
            let slot = match self.index.get(&entry.simplified) {
                Some(&slot) => slot,
                None => {
                    let slot = self.words.len();
                    self.index.insert(entry.simplified.clone(), slot);
                    self.words.push((entry.simplified.clone(), Vec::new()));
                    slot
                }
            };
            self.max_word_length = self.max_word_length.max(entry.simplified.chars().count());
            self.entry_count += 1;
            self.words[slot].1.push(entry);
        }
    }

    /// Parse dictionary text and load every well-formed line.
    pub fn load_text(&mut self, text: &str) -> LoadReport {
        let (entries, skipped) = parse_lines(text);
        let report = LoadReport {
            entries: entries.len(),
            skipped,
        };
        self.load(entries);
        report
    }

    pub fn has(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Entries for `word`; empty when absent.
    pub fn get(&self, word: &str) -> &[DictionaryEntry] {
        match self.index.get(word) {
            Some(&slot) => &self.words[slot].1,
            None => &[],
        }
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.words.clear();
        self.entry_count = 0;
        self.max_word_length = 0;
    }

    /// Number of distinct simplified forms.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn max_word_length(&self) -> usize {
        self.max_word_length
    }

    /// Keys with their entries, in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DictionaryEntry])> {
        self.words
            .iter()
            .map(|(word, entries)| (word.as_str(), entries.as_slice()))
    }

    pub fn to_processed(&self) -> ProcessedData {
        let mut unique_traditional = HashSet::new();
        let mut multi_char_entries = 0;

        for (_, entries) in self.iter() {
            for entry in entries {
                unique_traditional.insert(entry.traditional.as_str());
                if entry.simplified.chars().count() > 1 || entry.traditional.chars().count() > 1 {
                    multi_char_entries += 1;
                }
            }
        }

        let stats = ProcessingStats {
            total_entries: self.entry_count,
            unique_simplified_words: self.len(),
            unique_traditional_words: unique_traditional.len(),
            max_word_length: self.max_word_length,
            multi_char_entries,
        };

        ProcessedData {
            words: self
                .iter()
                .map(|(word, entries)| ProcessedWord {
                    simplified: word.to_string(),
                    entries: entries.to_vec(),
                })
                .collect(),
            stats,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessedWord {
    pub simplified: String,
    pub entries: Vec<DictionaryEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessedData {
    pub words: Vec<ProcessedWord>,
    pub stats: ProcessingStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub total_entries: usize,
    pub unique_simplified_words: usize,
    pub unique_traditional_words: usize,
    pub max_word_length: usize,
    pub multi_char_entries: usize,
}
