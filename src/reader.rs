// Reader: owns the dictionaries and combines segmentation with the phrase overlay
use crate::dictionary::{Lexicon, LoadReport};
use crate::phrases::{self, PhraseDictionary, PhraseOwnership};
use crate::search::{self, SearchHit};
use crate::segmenter::{self, Token};
use crate::tone::render_tone;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Punctuation skipped when stepping through words.
const PUNCTUATION: &str = "。“”？！￥%@…，、：；—（）《》【】‘’·";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    pub output_format: OutputFormat,
    pub show_alternatives: bool,
    pub show_definitions: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Inline,   // 你好(nǐhǎo)
    Json,     // {"tokens": [{"text": "你好", "pinyin": "nǐhǎo", ...}]}
    Brackets, // 你好[nǐhǎo]
    Ruby,     // <ruby>你好<rt>nǐhǎo</rt></ruby>
    Table,    // Tabular format for analysis
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Inline,
            show_alternatives: false,
            show_definitions: false,
        }
    }
}

/// A token with everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedToken {
    pub text: String,
    pub start: usize,
    pub length: usize,
    pub pinyin: Option<String>,
    pub alternatives: Vec<String>,
    pub definitions: Vec<String>,
    pub is_chinese: bool,
    /// Phrase owning the token's first character.
    pub phrase: Option<String>,
}

/// One paragraph after both passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    pub tokens: Vec<Token>,
    pub phrases: PhraseOwnership,
}

impl Paragraph {
    /// Phrase under character `char_index` of token `token_index`.
    pub fn phrase_at(&self, token_index: usize, char_index: usize) -> Option<&str> {
        let token = self.tokens.get(token_index)?;
        if char_index >= token.length {
            return None;
        }
        self.phrases.get(token.start + char_index)
    }

    /// Next token index in the given direction, skipping punctuation.
    ///
    /// Returns `None` when there is nothing readable left that way, or when
    /// `from` is not a token index of this paragraph.
    pub fn step(&self, from: usize, forward: bool) -> Option<usize> {
        if from >= self.tokens.len() {
            return None;
        }
        let mut index = from;
        loop {
            index = if forward {
                index + 1
            } else {
                index.checked_sub(1)?
            };
            let token = self.tokens.get(index)?;
            if !is_punctuation(&token.text) {
                return Some(index);
            }
        }
    }
}

/// Owns the lexicon and the current phrase set.
#[derive(Debug, Default)]
pub struct Reader {
    lexicon: Lexicon,
    phrases: PhraseDictionary,
    config: ReaderConfig,
}

impl Reader {
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            lexicon: Lexicon::new(),
            phrases: PhraseDictionary::new(),
            config,
        }
    }

    pub fn with_lexicon(lexicon: Lexicon, config: ReaderConfig) -> Self {
        Self {
            lexicon,
            phrases: PhraseDictionary::new(),
            config,
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn phrases(&self) -> &PhraseDictionary {
        &self.phrases
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ReaderConfig) {
        self.config = config;
    }

    /// Add dictionary text to the lexicon; malformed lines are skipped.
    pub fn load_dictionary(&mut self, text: &str) -> LoadReport {
        let report = self.lexicon.load_text(text);
        info!(
            entries = report.entries,
            skipped = report.skipped,
            words = self.lexicon.len(),
            "dictionary text loaded"
        );
        report
    }

    pub fn clear_dictionary(&mut self) {
        self.lexicon.clear();
    }

    /// Replace the phrase set for a new chapter or song.
    pub fn load_phrases<I, K, V>(&mut self, mapping: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.phrases.replace(mapping);
        info!(phrases = self.phrases.len(), "phrases replaced");
    }

    pub fn set_phrases(&mut self, phrases: PhraseDictionary) {
        self.phrases = phrases;
    }

    pub fn segment(&self, text: &str) -> Vec<Token> {
        segmenter::segment(text, &self.lexicon)
    }

    pub fn annotate_phrases(&self, text: &str) -> PhraseOwnership {
        phrases::annotate(text, &self.phrases)
    }

    pub fn phrase_payload(&self, phrase: &str) -> Option<&str> {
        self.phrases.get(phrase)
    }

    pub fn pinyin_of(&self, word: &str) -> Option<String> {
        search::word_to_pinyin(&self.lexicon, word)
    }

    pub fn english_of(&self, word: &str) -> Option<Vec<String>> {
        search::word_to_english(&self.lexicon, word)
    }

    pub fn search_exact(&self, word: &str) -> Vec<SearchHit> {
        search::search_exact(&self.lexicon, word)
    }

    pub fn search_substring(&self, fragment: &str) -> Vec<SearchHit> {
        search::search_substring(&self.lexicon, fragment)
    }

    pub fn browse(&self, word: &str) -> Vec<SearchHit> {
        search::browse(&self.lexicon, word)
    }

    pub fn paragraph(&self, text: &str) -> Paragraph {
        Paragraph {
            text: text.to_string(),
            tokens: self.segment(text),
            phrases: self.annotate_phrases(text),
        }
    }

    pub fn annotate(&self, text: &str) -> Vec<AnnotatedToken> {
        let paragraph = self.paragraph(text);

        paragraph
            .tokens
            .iter()
            .map(|token| {
                let entries = self.lexicon.get(&token.text);
                let mut alternatives: Vec<String> = Vec::new();
                for entry in entries {
                    let rendered = render_tone(&entry.pinyin_numeric);
                    if !alternatives.contains(&rendered) {
                        alternatives.push(rendered);
                    }
                }

                AnnotatedToken {
                    text: token.text.clone(),
                    start: token.start,
                    length: token.length,
                    pinyin: alternatives.first().cloned(),
                    alternatives,
                    definitions: self.english_of(&token.text).unwrap_or_default(),
                    is_chinese: token.text.chars().any(is_chinese_char),
                    phrase: paragraph.phrases.get(token.start).map(str::to_string),
                }
            })
            .collect()
    }

    pub fn format_output(&self, tokens: &[AnnotatedToken]) -> String {
        match self.config.output_format {
            OutputFormat::Inline => self.format_inline(tokens),
            OutputFormat::Json => self.format_json(tokens),
            OutputFormat::Brackets => format_wrapped(tokens, "", "[", "]"),
            OutputFormat::Ruby => format_wrapped(tokens, "<ruby>", "<rt>", "</rt></ruby>"),
            OutputFormat::Table => format_table(tokens),
        }
    }

    fn format_inline(&self, tokens: &[AnnotatedToken]) -> String {
        let mut result = String::new();

        for token in tokens {
            result.push_str(&token.text);
            let Some(pinyin) = token.pinyin.as_ref() else {
                continue;
            };

            result.push('(');
            result.push_str(pinyin);

            if self.config.show_alternatives && token.alternatives.len() > 1 {
                result.push('|');
                result.push_str(&token.alternatives[1..].join("|"));
            }

            if self.config.show_definitions && !token.definitions.is_empty() {
                result.push_str(": ");
                result.push_str(&token.definitions.join("; "));
            }

            result.push(')');
        }

        result
    }

    fn format_json(&self, tokens: &[AnnotatedToken]) -> String {
        #[derive(Serialize)]
        struct JsonOutput<'a> {
            tokens: &'a [AnnotatedToken],
            metadata: JsonMetadata,
        }

        #[derive(Serialize)]
        struct JsonMetadata {
            total_tokens: usize,
            chinese_tokens: usize,
            known_tokens: usize,
            phrase_tokens: usize,
        }

        let output = JsonOutput {
            tokens,
            metadata: JsonMetadata {
                total_tokens: tokens.len(),
                chinese_tokens: tokens.iter().filter(|t| t.is_chinese).count(),
                known_tokens: tokens.iter().filter(|t| t.pinyin.is_some()).count(),
                phrase_tokens: tokens.iter().filter(|t| t.phrase.is_some()).count(),
            },
        };

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}

fn format_wrapped(tokens: &[AnnotatedToken], open: &str, mid: &str, close: &str) -> String {
    let mut result = String::new();

    for token in tokens {
        match &token.pinyin {
            Some(pinyin) => {
                result.push_str(open);
                result.push_str(&token.text);
                result.push_str(mid);
                result.push_str(pinyin);
                result.push_str(close);
            }
            None => result.push_str(&token.text),
        }
    }

    result
}

fn format_table(tokens: &[AnnotatedToken]) -> String {
    let mut result = String::new();
    result.push_str("Position\tText\tPinyin\tPhrase\tDefinitions\n");

    for token in tokens.iter().filter(|t| t.is_chinese) {
        result.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            token.start,
            token.text,
            token.pinyin.as_deref().unwrap_or("-"),
            token.phrase.as_deref().unwrap_or("-"),
            token.definitions.join("|")
        ));
    }

    result
}

pub fn is_chinese_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF |   // CJK Unified Ideographs
        0x3400..=0x4DBF |   // CJK Extension A
        0x20000..=0x2A6DF | // CJK Extension B
        0x2F00..=0x2FDF     // Kangxi Radicals
    )
}

/// True when `word` contains any reading punctuation, so a name such as
/// `马克·吐温` is skipped along with bare marks.
pub fn is_punctuation(word: &str) -> bool {
    word.chars().any(|c| PUNCTUATION.contains(c))
}
