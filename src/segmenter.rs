use crate::dictionary::Lexicon;
use serde::{Deserialize, Serialize};

/// Longest word the segmenter will try, in characters.
pub const MAX_WORD_LENGTH: usize = 5;

/// A segmented word with its position in the source text.
///
/// `start` and `length` count Unicode scalar values, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub length: usize,
}

impl Token {
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Greedy longest-match segmentation.
///
/// At each position the longest substring of up to [`MAX_WORD_LENGTH`]
/// characters that is a lexicon key becomes the token; otherwise the single
/// character is taken as-is.
pub fn segment(text: &str, lexicon: &Lexicon) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let longest = MAX_WORD_LENGTH.min(chars.len() - i);
        let matched = (2..=longest).rev().find_map(|len| {
            let word: String = chars[i..i + len].iter().collect();
            lexicon.has(&word).then_some((word, len))
        });
        let (word, len) = matched.unwrap_or_else(|| (chars[i].to_string(), 1));

        tokens.push(Token {
            text: word,
            start: i,
            length: len,
        });
        i += len;
    }

    tokens
}
