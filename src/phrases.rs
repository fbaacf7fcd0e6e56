use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Longest phrase the overlay will try, in characters.
pub const MAX_PHRASE_LENGTH: usize = 20;

/// Phrase text -> annotation payload (typically an HTML gloss).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhraseDictionary {
    phrases: HashMap<String, String>,
}

impl PhraseDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a flat JSON object of phrase -> payload.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).with_context(|| {
            format!("Failed to open phrase file: {}", path.as_ref().display())
        })?;
        let phrases: PhraseDictionary = serde_json::from_reader(BufReader::new(file))
            .with_context(|| {
                format!(
                    "Failed to parse phrase JSON: {}",
                    path.as_ref().display()
                )
            })?;
        info!(path = %path.as_ref().display(), phrases = phrases.len(), "phrases loaded");
        Ok(phrases)
    }

    pub fn load<I, K, V>(&mut self, phrases: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.phrases
            .extend(phrases.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// Drop the previous unit's phrases and load a new set.
    pub fn replace<I, K, V>(&mut self, phrases: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.clear();
        self.load(phrases);
    }

    pub fn clear(&mut self) {
        self.phrases.clear();
    }

    pub fn has(&self, phrase: &str) -> bool {
        self.phrases.contains_key(phrase)
    }

    pub fn get(&self, phrase: &str) -> Option<&str> {
        self.phrases.get(phrase).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// Per-character phrase owner for one text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhraseOwnership {
    slots: Vec<Option<String>>,
}

/// One contiguous phrase occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseSpan<'a> {
    pub start: usize,
    pub length: usize,
    pub phrase: &'a str,
}

impl PhraseOwnership {
    /// Phrase owning the character at `offset`, if any.
    pub fn get(&self, offset: usize) -> Option<&str> {
        self.slots.get(offset).and_then(|slot| slot.as_deref())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn as_slice(&self) -> &[Option<String>] {
        &self.slots
    }

    /// Phrase occurrences, left to right.
    ///
    /// Adjacent occurrences of the same phrase are split by the phrase's
    /// own length.
    pub fn spans(&self) -> Vec<PhraseSpan<'_>> {
        let mut spans = Vec::new();
        let mut i = 0;
        while i < self.slots.len() {
            match self.slots[i].as_deref() {
                Some(phrase) => {
                    let length = phrase.chars().count();
                    spans.push(PhraseSpan {
                        start: i,
                        length,
                        phrase,
                    });
                    i += length.max(1);
                }
                None => i += 1,
            }
        }
        spans
    }
}

/// Longest-match phrase overlay, independent of word segmentation.
pub fn annotate(text: &str, phrases: &PhraseDictionary) -> PhraseOwnership {
    let chars: Vec<char> = text.chars().collect();
    let mut slots = vec![None; chars.len()];
    let mut i = 0;

    while i < chars.len() {
        let longest = MAX_PHRASE_LENGTH.min(chars.len() - i);
        let detected = (1..=longest).rev().find_map(|len| {
            let candidate: String = chars[i..i + len].iter().collect();
            phrases.has(&candidate).then_some((candidate, len))
        });

        match detected {
            Some((phrase, len)) => {
                for slot in &mut slots[i..i + len] {
                    *slot = Some(phrase.clone());
                }
                i += len;
            }
            None => i += 1,
        }
    }

    PhraseOwnership { slots }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn phrases(keys: &[&str]) -> PhraseDictionary {
        let mut dict = PhraseDictionary::new();
        dict.load(keys.iter().map(|k| (*k, format!("<b>{k}</b>"))));
        dict
    }

    #[test]
    fn assigns_longest_phrase_to_each_character() {
        let dict = phrases(&["一心", "一心一意", "意"]);
        let owners = annotate("他一心一意地", &dict);

        assert_eq!(owners.len(), 6);
        assert_eq!(owners.get(0), None);
        assert!((1..5).all(|i| owners.get(i) == Some("一心一意")));
        assert_eq!(owners.get(5), None);
        assert_eq!(owners.get(99), None);
    }

    #[test]
    fn spans_never_overlap_and_match_phrase_length() {
        let dict = phrases(&["好好", "好"]);
        let owners = annotate("好好好好好", &dict);
        let spans = owners.spans();

        assert_eq!(
            spans.iter().map(|s| (s.start, s.length)).collect::<Vec<_>>(),
            vec![(0, 2), (2, 2), (4, 1)]
        );
        for pair in spans.windows(2) {
            assert!(pair[0].start + pair[0].length <= pair[1].start);
        }
        for span in &spans {
            assert_eq!(span.length, span.phrase.chars().count());
        }
    }

    #[test]
    fn phrases_longer_than_twenty_are_ignored() {
        let long: String = "长".repeat(21);
        let dict = phrases(&[long.as_str()]);
        let owners = annotate(&long, &dict);
        assert!(owners.as_slice().iter().all(Option::is_none));

        let twenty: String = "长".repeat(20);
        let dict = phrases(&[twenty.as_str()]);
        let owners = annotate(&long, &dict);
        assert_eq!(owners.spans().len(), 1);
        assert_eq!(owners.get(20), None);
    }

    #[test]
    fn replace_discards_previous_unit() {
        let mut dict = phrases(&["孙悟空"]);
        dict.replace([("猪八戒", "pig")]);
        assert!(!dict.has("孙悟空"));
        assert_eq!(dict.get("猪八戒"), Some("pig"));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn empty_text_and_empty_dictionary() {
        assert!(annotate("", &phrases(&["你"])).is_empty());
        let owners = annotate("你好", &PhraseDictionary::new());
        assert_eq!(owners.as_slice(), &[None, None]);
    }

    #[test]
    fn loads_flat_json_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"一心一意": "<i>wholeheartedly</i>", "地": "adverb marker"}}"#).unwrap();

        let dict = PhraseDictionary::from_json_file(file.path()).unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("一心一意"), Some("<i>wholeheartedly</i>"));
    }

    #[test]
    fn rejects_non_object_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        assert!(PhraseDictionary::from_json_file(file.path()).is_err());
    }
}
