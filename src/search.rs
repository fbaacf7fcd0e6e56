use crate::dictionary::{DictionaryEntry, Lexicon};
use crate::tone::render_tone;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A rendered search result: word, marked pinyin, definitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchHit {
    pub word: String,
    pub pinyin: String,
    pub definitions: Vec<String>,
}

impl SearchHit {
    fn from_entry(word: &str, entry: &DictionaryEntry) -> Self {
        Self {
            word: word.to_string(),
            pinyin: render_tone(&entry.pinyin_numeric),
            definitions: entry.definitions.clone(),
        }
    }
}

impl std::fmt::Display for SearchHit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.word, self.pinyin, self.definitions.join(","))
    }
}

/// Collects hits in first-encounter order, dropping structural duplicates.
#[derive(Default)]
struct HitCollector {
    hits: Vec<SearchHit>,
    seen: HashSet<SearchHit>,
}

impl HitCollector {
    fn extend(&mut self, word: &str, entries: &[DictionaryEntry]) {
        for entry in entries {
            let hit = SearchHit::from_entry(word, entry);
            if self.seen.insert(hit.clone()) {
                self.hits.push(hit);
            }
        }
    }
}

/// Every entry stored under exactly `word`.
pub fn search_exact(lexicon: &Lexicon, word: &str) -> Vec<SearchHit> {
    let mut collector = HitCollector::default();
    collector.extend(word, lexicon.get(word));
    collector.hits
}

/// Every entry whose key contains `fragment`, in dictionary order.
pub fn search_substring(lexicon: &Lexicon, fragment: &str) -> Vec<SearchHit> {
    let mut collector = HitCollector::default();
    for (word, entries) in lexicon.iter().filter(|(word, _)| word.contains(fragment)) {
        collector.extend(word, entries);
    }
    collector.hits
}

/// Marked pinyin of the first reading of `word`.
pub fn word_to_pinyin(lexicon: &Lexicon, word: &str) -> Option<String> {
    lexicon
        .get(word)
        .first()
        .map(|entry| render_tone(&entry.pinyin_numeric))
}

/// All definitions of `word` across its readings, duplicates removed.
pub fn word_to_english(lexicon: &Lexicon, word: &str) -> Option<Vec<String>> {
    let entries = lexicon.get(word);
    if entries.is_empty() {
        return None;
    }

    let mut definitions: Vec<String> = Vec::new();
    for def in entries.iter().flat_map(|entry| &entry.definitions) {
        if !definitions.contains(def) {
            definitions.push(def.clone());
        }
    }
    Some(definitions)
}

/// Character-browse listing for a selected word.
///
/// Exact hits come first, then the first reading of every three- and
/// two-character window, then every single character, then all
/// substring hits. Positions are kept, so a word may appear more than once.
pub fn browse(lexicon: &Lexicon, word: &str) -> Vec<SearchHit> {
    let chars: Vec<char> = word.chars().collect();
    let mut listing = search_exact(lexicon, word);

    for window in [3, 2, 1] {
        if chars.len() <= window {
            continue;
        }
        for combo in chars.windows(window) {
            let combo: String = combo.iter().collect();
            if let Some(hit) = search_exact(lexicon, &combo).into_iter().next() {
                listing.push(hit);
            }
        }
    }

    listing.extend(search_substring(lexicon, word));
    listing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> Lexicon {
        let mut lexicon = Lexicon::new();
        lexicon.load_text(
            "你 你 [ni3] /you/\n\
             你好 你好 [ni3 hao3] /hello/\n\
             好 好 [hao3] /good/fine/\n\
             好 好 [hao4] /to be fond of/fine/\n\
             好 好 [hao3] /good/fine/\n\
             中國 中国 [Zhong1 guo2] /China/\n\
             中國人 中国人 [Zhong1 guo2 ren2] /Chinese person/\n\
             人 人 [ren2] /person/\n",
        );
        lexicon
    }

    #[test]
    fn exact_search_ignores_longer_keys() {
        let hits = search_exact(&lexicon(), "你");
        assert_eq!(
            hits,
            vec![SearchHit {
                word: "你".into(),
                pinyin: "nǐ".into(),
                definitions: vec!["you".into()],
            }]
        );
        assert!(search_exact(&lexicon(), "他").is_empty());
    }

    #[test]
    fn substring_search_spans_keys_in_dictionary_order() {
        let hits = search_substring(&lexicon(), "你");
        let words: Vec<&str> = hits.iter().map(|h| h.word.as_str()).collect();
        assert_eq!(words, vec!["你", "你好"]);
        assert_eq!(hits[1].pinyin, "nǐhǎo");
    }

    #[test]
    fn duplicate_entries_collapse_to_one_hit() {
        let hits = search_exact(&lexicon(), "好");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].pinyin, "hǎo");
        assert_eq!(hits[1].pinyin, "hào");
    }

    #[test]
    fn duplicates_are_removed_per_key_across_a_large_lexicon() {
        let mut text = String::new();
        for i in 0..20_000u32 {
            let word: String = [
                char::from_u32(0x4E00 + i / 100).unwrap(),
                char::from_u32(0x4E00 + i % 100).unwrap(),
            ]
            .iter()
            .collect();
            text.push_str(&format!("{word} {word} [yi1] /one/\n"));
            text.push_str(&format!("{word} {word} [yi1] /one/\n"));
            text.push_str(&format!("{word} {word} [yi2] /one/\n"));
        }
        let mut lexicon = Lexicon::new();
        lexicon.load_text(&text);

        let hits = search_substring(&lexicon, "");
        assert_eq!(hits.len(), 40_000);
        assert_eq!(hits[0].word, "一一");
        assert_eq!((hits[0].pinyin.as_str(), hits[1].pinyin.as_str()), ("yī", "yí"));
        assert_eq!(hits[2].word, "一丁");
    }

    #[test]
    fn duplicates_collapse_within_each_key() {
        let mut lexicon = Lexicon::new();
        lexicon.load_text(
            "你 你 [ni3] /you/\n\
             妳 你 [ni3] /you/\n\
             你們 你们 [ni3 men5] /you (plural)/\n\
             你們 你们 [ni3 men5] /you (plural)/\n",
        );
        let hits = search_substring(&lexicon, "你");
        let words: Vec<&str> = hits.iter().map(|h| h.word.as_str()).collect();
        assert_eq!(words, vec!["你", "你们"]);
        assert_eq!(hits[1].pinyin, "nǐmen");
    }

    #[test]
    fn pinyin_uses_first_reading() {
        let lexicon = lexicon();
        assert_eq!(word_to_pinyin(&lexicon, "好").as_deref(), Some("hǎo"));
        assert_eq!(word_to_pinyin(&lexicon, "中国").as_deref(), Some("Zhōngguó"));
        assert_eq!(word_to_pinyin(&lexicon, "猫"), None);
    }

    #[test]
    fn english_is_union_of_all_readings() {
        let lexicon = lexicon();
        assert_eq!(
            word_to_english(&lexicon, "好"),
            Some(vec!["good".into(), "fine".into(), "to be fond of".into()])
        );
        assert_eq!(word_to_english(&lexicon, "猫"), None);
    }

    #[test]
    fn browse_lists_windows_then_characters_then_substrings() {
        let listing = browse(&lexicon(), "中国人");
        let words: Vec<&str> = listing.iter().map(|h| h.word.as_str()).collect();
        assert_eq!(words, vec!["中国人", "中国", "人", "中国人"]);
    }

    #[test]
    fn browse_single_character() {
        let listing = browse(&lexicon(), "你");
        let words: Vec<&str> = listing.iter().map(|h| h.word.as_str()).collect();
        assert_eq!(words, vec!["你", "你", "你好"]);
    }

    #[test]
    fn display_matches_browse_line() {
        let hit = &search_exact(&lexicon(), "好")[0];
        assert_eq!(hit.to_string(), "好 hǎo: good,fine");
    }
}
