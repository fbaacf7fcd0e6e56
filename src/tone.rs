//! Numeric-tone pinyin (`hao3`) to diacritic pinyin (`hǎo`).

/// Vowels in the order that decides which one carries the mark.
const VOWEL_PRIORITY: [char; 6] = ['a', 'e', 'o', 'i', 'u', 'v'];

fn toned_vowel(vowel: char, tone: char) -> Option<char> {
    let marks = match vowel {
        'a' => ['ā', 'á', 'ǎ', 'à'],
        'e' => ['ē', 'é', 'ě', 'è'],
        'i' => ['ī', 'í', 'ǐ', 'ì'],
        'o' => ['ō', 'ó', 'ǒ', 'ò'],
        'u' => ['ū', 'ú', 'ǔ', 'ù'],
        'v' => ['ǖ', 'ǘ', 'ǚ', 'ǜ'],
        _ => return None,
    };
    match tone {
        '1'..='4' => Some(marks[tone as usize - '1' as usize]),
        _ => None,
    }
}

/// Mark a single syllable such as `hao3`.
///
/// Tone 5 only drops the digit. A syllable without a trailing digit, or
/// with no markable vowel, comes back unchanged.
pub fn apply_tone_mark(syllable: &str) -> String {
    let Some(tone) = syllable.chars().last().filter(|c| ('1'..='5').contains(c)) else {
        return syllable.to_string();
    };
    let bare = &syllable[..syllable.len() - 1];

    if tone == '5' {
        return bare.to_string();
    }

    VOWEL_PRIORITY
        .iter()
        .find(|&&vowel| bare.contains(vowel))
        .and_then(|&vowel| {
            toned_vowel(vowel, tone).map(|marked| bare.replacen(vowel, &marked.to_string(), 1))
        })
        .unwrap_or_else(|| syllable.to_string())
}

/// Mark every space-separated syllable and join them with no separator,
/// so `ni3 hao3` renders as `nǐhǎo`.
pub fn render_tone(pinyin: &str) -> String {
    pinyin.split(' ').map(apply_tone_mark).collect()
}
