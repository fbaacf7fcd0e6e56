use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Line that advances to the next illustration.
pub const PICTURE_BREAK: &str = "~";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterParagraph {
    pub text: String,
    pub picture: usize,
}

/// A chapter's paragraphs, each tagged with the illustration it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub paragraphs: Vec<ChapterParagraph>,
}

impl Chapter {
    pub fn parse(text: &str) -> Self {
        let mut paragraphs = Vec::new();
        let mut picture = 0;

        for line in text.lines() {
            if line == PICTURE_BREAK {
                picture += 1;
            } else if !line.is_empty() {
                paragraphs.push(ChapterParagraph {
                    text: line.to_string(),
                    picture,
                });
            }
        }

        Self { paragraphs }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read chapter file: {}", path.as_ref().display())
        })?;
        let chapter = Self::parse(&text);
        info!(
            path = %path.as_ref().display(),
            paragraphs = chapter.paragraphs.len(),
            "chapter loaded"
        );
        Ok(chapter)
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_paragraphs_with_picture_number() {
        let chapter = Chapter::parse("第一段。\n第二段。\n~\n\n第三段。\r\n~\n~\n第四段。");
        let tagged: Vec<(&str, usize)> = chapter
            .paragraphs
            .iter()
            .map(|p| (p.text.as_str(), p.picture))
            .collect();
        assert_eq!(
            tagged,
            vec![("第一段。", 0), ("第二段。", 0), ("第三段。", 1), ("第四段。", 3)]
        );
    }

    #[test]
    fn tilde_inside_text_is_not_a_break() {
        let chapter = Chapter::parse("~ 不是\n是~");
        assert_eq!(chapter.len(), 2);
        assert!(chapter.paragraphs.iter().all(|p| p.picture == 0));
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("6中文.txt");
        std::fs::write(&path, "你好。\n~\n再见。\n").unwrap();

        let chapter = Chapter::from_file(&path).unwrap();
        assert_eq!(chapter.paragraphs[1].picture, 1);
        assert!(Chapter::from_file(dir.path().join("missing.txt")).is_err());
    }
}
