pub mod chapter;
pub mod dictionary;
pub mod phrases;
pub mod reader;
pub mod search;
pub mod segmenter;
pub mod speech;
pub mod tone;

pub use dictionary::{DictionaryEntry, Lexicon, LoadReport, RecordError};
pub use phrases::{PhraseDictionary, PhraseOwnership};
pub use reader::{OutputFormat, Reader, ReaderConfig};
pub use search::SearchHit;
pub use segmenter::Token;
