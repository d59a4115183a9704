pub mod atoms;
pub mod buckwalter;
pub mod corpus;
pub mod error;
pub mod lexicon;
pub mod pronoun;
pub mod segmenter;
pub mod writer;

pub use corpus::{
    load_corpus, parse_location, read_corpus, CorpusEntry, IndexedWord, LoadOptions, MorphologyIndex,
};
pub use error::{CorpusError, EncodingError, SegmentationError, WriteError};
pub use lexicon::{BuckwalterLexicon, Lexicon};
pub use segmenter::Segmenter;
pub use writer::write_tags;
