use qac_protocol::{Location, PartOfSpeech, RangeError, SpanOverflow};
use thiserror::Error;

/// Fatal outcome of segmenting one word. There is no partial result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentationError {
    /// Tag atom outside the annotation vocabulary, or in a position where
    /// it cannot occur.
    #[error("{location}: invalid morphological feature: {atom}")]
    Parse { location: Location, atom: String },

    /// The letters at a cursor contradict what an atom or pronoun paradigm
    /// requires.
    #[error(
        "failed to produce segments for token: {location} {word}, morphology: {tags}, feature: {feature}, cursor: {cursor}"
    )]
    Alignment {
        location: Location,
        word: String,
        tags: String,
        feature: String,
        cursor: usize,
    },

    /// Post-processing coverage or ordering check failed.
    #[error("{location}: segmentation invariant violated: {reason}")]
    InvariantViolation { location: Location, reason: String },
}

impl SegmentationError {
    pub fn location(&self) -> Location {
        match self {
            SegmentationError::Parse { location, .. }
            | SegmentationError::Alignment { location, .. }
            | SegmentationError::InvariantViolation { location, .. } => *location,
        }
    }

    /// Letter access outside the word inside the engine is an orchestration
    /// defect, never a data defect.
    pub fn out_of_range(location: Location, err: RangeError) -> Self {
        SegmentationError::InvariantViolation {
            location,
            reason: err.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("diacritic '{symbol}' at offset {offset} has no letter to attach to")]
    OrphanDiacritic { symbol: char, offset: usize },
}

/// A segment that has no spelling in the tag vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    #[error("segment {ordinal}: no prefix atom for {pos} with lemma {lemma:?}")]
    UnknownPrefix {
        ordinal: usize,
        pos: PartOfSpeech,
        lemma: Option<String>,
    },

    #[error("segment {ordinal}: no suffix atom for {pos}")]
    UnknownSuffix { ordinal: usize, pos: PartOfSpeech },
}

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("line {line}: {source}")]
    Encoding {
        line: usize,
        #[source]
        source: EncodingError,
    },

    #[error(transparent)]
    Segmentation(#[from] SegmentationError),

    #[error("{location}: duplicate word location")]
    DuplicateLocation { location: Location },

    #[error("{location}: {source}")]
    Write {
        location: Location,
        #[source]
        source: WriteError,
    },

    #[error("{location}: {source}")]
    Archive {
        location: Location,
        #[source]
        source: SpanOverflow,
    },

    #[error("{location}: round trip mismatch, expected '{expected}', wrote '{actual}'")]
    RoundTrip {
        location: Location,
        expected: String,
        actual: String,
    },
}
