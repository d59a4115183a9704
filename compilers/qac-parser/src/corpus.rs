//! Corpus file reader, loader and the read-only morphology index.
//!
//! A corpus file has one word per line:
//! `chapter:verse:token<TAB>buckwalter word<TAB>tag string`.
//! Blank lines and lines starting with `#` are skipped.

use std::collections::btree_map::{BTreeMap, Entry};
use std::io::BufRead;

use nom::{
    bytes::complete::tag,
    character::complete::u16 as decimal,
    combinator::{all_consuming, map},
    sequence::{terminated, tuple},
    IResult,
};
use qac_morph::CorpusStats;
use qac_protocol::{CompiledCorpus, LetterBuffer, Location, Segment, SegmentRecord, WordRecord};
use tracing::{error, info};

use crate::buckwalter;
use crate::error::{CorpusError, SegmentationError};
use crate::lexicon::Lexicon;
use crate::segmenter::Segmenter;
use crate::writer::write_tags;

/// One line of a corpus file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    /// 1-based line number in the source file.
    pub line: usize,
    pub location: Location,
    pub word: String,
    pub letters: LetterBuffer,
    pub tags: String,
}

fn location(input: &str) -> IResult<&str, Location> {
    map(
        tuple((terminated(decimal, tag(":")), terminated(decimal, tag(":")), decimal)),
        |(chapter, verse, token)| Location::new(chapter, verse, token),
    )(input)
}

/// Parses `chapter:verse:token`.
pub fn parse_location(text: &str) -> Option<Location> {
    all_consuming(location)(text).ok().map(|(_, location)| location)
}

pub fn read_corpus<R: BufRead>(reader: R) -> Result<Vec<CorpusEntry>, CorpusError> {
    let mut entries = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let text = line.trim_end_matches('\r');
        if text.trim().is_empty() || text.starts_with('#') {
            continue;
        }

        let malformed = |reason: &str| CorpusError::MalformedLine {
            line: number,
            reason: reason.to_owned(),
        };

        let mut fields = text.split('\t');
        let (Some(location), Some(word), Some(tags), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(malformed("expected three tab-separated fields"));
        };

        let location = parse_location(location.trim())
            .ok_or_else(|| malformed(&format!("invalid location '{location}'")))?;
        let word = word.trim();
        if word.is_empty() {
            return Err(malformed("empty word"));
        }
        let tags = tags.split_whitespace().collect::<Vec<_>>().join(" ");
        if tags.is_empty() {
            return Err(malformed("empty tag string"));
        }
        let letters = buckwalter::decode(word).map_err(|source| CorpusError::Encoding {
            line: number,
            source,
        })?;

        entries.push(CorpusEntry {
            line: number,
            location,
            word: word.to_owned(),
            letters,
            tags,
        });
    }

    Ok(entries)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Segment words on the rayon pool. Needs the `parallel` feature;
    /// without it the load runs sequentially.
    pub parallel: bool,
}

/// A word and its segments, as held by the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedWord {
    pub word: String,
    pub letters: LetterBuffer,
    pub tags: String,
    pub segments: Vec<Segment>,
}

/// Segments every entry and indexes the results by location. The first
/// failing word aborts the load.
pub fn load_corpus<L>(
    segmenter: &Segmenter<L>,
    entries: Vec<CorpusEntry>,
    options: LoadOptions,
) -> Result<MorphologyIndex, CorpusError>
where
    L: Lexicon + Sync,
{
    let segmented = segment_all(segmenter, &entries, options).map_err(|err| {
        error!("Corpus load aborted at {}: {}", err.location(), err);
        CorpusError::from(err)
    })?;

    let mut words = BTreeMap::new();
    for (entry, segments) in entries.into_iter().zip(segmented) {
        match words.entry(entry.location) {
            Entry::Occupied(_) => {
                error!("Corpus load aborted at {}: duplicate location", entry.location);
                return Err(CorpusError::DuplicateLocation {
                    location: entry.location,
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(IndexedWord {
                    word: entry.word,
                    letters: entry.letters,
                    tags: entry.tags,
                    segments,
                });
            }
        }
    }

    let index = MorphologyIndex { words };
    let stats = index.stats();
    info!(
        "Loaded {} words, {} segments ({} prefixes, {} stems, {} suffixes)",
        stats.words, stats.segments, stats.prefixes, stats.stems, stats.suffixes
    );
    Ok(index)
}

fn segment_all<L>(
    segmenter: &Segmenter<L>,
    entries: &[CorpusEntry],
    options: LoadOptions,
) -> Result<Vec<Vec<Segment>>, SegmentationError>
where
    L: Lexicon + Sync,
{
    let segment = |entry: &CorpusEntry| segmenter.segment(entry.location, &entry.letters, &entry.tags);

    #[cfg(feature = "parallel")]
    if options.parallel {
        use rayon::prelude::*;
        return entries.par_iter().map(segment).collect();
    }

    #[cfg(not(feature = "parallel"))]
    if options.parallel {
        tracing::warn!("Built without the parallel feature, segmenting sequentially");
    }

    entries.iter().map(segment).collect()
}

/// Read-only view of a loaded corpus. Safe to share between threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MorphologyIndex {
    words: BTreeMap<Location, IndexedWord>,
}

impl MorphologyIndex {
    pub fn segments_for(&self, location: Location) -> Option<&[Segment]> {
        self.words.get(&location).map(|word| word.segments.as_slice())
    }

    pub fn word(&self, location: Location) -> Option<&IndexedWord> {
        self.words.get(&location)
    }

    /// Words in location order.
    pub fn iter(&self) -> impl Iterator<Item = (Location, &IndexedWord)> + '_ {
        self.words.iter().map(|(location, word)| (*location, word))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn stats(&self) -> CorpusStats {
        let mut stats = CorpusStats::new();
        for word in self.words.values() {
            stats.record(&word.letters, &word.segments);
        }
        stats
    }

    /// Writes every word's segments back to a tag string and checks it
    /// against the tag string it was read from.
    pub fn verify_round_trip(&self) -> Result<(), CorpusError> {
        for (location, word) in self.iter() {
            let actual = write_tags(&word.segments)
                .map_err(|source| CorpusError::Write { location, source })?;
            if actual != word.tags {
                return Err(CorpusError::RoundTrip {
                    location,
                    expected: word.tags.clone(),
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Archive records for every word. Fails if a span does not fit the
    /// archive's offsets.
    pub fn to_compiled(&self) -> Result<CompiledCorpus, CorpusError> {
        let words = self
            .iter()
            .map(|(location, word)| {
                let segments = word
                    .segments
                    .iter()
                    .map(SegmentRecord::try_from)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|source| CorpusError::Archive { location, source })?;
                Ok(WordRecord {
                    location,
                    word: word.word.clone(),
                    tags: word.tags.clone(),
                    segments,
                })
            })
            .collect::<Result<Vec<_>, CorpusError>>()?;

        Ok(CompiledCorpus {
            version: CompiledCorpus::VERSION,
            words,
        })
    }
}
