#![no_std]

#[macro_use]
extern crate alloc;

// Enable std if the feature is active (for tests/tools)
#[cfg(feature = "std")]
extern crate std;

pub mod ids;
pub mod letters;
pub mod morphology;

pub use ids::{ChapterNumber, Location, TokenNumber, VerseNumber};
pub use letters::{Diacritics, Letter, LetterBuffer, LetterBufferBuilder, RangeError, Slot};
pub use morphology::*;

pub mod model;
pub use model::*;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};
    use rkyv::{from_bytes, to_bytes};

    #[test]
    fn test_enum_serialization() {
        let original = PartOfSpeech::Comitative;

        let bytes = to_bytes::<_, 256>(&original).expect("Failed to serialize PartOfSpeech");
        let deserialized: PartOfSpeech =
            from_bytes(&bytes).expect("Failed to deserialize PartOfSpeech");

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_location_serialization() {
        let original = Location::new(2, 255, 17);

        let bytes = to_bytes::<_, 256>(&original).expect("Failed to serialize Location");
        let deserialized: Location = from_bytes(&bytes).expect("Failed to deserialize Location");

        assert_eq!(original, deserialized);
        assert_eq!(deserialized.to_string(), "2:255:17");
    }

    #[test]
    fn test_corpus_serialization() {
        let original = CompiledCorpus {
            version: CompiledCorpus::VERSION,
            words: vec![WordRecord {
                location: Location::new(1, 1, 1),
                word: String::from("bisomi"),
                tags: String::from("bi+ POS:N LEM:{som ROOT:smw M GEN"),
                segments: vec![
                    SegmentRecord {
                        kind: SegmentKind::Prefix,
                        pos: PartOfSpeech::Preposition,
                        start: 0,
                        end: 1,
                        features: Features::default(),
                        lemma: Some(String::from("b")),
                    },
                    SegmentRecord {
                        kind: SegmentKind::Stem,
                        pos: PartOfSpeech::Noun,
                        start: 1,
                        end: 3,
                        features: Features {
                            gender: Some(Gender::Masculine),
                            case: Some(Case::Genitive),
                            root: Some(vec![
                                Slot::letter(Letter::Sin),
                                Slot::letter(Letter::Mim),
                                Slot::letter(Letter::Waw),
                            ]),
                            ..Features::default()
                        },
                        lemma: Some(String::from("{som")),
                    },
                ],
            }],
        };

        let bytes = to_bytes::<_, 1024>(&original).expect("Failed to serialize corpus");
        let deserialized: CompiledCorpus =
            from_bytes(&bytes).expect("Failed to deserialize corpus");

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_slot_serialization() {
        // Root >mn: the hamza carrier has to survive archiving.
        let original = vec![
            Slot::letter(Letter::Alif).with(Diacritics::HAMZA_ABOVE),
            Slot::letter(Letter::Mim),
            Slot::letter(Letter::Nun),
        ];

        let bytes = to_bytes::<_, 256>(&original).expect("Failed to serialize slots");
        let deserialized: alloc::vec::Vec<Slot> =
            from_bytes(&bytes).expect("Failed to deserialize slots");

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_segment_record_offsets() {
        let mut segment = Segment {
            kind: SegmentKind::Stem,
            ordinal: 1,
            span: Span::new(2, 5),
            pos: PartOfSpeech::Noun,
            features: Features::default(),
            lemma: None,
            letters: LetterBuffer::empty(),
        };
        let record = SegmentRecord::try_from(&segment).unwrap();
        assert_eq!((record.start, record.end), (2, 5));

        segment.span = Span::new(2, usize::from(u16::MAX) + 1);
        assert_eq!(
            SegmentRecord::try_from(&segment),
            Err(SpanOverflow { span: segment.span })
        );
    }

    #[test]
    fn test_id_layout() {
        assert_eq!(core::mem::size_of::<ChapterNumber>(), 2);
        assert_eq!(core::mem::size_of::<Location>(), 6);
    }
}
