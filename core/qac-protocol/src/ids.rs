use core::fmt;
use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
        #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
        #[archive(check_bytes)]
        #[repr(transparent)]
        pub struct $name(pub u16);

        impl $name {
            pub const fn new(number: u16) -> Self {
                Self(number)
            }
        }

        impl From<u16> for $name {
            fn from(number: u16) -> Self {
                Self(number)
            }
        }

        impl From<$name> for u16 {
            fn from(number: $name) -> u16 {
                number.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(ChapterNumber, "1-based chapter (surah) number.");
define_id!(VerseNumber, "1-based verse number within a chapter.");
define_id!(TokenNumber, "1-based word number within a verse.");

/// Address of one word in the corpus, written `chapter:verse:token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Location {
    pub chapter: ChapterNumber,
    pub verse: VerseNumber,
    pub token: TokenNumber,
}

impl Location {
    pub const fn new(chapter: u16, verse: u16, token: u16) -> Self {
        Self {
            chapter: ChapterNumber(chapter),
            verse: VerseNumber(verse),
            token: TokenNumber(token),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.chapter, self.verse, self.token)
    }
}
