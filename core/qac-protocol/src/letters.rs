use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};
use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use bitflags::bitflags;

/// Letter identity of one slot.
///
/// The 28 consonants and hamza come first, followed by the orthographic
/// letters (alif maqsura, ta marbuta, tatweel) and then the small Quranic
/// marks that the corpus encodes as pseudo-letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum Letter {
    Alif = 0,
    Ba,
    Ta,
    Tha,
    Jim,
    Hha,
    Kha,
    Dal,
    Dhal,
    Ra,
    Zay,
    Sin,
    Shin,
    Sad,
    Dad,
    Tta,
    Zza,
    Ain,
    Ghain,
    Fa,
    Qaf,
    Kaf,
    Lam,
    Mim,
    Nun,
    Ha,
    Waw,
    Ya,
    Hamza,
    AlifMaqsura,
    TaMarbuta,
    Tatweel,
    SmallHighSeen,
    SmallHighRoundedZero,
    SmallHighUprightRectangularZero,
    SmallHighMeemIsolatedForm,
    SmallLowSeen,
    SmallWaw,
    SmallYa,
    SmallHighNoon,
    EmptyCentreLowStop,
    EmptyCentreHighStop,
    RoundedHighStopWithFilledCentre,
    SmallLowMeem,
    Placeholder,
}

impl Letter {
    pub const ALL: [Letter; 45] = [
        Letter::Alif,
        Letter::Ba,
        Letter::Ta,
        Letter::Tha,
        Letter::Jim,
        Letter::Hha,
        Letter::Kha,
        Letter::Dal,
        Letter::Dhal,
        Letter::Ra,
        Letter::Zay,
        Letter::Sin,
        Letter::Shin,
        Letter::Sad,
        Letter::Dad,
        Letter::Tta,
        Letter::Zza,
        Letter::Ain,
        Letter::Ghain,
        Letter::Fa,
        Letter::Qaf,
        Letter::Kaf,
        Letter::Lam,
        Letter::Mim,
        Letter::Nun,
        Letter::Ha,
        Letter::Waw,
        Letter::Ya,
        Letter::Hamza,
        Letter::AlifMaqsura,
        Letter::TaMarbuta,
        Letter::Tatweel,
        Letter::SmallHighSeen,
        Letter::SmallHighRoundedZero,
        Letter::SmallHighUprightRectangularZero,
        Letter::SmallHighMeemIsolatedForm,
        Letter::SmallLowSeen,
        Letter::SmallWaw,
        Letter::SmallYa,
        Letter::SmallHighNoon,
        Letter::EmptyCentreLowStop,
        Letter::EmptyCentreHighStop,
        Letter::RoundedHighStopWithFilledCentre,
        Letter::SmallLowMeem,
        Letter::Placeholder,
    ];

    /// True for written letters (up to and including tatweel), false for
    /// the small marks and the placeholder.
    pub const fn is_written(self) -> bool {
        (self as u8) <= (Letter::Tatweel as u8)
    }
}

bitflags! {
    /// Diacritic marks carried by a slot. Marks are independent bits: a
    /// slot may carry shadda and fatha at the same time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct Diacritics: u16 {
        // Short vowels (Bits 0-2)
        const FATHA = 1;
        const DAMMA = 1 << 1;
        const KASRA = 1 << 2;

        // Nunation (Bits 3-5)
        const FATHATAN = 1 << 3;
        const DAMMATAN = 1 << 4;
        const KASRATAN = 1 << 5;

        const SHADDA = 1 << 6;
        const SUKUN = 1 << 7;
        const MADDAH = 1 << 8;

        // Hamza carriers (Bits 9-11)
        const HAMZA_ABOVE = 1 << 9;
        const HAMZA_BELOW = 1 << 10;
        const HAMZAT_WASL = 1 << 11;

        const DAGGER_ALIF = 1 << 12;
    }
}

// rkyv support for Diacritics
impl Archive for Diacritics {
    type Archived = u16;
    type Resolver = ();

    unsafe fn resolve(&self, _pos: usize, _resolver: Self::Resolver, out: *mut Self::Archived) {
        out.write(self.bits());
    }
}

impl<S: rkyv::Fallible + ?Sized> Serialize<S> for Diacritics {
    fn serialize(&self, _serializer: &mut S) -> Result<Self::Resolver, S::Error> {
        Ok(())
    }
}

impl<D: rkyv::Fallible + ?Sized> Deserialize<Diacritics, D> for u16 {
    fn deserialize(&self, _deserializer: &mut D) -> Result<Diacritics, D::Error> {
        Ok(Diacritics::from_bits_truncate(*self))
    }
}

/// One position of a letter buffer. `letter == None` marks a word boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Slot {
    pub letter: Option<Letter>,
    pub diacritics: Diacritics,
}

impl Slot {
    pub const BOUNDARY: Slot = Slot {
        letter: None,
        diacritics: Diacritics::empty(),
    };

    pub const fn letter(letter: Letter) -> Self {
        Self {
            letter: Some(letter),
            diacritics: Diacritics::empty(),
        }
    }

    pub const fn with(self, diacritics: Diacritics) -> Self {
        Self {
            letter: self.letter,
            diacritics: self.diacritics.union(diacritics),
        }
    }
}

/// Access outside `[0, length)` of a letter buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeError {
    pub index: usize,
    pub length: usize,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "letter index {} out of bounds for length {}",
            self.index, self.length
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RangeError {}

/// Immutable, fixed-length sequence of letter slots.
///
/// Slices share the backing storage of the buffer they were cut from, so
/// handing every segment its own view of the word costs one reference count.
#[derive(Clone)]
pub struct LetterBuffer {
    slots: Arc<[Slot]>,
    offset: usize,
    len: usize,
}

macro_rules! diacritic_predicates {
    ($($name:ident => $flag:ident),* $(,)?) => {
        $(
            pub fn $name(&self, index: usize) -> Result<bool, RangeError> {
                Ok(self.slot(index)?.diacritics.contains(Diacritics::$flag))
            }
        )*
    };
}

impl LetterBuffer {
    pub fn empty() -> Self {
        Self::from_slots(Vec::new())
    }

    pub fn from_slots(slots: Vec<Slot>) -> Self {
        let len = slots.len();
        Self {
            slots: Arc::from(slots),
            offset: 0,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slots(&self) -> &[Slot] {
        &self.slots[self.offset..self.offset + self.len]
    }

    pub fn slot(&self, index: usize) -> Result<&Slot, RangeError> {
        if index >= self.len {
            return Err(RangeError {
                index,
                length: self.len,
            });
        }
        Ok(&self.slots[self.offset + index])
    }

    /// Letter at `index`, or `None` for a word-boundary slot.
    pub fn letter_at(&self, index: usize) -> Result<Option<Letter>, RangeError> {
        Ok(self.slot(index)?.letter)
    }

    pub fn diacritics_at(&self, index: usize) -> Result<Diacritics, RangeError> {
        Ok(self.slot(index)?.diacritics)
    }

    diacritic_predicates! {
        is_fatha => FATHA,
        is_damma => DAMMA,
        is_kasra => KASRA,
        is_fathatan => FATHATAN,
        is_dammatan => DAMMATAN,
        is_kasratan => KASRATAN,
        is_shadda => SHADDA,
        is_sukun => SUKUN,
        is_maddah => MADDAH,
        is_hamza_above => HAMZA_ABOVE,
        is_hamza_below => HAMZA_BELOW,
        is_hamzat_wasl => HAMZAT_WASL,
        is_dagger_alif => DAGGER_ALIF,
    }

    pub fn diacritic_count(&self, index: usize) -> Result<u32, RangeError> {
        Ok(self.slot(index)?.diacritics.bits().count_ones())
    }

    /// True when the slot holds a written letter rather than a small mark.
    pub fn is_letter(&self, index: usize) -> Result<bool, RangeError> {
        Ok(self
            .slot(index)?
            .letter
            .map_or(false, |letter| letter.is_written()))
    }

    /// Read-only view of `[start, end)` sharing this buffer's storage.
    pub fn slice(&self, start: usize, end: usize) -> Result<LetterBuffer, RangeError> {
        if end > self.len {
            return Err(RangeError {
                index: end,
                length: self.len,
            });
        }
        if start > end {
            return Err(RangeError {
                index: start,
                length: self.len,
            });
        }
        Ok(Self {
            slots: Arc::clone(&self.slots),
            offset: self.offset + start,
            len: end - start,
        })
    }

    pub fn strip_diacritics(&self) -> LetterBuffer {
        Self::from_slots(
            self.as_slots()
                .iter()
                .map(|slot| Slot {
                    letter: slot.letter,
                    diacritics: Diacritics::empty(),
                })
                .collect(),
        )
    }

    pub fn letters(&self) -> impl Iterator<Item = Option<Letter>> + '_ {
        self.as_slots().iter().map(|slot| slot.letter)
    }
}

impl PartialEq for LetterBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_slots() == other.as_slots()
    }
}

impl Eq for LetterBuffer {}

impl Hash for LetterBuffer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slots().hash(state);
    }
}

impl fmt::Debug for LetterBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slots()).finish()
    }
}

impl Default for LetterBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

/// Growable staging area for a letter buffer. Consumed by `finish`, so the
/// finished buffer never aliases a builder that could still change.
#[derive(Debug, Default)]
pub struct LetterBufferBuilder {
    slots: Vec<Slot>,
}

impl LetterBufferBuilder {
    const INITIAL_CAPACITY: usize = 4;

    pub fn new() -> Self {
        Self::with_capacity(Self::INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn push_letter(&mut self, letter: Letter) {
        self.slots.push(Slot::letter(letter));
    }

    pub fn push_boundary(&mut self) {
        self.slots.push(Slot::BOUNDARY);
    }

    /// Last pushed letter, skipping nothing: a trailing boundary yields `None`.
    pub fn last_letter(&self) -> Option<Letter> {
        self.slots.last().and_then(|slot| slot.letter)
    }

    pub fn set_diacritic(&mut self, index: usize, diacritics: Diacritics) -> Result<(), RangeError> {
        let length = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(RangeError { index, length })?;
        slot.diacritics |= diacritics;
        Ok(())
    }

    /// Marks the most recently pushed slot.
    pub fn add_diacritic(&mut self, diacritics: Diacritics) -> Result<(), RangeError> {
        match self.slots.len().checked_sub(1) {
            Some(last) => self.set_diacritic(last, diacritics),
            None => Err(RangeError {
                index: 0,
                length: 0,
            }),
        }
    }

    pub fn finish(self) -> LetterBuffer {
        LetterBuffer::from_slots(self.slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn word(letters: &[Letter]) -> LetterBuffer {
        let mut builder = LetterBufferBuilder::new();
        for letter in letters {
            builder.push_letter(*letter);
        }
        builder.finish()
    }

    #[test]
    fn test_out_of_bounds_is_an_error() {
        let buffer = word(&[Letter::Kaf, Letter::Ta, Letter::Ba]);
        assert_eq!(buffer.letter_at(2), Ok(Some(Letter::Ba)));
        assert_eq!(
            buffer.letter_at(3),
            Err(RangeError {
                index: 3,
                length: 3
            })
        );
        assert!(buffer.is_fatha(7).is_err());
    }

    #[test]
    fn test_slice_shares_storage() {
        let buffer = word(&[Letter::Waw, Letter::Qaf, Letter::Lam]);
        let tail = buffer.slice(1, 3).unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail.letter_at(0), Ok(Some(Letter::Qaf)));
        assert!(Arc::ptr_eq(&tail.slots, &buffer.slots));

        // Slicing a slice stays relative to the view.
        let last = tail.slice(1, 2).unwrap();
        assert_eq!(last.letter_at(0), Ok(Some(Letter::Lam)));
        assert!(tail.letter_at(2).is_err());
    }

    #[test]
    fn test_empty_slice_at_end_is_allowed() {
        let buffer = word(&[Letter::Ra, Letter::Ba]);
        let empty = buffer.slice(2, 2).unwrap();
        assert!(empty.is_empty());
        assert!(buffer.slice(2, 3).is_err());
        assert!(buffer.slice(2, 1).is_err());
    }

    #[test]
    fn test_diacritics_are_independent_bits() {
        let mut builder = LetterBufferBuilder::new();
        builder.push_letter(Letter::Nun);
        builder.add_diacritic(Diacritics::SHADDA).unwrap();
        builder.add_diacritic(Diacritics::FATHA).unwrap();
        let buffer = builder.finish();

        assert_eq!(buffer.is_shadda(0), Ok(true));
        assert_eq!(buffer.is_fatha(0), Ok(true));
        assert_eq!(buffer.is_kasra(0), Ok(false));
        assert_eq!(buffer.diacritic_count(0), Ok(2));
    }

    #[test]
    fn test_orphan_diacritic_is_rejected() {
        let mut builder = LetterBufferBuilder::new();
        assert!(builder.add_diacritic(Diacritics::SUKUN).is_err());
    }

    #[test]
    fn test_small_marks_are_not_letters() {
        let buffer = word(&[Letter::Tatweel, Letter::SmallHighSeen]);
        assert_eq!(buffer.is_letter(0), Ok(true));
        assert_eq!(buffer.is_letter(1), Ok(false));
    }

    proptest! {
        #[test]
        fn test_strip_keeps_letters(
            picks in proptest::collection::vec((0usize..45, 0u16..(1 << 13)), 0..24)
        ) {
            let slots: Vec<Slot> = picks
                .iter()
                .map(|(letter, bits)| Slot::letter(Letter::ALL[*letter]).with(Diacritics::from_bits_truncate(*bits)))
                .collect();
            let buffer = LetterBuffer::from_slots(slots);
            let stripped = buffer.strip_diacritics();

            prop_assert_eq!(stripped.len(), buffer.len());
            for i in 0..buffer.len() {
                prop_assert_eq!(stripped.letter_at(i), buffer.letter_at(i));
                prop_assert_eq!(stripped.diacritic_count(i), Ok(0));
            }
        }

        #[test]
        fn test_slice_matches_parent(len in 0usize..20, a in 0usize..20, b in 0usize..20) {
            let slots: Vec<Slot> = (0..len).map(|i| Slot::letter(Letter::ALL[i % 28])).collect();
            let buffer = LetterBuffer::from_slots(slots);
            let (start, end) = (a.min(b), a.max(b));
            match buffer.slice(start, end) {
                Ok(view) => {
                    prop_assert!(end <= len);
                    for i in 0..view.len() {
                        prop_assert_eq!(view.letter_at(i), buffer.letter_at(start + i));
                    }
                }
                Err(_) => prop_assert!(end > len),
            }
        }
    }
}
