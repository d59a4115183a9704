use core::fmt;
use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Declares a closed grammatical vocabulary whose variants map 1:1 to the
/// labels used by the morphology annotation.
macro_rules! tagged_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $tag:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
        #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
        #[archive(check_bytes)]
        #[repr(u8)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn tag(self) -> &'static str {
                match self {
                    $($name::$variant => $tag),+
                }
            }

            pub fn from_tag(tag: &str) -> Option<Self> {
                match tag {
                    $($tag => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.tag())
            }
        }
    };
}

tagged_enum! {
    SegmentKind {
        Prefix => "prefix",
        Stem => "stem",
        Suffix => "suffix",
    }
}

tagged_enum! {
    PartOfSpeech {
        Noun => "N",
        ProperNoun => "PN",
        Pronoun => "PRON",
        Demonstrative => "DEM",
        Relative => "REL",
        Adjective => "ADJ",
        Verb => "V",
        Preposition => "P",
        Interrogative => "INTG",
        Vocative => "VOC",
        Negative => "NEG",
        Emphatic => "EMPH",
        Purpose => "PRP",
        Imperative => "IMPV",
        Future => "FUT",
        Conjunction => "CONJ",
        Determiner => "DET",
        Initials => "INL",
        Time => "T",
        Location => "LOC",
        Accusative => "ACC",
        Conditional => "COND",
        SubordinatingConjunction => "SUB",
        Restriction => "RES",
        Exceptive => "EXP",
        Aversion => "AVR",
        Certainty => "CERT",
        Retraction => "RET",
        Preventive => "PREV",
        Answer => "ANS",
        Inceptive => "INC",
        Surprise => "SUR",
        Supplemental => "SUP",
        Exhortation => "EXH",
        ImperativeVerbalNoun => "IMPN",
        Explanation => "EXL",
        Equalization => "EQ",
        Resumption => "REM",
        Cause => "CAUS",
        Amendment => "AMD",
        Prohibition => "PRO",
        Circumstantial => "CIRC",
        Result => "RSLT",
        Interpretation => "INT",
        Comitative => "COM",
    }
}

tagged_enum! {
    Person {
        First => "1",
        Second => "2",
        Third => "3",
    }
}

tagged_enum! {
    Gender {
        Masculine => "M",
        Feminine => "F",
    }
}

tagged_enum! {
    Number {
        Singular => "S",
        Dual => "D",
        Plural => "P",
    }
}

tagged_enum! {
    Aspect {
        Perfect => "PERF",
        Imperfect => "IMPF",
        Imperative => "IMPV",
    }
}

tagged_enum! {
    Mood {
        Indicative => "IND",
        Subjunctive => "SUBJ",
        Jussive => "JUS",
    }
}

tagged_enum! {
    Voice {
        Active => "ACT",
        Passive => "PASS",
    }
}

tagged_enum! {
    /// Verb form, written as a parenthesized roman numeral in tag strings.
    Form {
        I => "I",
        II => "II",
        III => "III",
        IV => "IV",
        V => "V",
        VI => "VI",
        VII => "VII",
        VIII => "VIII",
        IX => "IX",
        X => "X",
        XI => "XI",
        XII => "XII",
    }
}

tagged_enum! {
    Derivation {
        ActiveParticiple => "ACT PCPL",
        PassiveParticiple => "PASS PCPL",
        VerbalNoun => "VN",
    }
}

tagged_enum! {
    State {
        Definite => "DEF",
        Indefinite => "INDEF",
    }
}

tagged_enum! {
    Case {
        Nominative => "NOM",
        Genitive => "GEN",
        Accusative => "ACC",
    }
}

tagged_enum! {
    PronounRole {
        Subject => "subj",
        Object => "obj",
        SecondObject => "obj2",
    }
}

tagged_enum! {
    /// Membership in one of the small verb/particle families (kāna and its
    /// sisters, kāda and its sisters, inna and its sisters).
    Special {
        Kaana => "kaAn",
        Kaada => "kaAd",
        Inna => "<in~",
    }
}

impl Form {
    /// Parses the parenthesized spelling used in tag strings, e.g. `(IV)`.
    pub fn from_atom(atom: &str) -> Option<Self> {
        atom.strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .and_then(Form::from_tag)
    }
}

/// Compact person/gender/number code such as `3MP` or `1S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Pgn {
    pub person: Option<Person>,
    pub gender: Option<Gender>,
    pub number: Option<Number>,
}

impl Pgn {
    pub const fn new(person: Option<Person>, gender: Option<Gender>, number: Option<Number>) -> Self {
        Self {
            person,
            gender,
            number,
        }
    }

    /// Parses a 1-3 character code built from `1 2 3`, `M F` and `S D P`.
    pub fn parse(code: &str) -> Option<Self> {
        if code.is_empty() || code.len() > 3 {
            return None;
        }
        let mut pgn = Pgn::default();
        for ch in code.chars() {
            match ch {
                '1' => pgn.person = Some(Person::First),
                '2' => pgn.person = Some(Person::Second),
                '3' => pgn.person = Some(Person::Third),
                'M' => pgn.gender = Some(Gender::Masculine),
                'F' => pgn.gender = Some(Gender::Feminine),
                'S' => pgn.number = Some(Number::Singular),
                'D' => pgn.number = Some(Number::Dual),
                'P' => pgn.number = Some(Number::Plural),
                _ => return None,
            }
        }
        Some(pgn)
    }

    pub fn is_empty(&self) -> bool {
        self.person.is_none() && self.gender.is_none() && self.number.is_none()
    }
}

impl fmt::Display for Pgn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(person) = self.person {
            f.write_str(person.tag())?;
        }
        if let Some(gender) = self.gender {
            f.write_str(gender.tag())?;
        }
        if let Some(number) = self.number {
            f.write_str(number.tag())?;
        }
        Ok(())
    }
}
