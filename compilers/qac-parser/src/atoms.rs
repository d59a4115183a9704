//! Tag atom lexer.
//!
//! A tag string is a space-delimited list of atoms. Each atom is classified
//! without looking at the word's letters; boundary arithmetic happens in the
//! segmenter.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    combinator::{all_consuming, map, map_opt, value},
    sequence::preceded,
    IResult,
};
use std::fmt;

use qac_protocol::{
    Aspect, Case, Derivation, Features, Form, Letter, Location, Mood, PartOfSpeech, Pgn,
    PronounRole, SegmentKind, Special, State, Voice,
};

/// How a prefix atom is checked against the letters at the prefix cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixShape {
    /// One letter, any of the listed ones.
    Letter(&'static [Letter]),
    /// Letter followed by alif, or the letter alone at the listed locations.
    Vocative {
        letter: Letter,
        short_at: &'static [Location],
    },
    /// The definite article.
    Determiner,
    /// `l:P+`, a prefix before the stem and a suffix after it.
    PrepositionLam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixRule {
    pub atom: &'static str,
    pub pos: PartOfSpeech,
    pub shape: PrefixShape,
    pub lemma: Option<&'static str>,
}

const HAMZA_OR_ALIF: &[Letter] = &[Letter::Hamza, Letter::Alif];
const FA: &[Letter] = &[Letter::Fa];
const WAW: &[Letter] = &[Letter::Waw];
const LAM: &[Letter] = &[Letter::Lam];

// yabona&um~a
const YA_SHORT: &[Location] = &[Location::new(20, 94, 2)];
// halum~a
const HA_SHORT: &[Location] = &[Location::new(6, 150, 2), Location::new(33, 18, 8)];

const fn rule(
    atom: &'static str,
    pos: PartOfSpeech,
    shape: PrefixShape,
    lemma: Option<&'static str>,
) -> PrefixRule {
    PrefixRule {
        atom,
        pos,
        shape,
        lemma,
    }
}

pub static PREFIXES: &[PrefixRule] = &[
    rule("A:INTG+", PartOfSpeech::Interrogative, PrefixShape::Letter(HAMZA_OR_ALIF), None),
    rule("A:EQ+", PartOfSpeech::Equalization, PrefixShape::Letter(HAMZA_OR_ALIF), None),
    rule("f:CONJ+", PartOfSpeech::Conjunction, PrefixShape::Letter(FA), Some("f")),
    rule("f:REM+", PartOfSpeech::Resumption, PrefixShape::Letter(FA), Some("f")),
    rule("f:RSLT+", PartOfSpeech::Result, PrefixShape::Letter(FA), Some("f")),
    rule("f:CAUS+", PartOfSpeech::Cause, PrefixShape::Letter(FA), Some("f")),
    rule("f:SUP+", PartOfSpeech::Supplemental, PrefixShape::Letter(FA), Some("f")),
    rule("w:SUP+", PartOfSpeech::Supplemental, PrefixShape::Letter(WAW), Some("w")),
    rule("w:CONJ+", PartOfSpeech::Conjunction, PrefixShape::Letter(WAW), Some("w")),
    rule("w:COM+", PartOfSpeech::Comitative, PrefixShape::Letter(WAW), Some("w")),
    rule("w:REM+", PartOfSpeech::Resumption, PrefixShape::Letter(WAW), Some("w")),
    rule("w:CIRC+", PartOfSpeech::Circumstantial, PrefixShape::Letter(WAW), Some("w")),
    rule("w:P+", PartOfSpeech::Preposition, PrefixShape::Letter(WAW), Some("w")),
    rule("ka+", PartOfSpeech::Preposition, PrefixShape::Letter(&[Letter::Kaf]), Some("k")),
    rule("l:EMPH+", PartOfSpeech::Emphatic, PrefixShape::Letter(LAM), None),
    rule("bi+", PartOfSpeech::Preposition, PrefixShape::Letter(&[Letter::Ba]), Some("b")),
    rule("ta+", PartOfSpeech::Preposition, PrefixShape::Letter(&[Letter::Ta]), Some("t")),
    rule("l:P+", PartOfSpeech::Preposition, PrefixShape::PrepositionLam, Some("l")),
    rule("l:IMPV+", PartOfSpeech::Imperative, PrefixShape::Letter(LAM), None),
    rule("l:PRP+", PartOfSpeech::Purpose, PrefixShape::Letter(LAM), None),
    rule("sa+", PartOfSpeech::Future, PrefixShape::Letter(&[Letter::Sin]), Some("s")),
    rule(
        "ya+",
        PartOfSpeech::Vocative,
        PrefixShape::Vocative {
            letter: Letter::Ya,
            short_at: YA_SHORT,
        },
        Some("yaA"),
    ),
    rule(
        "ha+",
        PartOfSpeech::Vocative,
        PrefixShape::Vocative {
            letter: Letter::Ha,
            short_at: HA_SHORT,
        },
        Some("haA"),
    ),
    rule("Al+", PartOfSpeech::Determiner, PrefixShape::Determiner, None),
];

pub fn prefix_rule(atom: &str) -> Option<&'static PrefixRule> {
    PREFIXES.iter().find(|rule| rule.atom == atom)
}

/// Reverse lookup used when writing a segment back to its atom.
pub fn prefix_rule_for(pos: PartOfSpeech, lemma: Option<&str>) -> Option<&'static PrefixRule> {
    PREFIXES
        .iter()
        .find(|rule| rule.pos == pos && rule.lemma == lemma)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagAtom<'a> {
    Prefix(&'static PrefixRule),
    Stem(PartOfSpeech),
    Root(&'a str),
    Lemma(&'a str),
    Special(Special),
    Mood(Mood),
    Form(Form),
    Voice(Voice),
    Derivation(Derivation),
    Aspect(Aspect),
    Case(Case),
    State(State),
    Pgn(Pgn),
    Vocative,
    EmphaticNun,
    Pronoun(Pgn),
    /// `PRON:x PRON:y`: first object, then second object.
    PronounPair(Pgn, Pgn),
}

/// Canonical spelling, as written in tag strings.
impl fmt::Display for TagAtom<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagAtom::Prefix(rule) => f.write_str(rule.atom),
            TagAtom::Stem(pos) => write!(f, "POS:{pos}"),
            TagAtom::Root(root) => write!(f, "ROOT:{root}"),
            TagAtom::Lemma(key) => write!(f, "LEM:{key}"),
            TagAtom::Special(special) => write!(f, "SP:{special}"),
            TagAtom::Mood(mood) => write!(f, "MOOD:{mood}"),
            TagAtom::Form(form) => write!(f, "({form})"),
            TagAtom::Voice(voice) => write!(f, "{voice}"),
            TagAtom::Derivation(derivation) => write!(f, "{derivation}"),
            TagAtom::Aspect(aspect) => write!(f, "{aspect}"),
            TagAtom::Case(case) => write!(f, "{case}"),
            TagAtom::State(state) => write!(f, "{state}"),
            TagAtom::Pgn(pgn) => write!(f, "{pgn}"),
            TagAtom::Vocative => f.write_str("+VOC"),
            TagAtom::EmphaticNun => f.write_str("+n:EMPH"),
            TagAtom::Pronoun(pgn) => write!(f, "PRON:{pgn}"),
            TagAtom::PronounPair(first, second) => write!(f, "PRON:{first} PRON:{second}"),
        }
    }
}

/// An atom outside the annotation vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownAtom<'a>(pub &'a str);

fn is_atom_char(c: char) -> bool {
    !c.is_whitespace()
}

fn keyed<'a>(key: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(tag(key), take_while1(is_atom_char))
}

fn keyword<'a>(word: &'a str) -> Option<TagAtom<'a>> {
    let atom = match word {
        "ACT" => TagAtom::Voice(Voice::Active),
        "PASS" => TagAtom::Voice(Voice::Passive),
        "VN" => TagAtom::Derivation(Derivation::VerbalNoun),
        _ => {
            return Aspect::from_tag(word)
                .map(TagAtom::Aspect)
                .or_else(|| Case::from_tag(word).map(TagAtom::Case))
                .or_else(|| State::from_tag(word).map(TagAtom::State))
                .or_else(|| Form::from_atom(word).map(TagAtom::Form))
                .or_else(|| prefix_rule(word).map(TagAtom::Prefix))
                .or_else(|| Pgn::parse(word).map(TagAtom::Pgn));
        }
    };
    Some(atom)
}

fn atom(input: &str) -> IResult<&str, TagAtom<'_>> {
    alt((
        value(TagAtom::Vocative, tag("+VOC")),
        value(TagAtom::EmphaticNun, tag("+n:EMPH")),
        map_opt(keyed("POS:"), |t| PartOfSpeech::from_tag(t).map(TagAtom::Stem)),
        map(keyed("ROOT:"), TagAtom::Root),
        map(keyed("LEM:"), TagAtom::Lemma),
        map_opt(keyed("SP:"), |t| Special::from_tag(t).map(TagAtom::Special)),
        map_opt(keyed("MOOD:"), |t| Mood::from_tag(t).map(TagAtom::Mood)),
        map_opt(keyed("PRON:"), |t| Pgn::parse(t).map(TagAtom::Pronoun)),
        map_opt(take_while1(is_atom_char), keyword),
    ))(input)
}

/// Parses a single whitespace-free atom.
pub fn parse_atom(text: &str) -> Result<TagAtom<'_>, UnknownAtom<'_>> {
    all_consuming(atom)(text)
        .map(|(_, atom)| atom)
        .map_err(|_| UnknownAtom(text))
}

/// Splits a tag string into atoms, folding the two-token composites:
/// `ACT PCPL`, `PASS PCPL` and a pair of consecutive pronouns.
pub fn parse_atoms(tags: &str) -> Result<Vec<TagAtom<'_>>, UnknownAtom<'_>> {
    let mut atoms = Vec::new();
    let mut tokens = tags.split_whitespace().peekable();

    while let Some(token) = tokens.next() {
        let participle = match token {
            "ACT" => Some(Derivation::ActiveParticiple),
            "PASS" => Some(Derivation::PassiveParticiple),
            _ => None,
        };
        if let Some(derivation) = participle {
            if tokens.peek() == Some(&"PCPL") {
                tokens.next();
                atoms.push(TagAtom::Derivation(derivation));
                continue;
            }
        }

        match parse_atom(token)? {
            TagAtom::Pronoun(second) => match atoms.last() {
                Some(TagAtom::Pronoun(first)) => {
                    let first = *first;
                    atoms.pop();
                    atoms.push(TagAtom::PronounPair(first, second));
                }
                Some(TagAtom::PronounPair(..)) => return Err(UnknownAtom(token)),
                _ => atoms.push(TagAtom::Pronoun(second)),
            },
            atom => atoms.push(atom),
        }
    }

    Ok(atoms)
}

/// What one atom says about a segment, before it has a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skeleton {
    pub kind: SegmentKind,
    pub pos: PartOfSpeech,
    /// Closed-class lemma key. Stem lemmas come from `LEM:` atoms.
    pub lemma: Option<&'static str>,
    pub features: Features,
}

impl Skeleton {
    fn new(kind: SegmentKind, pos: PartOfSpeech, lemma: Option<&'static str>) -> Self {
        Self {
            kind,
            pos,
            lemma,
            features: Features::default(),
        }
    }

    fn pronoun(pgn: Pgn, role: PronounRole) -> Self {
        let mut skeleton = Self::new(SegmentKind::Suffix, PartOfSpeech::Pronoun, None);
        skeleton.features.set_pgn(pgn);
        skeleton.features.pronoun_role = Some(role);
        skeleton
    }
}

/// Segments opened by one atom, in tag order. Feature atoms open none and a
/// pronoun pair opens two.
///
/// `has_stem` disambiguates `l:P+`, which is a suffix once a stem exists.
pub fn skeletons(atom: &TagAtom<'_>, has_stem: bool) -> Vec<Skeleton> {
    match atom {
        TagAtom::Prefix(rule) => {
            let kind = if has_stem && rule.shape == PrefixShape::PrepositionLam {
                SegmentKind::Suffix
            } else {
                SegmentKind::Prefix
            };
            vec![Skeleton::new(kind, rule.pos, rule.lemma)]
        }
        TagAtom::Stem(pos) => vec![Skeleton::new(SegmentKind::Stem, *pos, None)],
        TagAtom::Vocative => vec![Skeleton::new(
            SegmentKind::Suffix,
            PartOfSpeech::Vocative,
            Some("hum~a"),
        )],
        TagAtom::EmphaticNun => vec![Skeleton::new(
            SegmentKind::Suffix,
            PartOfSpeech::Emphatic,
            Some("n"),
        )],
        TagAtom::Pronoun(pgn) => vec![Skeleton::pronoun(*pgn, PronounRole::Object)],
        TagAtom::PronounPair(first, second) => vec![
            Skeleton::pronoun(*first, PronounRole::Object),
            Skeleton::pronoun(*second, PronounRole::SecondObject),
        ],
        _ => Vec::new(),
    }
}

/// Applies a grammatical feature atom. `false` if the atom is not one;
/// roots and lemmas are resolved by the caller.
pub(crate) fn apply_feature(features: &mut Features, atom: &TagAtom<'_>) -> bool {
    match atom {
        TagAtom::Special(special) => features.special = Some(*special),
        TagAtom::Mood(mood) => features.mood = Some(*mood),
        TagAtom::Form(form) => features.form = Some(*form),
        TagAtom::Voice(voice) => features.voice = Some(*voice),
        TagAtom::Derivation(derivation) => features.derivation = Some(*derivation),
        TagAtom::Aspect(aspect) => features.aspect = Some(*aspect),
        TagAtom::Case(case) => features.case = Some(*case),
        TagAtom::State(state) => features.state = Some(*state),
        TagAtom::Pgn(pgn) => merge_pgn(features, *pgn),
        _ => return false,
    }
    true
}

/// PGN codes only set the parts they name.
pub(crate) fn merge_pgn(features: &mut Features, pgn: Pgn) {
    if pgn.person.is_some() {
        features.person = pgn.person;
    }
    if pgn.gender.is_some() {
        features.gender = pgn.gender;
    }
    if pgn.number.is_some() {
        features.number = pgn.number;
    }
}
