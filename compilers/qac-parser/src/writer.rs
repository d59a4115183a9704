//! Writes segments back to their tag string.
//!
//! The inverse of the segmenter: every segment the engine built from an atom
//! is spelled as that atom again, and inferred segments (subject pronouns)
//! are left out. Spellings come from [`TagAtom`]'s `Display`, so the lexer and
//! the writer cannot drift apart.

use qac_protocol::{PartOfSpeech, PronounRole, Segment, SegmentKind};

use crate::atoms::{prefix_rule_for, PrefixShape, TagAtom};
use crate::buckwalter;
use crate::error::WriteError;

pub fn write_tags(segments: &[Segment]) -> Result<String, WriteError> {
    let mut atoms = Vec::with_capacity(segments.len() * 4);
    for segment in segments {
        match segment.kind {
            SegmentKind::Prefix => atoms.push(prefix(segment)?),
            SegmentKind::Stem => stem(segment, &mut atoms),
            SegmentKind::Suffix => atoms.extend(suffix(segment)?),
        }
    }
    Ok(atoms.join(" "))
}

fn prefix(segment: &Segment) -> Result<String, WriteError> {
    prefix_rule_for(segment.pos, segment.lemma_key())
        .map(|rule| rule.atom.to_owned())
        .ok_or_else(|| WriteError::UnknownPrefix {
            ordinal: segment.ordinal,
            pos: segment.pos,
            lemma: segment.lemma_key().map(str::to_owned),
        })
}

/// Stem features in the corpus's canonical order.
fn stem(segment: &Segment, atoms: &mut Vec<String>) {
    let features = &segment.features;
    atoms.push(TagAtom::Stem(segment.pos).to_string());
    if let Some(derivation) = features.derivation {
        atoms.push(TagAtom::Derivation(derivation).to_string());
    }
    if let Some(aspect) = features.aspect {
        atoms.push(TagAtom::Aspect(aspect).to_string());
    }
    if let Some(voice) = features.voice {
        atoms.push(TagAtom::Voice(voice).to_string());
    }
    if let Some(form) = features.form {
        atoms.push(TagAtom::Form(form).to_string());
    }
    if let Some(key) = segment.lemma_key() {
        atoms.push(TagAtom::Lemma(key).to_string());
    }
    if let Some(root) = &features.root {
        atoms.push(TagAtom::Root(&buckwalter::encode_slots(root)).to_string());
    }
    if let Some(special) = features.special {
        atoms.push(TagAtom::Special(special).to_string());
    }
    let pgn = features.pgn();
    if !pgn.is_empty() {
        atoms.push(TagAtom::Pgn(pgn).to_string());
    }
    if let Some(mood) = features.mood {
        atoms.push(TagAtom::Mood(mood).to_string());
    }
    if let Some(state) = features.state {
        atoms.push(TagAtom::State(state).to_string());
    }
    if let Some(case) = features.case {
        atoms.push(TagAtom::Case(case).to_string());
    }
}

fn suffix(segment: &Segment) -> Result<Option<String>, WriteError> {
    let atom = match segment.pos {
        PartOfSpeech::Vocative => TagAtom::Vocative,
        PartOfSpeech::Emphatic => TagAtom::EmphaticNun,
        PartOfSpeech::Pronoun => match segment.features.pronoun_role {
            Some(PronounRole::Subject) => return Ok(None),
            _ => TagAtom::Pronoun(segment.features.pgn()),
        },
        pos => match prefix_rule_for(pos, segment.lemma_key()) {
            Some(rule) if rule.shape == PrefixShape::PrepositionLam => TagAtom::Prefix(rule),
            _ => {
                return Err(WriteError::UnknownSuffix {
                    ordinal: segment.ordinal,
                    pos,
                })
            }
        },
    };
    Ok(Some(atom.to_string()))
}
