use std::collections::HashMap;

use qac_protocol::Lemma;

use crate::buckwalter;
use crate::error::EncodingError;

/// Resolves lemma keys (`LEM:<key>`) to canonical lemmas.
///
/// Used for attribution only: segment boundaries never depend on what a
/// lexicon returns.
pub trait Lexicon {
    fn lemma_for(&self, key: &str) -> Result<Lemma, EncodingError>;
}

impl<T: Lexicon + ?Sized> Lexicon for &T {
    fn lemma_for(&self, key: &str) -> Result<Lemma, EncodingError> {
        (**self).lemma_for(key)
    }
}

/// Lexicon that reads the letters straight out of the key. A single
/// trailing digit disambiguates homographs (`maA1`, `maA2`) and is not part
/// of the spelling.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuckwalterLexicon;

impl Lexicon for BuckwalterLexicon {
    fn lemma_for(&self, key: &str) -> Result<Lemma, EncodingError> {
        let spelling = match key.as_bytes().last() {
            Some(last) if last.is_ascii_digit() => &key[..key.len() - 1],
            _ => key,
        };
        Ok(Lemma::new(key, buckwalter::decode(spelling)?))
    }
}

/// Keys of the closed-class morphemes the segmenter attaches itself.
pub const CLOSED_CLASS_KEYS: [&str; 11] = ["w", "f", "b", "k", "t", "l", "s", "yaA", "haA", "n", "hum~a"];

/// Lemmas of the closed-class prefixes and suffixes, resolved once.
#[derive(Debug, Clone)]
pub struct ClosedClassLemmas {
    lemmas: HashMap<&'static str, Lemma>,
}

impl ClosedClassLemmas {
    pub fn resolve<L: Lexicon + ?Sized>(lexicon: &L) -> Result<Self, EncodingError> {
        let lemmas = CLOSED_CLASS_KEYS
            .iter()
            .map(|key| Ok((*key, lexicon.lemma_for(key)?)))
            .collect::<Result<HashMap<_, _>, EncodingError>>()?;
        Ok(Self { lemmas })
    }

    pub fn get(&self, key: &str) -> Option<&Lemma> {
        self.lemmas.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qac_protocol::Letter;

    #[test]
    fn test_trailing_digit_is_not_spelled() {
        let lemma = BuckwalterLexicon.lemma_for("maA1").unwrap();
        assert_eq!(lemma.key, "maA1");
        assert_eq!(lemma.letters.len(), 2);
        assert_eq!(lemma.letters.letter_at(0), Ok(Some(Letter::Mim)));
        assert_eq!(lemma.letters.letter_at(1), Ok(Some(Letter::Alif)));

        // Same spelling, different lemma.
        assert_ne!(lemma, BuckwalterLexicon.lemma_for("maA2").unwrap());
    }

    #[test]
    fn test_closed_class_lemmas() {
        let lemmas = ClosedClassLemmas::resolve(&BuckwalterLexicon).unwrap();
        let wa = lemmas.get("w").unwrap();
        assert_eq!(wa.letters.letter_at(0), Ok(Some(Letter::Waw)));
        assert_eq!(lemmas.get("hum~a").unwrap().letters.len(), 3);
        assert!(lemmas.get("x").is_none());
    }

    #[test]
    fn test_bad_key_is_an_encoding_error() {
        assert!(BuckwalterLexicon.lemma_for("~").is_err());
    }
}
