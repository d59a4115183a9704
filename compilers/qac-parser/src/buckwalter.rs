//! Buckwalter transliteration of letter buffers.
//!
//! Lemma keys, roots and corpus words are all written in this ASCII scheme.
//! Each character maps to a letter, a diacritic, or a letter carrying a
//! diacritic (hamza and madda carriers). Anything outside the table decodes
//! to a word boundary.

use qac_protocol::{Diacritics, Letter, LetterBuffer, LetterBufferBuilder, Slot};

use crate::error::EncodingError;

#[derive(Debug, Clone, Copy)]
enum Symbol {
    Letter(Letter),
    Carrier(Letter, Diacritics),
    Diacritic(Diacritics),
    /// Dagger alif: a mark on alif maqsura, a letter anywhere else.
    Dagger,
}

fn symbol(ch: char) -> Option<Symbol> {
    use Letter::*;
    let symbol = match ch {
        '\'' => Symbol::Letter(Hamza),
        '>' => Symbol::Carrier(Alif, Diacritics::HAMZA_ABOVE),
        '&' => Symbol::Carrier(Waw, Diacritics::HAMZA_ABOVE),
        '<' => Symbol::Carrier(Alif, Diacritics::HAMZA_BELOW),
        '}' => Symbol::Carrier(Ya, Diacritics::HAMZA_ABOVE),
        '{' => Symbol::Carrier(Alif, Diacritics::HAMZAT_WASL),
        '|' => Symbol::Carrier(Alif, Diacritics::MADDAH),
        'A' => Symbol::Letter(Alif),
        'b' => Symbol::Letter(Ba),
        'p' => Symbol::Letter(TaMarbuta),
        't' => Symbol::Letter(Ta),
        'v' => Symbol::Letter(Tha),
        'j' => Symbol::Letter(Jim),
        'H' => Symbol::Letter(Hha),
        'x' => Symbol::Letter(Kha),
        'd' => Symbol::Letter(Dal),
        '*' => Symbol::Letter(Dhal),
        'r' => Symbol::Letter(Ra),
        'z' => Symbol::Letter(Zay),
        's' => Symbol::Letter(Sin),
        '$' => Symbol::Letter(Shin),
        'S' => Symbol::Letter(Sad),
        'D' => Symbol::Letter(Dad),
        'T' => Symbol::Letter(Tta),
        'Z' => Symbol::Letter(Zza),
        'E' => Symbol::Letter(Ain),
        'g' => Symbol::Letter(Ghain),
        '_' => Symbol::Letter(Tatweel),
        'f' => Symbol::Letter(Fa),
        'q' => Symbol::Letter(Qaf),
        'k' => Symbol::Letter(Kaf),
        'l' => Symbol::Letter(Lam),
        'm' => Symbol::Letter(Mim),
        'n' => Symbol::Letter(Nun),
        'h' => Symbol::Letter(Ha),
        'w' => Symbol::Letter(Waw),
        'Y' => Symbol::Letter(AlifMaqsura),
        'y' => Symbol::Letter(Ya),
        'F' => Symbol::Diacritic(Diacritics::FATHATAN),
        'N' => Symbol::Diacritic(Diacritics::DAMMATAN),
        'K' => Symbol::Diacritic(Diacritics::KASRATAN),
        'a' => Symbol::Diacritic(Diacritics::FATHA),
        'u' => Symbol::Diacritic(Diacritics::DAMMA),
        'i' => Symbol::Diacritic(Diacritics::KASRA),
        '~' => Symbol::Diacritic(Diacritics::SHADDA),
        'o' => Symbol::Diacritic(Diacritics::SUKUN),
        '^' => Symbol::Diacritic(Diacritics::MADDAH),
        '#' => Symbol::Diacritic(Diacritics::HAMZA_ABOVE),
        '`' => Symbol::Dagger,
        ':' => Symbol::Letter(SmallHighSeen),
        '@' => Symbol::Letter(SmallHighRoundedZero),
        '"' => Symbol::Letter(SmallHighUprightRectangularZero),
        '[' => Symbol::Letter(SmallHighMeemIsolatedForm),
        ';' => Symbol::Letter(SmallLowSeen),
        ',' => Symbol::Letter(SmallWaw),
        '.' => Symbol::Letter(SmallYa),
        '!' => Symbol::Letter(SmallHighNoon),
        '-' => Symbol::Letter(EmptyCentreLowStop),
        '+' => Symbol::Letter(EmptyCentreHighStop),
        '%' => Symbol::Letter(RoundedHighStopWithFilledCentre),
        ']' => Symbol::Letter(SmallLowMeem),
        '/' => Symbol::Letter(Placeholder),
        _ => return None,
    };
    Some(symbol)
}

fn letter_symbol(letter: Letter) -> char {
    use Letter::*;
    match letter {
        Alif => 'A',
        Ba => 'b',
        Ta => 't',
        Tha => 'v',
        Jim => 'j',
        Hha => 'H',
        Kha => 'x',
        Dal => 'd',
        Dhal => '*',
        Ra => 'r',
        Zay => 'z',
        Sin => 's',
        Shin => '$',
        Sad => 'S',
        Dad => 'D',
        Tta => 'T',
        Zza => 'Z',
        Ain => 'E',
        Ghain => 'g',
        Fa => 'f',
        Qaf => 'q',
        Kaf => 'k',
        Lam => 'l',
        Mim => 'm',
        Nun => 'n',
        Ha => 'h',
        Waw => 'w',
        Ya => 'y',
        Hamza => '\'',
        AlifMaqsura => 'Y',
        TaMarbuta => 'p',
        Tatweel => '_',
        SmallHighSeen => ':',
        SmallHighRoundedZero => '@',
        SmallHighUprightRectangularZero => '"',
        SmallHighMeemIsolatedForm => '[',
        SmallLowSeen => ';',
        SmallWaw => ',',
        SmallYa => '.',
        SmallHighNoon => '!',
        EmptyCentreLowStop => '-',
        EmptyCentreHighStop => '+',
        RoundedHighStopWithFilledCentre => '%',
        SmallLowMeem => ']',
        Placeholder => '/',
    }
}

pub fn decode(text: &str) -> Result<LetterBuffer, EncodingError> {
    let mut builder = LetterBufferBuilder::with_capacity(text.len());

    for (offset, ch) in text.char_indices() {
        match symbol(ch) {
            Some(Symbol::Letter(letter)) => builder.push_letter(letter),
            Some(Symbol::Carrier(letter, marks)) => {
                builder.push_letter(letter);
                mark(&mut builder, marks, ch, offset)?;
            }
            Some(Symbol::Diacritic(marks)) => mark(&mut builder, marks, ch, offset)?,
            Some(Symbol::Dagger) => {
                if builder.last_letter() != Some(Letter::AlifMaqsura) {
                    builder.push_letter(Letter::Alif);
                }
                mark(&mut builder, Diacritics::DAGGER_ALIF, ch, offset)?;
            }
            None => builder.push_boundary(),
        }
    }

    Ok(builder.finish())
}

fn mark(
    builder: &mut LetterBufferBuilder,
    marks: Diacritics,
    symbol: char,
    offset: usize,
) -> Result<(), EncodingError> {
    let orphan = EncodingError::OrphanDiacritic { symbol, offset };
    if builder.last_letter().is_none() {
        return Err(orphan);
    }
    builder.add_diacritic(marks).map_err(|_| orphan)
}

pub fn encode(letters: &LetterBuffer) -> String {
    encode_slots(letters.as_slots())
}

pub fn encode_slots(slots: &[Slot]) -> String {
    let mut text = String::with_capacity(slots.len() * 2);
    for slot in slots {
        encode_slot(slot, &mut text);
    }
    text
}

fn encode_slot(slot: &Slot, text: &mut String) {
    let Some(letter) = slot.letter else {
        text.push(' ');
        return;
    };

    let marks = slot.diacritics;
    let dagger = marks.contains(Diacritics::DAGGER_ALIF);
    let mut hamza_above = marks.contains(Diacritics::HAMZA_ABOVE);

    let carrier = match letter {
        Letter::Alif if hamza_above && !dagger => {
            hamza_above = false;
            '>'
        }
        Letter::Waw if hamza_above => {
            hamza_above = false;
            '&'
        }
        Letter::Alif if marks.contains(Diacritics::HAMZA_BELOW) => '<',
        Letter::Ya if hamza_above => {
            hamza_above = false;
            '}'
        }
        Letter::Alif if dagger => '`',
        Letter::Alif if marks.contains(Diacritics::HAMZAT_WASL) => '{',
        other => letter_symbol(other),
    };
    text.push(carrier);

    if hamza_above {
        text.push('#');
    }
    for (flag, ch) in [
        (Diacritics::SHADDA, '~'),
        (Diacritics::FATHATAN, 'F'),
        (Diacritics::DAMMATAN, 'N'),
        (Diacritics::KASRATAN, 'K'),
        (Diacritics::FATHA, 'a'),
        (Diacritics::DAMMA, 'u'),
        (Diacritics::KASRA, 'i'),
        (Diacritics::SUKUN, 'o'),
    ] {
        if marks.contains(flag) {
            text.push(ch);
        }
    }
    if letter == Letter::AlifMaqsura && dagger {
        text.push('`');
    }
    if marks.contains(Diacritics::MADDAH) {
        text.push('^');
    }
}
