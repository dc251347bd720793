//! Ordered-list bullet numbering
//!
//! Converts a list value to its bullet text for the five HTML `type`
//! numbering systems. Roman numerals cover `1..=3999` and letter markers
//! `1..=104` (`A` through `ZZZZ`); values outside those ranges fall back to
//! arabic digits so every item still gets a marker.

/// Numbering system of an ordered list (`<ol type="...">`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NumberingType {
    /// `1`, `2`, `3` (default)
    #[default]
    Arabic,
    /// `A`, `B`, `C`
    UpperLetter,
    /// `a`, `b`, `c`
    LowerLetter,
    /// `I`, `II`, `III`
    UpperRoman,
    /// `i`, `ii`, `iii`
    LowerRoman,
}

/// Largest value representable in subtractive roman notation.
pub const MAX_ROMAN: u32 = 3999;

/// Longest run of one letter in a letter marker.
const MAX_LETTER_REPEAT: u32 = 4;

/// Largest value written as a letter marker (`ZZZZ`).
pub const MAX_LETTERS: u32 = 26 * MAX_LETTER_REPEAT;

const ROMAN_TABLE: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

const BULLET_SUFFIX: char = '.';

impl NumberingType {
    /// Map an `<ol type>` attribute value; unknown values yield arabic.
    pub fn from_attribute(value: &str) -> Self {
        match value.trim() {
            "A" => Self::UpperLetter,
            "a" => Self::LowerLetter,
            "I" => Self::UpperRoman,
            "i" => Self::LowerRoman,
            _ => Self::Arabic,
        }
    }

    /// The `type` attribute value for this numbering system.
    pub fn attribute(self) -> &'static str {
        match self {
            Self::Arabic => "1",
            Self::UpperLetter => "A",
            Self::LowerLetter => "a",
            Self::UpperRoman => "I",
            Self::LowerRoman => "i",
        }
    }

    /// Bullet text (marker plus `.` suffix) for a list value.
    pub fn format(self, value: u32) -> String {
        let mut marker = match self {
            Self::Arabic => value.to_string(),
            Self::UpperLetter => to_letters(value, b'A').unwrap_or_else(|| value.to_string()),
            Self::LowerLetter => to_letters(value, b'a').unwrap_or_else(|| value.to_string()),
            Self::UpperRoman => to_roman(value).unwrap_or_else(|| value.to_string()),
            Self::LowerRoman => to_roman(value)
                .map(|roman| roman.to_ascii_lowercase())
                .unwrap_or_else(|| value.to_string()),
        };
        marker.push(BULLET_SUFFIX);
        marker
    }
}

/// Letter marker: the letter block repeats past 26 (27 is `AA`, 28 is `BB`).
///
/// `None` for 0 and for values above [`MAX_LETTERS`].
pub fn to_letters(value: u32, first: u8) -> Option<String> {
    if value == 0 || value > MAX_LETTERS {
        return None;
    }
    let zero_based = value - 1;
    let letter = (first + (zero_based % 26) as u8) as char;
    let count = (zero_based / 26 + 1) as usize;
    Some(core::iter::repeat(letter).take(count).collect())
}

/// Upper-case roman numeral for `1..=MAX_ROMAN`, `None` otherwise.
pub fn to_roman(value: u32) -> Option<String> {
    if value == 0 || value > MAX_ROMAN {
        return None;
    }
    let mut remaining = value;
    let mut out = String::new();
    for (weight, symbol) in ROMAN_TABLE {
        while remaining >= weight {
            out.push_str(symbol);
            remaining -= weight;
        }
    }
    Some(out)
}
