//! Appendix labels

use crate::types::NumberingSystem;

const HEBREW_LABELS: [&str; 30] = [
    "א", "ב", "ג", "ד", "ה", "ו", "ז", "ח", "ט", "י", //
    "יא", "יב", "יג", "יד", "טו", "טז", "יז", "יח", "יט", "כ", //
    "כא", "כב", "כג", "כד", "כה", "כו", "כז", "כח", "כט", "ל",
];

const ROMAN_LABELS: [&str; 30] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", //
    "XI", "XII", "XIII", "XIV", "XV", "XVI", "XVII", "XVIII", "XIX", "XX", //
    "XXI", "XXII", "XXIII", "XXIV", "XXV", "XXVI", "XXVII", "XXVIII", "XXIX", "XXX",
];

/// Label for the appendix at 1-based `index`.
///
/// Hebrew and Roman labels come from fixed 30-entry tables; past the end of
/// the table the plain decimal index is used instead.
pub fn format_label(index: usize, system: NumberingSystem) -> String {
    let table: &[&str] = match system {
        NumberingSystem::Hebrew => &HEBREW_LABELS,
        NumberingSystem::Roman => &ROMAN_LABELS,
        NumberingSystem::Arabic => return index.to_string(),
    };

    index
        .checked_sub(1)
        .and_then(|i| table.get(i))
        .map(|label| label.to_string())
        .unwrap_or_else(|| index.to_string())
}
