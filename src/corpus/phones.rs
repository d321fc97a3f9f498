//! Phone inventory used to decide how resynthesis may treat a unit's frames.
//!
//! SAMPA symbols for English and German voices. Only what the concatenator needs is kept:
//! the broad class, and whether the phone is a vowel or voiced.

use std::fmt;

/// Symbol for a pause target.
pub const PAUSE: &str = "_";

/// Broad articulatory class of a phone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneClass {
    Vowel,
    Plosive,
    Fricative,
    Affricate,
    Nasal,
    Liquid,
    Glide,
    Pause,
}

impl fmt::Display for PhoneClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhoneClass::Vowel => write!(f, "vowel"),
            PhoneClass::Plosive => write!(f, "plosive"),
            PhoneClass::Fricative => write!(f, "fricative"),
            PhoneClass::Affricate => write!(f, "affricate"),
            PhoneClass::Nasal => write!(f, "nasal"),
            PhoneClass::Liquid => write!(f, "liquid"),
            PhoneClass::Glide => write!(f, "glide"),
            PhoneClass::Pause => write!(f, "pause"),
        }
    }
}

/// Essential features of a phone.
#[derive(Debug, Clone, Copy)]
pub struct Phone {
    pub class: PhoneClass,
    pub vowel: bool,
    pub voiced: bool,
}

impl Phone {
    /// Vowels and voiced consonants carry a pitch period structure.
    pub fn is_voiced(&self) -> bool {
        self.vowel || self.voiced
    }
}

/// All phones as a compile-time slice, sorted by symbol (byte order) for binary search.
const PHONES: &[(&str, Phone)] = &[
    ("2", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("2:", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("3r", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("9", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("?", Phone { class: PhoneClass::Plosive, vowel: false, voiced: false }),
    ("@", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("@U", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("A", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("AI", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("C", Phone { class: PhoneClass::Fricative, vowel: false, voiced: false }),
    ("D", Phone { class: PhoneClass::Fricative, vowel: false, voiced: true }),
    ("E", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("E:", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("EI", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("I", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("N", Phone { class: PhoneClass::Nasal, vowel: false, voiced: true }),
    ("O", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("OI", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("R", Phone { class: PhoneClass::Liquid, vowel: false, voiced: true }),
    ("S", Phone { class: PhoneClass::Fricative, vowel: false, voiced: false }),
    ("T", Phone { class: PhoneClass::Fricative, vowel: false, voiced: false }),
    ("U", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("V", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("Y", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("Z", Phone { class: PhoneClass::Fricative, vowel: false, voiced: true }),
    ("_", Phone { class: PhoneClass::Pause, vowel: false, voiced: false }),
    ("a", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("a:", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("aU", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("b", Phone { class: PhoneClass::Plosive, vowel: false, voiced: true }),
    ("d", Phone { class: PhoneClass::Plosive, vowel: false, voiced: true }),
    ("dZ", Phone { class: PhoneClass::Affricate, vowel: false, voiced: true }),
    ("e", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("e:", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("f", Phone { class: PhoneClass::Fricative, vowel: false, voiced: false }),
    ("g", Phone { class: PhoneClass::Plosive, vowel: false, voiced: true }),
    ("h", Phone { class: PhoneClass::Fricative, vowel: false, voiced: false }),
    ("i", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("i:", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("j", Phone { class: PhoneClass::Glide, vowel: false, voiced: true }),
    ("k", Phone { class: PhoneClass::Plosive, vowel: false, voiced: false }),
    ("l", Phone { class: PhoneClass::Liquid, vowel: false, voiced: true }),
    ("m", Phone { class: PhoneClass::Nasal, vowel: false, voiced: true }),
    ("n", Phone { class: PhoneClass::Nasal, vowel: false, voiced: true }),
    ("o", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("o:", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("p", Phone { class: PhoneClass::Plosive, vowel: false, voiced: false }),
    ("pf", Phone { class: PhoneClass::Affricate, vowel: false, voiced: false }),
    ("r", Phone { class: PhoneClass::Liquid, vowel: false, voiced: true }),
    ("r=", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("s", Phone { class: PhoneClass::Fricative, vowel: false, voiced: false }),
    ("t", Phone { class: PhoneClass::Plosive, vowel: false, voiced: false }),
    ("tS", Phone { class: PhoneClass::Affricate, vowel: false, voiced: false }),
    ("ts", Phone { class: PhoneClass::Affricate, vowel: false, voiced: false }),
    ("u", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("u:", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("v", Phone { class: PhoneClass::Fricative, vowel: false, voiced: true }),
    ("w", Phone { class: PhoneClass::Glide, vowel: false, voiced: true }),
    ("x", Phone { class: PhoneClass::Fricative, vowel: false, voiced: false }),
    ("y", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("y:", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
    ("z", Phone { class: PhoneClass::Fricative, vowel: false, voiced: true }),
    ("{", Phone { class: PhoneClass::Vowel, vowel: true, voiced: true }),
];

/// Get phone features by symbol using binary search O(log n).
pub fn get_phone(symbol: &str) -> Option<&'static Phone> {
    PHONES.binary_search_by_key(&symbol, |(s, _)| s).ok().map(|idx| &PHONES[idx].1)
}

/// Voicing flag for a target phone. Unknown symbols are treated as unvoiced.
pub fn is_voiced(symbol: &str) -> bool {
    get_phone(symbol).is_some_and(Phone::is_voiced)
}

/// Print the phone inventory grouped by class.
pub fn print_phones() {
    println!("═══════════════════════════════════════════════════════════════════");
    println!("  Phone inventory - {} SAMPA symbols", PHONES.len());
    println!("═══════════════════════════════════════════════════════════════════");

    let classes = [
        PhoneClass::Vowel,
        PhoneClass::Plosive,
        PhoneClass::Fricative,
        PhoneClass::Affricate,
        PhoneClass::Nasal,
        PhoneClass::Liquid,
        PhoneClass::Glide,
        PhoneClass::Pause,
    ];

    for class in &classes {
        let members: Vec<_> = PHONES.iter().filter(|(_, p)| p.class == *class).collect();

        println!("\n── {} ({} phones) ──", class, members.len());
        println!("{:<8} VOICED", "SYMBOL");
        println!("{}", "─".repeat(30));

        for (symbol, phone) in members {
            println!("{:<8} {}", symbol, if phone.is_voiced() { "yes" } else { "no" });
        }
    }

    println!();
    println!("Voiced frames (vowels and voiced consonants) may be time-scaled by pitch-synchronous resynthesis.");
}

/// Print detailed information about a specific phone.
pub fn print_phone_info(symbol: &str) -> anyhow::Result<()> {
    let phone = get_phone(symbol).ok_or_else(|| anyhow::anyhow!("Phone '{}' not found. Run with --list-phones to see the inventory", symbol))?;

    println!();
    println!("Phone: {}", symbol);
    println!("{}", "─".repeat(40));
    println!("Class:         {}", phone.class);
    println!("Vowel:         {}", phone.vowel);
    println!("Voiced:        {}", phone.is_voiced());
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_is_sorted() {
        assert!(PHONES.windows(2).all(|w| w[0].0.as_bytes() < w[1].0.as_bytes()));
    }

    #[test]
    fn test_voicing() {
        assert!(is_voiced("A"));
        assert!(is_voiced("@U"));
        assert!(is_voiced("z"));
        assert!(is_voiced("m"));
        assert!(!is_voiced("s"));
        assert!(!is_voiced("tS"));
        assert!(!is_voiced(PAUSE));
        assert!(!is_voiced("not-a-phone"));
    }

    #[test]
    fn test_lookup() {
        let phone = get_phone("dZ").unwrap();
        assert_eq!(phone.class, PhoneClass::Affricate);
        assert!(!phone.vowel);
        assert!(phone.voiced);
        assert!(print_phone_info("xyz").is_err());
    }
}
