//! Controlled vocabularies and named Unicode ranges.
//!
//! The catalog is built once at startup and passed into the validation
//! engine by reference, so tests can substitute alternate vocabularies
//! without touching global state.

use crate::error::NameError;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Immutable catalog of controlled vocabularies plus the named Unicode
/// ranges used for the romanized character-set check.
#[derive(Debug, Clone)]
pub struct VocabularyCatalog {
    vocabularies: BTreeMap<&'static str, BTreeMap<&'static str, &'static str>>,
    unicode_ranges: BTreeMap<&'static str, (char, char)>,
}

impl VocabularyCatalog {
    /// Build a catalog from explicit tables. Used by tests that need a
    /// reduced or alternate vocabulary set.
    pub fn new(
        vocabularies: BTreeMap<&'static str, BTreeMap<&'static str, &'static str>>,
        unicode_ranges: BTreeMap<&'static str, (char, char)>,
    ) -> Self {
        Self {
            vocabularies,
            unicode_ranges,
        }
    }

    /// The terms of a named vocabulary, sorted.
    pub fn terms_of(&self, vocabulary: &str) -> Result<Vec<&'static str>, NameError> {
        self.vocabularies
            .get(vocabulary)
            .map(|v| v.keys().copied().collect())
            .ok_or_else(|| NameError::UnknownVocabulary(vocabulary.to_string()))
    }

    /// Whether `term` belongs to the named vocabulary.
    pub fn contains(&self, vocabulary: &str, term: &str) -> Result<bool, NameError> {
        self.vocabularies
            .get(vocabulary)
            .map(|v| v.contains_key(term))
            .ok_or_else(|| NameError::UnknownVocabulary(vocabulary.to_string()))
    }

    /// Description of a term, if the vocabulary carries one.
    pub fn description(&self, vocabulary: &str, term: &str) -> Option<&'static str> {
        self.vocabularies
            .get(vocabulary)
            .and_then(|v| v.get(term))
            .copied()
            .filter(|d| !d.is_empty())
    }

    /// The code-point ranges a romanized form may use: every named range
    /// whose name contains "latin", plus the combining diacritical marks.
    pub fn romanized_ranges(&self) -> Vec<RangeInclusive<char>> {
        self.unicode_ranges
            .iter()
            .filter(|(name, _)| name.contains("latin") || **name == "combining_diacritical_marks")
            .map(|(_, (lo, hi))| *lo..=*hi)
            .collect()
    }

    /// Whether every character of `text` falls inside the romanized
    /// ranges. The empty string is acceptable ("no romanized form yet").
    pub fn is_romanizable(&self, text: &str) -> bool {
        let ranges = self.romanized_ranges();
        text.chars().all(|c| ranges.iter().any(|r| r.contains(&c)))
    }
}

impl Default for VocabularyCatalog {
    fn default() -> Self {
        Self::new(default_vocabularies(), default_unicode_ranges())
    }
}

fn default_unicode_ranges() -> BTreeMap<&'static str, (char, char)> {
    BTreeMap::from([
        ("basic_latin", ('\u{0020}', '\u{007F}')),
        ("latin_1", ('\u{00A0}', '\u{00FF}')),
        ("latin_extended_a", ('\u{0100}', '\u{017F}')),
        ("latin_extended_b", ('\u{0180}', '\u{024F}')),
        ("latin_extended_additional", ('\u{1E00}', '\u{1EFF}')),
        ("ipa_extensions", ('\u{0250}', '\u{02AF}')),
        ("spacing_modifier_letters", ('\u{02B0}', '\u{02FF}')),
        ("latin_extended_c", ('\u{2C60}', '\u{2C7F}')),
        ("combining_diacritical_marks", ('\u{0300}', '\u{036F}')),
    ])
}

fn default_vocabularies() -> BTreeMap<&'static str, BTreeMap<&'static str, &'static str>> {
    BTreeMap::from([
        (
            "association_certainty",
            BTreeMap::from([
                (
                    "certain",
                    "All commentators are agreed that the place was identified \
                     by the name or location of interest.",
                ),
                (
                    "less-certain",
                    "Most commentators are at least relatively certain that the \
                     place was identified by the name or location of interest.",
                ),
                (
                    "uncertain",
                    "Commentators do not agree that the place was identified by \
                     the name or location of interest.",
                ),
            ]),
        ),
        (
            "name_type",
            BTreeMap::from([
                ("unknown", ""),
                ("geographic", ""),
                ("undefined", ""),
                ("ethnic", ""),
            ]),
        ),
        (
            "transcription_accuracy",
            BTreeMap::from([("accurate", ""), ("false", ""), ("inaccurate", "")]),
        ),
        (
            "transcription_completeness",
            BTreeMap::from([
                ("complete", ""),
                ("reconstructable", ""),
                ("non-reconstructable", ""),
            ]),
        ),
        (
            "time_periods",
            BTreeMap::from([
                ("paleolithic-middle-east", "ME [[-2600000,-18000]]"),
                ("mesolithic-levant", "Epipaleolithic-Protoneolithic Levant [[-18000,-9500]]"),
                ("neolithic-middle-east", "ME [[-9000,-4500]]"),
                ("neolithic-egypt", "Neolithic Egypt [[-6000,-4500]]"),
                ("chalcolithic-mesopotamia", "Copper Age Mesopotamia [[-6200,-3750]]"),
                ("predynastic-egypt", "Predynastic Egypt [[-4500,-2950]]"),
                ("uruk-mesopotamia", "Protoliterate Mesopotamia [[-4000,-2950]]"),
                ("early-bronze-age-southern-levant", "southern Levant [[-3300,-2000]]"),
                ("early-minoan", "Early Minoan Crete [[-3100,-2000]]"),
                ("early-helladic", "Early Helladic Greek mainland [[-3000,-2000]]"),
                ("old-kingdom-egypt", "Old Kingdom Egypt [[-2670,-2168]]"),
                ("middle-kingdom-egypt", "Middle Kingdom Egypt [[-2010,-1640]]"),
                ("middle-helladic", "Middle Helladic Greek mainland [[-2000,-1600]]"),
                ("old-babylonian-assyrian-mesopotamia", "Mesopotamia [[-2000,-1600]]"),
                ("middle-bronze-age-anatolia", "Anatolia [[-1750,-1450]]"),
                ("old-hittite-anatolia", "Old-Middle Kingdom Hittite [[-1650,-1450]]"),
                ("late-helladic", "Late Helladic Greek mainland [[-1600,-1200]]"),
                ("late-minoan", "Late Minoan Crete [[-1600,-1080]]"),
                ("new-kingdom-egypt", "New Kingdom Egypt [[-1548,-1086]]"),
                ("late-bronze-age-southern-levant", "southern Levant [[-1400,-1200]]"),
                ("early-iron-age-anatolia", "incl. Mitanni [[-1200,-700]]"),
                ("iron-age-southern-levant", "[[-1200,-550]]"),
                ("early-geometric", "Early Geometric Greece [[-900,-850]]"),
                ("middle-geometric", "Middle Geometric Greece [[-850,-750]]"),
                ("archaic", "Archaic Greek and Roman history [[-750,-550]]"),
                ("neo-assyrian-babylonian-middle-east", "ME [[-720,-540]]"),
                ("late-period-egypt", "Late Period Egypt [[-664,-332]]"),
                ("classical", "Classical Greek and Roman history [[-550,-330]]"),
                ("achaemenid-middle-east", "ME [[-540,-330]]"),
                ("hellenistic-republican", "Hellenistic-Republican Mediterranean [[-330,-30]]"),
                ("ptolemaic-egypt", "Ptolemaic Egypt [[-304,-30]]"),
                ("roman-middle-east", "ME [[-140,640]]"),
                ("roman", "Early Roman Empire [[-30,300]]"),
                ("late-antique", "Late Antique Greek and Roman history [[300,640]]"),
                ("proto-byzantine", "Early Byzantine; includes Justinian I [[500,650]]"),
                ("anglo-saxon", "[[550,1066]]"),
                ("caliphate-umayyad-middle-east", "Early Islamic, Rashidun-Umayyad [[632,750]]"),
                ("mediaeval-byzantine", "Mediaeval West, Byzantine East [[640,1453]]"),
                ("early-byzantine", "Early Byzantine Period [[650,850]]"),
                ("abassid-middle-east", "ME, northern Africa [[750,940]]"),
                ("middle-byzantine", "Middle Byzantine period [[850,1200]]"),
                ("fatimid-middle-east", "Western ME, northern Africa [[950,1150]]"),
                ("seljuq-middle-east", "Great Seljuq Empire [[1037,1150]]"),
                ("crusader-seljuq-ayyubid-levant", "Latin [[1099,1291]]"),
                ("late-byzantine", "Late Byzantine Period [[1200,1450]]"),
                ("mamluk-middle-east", "Western ME [[1258,1516]]"),
                ("ottoman-rise", "ends with the conquest of Constantinople [[1300,1453]]"),
                ("early-ottoman-empire", "ends with the siege of Vienna [[1453,1683]]"),
                ("ottoman-empire", "ME, Balkan, Northern Africa [[1513,1918]]"),
                ("late-ottoman-empire", "ME, Balkan, Northern Africa [[1683,1918]]"),
                ("modern", "Our present, modern era. [[1700,2100]]"),
                ("modern-middle-east", "ME [[1918,2000]]"),
            ]),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_of_known_vocabulary() {
        let catalog = VocabularyCatalog::default();
        let terms = catalog.terms_of("name_type").expect("known vocabulary");
        assert!(terms.contains(&"geographic"));
        assert!(terms.contains(&"ethnic"));
    }

    #[test]
    fn test_terms_of_unknown_vocabulary() {
        let catalog = VocabularyCatalog::default();
        let err = catalog.terms_of("nonsense").unwrap_err();
        assert!(matches!(err, NameError::UnknownVocabulary(_)));
    }

    #[test]
    fn test_contains_accepts_every_defined_term() {
        let catalog = VocabularyCatalog::default();
        for vocab in [
            "association_certainty",
            "name_type",
            "transcription_accuracy",
            "transcription_completeness",
            "time_periods",
        ] {
            for term in catalog.terms_of(vocab).unwrap() {
                assert!(
                    catalog.contains(vocab, term).unwrap(),
                    "{vocab} should contain {term}"
                );
            }
            assert!(!catalog.contains(vocab, "not-a-term").unwrap());
        }
    }

    #[test]
    fn test_description_present_for_association_certainty() {
        let catalog = VocabularyCatalog::default();
        assert!(catalog
            .description("association_certainty", "certain")
            .is_some());
        // Empty descriptions are treated as absent.
        assert!(catalog.description("name_type", "geographic").is_none());
    }

    #[test]
    fn test_romanized_ranges_cover_latin_and_combining() {
        let catalog = VocabularyCatalog::default();
        assert!(catalog.is_romanizable("Moontown"));
        assert!(catalog.is_romanizable("Catal\u{00e0}, Fran\u{00e7}ais, Rom\u{00e2}n\u{0103}"));
        assert!(catalog.is_romanizable("Athe\u{0304}na")); // combining macron
        assert!(catalog.is_romanizable(""));
    }

    #[test]
    fn test_romanized_ranges_reject_other_scripts() {
        let catalog = VocabularyCatalog::default();
        assert!(!catalog.is_romanizable("Ελληνικά"));
        assert!(!catalog.is_romanizable("Αθήνα"));
        assert!(!catalog.is_romanizable("نص"));
    }

    #[test]
    fn test_romanized_ranges_exclude_ipa_extensions() {
        let catalog = VocabularyCatalog::default();
        // IPA extensions are a named range but not a "latin" range.
        assert!(!catalog.is_romanizable("\u{0250}"));
    }
}
