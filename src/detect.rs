//! Script and language detection for attested name forms.
//!
//! The detector classifies the letters of a text sample into script
//! blocks and maps the dominant script back onto the candidate languages
//! in the subtag registry. Detection on short or mixed-script samples is
//! flagged unreliable; callers skip the consistency check in that case.

use crate::lang::LanguageTagResolver;

/// Minimum number of classified letters for a detection to count as
/// reliable. Short toponyms routinely defeat statistical detection.
const RELIABLE_MIN_LETTERS: usize = 4;

/// Outcome of a detection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Candidate language codes, in registry order.
    pub candidates: Vec<String>,

    /// Whether the detection is trustworthy enough to enforce.
    pub reliable: bool,
}

/// Ranked language/script identification for a text sample.
pub trait ScriptDetector {
    fn detect(&self, text: &str) -> Detection;
}

/// Detector backed by Unicode script-block classification.
#[derive(Debug, Default, Clone)]
pub struct UnicodeScriptDetector;

impl UnicodeScriptDetector {
    fn script_of_char(c: char) -> Option<&'static str> {
        match c as u32 {
            0x0041..=0x005A | 0x0061..=0x007A => Some("Latn"),
            0x00C0..=0x024F | 0x1E00..=0x1EFF | 0x2C60..=0x2C7F => Some("Latn"),
            0x0370..=0x03FF | 0x1F00..=0x1FFF => Some("Grek"),
            0x0400..=0x04FF | 0x0500..=0x052F => Some("Cyrl"),
            0x0530..=0x058F => Some("Armn"),
            0x0590..=0x05FF => Some("Hebr"),
            0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF => Some("Arab"),
            0x2C80..=0x2CFF => Some("Copt"),
            _ => None,
        }
    }
}

impl ScriptDetector for UnicodeScriptDetector {
    fn detect(&self, text: &str) -> Detection {
        let mut counts: Vec<(&'static str, usize)> = Vec::new();
        let mut classified = 0usize;
        for c in text.chars() {
            if let Some(script) = Self::script_of_char(c) {
                classified += 1;
                match counts.iter_mut().find(|(s, _)| *s == script) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((script, 1)),
                }
            }
        }

        let Some(&(dominant, _)) = counts.iter().max_by_key(|(_, n)| *n) else {
            return Detection {
                candidates: Vec::new(),
                reliable: false,
            };
        };

        let resolver = LanguageTagResolver::get();
        let candidates: Vec<String> = resolver
            .languages()
            .filter(|l| l.suppress_script == Some(dominant))
            .map(|l| l.code.to_string())
            .collect();

        // Mixed scripts or a very short sample make the call unreliable.
        let reliable = classified >= RELIABLE_MIN_LETTERS && counts.len() == 1;

        Detection {
            candidates,
            reliable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_latin_text_includes_english() {
        let detection = UnicodeScriptDetector.detect("Moontown");
        assert!(detection.reliable);
        assert!(detection.candidates.contains(&"en".to_string()));
        assert!(detection.candidates.contains(&"ro".to_string()));
    }

    #[test]
    fn test_detect_greek_text() {
        let detection = UnicodeScriptDetector.detect("Αθήνα");
        assert!(detection.reliable);
        assert_eq!(detection.candidates, vec!["el", "grc"]);
    }

    #[test]
    fn test_detect_greek_excludes_latin_languages() {
        let detection = UnicodeScriptDetector.detect("Ελληνικά");
        assert!(!detection.candidates.contains(&"en".to_string()));
    }

    #[test]
    fn test_detect_short_sample_is_unreliable() {
        let detection = UnicodeScriptDetector.detect("Ur");
        assert!(!detection.reliable);
        assert!(detection.candidates.contains(&"en".to_string()));
    }

    #[test]
    fn test_detect_mixed_script_is_unreliable() {
        let detection = UnicodeScriptDetector.detect("Athena Αθήνα");
        assert!(!detection.reliable);
    }

    #[test]
    fn test_detect_empty_text() {
        let detection = UnicodeScriptDetector.detect("");
        assert!(!detection.reliable);
        assert!(detection.candidates.is_empty());
    }

    #[test]
    fn test_detect_digits_only() {
        let detection = UnicodeScriptDetector.detect("12345");
        assert!(!detection.reliable);
        assert!(detection.candidates.is_empty());
    }

    #[test]
    fn test_candidates_track_the_subtag_registry() {
        let resolver = LanguageTagResolver::get();
        let expected: Vec<String> = resolver
            .languages()
            .filter(|l| l.suppress_script == Some("Latn"))
            .map(|l| l.code.to_string())
            .collect();
        let detection = UnicodeScriptDetector.detect("Moontown");
        assert_eq!(detection.candidates, expected);
    }

    #[test]
    fn test_detect_accented_latin() {
        let detection = UnicodeScriptDetector.detect("Română");
        assert!(detection.reliable);
        assert!(detection.candidates.contains(&"ro".to_string()));
    }
}
