//! Language tag resolution: single source of truth for supported subtags.
//!
//! A small, static subset of the IANA language subtag registry, held in a
//! `OnceLock` singleton. Provides tag validation, script resolution
//! (explicit subtag first, else the language's suppress-script), and
//! human-readable descriptions.

use std::sync::OnceLock;

/// Registry entry for a primary language subtag.
#[derive(Debug, Clone)]
pub struct LanguageSubtag {
    /// ISO 639 code (e.g., "en", "grc")
    pub code: &'static str,

    /// English description (e.g., "English", "Ancient Greek")
    pub name: &'static str,

    /// Default script the language is written in, when the IANA registry
    /// records a Suppress-Script (e.g., "Latn" for "en"). `None` when no
    /// default can be assumed (e.g., "mul").
    pub suppress_script: Option<&'static str>,
}

/// Registry entry for a four-letter script subtag.
#[derive(Debug, Clone)]
pub struct ScriptSubtag {
    pub code: &'static str,
    pub name: &'static str,
}

/// A language tag broken into its recognized subtags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTag {
    pub language: &'static str,
    pub script: Option<&'static str>,
    pub region: Option<String>,
}

/// Static language/script subtag registry.
pub struct LanguageTagResolver {
    languages: Vec<LanguageSubtag>,
    scripts: Vec<ScriptSubtag>,
}

static RESOLVER: OnceLock<LanguageTagResolver> = OnceLock::new();

impl LanguageTagResolver {
    /// Get the global resolver instance.
    pub fn get() -> &'static LanguageTagResolver {
        RESOLVER.get_or_init(|| LanguageTagResolver {
            languages: default_languages(),
            scripts: default_scripts(),
        })
    }

    /// All registered language subtags, in registry order.
    pub fn languages(&self) -> impl Iterator<Item = &LanguageSubtag> {
        self.languages.iter()
    }

    /// Look up a primary language subtag (case-insensitive).
    pub fn language(&self, code: &str) -> Option<&LanguageSubtag> {
        self.languages
            .iter()
            .find(|l| l.code.eq_ignore_ascii_case(code))
    }

    /// Look up a script subtag (case-insensitive).
    pub fn script(&self, code: &str) -> Option<&ScriptSubtag> {
        self.scripts
            .iter()
            .find(|s| s.code.eq_ignore_ascii_case(code))
    }

    /// Parse a tag of the form `language[-Script][-REGION]`.
    ///
    /// Returns `None` when the primary subtag is unknown, a script subtag
    /// is unknown, or any subtag is malformed.
    pub fn parse(&self, tag: &str) -> Option<ParsedTag> {
        let mut parts = tag.split('-');
        let primary = parts.next()?;
        if primary.len() < 2 || primary.len() > 3 || !primary.chars().all(|c| c.is_ascii_alphabetic())
        {
            return None;
        }
        let language = self.language(primary)?;

        let mut script = None;
        let mut region = None;
        for part in parts {
            if part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic()) && script.is_none()
            {
                script = Some(self.script(part)?.code);
            } else if region.is_none()
                && ((part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
                    || (part.len() == 3 && part.chars().all(|c| c.is_ascii_digit())))
            {
                region = Some(part.to_ascii_uppercase());
            } else {
                return None;
            }
        }

        Some(ParsedTag {
            language: language.code,
            script,
            region,
        })
    }

    /// Whether `tag` validates against the registry.
    pub fn is_valid_tag(&self, tag: &str) -> bool {
        self.parse(tag).is_some()
    }

    /// The four-letter script subtag for a tag: the explicit subtag when
    /// present, else the primary language's suppress-script.
    pub fn script_of(&self, tag: &str) -> Option<&'static str> {
        let parsed = self.parse(tag)?;
        match parsed.script {
            Some(script) => Some(script),
            None => self.language(parsed.language)?.suppress_script,
        }
    }

    /// Human-readable description of a tag, e.g. "Arabic" for `ar` and
    /// "Ancient Greek in Latin script" for `grc-Latn`.
    pub fn description_of(&self, tag: &str) -> Option<String> {
        let parsed = self.parse(tag)?;
        let language = self.language(parsed.language)?;
        match parsed.script.and_then(|s| self.script(s)) {
            Some(script) => Some(format!("{} in {} script", language.name, script.name)),
            None => Some(language.name.to_string()),
        }
    }
}

/// Default language subtag set.
///
/// Covers the languages the gazetteer's source data actually uses, plus
/// `mul` for multi-language name strings.
fn default_languages() -> Vec<LanguageSubtag> {
    vec![
        LanguageSubtag {
            code: "en",
            name: "English",
            suppress_script: Some("Latn"),
        },
        LanguageSubtag {
            code: "es",
            name: "Spanish",
            suppress_script: Some("Latn"),
        },
        LanguageSubtag {
            code: "fr",
            name: "French",
            suppress_script: Some("Latn"),
        },
        LanguageSubtag {
            code: "de",
            name: "German",
            suppress_script: Some("Latn"),
        },
        LanguageSubtag {
            code: "it",
            name: "Italian",
            suppress_script: Some("Latn"),
        },
        LanguageSubtag {
            code: "ro",
            name: "Romanian",
            suppress_script: Some("Latn"),
        },
        LanguageSubtag {
            code: "tr",
            name: "Turkish",
            suppress_script: Some("Latn"),
        },
        LanguageSubtag {
            code: "la",
            name: "Latin",
            suppress_script: Some("Latn"),
        },
        LanguageSubtag {
            code: "el",
            name: "Modern Greek",
            suppress_script: Some("Grek"),
        },
        LanguageSubtag {
            code: "grc",
            name: "Ancient Greek",
            suppress_script: Some("Grek"),
        },
        LanguageSubtag {
            code: "ar",
            name: "Arabic",
            suppress_script: Some("Arab"),
        },
        LanguageSubtag {
            code: "he",
            name: "Hebrew",
            suppress_script: Some("Hebr"),
        },
        LanguageSubtag {
            code: "ru",
            name: "Russian",
            suppress_script: Some("Cyrl"),
        },
        LanguageSubtag {
            code: "hy",
            name: "Armenian",
            suppress_script: Some("Armn"),
        },
        LanguageSubtag {
            code: "cop",
            name: "Coptic",
            suppress_script: Some("Copt"),
        },
        LanguageSubtag {
            code: "mul",
            name: "Multiple languages",
            suppress_script: None,
        },
    ]
}

fn default_scripts() -> Vec<ScriptSubtag> {
    vec![
        ScriptSubtag {
            code: "Latn",
            name: "Latin",
        },
        ScriptSubtag {
            code: "Grek",
            name: "Greek",
        },
        ScriptSubtag {
            code: "Arab",
            name: "Arabic",
        },
        ScriptSubtag {
            code: "Hebr",
            name: "Hebrew",
        },
        ScriptSubtag {
            code: "Cyrl",
            name: "Cyrillic",
        },
        ScriptSubtag {
            code: "Armn",
            name: "Armenian",
        },
        ScriptSubtag {
            code: "Copt",
            name: "Coptic",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_is_singleton() {
        let a = LanguageTagResolver::get();
        let b = LanguageTagResolver::get();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_languages_iterates_registry_in_order() {
        let resolver = LanguageTagResolver::get();
        let codes: Vec<&str> = resolver.languages().map(|l| l.code).collect();
        assert_eq!(codes.first(), Some(&"en"));
        assert!(codes.contains(&"grc"));
        assert!(codes.contains(&"mul"));
    }

    #[test]
    fn test_valid_plain_tags() {
        let resolver = LanguageTagResolver::get();
        for tag in ["en", "el", "grc", "ar", "tr", "mul", "ro"] {
            assert!(resolver.is_valid_tag(tag), "{tag} should validate");
        }
    }

    #[test]
    fn test_valid_tags_with_script_and_region() {
        let resolver = LanguageTagResolver::get();
        assert!(resolver.is_valid_tag("ar-Latn"));
        assert!(resolver.is_valid_tag("grc-Latn"));
        assert!(resolver.is_valid_tag("en-GB"));
        assert!(resolver.is_valid_tag("es-419"));
    }

    #[test]
    fn test_invalid_tags() {
        let resolver = LanguageTagResolver::get();
        assert!(!resolver.is_valid_tag(""));
        assert!(!resolver.is_valid_tag("barbaric nonsense"));
        assert!(!resolver.is_valid_tag("x1"));
        assert!(!resolver.is_valid_tag("en-Xxxx")); // unknown script
        assert!(!resolver.is_valid_tag("zz")); // unknown primary subtag
    }

    #[test]
    fn test_script_of_uses_suppress_script() {
        let resolver = LanguageTagResolver::get();
        assert_eq!(resolver.script_of("en"), Some("Latn"));
        assert_eq!(resolver.script_of("el"), Some("Grek"));
        assert_eq!(resolver.script_of("grc"), Some("Grek"));
        assert_eq!(resolver.script_of("ar"), Some("Arab"));
    }

    #[test]
    fn test_script_of_prefers_explicit_subtag() {
        let resolver = LanguageTagResolver::get();
        assert_eq!(resolver.script_of("ar-Latn"), Some("Latn"));
        assert_eq!(resolver.script_of("grc-latn"), Some("Latn"));
    }

    #[test]
    fn test_script_of_mul_is_none() {
        let resolver = LanguageTagResolver::get();
        assert_eq!(resolver.script_of("mul"), None);
    }

    #[test]
    fn test_description_of() {
        let resolver = LanguageTagResolver::get();
        assert_eq!(resolver.description_of("en").as_deref(), Some("English"));
        assert_eq!(
            resolver.description_of("ar-Latn").as_deref(),
            Some("Arabic in Latin script")
        );
        assert_eq!(
            resolver.description_of("grc").as_deref(),
            Some("Ancient Greek")
        );
        assert!(resolver.description_of("zz").is_none());
    }

    #[test]
    fn test_parse_case_insensitive() {
        let resolver = LanguageTagResolver::get();
        let parsed = resolver.parse("GRC-LATN").expect("should parse");
        assert_eq!(parsed.language, "grc");
        assert_eq!(parsed.script, Some("Latn"));
    }
}
