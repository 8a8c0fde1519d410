//! Construct and validate gazetteer name records.
//!
//! [`NameRecord`] owns all field validation, Unicode normalization,
//! language/script consistency checking, romanization, slug generation,
//! and summary generation. Construction validates the full field set
//! atomically: every stage validates into locals and the record is
//! assembled only after all of them pass, so callers never observe a
//! half-valid record.

use crate::detect::ScriptDetector;
use crate::error::NameError;
use crate::lang::LanguageTagResolver;
use crate::registry::PlaceRegistry;
use crate::text;
use crate::translit::Transliterator;
use crate::vocab::VocabularyCatalog;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

static RX_PID: OnceLock<Regex> = OnceLock::new();
static RX_SLUG: OnceLock<Regex> = OnceLock::new();

fn pid_regex() -> &'static Regex {
    RX_PID.get_or_init(|| Regex::new(r"^\d+$").unwrap())
}

fn slug_regex() -> &'static Regex {
    RX_SLUG.get_or_init(|| Regex::new(r"^[a-z0-9\-]+$").unwrap())
}

/// One raw input row, as read from the batch input file. All fields are
/// plain strings; validation happens in [`NameRecord::new`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNameRecord {
    /// Caller-side row identifier, used only for batch logging.
    pub nameid: Option<String>,
    pub pid: Option<String>,
    pub language: Option<String>,
    pub attested: Option<String>,
    pub romanized: Option<String>,
    pub slug: Option<String>,
    pub association_certainty: Option<String>,
    pub name_type: Option<String>,
    pub transcription_accuracy: Option<String>,
    pub transcription_completeness: Option<String>,
    pub details: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub time_periods: Vec<String>,
}

impl RawNameRecord {
    /// Best display title for log messages: romanized if present, else
    /// attested.
    pub fn display_title(&self) -> &str {
        match self.romanized.as_deref() {
            Some(r) if !r.is_empty() => r,
            _ => self.attested.as_deref().unwrap_or(""),
        }
    }
}

/// Per-record (or per-batch) validation switches. These travel with the
/// context rather than living in global state so offline test runs are
/// deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    /// Skip checks that need the network (registry existence, slug
    /// uniqueness, transliteration). Skips are logged, never silent.
    pub skip_remote_checks: bool,

    /// Demote NFC/NFKC disagreement from an error to a warning and
    /// proceed with the NFC form.
    pub relaxed_normalization: bool,
}

/// Everything the validation engine consumes, injected by reference.
pub struct NameContext<'a, R, T, D> {
    pub catalog: &'a VocabularyCatalog,
    pub resolver: &'static LanguageTagResolver,
    pub detector: &'a D,
    pub transliterator: &'a T,
    pub registry: &'a R,
    pub options: ValidationOptions,
}

impl<'a, R, T, D> NameContext<'a, R, T, D> {
    pub fn new(
        catalog: &'a VocabularyCatalog,
        detector: &'a D,
        transliterator: &'a T,
        registry: &'a R,
        options: ValidationOptions,
    ) -> Self {
        Self {
            catalog,
            resolver: LanguageTagResolver::get(),
            detector,
            transliterator,
            registry,
            options,
        }
    }
}

/// A validated name resource for a place.
#[derive(Debug, Clone)]
pub struct NameRecord {
    pid: String,
    language: String,
    language_script: Option<String>,
    attested: String,
    romanized: String,
    slug: String,
    association_certainty: String,
    name_type: String,
    transcription_accuracy: String,
    transcription_completeness: String,
    details: String,
    summary: String,
    time_periods: Vec<String>,
}

impl NameRecord {
    /// Validate a raw record into a `NameRecord`.
    ///
    /// The stages run in dependency order: pid, then language (whose
    /// resolved script the attested check needs), then the name forms,
    /// then slug and the vocabulary-controlled fields. Any failure
    /// aborts construction; nothing is partially built.
    pub async fn new<R, T, D>(
        raw: &RawNameRecord,
        ctx: &NameContext<'_, R, T, D>,
    ) -> Result<Self, NameError>
    where
        R: PlaceRegistry,
        T: Transliterator,
        D: ScriptDetector,
    {
        let pid_raw = raw.pid.as_deref().ok_or(NameError::MissingField("pid"))?;
        let language_raw = raw
            .language
            .as_deref()
            .ok_or(NameError::MissingField("language"))?;
        let summary_raw = raw
            .summary
            .as_deref()
            .ok_or(NameError::MissingField("summary"))?;

        let pid = validate_pid(pid_raw, ctx).await?;
        let (language, language_script) = validate_language(language_raw, ctx)?;
        let attested = validate_attested(raw.attested.as_deref().unwrap_or(""), &language, ctx)?;
        let romanized = validate_romanized(raw.romanized.as_deref().unwrap_or(""), ctx)?;
        if attested.is_empty() && romanized.is_empty() {
            return Err(NameError::invalid(
                "attested",
                "",
                "a name cannot be created when both the attested and romanized fields are blank",
            ));
        }
        let slug = validate_slug(raw.slug.as_deref().unwrap_or(""), &pid, ctx).await?;

        let association_certainty = validate_vocab_term(
            "association_certainty",
            "association_certainty",
            raw.association_certainty.as_deref(),
            "certain",
            ctx.catalog,
        )?;
        let name_type = validate_vocab_term(
            "name_type",
            "name_type",
            raw.name_type.as_deref(),
            "geographic",
            ctx.catalog,
        )?;
        let transcription_accuracy = validate_vocab_term(
            "transcription_accuracy",
            "transcription_accuracy",
            raw.transcription_accuracy.as_deref(),
            "accurate",
            ctx.catalog,
        )?;
        let transcription_completeness = validate_vocab_term(
            "transcription_completeness",
            "transcription_completeness",
            raw.transcription_completeness.as_deref(),
            "complete",
            ctx.catalog,
        )?;
        let time_periods = validate_time_periods(&raw.time_periods, ctx.catalog)?;

        let details = text::sanitize_html(&text::normalize_space(
            raw.details.as_deref().unwrap_or(""),
        ));
        let summary = validate_summary(summary_raw)?;

        Ok(Self {
            pid,
            language,
            language_script,
            attested,
            romanized,
            slug,
            association_certainty,
            name_type,
            transcription_accuracy,
            transcription_completeness,
            details,
            summary,
            time_periods,
        })
    }

    // ---------- accessors ----------

    pub fn pid(&self) -> &str {
        &self.pid
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Four-letter script subtag for the record's language: the explicit
    /// subtag when the tag carries one, else the language's default
    /// suppressed script.
    pub fn language_script(&self) -> Option<&str> {
        self.language_script.as_deref()
    }

    pub fn attested(&self) -> &str {
        &self.attested
    }

    pub fn romanized(&self) -> &str {
        &self.romanized
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn association_certainty(&self) -> &str {
        &self.association_certainty
    }

    pub fn name_type(&self) -> &str {
        &self.name_type
    }

    pub fn transcription_accuracy(&self) -> &str {
        &self.transcription_accuracy
    }

    pub fn transcription_completeness(&self) -> &str {
        &self.transcription_completeness
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn time_periods(&self) -> &[String] {
        &self.time_periods
    }

    // ---------- validating mutators ----------

    /// Replace the romanized forms, re-running the character-set check.
    /// Clearing the value is rejected while `attested` is also empty.
    pub fn set_romanized<R, T, D>(
        &mut self,
        value: &str,
        ctx: &NameContext<'_, R, T, D>,
    ) -> Result<(), NameError> {
        let validated = validate_romanized(value, ctx)?;
        if validated.is_empty() && self.attested.is_empty() {
            return Err(NameError::invalid(
                "romanized",
                value,
                "cannot clear romanized while attested is also blank",
            ));
        }
        self.romanized = validated;
        Ok(())
    }

    /// Replace the slug, re-running the pattern and uniqueness checks.
    pub async fn set_slug<R, T, D>(
        &mut self,
        value: &str,
        ctx: &NameContext<'_, R, T, D>,
    ) -> Result<(), NameError>
    where
        R: PlaceRegistry,
    {
        self.slug = validate_slug(value, &self.pid, ctx).await?;
        Ok(())
    }

    /// Replace the time periods, validating each against the vocabulary.
    pub fn set_time_periods<R, T, D>(
        &mut self,
        periods: &[String],
        ctx: &NameContext<'_, R, T, D>,
    ) -> Result<(), NameError> {
        self.time_periods = validate_time_periods(periods, ctx.catalog)?;
        Ok(())
    }

    // ---------- derivation ----------

    /// Populate `romanized` from `attested`.
    ///
    /// Latin-script names contribute the attested form itself plus its
    /// ASCII folding; other scripts go through the transliteration
    /// service. Existing comma-separated forms are preserved and never
    /// duplicated, so the operation is idempotent.
    pub async fn generate_romanized<R, T, D>(
        &mut self,
        ctx: &NameContext<'_, R, T, D>,
    ) -> Result<(), NameError>
    where
        R: PlaceRegistry,
        T: Transliterator,
        D: ScriptDetector,
    {
        if self.attested.is_empty() {
            return Ok(());
        }

        let mut candidates: Vec<String> = self
            .romanized
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if self.language_script.as_deref() == Some("Latn") {
            if !contains_form(&candidates, &self.attested) {
                candidates.push(self.attested.clone());
            }
            let banalized = text::banalize(&self.attested);
            if !contains_form(&candidates, &banalized) {
                candidates.push(banalized);
            }
        } else {
            // The transliteration service wants the compatibility
            // decomposition of the attested form.
            let compatibility: String = self.attested.nfkd().collect();
            match ctx
                .transliterator
                .transliterate(&compatibility, &self.language, "en")
                .await
            {
                Ok(transliterated) => {
                    let form = text::title_case(&text::normalize_space(&transliterated));
                    if !form.is_empty() && !contains_form(&candidates, &form) {
                        candidates.push(form);
                    }
                }
                Err(e) if ctx.options.skip_remote_checks => {
                    warn!(
                        "transliteration unavailable ({}); keeping locally derived forms only",
                        e
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        let joined = candidates.join(", ");
        if !joined.is_empty() {
            self.romanized = validate_romanized(&joined, ctx)?;
        }
        Ok(())
    }

    /// Populate `slug` from the first romanized candidate, romanizing
    /// first when necessary. Existing slugs are left alone.
    pub async fn generate_slug<R, T, D>(
        &mut self,
        ctx: &NameContext<'_, R, T, D>,
    ) -> Result<(), NameError>
    where
        R: PlaceRegistry,
        T: Transliterator,
        D: ScriptDetector,
    {
        if !self.slug.is_empty() {
            return Ok(());
        }
        if self.romanized.is_empty() {
            self.generate_romanized(ctx).await?;
        }
        let first = self
            .romanized
            .split(',')
            .next()
            .map(str::trim)
            .unwrap_or("");
        if first.is_empty() {
            return Err(NameError::invalid(
                "slug",
                "",
                "no romanized form is available to derive a slug from",
            ));
        }
        let slug = text::sluggify(&text::banalize(first));
        self.slug = validate_slug(&slug, &self.pid, ctx).await?;
        Ok(())
    }

    /// Synthesize a one-sentence summary from the language description
    /// and the parent place's title. No-op when a summary was supplied.
    pub async fn generate_summary<R, T, D>(
        &mut self,
        ctx: &NameContext<'_, R, T, D>,
    ) -> Result<(), NameError>
    where
        R: PlaceRegistry,
    {
        if !self.summary.is_empty() {
            return Ok(());
        }

        // Language was validated at construction, so the parse succeeds.
        let parsed = ctx.resolver.parse(&self.language).ok_or_else(|| {
            NameError::invalid("language", &self.language, "language tag no longer parses")
        })?;
        let language_name = ctx
            .resolver
            .language(parsed.language)
            .map(|l| l.name)
            .unwrap_or(parsed.language);

        let mut sentence = format!("{}-language name", language_name);
        if let Some(script) = parsed.script.and_then(|s| ctx.resolver.script(s)) {
            sentence.push_str(&format!(" in {} script", script.name));
        }

        if ctx.options.skip_remote_checks {
            info!(
                "skipping place title lookup for pid {}; summary omits the place clause",
                self.pid
            );
        } else {
            let place = ctx.registry.fetch_place(&self.pid).await?;
            if !sentence.contains(&place.title) {
                sentence.push_str(&format!(" associated with {}", place.title));
            }
        }

        sentence.push('.');
        self.summary = sentence;
        Ok(())
    }

    /// Whether every field the upload format requires is populated.
    /// Pure; no network access.
    pub fn complete(&self) -> bool {
        !self.pid.is_empty()
            && !self.association_certainty.is_empty()
            && !self.language.is_empty()
            && !self.name_type.is_empty()
            && !self.romanized.is_empty()
            && !self.slug.is_empty()
            && !self.summary.is_empty()
            && !self.transcription_accuracy.is_empty()
            && !self.transcription_completeness.is_empty()
            && (!self.attested.is_empty() || !self.romanized.is_empty())
    }
}

/// Whether `form` is already represented in the candidate list, either
/// verbatim or, for a form that itself contains commas, as its
/// comma-split parts. The candidate list is rebuilt by splitting the
/// stored `romanized` value on commas, so a previously added
/// comma-bearing form reappears as its parts.
fn contains_form(candidates: &[String], form: &str) -> bool {
    if candidates.iter().any(|c| c == form) {
        return true;
    }
    let parts: Vec<&str> = form
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    !parts.is_empty() && parts.iter().all(|p| candidates.iter().any(|c| c == p))
}

// ---------- stage validators ----------

async fn validate_pid<R, T, D>(
    value: &str,
    ctx: &NameContext<'_, R, T, D>,
) -> Result<String, NameError>
where
    R: PlaceRegistry,
{
    let pid = text::normalize_space(value);
    if !pid_regex().is_match(&pid) {
        return Err(NameError::invalid(
            "pid",
            &pid,
            "place identifiers must be strings of Arabic numeral digits",
        ));
    }
    if ctx.options.skip_remote_checks {
        info!("skipping registry existence check for pid {}", pid);
    } else if !ctx.registry.place_exists(&pid).await? {
        return Err(NameError::invalid(
            "pid",
            &pid,
            "no place with this identifier exists in the registry",
        ));
    }
    Ok(pid)
}

fn validate_language<R, T, D>(
    value: &str,
    ctx: &NameContext<'_, R, T, D>,
) -> Result<(String, Option<String>), NameError> {
    let language = text::normalize_space(value);
    if !ctx.resolver.is_valid_tag(&language) {
        return Err(NameError::invalid(
            "language",
            &language,
            "does not validate as an IANA language tag",
        ));
    }
    let script = ctx.resolver.script_of(&language).map(String::from);
    Ok((language, script))
}

/// Normalize a user-supplied textual field, failing (or warning, in
/// relaxed mode) when NFC and NFKC disagree. The stored value is always
/// the NFC form.
fn normalize_unicode(
    field: &'static str,
    value: &str,
    relaxed: bool,
) -> Result<String, NameError> {
    let spaced = text::normalize_space(value);
    let (nfc, nfkc) = text::normalization_forms(&spaced);
    if nfc != nfkc {
        if relaxed {
            warn!(
                "possible Unicode weirdness in `{}`: canonical form {:?} does not match \
                 compatibility form {:?}; using NFC",
                field, nfc, nfkc
            );
        } else {
            return Err(NameError::NormalizationAmbiguity { field, nfc, nfkc });
        }
    }
    Ok(nfc)
}

fn validate_attested<R, T, D>(
    value: &str,
    language: &str,
    ctx: &NameContext<'_, R, T, D>,
) -> Result<String, NameError>
where
    D: ScriptDetector,
{
    let attested = normalize_unicode("attested", value, ctx.options.relaxed_normalization)?;
    if attested.is_empty() {
        return Ok(attested);
    }

    let parsed = ctx.resolver.parse(language);
    if parsed.as_ref().and_then(|p| p.script).is_some() {
        // An explicit script subtag (e.g. grc-Latn) overrides what the
        // text itself looks like.
        debug!(
            "language {:?} carries an explicit script subtag; skipping script detection",
            language
        );
        return Ok(attested);
    }

    let detection = ctx.detector.detect(&attested);
    if !detection.reliable {
        info!(
            "language detection for {:?} is unreliable; skipping consistency check",
            attested
        );
        return Ok(attested);
    }
    let primary = parsed.map(|p| p.language).unwrap_or(language);
    if !detection.candidates.iter().any(|c| c == primary) {
        return Err(NameError::LanguageMismatch {
            declared: language.to_string(),
            text: attested.clone(),
            candidates: detection.candidates,
        });
    }
    Ok(attested)
}

fn validate_romanized<R, T, D>(
    value: &str,
    ctx: &NameContext<'_, R, T, D>,
) -> Result<String, NameError> {
    let romanized = normalize_unicode("romanized", value, ctx.options.relaxed_normalization)?;
    if !ctx.catalog.is_romanizable(&romanized) {
        return Err(NameError::invalid(
            "romanized",
            &romanized,
            "must contain only Latin-script Unicode characters and combining diacritics",
        ));
    }
    Ok(romanized)
}

async fn validate_slug<R, T, D>(
    value: &str,
    pid: &str,
    ctx: &NameContext<'_, R, T, D>,
) -> Result<String, NameError>
where
    R: PlaceRegistry,
{
    let slug = text::normalize_space(value);
    if slug.is_empty() {
        return Ok(slug);
    }
    if !slug_regex().is_match(&slug) {
        return Err(NameError::invalid(
            "slug",
            &slug,
            "slugs must contain only lower-case ASCII letters, Arabic numeral digits, and hyphens",
        ));
    }
    if ctx.options.skip_remote_checks {
        info!("skipping slug uniqueness check for {}/{}", pid, slug);
    } else if ctx.registry.slug_exists(pid, &slug).await? {
        return Err(NameError::invalid(
            "slug",
            &slug,
            format!("a name with this slug already exists under place {}", pid),
        ));
    }
    Ok(slug)
}

fn validate_vocab_term(
    field: &'static str,
    vocabulary: &'static str,
    value: Option<&str>,
    default: &str,
    catalog: &VocabularyCatalog,
) -> Result<String, NameError> {
    let Some(value) = value else {
        return Ok(default.to_string());
    };
    let term = text::normalize_space(value);
    if !catalog.contains(vocabulary, &term)? {
        return Err(NameError::VocabularyTerm {
            field,
            vocabulary,
            value: term,
            allowed: catalog
                .terms_of(vocabulary)?
                .into_iter()
                .map(String::from)
                .collect(),
        });
    }
    Ok(term)
}

fn validate_time_periods(
    periods: &[String],
    catalog: &VocabularyCatalog,
) -> Result<Vec<String>, NameError> {
    periods
        .iter()
        .map(|p| {
            validate_vocab_term("time_periods", "time_periods", Some(p), "", catalog)
        })
        .collect()
}

fn validate_summary(value: &str) -> Result<String, NameError> {
    let summary = text::normalize_space(value);
    if !text::is_plain_text(&summary) {
        return Err(NameError::invalid(
            "summary",
            &summary,
            "must be plain text with no markup",
        ));
    }
    Ok(summary)
}
