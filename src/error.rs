//! Error taxonomy for name validation and remote lookups.
//!
//! Batch callers discriminate on these variants rather than parsing
//! message strings: structural errors (`MissingField`) and per-field
//! validation errors are fatal for the record, normalization ambiguity
//! and remote failures can be demoted by configuration.

use thiserror::Error;

/// Failure while talking to a remote collaborator (place registry or
/// transliteration service).
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request never produced an HTTP response (connect, DNS, timeout).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a status we cannot use.
    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    /// The response body could not be decoded.
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Error raised while constructing or mutating a [`crate::name::NameRecord`].
#[derive(Debug, Error)]
pub enum NameError {
    /// A required field was omitted entirely from the input record.
    #[error("required field `{0}` is missing")]
    MissingField(&'static str),

    /// A field value failed a pattern or invariant check.
    #[error("invalid value for `{field}` ({value:?}): {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// NFC and NFKC normalization disagree, so a compatibility transform
    /// may have altered the field's meaning.
    #[error(
        "field `{field}` is ambiguous under Unicode normalization: \
         canonical (NFC) form {nfc:?} does not match compatibility (NFKC) form {nfkc:?}"
    )]
    NormalizationAmbiguity {
        field: &'static str,
        nfc: String,
        nfkc: String,
    },

    /// The declared language is not among the detector's candidates.
    #[error(
        "declared language {declared:?} is not among the languages detected \
         for {text:?}: {}", candidates.join(", ")
    )]
    LanguageMismatch {
        declared: String,
        text: String,
        candidates: Vec<String>,
    },

    /// A vocabulary-controlled field holds a term outside its vocabulary.
    #[error(
        "`{field}` must be a term from the `{vocabulary}` vocabulary \
         ({}); got {value:?}", allowed.join(", ")
    )]
    VocabularyTerm {
        field: &'static str,
        vocabulary: &'static str,
        value: String,
        allowed: Vec<String>,
    },

    /// A vocabulary name was requested that the catalog does not define.
    #[error("unknown vocabulary `{0}`")]
    UnknownVocabulary(String),

    /// A remote collaborator could not be reached or answered badly.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl NameError {
    /// Convenience constructor for `Invalid`.
    pub fn invalid(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        NameError::Invalid {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }
}
