//! Variant-title tokenizing and token classification.
//!
//! A title such as `"Small / Ground"` or `"4 oz, Whole"` is split into
//! tokens, and each token is claimed by at most one of weight, form, or
//! size label in a single left-to-right pass.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::weight::WeightParser;

static TITLE_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" / |, ").expect("valid regex"));

/// Preparation descriptors recognized as a variant's form.
#[derive(Debug, Clone)]
pub struct FormVocabulary {
    words: HashSet<String>,
}

impl Default for FormVocabulary {
    fn default() -> Self {
        Self::new([
            "ground",
            "whole",
            "powder",
            "cracked",
            "granulated",
            "seed",
            "leaf",
            "flakes",
            "coarse",
            "fine",
        ])
    }
}

impl FormVocabulary {
    pub fn new<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            words: words.into_iter().map(str::to_lowercase).collect(),
        }
    }

    /// Whole-token, case-insensitive membership test.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(&token.to_lowercase())
    }
}

/// Fields recovered from a variant's title tokens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedVariant {
    pub form: Option<String>,
    pub size_label: Option<String>,
    /// Grams parsed from an inline quantity token such as `"2 oz"`.
    pub weight_from_title: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct TokenClassifier {
    weights: WeightParser,
    forms: FormVocabulary,
}

impl TokenClassifier {
    #[must_use]
    pub fn new(weights: WeightParser, forms: FormVocabulary) -> Self {
        Self { weights, forms }
    }

    #[must_use]
    pub fn weights(&self) -> &WeightParser {
        &self.weights
    }

    /// Classifies tokens in order; the first token accepted for a field wins.
    ///
    /// Weight is tried first, and only until one is found. A token that fails
    /// the weight parse falls through to the form check and then becomes the
    /// size label if neither is set yet. Later tokens for a field that is
    /// already filled are ignored.
    #[must_use]
    pub fn classify<S: AsRef<str>>(&self, tokens: &[S]) -> ClassifiedVariant {
        let mut out = ClassifiedVariant::default();

        for token in tokens {
            let token = token.as_ref();

            if out.weight_from_title.is_none() {
                // A parsed zero is not a weight; let the token fall through.
                if let Some(grams) = self.weights.parse_token(token).filter(|g| *g > 0.0) {
                    out.weight_from_title = Some(grams);
                    continue;
                }
            }

            if out.form.is_none() && self.forms.contains(token) {
                out.form = Some(title_case(token));
                continue;
            }

            if out.size_label.is_none() && !token.is_empty() {
                out.size_label = Some(title_case(token));
            }
        }

        out
    }

    /// Splits `title` with [`split_title`] and classifies the tokens.
    #[must_use]
    pub fn classify_title(&self, title: &str) -> ClassifiedVariant {
        self.classify(&split_title(title))
    }
}

/// Splits a variant title on `" / "` or `", "`, trimming each piece and
/// dropping empties.
#[must_use]
pub fn split_title(title: &str) -> Vec<&str> {
    TITLE_SEPARATOR_RE
        .split(title)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the
/// rest: `"extra small"` → `"Extra Small"`, `"1/2 CUP"` → `"1/2 Cup"`.
#[must_use]
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
