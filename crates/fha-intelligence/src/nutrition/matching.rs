// ABOUTME: Keyword matching for the local estimator with whole-word or legacy substring semantics
// ABOUTME: Word-boundary patterns are compiled once per phrase with the regex crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::str::FromStr;

use fha_core::errors::AppError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How a keyword is located inside a meal description
///
/// `Substring` reproduces the historical behavior where "nuts" also matches
/// "doughnuts" and "2" matches "120g". `WordBoundary` only accepts whole words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Whole words only
    #[default]
    WordBoundary,
    /// Raw substring containment
    Substring,
}

impl MatchMode {
    /// Configuration label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WordBoundary => "word",
            Self::Substring => "substring",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "word" | "word_boundary" | "words" => Ok(Self::WordBoundary),
            "substring" | "legacy" => Ok(Self::Substring),
            other => Err(AppError::invalid_input(format!(
                "unknown match mode '{other}', expected 'word' or 'substring'"
            ))),
        }
    }
}

/// A keyword compiled for one [`MatchMode`]
#[derive(Debug, Clone)]
pub struct Phrase {
    text: &'static str,
    pattern: Option<Regex>,
}

impl Phrase {
    /// Compile `text` for the given mode
    #[must_use]
    pub fn new(text: &'static str, mode: MatchMode) -> Self {
        let pattern = match mode {
            MatchMode::Substring => None,
            MatchMode::WordBoundary => {
                match Regex::new(&format!(r"\b{}\b", regex::escape(text))) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        warn!(phrase = text, error = %e, "Falling back to substring match");
                        None
                    }
                }
            }
        };
        Self { text, pattern }
    }

    /// The keyword itself
    #[must_use]
    pub const fn text(&self) -> &'static str {
        self.text
    }

    /// Whether the keyword occurs in `haystack` (expected lowercase)
    #[must_use]
    pub fn is_in(&self, haystack: &str) -> bool {
        self.pattern
            .as_ref()
            .map_or_else(|| haystack.contains(self.text), |re| re.is_match(haystack))
    }
}

/// Several keywords compiled together
#[derive(Debug, Clone)]
pub struct PhraseSet {
    phrases: Vec<Phrase>,
}

impl PhraseSet {
    /// Compile every keyword for `mode`
    #[must_use]
    pub fn new(words: &[&'static str], mode: MatchMode) -> Self {
        Self {
            phrases: words.iter().map(|w| Phrase::new(w, mode)).collect(),
        }
    }

    /// Whether any keyword occurs in `haystack`
    #[must_use]
    pub fn any_in(&self, haystack: &str) -> bool {
        self.phrases.iter().any(|p| p.is_in(haystack))
    }
}
