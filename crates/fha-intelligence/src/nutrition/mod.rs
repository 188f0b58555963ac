// ABOUTME: Deterministic keyword-driven meal estimator used when the remote analyzer is skipped or fails
// ABOUTME: Matches known foods, applies serving cues and portion factors, and writes an encouraging summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Local nutrition estimation
//!
//! Pure function of `(description, meal_type)`: no I/O, no randomness, no
//! clock. The result converts into the same [`MealAnalysis`] shape the remote
//! analyzer produces so callers never need to know which path ran.

/// Static food profiles and per-meal-type defaults
pub mod food_table;
/// Whole-word and substring keyword matching
pub mod matching;

pub use food_table::{FoodProfile, FOOD_TABLE};
pub use matching::{MatchMode, Phrase, PhraseSet};

use fha_core::constants::analysis::{
    LOCAL_ESTIMATE_CONFIDENCE, LOCAL_ESTIMATE_MEAL_ID, LOCAL_PROCESSING_LEVEL, LOCAL_SCORE_BOUNDS,
    LOCAL_SCORE_KCAL_PER_POINT,
};
use fha_core::models::{MealAnalysis, MealType, Nutrients};
use serde::{Deserialize, Serialize};

use food_table::{
    fallback_nutrients, portion_base, timing_message, COMPLEX_INDICATORS, LARGE_PORTION_FACTOR,
    LARGE_PORTION_WORDS, SIMPLE_INDICATORS, SMALL_PORTION_FACTOR, SMALL_PORTION_WORDS,
    UNUSUAL_INDICATORS, WEIGHT_CUES,
};

/// Energy at or above which a meal is "substantial nourishment"
const SUBSTANTIAL_KCAL: f64 = 400.0;
/// Energy at or above which a meal is "wonderful energy"
const WONDERFUL_KCAL: f64 = 250.0;
/// Matched food names quoted in the encouragement
const MAX_NAMED_FOODS: usize = 2;

/// How involved a meal description looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealComplexity {
    /// Common single food or basic combination, five words or fewer
    Simple,
    /// Neither simple nor complex
    Moderate,
    /// Preparation words or more than eight words
    Complex,
    /// Specialty ingredients or more than fifteen words
    Unusual,
}

impl MealComplexity {
    /// Lowercase label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
            Self::Unusual => "unusual",
        }
    }
}

/// Output of [`LocalEstimationEngine::estimate`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    /// Aggregate nutrients after serving cues and portion factor
    pub estimated_nutrition: Nutrients,
    /// Supportive message without numbers
    pub encouraging_message: String,
    /// Always `"local_estimate"`
    pub confidence: String,
    /// Table foods found in the description, in table order
    pub matched_foods: Vec<String>,
    /// `clamp(energy / 50, 6, 8)`, truncated
    pub score: u8,
}

impl EstimateResult {
    /// Convert to the shared analysis shape
    #[must_use]
    pub fn to_meal_analysis(&self) -> MealAnalysis {
        let n = &self.estimated_nutrition;
        MealAnalysis {
            meal_id: LOCAL_ESTIMATE_MEAL_ID.to_owned(),
            overall_score: self.score,
            overall_assessment: self.encouraging_message.clone(),
            key_nutrients: Vec::new(),
            positive_aspects: Vec::new(),
            areas_for_improvement: Vec::new(),
            nutritional_highlights: format!(
                "Estimated {:.0} kcal with {:.0}g protein, {:.0}g fat and {:.0}g carbohydrates",
                n.energy, n.protein, n.fat, n.carbs
            ),
            encouragement: self.encouraging_message.clone(),
            processing_level: LOCAL_PROCESSING_LEVEL.to_owned(),
            estimated_calories: Some(n.energy.max(0.0).round() as u32),
        }
    }
}

/// Keyword-driven estimator over the static food table
///
/// All patterns are compiled at construction, so one engine can be shared
/// across threads and reused for every request.
#[derive(Debug, Clone)]
pub struct LocalEstimationEngine {
    mode: MatchMode,
    foods: Vec<(&'static FoodProfile, Phrase)>,
    weight_cues: Vec<(PhraseSet, f64)>,
    large_portion: PhraseSet,
    small_portion: PhraseSet,
    simple: PhraseSet,
    complex: PhraseSet,
    unusual: PhraseSet,
}

impl Default for LocalEstimationEngine {
    fn default() -> Self {
        Self::new(MatchMode::default())
    }
}

impl LocalEstimationEngine {
    /// Compile the food table and cue lists for `mode`
    #[must_use]
    pub fn new(mode: MatchMode) -> Self {
        Self {
            mode,
            foods: FOOD_TABLE
                .iter()
                .map(|food| (food, Phrase::new(food.name, mode)))
                .collect(),
            weight_cues: WEIGHT_CUES
                .iter()
                .map(|(words, factor)| (PhraseSet::new(words, mode), *factor))
                .collect(),
            large_portion: PhraseSet::new(LARGE_PORTION_WORDS, mode),
            small_portion: PhraseSet::new(SMALL_PORTION_WORDS, mode),
            simple: PhraseSet::new(SIMPLE_INDICATORS, mode),
            complex: PhraseSet::new(COMPLEX_INDICATORS, mode),
            unusual: PhraseSet::new(UNUSUAL_INDICATORS, mode),
        }
    }

    /// Matching mode in use
    #[must_use]
    pub const fn match_mode(&self) -> MatchMode {
        self.mode
    }

    /// Estimate nutrients and write an encouraging message
    #[must_use]
    pub fn estimate(&self, description: &str, meal_type: &MealType) -> EstimateResult {
        let text = description.to_lowercase();
        let matched: Vec<&FoodProfile> = self
            .foods
            .iter()
            .filter(|(_, phrase)| phrase.is_in(&text))
            .map(|(food, _)| *food)
            .collect();

        let base = if matched.is_empty() {
            fallback_nutrients(meal_type)
        } else {
            let cue = self.weight_factor(&text);
            matched
                .iter()
                .map(|food| food.nutrients_for(food.default_weight_g * cue))
                .sum()
        };
        let estimated_nutrition = base.scaled(self.portion_multiplier(&text, meal_type));

        let matched_foods: Vec<String> = matched.iter().map(|f| f.name.to_owned()).collect();
        EstimateResult {
            encouraging_message: encouragement(
                estimated_nutrition.energy,
                meal_type,
                &matched_foods,
            ),
            score: local_score(estimated_nutrition.energy),
            confidence: LOCAL_ESTIMATE_CONFIDENCE.to_owned(),
            estimated_nutrition,
            matched_foods,
        }
    }

    /// Classify how involved a description is
    #[must_use]
    pub fn assess_complexity(&self, description: &str) -> MealComplexity {
        let text = description.to_lowercase();
        let word_count = text.split_whitespace().count();

        if self.unusual.any_in(&text) || word_count > 15 {
            MealComplexity::Unusual
        } else if self.complex.any_in(&text) || word_count > 8 {
            MealComplexity::Complex
        } else if self.simple.any_in(&text) && word_count <= 5 {
            MealComplexity::Simple
        } else {
            MealComplexity::Moderate
        }
    }

    /// Serving multiplier from the first matching cue, 1.0 if none
    fn weight_factor(&self, text: &str) -> f64 {
        self.weight_cues
            .iter()
            .find(|(words, _)| words.any_in(text))
            .map_or(1.0, |(_, factor)| *factor)
    }

    /// Meal-slot factor times the size adjective factor
    fn portion_multiplier(&self, text: &str, meal_type: &MealType) -> f64 {
        let base = portion_base(meal_type);
        if self.large_portion.any_in(text) {
            base * LARGE_PORTION_FACTOR
        } else if self.small_portion.any_in(text) {
            base * SMALL_PORTION_FACTOR
        } else {
            base
        }
    }
}

fn local_score(energy: f64) -> u8 {
    let (min, max) = LOCAL_SCORE_BOUNDS;
    let points = energy / LOCAL_SCORE_KCAL_PER_POINT;
    let points = if points.is_finite() { points } else { min };
    points.clamp(min, max).trunc() as u8
}

fn encouragement(energy: f64, meal_type: &MealType, matched_foods: &[String]) -> String {
    let energy_msg = if energy >= SUBSTANTIAL_KCAL {
        "substantial nourishment"
    } else if energy >= WONDERFUL_KCAL {
        "wonderful energy"
    } else {
        "gentle fuel"
    };

    let food_msg = if matched_foods.is_empty() {
        "This nourishing meal provides".to_owned()
    } else {
        let names: Vec<&str> = matched_foods
            .iter()
            .take(MAX_NAMED_FOODS)
            .map(String::as_str)
            .collect();
        format!("The {} in this meal provide", names.join(" and "))
    };

    format!(
        "{} {food_msg} {energy_msg} for your body's healing journey. Every bite is an act of self-care! ✨",
        timing_message(meal_type)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grilled_chicken_breast_lunch() {
        let engine = LocalEstimationEngine::default();
        let result = engine.estimate("grilled chicken breast", &MealType::Lunch);
        // 165 kcal * 1.5 servings * 1.2 lunch factor
        assert!((result.estimated_nutrition.energy - 297.0).abs() < 1e-9);
        assert_eq!(result.matched_foods, vec!["chicken breast".to_owned()]);
        assert_eq!(result.score, 6);
        assert_eq!(result.confidence, "local_estimate");
    }

    #[test]
    fn test_fallback_vector_when_nothing_matches() {
        let engine = LocalEstimationEngine::default();
        let result = engine.estimate("mystery stew", &MealType::Breakfast);
        assert!(result.matched_foods.is_empty());
        assert!((result.estimated_nutrition.energy - 350.0).abs() < f64::EPSILON);
        assert!(result
            .encouraging_message
            .starts_with("What a beautiful way to start your day! 🌅 This nourishing meal provides wonderful energy"));
    }

    #[test]
    fn test_portion_multiplier_applied_once() {
        let engine = LocalEstimationEngine::default();
        let one = engine.estimate("salmon and spinach", &MealType::Dinner);
        let large = engine.estimate("large salmon and spinach", &MealType::Dinner);
        let ratio = large.estimated_nutrition.energy / one.estimated_nutrition.energy;
        assert!((ratio - 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_weight_cue_priority() {
        let engine = LocalEstimationEngine::default();
        let plain = engine.estimate("eggs", &MealType::Breakfast);
        let two = engine.estimate("two eggs with a cup of coffee", &MealType::Breakfast);
        let ratio = two.estimated_nutrition.energy / plain.estimated_nutrition.energy;
        assert!((ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_word_boundary_differs_from_substring() {
        let words = LocalEstimationEngine::new(MatchMode::WordBoundary);
        let legacy = LocalEstimationEngine::new(MatchMode::Substring);
        let description = "glazed doughnuts";
        assert!(words.estimate(description, &MealType::Snack).matched_foods.is_empty());
        assert_eq!(
            legacy.estimate(description, &MealType::Snack).matched_foods,
            vec!["nuts".to_owned()]
        );
    }

    #[test]
    fn test_score_bounds() {
        assert_eq!(local_score(0.0), 6);
        assert_eq!(local_score(375.0), 7);
        assert_eq!(local_score(10_000.0), 8);
        assert_eq!(local_score(f64::NAN), 6);
    }

    #[test]
    fn test_complexity_rules() {
        let engine = LocalEstimationEngine::default();
        assert_eq!(engine.assess_complexity("banana"), MealComplexity::Simple);
        assert_eq!(engine.assess_complexity("leftover stew"), MealComplexity::Moderate);
        assert_eq!(
            engine.assess_complexity("salmon topped with herbs"),
            MealComplexity::Complex
        );
        assert_eq!(engine.assess_complexity("kimchi fried rice"), MealComplexity::Unusual);
    }

    #[test]
    fn test_meal_analysis_shape() {
        let engine = LocalEstimationEngine::default();
        let analysis = engine
            .estimate("banana", &MealType::Snack)
            .to_meal_analysis();
        assert_eq!(analysis.meal_id, "local_estimate");
        assert_eq!(analysis.processing_level, "whole_foods");
        assert!(analysis.key_nutrients.is_empty());
        assert!((6..=8).contains(&analysis.overall_score));
    }
}
