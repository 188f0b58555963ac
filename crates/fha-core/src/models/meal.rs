// ABOUTME: Meal analysis models shared by the remote analyzer, local estimator and router
// ABOUTME: MealType labels, analysis requests, macro-nutrient vectors and analysis results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// Meal slot of the day
///
/// Unknown labels are kept verbatim in [`MealType::Other`] so they still
/// produce distinct cache keys; they get generic defaults everywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MealType {
    /// Morning meal
    Breakfast,
    /// Midday meal
    Lunch,
    /// Evening meal
    Dinner,
    /// Anything between meals
    Snack,
    /// Any other label, lowercased
    Other(String),
}

impl MealType {
    /// Canonical lowercase label
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
            Self::Other(label) => label,
        }
    }
}

impl From<&str> for MealType {
    fn from(value: &str) -> Self {
        let label = value.trim().to_lowercase();
        match label.as_str() {
            "breakfast" => Self::Breakfast,
            "lunch" => Self::Lunch,
            "dinner" => Self::Dinner,
            "snack" => Self::Snack,
            _ => Self::Other(label),
        }
    }
}

impl From<String> for MealType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<MealType> for String {
    fn from(value: MealType) -> Self {
        value.as_str().to_owned()
    }
}

impl FromStr for MealType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to analyze one meal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealAnalysisRequest {
    /// Meal slot
    pub meal_type: MealType,
    /// Free-text description
    pub description: String,
    /// Optional photo, base64-encoded JPEG
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

impl MealAnalysisRequest {
    /// Create a text-only request
    #[must_use]
    pub fn new(meal_type: impl Into<MealType>, description: impl Into<String>) -> Self {
        Self {
            meal_type: meal_type.into(),
            description: description.into(),
            image_base64: None,
        }
    }

    /// Attach a base64-encoded image
    #[must_use]
    pub fn with_image(mut self, image_base64: impl Into<String>) -> Self {
        self.image_base64 = Some(image_base64.into());
        self
    }
}

/// Macro-nutrient totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    /// Energy (kcal)
    pub energy: f64,
    /// Protein (g)
    pub protein: f64,
    /// Fat (g)
    pub fat: f64,
    /// Carbohydrates (g)
    pub carbs: f64,
}

impl Nutrients {
    /// Create a nutrient vector
    #[must_use]
    pub const fn new(energy: f64, protein: f64, fat: f64, carbs: f64) -> Self {
        Self {
            energy,
            protein,
            fat,
            carbs,
        }
    }

    /// Every component multiplied by `factor`
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            energy: self.energy * factor,
            protein: self.protein * factor,
            fat: self.fat * factor,
            carbs: self.carbs * factor,
        }
    }
}

impl Add for Nutrients {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            energy: self.energy + rhs.energy,
            protein: self.protein + rhs.protein,
            fat: self.fat + rhs.fat,
            carbs: self.carbs + rhs.carbs,
        }
    }
}

impl Sum for Nutrients {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, n| acc + n)
    }
}

/// One nutrient called out by an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientInfo {
    /// Nutrient name
    pub name: String,
    /// Amount with unit, as free text
    pub amount: String,
    /// Percentage of daily value, when known
    #[serde(default)]
    pub daily_value_percentage: Option<f64>,
    /// "positive", "neutral" or "negative"
    pub health_impact: String,
}

/// One positive aspect or improvement area of a meal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthAspect {
    /// Short label
    pub aspect: String,
    /// "positive" or "negative"
    pub impact: String,
    /// Explanation
    pub explanation: String,
    /// "low", "moderate" or "high"
    pub severity: String,
}

/// Result of analyzing one meal, from either the remote service or the local estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealAnalysis {
    /// Identifier of the analysis
    pub meal_id: String,
    /// Overall score on a 1-10 scale
    pub overall_score: u8,
    /// One-paragraph assessment
    pub overall_assessment: String,
    /// Notable nutrients
    #[serde(default)]
    pub key_nutrients: Vec<NutrientInfo>,
    /// What the meal does well
    #[serde(default)]
    pub positive_aspects: Vec<HealthAspect>,
    /// What could be better
    #[serde(default)]
    pub areas_for_improvement: Vec<HealthAspect>,
    /// Summary of nutritional highlights
    pub nutritional_highlights: String,
    /// Supportive message for the user
    pub encouragement: String,
    /// "minimal", "moderate", "highly_processed" or "whole_foods"
    pub processing_level: String,
    /// Estimated energy (kcal)
    #[serde(default)]
    pub estimated_calories: Option<u32>,
}
