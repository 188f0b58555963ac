// ABOUTME: Static per-100g nutrient profiles and default servings for the local estimator
// ABOUTME: Also holds the per-meal-type fallback vectors, portion factors and timing messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use fha_core::models::{MealType, Nutrients};

/// One recognizable food
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodProfile {
    /// Lowercase name matched against descriptions
    pub name: &'static str,
    /// Nutrients per 100 g
    pub per_100g: Nutrients,
    /// Typical serving weight (g)
    pub default_weight_g: f64,
}

impl FoodProfile {
    const fn new(
        name: &'static str,
        energy: f64,
        protein: f64,
        fat: f64,
        carbs: f64,
        default_weight_g: f64,
    ) -> Self {
        Self {
            name,
            per_100g: Nutrients::new(energy, protein, fat, carbs),
            default_weight_g,
        }
    }

    /// Nutrients for `weight_g` grams of this food
    #[must_use]
    pub fn nutrients_for(&self, weight_g: f64) -> Nutrients {
        self.per_100g.scaled(weight_g / 100.0)
    }
}

/// Recognized foods, in match order
pub static FOOD_TABLE: [FoodProfile; 17] = [
    // Proteins
    FoodProfile::new("eggs", 155.0, 13.0, 11.0, 1.0, 50.0),
    FoodProfile::new("chicken breast", 165.0, 31.0, 3.6, 0.0, 150.0),
    FoodProfile::new("salmon", 208.0, 25.0, 12.0, 0.0, 120.0),
    FoodProfile::new("tofu", 144.0, 17.0, 9.0, 3.0, 100.0),
    FoodProfile::new("greek yogurt", 97.0, 10.0, 5.0, 4.0, 150.0),
    // Fats
    FoodProfile::new("avocado", 160.0, 2.0, 15.0, 9.0, 150.0),
    FoodProfile::new("olive oil", 884.0, 0.0, 100.0, 0.0, 15.0),
    FoodProfile::new("nuts", 607.0, 15.0, 54.0, 7.0, 30.0),
    FoodProfile::new("nut butter", 588.0, 25.0, 50.0, 8.0, 20.0),
    // Grains and starches
    FoodProfile::new("quinoa", 368.0, 14.0, 6.0, 64.0, 80.0),
    FoodProfile::new("oats", 389.0, 17.0, 7.0, 66.0, 40.0),
    FoodProfile::new("sweet potato", 86.0, 2.0, 0.1, 20.0, 150.0),
    FoodProfile::new("brown rice", 123.0, 2.6, 0.9, 23.0, 80.0),
    // Fruits and vegetables
    FoodProfile::new("banana", 89.0, 1.1, 0.3, 23.0, 120.0),
    FoodProfile::new("apple", 52.0, 0.3, 0.2, 14.0, 150.0),
    FoodProfile::new("spinach", 23.0, 2.9, 0.4, 3.6, 100.0),
    FoodProfile::new("broccoli", 34.0, 2.8, 0.4, 7.0, 100.0),
];

/// Conservative nutrients when no food is recognized; unknown types use lunch
#[must_use]
pub const fn fallback_nutrients(meal_type: &MealType) -> Nutrients {
    match meal_type {
        MealType::Breakfast => Nutrients::new(350.0, 15.0, 12.0, 45.0),
        MealType::Dinner => Nutrients::new(500.0, 25.0, 18.0, 60.0),
        MealType::Snack => Nutrients::new(200.0, 8.0, 8.0, 25.0),
        MealType::Lunch | MealType::Other(_) => Nutrients::new(450.0, 20.0, 15.0, 55.0),
    }
}

/// Base portion factor for the meal slot
#[must_use]
pub const fn portion_base(meal_type: &MealType) -> f64 {
    match meal_type {
        MealType::Lunch => 1.2,
        MealType::Dinner => 1.3,
        MealType::Snack => 0.6,
        MealType::Breakfast | MealType::Other(_) => 1.0,
    }
}

/// Opening line of the encouragement message
#[must_use]
pub const fn timing_message(meal_type: &MealType) -> &'static str {
    match meal_type {
        MealType::Breakfast => "What a beautiful way to start your day! 🌅",
        MealType::Lunch => "Perfect midday nourishment! ☀️",
        MealType::Dinner => "Lovely evening fuel for recovery! 🌙",
        MealType::Snack => "Sweet little boost of energy! 🌱",
        MealType::Other(_) => "Wonderful nourishing choice! 🌸",
    }
}

/// Words that scale the whole portion up
pub const LARGE_PORTION_WORDS: &[&str] =
    &["large", "big", "huge", "generous", "hearty", "full plate"];

/// Words that scale the whole portion down
pub const SMALL_PORTION_WORDS: &[&str] = &["small", "little", "light", "mini", "snack size"];

/// Multiplier for [`LARGE_PORTION_WORDS`]
pub const LARGE_PORTION_FACTOR: f64 = 1.4;

/// Multiplier for [`SMALL_PORTION_WORDS`]
pub const SMALL_PORTION_FACTOR: f64 = 0.7;

/// Serving-weight cues, checked in order; the first hit wins
pub const WEIGHT_CUES: &[(&[&str], f64)] = &[
    (&["2", "two"], 2.0),
    (&["3", "three"], 3.0),
    (&["cup"], 1.2),
    (&["tbsp", "tablespoon"], 0.3),
];

/// Dishes common enough that the local estimate is reasonable
pub const SIMPLE_INDICATORS: &[&str] = &[
    "toast", "banana", "apple", "yogurt", "cereal", "oatmeal", "sandwich", "salad", "soup",
    "pasta", "rice", "chicken", "eggs", "smoothie", "milk", "bread", "cheese",
];

/// Preparation words suggesting several ingredients
pub const COMPLEX_INDICATORS: &[&str] = &[
    "recipe",
    "homemade",
    "marinade",
    "sauce",
    "seasoned with",
    "cooked in",
    "topped with",
    "stuffed",
    "layered",
    "mixed with",
    "garnished",
    "drizzled",
    "sautéed",
    "roasted",
    "grilled",
];

/// Specialty ingredients the food table knows little about
pub const UNUSUAL_INDICATORS: &[&str] = &[
    "quinoa",
    "kale",
    "chia",
    "tempeh",
    "kimchi",
    "miso",
    "tahini",
    "nutritional yeast",
    "spirulina",
    "matcha",
    "turmeric",
    "goji",
    "acai",
    "kombucha",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_unique_names() {
        for (i, food) in FOOD_TABLE.iter().enumerate() {
            assert!(FOOD_TABLE[i + 1..].iter().all(|other| other.name != food.name));
        }
    }

    #[test]
    fn test_chicken_breast_serving() {
        let chicken = FOOD_TABLE.iter().find(|food| food.name == "chicken breast");
        let energy = chicken.map(|c| c.nutrients_for(c.default_weight_g).energy);
        assert!(energy.is_some_and(|e| (e - 247.5).abs() < 1e-9));
    }

    #[test]
    fn test_unknown_meal_type_uses_generic_defaults() {
        let other = MealType::from("brunch");
        assert_eq!(fallback_nutrients(&other), fallback_nutrients(&MealType::Lunch));
        assert!((portion_base(&other) - 1.0).abs() < f64::EPSILON);
        assert_eq!(timing_message(&other), "Wonderful nourishing choice! 🌸");
    }
}
