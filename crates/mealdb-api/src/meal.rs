use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// TheMealDB numbers ingredient/measure slots 1..=20
pub const MAX_INGREDIENTS: usize = 20;

/// Envelope returned by `search.php` and `lookup.php`. `meals` is `null` when nothing matched.
#[derive(Debug, Deserialize)]
pub struct MealsResponse {
    pub meals: Option<Vec<Meal>>,
}

impl MealsResponse {
    pub fn into_meals(self) -> Vec<Meal> {
        self.meals.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub name: String,
    pub measure: Option<String>,
}

/// A single dish as served by the recipe API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawMeal")]
pub struct Meal {
    pub id: String,
    pub name: String,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
    pub area: Option<String>,
    pub instructions: Option<String>,
    pub tags: Vec<String>,
    pub youtube: Option<String>,
    pub source: Option<String>,
    pub ingredients: Vec<Ingredient>,
}

impl Meal {
    /// Instruction paragraphs with blank lines removed
    pub fn instruction_steps(&self) -> Vec<&str> {
        self.instructions
            .as_deref()
            .map(|text| {
                text.lines()
                    .map(str::trim)
                    .filter(|step| !step.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Path of the detail view for this meal
    pub fn detail_route(&self) -> String {
        detail_route(&self.id)
    }
}

pub fn detail_route(id: &str) -> String {
    format!("/recipe-details/{}", id)
}

/// Wire shape of a meal. Ingredient and measure slots are flat
/// `strIngredientN` / `strMeasureN` keys, collected through the flattened map.
#[derive(Deserialize)]
struct RawMeal {
    #[serde(rename = "idMeal")]
    id: String,
    #[serde(rename = "strMeal")]
    name: String,
    #[serde(rename = "strMealThumb", default)]
    thumbnail: Option<String>,
    #[serde(rename = "strCategory", default)]
    category: Option<String>,
    #[serde(rename = "strArea", default)]
    area: Option<String>,
    #[serde(rename = "strInstructions", default)]
    instructions: Option<String>,
    #[serde(rename = "strTags", default)]
    tags: Option<String>,
    #[serde(rename = "strYoutube", default)]
    youtube: Option<String>,
    #[serde(rename = "strSource", default)]
    source: Option<String>,
    #[serde(flatten)]
    rest: BTreeMap<String, Option<serde_json::Value>>,
}

impl RawMeal {
    fn slot(&self, prefix: &str, n: usize) -> Option<String> {
        match self.rest.get(&format!("{prefix}{n}")) {
            Some(Some(serde_json::Value::String(s))) => non_blank(Some(s.clone())),
            _ => None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl From<RawMeal> for Meal {
    fn from(raw: RawMeal) -> Self {
        let ingredients = (1..=MAX_INGREDIENTS)
            .filter_map(|n| {
                raw.slot("strIngredient", n).map(|name| Ingredient {
                    name,
                    measure: raw.slot("strMeasure", n),
                })
            })
            .collect();

        let tags = raw
            .tags
            .as_deref()
            .map(|t| {
                t.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Meal {
            id: raw.id,
            name: raw.name,
            thumbnail: non_blank(raw.thumbnail),
            category: non_blank(raw.category),
            area: non_blank(raw.area),
            instructions: raw.instructions,
            tags,
            youtube: non_blank(raw.youtube),
            source: non_blank(raw.source),
            ingredients,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn arrabiata() -> Meal {
        let response: MealsResponse = serde_json::from_str(ARRABIATA_JSON).unwrap();
        response.into_meals().remove(0)
    }

    pub(crate) const ARRABIATA_JSON: &str = r#"{
        "meals": [{
            "idMeal": "52771",
            "strMeal": "Spicy Arrabiata Penne",
            "strDrinkAlternate": null,
            "strCategory": "Vegetarian",
            "strArea": "Italian",
            "strInstructions": "Bring a large pot of water to a boil.\r\n\r\nAdd the penne.\r\n  \r\nServe.",
            "strMealThumb": "https://www.themealdb.com/images/media/meals/ustsqw1468250014.jpg",
            "strTags": "Pasta,Curry",
            "strYoutube": "https://www.youtube.com/watch?v=1IszT_guI08",
            "strIngredient1": "penne rigate",
            "strIngredient2": "olive oil",
            "strIngredient3": "",
            "strIngredient4": null,
            "strIngredient5": "basil",
            "strMeasure1": "1 pound",
            "strMeasure2": "1/4 cup",
            "strMeasure3": "",
            "strMeasure4": null,
            "strMeasure5": " ",
            "strSource": null,
            "strImageSource": null,
            "dateModified": null
        }]
    }"#;

    #[test]
    fn test_parse_meal_fields() {
        let response: MealsResponse = serde_json::from_str(ARRABIATA_JSON).unwrap();
        let meals = response.into_meals();
        assert_eq!(meals.len(), 1);

        let meal = &meals[0];
        assert_eq!(meal.id, "52771");
        assert_eq!(meal.name, "Spicy Arrabiata Penne");
        assert_eq!(meal.category.as_deref(), Some("Vegetarian"));
        assert_eq!(meal.area.as_deref(), Some("Italian"));
        assert_eq!(meal.tags, vec!["Pasta", "Curry"]);
        assert_eq!(meal.source, None);
        assert_eq!(meal.detail_route(), "/recipe-details/52771");
    }

    #[test]
    fn test_parse_ingredients_skips_blank_slots() {
        let meal = arrabiata();
        assert_eq!(
            meal.ingredients,
            vec![
                Ingredient {
                    name: "penne rigate".to_string(),
                    measure: Some("1 pound".to_string()),
                },
                Ingredient {
                    name: "olive oil".to_string(),
                    measure: Some("1/4 cup".to_string()),
                },
                Ingredient {
                    name: "basil".to_string(),
                    measure: None,
                },
            ]
        );
    }

    #[test]
    fn test_instruction_steps() {
        let meal = arrabiata();
        assert_eq!(
            meal.instruction_steps(),
            vec![
                "Bring a large pot of water to a boil.",
                "Add the penne.",
                "Serve."
            ]
        );
    }

    #[test]
    fn test_null_meals_is_empty() {
        let response: MealsResponse = serde_json::from_str(r#"{"meals": null}"#).unwrap();
        assert!(response.into_meals().is_empty());
    }
}
