/*
 * Responsibility
 * - Drinks の request/response DTO
 * - short 表現 (公開一覧: color と parts のみ) / long 表現 (詳細: name を含む)
 */
use serde::{Deserialize, Serialize};

use crate::repos::{Drink, Ingredient};

const TITLE_MAX_LEN: usize = 80;

#[derive(Debug, Deserialize)]
pub struct IngredientInput {
    pub color: String,
    pub name: String,
    pub parts: u32,
}

impl IngredientInput {
    fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("ingredient name is required");
        }
        if self.color.trim().is_empty() {
            return Err("ingredient color is required");
        }
        if self.parts == 0 {
            return Err("ingredient parts must be positive");
        }
        Ok(())
    }

    fn into_ingredient(self) -> Ingredient {
        Ingredient {
            color: self.color,
            name: self.name,
            parts: self.parts,
        }
    }
}

fn validate_title(title: &str) -> Result<(), &'static str> {
    if title.trim().is_empty() {
        return Err("title is required");
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err("title must be <= 80 chars");
    }
    Ok(())
}

fn validate_recipe(recipe: &[IngredientInput]) -> Result<(), &'static str> {
    if recipe.is_empty() {
        return Err("recipe must have at least one ingredient");
    }
    recipe.iter().try_for_each(IngredientInput::validate)
}

#[derive(Debug, Deserialize)]
pub struct CreateDrinkRequest {
    pub title: String,
    pub recipe: Vec<IngredientInput>,
}

impl CreateDrinkRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_title(&self.title)?;
        validate_recipe(&self.recipe)
    }

    pub fn into_parts(self) -> (String, Vec<Ingredient>) {
        let recipe = self
            .recipe
            .into_iter()
            .map(IngredientInput::into_ingredient)
            .collect();
        (self.title, recipe)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateDrinkRequest {
    pub title: Option<String>,
    pub recipe: Option<Vec<IngredientInput>>,
}

impl UpdateDrinkRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(recipe) = &self.recipe {
            validate_recipe(recipe)?;
        }
        Ok(())
    }

    pub fn into_parts(self) -> (Option<String>, Option<Vec<Ingredient>>) {
        let recipe = self.recipe.map(|items| {
            items
                .into_iter()
                .map(IngredientInput::into_ingredient)
                .collect()
        });
        (self.title, recipe)
    }
}

#[derive(Debug, Serialize)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: u32,
}

#[derive(Debug, Serialize)]
pub struct ShortDrink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

impl From<Drink> for ShortDrink {
    fn from(d: Drink) -> Self {
        Self {
            id: d.id,
            title: d.title,
            recipe: d
                .recipe
                .into_iter()
                .map(|i| ShortIngredient {
                    color: i.color,
                    parts: i.parts,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LongDrink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl From<Drink> for LongDrink {
    fn from(d: Drink) -> Self {
        Self {
            id: d.id,
            title: d.title,
            recipe: d.recipe,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: Vec<T>,
}

impl<T: From<Drink>> DrinksResponse<T> {
    pub fn from_drinks(drinks: Vec<Drink>) -> Self {
        Self {
            success: true,
            drinks: drinks.into_iter().map(T::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn latte() -> Drink {
        Drink {
            id: 1,
            title: "latte".to_string(),
            recipe: vec![
                Ingredient {
                    color: "brown".to_string(),
                    name: "espresso".to_string(),
                    parts: 1,
                },
                Ingredient {
                    color: "white".to_string(),
                    name: "milk".to_string(),
                    parts: 3,
                },
            ],
        }
    }

    #[test]
    fn short_form_hides_ingredient_names() {
        let body = serde_json::to_value(DrinksResponse::<ShortDrink>::from_drinks(vec![latte()]))
            .unwrap();

        assert_eq!(
            body,
            json!({
                "success": true,
                "drinks": [{
                    "id": 1,
                    "title": "latte",
                    "recipe": [
                        { "color": "brown", "parts": 1 },
                        { "color": "white", "parts": 3 },
                    ],
                }],
            })
        );
    }

    #[test]
    fn long_form_keeps_everything() {
        let body =
            serde_json::to_value(DrinksResponse::<LongDrink>::from_drinks(vec![latte()])).unwrap();

        assert_eq!(body["drinks"][0]["recipe"][1]["name"], "milk");
    }

    #[test]
    fn create_request_validation() {
        let ok: CreateDrinkRequest = serde_json::from_value(json!({
            "title": "water",
            "recipe": [{ "color": "blue", "name": "water", "parts": 1 }],
        }))
        .unwrap();
        assert!(ok.validate().is_ok());

        let blank: CreateDrinkRequest =
            serde_json::from_value(json!({ "title": "  ", "recipe": [] })).unwrap();
        assert_eq!(blank.validate(), Err("title is required"));

        let long: CreateDrinkRequest = serde_json::from_value(json!({
            "title": "x".repeat(81),
            "recipe": [{ "color": "blue", "name": "water", "parts": 1 }],
        }))
        .unwrap();
        assert!(long.validate().is_err());

        let no_recipe: CreateDrinkRequest =
            serde_json::from_value(json!({ "title": "water", "recipe": [] })).unwrap();
        assert!(no_recipe.validate().is_err());
    }

    #[test]
    fn update_request_allows_partial_bodies() {
        let title_only: UpdateDrinkRequest =
            serde_json::from_value(json!({ "title": "water" })).unwrap();
        assert!(title_only.validate().is_ok());
        let (title, recipe) = title_only.into_parts();
        assert_eq!(title.as_deref(), Some("water"));
        assert!(recipe.is_none());

        let empty: UpdateDrinkRequest = serde_json::from_value(json!({})).unwrap();
        assert!(empty.validate().is_ok());

        let bad: UpdateDrinkRequest = serde_json::from_value(json!({
            "recipe": [{ "color": "blue", "name": "", "parts": 1 }],
        }))
        .unwrap();
        assert!(bad.validate().is_err());
    }
}
