//! In-memory `DrinkRepo`, used when no `DATABASE_URL` is configured.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repos::drink_repo::{Drink, DrinkRepo, Ingredient};
use crate::repos::error::RepoError;

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    drinks: BTreeMap<i64, Drink>,
}

impl Inner {
    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.drinks
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }
}

#[derive(Debug, Default)]
pub struct MemoryDrinkRepo {
    inner: RwLock<Inner>,
}

impl MemoryDrinkRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DrinkRepo for MemoryDrinkRepo {
    async fn list(&self) -> Result<Vec<Drink>, RepoError> {
        let inner = self.inner.read().await;
        Ok(inner.drinks.values().cloned().collect())
    }

    async fn create(&self, title: &str, recipe: &[Ingredient]) -> Result<Drink, RepoError> {
        let mut inner = self.inner.write().await;
        if inner.title_taken(title, None) {
            return Err(RepoError::Conflict);
        }

        inner.next_id += 1;
        let drink = Drink {
            id: inner.next_id,
            title: title.to_string(),
            recipe: recipe.to_vec(),
        };
        inner.drinks.insert(drink.id, drink.clone());

        Ok(drink)
    }

    async fn update(
        &self,
        id: i64,
        title: Option<&str>,
        recipe: Option<&[Ingredient]>,
    ) -> Result<Option<Drink>, RepoError> {
        let mut inner = self.inner.write().await;
        if !inner.drinks.contains_key(&id) {
            return Ok(None);
        }
        if let Some(title) = title
            && inner.title_taken(title, Some(id))
        {
            return Err(RepoError::Conflict);
        }

        let Some(drink) = inner.drinks.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = title {
            drink.title = title.to_string();
        }
        if let Some(recipe) = recipe {
            drink.recipe = recipe.to_vec();
        }

        Ok(Some(drink.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let mut inner = self.inner.write().await;
        Ok(inner.drinks.remove(&id).is_some())
    }
}
