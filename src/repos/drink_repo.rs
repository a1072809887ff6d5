/*
 * Responsibility
 * - drink の永続化インターフェース (DrinkRepo)
 * - Postgres 実装 (PgDrinkRepo)
 * - recipe は JSON 文字列として 1 カラムに保存する
 *
 * Table (migration はこのサービスでは実行しない)
 *   drink(id BIGSERIAL PRIMARY KEY, title VARCHAR(80) UNIQUE NOT NULL, recipe TEXT NOT NULL)
 */
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub color: String,
    pub name: String,
    pub parts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Drink store.
///
/// Listing is ordered by id ascending. `update`/`delete` report a missing id
/// as `Ok(None)`/`Ok(false)`, a duplicate title as `RepoError::Conflict`.
#[async_trait]
pub trait DrinkRepo: Send + Sync {
    async fn list(&self) -> Result<Vec<Drink>, RepoError>;

    async fn create(&self, title: &str, recipe: &[Ingredient]) -> Result<Drink, RepoError>;

    // None fields are left unchanged
    async fn update(
        &self,
        id: i64,
        title: Option<&str>,
        recipe: Option<&[Ingredient]>,
    ) -> Result<Option<Drink>, RepoError>;

    async fn delete(&self, id: i64) -> Result<bool, RepoError>;
}

#[derive(Debug, FromRow)]
struct DrinkRow {
    id: i64,
    title: String,
    recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = RepoError;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        let recipe = serde_json::from_str(&row.recipe).map_err(|source| {
            RepoError::CorruptRecipe {
                id: row.id,
                source,
            }
        })?;

        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe,
        })
    }
}

fn encode_recipe(recipe: &[Ingredient]) -> Result<String, RepoError> {
    serde_json::to_string(recipe).map_err(RepoError::EncodeRecipe)
}

#[derive(Clone, Debug)]
pub struct PgDrinkRepo {
    pool: PgPool,
}

impl PgDrinkRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DrinkRepo for PgDrinkRepo {
    async fn list(&self) -> Result<Vec<Drink>, RepoError> {
        let rows = sqlx::query_as::<_, DrinkRow>(
            r#"
            SELECT id, title, recipe
            FROM drink
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        rows.into_iter().map(Drink::try_from).collect()
    }

    async fn create(&self, title: &str, recipe: &[Ingredient]) -> Result<Drink, RepoError> {
        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            INSERT INTO drink (title, recipe)
            VALUES ($1, $2)
            RETURNING id, title, recipe
            "#,
        )
        .bind(title)
        .bind(encode_recipe(recipe)?)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        row.try_into()
    }

    async fn update(
        &self,
        id: i64,
        title: Option<&str>,
        recipe: Option<&[Ingredient]>,
    ) -> Result<Option<Drink>, RepoError> {
        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            UPDATE drink
            SET
                title = COALESCE($2, title),
                recipe = COALESCE($3, recipe)
            WHERE id = $1
            RETURNING id, title, recipe
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(recipe.map(encode_recipe).transpose()?)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        row.map(Drink::try_from).transpose()
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM drink
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(result.rows_affected() > 0)
    }
}
