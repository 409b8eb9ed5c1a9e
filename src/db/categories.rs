//! Category queries.

use super::Db;
use crate::error::{bail_typed, ErrorType};
use crate::model::Category;
use crate::Result;
use anyhow::Context;
use tracing::trace;

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    description: Option<String>,
    color: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category::reconstruct(row.id, row.name, row.description, row.color)
    }
}

/// Turns a unique constraint violation on `categories.name` into a `Validation` error.
fn map_unique_name(e: sqlx::Error, name: &str) -> crate::Error {
    let is_unique = e
        .as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false);
    if is_unique {
        crate::error::typed_error(
            ErrorType::Validation,
            format!("A category named '{name}' already exists"),
        )
    } else {
        crate::Error::new(e).context("Failed to write category")
    }
}

impl Db {
    /// Returns the category with the given ID, or `None` if there is no such category.
    pub(crate) async fn find_category(&self, id: &str) -> Result<Option<Category>> {
        trace!("find_category {id}");
        let row: Option<CategoryRow> =
            sqlx::query_as("SELECT id, name, description, color FROM categories WHERE id = ?")
                .bind(id)
                .fetch_optional(self.pool())
                .await
                .context("Failed to query category")?;
        Ok(row.map(Category::from))
    }

    /// Returns every category in alphabetical order by name.
    pub(crate) async fn find_all_categories(&self) -> Result<Vec<Category>> {
        let rows: Vec<CategoryRow> =
            sqlx::query_as("SELECT id, name, description, color FROM categories ORDER BY name")
                .fetch_all(self.pool())
                .await
                .context("Failed to query categories")?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Inserts a new category.
    ///
    /// # Errors
    /// - Returns a `Validation` error if a category with the same name already exists.
    pub(crate) async fn create_category(&self, category: &Category) -> Result<Category> {
        sqlx::query("INSERT INTO categories (id, name, description, color) VALUES (?, ?, ?, ?)")
            .bind(category.id())
            .bind(category.name())
            .bind(category.description())
            .bind(category.color())
            .execute(self.pool())
            .await
            .map_err(|e| map_unique_name(e, category.name()))?;
        Ok(category.clone())
    }

    /// Writes the fields of an existing category.
    ///
    /// # Errors
    /// - Returns a `NotFound` error if the category does not exist.
    /// - Returns a `Validation` error if another category already has the new name.
    pub(crate) async fn update_category(&self, category: &Category) -> Result<Category> {
        let result =
            sqlx::query("UPDATE categories SET name = ?, description = ?, color = ? WHERE id = ?")
                .bind(category.name())
                .bind(category.description())
                .bind(category.color())
                .bind(category.id())
                .execute(self.pool())
                .await
                .map_err(|e| map_unique_name(e, category.name()))?;
        if result.rows_affected() == 0 {
            bail_typed!(ErrorType::NotFound, "Category not found: {}", category.id());
        }
        Ok(category.clone())
    }

    /// Permanently removes a category.
    ///
    /// # Errors
    /// - Returns a `NotFound` error if the category does not exist.
    /// - Returns a `ReferentialIntegrity` error, naming how many expenses are in the way, if any
    ///   expense still references the category.
    pub(crate) async fn delete_category(&self, id: &str) -> Result<()> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let (references,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM expenses WHERE category_id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .context("Failed to count expenses in category")?;
        if references > 0 {
            bail_typed!(
                ErrorType::ReferentialIntegrity,
                "Cannot delete category {id}: {references} expense{} still reference{} it",
                if references == 1 { "" } else { "s" },
                if references == 1 { "s" } else { "" }
            );
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete category")?;
        if result.rows_affected() == 0 {
            bail_typed!(ErrorType::NotFound, "Category not found: {id}");
        }

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{error_type, ErrorType};
    use crate::model::{Category, DEFAULT_COLOR};
    use crate::test::{date, TestEnv};

    #[tokio::test]
    async fn test_create_and_find_category() {
        let env = TestEnv::new().await;
        let category = Category::create("Food", Some("Eating".to_string()), None).unwrap();

        env.db().create_category(&category).await.unwrap();

        let found = env.db().find_category(category.id()).await.unwrap().unwrap();
        assert_eq!(found, category);
        assert_eq!(found.color(), DEFAULT_COLOR);
        assert!(env.db().find_category("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_all_categories_alphabetical() {
        let env = TestEnv::new().await;
        env.insert_category("Travel").await;
        env.insert_category("Food").await;
        env.insert_category("Health").await;

        let names: Vec<String> = env
            .db()
            .find_all_categories()
            .await
            .unwrap()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["Food", "Health", "Travel"]);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let env = TestEnv::new().await;
        env.insert_category("Food").await;

        let duplicate = Category::create("Food", None, None).unwrap();
        let err = env.db().create_category(&duplicate).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_update_category() {
        let env = TestEnv::new().await;
        let mut category = env.insert_category("Food").await;
        category
            .update("Dining", None, Some("#abcdef".to_string()))
            .unwrap();

        env.db().update_category(&category).await.unwrap();

        let found = env.db().find_category(category.id()).await.unwrap().unwrap();
        assert_eq!(found, category);
    }

    #[tokio::test]
    async fn test_update_category_name_conflict() {
        let env = TestEnv::new().await;
        env.insert_category("Food").await;
        let mut travel = env.insert_category("Travel").await;
        travel.update("Food", None, None).unwrap();

        let err = env.db().update_category(&travel).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));
    }

    #[tokio::test]
    async fn test_update_missing_category() {
        let env = TestEnv::new().await;
        let category = Category::create("Unsaved", None, None).unwrap();
        let err = env.db().update_category(&category).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::NotFound));
    }

    #[tokio::test]
    async fn test_delete_category() {
        let env = TestEnv::new().await;
        let category = env.insert_category("Food").await;

        env.db().delete_category(category.id()).await.unwrap();
        assert!(env.db().find_category(category.id()).await.unwrap().is_none());

        let err = env.db().delete_category(category.id()).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::NotFound));
    }

    #[tokio::test]
    async fn test_delete_referenced_category_is_blocked() {
        let env = TestEnv::new().await;
        let food = env.insert_category("Food").await;
        env.insert_expense(food.id(), "Lunch", "12", date(2025, 3, 1))
            .await;
        env.insert_expense(food.id(), "Dinner", "30", date(2025, 3, 2))
            .await;

        let err = env.db().delete_category(food.id()).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::ReferentialIntegrity));
        assert!(
            err.to_string().contains("2 expenses still reference it"),
            "{err}"
        );
        assert!(env.db().find_category(food.id()).await.unwrap().is_some());
    }
}
