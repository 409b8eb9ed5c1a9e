//! Category command handlers.

use crate::args::{CreateCategoryArgs, IdArgs, UpdateCategoryArgs};
use crate::commands::Out;
use crate::error::{bail_typed, ErrorType, IntoResult};
use crate::model::{Category, CategoryRecord};
use crate::{Config, Result};
use tracing::info;

/// Lists every category in alphabetical order by name.
pub async fn list_categories(config: Config) -> Result<Out<Vec<CategoryRecord>>> {
    let categories = config
        .db()
        .find_all_categories()
        .await
        .pub_result(ErrorType::Database)?;
    let records: Vec<CategoryRecord> = categories.iter().map(Category::to_record).collect();
    let message = match records.len() {
        1 => "Found 1 category".to_string(),
        n => format!("Found {n} categories"),
    };
    Ok(Out::new(message, records))
}

/// Returns a single category.
///
/// # Errors
/// - Returns a `NotFound` error if there is no category with the given ID.
pub async fn get_category(config: Config, args: IdArgs) -> Result<Out<CategoryRecord>> {
    let category = find_existing(&config, &args.id).await?;
    Ok(Out::new(
        format!("Category {}: {}", category.id(), category.name()),
        category.to_record(),
    ))
}

/// Creates a new category. A unique ID is generated and returned as part of the stored record.
///
/// # Errors
/// - Returns a `Validation` error if the name is blank or another category already has it.
/// - Returns a `Database` error if the insert fails.
pub async fn create_category(
    config: Config,
    args: CreateCategoryArgs,
) -> Result<Out<CategoryRecord>> {
    let category = Category::create(args.name, args.description, args.color)?;
    let category = config
        .db()
        .create_category(&category)
        .await
        .pub_result(ErrorType::Database)?;

    info!("Created category {} '{}'", category.id(), category.name());
    Ok(Out::new(
        format!("Created category with ID: {}", category.id()),
        category.to_record(),
    ))
}

/// Changes the fields of an existing category. Fields that are not given keep their current
/// values. An empty `description` removes the description and an empty `color` resets the color
/// to the default.
///
/// # Errors
/// - Returns a `NotFound` error if there is no category with the given ID.
/// - Returns a `Validation` error if the new name is blank or another category already has it.
/// - Returns a `Database` error if the update fails.
pub async fn update_category(
    config: Config,
    args: UpdateCategoryArgs,
) -> Result<Out<CategoryRecord>> {
    let mut category = find_existing(&config, &args.id).await?;

    let name = args.name.unwrap_or_else(|| category.name().to_string());
    let description = match args.description {
        Some(d) if d.trim().is_empty() => None,
        Some(d) => Some(d),
        None => category.description().map(str::to_string),
    };
    let color = args.color.or_else(|| Some(category.color().to_string()));
    category.update(name, description, color)?;

    let category = config
        .db()
        .update_category(&category)
        .await
        .pub_result(ErrorType::Database)?;

    info!("Updated category {}", category.id());
    Ok(Out::new(
        format!("Updated category with ID: {}", category.id()),
        category.to_record(),
    ))
}

/// Permanently deletes a category and returns its ID. A category cannot be deleted while any
/// expense still belongs to it.
///
/// # Errors
/// - Returns a `NotFound` error if there is no category with the given ID.
/// - Returns a `ReferentialIntegrity` error if expenses still reference the category.
/// - Returns a `Database` error if the delete fails.
pub async fn delete_category(config: Config, args: IdArgs) -> Result<Out<String>> {
    config
        .db()
        .delete_category(&args.id)
        .await
        .pub_result(ErrorType::Database)?;

    info!("Deleted category {}", args.id);
    Ok(Out::new(
        format!("Deleted category with ID: {}", args.id),
        args.id,
    ))
}

async fn find_existing(config: &Config, id: &str) -> Result<Category> {
    match config
        .db()
        .find_category(id)
        .await
        .pub_result(ErrorType::Database)?
    {
        Some(category) => Ok(category),
        None => bail_typed!(ErrorType::NotFound, "Category not found: {id}"),
    }
}
