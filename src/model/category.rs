use crate::error::{bail_typed, ErrorType};
use crate::model::generate_id;
use crate::Result;
use serde::{Deserialize, Serialize};

/// The color given to a category when none is supplied.
pub const DEFAULT_COLOR: &str = "#000000";

/// A named group of expenses, e.g. "Food" or "Transport".
///
/// Name uniqueness is enforced by the database, not here.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Category {
    id: String,
    name: String,
    description: Option<String>,
    color: String,
}

impl Category {
    /// Creates a new category with a freshly generated ID. A missing or blank `color` becomes
    /// `DEFAULT_COLOR`.
    ///
    /// # Errors
    /// - Returns a `Validation` error if `name` is blank.
    pub fn create<S>(name: S, description: Option<String>, color: Option<String>) -> Result<Self>
    where
        S: Into<String>,
    {
        let name = name.into();
        validate(&name)?;
        Ok(Self {
            id: generate_id(),
            name,
            description,
            color: color_or_default(color),
        })
    }

    /// Rebuilds a category from previously persisted values without validating them.
    pub fn reconstruct(
        id: String,
        name: String,
        description: Option<String>,
        color: String,
    ) -> Self {
        Self {
            id,
            name,
            description,
            color,
        }
    }

    /// Replaces the name, description and color, applying the same rules as `create`. If
    /// validation fails, the category is left unchanged.
    pub fn update<S>(
        &mut self,
        name: S,
        description: Option<String>,
        color: Option<String>,
    ) -> Result<()>
    where
        S: Into<String>,
    {
        let name = name.into();
        validate(&name)?;
        self.name = name;
        self.description = description;
        self.color = color_or_default(color);
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    /// Returns the plain, serializable form of this category.
    pub fn to_record(&self) -> CategoryRecord {
        CategoryRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            color: self.color.clone(),
        }
    }
}

fn validate(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail_typed!(ErrorType::Validation, "Category name cannot be empty");
    }
    Ok(())
}

fn color_or_default(color: Option<String>) -> String {
    match color {
        Some(color) if !color.trim().is_empty() => color,
        _ => DEFAULT_COLOR.to_string(),
    }
}

/// The plain record form of a `Category`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        Category::reconstruct(record.id, record.name, record.description, record.color)
    }
}
