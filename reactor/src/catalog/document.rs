use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bail;
use crate::error::{ErrorKind, ReactorResult};

/// A record that can be kept in a [`crate::catalog::DocumentStore`].
///
/// Documents have no id until they are saved for the first time.
pub trait Document: Clone + Send + Sync + 'static {
    /// Returns the id assigned by the store, if any.
    fn id(&self) -> Option<&str>;

    /// Sets the id of the document.
    fn set_id(&mut self, id: String);
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<String>,
    pub name: String,
}

impl Category {
    /// Creates a new unsaved category.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

impl Document for Category {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Option<String>,
    pub name: String,
    pub price: f64,
    pub create_at: Option<DateTime<Utc>>,
    pub category: Option<Category>,
    pub photo: Option<String>,
}

impl Product {
    /// Creates a new unsaved product without category.
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            price,
            create_at: None,
            category: None,
            photo: None,
        }
    }

    /// Sets the category of the product.
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Returns the product with its name converted to upper case.
    pub fn with_upper_case_name(mut self) -> Self {
        self.name = self.name.to_uppercase();
        self
    }

    /// Checks the fields required for a product to be stored.
    ///
    /// Every violation is reported as one line of the error detail.
    pub fn validate(&self) -> ReactorResult<()> {
        let mut violations = Vec::new();

        if self.name.trim().is_empty() {
            violations.push("name: must not be empty".to_string());
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            violations.push(format!("price: must be positive, got {}", self.price));
        }
        match &self.category {
            None => violations.push("category: must be set".to_string()),
            Some(category) if category.name.trim().is_empty() => {
                violations.push("category.name: must not be empty".to_string())
            }
            Some(_) => {}
        }

        if !violations.is_empty() {
            bail!(
                ErrorKind::ValidationError,
                "Product is invalid",
                violations.join("\n")
            );
        }

        Ok(())
    }

    /// Stores the photo name derived from `unique_prefix` and the uploaded `filename`.
    ///
    /// Spaces, colons and backslashes are removed from the filename.
    pub fn assign_photo(&mut self, unique_prefix: &str, filename: &str) {
        let sanitized: String = filename
            .chars()
            .filter(|c| !matches!(c, ' ' | ':' | '\\'))
            .collect();

        self.photo = Some(format!("{unique_prefix}-{sanitized}"));
    }
}

impl Document for Product {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2})", self.name, self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_product_passes_validation() {
        let product = Product::new("Apple iPod", 46.89).with_category(Category::new("Electronic"));

        assert!(product.validate().is_ok());
    }

    #[test]
    fn every_violation_is_reported() {
        let product = Product::new("  ", -1.0);

        let err = product.validate().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ValidationError);
        let detail = err.detail().unwrap();
        assert_eq!(detail.lines().count(), 3);
        assert!(detail.contains("name"));
        assert!(detail.contains("price"));
        assert!(detail.contains("category"));
    }

    #[test]
    fn photo_name_is_sanitized() {
        let mut product = Product::new("Sony Notebook", 846.89);

        product.assign_photo("abc", "C:\\my photo.png");

        assert_eq!(product.photo.as_deref(), Some("abc-Cmyphoto.png"));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let product = Product::new("Bianchi Bicicleta", 70.89);

        let json = serde_json::to_value(&product).unwrap();

        assert!(json.get("createAt").is_some());
        assert_eq!(json["name"], "Bianchi Bicicleta");
    }
}
