use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::comment::Comment;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical dimensions embedded in a product. Width and height always travel
/// together; a size is replaced as a whole, never merged.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub image_url: String,
    pub name: String,
    pub count: i64,
    pub size: Size,
    pub weight: String,
    pub comments: Vec<Comment>,
}

/// A validated product that has not been assigned an id yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewProduct {
    pub image_url: String,
    pub name: String,
    pub count: i64,
    pub size: Size,
    pub weight: String,
}

/// Validated replacement values for an existing product. `None` leaves the
/// stored value untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductChanges {
    pub image_url: Option<String>,
    pub name: Option<String>,
    pub count: Option<i64>,
    pub size: Option<Size>,
    pub weight: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Product payload as supplied by a caller, used for both creation and
/// partial updates. Unknown fields such as `id` or `comments` are ignored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
}

impl From<Size> for SizeInput {
    fn from(size: Size) -> Self {
        Self { width: Some(size.width), height: Some(size.height) }
    }
}

impl From<NewProduct> for ProductInput {
    fn from(product: NewProduct) -> Self {
        Self {
            image_url: Some(product.image_url),
            name: Some(product.name),
            count: Some(product.count),
            size: Some(product.size.into()),
            weight: Some(product.weight),
        }
    }
}

impl ProductInput {
    /// Validates a creation payload. Every field is required and checked by
    /// presence and range, so `count: 0` and blank strings are rejected.
    pub fn into_new_product(self) -> Result<NewProduct, DomainError> {
        let missing = [
            ("imageUrl", self.image_url.is_none()),
            ("name", self.name.is_none()),
            ("count", self.count.is_none()),
            ("size", self.size.is_none()),
            ("weight", self.weight.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(DomainError::InvalidInput(format!(
                "missing product data: {}",
                missing.join(", ")
            )));
        }

        let changes = self.into_changes()?;
        match changes {
            ProductChanges {
                image_url: Some(image_url),
                name: Some(name),
                count: Some(count),
                size: Some(size),
                weight: Some(weight),
            } => Ok(NewProduct { image_url, name, count, size, weight }),
            _ => Err(DomainError::InvalidInput("missing product data".to_string())),
        }
    }

    /// Validates only the fields that were supplied.
    pub fn into_changes(self) -> Result<ProductChanges, DomainError> {
        Ok(ProductChanges {
            image_url: self.image_url.map(|value| required_text("imageUrl", value)).transpose()?,
            name: self.name.map(|value| required_text("name", value)).transpose()?,
            count: self.count.map(positive_count).transpose()?,
            size: self.size.map(complete_size).transpose()?,
            weight: self.weight.map(|value| required_text("weight", value)).transpose()?,
        })
    }
}

impl Product {
    pub fn from_new(id: ProductId, product: NewProduct) -> Self {
        Self {
            id,
            image_url: product.image_url,
            name: product.name,
            count: product.count,
            size: product.size,
            weight: product.weight,
            comments: Vec::new(),
        }
    }

    pub fn apply(&mut self, changes: ProductChanges) {
        if let Some(image_url) = changes.image_url {
            self.image_url = image_url;
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(count) = changes.count {
            self.count = count;
        }
        if let Some(size) = changes.size {
            self.size = size;
        }
        if let Some(weight) = changes.weight {
            self.weight = weight;
        }
    }
}

fn required_text(field: &str, value: String) -> Result<String, DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(value)
}

fn positive_count(count: i64) -> Result<i64, DomainError> {
    if count <= 0 {
        return Err(DomainError::InvalidInput("count must be a positive integer".to_string()));
    }
    Ok(count)
}

fn complete_size(size: SizeInput) -> Result<Size, DomainError> {
    let (Some(width), Some(height)) = (size.width, size.height) else {
        return Err(DomainError::InvalidInput(
            "size requires both width and height".to_string(),
        ));
    };

    for (field, value) in [("size.width", width), ("size.height", height)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(DomainError::InvalidInput(format!("{field} must be a positive number")));
        }
    }

    Ok(Size { width, height })
}
