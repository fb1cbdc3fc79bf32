use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CategoryStatus {
    Approved,
    Pending,
    Rejected,
}

impl CategoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryStatus::Approved => "approved",
            CategoryStatus::Pending => "pending",
            CategoryStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for CategoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(CategoryStatus::Approved),
            "pending" => Ok(CategoryStatus::Pending),
            "rejected" => Ok(CategoryStatus::Rejected),
            other => Err(AppError::ValidationError(format!("Unknown category status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductCategory {
    pub id: i64,
    pub name: String,
    pub status: CategoryStatus,
    pub parent_category: Option<i64>,
    pub shop: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewCategory {
    pub name: String,
    #[serde(default = "default_status")]
    pub status: CategoryStatus,
    #[serde(default)]
    pub parent_category: Option<i64>,
    #[serde(default)]
    pub shop: Option<i64>,
}

fn default_status() -> CategoryStatus {
    CategoryStatus::Pending
}

/// How a path segment names a category. An `Id` that matches no row is
/// retried as a name, so all-digit names stay reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRef {
    Id(i64),
    Name(String),
}

impl CategoryRef {
    /// Only the canonical decimal form is an id; `"007"` stays a name.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(id) if id.to_string() == raw => CategoryRef::Id(id),
            _ => CategoryRef::Name(raw.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
struct CategoryNode {
    id: i64,
    parent: Option<usize>,
}

/// Arena of the whole category hierarchy, indexed by category id.
#[derive(Debug, Default)]
pub struct CategoryTree {
    nodes: Vec<CategoryNode>,
    index: HashMap<i64, usize>,
}

impl CategoryTree {
    /// Builds the arena and rejects dangling parents and cycles.
    pub fn build(categories: &[ProductCategory]) -> crate::errors::Result<Self> {
        let mut tree = CategoryTree::default();
        for category in categories {
            tree.index.insert(category.id, tree.nodes.len());
            tree.nodes.push(CategoryNode { id: category.id, parent: None });
        }

        for category in categories {
            if let Some(parent_id) = category.parent_category {
                let parent = *tree.index.get(&parent_id).ok_or_else(|| {
                    AppError::ValidationError(format!(
                        "Category {} references missing parent {}",
                        category.id, parent_id
                    ))
                })?;
                let slot = tree.index[&category.id];
                tree.nodes[slot].parent = Some(parent);
            }
        }

        for node in &tree.nodes {
            if tree.has_cycle_from(node.id) {
                return Err(AppError::ValidationError(format!(
                    "Category {} is part of a parent cycle",
                    node.id
                )));
            }
        }

        Ok(tree)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.index.contains_key(&id)
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: i64) -> Vec<i64> {
        let mut out = Vec::new();
        let mut current = self.index.get(&id).and_then(|&slot| self.nodes[slot].parent);
        while let Some(slot) = current {
            if out.len() > self.nodes.len() {
                break;
            }
            out.push(self.nodes[slot].id);
            current = self.nodes[slot].parent;
        }
        out
    }

    /// True when hanging `id` under `new_parent` would close a loop.
    pub fn would_create_cycle(&self, id: i64, new_parent: i64) -> bool {
        id == new_parent || self.ancestors(new_parent).contains(&id)
    }

    fn has_cycle_from(&self, id: i64) -> bool {
        let Some(&start) = self.index.get(&id) else {
            return false;
        };
        let mut current = self.nodes[start].parent;
        let mut steps = 0;
        while let Some(slot) = current {
            if slot == start || steps > self.nodes.len() {
                return true;
            }
            steps += 1;
            current = self.nodes[slot].parent;
        }
        false
    }
}
