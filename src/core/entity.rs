use crate::core::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Legal Entity Identifier of a trade counterparty.
///
/// # Examples
///
/// ```
/// use exposure_engine::core::entity::Lei;
///
/// let bnp = Lei::new("R0MUWSFPU8MPRO8K5P83");
/// let db = Lei::new("7LTWFZYICNSX8D621K86");
/// assert_ne!(bnp, db);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lei(String);

impl Lei {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Lei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Lei {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Lei {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One row of the reference registry: who an LEI belongs to and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntity {
    pub lei: Lei,
    pub name: String,
    pub country: String,
}

impl ReferenceEntity {
    pub fn new(lei: impl Into<Lei>, name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            lei: lei.into(),
            name: name.into(),
            country: country.into(),
        }
    }
}

/// The reference registry, keyed by LEI.
///
/// Keeps the entities in the order they were supplied; lookups go through
/// a hash index. An LEI may appear only once.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: Vec<ReferenceEntity>,
    by_lei: HashMap<Lei, usize>,
}

impl EntityRegistry {
    /// Build a registry, rejecting a repeated LEI.
    pub fn from_entities(entities: Vec<ReferenceEntity>) -> Result<Self> {
        let mut by_lei = HashMap::with_capacity(entities.len());
        for (pos, entity) in entities.iter().enumerate() {
            if by_lei.insert(entity.lei.clone(), pos).is_some() {
                return Err(PipelineError::schema(
                    "reference registry",
                    format!("duplicate key lei `{}`", entity.lei),
                ));
            }
        }
        Ok(Self { entities, by_lei })
    }

    pub fn get(&self, lei: &Lei) -> Option<&ReferenceEntity> {
        self.by_lei.get(lei).map(|&pos| &self.entities[pos])
    }

    pub fn entities(&self) -> &[ReferenceEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lei_equality() {
        assert_eq!(Lei::new("X"), Lei::from("X"));
        assert_ne!(Lei::new("X"), Lei::new("Y"));
        assert_eq!(format!("{}", Lei::new("X")), "X");
    }

    #[test]
    fn test_registry_lookup() {
        let registry = EntityRegistry::from_entities(vec![
            ReferenceEntity::new("X", "Alpha", "FR"),
            ReferenceEntity::new("Y", "Beta", "DE"),
            ReferenceEntity::new("Z", "Gamma", "FR"),
        ])
        .unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(&Lei::new("Y")).unwrap().name, "Beta");
        assert!(registry.get(&Lei::new("W")).is_none());
        assert_eq!(registry.entities()[2].country, "FR");
    }

    #[test]
    fn test_registry_rejects_duplicate_lei() {
        let result = EntityRegistry::from_entities(vec![
            ReferenceEntity::new("X", "Alpha", "FR"),
            ReferenceEntity::new("X", "Alpha bis", "FR"),
        ]);
        assert!(matches!(result, Err(PipelineError::Schema { .. })));
    }
}
