//! Type Registry
//!
//! The closed catalog of node types a session recognizes. Loaded once and
//! never mutated afterwards; catalog order is preserved because the settings
//! panel lists types in that order and the fallback palette is assigned by
//! it.

use crate::TypeId;
use crate::color::{Color, palette_color};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One catalog entry as it appears on the wire or on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSpec {
    pub id: TypeId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl TypeSpec {
    pub fn new(id: impl Into<TypeId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// A catalog entry with its display color resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub id: TypeId,
    pub label: String,
    pub color: Color,
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to read type catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse type catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate type id {0} in catalog")]
    DuplicateType(TypeId),
}

/// Ordered, immutable set of recognized node types.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: Vec<TypeInfo>,
    by_id: HashMap<TypeId, usize>,
}

impl TypeRegistry {
    /// Builds a registry from catalog entries, resolving missing colors from
    /// the default palette by position.
    pub fn from_specs(specs: Vec<TypeSpec>) -> Result<Self, RegistryError> {
        let mut types = Vec::with_capacity(specs.len());
        let mut by_id = HashMap::with_capacity(specs.len());
        for (position, spec) in specs.into_iter().enumerate() {
            if by_id.contains_key(&spec.id) {
                return Err(RegistryError::DuplicateType(spec.id));
            }
            by_id.insert(spec.id.clone(), position);
            types.push(TypeInfo {
                color: spec.color.unwrap_or_else(|| palette_color(position)),
                id: spec.id,
                label: spec.label,
            });
        }
        Ok(Self { types, by_id })
    }

    /// Reads a JSON array of [`TypeSpec`] entries from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let raw = std::fs::read_to_string(path)?;
        let specs: Vec<TypeSpec> = serde_json::from_str(&raw)?;
        Self::from_specs(specs)
    }

    pub fn contains(&self, id: &TypeId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn get(&self, id: &TypeId) -> Option<&TypeInfo> {
        self.by_id.get(id).map(|&position| &self.types[position])
    }

    /// Position of a type in catalog order.
    pub fn index_of(&self, id: &TypeId) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Types in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
