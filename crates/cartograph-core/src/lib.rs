use serde::{Deserialize, Serialize};
use std::fmt;

pub mod color;
pub mod registry;

pub use color::{Color, ColorParseError, palette_color};
pub use registry::{RegistryError, TypeInfo, TypeRegistry, TypeSpec};

/// Identifier of an instance (a typed record) in the knowledge graph.
///
/// Ids are opaque strings minted by the backing service (UUIDs or IRIs);
/// they are stable across fetches of the same entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for InstanceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of a directed link between two instances.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub String);

impl LinkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LinkId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LinkId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of a type (schema) in the registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub String);

impl TypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TypeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Visibility of one type in the derived view.
///
/// `None` and single-member `Show` are pinned by member count at ingestion;
/// only types with two or more members can move between `Show`, `Hide` and
/// `Grouped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeState {
    /// No members survived ingestion; the type contributes nothing.
    None,
    /// Real member nodes are shown.
    Show,
    /// Neither members nor group are shown.
    Hide,
    /// Members are collapsed into the type's group node.
    Grouped,
}

impl fmt::Display for TypeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeState::None => "none",
            TypeState::Show => "show",
            TypeState::Hide => "hide",
            TypeState::Grouped => "grouped",
        };
        write!(f, "{name}")
    }
}

/// Renderer-stable identity of a node in the derived view: either a real
/// instance or the synthetic group node of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum NodeKey {
    Instance(InstanceId),
    Group(TypeId),
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Instance(id) => write!(f, "{id}"),
            NodeKey::Group(type_id) => write!(f, "group:{type_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_transparently() {
        let id = InstanceId::new("cccf1df0-5f51-4b07-b3b4");
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"cccf1df0-5f51-4b07-b3b4\""
        );
        let back: InstanceId = serde_json::from_str("\"cccf1df0-5f51-4b07-b3b4\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_type_state_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&TypeState::Grouped).unwrap(), "\"grouped\"");
        let back: TypeState = serde_json::from_str("\"hide\"").unwrap();
        assert_eq!(back, TypeState::Hide);
        assert_eq!(TypeState::None.to_string(), "none");
    }

    #[test]
    fn test_node_key_display() {
        assert_eq!(NodeKey::Instance(InstanceId::new("n1")).to_string(), "n1");
        assert_eq!(NodeKey::Group(TypeId::new("person")).to_string(), "group:person");
    }
}
