use crate::working::NodeIndex;
use cartograph_core::{TypeId, TypeState};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Per-type visibility entry. The group reference is part of the variant, so
/// "grouped without a group node" is not representable and a type with no
/// group (fewer than two members) cannot leave `Show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeVisibility {
    /// No members survived ingestion.
    None,
    /// Real members are in the view; the group node (if any) is not.
    Show { group: Option<NodeIndex> },
    /// Neither members nor group are in the view.
    Hide { group: Option<NodeIndex> },
    /// The group node stands in for all members.
    Grouped { group: NodeIndex },
}

impl TypeVisibility {
    pub fn state(&self) -> TypeState {
        match self {
            TypeVisibility::None => TypeState::None,
            TypeVisibility::Show { .. } => TypeState::Show,
            TypeVisibility::Hide { .. } => TypeState::Hide,
            TypeVisibility::Grouped { .. } => TypeState::Grouped,
        }
    }

    pub fn group(&self) -> Option<NodeIndex> {
        match self {
            TypeVisibility::None => None,
            TypeVisibility::Show { group } | TypeVisibility::Hide { group } => *group,
            TypeVisibility::Grouped { group } => Some(*group),
        }
    }
}

/// User-controlled visibility for every registered type, plus the set of
/// types expanded for inline member listing in the settings panel.
///
/// Entries are written once at ingestion and then mutated only by explicit
/// user actions; a new fetch replaces the whole state.
#[derive(Debug, Clone, Default)]
pub struct VisibilityState {
    states: HashMap<TypeId, TypeVisibility>,
    expanded: HashSet<TypeId>,
}

impl VisibilityState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, type_id: TypeId, visibility: TypeVisibility) {
        self.states.insert(type_id, visibility);
    }

    /// The entry for a type; types never seen by ingestion read as `None`.
    pub fn visibility(&self, type_id: &TypeId) -> TypeVisibility {
        self.states
            .get(type_id)
            .copied()
            .unwrap_or(TypeVisibility::None)
    }

    pub fn state(&self, type_id: &TypeId) -> TypeState {
        self.visibility(type_id).state()
    }

    pub fn group_of(&self, type_id: &TypeId) -> Option<NodeIndex> {
        self.visibility(type_id).group()
    }

    pub fn has_group(&self, type_id: &TypeId) -> bool {
        self.group_of(type_id).is_some()
    }

    /// Applies a requested state change. Returns whether anything changed:
    /// repeating the current state is a no-op, and requests that the entry
    /// cannot satisfy (grouping a type without a group node, toggling a
    /// pinned type, requesting `none`) are rejected as no-ops.
    pub fn set_state(&mut self, type_id: &TypeId, requested: TypeState) -> bool {
        let Some(current) = self.states.get(type_id).copied() else {
            return false;
        };
        if requested == current.state() {
            return false;
        }
        let next = match (current, requested) {
            (TypeVisibility::Show { group: Some(g) }, TypeState::Hide) => {
                TypeVisibility::Hide { group: Some(g) }
            }
            (TypeVisibility::Show { group: Some(g) }, TypeState::Grouped) => {
                TypeVisibility::Grouped { group: g }
            }
            (TypeVisibility::Hide { group }, TypeState::Show) => TypeVisibility::Show { group },
            (TypeVisibility::Hide { group: Some(g) }, TypeState::Grouped) => {
                TypeVisibility::Grouped { group: g }
            }
            (TypeVisibility::Grouped { group }, TypeState::Show) => TypeVisibility::Show {
                group: Some(group),
            },
            (TypeVisibility::Grouped { group }, TypeState::Hide) => TypeVisibility::Hide {
                group: Some(group),
            },
            _ => {
                debug!(
                    "rejecting visibility change of {} to {} (current {})",
                    type_id,
                    requested,
                    current.state()
                );
                return false;
            }
        };
        self.states.insert(type_id.clone(), next);
        true
    }

    /// Flips a type's membership in the expanded set. Expansion is a panel
    /// concern only; it never affects the derived view graph.
    pub fn toggle_expanded(&mut self, type_id: &TypeId) -> bool {
        if self.expanded.remove(type_id) {
            false
        } else {
            self.expanded.insert(type_id.clone());
            true
        }
    }

    pub fn is_expanded(&self, type_id: &TypeId) -> bool {
        self.expanded.contains(type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> TypeId {
        TypeId::new("person")
    }

    fn grouped_state() -> VisibilityState {
        let mut state = VisibilityState::new();
        state.insert(person(), TypeVisibility::Grouped { group: NodeIndex(7) });
        state
    }

    #[test]
    fn test_set_state_is_idempotent() {
        let mut state = grouped_state();

        assert!(state.set_state(&person(), TypeState::Show));
        let after_first = state.visibility(&person());
        assert!(!state.set_state(&person(), TypeState::Show));
        assert_eq!(state.visibility(&person()), after_first);
    }

    #[test]
    fn test_group_reference_survives_round_trip() {
        let mut state = grouped_state();

        assert!(state.set_state(&person(), TypeState::Hide));
        assert_eq!(state.group_of(&person()), Some(NodeIndex(7)));
        assert!(state.set_state(&person(), TypeState::Grouped));
        assert_eq!(
            state.visibility(&person()),
            TypeVisibility::Grouped { group: NodeIndex(7) }
        );
    }

    #[test]
    fn test_rejects_grouping_without_group_node() {
        let mut state = VisibilityState::new();
        state.insert(person(), TypeVisibility::Show { group: None });

        assert!(!state.set_state(&person(), TypeState::Grouped));
        assert_eq!(state.state(&person()), TypeState::Show);
    }

    #[test]
    fn test_pinned_types_cannot_be_toggled() {
        let mut state = VisibilityState::new();
        state.insert(person(), TypeVisibility::Show { group: None });
        state.insert(TypeId::new("org"), TypeVisibility::None);

        assert!(!state.set_state(&person(), TypeState::Hide));
        assert!(!state.set_state(&TypeId::new("org"), TypeState::Show));
        assert!(!state.set_state(&TypeId::new("unknown"), TypeState::Show));
    }

    #[test]
    fn test_requesting_none_is_rejected() {
        let mut state = grouped_state();
        assert!(!state.set_state(&person(), TypeState::None));
        assert_eq!(state.state(&person()), TypeState::Grouped);
    }

    #[test]
    fn test_expansion_is_independent_of_visibility() {
        let mut state = grouped_state();

        assert!(state.toggle_expanded(&person()));
        assert!(state.is_expanded(&person()));
        assert_eq!(state.state(&person()), TypeState::Grouped);

        assert!(!state.toggle_expanded(&person()));
        assert!(!state.is_expanded(&person()));
    }
}
