use crate::store::GraphStore;
use cartograph_core::NodeKey;
use cartograph_events::{Event, EventBus, EventListener};
use parking_lot::RwLock;
use std::sync::Arc;

/// Applies inbound user events to the store and answers with engine events
/// on the same bus.
///
/// Engine output events pass through unhandled, so the controller can sit on
/// a shared bus next to other listeners.
pub struct GraphController {
    store: Arc<RwLock<GraphStore>>,
    events: EventBus,
}

impl GraphController {
    pub fn new(store: Arc<RwLock<GraphStore>>, events: EventBus) -> Self {
        Self { store, events }
    }
}

impl EventListener for GraphController {
    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::NodeClicked { node } => match node {
                NodeKey::Group(_) => {
                    let mut store = self.store.write();
                    if store.explode_node(node) {
                        let revision = store.revision();
                        drop(store);
                        self.events.publish(Event::ViewChanged { revision });
                    }
                }
                NodeKey::Instance(instance) => {
                    let store = self.store.read();
                    let is_root = store.root_id() == Some(instance);
                    drop(store);
                    // Clicking the root again would refetch the same graph.
                    if !is_root {
                        self.events.publish(Event::NavigationRequested {
                            instance: instance.clone(),
                        });
                    }
                }
            },
            Event::NodeHovered { node } => {
                self.store.write().set_highlight(node.as_ref());
            }
            Event::TypeStateChangeRequested { type_id, state } => {
                let mut store = self.store.write();
                if store.set_type_state(type_id, *state) {
                    let revision = store.revision();
                    drop(store);
                    self.events.publish(Event::ViewChanged { revision });
                }
            }
            Event::TypeExpansionToggled { type_id } => {
                let mut store = self.store.write();
                if store.toggle_expanded(type_id).is_some() {
                    let revision = store.revision();
                    drop(store);
                    self.events.publish(Event::ViewChanged { revision });
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartograph_client::RawGraph;
    use cartograph_core::{InstanceId, TypeId, TypeRegistry, TypeSpec, TypeState};

    fn loaded_store() -> GraphStore {
        let registry = TypeRegistry::from_specs(vec![
            TypeSpec::new("person", "Person"),
            TypeSpec::new("dataset", "Dataset"),
        ])
        .unwrap();
        let raw = RawGraph::from_json(
            r#"{
                "nodes": [
                    {"id": "n1", "type": "person", "name": "Ada"},
                    {"id": "n2", "type": "person", "name": "Grace"},
                    {"id": "n3", "type": "dataset", "name": "Census"}
                ],
                "edges": [
                    {"id": "e1", "source": "n1", "target": "n3"}
                ]
            }"#,
        )
        .unwrap();
        let mut store = GraphStore::new(registry);
        let root = InstanceId::new("n3");
        let ticket = store.begin_fetch(root.clone());
        store.apply_fetch(ticket, &root, &raw);
        store
    }

    fn harness() -> (GraphController, Arc<RwLock<GraphStore>>, EventBus) {
        let store = Arc::new(RwLock::new(loaded_store()));
        let events = EventBus::new();
        let controller = GraphController::new(Arc::clone(&store), events.clone());
        (controller, store, events)
    }

    /// Forwards to the controller while keeping a transcript of everything
    /// that crossed the bus, engine answers included.
    struct Transcript {
        controller: GraphController,
        seen: Vec<Event>,
    }

    impl EventListener for Transcript {
        fn handle_event(&mut self, event: &Event) {
            self.seen.push(event.clone());
            self.controller.handle_event(event);
        }
    }

    #[test]
    fn test_group_click_explodes_the_type() {
        let (controller, store, events) = harness();
        let mut transcript = Transcript {
            controller,
            seen: Vec::new(),
        };

        events.publish(Event::NodeClicked {
            node: NodeKey::Group(TypeId::new("person")),
        });
        events.dispatch_to(&mut transcript);

        let store = store.read();
        assert_eq!(store.view().node_count(), 3);
        assert!(
            transcript
                .seen
                .iter()
                .any(|event| matches!(event, Event::ViewChanged { .. }))
        );
    }

    #[test]
    fn test_instance_click_requests_navigation() {
        let (controller, _store, events) = harness();
        let mut transcript = Transcript {
            controller,
            seen: Vec::new(),
        };

        events.publish(Event::NodeClicked {
            node: NodeKey::Instance(InstanceId::new("n1")),
        });
        events.dispatch_to(&mut transcript);

        assert!(transcript.seen.iter().any(|event| matches!(
            event,
            Event::NavigationRequested { instance } if *instance == InstanceId::new("n1")
        )));
    }

    #[test]
    fn test_root_click_is_ignored() {
        let (controller, _store, events) = harness();
        let mut transcript = Transcript {
            controller,
            seen: Vec::new(),
        };

        events.publish(Event::NodeClicked {
            node: NodeKey::Instance(InstanceId::new("n3")),
        });
        events.dispatch_to(&mut transcript);

        assert_eq!(transcript.seen.len(), 1);
    }

    #[test]
    fn test_hover_moves_the_highlight_silently() {
        let (mut controller, store, events) = harness();

        events.publish(Event::NodeHovered {
            node: Some(NodeKey::Instance(InstanceId::new("n1"))),
        });
        events.dispatch_to(&mut controller);

        {
            let store = store.read();
            assert_eq!(
                store.focus_key(),
                Some(&NodeKey::Group(TypeId::new("person")))
            );
        }

        events.publish(Event::NodeHovered { node: None });
        events.dispatch_to(&mut controller);

        let store = store.read();
        assert_eq!(store.focus_key(), None);
        assert!(events.receiver().try_recv().is_err());
    }

    #[test]
    fn test_state_change_requests_are_applied_once() {
        let (controller, store, events) = harness();
        let mut transcript = Transcript {
            controller,
            seen: Vec::new(),
        };

        events.publish(Event::TypeStateChangeRequested {
            type_id: TypeId::new("person"),
            state: TypeState::Hide,
        });
        events.publish(Event::TypeStateChangeRequested {
            type_id: TypeId::new("person"),
            state: TypeState::Hide,
        });
        events.dispatch_to(&mut transcript);

        assert_eq!(store.read().view().node_count(), 1);
        let changes = transcript
            .seen
            .iter()
            .filter(|event| matches!(event, Event::ViewChanged { .. }))
            .count();
        assert_eq!(changes, 1);
    }

    #[test]
    fn test_expansion_toggle_answers_for_known_types_only() {
        let (controller, store, events) = harness();
        let mut transcript = Transcript {
            controller,
            seen: Vec::new(),
        };

        events.publish(Event::TypeExpansionToggled {
            type_id: TypeId::new("person"),
        });
        events.publish(Event::TypeExpansionToggled {
            type_id: TypeId::new("mystery"),
        });
        events.dispatch_to(&mut transcript);

        let summaries = store.read().type_summaries();
        assert!(summaries[0].expanded);
        let changes = transcript
            .seen
            .iter()
            .filter(|event| matches!(event, Event::ViewChanged { .. }))
            .count();
        assert_eq!(changes, 1);
    }
}
