use cartograph_core::{InstanceId, NodeKey, TypeId, TypeState};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Renderer interaction
    NodeClicked {
        node: NodeKey,
    },
    NodeHovered {
        node: Option<NodeKey>,
    },

    // Settings panel
    TypeStateChangeRequested {
        type_id: TypeId,
        state: TypeState,
    },
    TypeExpansionToggled {
        type_id: TypeId,
    },

    // Fetch lifecycle
    GraphLoaded {
        root: InstanceId,
        node_count: usize,
        edge_count: usize,
    },
    GraphLoadFailed {
        root: InstanceId,
        reason: String,
    },

    // Engine output
    /// The derived view changed; the renderer should pull it again.
    ViewChanged {
        revision: u64,
    },
    /// A real, non-root node was clicked; the host should re-root there.
    NavigationRequested {
        instance: InstanceId,
    },
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Dispatch all pending events to a listener.
    /// This is useful for processing events in the UI loop.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }
}

/// Trait for components that respond to events.
/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bus_publish_receive() {
        let bus = EventBus::new();
        let sender = bus.sender();
        let receiver = bus.receiver();

        let event = Event::NodeClicked {
            node: NodeKey::Group(TypeId::new("person")),
        };

        sender.send(event).unwrap();

        let received = receiver.recv().unwrap();
        match received {
            Event::NodeClicked { node } => {
                assert_eq!(node, NodeKey::Group(TypeId::new("person")));
            }
            _ => panic!("Expected NodeClicked event"),
        }
    }

    #[test]
    fn test_fetch_lifecycle_events() {
        let bus = EventBus::new();
        bus.publish(Event::GraphLoaded {
            root: InstanceId::new("n3"),
            node_count: 3,
            edge_count: 1,
        });
        bus.publish(Event::ViewChanged { revision: 1 });

        let rx = bus.receiver();
        if let Event::GraphLoaded { root, node_count, edge_count } = rx.recv().unwrap() {
            assert_eq!(root.as_str(), "n3");
            assert_eq!(node_count, 3);
            assert_eq!(edge_count, 1);
        } else {
            panic!("Expected GraphLoaded");
        }

        if let Event::ViewChanged { revision } = rx.recv().unwrap() {
            assert_eq!(revision, 1);
        } else {
            panic!("Expected ViewChanged");
        }
    }

    #[test]
    fn test_dispatch_to_drains_queue() {
        struct Tally(usize);
        impl EventListener for Tally {
            fn handle_event(&mut self, _event: &Event) {
                self.0 += 1;
            }
        }

        let bus = EventBus::new();
        bus.publish(Event::TypeExpansionToggled {
            type_id: TypeId::new("person"),
        });
        bus.publish(Event::NodeHovered { node: None });

        let mut tally = Tally(0);
        bus.dispatch_to(&mut tally);
        assert_eq!(tally.0, 2);

        bus.dispatch_to(&mut tally);
        assert_eq!(tally.0, 2);
    }
}
