//! Graph Session
//!
//! Ties a [`GraphStore`] to a [`GraphSource`] and drives the fetch
//! lifecycle. The store lock is never held across the fetch await, so user
//! events keep flowing against the previous graph while a new root loads.

use crate::store::{FetchOutcome, GraphStore};
use cartograph_client::GraphSource;
use cartograph_core::InstanceId;
use cartograph_events::{Event, EventBus};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// What one activation call amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    Loaded,
    Failed,
    Superseded,
}

pub struct GraphSession<S> {
    store: Arc<RwLock<GraphStore>>,
    source: S,
    events: EventBus,
}

impl<S: GraphSource> GraphSession<S> {
    pub fn new(store: GraphStore, source: S, events: EventBus) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            source,
            events,
        }
    }

    pub fn store(&self) -> Arc<RwLock<GraphStore>> {
        Arc::clone(&self.store)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Fetches `root` and applies the result to the store.
    ///
    /// Concurrent activations race; whichever started last wins and the
    /// older result is dropped on arrival, whether it succeeded or not.
    pub async fn activate(&self, root: InstanceId) -> ActivationOutcome {
        let ticket = self.store.write().begin_fetch(root.clone());
        match self.source.fetch_graph(&root).await {
            Ok(raw) => {
                let mut store = self.store.write();
                match store.apply_fetch(ticket, &root, &raw) {
                    FetchOutcome::Applied => {
                        let node_count = store.node_count();
                        let edge_count = store.edge_count();
                        let revision = store.revision();
                        drop(store);
                        info!(
                            "Loaded graph for {}: {} nodes, {} edges",
                            root, node_count, edge_count
                        );
                        self.events.publish(Event::GraphLoaded {
                            root,
                            node_count,
                            edge_count,
                        });
                        self.events.publish(Event::ViewChanged { revision });
                        ActivationOutcome::Loaded
                    }
                    FetchOutcome::Superseded => ActivationOutcome::Superseded,
                }
            }
            Err(error) => {
                let reason = error.to_string();
                let mut store = self.store.write();
                match store.fail_fetch(ticket, &root, reason.clone()) {
                    FetchOutcome::Applied => {
                        let revision = store.revision();
                        drop(store);
                        self.events.publish(Event::GraphLoadFailed { root, reason });
                        self.events.publish(Event::ViewChanged { revision });
                        ActivationOutcome::Failed
                    }
                    FetchOutcome::Superseded => ActivationOutcome::Superseded,
                }
            }
        }
    }
}
