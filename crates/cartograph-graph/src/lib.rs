pub mod controller;
pub mod highlight;
pub mod ingest;
pub mod session;
pub mod store;
pub mod view;
pub mod visibility;
pub mod working;

pub use controller::GraphController;
pub use highlight::Highlight;
pub use ingest::{GroupBuilder, IngestOutput, IngestStats};
pub use session::{ActivationOutcome, GraphSession};
pub use store::{FetchOutcome, FetchState, FetchTicket, GraphStore, TypeSummary};
pub use view::{ViewEdge, ViewGraph, ViewNode, derive_view};
pub use visibility::{TypeVisibility, VisibilityState};
pub use working::{
    EdgeIndex, GroupInfo, NodeIndex, WorkingEdge, WorkingGraph, WorkingNode,
};
