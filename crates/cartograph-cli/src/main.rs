//! Cartograph CLI
//!
//! Headless driver for the graph engine. Loads a root instance from a server
//! or a fixture file, applies visibility operations through the event bus and
//! prints the derived view.

use anyhow::{Context, Result, bail};
use cartograph_client::{GraphSource, HttpGraphSource, RawGraph, StaticGraphSource};
use cartograph_core::{InstanceId, NodeKey, TypeId, TypeRegistry, TypeState};
use cartograph_events::{Event, EventBus};
use cartograph_graph::{
    ActivationOutcome, FetchState, GraphController, GraphSession, GraphStore, IngestStats,
    TypeSummary, ViewGraph,
};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "cartograph")]
#[command(about = "Derive a renderable view of a knowledge graph", long_about = None)]
struct Args {
    /// Path to the type catalog (a JSON array of {id, label, color?})
    #[arg(short, long)]
    registry: PathBuf,

    /// Root instance id to load the graph for
    #[arg(long)]
    root: String,

    /// Read the raw graph from a JSON fixture instead of a server
    #[arg(long, conflicts_with = "url")]
    fixture: Option<PathBuf>,

    /// Base URL of the graph server
    #[arg(long)]
    url: Option<String>,

    /// Bearer token for the graph server
    #[arg(long, requires = "url")]
    token: Option<String>,

    /// Set a type to hidden after loading (repeatable)
    #[arg(long, value_name = "TYPE")]
    hide: Vec<String>,

    /// Set a type to shown after loading (repeatable)
    #[arg(long, value_name = "TYPE")]
    show: Vec<String>,

    /// Set a type back to grouped after loading (repeatable)
    #[arg(long, value_name = "TYPE")]
    group: Vec<String>,

    /// Expand a type's member listing (repeatable)
    #[arg(long, value_name = "TYPE")]
    expand: Vec<String>,

    /// Highlight a node ("group:<type>" addresses a group node)
    #[arg(long, value_name = "NODE")]
    highlight: Option<String>,

    /// Output as JSON (machine-readable)
    #[arg(long)]
    json: bool,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    root: &'a InstanceId,
    stats: IngestStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    focus: Option<NodeKey>,
    types: &'a [TypeSummary],
    view: &'a ViewGraph,
}

fn parse_node_key(raw: &str) -> NodeKey {
    match raw.strip_prefix("group:") {
        Some(type_id) => NodeKey::Group(TypeId::new(type_id)),
        None => NodeKey::Instance(InstanceId::new(raw)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let registry = TypeRegistry::load(&args.registry)
        .with_context(|| format!("loading type catalog from {}", args.registry.display()))?;
    let root = InstanceId::new(args.root.as_str());

    let source: Arc<dyn GraphSource> = if let Some(path) = &args.fixture {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        let graph = RawGraph::from_json(&raw).context("parsing fixture graph")?;
        Arc::new(StaticGraphSource::new().with_graph(root.clone(), graph))
    } else if let Some(url) = &args.url {
        let mut http = HttpGraphSource::new(url);
        if let Some(token) = &args.token {
            http = http.with_token(token);
        }
        Arc::new(http)
    } else {
        bail!("either --fixture or --url is required");
    };

    let session = GraphSession::new(GraphStore::new(registry), source, EventBus::new());

    let outcome = session.activate(root.clone()).await;
    if outcome != ActivationOutcome::Loaded {
        let store = session.store();
        let store = store.read();
        let reason = match store.fetch_state() {
            FetchState::Failed { reason, .. } => reason.clone(),
            _ => "fetch did not complete".to_string(),
        };
        bail!("failed to load graph for {}: {}", root, reason);
    }

    // Route the requested operations through the same event path the
    // renderer and settings panel would use.
    let store = session.store();
    let mut controller = GraphController::new(Arc::clone(&store), session.events().clone());
    let events = session.events();
    for type_id in &args.hide {
        events.publish(Event::TypeStateChangeRequested {
            type_id: TypeId::new(type_id.as_str()),
            state: TypeState::Hide,
        });
    }
    for type_id in &args.show {
        events.publish(Event::TypeStateChangeRequested {
            type_id: TypeId::new(type_id.as_str()),
            state: TypeState::Show,
        });
    }
    for type_id in &args.group {
        events.publish(Event::TypeStateChangeRequested {
            type_id: TypeId::new(type_id.as_str()),
            state: TypeState::Grouped,
        });
    }
    for type_id in &args.expand {
        events.publish(Event::TypeExpansionToggled {
            type_id: TypeId::new(type_id.as_str()),
        });
    }
    if let Some(raw) = &args.highlight {
        events.publish(Event::NodeHovered {
            node: Some(parse_node_key(raw)),
        });
    }
    events.dispatch_to(&mut controller);

    let store = store.read();
    let view = store.view();
    let summaries = store.type_summaries();

    if args.json {
        let report = Report {
            root: &root,
            stats: store.stats(),
            focus: store.focus_key().cloned(),
            types: &summaries,
            view: &view,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&store, &view, &summaries);
    }

    Ok(())
}

fn print_report(store: &GraphStore, view: &ViewGraph, summaries: &[TypeSummary]) {
    let stats = store.stats();
    println!(
        "Ingested {} nodes and {} edges ({} groups, {} synthetic edges, {} dropped)",
        stats.recognized_nodes,
        stats.resolved_edges,
        stats.group_nodes,
        stats.synthetic_edges,
        stats.dropped_nodes + stats.dropped_edges
    );

    println!();
    println!("Types:");
    for summary in summaries {
        let mut flags = Vec::new();
        if summary.pinned {
            flags.push("pinned");
        }
        if summary.has_group {
            flags.push("group");
        }
        if summary.expanded {
            flags.push("expanded");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!(
            "  {:<12} {:<8} {} members: {}{}",
            summary.label, summary.state, summary.color, summary.member_count, flags
        );
        if summary.expanded {
            for member in store.members_of(&summary.type_id) {
                println!("    - {}", member.display_name);
            }
        }
    }

    println!();
    println!("View (revision {}):", view.revision);
    for node in &view.nodes {
        let mut marks = String::new();
        if node.is_root {
            marks.push_str(" (root)");
        }
        if store.is_highlighted(&node.key) {
            marks.push_str(" *");
        }
        println!("  {} [{}]{}", node.label, node.type_id, marks);
    }
    for edge in &view.edges {
        let arrow = if edge.synthetic { "~>" } else { "->" };
        let mark = if store.is_edge_highlighted(edge) {
            " *"
        } else {
            ""
        };
        println!("  {} {} {}{}", edge.source, arrow, edge.target, mark);
    }
}
