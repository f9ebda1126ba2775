use std::collections::HashMap;

use anyhow::{Context, Result};
use clap::Parser;
use graph_algo::{depth_first_search, dijkstra, DfsCallbacks, Edge, Graph, Vertex};
use graph_layout::{FlowGraph, LayoutEngine, Padding, RankDir, SankeyLayout, SankeyResult};
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

mod sample;

/// Lay out a sample traffic flow as a Sankey diagram and walk its routes
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Canvas width
    #[arg(long, default_value_t = 300.0)]
    width: f64,

    /// Canvas height
    #[arg(long, default_value_t = 300.0)]
    height: f64,

    /// Flow direction: TB, BT, LR or RL
    #[arg(long, default_value_t = RankDir::LeftRight)]
    rankdir: RankDir,

    /// Space between nodes of the same level
    #[arg(long, default_value_t = 10.0)]
    nodesep: f64,

    /// Space between levels
    #[arg(long, default_value_t = 50.0)]
    ranksep: f64,

    /// Blank space around the drawing
    #[arg(long, default_value_t = 10.0)]
    padding: f64,

    /// Node extent along the flow, derived from the canvas when omitted
    #[arg(long)]
    node_width: Option<f64>,

    /// Node the routes are computed from
    #[arg(long, default_value = "nature")]
    from: String,

    /// Print the SVG outline of every edge
    #[arg(long)]
    svg: bool,
}

impl From<&Args> for SankeyLayout {
    fn from(args: &Args) -> Self {
        Self {
            width: args.width,
            height: args.height,
            rankdir: args.rankdir,
            nodesep: args.nodesep,
            ranksep: args.ranksep,
            padding: Padding::uniform(args.padding),
            node_width: args.node_width,
            ..Default::default()
        }
    }
}

/// Collapse parallel flows into one weighted edge per node pair
fn flow_network(flow: &FlowGraph) -> Result<Graph<String>> {
    let mut merged: Vec<(String, String, f64)> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();

    for edge in &flow.edges {
        let weight = edge
            .attrs
            .get("weight")
            .and_then(|w| w.as_number())
            .unwrap_or(1.0);
        match index.get(&(edge.source.as_str(), edge.target.as_str())) {
            Some(&i) => merged[i].2 += weight,
            None => {
                index.insert((edge.source.as_str(), edge.target.as_str()), merged.len());
                merged.push((edge.source.clone(), edge.target.clone(), weight));
            }
        }
    }

    let mut graph = Graph::directed();
    for node in &flow.nodes {
        graph.add_vertex(Vertex::new(node.id.clone()));
    }
    for (source, target, weight) in merged {
        graph
            .add_edge(Edge::new(source, target, weight))
            .context("merging parallel flows")?;
    }
    debug!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        "built flow network"
    );

    Ok(graph)
}

fn print_layout(result: &SankeyResult, svg: bool) {
    for (level, ids) in result.levels.iter().enumerate() {
        println!("level {level}: {}", ids.join(", "));
    }
    for node in &result.nodes {
        println!(
            "{:>10} x={:.1} y={:.1} w={:.1} h={:.1}",
            node.id, node.x, node.y, node.width, node.height
        );
    }
    if svg {
        for edge in &result.edges {
            println!("{} -> {}: {}", edge.source, edge.target, edge.svg_path());
        }
    }
}

fn print_routes(network: &Graph<String>, from: &str) -> Result<()> {
    let from = from.to_string();
    let mut reachable = Vec::new();
    depth_first_search(
        network,
        &from,
        DfsCallbacks::<String>::new()
            .on_enter(|visit| reachable.push(visit.current.key().clone())),
    )
    .with_context(|| format!("cannot walk from {from}"))?;
    println!("reachable from {from}: {}", reachable.join(", "));

    let paths = dijkstra(network, &from).with_context(|| format!("no routes from {from}"))?;
    for target in reachable.iter().filter(|&target| *target != from) {
        if let (Some(distance), Some(path)) = (paths.distance(target), paths.path_to(target)) {
            println!("{target}: {distance} via {}", path.join(" -> "));
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let flow = sample::traffic_flow();
    let layout = SankeyLayout::from(&args);
    let result = layout.layout(&flow).context("sankey layout failed")?;
    info!(
        levels = result.levels.len(),
        crossings = result.crossings,
        ratio = result.ratio,
        "laid out {} nodes",
        result.nodes.len()
    );
    print_layout(&result, args.svg);

    let network = flow_network(&flow)?;
    print_routes(&network, &args.from)
}
