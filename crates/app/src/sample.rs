use graph_layout::{FlowEdge, FlowGraph, FlowNode};

/// Traffic sources feeding three entry points, which feed one business line
pub fn traffic_flow() -> FlowGraph {
    let nodes = [
        "group", "outer", "merchant", "offline", "push", "nature", "search", "app", "homepage",
        "finance",
    ]
    .into_iter()
    .map(FlowNode::new)
    .collect();

    let edges = [
        ("group", "app", 5.0),
        ("group", "homepage", 2.0),
        ("group", "search", 15.0),
        ("group", "homepage", 20.0),
        ("outer", "search", 5.0),
        ("outer", "homepage", 25.0),
        ("merchant", "app", 30.0),
        ("offline", "app", 15.0),
        ("push", "search", 8.0),
        ("nature", "search", 68.0),
        ("nature", "app", 40.0),
        ("nature", "homepage", 30.0),
        ("search", "finance", 30.0),
        ("search", "finance", 16.0),
        ("search", "finance", 50.0),
        ("app", "finance", 20.0),
        ("app", "finance", 40.0),
        ("app", "finance", 30.0),
        ("homepage", "finance", 70.0),
        ("homepage", "finance", 8.0),
    ]
    .into_iter()
    .map(|(source, target, weight)| FlowEdge::weighted(source, target, weight))
    .collect();

    FlowGraph::new(nodes, edges)
}
