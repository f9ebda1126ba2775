/// A layout engine computing geometry for a graph
///
/// The engine is generic over the input type `G`, so different layouts can
/// accept the graph representation they need:
/// - [`SankeyLayout`](crate::SankeyLayout) implements `LayoutEngine<&FlowGraph>`
/// - Other engines can specify their own input and output
pub trait LayoutEngine<G> {
    /// Geometry produced by the engine
    type Output;

    /// Reasons the layout can fail
    type Error: std::error::Error;

    /// Compute the layout of `graph`
    ///
    /// # Errors
    /// Returns an error when the input violates the engine's constraints
    fn layout(&self, graph: G) -> Result<Self::Output, Self::Error>;
}
