use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The crate distinguishes fatal configuration errors from recoverable per-method failures:
/// only the former surface as [`Error`] values. A single method that cannot be turned into a
/// control-flow graph is recorded as a typed skip reason in the phase result instead of
/// aborting the analysis (see `analysis::cfg::SkipReason`).
///
/// # Error Categories
///
/// ## Configuration Errors
/// - [`Error::SinkNotFound`] - The designated sink is not a method of the call graph
/// - [`Error::SinkHasNoBody`] - CFG construction was requested for a bodiless sink
///
/// ## Graph Errors
/// - [`Error::GraphError`] - Structural misuse of a graph (e.g. an edge endpoint that
///   does not exist)
///
/// # Examples
///
/// ```rust,ignore
/// use sinktrace::{analysis::BackwardReachabilityAnalyzer, Error};
///
/// let analyzer = BackwardReachabilityAnalyzer::new(&call_graph);
/// match analyzer.find_paths_to_sink(sink) {
///     Ok(graph) => println!("{} reachable methods", graph.reachable_methods().len()),
///     Err(Error::SinkNotFound(sig)) => eprintln!("unknown sink: {sig}"),
///     Err(e) => eprintln!("analysis failed: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The designated sink method is not part of the supplied call graph.
    ///
    /// Reachability analysis is seeded at the sink; without it there is nothing
    /// to traverse, so the run aborts and nothing partial is returned.
    #[error("Sink method not found in call graph - {0}")]
    SinkNotFound(String),

    /// CFG construction was requested but the sink method has no analyzable body.
    ///
    /// Ordinary reachable methods without bodies are skipped and counted; the sink
    /// itself is the configured subject of the analysis and its absence is fatal.
    #[error("Sink method has no analyzable body - {0}")]
    SinkHasNoBody(String),

    /// Graph construction or query error.
    ///
    /// Returned when a graph operation is structurally invalid, such as adding
    /// an edge whose source or target node does not exist.
    #[error("{0}")]
    GraphError(String),
}
