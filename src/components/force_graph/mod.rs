mod component;
mod render;
pub mod scale;
mod simulation;
mod state;
mod types;

pub use component::ForceGraph;
pub use types::{GraphData, GraphLink, GraphNode, SampleQuote};
#[cfg(test)]
pub use types::LinkEnd;
