pub mod character_network;
pub mod force_graph;
pub mod sample_quotes;
