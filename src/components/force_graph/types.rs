use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphNode {
	pub id: String,
}

/// One side of a link: either a bare node id or an object carrying an `id`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LinkEnd {
	Id(String),
	Node {
		#[serde(default)]
		id: Option<String>,
	},
}

impl LinkEnd {
	pub fn id(&self) -> Option<&str> {
		match self {
			LinkEnd::Id(id) => Some(id),
			LinkEnd::Node { id } => id.as_deref(),
		}
	}
}

#[cfg(test)]
impl From<&str> for LinkEnd {
	fn from(id: &str) -> Self {
		LinkEnd::Id(id.to_string())
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphLink {
	pub source: LinkEnd,
	pub target: LinkEnd,
}

#[cfg(test)]
impl GraphLink {
	pub fn new(source: impl Into<LinkEnd>, target: impl Into<LinkEnd>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SampleQuote {
	pub character: String,
	pub line: String,
	#[serde(default)]
	pub sentiment: Option<String>,
	#[serde(default)]
	pub context: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphData {
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub links: Vec<GraphLink>,
	#[serde(default)]
	pub sample_quotes: Vec<SampleQuote>,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum GraphDataError {
	#[error("invalid graph data: {0}")]
	Json(String),
}

impl From<serde_json::Error> for GraphDataError {
	fn from(err: serde_json::Error) -> Self {
		GraphDataError::Json(err.to_string())
	}
}

impl GraphData {
	pub fn from_json(src: &str) -> Result<Self, GraphDataError> {
		Ok(serde_json::from_str(src)?)
	}
}
