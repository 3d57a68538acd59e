use thiserror::Error;

use crate::render::NodeId;

pub type SeriesResult<T> = Result<T, SeriesError>;

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("scene node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("scene node {node} is a {actual}, expected {expected}")]
    InvalidNodeKind {
        node: NodeId,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("invalid series options: {0}")]
    InvalidOptions(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
