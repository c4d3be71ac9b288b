use thiserror::Error;

use crate::model::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MindMapError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("the center node cannot be deleted")]
    CannotDeleteCenter,

    #[error("node {0} has no parent, so it cannot have siblings")]
    NoParent(NodeId),
}

/// Why a `connect` request was refused. The tree is left untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("a node cannot be connected to itself")]
    SelfLoop,

    #[error("the center node cannot become a child")]
    TargetIsCenter,

    #[error("target {to} is an ancestor of {from}; connecting would create a cycle")]
    WouldCreateCycle { from: NodeId, to: NodeId },

    #[error("target {to} already belongs to the subtree of {from}")]
    TargetInSourceSubtree { from: NodeId, to: NodeId },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to parse document: {0}")]
    Parse(String),

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("unsupported document version {0}")]
    UnsupportedVersion(u32),

    #[error("document has no center node")]
    MissingCenter,

    #[error("document has more than one center node ({0} and {1})")]
    MultipleCenters(NodeId, NodeId),

    #[error("duplicate node id {0}")]
    DuplicateId(NodeId),

    #[error("node {node} references unknown node {missing}")]
    DanglingReference { node: NodeId, missing: NodeId },

    #[error("parent/children mismatch between {parent} and {child}")]
    InconsistentEdge { parent: NodeId, child: NodeId },

    #[error("the center node {0} must not have a parent")]
    CenterHasParent(NodeId),

    #[error("cycle detected through node {0}")]
    Cycle(NodeId),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown layout '{0}'")]
pub struct UnknownLayout(pub String);
