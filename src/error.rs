//! 错误类型

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("read/write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse json {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate node name: {0}")]
    DuplicateNode(String),
    #[error("node {node} references unknown input {input}")]
    UnknownInput { node: String, input: String },
    #[error("unknown root node: {0}")]
    UnknownRoot(String),
    /// 输入图不是 DAG
    #[error("dataflow graph has a cycle through {0}")]
    Cycle(String),
    #[error("invalid name pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
