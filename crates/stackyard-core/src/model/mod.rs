//! モデル定義
//!
//! Stackyardで使用されるデータモデルを定義します。

mod container;
mod manifest;
mod node;
mod path;

// Re-exports
pub use container::*;
pub use manifest::*;
pub use node::*;
pub use path::*;
