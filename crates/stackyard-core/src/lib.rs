//! Stackyard core
//!
//! stack.yaml と docker.yaml の階層を解決し、ランチャーへ渡す
//! コンテナ記述子を生成します。

pub mod discovery;
pub mod error;
pub mod identity;
pub mod interpolate;
pub mod loader;
pub mod merge;
pub mod model;
pub mod remote;
pub mod resolver;
pub mod runtime;
pub mod scaffold;
pub mod settings;

pub use discovery::*;
pub use error::*;
pub use identity::*;
pub use interpolate::*;
pub use loader::*;
pub use merge::*;
pub use model::*;
pub use remote::*;
pub use resolver::*;
pub use runtime::*;
pub use scaffold::*;
pub use settings::*;
