//! スタックルートの検出

use crate::error::{Result, StackError};
use crate::model::MANIFEST_FILE;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// `start` から上に向かって stack.yaml を含むディレクトリを探す
///
/// `boundary` を指定した場合、そのディレクトリより上には遡りません。
#[tracing::instrument(fields(start = %start.display()))]
pub fn find_stack_root(start: &Path, boundary: Option<&Path>) -> Result<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        debug!(checking = %current.display(), "Looking for stack.yaml");
        if current.join(MANIFEST_FILE).is_file() {
            info!(stack_root = %current.display(), "Found stack root");
            return Ok(current);
        }

        if boundary.is_some_and(|b| current == b) {
            debug!(boundary = %current.display(), "Reached search boundary");
            break;
        }

        // 親ディレクトリへ
        if !current.pop() {
            break;
        }
    }

    warn!(start = %start.display(), "Stack root not found");
    Err(StackError::StackRootNotFound(start.to_path_buf()))
}
