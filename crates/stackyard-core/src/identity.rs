//! コンテナ識別子と名前空間

use serde::Serialize;
use std::fmt;

/// 名前空間サフィックス
///
/// 同じスタックを複数同時に起動するときの衝突回避用。
/// 未設定なら空文字、設定時は `-{namespace}`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// 環境変数の値から作成（空文字は未設定扱い）
    pub fn from_binding(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(ns) if !ns.is_empty() => Self(format!("-{}", ns)),
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// コンテナ識別子 `{stack}-{container}{namespace}`
pub fn identity(stack: &str, container: &str, namespace: &Namespace) -> String {
    format!("{}-{}{}", stack, container, namespace)
}

/// スタックの主コンテナ名 `{stack}{namespace}`
pub fn stack_container(stack: &str, namespace: &Namespace) -> String {
    format!("{}{}", stack, namespace)
}
