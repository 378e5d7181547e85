//! `${NAME}` 形式のプレースホルダ展開
//!
//! 未定義の変数があれば展開全体を失敗させます（部分的な置換結果は返さない）。

use crate::error::{Result, StackError};
use crate::model::{Node, Scalar};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}:]*)\}").expect("placeholder regex"))
}

/// 展開に使う環境変数のスナップショット
#[derive(Debug, Clone, Default)]
pub struct EnvBinding {
    vars: HashMap<String, String>,
}

impl EnvBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在のプロセス環境変数から作成
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvBinding {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// 文字列中の `${NAME}` を展開
pub fn interpolate_str(input: &str, env: &EnvBinding) -> Result<String> {
    let mut missing: Option<String> = None;
    let output = placeholder().replace_all(input, |caps: &Captures| {
        let name = &caps[1];
        match env.get(name) {
            Some(value) => value.to_string(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });
    match missing {
        Some(name) => Err(StackError::UnresolvedInterpolationVariable(name)),
        None => Ok(output.into_owned()),
    }
}

/// ツリー中のリスト要素（文字列）を展開した新しいツリーを返す
///
/// マッピングの値は展開しません。
pub fn interpolate(node: &Node, env: &EnvBinding) -> Result<Node> {
    match node {
        Node::List(items) => items
            .iter()
            .map(|item| match item {
                Node::Scalar(Scalar::String(s)) => {
                    let expanded = interpolate_str(s, env)?;
                    if expanded != *s {
                        debug!(from = %s, to = %expanded, "Interpolated list element");
                    }
                    Ok(Node::string(expanded))
                }
                other => interpolate(other, env),
            })
            .collect::<Result<Vec<_>>>()
            .map(Node::List),
        Node::Map(map) => map
            .iter()
            .map(|(key, value)| Ok((key.clone(), interpolate(value, env)?)))
            .collect::<Result<_>>()
            .map(Node::Map),
        Node::Scalar(_) => Ok(node.clone()),
    }
}
