//! 設定ツリー
//!
//! YAMLから読み込んだ任意のネスト構造を `Scalar | List | Map` の再帰型で表現します。

use crate::error::{Result, StackError};
use serde::Serialize;
use std::collections::BTreeMap;

/// マッピングノード
pub type NodeMap = BTreeMap<String, Node>;

/// スカラー値
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_yaml::Number),
    String(String),
}

impl Scalar {
    /// 表示・環境変数用の文字列表現
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::String(s) => s.clone(),
        }
    }
}

/// 設定ツリーのノード
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Scalar(Scalar),
    List(Vec<Node>),
    Map(NodeMap),
}

impl Default for Node {
    fn default() -> Self {
        Self::Map(NodeMap::new())
    }
}

impl Node {
    /// 空のマッピング
    pub fn empty_map() -> Self {
        Self::default()
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::String(value.into()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(Scalar::Null))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&NodeMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// マッピングのキーを取得（マッピング以外は常に None）
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// マッピングにキーを設定する。マッピング以外では何もしない
    pub fn insert(&mut self, key: impl Into<String>, value: Node) {
        if let Self::Map(map) = self {
            map.insert(key.into(), value);
        }
    }

    /// 文字列リストとして取り出す
    ///
    /// リスト内のスカラーは文字列表現に変換されます。
    pub fn string_list(&self, field: &str) -> Result<Vec<String>> {
        match self {
            Self::Scalar(Scalar::Null) => Ok(Vec::new()),
            Self::List(items) => items
                .iter()
                .map(|item| match item {
                    Self::Scalar(s) => Ok(s.render()),
                    _ => Err(StackError::InvalidConfig(format!(
                        "{} の要素はスカラーである必要があります",
                        field
                    ))),
                })
                .collect(),
            _ => Err(StackError::InvalidConfig(format!(
                "{} はリストである必要があります",
                field
            ))),
        }
    }
}

impl TryFrom<serde_yaml::Value> for Node {
    type Error = StackError;

    fn try_from(value: serde_yaml::Value) -> Result<Self> {
        Ok(match value {
            serde_yaml::Value::Null => Node::Scalar(Scalar::Null),
            serde_yaml::Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            serde_yaml::Value::Number(n) => Node::Scalar(Scalar::Number(n)),
            serde_yaml::Value::String(s) => Node::Scalar(Scalar::String(s)),
            serde_yaml::Value::Sequence(items) => Node::List(
                items
                    .into_iter()
                    .map(Node::try_from)
                    .collect::<Result<Vec<_>>>()?,
            ),
            serde_yaml::Value::Mapping(mapping) => {
                let mut map = NodeMap::new();
                for (key, value) in mapping {
                    map.insert(mapping_key(key)?, Node::try_from(value)?);
                }
                Node::Map(map)
            }
            serde_yaml::Value::Tagged(tagged) => Node::try_from(tagged.value)?,
        })
    }
}

/// マッピングキーを文字列化（複合キーは拒否）
fn mapping_key(key: serde_yaml::Value) -> Result<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(StackError::InvalidConfig(format!(
            "マッピングのキーはスカラーである必要があります: {:?}",
            other
        ))),
    }
}
