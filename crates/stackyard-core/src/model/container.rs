//! コンテナ定義
//!
//! マージ済みの設定ツリーから型付きで値を取り出すビュー。

use super::node::{Node, Scalar};
use crate::error::{Result, StackError};
use serde::Serialize;
use std::collections::BTreeMap;

/// 上書きのみ可能でマージされないフィールド
pub const UNMERGABLE_KEYS: &[&str] = &["cmd", "ports", "entrypoint"];

/// コンテナ定義
///
/// YAML形式：
/// ```yaml
/// image: acme/web
/// include: base
/// ports: ["8080:80"]
/// volumes: ["./data:/data|www-data|www-data"]
/// env:
///   KEY: value
/// create_args: ["--memory", "512m"]
/// provisioners: ["scripts/setup.sh --fast"]
/// snapshots:
///   data: /var/lib/data
/// privileged: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContainerConfig {
    pub image: Option<String>,
    pub include: Option<String>,
    pub ports: Vec<String>,
    pub volumes: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub create_args: Vec<String>,
    pub provisioners: Vec<String>,
    pub snapshots: Option<Node>,
    pub privileged: bool,
    pub cmd: Option<Node>,
    pub entrypoint: Option<Node>,
}

impl ContainerConfig {
    /// マージ済みツリーから型付きビューを構築
    pub fn from_node(node: &Node) -> Result<Self> {
        let map = node.as_map().ok_or_else(|| {
            StackError::InvalidConfig("コンテナ定義はマッピングである必要があります".to_string())
        })?;

        let list = |key: &str| -> Result<Vec<String>> {
            map.get(key)
                .map(|value| value.string_list(key))
                .unwrap_or_else(|| Ok(Vec::new()))
        };

        let mut env = BTreeMap::new();
        for key in ["environment", "env"] {
            if let Some(value) = map.get(key) {
                env.extend(env_map(value, key)?);
            }
        }

        let privileged = match map.get("privileged") {
            None => false,
            Some(Node::Scalar(Scalar::Bool(b))) => *b,
            Some(Node::Scalar(Scalar::Null)) => false,
            Some(_) => {
                return Err(StackError::InvalidConfig(
                    "privileged は真偽値である必要があります".to_string(),
                ));
            }
        };

        Ok(Self {
            image: optional_string(map.get("image"), "image")?,
            include: optional_string(map.get("include"), "include")?,
            ports: list("ports")?,
            volumes: list("volumes")?,
            env,
            create_args: list("create_args")?,
            provisioners: list("provisioners")?,
            snapshots: map.get("snapshots").filter(|n| !n.is_null()).cloned(),
            privileged,
            cmd: map.get("cmd").cloned(),
            entrypoint: map.get("entrypoint").cloned(),
        })
    }
}

fn optional_string(value: Option<&Node>, field: &str) -> Result<Option<String>> {
    match value {
        None | Some(Node::Scalar(Scalar::Null)) => Ok(None),
        Some(Node::Scalar(scalar)) => Ok(Some(scalar.render())),
        Some(_) => Err(StackError::InvalidConfig(format!(
            "{} は文字列である必要があります",
            field
        ))),
    }
}

/// 環境変数マッピング（値はスカラーのみ）
fn env_map(value: &Node, field: &str) -> Result<BTreeMap<String, String>> {
    match value {
        Node::Scalar(Scalar::Null) => Ok(BTreeMap::new()),
        Node::Map(map) => map
            .iter()
            .map(|(key, value)| match value {
                Node::Scalar(scalar) => Ok((key.clone(), scalar.render())),
                _ => Err(StackError::InvalidConfig(format!(
                    "{}.{} はスカラーである必要があります",
                    field, key
                ))),
            })
            .collect(),
        _ => Err(StackError::InvalidConfig(format!(
            "{} はマッピングである必要があります",
            field
        ))),
    }
}
