//! スタックマニフェスト (stack.yaml)

use super::node::Node;
use crate::error::{Result, StackError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// マニフェストファイル名
pub const MANIFEST_FILE: &str = "stack.yaml";

/// `dockers` 内の予約キー（スタック共通デフォルト）
pub const DEFAULTS_KEY: &str = "defaults";

/// スタックマニフェスト
///
/// YAML形式：
/// ```yaml
/// registry: local-registry.com
/// organization: acme
/// dockers:
///   defaults:
///     env: { TZ: UTC }
///   web:
///     ports: ["80:80"]
/// hooks:
///   pre-start: ["echo hello"]
/// tasks:
///   migrate: ["./migrate.sh"]
/// tests:
///   run: ["./test.sh"]
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct StackManifest {
    pub registry: String,
    pub organization: String,
    /// コンテナ定義（マニフェストの記述順）
    pub dockers: Vec<ContainerEntry>,
    /// `dockers.defaults`
    pub defaults: Option<Node>,
    pub hooks: BTreeMap<HookPhase, Vec<String>>,
    /// タスク定義（マニフェストの記述順）
    pub tasks: Vec<Task>,
    pub tests: TestPhases,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub setup: Vec<String>,
}

/// 未加工のコンテナエントリ
#[derive(Debug, Clone, Serialize)]
pub struct ContainerEntry {
    pub name: String,
    /// `null` のエントリは空マッピングとして扱う
    pub raw: Node,
}

/// ライフサイクルフックのフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookPhase {
    PreStart,
    PostStart,
    PreStop,
    PostStop,
}

impl HookPhase {
    /// 文字列からパース
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pre-start" => Some(Self::PreStart),
            "post-start" => Some(Self::PostStart),
            "pre-stop" => Some(Self::PreStop),
            "post-stop" => Some(Self::PostStop),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreStart => "pre-start",
            Self::PostStart => "post-start",
            Self::PreStop => "pre-stop",
            Self::PostStop => "post-stop",
        }
    }
}

/// タスク
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub name: String,
    pub commands: Vec<String>,
}

/// テストフェーズ
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TestPhases {
    pub before: Vec<String>,
    pub run: Vec<String>,
    pub after: Vec<String>,
}

impl TestPhases {
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.run.is_empty() && self.after.is_empty()
    }
}

impl StackManifest {
    /// stack.yaml を読み込む
    #[tracing::instrument(fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| StackError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse_str(&content).map_err(|e| match e {
            StackError::YamlParse { message, .. } => StackError::YamlParse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// YAML文字列をパース
    ///
    /// `dockers` / `registry` / `organization` のいずれかが無ければ失敗します。
    pub fn parse_str(content: &str) -> Result<Self> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| StackError::YamlParse {
                path: MANIFEST_FILE.into(),
                message: e.to_string(),
            })?;
        let root = match value {
            serde_yaml::Value::Mapping(m) => m,
            serde_yaml::Value::Null => serde_yaml::Mapping::new(),
            _ => {
                return Err(StackError::InvalidConfig(
                    "stack.yaml のトップレベルはマッピングである必要があります".to_string(),
                ));
            }
        };

        for key in ["dockers", "registry", "organization"] {
            if !root.contains_key(key) {
                return Err(StackError::MissingRequiredManifestKey(key.to_string()));
            }
        }

        let registry = scalar_field(&root, "registry")?;
        let organization = scalar_field(&root, "organization")?;

        let mut manifest = StackManifest {
            registry,
            organization,
            ..Default::default()
        };

        match root.get("dockers") {
            Some(serde_yaml::Value::Mapping(dockers)) => {
                for (key, value) in dockers {
                    let name = key_string(key)?;
                    let raw = match Node::try_from(value.clone())? {
                        node if node.is_null() => Node::empty_map(),
                        node @ Node::Map(_) => node,
                        _ => {
                            return Err(StackError::InvalidConfig(format!(
                                "dockers.{} はマッピングである必要があります",
                                name
                            )));
                        }
                    };
                    if name == DEFAULTS_KEY {
                        manifest.defaults = Some(raw);
                    } else {
                        manifest.dockers.push(ContainerEntry { name, raw });
                    }
                }
            }
            Some(serde_yaml::Value::Null) | None => {}
            Some(_) => {
                return Err(StackError::InvalidConfig(
                    "dockers はマッピングである必要があります".to_string(),
                ));
            }
        }

        if let Some(serde_yaml::Value::Mapping(hooks)) = root.get("hooks") {
            for (key, value) in hooks {
                let phase_name = key_string(key)?;
                match HookPhase::parse(&phase_name) {
                    Some(phase) => {
                        let commands = command_list(value, &format!("hooks.{}", phase_name))?;
                        manifest.hooks.insert(phase, commands);
                    }
                    None => warn!(phase = %phase_name, "Ignoring unknown hook phase"),
                }
            }
        }

        if let Some(serde_yaml::Value::Mapping(tasks)) = root.get("tasks") {
            for (key, value) in tasks {
                let name = key_string(key)?;
                let commands = command_list(value, &format!("tasks.{}", name))?;
                manifest.tasks.push(Task { name, commands });
            }
        }

        if let Some(serde_yaml::Value::Mapping(tests)) = root.get("tests") {
            let phase = |name: &str| -> Result<Vec<String>> {
                match tests.get(name) {
                    Some(value) => command_list(value, &format!("tests.{}", name)),
                    None => Ok(Vec::new()),
                }
            };
            manifest.tests = TestPhases {
                before: phase("before")?,
                run: phase("run")?,
                after: phase("after")?,
            };
        }

        if let Some(setup) = root.get("setup") {
            manifest.setup = command_list(setup, "setup")?;
        }

        debug!(
            containers = manifest.dockers.len(),
            has_defaults = manifest.defaults.is_some(),
            tasks = manifest.tasks.len(),
            "Parsed stack manifest"
        );

        Ok(manifest)
    }

    /// タスクを名前で取得
    pub fn task(&self, name: &str) -> Result<&Task> {
        self.tasks
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| StackError::TaskNotFound(name.to_string()))
    }

    /// フェーズのフックコマンド（未定義なら空）
    pub fn hook_commands(&self, phase: HookPhase) -> &[String] {
        self.hooks.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }

    /// コンテナ名一覧（記述順）
    pub fn container_names(&self) -> impl Iterator<Item = &str> {
        self.dockers.iter().map(|entry| entry.name.as_str())
    }
}

fn key_string(key: &serde_yaml::Value) -> Result<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(StackError::InvalidConfig(format!(
            "無効なキー: {:?}",
            other
        ))),
    }
}

fn scalar_field(root: &serde_yaml::Mapping, key: &str) -> Result<String> {
    match root.get(key) {
        Some(serde_yaml::Value::String(s)) => Ok(s.clone()),
        Some(serde_yaml::Value::Number(n)) => Ok(n.to_string()),
        _ => Err(StackError::InvalidConfig(format!(
            "{} は文字列である必要があります",
            key
        ))),
    }
}

fn command_list(value: &serde_yaml::Value, field: &str) -> Result<Vec<String>> {
    Node::try_from(value.clone())?.string_list(field)
}
