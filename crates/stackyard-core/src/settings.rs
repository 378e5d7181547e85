//! コンテナごとの設定アキュムレータ
//!
//! ポート・ボリューム・環境変数・create引数を識別子単位で追記していきます。
//! 削除操作はありません。

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// 蓄積対象のフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    Ports,
    Volumes,
    Env,
    CreateArgs,
}

/// 1コンテナ分の蓄積設定
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettingsEntry {
    pub ports: Vec<String>,
    pub volumes: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub create_args: Vec<String>,
}

impl SettingsEntry {
    /// フィールドをリストとして取得（環境変数は `KEY=VALUE`）
    pub fn field(&self, field: SettingField) -> Vec<String> {
        match field {
            SettingField::Ports => self.ports.clone(),
            SettingField::Volumes => self.volumes.clone(),
            SettingField::Env => self
                .env
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect(),
            SettingField::CreateArgs => self.create_args.clone(),
        }
    }
}

/// 1回の `configure` 呼び出しで追加する内容
#[derive(Debug, Clone, Default)]
pub struct Contribution {
    pub ports: Vec<String>,
    pub volumes: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub create_args: Vec<String>,
}

impl Contribution {
    pub fn ports(ports: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            ports: ports.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn volumes(volumes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            volumes: volumes.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn env(env: BTreeMap<String, String>) -> Self {
        Self {
            env,
            ..Default::default()
        }
    }

    pub fn create_args(args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            create_args: args.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

/// 設定アキュムレータ
///
/// 識別子は最初の寄与時に作成され、蓄積順を保持します。
#[derive(Debug, Clone, Default)]
pub struct SettingsAccumulator {
    entries: Vec<(String, SettingsEntry)>,
    index: HashMap<String, usize>,
}

impl SettingsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 設定を追記（リストは末尾に追加、環境変数は後勝ちでマージ）
    pub fn configure(&mut self, identity: &str, contribution: Contribution) {
        let slot = match self.index.get(identity) {
            Some(&slot) => slot,
            None => {
                self.entries
                    .push((identity.to_string(), SettingsEntry::default()));
                let slot = self.entries.len() - 1;
                self.index.insert(identity.to_string(), slot);
                slot
            }
        };
        let entry = &mut self.entries[slot].1;
        entry.ports.extend(contribution.ports);
        entry.volumes.extend(contribution.volumes);
        entry.env.extend(contribution.env);
        entry.create_args.extend(contribution.create_args);
    }

    pub fn entry(&self, identity: &str) -> Option<&SettingsEntry> {
        self.index.get(identity).map(|&slot| &self.entries[slot].1)
    }

    /// 識別子のフィールドを取得（未知の識別子は空）
    pub fn get(&self, identity: &str, field: SettingField) -> Vec<String> {
        self.entry(identity)
            .map(|entry| entry.field(field))
            .unwrap_or_default()
    }

    /// 全識別子のフィールドを蓄積順に連結
    pub fn get_all(&self, field: SettingField) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(_, entry)| entry.field(field))
            .collect()
    }

    pub fn ports(&self) -> Vec<String> {
        self.get_all(SettingField::Ports)
    }

    pub fn volumes(&self) -> Vec<String> {
        self.get_all(SettingField::Volumes)
    }

    /// ホスト側ポート（最初の `:` より前）を重複なしで取得
    pub fn host_ports(&self) -> BTreeSet<String> {
        self.ports()
            .into_iter()
            .map(|pair| match pair.split_once(':') {
                Some((host, _)) => host.to_string(),
                None => pair,
            })
            .collect()
    }

    /// 識別子一覧（蓄積順）
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
