//! コンテナ解決
//!
//! マニフェストの各コンテナについて、デフォルト・個別ファイル・インライン定義・
//! include 継承を重ね合わせ、設定アキュムレータへ副作用を記録します。

use crate::error::{Result, StackError};
use crate::identity::{Namespace, identity};
use crate::interpolate::{EnvBinding, interpolate};
use crate::loader::{GLOBAL_DEFAULTS, SearchRoots};
use crate::merge::underlay;
use crate::model::{
    ContainerConfig, MANIFEST_FILE, Node, StackManifest, StackPath, UNMERGABLE_KEYS, VmMount,
};
use crate::settings::{Contribution, SettingsAccumulator};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, instrument};

/// プロビジョナースクリプトのコンテナ内マウント先
pub const PROVISIONERS_MOUNT: &str = "/provisioners";

/// 1回の解決で共有するコンテキスト
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    /// スタック名（ワークスペースディレクトリ名）
    pub stack: String,
    pub namespace: Namespace,
    /// ネットワーク共有の無効化指定
    pub disable_network: bool,
    /// リモートVMでの実行を強制
    pub force_vm: bool,
    pub roots: SearchRoots,
    /// `${NAME}` 展開に使う変数
    pub env: EnvBinding,
}

impl ResolutionContext {
    pub fn new(roots: SearchRoots, env: EnvBinding) -> Self {
        let stack = stack_name(&roots.workspace);
        Self {
            stack,
            namespace: Namespace::default(),
            disable_network: false,
            force_vm: false,
            roots,
            env,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = stack.into();
        self
    }

    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_network_disabled(mut self, disabled: bool) -> Self {
        self.disable_network = disabled;
        self
    }

    pub fn with_force_vm(mut self, force_vm: bool) -> Self {
        self.force_vm = force_vm;
        self
    }

    /// ネットワーク共有が有効か
    ///
    /// 名前空間が指定されている場合は無効化できない。
    pub fn network_enabled(&self) -> bool {
        !(self.namespace.is_empty() && self.disable_network)
    }

    /// コンテナ名から識別子を生成
    pub fn identity(&self, container: &str) -> String {
        identity(&self.stack, container, &self.namespace)
    }
}

/// ディレクトリ名をスタック名として取得
pub fn stack_name(workspace: &Path) -> String {
    workspace
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string()
}

/// 解決済みコンテナ
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedContainer {
    pub name: String,
    pub identity: String,
    /// マージ・展開済みの設定ツリー
    pub tree: Node,
    #[serde(skip)]
    pub config: ContainerConfig,
}

/// 解決結果
#[derive(Debug, Clone)]
pub struct Resolution {
    pub stack: String,
    pub namespace: Namespace,
    pub registry: String,
    pub organization: String,
    /// マニフェストの記述順
    pub containers: Vec<ResolvedContainer>,
    pub settings: SettingsAccumulator,
    /// 識別子 → 表示用プロビジョナーコマンド
    pub provisioners: BTreeMap<String, Vec<String>>,
    /// 識別子 → スナップショット定義
    pub snapshots: BTreeMap<String, Node>,
    pub vm_mounts: BTreeSet<VmMount>,
}

impl Resolution {
    /// コンテナを名前で取得
    pub fn container(&self, name: &str) -> Result<&ResolvedContainer> {
        self.containers
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| StackError::ContainerNotFound(name.to_string()))
    }
}

/// ワークスペースの stack.yaml を読み込んで解決
#[instrument(skip(ctx), fields(workspace = %ctx.roots.workspace.display()))]
pub fn load_and_resolve(ctx: &ResolutionContext) -> Result<Resolution> {
    let manifest = StackManifest::load(&ctx.roots.workspace.join(MANIFEST_FILE))?;
    resolve_stack(&manifest, ctx)
}

/// マニフェストを解決
///
/// 以下の順に重ね合わせる（後ほど優先）:
/// 1. グローバルデフォルト（インストール先 → ワークスペース）
/// 2. `dockers.defaults`
/// 3. コンテナ個別ファイル（インストール先 → ワークスペース）
/// 4. マニフェストのインラインエントリ
///
/// `include` があれば対象コンテナのファイルを最下層に敷く。
#[instrument(skip(manifest, ctx), fields(stack = %ctx.stack, namespace = %ctx.namespace))]
pub fn resolve_stack(manifest: &StackManifest, ctx: &ResolutionContext) -> Result<Resolution> {
    info!(containers = manifest.dockers.len(), "Resolving stack");
    ctx.roots.check();

    let defaults = global_defaults(manifest, &ctx.roots)?;

    let mut resolution = Resolution {
        stack: ctx.stack.clone(),
        namespace: ctx.namespace.clone(),
        registry: manifest.registry.clone(),
        organization: manifest.organization.clone(),
        containers: Vec::with_capacity(manifest.dockers.len()),
        settings: SettingsAccumulator::new(),
        provisioners: BTreeMap::new(),
        snapshots: BTreeMap::new(),
        vm_mounts: BTreeSet::new(),
    };

    for entry in &manifest.dockers {
        let tree = merge_container(&entry.name, &entry.raw, &defaults, manifest, ctx)?;
        let config = ContainerConfig::from_node(&tree)?;
        let id = ctx.identity(&entry.name);
        record_settings(&id, &config, ctx, &mut resolution)?;

        debug!(container = %entry.name, identity = %id, "Container resolved");
        resolution.containers.push(ResolvedContainer {
            name: entry.name.clone(),
            identity: id,
            tree,
            config,
        });
    }

    info!(
        containers = resolution.containers.len(),
        vm_mounts = resolution.vm_mounts.len(),
        "Stack resolved"
    );
    Ok(resolution)
}

/// グローバルデフォルトを構築
fn global_defaults(manifest: &StackManifest, roots: &SearchRoots) -> Result<Node> {
    let stack_defaults = manifest.defaults.clone().unwrap_or_default();
    let files = roots.load_layers(GLOBAL_DEFAULTS)?;
    Ok(underlay(stack_defaults, files.as_ref(), UNMERGABLE_KEYS))
}

/// 1コンテナ分のツリーをマージ・展開
fn merge_container(
    name: &str,
    raw: &Node,
    defaults: &Node,
    manifest: &StackManifest,
    ctx: &ResolutionContext,
) -> Result<Node> {
    let own_files = ctx.roots.load_layers(name)?;
    let mut tree = underlay(raw.clone(), own_files.as_ref(), UNMERGABLE_KEYS);
    tree = underlay(tree, Some(defaults), UNMERGABLE_KEYS);

    let include = match tree.get("include") {
        None => None,
        Some(node) if node.is_null() => None,
        Some(node) => Some(node.as_str().map(str::to_string).ok_or_else(|| {
            StackError::InvalidConfig(format!("dockers.{}.include は文字列である必要があります", name))
        })?),
    };

    if let Some(include) = include {
        debug!(container = %name, include = %include, "Merging included container");
        let included = ctx.roots.load_layers(&include)?;
        tree = underlay(tree, included.as_ref(), UNMERGABLE_KEYS);
        if !has_image(&tree) {
            tree.insert("image", Node::string(format!("{}/{}", manifest.organization, include)));
        }
    }

    if !has_image(&tree) {
        tree.insert("image", Node::string(format!("{}/{}", manifest.organization, name)));
    }

    interpolate(&tree, &ctx.env)
}

fn has_image(tree: &Node) -> bool {
    tree.get("image").is_some_and(|image| !image.is_null())
}

/// マージ済み設定から副作用（ポート・ボリューム等）を記録
fn record_settings(
    id: &str,
    config: &ContainerConfig,
    ctx: &ResolutionContext,
    resolution: &mut Resolution,
) -> Result<()> {
    let workspace = &ctx.roots.workspace;

    for line in &config.provisioners {
        let provisioner = parse_provisioner(line)?;
        let script = StackPath::expand(provisioner.script, workspace);
        let basename = script.file_name().to_string();

        let mut display = basename.clone();
        for arg in &provisioner.args {
            display.push(' ');
            display.push_str(arg);
        }
        resolution
            .provisioners
            .entry(id.to_string())
            .or_default()
            .push(display);

        resolution.settings.configure(
            id,
            Contribution::volumes([format!(
                "{}:{}/{}",
                script.to_remote(),
                PROVISIONERS_MOUNT,
                basename
            )]),
        );
        resolution.vm_mounts.insert(VmMount::script(script));
    }

    if !config.ports.is_empty() {
        resolution
            .settings
            .configure(id, Contribution::ports(config.ports.iter().cloned()));
    }

    for spec in &config.volumes {
        let volume = VolumeSpec::parse(spec)?;
        let host = StackPath::expand(volume.host, workspace);
        resolution.settings.configure(
            id,
            Contribution::volumes([format!("{}:{}", host.to_remote(), volume.container)]),
        );
        resolution.vm_mounts.insert(VmMount {
            path: host,
            owner: volume.owner.map(str::to_string),
            group: volume.group.map(str::to_string),
        });
    }

    if let Some(snapshots) = &config.snapshots {
        resolution
            .snapshots
            .insert(id.to_string(), snapshots.clone());
    }

    if !config.env.is_empty() {
        resolution
            .settings
            .configure(id, Contribution::env(config.env.clone()));
    }

    if !config.create_args.is_empty() {
        resolution.settings.configure(
            id,
            Contribution::create_args(config.create_args.iter().cloned()),
        );
    }

    if config.privileged {
        resolution
            .settings
            .configure(id, Contribution::create_args(["--privileged"]));
    }

    Ok(())
}

/// ボリューム指定 `host:container[|owner[|group]]`
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeSpec<'a> {
    pub host: &'a str,
    pub container: &'a str,
    pub owner: Option<&'a str>,
    pub group: Option<&'a str>,
}

impl<'a> VolumeSpec<'a> {
    /// 最後の `:` で分割してパース
    pub fn parse(spec: &'a str) -> Result<Self> {
        let (host, rest) = spec
            .rsplit_once(':')
            .ok_or_else(|| StackError::InvalidVolumeSpec(spec.to_string()))?;
        let mut parts = rest.split('|');
        let container = parts.next().unwrap_or_default();
        let owner = parts.next().filter(|s| !s.is_empty());
        let group = parts.next().filter(|s| !s.is_empty());

        if host.trim().is_empty() || container.trim().is_empty() || parts.next().is_some() {
            return Err(StackError::InvalidVolumeSpec(spec.to_string()));
        }

        Ok(Self {
            host,
            container,
            owner,
            group,
        })
    }
}

/// プロビジョナー指定 `script arg1 arg2`
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionerSpec<'a> {
    pub script: &'a str,
    pub args: Vec<&'a str>,
}

fn parse_provisioner(line: &str) -> Result<ProvisionerSpec<'_>> {
    let mut words = line.split_whitespace();
    let script = words
        .next()
        .ok_or_else(|| StackError::InvalidProvisionerSpec(line.to_string()))?;
    Ok(ProvisionerSpec {
        script,
        args: words.collect(),
    })
}
