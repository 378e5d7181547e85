//! 起動直前の準備
//!
//! 蓄積済み設定とネットワーク共有引数を解決済みコンテナに適用し、
//! ランチャーへ渡す記述子を生成します。

use crate::identity::stack_container;
use crate::model::{Node, VmMount};
use crate::resolver::{Resolution, ResolutionContext, ResolvedContainer};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// ネットワーク指定とみなす create 引数
const NETWORK_FLAGS: &[&str] = &["--net", "--network"];

/// ランチャーへ渡すコンテナ記述子
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchSpec {
    pub name: String,
    pub identity: String,
    pub image: String,
    pub ports: Vec<String>,
    pub volumes: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub create_args: Vec<String>,
}

/// ランチャーへの受け渡し一式
#[derive(Debug, Clone, Serialize)]
pub struct Handoff {
    pub stack: String,
    pub namespace: String,
    pub registry: String,
    pub organization: String,
    pub force_vm: bool,
    pub containers: Vec<LaunchSpec>,
    pub host_ports: BTreeSet<String>,
    pub vm_mounts: BTreeSet<VmMount>,
    pub provisioners: BTreeMap<String, Vec<String>>,
    pub snapshots: BTreeMap<String, Node>,
}

/// create 引数にネットワーク指定が含まれるか
pub fn has_network_flag(create_args: &[String]) -> bool {
    create_args.iter().any(|arg| {
        NETWORK_FLAGS.iter().any(|flag| {
            arg == flag
                || arg
                    .strip_prefix(flag)
                    .is_some_and(|rest| rest.starts_with('='))
        })
    })
}

/// 1コンテナ分の記述子を生成
///
/// ネットワーク共有が有効で、create 引数にネットワーク指定が無ければ
/// `--net container:{stack}{namespace}` を追加します。
/// 蓄積設定（ポート以外）は解決済みの値を置き換えます。
pub fn prepare(
    container: &ResolvedContainer,
    resolution: &Resolution,
    ctx: &ResolutionContext,
) -> LaunchSpec {
    let entry = resolution
        .settings
        .entry(&container.identity)
        .cloned()
        .unwrap_or_default();

    let mut create_args = entry.create_args;
    if ctx.network_enabled() && !has_network_flag(&create_args) {
        let target = stack_container(&ctx.stack, &ctx.namespace);
        debug!(container = %container.name, target = %target, "Sharing stack network");
        create_args.push("--net".to_string());
        create_args.push(format!("container:{}", target));
    }

    LaunchSpec {
        name: container.name.clone(),
        identity: container.identity.clone(),
        image: container.config.image.clone().unwrap_or_default(),
        ports: entry.ports,
        volumes: entry.volumes,
        env: entry.env,
        create_args,
    }
}

/// 解決結果全体をランチャー向けにまとめる
pub fn handoff(resolution: &Resolution, ctx: &ResolutionContext) -> Handoff {
    Handoff {
        stack: resolution.stack.clone(),
        namespace: resolution.namespace.as_str().to_string(),
        registry: resolution.registry.clone(),
        organization: resolution.organization.clone(),
        force_vm: ctx.force_vm,
        containers: resolution
            .containers
            .iter()
            .map(|container| prepare(container, resolution, ctx))
            .collect(),
        host_ports: resolution.settings.host_ports(),
        vm_mounts: resolution.vm_mounts.clone(),
        provisioners: resolution.provisioners.clone(),
        snapshots: resolution.snapshots.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Namespace;
    use crate::interpolate::EnvBinding;
    use crate::loader::SearchRoots;
    use crate::model::StackManifest;
    use crate::resolver::resolve_stack;

    const MANIFEST: &str = r#"
registry: r
organization: acme
dockers:
  web:
    ports: ["80:80"]
    env: {MODE: prod}
    create_args: ["--memory", "256m"]
  proxy:
    create_args: ["--net=host"]
"#;

    fn resolve(ctx: &ResolutionContext) -> Resolution {
        let manifest = StackManifest::parse_str(MANIFEST).unwrap();
        resolve_stack(&manifest, ctx).unwrap()
    }

    fn ctx(dir: &std::path::Path) -> ResolutionContext {
        ResolutionContext::new(SearchRoots::new(dir, dir), EnvBinding::new()).with_stack("shop")
    }

    #[test]
    fn test_has_network_flag() {
        let args = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert!(has_network_flag(&args(&["--net", "host"])));
        assert!(has_network_flag(&args(&["--network=bridge"])));
        assert!(!has_network_flag(&args(&["--netmask", "x"])));
        assert!(!has_network_flag(&args(&[])));
    }

    #[test]
    fn test_prepare_injects_network() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = ctx(temp.path());
        let resolution = resolve(&ctx);
        let spec = prepare(resolution.container("web").unwrap(), &resolution, &ctx);
        assert_eq!(spec.image, "acme/web");
        assert_eq!(spec.ports, vec!["80:80"]);
        assert_eq!(spec.env["MODE"], "prod");
        assert_eq!(
            spec.create_args,
            vec!["--memory", "256m", "--net", "container:shop"]
        );
    }

    #[test]
    fn test_prepare_keeps_explicit_network() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = ctx(temp.path());
        let resolution = resolve(&ctx);
        let spec = prepare(resolution.container("proxy").unwrap(), &resolution, &ctx);
        assert_eq!(spec.create_args, vec!["--net=host"]);
    }

    #[test]
    fn test_prepare_network_disabled() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = ctx(temp.path()).with_network_disabled(true);
        let resolution = resolve(&ctx);
        let spec = prepare(resolution.container("web").unwrap(), &resolution, &ctx);
        assert_eq!(spec.create_args, vec!["--memory", "256m"]);
    }

    #[test]
    fn test_prepare_network_with_namespace() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = ctx(temp.path())
            .with_network_disabled(true)
            .with_namespace(Namespace::from_binding(Some("dev")));
        let resolution = resolve(&ctx);
        let spec = prepare(resolution.container("web").unwrap(), &resolution, &ctx);
        assert_eq!(spec.identity, "shop-web-dev");
        assert!(spec.create_args.ends_with(&[
            "--net".to_string(),
            "container:shop-dev".to_string()
        ]));
    }

    #[test]
    fn test_prepare_is_repeatable() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = ctx(temp.path());
        let resolution = resolve(&ctx);
        let web = resolution.container("web").unwrap();
        assert_eq!(
            prepare(web, &resolution, &ctx),
            prepare(web, &resolution, &ctx)
        );
    }

    #[test]
    fn test_handoff_collects_everything() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = ctx(temp.path()).with_force_vm(true);
        let resolution = resolve(&ctx);
        let handoff = handoff(&resolution, &ctx);
        assert_eq!(handoff.containers.len(), 2);
        assert_eq!(handoff.containers[0].name, "web");
        assert!(handoff.force_vm);
        assert!(handoff.host_ports.contains("80"));

        let json = serde_json::to_value(&handoff).unwrap();
        assert_eq!(json["containers"][0]["identity"], "shop-web");
    }
}
