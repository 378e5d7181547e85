use crate::utils;
use colored::Colorize;
use stackyard_core::{Handoff, LaunchSpec};
use std::path::PathBuf;

pub fn handle(
    workspace: Option<PathBuf>,
    container: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let ctx = utils::build_context(workspace)?;
    let resolution = match stackyard_core::load_and_resolve(&ctx) {
        Ok(resolution) => resolution,
        Err(e) => utils::exit_with_error("解決エラー", &e),
    };

    let mut handoff = stackyard_core::handoff(&resolution, &ctx);
    if let Some(name) = &container {
        resolution.container(name)?;
        handoff.containers.retain(|c| &c.name == name);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&handoff)?);
        return Ok(());
    }

    print_handoff(&handoff);
    Ok(())
}

fn print_handoff(handoff: &Handoff) {
    println!(
        "{} {}{}",
        "スタック:".bold(),
        handoff.stack.cyan(),
        handoff.namespace.cyan()
    );
    println!("  registry: {}", handoff.registry);
    println!("  organization: {}", handoff.organization);
    if handoff.force_vm {
        println!("  {}", "VM実行: 強制".yellow());
    }

    for spec in &handoff.containers {
        println!();
        print_container(spec);
    }

    if !handoff.provisioners.is_empty() {
        println!();
        println!("{}", "プロビジョナー:".bold());
        for (identity, commands) in &handoff.provisioners {
            for command in commands {
                println!("  {} {}", identity.cyan(), command);
            }
        }
    }

    if !handoff.snapshots.is_empty() {
        println!();
        println!("{}", "スナップショット:".bold());
        for identity in handoff.snapshots.keys() {
            println!("  • {}", identity.cyan());
        }
    }

    if !handoff.host_ports.is_empty() {
        println!();
        let ports: Vec<&str> = handoff.host_ports.iter().map(String::as_str).collect();
        println!("{} {}", "ホストポート:".bold(), ports.join(", "));
    }

    if !handoff.vm_mounts.is_empty() {
        println!();
        println!("{}", "VMマウント:".bold());
        for mount in &handoff.vm_mounts {
            println!("  • {}", mount);
        }
    }
}

fn print_container(spec: &LaunchSpec) {
    println!("{} ({})", spec.name.green().bold(), spec.identity);
    println!("  image: {}", spec.image.cyan());
    print_list("ports", &spec.ports);
    print_list("volumes", &spec.volumes);
    if !spec.env.is_empty() {
        println!("  env:");
        for (key, value) in &spec.env {
            println!("    {}={}", key, value);
        }
    }
    print_list("create_args", &spec.create_args);
}

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("  {}:", label);
    for item in items {
        println!("    - {}", item);
    }
}
