//! 設定ツリーのディープマージ
//!
//! 優先度の低いツリー (`base`) に高いツリー (`overlay`) を重ねます。
//! - `unmergable` に含まれるキーは上位の値で丸ごと置き換え
//! - 両方がマッピングなら再帰的にマージ
//! - 両方がリストなら `base` → `overlay` の順に連結
//! - それ以外は上位の値を採用
//! - 上位が null なら、置き換え対象のキーも含めて下位を維持

use crate::model::{Node, NodeMap};

/// 2つのツリーをマージした新しいツリーを返す
pub fn merge(base: &Node, overlay: &Node, unmergable: &[&str]) -> Node {
    match (base, overlay) {
        (Node::Map(base_map), Node::Map(overlay_map)) => {
            Node::Map(merge_maps(base_map, overlay_map, unmergable))
        }
        (Node::List(base_items), Node::List(overlay_items)) => {
            Node::List(base_items.iter().chain(overlay_items).cloned().collect())
        }
        (base, overlay) if overlay.is_null() => base.clone(),
        (_, overlay) => overlay.clone(),
    }
}

fn merge_maps(base: &NodeMap, overlay: &NodeMap, unmergable: &[&str]) -> NodeMap {
    let mut merged = base.clone();
    for (key, value) in overlay {
        let next = match merged.get(key) {
            Some(existing) if value.is_null() => existing.clone(),
            Some(_) if unmergable.contains(&key.as_str()) => value.clone(),
            Some(existing) => merge(existing, value, unmergable),
            None => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}

/// 現在のツリーの下に、より優先度の低い層を敷く
///
/// `layer` が `None`（ファイル無しなど）の場合は何もしない。
pub fn underlay(current: Node, layer: Option<&Node>, unmergable: &[&str]) -> Node {
    match layer {
        Some(base) => merge(base, &current, unmergable),
        None => current,
    }
}
