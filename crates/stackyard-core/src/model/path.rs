//! パス定義
//!
//! ホスト側パスとリモートVM側パスを区別して保持します。
//! 変換は [`StackPath::to_remote`] のみで行います。

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// パス種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    /// ホストOSのパス表記
    Host,
    /// Linux（VM・コンテナ）側のパス表記
    Remote,
}

/// 種別タグ付きパス
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct StackPath {
    pub kind: PathKind,
    pub path: String,
}

impl StackPath {
    pub fn host(path: impl Into<String>) -> Self {
        Self {
            kind: PathKind::Host,
            path: path.into(),
        }
    }

    /// ホストパスを `base` 基準で絶対パスに展開
    pub fn expand(raw: &str, base: &Path) -> Self {
        if is_absolute(raw) {
            Self::host(normalize(raw))
        } else {
            let joined = format!("{}/{}", base.display(), raw);
            Self::host(normalize(&joined))
        }
    }

    /// リモート（Linux）表記に変換
    ///
    /// `C:\work\data` → `/c/work/data`
    pub fn to_remote(&self) -> Self {
        if self.kind == PathKind::Remote {
            return self.clone();
        }
        let unified = self.path.replace('\\', "/");
        let path = match drive_letter(&unified) {
            Some(drive) => format!("/{}{}", drive.to_ascii_lowercase(), &unified[2..]),
            None => unified,
        };
        Self {
            kind: PathKind::Remote,
            path,
        }
    }

    /// ファイル名部分
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .find(|s| !s.is_empty())
            .unwrap_or(&self.path)
    }
}

impl fmt::Display for StackPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// VMへ共有するマウントポイント
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VmMount {
    pub path: StackPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl VmMount {
    /// プロビジョナースクリプト用（所有者指定なし）
    pub fn script(path: StackPath) -> Self {
        Self {
            path,
            owner: None,
            group: None,
        }
    }
}

impl fmt::Display for VmMount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        if self.owner.is_some() || self.group.is_some() {
            write!(
                f,
                "|{}|{}",
                self.owner.as_deref().unwrap_or(""),
                self.group.as_deref().unwrap_or("")
            )?;
        }
        Ok(())
    }
}

fn drive_letter(path: &str) -> Option<char> {
    let mut chars = path.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(letter), Some(':'), Some('/')) if letter.is_ascii_alphabetic() => Some(letter),
        _ => None,
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || path.starts_with('\\') || drive_letter(&path.replace('\\', "/")).is_some()
}

/// `.` と `..` を字句的に解決
fn normalize(path: &str) -> String {
    let separator = if path.contains('\\') && !path.contains('/') {
        '\\'
    } else {
        '/'
    };
    let leading = path.starts_with(separator);
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join(separator.to_string().as_str());
    if leading {
        format!("{}{}", separator, joined)
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_relative() {
        let path = StackPath::expand("./data/../cache", Path::new("/srv/stack"));
        assert_eq!(path.path, "/srv/stack/cache");
        assert_eq!(path.kind, PathKind::Host);
    }

    #[test]
    fn test_expand_absolute_unchanged() {
        let path = StackPath::expand("/var/lib/data", Path::new("/srv/stack"));
        assert_eq!(path.path, "/var/lib/data");
    }

    #[test]
    fn test_windows_path_to_remote() {
        let path = StackPath::host(r"C:\work\stack\data");
        let remote = path.to_remote();
        assert_eq!(remote.path, "/c/work/stack/data");
        assert_eq!(remote.kind, PathKind::Remote);
    }

    #[test]
    fn test_windows_path_is_absolute() {
        let path = StackPath::expand(r"D:\data", Path::new("/ignored"));
        assert_eq!(path.to_remote().path, "/d/data");
    }

    #[test]
    fn test_posix_path_to_remote_unchanged() {
        let remote = StackPath::host("/srv/data").to_remote();
        assert_eq!(remote.path, "/srv/data");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(StackPath::host("/srv/scripts/setup.sh").file_name(), "setup.sh");
        assert_eq!(StackPath::host(r"C:\scripts\run.sh").file_name(), "run.sh");
    }

    #[test]
    fn test_vm_mount_display() {
        let mount = VmMount {
            path: StackPath::host("/srv/data"),
            owner: Some("www-data".to_string()),
            group: None,
        };
        assert_eq!(mount.to_string(), "/srv/data|www-data|");
        assert_eq!(
            VmMount::script(StackPath::host("/srv/a.sh")).to_string(),
            "/srv/a.sh"
        );
    }
}
