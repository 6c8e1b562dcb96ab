//! Platform Locator (spec §4.1): enumerates candidate Cursor workspace-storage directories
//! in priority order, deduplicated, without checking existence.

use std::path::PathBuf;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    MacOs,
    Linux,
    Windows,
    Wsl,
}

pub fn detect_platform() -> Result<PlatformKind> {
    match std::env::consts::OS {
        "macos" => Ok(PlatformKind::MacOs),
        "windows" => Ok(PlatformKind::Windows),
        "linux" => {
            if is_wsl() {
                Ok(PlatformKind::Wsl)
            } else {
                Ok(PlatformKind::Linux)
            }
        }
        other => Err(Error::config(format!("unsupported platform: {other}"))),
    }
}

fn is_wsl() -> bool {
    if let Ok(contents) = std::fs::read_to_string("/proc/version") {
        let lower = contents.to_lowercase();
        return lower.contains("microsoft") || lower.contains("wsl");
    }
    std::env::var("WSL_DISTRO_NAME").is_ok() || std::env::var("WSL_INTEROP").is_ok()
}

/// Returns candidate workspace-storage directories, in priority order, with duplicates removed.
/// Paths are returned whether or not they exist on disk; the caller filters.
pub fn get_cursor_workspace_paths() -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("CURSOR_WORKSPACE_PATH") {
        paths.push(PathBuf::from(env_path));
    }

    let platform = detect_platform()?;
    match platform {
        PlatformKind::MacOs => paths.extend(macos_paths()),
        PlatformKind::Linux => paths.extend(linux_paths()),
        PlatformKind::Windows => paths.extend(windows_paths()),
        PlatformKind::Wsl => {
            paths.extend(wsl_paths());
            paths.extend(linux_paths());
        }
    }

    paths.extend(fallback_paths());

    Ok(dedup_preserve_order(paths))
}

fn macos_paths() -> Vec<PathBuf> {
    dirs::home_dir()
        .map(|home| {
            vec![home.join("Library/Application Support/Cursor/User/workspaceStorage")]
        })
        .unwrap_or_default()
}

fn linux_paths() -> Vec<PathBuf> {
    let mut out = Vec::new();
    let default_config = dirs::home_dir().map(|h| h.join(".config"));

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let xdg_path = PathBuf::from(&xdg);
        out.push(xdg_path.join("Cursor/User/workspaceStorage"));
        if Some(&xdg_path) != default_config.as_ref() {
            if let Some(ref default) = default_config {
                out.push(default.join("Cursor/User/workspaceStorage"));
            }
        }
    } else if let Some(default) = default_config {
        out.push(default.join("Cursor/User/workspaceStorage"));
    }

    out
}

fn windows_paths() -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Ok(appdata) = std::env::var("APPDATA") {
        out.push(PathBuf::from(appdata.replace('\\', "/")).join("Cursor/User/workspaceStorage"));
    }
    if let Ok(profile) = std::env::var("USERPROFILE") {
        out.push(
            PathBuf::from(profile.replace('\\', "/"))
                .join("AppData/Roaming/Cursor/User/workspaceStorage"),
        );
    }
    out
}

fn wsl_paths() -> Vec<PathBuf> {
    let mut out = Vec::new();
    for mnt in ["/mnt/c/Users", "/mnt/C/Users"] {
        let users_dir = PathBuf::from(mnt);
        let Ok(entries) = std::fs::read_dir(&users_dir) else {
            continue;
        };
        for entry in entries.flatten() {
            if entry.path().is_dir() {
                out.push(
                    entry
                        .path()
                        .join("AppData/Roaming/Cursor/User/workspaceStorage"),
                );
            }
        }
    }
    out
}

fn fallback_paths() -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Some(home) = dirs::home_dir() {
        out.push(home.join("cursor-portable/User/workspaceStorage"));
        out.push(home.join("Cursor/User/workspaceStorage"));
    }
    out.push(PathBuf::from("/opt/cursor/User/workspaceStorage"));
    out.push(PathBuf::from(
        "/Applications/Cursor.app/Contents/Resources/User/workspaceStorage",
    ));
    out
}

fn dedup_preserve_order(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = std::collections::HashSet::new();
    paths
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_removes_duplicates_preserving_order() {
        let paths = vec![
            PathBuf::from("/a"),
            PathBuf::from("/b"),
            PathBuf::from("/a"),
        ];
        let deduped = dedup_preserve_order(paths);
        assert_eq!(deduped, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn cursor_workspace_path_env_takes_priority() {
        std::env::set_var("CURSOR_WORKSPACE_PATH", "/custom/path");
        let paths = get_cursor_workspace_paths().unwrap();
        assert_eq!(paths[0], PathBuf::from("/custom/path"));
        std::env::remove_var("CURSOR_WORKSPACE_PATH");
    }

    #[test]
    fn fallback_paths_always_present() {
        std::env::remove_var("CURSOR_WORKSPACE_PATH");
        let paths = get_cursor_workspace_paths().unwrap();
        assert!(paths
            .iter()
            .any(|p| p.ends_with("opt/cursor/User/workspaceStorage") || p.to_string_lossy().contains("opt/cursor")));
    }
}
