//! `devjournal install-hook`: installs the `post-commit` hook that invokes `devjournal hook`.

use anyhow::{bail, Result};
use clap::Args;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::output::print_success;

#[derive(Args)]
pub struct InstallHookArgs {
    /// Repository root to install into (defaults to the current directory)
    #[arg(long)]
    repo: Option<String>,
}

fn hook_script() -> String {
    "#!/bin/sh\ndevjournal hook >/dev/null 2>&1 || true\n".to_string()
}

fn backup_existing(hook_path: &Path) -> Result<Option<PathBuf>> {
    if !hook_path.exists() {
        return Ok(None);
    }
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_millis();
    let backup_path = hook_path.with_file_name(format!("post-commit.backup.{millis}"));
    std::fs::copy(hook_path, &backup_path)?;
    Ok(Some(backup_path))
}

pub fn execute(args: InstallHookArgs, quiet: bool) -> Result<()> {
    let repo_path = args
        .repo
        .map(PathBuf::from)
        .unwrap_or(std::env::current_dir()?);
    let hooks_dir = repo_path.join(".git").join("hooks");
    if !hooks_dir.is_dir() {
        bail!("hooks directory not found: {}", hooks_dir.display());
    }

    let hook_path = hooks_dir.join("post-commit");
    let backup = backup_existing(&hook_path)?;

    std::fs::write(&hook_path, hook_script())?;
    let mut perms = std::fs::metadata(&hook_path)?.permissions();
    perms.set_mode(perms.mode() | 0o111);
    std::fs::set_permissions(&hook_path, perms)?;

    match backup {
        Some(path) => print_success(
            &format!(
                "installed post-commit hook (backed up previous hook to {})",
                path.display()
            ),
            quiet,
        ),
        None => print_success("installed post-commit hook", quiet),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_script_invokes_devjournal_hook_and_never_fails_the_commit() {
        let script = hook_script();
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains("devjournal hook"));
        assert!(script.trim_end().ends_with("|| true"));
    }

    #[test]
    fn backup_existing_is_none_when_no_hook_present() {
        let dir = tempfile::tempdir().unwrap();
        let hook_path = dir.path().join("post-commit");
        assert!(backup_existing(&hook_path).unwrap().is_none());
    }

    #[test]
    fn backup_existing_copies_prior_hook_and_leaves_it_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let hook_path = dir.path().join("post-commit");
        std::fs::write(&hook_path, "#!/bin/sh\necho old\n").unwrap();

        let backup = backup_existing(&hook_path).unwrap().expect("backup path");
        assert!(backup.exists());
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "#!/bin/sh\necho old\n");
        assert!(hook_path.exists(), "original hook must survive the backup");
    }

    #[test]
    fn execute_installs_executable_hook_in_fresh_repo() {
        let dir = tempfile::tempdir().unwrap();
        let hooks_dir = dir.path().join(".git").join("hooks");
        std::fs::create_dir_all(&hooks_dir).unwrap();

        let args = InstallHookArgs {
            repo: Some(dir.path().to_string_lossy().into_owned()),
        };
        execute(args, true).unwrap();

        let hook_path = hooks_dir.join("post-commit");
        assert!(hook_path.exists());
        let mode = std::fs::metadata(&hook_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111, "hook must be executable");
    }

    #[test]
    fn execute_fails_without_git_hooks_directory() {
        let dir = tempfile::tempdir().unwrap();
        let args = InstallHookArgs {
            repo: Some(dir.path().to_string_lossy().into_owned()),
        };
        assert!(execute(args, true).is_err());
    }
}
