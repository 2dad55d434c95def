//! Git testing utilities

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Returns true when a usable git binary is on the PATH
pub fn is_git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn run(path: &Path, args: &[&str]) -> Result<()> {
    let output = Command::new("git").args(args).current_dir(path).output()?;
    if !output.status.success() {
        anyhow::bail!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}

/// Creates a clonable source repository at `<root>/<owner>/<name>`
///
/// The owner/name layout makes the directory path double as a repository
/// URL whose last two segments are the owner and repository name.
pub fn create_source_repo(root: &Path, owner: &str, name: &str) -> Result<PathBuf> {
    let path = root.join(owner).join(name);
    std::fs::create_dir_all(&path)?;

    run(&path, &["init"])?;
    run(&path, &["config", "user.name", "Test User"])?;
    run(&path, &["config", "user.email", "test@example.com"])?;
    run(&path, &["config", "commit.gpgsign", "false"])?;

    std::fs::write(path.join("README.md"), "# test repository\n")?;
    run(&path, &["add", "README.md"])?;
    run(&path, &["commit", "-m", "initial commit"])?;

    Ok(path)
}
