//! Build script for xcvrctl.
//!
//! Sets:
//! - XCVRCTL_VERSION: $XCVRCTL_VERSION if given, else the crate version
//! - XCVRCTL_GIT_SHA: short git commit hash, "unknown" outside a checkout
//! - XCVRCTL_BUILD_DATE: UTC build date

use std::path::{Path, PathBuf};
use std::process::Command;

/// Walk up from the crate directory to the checkout's `.git`.
fn git_dir(manifest_dir: &Path) -> Option<PathBuf> {
    manifest_dir
        .ancestors()
        .map(|dir| dir.join(".git"))
        .find(|dir| dir.exists())
}

fn short_sha(git_dir: &Path) -> Option<String> {
    let output = Command::new("git")
        .arg("--git-dir")
        .arg(git_dir)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let sha = String::from_utf8(output.stdout).ok()?;
    Some(sha.trim().to_string()).filter(|s| !s.is_empty())
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=XCVRCTL_VERSION");

    let version =
        std::env::var("XCVRCTL_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let git_dir = git_dir(&manifest_dir);
    if let Some(dir) = &git_dir {
        // HEAD moves on checkout, refs/heads on commit
        println!("cargo:rerun-if-changed={}", dir.join("HEAD").display());
        println!("cargo:rerun-if-changed={}", dir.join("refs/heads").display());
    }
    let git_sha = git_dir
        .as_deref()
        .and_then(short_sha)
        .unwrap_or_else(|| "unknown".to_string());

    let build_date = chrono::Utc::now().format("%Y-%m-%d").to_string();

    println!("cargo:rustc-env=XCVRCTL_VERSION={}", version);
    println!("cargo:rustc-env=XCVRCTL_GIT_SHA={}", git_sha);
    println!("cargo:rustc-env=XCVRCTL_BUILD_DATE={}", build_date);
}
