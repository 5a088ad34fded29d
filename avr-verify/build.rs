//! Stamps avr-verify with the revision it was built from
//!
//! Sets `GIT_HASH`, `BUILD_TIMESTAMP` and `BUILD_PROFILE` for the startup
//! banner. `AVR_BUILD_REVISION` overrides the git lookup for builds made
//! from a source archive; a tree with uncommitted changes is marked `-dirty`.

use std::process::Command;

const REVISION_OVERRIDE: &str = "AVR_BUILD_REVISION";

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn revision() -> String {
    if let Ok(revision) = std::env::var(REVISION_OVERRIDE) {
        if !revision.trim().is_empty() {
            return revision.trim().to_string();
        }
    }

    let Some(hash) = git(&["rev-parse", "--short=8", "HEAD"]) else {
        return "unknown".to_string();
    };

    // Re-stamp when HEAD moves or the index changes
    for path in ["HEAD", "index"] {
        if let Some(git_path) = git(&["rev-parse", "--git-path", path]) {
            println!("cargo:rerun-if-changed={}", git_path);
        }
    }

    match git(&["status", "--porcelain", "--untracked-files=no"]) {
        Some(changes) if !changes.is_empty() => format!("{}-dirty", hash),
        _ => hash,
    }
}

fn main() {
    println!("cargo:rerun-if-env-changed={}", REVISION_OVERRIDE);
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src");

    let built_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", revision());
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", built_at);
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);
}
