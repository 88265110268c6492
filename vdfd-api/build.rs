//! Build script for vdfd-api
//!
//! Bakes build identification into the binary so the startup log line and
//! `/health` can name the exact build:
//! - GIT_HASH: short commit hash, or `VDFD_GIT_HASH` when building outside
//!   a git checkout (release tarballs, container builds)
//! - BUILD_TIMESTAMP: UTC build time
//! - BUILD_PROFILE: cargo profile (debug/release)

use std::process::Command;

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}

fn main() {
    // An explicit hash wins over whatever git reports
    let git_hash = std::env::var("VDFD_GIT_HASH")
        .ok()
        .filter(|h| !h.trim().is_empty())
        .or_else(git_short_hash)
        .unwrap_or_else(|| "unknown".to_string());

    // RFC 3339 in UTC with second precision, e.g. 2025-10-26T19:30:45Z
    let build_timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    // Exposed to the crate through env!()
    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp);
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);

    // Any rerun-if directive would stop cargo from running this script on
    // every build, leaving a stale hash and timestamp
}
