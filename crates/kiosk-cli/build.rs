use std::env;
use std::process::Command;

use time::OffsetDateTime;
use time::macros::format_description;

/// Set by packagers building from a source tarball without `.git`.
const REV_OVERRIDE: &str = "KIOSK_GIT_REV";

fn main() {
    println!("cargo:rerun-if-env-changed={REV_OVERRIDE}");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    if let Some(head) = git(&["rev-parse", "--git-path", "HEAD"]) {
        println!("cargo:rerun-if-changed={head}");
    }

    let rev = env::var(REV_OVERRIDE)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| git(&["describe", "--always", "--dirty", "--abbrev=8"]))
        .unwrap_or_else(|| "nogit".to_string());
    println!("cargo:rustc-env=KIOSK_BUILD={rev}, built {}", build_day());
}

fn git(args: &[&str]) -> Option<String> {
    let out = Command::new("git").args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8(out.stdout).ok()?;
    Some(text.trim().to_string()).filter(|s| !s.is_empty())
}

fn build_day() -> String {
    let stamp = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .unwrap_or_else(OffsetDateTime::now_utc);
    stamp
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| "unknown day".to_string())
}
