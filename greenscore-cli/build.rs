use std::path::Path;
use std::process::Command;

fn git(root: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git").arg("-C").arg(root).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let s = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!s.is_empty()).then_some(s)
}

fn main() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");

    // e.g. "3f2a9c1d" or "3f2a9c1d-dirty"
    let sha = git(&root, &["describe", "--always", "--dirty", "--abbrev=8"])
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=GREENSCORE_BUILD_SHA={sha}");

    for watched in [".git/HEAD", ".git/index"] {
        println!("cargo:rerun-if-changed={}", root.join(watched).display());
    }
}
