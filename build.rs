use std::process::Command;

/// Pass `git describe` through the CARGO_GIT_VERSION env variable for `--version`.
///
/// NOTE: Cargo.toml still needs to be updated on releases
fn set_version_from_git() {
    let cmd = Command::new("git")
        .args(["describe", "--always", "--dirty", "--tags"])
        .output();

    match cmd {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout);
            println!("cargo:rustc-env=CARGO_GIT_VERSION={}", version.trim());
            // rerun when git checks out another ref or any ref changes
            println!("cargo:rerun-if-changed=.git/refs/");
            println!("cargo:rerun-if-changed=.git/HEAD");
        }
        // Source tarballs have no git metadata; fall back to the crate version.
        _ => eprintln!("git describe failed; ignoring"),
    }
}

fn main() {
    set_version_from_git();
}
