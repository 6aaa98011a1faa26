//! Shared test infrastructure for integration tests.
//!
//! A `Checkout` is a throwaway web-platform-tests tree whose `wpt` script and
//! metadata updater are shell stand-ins that record how they were called.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub struct Checkout {
    _dir: TempDir,
    root: PathBuf,
}

impl Checkout {
    pub fn create() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        // The binary sees the canonical cwd, so compare against that.
        let root = dir.path().canonicalize().expect("canonical temp dir");
        let checkout = Self { _dir: dir, root };
        fs::create_dir_all(checkout.root().join("tools")).expect("tools dir");
        fs::create_dir_all(checkout.root().join("css")).expect("css dir");
        checkout.write_script(
            "wpt",
            &format!(
                "echo \"$*\" >> '{}'",
                checkout.manifest_calls_path().display()
            ),
        );
        checkout.write_script(
            "update-meta",
            &format!(
                "[ \"$1\" = --request ] || exit 2\ncp \"$2\" '{}'",
                checkout.request_path().display()
            ),
        );
        checkout
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_calls_path(&self) -> PathBuf {
        self.root().join("manifest-calls.txt")
    }

    pub fn request_path(&self) -> PathBuf {
        self.root().join("request.json")
    }

    pub fn write_script(&self, name: &str, body: &str) {
        let path = self.root().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        let mut perms = fs::metadata(&path).expect("script metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("chmod script");
    }

    pub fn write_file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, content).expect("write file");
        path
    }

    /// Run the binary from the checkout root with `--root` pointing at it.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_wpt-update"))
            .args(args)
            .arg("--root")
            .arg(self.root())
            .current_dir(self.root())
            .env_remove("WPT_ROOT")
            .env_remove("RUST_LOG")
            .output()
            .expect("run wpt-update")
    }

    pub fn manifest_calls(&self) -> Vec<String> {
        match fs::read_to_string(self.manifest_calls_path()) {
            Ok(text) => text.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn request(&self) -> Option<serde_json::Value> {
        let text = fs::read_to_string(self.request_path()).ok()?;
        Some(serde_json::from_str(&text).expect("parse request JSON"))
    }
}

pub fn sh_available() -> bool {
    Path::new("/bin/sh").exists()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
