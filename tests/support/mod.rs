//! Shared fixtures for integration tests.
//!
//! Repositories are built with the real `git` CLI inside a `TempDir`.

#![allow(dead_code)]

use std::io::{self, Write};
use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

/// Test fixture that creates a real git repository on branch `main`.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// A repository with no commits.
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init", "-q", "-b", "main"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);
        run_git(dir.path(), &["config", "commit.gpgsign", "false"]);
        run_git(dir.path(), &["config", "tag.gpgsign", "false"]);
        run_git(dir.path(), &["config", "advice.nestedTag", "false"]);

        Self { dir }
    }

    /// A repository with one commit on `main`.
    pub fn new() -> Self {
        let repo = Self::empty();
        repo.commit_file("README.md", "# Test Repo\n", "Initial commit");
        repo
    }

    /// Get the path to the repository.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a file and commit it, returning the new HEAD id.
    pub fn commit_file(&self, path: &str, content: &str, message: &str) -> String {
        std::fs::write(self.path().join(path), content).unwrap();
        run_git(self.path(), &["add", path]);
        run_git(self.path(), &["commit", "-q", "-m", message]);
        self.rev_parse("HEAD")
    }

    /// Lightweight tag at `target`.
    pub fn tag(&self, name: &str, target: &str) {
        run_git(self.path(), &["tag", name, target]);
    }

    /// Annotated tag at `target` (which may itself be a tag).
    pub fn annotated_tag(&self, name: &str, target: &str) {
        run_git(self.path(), &["tag", "-a", name, "-m", name, target]);
    }

    /// Check out HEAD's commit directly.
    pub fn detach(&self) {
        run_git(self.path(), &["checkout", "-q", "--detach"]);
    }

    /// Overwrite a file without committing it.
    pub fn modify(&self, path: &str, content: &str) {
        std::fs::write(self.path().join(path), content).unwrap();
    }

    /// Resolve a revision with git itself.
    pub fn rev_parse(&self, rev: &str) -> String {
        git_output(self.path(), &["rev-parse", rev])
    }

    /// Raw content of an object.
    pub fn cat_file(&self, rev: &str) -> String {
        git_output(self.path(), &["cat-file", "-p", rev])
    }
}

/// Run a git command in the given directory.
pub fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// Run a git command and return trimmed stdout.
pub fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    assert!(output.status.success(), "git {:?} failed", args);
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

/// In-memory sink for formatted log output.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a subscriber that records every event, returning its
/// result and the log text.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer.contents())
}
