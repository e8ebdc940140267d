//! build
//!
//! Cargo build-script integration.
//!
//! Turns repository facts into `cargo:rustc-env` directives so a crate can
//! read them with `env!` at compile time, plus `cargo:rerun-if-changed`
//! directives so the build script reruns when HEAD, branches or tags move.
//!
//! # Example
//!
//! ```no_run
//! // build.rs
//! fn main() {
//!     gitfacts::build::emit_cargo_env(env!("CARGO_MANIFEST_DIR"));
//! }
//!
//! // src/main.rs
//! // const VERSION: &str = env!("GIT_DESCRIBE");
//! ```
//!
//! Every variable is always emitted. Absent facts become empty strings, so
//! `env!` compiles even outside a repository.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;

use crate::core::config::Config;
use crate::git::GitService;
use crate::query::GitFacts;

/// Variable name suffixes, in emission order.
pub const VARIABLES: [&str; 6] = [
    "BRANCH",
    "COMMIT",
    "COMMIT_SHORT",
    "DESCRIBE",
    "HEAD_TAG",
    "DIRTY",
];

/// Emit directives for the repository containing `project_dir` on stdout.
///
/// Configuration is read from the default locations. A broken config file
/// is reported and defaults are used; a build never fails because of it.
///
/// Unless the build script installed its own subscriber, warnings and
/// errors are forwarded to Cargo as `cargo:warning=` lines.
pub fn emit_cargo_env(project_dir: impl AsRef<Path>) {
    emit_to(project_dir.as_ref(), Arc::new(Mutex::new(io::stdout())));
}

fn emit_to<W: Write + Send + 'static>(project_dir: &Path, out: Arc<Mutex<W>>) {
    if tracing::dispatcher::has_been_set() {
        emit(project_dir, &out);
        return;
    }

    let subscriber = tracing_subscriber::fmt()
        .with_writer(CargoWarnings(Arc::clone(&out)))
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::with_default(subscriber, || emit(project_dir, &out));
}

fn emit<W: Write>(project_dir: &Path, out: &Mutex<W>) {
    let config = Config::load(Some(project_dir)).unwrap_or_else(|err| {
        tracing::error!(error = %err, "failed to load gitfacts config, using defaults");
        Config::default()
    });

    let name = project_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    let facts = match GitFacts::from_config(Arc::new(GitService::new()), project_dir, name, &config) {
        Ok(facts) => facts,
        Err(err) => {
            tracing::error!(error = %err, "failed to create git facts");
            return;
        }
    };

    // Render first: queries may log, and logging writes to `out` too
    let mut directives = Vec::new();
    let written = write_cargo_env(&facts, &config.env_prefix(), config.abbrev(), &mut directives)
        .and_then(|()| out.lock().write_all(&directives));
    if let Err(err) = written {
        tracing::error!(error = %err, "failed to write cargo directives");
    }
}

/// Turns formatted log events into `cargo:warning=` lines.
struct CargoWarnings<W>(Arc<Mutex<W>>);

impl<'a, W: Write + 'a> MakeWriter<'a> for CargoWarnings<W> {
    type Writer = WarningLines<'a, W>;

    fn make_writer(&'a self) -> Self::Writer {
        WarningLines {
            out: &self.0,
            buf: Vec::new(),
        }
    }
}

/// One log event, buffered until dropped.
struct WarningLines<'a, W: Write> {
    out: &'a Mutex<W>,
    buf: Vec<u8>,
}

impl<W: Write> Write for WarningLines<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Write> Drop for WarningLines<'_, W> {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let mut out = self.out.lock();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            // Nowhere left to report a failed write
            let _ = writeln!(out, "cargo:warning={line}");
        }
    }
}

/// Write `cargo:` directives for `facts` to `out`.
///
/// Variable names are `prefix` followed by each entry of [`VARIABLES`].
/// `abbrev` is the length of the `COMMIT_SHORT` value.
pub fn write_cargo_env(
    facts: &GitFacts,
    prefix: &str,
    abbrev: u32,
    out: &mut impl Write,
) -> io::Result<()> {
    let commit = facts.commit();
    let values = [
        facts.branch_name().value(),
        commit.get().as_ref().map(|oid| oid.to_string()),
        commit.get().as_ref().map(|oid| oid.short(abbrev as usize)),
        facts.describe().value(),
        facts
            .head_tag()
            .get()
            .as_ref()
            .map(|tag| tag.short_name().to_string()),
        facts.is_dirty().get().map(|dirty| dirty.to_string()),
    ];

    for (name, value) in VARIABLES.iter().zip(values) {
        writeln!(
            out,
            "cargo:rustc-env={prefix}{name}={}",
            value.unwrap_or_default()
        )?;
    }

    if let Some(git) = facts.git().get() {
        let watched = [
            git.git_dir().join("HEAD"),
            git.common_dir().join("refs/heads"),
            git.common_dir().join("refs/tags"),
            git.common_dir().join("packed-refs"),
        ];
        // Cargo reruns every build for a path that does not exist
        for path in watched.iter().filter(|p| p.exists()) {
            writeln!(out, "cargo:rerun-if-changed={}", path.display())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) {
        let status = std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .status()
            .expect("git command failed");
        assert!(status.success(), "git {args:?} failed");
    }

    fn commit(dir: &Path) {
        git(
            dir,
            &[
                "-c", "user.name=t", "-c", "user.email=t@t", "-c", "commit.gpgsign=false",
                "commit", "-q", "--allow-empty", "-m", "init",
            ],
        );
    }

    fn emitted(project_dir: &Path) -> String {
        let out = Arc::new(Mutex::new(Vec::new()));
        emit_to(project_dir, Arc::clone(&out));
        let bytes = out.lock().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn outside_repository_emits_empty_values() {
        let dir = TempDir::new().unwrap();
        let facts = GitFacts::new(Arc::new(GitService::new()), dir.path(), "plain").unwrap();

        let mut out = Vec::new();
        write_cargo_env(&facts, "GIT_", 7, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "cargo:rustc-env=GIT_BRANCH=",
                "cargo:rustc-env=GIT_COMMIT=",
                "cargo:rustc-env=GIT_COMMIT_SHORT=",
                "cargo:rustc-env=GIT_DESCRIBE=",
                "cargo:rustc-env=GIT_HEAD_TAG=",
                "cargo:rustc-env=GIT_DIRTY=",
            ]
        );
    }

    #[test]
    fn prefix_is_applied() {
        let dir = TempDir::new().unwrap();
        let facts = GitFacts::new(Arc::new(GitService::new()), dir.path(), "plain").unwrap();

        let mut out = Vec::new();
        write_cargo_env(&facts, "APP_", 7, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().all(|l| l.starts_with("cargo:rustc-env=APP_")));
    }

    #[test]
    fn broken_config_becomes_a_cargo_warning() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(Config::PROJECT_FILE), "[describe\n").unwrap();

        let text = emitted(dir.path());
        assert!(
            text.lines().any(|l| l.starts_with("cargo:warning=")
                && l.contains("failed to load gitfacts config")),
            "got:\n{text}"
        );
        assert!(text.contains("cargo:rustc-env=GIT_BRANCH=\n"));
    }

    #[test]
    fn git_failures_become_cargo_warnings() {
        let dir = TempDir::new().unwrap();
        git(dir.path(), &["init", "-q"]);
        commit(dir.path());
        std::fs::write(
            dir.path().join(".git/refs/tags/broken"),
            "0123456789abcdef0123456789abcdef01234567\n",
        )
        .unwrap();

        let text = emitted(dir.path());
        assert!(
            text.lines().any(|l| l.starts_with("cargo:warning=")
                && l.contains("failed to query git for the current HEAD tag")),
            "got:\n{text}"
        );
        assert!(text.contains("cargo:rustc-env=GIT_HEAD_TAG=\n"));
    }

    #[test]
    fn healthy_repository_emits_no_warnings() {
        let dir = TempDir::new().unwrap();
        git(dir.path(), &["init", "-q"]);
        commit(dir.path());

        let text = emitted(dir.path());
        assert!(!text.contains("cargo:warning="), "got:\n{text}");
        assert!(text.contains("cargo:rerun-if-changed="));
    }
}
