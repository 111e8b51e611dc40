use assert_cmd::Command;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tempfile::TempDir;

#[derive(Debug)]
pub struct TkRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
    pub duration: Duration,
    pub log_path: PathBuf,
}

impl TkRun {
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}

pub struct TkWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub log_dir: PathBuf,
}

impl TkWorkspace {
    /// Workspace whose root directory is named `name`, so created IDs carry a
    /// predictable prefix.
    pub fn named(name: &str) -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().join(name);
        let log_dir = temp_dir.path().join("logs");
        fs::create_dir_all(&root).expect("workspace root");
        fs::create_dir_all(&log_dir).expect("log dir");
        Self {
            temp_dir,
            root,
            log_dir,
        }
    }

    pub fn new() -> Self {
        Self::named("my-project")
    }

    pub fn tickets_dir(&self) -> PathBuf {
        self.root.join(".tickets")
    }

    pub fn ticket_path(&self, id: &str) -> PathBuf {
        self.tickets_dir().join(format!("{id}.md"))
    }

    /// Drop a raw file into the tickets directory.
    pub fn write_ticket_file(&self, name: &str, text: &str) -> PathBuf {
        let dir = self.tickets_dir();
        fs::create_dir_all(&dir).expect("tickets dir");
        let path = dir.join(name);
        fs::write(&path, text).expect("write ticket file");
        path
    }

    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).expect("read file")
    }
}

pub fn run_tk<I, S>(workspace: &TkWorkspace, args: I, label: &str) -> TkRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_tk_with_env(
        workspace,
        args,
        std::iter::empty::<(String, String)>(),
        label,
    )
}

pub fn run_tk_with_env<I, S, E, K, V>(
    workspace: &TkWorkspace,
    args: I,
    env_vars: E,
    label: &str,
) -> TkRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tk"));
    cmd.current_dir(&workspace.root);
    cmd.args(args);
    cmd.env_remove("TICKETS_DIR");
    cmd.env_remove("TK_TICKETS_DIR");
    cmd.env_remove("TK_QUERY_ENGINE");
    cmd.env_remove("TK_JQ_PATH");
    cmd.envs(env_vars);
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_LOG", "ticket_rust=debug");
    cmd.env("RUST_BACKTRACE", "1");
    cmd.env("HOME", &workspace.root);

    let start = Instant::now();
    let output = cmd.output().expect("run tk");
    let duration = start.elapsed();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let log_path = workspace.log_dir.join(format!("{label}.log"));
    let timestamp = SystemTime::now();
    let log_body = format!(
        "label: {label}\nstarted: {:?}\nduration: {:?}\nstatus: {}\nargs: {:?}\ncwd: {}\n\nstdout:\n{}\n\nstderr:\n{}\n",
        timestamp,
        duration,
        output.status,
        cmd.get_args().collect::<Vec<_>>(),
        workspace.root.display(),
        stdout,
        stderr
    );
    fs::write(&log_path, log_body).expect("write log");

    TkRun {
        stdout,
        stderr,
        status: output.status,
        duration,
        log_path,
    }
}

/// Create a ticket through the CLI and return the printed ID.
pub fn create_ticket(workspace: &TkWorkspace, args: &[&str], label: &str) -> String {
    let mut full = vec!["create"];
    full.extend_from_slice(args);
    let run = run_tk(workspace, full, label);
    assert!(run.status.success(), "create failed: {}", run.stderr);
    run.stdout.trim().to_string()
}
