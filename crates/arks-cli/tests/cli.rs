use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A temporary port tree with one GitHub-hosted artifact.
struct TestContext {
    _temp_dir: TempDir,
    port: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let port = temp_dir.path().join("port");

        write(
            &port,
            "config.toml",
            r#"
platforms = { "_/_" = "linux/amd64" }

[target]
path = "github.com"

[resolvers.protoc]
path = "/releases/download/v{{.Version}}/protoc-{{.Version}}-{{.Os}}-{{.Arch}}.zip"
platforms = { "linux/_arm" = "linux/aarch_64", "linux/_amd64" = "linux/x86_64" }
"#,
        );
        write(&port, "github.com/config.toml", "[target]\npath = \".\"\n");
        write(
            &port,
            "github.com/protocolbuffers/protobuf/config.toml",
            "[target]\npath = \"https://github.com/protocolbuffers/protobuf\"\n",
        );
        write(&port, "github.com/protocolbuffers/protobuf/protoc/config.toml", "[target]\npath = \".\"\n");
        write(&port, "github.com/protocolbuffers/protobuf/protoc/app.toml", "");
        write(
            &port,
            "github.com/protocolbuffers/protobuf/protoc/versions",
            "# latest first\n33.4 latest\n33.3\n",
        );

        Self {
            _temp_dir: temp_dir,
            port,
        }
    }

    fn arks(&self, args: &[&str]) -> Output {
        let bin_path = env!("CARGO_BIN_EXE_arks");
        Command::new(bin_path)
            .arg("--port")
            .arg(&self.port)
            .args(args)
            .env_remove("RUST_LOG")
            .output()
            .expect("failed to run arks")
    }
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.arks(&["--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage:"));
}

#[test]
fn test_query() {
    let ctx = TestContext::new();
    let output = ctx.arks(&["query", "/github.com/protocolbuffers/protobuf/protoc@latest/linux/aarch64"]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        stdout(&output).trim(),
        "https://github.com/protocolbuffers/protobuf/releases/download/v33.4/protoc-33.4-linux-aarch_64.zip"
    );
}

#[test]
fn test_query_not_found_fails() {
    let ctx = TestContext::new();
    let output = ctx.arks(&["query", "/github.com/nobody/nothing/x@1/linux/amd64"]);
    assert!(!output.status.success());

    let output = ctx.arks(&["query", "not-an-identifier"]);
    assert!(!output.status.success());
}

#[test]
fn test_render_kv() {
    let ctx = TestContext::new();
    let output = ctx.arks(&["render", "--kind", "kv"]);
    assert!(output.status.success(), "{output:?}");

    let out = stdout(&output);
    assert!(out.contains(
        "github.com/protocolbuffers/protobuf/protoc@33.3/linux/arm64,https://github.com/protocolbuffers/protobuf/releases/download/v33.3/protoc-33.3-linux-aarch_64.zip"
    ));
    assert!(out.contains("protoc@latest/darwin/x86_64,"));
}

#[test]
fn test_commit_diff_cycle() {
    let ctx = TestContext::new();
    assert!(!ctx.arks(&["diff"]).status.success());

    let output = ctx.arks(&["commit"]);
    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("github.com/protocolbuffers/protobuf/protoc"));
    assert!(
        ctx.port
            .join("github.com/protocolbuffers/protobuf/protoc/snapshot")
            .exists()
    );
    assert!(ctx.arks(&["diff"]).status.success());

    write(
        &ctx.port,
        "github.com/protocolbuffers/protobuf/protoc/versions",
        "33.5\n33.4 latest\n33.3\n",
    );
    let output = ctx.arks(&["diff"]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("v33.5"));
}

#[test]
fn test_conflict_check() {
    let ctx = TestContext::new();
    assert!(ctx.arks(&["test"]).status.success());

    write(
        &ctx.port,
        "github.com/protocolbuffers/protobuf/app.toml",
        "name = \"protoc\"\nresolver = \"protoc\"\n",
    );
    write(&ctx.port, "github.com/protocolbuffers/protobuf/versions", "33.4\n");
    let output = ctx.arks(&["test"]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("conflict"));
}
