//! End-to-end pipeline tests.
//!
//! A temporary workspace is laid out the way a real one is, and a small
//! shell script stands in for the C compiler: it answers `--version`,
//! records its arguments and writes whatever `-o` names.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use gecko_compiler::{build, load_project, BuildConfig, BuildError, BuildRequest, ProjectLayout, TargetStyle};
use pretty_assertions::assert_eq;

// ══════════════════════════════════════════════════════════════════════════════
// Fixtures
// ══════════════════════════════════════════════════════════════════════════════

/// Scripts are written then executed; serialising avoids `ETXTBSY` when
/// another test forks while a script is still open for writing.
static SCRIPT_LOCK: Mutex<()> = Mutex::new(());

const CODE_LIST: &str = r#"
--- !CodeList
project: demo
title: Demo Codes
author: alice
game: Super Smash Bros Melee
game_id: GALE01
codes:
  - !Code
    file: intro
    name: Intro Skip
    author: alice
    description: Skips the intro.
  - !Code [outro, Fast Credits, alice]
"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// A workspace with the demo project and one shared source.
fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("projects/alice/demo/codelist.yaml"), CODE_LIST);
    write(&root.join("projects/alice/demo/src/intro.c"), "void intro(void) {}\n");
    write(&root.join("projects/alice/demo/src/more/outro.c"), "void outro(void) {}\n");
    fs::create_dir_all(root.join("projects/alice/demo/include/alice/demo")).unwrap();
    write(&root.join("src/gecko.c"), "int main(void) { return 0; }\n");
    write(&root.join("include/gecko.h"), "\n");
    fs::create_dir_all(root.join("include/stdext")).unwrap();
    dir
}

#[cfg(unix)]
fn fake_compiler(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fakecc");
    let script = format!(
        "#!/bin/sh\n\
         if [ \"$1\" = \"--version\" ]; then echo \"fakecc 1.0\"; exit 0; fi\n\
         printf '%s\\n' \"$@\" > \"{args}\"\n\
         {body}\n",
        args = dir.join("args.txt").display(),
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
const WRITES_OUTPUT: &str = r#"out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then shift; out="$1"; fi
  shift
done
echo "fakecc: linking $out"
printf 'binary' > "$out""#;

#[cfg(unix)]
const FAILS: &str = r#"echo "intro.c:1: error: expected ';'" 1>&2
exit 1"#;

fn config(root: &Path, compiler: &Path) -> BuildConfig {
    BuildConfig::new(root)
        .with_compiler(compiler)
        .with_target(TargetStyle::Unix)
}

// ══════════════════════════════════════════════════════════════════════════════
// Successful build
// ══════════════════════════════════════════════════════════════════════════════

#[cfg(unix)]
#[test]
fn builds_demo_project() {
    init_logging();
    let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|p| p.into_inner());
    let ws = workspace();
    let tools = tempfile::tempdir().unwrap();
    let cc = fake_compiler(tools.path(), WRITES_OUTPUT);
    let root = ws.path();

    let report = build(&config(root, &cc), &BuildRequest::new("alice", "demo")).unwrap();

    // One artifact and four sidecars.
    assert_eq!(report.artifact, root.join("bin/alice/demo"));
    assert_eq!(fs::read_to_string(&report.artifact).unwrap(), "binary");
    assert_eq!(report.digests.len(), 4);
    for ext in ["md5", "sha1", "sha256", "blake2"] {
        let sidecar = root.join(format!("bin/alice/demo.{ext}"));
        let line = fs::read_to_string(&sidecar).unwrap();
        assert!(line.ends_with(&format!(" *{}\n", report.artifact.display())), "{line}");
    }
    let md5 = fs::read_to_string(root.join("bin/alice/demo.md5")).unwrap();
    // md5("binary")
    assert!(md5.starts_with("9d7183f16acce70658f686ae7f1a4d20 "), "{md5}");

    // The log holds the version probe, the command and its output.
    let log = fs::read_to_string(&report.log).unwrap();
    assert!(log.contains("--version\nfakecc 1.0\n"), "{log}");
    assert!(log.contains("-std=gnu99"), "{log}");
    assert!(log.contains("fakecc: linking"), "{log}");

    // Shared sources come first, then code sources in manifest order.
    assert_eq!(
        report.sources,
        vec![
            root.join("src/gecko.c"),
            root.join("projects/alice/demo/src/intro.c"),
            root.join("projects/alice/demo/src/more/outro.c"),
        ]
    );

    // DOLPHIN headers list intro then outro.
    let dispatch = fs::read_to_string(&report.dispatch).unwrap();
    let intro = dispatch.find("\"$Intro Skip [alice]\\n\"").unwrap();
    let outro = dispatch.find("\"$Fast Credits [alice]\\n\"").unwrap();
    assert!(intro < outro);
    assert_eq!(report.dispatch, root.join("include/__gen__/standard.h"));
    assert!(report.declarations.is_file());

    let json = report.to_json().unwrap();
    assert!(json.contains("\"sha256\""), "{json}");
}

#[cfg(unix)]
#[test]
fn compiler_receives_includes_and_defines() {
    init_logging();
    let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|p| p.into_inner());
    let ws = workspace();
    let tools = tempfile::tempdir().unwrap();
    let cc = fake_compiler(tools.path(), WRITES_OUTPUT);
    let root = ws.path();

    let config = config(root, &cc).with_compat(true).with_address(0x80002000);
    build(&config, &BuildRequest::new("alice", "\"demo\"")).unwrap();

    let args = fs::read_to_string(tools.path().join("args.txt")).unwrap();
    let args: Vec<&str> = args.lines().collect();
    let includes: Vec<&str> = args.iter().copied().filter(|a| a.starts_with("-I")).collect();
    assert_eq!(
        includes,
        vec![
            format!("-I{}", root.join("include").display()),
            format!("-I{}", root.join("include/__gen__").display()),
            format!("-I{}", root.join("include/stdext").display()),
            format!("-I{}", root.join("projects/alice/demo/include").display()),
            format!("-I{}", root.join("projects/alice/demo/include/alice").display()),
            format!("-I{}", root.join("projects/alice/demo/include/alice/demo").display()),
        ]
    );
    assert!(args.contains(&"-D__GECKO_H_CODEHANDLERADDR__=0x80002000"));
    assert!(args.contains(&"-D__GECKO_H_CODEHANDLERSIZE__=2880"));
    assert!(args.contains(&"-D__GECKO_H_CODEHANDLERSCOMPAT__"));
}

// ══════════════════════════════════════════════════════════════════════════════
// Failures
// ══════════════════════════════════════════════════════════════════════════════

#[cfg(unix)]
#[test]
fn missing_artifact_is_compile_failure() {
    init_logging();
    let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|p| p.into_inner());
    let ws = workspace();
    let tools = tempfile::tempdir().unwrap();
    let cc = fake_compiler(tools.path(), FAILS);
    let root = ws.path();

    // A stale artifact from an earlier build must not count as success.
    write(&root.join("bin/alice/demo"), "stale");

    let err = build(&config(root, &cc), &BuildRequest::new("alice", "demo")).unwrap_err();
    match err {
        BuildError::CompileFailed { artifact, log } => {
            assert!(!artifact.exists());
            let log = fs::read_to_string(log).unwrap();
            assert!(log.contains("error: expected ';'"), "{log}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!root.join("bin/alice/demo.md5").exists());
}

#[cfg(unix)]
#[test]
fn compiler_that_cannot_start_still_writes_log() {
    use std::os::unix::fs::PermissionsExt;

    init_logging();
    let ws = workspace();
    let tools = tempfile::tempdir().unwrap();
    let root = ws.path();
    let cc = tools.path().join("brokencc");
    fs::write(&cc, "#!/bin/sh\nexit 0\n").unwrap();
    fs::set_permissions(&cc, fs::Permissions::from_mode(0o644)).unwrap();

    let err = build(&config(root, &cc), &BuildRequest::new("alice", "demo")).unwrap_err();
    assert!(matches!(err, BuildError::Spawn { .. }), "{err}");

    let log = fs::read_to_string(root.join("bin/alice/demo.log")).unwrap();
    assert!(log.contains("--version"), "{log}");
    assert!(log.contains("brokencc"), "{log}");
    assert!(!root.join("bin/alice/demo").exists());
}

#[test]
fn unknown_compiler_still_writes_log() {
    let ws = workspace();
    let root = ws.path();

    let config = BuildConfig::new(root).with_compiler("/no/such/dir/cc");
    let err = build(&config, &BuildRequest::new("alice", "demo")).unwrap_err();
    assert!(matches!(err, BuildError::CompilerNotFound(_)), "{err}");

    let log = fs::read_to_string(root.join("bin/alice/demo.log")).unwrap();
    assert!(log.contains("/no/such/dir/cc"), "{log}");
}

#[test]
fn author_mismatch_is_rejected() {
    let ws = workspace();
    let root = ws.path();
    write(&root.join("projects/bob/demo/codelist.yaml"), CODE_LIST);

    let layout = ProjectLayout::new(root, "bob", "demo");
    let err = load_project(&layout, &BuildRequest::new("bob", "demo")).unwrap_err();
    assert!(
        err.to_string()
            .contains("Code list author \"alice\" does not match the provided author \"bob\""),
        "{err}"
    );
}

#[test]
fn invalid_code_list_names_file_and_field() {
    let ws = workspace();
    let root = ws.path();
    write(
        &root.join("projects/alice/demo/codelist.yaml"),
        &CODE_LIST.replace("game_id: GALE01", "game_id: GALE0"),
    );

    let layout = ProjectLayout::new(root, "alice", "demo");
    let err = load_project(&layout, &BuildRequest::new("alice", "demo")).unwrap_err();
    match &err {
        BuildError::InvalidCodeList { path, source } => {
            assert!(path.ends_with("codelist.yaml"));
            assert_eq!(source.field, "game_id");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_code_list_is_reported() {
    let ws = workspace();
    let layout = ProjectLayout::new(ws.path(), "alice", "nothing");
    let err = load_project(&layout, &BuildRequest::new("alice", "nothing")).unwrap_err();
    assert!(matches!(err, BuildError::Missing(_)), "{err}");
}

#[test]
fn unresolved_code_stops_before_generation() {
    let ws = workspace();
    let root = ws.path();
    fs::remove_file(root.join("projects/alice/demo/src/more/outro.c")).unwrap();

    let config = BuildConfig::new(root).with_compiler("/unused/cc");
    let err = build(&config, &BuildRequest::new("alice", "demo")).unwrap_err();
    assert!(matches!(err, BuildError::SourceNotFound { ref file, .. } if file == "outro"), "{err}");
    assert!(!root.join("include/__gen__").exists());
}

#[test]
fn too_few_sources_is_rejected() {
    let ws = workspace();
    let root = ws.path();
    fs::remove_file(root.join("src/gecko.c")).unwrap();
    write(
        &root.join("projects/alice/demo/codelist.yaml"),
        "!CodeList [demo, Demo, alice, Melee, GALE01, [!Code [intro, Intro, alice]]]\n",
    );

    let config = BuildConfig::new(root).with_compiler("/unused/cc");
    let err = build(&config, &BuildRequest::new("alice", "demo")).unwrap_err();
    assert!(matches!(err, BuildError::MissingSources { found: 1 }), "{err}");
}

#[test]
fn gen_dir_taken_by_file_is_rejected() {
    let ws = workspace();
    let root = ws.path();
    write(&root.join("include/__gen__"), "not a directory");

    let config = BuildConfig::new(root).with_compiler("/unused/cc");
    let err = build(&config, &BuildRequest::new("alice", "demo")).unwrap_err();
    assert!(matches!(err, BuildError::OccupiedByFile(_)), "{err}");
}
