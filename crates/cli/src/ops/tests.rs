//! End-to-end pipeline runs against scripted external tools

use super::pipeline::PipelineOrchestrator;
use super::publish::Delivery;
use crate::config::{ConfigFile, Mode, PipelineConfig, RunArgs};
use crate::error::{CliError, Stage};
use crate::generator::test_config_path;
use crate::process::{CommandOutput, CommandSpec};
use crate::test_helpers::FakeRunner;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const HEAD: &str = "3f2a9c1d0b7e4f5a6b7c8d9e0f1a2b3c4d5e6f7a\n";
const SPEC: &str = r#"{"info":{"version":"1.0"}}"#;

struct World {
    spec: &'static str,
    generator_fails: bool,
    status: &'static str,
}

impl World {
    fn new() -> Self {
        Self {
            spec: SPEC,
            generator_fails: false,
            status: " M src/Client.cs\n",
        }
    }

    /// Scripted git, npm, swagger-pack, java and nuget with the side effects the pipeline relies on
    fn script(self) -> impl Fn(&CommandSpec) -> CommandOutput {
        move |command| {
            let args: Vec<&str> = command.args.iter().map(String::as_str).collect();
            match command.program.as_str() {
                "git" if args.first() == Some(&"clone") => {
                    let dir = Path::new(args[2]);
                    fs::create_dir_all(dir.join(".git")).unwrap();
                    if args[1].ends_with("widget-api.git") {
                        fs::create_dir_all(dir.join("api")).unwrap();
                        fs::write(dir.join("api/widget-api.json"), self.spec).unwrap();
                    }
                    CommandOutput::ok("")
                }
                "git" if args.contains(&"--abbrev-ref") => CommandOutput::ok("main\n"),
                "git" if args.contains(&"--verify") => CommandOutput::failed(1, ""),
                "git" if args.contains(&"rev-parse") => CommandOutput::ok(HEAD),
                "git" if args.contains(&"--porcelain") => CommandOutput::ok(self.status),
                "swagger-pack" => CommandOutput::ok(fs::read_to_string(args[0]).unwrap()),
                "java" => {
                    let input = args
                        .iter()
                        .position(|a| *a == "-i")
                        .map(|i| args[i + 1])
                        .unwrap();
                    if self.generator_fails || !Path::new(input).is_file() {
                        CommandOutput::failed(1, "generation exploded")
                    } else {
                        CommandOutput::ok("")
                    }
                }
                _ => CommandOutput::ok(""),
            }
        }
    }
}

fn config(root: &Path, mode: Mode, credential: Option<&str>, keep_workspace: bool) -> PipelineConfig {
    let settings = ConfigFile {
        output_root: root.join("clients"),
        keep_workspace_on_failure: keep_workspace,
        ..ConfigFile::default()
    };
    PipelineConfig::from_args(
        RunArgs {
            mode,
            spec_repo: "widget-api".to_string(),
            credential: credential.map(str::to_string),
            output: None,
            workspace: Some(root.join("temp")),
        },
        settings,
    )
    .unwrap()
}

fn has_arg(runner: &FakeRunner, arg: &str) -> bool {
    runner
        .calls()
        .iter()
        .any(|c| c.args.iter().any(|a| a == arg))
}

#[test]
fn test_folder_mode_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(temp_dir.path(), Mode::Folder, None, true);
    let runner = FakeRunner::new(World::new().script());

    let report = PipelineOrchestrator::new(&config, &runner).run().unwrap();

    assert_eq!(report.package_name, "WidgetApiClient");
    assert_eq!(report.version, "1.0.0");
    assert_eq!(report.commit_id, "3f2a9c1d");
    assert_eq!(report.delivery, Delivery::Folder);
    assert_eq!(report.teardown_error, None);
    assert_eq!(
        report.output_dir,
        temp_dir.path().join("clients").join("widget-api-client")
    );

    // Collated into temp/swagger/<name>.json and handed to the generator
    let calls = runner.calls();
    let generate = calls.iter().find(|c| c.stage == Stage::Generate).unwrap();
    let collated = temp_dir
        .path()
        .join("temp")
        .join("swagger")
        .join("widget-api.json");
    assert!(generate
        .args
        .contains(&collated.to_string_lossy().into_owned()));
    assert!(generate
        .args
        .contains(&"packageName=WidgetApiClient".to_string()));

    let app_config = test_config_path(&report.output_dir, "WidgetApiClient");
    assert!(app_config.ends_with("src/WidgetApiClient.Test/app.config"));
    assert!(fs::read_to_string(app_config)
        .unwrap()
        .contains("WidgetApiClient"));

    // No repository or package interaction, workspace gone
    assert!(!calls.iter().any(|c| c.program == "nuget"));
    assert!(!has_arg(&runner, "push"));
    assert!(!temp_dir.path().join("temp").exists());
}

#[test]
fn test_folder_mode_yaml_spec() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(temp_dir.path(), Mode::Folder, None, true);
    let spec_dir = config.workspace.repo_dir("widget-api").join("api");
    fs::create_dir_all(&spec_dir).unwrap();
    fs::create_dir_all(config.workspace.repo_dir("widget-api").join(".git")).unwrap();
    fs::write(spec_dir.join("widget-api.yaml"), "info:\n  version: '2.1'\n").unwrap();
    let runner = FakeRunner::new(World::new().script());

    let report = PipelineOrchestrator::new(&config, &runner).run().unwrap();

    assert_eq!(report.version, "2.1.0");
    let lines = runner.lines();
    assert!(lines[0].ends_with("pull --ff-only"));
    assert!(lines.iter().any(|l| l.starts_with("swagger-pack") && l.ends_with("widget-api.yaml")));
}

#[test]
fn test_repo_mode_generator_failure() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(temp_dir.path(), Mode::Repo, None, true);
    let world = World {
        generator_fails: true,
        ..World::new()
    };
    let runner = FakeRunner::new(world.script());

    let error = PipelineOrchestrator::new(&config, &runner).run().unwrap_err();

    match error {
        CliError::ExternalTool {
            stage, ref stderr, ..
        } => {
            assert_eq!(stage, Stage::Generate);
            assert_eq!(stderr, "generation exploded");
        }
        ref other => panic!("Expected ExternalTool, got {other:?}"),
    }
    assert_eq!(error.exit_code(), 1);

    // Nothing committed or pushed
    assert!(!has_arg(&runner, "commit"));
    assert!(!has_arg(&runner, "push"));

    // The created branch was rolled back after the failure
    let lines = runner.lines();
    let generate_index = runner
        .calls()
        .iter()
        .position(|c| c.stage == Stage::Generate)
        .unwrap();
    let undo: Vec<&String> = lines[generate_index + 1..].iter().collect();
    assert_eq!(undo.len(), 3);
    assert!(undo[0].ends_with("checkout -f main"));
    assert!(undo[2].ends_with("branch -D auto-generated-commit#3f2a9c1d"));

    // Workspace kept for diagnostics
    assert!(config.workspace.swagger_file("widget-api", specsync_core::SpecFormat::Json).is_file());
}

#[test]
fn test_failure_destroys_workspace_when_configured() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(temp_dir.path(), Mode::Repo, None, false);
    let world = World {
        generator_fails: true,
        ..World::new()
    };
    let runner = FakeRunner::new(world.script());

    assert!(PipelineOrchestrator::new(&config, &runner).run().is_err());
    assert!(!config.workspace.root().exists());
}

#[test]
fn test_repo_mode_pushes_branch() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(temp_dir.path(), Mode::Repo, None, true);
    let runner = FakeRunner::new(World::new().script());

    let report = PipelineOrchestrator::new(&config, &runner).run().unwrap();

    assert_eq!(report.package_name, "WidgetClient");
    assert_eq!(
        report.delivery,
        Delivery::Pushed {
            branch: "auto-generated-commit#3f2a9c1d".to_string()
        }
    );
    assert!(report.output_dir.join("appveyor.yml").is_file());
    assert!(!runner.calls().iter().any(|c| c.stage == Stage::Compensate));

    // Branch prepared before generation, pushed after
    let calls = runner.calls();
    let checkout = calls.iter().position(|c| c.args.contains(&"-b".to_string())).unwrap();
    let generate = calls.iter().position(|c| c.stage == Stage::Generate).unwrap();
    let push = calls.iter().position(|c| c.args.contains(&"push".to_string())).unwrap();
    assert!(checkout < generate && generate < push);
}

#[test]
fn test_repo_mode_without_changes() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(temp_dir.path(), Mode::Repo, None, true);
    let world = World {
        status: "",
        ..World::new()
    };
    let runner = FakeRunner::new(world.script());

    let report = PipelineOrchestrator::new(&config, &runner).run().unwrap();

    assert!(matches!(report.delivery, Delivery::Unchanged { .. }));
    assert!(!has_arg(&runner, "commit"));
    assert!(!config.workspace.root().exists());
}

#[test]
fn test_nuget_mode_publishes_package() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(temp_dir.path(), Mode::Nuget, Some("api-key-123"), true);
    let runner = FakeRunner::new(World::new().script());

    let report = PipelineOrchestrator::new(&config, &runner).run().unwrap();

    assert_eq!(
        report.delivery,
        Delivery::Published {
            package: "widget-api-client".to_string(),
            version: "1.0.0".to_string(),
        }
    );
    let nuget: Vec<String> = runner
        .calls()
        .iter()
        .filter(|c| c.program == "nuget")
        .map(|c| c.args[0].clone())
        .collect();
    assert_eq!(nuget, vec!["pack", "push"]);
    assert!(runner.lines().iter().all(|l| !l.contains("api-key-123")));
}

#[test]
fn test_missing_spec_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(temp_dir.path(), Mode::Folder, None, true);
    let runner = FakeRunner::new(|command| {
        if command.args.iter().any(|a| a == "rev-parse") {
            CommandOutput::ok(HEAD)
        } else {
            CommandOutput::ok("")
        }
    });

    let error = PipelineOrchestrator::new(&config, &runner).run().unwrap_err();

    assert!(matches!(error, CliError::Config(_)));
    assert!(!runner.calls().iter().any(|c| c.stage == Stage::Generate));
}

#[test]
fn test_malformed_spec_aborts_before_generation() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(temp_dir.path(), Mode::Folder, None, true);
    let world = World {
        spec: r#"{"info":{"title":"no version"}}"#,
        ..World::new()
    };
    let runner = FakeRunner::new(world.script());

    let error = PipelineOrchestrator::new(&config, &runner).run().unwrap_err();

    assert_eq!(error.stage(), Some(Stage::Version));
    assert!(!runner.calls().iter().any(|c| c.stage == Stage::Generate));
}

#[test]
fn test_invalid_config_touches_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = config(temp_dir.path(), Mode::Nuget, Some("key"), true);
    config.credential = None;
    let runner = FakeRunner::succeeding();

    let error = PipelineOrchestrator::new(&config, &runner).run().unwrap_err();

    assert_eq!(error.exit_code(), 2);
    assert!(runner.calls().is_empty());
    assert!(!config.workspace.root().exists());
}

#[test]
fn test_output_inside_workspace_is_rejected_before_any_work() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = config(temp_dir.path(), Mode::Folder, None, true);
    config.output_dir = temp_dir.path().join("temp").join("client");
    fs::create_dir_all(&config.output_dir).unwrap();
    fs::write(config.output_dir.join("Client.cs"), "// earlier delivery").unwrap();
    let runner = FakeRunner::new(World::new().script());

    let error = PipelineOrchestrator::new(&config, &runner).run().unwrap_err();

    assert!(matches!(error, CliError::Config(_)));
    assert_eq!(error.exit_code(), 2);
    assert!(runner.calls().is_empty());
    assert!(config.output_dir.join("Client.cs").is_file());
}

#[cfg(unix)]
#[test]
fn test_teardown_failure_keeps_delivery() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();

    // Privileged users ignore directory permissions; nothing to observe then
    let scratch = temp_dir.path().join("scratch");
    fs::create_dir_all(&scratch).unwrap();
    fs::set_permissions(&scratch, fs::Permissions::from_mode(0o555)).unwrap();
    let privileged = fs::write(scratch.join("file.txt"), "").is_ok();
    fs::set_permissions(&scratch, fs::Permissions::from_mode(0o755)).unwrap();
    if privileged {
        return;
    }

    let config = config(temp_dir.path(), Mode::Folder, None, true);
    let locked = config.workspace.root().join("locked");
    let world = World::new().script();
    let lock_dir = locked.clone();
    let runner = FakeRunner::new(move |command| {
        if command.stage == Stage::Generate {
            fs::create_dir_all(&lock_dir).unwrap();
            fs::write(lock_dir.join("file.txt"), "x").unwrap();
            fs::set_permissions(&lock_dir, fs::Permissions::from_mode(0o555)).unwrap();
        }
        world(command)
    });

    let result = PipelineOrchestrator::new(&config, &runner).run();
    if locked.exists() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    }

    let report = result.unwrap();
    assert_eq!(report.delivery, Delivery::Folder);
    let teardown = report.teardown_error.unwrap();
    assert!(teardown.contains("file.txt"), "{teardown}");
    // The delivered client is untouched
    assert!(test_config_path(&report.output_dir, "WidgetApiClient").is_file());
    assert!(locked.join("file.txt").exists());
}
