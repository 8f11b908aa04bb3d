use ansible_helper::core::registry::BUILTIN_PARAMETERS;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use std::str;
use tempfile::TempDir;

/// CLI interface tests
#[cfg(test)]
mod cli_tests {
    use super::*;

    const BUILTIN_COUNT: usize = BUILTIN_PARAMETERS.len();
    const PLAYBOOK: &str = "# var:region\n# var:zone\n# option:dense\n- hosts: all\n";

    /// A scratch directory with a playbook, a config running `echo` instead
    /// of ansible-playbook, and an isolated session directory.
    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("site.yaml"), PLAYBOOK).unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "[global]\nplaybook_command = \"echo\"\n",
        )
        .unwrap();
        dir
    }

    fn helper(dir: &Path, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_ansible-helper"))
            .args(args)
            .current_dir(dir)
            .env("HOME", dir)
            .env("ANSIBLE_HELPER_CONFIG", dir.join("config.toml"))
            .env("helper_data_directory", dir.join("sessions"))
            .env("ANSIBLE_CONFIG", dir.join("missing.cfg"))
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute command")
    }

    fn stdout(output: &Output) -> &str {
        str::from_utf8(&output.stdout).expect("Invalid UTF-8")
    }

    fn stderr(output: &Output) -> &str {
        str::from_utf8(&output.stderr).expect("Invalid UTF-8")
    }

    #[test]
    fn test_cli_help() {
        let dir = workspace();
        let output = helper(dir.path(), &["site.yaml", "-?"]);

        assert!(output.status.success());
        let stdout = stdout(&output);
        assert!(stdout.contains("Usage:"));
        assert!(stdout.contains("--read <KEY>"));
        assert!(stdout.contains("Playbook variables"));
        assert!(stdout.contains("--region <VALUE>"));
    }

    #[test]
    fn test_cli_version() {
        let dir = workspace();
        let output = helper(dir.path(), &["site.yaml", "--version"]);

        assert!(output.status.success());
        assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_cli_print() {
        let dir = workspace();
        let output = helper(dir.path(), &["site.yaml", "-p"]);

        assert!(output.status.success());
        let lines: Vec<&str> = stdout(&output).lines().collect();
        assert_eq!(lines.first(), Some(&"--check"));
        assert!(lines.contains(&"--host"));
        assert_eq!(lines[lines.len() - 2..], ["--region", "--zone"]);
    }

    #[test]
    fn test_cli_print_json() {
        let dir = workspace();
        let output = helper(dir.path(), &["site.yaml", "--print", "-o", "json"]);
        assert!(output.status.success(), "{}", stderr(&output));

        let value: serde_json::Value = serde_json::from_str(stdout(&output)).unwrap();
        let region = &value.as_array().unwrap()[BUILTIN_COUNT];
        assert_eq!(region["name"], "region");
        assert_eq!(region["origin"], "playbook");
    }

    #[test]
    fn test_cli_print_with_other_option() {
        let dir = workspace();
        let output = helper(dir.path(), &["site.yaml", "--print", "-c"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Print option can not be combined"));
    }

    #[test]
    fn test_cli_runs_with_variable() {
        let dir = workspace();
        let output = helper(dir.path(), &["site.yaml", "--region", "us-east-1", "-c"]);

        assert!(output.status.success(), "{}", stderr(&output));
        let stdout = stdout(&output);
        assert!(stdout.contains("site.yaml --extra-vars {\"region\":\"us-east-1\"} --check"));
    }

    #[test]
    fn test_cli_debug_prints_command() {
        let dir = workspace();
        let output = helper(dir.path(), &["site.yaml", "-d", "-h", "web01"]);

        assert!(output.status.success(), "{}", stderr(&output));
        let first = stdout(&output).lines().next().unwrap_or_default();
        assert_eq!(first, "echo -i web01, site.yaml -vvv");
    }

    #[test]
    fn test_cli_list_sessions() {
        let dir = workspace();
        let sessions = dir.path().join("sessions");
        fs::create_dir_all(&sessions).unwrap();
        for (key, owner) in [("prod", "site.yaml"), ("alpha", "site.yaml"), ("x", "other.yaml")] {
            fs::write(
                sessions.join(format!("{}.json", key)),
                format!(
                    "{{\"saveFileVersion\": 4, \"playbookBaseName\": \"{}\", \"options\": {{}}}}",
                    owner
                ),
            )
            .unwrap();
        }
        fs::write(sessions.join("junk.json"), "garbage").unwrap();

        let output = helper(dir.path(), &["site.yaml", "-l"]);
        assert!(output.status.success(), "{}", stderr(&output));
        assert_eq!(stdout(&output), "1) alpha\n2) prod\n");
    }

    #[test]
    fn test_cli_list_with_other_option() {
        let dir = workspace();
        let output = helper(dir.path(), &["site.yaml", "-l", "-c"]);

        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("List option can not be combined with other options"));
    }

    #[test]
    fn test_cli_save_with_other_option() {
        let dir = workspace();
        let output = helper(dir.path(), &["site.yaml", "-s", "prod", "--region", "eu"]);

        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Save option can not be combined with other options"));
        assert!(!dir.path().join("sessions").exists());
    }

    #[test]
    fn test_cli_read_version_mismatch() {
        let dir = workspace();
        let sessions = dir.path().join("sessions");
        fs::create_dir_all(&sessions).unwrap();
        fs::write(
            sessions.join("old.json"),
            "{\"saveFileVersion\": 3, \"playbookBaseName\": \"site.yaml\", \"options\": {}}",
        )
        .unwrap();

        let output = helper(dir.path(), &["site.yaml", "-r", "old"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output)
            .contains("[!] Error: Save file version error, file version 3 required version 4"));
        assert!(stdout(&output).is_empty());
    }

    #[test]
    fn test_cli_unsupported_playbook_option() {
        let dir = workspace();
        fs::write(dir.path().join("bad.yaml"), "# option:loud\n").unwrap();

        let output = helper(dir.path(), &["bad.yaml"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Unsupported option: loud"));
    }

    #[test]
    fn test_cli_missing_playbook() {
        let dir = workspace();
        let output = helper(dir.path(), &["nowhere.yaml"]);

        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Can not open playbook nowhere.yaml"));
    }

    #[test]
    fn test_cli_playbook_not_first() {
        let dir = workspace();
        let output = helper(dir.path(), &["-c", "site.yaml"]);

        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Playbook should be the first argument"));
    }

    #[test]
    fn test_cli_unknown_option() {
        let dir = workspace();
        let output = helper(dir.path(), &["site.yaml", "--colour", "red"]);

        assert_eq!(output.status.code(), Some(2));
        assert!(stderr(&output).contains("--colour"));
    }

    #[test]
    fn test_cli_child_exit_code() {
        let dir = workspace();
        fs::write(
            dir.path().join("config.toml"),
            "[global]\nplaybook_command = \"sh -c 'exit 3' sh\"\n",
        )
        .unwrap();

        let output = helper(dir.path(), &["site.yaml"]);
        assert_eq!(output.status.code(), Some(3));
    }
}
