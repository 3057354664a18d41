//! Integration tests for the requests built by the patched commands.
//!
//! Every test runs with `--dry-run`, so the request is printed as JSON instead
//! of being sent.

#[cfg(test)]
mod tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use serde_json::{json, Value};
    use std::io::Write;

    fn cfscli() -> Command {
        let mut cmd = Command::cargo_bin("cfscli").unwrap();
        cmd.env_remove("CFSCLI_HOSTNAME")
            .env_remove("CFSCLI_FORMAT")
            .env_remove("RUST_LOG")
            .arg("--dry-run");
        cmd
    }

    fn request(cmd: &mut Command) -> Value {
        let assert = cmd.assert().success();
        serde_json::from_slice(&assert.get_output().stdout).unwrap()
    }

    #[test]
    fn test_session_create_with_target_groups() {
        let request = request(cfscli().args([
            "sessions",
            "create",
            "--name",
            "session-1",
            "--configuration-name",
            "compute",
            "--target-definition",
            "spec",
            "--target-group",
            "A",
            "x1000c0s0b0n0, x1000c0s0b0n1",
            "--target-group",
            "B",
            "x1000c0s1b0n0",
        ]));

        assert_eq!(
            request,
            json!({
                "method": "POST",
                "path": "/v2/sessions",
                "body": {
                    "name": "session-1",
                    "configuration_name": "compute",
                    "target": {
                        "definition": "spec",
                        "groups": [
                            {"name": "A", "members": ["x1000c0s0b0n0", "x1000c0s0b0n1"]},
                            {"name": "B", "members": ["x1000c0s1b0n0"]}
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn test_session_create_requires_name() {
        cfscli()
            .args(["sessions", "create", "--configuration-name", "compute"])
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("--name"));
    }

    #[test]
    fn test_session_list_query() {
        let request = request(cfscli().args(["sessions", "list", "--status", "running"]));
        assert_eq!(request["method"], "GET");
        assert_eq!(request["path"], "/v2/sessions");
        assert_eq!(request["query"], json!([["status", "running"]]));
        assert!(request.get("body").is_none());
    }

    #[test]
    fn test_configuration_update_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"layers": [{{"clone_url": "https://vcs/cos.git", "playbook": "site.yml", "branch": "main"}}]}}"#
        )
        .unwrap();

        let request = request(cfscli().args([
            "configurations",
            "update",
            "cos-config",
            "--file",
            file.path().to_str().unwrap(),
        ]));

        assert_eq!(request["method"], "PUT");
        assert_eq!(request["path"], "/v2/configurations/cos-config");
        assert_eq!(
            request["body"],
            json!({"layers": [{"clone_url": "https://vcs/cos.git", "playbook": "site.yml", "branch": "main"}]})
        );
    }

    /// Body options given next to `--file` are dropped with a warning.
    #[test]
    fn test_configuration_update_from_file_ignores_other_options() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"layers": []}}"#).unwrap();

        let assert = cfscli()
            .args([
                "configurations",
                "update",
                "cos-config",
                "--file",
                file.path().to_str().unwrap(),
                "--description",
                "not sent",
            ])
            .assert()
            .success()
            .stderr(predicate::str::contains(
                "Options other than --file are ignored",
            ));
        let request: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();

        assert_eq!(request["method"], "PUT");
        assert_eq!(request["body"], json!({"layers": []}));
    }

    #[test]
    fn test_configuration_update_branches() {
        let request = request(cfscli().args([
            "configurations",
            "update",
            "cos-config",
            "--update-branches",
        ]));

        assert_eq!(request["method"], "PATCH");
        assert_eq!(request["path"], "/v2/configurations/cos-config");
        assert!(request.get("body").is_none());
    }

    #[test]
    fn test_configuration_update_needs_exactly_one_source() {
        cfscli()
            .args(["configurations", "update", "cos-config"])
            .assert()
            .failure()
            .code(64)
            .stderr(predicate::str::contains(
                "Either --file or --update-branches must be set for updates, but not both",
            ));

        cfscli()
            .args([
                "configurations",
                "update",
                "cos-config",
                "--file",
                "cfg.json",
                "--update-branches",
            ])
            .assert()
            .failure()
            .code(64);
    }

    #[test]
    fn test_configuration_update_missing_file() {
        cfscli()
            .args([
                "configurations",
                "update",
                "cos-config",
                "--file",
                "/nonexistent/cfs/cfg.json",
            ])
            .assert()
            .failure()
            .code(66)
            .stderr(predicate::str::starts_with("Error: "));
    }

    #[test]
    fn test_component_state_can_be_cleared() {
        let request = request(cfscli().args([
            "components",
            "update",
            "x3000c0s17b1n0",
            "--state",
            "[]",
        ]));

        assert_eq!(request["method"], "PATCH");
        assert_eq!(request["path"], "/v2/components/x3000c0s17b1n0");
        assert_eq!(request["body"], json!({"state": []}));
    }

    #[test]
    fn test_component_state_left_out_when_not_given() {
        let request = request(cfscli().args([
            "components",
            "update",
            "x3000c0s17b1n0",
            "--enabled",
            "false",
        ]));

        assert_eq!(request["body"], json!({"enabled": false}));
    }

    #[test]
    fn test_empty_component_state_counts_as_unset() {
        let request = request(cfscli().args([
            "components",
            "update",
            "x3000c0s17b1n0",
            "--state",
            "",
        ]));

        assert_eq!(request["method"], "PATCH");
        assert_eq!(request["body"], json!({}));
        assert!(request["body"].get("state").is_none());
    }

    #[test]
    fn test_component_state_must_be_json() {
        cfscli()
            .args(["components", "update", "x3000c0s17b1n0", "--state", "[{"])
            .assert()
            .failure()
            .code(65)
            .stderr(predicate::str::contains("Invalid JSON in --state"));
    }

    /// Ids with `/`, `?` or `#` are sent as one encoded path segment.
    #[test]
    fn test_path_ids_are_encoded() {
        let request = request(cfscli().args(["sessions", "delete", "a/../../components"]));
        assert_eq!(request["method"], "DELETE");
        assert_eq!(request["path"], "/v2/sessions/a%2F..%2F..%2Fcomponents");

        let request = self::request(cfscli().args(["components", "describe", "x1?status=ok#top"]));
        assert_eq!(request["path"], "/v2/components/x1%3Fstatus%3Dok%23top");
        assert!(request.get("query").is_none());
    }

    #[test]
    fn test_dot_segment_ids_are_rejected() {
        cfscli()
            .args(["sessions", "delete", ".."])
            .assert()
            .failure()
            .code(64)
            .stderr(predicate::str::contains("Invalid value '..'"));
    }

    /// `--verbose` is seen before generation, so patch logs reach stderr.
    #[test]
    fn test_verbose_logs_command_generation() {
        cfscli()
            .args(["-v", "sessions", "list"])
            .assert()
            .success()
            .stderr(predicate::str::contains("Patched"));
    }

    #[test]
    fn test_yaml_output() {
        cfscli()
            .args(["--format", "yaml", "components", "delete", "x3000c0s17b1n0"])
            .assert()
            .success()
            .stdout(predicate::str::contains("method: DELETE"))
            .stdout(predicate::str::contains("path: /v2/components/x3000c0s17b1n0"));
    }
}
