//! Integration tests for the generated command-line surface.

#[cfg(test)]
mod tests {
    use assert_cmd::Command;
    use predicates::prelude::*;

    fn cfscli() -> Command {
        let mut cmd = Command::cargo_bin("cfscli").unwrap();
        cmd.env_remove("CFSCLI_HOSTNAME").env_remove("CFSCLI_FORMAT");
        cmd
    }

    /// The resource groups of the API sit at the top level, not under a version.
    #[test]
    fn test_top_level_help_lists_resources() {
        cfscli()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage:"))
            .stdout(predicate::str::contains("components"))
            .stdout(predicate::str::contains("configurations"))
            .stdout(predicate::str::contains("sessions"))
            .stdout(predicate::str::contains("options"))
            .stdout(predicate::str::contains("config"))
            .stdout(predicate::str::contains("--dry-run"));
    }

    #[test]
    fn test_sessions_help_has_no_update() {
        let assert = cfscli().arg("sessions").arg("--help").assert().success();
        let help = String::from_utf8_lossy(&assert.get_output().stdout).to_string();

        assert!(help.contains("create"));
        assert!(help.contains("describe"));
        assert!(!help
            .lines()
            .any(|line| line.trim_start().starts_with("update")));
    }

    #[test]
    fn test_sessions_update_is_rejected() {
        cfscli()
            .args(["sessions", "update", "session-1"])
            .assert()
            .failure()
            .code(2);
    }

    #[test]
    fn test_sessions_create_help_shows_target_group() {
        cfscli()
            .args(["sessions", "create", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--target-group <GROUPNAME> <MEMBER1"))
            .stdout(predicate::str::contains("--target-definition"))
            .stdout(predicate::str::contains("--target-groups-name").not())
            .stdout(predicate::str::contains("--target-groups-members").not());
    }

    #[test]
    fn test_configurations_update_help() {
        cfscli()
            .args(["configurations", "update", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--file <TEXT>"))
            .stdout(predicate::str::contains("--update-branches"))
            .stdout(predicate::str::contains("--layers-").not());
    }

    #[test]
    fn test_components_update_help() {
        cfscli()
            .args(["components", "update", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--state <TEXT>"))
            .stdout(predicate::str::contains("Set to [] to clear"))
            .stdout(predicate::str::contains("--state-").not());
    }
}
