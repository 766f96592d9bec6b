//! Command line tests for the impack binary

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::process::{Command, Output};

    fn impack(args: &[&str], cwd: &Path) -> Output {
        Command::new(env!("CARGO_BIN_EXE_impack"))
            .args(args)
            .current_dir(cwd)
            .env_remove("RUST_LOG")
            .env_remove("IMPACK_JOBS")
            .env_remove("IMPACK_CLONE")
            .env_remove("IMPACK_ARCH")
            .output()
            .expect("failed to run impack")
    }

    fn empty_config(dir: &Path) -> String {
        let path = dir.join("config.toml");
        std::fs::write(&path, "").unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_version_flag() {
        let temp = tempfile::tempdir().unwrap();
        let output = impack(&["--version"], temp.path());
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_help_lists_commands() {
        let temp = tempfile::tempdir().unwrap();
        let output = impack(&["--help"], temp.path());
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        for command in ["components", "collect", "hooks", "npm", "pack", "build"] {
            assert!(stdout.contains(command), "missing {command} in help");
        }
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let output = impack(&["deploy"], temp.path());
        assert!(!output.status.success());
    }

    #[test]
    fn test_components_json_output() {
        let temp = tempfile::tempdir().unwrap();
        let manifest = serde_json::json!({
            "name": "shop",
            "version": "1.0.0",
            "dependencies": {
                "api": "acme/api#v2",
                "web": { "ui": "gitlab:acme/ui" }
            }
        });
        std::fs::write(temp.path().join("impack.json"), manifest.to_string()).unwrap();
        let config = empty_config(temp.path());

        let output = impack(&["--json", "--config", &config, "components"], temp.path());
        assert!(
            output.status.success(),
            "{}",
            String::from_utf8_lossy(&output.stderr)
        );

        let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(result["type"], "Components");
        let components = result["data"].as_array().unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0]["relative_path"], "api");
        assert_eq!(components[0]["locator"], "acme/api#v2");
        assert_eq!(components[1]["relative_path"], "web/ui");
        assert_eq!(components[1]["staged"], false);
    }

    #[test]
    fn test_missing_manifest_fails() {
        let temp = tempfile::tempdir().unwrap();
        let config = empty_config(temp.path());
        let output = impack(&["--config", &config, "components"], temp.path());
        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Error"), "{stderr}");
    }

    #[test]
    fn test_zero_jobs_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            temp.path().join("impack.json"),
            r#"{"name": "shop", "components": {"a": null}}"#,
        )
        .unwrap();
        let config = empty_config(temp.path());
        let output = impack(&["--config", &config, "collect", "--jobs", "0"], temp.path());
        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("--jobs"));
    }
}
