//! Integration tests for config

#[cfg(test)]
mod tests {
    use impack_config::*;
    use impack_errors::{ConfigError, Error};
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Env var tests must not run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in ["IMPACK_JOBS", "IMPACK_CLONE", "IMPACK_ARCH", "IMPACK_TIMEOUT"] {
            std::env::remove_var(key);
        }
    }

    #[tokio::test]
    async fn test_load_settings_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[stage]
jobs = 8
clone = true

[network]
timeout = 60

[pack]
architecture = "amd64"
pack_home = "/srv/app"

[npm]
production = false
        "#
        )
        .unwrap();

        let settings = Settings::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(settings.stage.jobs, 8);
        assert!(settings.stage.clone);
        assert_eq!(settings.network.timeout, 60);
        assert_eq!(settings.network.connect_timeout, 30);
        assert_eq!(settings.pack.architecture, "amd64");
        assert_eq!(settings.pack.packer, "fpm");
        assert_eq!(
            settings.pack.pack_home.as_deref(),
            Some(std::path::Path::new("/srv/app"))
        );
        assert!(!settings.npm.production);
        assert!(settings.npm.unsafe_perm);
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.stage.jobs, 4);
        assert!(!settings.stage.clone);
        assert_eq!(settings.pack.architecture, "armhf");
        assert_eq!(settings.npm.command, "npm");
    }

    #[tokio::test]
    async fn test_missing_settings_file() {
        let err = Settings::load_from_file(std::path::Path::new("/nonexistent/impack.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("IMPACK_JOBS", "2");
        std::env::set_var("IMPACK_CLONE", "yes");
        std::env::set_var("IMPACK_ARCH", "arm64");
        std::env::set_var("IMPACK_TIMEOUT", "15");

        let mut settings = Settings::default();
        settings.merge_env().unwrap();

        assert_eq!(settings.stage.jobs, 2);
        assert!(settings.stage.clone);
        assert_eq!(settings.pack.architecture, "arm64");
        assert_eq!(settings.network.timeout, 15);

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("IMPACK_JOBS", "0");

        let mut settings = Settings::default();
        let result = settings.merge_env();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { .. }))
        ));

        clear_env();
    }

    #[tokio::test]
    async fn test_manifest_search_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("impack.yml"),
            "name: yml\nversion: 1.0.0\ncomponents:\n  a: acme/a\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("impack.json"),
            r#"{"name": "json", "version": "1.0.0", "components": {"b": "acme/b"}}"#,
        )
        .unwrap();

        let manifest = Manifest::load(dir.path()).await.unwrap();
        assert_eq!(manifest.name.as_deref(), Some("json"));
        assert_eq!(manifest.path(), dir.path().join("impack.json"));
    }

    #[tokio::test]
    async fn test_yaml_manifest_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("impack.yaml"),
            "name: app\nversion: 0.1.0\ndeps:\n  zeta: acme/zeta\n  alpha:\n    beta: acme/beta\n",
        )
        .unwrap();

        let manifest = Manifest::load(dir.path()).await.unwrap();
        let keys: Vec<_> = manifest
            .components
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[tokio::test]
    async fn test_manifest_inherits_from_package_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("impack.json"),
            r#"{"components": {"a": null}}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"name": "edge-app", "version": "3.1.4"}"#,
        )
        .unwrap();

        let manifest = Manifest::load(dir.path()).await.unwrap();
        assert_eq!(manifest.name.as_deref(), Some("edge-app"));
        assert_eq!(manifest.version.as_deref(), Some("3.1.4"));
    }

    #[tokio::test]
    async fn test_manifest_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load(dir.path()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::ManifestNotFound { .. })
        ));
        assert!(err.to_string().contains("can not find impack file in"));
    }

    #[tokio::test]
    async fn test_unsupported_manifest_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("impack.toml");
        std::fs::write(&path, "name = 'x'").unwrap();
        let err = Manifest::load(&path).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::UnsupportedFormat { .. })
        ));
    }
}
