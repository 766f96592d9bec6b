//! Integration tests for hook generation

#[cfg(test)]
mod tests {
    use impack_errors::{Error, HookError};
    use impack_events::{channel, AppEvent, HookEvent};
    use impack_hooks::*;
    use impack_types::{Component, LifecycleEvent, PackageDescriptor};
    use serde_json::json;
    use std::path::{Path, PathBuf};

    fn component(relative: &str, package: serde_json::Value, service: bool) -> Component {
        let name = relative.rsplit('/').next().unwrap();
        let mut component = Component::new(name, relative, None);
        component.assign_paths(Path::new("/tmp/stage"), Path::new("/opt/app"));
        let descriptor: PackageDescriptor = serde_json::from_value(package).unwrap();
        if let Some(pkg_name) = &descriptor.name {
            component.name.clone_from(pkg_name);
        }
        component.package = Some(descriptor);
        if service {
            component.service = Some(PathBuf::from("/tmp/stage").join(relative).join("process.yml"));
        }
        component
    }

    fn read(dir: &Path, event: LifecycleEvent) -> String {
        std::fs::read_to_string(dir.join(event.as_str())).unwrap()
    }

    #[test]
    fn test_hook_set_groups_in_component_order() {
        let components = vec![
            component(
                "api",
                json!({"name": "api", "impack": {"after-install": "echo api", "before-remove": "echo bye"}}),
                false,
            ),
            component("lib", json!({"name": "lib"}), false),
            component(
                "web",
                json!({"name": "web", "oodopack": {"after-install": "echo web", "after-upgrade": false}}),
                false,
            ),
        ];

        let set = HookSet::collect(&components).unwrap();
        let after_install: Vec<_> = set
            .entries(LifecycleEvent::AfterInstall)
            .iter()
            .map(|e| e.script.as_str())
            .collect();
        assert_eq!(after_install, vec!["echo api", "echo web"]);
        assert_eq!(set.entries(LifecycleEvent::BeforeRemove).len(), 1);
        assert!(set.entries(LifecycleEvent::AfterUpgrade).is_empty());
        assert_eq!(set.len(), 3);

        let events: Vec<_> = set.groups().map(|(event, _)| event).collect();
        assert_eq!(
            events,
            vec![LifecycleEvent::AfterInstall, LifecycleEvent::BeforeRemove]
        );
    }

    #[test]
    fn test_impack_key_wins_over_legacy_key() {
        let components = vec![component(
            "api",
            json!({"impack": {"after-install": "new"}, "oodopack": {"after-install": "old"}}),
            false,
        )];

        let set = HookSet::collect(&components).unwrap();
        assert_eq!(set.entries(LifecycleEvent::AfterInstall)[0].script, "new");
    }

    #[test]
    fn test_non_string_declaration_is_rejected() {
        let components = vec![component(
            "api",
            json!({"impack": {"after-install": ["echo", "no"]}}),
            false,
        )];

        let err = HookSet::collect(&components).unwrap_err();
        assert!(matches!(
            err,
            Error::Hook(HookError::InvalidDeclaration { ref component, .. }) if component == "api"
        ));
    }

    #[tokio::test]
    async fn test_generate_writes_only_declared_events() {
        let temp = tempfile::tempdir().unwrap();
        let hooks = temp.path().join("hooks");
        let (tx, mut rx) = channel();

        let components = vec![component(
            "svc/api",
            json!({"name": "api", "impack": {"before-install": "mkdir -p /var/lib/api"}}),
            false,
        )];

        let report = generate(&components, &hooks, false, &tx).await.unwrap();

        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].event, LifecycleEvent::BeforeInstall);
        assert_eq!(report.files[0].entries, 1);

        let content = read(&hooks, LifecycleEvent::BeforeInstall);
        assert!(content.starts_with("#!/usr/bin/env bash\n\n"));
        assert!(content.contains("mkdir -p /var/lib/api"));
        assert!(content.contains("cd \"/opt/app/svc/api\""));
        assert!(!hooks.join("after-install").exists());

        let event = rx.try_recv().unwrap();
        assert!(matches!(
            event,
            AppEvent::Hooks(HookEvent::Written {
                event: LifecycleEvent::BeforeInstall,
                entries: 1,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_rebuild_and_service_blocks_order() {
        let temp = tempfile::tempdir().unwrap();
        let hooks = temp.path().join("hooks");
        let (tx, _rx) = channel();

        let components = vec![
            component(
                "api",
                json!({"name": "api", "impack": {"after-install": "echo installed"}}),
                true,
            ),
            component("web", json!({"name": "web"}), false),
        ];

        let report = generate(&components, &hooks, true, &tx).await.unwrap();

        let after_install = read(&hooks, LifecycleEvent::AfterInstall);
        let rebuild = after_install.find("npm rebuild").unwrap();
        let script = after_install.find("echo installed").unwrap();
        let startup = after_install.find("pm2 start \"/opt/app/api/process.yml\"").unwrap();
        assert!(rebuild < script && script < startup);
        assert!(!after_install.contains("/opt/app/web/process.yml"));
        assert_eq!(after_install.matches(SHEBANG).count(), 1);

        let before_remove = read(&hooks, LifecycleEvent::BeforeRemove);
        assert!(before_remove.contains("pm2 delete \"/opt/app/api/process.yml\""));

        let after = report
            .files
            .iter()
            .find(|f| f.event == LifecycleEvent::AfterInstall)
            .unwrap();
        assert_eq!(after.entries, 1);
        assert_eq!(after.blocks, vec!["rebuild".to_string(), "startup".to_string()]);
    }

    #[tokio::test]
    async fn test_no_services_means_no_startup_block() {
        let temp = tempfile::tempdir().unwrap();
        let hooks = temp.path().join("hooks");
        let (tx, _rx) = channel();

        let components = vec![component("web", json!({"name": "web"}), false)];
        let report = generate(&components, &hooks, false, &tx).await.unwrap();

        assert!(report.files.is_empty());
        assert!(!hooks.join("after-install").exists());
        assert!(!hooks.join("before-remove").exists());
    }

    #[tokio::test]
    async fn test_generation_appends_until_cleaned() {
        let temp = tempfile::tempdir().unwrap();
        let hooks = temp.path().join("hooks");
        let (tx, mut rx) = channel();

        let components = vec![component(
            "api",
            json!({"impack": {"after-remove": "rm -rf /var/lib/api"}}),
            false,
        )];

        generate(&components, &hooks, false, &tx).await.unwrap();
        generate(&components, &hooks, false, &tx).await.unwrap();
        let twice = read(&hooks, LifecycleEvent::AfterRemove);
        assert_eq!(twice.matches("rm -rf /var/lib/api").count(), 2);

        clean(&hooks, &tx).await.unwrap();
        assert!(!hooks.exists());
        generate(&components, &hooks, false, &tx).await.unwrap();
        let fresh = read(&hooks, LifecycleEvent::AfterRemove);
        assert_eq!(fresh.matches("rm -rf /var/lib/api").count(), 1);

        let mut cleaned = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, AppEvent::Hooks(HookEvent::Cleaned { .. })) {
                cleaned = true;
            }
        }
        assert!(cleaned);
    }

    #[tokio::test]
    async fn test_clean_missing_directory_is_ok() {
        let temp = tempfile::tempdir().unwrap();
        let (tx, _rx) = channel();
        clean(&temp.path().join("absent"), &tx).await.unwrap();
    }
}
