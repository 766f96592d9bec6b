//! Integration tests for types

#[cfg(test)]
mod tests {
    use impack_types::*;
    use proptest::prelude::*;
    use std::path::Path;

    #[test]
    fn test_lifecycle_names_round_trip() {
        let names: Vec<_> = LifecycleEvent::ALL.iter().map(|e| e.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "before-install",
                "after-install",
                "before-remove",
                "after-remove",
                "before-upgrade",
                "after-upgrade"
            ]
        );
        assert_eq!(
            "after-upgrade".parse::<LifecycleEvent>().unwrap(),
            LifecycleEvent::AfterUpgrade
        );
        assert!("after-everything".parse::<LifecycleEvent>().is_err());
    }

    #[test]
    fn test_package_descriptor_prefers_impack_block() {
        let pkg: PackageDescriptor = serde_json::from_str(
            r#"{
                "name": "api",
                "impack": {"after-install": "scripts/setup.sh"},
                "oodopack": {"after-install": "legacy.sh", "before-remove": "stop.sh"}
            }"#,
        )
        .unwrap();
        assert_eq!(
            pkg.hook_declaration(LifecycleEvent::AfterInstall)
                .and_then(|v| v.as_str()),
            Some("scripts/setup.sh")
        );
        assert!(pkg.hook_declaration(LifecycleEvent::BeforeRemove).is_none());
    }

    #[test]
    fn test_package_descriptor_falls_back_to_legacy_key() {
        let pkg: PackageDescriptor =
            serde_json::from_str(r#"{"oodopack": {"before-remove": "stop.sh"}}"#).unwrap();
        assert_eq!(
            pkg.hook_declaration(LifecycleEvent::BeforeRemove)
                .and_then(|v| v.as_str()),
            Some("stop.sh")
        );
    }

    #[test]
    fn test_stage_outcome_serialization() {
        let json = serde_json::to_string(&StageOutcome::Transferred {
            method: TransferMethod::Clone,
            url: "git@github.com:acme/api.git".into(),
        })
        .unwrap();
        assert!(json.contains(r#""outcome":"transferred""#));
        assert!(json.contains(r#""method":"clone""#));
    }

    proptest! {
        #[test]
        fn prop_stage_path_is_root_joined_with_segments(
            segments in prop::collection::vec("[a-z][a-z0-9_-]{0,8}", 1..6)
        ) {
            let relative = segments.join("/");
            let mut component = Component::new("x", relative, None);
            component.assign_paths(Path::new("/stage"), Path::new("/opt/app"));
            let expected = segments
                .iter()
                .fold(Path::new("/stage").to_path_buf(), |p, s| p.join(s));
            prop_assert_eq!(component.stage_path(), Some(expected.as_path()));
        }
    }
}
