//! Integration tests for component tree resolution

#[cfg(test)]
mod tests {
    use impack_resolver::*;
    use impack_types::{Component, ComponentNode};
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::HashSet;
    use std::path::Path;

    #[test]
    fn test_flatten_preserves_declaration_order() {
        let tree = parse_tree(&json!({
            "a": "a",
            "b": {"c": {"d": {"e": "e", "f": "f"}, "g": "g"}, "h": "h"},
            "i": "i"
        }))
        .unwrap();

        let components = flatten(&tree);
        let paths: Vec<_> = components.iter().map(|c| c.relative_path.as_str()).collect();
        let locators: Vec<_> = components.iter().map(|c| c.locator().unwrap()).collect();
        let names: Vec<_> = components.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(paths, vec!["a", "b/c/d/e", "b/c/d/f", "b/c/g", "b/h", "i"]);
        assert_eq!(locators, vec!["a", "e", "f", "g", "h", "i"]);
        assert_eq!(names, vec!["a", "e", "f", "g", "h", "i"]);
    }

    #[tokio::test]
    async fn test_resolve_reads_staged_metadata() {
        let stage = tempfile::tempdir().unwrap();
        let api = stage.path().join("svc/api");
        std::fs::create_dir_all(&api).unwrap();
        std::fs::write(
            api.join("package.json"),
            r#"{"name": "acme-api", "impack": {"after-install": "setup.sh"}}"#,
        )
        .unwrap();
        std::fs::write(api.join("process.json"), "{}").unwrap();
        std::fs::write(api.join("process.yml"), "apps: []").unwrap();

        let tree = parse_tree(&json!({"svc": {"api": "acme/api", "web": "acme/web"}})).unwrap();
        let mut components = flatten(&tree);
        resolve(&mut components, stage.path(), Path::new("/opt/app"))
            .await
            .unwrap();

        let api_component = &components[0];
        assert!(api_component.staged);
        assert_eq!(api_component.name, "acme-api");
        assert_eq!(
            api_component.service.as_deref(),
            Some(api.join("process.yml").as_path())
        );
        assert_eq!(
            api_component.pack_path(),
            Some(Path::new("/opt/app/svc/api"))
        );

        let web = &components[1];
        assert!(!web.staged);
        assert_eq!(web.name, "web");
        assert!(web.package.is_none());
    }

    #[test]
    fn test_escaping_and_colliding_keys_are_rejected() {
        for manifest in [
            json!({"": "acme/root", "a": "acme/a"}),
            json!({"..": "acme/up"}),
            json!({"a": {".": "acme/here"}}),
            json!({"a/b": "acme/one", "a": {"b": "acme/two"}}),
        ] {
            let err = parse_tree(&manifest).unwrap_err();
            assert!(
                err.to_string().contains("invalid component node"),
                "{manifest}: {err}"
            );
        }
    }

    #[tokio::test]
    async fn test_each_component_owns_a_directory_under_the_stage_root() {
        let stage = tempfile::tempdir().unwrap();
        let tree = parse_tree(&json!({
            "a": "acme/a",
            "b": {"c": "acme/c", "d": null},
            "e": {"b": {"c": "acme/ec"}}
        }))
        .unwrap();
        let mut components = flatten(&tree);
        resolve(&mut components, stage.path(), Path::new("/opt/app"))
            .await
            .unwrap();

        let mut seen = HashSet::new();
        for component in &components {
            let path = component.stage_path().unwrap();
            assert!(path.starts_with(stage.path()));
            assert_ne!(path, stage.path());
            assert!(seen.insert(path.to_path_buf()), "{}", path.display());
        }
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent_on_paths() {
        let stage = tempfile::tempdir().unwrap();
        let mut components = vec![Component::new("a", "a", Some("acme/a".into()))];

        resolve(&mut components, stage.path(), Path::new("/opt/app"))
            .await
            .unwrap();
        let first = components[0].stage_path().unwrap().to_path_buf();

        resolve(&mut components, Path::new("/elsewhere"), Path::new("/other"))
            .await
            .unwrap();
        assert_eq!(components[0].stage_path().unwrap(), first);
    }

    #[tokio::test]
    async fn test_resolve_rejects_broken_package_json() {
        let stage = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(stage.path().join("a")).unwrap();
        std::fs::write(stage.path().join("a/package.json"), "{not json").unwrap();

        let mut components = vec![Component::new("a", "a", None)];
        let result = resolve(&mut components, stage.path(), Path::new("/opt/app")).await;
        assert!(result.is_err());
    }

    fn arb_tree() -> impl Strategy<Value = ComponentNode> {
        let leaf = prop_oneof![
            Just(ComponentNode::Leaf(None)),
            "[a-z]{1,6}/[a-z]{1,6}".prop_map(ComponentNode::leaf),
        ];
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|children| ComponentNode::tree(children))
        })
    }

    fn count_leaves(node: &ComponentNode) -> usize {
        match node {
            ComponentNode::Leaf(_) => 1,
            ComponentNode::Tree(children) => children.iter().map(|(_, n)| count_leaves(n)).sum(),
        }
    }

    proptest! {
        #[test]
        fn prop_flatten_emits_each_leaf_once(children in prop::collection::btree_map("[a-z]{1,4}", arb_tree(), 1..5)) {
            let root = ComponentNode::tree(children);
            let components = flatten(&root);

            prop_assert_eq!(components.len(), count_leaves(&root));

            let unique: HashSet<_> = components.iter().map(|c| c.relative_path.clone()).collect();
            prop_assert_eq!(unique.len(), components.len());

            for component in &components {
                prop_assert!(!component.relative_path.starts_with('/'));
                prop_assert!(component.relative_path.ends_with(component.name.as_str()));
            }
        }
    }
}
