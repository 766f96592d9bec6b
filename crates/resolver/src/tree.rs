use impack_errors::{ConfigError, Error};
use impack_types::{Component, ComponentNode};
use serde_json::Value;
use std::collections::HashSet;

/// Validate a raw component mapping into a tree
///
/// Strings are locators; `null`, `false`, `""` and `0` are leaves without a
/// locator; mappings are subtrees. Anything else is rejected with the path
/// of the offending node.
///
/// Keys must be single path segments and the flattened relative paths must
/// be unique, so every component owns exactly one directory under the
/// staging root.
///
/// # Errors
///
/// Returns `ConfigError::InvalidComponent` if the root is not a mapping, a
/// node has an unsupported type, a key is empty, `.`, `..` or contains `/`,
/// or two components flatten to the same relative path.
pub fn parse_tree(value: &Value) -> Result<ComponentNode, Error> {
    let tree = match value {
        Value::Object(_) => parse_node(value, "")?,
        other => {
            return Err(ConfigError::InvalidComponent {
                path: "<root>".to_string(),
                reason: format!("expected a mapping, found {}", kind(other)),
            }
            .into())
        }
    };
    check_unique(&tree)?;
    Ok(tree)
}

fn check_key(key: &str, path: &str) -> Result<(), Error> {
    let reason = if key.trim().is_empty() {
        "component names must not be empty"
    } else if key == "." || key == ".." {
        "component names must not be `.` or `..`"
    } else if key.contains('/') || key.contains('\\') {
        "component names must not contain path separators"
    } else {
        return Ok(());
    };
    Err(ConfigError::InvalidComponent {
        path: path.to_string(),
        reason: reason.to_string(),
    }
    .into())
}

fn check_unique(tree: &ComponentNode) -> Result<(), Error> {
    let mut seen = HashSet::new();
    for component in flatten(tree) {
        if !seen.insert(component.relative_path.clone()) {
            return Err(ConfigError::InvalidComponent {
                path: component.relative_path,
                reason: "declared more than once".to_string(),
            }
            .into());
        }
    }
    Ok(())
}

fn parse_node(value: &Value, path: &str) -> Result<ComponentNode, Error> {
    match value {
        Value::Object(map) => {
            let mut children = Vec::with_capacity(map.len());
            for (key, child) in map {
                let child_path = join(path, key);
                check_key(key, &child_path)?;
                children.push((key.clone(), parse_node(child, &child_path)?));
            }
            Ok(ComponentNode::Tree(children))
        }
        Value::String(locator) if !locator.is_empty() => Ok(ComponentNode::leaf(locator.clone())),
        v if is_falsy(v) => Ok(ComponentNode::Leaf(None)),
        other => Err(ConfigError::InvalidComponent {
            path: path.to_string(),
            reason: format!(
                "expected a locator string, null or a mapping, found {}",
                kind(other)
            ),
        }
        .into()),
    }
}

/// Flatten a tree depth-first in declaration order
///
/// Leaves become components; subtrees only contribute their key to the
/// relative path of their descendants.
#[must_use]
pub fn flatten(root: &ComponentNode) -> Vec<Component> {
    let mut components = Vec::new();
    if let ComponentNode::Tree(children) = root {
        walk(children, "", &mut components);
    }
    components
}

fn walk(children: &[(String, ComponentNode)], parent: &str, out: &mut Vec<Component>) {
    for (name, node) in children {
        let relative = join(parent, name);
        match node {
            ComponentNode::Leaf(locator) => {
                out.push(Component::new(name.clone(), relative, locator.clone()));
            }
            ComponentNode::Tree(grandchildren) => walk(grandchildren, &relative, out),
        }
    }
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}/{key}")
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON),
        _ => false,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_values_are_empty_leaves() {
        let tree = parse_tree(&json!({"a": null, "b": false, "c": "", "d": 0})).unwrap();
        let components = flatten(&tree);
        assert_eq!(components.len(), 4);
        assert!(components.iter().all(|c| c.locator().is_none()));
    }

    #[test]
    fn invalid_node_reports_its_path() {
        let err = parse_tree(&json!({"a": {"b": {"c": true}}})).unwrap_err();
        match err {
            Error::Config(ConfigError::InvalidComponent { path, .. }) => assert_eq!(path, "a/b/c"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn root_must_be_a_mapping() {
        assert!(parse_tree(&json!(["acme/a"])).is_err());
        assert!(parse_tree(&json!("acme/a")).is_err());
    }

    fn invalid_path(value: &Value) -> String {
        match parse_tree(value).unwrap_err() {
            Error::Config(ConfigError::InvalidComponent { path, .. }) => path,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn keys_must_be_single_segments() {
        assert_eq!(invalid_path(&json!({"": "acme/a"})), "");
        assert_eq!(invalid_path(&json!({"a": {"..": "acme/b"}})), "a/..");
        assert_eq!(invalid_path(&json!({".": null})), ".");
        assert_eq!(invalid_path(&json!({"a/b": "acme/b"})), "a/b");
        assert_eq!(invalid_path(&json!({"web": {"ui\\x": null}})), "web/ui\\x");
    }

    #[test]
    fn duplicate_relative_paths_are_rejected() {
        assert_eq!(
            invalid_path(&json!({"a/b": "acme/one", "a": {"b": "acme/two"}})),
            "a/b"
        );
        assert!(parse_tree(&json!({"a": {"b": "acme/b"}, "c": {"b": "acme/c"}})).is_ok());

        let tree = ComponentNode::tree([
            ("a", ComponentNode::tree([("b", ComponentNode::leaf("acme/one"))])),
            ("a", ComponentNode::tree([("b", ComponentNode::leaf("acme/two"))])),
        ]);
        match check_unique(&tree).unwrap_err() {
            Error::Config(ConfigError::InvalidComponent { path, reason }) => {
                assert_eq!(path, "a/b");
                assert!(reason.contains("more than once"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_subtree_emits_nothing() {
        let tree = parse_tree(&json!({"a": {}, "b": "acme/b"})).unwrap();
        let paths: Vec<_> = flatten(&tree)
            .into_iter()
            .map(|c| c.relative_path)
            .collect();
        assert_eq!(paths, vec!["b"]);
    }
}
