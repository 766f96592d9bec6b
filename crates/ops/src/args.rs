//! Turning option maps into command-line arguments

use std::fmt;

/// Value of one command-line option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// `true` emits a bare flag, `false` drops the option
    Flag(bool),
    /// Emitted as the argument following the flag
    Value(String),
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Value(value) => f.write_str(value),
        }
    }
}

/// Ordered option list; setting an existing key replaces its value in place
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    entries: Vec<(String, OptionValue)>,
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// Whether `key` holds a usable value (a non-empty string or `true`)
    #[must_use]
    pub fn is_set(&self, key: &str) -> bool {
        match self.get(key) {
            Some(OptionValue::Value(value)) => !value.is_empty(),
            Some(OptionValue::Flag(flag)) => *flag,
            None => false,
        }
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (key, value) in iter {
            options.set(key, value);
        }
        options
    }
}

/// Convert options into arguments
///
/// Single-letter keys become `-x`, longer keys `--kebab-case`. `false` drops
/// the option, `true` emits a bare flag, anything else is followed by its
/// value. Empty keys are ignored.
#[must_use]
pub fn argumentize(options: &Options) -> Vec<String> {
    let mut args = Vec::new();
    for (key, value) in options.pairs() {
        if key.is_empty() || matches!(value, OptionValue::Flag(false)) {
            continue;
        }

        if key.chars().count() == 1 {
            args.push(format!("-{key}"));
        } else {
            args.push(format!("--{}", kebab_case(key)));
        }

        if let OptionValue::Value(value) = value {
            args.push(value.clone());
        }
    }
    args
}

/// `unsafePerm` / `unsafe_perm` / `unsafe-perm` -> `unsafe-perm`
fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;
    for ch in key.chars() {
        if ch == '_' || ch == '-' {
            if !out.ends_with('-') {
                out.push('-');
            }
            prev_lower = false;
        } else if ch.is_ascii_uppercase() {
            if prev_lower {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_case_variants() {
        assert_eq!(kebab_case("unsafePerm"), "unsafe-perm");
        assert_eq!(kebab_case("unsafe_perm"), "unsafe-perm");
        assert_eq!(kebab_case("before-install"), "before-install");
        assert_eq!(kebab_case("chdir"), "chdir");
        assert_eq!(kebab_case("debMaintainerScripts"), "deb-maintainer-scripts");
    }

    #[test]
    fn argumentize_flags_and_values() {
        let options: Options = [
            ("s", OptionValue::from("dir")),
            ("production", OptionValue::from(true)),
            ("ignoreScripts", OptionValue::from(false)),
            ("", OptionValue::from("skipped")),
            ("chdir", OptionValue::from("/tmp/stage")),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            argumentize(&options),
            vec!["-s", "dir", "--production", "--chdir", "/tmp/stage"]
        );
    }

    #[test]
    fn set_replaces_in_place() {
        let mut options = Options::new();
        options.set("name", "a");
        options.set("version", "1.0.0");
        options.set("name", "b");

        assert_eq!(argumentize(&options), vec!["--name", "b", "--version", "1.0.0"]);
    }

    #[test]
    fn is_set_treats_blank_and_false_as_missing() {
        let mut options = Options::new();
        options.set("name", "");
        options.set("flag", false);
        assert!(!options.is_set("name"));
        assert!(!options.is_set("flag"));
        assert!(!options.is_set("absent"));
    }
}
