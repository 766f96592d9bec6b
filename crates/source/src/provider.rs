use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hosting provider classes with their own URL conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    GitHub,
    GitLab,
    Bitbucket,
    /// Only reachable by cloning; archive downloads are not offered
    Oschina,
    /// Unrecognized host or bare URL; follows GitHub URL shapes
    Generic,
}

impl Provider {
    /// Providers that may be named as a locator prefix
    pub const NAMED: [Self; 4] = [Self::GitHub, Self::GitLab, Self::Bitbucket, Self::Oschina];

    /// Prefix used in locators (`gitlab:owner/name`)
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
            Self::Bitbucket => "bitbucket",
            Self::Oschina => "oschina",
            Self::Generic => "generic",
        }
    }

    /// Host used when the locator does not name one
    #[must_use]
    pub fn default_host(self) -> &'static str {
        match self {
            Self::GitHub | Self::Generic => "github.com",
            Self::GitLab => "gitlab.com",
            Self::Bitbucket => "bitbucket.com",
            Self::Oschina => "git.oschina.net",
        }
    }

    /// Provider whose default host is `host`, if any
    #[must_use]
    pub fn from_host(host: &str) -> Option<Self> {
        let host = strip_protocol(host);
        Self::NAMED
            .into_iter()
            .find(|provider| provider.default_host().eq_ignore_ascii_case(host))
    }

    /// Whether the provider ignores an archive preference and always clones
    #[must_use]
    pub fn forces_clone(self) -> bool {
        matches!(self, Self::Oschina)
    }

    /// Archive download URL for `owner/name` at `reference`
    ///
    /// `base` is the host with protocol, e.g. `https://github.com`.
    #[must_use]
    pub fn archive_url(self, base: &str, owner: &str, name: &str, reference: &str) -> String {
        match self {
            Self::GitHub | Self::Generic => {
                format!("{base}/{owner}/{name}/archive/{reference}.zip")
            }
            Self::GitLab => format!("{base}/{owner}/{name}/repository/archive.zip?ref={reference}"),
            Self::Bitbucket => format!("{base}/{owner}/{name}/get/{reference}.zip"),
            Self::Oschina => format!("{base}/{owner}/{name}/repository/archive/{reference}"),
        }
    }

    /// Clone URL for `owner/name`
    #[must_use]
    pub fn clone_url(self, base: &str, owner: &str, name: &str) -> String {
        match self {
            Self::Oschina => format!("{base}/{owner}/{name}"),
            _ => format!("git@{}:{owner}/{name}.git", strip_protocol(base)),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::NAMED
            .into_iter()
            .find(|provider| provider.prefix() == s)
            .ok_or_else(|| format!("unknown provider: {s}"))
    }
}

/// Host without a leading `scheme://`
pub(crate) fn strip_protocol(host: &str) -> &str {
    host.split_once("://").map_or(host, |(_, rest)| rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_inference_ignores_protocol_and_case() {
        assert_eq!(Provider::from_host("GitLab.com"), Some(Provider::GitLab));
        assert_eq!(
            Provider::from_host("https://bitbucket.com"),
            Some(Provider::Bitbucket)
        );
        assert_eq!(Provider::from_host("git.example.org"), None);
    }

    #[test]
    fn clone_url_drops_protocol_for_ssh_form() {
        assert_eq!(
            Provider::GitLab.clone_url("https://gitlab.example.org", "acme", "api"),
            "git@gitlab.example.org:acme/api.git"
        );
    }

    #[test]
    fn generic_is_not_a_locator_prefix() {
        assert!("generic".parse::<Provider>().is_err());
        assert_eq!("oschina".parse::<Provider>(), Ok(Provider::Oschina));
    }
}
