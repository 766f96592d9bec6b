use crate::provider::{strip_protocol, Provider};
use impack_errors::{Error, SourceError};
use impack_types::TransferMethod;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use url::Url;

/// Ref used when a locator does not name one
pub const DEFAULT_REF: &str = "master";

const SHORTHAND: &str =
    r"^(?:(github|gitlab|bitbucket|oschina):)?(?:(.+):)?([^/]+)/([^#]+)(?:#(.+))?$";
const SCHEME: &str = r"^[A-Za-z][A-Za-z0-9+.-]*://";
const PROTOCOL: &str = r"(?i)^(f|ht)tps?://";

type Pattern = LazyLock<Result<Regex, regex::Error>>;

static SHORTHAND_RE: Pattern = LazyLock::new(|| Regex::new(SHORTHAND));
static SCHEME_RE: Pattern = LazyLock::new(|| Regex::new(SCHEME));
static PROTOCOL_RE: Pattern = LazyLock::new(|| Regex::new(PROTOCOL));

/// Resolved transfer plan for one locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    pub provider: Provider,
    /// Host without protocol
    pub host: String,
    pub owner: String,
    pub repo: String,
    pub reference: String,
    pub method: TransferMethod,
    pub url: String,
}

impl SourceDescriptor {
    /// Parse a locator into a transfer plan
    ///
    /// `prefer_clone` selects cloning for providers that offer both; the
    /// clone-only provider and bare URLs decide for themselves.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::InvalidLocator` if the locator does not have the
    /// `[provider:][host:]owner/name[#ref]` shape and is not a URL, and
    /// `SourceError::UnknownProvider` if it names a provider prefix that is
    /// not recognized.
    pub fn parse(locator: &str, prefer_clone: bool) -> Result<Self, Error> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(invalid(locator, "locator is empty"));
        }

        if pattern(&SCHEME_RE)?.is_match(locator) {
            if let Ok(url) = Url::parse(locator) {
                return Ok(Self::from_url(&url));
            }
        }

        Self::from_shorthand(locator, prefer_clone)
    }

    /// Ref to check out after cloning, if it differs from the default
    #[must_use]
    pub fn checkout(&self) -> Option<&str> {
        (self.method == TransferMethod::Clone && self.reference != DEFAULT_REF)
            .then_some(self.reference.as_str())
    }

    fn from_shorthand(locator: &str, prefer_clone: bool) -> Result<Self, Error> {
        let captures = pattern(&SHORTHAND_RE)?
            .captures(locator)
            .ok_or_else(|| invalid(locator, "expected `[provider:][host:]owner/name[#ref]`"))?;

        let named = captures.get(1).map(|m| m.as_str());
        let host = captures.get(2).map(|m| m.as_str());
        let owner = captures.get(3).map_or("", |m| m.as_str());
        let repo = captures.get(4).map_or("", |m| m.as_str());
        let reference = captures.get(5).map_or(DEFAULT_REF, |m| m.as_str());

        if let Some(host) = host {
            reject_unknown_prefix(locator, host)?;
        }
        if owner.chars().any(char::is_whitespace) || repo.chars().any(char::is_whitespace) {
            return Err(invalid(locator, "owner and name must not contain whitespace"));
        }

        let provider = match (named, host) {
            (Some(prefix), _) => prefix
                .parse::<Provider>()
                .map_err(|_| SourceError::UnknownProvider {
                    provider: prefix.to_string(),
                    locator: locator.to_string(),
                })?,
            (None, Some(host)) => Provider::from_host(host).unwrap_or(Provider::Generic),
            (None, None) => Provider::GitHub,
        };

        let host = host.unwrap_or_else(|| provider.default_host());
        let base = add_protocol(host)?;

        let method = if provider.forces_clone() || prefer_clone {
            TransferMethod::Clone
        } else {
            TransferMethod::Archive
        };
        let url = match method {
            TransferMethod::Clone => provider.clone_url(&base, owner, repo),
            TransferMethod::Archive => provider.archive_url(&base, owner, repo, reference),
        };

        Ok(Self {
            provider,
            host: strip_protocol(host).to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            reference: reference.to_string(),
            method,
            url,
        })
    }

    fn from_url(url: &Url) -> Self {
        let reference = url
            .fragment()
            .filter(|fragment| !fragment.is_empty())
            .unwrap_or(DEFAULT_REF)
            .to_string();

        let mut target = url.clone();
        target.set_fragment(None);

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        let owner = if segments.len() > 1 { segments[0] } else { "" };
        let repo = segments.last().map_or("", |last| trim_artifact_suffix(last));

        let method = if url.path().ends_with(".git") {
            TransferMethod::Clone
        } else {
            TransferMethod::Archive
        };

        Self {
            provider: Provider::Generic,
            host: url.host_str().unwrap_or_default().to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            reference,
            method,
            url: target.to_string(),
        }
    }
}

/// Compiled once per process; a bad pattern surfaces as an internal error
fn pattern(compiled: &'static Pattern) -> Result<&'static Regex, Error> {
    compiled
        .as_ref()
        .map_err(|e| Error::internal(format!("failed to compile regex: {e}")))
}

fn invalid(locator: &str, reason: &str) -> Error {
    SourceError::InvalidLocator {
        locator: locator.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// `svn:example.com:owner/name` names a provider we do not know; a
/// `host:port` pair is left alone.
fn reject_unknown_prefix(locator: &str, host: &str) -> Result<(), Error> {
    if pattern(&SCHEME_RE)?.is_match(host) {
        return Ok(());
    }
    if let Some((prefix, rest)) = host.split_once(':') {
        let looks_like_port = !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit());
        if !looks_like_port && prefix.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SourceError::UnknownProvider {
                provider: prefix.to_string(),
                locator: locator.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

fn add_protocol(host: &str) -> Result<String, Error> {
    if pattern(&PROTOCOL_RE)?.is_match(host) {
        Ok(host.to_string())
    } else {
        Ok(format!("https://{host}"))
    }
}

fn trim_artifact_suffix(name: &str) -> &str {
    [".git", ".tar.gz", ".tgz", ".tar", ".zip"]
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .unwrap_or(name)
}
