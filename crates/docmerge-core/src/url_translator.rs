//! Maps a staged output path to the public URL it is served under.

use std::path::PathBuf;

use url::Url;

use crate::config::{ConfigError, MergeConfig};
use crate::error::MergeError;

#[derive(Debug, Clone)]
pub struct UrlTranslator {
    base_path: String,
    /// `scheme://authority/` of the base URL; its path, query and fragment are not used.
    origin: Url,
}

impl UrlTranslator {
    pub fn new(base_path: &str, base_url: &str) -> Result<Self, ConfigError> {
        if base_path.trim().is_empty() {
            return Err(ConfigError::EmptyBasePath);
        }
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            value: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(ConfigError::BaseUrlWithoutHost(base_url.to_string()));
        }
        let origin = Url::parse(&format!("{}://{}/", parsed.scheme(), parsed.authority()))
            .map_err(|e| invalid(e.to_string()))?;
        if origin.cannot_be_a_base() {
            return Err(invalid("cannot be used as a base URL".to_string()));
        }
        Ok(Self {
            base_path: normalize_separators(base_path),
            origin,
        })
    }

    pub fn from_config(cfg: &MergeConfig) -> Result<Self, ConfigError> {
        Self::new(&cfg.base_path, &cfg.base_url)
    }

    /// Public URL for `location`, a plain path or a `file://` URI.
    ///
    /// Only paths under the base path are published; anything else is a
    /// [`MergeError::UrlTranslation`]. Path segments are percent-encoded.
    pub fn to_url(&self, location: &str) -> Result<String, MergeError> {
        let not_published = || MergeError::UrlTranslation {
            path: PathBuf::from(location),
        };
        let path = normalize_separators(&path_component(location));
        let rest = self.strip_base(&path).ok_or_else(not_published)?;

        let mut url = self.origin.clone();
        url.path_segments_mut()
            .map_err(|()| not_published())?
            .clear()
            .extend(rest.split('/').filter(|s| !s.is_empty()));
        let url = String::from(url);
        tracing::debug!(location, %url, "translated output path");
        Ok(url)
    }

    /// Remainder of `path` after the base prefix, if the prefix ends on a
    /// path component boundary.
    fn strip_base<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.base_path.as_str())?;
        let on_boundary = rest.is_empty() || rest.starts_with('/') || self.base_path.ends_with('/');
        on_boundary.then_some(rest)
    }
}

fn path_component(location: &str) -> String {
    let is_file_uri = location
        .get(..7)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("file://"));
    if is_file_uri {
        if let Ok(url) = Url::parse(location) {
            if let Ok(p) = url.to_file_path() {
                return p.to_string_lossy().into_owned();
            }
            return url.path().to_string();
        }
    }
    location.to_string()
}

fn normalize_separators(s: &str) -> String {
    s.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_base_path_and_prepends_origin() {
        let t = UrlTranslator::new("/tmp", "https://example.org/").unwrap();
        assert_eq!(
            t.to_url("/tmp/staging_x/merged.pdf").unwrap(),
            "https://example.org/staging_x/merged.pdf"
        );
    }

    #[test]
    fn base_path_with_trailing_separator() {
        let t = UrlTranslator::new("/tmp/", "https://example.org").unwrap();
        assert_eq!(
            t.to_url("/tmp/staging_x/merged.pdf").unwrap(),
            "https://example.org/staging_x/merged.pdf"
        );
    }

    #[test]
    fn keeps_port_and_ignores_base_url_path() {
        let t = UrlTranslator::new("/srv/out", "http://files.local:8080/docs/").unwrap();
        assert_eq!(
            t.to_url("/srv/out/merge_h_ABCD1234/report.pdf").unwrap(),
            "http://files.local:8080/merge_h_ABCD1234/report.pdf"
        );
        let t = UrlTranslator::new("/srv/out", "https://example.org/app/?x=1#top").unwrap();
        assert_eq!(t.to_url("/srv/out/s/m.pdf").unwrap(), "https://example.org/s/m.pdf");
    }

    #[test]
    fn segments_are_percent_encoded() {
        let t = UrlTranslator::new("/srv/out", "https://example.org/").unwrap();
        assert_eq!(
            t.to_url("/srv/out/merge_h_ABCD1234/my report #2 50%.pdf").unwrap(),
            "https://example.org/merge_h_ABCD1234/my%20report%20%232%2050%25.pdf"
        );
        assert_eq!(
            t.to_url("/srv/out/s/what?.pdf").unwrap(),
            "https://example.org/s/what%3F.pdf"
        );
    }

    #[test]
    fn windows_separators_are_normalized() {
        let t = UrlTranslator::new(r"C:\srv\out", "https://example.org/").unwrap();
        assert_eq!(
            t.to_url(r"C:\srv\out\merge_h_ABCD1234\merged.pdf").unwrap(),
            "https://example.org/merge_h_ABCD1234/merged.pdf"
        );
    }

    #[cfg(unix)]
    #[test]
    fn accepts_file_uri() {
        let t = UrlTranslator::new("/var/www", "https://localhost/").unwrap();
        assert_eq!(
            t.to_url("file:///var/www/staging_directory/abcdefghijkl/merged.pdf")
                .unwrap(),
            "https://localhost/staging_directory/abcdefghijkl/merged.pdf"
        );
    }

    #[test]
    fn path_outside_base_is_an_error() {
        let t = UrlTranslator::new("/srv/out", "https://example.org/").unwrap();
        let err = t.to_url("/etc/passwd").unwrap_err();
        assert!(matches!(err, MergeError::UrlTranslation { .. }));
        let err = t.to_url("/srv/outside/merged.pdf").unwrap_err();
        assert!(matches!(err, MergeError::UrlTranslation { .. }));
    }

    #[test]
    fn construction_rejects_bad_configuration() {
        assert_eq!(
            UrlTranslator::new("", "https://example.org/").unwrap_err(),
            ConfigError::EmptyBasePath
        );
        assert!(matches!(
            UrlTranslator::new("/tmp", "example.org").unwrap_err(),
            ConfigError::InvalidBaseUrl { .. }
        ));
    }
}
