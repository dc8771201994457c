//! Application version and build time.

use chrono::{DateTime, Utc};
use parley_types::error::SourceError;
use tokio_util::sync::CancellationToken;

use crate::prompt::source::TemplateSource;

pub const APP_VERSION_KEY: &str = "app-version";
pub const APP_BUILD_TIME_KEY: &str = "app-build-time";

const BUILD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct VersionTemplateSource {
    version: String,
    build_time: Option<DateTime<Utc>>,
}

impl VersionTemplateSource {
    /// `build_time` is `None` when the build time cannot be determined.
    pub fn new(version: impl Into<String>, build_time: Option<DateTime<Utc>>) -> Self {
        Self {
            version: version.into(),
            build_time,
        }
    }
}

impl TemplateSource for VersionTemplateSource {
    fn name(&self) -> &str {
        "version"
    }

    async fn has_key(&self, key: &str) -> Result<bool, SourceError> {
        Ok(key == APP_VERSION_KEY || key == APP_BUILD_TIME_KEY)
    }

    async fn get_value(&self, key: &str, _cancel: &CancellationToken) -> Result<String, SourceError> {
        match key {
            APP_VERSION_KEY => Ok(self.version.clone()),
            APP_BUILD_TIME_KEY => Ok(self
                .build_time
                .map(|t| t.format(BUILD_TIME_FORMAT).to_string())
                .unwrap_or_else(|| "unknown".to_string())),
            other => Err(SourceError::UnsupportedKey(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_version_values() {
        let built = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let source = VersionTemplateSource::new("1.2.3", Some(built));
        let cancel = CancellationToken::new();

        assert!(source.has_key(APP_VERSION_KEY).await.unwrap());
        assert!(!source.has_key("app-name").await.unwrap());
        assert_eq!(source.get_value(APP_VERSION_KEY, &cancel).await.unwrap(), "1.2.3");
        assert_eq!(
            source.get_value(APP_BUILD_TIME_KEY, &cancel).await.unwrap(),
            "2024-05-01 08:30:00"
        );
        assert!(matches!(
            source.get_value("app-name", &cancel).await,
            Err(SourceError::UnsupportedKey(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_build_time() {
        let source = VersionTemplateSource::new("1.2.3", None);
        let value = source
            .get_value(APP_BUILD_TIME_KEY, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(value, "unknown");
    }
}
