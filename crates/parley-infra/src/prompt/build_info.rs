//! Version and build time of the running binary.

use chrono::{DateTime, Utc};
use parley_core::prompt::sources::version::VersionTemplateSource;

/// Version of the Parley workspace this binary was built from.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Modification time of the running executable, used as its build time.
pub fn executable_build_time() -> Option<DateTime<Utc>> {
    let exe = std::env::current_exe().ok()?;
    let modified = std::fs::metadata(&exe).and_then(|m| m.modified());
    match modified {
        Ok(time) => Some(DateTime::<Utc>::from(time)),
        Err(err) => {
            tracing::debug!(path = %exe.display(), error = %err, "Build time unavailable");
            None
        }
    }
}

/// Version source describing the running binary.
pub fn version_source() -> VersionTemplateSource {
    VersionTemplateSource::new(APP_VERSION, executable_build_time())
}
