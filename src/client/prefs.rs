use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use tracing::warn;

/// View preferences that outlive a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub dark_mode: bool,
}

impl Preferences {
    /// Missing or unreadable files fall back to light mode.
    pub fn load(path: &Path) -> Self {
        let Ok(data) = fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&data).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "Ignoring unreadable preferences");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)
    }
}
