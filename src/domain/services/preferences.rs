#[cfg(test)]
#[path = "preferences_test.rs"]
mod tests;

use std::env;
use std::path;
use std::str::FromStr;

use anyhow::Result;
use tokio::fs;

use crate::domain::models::Theme;

/// UI preferences kept between runs. Only the theme lives here, nothing
/// about a conversation is ever written to disk.
pub struct Preferences {
    pub file_path: path::PathBuf,
}

impl Default for Preferences {
    fn default() -> Preferences {
        let file_path = dirs::config_dir()
            .unwrap_or_else(env::temp_dir)
            .join("flipassist/theme");

        return Preferences::new(file_path);
    }
}

impl Preferences {
    pub fn new(file_path: path::PathBuf) -> Preferences {
        return Preferences { file_path };
    }

    /// Missing or unreadable preferences fall back to the default theme.
    pub async fn load_theme(&self) -> Theme {
        let payload = match fs::read_to_string(&self.file_path).await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::debug!(error = ?err, "No saved theme preference");
                return Theme::default();
            }
        };

        return Theme::from_str(payload.trim()).unwrap_or_else(|err| {
            tracing::warn!(error = ?err, payload = %payload.trim(), "Ignoring invalid theme preference");
            return Theme::default();
        });
    }

    pub async fn save_theme(&self, theme: Theme) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        fs::write(&self.file_path, theme.to_string()).await?;

        return Ok(());
    }
}
