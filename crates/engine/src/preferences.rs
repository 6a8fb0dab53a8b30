use std::{fs, path::Path};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, Suggester};

/// User preferences, persisted as one JSON object.
///
/// `last_date` is only stored when it differs from the day the form was
/// closed, so a missing value means "today" at the next start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_to_clearing")]
    pub default_to_clearing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_asset_account: Option<String>,
    #[serde(default)]
    pub suggester: Suggester,
}

fn default_to_clearing() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_to_clearing: default_to_clearing(),
            last_date: None,
            last_asset_account: None,
            suggester: Suggester::default(),
        }
    }
}

impl Preferences {
    /// Loads preferences from `path`; a missing file yields the defaults.
    pub fn load_or_defaults(path: &Path) -> ResultEngine<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(EngineError::io(path, err)),
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes the whole preference set to `path`.
    pub fn persist(&self, path: &Path) -> ResultEngine<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| EngineError::io(parent, err))?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(path, payload).map_err(|err| EngineError::io(path, err))?;
        tracing::debug!(path = %path.display(), "preferences saved");
        Ok(())
    }

    /// The date the form should start on.
    #[must_use]
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        self.last_date.unwrap_or(today)
    }
}
