//! Agent configuration file.

use bastion_core::Snowflake;
use bastion_error::{BastionResult, ConfigError, ConfigErrorKind, StoreError, StoreErrorKind};
use bastion_guard::{EngineSettings, EngineSettingsBuilder};
use bastion_store::{StoreLayout, StoreLayoutBuilder};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration, read from TOML.
///
/// Every field has a default, so an empty file (or no file at all) is a
/// valid configuration.
///
/// # Example
///
/// ```
/// use bastion::BastionConfig;
///
/// let config: BastionConfig = toml::from_str("data_dir = \"/var/lib/bastion\"").unwrap();
/// assert_eq!(*config.sweep_interval_ms(), 1000);
/// assert!(config.layout().unwrap().deny_list_path().ends_with("blacklist.txt"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[serde(default)]
#[builder(default, setter(into))]
pub struct BastionConfig {
    /// Directory holding the state files
    data_dir: PathBuf,
    /// Channel that receives notices
    #[builder(setter(into, strip_option))]
    log_channel_id: Option<String>,
    /// Invite sent to kicked members
    reinvite_url: String,
    /// Period of the deny-list sweep
    sweep_interval_ms: u64,
    /// Wait before re-reading the audit trail for a ban
    ban_retry_delay_ms: u64,
    /// Maximum age of a ban audit entry
    ban_window_secs: u64,
    /// Maximum age of any other audit entry
    event_window_secs: u64,
    /// Audit entries fetched per lookup
    audit_limit: u8,
    /// State file names inside `data_dir`
    files: FileNames,
}

/// Names of the state files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct FileNames {
    deny_list: String,
    allow_list: String,
    operators: String,
    tickets: String,
    features: String,
    ledger: String,
    seen_members: String,
}

impl Default for FileNames {
    fn default() -> Self {
        let layout = StoreLayout::default();
        Self {
            deny_list: layout.deny_list_file().clone(),
            allow_list: layout.allow_list_file().clone(),
            operators: layout.operators_file().clone(),
            tickets: layout.tickets_file().clone(),
            features: layout.features_file().clone(),
            ledger: layout.ledger_file().clone(),
            seen_members: layout.seen_members_file().clone(),
        }
    }
}

impl Default for BastionConfig {
    fn default() -> Self {
        let engine = EngineSettings::default();
        Self {
            data_dir: PathBuf::from("."),
            log_channel_id: None,
            reinvite_url: engine.reinvite_url().clone(),
            sweep_interval_ms: engine.sweep_interval().as_millis() as u64,
            ban_retry_delay_ms: engine.ban_retry_delay().as_millis() as u64,
            ban_window_secs: engine.ban_window().as_secs(),
            event_window_secs: engine.event_window().as_secs(),
            audit_limit: *engine.audit_limit(),
            files: FileNames::default(),
        }
    }
}

impl BastionConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> BastionResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::new(ConfigErrorKind::Read {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            ConfigError::new(ConfigErrorKind::Parse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use the defaults.
    pub fn load(path: Option<&Path>) -> BastionResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Reject values the agent cannot run with.
    pub fn validate(&self) -> BastionResult<()> {
        if self.sweep_interval_ms == 0 {
            return Err(ConfigError::invalid("sweep_interval_ms", "must be greater than zero").into());
        }
        if self.audit_limit == 0 {
            return Err(ConfigError::invalid("audit_limit", "must be greater than zero").into());
        }
        self.log_channel()?;
        Ok(())
    }

    /// The configured log channel, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if `log_channel_id` is set but is not an identifier.
    pub fn log_channel(&self) -> BastionResult<Option<Snowflake>> {
        match self.log_channel_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => Snowflake::parse(raw).map(Some).ok_or_else(|| {
                ConfigError::invalid("log_channel_id", format!("`{}` is not an identifier", raw))
                    .into()
            }),
        }
    }

    /// Where the state files live.
    pub fn layout(&self) -> BastionResult<StoreLayout> {
        StoreLayoutBuilder::default()
            .data_dir(self.data_dir.clone())
            .deny_list_file(self.files.deny_list.clone())
            .allow_list_file(self.files.allow_list.clone())
            .operators_file(self.files.operators.clone())
            .tickets_file(self.files.tickets.clone())
            .features_file(self.files.features.clone())
            .ledger_file(self.files.ledger.clone())
            .seen_members_file(self.files.seen_members.clone())
            .build()
            .map_err(|e| ConfigError::invalid("files", e.to_string()).into())
    }

    /// The state layout, with its data directory created if missing.
    pub async fn prepare_layout(&self) -> BastionResult<StoreLayout> {
        let layout = self.layout()?;
        tokio::fs::create_dir_all(layout.data_dir())
            .await
            .map_err(|e| {
                StoreError::new(StoreErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    layout.data_dir().display(),
                    e
                )))
            })?;
        Ok(layout)
    }

    /// Engine tunables.
    pub fn engine_settings(&self) -> BastionResult<EngineSettings> {
        EngineSettingsBuilder::default()
            .ban_window(Duration::from_secs(self.ban_window_secs))
            .event_window(Duration::from_secs(self.event_window_secs))
            .ban_retry_delay(Duration::from_millis(self.ban_retry_delay_ms))
            .audit_limit(self.audit_limit)
            .reinvite_url(self.reinvite_url.clone())
            .sweep_interval(Duration::from_millis(self.sweep_interval_ms))
            .build()
            .map_err(|e| ConfigError::invalid("engine", e.to_string()).into())
    }
}
