//! Location of every state file.

use derive_getters::Getters;
use std::path::{Path, PathBuf};

/// Where the agent keeps its state files.
///
/// File names default to the names operators already know; only the data
/// directory usually needs to change.
///
/// # Example
///
/// ```
/// use bastion_store::StoreLayoutBuilder;
///
/// let layout = StoreLayoutBuilder::default()
///     .data_dir("/var/lib/bastion")
///     .build()
///     .unwrap();
/// assert!(layout.deny_list_path().ends_with("blacklist.txt"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct StoreLayout {
    /// Directory holding every file below
    #[builder(default = "PathBuf::from(\".\")")]
    data_dir: PathBuf,
    /// Deny-list file
    #[builder(default = "\"blacklist.txt\".to_string()")]
    deny_list_file: String,
    /// Allow-list file
    #[builder(default = "\"whitelist.txt\".to_string()")]
    allow_list_file: String,
    /// Operators allowed to issue commands
    #[builder(default = "\"allowedUsers.txt\".to_string()")]
    operators_file: String,
    /// Ticket channel registry
    #[builder(default = "\"tickets.txt\".to_string()")]
    tickets_file: String,
    /// Feature flags
    #[builder(default = "\"features.json\".to_string()")]
    features_file: String,
    /// Incentive ledger
    #[builder(default = "\"profit.txt\".to_string()")]
    ledger_file: String,
    /// Seen-membership snapshot
    #[builder(default = "\"user_ids.txt\".to_string()")]
    seen_members_file: String,
}

impl StoreLayout {
    /// Default file names inside `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Full path of the deny-list file.
    pub fn deny_list_path(&self) -> PathBuf {
        self.data_dir.join(&self.deny_list_file)
    }

    /// Full path of the allow-list file.
    pub fn allow_list_path(&self) -> PathBuf {
        self.data_dir.join(&self.allow_list_file)
    }

    /// Full path of the operator list file.
    pub fn operators_path(&self) -> PathBuf {
        self.data_dir.join(&self.operators_file)
    }

    /// Full path of the ticket registry file.
    pub fn tickets_path(&self) -> PathBuf {
        self.data_dir.join(&self.tickets_file)
    }

    /// Full path of the feature flag file.
    pub fn features_path(&self) -> PathBuf {
        self.data_dir.join(&self.features_file)
    }

    /// Full path of the incentive ledger file.
    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(&self.ledger_file)
    }

    /// Full path of the seen-membership file.
    pub fn seen_members_path(&self) -> PathBuf {
        self.data_dir.join(&self.seen_members_file)
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            deny_list_file: "blacklist.txt".to_string(),
            allow_list_file: "whitelist.txt".to_string(),
            operators_file: "allowedUsers.txt".to_string(),
            tickets_file: "tickets.txt".to_string(),
            features_file: "features.json".to_string(),
            ledger_file: "profit.txt".to_string(),
            seen_members_file: "user_ids.txt".to_string(),
        }
    }
}
