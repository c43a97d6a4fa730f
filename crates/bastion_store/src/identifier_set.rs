//! Named identifier sets backed by newline-delimited files.

use crate::StoreLayout;
use crate::atomic::{read_optional, write_atomic};
use bastion_core::Snowflake;
use bastion_error::BastionResult;
use std::path::PathBuf;
use tracing::{debug, instrument};

/// The identifier sets the agent maintains.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
pub enum SetName {
    /// Members removed from every monitored server on sight.
    #[strum(to_string = "blacklist", serialize = "deny")]
    DenyList,
    /// Members exempt from enforcement and from deny-listing.
    #[strum(to_string = "whitelist", serialize = "allow")]
    AllowList,
    /// Members allowed to issue operator commands.
    #[strum(serialize = "operators")]
    Operators,
    /// Channels created as support tickets.
    #[strum(serialize = "tickets")]
    Tickets,
}

/// An ordered set of identifiers.
///
/// Insertion order is kept so that adding and then removing an identifier
/// leaves the backing file exactly as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSet {
    ids: Vec<Snowflake>,
}

impl IdentifierSet {
    /// Parse newline-delimited file contents, keeping valid identifiers only.
    pub fn parse(raw: &str) -> Self {
        let mut set = Self::default();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match Snowflake::parse(line) {
                Some(id) => {
                    set.insert(id);
                }
                None => debug!(line, "Skipping malformed identifier"),
            }
        }
        set
    }

    /// File contents: one identifier per line, trailing newline when non-empty.
    pub fn render(&self) -> String {
        if self.ids.is_empty() {
            return String::new();
        }
        let mut out = self
            .ids
            .iter()
            .map(Snowflake::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        out.push('\n');
        out
    }

    /// Whether `id` is present.
    pub fn contains(&self, id: &Snowflake) -> bool {
        self.ids.contains(id)
    }

    /// Add `id`; returns false if it was already present.
    pub fn insert(&mut self, id: Snowflake) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Remove `id`; returns false if it was absent.
    pub fn remove(&mut self, id: &Snowflake) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        before != self.ids.len()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Snowflake> {
        self.ids.iter()
    }

    /// Number of identifiers.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<Snowflake> for IdentifierSet {
    fn from_iter<I: IntoIterator<Item = Snowflake>>(iter: I) -> Self {
        let mut set = Self::default();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// Durable store for every [`SetName`].
///
/// There is no in-memory cache: each call reads the file, and each mutation
/// rewrites it before returning. A missing file is an empty set.
///
/// # Example
///
/// ```no_run
/// use bastion_store::{IdentifierStore, SetName, StoreLayout};
///
/// # async fn demo() -> bastion_error::BastionResult<()> {
/// let store = IdentifierStore::new(StoreLayout::in_dir("/var/lib/bastion"));
/// store.add(SetName::DenyList, ["123456789012"]).await?;
/// assert!(store.contains_str(SetName::DenyList, "123456789012").await?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IdentifierStore {
    layout: StoreLayout,
}

impl IdentifierStore {
    /// Create a store over the given layout.
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    /// The layout in use.
    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    fn path(&self, set: SetName) -> PathBuf {
        match set {
            SetName::DenyList => self.layout.deny_list_path(),
            SetName::AllowList => self.layout.allow_list_path(),
            SetName::Operators => self.layout.operators_path(),
            SetName::Tickets => self.layout.tickets_path(),
        }
    }

    /// Current contents of `set`.
    #[instrument(skip(self), fields(set = %set))]
    pub async fn load(&self, set: SetName) -> BastionResult<IdentifierSet> {
        let raw = read_optional(&self.path(set)).await?;
        Ok(raw.map(|r| IdentifierSet::parse(&r)).unwrap_or_default())
    }

    /// Add identifiers to `set`, silently dropping malformed ones.
    ///
    /// Returns the set as persisted.
    #[instrument(skip(self, ids), fields(set = %set))]
    pub async fn add<I, S>(&self, set: SetName, ids: I) -> BastionResult<IdentifierSet>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut current = self.load(set).await?;
        let mut added = 0usize;
        for raw in ids {
            if let Some(id) = Snowflake::parse(raw.as_ref())
                && current.insert(id)
            {
                added += 1;
            }
        }
        write_atomic(&self.path(set), &current.render()).await?;
        debug!(added, size = current.len(), "Identifier set updated");
        Ok(current)
    }

    /// Remove identifiers from `set`.
    ///
    /// Returns the set as persisted.
    #[instrument(skip(self, ids), fields(set = %set))]
    pub async fn remove<I, S>(&self, set: SetName, ids: I) -> BastionResult<IdentifierSet>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut current = self.load(set).await?;
        let mut removed = 0usize;
        for raw in ids {
            if let Some(id) = Snowflake::parse(raw.as_ref())
                && current.remove(&id)
            {
                removed += 1;
            }
        }
        write_atomic(&self.path(set), &current.render()).await?;
        debug!(removed, size = current.len(), "Identifier set updated");
        Ok(current)
    }

    /// Whether `id` is in `set`.
    pub async fn contains(&self, set: SetName, id: &Snowflake) -> BastionResult<bool> {
        Ok(self.load(set).await?.contains(id))
    }

    /// Whether the textual identifier `id` is in `set`.
    pub async fn contains_str(&self, set: SetName, id: &str) -> BastionResult<bool> {
        match Snowflake::parse(id) {
            Some(id) => self.contains(set, &id).await,
            None => Ok(false),
        }
    }
}
