//! Incentive ledger: per-member balances with a change log.

use crate::atomic::{read_optional, write_atomic};
use bastion_core::Snowflake;
use bastion_error::{BastionResult, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// One change-log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// `[YYYY-MM-DD HH:MM:SS]` local time
    pub ts: String,
    /// What changed
    pub msg: String,
}

/// Balance record for one member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerRecord {
    /// Current balance
    pub current: f64,
    /// Total (limit) balance
    pub total: f64,
    /// Change log, oldest first
    pub logs: Vec<LedgerEntry>,
}

impl LedgerRecord {
    fn log(&mut self, msg: impl Into<String>) {
        self.logs.push(LedgerEntry {
            ts: stamp(),
            msg: msg.into(),
        });
    }

    /// The last `n` change-log lines joined for display.
    pub fn recent(&self, n: usize) -> String {
        let skip = self.logs.len().saturating_sub(n);
        let lines: Vec<String> = self.logs[skip..]
            .iter()
            .map(|l| format!("{} {}", l.ts, l.msg))
            .collect();
        if lines.is_empty() {
            "No changes yet.".to_string()
        } else {
            lines.join("\n")
        }
    }
}

fn stamp() -> String {
    chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]").to_string()
}

/// Format an amount as `$1234.50`.
pub fn format_usd(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Parse an operator-typed amount, accepting `$` and thousands separators.
///
/// # Examples
///
/// ```
/// use bastion_store::parse_amount;
///
/// assert_eq!(parse_amount("$1,250.5"), Some(1250.5));
/// assert_eq!(parse_amount("-20"), Some(-20.0));
/// assert_eq!(parse_amount("lots"), None);
/// ```
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

type LedgerMap = BTreeMap<Snowflake, LedgerRecord>;

/// JSON-file ledger keyed by member identifier.
#[derive(Debug, Clone)]
pub struct IncentiveLedger {
    path: PathBuf,
}

impl IncentiveLedger {
    /// Ledger stored at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    async fn read(&self) -> BastionResult<LedgerMap> {
        let Some(raw) = read_optional(&self.path).await? else {
            return Ok(LedgerMap::new());
        };
        match serde_json::from_str::<LedgerMap>(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                debug!(error = %e, "Ledger is not JSON, reading legacy line format");
                Ok(parse_legacy(&raw))
            }
        }
    }

    async fn write(&self, map: &LedgerMap) -> BastionResult<()> {
        let json = serde_json::to_string_pretty(map).map_err(StoreError::from)?;
        write_atomic(&self.path, &json).await
    }

    /// Record for `id`, or an empty one. Never writes.
    pub async fn record(&self, id: &Snowflake) -> BastionResult<LedgerRecord> {
        Ok(self.read().await?.remove(id).unwrap_or_default())
    }

    /// Set the total (limit) balance, leaving the current balance untouched.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn set_total(&self, id: &Snowflake, amount: f64) -> BastionResult<LedgerRecord> {
        let mut map = self.read().await?;
        let record = map.entry(id.clone()).or_default();
        record.log(format!("Profit set to {}", format_usd(amount)));
        record.total = amount;
        record.log(format!("Total profit set to {}", format_usd(amount)));
        let record = record.clone();
        self.write(&map).await?;
        Ok(record)
    }

    /// Add `delta` to the current balance.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn add(&self, id: &Snowflake, delta: f64) -> BastionResult<LedgerRecord> {
        let mut map = self.read().await?;
        let record = map.entry(id.clone()).or_default();
        record.current += delta;
        let current = record.current;
        record.log(format!("Profit set to {}", format_usd(current)));
        let record = record.clone();
        self.write(&map).await?;
        Ok(record)
    }

    /// Zero both balances and restart the change log.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn reset(&self, id: &Snowflake) -> BastionResult<LedgerRecord> {
        let mut map = self.read().await?;
        let mut record = LedgerRecord::default();
        record.log("Profile reset");
        map.insert(id.clone(), record.clone());
        self.write(&map).await?;
        Ok(record)
    }
}

/// `id current total | free text` per line.
fn parse_legacy(raw: &str) -> LedgerMap {
    let mut map = LedgerMap::new();
    for line in raw.lines() {
        let head = line.split('|').next().unwrap_or_default();
        let mut fields = head.split_whitespace();
        let Some(id) = fields.next().and_then(Snowflake::parse) else {
            continue;
        };
        let current = fields.next().and_then(|v| v.parse().ok()).unwrap_or(0.0);
        let total = fields.next().and_then(|v| v.parse().ok()).unwrap_or(0.0);
        map.insert(
            id,
            LedgerRecord {
                current,
                total,
                logs: Vec::new(),
            },
        );
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_lines() {
        let map = parse_legacy("123456 10 50 | old\n\nbad line\n234567 3\n");
        assert_eq!(map.len(), 2);
        let first = &map[&Snowflake::parse("123456").unwrap()];
        assert_eq!(first.current, 10.0);
        assert_eq!(first.total, 50.0);
        assert_eq!(map[&Snowflake::parse("234567").unwrap()].total, 0.0);
    }

    #[test]
    fn test_recent_keeps_tail() {
        let mut record = LedgerRecord::default();
        for i in 0..12 {
            record.log(format!("change {i}"));
        }
        let recent = record.recent(10);
        assert_eq!(recent.lines().count(), 10);
        assert!(recent.ends_with("change 11"));
        assert!(!recent.contains("change 1\n"));
    }

    #[test]
    fn test_usd() {
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(12.5), "$12.50");
    }
}
