//! Operator text commands.
//!
//! Commands start with `+` and are only honoured for identifiers in the
//! operator set. Replies are [`Notice`]s; the caller decides where they go.

use crate::GuardResult;
use crate::gateway::ModerationGateway;
use crate::notify::tag;
use bastion_core::{Capability, Notice, Snowflake, palette};
use bastion_error::{CommandError, CommandErrorKind};
use bastion_store::{
    FeatureRegistry, IdentifierStore, IncentiveLedger, LedgerRecord, SetName, format_usd,
    parse_amount,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Identifiers listed per `+view` notice.
pub const VIEW_CHUNK: usize = 50;

const VIEW_USAGE: &str = "`+view whitelist` or `+view blacklist`";
const TOGGLE_USAGE: &str =
    "`+enable ban,kick,botadd,channel,roleUpdate,roleDelete` or `+disable ...`";
const LIST_USAGE: &str =
    "`+whitelist @user`, `+unwhitelist @user`, `+blacklist @user`, `+unblacklist @user`";

/// A parsed operator command.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorCommand {
    /// `+help`
    Help,
    /// `+settings`
    Settings,
    /// `+view whitelist|blacklist`
    View(SetName),
    /// `+enable a,b` / `+disable a,b`
    Toggle {
        /// Switch on rather than off
        enable: bool,
        /// Names as typed, before normalization
        names: Vec<String>,
    },
    /// `+whitelist`, `+unwhitelist`, `+blacklist`, `+unblacklist`
    EditList {
        /// Target set
        set: SetName,
        /// Add rather than remove
        add: bool,
        /// Member to add or remove
        id: Snowflake,
    },
    /// `+tprofit @user amount`
    SetTotal {
        /// Member
        id: Snowflake,
        /// New total
        amount: f64,
    },
    /// `+addprofit @user amount`
    AddProfit {
        /// Member
        id: Snowflake,
        /// Amount added to the current balance
        amount: f64,
    },
    /// `+search @user`
    Search(Snowflake),
    /// `+reset @user`
    Reset(Snowflake),
}

impl OperatorCommand {
    /// Parse a message.
    ///
    /// Returns `Ok(None)` for anything that is not a known command, and a
    /// usage error for a known command with bad arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use bastion_guard::OperatorCommand;
    ///
    /// let cmd = OperatorCommand::parse("+view Blacklist").unwrap();
    /// assert!(matches!(cmd, Some(OperatorCommand::View(_))));
    /// assert!(OperatorCommand::parse("hello").unwrap().is_none());
    /// assert!(OperatorCommand::parse("+search nobody").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Option<Self>, CommandError> {
        let text = text.trim();
        let Some(body) = text.strip_prefix('+') else {
            return Ok(None);
        };
        let mut parts = body.split_whitespace();
        let Some(head) = parts.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = parts.collect();

        let command = match head.to_lowercase().as_str() {
            "help" => Self::Help,
            "settings" => Self::Settings,
            "view" => {
                let set = args
                    .first()
                    .and_then(|a| a.to_lowercase().parse::<SetName>().ok())
                    .filter(|s| matches!(s, SetName::DenyList | SetName::AllowList))
                    .ok_or_else(|| usage(VIEW_USAGE))?;
                Self::View(set)
            }
            verb @ ("enable" | "disable") => {
                let names: Vec<String> = args
                    .iter()
                    .flat_map(|a| a.split(','))
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
                if names.is_empty() {
                    return Err(usage(TOGGLE_USAGE));
                }
                Self::Toggle {
                    enable: verb == "enable",
                    names,
                }
            }
            verb @ ("whitelist" | "unwhitelist" | "blacklist" | "unblacklist") => {
                let id = member_arg(&args, LIST_USAGE)?;
                let (set, add) = match verb {
                    "whitelist" => (SetName::AllowList, true),
                    "unwhitelist" => (SetName::AllowList, false),
                    "blacklist" => (SetName::DenyList, true),
                    _ => (SetName::DenyList, false),
                };
                Self::EditList { set, add, id }
            }
            "tprofit" => {
                let (id, amount) = member_and_amount(&args, "`+tprofit @user amount`")?;
                Self::SetTotal { id, amount }
            }
            "addprofit" => {
                let (id, amount) = member_and_amount(&args, "`+addprofit @user amount`")?;
                Self::AddProfit { id, amount }
            }
            "search" => Self::Search(member_arg(&args, "`+search @user`")?),
            "reset" => Self::Reset(member_arg(&args, "`+reset @user`")?),
            _ => return Ok(None),
        };
        Ok(Some(command))
    }
}

#[track_caller]
fn usage(text: &str) -> CommandError {
    CommandError::new(CommandErrorKind::Usage(text.to_string()))
}

#[track_caller]
fn member_arg(args: &[&str], usage_text: &str) -> Result<Snowflake, CommandError> {
    args.first()
        .and_then(|a| Snowflake::from_mention(a))
        .ok_or_else(|| usage(usage_text))
}

#[track_caller]
fn member_and_amount(args: &[&str], usage_text: &str) -> Result<(Snowflake, f64), CommandError> {
    let id = member_arg(args, usage_text)?;
    let amount = args
        .get(1)
        .and_then(|a| parse_amount(a))
        .ok_or_else(|| usage(usage_text))?;
    Ok((id, amount))
}

/// Executes operator commands against the stores.
pub struct OperatorConsole {
    gateway: Arc<dyn ModerationGateway>,
    store: IdentifierStore,
    features: Arc<FeatureRegistry>,
    ledger: IncentiveLedger,
}

impl OperatorConsole {
    /// Create a console.
    pub fn new(
        gateway: Arc<dyn ModerationGateway>,
        store: IdentifierStore,
        features: Arc<FeatureRegistry>,
        ledger: IncentiveLedger,
    ) -> Self {
        Self {
            gateway,
            store,
            features,
            ledger,
        }
    }

    /// Handle a message from `author` in `guild`.
    ///
    /// Messages from non-operators and non-commands produce no replies. A
    /// known command with bad arguments produces a usage reply.
    #[instrument(skip(self, text), fields(guild = %guild, author = %author))]
    pub async fn handle(
        &self,
        guild: &Snowflake,
        author: &Snowflake,
        text: &str,
    ) -> GuardResult<Vec<Notice>> {
        if !text.trim_start().starts_with('+') {
            return Ok(Vec::new());
        }
        if !self.store.contains(SetName::Operators, author).await? {
            debug!("Ignoring command from non-operator");
            return Ok(Vec::new());
        }
        match OperatorCommand::parse(text) {
            Ok(Some(command)) => self.execute(guild, command).await,
            Ok(None) => Ok(Vec::new()),
            Err(e) => Ok(vec![Notice::new(
                "Usage",
                e.kind().to_string(),
                palette::WARNING,
            )]),
        }
    }

    /// Run a parsed command.
    pub async fn execute(
        &self,
        guild: &Snowflake,
        command: OperatorCommand,
    ) -> GuardResult<Vec<Notice>> {
        debug!(command = ?command, "Executing operator command");
        match command {
            OperatorCommand::Help => Ok(vec![help()]),
            OperatorCommand::Settings => Ok(vec![Notice::new(
                "⚙️ Current Settings",
                self.features.snapshot().pretty(),
                palette::INFO,
            )]),
            OperatorCommand::View(set) => self.view(set).await,
            OperatorCommand::Toggle { enable, names } => self.toggle(enable, &names).await,
            OperatorCommand::EditList { set, add, id } => self.edit_list(guild, set, add, &id).await,
            OperatorCommand::SetTotal { id, amount } => {
                let record = self.ledger.set_total(&id, amount).await?;
                Ok(vec![profit_report(&id, &record)])
            }
            OperatorCommand::AddProfit { id, amount } => {
                let record = self.ledger.add(&id, amount).await?;
                Ok(vec![profit_report(&id, &record)])
            }
            OperatorCommand::Search(id) => {
                let record = self.ledger.record(&id).await?;
                Ok(vec![profit_report(&id, &record)])
            }
            OperatorCommand::Reset(id) => {
                self.ledger.reset(&id).await?;
                Ok(vec![Notice::new(
                    "🔄 Profit Reset",
                    format!("Reset profit profile for <@{id}>."),
                    palette::SUCCESS,
                )])
            }
        }
    }

    async fn view(&self, set: SetName) -> GuardResult<Vec<Notice>> {
        let ids = self.store.load(set).await?;
        let label = match set {
            SetName::AllowList => "Whitelist",
            _ => "Blacklist",
        };
        let color = match set {
            SetName::AllowList => palette::ALLOW,
            _ => palette::DENY,
        };
        if ids.is_empty() {
            return Ok(vec![Notice::new(
                format!("📄 {label}"),
                format!("The **{set}** is currently empty."),
                color,
            )]);
        }

        let all: Vec<&Snowflake> = ids.iter().collect();
        Ok(all
            .chunks(VIEW_CHUNK)
            .enumerate()
            .map(|(i, chunk)| {
                let title = if i == 0 {
                    format!("📄 {label} ({})", ids.len())
                } else {
                    format!("📄 {label} (cont.)")
                };
                let body = chunk
                    .iter()
                    .map(|id| format!("• <@{id}> (`{id}`)"))
                    .collect::<Vec<_>>()
                    .join("\n");
                Notice::new(title, body, color)
            })
            .collect())
    }

    async fn toggle(&self, enable: bool, names: &[String]) -> GuardResult<Vec<Notice>> {
        let mut known = Vec::new();
        let mut unknown = Vec::new();
        for name in names {
            match Capability::normalize(name) {
                Some(capability) => known.push(capability),
                None => unknown.push(format!("`{name}`")),
            }
        }
        self.features.set_many(&known, enable).await?;
        info!(enable, changed = known.len(), "Feature flags updated");

        let mut lines = Vec::new();
        if !known.is_empty() {
            lines.push(format!("✅ Updated **{}** feature(s).", known.len()));
        }
        if !unknown.is_empty() {
            lines.push(format!("⚠️ Unknown: {}", unknown.join(", ")));
        }
        lines.push(String::new());
        lines.push(self.features.snapshot().pretty());

        let (title, color) = if enable {
            ("✅ Enabled", palette::SUCCESS)
        } else {
            ("⛔ Disabled", palette::DISABLED)
        };
        Ok(vec![Notice::new(title, lines.join("\n"), color)])
    }

    async fn edit_list(
        &self,
        guild: &Snowflake,
        set: SetName,
        add: bool,
        id: &Snowflake,
    ) -> GuardResult<Vec<Notice>> {
        let caps = match self.gateway.own_capabilities(guild).await {
            Ok(caps) => caps,
            Err(e) => {
                warn!(error = %e, "Could not read own permissions");
                Default::default()
            }
        };
        if !caps.ban_members || !caps.view_audit_log {
            return Ok(vec![Notice::new(
                "❌ Missing Permissions",
                "I need **Ban Members** and **View Audit Log**.",
                palette::DENY,
            )]);
        }

        if add {
            self.store.add(set, [id.as_str()]).await?;
        } else {
            self.store.remove(set, [id.as_str()]).await?;
        }
        info!(set = %set, add, id = %id, "Operator edited identifier set");

        let (title, color) = match (set, add) {
            (SetName::AllowList, true) => ("✅ Whitelisted", palette::ALLOW),
            (SetName::AllowList, false) => ("🧹 Removed from Whitelist", palette::ALLOW),
            (_, true) => ("⛔ Blacklisted", palette::DENY),
            (_, false) => ("🧹 Removed from Blacklist", palette::DENY),
        };
        Ok(vec![Notice::new(title, tag(id), color)])
    }
}

fn help() -> Notice {
    let body = [
        "**Lists**",
        "`+view whitelist` – Show IDs on the whitelist.",
        "`+view blacklist` – Show IDs on the blacklist.",
        "`+whitelist @user` / `+unwhitelist @user`",
        "`+blacklist @user` / `+unblacklist @user`",
        "",
        "**Feature Flags**",
        "`+enable <feature[,feature,...]>`",
        "`+disable <feature[,feature,...]>`",
        "`+settings` – Show current feature status.",
        "",
        "**Features you can toggle**",
        "`ban`, `kick`, `botadd`, `channel`, `roleUpdate`, `roleDelete`",
        "",
        "**Profit**",
        "`+tprofit @user amount`, `+addprofit @user amount`, `+search @user`, `+reset @user`",
    ]
    .join("\n");
    Notice::new("📖 Help", body, palette::HELP)
}

fn profit_report(id: &Snowflake, record: &LedgerRecord) -> Notice {
    Notice::new(
        format!("💰 Profit Report for {id}"),
        format!(
            "**Profit:** {}\n**Total Profit:** {}\n\n**Recent Profit Changes**\n{}",
            format_usd(record.current),
            format_usd(record.total),
            record.recent(10)
        ),
        palette::SUCCESS,
    )
}
