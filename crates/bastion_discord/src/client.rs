//! Discord bot client setup and lifecycle management.

use crate::{BastionHandler, SerenityGateway};
use bastion_core::Snowflake;
use bastion_error::{BastionResult, GatewayError, GatewayErrorKind};
use bastion_guard::{DenyListSweeper, EnforcementEngine, EngineSettings, OperatorConsole};
use bastion_store::{FeatureRegistry, IdentifierStore, IncentiveLedger, SeenMembers, StoreLayout};
use serenity::Client;
use std::sync::Arc;
use tracing::{info, instrument};

/// The Bastion Discord bot.
///
/// Wires the stores, the enforcement engine and the operator console to a
/// serenity client.
///
/// # Example
/// ```no_run
/// use bastion_discord::BastionBot;
/// use bastion_guard::EngineSettings;
/// use bastion_store::StoreLayout;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let token = std::env::var("DISCORD_TOKEN")?;
///     let mut bot = BastionBot::new(
///         &token,
///         StoreLayout::in_dir("./data"),
///         EngineSettings::default(),
///         None,
///     )
///     .await?;
///     bot.start().await?;
///     Ok(())
/// }
/// ```
pub struct BastionBot {
    client: Client,
    engine: Arc<EnforcementEngine>,
}

impl BastionBot {
    /// Create the bot.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The bot token is invalid
    /// - The feature file cannot be written
    /// - The serenity client fails to initialize
    #[instrument(skip(token, layout, settings), fields(data_dir = %layout.data_dir().display()))]
    pub async fn new(
        token: &str,
        layout: StoreLayout,
        settings: EngineSettings,
        log_channel: Option<Snowflake>,
    ) -> BastionResult<Self> {
        info!("Initializing Bastion Discord bot");

        let gateway = Arc::new(SerenityGateway::connect(token, log_channel).await?);
        let store = IdentifierStore::new(layout.clone());
        let features = Arc::new(FeatureRegistry::open(layout.features_path()).await?);

        let engine = Arc::new(EnforcementEngine::new(
            gateway.clone(),
            store.clone(),
            Arc::clone(&features),
            settings.clone(),
        ));
        let console = Arc::new(OperatorConsole::new(
            gateway.clone(),
            store.clone(),
            Arc::clone(&features),
            IncentiveLedger::new(layout.ledger_path()),
        ));
        let sweeper = Arc::new(DenyListSweeper::new(
            gateway.clone(),
            store,
            *settings.sweep_interval(),
        ));

        let handler = BastionHandler::new(
            gateway,
            Arc::clone(&engine),
            console,
            sweeper,
            features,
            SeenMembers::new(layout.seen_members_path()),
        );
        let intents = BastionHandler::intents();
        info!("Building Serenity client with intents: {:?}", intents);

        let client = Client::builder(token, intents)
            .event_handler(handler)
            .await
            .map_err(|e| {
                GatewayError::new(GatewayErrorKind::Api(format!(
                    "Failed to build client: {}",
                    e
                )))
            })?;

        info!("Serenity client built successfully");
        Ok(Self { client, engine })
    }

    /// Run until the connection closes.
    ///
    /// # Errors
    /// Returns an error if the client fails to start or hits a fatal error.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> BastionResult<()> {
        info!("Starting Discord bot");
        self.client.start().await.map_err(|e| {
            GatewayError::new(GatewayErrorKind::Api(format!("Client error: {}", e)))
        })?;
        Ok(())
    }

    /// The enforcement engine driving the bot.
    pub fn engine(&self) -> &Arc<EnforcementEngine> {
        &self.engine
    }
}
