//! Inkfeed entry point.
//!
//! Connects to the database and applies pending migrations. Given an item ID
//! (and optionally a viewer ID) it also loads that item's card and prints its
//! engagement view as JSON:
//!
//! ```text
//! inkfeed [ITEM_ID [VIEWER_ID]]
//! ```

use std::sync::Arc;

use inkfeed_common::Config;
use inkfeed_core::{ChannelListener, ContentCard, DatabaseGateway, Notice};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkfeed=debug".into()),
        )
        .init();

    info!("Starting inkfeed...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = inkfeed_db::init(&config).await?;
    info!("Connected to database");

    inkfeed_db::migrate(&db).await?;
    info!("Migrations applied");

    let mut args = std::env::args().skip(1);
    let Some(item_id) = args.next() else {
        return Ok(());
    };
    let viewer_id = args.next();

    let gateway = DatabaseGateway::new(Arc::new(db));
    let item = gateway.load_item(&item_id).await?;

    let (listener, mut notices) = ChannelListener::new();
    let reporter = tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            match notice {
                Notice::Settled(event) => info!(?event, "Mutation settled"),
                Notice::Failed(error) => warn!(code = error.error_code(), %error, "Engagement error"),
            }
        }
    });

    let card = ContentCard::load(
        item,
        viewer_id,
        &gateway.into_gateway(),
        Arc::new(listener),
        config.engagement,
    )
    .await;

    println!("{}", serde_json::to_string_pretty(&card.view().await)?);

    // Dropping the card closes the notice channel.
    drop(card);
    reporter.await?;

    Ok(())
}
