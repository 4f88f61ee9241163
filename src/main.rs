//! Demo host: queues the sample collaborators, starts them and handles one message.

use resource_lifecycle::collaborators::{self, chat_bot::ChatBot};
use resource_lifecycle::config::ConfigLoader;
use resource_lifecycle::lifecycle::{setup_tracing, ResourceSystem};
use tracing::{error, info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = ConfigLoader::new().load().map_err(|e| e.to_string())?;
    info!(?config, "Starting resource system");

    let system = ResourceSystem::new(&config);
    collaborators::register_all(&system.manager, &config);

    if let Some(report) = system.start().await {
        info!(
            resources = report.resources,
            elapsed_ms = report.elapsed_ms(),
            clean = report.is_clean(),
            "Startup finished"
        );
    }

    let span = tracing::info_span!("message_handling");
    async {
        match system
            .manager
            .get_default::<ChatBot>(collaborators::chat_bot::NAME)
            .await
        {
            Some(bot) => match bot.handle_message(1001, 42, "hello").await {
                Some(reply) => info!(%reply, "Replied"),
                None => warn!("No reply"),
            },
            None => error!("Chat bot not ready"),
        }
    }
    .instrument(span)
    .await;

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
