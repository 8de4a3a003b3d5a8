pub mod cli;
pub mod client;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod server;

use cli::ServerArgs;
use llm::{ new_client, LlmConfig };
use log::info;
use server::Server;
use std::error::Error;
use std::time::Duration;

pub async fn run(args: ServerArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Port: {}", args.port);
    info!("Chat Model: {}", args.chat_model);
    info!("Chat Base URL: {}", args.chat_base_url);
    info!("Provider Credential Present: {}", args.openai_api_key.is_some());
    info!("Request Timeout: {}s", args.request_timeout_secs);
    info!("-------------------------");

    let config = LlmConfig {
        api_key: args.openai_api_key.clone().filter(|key| !key.is_empty()),
        completion_model: args.chat_model.clone(),
        base_url: args.chat_base_url.clone(),
        request_timeout: Duration::from_secs(args.request_timeout_secs),
    };

    let relay = new_client(&config)?;
    let server = Server::new(args.port, relay);
    server.run().await?;

    Ok(())
}
