use clap::Parser;
use dotenv::dotenv;
use saga_relay::cli::ServerArgs;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = ServerArgs::parse();

    saga_relay::run(args).await
}
