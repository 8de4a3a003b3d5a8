pub mod api;

use crate::llm::ChatClient;
use log::info;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

pub struct Server {
    port: u16,
    relay: Arc<dyn ChatClient>,
}

impl Server {
    pub fn new(port: u16, relay: Arc<dyn ChatClient>) -> Self {
        Self { port, relay }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = format!("0.0.0.0:{}", self.port).parse::<SocketAddr>()?;
        let app = api::router(self.relay.clone());

        info!("Saga backend running on http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app.into_make_service()).await?;

        Ok(())
    }
}
