use anyhow::Result;
use loyalty_cli::app;

#[tokio::main]
async fn main() -> Result<()> {
    app::run().await
}
