use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    zoomer_cli::main_entry().await
}
