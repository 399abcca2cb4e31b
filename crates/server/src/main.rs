#[tokio::main]
async fn main() -> anyhow::Result<()> {
    autolinker_server::start().await
}
