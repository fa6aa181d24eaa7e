#[tokio::main]
async fn main() -> anyhow::Result<()> {
    litlens_server::start().await
}
