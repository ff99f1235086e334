#[tokio::main]
async fn main() -> anyhow::Result<()> {
    reelcrawl::cli::run().await
}
