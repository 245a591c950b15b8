//! RateDesk binary entry point

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ratedesk::run().await
}
