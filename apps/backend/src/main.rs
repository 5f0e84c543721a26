#[tokio::main]
async fn main() -> anyhow::Result<()> {
    linguaflow_backend::run().await
}
