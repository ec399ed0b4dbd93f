#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = procode_rust::run().await {
        eprintln!("procode-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
