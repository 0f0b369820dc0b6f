use faucet_agent::app;

#[tokio::main]
async fn main() {
    std::process::exit(app::main().await);
}
