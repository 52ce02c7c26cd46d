#[tokio::main]
async fn main() {
    if let Err(e) = reward_correlator::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
