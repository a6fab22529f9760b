#[tokio::main]
async fn main() {
    if let Err(e) = peakflow_lib::run().await {
        tracing::error!("{e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}
