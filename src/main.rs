use taskboard::app;

#[tokio::main]
async fn main() {
    if let Err(error) = app::run().await {
        eprintln!("fatal: {error}");
        std::process::exit(1);
    }
}
