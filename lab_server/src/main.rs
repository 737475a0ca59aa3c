#[tokio::main]
async fn main() -> std::io::Result<()> {
    lab_server::run_with_config().await
}
