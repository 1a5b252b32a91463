#[tokio::main]
async fn main() -> std::io::Result<()> {
    cardiorisk_lib::run().await
}
