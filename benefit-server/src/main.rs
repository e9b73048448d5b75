use benefit_server::{setup_environment, Config, Server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load .env if present
    dotenv::dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Logging (console + rotating files under the work dir)
    setup_environment(&config)?;

    tracing::info!("Benefit server starting...");

    // 4. Run the HTTP server (state init opens the database and runs
    //    the startup repair pass)
    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {e}");
        return Err(e.into());
    }

    Ok(())
}
