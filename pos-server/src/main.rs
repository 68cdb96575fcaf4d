use pos_server::{Config, Server, ServerState, init_logger_with_file, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. .env, then configuration
    setup_environment();
    let config = Config::from_env();

    // 2. Logging
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    // 3. Printer backend for this platform
    let printer = pos_printer::system_printer();
    tracing::info!(backend = printer.backend_name(), "POS print server starting...");

    let state = ServerState::new(config.clone(), printer);
    let server = Server::new(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
