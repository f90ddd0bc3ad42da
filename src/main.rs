#[tokio::main]
async fn main() {
    let config = match relic::config::Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("relic: {}", err);
            std::process::exit(1);
        }
    };
    if let Err(err) = relic::mcp::server::run_stdio(config).await {
        eprintln!("relic: {}", err);
        std::process::exit(1);
    }
}
