use clap::Parser;
use garc::cli::Config;
use std::process;

#[tokio::main]
async fn main() {
    let config = Config::parse();
    process::exit(garc::cli::run(config).await)
}
