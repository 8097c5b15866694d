mod app;
mod config;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = config::Args::parse();
    let file = config::AppConfig::load();
    let settings = config::Settings::resolve(&args, &file);
    app::run(settings).await
}
