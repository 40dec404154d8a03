use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tubemp3_lib::run(tubemp3_lib::cli::Cli::parse()).await
}
