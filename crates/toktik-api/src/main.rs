use toktik_core::Config;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    // Database, storage, services, routes
    let (_state, router) = toktik_api::setup::initialize_app(config.clone()).await?;

    toktik_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
