use fpexpr::config::Config;
use fpexpr::server;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let config = Config::from_env()?;
	log::debug!("classifier at {} using {}", config.classifier_url, config.retina);
	server::serve(config).await
}
