use anyhow::Context;
use std::env;
use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
	pub addr: SocketAddr,
	pub classifier_url: String,
	pub retina: String,
	pub api_key: Option<String>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			addr: ([127, 0, 0, 1], 3000).into(),
			classifier_url: "http://api.cortical.io/rest".to_string(),
			retina: "en_associative".to_string(),
			api_key: None,
		}
	}
}

impl Config {
	pub fn from_env() -> anyhow::Result<Self> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
		let mut config = Self::default();
		if let Some(addr) = var("FPEXPR_ADDR") {
			config.addr = addr
				.parse()
				.with_context(|| format!("FPEXPR_ADDR is not a socket address: {:?}", addr))?;
		}
		if let Some(url) = var("FPEXPR_CLASSIFIER_URL") {
			config.classifier_url = url;
		}
		if let Some(retina) = var("FPEXPR_RETINA") {
			config.retina = retina;
		}
		config.api_key = var("FPEXPR_API_KEY").filter(|key| !key.is_empty());
		Ok(config)
	}
}
