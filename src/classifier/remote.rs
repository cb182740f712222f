use super::{ClassifierError, Lookup};
use crate::config::Config;
use anyhow::{anyhow, Context};
use futures::future::BoxFuture;
use hyper::client::HttpConnector;
use hyper::{header, Body, Client, Method, Request, StatusCode, Uri};

/// Asks the semantic service how its tokenizer splits a phrase.
pub struct RemoteClassifier {
	client: Client<HttpConnector>,
	endpoint: Uri,
	api_key: Option<String>,
}

impl RemoteClassifier {
	pub fn new(config: &Config) -> anyhow::Result<Self> {
		let endpoint = format!(
			"{}/text/tokenize?retina_name={}",
			config.classifier_url.trim_end_matches('/'),
			config.retina
		);
		Ok(Self {
			client: Client::new(),
			endpoint: endpoint
				.parse()
				.with_context(|| format!("invalid classifier endpoint {:?}", endpoint))?,
			api_key: config.api_key.clone(),
		})
	}

	async fn request(&self, phrase: &str) -> anyhow::Result<usize> {
		let mut builder = Request::builder()
			.method(Method::POST)
			.uri(self.endpoint.clone())
			.header(header::CONTENT_TYPE, "text/plain")
			.header(header::ACCEPT, "application/json");
		if let Some(key) = &self.api_key {
			builder = builder.header("api-key", key.as_str());
		}
		let request = builder.body(Body::from(phrase.to_string()))?;

		let response = self.client.request(request).await?;
		let status = response.status();
		let body = hyper::body::to_bytes(response.into_body()).await?;
		if status != StatusCode::OK {
			return Err(anyhow!(
				"classifier answered {}: {}",
				status,
				String::from_utf8_lossy(&body)
			));
		}
		token_count(&body)
	}
}

/// The service answers with one string per semantic unit.
fn token_count(body: &[u8]) -> anyhow::Result<usize> {
	let units: Vec<String> = serde_json::from_slice(body).context("malformed tokenize response")?;
	Ok(units.len())
}

impl Lookup for RemoteClassifier {
	fn token_count<'a>(&'a self, phrase: &'a str) -> BoxFuture<'a, Result<usize, ClassifierError>> {
		Box::pin(async move {
			self.request(phrase).await.map_err(|err| {
				log::warn!("classifier lookup for {:?} failed: {:#}", phrase, err);
				ClassifierError::from(err)
			})
		})
	}
}
