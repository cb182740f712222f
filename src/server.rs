use crate::classifier::{Lookup, RemoteClassifier};
use crate::config::Config;
use crate::document;
use crate::parser::{self, ParseError};
use crate::session::{decompile, CompileError, Session};
use hyper::body::HttpBody;
use hyper::service::{make_service_fn, service_fn};
use hyper::{header, Body, Method, Request, Response, Server, StatusCode};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;

/// Largest request body read; anything longer answers 413.
pub const MAX_BODY: usize = 64 * 1024;

/// Serves a single user. Every connection shares one editing session, so a
/// compile overtaken by a newer one, from any client, answers 409.
pub async fn serve(config: Config) -> anyhow::Result<()> {
	let session = Arc::new(Session::new(RemoteClassifier::new(&config)?));
	let make = make_service_fn(move |_| {
		let session = Arc::clone(&session);
		async move { Ok::<_, Infallible>(service_fn(move |request| handle(Arc::clone(&session), request))) }
	});
	let server = Server::try_bind(&config.addr)?.serve(make);
	log::info!("listening on http://{}", server.local_addr());
	server
		.with_graceful_shutdown(async {
			let _ = tokio::signal::ctrl_c().await;
			log::info!("shutting down");
		})
		.await?;
	Ok(())
}

pub async fn handle<L: Lookup>(session: Arc<Session<L>>, request: Request<Body>) -> Result<Response<Body>, Infallible> {
	let (method, path) = (request.method().clone(), request.uri().path().to_string());
	let body = match read_body(request.into_body()).await {
		Ok(Some(body)) => body,
		Ok(None) => {
			let message = format!("request body exceeds {} bytes", MAX_BODY);
			return Ok(reply(StatusCode::PAYLOAD_TOO_LARGE, json!({ "message": message })));
		}
		Err(err) => return Ok(reply(StatusCode::BAD_REQUEST, json!({ "message": err.to_string() }))),
	};
	let response = match (method, path.as_str()) {
		(Method::POST, "/validate") => match parser::validate(&body) {
			Ok(()) => empty(StatusCode::NO_CONTENT),
			Err(err) => syntax_error(&err),
		},
		(Method::POST, "/compile") => match session.compile(&body).await {
			Ok(expression) => match document::to_document(&expression) {
				Ok(document) => reply(StatusCode::OK, document),
				Err(err) => {
					log::error!("failed to write document: {}", err);
					reply(StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": err.to_string() }))
				}
			},
			Err(CompileError::Syntax(err @ ParseError::ClassifierUnavailable(_))) => {
				reply(StatusCode::BAD_GATEWAY, json!({ "message": err.to_string() }))
			}
			Err(CompileError::Syntax(err)) => syntax_error(&err),
			Err(CompileError::Stale) => reply(StatusCode::CONFLICT, json!({ "message": CompileError::Stale.to_string() })),
		},
		(Method::POST, "/tokens") => match decompile(&body) {
			Ok((kinds, texts)) => {
				let kinds: Vec<String> = kinds.iter().map(|kind| format!("{:?}", kind).to_uppercase()).collect();
				reply(StatusCode::OK, json!({ "kinds": kinds, "texts": texts }))
			}
			Err(err) => reply(StatusCode::UNPROCESSABLE_ENTITY, json!({ "message": err.to_string() })),
		},
		(method, path) => {
			log::debug!("no route for {} {}", method, path);
			empty(StatusCode::NOT_FOUND)
		}
	};
	Ok(response)
}

/// Reads the whole body, or `None` once it grows past [`MAX_BODY`].
async fn read_body(mut body: Body) -> Result<Option<String>, hyper::Error> {
	let mut bytes = Vec::new();
	while let Some(chunk) = body.data().await {
		let chunk = chunk?;
		if bytes.len() + chunk.len() > MAX_BODY {
			return Ok(None);
		}
		bytes.extend_from_slice(&chunk);
	}
	Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

fn syntax_error(err: &ParseError) -> Response<Body> {
	reply(
		StatusCode::UNPROCESSABLE_ENTITY,
		json!({ "message": err.to_string(), "index": err.index() }),
	)
}

fn reply(status: StatusCode, value: serde_json::Value) -> Response<Body> {
	let mut response = Response::new(Body::from(value.to_string()));
	*response.status_mut() = status;
	response
		.headers_mut()
		.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));
	response
}

fn empty(status: StatusCode) -> Response<Body> {
	let mut response = Response::new(Body::empty());
	*response.status_mut() = status;
	response
}
