//! HTTP redirect server.
//!
//! `GET /<path>/<name>@<version>/<os>/<arch>[/<variant>]` answers with a
//! permanent redirect to the resolved target. Unknown identifiers are 404,
//! other methods 405, anything else a bare 500.

use anyhow::{Context as _, Result};
use arks_core::{FsQuerier, Querier};
use arks_schema::Request;
use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use warp::http::StatusCode;
use warp::http::header::LOCATION;
use warp::path::FullPath;
use warp::reject::{MethodNotAllowed, Reject};
use warp::{Filter, Rejection, Reply, reply};

/// Shared state handed to every request.
#[derive(Clone)]
pub struct Context {
    querier: Arc<dyn Querier + Send + Sync>,
    redirect_prefix: Arc<str>,
}

impl Context {
    pub fn new(querier: Arc<dyn Querier + Send + Sync>, redirect_prefix: &str) -> Self {
        Self {
            querier,
            redirect_prefix: redirect_prefix.into(),
        }
    }

    fn filter(self) -> impl Filter<Extract = (Context,), Error = Infallible> + Clone {
        warp::any().map(move || self.clone())
    }

    /// Where to send the client for `target`.
    fn location(&self, target: &str) -> String {
        if target.contains("://") {
            target.to_string()
        } else {
            format!("{}{}", self.redirect_prefix, target.trim_start_matches('/'))
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("redirect_prefix", &self.redirect_prefix)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct InternalError;

impl Reject for InternalError {}

pub fn routes(context: Context) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    warp::get()
        .and(warp::path::full())
        .and(context.filter())
        .and_then(handle_redirect)
        .recover(handle_rejection)
        .with(warp::trace::trace(|info| {
            tracing::debug_span!("request", method = %info.method(), path = %info.path())
        }))
}

async fn handle_redirect(path: FullPath, context: Context) -> Result<impl Reply, Rejection> {
    let request = match Request::parse(path.as_str()) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "bad identifier");
            return Err(warp::reject::not_found());
        }
    };

    let querier = context.querier.clone();
    let result = tokio::task::spawn_blocking(move || querier.query(&request)).await;

    match result {
        Ok(Ok(item)) => {
            let location = context.location(&item.target);
            tracing::debug!(%location, "redirect");
            Ok(reply::with_header(
                reply::with_status(reply(), StatusCode::PERMANENT_REDIRECT),
                LOCATION,
                location,
            ))
        }
        Ok(Err(e)) if e.is_not_found() => {
            tracing::debug!(error = %e, "not found");
            Err(warp::reject::not_found())
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "query failed");
            Err(warp::reject::custom(InternalError))
        }
        Err(e) => {
            tracing::error!(error = %e, "query task failed");
            Err(warp::reject::custom(InternalError))
        }
    }
}

async fn handle_rejection(err: Rejection) -> std::result::Result<impl Reply, Infallible> {
    let (code, body) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found")
    } else if err.find::<MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    };
    Ok(reply::with_status(body, code))
}

/// Serve redirects for the port tree at `port` until `cancel` fires.
pub async fn serve(port: PathBuf, addr: SocketAddr, redirect_prefix: String, cancel: CancellationToken) -> Result<()> {
    let context = Context::new(Arc::new(FsQuerier::new(port)), &redirect_prefix);
    let (bound, server) = warp::serve(routes(context))
        .try_bind_with_graceful_shutdown(addr, async move { cancel.cancelled().await })
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(%bound, "listening");
    eprintln!("listening on http://{bound}");
    server.await;
    Ok(())
}
