use anyhow::Context;
use axum::http::{header, request::Parts};
use axum::routing::get;
use simplemvc::prelude::*;

mod controllers;
mod services;

use controllers::{AccountController, HomeController};
use services::{DisplayNames, VisitCounter};

/// Reads the login from a `user=<name>` cookie.
fn cookie_login(parts: &Parts, scheme: &str) -> Option<Identity> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| pair.trim().strip_prefix("user="))
        .filter(|login| !login.is_empty())
        .map(|login| Identity::new(login, scheme))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let options = MvcOptions::from_env().context("invalid SIMPLEMVC_* configuration")?;

    let container = ContainerBuilder::new()
        .register(VisitCounter::default())
        .register(DisplayNames::default())
        .build();

    let app = MvcApplication::builder()
        .options(options)
        .container(container)
        .controller::<HomeController>()
        .controller::<AccountController>()
        .authenticator(cookie_login)
        .build()
        .context("failed to build MVC application")?;

    // Anything the controllers do not claim ends up here.
    let fallback = Router::new()
        .route("/health", get(|| async { "ok" }))
        .fallback(|| async { (StatusCode::NOT_FOUND, "Not Found") });

    let service = MvcLayer::new(app).layer(fallback);

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "12345".to_string());
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("sample server listening on http://{addr}");

    axum::serve(listener, service.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
