use anyhow::Result;
use appgw_core::{ApplicationMetadataResolver, CacheConfig, KubeApplicationStore};
use appgw_http::{json_response, ErrorHandler};
use http_body_util::Full;
use hyper::{body::Bytes, server::conn::http1, service::service_fn, Method, Request, Response, StatusCode};
use hyper_util::rt::tokio::TokioIo;
use kube::Client;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::init as tracing_init;

mod routes;

use routes::{parse_path, Lookup};

/// Environment variable holding the listen address
const LISTEN_ADDR_ENV: &str = "APP_GATEWAY_LISTEN_ADDR";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    info!("Starting metadata-gateway...");

    let client = Client::try_default().await?;
    let store = Arc::new(KubeApplicationStore::new(client));
    let resolver = Arc::new(ApplicationMetadataResolver::new(store, CacheConfig::from_env()));
    info!("Application metadata resolver initialized");

    let addr = listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);

    tokio::select! {
        result = serve(listener, resolver) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received, exiting..."),
    }

    Ok(())
}

fn listen_addr() -> SocketAddr {
    let default: SocketAddr = ([0, 0, 0, 0], 8080).into();
    match std::env::var(LISTEN_ADDR_ENV) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {} '{}': {}, using {}", LISTEN_ADDR_ENV, raw, e, default);
            default
        }),
        Err(_) => default,
    }
}

async fn serve(listener: TcpListener, resolver: Arc<ApplicationMetadataResolver>) -> Result<()> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let resolver = resolver.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let resolver = resolver.clone();
                handle_request(req, resolver)
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!("Error serving HTTP connection from {}: {}", peer_addr, e);
            }
        });
    }
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    resolver: Arc<ApplicationMetadataResolver>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = req.uri().path().to_string();
    debug!("{} {}", req.method(), path);

    if path == "/healthz" {
        let mut response = Response::new(Full::new(Bytes::from("OK\n")));
        *response.status_mut() = StatusCode::OK;
        return Ok(response);
    }

    if req.method() != Method::GET {
        return Ok(ErrorHandler::new(StatusCode::METHOD_NOT_ALLOWED, "only GET is supported").response());
    }

    let Some(lookup) = parse_path(&path) else {
        let message = format!("path {} does not name an application service", path);
        return Ok(ErrorHandler::new(StatusCode::NOT_FOUND, message).response());
    };

    let result = match lookup {
        Lookup::ByService { app, service } => resolver.resolve_by_service(app, service).await,
        Lookup::ByEntry { app, service, entry } => {
            resolver.resolve_by_entry(app, service, entry).await
        }
    };

    Ok(match result {
        Ok(descriptor) => json_response(StatusCode::OK, &descriptor),
        Err(e) => ErrorHandler::from(&e).response(),
    })
}
