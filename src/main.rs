use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hyper::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use typemux::config::Config;
use typemux::server::{self, ListenerOptions, ServeSettings};
use typemux::{logger, raw, ByMethod, ConfigError, Json, ServeMux, StatusError};

typemux::request_param! {
    /// Who to greet, from the `:name` capture or `?name=`
    struct Name(String) = "name";
    /// Amount to add to the counter
    struct Step(u64) = "step";
}

#[derive(Serialize)]
struct Count {
    value: u64,
}

#[derive(Deserialize, Serialize)]
struct Echo {
    message: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = ListenerOptions::from_config(&cfg).bind(addr)?;

    let mux = demo_mux()?;
    for route in mux.routes() {
        logger::log_route(&route.method, &route.pattern);
    }
    logger::log_server_start(&addr, &cfg, mux.routes().len());

    server::serve(listener, Arc::new(mux), ServeSettings::from_config(&cfg)).await;
    Ok(())
}

fn demo_mux() -> Result<ServeMux, ConfigError> {
    let counter = Arc::new(AtomicU64::new(0));
    let read = Arc::clone(&counter);
    let bump = counter;

    let mut mux = ServeMux::new();
    mux.handle(
        "/counter",
        ByMethod::new()
            .get(move || Json(Count {
                value: read.load(Ordering::Relaxed),
            }))
            .post(move |step: Option<Step>| {
                let step = step.map_or(1, |s| s.0);
                bump.fetch_add(step, Ordering::Relaxed);
                StatusCode::NO_CONTENT
            }),
    )?
    .handle("/hello/:name", |name: Name| format!("hello, {}\n", name.0))?
    .handle_method(Method::POST, "/echo", |body: Json<Echo>| body)?
    .handle("/teapot", || -> Result<(), StatusError> {
        Err(typemux::status_error!(418, "short and stout"))
    })?
    .handle(
        "/health",
        raw(|_req: &typemux::Request, res: &mut typemux::Response| res.write(b"ok\n")),
    )?;
    Ok(mux)
}
