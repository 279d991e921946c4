// Connection handling module
// Serves one TCP connection: collects each request body, dispatches it
// through the mux and writes the buffered response back

use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::StatusCode;
use hyper_util::rt::TokioIo;

use crate::binding::{Request, Response};
use crate::config::Config;
use crate::handler::ServeMux;
use crate::logger;

/// Per-connection limits and switches, taken from [`Config`]
#[derive(Debug, Clone)]
pub struct ServeSettings {
    pub max_body_size: u64,
    pub access_log: bool,
    pub keep_alive: bool,
    /// Upper bound on the lifetime of one connection
    pub timeout: Duration,
}

impl Default for ServeSettings {
    fn default() -> Self {
        Self {
            max_body_size: 10_485_760,
            access_log: true,
            keep_alive: true,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ServeSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_body_size: config.http.max_body_size,
            access_log: config.logging.access_log,
            keep_alive: config.performance.keep_alive,
            timeout: config.connection_timeout(),
        }
    }
}

/// Serve a single connection in a spawned task
pub(crate) fn handle_connection(
    stream: tokio::net::TcpStream,
    mux: Arc<ServeMux>,
    settings: Arc<ServeSettings>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let timeout_duration = settings.timeout;

        let mut builder = http1::Builder::new();
        builder.keep_alive(settings.keep_alive);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let mux = Arc::clone(&mux);
                let settings = Arc::clone(&settings);
                async move { handle_request(req, &mux, &settings).await }
            }),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection timeout after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }
    });
}

/// Turn one hyper request into a mux request and back
pub async fn handle_request(
    req: hyper::Request<Incoming>,
    mux: &ServeMux,
    settings: &ServeSettings,
) -> Result<hyper::Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = match check_body_size(&req, settings.max_body_size) {
        Some(rejected) => rejected,
        None => {
            let (parts, body) = req.into_parts();
            match read_body(body, settings.max_body_size).await {
                Ok(bytes) => mux.serve(Request::from_parts(parts, bytes)),
                Err(rejected) => rejected,
            }
        }
    };

    if settings.access_log {
        logger::log_access(
            &method,
            &path,
            response.status(),
            response.body().len(),
            started.elapsed().as_micros(),
        );
    }
    Ok(response.into_hyper())
}

/// Validate Content-Length up front so oversized bodies are never read
fn check_body_size(req: &hyper::Request<Incoming>, max_body_size: u64) -> Option<Response> {
    let content_length = req.headers().get(hyper::header::CONTENT_LENGTH)?;
    let size = content_length.to_str().ok()?.parse::<u64>().ok()?;
    if size > max_body_size {
        logger::log_warning(&format!(
            "Request body too large: {size} bytes (max: {max_body_size})"
        ));
        return Some(Response::payload_too_large());
    }
    None
}

/// Collect the body, enforcing the limit on chunked uploads too
async fn read_body(body: Incoming, max_body_size: u64) -> Result<Bytes, Response> {
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!(
                "Request body exceeded {max_body_size} bytes while reading"
            ));
            Err(Response::payload_too_large())
        }
        Err(err) => {
            logger::log_warning(&format!("Failed to read request body: {err}"));
            Err(Response::text(
                StatusCode::BAD_REQUEST,
                "failed to read request body",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Json;
    use crate::handler::ByMethod;
    use crate::server::{create_reusable_listener, serve};
    use hyper::Method;
    use hyper_util::client::legacy::Client;
    use hyper_util::rt::TokioExecutor;
    use serde::{Deserialize, Serialize};
    use std::net::SocketAddr;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Greeting {
        name: String,
    }

    crate::request_param! {
        struct Name(String) = "name";
    }

    async fn start(settings: ServeSettings) -> SocketAddr {
        let mut mux = ServeMux::new();
        mux.handle("/hello", |name: Name| Json(Greeting { name: name.0 }))
            .unwrap()
            .handle(
                "/greet/:name",
                ByMethod::new().post(|name: Name, body: Json<Greeting>| {
                    format!("{} greets {}", body.name, name.0)
                }),
            )
            .unwrap();

        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, Arc::new(mux), settings));
        addr
    }

    async fn send(
        method: Method,
        url: String,
        body: &'static str,
    ) -> (StatusCode, String) {
        let client = Client::builder(TokioExecutor::new()).build_http::<Full<Bytes>>();
        let req = hyper::Request::builder()
            .method(method)
            .uri(url)
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap();
        let res = client.request(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_end_to_end_over_tcp() {
        let settings = ServeSettings {
            max_body_size: 64,
            access_log: false,
            ..ServeSettings::default()
        };
        let addr = start(settings).await;

        let (status, body) = send(Method::GET, format!("http://{addr}/hello?name=ada"), "").await;
        assert_eq!(status, StatusCode::OK);
        let greeting: Greeting = serde_json::from_str(&body).unwrap();
        assert_eq!(greeting.name, "ada");

        let (status, body) = send(
            Method::POST,
            format!("http://{addr}/greet/bob"),
            r#"{"name":"ada"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ada greets bob");

        let (status, _) = send(Method::GET, format!("http://{addr}/greet/bob"), "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, body) = send(Method::GET, format!("http://{addr}/nowhere"), "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "404 page not found");

        let (status, _) = send(Method::GET, format!("http://{addr}/hello"), "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let settings = ServeSettings {
            max_body_size: 8,
            access_log: false,
            ..ServeSettings::default()
        };
        let addr = start(settings).await;

        let (status, _) = send(
            Method::POST,
            format!("http://{addr}/greet/bob"),
            r#"{"name":"a much longer name"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_settings_from_config() {
        let cfg = Config::load_from("definitely-not-a-config-file").unwrap();
        let settings = ServeSettings::from_config(&cfg);
        assert_eq!(settings.max_body_size, cfg.http.max_body_size);
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }
}
