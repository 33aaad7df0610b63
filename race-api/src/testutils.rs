use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

#[derive(Clone)]
pub struct TestRoute {
    path: &'static str,
    status: u16,
    body: String,
    delay: Duration,
}

impl TestRoute {
    pub fn new(path: &'static str, status: u16, body: &str) -> Self {
        TestRoute {
            path,
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn ok(path: &'static str, body: &str) -> Self {
        Self::new(path, 200, body)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Serves canned JSON bodies by path on an ephemeral local port.
pub struct TestRaceApiServer {
    pub base_url: Url,
    handle: JoinHandle<()>,
}

impl TestRaceApiServer {
    pub async fn spawn(routes: Vec<TestRoute>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let port = listener.local_addr().unwrap().port();

        let routes: Arc<HashMap<&'static str, TestRoute>> =
            Arc::new(routes.into_iter().map(|r| (r.path, r)).collect());

        let handle = tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let io = TokioIo::new(stream);
                let routes = routes.clone();

                tokio::spawn(async move {
                    let svc = service_fn(move |req: Request<Incoming>| {
                        let route = routes.get(req.uri().path()).cloned();
                        async move { Ok::<_, Infallible>(respond(route).await) }
                    });
                    let _ = Builder::new(TokioExecutor::new())
                        .serve_connection(io, svc)
                        .await;
                });
            }
        });

        TestRaceApiServer {
            base_url: Url::parse(&format!("http://127.0.0.1:{port}/api/")).unwrap(),
            handle,
        }
    }
}

async fn respond(route: Option<TestRoute>) -> Response<Full<Bytes>> {
    match route {
        Some(route) => {
            tokio::time::sleep(route.delay).await;
            Response::builder()
                .status(route.status)
                .header("content-type", "application/json")
                .body(Full::new(Bytes::from(route.body)))
                .unwrap()
        }
        None => Response::builder()
            .status(404)
            .body(Full::new(Bytes::from_static(b"not found")))
            .unwrap(),
    }
}

impl Drop for TestRaceApiServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
