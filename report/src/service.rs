//! Front door: the landing page and the endpoint that triggers a report run.

use crate::errors::{PublishError, ReportError};
use crate::pipeline::Pipeline;
use http::header::{CONTENT_TYPE, HeaderValue};
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;
use shared::http::{full_body, make_boxed_error_response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type ReportBody = BoxBody<Bytes, ReportError>;

pub const REPORT_PATH: &str = "/report/upcoming-race";

const LANDING_PAGE: &str = include_str!("../static/home.html");

#[derive(Serialize)]
struct UploadedResponse<'a> {
    message: &'a str,
    filebin_url: &'a str,
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
    status: u16,
    details: String,
}

pub struct ReportService {
    pipeline: Arc<Pipeline>,
}

impl ReportService {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        ReportService { pipeline }
    }
}

impl Service<Request<Incoming>> for ReportService {
    type Response = Response<ReportBody>;
    type Error = ReportError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let pipeline = self.pipeline.clone();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        Box::pin(async move { Ok(handle(pipeline, &method, &path).await) })
    }
}

async fn handle(pipeline: Arc<Pipeline>, method: &Method, path: &str) -> Response<ReportBody> {
    match (method, path) {
        (&Method::GET, "/") => html_response(LANDING_PAGE),
        (&Method::POST, REPORT_PATH) => {
            // Detached so a client disconnect does not abandon the run mid-upload.
            let run = tokio::spawn(async move { pipeline.run().await });
            match run.await {
                Ok(Ok(published)) => json_response(
                    StatusCode::OK,
                    &UploadedResponse {
                        message: "Report uploaded successfully",
                        filebin_url: published.url.as_str(),
                    },
                ),
                Ok(Err(e)) => error_response(&e),
                Err(e) => {
                    tracing::error!(error = %e, "Report run task failed");
                    make_boxed_error_response(StatusCode::INTERNAL_SERVER_ERROR)
                }
            }
        }
        (_, "/") | (_, REPORT_PATH) => make_boxed_error_response(StatusCode::METHOD_NOT_ALLOWED),
        _ => make_boxed_error_response(StatusCode::NOT_FOUND),
    }
}

fn error_response(error: &ReportError) -> Response<ReportBody> {
    tracing::error!(error = %error, kind = error.kind(), "Report run failed");

    let status = error.http_status();
    let body = match error {
        // The upload's own status and body are what the caller needs to see.
        ReportError::Publish(PublishError::Exhausted {
            status: upload_status,
            body,
            ..
        }) => ErrorResponse {
            error: error.summary(),
            status: upload_status.as_u16(),
            details: body.clone(),
        },
        _ => ErrorResponse {
            error: error.summary(),
            status: status.as_u16(),
            details: error.to_string(),
        },
    };

    json_response(status, &body)
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<ReportBody> {
    match serde_json::to_vec(value) {
        Ok(bytes) => {
            let mut response = Response::new(full_body(bytes));
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response");
            make_boxed_error_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn html_response(page: &'static str) -> Response<ReportBody> {
    let mut response = Response::new(full_body(page));
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}
