use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};

/// 访问日志：每个请求输出一行 method、path、状态码与耗时，不修改响应
pub async fn log_requests(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = next.run(req).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();
    tracing::info!(
        target: "access",
        %method,
        %path,
        status,
        latency_ms = latency.as_secs_f64() * 1000.0,
        "{} {} -> {} ({:?})",
        method,
        path,
        status,
        latency
    );

    response
}
