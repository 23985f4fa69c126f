//! 响应头中间件

use axum::{
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};

/// 静态资源类路径不缓存
const NO_CACHE_EXTENSIONS: &[&str] = &[".ico", ".png", ".svg", ".json"];

/// 添加安全响应头
///
/// - Strict-Transport-Security: 强制 HTTPS
/// - X-Frame-Options / frame-ancestors: 禁止被嵌入
/// - X-Content-Type-Options: 禁止 MIME 嗅探
/// - Referrer-Policy / Permissions-Policy
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::X_XSS_PROTECTION,
        HeaderValue::from_static("1; mode=block"),
    );
    // 纯 JSON API，不加载任何外部资源
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "permissions-policy",
        HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
    );

    response
}

/// 图标与清单类资源禁止缓存
pub async fn cache_control(request: Request, next: Next) -> Response {
    let no_cache = NO_CACHE_EXTENSIONS
        .iter()
        .any(|ext| request.uri().path().ends_with(ext));

    let mut response = next.run(request).await;
    if no_cache {
        let headers = response.headers_mut();
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        );
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    }
    response
}
