use actix_web::{
    error::{JsonPayloadError, QueryPayloadError},
    http::Method,
    web, Error, HttpRequest, HttpResponse,
};

use crate::core::AppError;

/// Map JSON body extraction failures onto the application error shape
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    tracing::debug!(path = %req.path(), error = %err, "Rejected JSON body");
    AppError::validation(format!("Invalid JSON body: {}", err)).into()
}

/// Map query string extraction failures onto the application error shape
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> Error {
    tracing::debug!(path = %req.path(), error = %err, "Rejected query string");
    AppError::validation(format!("Invalid query parameters: {}", err)).into()
}

/// Fallback for methods a resource does not serve
pub async fn method_not_allowed(method: Method) -> Result<HttpResponse, AppError> {
    Err(AppError::MethodNotAllowed(method.to_string()))
}

/// Install the extractor error handlers on a service config
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler));
}
