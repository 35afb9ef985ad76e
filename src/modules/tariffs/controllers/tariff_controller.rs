use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::core::error::AppError;
use crate::middleware::{method_not_allowed, RequestContext};
use crate::modules::tariffs::models::{NewTariff, TariffPatch};
use crate::modules::tariffs::services::{DiscountResolver, TariffService};

/// `?id=` for DELETE /tariffs
#[derive(Debug, Deserialize)]
pub struct TariffIdQuery {
    pub id: Option<i64>,
}

/// `{idtarifa}` body for DELETE /tariffs
#[derive(Debug, Deserialize)]
pub struct TariffIdBody {
    pub idtarifa: i64,
}

#[derive(Debug, Deserialize)]
pub struct DiscountQuery {
    pub fecha: Option<NaiveDate>,
}

/// List all tariffs
/// GET /tariffs
pub async fn list_tariffs(service: web::Data<TariffService>) -> Result<HttpResponse, AppError> {
    let tariffs = service.list_tariffs().await?;
    Ok(HttpResponse::Ok().json(tariffs))
}

/// Create a tariff
/// POST /tariffs
pub async fn create_tariff(
    service: web::Data<TariffService>,
    ctx: RequestContext,
    request: web::Json<NewTariff>,
) -> Result<HttpResponse, AppError> {
    let tariff = service.create_tariff(request.into_inner()).await?;

    tracing::info!(
        tariff_id = tariff.id,
        user_id = ?ctx.user_id,
        request_id = ?ctx.request_id,
        "Tariff created via API"
    );

    Ok(HttpResponse::Created().json(tariff))
}

/// Partial update, or a status toggle when only `activa` is sent
/// PUT /tariffs
pub async fn update_tariff(
    service: web::Data<TariffService>,
    ctx: RequestContext,
    request: web::Json<TariffPatch>,
) -> Result<HttpResponse, AppError> {
    let tariff = service.update_tariff(request.into_inner()).await?;

    tracing::info!(tariff_id = tariff.id, user_id = ?ctx.user_id, "Tariff updated via API");

    Ok(HttpResponse::Ok().json(tariff))
}

/// Delete by `?id=` or by `{idtarifa}` body
/// DELETE /tariffs
pub async fn delete_tariff(
    service: web::Data<TariffService>,
    ctx: RequestContext,
    query: web::Query<TariffIdQuery>,
    body: Option<web::Json<TariffIdBody>>,
) -> Result<HttpResponse, AppError> {
    let id = query
        .id
        .or_else(|| body.map(|b| b.idtarifa))
        .ok_or_else(|| AppError::validation("Tariff id is required"))?;

    let deleted = service.delete_tariff(id).await?;

    tracing::info!(tariff_id = id, user_id = ?ctx.user_id, "Tariff deleted via API");

    Ok(HttpResponse::Ok().json(deleted))
}

/// Discount in force on `fecha`, or today when omitted
/// GET /tariffs/discount
pub async fn resolve_discount(
    resolver: web::Data<DiscountResolver>,
    query: web::Query<DiscountQuery>,
) -> Result<HttpResponse, AppError> {
    let date = query.fecha.unwrap_or_else(|| resolver.today());
    let discount = resolver.resolve_discount(date).await?;

    Ok(HttpResponse::Ok().json(discount))
}

/// Configure tariff routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/tariffs/discount")
            .route(web::get().to(resolve_discount))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/tariffs")
            .route(web::get().to(list_tariffs))
            .route(web::post().to(create_tariff))
            .route(web::put().to(update_tariff))
            .route(web::delete().to(delete_tariff))
            .default_service(web::to(method_not_allowed)),
    );
}
