use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::core::error::AppError;
use crate::middleware::method_not_allowed;
use crate::modules::rentals::services::RentalPriceResolver;

/// Query parameters for a price lookup
#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    pub idcliente: i64,
    pub idproducto: i64,
    /// Defaults to today
    pub fecha: Option<NaiveDate>,
}

/// List rentals
/// GET /rentals
pub async fn list_rentals(
    resolver: web::Data<RentalPriceResolver>,
) -> Result<HttpResponse, AppError> {
    let rentals = resolver.list_rentals().await?;
    Ok(HttpResponse::Ok().json(rentals))
}

/// Unit price for a client and product
/// GET /rentals/price
pub async fn resolve_price(
    resolver: web::Data<RentalPriceResolver>,
    query: web::Query<PriceQuery>,
) -> Result<HttpResponse, AppError> {
    let date = query.fecha.unwrap_or_else(|| resolver.today());
    let resolution = resolver
        .resolve_today_price(query.idcliente, query.idproducto, date)
        .await?;

    Ok(HttpResponse::Ok().json(resolution))
}

/// Configure rental routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/rentals/price")
            .route(web::get().to(resolve_price))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/rentals")
            .route(web::get().to(list_rentals))
            .default_service(web::to(method_not_allowed)),
    );
}
