use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::middleware::{method_not_allowed, RequestContext};
use crate::modules::invoices::models::{
    CreateInvoiceRequest, InvoiceChanges, InvoiceFilter, PreviewRequest,
};
use crate::modules::invoices::services::{InvoiceService, LineBuilder};

/// Query parameters for GET /invoices
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceQuery {
    /// Fetch one invoice instead of listing
    #[serde(rename = "idfactura")]
    pub invoice_id: Option<i64>,

    #[serde(default)]
    pub include_details: bool,

    #[serde(default)]
    pub with_discount: bool,

    #[serde(rename = "idestado")]
    pub status_id: Option<i64>,

    #[serde(rename = "idcliente")]
    pub client_id: Option<i64>,

    /// Substring of the invoice number
    pub q: Option<String>,
}

impl InvoiceQuery {
    fn filter(&self) -> InvoiceFilter {
        InvoiceFilter {
            status_id: self.status_id,
            client_id: self.client_id,
            number_contains: self.q.clone(),
        }
    }
}

/// `?idfactura=` for DELETE /invoices
#[derive(Debug, Deserialize)]
pub struct InvoiceIdQuery {
    pub idfactura: Option<i64>,
}

/// `{idfactura}` body for DELETE /invoices
#[derive(Debug, Deserialize)]
pub struct InvoiceIdBody {
    pub idfactura: i64,
}

/// Create an invoice with its details
/// POST /invoices
pub async fn create_invoice(
    service: web::Data<InvoiceService>,
    ctx: RequestContext,
    request: web::Json<CreateInvoiceRequest>,
) -> Result<HttpResponse, AppError> {
    let created = service.create_invoice(request.into_inner()).await?;

    tracing::info!(
        invoice_id = created.invoice.id,
        user_id = ?ctx.user_id,
        request_id = ?ctx.request_id,
        "Invoice created via API"
    );

    Ok(HttpResponse::Created().json(created))
}

/// One invoice by `idfactura`, or the filtered list
/// GET /invoices
pub async fn get_invoices(
    service: web::Data<InvoiceService>,
    query: web::Query<InvoiceQuery>,
) -> Result<HttpResponse, AppError> {
    if let Some(id) = query.invoice_id {
        let mut view = service.get_invoice(id, query.include_details).await?;
        if query.with_discount {
            view = service.render_with_discount(view).await?;
        }
        return Ok(HttpResponse::Ok().json(view));
    }

    let invoices = service.list_invoices(&query.filter()).await?;

    if !query.with_discount {
        return Ok(HttpResponse::Ok().json(invoices));
    }

    let views = service.render_all_with_discount(invoices).await?;
    Ok(HttpResponse::Ok().json(views))
}

/// Update header fields
/// PUT /invoices
pub async fn update_invoice(
    service: web::Data<InvoiceService>,
    ctx: RequestContext,
    request: web::Json<InvoiceChanges>,
) -> Result<HttpResponse, AppError> {
    let invoice = service.update_invoice(request.into_inner()).await?;

    tracing::info!(invoice_id = invoice.id, user_id = ?ctx.user_id, "Invoice updated via API");

    Ok(HttpResponse::Ok().json(invoice))
}

/// Delete by `?idfactura=` or by `{idfactura}` body
/// DELETE /invoices
pub async fn delete_invoice(
    service: web::Data<InvoiceService>,
    ctx: RequestContext,
    query: web::Query<InvoiceIdQuery>,
    body: Option<web::Json<InvoiceIdBody>>,
) -> Result<HttpResponse, AppError> {
    let id = query
        .idfactura
        .or_else(|| body.map(|b| b.idfactura))
        .ok_or_else(|| AppError::validation("Invoice id (idfactura) is required"))?;

    let deleted = service.delete_invoice(id).await?;

    tracing::info!(invoice_id = id, user_id = ?ctx.user_id, "Invoice deleted via API");

    Ok(HttpResponse::Ok().json(deleted))
}

/// Price products for a client without saving anything
/// POST /invoices/preview
pub async fn preview_invoice(
    builder: web::Data<LineBuilder>,
    request: web::Json<PreviewRequest>,
) -> Result<HttpResponse, AppError> {
    let draft = builder.build_preview(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(draft))
}

/// Configure invoice routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/invoices/preview")
            .route(web::post().to(preview_invoice))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/invoices")
            .route(web::get().to(get_invoices))
            .route(web::post().to(create_invoice))
            .route(web::put().to(update_invoice))
            .route(web::delete().to(delete_invoice))
            .default_service(web::to(method_not_allowed)),
    );
}
