// Invoice storage
//
// Headers live in `facturas`, lines in `detalle_facturas`. Invoice numbers are
// taken from the single row of `numeracion_facturas`, locked for the duration
// of the creating transaction; `numero_factura` is UNIQUE as well.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, MySql, MySqlPool, QueryBuilder, Transaction};

use crate::core::Result;
use crate::modules::invoices::models::{
    next_invoice_number, CreatedInvoice, Invoice, InvoiceChanges, InvoiceDetail, InvoiceFilter,
    NewInvoice, NewInvoiceDetail,
};

/// Invoice persistence
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Allocate a number and write header plus details atomically
    async fn create(
        &self,
        invoice: &NewInvoice,
        details: &[NewInvoiceDetail],
    ) -> Result<CreatedInvoice>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Invoice>>;

    /// Details of an invoice by id ascending; empty when there are none
    async fn find_details(&self, invoice_id: i64) -> Result<Vec<InvoiceDetail>>;

    /// Invoices matching the filter by id ascending
    async fn list(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>>;

    /// Header-only update; None when the invoice does not exist
    async fn update(&self, changes: &InvoiceChanges) -> Result<Option<Invoice>>;

    /// Remove details and header together, returning the deleted header
    async fn delete(&self, id: i64) -> Result<Option<Invoice>>;
}

/// MySQL implementation of InvoiceRepository
pub struct MySqlInvoiceRepository {
    pool: MySqlPool,
    first_number: i64,
}

impl MySqlInvoiceRepository {
    pub fn new(pool: MySqlPool, first_number: i64) -> Self {
        Self { pool, first_number }
    }

    /// Lock the sequence row and advance it
    async fn allocate_number(&self, tx: &mut Transaction<'_, MySql>) -> Result<String> {
        let last = sqlx::query_scalar::<_, Option<String>>(
            "SELECT ultimo_numero FROM numeracion_facturas WHERE id = 1 FOR UPDATE",
        )
        .fetch_optional(&mut **tx)
        .await?;

        let number = match last {
            Some(last) => {
                let number = next_invoice_number(last.as_deref(), self.first_number).to_string();
                sqlx::query("UPDATE numeracion_facturas SET ultimo_numero = ? WHERE id = 1")
                    .bind(&number)
                    .execute(&mut **tx)
                    .await?;
                number
            }
            None => {
                // Sequence row missing: continue from the newest stored invoice
                let newest = sqlx::query_scalar::<_, String>(
                    "SELECT numero_factura FROM facturas ORDER BY idfactura DESC LIMIT 1 FOR UPDATE",
                )
                .fetch_optional(&mut **tx)
                .await?;

                let number =
                    next_invoice_number(newest.as_deref(), self.first_number).to_string();
                sqlx::query("INSERT INTO numeracion_facturas (id, ultimo_numero) VALUES (1, ?)")
                    .bind(&number)
                    .execute(&mut **tx)
                    .await?;
                number
            }
        };

        Ok(number)
    }
}

const SELECT_INVOICES: &str = r#"
    SELECT idfactura, numero_factura, fecha, subtotal, iva, total, idestado, idcliente
    FROM facturas
"#;

#[async_trait]
impl InvoiceRepository for MySqlInvoiceRepository {
    async fn create(
        &self,
        invoice: &NewInvoice,
        details: &[NewInvoiceDetail],
    ) -> Result<CreatedInvoice> {
        let mut tx = self.pool.begin().await?;

        let number = self.allocate_number(&mut tx).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO facturas (numero_factura, fecha, subtotal, iva, total, idestado, idcliente)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&number)
        .bind(invoice.issued_at)
        .bind(invoice.subtotal)
        .bind(invoice.iva)
        .bind(invoice.total)
        .bind(invoice.status_id)
        .bind(invoice.client_id)
        .execute(&mut *tx)
        .await?;

        let invoice_id = result.last_insert_id() as i64;

        let mut created_details = Vec::with_capacity(details.len());
        for detail in details {
            let result = sqlx::query(
                r#"
                INSERT INTO detalle_facturas (
                    idfactura, concepto, cantidad, precio_unitario, subtotal, idalquiler
                ) VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(invoice_id)
            .bind(&detail.concept)
            .bind(detail.quantity)
            .bind(detail.unit_price)
            .bind(detail.subtotal)
            .bind(detail.rental_id)
            .execute(&mut *tx)
            .await?;

            created_details.push(InvoiceDetail {
                id: result.last_insert_id() as i64,
                invoice_id,
                concept: detail.concept.clone(),
                quantity: detail.quantity,
                unit_price: detail.unit_price,
                subtotal: detail.subtotal,
                rental_id: detail.rental_id,
            });
        }

        tx.commit().await?;

        Ok(CreatedInvoice {
            invoice: Invoice {
                id: invoice_id,
                number,
                issued_at: invoice.issued_at,
                subtotal: invoice.subtotal,
                iva: invoice.iva,
                total: invoice.total,
                status_id: invoice.status_id,
                client_id: invoice.client_id,
            },
            details: created_details,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "{} WHERE idfactura = ?",
            SELECT_INVOICES
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(InvoiceRow::into_invoice))
    }

    async fn find_details(&self, invoice_id: i64) -> Result<Vec<InvoiceDetail>> {
        let rows = sqlx::query_as::<_, DetailRow>(
            r#"
            SELECT iddetalle, idfactura, concepto, cantidad, precio_unitario, subtotal, idalquiler
            FROM detalle_facturas
            WHERE idfactura = ?
            ORDER BY iddetalle ASC
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DetailRow::into_detail).collect())
    }

    async fn list(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>> {
        let mut query = QueryBuilder::<MySql>::new(SELECT_INVOICES);
        query.push(" WHERE 1 = 1");

        if let Some(status_id) = filter.status_id {
            query.push(" AND idestado = ").push_bind(status_id);
        }
        if let Some(client_id) = filter.client_id {
            query.push(" AND idcliente = ").push_bind(client_id);
        }
        if let Some(number) = filter.number_query() {
            query
                .push(" AND numero_factura LIKE ")
                .push_bind(format!("%{}%", escape_like(number)));
        }
        query.push(" ORDER BY idfactura ASC");

        let rows = query
            .build_query_as::<InvoiceRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(InvoiceRow::into_invoice).collect())
    }

    async fn update(&self, changes: &InvoiceChanges) -> Result<Option<Invoice>> {
        let mut query = QueryBuilder::<MySql>::new("UPDATE facturas SET ");
        let mut fields = query.separated(", ");

        if let Some(subtotal) = changes.subtotal {
            fields.push("subtotal = ").push_bind_unseparated(subtotal);
        }
        if let Some(iva) = changes.iva {
            fields.push("iva = ").push_bind_unseparated(iva);
        }
        if let Some(total) = changes.total {
            fields.push("total = ").push_bind_unseparated(total);
        }
        if let Some(status_id) = changes.status_id {
            fields.push("idestado = ").push_bind_unseparated(status_id);
        }
        // Some(None) writes NULL
        if let Some(client_id) = changes.client_id {
            fields.push("idcliente = ").push_bind_unseparated(client_id);
        }

        query.push(" WHERE idfactura = ").push_bind(changes.id);
        query.build().execute(&self.pool).await?;

        // Affected rows are 0 for both a missing and an unchanged row
        self.find_by_id(changes.id).await
    }

    async fn delete(&self, id: i64) -> Result<Option<Invoice>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "{} WHERE idfactura = ? FOR UPDATE",
            SELECT_INVOICES
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM detalle_facturas WHERE idfactura = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM facturas WHERE idfactura = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(row.into_invoice()))
    }
}

/// Escape LIKE wildcards in user input
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Debug, FromRow)]
struct InvoiceRow {
    idfactura: i64,
    numero_factura: String,
    fecha: DateTime<Utc>,
    subtotal: Decimal,
    iva: Decimal,
    total: Decimal,
    idestado: i64,
    idcliente: Option<i64>,
}

impl InvoiceRow {
    fn into_invoice(self) -> Invoice {
        Invoice {
            id: self.idfactura,
            number: self.numero_factura,
            issued_at: self.fecha,
            subtotal: self.subtotal,
            iva: self.iva,
            total: self.total,
            status_id: self.idestado,
            client_id: self.idcliente,
        }
    }
}

#[derive(Debug, FromRow)]
struct DetailRow {
    iddetalle: i64,
    idfactura: i64,
    concepto: String,
    cantidad: i32,
    precio_unitario: Decimal,
    subtotal: Decimal,
    idalquiler: Option<i64>,
}

impl DetailRow {
    fn into_detail(self) -> InvoiceDetail {
        InvoiceDetail {
            id: self.iddetalle,
            invoice_id: self.idfactura,
            concept: self.concepto,
            quantity: self.cantidad,
            unit_price: self.precio_unitario,
            subtotal: self.subtotal,
            rental_id: self.idalquiler,
        }
    }
}
