// In-memory repositories with the same contracts as the MySQL ones

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use rental_billing::core::{AppError, Result};
use rental_billing::invoices::models::{
    next_invoice_number, CreatedInvoice, Invoice, InvoiceChanges, InvoiceDetail, InvoiceFilter,
    NewInvoice, NewInvoiceDetail,
};
use rental_billing::invoices::InvoiceRepository;
use rental_billing::rentals::{Rental, RentalRepository};
use rental_billing::tariffs::models::NewTariff;
use rental_billing::tariffs::{Tariff, TariffRepository};

#[derive(Default)]
pub struct InMemoryTariffRepository {
    rows: Mutex<Vec<Tariff>>,
    reads: AtomicUsize,
}

impl InMemoryTariffRepository {
    /// Insert with a fixed id
    pub fn insert(&self, tariff: Tariff) {
        self.rows.lock().unwrap().push(tariff);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Number of list / list_active calls so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TariffRepository for InMemoryTariffRepository {
    async fn list(&self) -> Result<Vec<Tariff>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn list_active(&self, as_of: NaiveDate) -> Result<Vec<Tariff>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut rows: Vec<Tariff> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.is_active_on(as_of))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Tariff>> {
        Ok(self.rows.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn create(&self, tariff: &NewTariff) -> Result<Tariff> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let created = Tariff {
            id,
            name: tariff.name.trim().to_string(),
            kind: tariff.kind.clone(),
            value: tariff.value,
            starts_on: tariff.starts_on,
            ends_on: tariff.ends_on,
            active: tariff.is_active(),
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn update(&self, tariff: &Tariff) -> Result<Option<Tariff>> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|t| t.id == tariff.id) {
            Some(row) => {
                *row = tariff.clone();
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<Option<Tariff>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|t| t.id == id).map(|row| {
            row.active = active;
            row.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<Option<Tariff>> {
        let mut rows = self.rows.lock().unwrap();
        let index = rows.iter().position(|t| t.id == id);
        Ok(index.map(|i| rows.remove(i)))
    }
}

#[derive(Default)]
pub struct InMemoryRentalRepository {
    rows: Mutex<Vec<Rental>>,
}

impl InMemoryRentalRepository {
    pub fn insert(&self, rental: Rental) {
        self.rows.lock().unwrap().push(rental);
    }
}

#[async_trait]
impl RentalRepository for InMemoryRentalRepository {
    async fn list(&self) -> Result<Vec<Rental>> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn find_for_day(
        &self,
        client_id: i64,
        product_id: i64,
        day: NaiveDate,
    ) -> Result<Vec<Rental>> {
        let mut rows: Vec<Rental> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.is_for(client_id, product_id) && r.is_on(day))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }
}

#[derive(Default)]
struct InvoiceState {
    invoices: Vec<Invoice>,
    details: Vec<InvoiceDetail>,
    last_number: Option<String>,
    next_invoice_id: i64,
    next_detail_id: i64,
}

pub struct InMemoryInvoiceRepository {
    state: Mutex<InvoiceState>,
    first_number: i64,
    fail_on_details: Mutex<bool>,
}

impl InMemoryInvoiceRepository {
    pub fn new(first_number: i64) -> Self {
        Self {
            state: Mutex::new(InvoiceState {
                next_invoice_id: 1,
                next_detail_id: 1,
                ..Default::default()
            }),
            first_number,
            fail_on_details: Mutex::new(false),
        }
    }

    /// Make the next detail insert fail, as a broken connection would
    pub fn fail_detail_writes(&self, fail: bool) {
        *self.fail_on_details.lock().unwrap() = fail;
    }

    pub fn invoice_count(&self) -> usize {
        self.state.lock().unwrap().invoices.len()
    }

    pub fn detail_count(&self) -> usize {
        self.state.lock().unwrap().details.len()
    }

    pub fn last_number(&self) -> Option<String> {
        self.state.lock().unwrap().last_number.clone()
    }

    /// Seed the sequence as if invoices had been issued before
    pub fn set_last_number(&self, number: &str) {
        self.state.lock().unwrap().last_number = Some(number.to_string());
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
    async fn create(
        &self,
        invoice: &NewInvoice,
        details: &[NewInvoiceDetail],
    ) -> Result<CreatedInvoice> {
        let mut state = self.state.lock().unwrap();

        // Everything is staged and only committed at the end
        let number =
            next_invoice_number(state.last_number.as_deref(), self.first_number).to_string();
        let invoice_id = state.next_invoice_id;

        if *self.fail_on_details.lock().unwrap() && !details.is_empty() {
            return Err(AppError::Database(sqlx::Error::Protocol(
                "connection lost while writing details".to_string(),
            )));
        }

        let created_details: Vec<InvoiceDetail> = details
            .iter()
            .enumerate()
            .map(|(i, d)| InvoiceDetail {
                id: state.next_detail_id + i as i64,
                invoice_id,
                concept: d.concept.clone(),
                quantity: d.quantity,
                unit_price: d.unit_price,
                subtotal: d.subtotal,
                rental_id: d.rental_id,
            })
            .collect();

        let header = Invoice {
            id: invoice_id,
            number: number.clone(),
            issued_at: invoice.issued_at,
            subtotal: invoice.subtotal,
            iva: invoice.iva,
            total: invoice.total,
            status_id: invoice.status_id,
            client_id: invoice.client_id,
        };

        state.next_invoice_id += 1;
        state.next_detail_id += created_details.len() as i64;
        state.last_number = Some(number);
        state.invoices.push(header.clone());
        state.details.extend(created_details.iter().cloned());

        Ok(CreatedInvoice {
            invoice: header,
            details: created_details,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Invoice>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .invoices
            .iter()
            .find(|i| i.id == id)
            .cloned())
    }

    async fn find_details(&self, invoice_id: i64) -> Result<Vec<InvoiceDetail>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .details
            .iter()
            .filter(|d| d.invoice_id == invoice_id)
            .cloned()
            .collect())
    }

    async fn list(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>> {
        let mut rows: Vec<Invoice> = self
            .state
            .lock()
            .unwrap()
            .invoices
            .iter()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        rows.sort_by_key(|i| i.id);
        Ok(rows)
    }

    async fn update(&self, changes: &InvoiceChanges) -> Result<Option<Invoice>> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .invoices
            .iter_mut()
            .find(|i| i.id == changes.id)
            .map(|row| {
                *row = changes.apply_to(row);
                row.clone()
            }))
    }

    async fn delete(&self, id: i64) -> Result<Option<Invoice>> {
        let mut state = self.state.lock().unwrap();
        let Some(index) = state.invoices.iter().position(|i| i.id == id) else {
            return Ok(None);
        };

        state.details.retain(|d| d.invoice_id != id);
        Ok(Some(state.invoices.remove(index)))
    }
}
