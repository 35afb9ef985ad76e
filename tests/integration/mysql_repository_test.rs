// MySQL repositories against a live server
//
// Each test runs in its own freshly migrated database and is skipped when
// TEST_DATABASE_URL / DATABASE_URL is not set. Covers what the in-memory
// stores cannot: column scale, the DATE() rental filter, LIKE escaping and
// the locked invoice number sequence.

#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use futures_util::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use helpers::*;
use rental_billing::config::BillingConfig;
use rental_billing::core::{AppError, FixedClock};
use rental_billing::invoices::models::{
    CreateDetailRequest, CreateInvoiceRequest, InvoiceChanges, InvoiceFilter, NewInvoice,
    NewInvoiceDetail,
};
use rental_billing::invoices::{InvoiceRepository, MySqlInvoiceRepository};
use rental_billing::rentals::{MySqlRentalRepository, RentalRepository};
use rental_billing::tariffs::models::NewTariff;
use rental_billing::tariffs::{MySqlTariffRepository, TariffKind, TariffRepository};
use rental_billing::{AppServices, Repositories};

fn header(client_id: Option<i64>, status_id: i64, subtotal: Decimal) -> NewInvoice {
    NewInvoice {
        issued_at: monday_in_january(),
        subtotal,
        iva: dec!(0),
        total: subtotal,
        status_id,
        client_id,
    }
}

fn detail(concept: &str, quantity: i32, unit_price: Decimal) -> NewInvoiceDetail {
    NewInvoiceDetail {
        concept: concept.to_string(),
        quantity,
        unit_price,
        subtotal: Decimal::from(quantity) * unit_price,
        rental_id: None,
    }
}

#[tokio::test]
async fn test_invoice_create_read_update_delete() {
    let Some(db) = TestDatabase::create().await else {
        return;
    };
    let repo = MySqlInvoiceRepository::new(db.pool.clone(), 1001);

    let created = repo
        .create(
            &header(Some(CLIENT_ID), 1, dec!(42.35)),
            &[detail("Alquiler", 1, dec!(20.00)), detail("Casco", 3, dec!(7.45))],
        )
        .await
        .unwrap();
    assert_eq!(created.invoice.number, "1001");

    let stored = repo.find_by_id(created.invoice.id).await.unwrap().unwrap();
    assert_eq!(stored, created.invoice);

    let details = repo.find_details(created.invoice.id).await.unwrap();
    assert_eq!(details, created.details);
    assert_eq!(details[1].subtotal, dec!(22.35));

    let updated = repo
        .update(&InvoiceChanges {
            id: created.invoice.id,
            status_id: Some(2),
            client_id: Some(None),
            ..Default::default()
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status_id, 2);
    assert_eq!(updated.client_id, None);
    assert_eq!(updated.total, dec!(42.35));

    let deleted = repo.delete(created.invoice.id).await.unwrap().unwrap();
    assert_eq!(deleted.number, "1001");
    assert!(repo.find_by_id(created.invoice.id).await.unwrap().is_none());
    assert!(repo.find_details(created.invoice.id).await.unwrap().is_empty());
    assert!(repo.delete(created.invoice.id).await.unwrap().is_none());

    db.destroy().await;
}

#[tokio::test]
async fn test_list_filters_and_like_escaping() {
    let Some(db) = TestDatabase::create().await else {
        return;
    };
    let repo = MySqlInvoiceRepository::new(db.pool.clone(), 1001);

    for (client_id, status_id) in [(CLIENT_ID, 1), (202, 1), (CLIENT_ID, 2)] {
        repo.create(
            &header(Some(client_id), status_id, dec!(10)),
            &[detail("Alquiler", 1, dec!(10))],
        )
        .await
        .unwrap();
    }

    let all = repo.list(&InvoiceFilter::default()).await.unwrap();
    let numbers: Vec<_> = all.iter().map(|i| i.number.as_str()).collect();
    assert_eq!(numbers, ["1001", "1002", "1003"]);

    let filtered = repo
        .list(&InvoiceFilter {
            status_id: Some(1),
            client_id: Some(CLIENT_ID),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].number, "1001");

    let by_number = repo
        .list(&InvoiceFilter {
            number_contains: Some("03".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_number.len(), 1);

    // Wildcards in the query are literal characters
    for pattern in ["10%", "1_01"] {
        let none = repo
            .list(&InvoiceFilter {
                number_contains: Some(pattern.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty(), "{} matched", pattern);
    }

    db.destroy().await;
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_numbers() {
    let Some(db) = TestDatabase::create().await else {
        return;
    };
    let repo = Arc::new(MySqlInvoiceRepository::new(db.pool.clone(), 1001));

    let creates = (0..5).map(|_| {
        let repo = repo.clone();
        async move {
            let invoice = header(Some(CLIENT_ID), 1, dec!(5));
            let details = [detail("Casco", 1, dec!(5))];
            repo.create(&invoice, &details).await
        }
    });

    let mut numbers: Vec<String> = join_all(creates)
        .await
        .into_iter()
        .map(|created| created.unwrap().invoice.number)
        .collect();
    numbers.sort();
    assert_eq!(numbers, ["1001", "1002", "1003", "1004", "1005"]);

    // Numbers are never reused after a delete
    let last = repo
        .list(&InvoiceFilter::default())
        .await
        .unwrap()
        .pop()
        .unwrap();
    repo.delete(last.id).await.unwrap();
    let next = repo
        .create(
            &header(Some(CLIENT_ID), 1, dec!(5)),
            &[detail("Casco", 1, dec!(5))],
        )
        .await
        .unwrap();
    assert_eq!(next.invoice.number, "1006");

    db.destroy().await;
}

#[tokio::test]
async fn test_service_amounts_survive_the_round_trip() {
    let Some(db) = TestDatabase::create().await else {
        return;
    };
    let billing = BillingConfig::default();
    let services = AppServices::new(
        Repositories::mysql(&db.pool, &billing),
        &billing,
        Arc::new(FixedClock(monday_in_january())),
    )
    .unwrap();

    let request = |unit_price: Decimal| CreateInvoiceRequest {
        status_id: Some(1),
        client_id: Some(CLIENT_ID),
        details: vec![CreateDetailRequest {
            concept: "Alquiler patineta 7".to_string(),
            quantity: 3,
            unit_price,
            rental_id: None,
        }],
        ..Default::default()
    };

    let created = services
        .invoices
        .create_invoice(request(dec!(12.35)))
        .await
        .unwrap();
    let fetched = services
        .invoices
        .get_invoice(created.invoice.id, true)
        .await
        .unwrap();

    assert_eq!(fetched.invoice, created.invoice);
    assert_eq!(fetched.details, Some(created.details.clone()));
    assert_eq!(created.details[0].subtotal, dec!(37.05));
    assert_eq!(fetched.invoice.total, dec!(44.09));

    let rejected = services.invoices.create_invoice(request(dec!(12.345))).await;
    assert!(matches!(rejected, Err(AppError::Validation(_))));

    let all = services
        .invoices
        .list_invoices(&InvoiceFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 1);

    db.destroy().await;
}

#[tokio::test]
async fn test_rentals_are_matched_by_calendar_day() {
    let Some(db) = TestDatabase::create().await else {
        return;
    };

    for (starts_at, price, created_at) in [
        ("2023-12-31 23:30:00", dec!(11.00), "2023-12-31 23:30:00"),
        ("2024-01-01 08:00:00", dec!(20.00), "2024-01-01 08:00:00"),
        ("2024-01-01 18:45:00", dec!(25.00), "2024-01-01 18:45:00"),
        ("2024-01-02 00:10:00", dec!(30.00), "2024-01-02 00:10:00"),
    ] {
        sqlx::query(
            r#"
            INSERT INTO alquileres (idcliente, idpatineta, fecha_hora_inicio, precio, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(CLIENT_ID)
        .bind(PRODUCT_ID)
        .bind(local(starts_at))
        .bind(price)
        .bind(local(created_at))
        .execute(&db.pool)
        .await
        .unwrap();
    }

    let repo = MySqlRentalRepository::new(db.pool.clone());
    let monday = repo
        .find_for_day(CLIENT_ID, PRODUCT_ID, date(2024, 1, 1))
        .await
        .unwrap();

    let prices: Vec<_> = monday.iter().map(|r| r.price).collect();
    assert_eq!(prices, [dec!(25.00), dec!(20.00)]);
    assert!(repo
        .find_for_day(CLIENT_ID, 99, date(2024, 1, 1))
        .await
        .unwrap()
        .is_empty());
    assert_eq!(repo.list().await.unwrap().len(), 4);

    db.destroy().await;
}

#[tokio::test]
async fn test_tariff_store() {
    let Some(db) = TestDatabase::create().await else {
        return;
    };
    let repo = MySqlTariffRepository::new(db.pool.clone());

    let lunes = repo
        .create(&NewTariff {
            name: "Lunes".to_string(),
            kind: TariffKind::WeekdayDiscount,
            value: dec!(0.1250),
            starts_on: date(2024, 1, 1),
            ends_on: Some(date(2024, 1, 31)),
            active: None,
        })
        .await
        .unwrap();
    assert!(lunes.active);
    assert_eq!(lunes.value, dec!(0.1250));

    let enero = repo
        .create(&NewTariff {
            name: "Enero".to_string(),
            kind: TariffKind::MonthDiscount,
            value: dec!(0.05),
            starts_on: date(2023, 1, 1),
            ends_on: None,
            active: Some(false),
        })
        .await
        .unwrap();
    assert!(!enero.active);

    let listed = repo.list().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, enero.id);

    let active = repo.list_active(date(2024, 1, 15)).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, lunes.id);
    assert!(repo.list_active(date(2024, 2, 1)).await.unwrap().is_empty());

    let enabled = repo.set_active(enero.id, true).await.unwrap().unwrap();
    assert!(enabled.active);
    assert_eq!(repo.list_active(date(2024, 1, 31)).await.unwrap().len(), 2);

    let mut changed = lunes.clone();
    changed.ends_on = None;
    changed.value = dec!(0.2);
    let changed = repo.update(&changed).await.unwrap().unwrap();
    assert_eq!(changed.ends_on, None);
    assert_eq!(changed.value, dec!(0.2));

    assert_eq!(repo.delete(lunes.id).await.unwrap(), Some(changed));
    assert!(repo.find_by_id(lunes.id).await.unwrap().is_none());
    assert!(repo.set_active(lunes.id, false).await.unwrap().is_none());

    db.destroy().await;
}

#[tokio::test]
async fn test_issue_time_is_stored_in_utc() {
    let Some(db) = TestDatabase::create().await else {
        return;
    };
    let repo = MySqlInvoiceRepository::new(db.pool.clone(), 1001);

    let mut late_evening = header(Some(CLIENT_ID), 1, dec!(1));
    // 23:30 on Monday in the business offset
    late_evening.issued_at = Utc.with_ymd_and_hms(2024, 1, 2, 4, 30, 0).unwrap();

    let created = repo
        .create(&late_evening, &[detail("Casco", 1, dec!(1))])
        .await
        .unwrap();
    let stored = repo.find_by_id(created.invoice.id).await.unwrap().unwrap();
    assert_eq!(stored.issued_at, late_evening.issued_at);

    db.destroy().await;
}
