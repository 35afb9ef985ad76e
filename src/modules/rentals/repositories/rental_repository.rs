use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, MySqlPool};

use crate::core::Result;
use crate::modules::rentals::models::Rental;

/// Read access to rental records
#[async_trait]
pub trait RentalRepository: Send + Sync {
    /// All rentals by id ascending
    async fn list(&self) -> Result<Vec<Rental>>;

    /// Rentals of a (client, product) pair that started on `day`,
    /// most recently created first
    async fn find_for_day(
        &self,
        client_id: i64,
        product_id: i64,
        day: NaiveDate,
    ) -> Result<Vec<Rental>>;
}

pub struct MySqlRentalRepository {
    pool: MySqlPool,
}

impl MySqlRentalRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const SELECT_RENTALS: &str = r#"
    SELECT idalquiler, idcliente, idpatineta, fecha_hora_inicio, fecha_hora_fin,
           precio, horas_alquiladas, created_at
    FROM alquileres
"#;

#[async_trait]
impl RentalRepository for MySqlRentalRepository {
    async fn list(&self) -> Result<Vec<Rental>> {
        let rows = sqlx::query_as::<_, RentalRow>(&format!(
            "{} ORDER BY idalquiler ASC",
            SELECT_RENTALS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RentalRow::into_rental).collect())
    }

    async fn find_for_day(
        &self,
        client_id: i64,
        product_id: i64,
        day: NaiveDate,
    ) -> Result<Vec<Rental>> {
        let rows = sqlx::query_as::<_, RentalRow>(&format!(
            r#"{}
            WHERE idcliente = ?
              AND idpatineta = ?
              AND DATE(fecha_hora_inicio) = ?
            ORDER BY created_at DESC, idalquiler DESC"#,
            SELECT_RENTALS
        ))
        .bind(client_id)
        .bind(product_id)
        .bind(day)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RentalRow::into_rental).collect())
    }
}

#[derive(Debug, FromRow)]
struct RentalRow {
    idalquiler: i64,
    idcliente: i64,
    idpatineta: i64,
    fecha_hora_inicio: NaiveDateTime,
    fecha_hora_fin: Option<NaiveDateTime>,
    precio: Decimal,
    horas_alquiladas: Option<i32>,
    created_at: Option<DateTime<Utc>>,
}

impl RentalRow {
    fn into_rental(self) -> Rental {
        Rental {
            id: self.idalquiler,
            client_id: self.idcliente,
            product_id: self.idpatineta,
            starts_at: self.fecha_hora_inicio,
            ends_at: self.fecha_hora_fin,
            price: self.precio,
            contracted_hours: self.horas_alquiladas,
            created_at: self.created_at,
        }
    }
}
