use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, MySqlPool};

use crate::core::Result;
use crate::modules::tariffs::models::{NewTariff, Tariff, TariffKind};

/// Storage for tariff definitions
#[async_trait]
pub trait TariffRepository: Send + Sync {
    /// All tariffs, newest first
    async fn list(&self) -> Result<Vec<Tariff>>;

    /// Tariffs with the active flag set whose window contains `as_of`
    async fn list_active(&self, as_of: NaiveDate) -> Result<Vec<Tariff>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Tariff>>;

    /// Insert with a store-assigned id
    async fn create(&self, tariff: &NewTariff) -> Result<Tariff>;

    /// Overwrite every field of an existing tariff; None when absent
    async fn update(&self, tariff: &Tariff) -> Result<Option<Tariff>>;

    async fn set_active(&self, id: i64, active: bool) -> Result<Option<Tariff>>;

    /// Remove and return the deleted row
    async fn delete(&self, id: i64) -> Result<Option<Tariff>>;
}

pub struct MySqlTariffRepository {
    pool: MySqlPool,
}

impl MySqlTariffRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const SELECT_TARIFFS: &str = r#"
    SELECT idtarifa, nombre, tipo, valor, fecha_inicio, fecha_fin, activa
    FROM tarifas
"#;

#[async_trait]
impl TariffRepository for MySqlTariffRepository {
    async fn list(&self) -> Result<Vec<Tariff>> {
        let rows = sqlx::query_as::<_, TariffRow>(&format!(
            "{} ORDER BY idtarifa DESC",
            SELECT_TARIFFS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TariffRow::into_tariff).collect())
    }

    async fn list_active(&self, as_of: NaiveDate) -> Result<Vec<Tariff>> {
        let rows = sqlx::query_as::<_, TariffRow>(&format!(
            r#"{}
            WHERE activa = TRUE
              AND fecha_inicio <= ?
              AND (fecha_fin IS NULL OR fecha_fin >= ?)
            ORDER BY idtarifa DESC"#,
            SELECT_TARIFFS
        ))
        .bind(as_of)
        .bind(as_of)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TariffRow::into_tariff).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Tariff>> {
        let row = sqlx::query_as::<_, TariffRow>(&format!("{} WHERE idtarifa = ?", SELECT_TARIFFS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(TariffRow::into_tariff))
    }

    async fn create(&self, tariff: &NewTariff) -> Result<Tariff> {
        let result = sqlx::query(
            r#"
            INSERT INTO tarifas (nombre, tipo, valor, fecha_inicio, fecha_fin, activa)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(tariff.name.trim())
        .bind(tariff.kind.as_str())
        .bind(tariff.value)
        .bind(tariff.starts_on)
        .bind(tariff.ends_on)
        .bind(tariff.is_active())
        .execute(&self.pool)
        .await?;

        Ok(Tariff {
            id: result.last_insert_id() as i64,
            name: tariff.name.trim().to_string(),
            kind: tariff.kind.clone(),
            value: tariff.value,
            starts_on: tariff.starts_on,
            ends_on: tariff.ends_on,
            active: tariff.is_active(),
        })
    }

    async fn update(&self, tariff: &Tariff) -> Result<Option<Tariff>> {
        let result = sqlx::query(
            r#"
            UPDATE tarifas
            SET nombre = ?, tipo = ?, valor = ?, fecha_inicio = ?, fecha_fin = ?, activa = ?
            WHERE idtarifa = ?
            "#,
        )
        .bind(&tariff.name)
        .bind(tariff.kind.as_str())
        .bind(tariff.value)
        .bind(tariff.starts_on)
        .bind(tariff.ends_on)
        .bind(tariff.active)
        .bind(tariff.id)
        .execute(&self.pool)
        .await?;

        // MySQL reports 0 affected rows when nothing changed, so re-read
        if result.rows_affected() == 0 {
            return self.find_by_id(tariff.id).await;
        }

        Ok(Some(tariff.clone()))
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<Option<Tariff>> {
        sqlx::query("UPDATE tarifas SET activa = ? WHERE idtarifa = ?")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.find_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<Option<Tariff>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, TariffRow>(&format!(
            "{} WHERE idtarifa = ? FOR UPDATE",
            SELECT_TARIFFS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM tarifas WHERE idtarifa = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(row.into_tariff()))
    }
}

#[derive(Debug, FromRow)]
struct TariffRow {
    idtarifa: i64,
    nombre: String,
    tipo: String,
    valor: Decimal,
    fecha_inicio: NaiveDate,
    fecha_fin: Option<NaiveDate>,
    activa: bool,
}

impl TariffRow {
    fn into_tariff(self) -> Tariff {
        Tariff {
            id: self.idtarifa,
            name: self.nombre,
            kind: TariffKind::from(self.tipo),
            value: self.valor,
            starts_on: self.fecha_inicio,
            ends_on: self.fecha_fin,
            active: self.activa,
        }
    }
}
