use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rental record, owned by the rentals back-office and read here for pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rental {
    #[serde(rename = "idalquiler")]
    pub id: i64,

    #[serde(rename = "idcliente")]
    pub client_id: i64,

    #[serde(rename = "idpatineta")]
    pub product_id: i64,

    /// Business-local start timestamp
    #[serde(rename = "fecha_hora_inicio")]
    pub starts_at: NaiveDateTime,

    #[serde(rename = "fecha_hora_fin")]
    pub ends_at: Option<NaiveDateTime>,

    #[serde(rename = "precio")]
    pub price: Decimal,

    #[serde(rename = "horas_alquiladas")]
    pub contracted_hours: Option<i32>,

    pub created_at: Option<DateTime<Utc>>,
}

impl Rental {
    /// Started on `date`; the time of day is ignored
    pub fn is_on(&self, date: NaiveDate) -> bool {
        self.starts_at.date() == date
    }

    pub fn is_for(&self, client_id: i64, product_id: i64) -> bool {
        self.client_id == client_id && self.product_id == product_id
    }
}

/// Outcome of a unit price lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "resultado")]
pub enum PriceResolution {
    #[serde(rename = "encontrado")]
    Found {
        #[serde(rename = "idalquiler")]
        rental_id: i64,
        #[serde(rename = "precio")]
        price: Decimal,
    },

    /// No rental for the pair today; not an error
    #[serde(rename = "sin_alquiler_hoy")]
    NotFound,
}

impl PriceResolution {
    pub fn price_or_zero(&self) -> Decimal {
        match self {
            PriceResolution::Found { price, .. } => *price,
            PriceResolution::NotFound => Decimal::ZERO,
        }
    }

    pub fn rental_id(&self) -> Option<i64> {
        match self {
            PriceResolution::Found { rental_id, .. } => Some(*rental_id),
            PriceResolution::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PriceResolution::Found { .. })
    }
}

/// Pick today's rental for a (client, product) pair.
///
/// Several matches resolve to the most recently created one, falling back to
/// the highest id when creation times tie or are missing.
pub fn select_rental<'a>(
    rentals: &'a [Rental],
    client_id: i64,
    product_id: i64,
    date: NaiveDate,
) -> Option<&'a Rental> {
    rentals
        .iter()
        .filter(|r| r.is_for(client_id, product_id) && r.is_on(date))
        .max_by_key(|r| (r.created_at, r.id))
}
