use std::sync::Arc;

use chrono::NaiveDate;

use crate::core::{AppError, Result};
use crate::modules::tariffs::models::{NewTariff, Tariff, TariffPatch};
use crate::modules::tariffs::repositories::TariffRepository;

/// Service for tariff management
#[derive(Clone)]
pub struct TariffService {
    repo: Arc<dyn TariffRepository>,
}

impl TariffService {
    pub fn new(repo: Arc<dyn TariffRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_tariffs(&self) -> Result<Vec<Tariff>> {
        self.repo.list().await
    }

    pub async fn list_active_tariffs(&self, as_of: NaiveDate) -> Result<Vec<Tariff>> {
        self.repo.list_active(as_of).await
    }

    pub async fn create_tariff(&self, request: NewTariff) -> Result<Tariff> {
        request.validate()?;

        let tariff = self.repo.create(&request).await?;
        tracing::info!(
            tariff_id = tariff.id,
            name = %tariff.name,
            kind = %tariff.kind,
            value = %tariff.value,
            "Tariff created"
        );

        Ok(tariff)
    }

    /// Activate or suspend a tariff
    pub async fn update_tariff_status(&self, id: i64, active: bool) -> Result<Tariff> {
        let tariff = self
            .repo
            .set_active(id, active)
            .await?
            .ok_or_else(|| tariff_not_found(id))?;

        tracing::info!(tariff_id = id, active, "Tariff status changed");
        Ok(tariff)
    }

    /// Partial update; the merged tariff is validated before it is written
    pub async fn update_tariff(&self, patch: TariffPatch) -> Result<Tariff> {
        if patch.is_empty() {
            return Err(AppError::validation("No tariff fields to update"));
        }

        if patch.is_status_only() {
            if let Some(active) = patch.active {
                return self.update_tariff_status(patch.id, active).await;
            }
        }

        let current = self
            .repo
            .find_by_id(patch.id)
            .await?
            .ok_or_else(|| tariff_not_found(patch.id))?;

        let merged = patch.apply_to(&current)?;

        let updated = self
            .repo
            .update(&merged)
            .await?
            .ok_or_else(|| tariff_not_found(patch.id))?;

        tracing::info!(tariff_id = updated.id, "Tariff updated");
        Ok(updated)
    }

    pub async fn delete_tariff(&self, id: i64) -> Result<Tariff> {
        let deleted = self
            .repo
            .delete(id)
            .await?
            .ok_or_else(|| tariff_not_found(id))?;

        tracing::info!(tariff_id = id, "Tariff deleted");
        Ok(deleted)
    }
}

fn tariff_not_found(id: i64) -> AppError {
    AppError::not_found(format!("Tariff {} not found", id))
}
