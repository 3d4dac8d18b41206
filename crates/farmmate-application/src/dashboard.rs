//! Dashboard widgets: weather, pest alerts, guidance and the bookmark page.

use std::sync::Arc;

use chrono::NaiveDate;
use farmmate_core::bookmark::{WeekGroup, group_by_week};
use farmmate_core::pest::{PestAlerts, PestDetail};
use farmmate_core::weather::{DaySummary, WeatherReading, summarize_day};
use farmmate_core::{FarmApi, FarmmateError, Result};
use farmmate_infrastructure::LocalCache;

#[derive(Clone)]
pub struct DashboardService {
    api: Arc<dyn FarmApi>,
    cache: Arc<LocalCache>,
}

impl DashboardService {
    pub fn new(api: Arc<dyn FarmApi>, cache: Arc<LocalCache>) -> Self {
        Self { api, cache }
    }

    /// Cached address of the crop, `None` when none was recorded.
    fn address_of(&self, crop_name: &str) -> Result<Option<String>> {
        let address = self.cache.crop_catalog()?.require(crop_name)?.address.clone();
        Ok((!address.trim().is_empty()).then_some(address))
    }

    /// Current weather at the crop's address.
    ///
    /// Backend failures and crops without an address give the default reading.
    pub async fn current_weather(&self, crop_name: &str) -> Result<WeatherReading> {
        let Some(address) = self.address_of(crop_name)? else {
            tracing::debug!(crop = crop_name, "[Dashboard] No address, using default weather");
            return Ok(WeatherReading::fallback());
        };
        Ok(self.weather_at(&address).await)
    }

    pub async fn weather_at(&self, address: &str) -> WeatherReading {
        match self.api.current_weather(address).await {
            Ok(weather) => WeatherReading::live(weather),
            Err(e) => {
                tracing::warn!(error = %e, "[Dashboard] Weather unavailable, using default");
                WeatherReading::fallback()
            }
        }
    }

    /// Short-term forecast at the crop's address, one summary per day.
    pub async fn short_term_forecast(&self, crop_name: &str) -> Result<Vec<DaySummary>> {
        let address = self.address_of(crop_name)?.ok_or_else(|| {
            FarmmateError::user_input(format!("no address recorded for {crop_name}"))
        })?;
        let days = self.api.short_term_forecast(&address).await?;
        Ok(days.iter().map(summarize_day).collect())
    }

    pub async fn pest_alerts(&self, crop_name: &str) -> Result<PestAlerts> {
        self.api.pest_alerts(crop_name).await
    }

    pub async fn pest_detail(&self, pest_name: &str, crop_name: &str) -> Result<PestDetail> {
        self.api.pest_detail(pest_name, crop_name).await
    }

    /// Recommended actions for the crop's thread, in order.
    pub async fn guidance(&self, member_id: &str, crop_name: &str) -> Result<Vec<String>> {
        let catalog = self.cache.crop_catalog()?;
        let thread_id = catalog.require_thread(crop_name)?;
        let crop_id = catalog.require(crop_name)?.crop_id;
        let guidance = self.api.guidance(member_id, &thread_id, crop_id).await?;
        Ok(guidance.actions())
    }

    /// The bookmark page of a crop: its bookmarks grouped by week before `today`.
    pub async fn bookmark_weeks(
        &self,
        member_id: &str,
        crop_name: &str,
        today: NaiveDate,
    ) -> Result<Vec<WeekGroup>> {
        let thread_id = self.cache.crop_catalog()?.require_thread(crop_name)?;
        let bookmarks = self.api.list_bookmarks(member_id, &thread_id).await?;
        Ok(group_by_week(&bookmarks, today))
    }
}
