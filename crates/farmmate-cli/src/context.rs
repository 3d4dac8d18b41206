use std::sync::Arc;

use anyhow::{Result, anyhow};
use farmmate_application::FarmmateServices;
use farmmate_infrastructure::{ConfigService, FarmmatePaths, LocalCache};
use farmmate_interaction::HttpFarmApi;
use tokio_util::sync::CancellationToken;

/// Everything a command needs: local files, cache and services.
pub struct Context {
    pub config: ConfigService,
    pub cache: Arc<LocalCache>,
    pub services: FarmmateServices,
    cancel: CancellationToken,
}

impl Context {
    pub fn open(paths: FarmmatePaths, base_url: Option<String>) -> Result<Self> {
        let config_service = ConfigService::new(paths.config_file());
        let mut config = config_service.get_config()?;
        if let Some(base_url) = base_url {
            config.base_url = base_url;
        }

        let cancel = CancellationToken::new();
        let api = HttpFarmApi::new(&config)?.with_cancellation(cancel.clone());
        let cache = Arc::new(LocalCache::open(paths.cache_file())?);
        let services = FarmmateServices::new(Arc::new(api), cache.clone());

        tracing::debug!(
            home = %paths.config_dir().display(),
            base_url = %config.base_url,
            "[Cli] Context ready"
        );

        Ok(Self {
            config: config_service,
            cache,
            services,
            cancel,
        })
    }

    /// Cancels in-flight requests on Ctrl-C.
    pub fn cancel_on_ctrl_c(&self) {
        let token = self.cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });
    }

    pub fn member_id(&self) -> Result<String> {
        self.cache
            .member_id()?
            .ok_or_else(|| anyhow!("no member registered yet; run `farmmate init` first"))
    }

    /// `crop`, or the selected crop when none is given.
    pub fn crop(&self, crop: Option<String>) -> Result<String> {
        match crop {
            Some(crop) => Ok(crop),
            None => self.cache.selected_crop()?.ok_or_else(|| {
                anyhow!("no crop given; pass one or run `farmmate crop select`")
            }),
        }
    }
}
