use envconfig::Envconfig;

use crate::error::{StoreError, StoreResult};

#[derive(Envconfig, Debug, Clone)]
pub struct StoreSettings {
    #[envconfig(from = "MSHARD_MAX_PAGE_SIZE", default = "500")]
    pub max_page_size: usize,
    #[envconfig(from = "MSHARD_DEFAULT_PAGE_SIZE", default = "50")]
    pub default_page_size: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            max_page_size: 500,
            default_page_size: 50,
        }
    }
}

impl StoreSettings {
    pub fn check_page_size(&self, size: usize) -> StoreResult<()> {
        if size == 0 || size > self.max_page_size {
            return Err(StoreError::InvalidPageSize {
                size,
                max: self.max_page_size,
            });
        }
        Ok(())
    }
}
