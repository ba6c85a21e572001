use serde::Deserialize;

use lodgia_domain::repository::Page;

use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageQuery {
    /// Page size is capped; out-of-range values are rejected rather
    /// than clamped, matching the CRUD surface's contract.
    pub fn resolve(self) -> Result<Page, AppError> {
        let default = Page::default();
        let number = self.page_number.unwrap_or(default.number);
        let size = self.page_size.unwrap_or(default.size);

        if size == 0 || size > Page::MAX_SIZE {
            return Err(AppError::validation(format!(
                "Page size should be between 1 and {}.",
                Page::MAX_SIZE
            )));
        }

        Ok(Page { number, size })
    }
}
