//! Paginated catalogue listings

use fossfund_common::FossfundError;
use fossfund_persistence::Page;

/// Message shown for an empty first page
pub fn empty_message(noun: &str) -> String {
    format!("There are no matching {}", noun)
}

/// Validate a requested page number before querying
pub fn page_number(page: i64) -> Result<u64, FossfundError> {
    if page < 1 {
        return Err(FossfundError::InvalidPage(page));
    }
    Ok(page as u64)
}

/// Check a fetched page
///
/// Returns the page and, when the first page is empty, the message to show
/// instead of items. An empty page past the first does not exist.
pub fn check_page<T>(page: Page<T>, noun: &str) -> Result<(Page<T>, Option<String>), FossfundError> {
    if !page.is_empty() {
        return Ok((page, None));
    }

    if page.page_number > 1 {
        return Err(FossfundError::PageNotExist(page.page_number));
    }

    Ok((page, Some(empty_message(noun))))
}
