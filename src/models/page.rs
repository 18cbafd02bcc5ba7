//! Offset pagination

use serde::{Deserialize, Serialize};
use crate::utils::errors::{EwmError, Result};

/// Offset window over a listing: skip `from` rows, return at most `size`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub from: i64,
    pub size: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self { from: 0, size: 10 }
    }
}

impl Page {
    pub fn new(from: i64, size: i64) -> Result<Self> {
        if from < 0 {
            return Err(EwmError::validation(format!("Page offset must not be negative, got {}", from)));
        }
        if size <= 0 {
            return Err(EwmError::validation(format!("Page size must be positive, got {}", size)));
        }
        Ok(Self { from, size })
    }

    /// Cut this window out of an already ordered listing
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.from as usize)
            .take(self.size as usize)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        assert_eq!(Page::new(20, 10).unwrap(), Page { from: 20, size: 10 });
        assert!(Page::new(-1, 10).is_err());
        assert!(Page::new(0, 0).is_err());
    }

    #[test]
    fn test_page_slice() {
        let page = Page::new(2, 2).unwrap();
        assert_eq!(page.slice(vec![1, 2, 3, 4, 5]), vec![3, 4]);
        assert_eq!(page.slice(vec![1, 2, 3]), vec![3]);
        assert!(Page::new(10, 5).unwrap().slice(vec![1, 2]).is_empty());
    }
}
