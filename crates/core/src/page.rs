use serde::{Deserialize, Serialize};

/// One page of list results, in the backend's wire shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub page_no: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn empty(page_no: u32, page_size: u32) -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            page_no,
            page_size,
        }
    }

    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_elements
            .div_ceil(u64::from(self.page_size))
            .min(u64::from(u32::MAX)) as u32
    }

    /// Requesting a page at or past `total_pages` is legal and yields empty
    /// content; this reports that state so the UI can show an empty table.
    pub fn is_overrun(&self) -> bool {
        self.total_elements > 0 && self.page_no >= self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            page_no: self.page_no,
            page_size: self.page_size,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            content: self
                .content
                .into_iter()
                .map(f)
                .collect::<Result<Vec<U>, E>>()?,
            total_elements: self.total_elements,
            page_no: self.page_no,
            page_size: self.page_size,
        })
    }
}

/// Clamp a navigation request to `[0, total_pages - 1]`.
pub fn clamp_page(requested: u32, total_pages: u32) -> u32 {
    if total_pages == 0 {
        0
    } else {
        requested.min(total_pages - 1)
    }
}
