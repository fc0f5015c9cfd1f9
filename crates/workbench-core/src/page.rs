use serde::{Deserialize, Serialize};

/// Server-paginated slice of a larger result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    from = "PageWire<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub number: u32,
    pub size: u32,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

// Some backends omit the boundary flags; they are derived when missing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageWire<T> {
    #[serde(default = "Vec::new")]
    content: Vec<T>,
    #[serde(default)]
    total_elements: u64,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    number: u32,
    #[serde(default)]
    size: u32,
    first: Option<bool>,
    last: Option<bool>,
    empty: Option<bool>,
}

impl<T> From<PageWire<T>> for Page<T> {
    fn from(wire: PageWire<T>) -> Self {
        let first = wire.first.unwrap_or(wire.number == 0);
        let last = wire
            .last
            .unwrap_or(wire.total_pages == 0 || wire.number + 1 >= wire.total_pages);
        let empty = wire.empty.unwrap_or(wire.content.is_empty());
        Self {
            content: wire.content,
            total_elements: wire.total_elements,
            total_pages: wire.total_pages,
            number: wire.number,
            size: wire.size,
            first,
            last,
            empty,
        }
    }
}

impl<T> Page<T> {
    pub fn empty(size: u32) -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            total_pages: 0,
            number: 0,
            size,
            first: true,
            last: true,
            empty: true,
        }
    }

    /// Builds page `number` of a result set holding `total_elements` items.
    pub fn slice(content: Vec<T>, number: u32, size: u32, total_elements: u64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            total_elements.div_ceil(u64::from(size)) as u32
        };
        let empty = content.is_empty();
        Self {
            content,
            total_elements,
            total_pages,
            number,
            size,
            first: number == 0,
            last: total_pages == 0 || number + 1 >= total_pages,
            empty,
        }
    }

    pub fn is_consistent(&self) -> bool {
        let fits = self.content.len() <= self.size as usize;
        let empty = self.empty == self.content.is_empty();
        let first = self.first == (self.number == 0);
        let last = self.total_pages == 0 || self.last == (self.number + 1 == self.total_pages);
        fits && empty && first && last
    }

    /// One-based page number for display; zero when there are no pages.
    pub fn display_number(&self) -> u32 {
        if self.total_pages == 0 {
            0
        } else {
            self.number + 1
        }
    }

    pub fn previous_number(&self) -> Option<u32> {
        if self.first {
            None
        } else {
            Some(self.number.saturating_sub(1))
        }
    }

    pub fn next_number(&self) -> Option<u32> {
        if self.last {
            None
        } else {
            Some(self.number + 1)
        }
    }
}
