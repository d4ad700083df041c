/// Number of page links shown before the window starts collapsing runs into an ellipsis.
const MAX_WINDOW: u32 = 7;

/// Reads the `page` parameter of a paginated listing.
///
/// Missing, unparseable or zero values all mean the first page.
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|page| page.trim().parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

/// A single entry in the page navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(u32),
    Ellipsis,
}

impl PageLink {
    pub fn is_ellipsis(&self) -> bool {
        matches!(self, PageLink::Ellipsis)
    }

    /// The page number, or zero for an ellipsis.
    pub fn number(&self) -> u32 {
        match self {
            PageLink::Page(page) => *page,
            PageLink::Ellipsis => 0,
        }
    }
}

/// One page of a larger result set
///
/// # Fields
/// - `search_query` - The encoded search term, prefixed with `?` when present
/// - `filter_query` - The encoded filters, prefixed with `&` when present
/// - `total_items` - Number of items across every page
/// - `current_page` - The 1-based page being displayed
/// - `total_pages` - Number of pages in the result set
/// - `page_size` - Number of items per page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub search_query: String,
    pub filter_query: String,
    pub total_items: u32,
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
}

impl Pagination {
    /// Creates a new `Pagination`.
    ///
    /// The current page is clamped into `1..=total_pages`. With no pages at
    /// all the current page is 1.
    pub fn new(total_items: u32, current_page: u32, total_pages: u32, page_size: u32) -> Self {
        debug_assert!(page_size > 0, "page size must be positive");

        Self {
            search_query: String::new(),
            filter_query: String::new(),
            total_items,
            current_page: current_page.clamp(1, total_pages.max(1)),
            total_pages,
            page_size,
        }
    }

    /// Attaches the encoded search term and filters used to build page links.
    pub fn with_queries(mut self, search_query: &str, filter_query: &str) -> Self {
        self.search_query = if search_query.is_empty() {
            String::new()
        } else {
            format!("?{search_query}")
        };
        self.filter_query = if filter_query.is_empty() {
            String::new()
        } else {
            format!("&{filter_query}")
        };
        self
    }

    /// 1-based index of the first item on this page.
    pub fn start(&self) -> u32 {
        (self.current_page - 1) * self.page_size + 1
    }

    /// 1-based index of the last item on this page.
    pub fn end(&self) -> u32 {
        (self.current_page * self.page_size).min(self.total_items)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn previous_page(&self) -> u32 {
        self.current_page.saturating_sub(1)
    }

    pub fn has_next(&self) -> bool {
        self.total_items > self.current_page * self.page_size
    }

    pub fn next_page(&self) -> u32 {
        self.current_page + 1
    }

    /// The page links to render.
    ///
    /// Short result sets list every page. Longer ones show the first page, the
    /// pages either side of the current one and the last page, with an
    /// ellipsis for each gap.
    pub fn pages(&self) -> Vec<PageLink> {
        if self.total_pages <= MAX_WINDOW {
            return (1..=self.total_pages).map(PageLink::Page).collect();
        }

        let mut pages = Vec::with_capacity(MAX_WINDOW as usize);

        if self.current_page > 1 {
            let prev = self.current_page - 1;

            match prev {
                1 => pages.push(PageLink::Page(1)),
                2 => pages.extend([PageLink::Page(1), PageLink::Page(2)]),
                _ => pages.extend([PageLink::Page(1), PageLink::Ellipsis, PageLink::Page(prev)]),
            }
        }

        pages.push(PageLink::Page(self.current_page));

        if self.current_page < self.total_pages {
            let next = self.current_page + 1;
            let last = self.total_pages;

            if next == last {
                pages.push(PageLink::Page(last));
            } else if next == last - 1 {
                pages.extend([PageLink::Page(next), PageLink::Page(last)]);
            } else {
                pages.extend([PageLink::Page(next), PageLink::Ellipsis, PageLink::Page(last)]);
            }
        }

        pages
    }
}
