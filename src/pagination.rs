//! Splitting long lists into pages and rendering the page links.

use maud::{Markup, html};

/// How lists are split into pages.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page shown when the request does not ask for one.
    pub default_page: u64,
    /// The number of rows on each page.
    pub default_page_size: u64,
    /// The most numbered page links to show at once.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_pages: 5,
        }
    }
}

/// One item in the row of page links below a paged table.
#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

/// The number of pages needed to show `row_count` rows, at least one.
pub fn page_count(row_count: u64, page_size: u64) -> u64 {
    row_count.div_ceil(page_size.max(1)).max(1)
}

/// Work out which page links to show for `curr_page` out of `page_count`.
///
/// A window of up to `max_pages` pages is centred on the current page and
/// slides to stay inside the list. The first and last pages are always
/// reachable, with an ellipsis standing in for any gap.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let page_count = page_count.max(1);
    let curr_page = curr_page.clamp(1, page_count);
    let window = max_pages.clamp(1, page_count);

    let first = curr_page
        .saturating_sub(window / 2)
        .clamp(1, page_count - window + 1);
    let last = first + window - 1;

    let mut indicators = Vec::with_capacity(window as usize + 6);

    if curr_page > 1 {
        indicators.push(PaginationIndicator::BackButton(curr_page - 1));
    }

    if first > 1 {
        indicators.push(PaginationIndicator::Page(1));
    }
    if first > 2 {
        indicators.push(PaginationIndicator::Ellipsis);
    }

    indicators.extend((first..=last).map(|page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    }));

    if last + 1 < page_count {
        indicators.push(PaginationIndicator::Ellipsis);
    }
    if last < page_count {
        indicators.push(PaginationIndicator::Page(page_count));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

/// Render the page links, using `page_url` to build the link for a page.
pub fn pagination_view(
    indicators: &[PaginationIndicator],
    page_url: impl Fn(u64) -> String,
) -> Markup {
    let link_style = "block px-3 py-2 rounded text-blue-600 hover:underline";

    html! {
        nav class="pagination flex justify-center" aria-label="Pages"
        {
            ul class="pagination flex items-center gap-1 p-0 m-0"
            {
                @for indicator in indicators {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(*page)) class=(link_style) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                span
                                    aria-current="page"
                                    class="block px-3 py-2 rounded bg-blue-500 text-white"
                                { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class="px-3 py-2 text-gray-500" { "..." }
                            }
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(*page)) rel="prev" class=(link_style) { "Back" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(*page)) rel="next" class=(link_style) { "Next" }
                            }
                        }
                    }
                }
            }
        }
    }
}
