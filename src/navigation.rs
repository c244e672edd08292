//! The navigation bar shown at the top of every page, and as a tab bar at the
//! bottom of the screen on small devices.

use maud::{Markup, html};

use crate::endpoints;

/// Where a link is shown on small screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// A tab in the bottom bar.
    Tab,
    /// An item in the "More" menu.
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NavLink {
    url: &'static str,
    title: &'static str,
    placement: Placement,
    admin_only: bool,
}

const NAV_LINKS: [NavLink; 6] = [
    NavLink {
        url: endpoints::DASHBOARD_VIEW,
        title: "Dashboard",
        placement: Placement::Tab,
        admin_only: false,
    },
    NavLink {
        url: endpoints::TRANSACTIONS_VIEW,
        title: "Transactions",
        placement: Placement::Tab,
        admin_only: false,
    },
    NavLink {
        url: endpoints::CATEGORIES_VIEW,
        title: "Categories",
        placement: Placement::Tab,
        admin_only: false,
    },
    NavLink {
        url: endpoints::EXPORT_VIEW,
        title: "Export Data",
        placement: Placement::Overflow,
        admin_only: false,
    },
    NavLink {
        url: endpoints::USERS_VIEW,
        title: "Users",
        placement: Placement::Overflow,
        admin_only: true,
    },
    NavLink {
        url: endpoints::LOG_OUT,
        title: "Log out",
        placement: Placement::Overflow,
        admin_only: false,
    },
];

/// Whether `page` is `section` or one of the pages under it, e.g.
/// "/categories/new" is under "/categories".
fn is_within(page: &str, section: &str) -> bool {
    page.strip_prefix(section)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

const DESKTOP_CURRENT: &str = "block py-2 px-3 text-white bg-blue-700 rounded-sm \
    lg:bg-transparent lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500";
const DESKTOP_IDLE: &str = "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100 \
    lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0 dark:text-white \
    lg:dark:hover:text-blue-500 dark:hover:bg-gray-700 lg:dark:hover:bg-transparent";

const TAB_BASE: &str = "flex w-full min-w-0 items-center justify-center rounded-lg \
    px-2.5 py-2 text-xs font-semibold leading-tight sm:px-4 sm:text-sm";
const TAB_CURRENT: &str =
    "bg-blue-50 text-blue-700 shadow-sm dark:bg-blue-900/30 dark:text-blue-200";
const TAB_IDLE: &str = "text-gray-600 hover:bg-blue-50/70 hover:text-blue-700 \
    dark:text-gray-300 dark:hover:bg-blue-900/20 dark:hover:text-blue-200";

const MENU_ITEM_CURRENT: &str =
    "block rounded-lg bg-blue-50 px-3 py-2 text-blue-700 dark:bg-blue-900/30 dark:text-blue-200";
const MENU_ITEM_IDLE: &str = "block rounded-lg px-3 py-2 text-gray-700 hover:bg-gray-100 \
    hover:text-blue-700 dark:text-gray-200 dark:hover:bg-gray-800/80 dark:hover:text-blue-200";

fn tab_class(is_current: bool) -> String {
    let state = if is_current { TAB_CURRENT } else { TAB_IDLE };
    format!("{TAB_BASE} {state}")
}

/// The links the current user can see, with the link for the current section
/// marked.
pub struct NavBar {
    links: Vec<(NavLink, bool)>,
}

impl NavBar {
    /// Build the navigation bar for the page at `active_endpoint`.
    ///
    /// The users page is only linked for admins.
    pub fn new(active_endpoint: &str, is_admin: bool) -> Self {
        let links = NAV_LINKS
            .into_iter()
            .filter(|link| is_admin || !link.admin_only)
            .map(|link| {
                let is_current = link.url != endpoints::LOG_OUT && is_within(active_endpoint, link.url);
                (link, is_current)
            })
            .collect();

        Self { links }
    }

    fn placed(&self, placement: Placement) -> impl Iterator<Item = &(NavLink, bool)> {
        self.links
            .iter()
            .filter(move |(link, _)| link.placement == placement)
    }

    pub fn into_html(self) -> Markup {
        let overflow_is_current = self
            .placed(Placement::Overflow)
            .any(|(_, is_current)| *is_current);

        // Layout adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a href=(endpoints::ROOT) class="flex items-center space-x-3 rtl:space-x-reverse"
                    {
                        img src="/static/favicon-128x128.png" alt="Family Finance Logo" class="h-8";

                        span class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Family Finance"
                        }
                    }

                    div class="hidden w-full lg:block lg:w-auto"
                    {
                        ul
                            class="font-medium flex flex-col p-4 lg:p-0 mt-4 border
                            border-gray-100 rounded bg-gray-50 lg:flex-row lg:space-x-8
                            lg:mt-0 lg:border-0 lg:bg-white dark:bg-gray-800
                            lg:dark:bg-gray-900 dark:border-gray-700"
                        {
                            @for (link, is_current) in &self.links {
                                li {
                                    a
                                        href=(link.url)
                                        class=(if *is_current { DESKTOP_CURRENT } else { DESKTOP_IDLE })
                                        aria-current=[is_current.then_some("page")]
                                    { (link.title) }
                                }
                            }
                        }
                    }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden"
            {
                div class="mx-auto max-w-screen-xl px-4 pb-4"
                {
                    ul
                        class="grid grid-cols-4 gap-2 px-4 py-3 rounded-xl border
                        border-gray-200 bg-white/95 shadow-lg backdrop-blur
                        dark:border-gray-700 dark:bg-gray-900/95"
                        aria-label="Primary"
                    {
                        @for (link, is_current) in self.placed(Placement::Tab) {
                            li class="min-w-0" {
                                a
                                    href=(link.url)
                                    class=(tab_class(*is_current))
                                    aria-current=[is_current.then_some("page")]
                                {
                                    span class="truncate" { (link.title) }
                                }
                            }
                        }

                        li class="min-w-0" {
                            details class="group relative"
                            {
                                summary
                                    class={
                                        "list-none [&::-webkit-details-marker]:hidden cursor-pointer "
                                        (tab_class(overflow_is_current))
                                    }
                                    aria-current=[overflow_is_current.then_some("page")]
                                {
                                    span class="truncate" { "More" }
                                }

                                ul
                                    class="absolute bottom-full right-0 mb-3 w-40 flex flex-col
                                    gap-1 rounded-xl border border-gray-200 bg-white/95 p-2
                                    text-sm font-medium shadow-xl backdrop-blur
                                    dark:border-gray-700 dark:bg-gray-900/95"
                                {
                                    @for (link, is_current) in self.placed(Placement::Overflow) {
                                        li {
                                            a
                                                href=(link.url)
                                                class=(if *is_current { MENU_ITEM_CURRENT } else { MENU_ITEM_IDLE })
                                                aria-current=[is_current.then_some("page")]
                                            { (link.title) }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use scraper::{Html, Selector};

    use crate::endpoints;

    use super::NavBar;

    fn current_links(nav_bar: &NavBar) -> Vec<&'static str> {
        nav_bar
            .links
            .iter()
            .filter(|(_, is_current)| *is_current)
            .map(|(link, _)| link.url)
            .collect()
    }

    #[test]
    fn marks_section_of_active_page() {
        let cases = [
            (endpoints::DASHBOARD_VIEW, vec![endpoints::DASHBOARD_VIEW]),
            (endpoints::TRANSACTIONS_VIEW, vec![endpoints::TRANSACTIONS_VIEW]),
            (endpoints::NEW_TRANSACTION_VIEW, vec![endpoints::TRANSACTIONS_VIEW]),
            (endpoints::NEW_CATEGORY_VIEW, vec![endpoints::CATEGORIES_VIEW]),
            (endpoints::EXPORT_VIEW, vec![endpoints::EXPORT_VIEW]),
            (endpoints::NEW_USER_VIEW, vec![endpoints::USERS_VIEW]),
        ];

        for (page, want) in cases {
            let nav_bar = NavBar::new(page, true);

            assert_eq!(current_links(&nav_bar), want, "active links for {page}");
        }
    }

    #[test]
    fn pages_outside_nav_mark_nothing() {
        for page in [
            endpoints::ROOT,
            endpoints::LOG_IN_VIEW,
            endpoints::LOG_OUT,
            endpoints::INTERNAL_ERROR_VIEW,
            endpoints::TRANSACTIONS_API,
            "/dashboardish",
        ] {
            let nav_bar = NavBar::new(page, true);

            assert!(current_links(&nav_bar).is_empty(), "{page} marked a link");
        }
    }

    #[test]
    fn users_link_only_shown_to_admins() {
        let has_users_link = |nav_bar: NavBar| {
            nav_bar
                .links
                .iter()
                .any(|(link, _)| link.url == endpoints::USERS_VIEW)
        };

        assert!(has_users_link(NavBar::new(endpoints::DASHBOARD_VIEW, true)));
        assert!(!has_users_link(NavBar::new(endpoints::DASHBOARD_VIEW, false)));
    }

    #[test]
    fn more_menu_is_current_on_export_page() {
        let html = Html::parse_fragment(
            &NavBar::new(endpoints::EXPORT_VIEW, false)
                .into_html()
                .into_string(),
        );
        let summary = Selector::parse("summary[aria-current=page]").unwrap();

        assert_eq!(html.select(&summary).count(), 1);
    }
}
