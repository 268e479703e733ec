//! This file defines the templates and a convenience function for creating the navigation bar.

use maud::{Markup, html};

use crate::{endpoints, i18n::Language};

/// Template for a link in the navigation bar.
///
/// It will change appearance if `is_current` is set to
/// `true`. Only one link should be set as active at any one time.
#[derive(Clone)]
struct Link {
    url: &'static str,
    title: &'static str,
    is_current: bool,
}

pub struct NavBar {
    links: Vec<Link>,
    language: Language,
}

impl NavBar {
    /// Get the navigation bar.
    ///
    /// If a link matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML. The users link
    /// is only shown to admins.
    pub fn new(active_endpoint: &str, language: Language, is_admin: bool) -> NavBar {
        let mut pages = vec![
            (endpoints::CATEGORIES_VIEW, "inventory"),
            (endpoints::ADVISOR_VIEW, "advisor"),
            (endpoints::SETTINGS_VIEW, "appearance"),
        ];
        if is_admin {
            pages.push((endpoints::USERS_VIEW, "admin"));
        }

        let mut links = pages
            .into_iter()
            .map(|(url, title_key)| Link {
                url,
                title: language.translate(title_key),
                is_current: active_endpoint == url,
            })
            .collect::<Vec<_>>();
        links.push(Link {
            url: endpoints::LOG_OUT,
            title: language.translate("logout"),
            is_current: false,
        });

        NavBar { links, language }
    }

    pub fn into_html(self) -> Markup {
        let link_class = |is_current: bool| -> &'static str {
            if is_current {
                "nav-link nav-link-current"
            } else {
                "nav-link"
            }
        };

        html!(
            nav class="nav-bar"
            {
                a href=(endpoints::CATEGORIES_VIEW) class="nav-brand"
                {
                    span aria-hidden="true" { "💄" }
                    span { (self.language.translate("app_name")) }
                }

                ul class="nav-links"
                {
                    @for link in &self.links {
                        li
                        {
                            a
                                href=(link.url)
                                class=(link_class(link.is_current))
                                aria-current=[link.is_current.then_some("page")]
                            {
                                (link.title)
                            }
                        }
                    }
                }
            }
        )
    }
}
