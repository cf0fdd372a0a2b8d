//! Top navigation bar.
//!
//! One dropdown per category, one entry per sub-category that has an
//! introduction document. The dropdown entry links straight to that
//! introduction page, so sub-categories without one are left out.

use crate::config::NavbarConfig;
use crate::scan::ContentTree;
use crate::types::{NavItem, absolute_link};

pub fn build_navbar(tree: &ContentTree, config: &NavbarConfig) -> Vec<NavItem> {
    let mut nav = Vec::with_capacity(tree.categories.len() + 1);

    if let Some(home) = config.home_text.as_deref().filter(|t| !t.is_empty()) {
        nav.push(NavItem::link(home, config.home_link.as_str()));
    }

    for category in &tree.categories {
        let items = category
            .subdirectories()
            .filter_map(|sub| {
                let intro = sub.introduction_document()?;
                let link = absolute_link(&[
                    tree.root_name.as_str(),
                    category.slug.as_str(),
                    sub.slug.as_str(),
                    intro.url.as_str(),
                ]);
                Some(NavItem::link(sub.label.as_str(), link))
            })
            .collect();

        nav.push(NavItem {
            text: category.label.clone(),
            link: None,
            items,
        });
    }

    nav
}
