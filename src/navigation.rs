use std::collections::HashSet;

use crate::config::TabConfig;
use crate::error::NavigationError;
use crate::filter::CategoryFilter;

static ALL: CategoryFilter = CategoryFilter::All;

#[derive(Debug, Clone, PartialEq)]
pub enum TabKind {
    Filter(CategoryFilter),
    /// Regular link, not handled by the card list
    Link(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub key: String,
    pub label: String,
    pub kind: TabKind,
}

impl Tab {
    pub fn href(&self) -> String {
        match self.kind {
            TabKind::Filter(_) => format!("/tab/{}/", self.key),
            TabKind::Link(ref link) => link.clone(),
        }
    }
}

/// Which tab is active. Only filter tabs can be.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavState {
    active: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabLink {
    pub key: String,
    pub label: String,
    pub href: String,
    pub active: bool,
}

pub struct Navigation {
    tabs: Vec<Tab>,
    initial: usize,
}

impl Navigation {
    pub fn from_config(tabs: &[TabConfig]) -> Result<Navigation, NavigationError> {
        let mut keys = HashSet::new();
        let mut nav_tabs = Vec::with_capacity(tabs.len());

        for tab in tabs {
            if !keys.insert(tab.key.as_str()) {
                return Err(NavigationError::DuplicatedKey(tab.key.clone()));
            }

            let kind = match (&tab.category, &tab.link) {
                (Some(_), Some(_)) => return Err(NavigationError::AmbiguousTab(tab.key.clone())),
                (Some(category), None) => TabKind::Filter(CategoryFilter::Only(category.clone())),
                (None, Some(link)) => TabKind::Link(link.clone()),
                (None, None) => TabKind::Filter(CategoryFilter::All),
            };

            nav_tabs.push(Tab {
                key: tab.key.clone(),
                label: tab.label.clone(),
                kind,
            });
        }

        let initial = nav_tabs.iter()
            .position(|tab| matches!(tab.kind, TabKind::Filter(_)))
            .ok_or(NavigationError::NoFilterTab)?;

        Ok(Navigation { tabs: nav_tabs, initial })
    }

    /// First filter tab
    pub fn initial(&self) -> NavState {
        NavState { active: self.initial }
    }

    /// Activates the filter tab named `key`. Link tabs and unknown keys give `None`.
    pub fn activate(&self, key: &str) -> Option<NavState> {
        self.tabs.iter()
            .position(|tab| tab.key == key && matches!(tab.kind, TabKind::Filter(_)))
            .map(|active| NavState { active })
    }

    pub fn active_tab(&self, state: NavState) -> &Tab {
        &self.tabs[state.active]
    }

    pub fn filter(&self, state: NavState) -> &CategoryFilter {
        match self.active_tab(state).kind {
            TabKind::Filter(ref filter) => filter,
            // NavState only points to filter tabs
            TabKind::Link(_) => &ALL,
        }
    }

    /// Filter tab listing `category`, falling back to the initial tab.
    pub fn state_for_category(&self, category: &str) -> NavState {
        self.tabs.iter()
            .position(|tab| match tab.kind {
                TabKind::Filter(CategoryFilter::Only(ref c)) => c == category,
                _ => false,
            })
            .map(|active| NavState { active })
            .unwrap_or_else(|| self.initial())
    }

    pub fn tab_links(&self, state: NavState) -> Vec<TabLink> {
        self.tabs.iter()
            .enumerate()
            .map(|(i, tab)| TabLink {
                key: tab.key.clone(),
                label: tab.label.clone(),
                href: tab.href(),
                active: i == state.active,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(key: &str, category: Option<&str>, link: Option<&str>) -> TabConfig {
        TabConfig {
            key: key.to_string(),
            label: key.to_uppercase(),
            category: category.map(str::to_string),
            link: link.map(str::to_string),
        }
    }

    fn navigation() -> Navigation {
        Navigation::from_config(&[
            tab("about", None, Some("/public/about.html")),
            tab("blog", Some("博客"), None),
            tab("works", Some("作品集"), None),
            tab("all", None, None),
        ]).unwrap()
    }

    #[test]
    fn test_initial_is_first_filter_tab() {
        let nav = navigation();
        let state = nav.initial();
        assert_eq!(nav.active_tab(state).key, "blog");
        assert_eq!(nav.filter(state), &CategoryFilter::Only("博客".to_string()));
    }

    #[test]
    fn test_activate() {
        let nav = navigation();
        let state = nav.activate("works").unwrap();
        let links = nav.tab_links(state);
        let active: Vec<_> = links.iter().filter(|l| l.active).map(|l| l.key.as_str()).collect();
        assert_eq!(active, ["works"]);
        assert_eq!(links[0].href, "/public/about.html");
        assert_eq!(links[2].href, "/tab/works/");

        let state = nav.activate("all").unwrap();
        assert_eq!(nav.filter(state), &CategoryFilter::All);
    }

    #[test]
    fn test_activate_link_or_unknown() {
        let nav = navigation();
        assert!(nav.activate("about").is_none());
        assert!(nav.activate("missing").is_none());
    }

    #[test]
    fn test_state_for_category() {
        let nav = navigation();
        assert_eq!(nav.active_tab(nav.state_for_category("作品集")).key, "works");
        assert_eq!(nav.active_tab(nav.state_for_category("other")).key, "blog");
    }

    #[test]
    fn test_invalid_tabs() {
        assert_eq!(
            Navigation::from_config(&[tab("about", None, Some("/a"))]).err(),
            Some(NavigationError::NoFilterTab));
        assert_eq!(
            Navigation::from_config(&[tab("a", None, None), tab("a", None, None)]).err(),
            Some(NavigationError::DuplicatedKey("a".to_string())));
        assert_eq!(
            Navigation::from_config(&[tab("a", Some("x"), Some("/a"))]).err(),
            Some(NavigationError::AmbiguousTab("a".to_string())));
    }
}
