//! Admin navigation map
//!
//! Booting a module adds `{title, module: true}` under its plural name.
//! Renderers read primary links from the map and ask for the secondary
//! links of whichever primary link is active for the current path.

use parking_lot::RwLock;
use serde::Serialize;

/// One navigation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationLink {
    /// Map key (`events`)
    pub key: String,
    /// Label
    pub title: String,
    /// Target path
    pub href: String,
    /// Whether the entry points at a module
    pub module: bool,
    /// Secondary links
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavigationLink>,
}

impl NavigationLink {
    /// Link to a path
    #[must_use]
    pub fn new(key: impl Into<String>, title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            href: href.into(),
            module: false,
            children: Vec::new(),
        }
    }

    /// Whether `path` is this link's target or lies below it
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let href = self.href.trim_end_matches('/');
        let path = path.trim_end_matches('/');
        path == href || path.starts_with(&format!("{href}/"))
    }
}

/// Insertion-ordered navigation map
#[derive(Debug, Default)]
pub struct Navigation {
    links: RwLock<Vec<NavigationLink>>,
}

impl Navigation {
    /// Empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a primary entry, replacing one with the same key in place
    ///
    /// Children of a replaced entry are kept.
    pub fn set(&self, link: NavigationLink) {
        let mut links = self.links.write();
        if let Some(existing) = links.iter_mut().find(|l| l.key == link.key) {
            let children = std::mem::take(&mut existing.children);
            *existing = link;
            if existing.children.is_empty() {
                existing.children = children;
            }
        } else {
            links.push(link);
        }
    }

    /// Record a booted module
    pub fn register_module(&self, key: &str, title: &str, href: &str) {
        let mut link = NavigationLink::new(key, title, href);
        link.module = true;
        self.set(link);
    }

    /// Add a secondary link under a primary entry
    ///
    /// Returns `false` when the parent does not exist.
    pub fn add_child(&self, parent: &str, child: NavigationLink) -> bool {
        let mut links = self.links.write();
        let Some(parent) = links.iter_mut().find(|l| l.key == parent) else {
            return false;
        };
        parent.children.push(child);
        true
    }

    /// Entry by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<NavigationLink> {
        self.links.read().iter().find(|l| l.key == key).cloned()
    }

    /// Primary links in insertion order
    #[must_use]
    pub fn links(&self) -> Vec<NavigationLink> {
        self.links.read().clone()
    }

    /// Primary link for the current path; the most specific match wins
    #[must_use]
    pub fn active_primary_link(&self, path: &str) -> Option<NavigationLink> {
        self.links
            .read()
            .iter()
            .filter(|l| l.matches(path))
            .max_by_key(|l| l.href.trim_end_matches('/').len())
            .cloned()
    }

    /// Secondary links of the active primary link, or none
    #[must_use]
    pub fn secondary_links(&self, path: &str) -> Vec<NavigationLink> {
        self.active_primary_link(path)
            .map(|link| link.children)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn navigation() -> Navigation {
        let navigation = Navigation::new();
        navigation.register_module("events", "Events", "/admin/events/");
        navigation.register_module("venues", "Venues", "/admin/venues/");
        navigation
    }

    #[test]
    fn test_module_entries() {
        let navigation = navigation();
        let events = navigation.get("events").unwrap();
        assert_eq!(events.title, "Events");
        assert!(events.module);
        assert_eq!(navigation.links().len(), 2);
    }

    #[test]
    fn test_active_primary_link() {
        let navigation = navigation();
        let active = navigation.active_primary_link("/admin/events/3/edit").unwrap();
        assert_eq!(active.key, "events");
        assert_eq!(
            navigation.active_primary_link("/admin/events").unwrap().key,
            "events"
        );
        assert!(navigation.active_primary_link("/admin/eventsx").is_none());
        assert!(navigation.active_primary_link("/elsewhere").is_none());
    }

    #[test]
    fn test_secondary_links() {
        let navigation = navigation();
        assert!(navigation.add_child(
            "events",
            NavigationLink::new("archive", "Archive", "/admin/events/archive")
        ));
        assert!(!navigation.add_child("missing", NavigationLink::new("x", "X", "/x")));

        let secondary = navigation.secondary_links("/admin/events/");
        assert_eq!(secondary.len(), 1);
        assert_eq!(secondary[0].title, "Archive");

        assert!(navigation.secondary_links("/admin/venues/").is_empty());
        assert!(navigation.secondary_links("/nowhere").is_empty());
    }

    #[test]
    fn test_rebooting_keeps_children() {
        let navigation = navigation();
        navigation.add_child("events", NavigationLink::new("archive", "Archive", "/a"));
        navigation.register_module("events", "Events", "/admin/events/");
        assert_eq!(navigation.get("events").unwrap().children.len(), 1);
        assert_eq!(navigation.links().len(), 2);
    }
}
