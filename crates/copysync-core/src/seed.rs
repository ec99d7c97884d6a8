//! Sample pages written for a user who has none yet

use chrono::{DateTime, Utc};

use crate::models::{CopyItem, Page};

/// The sample page set: a mix of synced, modified and new items
pub fn sample_pages() -> Vec<Page> {
    vec![
        page(
            "1",
            "Home Page",
            "home.json",
            "2025-11-18T10:30:00Z",
            &[
                ("1-1", "hero.title", "Welcome to Our Amazing Product", "Welcome to Our Product"),
                (
                    "1-2",
                    "hero.subtitle",
                    "The best solution for your business needs",
                    "The best solution for your business needs",
                ),
                ("1-3", "cta.primary", "Get Started Free", "Get Started"),
                ("1-4", "features.title", "Powerful Features", ""),
            ],
        ),
        page(
            "2",
            "Pricing Page",
            "pricing.json",
            "2025-11-17T15:20:00Z",
            &[
                (
                    "2-1",
                    "pricing.title",
                    "Simple, Transparent Pricing",
                    "Simple, Transparent Pricing",
                ),
                (
                    "2-2",
                    "pricing.subtitle",
                    "Choose the plan that works for you",
                    "Choose the right plan for your team",
                ),
                ("2-3", "plan.starter.name", "Starter Plan", "Starter"),
            ],
        ),
        page(
            "3",
            "About Page",
            "about.json",
            "2025-11-16T09:15:00Z",
            &[
                ("3-1", "about.title", "About Our Company", "About Our Company"),
                (
                    "3-2",
                    "about.mission",
                    "Our mission is to empower teams worldwide",
                    "Our mission is to empower teams worldwide",
                ),
            ],
        ),
    ]
}

fn page(
    id: &str,
    name: &str,
    path: &str,
    synced_at: &str,
    items: &[(&str, &str, &str, &str)],
) -> Page {
    let synced_at = timestamp(synced_at);
    let mut page = Page::with_id(id, name, path);
    page.last_synced_at = synced_at;
    for (item_id, key, edited, synced) in items {
        let mut item = CopyItem::with_id(*item_id, *key, *edited);
        if !synced.is_empty() {
            item.synced_text = synced.to_string();
            item.last_synced_at = synced_at;
        }
        page.add_item(item);
    }
    page
}

fn timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
