//! Test data factories for content records

use gitcms::content::{ContentItem, ContentRecord};

/// Home page record in the shape the editor produces
pub fn home_record() -> ContentRecord {
    ContentRecord::new()
        .with("heroTitle", "Build faster")
        .with("heroSubtitle", "Content that ships with your code")
        .with("heroImage", "/uploads/1700000000-hero.png")
        .with(
            "features",
            vec![
                ContentItem::new()
                    .with("title", "Typed")
                    .with("icon", "/uploads/1700000001-type.svg"),
                ContentItem::new()
                    .with("title", "Reviewed")
                    .with("icon", "/uploads/1700000002-check.svg"),
            ],
        )
}

/// Minimal record with a single title
pub fn titled(title: &str) -> ContentRecord {
    ContentRecord::new().with("title", title)
}
