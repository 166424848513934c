//! Field naming conventions shared by editing and display

/// Substrings that mark a field as holding an uploaded-asset path
const ASSET_MARKERS: [&str; 3] = ["image", "icon", "photo"];

/// Prefix of paths produced by the asset uploader
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// Whether a field or sub-field name refers to an uploaded asset
///
/// Case-insensitive containment of `image`, `icon` or `photo`.
pub fn is_asset_field(name: &str) -> bool {
    let lower = name.to_lowercase();
    ASSET_MARKERS.iter().any(|m| lower.contains(m))
}

/// Whether a text value points into the upload directory
pub fn is_asset_value(value: &str) -> bool {
    value.starts_with(UPLOADS_PREFIX)
}

/// Reduce a user-typed field name to ASCII alphanumerics
pub fn sanitize_field_name(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Display label for a camelCase field name: `heroImage` -> `hero Image`
pub fn humanize_field_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push(' ');
        }
        out.push(c);
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_field_markers() {
        assert!(is_asset_field("heroImage"));
        assert!(is_asset_field("ICON"));
        assert!(is_asset_field("teamPhotoUrl"));
        assert!(is_asset_field("item3Image"));
        assert!(!is_asset_field("title"));
        assert!(!is_asset_field("imagination")); // contains "imag" but not "image"
    }

    #[test]
    fn test_asset_value() {
        assert!(is_asset_value("/uploads/1700000000-logo.png"));
        assert!(!is_asset_value("uploads/logo.png"));
    }

    #[test]
    fn test_sanitize_field_name() {
        assert_eq!(sanitize_field_name("hero Image!"), "heroImage");
        assert_eq!(sanitize_field_name("../x_y-z"), "xyz");
        assert_eq!(sanitize_field_name("ÿes"), "es");
    }

    #[test]
    fn test_humanize_field_name() {
        assert_eq!(humanize_field_name("heroImage"), "hero Image");
        assert_eq!(humanize_field_name("Title"), "Title");
        assert_eq!(humanize_field_name("item3Image"), "item3 Image");
    }
}
