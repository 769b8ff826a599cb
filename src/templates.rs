use std::collections::HashMap;

use tera::Tera;

use crate::config::ThemeConfig;
use crate::error::AppError;

/// Map search used by the "Directions" action on facility cards
const DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Initialize the Tera template engine for the configured theme.
///
/// A custom theme's templates win; anything it does not provide comes from
/// the default theme.
pub fn init_templates(theme: &ThemeConfig) -> Result<Tera, AppError> {
    let default_glob = format!(
        "{}/**/*",
        theme.templates_path(crate::config::DEFAULT_THEME).display()
    );

    let mut tera = if theme.is_default() {
        Tera::new(&default_glob)?
    } else {
        let theme_glob = format!("{}/**/*", theme.templates_path(&theme.name).display());
        let mut themed = Tera::new(&theme_glob)?;
        // extend() keeps templates already present, so the theme takes priority
        themed.extend(&Tera::new(&default_glob)?)?;
        tracing::debug!(theme = %theme.name, "Loaded theme templates with default fallback");
        themed
    };

    tera.register_filter("tel_href", tel_href_filter);
    tera.register_filter("directions_url", directions_url_filter);

    Ok(tera)
}

/// Turn a display phone number like "+1-555-0123" into a `tel:` URI.
fn tel_href(phone: &str) -> String {
    let dialable: String = phone
        .chars()
        .enumerate()
        .filter(|(i, c)| c.is_ascii_digit() || (*i == 0 && *c == '+'))
        .map(|(_, c)| c)
        .collect();
    format!("tel:{}", dialable)
}

fn tel_href_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("tel_href filter expects a string"))?;
    Ok(tera::Value::String(tel_href(s)))
}

/// Map search URL for an address
fn directions_url(address: &str) -> String {
    format!("{}{}", DIRECTIONS_BASE_URL, urlencoding::encode(address.trim()))
}

fn directions_url_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("directions_url filter expects a string"))?;
    Ok(tera::Value::String(directions_url(s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tel_href_strips_formatting() {
        assert_eq!(tel_href("+1-555-0123"), "tel:+15550123");
        assert_eq!(tel_href("(555) 0456"), "tel:5550456");
        assert_eq!(tel_href("911"), "tel:911");
    }

    #[test]
    fn test_tel_href_keeps_only_leading_plus() {
        assert_eq!(tel_href("+1+555"), "tel:+1555");
        assert_eq!(tel_href(" +1 555"), "tel:1555");
    }

    #[test]
    fn test_directions_url_encodes_address() {
        assert_eq!(
            directions_url("123 Main Street, Downtown"),
            "https://www.google.com/maps/search/?api=1&query=123%20Main%20Street%2C%20Downtown"
        );
    }

    #[test]
    fn test_filters_reject_non_strings() {
        let args = HashMap::new();
        assert!(tel_href_filter(&tera::Value::Bool(true), &args).is_err());
        assert!(directions_url_filter(&tera::Value::Null, &args).is_err());
    }

    #[test]
    fn test_default_theme_templates_load() {
        let tera = init_templates(&ThemeConfig::default()).unwrap();
        let names: Vec<_> = tera.get_template_names().collect();
        assert!(names.contains(&"landing.html"));
        assert!(names.contains(&"assistant/modal.html"));
    }
}
