//! Fallback static file serving for themes.
//!
//! The active theme's static directory is tried first; files it does not
//! provide are served from the default theme.

use tower_http::services::ServeDir;

use crate::config::{ThemeConfig, DEFAULT_THEME};

/// Create a static file service with theme fallback.
pub fn create_static_service(theme: &ThemeConfig) -> ServeDir<ServeDir> {
    let default_static = theme.static_path(DEFAULT_THEME);

    if theme.is_default() {
        // Same directory twice keeps the return type uniform
        ServeDir::new(&default_static).fallback(ServeDir::new(&default_static))
    } else {
        let theme_static = theme.static_path(&theme.name);
        ServeDir::new(theme_static).fallback(ServeDir::new(default_static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_custom_theme_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let default_css = dir.path().join("default/static/css");
        std::fs::create_dir_all(&default_css).unwrap();
        std::fs::write(default_css.join("style.css"), "body{}").unwrap();
        std::fs::create_dir_all(dir.path().join("night/static")).unwrap();

        let theme = ThemeConfig {
            name: "night".to_string(),
            themes_dir: dir.path().to_string_lossy().into_owned(),
        };
        let service = create_static_service(&theme);

        let response = service
            .oneshot(Request::get("/css/style.css").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let theme = ThemeConfig {
            name: "default".to_string(),
            themes_dir: dir.path().to_string_lossy().into_owned(),
        };
        let response = create_static_service(&theme)
            .oneshot(Request::get("/js/missing.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
