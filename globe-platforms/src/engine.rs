//! Tera rendering of platform entry files.
//!
//! | Platform | Output (relative to location) |
//! |----------|-------------------------------|
//! | expo     | `App.js`                      |
//! | dom      | `App.js`                      |
//! | web      | `src/server.js`, `src/client.js` |

use serde::Serialize;
use tera::Tera;

use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates, baked into the binary via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("expo/App.js", include_str!("templates/expo_app.js.tera")),
    ("dom/App.js", include_str!("templates/dom_app.js.tera")),
    ("web/server.js", include_str!("templates/web_server.js.tera")),
    ("web/client.js", include_str!("templates/web_client.js.tera")),
];

/// Values available to every entry template.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntryContext<'a> {
    pub app_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_server: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_client: Option<&'a str>,
}

/// Renders entry files from the embedded templates. Create once per apply.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TPLS.iter().copied())?;
        Ok(Renderer { tera })
    }

    /// Render template `name` (e.g. `web/server.js`).
    pub fn render(&self, name: &str, ctx: &EntryContext<'_>) -> Result<String, RenderError> {
        let tera_ctx = tera::Context::from_serialize(ctx)?;
        Ok(self.tera.render(name, &tera_ctx)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_new_succeeds() {
        Renderer::new().expect("embedded templates must parse");
    }

    #[test]
    fn app_entry_imports_from_synced_package() {
        let renderer = Renderer::new().unwrap();
        let ctx = EntryContext {
            app_name: "mobile",
            main: Some("src/App.js"),
            ..Default::default()
        };
        let out = renderer.render("expo/App.js", &ctx).unwrap();
        assert!(out.contains("import App from './src-sync/mobile/src/App.js';"));
        assert!(out.contains("export default App;"));
    }

    #[test]
    fn web_entries_use_server_and_client_options() {
        let renderer = Renderer::new().unwrap();
        let ctx = EntryContext {
            app_name: "site",
            main_server: Some("server.js"),
            main_client: Some("client.js"),
            ..Default::default()
        };
        let server = renderer.render("web/server.js", &ctx).unwrap();
        let client = renderer.render("web/client.js", &ctx).unwrap();
        assert!(server.contains("'./sync/site/server.js'"));
        assert!(client.contains("'./sync/site/client.js'"));
        assert!(client.contains("startClient();"));
    }

    #[test]
    fn missing_variable_is_tera_error() {
        let renderer = Renderer::new().unwrap();
        let ctx = EntryContext { app_name: "site", ..Default::default() };
        let err = renderer.render("web/server.js", &ctx).unwrap_err();
        assert!(matches!(err, RenderError::Tera(_)));
    }
}
