//! Embedded static resources.
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Dev server resources (livereload.js)
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{LIVERELOAD_JS, LivereloadVars};
//!
//! let js = LIVERELOAD_JS.render(&LivereloadVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL path the dev server answers with the live reload client.
    pub const LIVERELOAD_PATH: &str = "/__sluice/livereload.js";

    /// Variables for livereload.js.
    pub struct LivereloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for LivereloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__SLUICE_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Live reload client with WebSocket port injection.
    pub const LIVERELOAD_JS: Template<LivereloadVars> =
        Template::new(include_str!("serve/livereload.js"));

    /// `<script>` tag loading the client, injected into served HTML.
    pub fn script_tag() -> String {
        format!(r#"<script src="{LIVERELOAD_PATH}" defer></script>"#)
    }
}

#[cfg(test)]
mod tests {
    use super::serve::*;

    #[test]
    fn test_livereload_port_injection() {
        let js = LIVERELOAD_JS.render(&LivereloadVars { ws_port: 35730 });
        assert!(js.contains("var port = 35730;"));
        assert!(!js.contains("__SLUICE_WS_PORT__"));
        assert!(LIVERELOAD_JS.content().contains("__SLUICE_WS_PORT__"));
    }

    #[test]
    fn test_script_tag() {
        assert_eq!(
            script_tag(),
            r#"<script src="/__sluice/livereload.js" defer></script>"#
        );
    }
}
