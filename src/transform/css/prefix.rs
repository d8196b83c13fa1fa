//! Vendor prefixing.

use crate::asset::Asset;
use crate::pipeline::{PipelineError, Stage};

use super::vars::{inlined_fallbacks, restore_fallbacks};
use super::{BrowserTargets, Print, render};

/// Add vendor prefixes and lower syntax for the configured browsers,
/// keeping the output readable.
///
/// Resolved `var()` copies from [`InlineVars`](super::InlineVars) survive:
/// lightningcss merges them away, so they are put back after printing.
#[derive(Debug, Clone, Copy)]
pub struct Autoprefix {
    targets: BrowserTargets,
}

impl Autoprefix {
    pub const fn new(targets: BrowserTargets) -> Self {
        Self { targets }
    }
}

impl Stage for Autoprefix {
    fn name(&self) -> &str {
        "autoprefixer"
    }

    fn apply(&self, mut asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        let fallbacks = inlined_fallbacks(asset.text()?);
        let mut printed = render(
            &asset,
            Print {
                minify: false,
                targets: self.targets.targets(),
            },
        )?;
        if !fallbacks.is_empty() {
            printed.code = restore_fallbacks(&printed.code, &fallbacks, printed.map.as_mut())
                .map_err(|e| PipelineError::source_parse(asset.source(), e.to_string()))?;
        }
        let (code, map) = printed.finish(&asset)?;
        asset.set_mapped(code, map);
        Ok(vec![asset])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::MapState;
    use crate::transform::css::InlineVars;

    fn prefix(css: &str) -> String {
        let out = Autoprefix::new(BrowserTargets::Legacy)
            .apply(Asset::virtual_file(0, "app.css", css))
            .unwrap();
        String::from_utf8(out[0].content.clone()).unwrap()
    }

    #[test]
    fn test_legacy_adds_prefixes() {
        let out = prefix(".a { user-select: none; }");
        assert!(out.contains("-webkit-user-select"));
        assert!(out.contains("user-select: none"));
    }

    #[test]
    fn test_output_is_not_minified() {
        let out = prefix(".a { color: red; }");
        assert!(out.contains('\n'));
    }

    #[test]
    fn test_custom_properties_survive() {
        let out = prefix(":root { --c: red; }\n.a { color: var(--c); }");
        assert!(out.contains("var(--c)"));
    }

    #[test]
    fn test_inlined_fallback_kept() {
        let css = InlineVars
            .apply(Asset::virtual_file(
                0,
                "app.css",
                ":root { --accent: #0096bf; }\na { color: var(--accent); }",
            ))
            .unwrap();
        let out = prefix(&String::from_utf8(css[0].content.clone()).unwrap());

        let fallback = out.find("color: #0096bf;").unwrap();
        let reference = out.find("color: var(--accent);").unwrap();
        assert!(fallback < reference);
    }

    #[test]
    fn test_var_without_fallback_untouched() {
        let out = prefix(":root { --c: red; }\n.a { color: var(--c); }");
        assert!(!out.contains("color: red;"));
    }

    #[test]
    fn test_fallback_shifts_map_lines() {
        let mut asset = Asset::virtual_file(
            0,
            "app.css",
            ":root { --c: red; }\n.a { color: red; color: var(--c); }\n.b { margin: 0; }\n",
        );
        asset.map = Some(MapState::Pending);
        let out = Autoprefix::new(BrowserTargets::Modern).apply(asset).unwrap();
        let Some(MapState::Ready(json)) = &out[0].map else {
            panic!("no map");
        };
        let code = String::from_utf8(out[0].content.clone()).unwrap();
        let b_line = code.lines().position(|l| l.starts_with(".b")).unwrap() as u32;

        let mut map = parcel_sourcemap::SourceMap::from_json("/", json).unwrap();
        let mapping = map.find_closest_mapping(b_line, 0).unwrap();
        assert_eq!(mapping.original.unwrap().original_line, 2);
    }

    #[test]
    fn test_map_generated_when_enabled() {
        let mut asset = Asset::virtual_file(0, "app.css", ".a { color: red; }");
        asset.map = Some(MapState::Pending);
        let out = Autoprefix::new(BrowserTargets::Modern).apply(asset).unwrap();
        assert!(matches!(out[0].map, Some(MapState::Ready(_))));
    }
}
