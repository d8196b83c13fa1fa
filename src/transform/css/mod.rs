//! Style sheet transforms.
//!
//! Text stages ([`ImportInliner`], [`ColorMod`], [`InlineSvg`],
//! [`InlineVars`]) rewrite source text directly. Map-aware stages
//! ([`Autoprefix`], `CssMinify`) go through lightningcss and [`print`].

mod color;
mod import;
mod prefix;
mod svg;
mod vars;

pub use color::ColorMod;
pub use import::ImportInliner;
pub use prefix::Autoprefix;
pub use svg::InlineSvg;
pub use vars::InlineVars;

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;
use serde::{Deserialize, Serialize};

use crate::asset::Asset;
use crate::pipeline::PipelineError;

/// Browser support level for prefixing and syntax lowering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserTargets {
    /// IE 11 and evergreen versions of its era.
    #[default]
    Legacy,
    /// Recent evergreen browsers.
    Modern,
}

/// lightningcss encodes versions as `major << 16 | minor << 8 | patch`.
const fn version(major: u32, minor: u32) -> Option<u32> {
    Some((major << 16) | (minor << 8))
}

impl BrowserTargets {
    pub fn browsers(self) -> Browsers {
        match self {
            Self::Legacy => Browsers {
                ie: version(11, 0),
                edge: version(12, 0),
                chrome: version(49, 0),
                firefox: version(52, 0),
                safari: version(10, 0),
                ios_saf: version(10, 0),
                opera: version(36, 0),
                android: version(4, 4),
                samsung: version(5, 0),
            },
            Self::Modern => Browsers {
                chrome: version(120, 0),
                edge: version(120, 0),
                firefox: version(121, 0),
                safari: version(17, 0),
                ios_saf: version(17, 0),
                opera: version(106, 0),
                samsung: version(23, 0),
                ..Browsers::default()
            },
        }
    }

    pub fn targets(self) -> Targets {
        Targets::from(self.browsers())
    }
}

/// How [`print`] renders a parsed sheet.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Print {
    pub minify: bool,
    pub targets: Targets,
}

/// Printed CSS with its map still editable.
pub(crate) struct Printed {
    pub code: String,
    pub map: Option<SourceMap>,
}

impl Printed {
    /// Code and map JSON.
    pub fn finish(mut self, asset: &Asset) -> Result<(String, Option<String>), PipelineError> {
        let map = match self.map.as_mut() {
            Some(map) => Some(
                map.to_json(None)
                    .map_err(|e| PipelineError::source_parse(asset.source(), e.to_string()))?,
            ),
            None => None,
        };
        Ok((self.code, map))
    }
}

/// Parse, lower for `targets`, and print an asset.
///
/// Returns the printed CSS and, when maps are enabled on the asset, a v3 map
/// with the input embedded as `sourcesContent`.
pub(crate) fn print(asset: &Asset, options: Print) -> Result<(String, Option<String>), PipelineError> {
    render(asset, options)?.finish(asset)
}

pub(crate) fn render(asset: &Asset, options: Print) -> Result<Printed, PipelineError> {
    let text = asset.text()?;
    let filename = crate::utils::path::to_slash(asset.origin_path());
    let parse_error = |message: String| PipelineError::source_parse(asset.source(), message);

    let mut sheet = StyleSheet::parse(
        text,
        ParserOptions {
            filename: filename.clone(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| parse_error(e.to_string()))?;

    sheet
        .minify(MinifyOptions {
            targets: options.targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| parse_error(e.to_string()))?;

    let mut source_map = if asset.maps_enabled() {
        let mut map = SourceMap::new("/");
        map.add_source(&filename);
        map.set_source_content(0, text)
            .map_err(|e| parse_error(e.to_string()))?;
        Some(map)
    } else {
        None
    };

    let printed = sheet
        .to_css(PrinterOptions {
            minify: options.minify,
            targets: options.targets,
            source_map: source_map.as_mut(),
            ..PrinterOptions::default()
        })
        .map_err(|e| parse_error(e.to_string()))?;

    Ok(Printed {
        code: printed.code,
        map: source_map,
    })
}
