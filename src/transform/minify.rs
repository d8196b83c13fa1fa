//! Minification for CSS and JavaScript.
//!
//! Uses lightningcss for CSS and oxc for JavaScript. Both emit a source map
//! when maps are enabled on the asset.

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};

use super::css::{BrowserTargets, Print, print};
use super::js::{codegen_output, parse_program};
use crate::asset::Asset;
use crate::pipeline::{PipelineError, Stage};

/// Minify style sheets with lightningcss.
#[derive(Debug, Clone, Copy)]
pub struct CssMinify {
    targets: BrowserTargets,
}

impl CssMinify {
    pub const fn new(targets: BrowserTargets) -> Self {
        Self { targets }
    }
}

impl Stage for CssMinify {
    fn name(&self) -> &str {
        "minification"
    }

    fn apply(&self, mut asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        let (code, map) = print(
            &asset,
            Print {
                minify: true,
                targets: self.targets.targets(),
            },
        )?;
        asset.set_mapped(code, map);
        Ok(vec![asset])
    }
}

/// Minify and mangle scripts with oxc.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsMinify;

impl Stage for JsMinify {
    fn name(&self) -> &str {
        "minification"
    }

    fn apply(&self, mut asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        let allocator = Allocator::default();
        let (code, map) = {
            let mut program = parse_program(&allocator, &asset)?;
            let options = MinifierOptions {
                mangle: Some(MangleOptions::default()),
                compress: Some(CompressOptions::smallest()),
            };
            let ret = Minifier::new(options).minify(&allocator, &mut program);
            let output = Codegen::new()
                .with_options(CodegenOptions {
                    minify: true,
                    comments: CommentOptions::disabled(),
                    source_map_path: asset
                        .maps_enabled()
                        .then(|| asset.origin_path().to_path_buf()),
                    ..CodegenOptions::default()
                })
                .with_scoping(ret.scoping)
                .build(&program);
            codegen_output(output)
        };
        asset.set_mapped(code, map);
        Ok(vec![asset])
    }
}
