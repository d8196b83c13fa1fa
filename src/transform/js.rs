//! Script transpilation.

use oxc::allocator::Allocator;
use oxc::ast::ast::Program;
use oxc::codegen::{Codegen, CodegenOptions, CodegenReturn};
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{TransformOptions, Transformer};

use crate::asset::Asset;
use crate::pipeline::{PipelineError, Stage};

/// Parse an asset as an ES module.
pub(crate) fn parse_program<'a>(
    allocator: &'a Allocator,
    asset: &'a Asset,
) -> Result<Program<'a>, PipelineError> {
    let ret = Parser::new(allocator, asset.text()?, SourceType::mjs()).parse();
    if let Some(error) = ret.errors.first() {
        return Err(PipelineError::source_parse(asset.source(), error.to_string()));
    }
    Ok(ret.program)
}

pub(crate) fn codegen_output(output: CodegenReturn) -> (String, Option<String>) {
    (output.code, output.map.map(|map| map.to_json_string()))
}

/// Lower modern syntax to an ECMAScript target such as `es2015`.
#[derive(Debug, Clone)]
pub struct Transpile {
    target: String,
}

impl Transpile {
    /// Fails on targets oxc does not know.
    pub fn new(target: &str) -> Result<Self, String> {
        TransformOptions::from_target(target).map_err(|e| e.to_string())?;
        Ok(Self {
            target: target.to_string(),
        })
    }
}

impl Stage for Transpile {
    fn name(&self) -> &str {
        "transpile"
    }

    fn apply(&self, mut asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        let options = TransformOptions::from_target(&self.target)
            .map_err(|e| PipelineError::source_parse(asset.source(), e.to_string()))?;

        let allocator = Allocator::default();
        let (code, map) = {
            let mut program = parse_program(&allocator, &asset)?;
            let scoping = SemanticBuilder::new().build(&program).semantic.into_scoping();

            let ret = Transformer::new(&allocator, asset.origin_path(), &options)
                .build_with_scoping(scoping, &mut program);
            if let Some(error) = ret.errors.first() {
                return Err(PipelineError::source_parse(asset.source(), error.to_string()));
            }

            let output = Codegen::new()
                .with_options(CodegenOptions {
                    source_map_path: asset
                        .maps_enabled()
                        .then(|| asset.origin_path().to_path_buf()),
                    ..CodegenOptions::default()
                })
                .build(&program);
            codegen_output(output)
        };

        asset.set_mapped(code, map);
        Ok(vec![asset])
    }
}
