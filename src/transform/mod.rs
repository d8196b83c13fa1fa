//! Built-in stages.
//!
//! | Stage              | Input      | Map-aware |
//! |--------------------|------------|-----------|
//! | `ImportInliner`    | css        | no        |
//! | `ColorMod`         | css        | no        |
//! | `InlineSvg`        | css        | no        |
//! | `InlineVars`       | css        | no        |
//! | `Autoprefix`       | css        | yes       |
//! | `CssMinify`        | css        | yes       |
//! | `Transpile`        | js         | yes       |
//! | `JsMinify`         | js         | yes       |
//! | `Include`          | html       | no        |
//! | `HtmlMinify`       | html       | no        |
//! | `Suffix`/`Flatten` | any        | path only |

pub mod css;
pub mod filter;
pub mod html;
pub mod js;
pub mod minify;
pub mod rename;
pub mod sourcemap;

pub use css::{Autoprefix, BrowserTargets, ColorMod, ImportInliner, InlineSvg, InlineVars};
pub use filter::Retain;
pub use html::{HtmlMinify, Include};
pub use js::Transpile;
pub use minify::{CssMinify, JsMinify};
pub use rename::{Flatten, Suffix};
pub use sourcemap::{SourceMapsInit, SourceMapsWrite};
