//! Configuration section definitions.
//!
//! Each module corresponds to a section in `sluice.toml`:
//!
//! | Module  | TOML Section | Purpose                                  |
//! |---------|--------------|------------------------------------------|
//! | `style` | `[style]`    | Style sheet sources, outputs, targets    |
//! | `docs`  | `[docs]`     | Docs site sources and output             |
//! | `serve` | `[serve]`    | Development server                       |

mod docs;
mod serve;
mod style;

pub use docs::DocsConfig;
pub use serve::ServeConfig;
pub use style::StyleConfig;
