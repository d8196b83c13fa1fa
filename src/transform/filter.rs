//! Drop filters.

use glob::Pattern;

use crate::asset::Asset;
use crate::pipeline::{PipelineError, Stage};
use crate::utils::path::pattern;

/// Keep only assets whose logical path matches a glob; drop the rest.
#[derive(Debug, Clone)]
pub struct Retain {
    name: String,
    pattern: Pattern,
}

impl Retain {
    pub fn glob(glob: &str) -> Result<Self, glob::PatternError> {
        Ok(Self {
            name: format!("retain {glob}"),
            pattern: Pattern::new(glob)?,
        })
    }

    /// `**/*.css`: removes map companions from the stream.
    pub fn css() -> Self {
        Self {
            name: "retain **/*.css".to_string(),
            pattern: Pattern::new("**/*.css").unwrap_or_default(),
        }
    }
}

impl Stage for Retain {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        if pattern::matches(&self.pattern, &asset.path) {
            Ok(vec![asset])
        } else {
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retain_css_drops_maps() {
        let retain = Retain::css();
        assert_eq!(retain.apply(Asset::virtual_file(0, "app.css", "")).unwrap().len(), 1);
        assert!(retain.apply(Asset::virtual_file(0, "app.css.map", "")).unwrap().is_empty());
    }

    #[test]
    fn test_retain_glob_nested() {
        let retain = Retain::glob("**/*.js").unwrap();
        assert_eq!(retain.apply(Asset::virtual_file(0, "a/b/c.js", "")).unwrap().len(), 1);
        assert_eq!(retain.apply(Asset::virtual_file(0, "c.js", "")).unwrap().len(), 1);
    }
}
