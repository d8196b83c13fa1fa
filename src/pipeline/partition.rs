//! Filter/restore routing.
//!
//! A [`Partition`] step keeps the matching assets in the stream and parks the
//! rest in an open-partition record; the restore step for the same partition
//! merges them back. Partitions nest like brackets:
//!
//! ```text
//! split(css) ── pipe.. ── split(min) ── pipe.. ── restore(min) ── restore(css)
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glob::Pattern;

use super::PipelineError;
use crate::asset::Asset;
use crate::utils::path::pattern;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

type Predicate = Arc<dyn Fn(&Asset) -> bool + Send + Sync>;

/// A predicate over assets, usable as a split/restore pair.
///
/// Clones share identity: restoring with a clone closes the original.
#[derive(Clone)]
pub struct Partition {
    id: u64,
    label: Arc<str>,
    predicate: Predicate,
}

impl Partition {
    pub fn new(label: &str, predicate: impl Fn(&Asset) -> bool + Send + Sync + 'static) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            label: Arc::from(label),
            predicate: Arc::new(predicate),
        }
    }

    /// Partition on the asset's logical path matching `glob` (e.g. `**/*.js`).
    pub fn glob(glob: &str) -> Result<Self, glob::PatternError> {
        let compiled = Pattern::new(glob)?;
        Ok(Self::new(glob, move |asset: &Asset| {
            pattern::matches(&compiled, &asset.path)
        }))
    }

    /// Partition on the asset's file extension.
    pub fn extension(ext: &'static str) -> Self {
        Self::new(&format!("*.{ext}"), move |asset: &Asset| {
            asset.path.extension().is_some_and(|e| e == ext)
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matches(&self, asset: &Asset) -> bool {
        (self.predicate)(asset)
    }
}

impl fmt::Debug for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partition")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

struct OpenPartition {
    id: u64,
    label: Arc<str>,
    held: Vec<Asset>,
}

/// The asset stream between pipeline steps, plus its open partitions.
#[derive(Default)]
pub struct Stream {
    pub assets: Vec<Asset>,
    open: Vec<OpenPartition>,
}

impl Stream {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self {
            assets,
            open: Vec::new(),
        }
    }

    /// Keep matching assets in the stream, park the rest.
    pub fn split(&mut self, partition: &Partition) {
        let (matching, held): (Vec<_>, Vec<_>) = std::mem::take(&mut self.assets)
            .into_iter()
            .partition(|asset| partition.matches(asset));

        crate::debug!(
            "pipeline";
            "split `{}`: {} matching, {} held",
            partition.label,
            matching.len(),
            held.len()
        );

        self.assets = matching;
        self.open.push(OpenPartition {
            id: partition.id,
            label: Arc::clone(&partition.label),
            held,
        });
    }

    /// Merge the parked assets of `partition` back, ordered by origin.
    pub fn restore(&mut self, partition: &Partition) -> Result<(), PipelineError> {
        let innermost = match self.open.last() {
            Some(top) if top.id == partition.id => None,
            Some(top) => Some(format!("`{}`", top.label)),
            None => Some("none".to_string()),
        };
        if let Some(innermost) = innermost {
            return Err(PipelineError::PartitionMismatch {
                restoring: partition.label.to_string(),
                innermost,
            });
        }

        if let Some(top) = self.open.pop() {
            self.assets.extend(top.held);
            // Stable: forks of one origin keep their relative order.
            self.assets.sort_by_key(Asset::origin);
        }
        Ok(())
    }

    /// Fail if any partition is still open; `at` names the step reached.
    pub fn ensure_closed(&self, at: &str) -> Result<(), PipelineError> {
        match self.open.last() {
            Some(top) => Err(PipelineError::UnrestoredPartition {
                label: top.label.to_string(),
                at: at.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn into_assets(self) -> Vec<Asset> {
        self.assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(paths: &[&str]) -> Stream {
        #[allow(clippy::cast_possible_truncation)]
        let assets = paths
            .iter()
            .enumerate()
            .map(|(i, p)| Asset::virtual_file(i as u32, *p, ""))
            .collect();
        Stream::new(assets)
    }

    fn paths(s: &Stream) -> Vec<String> {
        s.assets.iter().map(|a| a.path.display().to_string()).collect()
    }

    fn sorted_paths(s: &Stream) -> Vec<String> {
        let mut paths = paths(s);
        paths.sort();
        paths
    }

    #[test]
    fn test_round_trip_preserves_paths() {
        let mut s = stream(&["index.html", "app.js", "style.css", "guide/index.html"]);
        let before = sorted_paths(&s);

        let js = Partition::glob("**/*.js").unwrap();
        s.split(&js);
        assert_eq!(sorted_paths(&s), vec!["app.js"]);
        s.restore(&js).unwrap();

        assert_eq!(sorted_paths(&s), before);
        assert!(s.open.is_empty());
    }

    #[test]
    fn test_restore_orders_by_origin() {
        let mut s = stream(&["a.html", "b.js", "c.html", "d.js"]);
        let html = Partition::extension("html");
        s.split(&html);
        s.restore(&html).unwrap();

        let order = paths(&s);
        assert_eq!(order, vec!["a.html", "b.js", "c.html", "d.js"]);
    }

    #[test]
    fn test_nested_partitions() {
        let mut s = stream(&["a.css", "a.min.css", "b.js"]);
        let css = Partition::extension("css");
        let min = Partition::glob("*.min.css").unwrap();

        s.split(&css);
        s.split(&min);
        assert_eq!(sorted_paths(&s), vec!["a.min.css"]);
        s.restore(&min).unwrap();
        assert_eq!(sorted_paths(&s), vec!["a.css", "a.min.css"]);
        s.restore(&css).unwrap();
        assert_eq!(sorted_paths(&s), vec!["a.css", "a.min.css", "b.js"]);
    }

    #[test]
    fn test_restore_out_of_order_is_mismatch() {
        let mut s = stream(&["a.css", "b.js"]);
        let css = Partition::extension("css");
        let js = Partition::extension("js");
        s.split(&css);
        s.split(&js);

        let err = s.restore(&css).unwrap_err();
        assert!(matches!(err, PipelineError::PartitionMismatch { .. }));
    }

    #[test]
    fn test_restore_without_split_is_mismatch() {
        let mut s = stream(&["a.css"]);
        let err = s.restore(&Partition::extension("css")).unwrap_err();
        assert!(err.to_string().contains("none"));
    }

    #[test]
    fn test_ensure_closed() {
        let mut s = stream(&["a.css"]);
        let css = Partition::extension("css");
        assert!(s.ensure_closed("sink `dist`").is_ok());

        s.split(&css);
        let err = s.ensure_closed("sink `dist`").unwrap_err();
        assert!(matches!(err, PipelineError::UnrestoredPartition { ref label, .. } if label == "*.css"));

        // Clones share identity.
        s.restore(&css.clone()).unwrap();
        assert!(s.ensure_closed("end").is_ok());
    }
}
