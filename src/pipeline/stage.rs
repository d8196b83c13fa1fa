//! The `Stage` trait and closure adapters.

use crate::asset::Asset;

use super::PipelineError;

/// A named transform `Asset -> [Asset]`.
///
/// Zero outputs drop the asset, one transforms it, several fork it.
/// Stages hold no per-run state and may be applied to many assets in parallel.
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, asset: Asset) -> Result<Vec<Asset>, PipelineError>;
}

impl<S: Stage + ?Sized> Stage for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply(&self, asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        (**self).apply(asset)
    }
}

/// Stage built from a closure returning any number of outputs.
pub struct FnStage<F> {
    name: String,
    f: F,
}

impl<F> Stage for FnStage<F>
where
    F: Fn(Asset) -> Result<Vec<Asset>, PipelineError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        (self.f)(asset)
    }
}

/// Stage from a closure with full control over the output count.
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnStage<F>
where
    F: Fn(Asset) -> Result<Vec<Asset>, PipelineError> + Send + Sync,
{
    FnStage {
        name: name.into(),
        f,
    }
}

/// Stage from a one-to-one closure.
pub fn map<F>(
    name: impl Into<String>,
    f: F,
) -> FnStage<impl Fn(Asset) -> Result<Vec<Asset>, PipelineError> + Send + Sync>
where
    F: Fn(Asset) -> Result<Asset, PipelineError> + Send + Sync,
{
    from_fn(name, move |asset| f(asset).map(|a| vec![a]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_is_one_to_one() {
        let upper = map("upper", |mut a: Asset| {
            let text = a.text()?.to_uppercase();
            a.set_text(text);
            Ok(a)
        });
        let out = upper.apply(Asset::virtual_file(0, "a.txt", "abc")).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].content, b"ABC");
        assert_eq!(upper.name(), "upper");
    }

    #[test]
    fn test_from_fn_can_drop_and_fork() {
        let drop_all = from_fn("drop", |_| Ok(Vec::new()));
        assert!(drop_all.apply(Asset::virtual_file(0, "a", "")).unwrap().is_empty());

        let twice = from_fn("twice", |a: Asset| {
            let copy = a.derive("b", a.content.clone());
            Ok(vec![a, copy])
        });
        assert_eq!(twice.apply(Asset::virtual_file(0, "a", "x")).unwrap().len(), 2);
    }
}
