//! The callable stage interface shared by all decoders

use pixelfeed_core::{Data, Result};
use std::sync::Arc;

/// A configured pipeline stage mapping one data item to another
///
/// Implementations hold only immutable configuration, so a single instance
/// may be applied from several threads at once.
pub trait Transform: Send + Sync {
    /// Stage name used in logs and error messages
    fn name(&self) -> &str;

    /// Consume `item` and produce the transformed item
    fn apply(&self, item: Data) -> Result<Data>;
}

impl<T: Transform + ?Sized> Transform for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply(&self, item: Data) -> Result<Data> {
        (**self).apply(item)
    }
}

impl<T: Transform + ?Sized> Transform for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply(&self, item: Data) -> Result<Data> {
        (**self).apply(item)
    }
}

/// Adapter turning a closure into a [`Transform`]
pub struct FnTransform<F> {
    name: String,
    f: F,
}

impl<F> Transform for FnTransform<F>
where
    F: Fn(Data) -> Result<Data> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, item: Data) -> Result<Data> {
        (self.f)(item)
    }
}

/// Wrap a closure as a named transform
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnTransform<F>
where
    F: Fn(Data) -> Result<Data> + Send + Sync,
{
    FnTransform {
        name: name.into(),
        f,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_transform_applies_closure() {
        let double = from_fn("double", |item| match item {
            Data::Int(v) => Ok(Data::Int(v * 2)),
            other => Ok(other),
        });

        assert_eq!(double.name(), "double");
        assert_eq!(double.apply(Data::Int(21)).unwrap(), Data::Int(42));

        let boxed: Box<dyn Transform> = Box::new(double);
        assert_eq!(boxed.apply(Data::Int(2)).unwrap(), Data::Int(4));
    }
}
