//! Sequential data pipeline
//!
//! Reads items from an in-memory sequence and runs them through map and
//! filter stages, one item at a time on the calling thread:
//!
//! ```ignore
//! let mut pipeline = read_sequence(blocks)
//!     .map(PngDecoder::new(ImageDecoderOptions::default()))
//!     .filter(|item| Ok(item.get("channels").and_then(Data::as_int) == Some(3)))
//!     .and_return();
//!
//! for item in &mut pipeline {
//!     let item = item?;
//! }
//! pipeline.reset();
//! ```

use crate::transform::Transform;
use pixelfeed_core::{Data, Result};
use std::sync::Arc;

type Predicate = Box<dyn Fn(&Data) -> Result<bool> + Send + Sync>;

enum Stage {
    Map(Arc<dyn Transform>),
    Filter(Predicate),
}

/// Start a pipeline over `items`
pub fn read_sequence(items: Vec<Data>) -> PipelineBuilder {
    PipelineBuilder {
        source: items,
        stages: Vec::new(),
    }
}

/// Collects the stages of a [`DataPipeline`]
pub struct PipelineBuilder {
    source: Vec<Data>,
    stages: Vec<Stage>,
}

impl PipelineBuilder {
    /// Apply `transform` to every item
    pub fn map(self, transform: impl Transform + 'static) -> Self {
        self.map_shared(Arc::new(transform))
    }

    /// Apply a transform that is shared with other pipelines
    pub fn map_shared(mut self, transform: Arc<dyn Transform>) -> Self {
        self.stages.push(Stage::Map(transform));
        self
    }

    /// Keep only items for which `predicate` returns `Ok(true)`
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Data) -> Result<bool> + Send + Sync + 'static,
    {
        self.stages.push(Stage::Filter(Box::new(predicate)));
        self
    }

    pub fn and_return(self) -> DataPipeline {
        DataPipeline {
            source: self.source,
            stages: self.stages,
            position: 0,
            broken: false,
        }
    }
}

/// Iterator over the items produced by the pipeline stages
///
/// A stage error is yielded in place of the item that caused it and ends
/// iteration. The pipeline stays broken until [`DataPipeline::reset`].
pub struct DataPipeline {
    source: Vec<Data>,
    stages: Vec<Stage>,
    position: usize,
    broken: bool,
}

impl DataPipeline {
    /// Rewind to the first source item, clearing a previous error
    pub fn reset(&mut self) {
        self.position = 0;
        self.broken = false;
    }

    /// Whether a stage error ended iteration
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Number of source items not yet consumed
    pub fn remaining(&self) -> usize {
        self.source.len() - self.position
    }

    fn run_stages(&self, mut item: Data) -> Option<Result<Data>> {
        for stage in &self.stages {
            match stage {
                Stage::Map(transform) => match transform.apply(item) {
                    Ok(next) => item = next,
                    Err(e) => return Some(Err(e)),
                },
                Stage::Filter(predicate) => match predicate(&item) {
                    Ok(true) => {}
                    Ok(false) => return None,
                    Err(e) => return Some(Err(e)),
                },
            }
        }
        Some(Ok(item))
    }
}

impl Iterator for DataPipeline {
    type Item = Result<Data>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.broken {
            return None;
        }
        while self.position < self.source.len() {
            let item = self.source[self.position].clone();
            self.position += 1;
            if let Some(result) = self.run_stages(item) {
                self.broken = result.is_err();
                return Some(result);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::from_fn;
    use pixelfeed_core::Error;

    fn ints(values: &[i64]) -> Vec<Data> {
        values.iter().map(|&v| Data::Int(v)).collect()
    }

    fn collect_ints(pipeline: &mut DataPipeline) -> Vec<i64> {
        pipeline
            .map(|item| item.unwrap().as_int().unwrap())
            .collect()
    }

    #[test]
    fn test_filter_works_and_resets() {
        let mut pipeline = read_sequence(ints(&[1, 2, 3, 4, 5, 6, 7, 8, 9]))
            .filter(|item| Ok(item.as_int().unwrap_or(0) % 2 == 1))
            .and_return();

        for _ in 0..2 {
            assert_eq!(collect_ints(&mut pipeline), vec![1, 3, 5, 7, 9]);
            pipeline.reset();
        }
    }

    #[test]
    fn test_map_then_filter() {
        let mut pipeline = read_sequence(ints(&[1, 2, 3]))
            .map(from_fn("square", |item| Ok(Data::Int(item.as_int().unwrap_or(0).pow(2)))))
            .filter(|item| Ok(item.as_int() != Some(4)))
            .and_return();

        assert_eq!(collect_ints(&mut pipeline), vec![1, 9]);
        assert_eq!(pipeline.remaining(), 0);
    }

    #[test]
    fn test_stage_error_ends_iteration() {
        let mut pipeline = read_sequence(ints(&[1, 2, 3, 4]))
            .filter(|item| {
                if item.as_int() == Some(3) {
                    Err(Error::invalid_argument("filter error"))
                } else {
                    Ok(true)
                }
            })
            .and_return();

        let results: Vec<Result<Data>> = pipeline.by_ref().collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(results[2].as_ref().unwrap_err().to_string().contains("filter error"));

        assert!(pipeline.is_broken());
        assert!(pipeline.next().is_none());
        assert_eq!(pipeline.remaining(), 1);
    }

    #[test]
    fn test_reset_recovers_after_error() {
        let mut pipeline = read_sequence(ints(&[1, 2, 3, 4]))
            .filter(|item| {
                if item.as_int() == Some(3) {
                    Err(Error::invalid_argument("filter error"))
                } else {
                    Ok(true)
                }
            })
            .and_return();

        assert_eq!(pipeline.by_ref().filter(|r| r.is_err()).count(), 1);
        pipeline.reset();
        assert!(!pipeline.is_broken());
        assert_eq!(pipeline.next().and_then(|r| r.ok()).and_then(|d| d.as_int()), Some(1));
    }
}
