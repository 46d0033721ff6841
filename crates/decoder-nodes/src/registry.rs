//! Transform factory registration
//!
//! Decoders are created from a type name plus JSON parameters. Factories are
//! collected through `inventory`, so linking this crate is enough for
//! [`collect_registered_transforms`] to see them; [`register_decoders`]
//! registers the built-in decoders explicitly.

use crate::transform::Transform;
use pixelfeed_core::{DeviceSelector, Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Creates configured transforms from JSON parameters
pub trait TransformFactory: Send + Sync {
    /// Create a new transform instance
    fn create(&self, params: &Value) -> Result<Box<dyn Transform>>;

    /// Get the transform type this factory creates
    fn transform_type(&self) -> &str;

    /// JSON schema of the accepted parameters
    fn config_schema(&self) -> Value;
}

/// Registry of transform factories keyed by type name
#[derive(Default)]
pub struct TransformRegistry {
    factories: HashMap<String, Arc<dyn TransformFactory>>,
}

impl TransformRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory, replacing any previous one with the same type
    pub fn register(&mut self, factory: Arc<dyn TransformFactory>) {
        let transform_type = factory.transform_type().to_string();
        self.factories.insert(transform_type, factory);
    }

    /// Create a transform by type
    pub fn create(&self, transform_type: &str, params: &Value) -> Result<Box<dyn Transform>> {
        let factory = self.factories.get(transform_type).ok_or_else(|| {
            Error::configuration(
                transform_type,
                format!(
                    "No transform factory registered for this type. Available types: {:?}",
                    self.list_types()
                ),
            )
        })?;

        factory.create(params)
    }

    pub fn has_type(&self, transform_type: &str) -> bool {
        self.factories.contains_key(transform_type)
    }

    /// Registered type names, sorted
    pub fn list_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn config_schema(&self, transform_type: &str) -> Option<Value> {
        self.factories.get(transform_type).map(|factory| factory.config_schema())
    }
}

/// A factory submitted to `inventory` for auto-collection
pub struct RegisteredTransform {
    /// Function building the factory
    pub build_factory: fn() -> Arc<dyn TransformFactory>,
}

impl RegisteredTransform {
    pub const fn new(build_factory: fn() -> Arc<dyn TransformFactory>) -> Self {
        Self { build_factory }
    }
}

inventory::collect!(RegisteredTransform);

/// Collect all auto-registered factories into a registry
pub fn collect_registered_transforms() -> TransformRegistry {
    let mut registry = TransformRegistry::new();

    for registered in inventory::iter::<RegisteredTransform> {
        registry.register((registered.build_factory)());
    }

    registry
}

/// Register the built-in decoder factories with a registry
pub fn register_decoders(registry: &mut TransformRegistry) {
    registry.register(Arc::new(crate::png::PngDecoderFactory));
    registry.register(Arc::new(crate::video::VideoDecoderFactory));
    tracing::info!("Registered png_decoder and video_decoder factories");
}

/// Deserialize factory parameters
///
/// `null` means "all defaults". A `device` string is resolved through
/// [`DeviceSelector`], so `"auto"` is accepted and unavailable accelerators
/// are rejected here rather than at decode time.
pub(crate) fn parse_params<T: DeserializeOwned>(component: &str, params: &Value) -> Result<T> {
    let mut params = match params {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };

    if let Some(obj) = params.as_object_mut() {
        if let Some(Value::String(device)) = obj.get("device") {
            let device = DeviceSelector::from_config(device)?;
            obj.insert("device".to_string(), Value::String(device.to_string()));
        }
    }

    serde_json::from_value(params).map_err(|e| Error::configuration(component, e.to_string()))
}

pub(crate) fn schema_value(schema: schemars::schema::RootSchema) -> Value {
    match serde_json::to_value(&schema) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize config schema");
            Value::Null
        }
    }
}
