//! Object kinds shared by every top-level SML object

use serde::{Deserialize, Serialize};

/// Discriminator written to the `object_type` field of every SML file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Catalog,
    Connection,
    Dataset,
    Dimension,
    /// Column-backed measure
    Metric,
    /// Expression-backed measure
    MetricCalc,
    Model,
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ObjectType::Catalog => "catalog",
            ObjectType::Connection => "connection",
            ObjectType::Dataset => "dataset",
            ObjectType::Dimension => "dimension",
            ObjectType::Metric => "metric",
            ObjectType::MetricCalc => "metric_calc",
            ObjectType::Model => "model",
        };
        f.write_str(s)
    }
}

/// A named top-level object in the graph
pub trait SmlObject {
    fn unique_name(&self) -> &str;
    fn object_type(&self) -> ObjectType;
}

/// Implements [`SmlObject`] for a struct with `unique_name` and `object_type` fields.
macro_rules! impl_sml_object {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::object::SmlObject for $ty {
                fn unique_name(&self) -> &str {
                    &self.unique_name
                }

                fn object_type(&self) -> $crate::object::ObjectType {
                    self.object_type
                }
            }
        )+
    };
}

pub(crate) use impl_sml_object;
