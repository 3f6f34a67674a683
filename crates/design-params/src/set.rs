use serde::{Deserialize, Serialize};

use crate::bracket::SplineBracketParams;
use crate::enclosure::EnclosureParams;
use crate::errors::ParamError;

/// The product families the generator knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Product {
    CurrentLimitBox,
    SplineBracket,
}

impl Product {
    pub fn name(self) -> &'static str {
        match self {
            Product::CurrentLimitBox => "CurrentLimitBox",
            Product::SplineBracket => "SplineBracket",
        }
    }
}

/// A complete, self-contained set of dimensions for one product revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "product")]
pub enum DesignParameterSet {
    CurrentLimitBox(EnclosureParams),
    SplineBracket(SplineBracketParams),
}

impl DesignParameterSet {
    /// One of the shipped revisions.
    pub fn builtin(product: Product, revision: u32) -> Result<Self, ParamError> {
        match (product, revision) {
            (Product::CurrentLimitBox, 1) => {
                Ok(Self::CurrentLimitBox(EnclosureParams::revision_1()))
            }
            (Product::CurrentLimitBox, 2) => {
                Ok(Self::CurrentLimitBox(EnclosureParams::revision_2()))
            }
            (Product::SplineBracket, 1) => {
                Ok(Self::SplineBracket(SplineBracketParams::revision_1()))
            }
            (product, revision) => Err(ParamError::UnknownRevision {
                product: product.name(),
                revision,
            }),
        }
    }

    /// The newest shipped revision of `product`.
    pub fn latest(product: Product) -> Self {
        match product {
            Product::CurrentLimitBox => Self::CurrentLimitBox(EnclosureParams::revision_2()),
            Product::SplineBracket => Self::SplineBracket(SplineBracketParams::revision_1()),
        }
    }

    pub fn product(&self) -> Product {
        match self {
            Self::CurrentLimitBox(_) => Product::CurrentLimitBox,
            Self::SplineBracket(_) => Product::SplineBracket,
        }
    }

    pub fn revision(&self) -> u32 {
        match self {
            Self::CurrentLimitBox(p) => p.revision,
            Self::SplineBracket(p) => p.revision,
        }
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        match self {
            Self::CurrentLimitBox(p) => p.validate(),
            Self::SplineBracket(p) => p.validate(),
        }
    }

    /// Overlay the fields named in `overrides` (a JSON object) on this set.
    ///
    /// The product tag cannot be changed this way.
    pub fn with_overrides(&self, overrides: &serde_json::Value) -> Result<Self, ParamError> {
        let serde_json::Value::Object(fields) = overrides else {
            return Err(ParamError::Override("expected a JSON object".into()));
        };
        let mut base =
            serde_json::to_value(self).map_err(|e| ParamError::Override(e.to_string()))?;
        let serde_json::Value::Object(target) = &mut base else {
            return Err(ParamError::Override("parameter set is not an object".into()));
        };

        for (key, value) in fields {
            if key == "product" {
                if value.as_str() != Some(self.product().name()) {
                    return Err(ParamError::Override(format!(
                        "overrides are for {value}, not {}",
                        self.product().name()
                    )));
                }
                continue;
            }
            if !target.contains_key(key) {
                return Err(ParamError::Override(format!("unknown parameter `{key}`")));
            }
            target.insert(key.clone(), value.clone());
        }

        serde_json::from_value(base).map_err(|e| ParamError::Override(e.to_string()))
    }
}
