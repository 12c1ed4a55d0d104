//! Record attribute declarations and feature classification.
//!
//! Attributes are declared once per record type as named accessor/mutator
//! pairs. The schema splits them into ordered numeric and categorical
//! feature lists and keeps hold of the control accessors (identity, cluster
//! label, center flag) the clustering engines need. Declaration order fixes
//! feature order, which fixes the dimension count the distance divides by.

use std::collections::HashSet;

use crate::error::Error;

/// One declared attribute of a record type.
///
/// Accessors are plain `fn` pointers so a schema stays `Send + Sync` and
/// cheap to share across worker threads.
pub enum Attribute<T> {
    /// String-valued attribute. The identity attribute must be one of these.
    Text {
        name: &'static str,
        get: fn(&T) -> String,
    },
    /// Real-valued feature attribute, optionally absent.
    Float {
        name: &'static str,
        get: fn(&T) -> Option<f64>,
        set: fn(&mut T, f64),
    },
    /// Integer-valued feature attribute, optionally absent.
    Integer {
        name: &'static str,
        get: fn(&T) -> Option<i64>,
        set: fn(&mut T, i64),
    },
    /// Engine-owned cluster label.
    Label {
        name: &'static str,
        get: fn(&T) -> Option<usize>,
        set: fn(&mut T, usize),
    },
    /// Engine-owned boolean flag marking chosen centers.
    Flag {
        name: &'static str,
        get: fn(&T) -> bool,
        set: fn(&mut T, bool),
    },
}

impl<T> Attribute<T> {
    /// Declared attribute name.
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Text { name, .. }
            | Attribute::Float { name, .. }
            | Attribute::Integer { name, .. }
            | Attribute::Label { name, .. }
            | Attribute::Flag { name, .. } => name,
        }
    }
}

/// Names of the identity and engine-owned control attributes, plus the
/// optional explicit categorical feature list.
#[derive(Clone, Debug)]
pub struct SchemaConfig {
    pub identity: String,
    pub label: String,
    pub center_flag: String,
    /// `None` classifies by kind: every integer attribute is categorical,
    /// every float attribute numeric. `Some` marks exactly the named integer
    /// attributes categorical and treats every other feature attribute,
    /// integer or float, as numeric.
    pub categorical: Option<Vec<String>>,
}

impl SchemaConfig {
    pub fn new(identity: &str) -> Self {
        Self {
            identity: identity.to_string(),
            label: "label".to_string(),
            center_flag: "is_center".to_string(),
            categorical: None,
        }
    }

    pub fn with_categorical(mut self, names: &[&str]) -> Self {
        self.categorical = Some(names.iter().map(|name| name.to_string()).collect());
        self
    }
}

enum NumericSource<T> {
    Float {
        get: fn(&T) -> Option<f64>,
        set: fn(&mut T, f64),
    },
    Integer {
        get: fn(&T) -> Option<i64>,
        set: fn(&mut T, i64),
    },
}

/// A feature participating in the range-normalized numeric part of the
/// distance.
pub struct NumericFeature<T> {
    pub name: &'static str,
    source: NumericSource<T>,
}

impl<T> NumericFeature<T> {
    pub fn value(&self, record: &T) -> Option<f64> {
        match self.source {
            NumericSource::Float { get, .. } => get(record),
            NumericSource::Integer { get, .. } => get(record).map(|v| v as f64),
        }
    }

    /// Writes a value back through the mutator. Integer-backed features
    /// round to the nearest whole value.
    pub fn assign(&self, record: &mut T, value: f64) {
        match self.source {
            NumericSource::Float { set, .. } => set(record, value),
            NumericSource::Integer { set, .. } => set(record, value.round() as i64),
        }
    }
}

/// A feature compared by equality in the categorical part of the distance.
pub struct CategoricalFeature<T> {
    pub name: &'static str,
    get: fn(&T) -> Option<i64>,
    set: fn(&mut T, i64),
}

impl<T> CategoricalFeature<T> {
    pub fn value(&self, record: &T) -> Option<i64> {
        (self.get)(record)
    }

    pub fn assign(&self, record: &mut T, value: i64) {
        (self.set)(record, value)
    }
}

/// Classified view of a record type: ordered numeric and categorical feature
/// accessors plus the control accessors. Built once per dataset and record
/// type, immutable afterwards.
pub struct FeatureSchema<T> {
    identity: fn(&T) -> String,
    label_set: fn(&mut T, usize),
    center_set: fn(&mut T, bool),
    numeric: Vec<NumericFeature<T>>,
    categorical: Vec<CategoricalFeature<T>>,
}

impl<T> FeatureSchema<T> {
    /// Classifies the declared attributes into feature lists.
    ///
    /// The control attributes named by the config are excluded from
    /// classification; the remaining attributes keep declaration order.
    /// Fails when the identity or a control attribute is missing, when an
    /// explicitly named categorical attribute is unknown or not
    /// integer-valued, or when no features remain.
    pub fn build(attributes: Vec<Attribute<T>>, config: &SchemaConfig) -> Result<Self, Error> {
        let mut identity = None;
        let mut label_set = None;
        let mut center_set = None;
        for attribute in &attributes {
            match attribute {
                Attribute::Text { name, get } if *name == config.identity => {
                    identity = Some(*get);
                }
                Attribute::Label { name, set, .. } if *name == config.label => {
                    label_set = Some(*set);
                }
                Attribute::Flag { name, set, .. } if *name == config.center_flag => {
                    center_set = Some(*set);
                }
                _ => {}
            }
        }
        let identity = identity.ok_or_else(|| Error::IdentityNotFound(config.identity.clone()))?;
        let label_set = label_set.ok_or_else(|| Error::ControlAttribute(config.label.clone()))?;
        let center_set =
            center_set.ok_or_else(|| Error::ControlAttribute(config.center_flag.clone()))?;

        if let Some(names) = &config.categorical {
            for name in names {
                if *name == config.identity || *name == config.label || *name == config.center_flag
                {
                    return Err(Error::CategoricalKind(name.clone()));
                }
                match attributes.iter().find(|a| a.name() == name.as_str()) {
                    None => return Err(Error::UnknownCategorical(name.clone())),
                    Some(Attribute::Integer { .. }) => {}
                    Some(_) => return Err(Error::CategoricalKind(name.clone())),
                }
            }
        }

        let control = [
            config.identity.as_str(),
            config.label.as_str(),
            config.center_flag.as_str(),
        ];
        let explicit: Option<HashSet<&str>> = config
            .categorical
            .as_ref()
            .map(|names| names.iter().map(|name| name.as_str()).collect());

        let mut numeric = Vec::new();
        let mut categorical = Vec::new();
        for attribute in attributes {
            if control.contains(&attribute.name()) {
                continue;
            }
            match attribute {
                Attribute::Float { name, get, set } => numeric.push(NumericFeature {
                    name,
                    source: NumericSource::Float { get, set },
                }),
                Attribute::Integer { name, get, set } => {
                    let as_categorical = match &explicit {
                        Some(names) => names.contains(name),
                        None => true,
                    };
                    if as_categorical {
                        categorical.push(CategoricalFeature { name, get, set });
                    } else {
                        numeric.push(NumericFeature {
                            name,
                            source: NumericSource::Integer { get, set },
                        });
                    }
                }
                Attribute::Text { .. } | Attribute::Label { .. } | Attribute::Flag { .. } => {}
            }
        }

        if numeric.is_empty() && categorical.is_empty() {
            return Err(Error::NoFeatures);
        }

        Ok(Self {
            identity,
            label_set,
            center_set,
            numeric,
            categorical,
        })
    }

    /// Identity value of a record. Never mutated by the engines.
    pub fn identity(&self, record: &T) -> String {
        (self.identity)(record)
    }

    pub fn set_label(&self, record: &mut T, label: usize) {
        (self.label_set)(record, label)
    }

    pub fn set_center(&self, record: &mut T, flag: bool) {
        (self.center_set)(record, flag)
    }

    /// Numeric features in declaration order.
    pub fn numeric(&self) -> &[NumericFeature<T>] {
        &self.numeric
    }

    /// Categorical features in declaration order.
    pub fn categorical(&self) -> &[CategoricalFeature<T>] {
        &self.categorical
    }

    /// Total feature count, the divisor of the distance sum.
    pub fn dimension(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }
}
