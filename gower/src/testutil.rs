//! Shared fixture record for unit tests.

use crate::schema::{Attribute, FeatureSchema, SchemaConfig};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sample {
    pub id: String,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub kind: Option<i64>,
    pub label: Option<usize>,
    pub center: bool,
}

pub fn sample(id: &str, weight: Option<f64>, height: Option<f64>, kind: Option<i64>) -> Sample {
    Sample {
        id: id.to_string(),
        weight,
        height,
        kind,
        label: None,
        center: false,
    }
}

pub fn attributes() -> Vec<Attribute<Sample>> {
    vec![
        Attribute::Text {
            name: "id",
            get: |r| r.id.clone(),
        },
        Attribute::Float {
            name: "weight",
            get: |r| r.weight,
            set: |r, v| r.weight = Some(v),
        },
        Attribute::Float {
            name: "height",
            get: |r| r.height,
            set: |r, v| r.height = Some(v),
        },
        Attribute::Integer {
            name: "kind",
            get: |r| r.kind,
            set: |r, v| r.kind = Some(v),
        },
        Attribute::Label {
            name: "label",
            get: |r| r.label,
            set: |r, v| r.label = Some(v),
        },
        Attribute::Flag {
            name: "is_center",
            get: |r| r.center,
            set: |r, v| r.center = v,
        },
    ]
}

pub fn schema() -> FeatureSchema<Sample> {
    FeatureSchema::build(attributes(), &SchemaConfig::new("id")).expect("fixture schema")
}
