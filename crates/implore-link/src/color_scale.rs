//! Shared color encoding derived from one attribute
//!
//! The deriver inspects the values of the chosen attribute over the
//! visible records. If every value coerces to a number the scale is
//! continuous over `(min, max)`; otherwise it is categorical over the
//! sorted distinct labels. Values that cannot be placed on the scale get
//! the neutral no-data color.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::colormap::{Color, Colormap};
use crate::store::Record;
use crate::value::Value;

/// Kind of color scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleKind {
    Numeric,
    Categorical,
}

/// Domain of a color scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScaleDomain {
    /// Continuous domain; `None` when there was nothing to measure
    Numeric(Option<(f64, f64)>),
    /// Sorted categories, at least two entries
    Categorical(Vec<String>),
}

/// Which end of a numeric domain to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainSide {
    Low,
    High,
}

/// A derived color encoding
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    attribute: String,
    domain: ScaleDomain,
    colormap: Colormap,
    no_data: Color,
}

/// One swatch of a legend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

/// Description of a color key widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub attribute: String,
    pub kind: ScaleKind,
    pub domain: ScaleDomain,
    pub entries: Vec<LegendEntry>,
    pub no_data: String,
}

impl ColorScale {
    /// Derive a scale for `attribute` from the visible records
    pub fn derive<'a, I>(records: I, attribute: &str, colormap: Colormap, no_data: Color) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let values: Vec<&Value> = records
            .into_iter()
            .map(|r| r.get(attribute))
            .filter(|v| v.label().is_some())
            .collect();

        // Empty text counts as a (low) number for the kind test only
        let all_numeric = values.iter().all(|v| v.is_empty_text() || v.is_numeric());

        let domain = if all_numeric {
            let extent = values
                .iter()
                .filter_map(|v| v.as_number())
                .fold(None, |acc: Option<(f64, f64)>, n| match acc {
                    Some((lo, hi)) => Some((lo.min(n), hi.max(n))),
                    None => Some((n, n)),
                });
            ScaleDomain::Numeric(extent)
        } else {
            let distinct: BTreeSet<String> = values
                .iter()
                .filter(|v| !v.is_empty_text())
                .filter_map(|v| v.label())
                .collect();
            let mut categories: Vec<String> = distinct.into_iter().collect();
            if categories.len() == 1 {
                // Ordinal mapping needs two anchor points
                categories.push(categories[0].clone());
            }
            ScaleDomain::Categorical(categories)
        };

        tracing::debug!(attribute, kind = ?kind_of(&domain), "Derived color scale");

        Self {
            attribute: attribute.to_string(),
            domain,
            colormap,
            no_data,
        }
    }

    /// Attribute the scale encodes
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn kind(&self) -> ScaleKind {
        kind_of(&self.domain)
    }

    pub fn domain(&self) -> &ScaleDomain {
        &self.domain
    }

    pub fn colormap(&self) -> &Colormap {
        &self.colormap
    }

    pub fn no_data(&self) -> Color {
        self.no_data
    }

    /// Move one end of a numeric domain by a fraction of its width
    ///
    /// Returns `false` for categorical or empty scales.
    pub fn adjust_domain(&mut self, side: DomainSide, delta_fraction: f64) -> bool {
        let ScaleDomain::Numeric(Some((low, high))) = &mut self.domain else {
            return false;
        };
        if !delta_fraction.is_finite() {
            return false;
        }

        let shift = delta_fraction * (*high - *low);
        match side {
            DomainSide::Low => *low += shift,
            DomainSide::High => *high += shift,
        }
        true
    }

    /// Color for a raw attribute value
    ///
    /// Missing values, blank text, zero and NaN all get the no-data color.
    pub fn color_of(&self, value: &Value) -> Color {
        if is_falsy(value) {
            return self.no_data;
        }

        match &self.domain {
            ScaleDomain::Numeric(None) => self.no_data,
            ScaleDomain::Numeric(Some((low, high))) => match value.as_number() {
                Some(v) => self.colormap.sample(normalize(v, *low, *high)),
                None => self.no_data,
            },
            ScaleDomain::Categorical(categories) => {
                let rank = value
                    .label()
                    .and_then(|label| categories.iter().position(|c| *c == label));
                match rank {
                    Some(i) => self.colormap.sample(i as f64 / (categories.len() - 1) as f64),
                    None => self.no_data,
                }
            }
        }
    }

    /// Color for a record
    pub fn color_of_record(&self, record: &Record) -> Color {
        self.color_of(record.get(&self.attribute))
    }

    /// Legend with `samples` evenly spaced entries for numeric scales
    pub fn legend(&self, samples: usize) -> Legend {
        let entries = match &self.domain {
            ScaleDomain::Numeric(None) => Vec::new(),
            ScaleDomain::Numeric(Some((low, high))) => {
                let n = samples.max(2);
                (0..n)
                    .map(|i| {
                        let t = i as f64 / (n - 1) as f64;
                        let v = low + (high - low) * t;
                        LegendEntry {
                            label: Value::Number(v).to_string(),
                            color: self.colormap.sample(t).to_hex(),
                        }
                    })
                    .collect()
            }
            ScaleDomain::Categorical(categories) => {
                let mut seen = BTreeSet::new();
                categories
                    .iter()
                    .filter(|c| seen.insert(c.as_str()))
                    .map(|c| LegendEntry {
                        label: c.clone(),
                        color: self.color_of(&Value::Text(c.clone())).to_hex(),
                    })
                    .collect()
            }
        };

        Legend {
            attribute: self.attribute.clone(),
            kind: self.kind(),
            domain: self.domain.clone(),
            entries,
            no_data: self.no_data.to_hex(),
        }
    }
}

fn kind_of(domain: &ScaleDomain) -> ScaleKind {
    match domain {
        ScaleDomain::Numeric(_) => ScaleKind::Numeric,
        ScaleDomain::Categorical(_) => ScaleKind::Categorical,
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Number(n) => *n == 0.0 || n.is_nan(),
        _ => !value.has_value(),
    }
}

fn normalize(v: f64, low: f64, high: f64) -> f64 {
    if high == low {
        0.0
    } else {
        (v - low) / (high - low)
    }
}
