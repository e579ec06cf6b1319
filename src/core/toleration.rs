//! Type definitions for tolerations attached to dispatched jobs.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaintEffect {
    NoSchedule,
    PreferNoSchedule,
    NoExecute,
}

lazy_static! {
    // Effects are matched case-insensitively, keys are lowercase.
    static ref EFFECT_REGISTRY: HashMap<&'static str, TaintEffect> = {
        HashMap::from([
            ("noschedule", TaintEffect::NoSchedule),
            ("prefernoschedule", TaintEffect::PreferNoSchedule),
            ("noexecute", TaintEffect::NoExecute),
        ])
    };
}

impl TaintEffect {
    /// Looks the effect up ignoring case, returns None for unknown effects.
    pub fn from_name(name: &str) -> Option<TaintEffect> {
        EFFECT_REGISTRY.get(name.to_lowercase().as_str()).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaintEffect::NoSchedule => "NoSchedule",
            TaintEffect::PreferNoSchedule => "PreferNoSchedule",
            TaintEffect::NoExecute => "NoExecute",
        }
    }
}

impl fmt::Display for TaintEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum TolerationOperator {
    // Tolerates any value of the key, value must be empty.
    Exists,
    // Tolerates only the exact value of the key.
    Equal,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Toleration {
    pub key: String,
    pub operator: TolerationOperator,
    #[serde(default)]
    pub value: String,
    pub effect: TaintEffect,
}

impl Toleration {
    pub fn exists(key: &str, effect: TaintEffect) -> Self {
        Self {
            key: key.to_string(),
            operator: TolerationOperator::Exists,
            value: String::new(),
            effect,
        }
    }

    pub fn equal(key: &str, value: &str, effect: TaintEffect) -> Self {
        Self {
            key: key.to_string(),
            operator: TolerationOperator::Equal,
            value: value.to_string(),
            effect,
        }
    }
}

/// Compact form accepted by the toleration parser: `key:Effect` or `key=value:Effect`.
impl fmt::Display for Toleration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            TolerationOperator::Exists => write!(f, "{}:{}", self.key, self.effect),
            TolerationOperator::Equal => write!(f, "{}={}:{}", self.key, self.value, self.effect),
        }
    }
}
