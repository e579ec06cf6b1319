//! Parser for toleration specifications given on the command line.
//!
//! Two grammars are accepted, chosen by the first non-whitespace character:
//! - JSON: `[{"key":"role","operator":"Equal","value":"myrole","effect":"NoSchedule"}]`
//! - compact: `role=myrole:NoSchedule,dedicated:NoExecute`
//!
//! Both grammars are reduced to raw entries which then pass through the same validation.

use serde::Deserialize;
use thiserror::Error;

use crate::core::toleration::{TaintEffect, Toleration, TolerationOperator};

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("failed to parse tolerations JSON: {0}")]
    MalformedJson(String),

    #[error("toleration {entry:?} has no ':' separating the effect")]
    MissingEffectSeparator { entry: String },

    #[error("unknown toleration effect {got:?}, expected NoSchedule, PreferNoSchedule or NoExecute")]
    UnknownEffect { got: String },

    #[error("toleration {entry:?} has an empty key")]
    MissingKey { entry: String },

    #[error("toleration for key {key:?} has operator {operator:?} which does not fit its value")]
    InvalidOperator { key: String, operator: String },
}

enum TolerationSpec<'a> {
    Json(&'a str),
    Compact(&'a str),
}

impl<'a> TolerationSpec<'a> {
    fn sniff(spec: &'a str) -> Option<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            None
        } else if spec.starts_with('[') {
            Some(TolerationSpec::Json(spec))
        } else {
            Some(TolerationSpec::Compact(spec))
        }
    }
}

#[derive(Deserialize)]
struct RawToleration {
    #[serde(default)]
    key: String,
    // Kubernetes treats an omitted operator as Equal.
    #[serde(default)]
    operator: Option<String>,
    #[serde(default)]
    value: String,
    #[serde(default)]
    effect: String,
    // Entry as the user wrote it, for error messages.
    #[serde(skip)]
    entry: String,
}

/// Parses a toleration specification. An empty specification yields no tolerations.
pub fn parse(spec: &str) -> Result<Vec<Toleration>, ParseError> {
    let raw_tolerations = match TolerationSpec::sniff(spec) {
        None => return Ok(vec![]),
        Some(TolerationSpec::Json(json)) => parse_json(json)?,
        Some(TolerationSpec::Compact(compact)) => parse_compact(compact)?,
    };
    raw_tolerations.into_iter().map(validate).collect()
}

fn parse_json(spec: &str) -> Result<Vec<RawToleration>, ParseError> {
    let malformed = |err: serde_json::Error| ParseError::MalformedJson(err.to_string());
    let entries: Vec<serde_json::Value> = serde_json::from_str(spec).map_err(malformed)?;
    entries
        .into_iter()
        .map(|value| {
            let entry = value.to_string();
            let mut raw: RawToleration = serde_json::from_value(value).map_err(malformed)?;
            raw.entry = entry;
            Ok(raw)
        })
        .collect()
}

fn parse_compact(spec: &str) -> Result<Vec<RawToleration>, ParseError> {
    spec.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_compact_entry)
        .collect()
}

fn parse_compact_entry(entry: &str) -> Result<RawToleration, ParseError> {
    let (key_value, effect) =
        entry
            .split_once(':')
            .ok_or_else(|| ParseError::MissingEffectSeparator {
                entry: entry.to_string(),
            })?;

    let (key, operator, value) = match key_value.split_once('=') {
        Some((key, value)) => (key, "Equal", value.trim()),
        None => (key_value, "Exists", ""),
    };
    Ok(RawToleration {
        key: key.trim().to_string(),
        operator: Some(operator.to_string()),
        value: value.to_string(),
        effect: effect.trim().to_string(),
        entry: entry.to_string(),
    })
}

fn validate(raw: RawToleration) -> Result<Toleration, ParseError> {
    let operator_name = raw.operator.unwrap_or_else(|| "Equal".to_string());
    // An empty key with Exists tolerates every taint with the effect.
    let operator = match operator_name.as_str() {
        "Exists" if raw.value.is_empty() => TolerationOperator::Exists,
        "Equal" if raw.key.is_empty() => {
            return Err(ParseError::MissingKey { entry: raw.entry });
        }
        "Equal" if !raw.value.is_empty() => TolerationOperator::Equal,
        _ => {
            return Err(ParseError::InvalidOperator {
                key: raw.key,
                operator: operator_name,
            })
        }
    };

    let effect = TaintEffect::from_name(&raw.effect).ok_or_else(|| ParseError::UnknownEffect {
        got: raw.effect.clone(),
    })?;

    Ok(Toleration {
        key: raw.key,
        operator,
        value: raw.value,
        effect,
    })
}
