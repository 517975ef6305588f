use super::error::ReporterError;
use super::testcase::{Baggage, parse_baggage};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env::{self, VarError};

const ENV_SESSION_ID: &str = "GREENER_SESSION_ID";
const ENV_SESSION_DESCRIPTION: &str = "GREENER_SESSION_DESCRIPTION";
const ENV_SESSION_BAGGAGE: &str = "GREENER_SESSION_BAGGAGE";
const ENV_SESSION_LABELS: &str = "GREENER_SESSION_LABELS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Label {
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// `key=value` becomes a valued label, a bare `key` has no value.
    /// Only the first `=` separates key from value.
    pub fn parse(input: &str) -> Self {
        match input.split_once('=') {
            Some((key, value)) => Label::new(key, Some(value.to_string())),
            None => Label::new(input, None),
        }
    }
}

/// Parses the comma-separated form used by `GREENER_SESSION_LABELS`.
pub fn parse_labels(input: &str) -> Vec<Label> {
    input
        .split(',')
        .filter(|s| !s.is_empty())
        .map(Label::parse)
        .collect()
}

/// Parses repeated `--label` arguments, rejecting empty and duplicate keys.
pub fn parse_label_args<I, S>(args: I) -> Result<Vec<Label>, ReporterError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut labels = Vec::new();

    for arg in args {
        let label = Label::parse(arg.as_ref());
        if label.key.is_empty() {
            return Err(ReporterError::InvalidArgument(
                "label key cannot be empty".to_string(),
            ));
        }
        if !seen.insert(label.key.clone()) {
            return Err(ReporterError::InvalidArgument(format!(
                "duplicate label key: {}",
                label.key
            )));
        }
        labels.push(label);
    }

    Ok(labels)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub id: Option<String>,
    pub description: Option<String>,
    pub baggage: Option<Baggage>,
    pub labels: Option<Vec<Label>>,
}

impl SessionRequest {
    /// Builds a session request from the `GREENER_SESSION_*` environment.
    pub fn from_env() -> Result<Self, ReporterError> {
        let id = read_env_opt(ENV_SESSION_ID)?;
        let description = read_env_opt(ENV_SESSION_DESCRIPTION)?;
        let baggage = read_env_opt(ENV_SESSION_BAGGAGE)?
            .map(|raw| parse_baggage(&raw))
            .transpose()?;
        let labels = read_env_opt(ENV_SESSION_LABELS)?
            .map(|raw| parse_labels(&raw))
            .filter(|labels| !labels.is_empty());

        Ok(Self {
            id,
            description,
            baggage,
            labels,
        })
    }
}

fn read_env_opt(name: &str) -> Result<Option<String>, ReporterError> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(ReporterError::InvalidArgument(format!(
            "cannot read non-unicode {name}"
        ))),
    }
}

/// A session created by the ingress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
}
