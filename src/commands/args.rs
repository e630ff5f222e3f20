//! Parameter declarations and argument binding for `//commands`.
//!
//! Every handler declares its parameters explicitly. At dispatch time the raw
//! tokens are bound to those declarations and converted to the declared kind,
//! so handlers read typed values instead of re-parsing strings.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::DispatchError;

/// Declared type of a command parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Str,
    Int,
    Float,
    Bool,
}

impl ParamKind {
    /// Human-readable kind name used in help output and conversion errors.
    pub fn label(self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Int => "integer",
            Self::Float => "float",
            Self::Bool => "boolean",
        }
    }

    /// Convert a supplied value to this kind.
    pub fn convert(self, value: &ArgValue) -> Option<ArgValue> {
        match (self, value) {
            (Self::Str, ArgValue::Str(s)) => Some(ArgValue::Str(s.clone())),
            (Self::Str, other) => Some(ArgValue::Str(other.to_string())),
            (Self::Int, ArgValue::Int(n)) => Some(ArgValue::Int(*n)),
            (Self::Int, ArgValue::Str(s)) => s.trim().parse().ok().map(ArgValue::Int),
            (Self::Float, ArgValue::Float(x)) => Some(ArgValue::Float(*x)),
            (Self::Float, ArgValue::Int(n)) => Some(ArgValue::Float(*n as f64)),
            (Self::Float, ArgValue::Str(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .map(ArgValue::Float),
            (Self::Bool, ArgValue::Bool(b)) => Some(ArgValue::Bool(*b)),
            (Self::Bool, ArgValue::Int(0)) => Some(ArgValue::Bool(false)),
            (Self::Bool, ArgValue::Int(1)) => Some(ArgValue::Bool(true)),
            (Self::Bool, ArgValue::Str(s)) => parse_bool_token(s).map(ArgValue::Bool),
            _ => None,
        }
    }
}

/// Parse the boolean spellings accepted on the command line.
pub fn parse_bool_token(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// A bound argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One declared command parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<ArgValue>,
    /// Absorbs every remaining positional token, joined by single spaces.
    pub rest: bool,
}

impl ParamSpec {
    /// A parameter that must be supplied.
    pub fn required(name: &str, kind: ParamKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            default: None,
            rest: false,
        }
    }

    /// An optional parameter with no default; unbound means absent.
    pub fn optional(name: &str, kind: ParamKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            default: None,
            rest: false,
        }
    }

    /// An optional parameter that falls back to `default` when unbound.
    pub fn with_default(name: &str, kind: ParamKind, default: impl Into<ArgValue>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            default: Some(default.into()),
            rest: false,
        }
    }

    /// Mark this parameter as greedy (must be the last one declared).
    pub fn rest(mut self) -> Self {
        self.rest = true;
        self
    }
}

/// Arguments bound to a handler's declared parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    values: BTreeMap<String, ArgValue>,
}

impl BoundArgs {
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ArgValue::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(ArgValue::Float(x)) => Some(*x),
            Some(ArgValue::Int(n)) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(ArgValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Bind raw positional tokens or keyword values to `params`.
///
/// Keyword values win when present; positional tokens are then ignored.
pub(crate) fn bind_arguments(
    command: &str,
    params: &[ParamSpec],
    positional: &[&str],
    kwargs: &BTreeMap<String, ArgValue>,
) -> Result<BoundArgs, DispatchError> {
    let mut bound = BoundArgs::default();
    for (idx, param) in params.iter().enumerate() {
        let supplied: Option<ArgValue> = if !kwargs.is_empty() {
            kwargs.get(&param.name).cloned()
        } else if param.rest {
            (idx < positional.len()).then(|| ArgValue::Str(positional[idx..].join(" ")))
        } else {
            positional.get(idx).map(|token| ArgValue::from(*token))
        };

        let value = match supplied {
            Some(raw) => param
                .kind
                .convert(&raw)
                .ok_or_else(|| DispatchError::InvalidArgument {
                    command: command.to_string(),
                    parameter: param.name.clone(),
                    value: raw.to_string(),
                    expected: param.kind.label(),
                })?,
            None if param.required => {
                return Err(DispatchError::MissingParameter {
                    command: command.to_string(),
                    parameter: param.name.clone(),
                })
            }
            None => match &param.default {
                Some(default) => default.clone(),
                None => continue,
            },
        };
        bound.values.insert(param.name.clone(), value);
    }
    Ok(bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert_params() -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("value", ParamKind::Float),
            ParamSpec::required("from_unit", ParamKind::Str),
            ParamSpec::required("to_unit", ParamKind::Str),
        ]
    }

    #[test]
    fn binds_positional_tokens_in_declaration_order() {
        let bound =
            bind_arguments("convert", &convert_params(), &["100", "lb", "kg"], &BTreeMap::new())
                .expect("bind");
        assert_eq!(bound.float("value"), Some(100.0));
        assert_eq!(bound.str("from_unit"), Some("lb"));
        assert_eq!(bound.str("to_unit"), Some("kg"));
    }

    #[test]
    fn missing_required_parameter_is_reported() {
        let err = bind_arguments("convert", &convert_params(), &["100"], &BTreeMap::new())
            .expect_err("missing");
        assert_eq!(
            err,
            DispatchError::MissingParameter {
                command: "convert".into(),
                parameter: "from_unit".into()
            }
        );
    }

    #[test]
    fn keyword_arguments_take_precedence_over_positional() {
        let mut kwargs = BTreeMap::new();
        kwargs.insert("value".to_string(), ArgValue::Int(3));
        kwargs.insert("from_unit".to_string(), ArgValue::from("m"));
        kwargs.insert("to_unit".to_string(), ArgValue::from("ft"));
        let bound = bind_arguments("convert", &convert_params(), &["1", "kg", "lb"], &kwargs)
            .expect("bind");
        assert_eq!(bound.float("value"), Some(3.0));
        assert_eq!(bound.str("from_unit"), Some("m"));
    }

    #[test]
    fn non_numeric_token_for_float_is_rejected() {
        let err = bind_arguments(
            "convert",
            &convert_params(),
            &["lots", "lb", "kg"],
            &BTreeMap::new(),
        )
        .expect_err("invalid");
        assert!(err.to_string().contains("expected float"), "got: {err}");
    }

    #[test]
    fn defaults_fill_unbound_optional_parameters() {
        let params = vec![ParamSpec::with_default("action", ParamKind::Str, "status")];
        let bound = bind_arguments("memory", &params, &[], &BTreeMap::new()).expect("bind");
        assert_eq!(bound.str("action"), Some("status"));

        let params = vec![ParamSpec::optional("command_name", ParamKind::Str)];
        let bound = bind_arguments("help", &params, &[], &BTreeMap::new()).expect("bind");
        assert!(bound.is_empty());
    }

    #[test]
    fn rest_parameter_joins_remaining_tokens() {
        let params = vec![
            ParamSpec::required("action", ParamKind::Str),
            ParamSpec::optional("entry", ParamKind::Str).rest(),
        ];
        let bound = bind_arguments(
            "whitelist",
            &params,
            &["add", "python", "--version"],
            &BTreeMap::new(),
        )
        .expect("bind");
        assert_eq!(bound.str("entry"), Some("python --version"));
    }

    #[test]
    fn bool_tokens_accept_common_spellings() {
        for raw in ["on", "YES", "true", "1"] {
            assert_eq!(parse_bool_token(raw), Some(true), "{raw}");
        }
        for raw in ["off", "no", "False", "0"] {
            assert_eq!(parse_bool_token(raw), Some(false), "{raw}");
        }
        assert_eq!(parse_bool_token("maybe"), None);
    }

    #[test]
    fn int_kind_rejects_fractional_text() {
        assert_eq!(ParamKind::Int.convert(&ArgValue::from("2.5")), None);
        assert_eq!(
            ParamKind::Int.convert(&ArgValue::from(" 7 ")),
            Some(ArgValue::Int(7))
        );
    }
}
