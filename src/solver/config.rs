//! Configuration object: a JSON-like map, validated key-by-key into a
//! strongly typed [`Config`].

use serde_json::Value;

use crate::error::ConfigError;

/// Selects which Controller/Analyzer/Selecter policy combination is active.
/// Names follow the original `ymsat`/`minisat` solver family this core is
/// modeled on; `lingeling` is recognized but reported as an unsupported
/// external backend rather than implemented. Parsed by hand in
/// [`SolverType::parse`] (not via `serde::Deserialize`) so an unknown or
/// unsupported name can carry a specific [`ConfigError`] reason.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverType {
    Ymsat1,
    Ymsat2,
    Ymsat1Old,
    Minisat,
    Minisat2,
    Glueminisat2,
}

impl SolverType {
    fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "ymsat1" => Ok(SolverType::Ymsat1),
            "ymsat2" => Ok(SolverType::Ymsat2),
            "ymsat1_old" => Ok(SolverType::Ymsat1Old),
            "minisat" => Ok(SolverType::Minisat),
            "minisat2" => Ok(SolverType::Minisat2),
            "glueminisat2" => Ok(SolverType::Glueminisat2),
            "lingeling" => Err(ConfigError::MalformedValue {
                key: "type".to_string(),
                reason: "lingeling is an external backend, not implemented here".to_string(),
            }),
            other => Err(ConfigError::UnknownType(other.to_string())),
        }
    }

    pub(crate) fn uses_luby_restart(self) -> bool {
        matches!(self, SolverType::Minisat2 | SolverType::Ymsat2)
    }

    pub(crate) fn uses_ema_restart(self) -> bool {
        matches!(self, SolverType::Glueminisat2)
    }
}

/// Where the operations replay log (`N`/`A`/`S`/`#`, see
/// [`crate::solver::oplog`]) is written.
#[derive(Clone, Debug)]
pub enum LogTarget {
    File(String),
    Stdout,
    Stderr,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub solver_type: SolverType,
    pub phase_cache: bool,
    pub wl_posi: bool,
    pub wl_nega: bool,
    pub var_freq: f64,
    pub var_decay: f64,
    pub clause_decay: f64,
    pub log: Option<LogTarget>,
    pub max_conflict: i64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            solver_type: SolverType::Ymsat2,
            phase_cache: true,
            wl_posi: false,
            wl_nega: false,
            var_freq: 0.0,
            var_decay: 0.95,
            clause_decay: 0.999,
            log: None,
            max_conflict: -1,
        }
    }
}

impl Config {
    /// Parses the JSON configuration object described in the external
    /// interface section. Unknown keys are ignored; an unknown `type` value
    /// is a hard error.
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        let mut cfg = Config::default();
        let obj = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(cfg),
            other => {
                return Err(ConfigError::MalformedValue {
                    key: "<root>".to_string(),
                    reason: format!("expected a JSON object, got {other}"),
                })
            }
        };

        if let Some(v) = obj.get("type") {
            let name = v.as_str().ok_or_else(|| ConfigError::MalformedValue {
                key: "type".to_string(),
                reason: "expected a string".to_string(),
            })?;
            cfg.solver_type = SolverType::parse(name)?;
        }
        if let Some(v) = obj.get("phase_cache") {
            cfg.phase_cache = as_bool(v, "phase_cache")?;
        }
        if let Some(v) = obj.get("wl_posi") {
            cfg.wl_posi = as_bool(v, "wl_posi")?;
        }
        if let Some(v) = obj.get("wl_nega") {
            cfg.wl_nega = as_bool(v, "wl_nega")?;
        }
        if let Some(v) = obj.get("var_freq") {
            cfg.var_freq = as_f64(v, "var_freq")?;
        }
        if let Some(v) = obj.get("var_decay") {
            cfg.var_decay = as_f64(v, "var_decay")?;
        }
        if let Some(v) = obj.get("clause_decay") {
            cfg.clause_decay = as_f64(v, "clause_decay")?;
        }
        if let Some(v) = obj.get("max_conflict") {
            cfg.max_conflict = v.as_i64().ok_or_else(|| ConfigError::MalformedValue {
                key: "max_conflict".to_string(),
                reason: "expected an integer".to_string(),
            })?;
        }
        if let Some(v) = obj.get("log") {
            cfg.log = Some(parse_log_target(v)?);
        }

        Ok(cfg)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(s)?;
        Config::from_json(&value)
    }
}

fn as_bool(v: &Value, key: &str) -> Result<bool, ConfigError> {
    v.as_bool().ok_or_else(|| ConfigError::MalformedValue {
        key: key.to_string(),
        reason: "expected a boolean".to_string(),
    })
}

fn as_f64(v: &Value, key: &str) -> Result<f64, ConfigError> {
    v.as_f64().ok_or_else(|| ConfigError::MalformedValue {
        key: key.to_string(),
        reason: "expected a number".to_string(),
    })
}

fn parse_log_target(v: &Value) -> Result<LogTarget, ConfigError> {
    let obj = v.as_object().ok_or_else(|| ConfigError::MalformedValue {
        key: "log".to_string(),
        reason: "expected an object".to_string(),
    })?;
    if let Some(file) = obj.get("file").and_then(Value::as_str) {
        return Ok(LogTarget::File(file.to_string()));
    }
    if obj.get("stdout").and_then(Value::as_bool) == Some(true) {
        return Ok(LogTarget::Stdout);
    }
    if obj.get("stderr").and_then(Value::as_bool) == Some(true) {
        return Ok(LogTarget::Stderr);
    }
    Err(ConfigError::MalformedValue {
        key: "log".to_string(),
        reason: "expected one of file/stdout/stderr".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_ymsat2() {
        let cfg = Config::default();
        assert_eq!(cfg.solver_type, SolverType::Ymsat2);
        assert!(cfg.phase_cache);
    }

    #[test]
    fn parses_known_type() {
        let cfg = Config::from_json_str(r#"{"type": "minisat2", "var_freq": 0.02}"#).unwrap();
        assert_eq!(cfg.solver_type, SolverType::Minisat2);
        assert!((cfg.var_freq - 0.02).abs() < 1e-9);
    }

    #[test]
    fn rejects_unknown_type() {
        let err = Config::from_json_str(r#"{"type": "nope"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownType(_)));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let cfg = Config::from_json_str(r#"{"totally_unknown_key": 42}"#).unwrap();
        assert_eq!(cfg.solver_type, SolverType::Ymsat2);
    }
}
