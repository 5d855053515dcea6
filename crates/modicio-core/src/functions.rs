//! Predefined functions invoked by node scripts
//!
//! The registry is a plain name -> fn table populated at construction.
//! A script names its function, binds the function's parameters to
//! attribute names through its resolver, and either returns the result
//! (`button` scripts) or writes it back into the instance.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;

use crate::accessor::Accessor;
use crate::errors::{ModicioError, Result};
use crate::model::{Instance, Model, Script};
use crate::ops::set_attribute_value;

/// Date format of date-valued attributes read by predefined functions
pub const DATE_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Script action type whose output is returned instead of stored
pub const ACTION_BUTTON: &str = "button";

/// Function arguments keyed by parameter name
pub type Arguments = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionOutput {
    /// Attribute the result belongs in; empty defers to the script
    pub output_attribute: String,
    pub value: String,
}

pub type PredefinedFn = fn(&Arguments) -> Result<FunctionOutput>;

#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<&'static str, PredefinedFn>,
}

impl Default for FunctionRegistry {
    /// Registry with the built-in functions
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("checkDeadline", check_deadline);
        registry.register("calculateRemainingHours", calculate_remaining_hours);
        registry.register("resetInt", reset_int);
        registry
    }
}

impl FunctionRegistry {
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &'static str, function: PredefinedFn) {
        self.functions.insert(name, function);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Names in sorted order
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// # Errors
    /// * `FunctionNotFound` - `name` is not registered
    /// * whatever the function itself rejects
    pub fn call(&self, name: &str, args: &Arguments) -> Result<FunctionOutput> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| ModicioError::FunctionNotFound {
                name: name.to_string(),
            })?;
        function(args)
    }
}

fn arg<'a>(args: &'a Arguments, name: &str) -> Result<&'a str> {
    args.get(name)
        .map(|s| s.trim())
        .ok_or_else(|| ModicioError::InvalidInput {
            reason: format!("missing argument '{}'", name),
        })
}

fn parse_date(value: &str, name: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATE_FORMAT).map_err(|e| ModicioError::InvalidInput {
        reason: format!("argument '{}' is not a date ({}): {}", name, DATE_FORMAT, e),
    })
}

fn parse_int(value: &str, name: &str) -> Result<i64> {
    value.parse().map_err(|_| ModicioError::InvalidInput {
        reason: format!("argument '{}' is not an integer: {}", name, value),
    })
}

/// `IsDeadLineCrossed` := endTime is after deadline
fn check_deadline(args: &Arguments) -> Result<FunctionOutput> {
    let deadline = parse_date(arg(args, "deadline")?, "deadline")?;
    let end_time = parse_date(arg(args, "endTime")?, "endTime")?;
    Ok(FunctionOutput {
        output_attribute: "IsDeadLineCrossed".to_string(),
        value: (end_time > deadline).to_string(),
    })
}

/// `RemainingHours` := totalHours - hoursWorked
fn calculate_remaining_hours(args: &Arguments) -> Result<FunctionOutput> {
    let total = parse_int(arg(args, "totalHours")?, "totalHours")?;
    let worked = parse_int(arg(args, "hoursWorked")?, "hoursWorked")?;
    let remaining = total
        .checked_sub(worked)
        .ok_or_else(|| ModicioError::InvalidInput {
            reason: format!("remaining hours overflow: {} - {}", total, worked),
        })?;
    Ok(FunctionOutput {
        output_attribute: "RemainingHours".to_string(),
        value: remaining.to_string(),
    })
}

fn reset_int(_args: &Arguments) -> Result<FunctionOutput> {
    Ok(FunctionOutput {
        output_attribute: String::new(),
        value: "0".to_string(),
    })
}

/// Parse a resolver such as `{startTime=StartTime, endTime=EndTime}` into
/// `(parameter, attribute name)` pairs
///
/// # Errors
/// * `InvalidInput` - an entry is not `param=Attribute`
pub fn parse_resolver(resolver: &str) -> Result<Vec<(String, String)>> {
    let inner = resolver
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}');
    inner
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((param, attribute)) if !param.trim().is_empty() && !attribute.trim().is_empty() => {
                Ok((param.trim().to_string(), attribute.trim().to_string()))
            }
            _ => Err(ModicioError::InvalidInput {
                reason: format!("malformed resolver entry '{}'", entry),
            }),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// `button` scripts hand their value back to the caller
    Returned(String),
    /// Other scripts store the value in the instance
    Written { attribute: String, value: String },
}

/// Execute `script` against the root object of `instance`
///
/// # Errors
/// * `InvalidInput` - malformed resolver, or arguments the function rejects
/// * `AttributeNotFound` - a bound or output attribute is missing
/// * `FunctionNotFound` - the script names an unregistered function
pub fn run_script(
    registry: &FunctionRegistry,
    script: &Script,
    model: &Model,
    instance: &mut Instance,
) -> Result<ScriptOutcome> {
    let bindings = parse_resolver(&script.resolver)?;
    let args: Arguments = {
        let accessor = Accessor::for_object(model, instance, &instance.model_root)?;
        bindings
            .into_iter()
            .map(|(param, attribute)| {
                accessor
                    .deep_value_by_name(&attribute)
                    .map(|value| (param, value.to_string()))
                    .ok_or(ModicioError::AttributeNotFound { name: attribute })
            })
            .collect::<Result<_>>()?
    };

    let output = registry.call(&script.name, &args)?;
    if script.action_type.eq_ignore_ascii_case(ACTION_BUTTON) {
        return Ok(ScriptOutcome::Returned(output.value));
    }

    let attribute = if output.output_attribute.is_empty() {
        script.any_value.clone()
    } else {
        output.output_attribute
    };
    set_attribute_value(model, instance, &attribute, output.value.clone())?;
    Ok(ScriptOutcome::Written {
        attribute,
        value: output.value,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::{Attribute, Node};
    use crate::ops::create_instance;

    fn args(pairs: &[(&str, &str)]) -> Arguments {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_check_deadline() {
        let registry = FunctionRegistry::default();
        let crossed = registry
            .call(
                "checkDeadline",
                &args(&[
                    ("deadline", "01.03.2024 12:00:00"),
                    ("endTime", "02.03.2024 08:30:00"),
                ]),
            )
            .unwrap();
        assert_eq!(crossed.output_attribute, "IsDeadLineCrossed");
        assert_eq!(crossed.value, "true");

        let bad = registry.call(
            "checkDeadline",
            &args(&[("deadline", "2024-03-01"), ("endTime", "02.03.2024 08:30:00")]),
        );
        assert!(matches!(bad, Err(ModicioError::InvalidInput { .. })));
    }

    #[test]
    fn test_remaining_hours_overflow_is_rejected() {
        let registry = FunctionRegistry::default();
        let ok = registry
            .call(
                "calculateRemainingHours",
                &args(&[("totalHours", "40"), ("hoursWorked", "12")]),
            )
            .unwrap();
        assert_eq!(ok.value, "28");

        let max = i64::MAX.to_string();
        let min = i64::MIN.to_string();
        let overflow = registry.call(
            "calculateRemainingHours",
            &args(&[
                ("totalHours", max.as_str()),
                ("hoursWorked", "-1"),
            ]),
        );
        assert!(matches!(overflow, Err(ModicioError::InvalidInput { .. })));

        let underflow = registry.call(
            "calculateRemainingHours",
            &args(&[
                ("totalHours", min.as_str()),
                ("hoursWorked", "1"),
            ]),
        );
        assert!(matches!(underflow, Err(ModicioError::InvalidInput { .. })));
    }

    #[test]
    fn test_unknown_function() {
        let registry = FunctionRegistry::default();
        assert!(matches!(
            registry.call("launchRocket", &Arguments::new()),
            Err(ModicioError::FunctionNotFound { .. })
        ));
        assert_eq!(
            registry.names(),
            vec!["calculateRemainingHours", "checkDeadline", "resetInt"]
        );
    }

    #[test]
    fn test_parse_resolver() {
        let pairs = parse_resolver("{startTime=StartTime, endTime=EndTime}").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("startTime".to_string(), "StartTime".to_string()),
                ("endTime".to_string(), "EndTime".to_string())
            ]
        );
        assert!(parse_resolver("{}").unwrap().is_empty());
        assert!(parse_resolver("{broken}").is_err());
    }

    fn timesheet() -> Model {
        let mut sheet = Node::new("modicio:Sheet", "Sheet", false);
        for name in ["TotalHours", "HoursWorked", "RemainingHours"] {
            sheet
                .attributes
                .push(Attribute::new(format!("modicio:{}", name), name, "Integer"));
        }
        Model::from_nodes([sheet]).unwrap()
    }

    fn script(name: &str, action_type: &str, resolver: &str, any_value: &str) -> Script {
        Script {
            uri: format!("modicio:script.{}", name),
            name: name.into(),
            action_type: action_type.into(),
            resolver: resolver.into(),
            any_value: any_value.into(),
        }
    }

    #[test]
    fn test_run_script_writes_back() {
        let model = timesheet();
        let mut instance = create_instance(&model, "modicio:Sheet", "s", "inst:s").unwrap();
        set_attribute_value(&model, &mut instance, "TotalHours", "40").unwrap();
        set_attribute_value(&model, &mut instance, "HoursWorked", "12").unwrap();

        let remaining = script(
            "calculateRemainingHours",
            "trigger",
            "{totalHours=TotalHours, hoursWorked=HoursWorked}",
            "",
        );
        let outcome = run_script(&FunctionRegistry::default(), &remaining, &model, &mut instance).unwrap();
        assert_eq!(
            outcome,
            ScriptOutcome::Written {
                attribute: "RemainingHours".into(),
                value: "28".into()
            }
        );

        let reset = script("resetInt", "trigger", "{}", "HoursWorked");
        run_script(&FunctionRegistry::default(), &reset, &model, &mut instance).unwrap();
        let accessor = Accessor::for_object(&model, &instance, "modicio:Sheet").unwrap();
        assert_eq!(accessor.deep_value_by_name("HoursWorked"), Some("0"));
    }

    #[test]
    fn test_button_returns_without_writing() {
        let model = timesheet();
        let mut instance = create_instance(&model, "modicio:Sheet", "s", "inst:s").unwrap();
        set_attribute_value(&model, &mut instance, "TotalHours", "8").unwrap();
        set_attribute_value(&model, &mut instance, "HoursWorked", "3").unwrap();
        let before = instance.clone();

        let button = script(
            "calculateRemainingHours",
            "BUTTON",
            "{totalHours=TotalHours, hoursWorked=HoursWorked}",
            "",
        );
        let outcome = run_script(&FunctionRegistry::default(), &button, &model, &mut instance).unwrap();
        assert_eq!(outcome, ScriptOutcome::Returned("5".into()));
        assert_eq!(instance, before);
    }
}
