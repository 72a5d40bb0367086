use super::{Action, ActionPlan, ScriptError};
use regex::Regex;
use std::time::Duration;

/// Parses action script text into ordered plans
///
/// # Arguments
///
/// * `source` - The script text
///
/// # Returns
///
/// * `Ok(Vec<ActionPlan>)` - Plans in file order
/// * `Err(ScriptError)` - The first malformed line
pub(crate) fn parse_script(source: &str) -> Result<Vec<ActionPlan>, ScriptError> {
    let mut plans: Vec<ActionPlan> = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') && line.len() >= 2 {
            let pattern = &line[1..line.len() - 1];
            let regex = Regex::new(pattern).map_err(|source| ScriptError::InvalidPattern {
                line: line_no,
                pattern: pattern.to_string(),
                source,
            })?;
            plans.push(ActionPlan {
                pattern: regex,
                actions: Vec::new(),
            });
            continue;
        }

        let action = parse_action(line, line_no)?;
        match plans.last_mut() {
            Some(plan) => plan.actions.push(action),
            None => return Err(ScriptError::MissingHeader { line: line_no }),
        }
    }

    Ok(plans)
}

fn parse_action(line: &str, line_no: usize) -> Result<Action, ScriptError> {
    let mut parts = line.split_whitespace();
    let keyword = parts.next().unwrap_or_default().to_uppercase();
    let args: Vec<&str> = parts.collect();

    match keyword.as_str() {
        "SLEEP" => {
            let value = single_arg(&args, "SLEEP", "exactly 1 (seconds)", line_no)?;
            let pause = value
                .parse::<f64>()
                .ok()
                .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
                .ok_or_else(|| ScriptError::InvalidNumber {
                    line: line_no,
                    keyword: "SLEEP",
                    value: value.to_string(),
                })?;
            Ok(Action::Sleep(pause))
        }
        "SCROLL" => {
            let value = single_arg(&args, "SCROLL", "exactly 1 (pixels)", line_no)?;
            let pixels: i64 = value.parse().map_err(|_| ScriptError::InvalidNumber {
                line: line_no,
                keyword: "SCROLL",
                value: value.to_string(),
            })?;
            Ok(Action::Scroll(pixels))
        }
        "INPUT" => {
            if args.len() < 2 {
                return Err(ScriptError::ArgumentCount {
                    line: line_no,
                    keyword: "INPUT",
                    expected: "a selector and text",
                    found: args.len(),
                });
            }
            Ok(Action::Input {
                selector: args[0].to_string(),
                text: args[1..].join(" "),
            })
        }
        "CLICK" => Ok(Action::Click(selector_arg(&args, "CLICK", line_no)?)),
        "CLICK_IF_EXISTS" => Ok(Action::ClickIfExists(selector_arg(
            &args,
            "CLICK_IF_EXISTS",
            line_no,
        )?)),
        _ => Err(ScriptError::UnknownAction {
            line: line_no,
            keyword: keyword.clone(),
        }),
    }
}

fn single_arg<'a>(
    args: &[&'a str],
    keyword: &'static str,
    expected: &'static str,
    line_no: usize,
) -> Result<&'a str, ScriptError> {
    match args {
        [value] => Ok(*value),
        _ => Err(ScriptError::ArgumentCount {
            line: line_no,
            keyword,
            expected,
            found: args.len(),
        }),
    }
}

fn selector_arg(args: &[&str], keyword: &'static str, line_no: usize) -> Result<String, ScriptError> {
    if args.is_empty() {
        return Err(ScriptError::ArgumentCount {
            line: line_no,
            keyword,
            expected: "a selector",
            found: 0,
        });
    }
    Ok(args.join(" "))
}
