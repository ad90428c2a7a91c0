//! Template expansion for action commands.
//!
//! Supports `{{variable_name}}` syntax. Unknown variables are left as-is.
//! Substituted values are single-quoted so they reach the shell as one word.

use std::collections::HashMap;

use crate::jobs::{Job, JobAction};

/// Expand `{{variable_name}}` patterns, shell-quoting every substituted value.
///
/// Unknown names and partial syntax like `{{incomplete` are left literally.
/// Names containing whitespace are not variable references.
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn expand_command(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        let reference = after_open.find("}}").and_then(|close| {
            let name = &after_open[..close];
            (!name.is_empty() && !name.contains(char::is_whitespace)).then_some((name, close))
        });
        match reference {
            Some((name, close)) => {
                match vars.get(name) {
                    Some(value) => result.push_str(&shell_quote(value)),
                    None => result.push_str(&rest[open..open + 2 + close + 2]),
                }
                rest = &after_open[close + 2..];
            }
            None => {
                result.push_str("{{");
                rest = after_open;
            }
        }
    }

    result.push_str(rest);
    result
}

/// Quote `value` for a POSIX shell.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Variables available to action commands.
#[must_use]
pub fn job_vars(job: &Job, action: JobAction) -> HashMap<&'static str, String> {
    HashMap::from([
        ("job_name", job.name.clone()),
        ("job_full_name", job.full_name.clone().unwrap_or_default()),
        ("job_display_name", job.display_name().to_string()),
        ("job_url", job.url.clone()),
        ("action", action.as_str().to_string()),
    ])
}
