//! URI template expansion for templated links.
//!
//! Covers the RFC 6570 operators HAL servers commonly emit:
//!
//! - `{var}` - simple, percent-encoded
//! - `{+var}` - reserved, left unencoded
//! - `{#var}` - fragment
//! - `{.var}` - label
//! - `{/var}` - path segments
//! - `{?a,b}` - query component
//! - `{&a}` - query continuation
//!
//! Unbound variables are dropped from the expansion. Prefix (`:N`) and explode
//! (`*`) modifiers are accepted but not applied.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex for matching template expressions like {?filter,page}
static EXPR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([+#./?&]?)([^}]*)\}").unwrap());

/// Variables bound during expansion.
pub type TemplateVars = HashMap<String, String>;

/// Expand all expressions in `template`.
pub fn expand(template: &str, vars: &TemplateVars) -> String {
    EXPR_REGEX
        .replace_all(template, |caps: &regex::Captures| {
            expand_expression(&caps[1], &caps[2], vars)
        })
        .to_string()
}

/// Names of all variables referenced by `template`, in order of appearance.
pub fn variables(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    for caps in EXPR_REGEX.captures_iter(template) {
        for name in caps[2].split(',').map(variable_name) {
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

fn variable_name(varspec: &str) -> &str {
    let varspec = varspec.trim();
    let varspec = varspec.trim_end_matches('*');
    match varspec.find(':') {
        Some(pos) => &varspec[..pos],
        None => varspec,
    }
}

fn expand_expression(operator: &str, varspec: &str, vars: &TemplateVars) -> String {
    let bound: Vec<(&str, &str)> = varspec
        .split(',')
        .map(variable_name)
        .filter_map(|name| vars.get(name).map(|value| (name, value.as_str())))
        .collect();

    if bound.is_empty() {
        return String::new();
    }

    let encoded = |value: &str| urlencoding::encode(value).into_owned();
    let values = |sep: &str, encode: bool| {
        bound
            .iter()
            .map(|(_, v)| if encode { encoded(*v) } else { v.to_string() })
            .collect::<Vec<_>>()
            .join(sep)
    };
    let pairs = || {
        bound
            .iter()
            .map(|(k, v)| format!("{}={}", k, encoded(*v)))
            .collect::<Vec<_>>()
            .join("&")
    };

    match operator {
        "+" => values(",", false),
        "#" => format!("#{}", values(",", false)),
        "." => format!(".{}", values(".", true)),
        "/" => format!("/{}", values("/", true)),
        "?" => format!("?{}", pairs()),
        "&" => format!("&{}", pairs()),
        _ => values(",", true),
    }
}
