//! "Did you mean" hints for template errors

pub const AVAILABLE_FILTERS: &[&str] = &[
    // registered by the engine
    "toyaml",
    "tojson",
    "b64encode",
    "b64decode",
    "quote",
    "squote",
    "nindent",
    "indent",
    "required",
    "empty",
    "haskey",
    "merge",
    "trunc",
    "trimprefix",
    "trimsuffix",
    // MiniJinja builtins
    "default",
    "lower",
    "upper",
    "title",
    "trim",
    "replace",
    "join",
    "length",
    "first",
    "last",
    "sort",
    "unique",
    "list",
    "items",
    "int",
    "float",
    "string",
    "urlencode",
];

pub const AVAILABLE_FUNCTIONS: &[&str] = &[
    "fail",
    "dict",
    "list",
    "get",
    "coalesce",
    "ternary",
    "tostring",
    "toint",
    "artifact_id",
    "range",
    "namespace",
];

/// Closest names within an edit distance of two, best first
pub fn closest<'a>(name: &str, candidates: &[&'a str]) -> Vec<&'a str> {
    let mut scored: Vec<(usize, &str)> = candidates
        .iter()
        .map(|c| (strsim::levenshtein(name, c), *c))
        .filter(|(distance, _)| *distance > 0 && *distance <= 2)
        .collect();
    scored.sort();
    scored.into_iter().take(3).map(|(_, c)| c).collect()
}

pub fn did_you_mean(name: &str, candidates: &[&str], what: &str) -> String {
    let matches = closest(name, candidates);
    if matches.is_empty() {
        format!("Unknown {what} `{name}`")
    } else {
        let list: Vec<String> = matches.iter().map(|m| format!("`{m}`")).collect();
        format!("Did you mean {}?", list.join(" or "))
    }
}

/// First filter on `line` that the engine does not know
pub fn unknown_filter_in(line: &str) -> Option<String> {
    line.split('|')
        .skip(1)
        .filter_map(|part| leading_ident(part.trim_start()))
        .find(|name| !AVAILABLE_FILTERS.contains(&name.as_str()))
}

/// First call on `line` to a function the engine does not know
pub fn unknown_function_in(line: &str) -> Option<String> {
    let mut rest = line;
    while let Some(open) = rest.find('(') {
        let before = &rest[..open];
        let start = before
            .rfind(|c: char| !(c.is_alphanumeric() || c == '_'))
            .map(|i| i + 1)
            .unwrap_or(0);
        let name = &before[start..];
        let is_method = before[..start].ends_with('.');
        if !name.is_empty() && !is_method && !AVAILABLE_FUNCTIONS.contains(&name) && !AVAILABLE_FILTERS.contains(&name) {
            return Some(name.to_string());
        }
        rest = &rest[open + 1..];
    }
    None
}

fn leading_ident(s: &str) -> Option<String> {
    let end = s
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    (end > 0).then(|| s[..end].to_string())
}
