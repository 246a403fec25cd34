use crate::domain::error::MatcherError;
use crate::domain::json_path::{self, JsonPath};
use crate::domain::matcher::{Matcher, MatchingType};
use crate::domain::value::Value;
use crate::engine::query;

/// Compiles a matcher into a filter expression over its parent path,
/// e.g. `$[?(@.id == 5)]`.
///
/// Equality matchers read their expected value from `body`, which must be the
/// original, unpruned document.
pub fn compile_predicate(matcher: &Matcher, body: Option<&Value>) -> Result<String, MatcherError> {
    let path = JsonPath::parse(&matcher.path)?;
    let predicate = match matcher.matching_type {
        MatchingType::ByEquality => equality_predicate(matcher, &path, body)?,
        MatchingType::ByType => occurrence_predicate(matcher, &path)?,
        MatchingType::ByRegex => match &matcher.value {
            Some(pattern) => regex_predicate(&path, pattern),
            None => return Ok(matcher.path.clone()),
        },
    };
    Ok(predicate)
}

fn equality_predicate(
    matcher: &Matcher,
    path: &JsonPath,
    body: Option<&Value>,
) -> Result<String, MatcherError> {
    let Some(body) = body else {
        return Err(MatcherError::MissingBody {
            path: matcher.path.clone(),
        });
    };
    let nodes = query::read(body, path).map_err(|_| MatcherError::UnresolvedPath {
        path: matcher.path.clone(),
        document: body.to_json().to_string(),
    })?;
    let literal = match nodes.first() {
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::String(text)) => json_path::quote(text),
        Some(Value::Bool(flag)) => json_path::quote(&flag.to_string()),
        Some(Value::Null) => json_path::quote("null"),
        other => {
            return Err(MatcherError::UnsupportedValue {
                path: matcher.path.clone(),
                kind: other.map_or("nothing", |value| value.type_name()),
            });
        }
    };
    let (parent, property) = path.split_property();
    Ok(format!("{parent}[?({property} == {literal})]"))
}

fn occurrence_predicate(matcher: &Matcher, path: &JsonPath) -> Result<String, MatcherError> {
    let (parent, property) = path.split_property();
    let bounds: Vec<String> = [
        matcher
            .min_occurrence
            .map(|min| format!("{property}.size() >= {min}")),
        matcher
            .max_occurrence
            .map(|max| format!("{property}.size() <= {max}")),
    ]
    .into_iter()
    .flatten()
    .collect();
    if bounds.is_empty() {
        return Err(MatcherError::MissingOccurrence {
            path: matcher.path.clone(),
        });
    }
    Ok(format!("{parent}[?({})]", bounds.join(" && ")))
}

fn regex_predicate(path: &JsonPath, pattern: &str) -> String {
    let (parent, property) = path.split_property();
    format!(
        "{parent}[?({property} =~ {})]",
        json_path::regex_literal(pattern)
    )
}
