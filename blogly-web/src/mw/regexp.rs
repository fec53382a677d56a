use std::collections::HashMap;

use regex::Regex;

/// Pattern used for a parameter declared without one, e.g: `{id}`
static DEFAULT_PATTERN: &str = "[^/]*";

/// An anchored regex built from a route template such as `/users/{id}`,
/// with one named capture group per `{parameter}`.
#[derive(Clone, Debug)]
pub struct Expression {
    names: Vec<String>,
    regex: Regex,
}

/// One piece of a template: the literal text preceding a parameter,
/// and the parameter itself (`name` or `name:pattern`).
#[derive(Debug, PartialEq)]
struct Segment {
    literal: String,
    param: String,
}

impl Expression {
    /// Parameters are written `{name}`, which matches one path segment,
    /// or `{name:pattern}` to supply the regex yourself, e.g:
    /// `/files/{path:.+}`. Everything outside braces must match verbatim.
    pub fn from_template(template: &str) -> Result<Expression, String> {
        let (segments, trailing) = extract_segments(template)?;

        let mut regex_string = String::from("^");
        let mut names = Vec::with_capacity(segments.len());

        for segment in segments {
            let (name, patt) = match segment.param.find(':') {
                Some(idx) => (&segment.param[..idx], &segment.param[idx + 1..]),
                None => (&segment.param[..], DEFAULT_PATTERN),
            };

            if name.is_empty() || patt.is_empty() {
                return Err(format!("missing name or pattern in: {}", template));
            }

            regex_string.push_str(&regex::escape(&segment.literal));
            regex_string.push_str(&format!("(?P<{}>{})", name, patt));
            names.push(name.to_string());
        }

        regex_string.push_str(&regex::escape(&trailing));
        regex_string.push('$');
        debug!("generated route regex: {}", regex_string);

        let regex = Regex::new(&regex_string)
            .map_err(|err| format!("invalid route pattern {}: {}", template, err))?;

        Ok(Expression { names, regex })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Binds each named parameter to the portion of `path` it matched.
    ///
    /// Returns an empty map if the path does not match at all.
    pub fn map_path(&self, path: &str) -> HashMap<String, String> {
        let mut results = HashMap::new();

        if let Some(captures) = self.regex.captures(path) {
            for name in &self.names {
                if let Some(binding) = captures.name(name) {
                    results.insert(name.clone(), binding.as_str().to_string());
                }
            }
        }

        results
    }
}

/// Splits a template string into its parameter segments and the
/// literal suffix after the last closing brace.
///
/// Fails if a parameter contains a nested `{` or if the braces are
/// unbalanced.
fn extract_segments(input: &str) -> Result<(Vec<Segment>, String), String> {
    let mut segments = vec![];
    let mut literal = String::new();
    let mut param = String::new();
    let mut in_param = false;

    for token in input.chars() {
        match (token, in_param) {
            ('{', false) => in_param = true,
            ('}', true) => {
                segments.push(Segment {
                    literal: std::mem::take(&mut literal),
                    param: std::mem::take(&mut param),
                });
                in_param = false;
            },

            ('{', true) | ('}', false) => {
                return Err(format!("mismatched braces in route pattern: {}", input));
            },

            (_, true) => param.push(token),
            (_, false) => literal.push(token),
        }
    }

    if in_param {
        return Err(format!("missing closing brace in route pattern: {}", input));
    }

    Ok((segments, literal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_template() {
        if let Err(e) = Expression::from_template("/{foo}/{bar}") {
            panic!("{}", e);
        }
    }

    #[test]
    fn test_match_template() {
        let exp = Expression::from_template("/users/{id}/posts/new").unwrap();
        let result = exp.map_path("/users/7/posts/new");

        assert_eq!(result.get("id").map(|s| &s[..]), Some("7"));
        assert!(!exp.is_match("/users/7/posts"));
    }

    #[test]
    fn test_template_extractor_count() {
        let pass_cases = [(1, "/foo/{bar}"), (2, "/{foo}/{bar}"), (1, "/foo/{bar}/baz")];
        let fail_cases = ["/{foo{bar}}/baz", "/{foo/bar", "/foo}/bar"];

        for &(expected, template) in pass_cases.iter() {
            let (segments, _) = extract_segments(template).unwrap();
            assert_eq!(expected, segments.len());
        }

        for template in fail_cases.iter() {
            assert!(extract_segments(template).is_err(), "{} should not parse", template);
        }
    }

    #[test]
    fn test_no_extractions() {
        let template = Expression::from_template("/tags/new").unwrap();

        assert!(template.is_match("/tags/new"));
        assert!(!template.is_match("/tags/news"));
        assert!(template.map_path("/tags/new").is_empty());
    }

    #[test]
    fn test_custom_pattern() {
        let template = Expression::from_template("/posts/{id:[0-9]+}").unwrap();

        assert!(template.is_match("/posts/12"));
        assert!(!template.is_match("/posts/twelve"));
    }

    #[test]
    fn test_groups_inside_pattern_keep_later_params() {
        let template = Expression::from_template("/{kind:(posts|tags)}/{id}").unwrap();
        let result = template.map_path("/tags/9");

        assert_eq!(result.get("kind").map(|s| &s[..]), Some("tags"));
        assert_eq!(result.get("id").map(|s| &s[..]), Some("9"));
    }

    #[test]
    fn test_invalid_param_name_is_rejected() {
        assert!(Expression::from_template("/foo/{bad name}").is_err());
    }

    #[test]
    fn test_literals_are_escaped() {
        let template = Expression::from_template("/static/app.css").unwrap();

        assert!(template.is_match("/static/app.css"));
        assert!(!template.is_match("/static/appxcss"));
    }

    #[test]
    fn test_template_extractor_values() {
        let (segments, trailing) = extract_segments("/foo/{bar:pat}/edit").unwrap();

        assert_eq!(segments, vec![Segment { literal: "/foo/".to_string(), param: "bar:pat".to_string() }]);
        assert_eq!(trailing, "/edit");
    }

    #[test]
    fn test_empty_name_is_rejected() {
        assert!(Expression::from_template("/foo/{:[0-9]+}").is_err());
    }
}
