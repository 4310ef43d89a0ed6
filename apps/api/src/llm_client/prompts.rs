// Shared prompt fragments and prompt-building utilities.
// Each service that needs model calls defines its own prompts.rs alongside it.
// This file contains cross-cutting pieces.

/// Closing instruction appended to every prompt that expects a JSON reply.
/// The reply parser accepts one JSON object, optionally inside a markdown fence,
/// and nothing else.
pub const JSON_ONLY_INSTRUCTION: &str = "Ответьте ОДНИМ JSON-объектом. \
    Не добавляйте текст до или после JSON. \
    Не добавляйте пояснений и извинений.";

/// Substitutes `{key}` placeholders in a single pass.
///
/// Unknown `{...}` spans are copied through untouched, so templates may embed JSON
/// examples. Substituted values are never rescanned: a candidate named `{company}`
/// stays `{company}`.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let substitution = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (close, *value))
        });

        match substitution {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_replaces_known_keys() {
        let out = fill_template("Hello {name}, welcome to {company}", &[
            ("name", "Анна"),
            ("company", "ВТБ"),
        ]);
        assert_eq!(out, "Hello Анна, welcome to ВТБ");
    }

    #[test]
    fn test_fill_template_keeps_json_braces() {
        let out = fill_template(r#"{"score": 85} for {name}"#, &[("name", "x")]);
        assert_eq!(out, r#"{"score": 85} for x"#);
    }

    #[test]
    fn test_fill_template_does_not_rescan_values() {
        let out = fill_template("{a} {b}", &[("a", "{b}"), ("b", "B")]);
        assert_eq!(out, "{b} B");
    }

    #[test]
    fn test_fill_template_unclosed_brace() {
        assert_eq!(fill_template("tail {open", &[("open", "x")]), "tail {open");
    }
}
