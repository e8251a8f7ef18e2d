use std::collections::BTreeMap;
use std::ops::Range;

/// A shell variable reference of a command recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Variable<'a> {
    name: &'a str,
    range: Range<usize>,
    /// `$NAME` or `${NAME}`, without parameter expansion operators.
    simple: bool,
}

/// A recipe with its placeholders replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// Placeholders without a value, in order of first appearance.
    pub unresolved: Vec<String>,
}

/// Returns the distinct `$NAME` and `${NAME}` placeholders of a recipe.
///
/// Positional and special parameters like `$1` or `$?` are not placeholders. Text in single
/// quotes is not expanded by the shell and is skipped.
pub fn placeholders(code: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for variable in variables(code) {
        if !names.iter().any(|name| name == variable.name) {
            names.push(variable.name.to_owned());
        }
    }
    names
}

/// Substitutes the placeholders of a recipe with the given values.
///
/// Only plain references are substituted; `${NAME:-default}` and similar expansions are left to
/// the shell. Placeholders without a value are kept as they are.
pub fn render(code: &str, values: &BTreeMap<String, String>) -> Rendered {
    let mut text = String::with_capacity(code.len());
    let mut unresolved: Vec<String> = Vec::new();
    let mut last = 0;
    for variable in variables(code) {
        match values.get(variable.name) {
            Some(value) if variable.simple => {
                text.push_str(&code[last..variable.range.start]);
                text.push_str(value);
                last = variable.range.end;
            }
            Some(_) => (),
            None => {
                if !unresolved.iter().any(|name| name == variable.name) {
                    unresolved.push(variable.name.to_owned());
                }
            }
        }
    }
    text.push_str(&code[last..]);
    Rendered { text, unresolved }
}

fn variables(code: &str) -> Vec<Variable<'_>> {
    let bytes = code.as_bytes();
    let mut variables = Vec::new();
    let mut single = false;
    let mut double = false;
    let mut word_start = true;
    let mut position = 0;
    while position < bytes.len() {
        let byte = bytes[position];
        if !single && !double {
            if byte == b'#' && word_start {
                position = bytes[position..]
                    .iter()
                    .position(|byte| *byte == b'\n')
                    .map_or(bytes.len(), |offset| position + offset);
                continue;
            }
            word_start = byte.is_ascii_whitespace() || b";|&()".contains(&byte);
        }
        match byte {
            b'\\' if !single => {
                position += 2;
                continue;
            }
            b'\'' if !double => single = !single,
            b'"' if !single => double = !double,
            b'$' if !single => {
                if let Some(variable) = variable_at(code, position) {
                    position = variable.range.end;
                    variables.push(variable);
                    continue;
                }
            }
            _ => (),
        }
        position += 1;
    }
    variables
}

/// Parses the variable reference starting with the `$` at `start`.
fn variable_at(code: &str, start: usize) -> Option<Variable<'_>> {
    let bytes = code.as_bytes();
    if bytes.get(start + 1) == Some(&b'{') {
        let name_start = start + 2;
        let name_end = name_end(bytes, name_start)?;
        let close = name_end + bytes[name_end..].iter().position(|byte| *byte == b'}')?;
        Some(Variable {
            name: &code[name_start..name_end],
            range: start..close + 1,
            simple: close == name_end,
        })
    } else {
        let name_end = name_end(bytes, start + 1)?;
        Some(Variable {
            name: &code[start + 1..name_end],
            range: start..name_end,
            simple: true,
        })
    }
}

/// Returns the end of the shell name starting at `start`, if there is one.
fn name_end(bytes: &[u8], start: usize) -> Option<usize> {
    let first = *bytes.get(start)?;
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }
    Some(
        bytes[start..]
            .iter()
            .position(|byte| !(byte.is_ascii_alphanumeric() || *byte == b'_'))
            .map_or(bytes.len(), |offset| start + offset),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPE: &str = "java -jar void-generator.jar -r \"$ENDPOINT\" \\\n  --iri-of-void \"${BASE}/.well-known/void\" -s void_${NAME}.ttl \\\n  --threads ${THREADS:-4} '$NOT_EXPANDED' $1 $? && echo $NAME";

    #[test]
    fn placeholders_in_order_of_appearance() {
        assert_eq!(
            placeholders(RECIPE),
            ["ENDPOINT", "BASE", "NAME", "THREADS"]
        );
    }

    #[test]
    fn escaped_dollar_is_not_a_placeholder() {
        assert!(placeholders("echo \\$HOME '${X}'").is_empty());
    }

    #[test]
    fn render_substitutes_known_values() {
        let values = BTreeMap::from([
            ("NAME".to_owned(), "METRINKG".to_owned()),
            ("THREADS".to_owned(), "8".to_owned()),
            ("BASE".to_owned(), "https://example.org".to_owned()),
        ]);
        let rendered = render(RECIPE, &values);
        assert_eq!(
            rendered.text,
            "java -jar void-generator.jar -r \"$ENDPOINT\" \\\n  --iri-of-void \"https://example.org/.well-known/void\" -s void_METRINKG.ttl \\\n  --threads ${THREADS:-4} '$NOT_EXPANDED' $1 $? && echo METRINKG"
        );
        assert_eq!(rendered.unresolved, ["ENDPOINT"]);
    }

    #[test]
    fn comments_are_not_recipe_text() {
        let code = "# don't forget to set the endpoint\nqlever start --name $NAME --port ${PORT} # $UNUSED\necho a#$HASH\n";
        assert_eq!(placeholders(code), ["NAME", "PORT", "HASH"]);
        let values = BTreeMap::from([("NAME".to_owned(), "x".to_owned())]);
        let rendered = render(code, &values);
        assert!(rendered.text.contains("qlever start --name x --port ${PORT} # $UNUSED"));
        assert_eq!(rendered.unresolved, ["PORT", "HASH"]);
    }
}
