use crate::domain::value::{Template, TemplatePart};

/// Turns a templated string into an equivalent regular expression.
///
/// Implementations decide how dynamic parts are rendered for the side that
/// will run the generated checks.
pub trait TemplateResolver {
    fn to_regex(&self, template: &Template) -> String;
}

/// Escapes literal parts and splices dynamic parts in as their own patterns.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapingResolver;

impl TemplateResolver for EscapingResolver {
    fn to_regex(&self, template: &Template) -> String {
        template
            .parts()
            .iter()
            .map(|part| match part {
                TemplatePart::Literal(text) => regex::escape(text),
                TemplatePart::Dynamic(pattern) => pattern.as_str().to_string(),
            })
            .collect()
    }
}
