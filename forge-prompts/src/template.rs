//! Prompt templates with `{{variable}}` substitution.

use std::fmt;

/// Result alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur during template operations.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// A placeholder names a variable nobody supplies.
    #[error("missing required variable: {name}")]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
    },

    /// A placeholder was opened but never closed.
    #[error("unterminated placeholder at byte {offset}")]
    Unterminated {
        /// Byte offset of the opening braces.
        offset: usize,
    },
}

/// A prompt template with variable substitution.
///
/// Placeholders use `{{name}}`. Single braces are literal text, so JSON
/// examples embedded in a contract survive rendering untouched. Every
/// placeholder must be supplied when rendering.
///
/// # Examples
///
/// ```
/// use forge_prompts::template::PromptTemplate;
///
/// let template = PromptTemplate::parse("At least {{min_topics}} as {\"TOPIC\":\"CONTENT\"}.")
///     .unwrap();
///
/// let rendered = template.render_with_value("min_topics", "5").unwrap();
/// assert_eq!(rendered, "At least 5 as {\"TOPIC\":\"CONTENT\"}.");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Wraps `template` without checking it; a dangling `{{` surfaces on render.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Wraps `template` after checking that every `{{` is closed.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Unterminated`] for a dangling `{{`.
    pub fn parse(template: impl Into<String>) -> TemplateResult<Self> {
        let parsed = Self::new(template);
        parsed.substitute(|_| Some(""))?;
        Ok(parsed)
    }

    /// Renders the template with `name` bound to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingVariable`] when a placeholder names any
    /// other variable, or [`TemplateError::Unterminated`] for a dangling `{{`.
    pub fn render_with_value(&self, name: &str, value: &str) -> TemplateResult<String> {
        self.substitute(|placeholder| (placeholder == name).then_some(value))
    }

    /// Returns the raw template string.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    fn substitute<'v>(&self, lookup: impl Fn(&str) -> Option<&'v str>) -> TemplateResult<String> {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        let mut consumed = 0;

        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after_open = &rest[open + 2..];
            let close = after_open.find("}}").ok_or(TemplateError::Unterminated {
                offset: consumed + open,
            })?;

            let name = after_open[..close].trim();
            let value = lookup(name).ok_or_else(|| TemplateError::MissingVariable {
                name: name.to_owned(),
            })?;
            out.push_str(value);

            let advance = open + 2 + close + 2;
            consumed += advance;
            rest = &rest[advance..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_whitespace_is_ignored() {
        let template = PromptTemplate::parse("at least {{ min_topics }} items").unwrap();
        let rendered = template.render_with_value("min_topics", "10").unwrap();
        assert_eq!(rendered, "at least 10 items");
    }

    #[test]
    fn unknown_placeholder_is_missing() {
        let template = PromptTemplate::parse("at least {{min_topics}} for {{audience}}").unwrap();

        let err = template
            .render_with_value("min_topics", "3")
            .expect_err("audience is never supplied");
        assert!(matches!(err, TemplateError::MissingVariable { ref name } if name == "audience"));
    }

    #[test]
    fn template_without_placeholders_renders_verbatim() {
        let template = PromptTemplate::new("Answer in JSON.");
        assert_eq!(
            template.render_with_value("min_topics", "5").unwrap(),
            "Answer in JSON."
        );
    }

    #[test]
    fn single_braces_are_literal() {
        let template = PromptTemplate::new(r#"{"<TOPIC>":"<RESULT>"} x{{n}}"#);
        let rendered = template.render_with_value("n", "2").unwrap();
        assert_eq!(rendered, r#"{"<TOPIC>":"<RESULT>"} x2"#);
    }

    #[test]
    fn rejects_unterminated_placeholder() {
        let err = PromptTemplate::parse("oops {{name").expect_err("dangling");
        assert!(matches!(err, TemplateError::Unterminated { offset: 5 }));

        let unchecked = PromptTemplate::new("oops {{name");
        assert!(unchecked.render_with_value("name", "x").is_err());
    }
}
