//! Parameterised string templates.
//!
//! Templates use ERB-style interpolation: `<%= version %>` is replaced by the
//! bound value of `version`. `<%= @version %>` is accepted as an alias,
//! `<%# ... %>` is a comment and `<%%` produces a literal `<%`. Arbitrary
//! code tags are not supported.
//!
//! A [`Template`] is an immutable value. Adding a parameter returns a new
//! template, so a base template can be shared and extended by many callers:
//!
//! ```
//! use binvendor_core::template::Template;
//!
//! let base = Template::new("tool-<%= version %>-<%= platform_os_name %>");
//! let darwin = base.with_parameter("version", "1.2.3").with_parameter("platform_os_name", "darwin");
//! assert_eq!(darwin.render().unwrap(), "tool-1.2.3-darwin");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::{Error, Result};

/// A value bound to a template parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// An explicitly absent value; renders as the empty string.
    #[default]
    Nil,
    /// A text value.
    Text(String),
}

impl Value {
    /// The rendered form of this value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Nil => "",
            Self::Text(s) => s,
        }
    }

    /// Whether this is [`Value::Nil`].
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Nil, Into::into)
    }
}

/// An ordered, read-only set of template parameters.
pub type Parameters = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A template source together with its bound parameters.
#[derive(Debug, Clone)]
pub struct Template {
    source: Arc<str>,
    parameters: Arc<Parameters>,
}

impl Template {
    /// Create a template with no parameters bound.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: Arc::from(source.into()),
            parameters: Arc::new(Parameters::new()),
        }
    }

    /// Create a template, checking its syntax up front.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if the source contains an unterminated or
    /// unsupported tag.
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let template = Self::new(source);
        parse_segments(&template.source)?;
        Ok(template)
    }

    /// The raw template source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parameters bound so far.
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Return a new template with one more parameter bound.
    ///
    /// `self` is left untouched; binding an existing key replaces its value
    /// in the returned template only.
    #[must_use]
    pub fn with_parameter(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut parameters = (*self.parameters).clone();
        parameters.insert(key.into(), value.into());
        Self {
            source: Arc::clone(&self.source),
            parameters: Arc::new(parameters),
        }
    }

    /// Return a new template with every pair bound, applied in order.
    #[must_use]
    pub fn with_parameters<K, V>(&self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut parameters = (*self.parameters).clone();
        parameters.extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        Self {
            source: Arc::clone(&self.source),
            parameters: Arc::new(parameters),
        }
    }

    /// Render the template against its bound parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] for malformed sources and
    /// [`Error::UndefinedParameter`] when a referenced parameter was never
    /// bound. A parameter bound to [`Value::Nil`] renders as empty.
    pub fn render(&self) -> Result<String> {
        let segments = parse_segments(&self.source)?;
        let mut out = String::with_capacity(self.source.len());
        for segment in &segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(name) => {
                    let value = self
                        .parameters
                        .get(name)
                        .ok_or_else(|| Error::UndefinedParameter { name: name.clone() })?;
                    out.push_str(value.as_str());
                }
            }
        }
        Ok(out)
    }

    /// Names of the parameters the template references, in order of first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] for malformed sources.
    pub fn referenced_parameters(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        for segment in parse_segments(&self.source)? {
            if let Segment::Variable(name) = segment {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }
}

/// Render `source` against `parameters` in one step.
///
/// # Errors
///
/// See [`Template::render`].
pub fn render(source: &str, parameters: &Parameters) -> Result<String> {
    Template::new(source)
        .with_parameters(parameters.iter().map(|(k, v)| (k.clone(), v.clone())))
        .render()
}

fn parse_segments(source: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = source;

    while let Some(start) = rest.find("<%") {
        literal.push_str(&rest[..start]);
        let tag = &rest[start + 2..];

        if let Some(after) = tag.strip_prefix('%') {
            literal.push_str("<%");
            rest = after;
            continue;
        }

        let end = tag
            .find("%>")
            .ok_or_else(|| Error::template(source, "unterminated '<%' tag"))?;
        let body = &tag[..end];
        rest = &tag[end + 2..];

        if body.starts_with('#') {
            continue;
        }

        let Some(expression) = body.strip_prefix('=') else {
            return Err(Error::template(
                source,
                format!("unsupported tag '<%{body}%>'; only <%= name %> is allowed"),
            ));
        };

        let name = expression.trim().trim_end_matches('-').trim_end();
        let name = name.strip_prefix('@').unwrap_or(name);
        if !is_identifier(name) {
            return Err(Error::template(
                source,
                format!("'{}' is not a parameter name", expression.trim()),
            ));
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Variable(name.to_string()));
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_version_and_os() {
        let rendered = Template::new("<%= version %>-<%= platform_os_name %>")
            .with_parameter("version", "1.2.3")
            .with_parameter("platform_os_name", "darwin")
            .render()
            .unwrap();
        assert_eq!(rendered, "1.2.3-darwin");
    }

    #[test]
    fn test_render_instance_variable_alias() {
        let rendered = Template::new("v<%= @version %>")
            .with_parameter("version", "0.9")
            .render()
            .unwrap();
        assert_eq!(rendered, "v0.9");
    }

    #[test]
    fn test_render_nil_is_empty() {
        let rendered = Template::new("tool<%= version %>.zip")
            .with_parameter("version", None::<String>)
            .render()
            .unwrap();
        assert_eq!(rendered, "tool.zip");
    }

    #[test]
    fn test_render_undefined_parameter_fails() {
        let err = Template::new("<%= missing %>").render().unwrap_err();
        assert!(matches!(err, Error::UndefinedParameter { ref name } if name == "missing"));
    }

    #[test]
    fn test_with_parameter_does_not_mutate_base() {
        let base = Template::new("<%= version %>");
        let one = base.with_parameter("version", "1");
        let two = base.with_parameter("version", "2");

        assert!(base.parameters().is_empty());
        assert_eq!(one.render().unwrap(), "1");
        assert_eq!(two.render().unwrap(), "2");
    }

    #[test]
    fn test_with_parameters_later_pairs_win() {
        let rendered = Template::new("<%= ext %>")
            .with_parameters([("ext", ".zip"), ("ext", ".tgz")])
            .render()
            .unwrap();
        assert_eq!(rendered, ".tgz");
    }

    #[test]
    fn test_trim_closer_and_comment() {
        let rendered = Template::new("a<%# ignored %>b<%= ext -%>c")
            .with_parameter("ext", "X")
            .render()
            .unwrap();
        assert_eq!(rendered, "abXc");
    }

    #[test]
    fn test_literal_escape() {
        let rendered = Template::new("<%%= version %>").render().unwrap();
        assert_eq!(rendered, "<%= version %>");
    }

    #[test]
    fn test_code_tag_is_rejected() {
        let err = Template::parse("<% system('ls') %>").unwrap_err();
        assert!(matches!(err, Error::Template { .. }));
    }

    #[test]
    fn test_expression_is_rejected() {
        let err = Template::parse("<%= version.upcase %>").unwrap_err();
        assert!(matches!(err, Error::Template { .. }));
    }

    #[test]
    fn test_unterminated_tag_is_rejected() {
        let err = Template::parse("tool-<%= version").unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_referenced_parameters() {
        let template = Template::new("<%= a %>/<%= b %>/<%= a %>");
        assert_eq!(template.referenced_parameters().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_render_function() {
        let mut parameters = Parameters::new();
        parameters.insert("version".to_string(), Value::from("2.0"));
        assert_eq!(render("v<%= version %>", &parameters).unwrap(), "v2.0");
    }
}
