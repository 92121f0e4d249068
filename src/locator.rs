use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Css(String),
    /// Element whose own text, whitespace-normalized, equals the string.
    Text(String),
}

/// A lazily resolved element query.
///
/// `root` is matched against the whole document, optionally narrowed to the
/// `nth` match, and then optionally to the descendants matching `descendant`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    root: Query,
    nth: Option<usize>,
    descendant: Option<String>,
}

impl Locator {
    pub fn css<S: Into<String>>(selector: S) -> Self {
        Locator {
            root: Query::Css(selector.into()),
            nth: None,
            descendant: None,
        }
    }

    pub fn text<S: Into<String>>(text: S) -> Self {
        Locator {
            root: Query::Text(text.into()),
            nth: None,
            descendant: None,
        }
    }

    pub fn nth(&self, index: usize) -> Self {
        Locator {
            nth: Some(index),
            ..self.clone()
        }
    }

    pub fn locate<S: Into<String>>(&self, selector: S) -> Self {
        Locator {
            descendant: Some(selector.into()),
            ..self.clone()
        }
    }

    pub fn root(&self) -> &Query {
        &self.root
    }

    pub fn index(&self) -> Option<usize> {
        self.nth
    }

    pub fn descendant(&self) -> Option<&str> {
        self.descendant.as_deref()
    }

    /// XPath equivalent of a `Query::Text` root.
    pub(crate) fn text_xpath(text: &str) -> String {
        let literal = if text.contains('\'') {
            let parts = text
                .split('\'')
                .map(|p| format!("'{}'", p))
                .collect::<Vec<_>>()
                .join(r#", "'", "#);
            format!("concat({})", parts)
        } else {
            format!("'{}'", text)
        };
        format!("//*[normalize-space(text())={}]", literal)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Query::Css(s) => write!(f, "{}", s)?,
            Query::Text(t) => write!(f, "text={}", t)?,
        }
        if let Some(i) = self.nth {
            write!(f, " >> nth={}", i)?;
        }
        if let Some(d) = &self.descendant {
            write!(f, " >> {}", d)?;
        }
        Ok(())
    }
}

/// A JavaScript function declaration applied to a live element, which is
/// bound to `this`. It should return a string, or `null` for no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Script(pub &'static str);

impl Script {
    pub const TEXT_CONTENT: Script = Script("function() { return this.textContent; }");

    pub const LAST_CHILD_TEXT: Script = Script(
        "function() { const n = this.lastChild; return n ? n.textContent.trim() : null; }",
    );

    pub fn source(&self) -> &'static str {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_nested_locator() {
        let items = Locator::css("div.jobListItem");
        let link = items.nth(2).locate(".jobListPosition");

        assert_eq!(link.root(), &Query::Css("div.jobListItem".to_string()));
        assert_eq!(link.index(), Some(2));
        assert_eq!(link.descendant(), Some(".jobListPosition"));
        assert_eq!(items.index(), None);
        assert_eq!(link.to_string(), "div.jobListItem >> nth=2 >> .jobListPosition");
    }

    #[test]
    fn text_query_to_xpath() {
        assert_eq!(
            Locator::text_xpath("Classic View"),
            "//*[normalize-space(text())='Classic View']"
        );
        assert_eq!(
            Locator::text_xpath("Don't"),
            r#"//*[normalize-space(text())=concat('Don', "'", 't')]"#
        );
        assert_eq!(Locator::text("Classic View").to_string(), "text=Classic View");
    }
}
