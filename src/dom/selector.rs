//! CSS selector subset used by the page markup contract.
//!
//! Supported: type and universal selectors, `#id`, `.class`, `[attr]`,
//! `[attr="value"]`, `:not(<compound>)`, `:scope`, descendant and child
//! combinators, and comma-separated lists. Matching runs right to left.
//! `[class]` compares against the space-joined class list and `[value]`
//! against the current control value.

use anyhow::{bail, Result};

use super::document::{Document, Element};
use super::NodeId;

/// Relationship between two compound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeSelector {
    name: String,
    value: Option<String>,
}

impl AttributeSelector {
    /// `class` is read from the class list and `value` from the control
    /// value, since neither lives in the attribute map.
    fn matches(&self, element: &Element) -> bool {
        match self.name.as_str() {
            "class" => match &self.value {
                Some(expected) => element.classes().collect::<Vec<_>>().join(" ") == *expected,
                None => element.classes().next().is_some(),
            },
            "value" => match &self.value {
                Some(expected) => element.value == *expected,
                None => !element.value.is_empty(),
            },
            name => match &self.value {
                Some(expected) => element.attribute(name) == Some(expected.as_str()),
                None => element.has_attribute(name),
            },
        }
    }
}

/// A sequence of simple selectors with no combinator between them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeSelector>,
    negations: Vec<Compound>,
    scope: bool,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.negations.is_empty()
            && !self.scope
    }

    fn matches(&self, doc: &Document, node: NodeId, scope: Option<NodeId>) -> bool {
        let Some(element) = doc.get(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if tag != "*" && tag != element.tag() {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| element.has_class(class)) {
            return false;
        }
        if !self.attributes.iter().all(|attribute| attribute.matches(element)) {
            return false;
        }
        if self.scope && scope != Some(node) {
            return false;
        }
        !self
            .negations
            .iter()
            .any(|negation| negation.matches(doc, node, scope))
    }
}

/// Compound selectors joined by combinators, left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    combinators: Vec<Combinator>,
}

impl Complex {
    fn matches(&self, doc: &Document, node: NodeId, scope: Option<NodeId>) -> bool {
        self.matches_from(doc, node, self.compounds.len() - 1, scope)
    }

    fn matches_from(
        &self,
        doc: &Document,
        node: NodeId,
        index: usize,
        scope: Option<NodeId>,
    ) -> bool {
        if !self.compounds[index].matches(doc, node, scope) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => doc
                .parent(node)
                .is_some_and(|parent| self.matches_from(doc, parent, index - 1, scope)),
            Combinator::Descendant => {
                let mut current = doc.parent(node);
                while let Some(ancestor) = current {
                    if self.matches_from(doc, ancestor, index - 1, scope) {
                        return true;
                    }
                    current = doc.parent(ancestor);
                }
                false
            }
        }
    }
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

impl Selector {
    /// Parses a selector list such as `".overlay__item.has-sub > .overlay__link"`.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = Parser::new(input);
        let mut alternatives = Vec::new();
        loop {
            parser.skip_whitespace();
            alternatives.push(parser.complex()?);
            parser.skip_whitespace();
            match parser.peek() {
                None => break,
                Some(',') => parser.bump(),
                Some(other) => bail!("Invalid selector '{}': unexpected '{}'", input, other),
            }
        }
        Ok(Self { alternatives })
    }

    /// Tests `node` against the selector. `scope` is the element `:scope` refers to.
    pub fn matches(&self, doc: &Document, node: NodeId, scope: Option<NodeId>) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex.matches(doc, node, scope))
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos > start
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => bail!(
                "Invalid selector '{}': expected '{}' but found '{}'",
                self.input,
                expected,
                c
            ),
            None => bail!(
                "Invalid selector '{}': expected '{}' at end of input",
                self.input,
                expected
            ),
        }
    }

    fn identifier(&mut self) -> Result<String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            self.bump();
        }
        if self.pos == start {
            bail!(
                "Invalid selector '{}': expected a name at offset {}",
                self.input,
                start
            );
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn complex(&mut self) -> Result<Complex> {
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => {
                    self.bump();
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(other) => bail!("Invalid selector '{}': unexpected '{}'", self.input, other),
            };
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }
        Ok(Complex {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        if self.peek() == Some('*') {
            self.bump();
            compound.tag = Some("*".to_string());
        } else if self.peek().is_some_and(char::is_alphabetic) {
            compound.tag = Some(self.identifier()?.to_ascii_lowercase());
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.id = Some(self.identifier()?);
                }
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.identifier()?);
                }
                Some('[') => {
                    self.bump();
                    compound.attributes.push(self.attribute()?);
                }
                Some(':') => {
                    self.bump();
                    let pseudo = self.identifier()?;
                    match pseudo.as_str() {
                        "scope" => compound.scope = true,
                        "not" => {
                            self.expect('(')?;
                            self.skip_whitespace();
                            let negated = self.compound()?;
                            self.skip_whitespace();
                            self.expect(')')?;
                            compound.negations.push(negated);
                        }
                        other => bail!(
                            "Invalid selector '{}': unsupported pseudo-class ':{}'",
                            self.input,
                            other
                        ),
                    }
                }
                _ => break,
            }
        }
        if compound.is_empty() {
            match self.peek() {
                Some(c) => bail!("Invalid selector '{}': unexpected '{}'", self.input, c),
                None => bail!("Invalid selector '{}': empty selector", self.input),
            }
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<AttributeSelector> {
        self.skip_whitespace();
        let name = self.identifier()?.to_ascii_lowercase();
        self.skip_whitespace();
        let value = if self.peek() == Some('=') {
            self.bump();
            self.skip_whitespace();
            let value = match self.peek() {
                Some(quote @ ('"' | '\'')) => {
                    self.bump();
                    let start = self.pos;
                    while self.peek().is_some_and(|c| c != quote) {
                        self.bump();
                    }
                    let value: String = self.chars[start..self.pos].iter().collect();
                    self.expect(quote)?;
                    value
                }
                _ => self.identifier()?,
            };
            self.skip_whitespace();
            Some(value)
        } else {
            None
        };
        self.expect(']')?;
        Ok(AttributeSelector { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav_fixture() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let list = doc.element(body, "ul", &[("class", "overlay__list")]);
        let item = doc.element(list, "li", &[("class", "overlay__item has-sub")]);
        let toggle = doc.element(
            item,
            "button",
            &[("class", "overlay__link"), ("aria-expanded", "false")],
        );
        let sub = doc.element(item, "ul", &[("class", "overlay__sub")]);
        let nested = doc.element(sub, "li", &[("class", "overlay__item")]);
        let link = doc.element(
            nested,
            "a",
            &[("class", "overlay__link"), ("href", "#breakfast")],
        );
        (doc, list, toggle, link)
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse(".a >").is_err());
        assert!(Selector::parse("[href").is_err());
        assert!(Selector::parse(":hover").is_err());
        assert!(Selector::parse("a, ").is_err());
    }

    #[test]
    fn test_child_combinator_requires_direct_parent() {
        let (doc, _list, toggle, link) = nav_fixture();
        let selector = Selector::parse(".overlay__item.has-sub > .overlay__link").unwrap();
        assert!(selector.matches(&doc, toggle, None));
        assert!(!selector.matches(&doc, link, None));
    }

    #[test]
    fn test_descendant_combinator_walks_ancestors() {
        let (doc, _list, _toggle, link) = nav_fixture();
        let selector = Selector::parse(".has-sub a[href]").unwrap();
        assert!(selector.matches(&doc, link, None));
    }

    #[test]
    fn test_scope_anchors_to_query_root() {
        let (doc, list, toggle, link) = nav_fixture();
        let selector = Selector::parse(":scope > .overlay__item > .overlay__link").unwrap();
        assert!(selector.matches(&doc, toggle, Some(list)));
        assert!(!selector.matches(&doc, link, Some(list)));
        assert!(!selector.matches(&doc, toggle, None));
    }

    #[test]
    fn test_attribute_values_and_negation() {
        let (doc, _list, toggle, link) = nav_fixture();
        let expanded = Selector::parse(r#"[aria-expanded="false"]"#).unwrap();
        assert!(expanded.matches(&doc, toggle, None));
        assert!(!expanded.matches(&doc, link, None));

        let not_placeholder = Selector::parse("a[href]:not([href='#'])").unwrap();
        assert!(not_placeholder.matches(&doc, link, None));
    }

    #[test]
    fn test_class_and_value_attributes_match_element_state() {
        let (mut doc, _list, toggle, link) = nav_fixture();
        let any_class = Selector::parse("[class]").unwrap();
        assert!(any_class.matches(&doc, toggle, None));

        let exact_class = Selector::parse(r#"li[class="overlay__item has-sub"]"#).unwrap();
        let item = doc.parent(toggle).unwrap();
        assert!(exact_class.matches(&doc, item, None));
        assert!(!exact_class.matches(&doc, doc.parent(link).unwrap(), None));

        let body = doc.body();
        let input = doc.element(body, "input", &[("name", "date"), ("value", "2026-11-02")]);
        let dated = Selector::parse(r#"input[value="2026-11-02"]"#).unwrap();
        assert!(dated.matches(&doc, input, None));
        assert!(Selector::parse("[value]").unwrap().matches(&doc, input, None));

        doc.set_value(input, "");
        assert!(!dated.matches(&doc, input, None));
        assert!(!Selector::parse("input[value]").unwrap().matches(&doc, input, None));
    }

    #[test]
    fn test_selector_list_matches_any_alternative() {
        let (doc, _list, toggle, link) = nav_fixture();
        let selector = Selector::parse("button, a[href]").unwrap();
        assert!(selector.matches(&doc, toggle, None));
        assert!(selector.matches(&doc, link, None));
    }
}
