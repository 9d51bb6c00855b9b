//! Selector Parsing
//!
//! The subset of CSS selectors form markup is addressed with: type, `*`,
//! `#id`, `.class`, `[attr]` and `[attr=value]` compounds joined by
//! descendant or child combinators, in comma-separated lists.

use crate::error::ValidationError;

/// A comma-separated list of selectors; matches when any member matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

/// Compounds joined by combinators, left to right
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// Rightmost compound, the one the subject element must match
    pub subject: CompoundSelector,
    /// Preceding compounds paired with the combinator to their right,
    /// nearest first
    pub ancestors: Vec<(Combinator, CompoundSelector)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    /// `None` for `*` or an omitted type
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    /// `None` for a presence test
    pub value: Option<String>,
}

/// What a compound selector needs to know about a candidate element
pub trait Matchable {
    fn tag(&self) -> &str;
    fn attribute(&self, name: &str) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
}

impl CompoundSelector {
    pub fn matches<M: Matchable>(&self, element: &M) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(element.tag()) {
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

        self.attributes
            .iter()
            .all(|attr| match (element.attribute(&attr.name), &attr.value) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
            })
    }
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let fail = |reason: &str| ValidationError::InvalidSelector {
            selector: input.to_string(),
            reason: reason.to_string(),
        };

        let mut selectors = Vec::new();
        for part in split_top_level(input) {
            let complex = Parser::new(part).parse_complex().map_err(|reason| fail(&reason))?;
            selectors.push(complex);
        }

        if selectors.is_empty() {
            return Err(fail("empty selector"));
        }

        Ok(Self { selectors })
    }
}

/// Split on commas outside attribute brackets and quotes
fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (idx, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, String> {
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();

        self.skip_whitespace();
        loop {
            let compound = self.parse_compound()?;
            compounds.push(compound);

            let had_space = self.skip_whitespace();
            match self.chars.peek() {
                None => break,
                Some('>') => {
                    self.chars.next();
                    self.skip_whitespace();
                    combinators.push(Combinator::Child);
                }
                Some(_) if had_space => combinators.push(Combinator::Descendant),
                Some(c) => return Err(format!("unexpected character '{}'", c)),
            }
        }

        let subject = compounds.pop().ok_or_else(|| "empty selector".to_string())?;
        let ancestors = combinators.into_iter().rev().zip(compounds.into_iter().rev()).collect();
        Ok(ComplexSelector { subject, ancestors })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, String> {
        let mut compound = CompoundSelector::default();
        let mut empty = true;

        match self.chars.peek() {
            Some('*') => {
                self.chars.next();
                empty = false;
            }
            Some(&c) if is_ident_char(c) => {
                compound.tag = Some(self.parse_ident()?);
                empty = false;
            }
            _ => {}
        }

        while let Some(&c) = self.chars.peek() {
            match c {
                '#' => {
                    self.chars.next();
                    compound.id = Some(self.parse_ident()?);
                }
                '.' => {
                    self.chars.next();
                    compound.classes.push(self.parse_ident()?);
                }
                '[' => {
                    self.chars.next();
                    compound.attributes.push(self.parse_attribute()?);
                }
                _ => break,
            }
            empty = false;
        }

        if empty {
            return match self.chars.peek() {
                Some(c) => Err(format!("unexpected character '{}'", c)),
                None => Err("expected a selector".to_string()),
            };
        }
        Ok(compound)
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, String> {
        self.skip_whitespace();
        let name = self.parse_ident()?;
        self.skip_whitespace();

        let value = match self.chars.next() {
            Some(']') => return Ok(AttributeSelector { name, value: None }),
            Some('=') => {
                self.skip_whitespace();
                let value = match self.chars.peek() {
                    Some(&q) if q == '"' || q == '\'' => {
                        self.chars.next();
                        self.take_until(q)?
                    }
                    _ => self.parse_ident()?,
                };
                self.skip_whitespace();
                value
            }
            Some(c) => return Err(format!("unsupported attribute operator '{}'", c)),
            None => return Err("unterminated attribute selector".to_string()),
        };

        match self.chars.next() {
            Some(']') => Ok(AttributeSelector {
                name,
                value: Some(value),
            }),
            _ => Err("unterminated attribute selector".to_string()),
        }
    }

    fn take_until(&mut self, end: char) -> Result<String, String> {
        let mut out = String::new();
        for c in self.chars.by_ref() {
            if c == end {
                return Ok(out);
            }
            out.push(c);
        }
        Err("unterminated string".to_string())
    }

    fn parse_ident(&mut self) -> Result<String, String> {
        let mut ident = String::new();
        while let Some(&c) = self.chars.peek() {
            if c == '\\' {
                self.chars.next();
                match self.chars.next() {
                    Some(escaped) => ident.push(escaped),
                    None => return Err("dangling escape".to_string()),
                }
            } else if is_ident_char(c) {
                ident.push(c);
                self.chars.next();
            } else {
                break;
            }
        }

        if ident.is_empty() {
            Err("expected an identifier".to_string())
        } else {
            Ok(ident)
        }
    }

    /// Returns whether any whitespace was consumed
    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
            skipped = true;
        }
        skipped
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}
