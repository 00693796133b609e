use crate::boundary;
use crate::error::InsertError;

use regex::Regex;

use std::fmt;

const OPEN: char = '<';
const CLOSE: char = '>';
const KIND: u8 = b':';
const RULE: u8 = b'^';

/// The kind of a pattern segment.
///
/// The declaration order is the match priority among sibling placeholders:
/// narrower grammars are probed before looser ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    /// `<name:bool>`, matches `true` or `false`.
    Bool,
    /// `<name:int>`, a canonical integer.
    Int,
    /// `<name:num>`, a canonical decimal.
    Number,
    /// `<name>`, a single path segment.
    Part,
    /// `<name^pattern>`, a user supplied regex anchored at the segment start.
    Regex,
    /// `<name:str>`, the entire remaining path.
    String,
    /// A literal run of bytes.
    Literal,
}

/// One piece of a route pattern: a literal run or a named placeholder.
#[derive(Clone, Debug)]
pub struct Tag {
    kind: Kind,
    name: String,
    rule: Option<Regex>,
}

impl Tag {
    pub(crate) fn literal(s: &str) -> Tag {
        Tag {
            kind: Kind::Literal,
            name: s.to_owned(),
            rule: None,
        }
    }

    /// The kind of this segment.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The parameter name, or the literal text for [`Kind::Literal`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` for placeholders, which capture a parameter.
    pub fn is_variable(&self) -> bool {
        self.kind != Kind::Literal
    }

    /// Whether `other` occupies the same placeholder slot in the tree.
    ///
    /// Names are not compared for placeholders; reusing a slot under a
    /// different name is reported by the tree.
    pub(crate) fn same(&self, other: &Tag) -> bool {
        if self.kind != other.kind {
            return false;
        }

        match self.kind {
            Kind::Regex => self.rule_str() == other.rule_str(),
            Kind::Literal => self.name == other.name,
            _ => true,
        }
    }

    fn rule_str(&self) -> &str {
        self.rule.as_ref().map_or("", Regex::as_str)
    }

    /// Returns how many leading bytes of `s` this segment consumes, `0` if none.
    pub fn boundary(&self, s: &str) -> usize {
        match self.kind {
            Kind::Bool => boundary::boolean(s),
            Kind::Int => boundary::integer(s),
            Kind::Number => boundary::number(s),
            Kind::Part => boundary::part(s),
            Kind::Regex => match self.rule.as_ref().and_then(|rule| rule.find(s)) {
                Some(m) if m.start() == 0 => m.end(),
                _ => 0,
            },
            Kind::String => s.len(),
            Kind::Literal => {
                if s.starts_with(self.name.as_str()) {
                    self.name.len()
                } else {
                    0
                }
            }
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.kind {
            Kind::Literal => return f.write_str(&self.name),
            Kind::Bool => ":bool",
            Kind::Int => ":int",
            Kind::Number => ":num",
            Kind::String => ":str",
            Kind::Part => "",
            Kind::Regex => self.rule_str(),
        };

        write!(f, "{}{}{}{}", OPEN, self.name, suffix, CLOSE)
    }
}

/// Renders a tag sequence back into pattern syntax.
pub(crate) fn render(tags: &[Tag]) -> String {
    tags.iter().map(Tag::to_string).collect()
}

/// Splits a route pattern into literal runs and placeholders.
///
/// An empty pattern yields no tags.
pub(crate) fn parse(pattern: &str) -> Result<Vec<Tag>, InsertError> {
    let mut tags = Vec::new();
    let mut s = pattern;

    while !s.is_empty() {
        match (s.find(OPEN), s.find(CLOSE)) {
            (None, None) => {
                tags.push(Tag::literal(s));
                break;
            }
            (Some(i), Some(j)) if i < j => {
                if i > 0 {
                    tags.push(Tag::literal(&s[..i]));
                }
                tags.push(parse_placeholder(&s[i + 1..j], pattern)?);
                s = &s[j + 1..];
            }
            _ => {
                return Err(InsertError::InvalidPattern {
                    pattern: pattern.to_owned(),
                })
            }
        }
    }

    Ok(tags)
}

// Parses the inside of `<...>`.
fn parse_placeholder(s: &str, pattern: &str) -> Result<Tag, InsertError> {
    let invalid = || InsertError::InvalidPattern {
        pattern: pattern.to_owned(),
    };

    if s.contains(OPEN) {
        return Err(invalid());
    }

    let (name, kind, rule) = match s.bytes().position(|b| b == KIND || b == RULE) {
        Some(i) if s.as_bytes()[i] == KIND => {
            let kind = match &s[i + 1..] {
                "b" | "bool" | "boolean" => Kind::Bool,
                "i" | "int" | "integer" => Kind::Int,
                "n" | "num" | "number" => Kind::Number,
                "s" | "str" | "string" => Kind::String,
                _ => return Err(invalid()),
            };
            (&s[..i], kind, None)
        }
        Some(i) => {
            // the caret stays in the expression and anchors it
            let rule = Regex::new(&s[i..]).map_err(|err| InsertError::InvalidRegex {
                pattern: pattern.to_owned(),
                error: err.to_string(),
            })?;
            (&s[..i], Kind::Regex, Some(rule))
        }
        None => (s, Kind::Part, None),
    };

    if name.is_empty() {
        return Err(InsertError::UnnamedParam {
            pattern: pattern.to_owned(),
        });
    }

    Ok(Tag {
        kind,
        name: name.to_owned(),
        rule,
    })
}
