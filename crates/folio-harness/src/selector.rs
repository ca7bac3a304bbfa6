#![forbid(unsafe_code)]

//! Minimal CSS selector support for the synthetic page.
//!
//! Supported: comma-separated lists of compound selectors made of an optional
//! tag (or `*`), `#id`, `.class` and `[attr]` / `[attr="value"]` parts.
//! Combinators are not supported and are reported as errors.

use std::collections::BTreeMap;

/// Selector parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorError {
    pub selector: String,
    pub message: &'static str,
}

impl core::fmt::Display for SelectorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "selector {:?}: {}", self.selector, self.message)
    }
}

impl std::error::Error for SelectorError {}

/// One compound selector, e.g. `a.nav-link[href="#about"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, Option<String>)>,
}

/// The parts of an element a selector can look at.
pub trait Matchable {
    fn tag(&self) -> &str;
    fn element_id(&self) -> Option<&str>;
    fn classes(&self) -> &[String];
    fn attributes(&self) -> &BTreeMap<String, String>;
}

impl Compound {
    #[must_use]
    pub fn matches<M: Matchable + ?Sized>(&self, el: &M) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(el.tag()) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.element_id() != Some(id.as_str()) {
                return false;
            }
        }
        if !self
            .classes
            .iter()
            .all(|c| el.classes().iter().any(|have| have == c))
        {
            return false;
        }
        self.attrs.iter().all(|(name, want)| {
            let have = match name.as_str() {
                "id" => el.element_id().map(str::to_string),
                "class" => Some(el.classes().join(" ")),
                _ => el.attributes().get(name).cloned(),
            };
            match (have, want) {
                (Some(have), Some(want)) => &have == want,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
    }
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(pub Vec<Compound>);

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let groups = input
            .split(',')
            .map(|group| parse_compound(group.trim(), input))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(groups))
    }

    #[must_use]
    pub fn matches<M: Matchable + ?Sized>(&self, el: &M) -> bool {
        self.0.iter().any(|c| c.matches(el))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

/// Parse one compound selector. Also used by the fixture builder to describe
/// elements (`section#skills.reveal`).
pub fn parse_compound(group: &str, whole: &str) -> Result<Compound, SelectorError> {
    let err = |message| SelectorError {
        selector: whole.to_string(),
        message,
    };
    if group.is_empty() {
        return Err(err("empty selector"));
    }
    let chars: Vec<char> = group.chars().collect();
    let mut pos = 0;
    let mut out = Compound::default();

    if chars[0] == '*' {
        pos = 1;
    } else if is_ident_char(chars[0]) {
        out.tag = Some(take_ident(&chars, &mut pos));
    }

    while pos < chars.len() {
        match chars[pos] {
            '#' => {
                pos += 1;
                let id = take_ident(&chars, &mut pos);
                if id.is_empty() {
                    return Err(err("expected id after '#'"));
                }
                out.id = Some(id);
            }
            '.' => {
                pos += 1;
                let class = take_ident(&chars, &mut pos);
                if class.is_empty() {
                    return Err(err("expected class after '.'"));
                }
                out.classes.push(class);
            }
            '[' => {
                pos += 1;
                let name = take_ident(&chars, &mut pos);
                if name.is_empty() {
                    return Err(err("expected attribute name"));
                }
                let value = if chars.get(pos) == Some(&'=') {
                    pos += 1;
                    Some(take_attr_value(&chars, &mut pos).ok_or_else(|| err("bad attribute value"))?)
                } else {
                    None
                };
                if chars.get(pos) != Some(&']') {
                    return Err(err("expected ']'"));
                }
                pos += 1;
                out.attrs.push((name, value));
            }
            c if c.is_whitespace() || c == '>' || c == '+' || c == '~' => {
                return Err(err("combinators are not supported"));
            }
            _ => return Err(err("unexpected character")),
        }
    }
    Ok(out)
}

fn take_attr_value(chars: &[char], pos: &mut usize) -> Option<String> {
    match chars.get(*pos) {
        Some(&q) if q == '"' || q == '\'' => {
            *pos += 1;
            let start = *pos;
            while *pos < chars.len() && chars[*pos] != q {
                *pos += 1;
            }
            if *pos >= chars.len() {
                return None;
            }
            let value = chars[start..*pos].iter().collect();
            *pos += 1;
            Some(value)
        }
        _ => {
            let start = *pos;
            while *pos < chars.len() && chars[*pos] != ']' {
                *pos += 1;
            }
            (*pos > start).then(|| chars[start..*pos].iter().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct El {
        tag: String,
        id: Option<String>,
        classes: Vec<String>,
        attrs: BTreeMap<String, String>,
    }

    impl Matchable for El {
        fn tag(&self) -> &str {
            &self.tag
        }
        fn element_id(&self) -> Option<&str> {
            self.id.as_deref()
        }
        fn classes(&self) -> &[String] {
            &self.classes
        }
        fn attributes(&self) -> &BTreeMap<String, String> {
            &self.attrs
        }
    }

    fn link(href: &str) -> El {
        El {
            tag: "a".to_string(),
            id: None,
            classes: vec!["nav-link".to_string(), "active".to_string()],
            attrs: BTreeMap::from([("href".to_string(), href.to_string())]),
        }
    }

    #[test]
    fn parses_compound_parts() {
        let c = parse_compound(r##"a#home.nav-link[href="#about"]"##, "x").unwrap();
        assert_eq!(c.tag.as_deref(), Some("a"));
        assert_eq!(c.id.as_deref(), Some("home"));
        assert_eq!(c.classes, vec!["nav-link".to_string()]);
        assert_eq!(
            c.attrs,
            vec![("href".to_string(), Some("#about".to_string()))]
        );
    }

    #[test]
    fn list_matches_any_group() {
        let list = SelectorList::parse("#about, a.nav-link").unwrap();
        assert!(list.matches(&link("#x")));
        let list = SelectorList::parse(r##"a[href="#skills"]"##).unwrap();
        assert!(list.matches(&link("#skills")));
        assert!(!list.matches(&link("#about")));
    }

    #[test]
    fn all_classes_required() {
        let list = SelectorList::parse(".nav-link.active").unwrap();
        assert!(list.matches(&link("#x")));
        let list = SelectorList::parse(".nav-link.open").unwrap();
        assert!(!list.matches(&link("#x")));
    }

    #[test]
    fn rejects_combinators_and_garbage() {
        assert!(SelectorList::parse("nav a").is_err());
        assert!(SelectorList::parse("nav > a").is_err());
        assert!(SelectorList::parse("").is_err());
        assert!(SelectorList::parse("#").is_err());
        assert!(SelectorList::parse("[href=\"x]").is_err());
    }
}
