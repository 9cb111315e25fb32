//! Stylesheet parsing with cssparser and the selectors crate.
//!
//! Declarations keep their raw value text; only the handful of properties
//! the classifier and scanner read are interpreted, later, by the cascade.

use std::cmp::Ordering;

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, StyleSheetParser, Token,
};
use selectors::parser::{ParseRelative, Selector, SelectorList};

use super::element_ref::PageSelectors;
use super::values::{WideKeyword, parse_color};

/// A parsed stylesheet.
#[derive(Debug, Default, Clone)]
pub struct Stylesheet {
    pub rules: Vec<CssRule>,
}

/// One style rule.
#[derive(Debug, Clone)]
pub struct CssRule {
    pub selectors: Vec<Selector<PageSelectors>>,
    pub declarations: Vec<Declaration>,
}

/// A `property: value` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Lowercased property name.
    pub property: String,
    /// Raw value text, trimmed, without `!important`.
    pub value: String,
    pub important: bool,
}

/// Selector specificity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Specificity {
    pub ids: u16,
    pub classes: u16,
    pub elements: u16,
}

impl Specificity {
    pub fn from_selector(selector: &Selector<PageSelectors>) -> Self {
        let spec = selector.specificity();
        // Packed by the selectors crate as (ids << 20) | (classes << 10) | elements.
        Self {
            ids: ((spec >> 20) & 0x3FF) as u16,
            classes: ((spec >> 10) & 0x3FF) as u16,
            elements: (spec & 0x3FF) as u16,
        }
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ids
            .cmp(&other.ids)
            .then(self.classes.cmp(&other.classes))
            .then(self.elements.cmp(&other.elements))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Where a stylesheet comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Origin {
    UserAgent = 0,
    Author = 1,
}

impl Stylesheet {
    /// Parse a stylesheet. Invalid rules and declarations are skipped.
    pub fn parse(css: &str) -> Self {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut rules = Vec::new();

        let mut rule_parser = TopLevelRuleParser { rules: &mut rules };
        for result in StyleSheetParser::new(&mut parser, &mut rule_parser) {
            if let Err((err, source)) = result {
                log::trace!("skipping css rule {source:?}: {:?}", err.kind);
            }
        }

        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Append the rules of another sheet after this one's.
    pub fn extend(&mut self, other: Stylesheet) {
        self.rules.extend(other.rules);
    }
}

/// Parse the body of a `style` attribute.
pub fn parse_declarations(css: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut declarations = Vec::new();

    let mut decl_parser = DeclarationListParser {
        declarations: &mut declarations,
    };
    for result in RuleBodyParser::new(&mut parser, &mut decl_parser) {
        let _ = result;
    }
    declarations
}

struct TopLevelRuleParser<'a> {
    rules: &'a mut Vec<CssRule>,
}

impl<'i> AtRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        // @media and friends are not evaluated.
        Err(input.new_custom_error(()))
    }
}

impl<'i> QualifiedRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = Vec<Selector<PageSelectors>>;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let location = input.current_source_location();
        let list = SelectorList::parse(&PageSelectors, input, ParseRelative::No)
            .map_err(|_| location.new_custom_error(()))?;
        Ok(list.slice().to_vec())
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let mut declarations = Vec::new();
        let mut decl_parser = DeclarationListParser {
            declarations: &mut declarations,
        };
        for result in RuleBodyParser::new(input, &mut decl_parser) {
            let _ = result;
        }

        self.rules.push(CssRule {
            selectors: prelude,
            declarations,
        });
        Ok(())
    }
}

struct DeclarationListParser<'a> {
    declarations: &'a mut Vec<Declaration>,
}

impl<'i> AtRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = ();
}

impl<'i> DeclarationParser<'i> for DeclarationListParser<'_> {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let property = name.to_ascii_lowercase();
        let start = input.position();
        while input.next().is_ok() {}
        let (value, important) = split_important(input.slice_from(start));

        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }

        if property == "background" {
            // The shorthand always sets background-color, to transparent
            // when it names no color.
            self.declarations.push(Declaration {
                property: "background-color".to_string(),
                value: background_color_component(value),
                important,
            });
            return Ok(());
        }

        self.declarations.push(Declaration {
            property,
            value: value.to_string(),
            important,
        });
        Ok(())
    }
}

impl<'i> RuleBodyItemParser<'i, (), ()> for DeclarationListParser<'_> {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Strip a trailing `!important`, reporting whether it was present.
fn split_important(raw: &str) -> (&str, bool) {
    let raw = raw.trim();
    if let Some(bang) = raw.rfind('!') {
        let flag = raw[bang + 1..].trim();
        if flag.eq_ignore_ascii_case("important") {
            return (raw[..bang].trim_end(), true);
        }
    }
    (raw, false)
}

/// Pick the color component out of a `background` shorthand value.
fn background_color_component(value: &str) -> String {
    if WideKeyword::parse(value).is_some() {
        return value.to_string();
    }

    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    loop {
        let start = parser.position();
        if parser.try_parse(parse_color).is_ok() {
            return parser.slice_from(start).trim().to_string();
        }
        let token = match parser.next() {
            Ok(token) => token.clone(),
            Err(_) => return "transparent".to_string(),
        };
        match token {
            Token::Ident(ident) if ident.eq_ignore_ascii_case("currentcolor") => {
                return "currentcolor".to_string();
            }
            Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock => {
                let _ = parser.parse_nested_block(skip_block);
            }
            // Positions, sizes, urls and keywords.
            _ => {}
        }
    }
}

fn skip_block<'i>(block: &mut Parser<'i, '_>) -> Result<(), ParseError<'i, ()>> {
    while block.next().is_ok() {}
    Ok(())
}
