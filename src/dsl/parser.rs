//! Parser for the schematic DSL.

use std::collections::HashMap;

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{LabError, Result};

/// Parser for schematic DSL.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire schematic description.
    pub fn parse(&mut self) -> Result<SchematicAst> {
        let mut ast = SchematicAst::new();

        loop {
            match self.current.kind {
                TokenKind::Eof => break,
                TokenKind::Newline => {}
                TokenKind::Directive => self.parse_directive(&mut ast)?,
                TokenKind::Identifier => {
                    let component = self.parse_component()?;
                    if ast.components.iter().any(|c| c.name == component.name) {
                        return Err(LabError::DuplicateComponent {
                            name: component.name,
                        });
                    }
                    ast.components.push(component);
                }
                _ => {
                    return Err(LabError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            match self.current.kind {
                TokenKind::Newline => self.advance()?,
                TokenKind::Eof => {}
                _ => {
                    return Err(LabError::parse(
                        self.current.line,
                        format!("unexpected trailing token: {:?}", self.current.text),
                    ));
                }
            }
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn at_line_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof)
    }

    /// Consume a net name. Numeric names such as `0` are allowed.
    fn expect_net(&mut self) -> Result<String> {
        match self.current.kind {
            TokenKind::Identifier | TokenKind::Number => {
                let text = self.current.text.clone();
                self.advance()?;
                Ok(text)
            }
            _ => Err(LabError::parse(
                self.current.line,
                format!("expected net name, got {:?}", self.current.text),
            )),
        }
    }

    fn parse_directive(&mut self, ast: &mut SchematicAst) -> Result<()> {
        let directive = self.current.text.to_lowercase();
        let line = self.current.line;
        self.advance()?;

        match directive.as_str() {
            ".join" => {
                let a = self.expect_net()?;
                let b = self.expect_net()?;
                ast.joins.push((a, b));
            }
            ".title" => {
                let mut words = Vec::new();
                while !self.at_line_end() {
                    words.push(self.current.text.clone());
                    self.advance()?;
                }
                ast.title = Some(words.join(" "));
            }
            _ => {
                return Err(LabError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        Ok(())
    }

    fn parse_component(&mut self) -> Result<ComponentDef> {
        let first = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        // Keywords first, so `BATTERY` is not read as a battery named "BATTERY"
        let (kind, name) = match kind_from_keyword(&first) {
            Some(kind) if self.current.kind == TokenKind::Identifier => {
                let name = self.current.text.clone();
                self.advance()?;
                (kind, name)
            }
            _ => {
                let kind = kind_from_name(&first).ok_or_else(|| LabError::UnknownComponentType {
                    component_type: first.clone(),
                })?;
                (kind, first)
            }
        };

        let mut nets = Vec::with_capacity(2);
        let mut value = None;
        let mut params = HashMap::new();
        let mut closed = None;

        while !self.at_line_end() {
            let text = self.current.text.clone();
            let kind_of_token = self.current.kind;
            self.advance()?;

            if kind_of_token == TokenKind::Identifier && self.current.kind == TokenKind::Equals {
                self.advance()?;
                let raw = self.current.text.clone();
                let parsed = match self.current.kind {
                    TokenKind::Number | TokenKind::Identifier => parse_value(&raw),
                    _ => None,
                };
                let v = parsed.ok_or_else(|| {
                    LabError::invalid_component(&name, line, format!("invalid value for '{}': {:?}", text, raw))
                })?;
                self.advance()?;
                params.insert(text.to_lowercase(), v);
                continue;
            }

            if nets.len() < 2 {
                match kind_of_token {
                    TokenKind::Identifier | TokenKind::Number => nets.push(text),
                    _ => {
                        return Err(LabError::invalid_component(
                            &name,
                            line,
                            format!("expected net name, got {:?}", text),
                        ));
                    }
                }
                continue;
            }

            if let Some(state) = switch_state(&text) {
                closed = Some(state);
                continue;
            }

            let v = parse_value(&text).ok_or_else(|| {
                LabError::invalid_component(&name, line, format!("unexpected argument {:?}", text))
            })?;
            if value.replace(v).is_some() {
                return Err(LabError::invalid_component(&name, line, "more than one positional value"));
            }
        }

        let nets: [String; 2] = nets.try_into().map_err(|got: Vec<String>| {
            LabError::invalid_component(&name, line, format!("expected 2 nets, got {}", got.len()))
        })?;

        Ok(ComponentDef {
            kind,
            name,
            nets,
            value,
            params,
            closed,
            line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ComponentKind;

    fn parse(input: &str) -> Result<SchematicAst> {
        super::super::parse(input)
    }

    #[test]
    fn test_parse_resistor() {
        let ast = parse("R1 in out 10k").unwrap();
        assert_eq!(ast.components.len(), 1);
        let r = &ast.components[0];
        assert_eq!(r.kind, ComponentKind::Resistor);
        assert_eq!(r.name, "R1");
        assert_eq!(r.nets, ["in".to_string(), "out".to_string()]);
        assert_eq!(r.value, Some(10_000.0));
    }

    #[test]
    fn test_parse_keyword_and_params() {
        let ast = parse("LAMP main a b p=2W v=6V").unwrap();
        let lamp = &ast.components[0];
        assert_eq!(lamp.kind, ComponentKind::Bulb);
        assert_eq!(lamp.name, "main");
        assert_eq!(lamp.params["p"], 2.0);
        assert_eq!(lamp.params["v"], 6.0);
        assert_eq!(lamp.value, None);
    }

    #[test]
    fn test_parse_switch_state_and_numeric_nets() {
        let ast = parse("SW1 1 0 off\nS2 0 1").unwrap();
        assert_eq!(ast.components[0].closed, Some(false));
        assert_eq!(ast.components[0].nets, ["1".to_string(), "0".to_string()]);
        assert_eq!(ast.components[1].closed, None);
    }

    #[test]
    fn test_parse_directives() {
        let ast = parse(".title Two bulbs\n.join a b\nB1 a 0 9").unwrap();
        assert_eq!(ast.title.as_deref(), Some("Two bulbs"));
        assert_eq!(ast.joins, vec![("a".to_string(), "b".to_string())]);
    }

    #[test]
    fn test_parse_with_comments() {
        let ast = parse("# comment\nR1 in out 1k ; inline\n\n").unwrap();
        assert_eq!(ast.components.len(), 1);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse("X1 a b"),
            Err(LabError::UnknownComponentType { .. })
        ));
        assert!(matches!(
            parse("R1 a"),
            Err(LabError::InvalidComponent { .. })
        ));
        assert!(matches!(
            parse("R1 a b 1 2"),
            Err(LabError::InvalidComponent { .. })
        ));
        assert!(matches!(
            parse("R1 a b 1\nR1 b c 2"),
            Err(LabError::DuplicateComponent { .. })
        ));
        assert!(matches!(parse(".wire a b"), Err(LabError::ParseError { .. })));
    }
}
