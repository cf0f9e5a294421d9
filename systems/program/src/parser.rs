//! Tokenizer and recursive-descent parser for Karel programs.

use karel_core::Sensor;
use thiserror::Error;

use crate::{Instruction, Statement};

/// Deepest block nesting a program may use.
pub const MAX_NESTING: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq)]
enum TokenKind {
    Word(String),
    Number(u32),
    OpenBrace,
    CloseBrace,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    line: usize,
}

impl Token {
    fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Word(word) => word.clone(),
            TokenKind::Number(number) => number.to_string(),
            TokenKind::OpenBrace => "{".to_owned(),
            TokenKind::CloseBrace => "}".to_owned(),
        }
    }
}

/// Errors raised while parsing program text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A character outside the language was found.
    #[error("line {line}: unexpected character '{character}'")]
    UnexpectedCharacter {
        /// 1-based line number.
        line: usize,
        /// Offending character.
        character: char,
    },
    /// A repeat count does not fit into 32 bits.
    #[error("line {line}: invalid repeat count '{token}'")]
    InvalidCount {
        /// 1-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// A word does not name a command.
    #[error("line {line}: unknown command '{word}'")]
    UnknownCommand {
        /// 1-based line number.
        line: usize,
        /// Offending word.
        word: String,
    },
    /// A condition does not name a sensor.
    #[error("line {line}: unknown sensor '{word}'")]
    UnknownSensor {
        /// 1-based line number.
        line: usize,
        /// Offending word.
        word: String,
    },
    /// A token appeared where the grammar expects something else.
    #[error("line {line}: expected {expected}, found '{found}'")]
    UnexpectedToken {
        /// 1-based line number.
        line: usize,
        /// Description of what the parser expected.
        expected: &'static str,
        /// Token that was found instead.
        found: String,
    },
    /// Blocks are nested deeper than [`MAX_NESTING`].
    #[error("line {line}: blocks nested deeper than {} levels", MAX_NESTING)]
    NestingTooDeep {
        /// 1-based line number of the opening brace.
        line: usize,
    },
    /// The program ended in the middle of a statement or block.
    #[error("unexpected end of program, expected {expected}")]
    UnexpectedEnd {
        /// Description of what the parser expected.
        expected: &'static str,
    },
}

pub(crate) fn parse(source: &str) -> Result<Vec<Statement>, ParseError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        position: 0,
        depth: 0,
    };
    let statements = parser.block_body()?;
    match parser.next() {
        None => Ok(statements),
        Some(token) => Err(ParseError::UnexpectedToken {
            line: token.line,
            expected: "a statement",
            found: token.describe(),
        }),
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    for (index, raw_line) in source.lines().enumerate() {
        let line = index + 1;
        let content = raw_line.split('#').next().unwrap_or_default();
        let mut chars = content.chars().peekable();
        while let Some(&character) = chars.peek() {
            if character.is_whitespace() {
                let _ = chars.next();
                continue;
            }
            if character == '{' || character == '}' {
                let _ = chars.next();
                let kind = if character == '{' {
                    TokenKind::OpenBrace
                } else {
                    TokenKind::CloseBrace
                };
                tokens.push(Token { kind, line });
                continue;
            }
            if !(character.is_ascii_alphanumeric() || character == '_') {
                return Err(ParseError::UnexpectedCharacter { line, character });
            }

            let mut word = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' {
                    word.push(next);
                    let _ = chars.next();
                } else {
                    break;
                }
            }
            let kind = if word.chars().all(|ch| ch.is_ascii_digit()) {
                let number = word
                    .parse()
                    .map_err(|_| ParseError::InvalidCount { line, token: word })?;
                TokenKind::Number(number)
            } else {
                TokenKind::Word(word.to_ascii_lowercase())
            };
            tokens.push(Token { kind, line });
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned()?;
        self.position += 1;
        Some(token)
    }

    fn expect_next(&mut self, expected: &'static str) -> Result<Token, ParseError> {
        self.next().ok_or(ParseError::UnexpectedEnd { expected })
    }

    /// Parses statements until a closing brace or the end of input.
    fn block_body(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        while let Some(token) = self.peek() {
            if token.kind == TokenKind::CloseBrace {
                break;
            }
            statements.push(self.statement()?);
        }
        Ok(statements)
    }

    fn block(&mut self) -> Result<Vec<Statement>, ParseError> {
        let open = self.expect_next("'{'")?;
        if open.kind != TokenKind::OpenBrace {
            return Err(ParseError::UnexpectedToken {
                line: open.line,
                expected: "'{'",
                found: open.describe(),
            });
        }
        if self.depth == MAX_NESTING {
            return Err(ParseError::NestingTooDeep { line: open.line });
        }
        self.depth += 1;
        let body = self.block_body()?;
        self.depth -= 1;
        let _ = self.expect_next("'}'")?;
        Ok(body)
    }

    fn statement(&mut self) -> Result<Statement, ParseError> {
        let token = self.expect_next("a statement")?;
        let TokenKind::Word(word) = &token.kind else {
            return Err(ParseError::UnexpectedToken {
                line: token.line,
                expected: "a statement",
                found: token.describe(),
            });
        };

        match word.as_str() {
            "repeat" => {
                let count = self.expect_next("a repeat count")?;
                let TokenKind::Number(times) = count.kind else {
                    return Err(ParseError::UnexpectedToken {
                        line: count.line,
                        expected: "a repeat count",
                        found: count.describe(),
                    });
                };
                Ok(Statement::Repeat {
                    times,
                    body: self.block()?,
                })
            }
            "while" => Ok(Statement::While {
                condition: self.condition()?,
                body: self.block()?,
            }),
            "if" => {
                let condition = self.condition()?;
                let then_branch = self.block()?;
                let has_else = matches!(
                    self.peek(),
                    Some(Token { kind: TokenKind::Word(word), .. }) if word == "else"
                );
                let else_branch = if has_else {
                    let _ = self.next();
                    self.block()?
                } else {
                    Vec::new()
                };
                Ok(Statement::If {
                    condition,
                    then_branch,
                    else_branch,
                })
            }
            other => Instruction::from_name(other)
                .map(Statement::Command)
                .ok_or_else(|| ParseError::UnknownCommand {
                    line: token.line,
                    word: other.to_owned(),
                }),
        }
    }

    fn condition(&mut self) -> Result<Sensor, ParseError> {
        let token = self.expect_next("a sensor")?;
        match &token.kind {
            TokenKind::Word(word) => {
                Sensor::from_name(word).ok_or_else(|| ParseError::UnknownSensor {
                    line: token.line,
                    word: word.clone(),
                })
            }
            _ => Err(ParseError::UnexpectedToken {
                line: token.line,
                expected: "a sensor",
                found: token.describe(),
            }),
        }
    }
}
