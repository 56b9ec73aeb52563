use rivet_core::{Error, QuerySchema, Result, Value, VariableDef, consume_while, truncate_long};
use std::iter::Peekable;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Positional,
    Named(String),
    Literal(Value),
    Symbol(char),
}

/// Right hand side of an assignment or comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Bind variable slot.
    Slot(usize),
    Literal(Value),
}

/// `column = operand`
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub operand: Operand,
}

/// The statements the memory session understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Insert {
        table: String,
        values: Vec<Assignment>,
    },
    Select {
        table: String,
        /// `None` selects every column.
        columns: Option<Vec<String>>,
        filter: Vec<Assignment>,
        limit: Option<Operand>,
    },
    Update {
        table: String,
        values: Vec<Assignment>,
        filter: Vec<Assignment>,
    },
    Delete {
        table: String,
        filter: Vec<Assignment>,
    },
}

fn tokenize(query: &str) -> Result<Vec<Token>> {
    let mut input = query;
    let mut result = Vec::new();
    loop {
        consume_while(&mut input, |c| c.is_whitespace());
        let Some(c) = input.chars().next() else {
            break;
        };
        if c.is_alphabetic() || c == '_' {
            let ident = consume_while(&mut input, |c| c.is_alphanumeric() || *c == '_');
            result.push(match ident.to_ascii_uppercase().as_str() {
                "TRUE" => Token::Literal(Value::Boolean(Some(true))),
                "FALSE" => Token::Literal(Value::Boolean(Some(false))),
                "NULL" => Token::Literal(Value::Null),
                _ => Token::Ident(ident.to_owned()),
            });
        } else if c.is_ascii_digit()
            || (c == '-' && input[1..].starts_with(|c: char| c.is_ascii_digit()))
        {
            input = &input[1..];
            let digits = consume_while(&mut input, |c| c.is_ascii_digit() || *c == '.');
            let literal = if c == '-' {
                format!("-{}", digits)
            } else {
                format!("{}{}", c, digits)
            };
            let value = if literal.contains('.') {
                literal
                    .parse::<f64>()
                    .map(|v| Value::Float64(Some(v)))
                    .map_err(|e| Error::msg(format!("Invalid number `{}`: {}", literal, e)))?
            } else {
                literal
                    .parse::<i64>()
                    .map(|v| Value::Int64(Some(v)))
                    .map_err(|e| Error::msg(format!("Invalid number `{}`: {}", literal, e)))?
            };
            result.push(Token::Literal(value));
        } else if c == '\'' {
            input = &input[1..];
            let mut text = String::new();
            loop {
                text.push_str(consume_while(&mut input, |c| *c != '\''));
                if input.is_empty() {
                    return Err(Error::msg(format!(
                        "Unterminated string literal in `{}`",
                        truncate_long!(query)
                    )));
                }
                input = &input[1..];
                if input.starts_with('\'') {
                    text.push('\'');
                    input = &input[1..];
                } else {
                    break;
                }
            }
            result.push(Token::Literal(Value::Varchar(Some(text))));
        } else if c == '?' {
            input = &input[1..];
            result.push(Token::Positional);
        } else if c == ':' && input[1..].starts_with(':') {
            // Type cast, the memory session ignores it together with the type name
            input = &input[2..];
            consume_while(&mut input, |c| c.is_whitespace());
            consume_while(&mut input, |c| c.is_alphanumeric() || *c == '_');
        } else if c == ':' {
            input = &input[1..];
            let name = consume_while(&mut input, |c| c.is_alphanumeric() || *c == '_');
            if name.is_empty() {
                return Err(Error::msg(format!(
                    "Expected a bind variable name after `:` in `{}`",
                    truncate_long!(query)
                )));
            }
            result.push(Token::Named(name.to_owned()));
        } else {
            input = &input[c.len_utf8()..];
            result.push(Token::Symbol(c));
        }
    }
    Ok(result)
}

struct Parser<I: Iterator<Item = Token>> {
    tokens: Peekable<I>,
    variables: Vec<VariableDef>,
}

impl<I: Iterator<Item = Token>> Parser<I> {
    fn next(&mut self) -> Result<Token> {
        self.tokens
            .next()
            .ok_or_else(|| Error::msg("Unexpected end of the query"))
    }
    fn keyword(&mut self, keyword: &str) -> Result<()> {
        match self.next()? {
            Token::Ident(v) if v.eq_ignore_ascii_case(keyword) => Ok(()),
            v => Err(Error::msg(format!("Expected `{}`, found {:?}", keyword, v))),
        }
    }
    fn peek_keyword(&mut self, keyword: &str) -> bool {
        matches!(self.tokens.peek(), Some(Token::Ident(v)) if v.eq_ignore_ascii_case(keyword))
    }
    fn symbol(&mut self, symbol: char) -> Result<()> {
        match self.next()? {
            Token::Symbol(v) if v == symbol => Ok(()),
            v => Err(Error::msg(format!("Expected `{}`, found {:?}", symbol, v))),
        }
    }
    fn peek_symbol(&mut self, symbol: char) -> bool {
        matches!(self.tokens.peek(), Some(Token::Symbol(v)) if *v == symbol)
    }
    fn ident(&mut self) -> Result<String> {
        match self.next()? {
            Token::Ident(v) => Ok(v),
            v => Err(Error::msg(format!("Expected an identifier, found {:?}", v))),
        }
    }
    fn idents(&mut self) -> Result<Vec<String>> {
        let mut result = vec![self.ident()?];
        while self.peek_symbol(',') {
            self.symbol(',')?;
            result.push(self.ident()?);
        }
        Ok(result)
    }
    /// `name` is what a positional placeholder is called.
    fn operand(&mut self, name: &str) -> Result<Operand> {
        let slot = self.variables.len();
        match self.next()? {
            Token::Positional => self.variables.push(VariableDef::new(name, Value::Null)),
            Token::Named(v) => self.variables.push(VariableDef::new(v, Value::Null)),
            Token::Literal(v) => return Ok(Operand::Literal(v)),
            v => return Err(Error::msg(format!("Expected a value, found {:?}", v))),
        }
        Ok(Operand::Slot(slot))
    }
    fn assignments(&mut self, separator: &str) -> Result<Vec<Assignment>> {
        let mut result = Vec::new();
        loop {
            let column = self.ident()?;
            self.symbol('=')?;
            let operand = self.operand(&column)?;
            result.push(Assignment { column, operand });
            if separator == "," && self.peek_symbol(',') {
                self.symbol(',')?;
            } else if separator != "," && self.peek_keyword(separator) {
                self.keyword(separator)?;
            } else {
                break;
            }
        }
        Ok(result)
    }
    fn filter(&mut self) -> Result<Vec<Assignment>> {
        if self.peek_keyword("WHERE") {
            self.keyword("WHERE")?;
            self.assignments("AND")
        } else {
            Ok(Vec::new())
        }
    }
    fn command(&mut self) -> Result<Command> {
        let command = match self.ident()?.to_ascii_uppercase().as_str() {
            "INSERT" => {
                self.keyword("INTO")?;
                let table = self.ident()?;
                self.symbol('(')?;
                let columns = self.idents()?;
                self.symbol(')')?;
                self.keyword("VALUES")?;
                self.symbol('(')?;
                let mut values = Vec::with_capacity(columns.len());
                for (i, column) in columns.into_iter().enumerate() {
                    if i > 0 {
                        self.symbol(',')?;
                    }
                    let operand = self.operand(&column)?;
                    values.push(Assignment { column, operand });
                }
                self.symbol(')')?;
                Command::Insert { table, values }
            }
            "SELECT" => {
                let columns = if self.peek_symbol('*') {
                    self.symbol('*')?;
                    None
                } else {
                    Some(self.idents()?)
                };
                self.keyword("FROM")?;
                let table = self.ident()?;
                let filter = self.filter()?;
                let limit = if self.peek_keyword("LIMIT") {
                    self.keyword("LIMIT")?;
                    Some(self.operand("[limit]")?)
                } else {
                    None
                };
                Command::Select {
                    table,
                    columns,
                    filter,
                    limit,
                }
            }
            "UPDATE" => {
                let table = self.ident()?;
                self.keyword("SET")?;
                let values = self.assignments(",")?;
                let filter = self.filter()?;
                Command::Update {
                    table,
                    values,
                    filter,
                }
            }
            "DELETE" => {
                self.keyword("FROM")?;
                let table = self.ident()?;
                let filter = self.filter()?;
                Command::Delete { table, filter }
            }
            v => return Err(Error::msg(format!("Unsupported statement `{}`", v))),
        };
        if self.peek_symbol(';') {
            self.symbol(';')?;
        }
        if let Some(token) = self.tokens.next() {
            return Err(Error::msg(format!("Unexpected {:?} after the statement", token)));
        }
        Ok(command)
    }
}

/// Parse a query into the command the memory session runs and the bind variables it exposes.
///
/// Positional placeholders are named after the column they are compared with or assigned to,
/// the one of a `LIMIT` is named `[limit]`.
pub fn parse_command(query: &str) -> Result<(Command, QuerySchema)> {
    let mut parser = Parser {
        tokens: tokenize(query)?.into_iter().peekable(),
        variables: Vec::new(),
    };
    let command = parser.command()?;
    Ok((command, parser.variables.into_iter().collect()))
}

/// Bind variables of a query the memory session cannot run, answered by handlers instead.
///
/// A positional placeholder right after `identifier =` is named after the identifier,
/// otherwise after its position.
pub fn scan_variables(query: &str) -> Result<QuerySchema> {
    let tokens = tokenize(query)?;
    let mut result = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        let name = match token {
            Token::Named(name) => name.clone(),
            Token::Positional => {
                let before = i.checked_sub(2).map(|i| &tokens[i..i + 2]);
                match before {
                    Some([Token::Ident(ident), Token::Symbol('=')]) => ident.clone(),
                    _ => result.len().to_string(),
                }
            }
            _ => continue,
        };
        result.push(VariableDef::new(name, Value::Null));
    }
    Ok(result.into_iter().collect())
}
