use std::ops::Range;

use sqlparser::tokenizer::{Location, Token, TokenWithSpan, Tokenizer};
use tracing::trace;

use super::{Engine, source::Source, syntax_error};
use crate::error::ReviewError;

/// One statement of the input before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatement {
    /// Statement text from its first token through its terminating `;`
    pub text:       String,
    /// Byte range of `text` in the input
    pub range:      Range<usize>,
    pub first_line: usize,
    pub last_line:  usize,
    /// Column of the first token on `first_line`
    pub column:     usize,
    /// Routine definition whose body is a `BEGIN ... END` block
    pub compound:   bool
}

impl RawStatement {
    /// Text padded so that parser locations match the original input.
    pub(super) fn padded(&self) -> String {
        let mut padded = "\n".repeat(self.first_line.saturating_sub(1));
        padded.push_str(&" ".repeat(self.column.saturating_sub(1)));
        padded.push_str(&self.text);
        padded
    }
}

/// Split SQL text into statements using the engine's tokenizer.
///
/// Semicolons inside string literals, quoted identifiers and comments never
/// split. Semicolons inside the `BEGIN ... END` body of a `CREATE
/// PROCEDURE`, `FUNCTION`, `TRIGGER` or `EVENT` and inside `CASE` blocks do
/// not split either, so routine bodies stay in one piece. `begin` and `end`
/// used as identifiers never open or close a block.
/// Leading comments and whitespace are not part of a statement.
///
/// # Example
///
/// ```
/// use sql_review::parser::{Engine, split_statements};
///
/// let raws = split_statements(Engine::MySql, "SELECT ';';\n-- note\nSELECT 2").unwrap();
///
/// assert_eq!(raws.len(), 2);
/// assert_eq!(raws[0].text, "SELECT ';';");
/// assert_eq!(raws[1].text, "SELECT 2");
/// assert_eq!(raws[1].first_line, 3);
/// ```
pub fn split_statements(engine: Engine, sql: &str) -> Result<Vec<RawStatement>, ReviewError> {
    split_source(engine, &Source::new(sql))
}

pub(super) fn split_source(
    engine: Engine,
    source: &Source<'_>
) -> Result<Vec<RawStatement>, ReviewError> {
    let dialect = engine.dialect();
    let tokens = Tokenizer::new(dialect.as_ref(), source.text())
        .tokenize_with_location()
        .map_err(|e| syntax_error(engine, &e.to_string(), (1, 1)))?;

    let significant: Vec<&TokenWithSpan> = tokens
        .iter()
        .filter(|t| !matches!(t.token, Token::Whitespace(_) | Token::EOF))
        .collect();

    let mut raws = Vec::new();
    let mut current = Pending::new();

    for (i, tok) in significant.iter().enumerate() {
        if tok.token == Token::SemiColon && current.depth == 0 {
            if let Some(first) = current.start {
                raws.push(piece(source, first, tok.span.end, current.compound)?);
            }
            current = Pending::new();
            continue;
        }
        let opens_statement = current.start.is_none();
        if opens_statement {
            current.start = Some(tok.span.start);
        }
        current.end = tok.span.end;

        let Some(word) = keyword(&tok.token) else {
            continue;
        };
        if opens_statement {
            current.creates = word == "CREATE";
            continue;
        }
        if follows_period(&significant, i) {
            continue;
        }
        let next = significant.get(i + 1).map(|t| &t.token);
        match word.as_str() {
            "TABLE" | "VIEW" | "INDEX" | "DATABASE" | "SCHEMA" => current.creates = false,
            "PROCEDURE" | "FUNCTION" | "TRIGGER" | "EVENT" if current.creates => {
                current.routine = true;
            }
            "BEGIN" if current.routine && !is_transaction_begin(next) && !names_column(next) => {
                current.depth += 1;
                current.compound = true;
            }
            "CASE" if !follows_end(&significant, i) => current.depth += 1,
            "END" => {
                let closes_loop = next
                    .and_then(keyword)
                    .is_some_and(|w| matches!(w.as_str(), "IF" | "LOOP" | "WHILE" | "REPEAT"));
                if !closes_loop {
                    current.depth = current.depth.saturating_sub(1);
                }
            }
            _ => {}
        }
    }

    if let Some(first) = current.start {
        raws.push(piece(source, first, current.end, current.compound)?);
    }
    trace!(engine = %engine, statements = raws.len(), "split sql");
    Ok(raws)
}

/// Statement being accumulated by the splitter.
#[derive(Debug)]
struct Pending {
    start:    Option<Location>,
    end:      Location,
    depth:    usize,
    /// Statement starts with CREATE
    creates:  bool,
    /// CREATE of a procedure, function, trigger or event
    routine:  bool,
    compound: bool
}

impl Pending {
    fn new() -> Self {
        Self {
            start:    None,
            end:      Location::new(1, 1),
            depth:    0,
            creates:  false,
            routine:  false,
            compound: false
        }
    }
}

fn piece(
    source: &Source<'_>,
    start: Location,
    end: Location,
    compound: bool
) -> Result<RawStatement, ReviewError> {
    let (Some(from), Some(to)) = (source.offset(start), source.offset(end)) else {
        return Err(ReviewError::internal(format!(
            "token location {start:?} .. {end:?} is outside the input"
        )));
    };
    let line = |l: Location| usize::try_from(l.line).unwrap_or(usize::MAX);
    Ok(RawStatement {
        text:       source.text()[from..to].to_string(),
        range:      from..to,
        first_line: line(start),
        last_line:  line(end),
        column:     usize::try_from(start.column).unwrap_or(1),
        compound
    })
}

/// Upper-cased value of an unquoted word token.
fn keyword(token: &Token) -> Option<String> {
    match token {
        Token::Word(w) if w.quote_style.is_none() => Some(w.value.to_ascii_uppercase()),
        _ => None
    }
}

fn is_transaction_begin(next: Option<&Token>) -> bool {
    match next {
        None | Some(Token::SemiColon) => true,
        Some(token) => keyword(token).is_some_and(|w| matches!(w.as_str(), "WORK" | "TRANSACTION"))
    }
}

/// Word qualified by a preceding `.`, such as `t.begin`.
fn follows_period(tokens: &[&TokenWithSpan], i: usize) -> bool {
    i.checked_sub(1)
        .and_then(|p| tokens.get(p))
        .is_some_and(|t| t.token == Token::Period)
}

/// Token after a word that makes the word a column or alias name.
fn names_column(next: Option<&Token>) -> bool {
    match next {
        Some(
            Token::Period
            | Token::Comma
            | Token::RParen
            | Token::Eq
            | Token::Neq
            | Token::Lt
            | Token::Gt
            | Token::LtEq
            | Token::GtEq
            | Token::Plus
            | Token::Minus
            | Token::Mul
            | Token::Div
        ) => true,
        Some(token) => keyword(token).is_some_and(|w| matches!(w.as_str(), "FROM" | "AS")),
        None => false
    }
}

fn follows_end(tokens: &[&TokenWithSpan], i: usize) -> bool {
    i.checked_sub(1)
        .and_then(|p| tokens.get(p))
        .and_then(|t| keyword(&t.token))
        .is_some_and(|w| w == "END")
}
