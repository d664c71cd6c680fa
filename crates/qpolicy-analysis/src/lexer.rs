//! Lexer for the subset of Python needed to locate quantum call sites.
//!
//! Only the token classes the call recognizer cares about are distinguished;
//! every other operator collapses into [`Token::Operator`].

use logos::Logos;

/// Tokens of a hybrid program source file.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
#[logos(skip r"\\\r?\n")]
pub enum Token {
    // Literals
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?", |lex| lex.slice().replace('_', "").parse::<f64>().ok())]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+", |lex| lex.slice().replace('_', "").parse::<f64>().ok())]
    FloatLiteral(f64),

    #[regex(r"[0-9][0-9_]*", |lex| lex.slice().replace('_', "").parse::<u64>().ok())]
    IntLiteral(u64),

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    StringLiteral,

    #[token("\"\"\"", |lex| triple_quoted(lex, "\"\"\""))]
    #[token("'''", |lex| triple_quoted(lex, "'''"))]
    DocString,

    // Identifiers (keywords included, the recognizer does not need them)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Punctuation
    #[token("=")]
    Assign,

    #[regex(r"==|!=|<=|>=|<<=?|>>=?|\*\*=?|//=?|->|:=|[-+*/%<>&|^~@!]=?")]
    Operator,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,
}

fn triple_quoted(lex: &mut logos::Lexer<Token>, quote: &str) -> bool {
    match lex.remainder().find(quote) {
        Some(end) => {
            lex.bump(end + quote.len());
            true
        }
        None => false,
    }
}

impl Token {
    /// Whether this token opens a bracketed group.
    pub fn opens_group(&self) -> bool {
        matches!(self, Token::LParen | Token::LBracket | Token::LBrace)
    }

    /// Whether this token closes a bracketed group.
    pub fn closes_group(&self) -> bool {
        matches!(self, Token::RParen | Token::RBracket | Token::RBrace)
    }
}

/// A token with its byte span in the source.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: std::ops::Range<usize>,
}

/// Tokenize a program source, dropping characters the lexer does not know.
pub fn tokenize(source: &str) -> Vec<SpannedToken> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => tokens.push(SpannedToken { token, span }),
            Err(()) => {
                tracing::trace!("Skipping unknown input '{}'", &source[span]);
            }
        }
    }

    tokens
}

/// 1-based line number of a byte offset.
pub fn line_of(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
        + 1
}
