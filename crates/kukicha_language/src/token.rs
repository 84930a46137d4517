//! Token types for the kukicha lexer and parser.
//!
//! Tokens are the atomic syntactic units produced by the lexer. Kukicha is
//! indentation-based, so alongside the usual identifiers, literals, keywords,
//! and operators the stream carries three synthetic kinds that make block
//! structure explicit:
//!
//! - `Indent` — the line is indented deeper than the enclosing block
//! - `Dedent` — the line returns to a shallower enclosing level
//! - `Newline` — a statement boundary at unchanged indentation
//!
//! ## Context-sensitive keywords
//!
//! `list`, `map`, `channel`, `of`, `many`, `to`, and `through` are keywords
//! only in specific syntactic positions (type annotations, numeric `for`
//! loops). The lexer emits them as keyword tokens unconditionally and the
//! parser converts them back to identifiers where the grammar expects a
//! name, mirroring how synonym pairs (`func`/`function`, `var`/`variable`,
//! `petiole`/`leaf`) collapse to one kind here.

use kukicha_base::{Span, Symbol};

/// The kind of a lexical token, with literal payloads inline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    // Identifiers and literals
    Ident(Symbol),
    /// Integer literal. The lexeme preserves the written base so `0xFF`,
    /// `0b1010`, and `0755` survive code generation unchanged.
    Int { value: i64, lexeme: Symbol },
    /// Float literal, lexeme preserved for faithful re-emission.
    Float { value: f64, lexeme: Symbol },
    /// String literal. `interpolated` is set when the raw text contains
    /// `{ident...}` with a letter or underscore after the brace.
    Str { value: Symbol, interpolated: bool },
    Rune(char),

    // Declaration keywords
    Func,
    Var,
    Type,
    Interface,
    Import,
    Petiole,
    Skill,

    // Statement keywords
    If,
    Else,
    For,
    From,
    To,
    Through,
    In,
    Switch,
    When,
    Otherwise,
    Select,
    Return,
    Defer,
    Go,
    Send,
    Receive,
    Break,
    Continue,

    // Builtin-operation keywords
    Make,
    Close,
    Panic,
    Recover,
    Reference,
    Dereference,
    Empty,
    Discard,

    // Error-handling keywords
    OnErr,
    ErrorKw,
    Explain,

    // Operator keywords
    As,
    On,
    And,
    Or,
    Not,
    Equals,

    // Literal keywords
    True,
    False,

    // Type-constructor keywords (context-sensitive)
    List,
    Map,
    Channel,
    Of,
    Many,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    Walrus,
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    PlusPlus,
    MinusMinus,
    PipeOp,
    FatArrow,

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Underscore,

    // Structure
    Indent,
    Dedent,
    Newline,
    Eof,

    /// Unrecognized input, kept for error recovery.
    Invalid(Symbol),
}

impl TokenKind {
    /// Looks up a scanned word, returning its keyword kind or `None` for a
    /// plain identifier. Synonym pairs map to a single kind.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "func" | "function" => TokenKind::Func,
            "var" | "variable" => TokenKind::Var,
            "type" => TokenKind::Type,
            "interface" => TokenKind::Interface,
            "import" => TokenKind::Import,
            "petiole" | "leaf" => TokenKind::Petiole,
            "skill" => TokenKind::Skill,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "from" => TokenKind::From,
            "to" => TokenKind::To,
            "through" => TokenKind::Through,
            "in" => TokenKind::In,
            "switch" => TokenKind::Switch,
            "when" => TokenKind::When,
            "otherwise" => TokenKind::Otherwise,
            "select" => TokenKind::Select,
            "return" => TokenKind::Return,
            "defer" => TokenKind::Defer,
            "go" => TokenKind::Go,
            "send" => TokenKind::Send,
            "receive" => TokenKind::Receive,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "make" => TokenKind::Make,
            "close" => TokenKind::Close,
            "panic" => TokenKind::Panic,
            "recover" => TokenKind::Recover,
            "reference" => TokenKind::Reference,
            "dereference" => TokenKind::Dereference,
            "empty" => TokenKind::Empty,
            "discard" => TokenKind::Discard,
            "onerr" => TokenKind::OnErr,
            "error" => TokenKind::ErrorKw,
            "explain" => TokenKind::Explain,
            "as" => TokenKind::As,
            "on" => TokenKind::On,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "equals" => TokenKind::Equals,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "list" => TokenKind::List,
            "map" => TokenKind::Map,
            "channel" => TokenKind::Channel,
            "of" => TokenKind::Of,
            "many" => TokenKind::Many,
            _ => return None,
        };
        Some(kind)
    }

    /// The surface spelling of a context-sensitive keyword, used when the
    /// parser reinterprets one as an identifier.
    pub fn context_keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::List => "list",
            TokenKind::Map => "map",
            TokenKind::Channel => "channel",
            TokenKind::Of => "of",
            TokenKind::Many => "many",
            TokenKind::To => "to",
            TokenKind::Through => "through",
            TokenKind::From => "from",
            TokenKind::When => "when",
            TokenKind::On => "on",
            TokenKind::Skill => "skill",
            TokenKind::Explain => "explain",
            TokenKind::Send => "send",
            TokenKind::ErrorKw => "error",
            _ => return None,
        };
        Some(text)
    }

    /// A short human-readable description for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(_) => "identifier".to_string(),
            TokenKind::Int { .. } => "integer literal".to_string(),
            TokenKind::Float { .. } => "float literal".to_string(),
            TokenKind::Str { .. } => "string literal".to_string(),
            TokenKind::Rune(_) => "rune literal".to_string(),
            TokenKind::Indent => "indented block".to_string(),
            TokenKind::Dedent => "end of block".to_string(),
            TokenKind::Newline => "end of line".to_string(),
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Invalid(_) => "invalid token".to_string(),
            other => format!("'{}'", other.text()),
        }
    }

    fn text(&self) -> &'static str {
        match self {
            TokenKind::Func => "func",
            TokenKind::Var => "var",
            TokenKind::Type => "type",
            TokenKind::Interface => "interface",
            TokenKind::Import => "import",
            TokenKind::Petiole => "petiole",
            TokenKind::Skill => "skill",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::From => "from",
            TokenKind::To => "to",
            TokenKind::Through => "through",
            TokenKind::In => "in",
            TokenKind::Switch => "switch",
            TokenKind::When => "when",
            TokenKind::Otherwise => "otherwise",
            TokenKind::Select => "select",
            TokenKind::Return => "return",
            TokenKind::Defer => "defer",
            TokenKind::Go => "go",
            TokenKind::Send => "send",
            TokenKind::Receive => "receive",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Make => "make",
            TokenKind::Close => "close",
            TokenKind::Panic => "panic",
            TokenKind::Recover => "recover",
            TokenKind::Reference => "reference",
            TokenKind::Dereference => "dereference",
            TokenKind::Empty => "empty",
            TokenKind::Discard => "discard",
            TokenKind::OnErr => "onerr",
            TokenKind::ErrorKw => "error",
            TokenKind::Explain => "explain",
            TokenKind::As => "as",
            TokenKind::On => "on",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",
            TokenKind::Equals => "equals",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::List => "list",
            TokenKind::Map => "map",
            TokenKind::Channel => "channel",
            TokenKind::Of => "of",
            TokenKind::Many => "many",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Assign => "=",
            TokenKind::Walrus => ":=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::PipeOp => "|>",
            TokenKind::FatArrow => "=>",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Dot => ".",
            TokenKind::Underscore => "_",
            _ => "",
        }
    }
}

/// A token: its kind plus the byte span it was scanned from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_finds_keywords() {
        assert_eq!(TokenKind::keyword("func"), Some(TokenKind::Func));
        assert_eq!(TokenKind::keyword("onerr"), Some(TokenKind::OnErr));
        assert_eq!(TokenKind::keyword("fetchData"), None);
    }

    #[test]
    fn synonyms_collapse_to_one_kind() {
        assert_eq!(TokenKind::keyword("func"), TokenKind::keyword("function"));
        assert_eq!(TokenKind::keyword("var"), TokenKind::keyword("variable"));
        assert_eq!(TokenKind::keyword("petiole"), TokenKind::keyword("leaf"));
    }

    #[test]
    fn context_keywords_have_surface_text() {
        assert_eq!(TokenKind::List.context_keyword_text(), Some("list"));
        assert_eq!(TokenKind::Of.context_keyword_text(), Some("of"));
        assert_eq!(TokenKind::Func.context_keyword_text(), None);
    }

    #[test]
    fn describe_names_literals_and_symbols() {
        assert_eq!(TokenKind::Walrus.describe(), "':='");
        assert_eq!(TokenKind::Newline.describe(), "end of line");
        assert_eq!(
            TokenKind::Ident(Symbol::EMPTY).describe(),
            "identifier"
        );
    }
}
