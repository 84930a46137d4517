//! Indentation-sensitive lexer for kukicha source.
//!
//! The lexer makes block structure explicit by emitting synthetic `Indent`,
//! `Dedent`, and `Newline` tokens. Two independent depth counters steer that
//! machinery:
//!
//! - **brace depth** counts `[` and `{`. While nonzero, newlines are consumed
//!   silently, so list/map/struct literals can span lines freely.
//! - **paren depth** counts `(` and is tracked separately. It never
//!   suppresses `Indent`/`Dedent`: a lambda passed inside a call's
//!   parentheses can carry a full multi-line indented body.
//!
//! Indentation uses spaces only; a tab in leading whitespace is a lexical
//! error. Any consistent step is accepted, but a dedent must return to some
//! enclosing level on the indent stack.
//!
//! The lexer is total: malformed input produces error diagnostics and
//! `Invalid` tokens, never an abort.

use kukicha_base::{Diagnostic, Interner, Span};

use crate::token::{Token, TokenKind};

/// Result of tokenizing one source file.
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub errors: Vec<Diagnostic>,
}

/// The lexer state machine. Create with [`Lexer::new`], run with
/// [`Lexer::tokenize`].
pub struct Lexer<'src, 'int> {
    source: &'src str,
    bytes: &'src [u8],
    pos: usize,
    interner: &'int mut Interner,
    errors: Vec<Diagnostic>,
    indent_stack: Vec<usize>,
    brace_depth: usize,
    paren_depth: usize,
}

impl<'src, 'int> Lexer<'src, 'int> {
    pub fn new(source: &'src str, interner: &'int mut Interner) -> Self {
        Lexer {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            interner,
            errors: Vec::new(),
            indent_stack: vec![0],
            brace_depth: 0,
            paren_depth: 0,
        }
    }

    /// Tokenizes the whole source, always ending the stream with balancing
    /// `Dedent`s and a final `Eof`.
    pub fn tokenize(mut self) -> LexOutput {
        let mut tokens = Vec::new();
        self.line_start(&mut tokens);

        while !self.at_end() {
            let c = self.current();
            match c {
                ' ' | '\t' => {
                    self.pos += 1;
                }
                '\r' => {
                    self.pos += 1;
                }
                '\n' => {
                    let nl = self.pos;
                    self.pos += 1;
                    if self.brace_depth == 0 {
                        tokens.push(Token::new(TokenKind::Newline, Span::new(nl, nl + 1)));
                        self.line_start(&mut tokens);
                    }
                }
                '/' if self.peek(1) == Some('/') => {
                    self.skip_line_comment();
                }
                _ => {
                    let token = self.scan_token();
                    tokens.push(token);
                }
            }
        }

        // Close any open block structure before EOF.
        if let Some(last) = tokens.last() {
            if !matches!(
                last.kind,
                TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent
            ) {
                tokens.push(Token::new(
                    TokenKind::Newline,
                    Span::new(self.pos, self.pos),
                ));
            }
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            tokens.push(Token::new(
                TokenKind::Dedent,
                Span::new(self.pos, self.pos),
            ));
        }
        tokens.push(Token::new(TokenKind::Eof, Span::new(self.pos, self.pos)));

        LexOutput {
            tokens,
            errors: self.errors,
        }
    }

    /// Measures the indentation of the next non-blank line and emits
    /// `Indent`/`Dedent` tokens against the indent stack. Blank lines and
    /// comment-only lines produce nothing.
    fn line_start(&mut self, tokens: &mut Vec<Token>) {
        debug_assert_eq!(self.brace_depth, 0);
        let indent = loop {
            let line_begin = self.pos;
            let mut indent = 0usize;
            let mut tab_reported = false;
            while let Some(c) = self.bytes.get(self.pos).copied() {
                match c {
                    b' ' => {
                        indent += 1;
                        self.pos += 1;
                    }
                    b'\t' => {
                        if !tab_reported {
                            self.errors.push(Diagnostic::error(
                                "tab character in indentation; use spaces",
                                Span::new(self.pos, self.pos + 1),
                            ));
                            tab_reported = true;
                        }
                        indent += 1;
                        self.pos += 1;
                    }
                    b'\r' => {
                        self.pos += 1;
                    }
                    _ => break,
                }
            }
            if self.at_end() {
                return;
            }
            match self.current() {
                '\n' => {
                    self.pos += 1;
                    continue;
                }
                '/' if self.peek(1) == Some('/') => {
                    self.skip_line_comment();
                    if !self.at_end() && self.current() == '\n' {
                        self.pos += 1;
                    }
                    continue;
                }
                _ => {
                    let _ = line_begin;
                    break indent;
                }
            }
        };

        let here = Span::new(self.pos, self.pos);
        let current = *self.indent_stack.last().unwrap();
        if indent > current {
            self.indent_stack.push(indent);
            tokens.push(Token::new(TokenKind::Indent, here));
        } else if indent < current {
            while self.indent_stack.len() > 1 && *self.indent_stack.last().unwrap() > indent {
                self.indent_stack.pop();
                tokens.push(Token::new(TokenKind::Dedent, here));
            }
            if *self.indent_stack.last().unwrap() != indent {
                self.errors.push(Diagnostic::error(
                    "unindent does not match any outer indentation level",
                    here,
                ));
            }
        }
    }

    fn scan_token(&mut self) -> Token {
        let start = self.pos;
        let c = self.current();

        if c.is_ascii_alphabetic() || c == '_' {
            return self.scan_word(start);
        }
        if c.is_ascii_digit() {
            return self.scan_number(start);
        }

        self.pos += c.len_utf8();
        let kind = match c {
            '"' => return self.scan_string(start),
            '\'' => return self.scan_rune(start),
            '(' => {
                self.paren_depth += 1;
                TokenKind::LParen
            }
            ')' => {
                self.paren_depth = self.paren_depth.saturating_sub(1);
                TokenKind::RParen
            }
            '[' => {
                self.brace_depth += 1;
                TokenKind::LBracket
            }
            ']' => {
                self.brace_depth = self.brace_depth.saturating_sub(1);
                TokenKind::RBracket
            }
            '{' => {
                self.brace_depth += 1;
                TokenKind::LBrace
            }
            '}' => {
                self.brace_depth = self.brace_depth.saturating_sub(1);
                TokenKind::RBrace
            }
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            '%' => TokenKind::Percent,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '+' => {
                if self.eat('+') {
                    TokenKind::PlusPlus
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    TokenKind::MinusMinus
                } else {
                    TokenKind::Minus
                }
            }
            '=' => {
                if self.eat('=') {
                    TokenKind::EqEq
                } else if self.eat('>') {
                    TokenKind::FatArrow
                } else {
                    TokenKind::Assign
                }
            }
            ':' => {
                if self.eat('=') {
                    TokenKind::Walrus
                } else {
                    TokenKind::Colon
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::NotEq
                } else {
                    return self.invalid(start, "unexpected character '!'; use 'not'");
                }
            }
            '|' => {
                if self.eat('>') {
                    TokenKind::PipeOp
                } else {
                    return self.invalid(start, "unexpected character '|'; use 'or' or '|>'");
                }
            }
            other => {
                let message = format!("unexpected character '{}'", other);
                return self.invalid(start, &message);
            }
        };
        Token::new(kind, Span::new(start, self.pos))
    }

    fn scan_word(&mut self, start: usize) -> Token {
        while let Some(c) = self.char_at(self.pos) {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];
        let span = Span::new(start, self.pos);
        if text == "_" {
            return Token::new(TokenKind::Underscore, span);
        }
        match TokenKind::keyword(text) {
            Some(kind) => Token::new(kind, span),
            None => {
                let sym = self.interner.intern(text);
                Token::new(TokenKind::Ident(sym), span)
            }
        }
    }

    fn scan_number(&mut self, start: usize) -> Token {
        let radix = if self.current() == '0' {
            match self.peek(1) {
                Some('x') | Some('X') => 16,
                Some('b') | Some('B') => 2,
                Some(c) if c.is_ascii_digit() => 8,
                _ => 10,
            }
        } else {
            10
        };

        if radix == 16 || radix == 2 {
            self.pos += 2;
            let digits_start = self.pos;
            while let Some(c) = self.char_at(self.pos) {
                if c.is_digit(radix) || c == '_' {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            let span = Span::new(start, self.pos);
            let digits: String = self.source[digits_start..self.pos]
                .chars()
                .filter(|&c| c != '_')
                .collect();
            if digits.is_empty() {
                self.errors.push(Diagnostic::error(
                    format!("malformed number '{}'", &self.source[start..self.pos]),
                    span,
                ));
                let sym = self.interner.intern(&self.source[start..self.pos]);
                return Token::new(TokenKind::Invalid(sym), span);
            }
            let value = i64::from_str_radix(&digits, radix).unwrap_or_else(|_| {
                self.errors
                    .push(Diagnostic::error("integer literal overflows", span));
                0
            });
            let lexeme = self.interner.intern(&self.source[start..self.pos]);
            return Token::new(TokenKind::Int { value, lexeme }, span);
        }

        // Decimal (or legacy octal) digits, then an optional fraction and
        // exponent which promote the literal to a float.
        while let Some(c) = self.char_at(self.pos) {
            if c.is_ascii_digit() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let mut is_float = false;
        if self.char_at(self.pos) == Some('.')
            && self.char_at(self.pos + 1).is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.pos += 1;
            while let Some(c) = self.char_at(self.pos) {
                if c.is_ascii_digit() {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        if matches!(self.char_at(self.pos), Some('e') | Some('E')) {
            let mut ahead = self.pos + 1;
            if matches!(self.char_at(ahead), Some('+') | Some('-')) {
                ahead += 1;
            }
            if self.char_at(ahead).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.pos = ahead;
                while let Some(c) = self.char_at(self.pos) {
                    if c.is_ascii_digit() {
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
            }
        }

        let span = Span::new(start, self.pos);
        let raw = &self.source[start..self.pos];
        let lexeme = self.interner.intern(raw);
        let cleaned: String = raw.chars().filter(|&c| c != '_').collect();

        if is_float {
            let value = cleaned.parse::<f64>().unwrap_or_else(|_| {
                self.errors
                    .push(Diagnostic::error(format!("malformed number '{}'", raw), span));
                0.0
            });
            return Token::new(TokenKind::Float { value, lexeme }, span);
        }

        let parse_radix = if radix == 8 { 8 } else { 10 };
        let digits = if parse_radix == 8 { &cleaned[1..] } else { &cleaned[..] };
        match i64::from_str_radix(digits, parse_radix) {
            Ok(value) => Token::new(TokenKind::Int { value, lexeme }, span),
            Err(_) => {
                self.errors
                    .push(Diagnostic::error(format!("malformed number '{}'", raw), span));
                Token::new(TokenKind::Invalid(lexeme), span)
            }
        }
    }

    fn scan_string(&mut self, start: usize) -> Token {
        let mut value = String::new();
        loop {
            match self.char_at(self.pos) {
                None | Some('\n') => {
                    self.errors.push(Diagnostic::error(
                        "unterminated string literal",
                        Span::new(start, self.pos),
                    ));
                    break;
                }
                Some('"') => {
                    self.pos += 1;
                    break;
                }
                Some('\\') => {
                    self.pos += 1;
                    match self.char_at(self.pos) {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some('\\') => value.push('\\'),
                        Some('"') => value.push('"'),
                        Some('\'') => value.push('\''),
                        Some('0') => value.push('\0'),
                        Some(other) => {
                            self.errors.push(Diagnostic::error(
                                format!("invalid escape sequence '\\{}'", other),
                                Span::new(self.pos - 1, self.pos + other.len_utf8()),
                            ));
                            value.push(other);
                        }
                        None => continue,
                    }
                    if let Some(c) = self.char_at(self.pos) {
                        self.pos += c.len_utf8();
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
        let span = Span::new(start, self.pos);
        let interpolated = is_interpolated(&value);
        let sym = self.interner.intern(&value);
        Token::new(
            TokenKind::Str {
                value: sym,
                interpolated,
            },
            span,
        )
    }

    fn scan_rune(&mut self, start: usize) -> Token {
        let c = match self.char_at(self.pos) {
            None | Some('\n') => {
                self.errors.push(Diagnostic::error(
                    "unterminated rune literal",
                    Span::new(start, self.pos),
                ));
                return Token::new(TokenKind::Rune('\0'), Span::new(start, self.pos));
            }
            Some('\\') => {
                self.pos += 1;
                let escaped = self.char_at(self.pos);
                let decoded = match escaped {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some('\\') => '\\',
                    Some('\'') => '\'',
                    Some('"') => '"',
                    Some('0') => '\0',
                    other => {
                        self.errors.push(Diagnostic::error(
                            format!(
                                "invalid escape sequence '\\{}'",
                                other.unwrap_or(' ')
                            ),
                            Span::new(self.pos - 1, self.pos + 1),
                        ));
                        other.unwrap_or('\0')
                    }
                };
                if let Some(c) = escaped {
                    self.pos += c.len_utf8();
                }
                decoded
            }
            Some(c) => {
                self.pos += c.len_utf8();
                c
            }
        };
        if self.char_at(self.pos) == Some('\'') {
            self.pos += 1;
        } else {
            self.errors.push(Diagnostic::error(
                "unterminated rune literal",
                Span::new(start, self.pos),
            ));
        }
        Token::new(TokenKind::Rune(c), Span::new(start, self.pos))
    }

    fn skip_line_comment(&mut self) {
        while !self.at_end() && self.current() != '\n' {
            self.pos += self.current().len_utf8();
        }
    }

    fn invalid(&mut self, start: usize, message: &str) -> Token {
        let span = Span::new(start, self.pos.max(start + 1));
        self.errors.push(Diagnostic::error(message, span));
        let sym = self.interner.intern(&self.source[start..span.end.min(self.source.len())]);
        Token::new(TokenKind::Invalid(sym), span)
    }

    fn current(&self) -> char {
        self.source[self.pos..].chars().next().unwrap_or('\0')
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.source.get(pos..).and_then(|s| s.chars().next())
    }

    fn peek(&self, offset: usize) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        for _ in 0..offset {
            chars.next()?;
        }
        chars.next()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.char_at(self.pos) == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }
}

/// A string literal is interpolated when it contains `{` immediately
/// followed by a letter or underscore. Regex quantifiers like `{2,}` do not
/// qualify.
pub fn is_interpolated(value: &str) -> bool {
    let bytes = value.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'{' {
            if let Some(&next) = bytes.get(i + 1) {
                if next.is_ascii_alphabetic() || next == b'_' {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> (Vec<TokenKind>, Vec<Diagnostic>) {
        let mut interner = Interner::new();
        let out = Lexer::new(source, &mut interner).tokenize();
        (out.tokens.into_iter().map(|t| t.kind).collect(), out.errors)
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).0
    }

    #[test]
    fn simple_line_ends_with_newline_and_eof() {
        let toks = kinds("x := 5");
        assert!(matches!(toks[0], TokenKind::Ident(_)));
        assert_eq!(toks[1], TokenKind::Walrus);
        assert!(matches!(toks[2], TokenKind::Int { value: 5, .. }));
        assert_eq!(toks[3], TokenKind::Newline);
        assert_eq!(toks[4], TokenKind::Eof);
    }

    #[test]
    fn indent_and_dedent_balance() {
        let source = "if ready\n    go work()\nprint(\"done\")\n";
        let toks = kinds(source);
        let indents = toks.iter().filter(|k| **k == TokenKind::Indent).count();
        let dedents = toks.iter().filter(|k| **k == TokenKind::Dedent).count();
        assert_eq!(indents, 1);
        assert_eq!(dedents, 1);
    }

    #[test]
    fn nested_blocks_emit_multiple_dedents_at_eof() {
        let source = "if a\n    if b\n        work()\n";
        let toks = kinds(source);
        let dedents = toks.iter().filter(|k| **k == TokenKind::Dedent).count();
        assert_eq!(dedents, 2);
    }

    #[test]
    fn blank_lines_do_not_affect_indentation() {
        let source = "if a\n    work()\n\n\n    more()\n";
        let toks = kinds(source);
        let indents = toks.iter().filter(|k| **k == TokenKind::Indent).count();
        assert_eq!(indents, 1);
    }

    #[test]
    fn newlines_inside_brackets_are_silent() {
        let source = "xs := [1,\n    2,\n    3]\n";
        let (toks, errors) = lex(source);
        assert!(errors.is_empty());
        assert!(!toks[..toks.len() - 2]
            .iter()
            .any(|k| matches!(k, TokenKind::Indent | TokenKind::Dedent)));
        // Exactly the one statement-terminating newline survives.
        let newlines = toks.iter().filter(|k| **k == TokenKind::Newline).count();
        assert_eq!(newlines, 1);
    }

    #[test]
    fn paren_depth_does_not_suppress_indentation() {
        // A lambda body inside a call's parentheses keeps its block structure.
        let source = "items.Map((x) =>\n    x * 2\n)\n";
        let toks = kinds(source);
        assert!(toks.contains(&TokenKind::Indent));
        assert!(toks.contains(&TokenKind::Dedent));
    }

    #[test]
    fn tab_in_indentation_is_an_error() {
        let (_, errors) = lex("if a\n\twork()\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("tab"));
    }

    #[test]
    fn mismatched_dedent_is_an_error() {
        let (_, errors) = lex("if a\n        deep()\n    shallow()\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("unindent"));
    }

    #[test]
    fn keywords_and_synonyms() {
        let toks = kinds("function main()\n");
        assert_eq!(toks[0], TokenKind::Func);
        let toks = kinds("leaf strings\n");
        assert_eq!(toks[0], TokenKind::Petiole);
    }

    #[test]
    fn english_operators_are_keywords() {
        let toks = kinds("a and not b or c equals d\n");
        assert!(toks.contains(&TokenKind::And));
        assert!(toks.contains(&TokenKind::Not));
        assert!(toks.contains(&TokenKind::Or));
        assert!(toks.contains(&TokenKind::Equals));
    }

    #[test]
    fn hex_binary_octal_lexemes_are_preserved() {
        let mut interner = Interner::new();
        let out = Lexer::new("0xFF 0b1010 0755 42\n", &mut interner).tokenize();
        let ints: Vec<(i64, String)> = out
            .tokens
            .iter()
            .filter_map(|t| match t.kind {
                TokenKind::Int { value, lexeme } => {
                    Some((value, interner.resolve(lexeme).to_string()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            ints,
            vec![
                (255, "0xFF".to_string()),
                (10, "0b1010".to_string()),
                (493, "0755".to_string()),
                (42, "42".to_string()),
            ]
        );
    }

    #[test]
    fn float_forms() {
        let toks = kinds("3.14 1e10 2.5e-3\n");
        let floats = toks
            .iter()
            .filter(|k| matches!(k, TokenKind::Float { .. }))
            .count();
        assert_eq!(floats, 3);
    }

    #[test]
    fn string_interpolation_flag() {
        let toks = kinds("\"Hello, {name}!\" \"plain\" \"{2,}\"\n");
        let flags: Vec<bool> = toks
            .iter()
            .filter_map(|k| match k {
                TokenKind::Str { interpolated, .. } => Some(*interpolated),
                _ => None,
            })
            .collect();
        assert_eq!(flags, vec![true, false, false]);
    }

    #[test]
    fn string_escapes_decode() {
        let mut interner = Interner::new();
        let out = Lexer::new("\"a\\tb\\n\"\n", &mut interner).tokenize();
        let value = out
            .tokens
            .iter()
            .find_map(|t| match t.kind {
                TokenKind::Str { value, .. } => Some(interner.resolve(value).to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(value, "a\tb\n");
        assert!(out.errors.is_empty());
    }

    #[test]
    fn unterminated_string_recovers() {
        let (toks, errors) = lex("x := \"oops\ny := 2\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("unterminated"));
        // Lexing continues on the next line.
        let walruses = toks.iter().filter(|k| **k == TokenKind::Walrus).count();
        assert_eq!(walruses, 2);
    }

    #[test]
    fn rune_literals() {
        let toks = kinds("'a' '\\n'\n");
        assert_eq!(toks[0], TokenKind::Rune('a'));
        assert_eq!(toks[1], TokenKind::Rune('\n'));
    }

    #[test]
    fn pipe_operator_and_fat_arrow() {
        let toks = kinds("x |> f\n(y) => y\n");
        assert!(toks.contains(&TokenKind::PipeOp));
        assert!(toks.contains(&TokenKind::FatArrow));
    }

    #[test]
    fn underscore_is_its_own_token() {
        let toks = kinds("f(w, _)\n");
        assert!(toks.contains(&TokenKind::Underscore));
    }

    #[test]
    fn line_comments_are_skipped() {
        let toks = kinds("// header\nx := 1 // trailing\n");
        let idents = toks
            .iter()
            .filter(|k| matches!(k, TokenKind::Ident(_)))
            .count();
        assert_eq!(idents, 1);
    }

    #[test]
    fn invalid_character_produces_error_token_and_continues() {
        let (toks, errors) = lex("x := 1 @ 2\n");
        assert_eq!(errors.len(), 1);
        assert!(toks.iter().any(|k| matches!(k, TokenKind::Invalid(_))));
        assert!(toks.iter().any(|k| matches!(k, TokenKind::Int { value: 2, .. })));
    }
}
