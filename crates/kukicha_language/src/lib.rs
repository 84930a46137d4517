//! # kukicha-language
//!
//! Frontend for the kukicha-to-Go compiler: tokens, lexer, AST, parser, and
//! semantic analysis.
//!
//! # Pipeline position
//!
//! ```text
//! .kuki source
//!      │
//!      ▼
//! ┌──────────┐   tokens    ┌──────────┐    AST     ┌───────────┐
//! │  Lexer   ├────────────►│  Parser  ├───────────►│  Analyzer │
//! └──────────┘             └──────────┘            └─────┬─────┘
//!   lex errors              parse errors            diagnostics +
//!                                                   return-arity map
//! ```
//!
//! The code generator lives in the sibling `kukicha-compile` crate and
//! consumes the [`ast::Program`] plus the [`analysis::Analysis`] side
//! tables produced here.
//!
//! # Example
//!
//! ```
//! use kukicha_base::Interner;
//! use kukicha_language::{AstArenas, Lexer, Parser};
//!
//! let mut interner = Interner::new();
//! let lexed = Lexer::new("func main()\n    print(\"hi\")\n", &mut interner).tokenize();
//! assert!(lexed.errors.is_empty());
//!
//! let arenas = AstArenas::default();
//! let ctx = arenas.context();
//! let mut parser = Parser::new(lexed.tokens, &mut interner, ctx);
//! let program = parser.parse_program();
//! assert!(parser.take_errors().is_empty());
//! assert_eq!(program.decls.len(), 1);
//! ```

pub mod analysis;
pub mod arena_ctx;
pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod suggest;
pub mod token;

pub use analysis::{Analysis, Analyzer};
pub use arena_ctx::{AstArenas, AstContext};
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{LexOutput, Lexer};
pub use parser::Parser;
pub use token::{Token, TokenKind};
