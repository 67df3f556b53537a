//! Lexer for ECMAScript source code
//!
//! Converts source text into a stream of tokens. The parser pulls tokens one
//! at a time and asks the lexer to rescan a `/` as a regular expression or a
//! `}` as a template continuation when the grammar calls for it.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::ParseError;
use crate::string_dict::{Atom, StringDict};

/// Source span information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

/// Cooked and raw text of one template literal piece.
///
/// `cooked` is `None` when the piece contains an escape that is only legal in
/// tagged templates.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplatePart {
    pub cooked: Option<Atom>,
    pub raw: Atom,
}

/// Token types for ECMAScript
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    String(Atom),
    /// Digits as written, without separators or the trailing `n`
    BigInt(Atom),
    RegExp {
        pattern: Atom,
        flags: Atom,
    },
    True,
    False,
    Null,

    // Names. Contextual keywords (`let`, `async`, `of`, ...) are identifiers.
    Identifier(Atom),
    /// `#name`, stored without the hash
    PrivateName(Atom),

    // Reserved words
    Break,
    Case,
    Catch,
    Class,
    Const,
    Continue,
    Debugger,
    Default,
    Delete,
    Do,
    Else,
    Enum,
    Export,
    Extends,
    Finally,
    For,
    Function,
    If,
    Import,
    In,
    Instanceof,
    New,
    Return,
    Super,
    Switch,
    This,
    Throw,
    Try,
    Typeof,
    Var,
    Void,
    While,
    With,

    // Operators
    Plus,             // +
    Minus,            // -
    Star,             // *
    Slash,            // /
    Percent,          // %
    StarStar,         // **
    PlusPlus,         // ++
    MinusMinus,       // --
    Eq,               // =
    EqEq,             // ==
    EqEqEq,           // ===
    BangEq,           // !=
    BangEqEq,         // !==
    Lt,               // <
    LtEq,             // <=
    Gt,               // >
    GtEq,             // >=
    LtLt,             // <<
    GtGt,             // >>
    GtGtGt,           // >>>
    Amp,              // &
    AmpAmp,           // &&
    Pipe,             // |
    PipePipe,         // ||
    Caret,            // ^
    Tilde,            // ~
    Bang,             // !
    Question,         // ?
    QuestionQuestion, // ??
    QuestionDot,      // ?.

    // Assignment Operators
    PlusEq,             // +=
    MinusEq,            // -=
    StarEq,             // *=
    SlashEq,            // /=
    PercentEq,          // %=
    StarStarEq,         // **=
    AmpEq,              // &=
    PipeEq,             // |=
    CaretEq,            // ^=
    LtLtEq,             // <<=
    GtGtEq,             // >>=
    GtGtGtEq,           // >>>=
    AmpAmpEq,           // &&=
    PipePipeEq,         // ||=
    QuestionQuestionEq, // ??=

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Dot,       // .
    DotDotDot, // ...
    Comma,     // ,
    Colon,     // :
    Semicolon, // ;
    Arrow,     // =>

    // Template literals
    TemplateHead(TemplatePart),   // `...${
    TemplateMiddle(TemplatePart), // }...${
    TemplateTail(TemplatePart),   // }...`
    TemplateNoSub(TemplatePart),  // `...` (no substitutions)

    Eof,
}

impl TokenKind {
    /// Source spelling of a reserved word or literal keyword.
    pub fn keyword_str(&self) -> Option<&'static str> {
        Some(match self {
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::Break => "break",
            TokenKind::Case => "case",
            TokenKind::Catch => "catch",
            TokenKind::Class => "class",
            TokenKind::Const => "const",
            TokenKind::Continue => "continue",
            TokenKind::Debugger => "debugger",
            TokenKind::Default => "default",
            TokenKind::Delete => "delete",
            TokenKind::Do => "do",
            TokenKind::Else => "else",
            TokenKind::Enum => "enum",
            TokenKind::Export => "export",
            TokenKind::Extends => "extends",
            TokenKind::Finally => "finally",
            TokenKind::For => "for",
            TokenKind::Function => "function",
            TokenKind::If => "if",
            TokenKind::Import => "import",
            TokenKind::In => "in",
            TokenKind::Instanceof => "instanceof",
            TokenKind::New => "new",
            TokenKind::Return => "return",
            TokenKind::Super => "super",
            TokenKind::Switch => "switch",
            TokenKind::This => "this",
            TokenKind::Throw => "throw",
            TokenKind::Try => "try",
            TokenKind::Typeof => "typeof",
            TokenKind::Var => "var",
            TokenKind::Void => "void",
            TokenKind::While => "while",
            TokenKind::With => "with",
            _ => return None,
        })
    }
}

/// Map a word to its reserved-word token, if it is one.
pub fn keyword_kind(word: &str) -> Option<TokenKind> {
    Some(match word {
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "break" => TokenKind::Break,
        "case" => TokenKind::Case,
        "catch" => TokenKind::Catch,
        "class" => TokenKind::Class,
        "const" => TokenKind::Const,
        "continue" => TokenKind::Continue,
        "debugger" => TokenKind::Debugger,
        "default" => TokenKind::Default,
        "delete" => TokenKind::Delete,
        "do" => TokenKind::Do,
        "else" => TokenKind::Else,
        "enum" => TokenKind::Enum,
        "export" => TokenKind::Export,
        "extends" => TokenKind::Extends,
        "finally" => TokenKind::Finally,
        "for" => TokenKind::For,
        "function" => TokenKind::Function,
        "if" => TokenKind::If,
        "import" => TokenKind::Import,
        "in" => TokenKind::In,
        "instanceof" => TokenKind::Instanceof,
        "new" => TokenKind::New,
        "return" => TokenKind::Return,
        "super" => TokenKind::Super,
        "switch" => TokenKind::Switch,
        "this" => TokenKind::This,
        "throw" => TokenKind::Throw,
        "try" => TokenKind::Try,
        "typeof" => TokenKind::Typeof,
        "var" => TokenKind::Var,
        "void" => TokenKind::Void,
        "while" => TokenKind::While,
        "with" => TokenKind::With,
        _ => return None,
    })
}

/// A token with its source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// A line terminator appeared between the previous token and this one.
    pub newline_before: bool,
    /// Identifier spelled with at least one `\u` escape.
    pub escaped: bool,
    /// Legacy octal number or string escape (`010`, `08`, `"\07"`, `"\8"`).
    pub legacy_octal: bool,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            newline_before: false,
            escaped: false,
            legacy_octal: false,
        }
    }

    pub fn eof(pos: usize, line: u32, column: u32) -> Self {
        Self::new(TokenKind::Eof, Span::new(pos, pos, line, column))
    }
}

/// Lexer state checkpoint for backtracking
#[derive(Clone)]
pub struct LexerCheckpoint {
    current_pos: usize,
    line: u32,
    column: u32,
    start_pos: usize,
    start_line: u32,
    start_column: u32,
    saw_newline: bool,
}

/// Result of reading one escape sequence after a backslash.
enum Escape {
    Char(char),
    /// Backslash followed by a line terminator
    Continuation,
    /// Octal or `\8`/`\9` escape, legal only in sloppy string literals
    LegacyOctal(char),
    Invalid(&'static str),
    End,
}

/// Lexer for tokenizing ECMAScript source code
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    /// Base offset added to char_indices positions (needed when resetting chars from middle of source)
    chars_base_offset: usize,
    current_pos: usize,
    line: u32,
    column: u32,
    start_pos: usize,
    start_line: u32,
    start_column: u32,
    /// Tracks if we just saw a newline (for ASI)
    saw_newline: bool,
    /// String dictionary for interning identifiers and strings
    string_dict: &'a mut StringDict,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, string_dict: &'a mut StringDict) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            chars_base_offset: 0,
            current_pos: 0,
            line: 1,
            column: 1,
            start_pos: 0,
            start_line: 1,
            start_column: 1,
            saw_newline: false,
            string_dict,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Get mutable reference to the string dictionary for interning
    pub fn string_dict(&mut self) -> &mut StringDict {
        self.string_dict
    }

    /// Create a checkpoint of the current lexer state for backtracking
    pub fn checkpoint(&self) -> LexerCheckpoint {
        LexerCheckpoint {
            current_pos: self.current_pos,
            line: self.line,
            column: self.column,
            start_pos: self.start_pos,
            start_line: self.start_line,
            start_column: self.start_column,
            saw_newline: self.saw_newline,
        }
    }

    /// Restore the lexer state from a checkpoint
    pub fn restore(&mut self, checkpoint: LexerCheckpoint) {
        self.line = checkpoint.line;
        self.column = checkpoint.column;
        self.start_pos = checkpoint.start_pos;
        self.start_line = checkpoint.start_line;
        self.start_column = checkpoint.start_column;
        self.saw_newline = checkpoint.saw_newline;
        self.reset_chars(checkpoint.current_pos);
    }

    /// Point the character iterator at `pos` without touching line counters.
    fn reset_chars(&mut self, pos: usize) {
        self.current_pos = pos;
        self.chars_base_offset = pos;
        self.chars = self.source.get(pos..).unwrap_or("").char_indices().peekable();
    }

    /// Reset the lexer to the start of `span` and scan a regular expression
    /// literal. Used when the parser finds a `/` or `/=` where an expression
    /// must begin.
    pub fn rescan_as_regexp(&mut self, span: Span) -> Result<Token, ParseError> {
        self.line = span.line;
        self.column = span.column;
        self.start_pos = span.start;
        self.start_line = span.line;
        self.start_column = span.column;
        self.reset_chars(span.start);
        self.scan_regexp()
    }

    /// Rescan from a `}` token as the continuation of a template literal.
    pub fn rescan_template_continuation(&mut self, rbrace_span: Span) -> Result<Token, ParseError> {
        self.line = rbrace_span.line;
        self.column = rbrace_span.column;
        self.start_pos = rbrace_span.start;
        self.start_line = rbrace_span.line;
        self.start_column = rbrace_span.column;
        self.reset_chars(rbrace_span.start);
        // Consume the }
        self.advance();
        let (part, is_tail) = self.scan_template_part()?;
        let kind = if is_tail {
            TokenKind::TemplateTail(part)
        } else {
            TokenKind::TemplateMiddle(part)
        };
        Ok(Token::new(kind, self.make_span()))
    }

    /// Get the next token from the source
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace_and_comments()?;

        self.start_pos = self.current_pos;
        self.start_line = self.line;
        self.start_column = self.column;

        let Some((_pos, ch)) = self.advance() else {
            let mut token = Token::eof(self.current_pos, self.line, self.column);
            token.newline_before = self.saw_newline;
            return Ok(token);
        };

        let mut escaped = false;
        let mut legacy_octal = false;

        let kind = match ch {
            // Single character tokens
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '~' => TokenKind::Tilde,

            // Potentially multi-character tokens
            '.' => self.scan_dot()?,
            '+' => self.scan_plus(),
            '-' => self.scan_minus(),
            '*' => self.scan_star(),
            '/' => self.scan_slash(),
            '%' => self.scan_percent(),
            '=' => self.scan_equals(),
            '!' => self.scan_bang(),
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '&' => self.scan_ampersand(),
            '|' => self.scan_pipe(),
            '^' => self.scan_caret(),
            '?' => self.scan_question(),

            '#' => self.scan_private_name()?,

            // String literals
            '"' | '\'' => {
                let (kind, octal) = self.scan_string(ch)?;
                legacy_octal = octal;
                kind
            }

            // Template literals
            '`' => {
                let (part, is_tail) = self.scan_template_part()?;
                if is_tail {
                    TokenKind::TemplateNoSub(part)
                } else {
                    TokenKind::TemplateHead(part)
                }
            }

            // Numbers
            '0'..='9' => {
                let (kind, octal) = self.scan_number(ch)?;
                legacy_octal = octal;
                kind
            }

            // Identifiers and keywords
            c if is_id_start(c) || c == '\\' => {
                let (kind, was_escaped) = self.scan_identifier(c)?;
                escaped = was_escaped;
                kind
            }

            c => {
                return Err(self.error_at_start(format!("Unexpected character '{}'", c)));
            }
        };

        Ok(Token {
            kind,
            span: self.make_span(),
            newline_before: self.saw_newline,
            escaped,
            legacy_octal,
        })
    }

    /// Check if there was a newline before the most recently scanned token
    pub fn had_newline_before(&self) -> bool {
        self.saw_newline
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            // Add base offset for absolute position (needed when chars is reset from middle of source)
            self.current_pos = self.chars_base_offset + pos + ch.len_utf8();
            match ch {
                '\n' | '\u{2028}' | '\u{2029}' => {
                    self.line += 1;
                    self.column = 1;
                }
                // CRLF counts once, on the LF
                '\r' if self.peek() != Some('\n') => {
                    self.line += 1;
                    self.column = 1;
                }
                _ => self.column += 1,
            }
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_next(&self) -> Option<char> {
        let slice = self.source.get(self.current_pos..)?;
        let mut iter = slice.chars();
        iter.next();
        iter.next()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn make_span(&self) -> Span {
        Span::new(
            self.start_pos,
            self.current_pos,
            self.start_line,
            self.start_column,
        )
    }

    fn error_at_start(&self, message: impl Into<String>) -> ParseError {
        ParseError::lexical(message, self.start_pos, self.start_line, self.start_column)
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError::lexical(message, self.current_pos, self.line, self.column)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ParseError> {
        self.saw_newline = false;

        // Hashbang comment, only at the very start of the source
        if self.current_pos == 0 && self.source.starts_with("#!") {
            while let Some(ch) = self.peek() {
                if is_line_terminator(ch) {
                    break;
                }
                self.advance();
            }
        }

        loop {
            match self.peek() {
                Some(ch) if is_whitespace(ch) => {
                    self.advance();
                }
                Some(ch) if is_line_terminator(ch) => {
                    self.saw_newline = true;
                    self.advance();
                }
                Some('/') => {
                    let next = self.peek_next();
                    if next == Some('/') {
                        // Single-line comment
                        self.advance();
                        self.advance();
                        while let Some(ch) = self.peek() {
                            if is_line_terminator(ch) {
                                break;
                            }
                            self.advance();
                        }
                    } else if next == Some('*') {
                        // Multi-line comment; these do not nest
                        let (offset, line, column) = (self.current_pos, self.line, self.column);
                        self.advance();
                        self.advance();
                        loop {
                            match self.advance() {
                                Some((_, '*')) if self.peek() == Some('/') => {
                                    self.advance();
                                    break;
                                }
                                Some((_, ch)) if is_line_terminator(ch) => {
                                    self.saw_newline = true;
                                }
                                Some(_) => {}
                                None => {
                                    return Err(ParseError::lexical(
                                        "Unterminated comment",
                                        offset,
                                        line,
                                        column,
                                    ));
                                }
                            }
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn scan_dot(&mut self) -> Result<TokenKind, ParseError> {
        if self.peek() == Some('.') && self.peek_next() == Some('.') {
            self.advance();
            self.advance();
            Ok(TokenKind::DotDotDot)
        } else if matches!(self.peek(), Some('0'..='9')) {
            // .123 style number
            Ok(self.scan_number('.')?.0)
        } else {
            Ok(TokenKind::Dot)
        }
    }

    fn scan_plus(&mut self) -> TokenKind {
        if self.match_char('+') {
            TokenKind::PlusPlus
        } else if self.match_char('=') {
            TokenKind::PlusEq
        } else {
            TokenKind::Plus
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        if self.match_char('-') {
            TokenKind::MinusMinus
        } else if self.match_char('=') {
            TokenKind::MinusEq
        } else {
            TokenKind::Minus
        }
    }

    fn scan_star(&mut self) -> TokenKind {
        if self.match_char('*') {
            if self.match_char('=') {
                TokenKind::StarStarEq
            } else {
                TokenKind::StarStar
            }
        } else if self.match_char('=') {
            TokenKind::StarEq
        } else {
            TokenKind::Star
        }
    }

    fn scan_slash(&mut self) -> TokenKind {
        if self.match_char('=') {
            TokenKind::SlashEq
        } else {
            TokenKind::Slash
        }
    }

    /// Scan a regular expression literal starting at the current position.
    fn scan_regexp(&mut self) -> Result<Token, ParseError> {
        // Consume the opening /
        self.advance();

        let mut pattern = String::new();
        let mut in_class = false;

        loop {
            match self.advance() {
                Some((_, '/')) if !in_class => break,
                Some((_, '[')) => {
                    in_class = true;
                    pattern.push('[');
                }
                Some((_, ']')) => {
                    in_class = false;
                    pattern.push(']');
                }
                Some((_, '\\')) => {
                    pattern.push('\\');
                    match self.advance() {
                        Some((_, c)) if !is_line_terminator(c) => pattern.push(c),
                        _ => return Err(self.error_at_start("Unterminated regular expression")),
                    }
                }
                Some((_, c)) if !is_line_terminator(c) => pattern.push(c),
                _ => return Err(self.error_at_start("Unterminated regular expression")),
            }
        }

        let mut flags = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                return Err(self.error_here("Invalid regular expression flags"));
            }
            if !is_id_continue(ch) {
                break;
            }
            if !"dgimsuyv".contains(ch) || flags.contains(ch) {
                return Err(self.error_here("Invalid regular expression flags"));
            }
            flags.push(ch);
            self.advance();
        }
        if flags.contains('u') && flags.contains('v') {
            return Err(self.error_at_start("Invalid regular expression flags"));
        }

        let kind = TokenKind::RegExp {
            pattern: self.string_dict.get_or_insert(&pattern),
            flags: self.string_dict.get_or_insert(&flags),
        };
        Ok(Token::new(kind, self.make_span()))
    }

    fn scan_percent(&mut self) -> TokenKind {
        if self.match_char('=') {
            TokenKind::PercentEq
        } else {
            TokenKind::Percent
        }
    }

    fn scan_equals(&mut self) -> TokenKind {
        if self.match_char('=') {
            if self.match_char('=') {
                TokenKind::EqEqEq
            } else {
                TokenKind::EqEq
            }
        } else if self.match_char('>') {
            TokenKind::Arrow
        } else {
            TokenKind::Eq
        }
    }

    fn scan_bang(&mut self) -> TokenKind {
        if self.match_char('=') {
            if self.match_char('=') {
                TokenKind::BangEqEq
            } else {
                TokenKind::BangEq
            }
        } else {
            TokenKind::Bang
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        if self.match_char('<') {
            if self.match_char('=') {
                TokenKind::LtLtEq
            } else {
                TokenKind::LtLt
            }
        } else if self.match_char('=') {
            TokenKind::LtEq
        } else {
            TokenKind::Lt
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        if self.match_char('>') {
            if self.match_char('>') {
                if self.match_char('=') {
                    TokenKind::GtGtGtEq
                } else {
                    TokenKind::GtGtGt
                }
            } else if self.match_char('=') {
                TokenKind::GtGtEq
            } else {
                TokenKind::GtGt
            }
        } else if self.match_char('=') {
            TokenKind::GtEq
        } else {
            TokenKind::Gt
        }
    }

    fn scan_ampersand(&mut self) -> TokenKind {
        if self.match_char('&') {
            if self.match_char('=') {
                TokenKind::AmpAmpEq
            } else {
                TokenKind::AmpAmp
            }
        } else if self.match_char('=') {
            TokenKind::AmpEq
        } else {
            TokenKind::Amp
        }
    }

    fn scan_pipe(&mut self) -> TokenKind {
        if self.match_char('|') {
            if self.match_char('=') {
                TokenKind::PipePipeEq
            } else {
                TokenKind::PipePipe
            }
        } else if self.match_char('=') {
            TokenKind::PipeEq
        } else {
            TokenKind::Pipe
        }
    }

    fn scan_caret(&mut self) -> TokenKind {
        if self.match_char('=') {
            TokenKind::CaretEq
        } else {
            TokenKind::Caret
        }
    }

    fn scan_question(&mut self) -> TokenKind {
        if self.match_char('?') {
            if self.match_char('=') {
                TokenKind::QuestionQuestionEq
            } else {
                TokenKind::QuestionQuestion
            }
        } else if self.peek() == Some('.') && !matches!(self.peek_next(), Some('0'..='9')) {
            // `a?.5:1` is a conditional, not an optional chain
            self.advance();
            TokenKind::QuestionDot
        } else {
            TokenKind::Question
        }
    }

    fn scan_private_name(&mut self) -> Result<TokenKind, ParseError> {
        match self.peek() {
            Some(c) if is_id_start(c) || c == '\\' => {
                self.advance();
                match self.scan_identifier(c)? {
                    (TokenKind::Identifier(name), _) => Ok(TokenKind::PrivateName(name)),
                    (kind, _) => {
                        // Reserved words are fine after `#`
                        let word = kind.keyword_str().unwrap_or_default();
                        Ok(TokenKind::PrivateName(self.string_dict.get_or_insert(word)))
                    }
                }
            }
            _ => Err(self.error_at_start("Unexpected character '#'")),
        }
    }

    fn scan_string(&mut self, quote: char) -> Result<(TokenKind, bool), ParseError> {
        let mut value = String::new();
        let mut legacy_octal = false;

        loop {
            match self.advance() {
                Some((_, c)) if c == quote => break,
                Some((_, '\\')) => match self.scan_escape() {
                    Escape::Char(c) => value.push(c),
                    Escape::Continuation => {}
                    Escape::LegacyOctal(c) => {
                        legacy_octal = true;
                        value.push(c);
                    }
                    Escape::Invalid(message) => return Err(self.error_here(message)),
                    Escape::End => return Err(self.error_at_start("Unterminated string constant")),
                },
                Some((_, '\n' | '\r')) | None => {
                    return Err(self.error_at_start("Unterminated string constant"));
                }
                Some((_, c)) => value.push(c),
            }
        }

        Ok((
            TokenKind::String(self.string_dict.get_or_insert(&value)),
            legacy_octal,
        ))
    }

    /// Read one escape sequence; the backslash is already consumed.
    fn scan_escape(&mut self) -> Escape {
        let Some((_, ch)) = self.advance() else {
            return Escape::End;
        };
        match ch {
            'n' => Escape::Char('\n'),
            'r' => Escape::Char('\r'),
            't' => Escape::Char('\t'),
            'b' => Escape::Char('\x08'),
            'f' => Escape::Char('\x0C'),
            'v' => Escape::Char('\x0B'),
            '0' if !matches!(self.peek(), Some('0'..='9')) => Escape::Char('\0'),
            '0'..='7' => {
                // ZeroToThree allows two more digits, FourToSeven one
                let max_len = if ch <= '3' { 3 } else { 2 };
                let mut code = ch.to_digit(8).unwrap_or(0);
                let mut len = 1;
                while len < max_len {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            len += 1;
                            self.advance();
                        }
                        None => break,
                    }
                }
                Escape::LegacyOctal(char::from_u32(code).unwrap_or('\u{FFFD}'))
            }
            '8' | '9' => Escape::LegacyOctal(ch),
            'x' => match self.scan_hex_digits(2) {
                Some(code) => Escape::Char(char::from_u32(code).unwrap_or('\u{FFFD}')),
                None => Escape::Invalid("Invalid hexadecimal escape sequence"),
            },
            'u' => match self.scan_unicode_escape_code() {
                Some(code) => Escape::Char(self.combine_surrogates(code)),
                None => Escape::Invalid("Invalid Unicode escape sequence"),
            },
            '\r' => {
                self.match_char('\n');
                Escape::Continuation
            }
            '\n' | '\u{2028}' | '\u{2029}' => Escape::Continuation,
            c => Escape::Char(c),
        }
    }

    /// Read the code point of `\u` escape; the `u` is already consumed.
    fn scan_unicode_escape_code(&mut self) -> Option<u32> {
        if self.match_char('{') {
            let mut code: u32 = 0;
            let mut digits = 0;
            loop {
                match self.peek() {
                    Some('}') if digits > 0 => {
                        self.advance();
                        return Some(code);
                    }
                    Some(c) if c.is_ascii_hexdigit() => {
                        code = code.checked_mul(16)? + c.to_digit(16)?;
                        if code > 0x10FFFF {
                            return None;
                        }
                        digits += 1;
                        self.advance();
                    }
                    _ => return None,
                }
            }
        }
        self.scan_hex_digits(4)
    }

    /// Pair a high surrogate with a following `\uDC00`-`\uDFFF` escape.
    /// Unpaired surrogates cannot live in a Rust string and become U+FFFD.
    fn combine_surrogates(&mut self, code: u32) -> char {
        if (0xD800..=0xDBFF).contains(&code) {
            let rest = self.source.get(self.current_pos..).unwrap_or("");
            if let Some(low) = rest
                .strip_prefix("\\u")
                .and_then(|hex| hex.get(..4))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .filter(|low| (0xDC00..=0xDFFF).contains(low))
            {
                for _ in 0..6 {
                    self.advance();
                }
                let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                return char::from_u32(combined).unwrap_or('\u{FFFD}');
            }
        }
        char::from_u32(code).unwrap_or('\u{FFFD}')
    }

    fn scan_hex_digits(&mut self, count: usize) -> Option<u32> {
        let mut code = 0;
        for _ in 0..count {
            let digit = self.peek()?.to_digit(16)?;
            code = code * 16 + digit;
            self.advance();
        }
        Some(code)
    }

    /// Scan template characters after the opening `` ` `` or `}` up to and
    /// including the closing `` ` `` or `${`. Returns the piece and whether
    /// it closed the template.
    fn scan_template_part(&mut self) -> Result<(TemplatePart, bool), ParseError> {
        let content_start = self.current_pos;
        let mut cooked = Some(String::new());

        let (content_end, is_tail) = loop {
            let before = self.current_pos;
            match self.advance() {
                Some((_, '`')) => break (before, true),
                Some((_, '$')) if self.peek() == Some('{') => {
                    self.advance();
                    break (before, false);
                }
                Some((_, '\\')) => match self.scan_escape() {
                    Escape::Char(c) => {
                        if let Some(text) = cooked.as_mut() {
                            text.push(c);
                        }
                    }
                    Escape::Continuation => {}
                    // Octal escapes other than \0 are never cooked in templates
                    Escape::LegacyOctal(_) | Escape::Invalid(_) => cooked = None,
                    Escape::End => return Err(self.error_at_start("Unterminated template")),
                },
                Some((_, '\r')) => {
                    self.match_char('\n');
                    if let Some(text) = cooked.as_mut() {
                        text.push('\n');
                    }
                }
                Some((_, c)) => {
                    if let Some(text) = cooked.as_mut() {
                        text.push(c);
                    }
                }
                None => return Err(self.error_at_start("Unterminated template")),
            }
        };

        let raw_text = self
            .source
            .get(content_start..content_end)
            .unwrap_or("")
            .replace("\r\n", "\n")
            .replace('\r', "\n");
        let part = TemplatePart {
            cooked: cooked.map(|text| self.string_dict.get_or_insert(&text)),
            raw: self.string_dict.get_or_insert(&raw_text),
        };
        Ok((part, is_tail))
    }

    /// Scan digits of `radix`, validating `_` separators. `after_digit`
    /// says whether a digit was consumed just before this call.
    fn scan_digits(
        &mut self,
        radix: u32,
        out: &mut String,
        after_digit: bool,
    ) -> Result<(), ParseError> {
        let mut last_was_digit = after_digit;
        loop {
            match self.peek() {
                Some(c) if c.is_digit(radix) => {
                    out.push(c);
                    last_was_digit = true;
                    self.advance();
                }
                Some('_') => {
                    let next_is_digit = self.peek_next().is_some_and(|c| c.is_digit(radix));
                    if !last_was_digit || !next_is_digit {
                        return Err(
                            self.error_here("Numeric separators are only allowed between digits")
                        );
                    }
                    last_was_digit = false;
                    self.advance();
                }
                _ => return Ok(()),
            }
        }
    }

    fn scan_number(&mut self, first: char) -> Result<(TokenKind, bool), ParseError> {
        if first == '0' {
            match self.peek() {
                Some('x' | 'X') => return self.scan_radix_number(16),
                Some('o' | 'O') => return self.scan_radix_number(8),
                Some('b' | 'B') => return self.scan_radix_number(2),
                Some('0'..='9') => return self.scan_legacy_number(),
                Some('_') => {
                    return Err(
                        self.error_here("Numeric separator can not be used after leading 0")
                    );
                }
                _ => {}
            }
        }

        let mut text = String::new();
        if first == '.' {
            text.push_str("0.");
            self.scan_digits(10, &mut text, false)?;
        } else {
            text.push(first);
            self.scan_digits(10, &mut text, true)?;

            // BigInt cannot have decimal or exponent parts
            if self.match_char('n') {
                self.check_after_number()?;
                return Ok((TokenKind::BigInt(self.string_dict.get_or_insert(&text)), false));
            }

            if self.match_char('.') {
                text.push('.');
                if matches!(self.peek(), Some('0'..='9')) {
                    self.scan_digits(10, &mut text, false)?;
                } else {
                    text.push('0');
                }
            }
        }

        self.scan_exponent(&mut text)?;
        self.check_after_number()?;
        let value = text
            .parse::<f64>()
            .map_err(|_| self.error_at_start("Invalid number"))?;
        Ok((TokenKind::Number(value), false))
    }

    fn scan_exponent(&mut self, text: &mut String) -> Result<(), ParseError> {
        if matches!(self.peek(), Some('e' | 'E')) {
            self.advance();
            text.push('e');
            if let Some(sign @ ('+' | '-')) = self.peek() {
                text.push(sign);
                self.advance();
            }
            if !matches!(self.peek(), Some('0'..='9')) {
                return Err(self.error_here("Invalid number"));
            }
            self.scan_digits(10, text, false)?;
        }
        Ok(())
    }

    /// `0x`, `0o` and `0b` literals; the leading `0` is consumed and the
    /// prefix letter is next.
    fn scan_radix_number(&mut self, radix: u32) -> Result<(TokenKind, bool), ParseError> {
        self.advance();
        let mut digits = String::new();
        self.scan_digits(radix, &mut digits, false)?;
        if digits.is_empty() {
            return Err(self.error_here("Expected number in radix"));
        }
        if self.match_char('n') {
            self.check_after_number()?;
            let raw = self
                .source
                .get(self.start_pos..self.current_pos.saturating_sub(1))
                .unwrap_or("")
                .replace('_', "");
            return Ok((TokenKind::BigInt(self.string_dict.get_or_insert(&raw)), false));
        }
        self.check_after_number()?;
        let value = digits
            .chars()
            .filter_map(|c| c.to_digit(radix))
            .fold(0.0, |acc, digit| acc * f64::from(radix) + f64::from(digit));
        Ok((TokenKind::Number(value), false))
    }

    /// `0` followed by more digits: legacy octal (`017`) or, when an 8 or 9
    /// appears, a legacy decimal (`089`). Both are rejected in strict code.
    fn scan_legacy_number(&mut self) -> Result<(TokenKind, bool), ParseError> {
        let mut text = String::from("0");
        while let Some(c @ '0'..='9') = self.peek() {
            text.push(c);
            self.advance();
        }
        if self.peek() == Some('_') {
            return Err(self.error_here("Numeric separator can not be used after leading 0"));
        }
        if self.peek() == Some('n') {
            return Err(self.error_here("Invalid BigInt literal"));
        }

        let is_octal = text.chars().all(|c| c.is_digit(8));
        let value = if is_octal {
            text.chars()
                .filter_map(|c| c.to_digit(8))
                .fold(0.0, |acc, digit| acc * 8.0 + f64::from(digit))
        } else {
            if self.match_char('.') {
                text.push('.');
                self.scan_digits(10, &mut text, false)?;
                text.push('0');
            }
            self.scan_exponent(&mut text)?;
            text.parse::<f64>()
                .map_err(|_| self.error_at_start("Invalid number"))?
        };
        self.check_after_number()?;
        Ok((TokenKind::Number(value), true))
    }

    fn check_after_number(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if is_id_start(c) || c == '\\' || c.is_ascii_digit() => {
                Err(self.error_here("Identifier directly after number"))
            }
            _ => Ok(()),
        }
    }

    /// Read the character of an identifier escape; the backslash is consumed.
    fn scan_identifier_escape(&mut self) -> Result<char, ParseError> {
        if !self.match_char('u') {
            return Err(self.error_here("Expecting Unicode escape sequence \\uXXXX"));
        }
        self.scan_unicode_escape_code()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error_here("Invalid Unicode escape sequence"))
    }

    fn scan_identifier(&mut self, first: char) -> Result<(TokenKind, bool), ParseError> {
        let mut name = String::new();
        let mut escaped = false;

        if first == '\\' {
            let ch = self.scan_identifier_escape()?;
            if !is_id_start(ch) {
                return Err(self.error_at_start("Invalid identifier start character"));
            }
            name.push(ch);
            escaped = true;
        } else {
            name.push(first);
        }

        loop {
            match self.peek() {
                Some('\\') => {
                    self.advance();
                    let ch = self.scan_identifier_escape()?;
                    if !is_id_continue(ch) {
                        return Err(self.error_here("Invalid identifier part character"));
                    }
                    name.push(ch);
                    escaped = true;
                }
                Some(ch) if is_id_continue(ch) => {
                    name.push(ch);
                    self.advance();
                }
                _ => break,
            }
        }

        // Escaped reserved words stay identifiers; the parser rejects them
        // wherever a keyword would be required.
        if !escaped {
            if let Some(kind) = keyword_kind(&name) {
                return Ok((kind, false));
            }
        }
        Ok((
            TokenKind::Identifier(self.string_dict.get_or_insert(&name)),
            escaped,
        ))
    }
}

/// ECMAScript line terminators: LF, CR, LS (U+2028), PS (U+2029)
pub fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Whitespace other than line terminators, including the Unicode `Zs` set
fn is_whitespace(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t'
            | '\u{000B}'
            | '\u{000C}'
            | '\u{00A0}'
            | '\u{FEFF}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

/// Check if a character can start an identifier
fn is_id_start(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_xid::UnicodeXID::is_xid_start(ch)
}

/// Check if a character can continue an identifier
fn is_id_continue(ch: char) -> bool {
    ch == '_'
        || ch == '$'
        || ch == '\u{200C}'
        || ch == '\u{200D}'
        || unicode_xid::UnicodeXID::is_xid_continue(ch)
}
