//! Logos-based lexer for GML
//!
//! Lossless tokenization: every byte of the input is covered by exactly one
//! token, so concatenating all token texts reproduces the source.

use super::error::ParseError;
use logos::Logos;
use text_size::TextSize;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl<'a> Token<'a> {
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Newline)
    }

    pub fn is_comment(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::LineComment | TokenKind::BlockComment | TokenKind::DocComment
        )
    }
}

/// Tokenize an entire GML source string.
///
/// Total over its input: any byte that no pattern covers is a fatal
/// [`ParseError::Tokenize`]. The returned stream always ends with a
/// zero-length [`TokenKind::Eof`] token.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let mut lexer = GmlToken::lexer(input);
    let mut tokens = Vec::new();

    while let Some(raw) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        let kind = match raw {
            Ok(t) => reclassify(t.into(), text),
            Err(()) => return Err(ParseError::Tokenize { offset: span.start }),
        };
        tokens.push(Token {
            kind,
            text,
            offset: TextSize::new(span.start as u32),
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        text: "",
        offset: TextSize::new(input.len() as u32),
    });

    Ok(tokens)
}

/// A `///` comment made of nothing but 4+ slashes is a section divider,
/// not documentation.
fn reclassify(kind: TokenKind, text: &str) -> TokenKind {
    if kind == TokenKind::DocComment && text.len() >= 4 && text.bytes().all(|b| b == b'/') {
        TokenKind::LineComment
    } else {
        kind
    }
}

/// Logos token enum - maps to TokenKind
///
/// Longest-match resolution gives reserved words word-boundary behavior
/// (`functions` lexes as an identifier, not `function` + `s`); explicit
/// priorities break the length ties between the comment patterns.
/// Reserved words match in any letter case, as GML accepts them.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum GmlToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\f]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"///[^\n]*", priority = 12)]
    DocComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    #[regex(r"//+[^\n]*", priority = 6)]
    LineComment,

    // =========================================================================
    // MARKERS & LITERALS
    // =========================================================================
    #[token("#macro", ignore(ascii_case))]
    Macro,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+\.?[0-9]*|\.[0-9]+")]
    #[regex(r"\$[0-9a-fA-F]+")]
    Number,

    #[regex(r#"@"(\\.|[^\\"])*""#)]
    #[regex(r#""(\\.|[^\\"\n])*""#)]
    String,

    // =========================================================================
    // RESERVED WORDS
    // =========================================================================
    #[token("all", ignore(ascii_case))]
    AllKw,
    #[token("break", ignore(ascii_case))]
    BreakKw,
    #[token("case", ignore(ascii_case))]
    CaseKw,
    #[token("catch", ignore(ascii_case))]
    CatchKw,
    #[token("constructor", ignore(ascii_case))]
    ConstructorKw,
    #[token("continue", ignore(ascii_case))]
    ContinueKw,
    #[token("default", ignore(ascii_case))]
    DefaultKw,
    #[token("delete", ignore(ascii_case))]
    DeleteKw,
    #[token("div", ignore(ascii_case))]
    DivKw,
    #[token("do", ignore(ascii_case))]
    DoKw,
    #[token("else", ignore(ascii_case))]
    ElseKw,
    #[token("enum", ignore(ascii_case))]
    EnumKw,
    #[token("exit", ignore(ascii_case))]
    ExitKw,
    #[token("false", ignore(ascii_case))]
    FalseKw,
    #[token("finally", ignore(ascii_case))]
    FinallyKw,
    #[token("for", ignore(ascii_case))]
    ForKw,
    #[token("function", ignore(ascii_case))]
    FunctionKw,
    #[token("global", ignore(ascii_case))]
    GlobalKw,
    #[token("if", ignore(ascii_case))]
    IfKw,
    #[token("mod", ignore(ascii_case))]
    ModKw,
    #[token("new", ignore(ascii_case))]
    NewKw,
    #[token("noone", ignore(ascii_case))]
    NooneKw,
    #[token("other", ignore(ascii_case))]
    OtherKw,
    #[token("repeat", ignore(ascii_case))]
    RepeatKw,
    #[token("return", ignore(ascii_case))]
    ReturnKw,
    #[token("self", ignore(ascii_case))]
    SelfKw,
    #[token("static", ignore(ascii_case))]
    StaticKw,
    #[token("switch", ignore(ascii_case))]
    SwitchKw,
    #[token("throw", ignore(ascii_case))]
    ThrowKw,
    #[token("true", ignore(ascii_case))]
    TrueKw,
    #[token("try", ignore(ascii_case))]
    TryKw,
    #[token("until", ignore(ascii_case))]
    UntilKw,
    #[token("var", ignore(ascii_case))]
    VarKw,
    #[token("while", ignore(ascii_case))]
    WhileKw,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    // `begin`/`end` are the legacy GML spellings of the braces.
    #[token("{")]
    #[token("begin", ignore(ascii_case))]
    LBrace,
    #[token("}")]
    #[token("end", ignore(ascii_case))]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("@")]
    At,
    #[token("#")]
    Hash,
    #[token("$")]
    Dollar,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("/")]
    Slash,
    #[token("\\")]
    Backslash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("?")]
    Question,
    #[token("!")]
    Bang,
    #[token("|")]
    Pipe,
    #[token("&")]
    Amp,
}

/// Lexical categories of the GML token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Trivia
    Whitespace,
    Newline,
    DocComment,
    BlockComment,
    LineComment,

    // Markers & literals
    Macro,
    Ident,
    Number,
    String,

    // Reserved words
    AllKw,
    BreakKw,
    CaseKw,
    CatchKw,
    ConstructorKw,
    ContinueKw,
    DefaultKw,
    DeleteKw,
    DivKw,
    DoKw,
    ElseKw,
    EnumKw,
    ExitKw,
    FalseKw,
    FinallyKw,
    ForKw,
    FunctionKw,
    GlobalKw,
    IfKw,
    ModKw,
    NewKw,
    NooneKw,
    OtherKw,
    RepeatKw,
    ReturnKw,
    SelfKw,
    StaticKw,
    SwitchKw,
    ThrowKw,
    TrueKw,
    TryKw,
    UntilKw,
    VarKw,
    WhileKw,

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semicolon,
    Colon,
    Dot,
    Comma,
    Eq,
    Lt,
    Gt,
    At,
    Hash,
    Dollar,
    Star,
    Plus,
    Minus,
    Slash,
    Backslash,
    Percent,
    Caret,
    Tilde,
    Question,
    Bang,
    Pipe,
    Amp,

    /// Zero-length end-of-stream terminal
    Eof,
}

impl From<GmlToken> for TokenKind {
    fn from(token: GmlToken) -> Self {
        use GmlToken::*;
        match token {
            Whitespace => TokenKind::Whitespace,
            Newline => TokenKind::Newline,
            DocComment => TokenKind::DocComment,
            BlockComment => TokenKind::BlockComment,
            LineComment => TokenKind::LineComment,

            Macro => TokenKind::Macro,
            Ident => TokenKind::Ident,
            Number => TokenKind::Number,
            String => TokenKind::String,

            AllKw => TokenKind::AllKw,
            BreakKw => TokenKind::BreakKw,
            CaseKw => TokenKind::CaseKw,
            CatchKw => TokenKind::CatchKw,
            ConstructorKw => TokenKind::ConstructorKw,
            ContinueKw => TokenKind::ContinueKw,
            DefaultKw => TokenKind::DefaultKw,
            DeleteKw => TokenKind::DeleteKw,
            DivKw => TokenKind::DivKw,
            DoKw => TokenKind::DoKw,
            ElseKw => TokenKind::ElseKw,
            EnumKw => TokenKind::EnumKw,
            ExitKw => TokenKind::ExitKw,
            FalseKw => TokenKind::FalseKw,
            FinallyKw => TokenKind::FinallyKw,
            ForKw => TokenKind::ForKw,
            FunctionKw => TokenKind::FunctionKw,
            GlobalKw => TokenKind::GlobalKw,
            IfKw => TokenKind::IfKw,
            ModKw => TokenKind::ModKw,
            NewKw => TokenKind::NewKw,
            NooneKw => TokenKind::NooneKw,
            OtherKw => TokenKind::OtherKw,
            RepeatKw => TokenKind::RepeatKw,
            ReturnKw => TokenKind::ReturnKw,
            SelfKw => TokenKind::SelfKw,
            StaticKw => TokenKind::StaticKw,
            SwitchKw => TokenKind::SwitchKw,
            ThrowKw => TokenKind::ThrowKw,
            TrueKw => TokenKind::TrueKw,
            TryKw => TokenKind::TryKw,
            UntilKw => TokenKind::UntilKw,
            VarKw => TokenKind::VarKw,
            WhileKw => TokenKind::WhileKw,

            LBrace => TokenKind::LBrace,
            RBrace => TokenKind::RBrace,
            LParen => TokenKind::LParen,
            RParen => TokenKind::RParen,
            LBracket => TokenKind::LBracket,
            RBracket => TokenKind::RBracket,
            Semicolon => TokenKind::Semicolon,
            Colon => TokenKind::Colon,
            Dot => TokenKind::Dot,
            Comma => TokenKind::Comma,
            Eq => TokenKind::Eq,
            Lt => TokenKind::Lt,
            Gt => TokenKind::Gt,
            At => TokenKind::At,
            Hash => TokenKind::Hash,
            Dollar => TokenKind::Dollar,
            Star => TokenKind::Star,
            Plus => TokenKind::Plus,
            Minus => TokenKind::Minus,
            Slash => TokenKind::Slash,
            Backslash => TokenKind::Backslash,
            Percent => TokenKind::Percent,
            Caret => TokenKind::Caret,
            Tilde => TokenKind::Tilde,
            Question => TokenKind::Question,
            Bang => TokenKind::Bang,
            Pipe => TokenKind::Pipe,
            Amp => TokenKind::Amp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_lex_var_declaration() {
        let tokens = tokenize("var x = 1;").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::VarKw,
                TokenKind::Whitespace,
                TokenKind::Ident,
                TokenKind::Whitespace,
                TokenKind::Eq,
                TokenKind::Whitespace,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_round_trip_lossless() {
        let source = r#"function move_to(_x, _y) {
    /*cpp x = local_x; */
    var spd /*: double */ = 4.5;
    if (spd > $ff) exit;
    show_debug_message(@"raw \string");
}
"#;
        let tokens = tokenize(source).unwrap();
        let rebuilt: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_keyword_word_boundary() {
        // `functions` must lex as one identifier, not `function` + `s`
        let tokens = tokenize("functions").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].text, "functions");
    }

    #[test]
    fn test_keywords_match_any_case() {
        assert_eq!(kinds("Function")[0], TokenKind::FunctionKw);
        assert_eq!(kinds("VAR")[0], TokenKind::VarKw);
        assert_eq!(kinds("Constructor")[0], TokenKind::ConstructorKw);
        assert_eq!(kinds("BEGIN")[0], TokenKind::LBrace);
        // Mixed case is still a keyword, not an identifier
        assert_eq!(kinds("rEtUrN")[0], TokenKind::ReturnKw);
    }

    #[test]
    fn test_lex_numbers() {
        assert_eq!(kinds("42")[0], TokenKind::Number);
        assert_eq!(kinds("4.")[0], TokenKind::Number);
        assert_eq!(kinds(".5")[0], TokenKind::Number);
        assert_eq!(kinds("$DeadBeef")[0], TokenKind::Number);
        // A lone `$` is punctuation, not a hex literal
        assert_eq!(kinds("$ ")[0], TokenKind::Dollar);
    }

    #[test]
    fn test_lex_strings() {
        let tokens = tokenize(r#""escaped \" quote""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].len(), 18);

        let tokens = tokenize(r#"@"verbatim""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
    }

    #[test]
    fn test_lex_comments() {
        assert_eq!(kinds("// plain")[0], TokenKind::LineComment);
        assert_eq!(kinds("/// doc")[0], TokenKind::DocComment);
        assert_eq!(kinds("/* block */")[0], TokenKind::BlockComment);
    }

    #[test]
    fn test_slash_run_reclassified_as_comment() {
        // A divider of 4+ slashes is not documentation
        assert_eq!(kinds("////////")[0], TokenKind::LineComment);
        // Three slashes alone still count as (empty) documentation
        assert_eq!(kinds("///")[0], TokenKind::DocComment);
    }

    #[test]
    fn test_macro_marker() {
        let tokens = tokenize("#macro SPEED 4").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Macro);
        assert_eq!(tokens[2].kind, TokenKind::Ident);
    }

    #[test]
    fn test_begin_end_are_braces() {
        let tokens = tokenize("begin exit end").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::LBrace);
        assert_eq!(tokens[4].kind, TokenKind::RBrace);
    }

    #[test]
    fn test_eof_token_is_terminal_and_empty() {
        let tokens = tokenize("x").unwrap();
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.len(), 0);
        assert_eq!(u32::from(eof.offset), 1);
    }

    #[test]
    fn test_unlexable_input_is_fatal() {
        let err = tokenize("var x = 1; \u{00A7}").unwrap_err();
        match err {
            ParseError::Tokenize { offset } => assert_eq!(offset, 11),
            other => panic!("expected tokenize error, got {other:?}"),
        }
    }

    #[test]
    fn test_offsets_are_contiguous() {
        let source = "if (a) { b = 1; }";
        let tokens = tokenize(source).unwrap();
        let mut expected = 0u32;
        for token in &tokens {
            assert_eq!(u32::from(token.offset), expected);
            expected += token.len() as u32;
        }
    }
}
