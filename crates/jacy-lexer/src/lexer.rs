// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Hand-written scanner.
//!
//! A single forward pass with up to three bytes of lookahead. Every
//! character that can start more than one operator gets its own method that
//! picks the longest token its lookahead allows.

use jacy_ast::token::{Token, TokenKind};
use jacy_ast::{FileId, LineMap, ParseSess, Span};
use tracing::{debug, trace};

use crate::error::LexError;

/// Tokens of one file plus its line table.
#[derive(Debug)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub lines: LineMap,
}

pub struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    pos: usize,
    file: FileId,
    tokens: Vec<Token>,
    lines: LineMap,
    /// `<` not yet matched by `>` on the current line.
    open_angles: u32,
}

fn is_id_first(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_id_part(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

impl<'src> Lexer<'src> {
    pub fn new(sess: &ParseSess, source: &'src str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            file: sess.file,
            tokens: Vec::new(),
            lines: LineMap::default(),
            open_angles: 0,
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(file = self.file.0))]
    pub fn tokenize(mut self) -> Result<LexOutput, LexError> {
        while !self.eof() {
            match self.peek() {
                b' ' | b'\t' | b'\r' => self.advance(1),
                b'\n' => {
                    self.op(TokenKind::Nl, 1);
                    self.lines.add_line(self.pos as u32);
                }
                b'0'..=b'9' => self.lex_number(),
                c if is_id_first(c) => self.lex_id(),
                b'\'' if self.at_lifetime() => self.lex_lifetime(),
                b'"' | b'\'' => self.lex_string()?,
                _ => self.lex_op()?,
            }
        }

        let eof = Span::new(self.bytes.len() as u32, 0, self.file);
        self.tokens.push(Token::new(TokenKind::Eof, eof));

        debug!(tokens = self.tokens.len(), lines = self.lines.line_count(), "lexed");
        Ok(LexOutput { tokens: self.tokens, lines: self.lines })
    }

    // =========================================================================
    // Cursor
    // =========================================================================

    fn eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> u8 {
        self.lookup(0)
    }

    /// Byte `n` positions ahead, `0` past the end.
    fn lookup(&self, n: usize) -> u8 {
        self.bytes.get(self.pos + n).copied().unwrap_or(0)
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    /// Push a token spanning `start..pos`.
    fn push(&mut self, kind: TokenKind, start: usize) {
        let span = Span::new(start as u32, (self.pos - start) as u32, self.file);
        trace!(?kind, pos = start, "token");
        match kind {
            TokenKind::LAngle => self.open_angles += 1,
            TokenKind::RAngle => self.open_angles = self.open_angles.saturating_sub(1),
            TokenKind::Shr => self.open_angles = self.open_angles.saturating_sub(2),
            TokenKind::Nl | TokenKind::Semi | TokenKind::LBrace | TokenKind::RBrace => self.open_angles = 0,
            _ => {}
        }
        self.tokens.push(Token::new(kind, span));
    }

    /// Push a `len`-byte token at the cursor and step over it.
    fn op(&mut self, kind: TokenKind, len: usize) {
        let start = self.pos;
        self.advance(len);
        self.push(kind, start);
    }

    fn span_here(&self, len: usize) -> Span {
        Span::new(self.pos as u32, len as u32, self.file)
    }

    // =========================================================================
    // Literals and names
    // =========================================================================

    fn lex_number(&mut self) {
        let start = self.pos;
        if self.peek() == b'0' {
            match self.lookup(1) {
                b'b' | b'B' => return self.lex_based(start, |c| matches!(c, b'0' | b'1'), TokenKind::BinLiteral),
                b'o' | b'O' => return self.lex_based(start, |c| matches!(c, b'0'..=b'7'), TokenKind::OctLiteral),
                b'x' | b'X' => return self.lex_based(start, |c| c.is_ascii_hexdigit(), TokenKind::HexLiteral),
                _ => {}
            }
        }

        self.skip_digits();

        // `1.5` is a float, `1..5` and `1.foo` are not
        if self.peek() == b'.' && self.lookup(1).is_ascii_digit() {
            self.advance(1);
            self.skip_digits();
            self.push(TokenKind::FloatLiteral(self.source[start..self.pos].to_string()), start);
        } else {
            self.push(TokenKind::DecLiteral(self.source[start..self.pos].to_string()), start);
        }
    }

    fn lex_based(&mut self, start: usize, is_digit: fn(u8) -> bool, kind: fn(String) -> TokenKind) {
        self.advance(2);
        while is_digit(self.peek()) {
            self.advance(1);
        }
        self.push(kind(self.source[start..self.pos].to_string()), start);
    }

    fn skip_digits(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance(1);
        }
    }

    /// `.5`
    fn lex_dot_float(&mut self) {
        let start = self.pos;
        self.advance(1);
        self.skip_digits();
        self.push(TokenKind::FloatLiteral(self.source[start..self.pos].to_string()), start);
    }

    fn lex_id(&mut self) {
        let start = self.pos;
        while is_id_part(self.peek()) {
            self.advance(1);
        }
        let source = self.source;
        let word = &source[start..self.pos];

        if word == "as" && self.peek() == b'?' {
            self.advance(1);
            self.push(TokenKind::AsQM, start);
            return;
        }

        let kind = TokenKind::keyword(word).unwrap_or_else(|| TokenKind::Id(word.to_string()));
        self.push(kind, start);
    }

    /// `'a` directly after `<` or `,` of an open angle list, where the name
    /// is not closed by a quote (`'a'` stays a string).
    fn at_lifetime(&self) -> bool {
        let after_list_start = matches!(
            self.tokens.last().map(|t| &t.kind),
            Some(TokenKind::LAngle | TokenKind::Comma)
        );
        if self.open_angles == 0 || !after_list_start || !is_id_first(self.lookup(1)) {
            return false;
        }
        let mut n = 2;
        while is_id_part(self.lookup(n)) {
            n += 1;
        }
        self.lookup(n) != b'\''
    }

    fn lex_lifetime(&mut self) {
        let start = self.pos;
        self.advance(1);
        while is_id_part(self.peek()) {
            self.advance(1);
        }
        let name = self.source[start + 1..self.pos].to_string();
        self.push(TokenKind::Lifetime(name), start);
    }

    fn lex_string(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let quote = self.peek();
        self.advance(1);

        while !self.eof() && self.peek() != quote {
            match self.peek() {
                b'\\' if self.lookup(1) != 0 => {
                    if self.lookup(1) == b'\n' {
                        self.lines.add_line((self.pos + 2) as u32);
                    }
                    self.advance(2);
                }
                b'\n' => {
                    self.advance(1);
                    self.lines.add_line(self.pos as u32);
                }
                _ => self.advance(1),
            }
        }

        if self.eof() {
            return Err(LexError::UnterminatedString {
                span: Span::new(start as u32, (self.pos - start) as u32, self.file),
            });
        }

        let body = self.source[start + 1..self.pos].to_string();
        self.advance(1);
        let kind = if quote == b'"' {
            TokenKind::DQStringLiteral(body)
        } else {
            TokenKind::SQStringLiteral(body)
        };
        self.push(kind, start);
        Ok(())
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Skip to the end of the line, leaving the newline for the main loop.
    fn skip_line_comment(&mut self) {
        while !self.eof() && self.peek() != b'\n' {
            self.advance(1);
        }
    }

    /// Skip to the first `*/`. Block comments do not nest.
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.span_here(2);
        self.advance(2);
        loop {
            if self.eof() {
                return Err(LexError::UnterminatedComment { span: start });
            }
            match self.peek() {
                b'*' if self.lookup(1) == b'/' => {
                    self.advance(2);
                    return Ok(());
                }
                b'\n' => {
                    self.advance(1);
                    self.lines.add_line(self.pos as u32);
                }
                _ => self.advance(1),
            }
        }
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn lex_op(&mut self) -> Result<(), LexError> {
        match self.peek() {
            b'=' => self.equal(),
            b'+' => self.plus(),
            b'-' => self.minus(),
            b'*' => self.star(),
            b'/' => return self.slash(),
            b'%' => self.with_assign(TokenKind::Mod, TokenKind::ModAssign),
            b'.' => self.dot(),
            b'&' => self.ampersand(),
            b'!' => self.bang(),
            b'|' => self.bar(),
            b'<' => self.less(),
            b'>' => self.greater(),
            b'^' => self.with_assign(TokenKind::Xor, TokenKind::XorAssign),
            b'~' => self.op(TokenKind::Inv, 1),
            b'?' => self.question(),
            b':' => {
                if self.lookup(1) == b':' {
                    self.op(TokenKind::Path, 2)
                } else {
                    self.op(TokenKind::Colon, 1)
                }
            }
            b';' => self.op(TokenKind::Semi, 1),
            b',' => self.op(TokenKind::Comma, 1),
            b'@' => self.op(TokenKind::At, 1),
            b'$' => self.op(TokenKind::Dollar, 1),
            b'(' => self.op(TokenKind::LParen, 1),
            b')' => self.op(TokenKind::RParen, 1),
            b'[' => self.op(TokenKind::LBracket, 1),
            b']' => self.op(TokenKind::RBracket, 1),
            b'{' => self.op(TokenKind::LBrace, 1),
            b'}' => self.op(TokenKind::RBrace, 1),
            _ => {
                let ch = self.source[self.pos..].chars().next().unwrap_or('\0');
                return Err(LexError::UnexpectedChar { ch, span: self.span_here(ch.len_utf8()) });
            }
        }
        Ok(())
    }

    /// `x` or `x=`
    fn with_assign(&mut self, plain: TokenKind, assign: TokenKind) {
        if self.lookup(1) == b'=' {
            self.op(assign, 2)
        } else {
            self.op(plain, 1)
        }
    }

    fn equal(&mut self) {
        match (self.lookup(1), self.lookup(2)) {
            (b'=', b'=') => self.op(TokenKind::RefEq, 3),
            (b'=', _) => self.op(TokenKind::Eq, 2),
            (b'>', _) => self.op(TokenKind::DoubleArrow, 2),
            _ => self.op(TokenKind::Assign, 1),
        }
    }

    fn plus(&mut self) {
        match self.lookup(1) {
            b'=' => self.op(TokenKind::AddAssign, 2),
            b'+' => self.op(TokenKind::Inc, 2),
            _ => self.op(TokenKind::Add, 1),
        }
    }

    fn minus(&mut self) {
        match self.lookup(1) {
            b'=' => self.op(TokenKind::SubAssign, 2),
            b'-' => self.op(TokenKind::Dec, 2),
            b'>' => self.op(TokenKind::Arrow, 2),
            _ => self.op(TokenKind::Sub, 1),
        }
    }

    fn star(&mut self) {
        match (self.lookup(1), self.lookup(2)) {
            (b'*', b'=') => self.op(TokenKind::PowerAssign, 3),
            (b'*', _) => self.op(TokenKind::Power, 2),
            (b'=', _) => self.op(TokenKind::MulAssign, 2),
            _ => self.op(TokenKind::Mul, 1),
        }
    }

    fn slash(&mut self) -> Result<(), LexError> {
        match self.lookup(1) {
            b'/' => self.skip_line_comment(),
            b'*' => self.skip_block_comment()?,
            b'=' => self.op(TokenKind::DivAssign, 2),
            _ => self.op(TokenKind::Div, 1),
        }
        Ok(())
    }

    fn dot(&mut self) {
        match (self.lookup(1), self.lookup(2)) {
            (d, _) if d.is_ascii_digit() => self.lex_dot_float(),
            (b'.', b'.') => self.op(TokenKind::Spread, 3),
            (b'.', b'<') => self.op(TokenKind::RangeRE, 3),
            (b'.', b'=') => self.op(TokenKind::RangeInc, 3),
            (b'.', _) => self.op(TokenKind::Range, 2),
            _ => self.op(TokenKind::Dot, 1),
        }
    }

    fn ampersand(&mut self) {
        match self.lookup(1) {
            b'&' => self.op(TokenKind::And, 2),
            b'=' => self.op(TokenKind::BitAndAssign, 2),
            _ => self.op(TokenKind::Ampersand, 1),
        }
    }

    fn bang(&mut self) {
        let word_ends = !is_id_part(self.lookup(3));
        match (self.lookup(1), self.lookup(2)) {
            (b'=', b'=') => self.op(TokenKind::RefNotEq, 3),
            (b'=', _) => self.op(TokenKind::NotEq, 2),
            (b'i', b's') if word_ends => self.op(TokenKind::NotIs, 3),
            (b'i', b'n') if word_ends => self.op(TokenKind::NotIn, 3),
            _ => self.op(TokenKind::Not, 1),
        }
    }

    fn bar(&mut self) {
        match self.lookup(1) {
            b'|' => self.op(TokenKind::Or, 2),
            b'>' => self.op(TokenKind::Pipe, 2),
            b'=' => self.op(TokenKind::BitOrAssign, 2),
            _ => self.op(TokenKind::BitOr, 1),
        }
    }

    fn less(&mut self) {
        match (self.lookup(1), self.lookup(2)) {
            (b'=', b'>') => self.op(TokenKind::Spaceship, 3),
            (b'=', _) => self.op(TokenKind::LE, 2),
            (b'<', b'=') => self.op(TokenKind::ShlAssign, 3),
            (b'<', _) => self.op(TokenKind::Shl, 2),
            _ => self.op(TokenKind::LAngle, 1),
        }
    }

    fn greater(&mut self) {
        match (self.lookup(1), self.lookup(2)) {
            (b'=', _) => self.op(TokenKind::GE, 2),
            (b'.', b'<') => self.op(TokenKind::RangeBothE, 3),
            (b'.', b'.') => self.op(TokenKind::RangeLE, 3),
            (b'>', b'=') => self.op(TokenKind::ShrAssign, 3),
            (b'>', _) => self.op(TokenKind::Shr, 2),
            _ => self.op(TokenKind::RAngle, 1),
        }
    }

    fn question(&mut self) {
        match (self.lookup(1), self.lookup(2)) {
            (b'?', b'=') => self.op(TokenKind::NullishAssign, 3),
            (b'?', _) => self.op(TokenKind::NullCoalesce, 2),
            (b'.', _) => self.op(TokenKind::SafeCall, 2),
            _ => self.op(TokenKind::Quest, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use TokenKind::*;

    fn lex(src: &str) -> LexOutput {
        match Lexer::new(&ParseSess::new(FileId(0)), src).tokenize() {
            Ok(out) => out,
            Err(e) => panic!("lex error in {:?}: {}", src, e),
        }
    }

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).tokens.into_iter().map(|t| t.kind).collect()
    }

    fn lex_err(src: &str) -> LexError {
        match Lexer::new(&ParseSess::new(FileId(0)), src).tokenize() {
            Ok(out) => panic!("expected error, got {:?}", out.tokens),
            Err(e) => e,
        }
    }

    fn dec(s: &str) -> TokenKind {
        DecLiteral(s.to_string())
    }

    fn id(s: &str) -> TokenKind {
        Id(s.to_string())
    }

    #[test]
    fn var_decl_tokens() {
        assert_eq!(kinds("val x = 1 + 2"), vec![Val, id("x"), Assign, dec("1"), Add, dec("2"), Eof]);
    }

    #[test]
    fn shift_assign_is_one_token() {
        assert_eq!(kinds("<<="), vec![ShlAssign, Eof]);
        assert_eq!(kinds("<<"), vec![Shl, Eof]);
        assert_eq!(kinds("<"), vec![LAngle, Eof]);
        assert_eq!(kinds("< <="), vec![LAngle, LE, Eof]);
    }

    #[test]
    fn numeric_bases_keep_prefix() {
        assert_eq!(kinds("0xFF"), vec![HexLiteral("0xFF".into()), Eof]);
        assert_eq!(kinds("0B101"), vec![BinLiteral("0B101".into()), Eof]);
        assert_eq!(kinds("0o17"), vec![OctLiteral("0o17".into()), Eof]);
        assert_eq!(kinds("007"), vec![dec("007"), Eof]);
    }

    #[test]
    fn float_versus_range() {
        assert_eq!(kinds("1.5"), vec![FloatLiteral("1.5".into()), Eof]);
        assert_eq!(kinds("1..5"), vec![dec("1"), Range, dec("5"), Eof]);
        assert_eq!(kinds("1..<5"), vec![dec("1"), RangeRE, dec("5"), Eof]);
        assert_eq!(kinds("1..=5"), vec![dec("1"), RangeInc, dec("5"), Eof]);
        assert_eq!(kinds("1.foo"), vec![dec("1"), Dot, id("foo"), Eof]);
        assert_eq!(kinds(".5"), vec![FloatLiteral(".5".into()), Eof]);
    }

    #[test]
    fn longest_match_table() {
        let cases: &[(&str, TokenKind)] = &[
            ("=", Assign),
            ("==", Eq),
            ("===", RefEq),
            ("=>", DoubleArrow),
            ("+=", AddAssign),
            ("++", Inc),
            ("-=", SubAssign),
            ("--", Dec),
            ("->", Arrow),
            ("**=", PowerAssign),
            ("**", Power),
            ("*=", MulAssign),
            ("/=", DivAssign),
            ("%=", ModAssign),
            ("...", Spread),
            ("&&", And),
            ("&=", BitAndAssign),
            ("&", Ampersand),
            ("!==", RefNotEq),
            ("!=", NotEq),
            ("!", Not),
            ("||", Or),
            ("|>", Pipe),
            ("|=", BitOrAssign),
            ("|", BitOr),
            ("<=>", Spaceship),
            ("<=", LE),
            (">=", GE),
            (">.<", RangeBothE),
            (">..", RangeLE),
            (">>=", ShrAssign),
            (">>", Shr),
            ("^=", XorAssign),
            ("^", Xor),
            ("~", Inv),
            ("??=", NullishAssign),
            ("??", NullCoalesce),
            ("?.", SafeCall),
            ("?", Quest),
            ("::", Path),
            (":", Colon),
        ];
        for (src, expected) in cases {
            assert_eq!(kinds(src), vec![expected.clone(), Eof], "lexing {:?}", src);
        }
    }

    #[test]
    fn negated_checks_need_word_end() {
        assert_eq!(kinds("a !is B"), vec![id("a"), NotIs, id("B"), Eof]);
        assert_eq!(kinds("a !in b"), vec![id("a"), NotIn, id("b"), Eof]);
        assert_eq!(kinds("!isReady"), vec![Not, id("isReady"), Eof]);
    }

    #[test]
    fn greater_dot_falls_back() {
        assert_eq!(kinds("a>.b"), vec![id("a"), RAngle, Dot, id("b"), Eof]);
    }

    #[test]
    fn keywords_and_as_question() {
        assert_eq!(
            kinds("func when as? as is"),
            vec![Func, When, AsQM, As, Is, Eof]
        );
    }

    #[test]
    fn identifiers_start_with_letter_or_underscore() {
        assert_eq!(kinds("_a1 1abc"), vec![id("_a1"), dec("1"), id("abc"), Eof]);
    }

    #[test]
    fn strings_exclude_quotes_from_lexeme() {
        let out = lex("'a' \"b c\"");
        assert_eq!(out.tokens[0].kind, SQStringLiteral("a".into()));
        assert_eq!(out.tokens[0].span, Span::new(0, 3, FileId(0)));
        assert_eq!(out.tokens[1].kind, DQStringLiteral("b c".into()));
        assert_eq!(out.tokens[1].span, Span::new(4, 5, FileId(0)));
    }

    #[test]
    fn lifetimes_in_angle_lists() {
        assert_eq!(
            kinds("f<'a, 'b>"),
            vec![id("f"), LAngle, Lifetime("a".into()), Comma, Lifetime("b".into()), RAngle, Eof]
        );
        assert_eq!(kinds("f<'a'>"), vec![id("f"), LAngle, SQStringLiteral("a".into()), RAngle, Eof]);
        assert_eq!(kinds("f('a b')"), vec![id("f"), LParen, SQStringLiteral("a b".into()), RParen, Eof]);
        let out = lex("g<'abc>");
        assert_eq!(out.tokens[2].span, Span::new(2, 4, FileId(0)));
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(kinds("a // b\nc"), vec![id("a"), Nl, id("c"), Eof]);
        assert_eq!(kinds("a /* b\n c */ d"), vec![id("a"), id("d"), Eof]);
    }

    #[test]
    fn line_table_counts_every_newline() {
        let out = lex("a\n/* x\ny */\n'p\nq'\nb");
        assert_eq!(out.lines.line_count(), 6);
        assert_eq!(out.lines.offset_to_line_col(18), (6, 0));
    }

    #[test]
    fn at_and_dollar_advance() {
        assert_eq!(kinds("@inline $x"), vec![At, id("inline"), Dollar, id("x"), Eof]);
    }

    #[test]
    fn unterminated_string_is_fatal() {
        let err = lex_err("val s = \"abc");
        assert_eq!(err, LexError::UnterminatedString { span: Span::new(8, 4, FileId(0)) });
    }

    #[test]
    fn unterminated_block_comment_is_fatal() {
        let err = lex_err("a /* never closed");
        assert_eq!(err, LexError::UnterminatedComment { span: Span::new(2, 2, FileId(0)) });
    }

    #[test]
    fn unexpected_char_is_fatal() {
        let err = lex_err("a # b");
        assert_eq!(err, LexError::UnexpectedChar { ch: '#', span: Span::new(2, 1, FileId(0)) });
        assert_eq!(err.to_string(), "Unexpected character '#'");
    }

    #[test]
    fn relexing_token_text_reproduces_tokens() {
        let src = "func add(a: int, b: int): int => a + b * 2 // sum\n\
                   val r = 0x1F..<add(1, 2) ?? -1\n\
                   if r !in xs { r <<= 1 } else { /* none */ r **= 2.5 }\n";
        let first = lex(src);
        let rebuilt: Vec<&str> = first.tokens.iter().map(|t| &src[t.span.range()]).collect();
        let again = lex(&rebuilt.join(" "));
        let strip = |out: LexOutput| out.tokens.into_iter().map(|t| t.kind).collect::<Vec<_>>();
        assert_eq!(strip(first), strip(again));
    }
}
