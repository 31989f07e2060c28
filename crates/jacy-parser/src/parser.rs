// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser implementation using precedence climbing for expressions.

use jacy_ast::expr::{
    AssignOp, Block, CatchClause, Expr, ExprKind, InfixOp, LambdaParam, LitKind, Literal, NamedElement, PathExpr,
    PathSeg, PostfixOp, PrefixOp, StructField, WhenEntry,
};
use jacy_ast::item::{
    Attr, Class, Enum, EnumEntry, EnumEntryKind, Field, Func, FuncBody, Init, Item, ItemKind, Modifier, Object, Param,
    Trait, TypeAlias, TypeParam, TypeParamKind,
};
use jacy_ast::stmt::{Stmt, StmtKind, VarDecl, VarKind};
use jacy_ast::token::{Token, TokenKind};
use jacy_ast::ty::{Type, TypeKind};
use jacy_ast::{Ident, NodeId, ParseSess, ResSlot, Span};
use jacy_diagnostics::{Suggestion, ToSuggestion};
use thiserror::Error;
use tracing::{debug, trace};

/// Maximum number of errors to collect before giving up on a file.
const MAX_ERRORS: usize = 50;

type PResult<T> = Result<T, ParseError>;

/// Binary precedence levels, lowest first. Power, cast, prefix and postfix
/// sit above the last one and are parsed by dedicated functions.
#[derive(Debug, Clone, Copy)]
enum Level {
    Pipe,
    Or,
    And,
    BitOr,
    Xor,
    BitAnd,
    Equality,
    Comparison,
    Spaceship,
    NamedChecks,
    NullCoalesce,
    Shift,
    CustomInfix,
    Range,
    Additive,
    Multiplicative,
}

const LEVELS: [Level; 16] = [
    Level::Pipe,
    Level::Or,
    Level::And,
    Level::BitOr,
    Level::Xor,
    Level::BitAnd,
    Level::Equality,
    Level::Comparison,
    Level::Spaceship,
    Level::NamedChecks,
    Level::NullCoalesce,
    Level::Shift,
    Level::CustomInfix,
    Level::Range,
    Level::Additive,
    Level::Multiplicative,
];

/// An open delimiter group.
#[derive(Debug, Clone, Copy)]
struct Group {
    /// Newlines are insignificant inside `(...)` and `[...]`
    ignore_nls: bool,
    /// Brace-construction state to restore when the group closes
    outer_allow_brace_expr: bool,
}

/// The parser for Jacy source code.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Span of the last consumed token other than a skipped newline
    prev_span: Span,
    /// Open `(`, `[` and `{` groups, innermost last
    groups: Vec<Group>,
    /// Controls whether `Name {` starts a struct construction (false in control flow heads)
    allow_brace_expr: bool,
    /// Track pending `>` from splitting `>>` in generics
    pending_gt: bool,
    /// Collected errors and warnings
    suggestions: Vec<Suggestion>,
    error_count: usize,
    /// Counter for generating unique NodeIds
    next_node_id: u32,
}

impl Parser {
    pub fn new(sess: &ParseSess, mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|t| t.kind == TokenKind::Eof) {
            let end = tokens.last().map_or(0, |t| t.span.end());
            tokens.push(Token::new(TokenKind::Eof, Span::new(end, 0, sess.file)));
        }
        let prev_span = Span::new(0, 0, sess.file);
        Self {
            tokens,
            pos: 0,
            prev_span,
            groups: Vec::new(),
            allow_brace_expr: true,
            pending_gt: false,
            suggestions: Vec::new(),
            error_count: 0,
            next_node_id: 0,
        }
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    fn record_error(&mut self, error: ParseError) {
        self.error_count += 1;
        self.suggestions.push(error.to_suggestion());
    }

    fn warn(&mut self, message: &str, span: Span) {
        self.suggestions.push(Suggestion::warn(message, span));
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek(&self, n: usize) -> &TokenKind {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Step over the current token. Inside `(` and `[` groups following
    /// newlines are skipped too.
    fn advance(&mut self) {
        self.bump();
        if self.groups.last().is_some_and(|g| g.ignore_nls) {
            self.skip_nls();
        }
    }

    fn bump(&mut self) {
        if !self.at_end() {
            self.prev_span = self.current().span;
            self.pos += 1;
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> PResult<Span> {
        if self.check(kind) {
            let span = self.current().span;
            self.advance();
            Ok(span)
        } else {
            Err(self.error_expected(&format!("'{}'", kind)))
        }
    }

    fn error_expected(&self, expected: &str) -> ParseError {
        ParseError::expected(expected, self.current_kind(), self.current().span)
    }

    fn skip_nls(&mut self) {
        while self.check(&TokenKind::Nl) {
            self.bump();
        }
    }

    fn is_semis(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Nl | TokenKind::Semi)
    }

    fn skip_semis(&mut self) {
        while self.is_semis() {
            self.bump();
        }
    }

    /// Whether the first token after any newlines matches `pred`.
    fn next_after_nls(&self, pred: impl Fn(&TokenKind) -> bool) -> bool {
        let mut pos = self.pos;
        while let Some(tok) = self.tokens.get(pos) {
            match &tok.kind {
                TokenKind::Nl => pos += 1,
                kind => return pred(kind),
            }
        }
        false
    }

    fn enter_group(&mut self, ignore_nls: bool) {
        self.groups.push(Group { ignore_nls, outer_allow_brace_expr: self.allow_brace_expr });
        self.allow_brace_expr = true;
        if ignore_nls {
            self.skip_nls();
        }
    }

    fn exit_group(&mut self) {
        if let Some(group) = self.groups.pop() {
            self.allow_brace_expr = group.outer_allow_brace_expr;
        }
    }

    /// Close a group opened by `open`. On a mismatch the error is recorded
    /// and `false` returned so the caller can substitute an error stub.
    fn close_group(&mut self, close: &TokenKind) -> PResult<bool> {
        self.exit_group();
        if self.check(close) {
            self.advance();
            return Ok(true);
        }
        let error = self.error_expected(&format!("'{}'", close));
        if error.fatal {
            return Err(error);
        }
        self.record_error(error);
        Ok(false)
    }

    fn expect_ident(&mut self) -> PResult<Ident> {
        match self.current_kind().clone() {
            TokenKind::Id(name) => {
                let span = self.current().span;
                self.advance();
                Ok(Ident::new(name, span))
            }
            _ => Err(self.error_expected("a name")),
        }
    }

    fn expect_terminator(&mut self) -> PResult<()> {
        if self.is_semis() {
            self.skip_semis();
            Ok(())
        } else if self.at_end() || self.check(&TokenKind::RBrace) {
            Ok(())
        } else {
            Err(self.error_expected("';' or new-line"))
        }
    }

    fn span_from(&self, start: Span) -> Span {
        if self.prev_span.pos < start.pos {
            return start;
        }
        start.to(self.prev_span)
    }

    /// Tokens that can never begin an operand: a missing operand before one
    /// of them becomes an error stub instead of a consumed token.
    fn can_start_expr(kind: &TokenKind) -> bool {
        !matches!(
            kind,
            TokenKind::Eof
                | TokenKind::Nl
                | TokenKind::Semi
                | TokenKind::Comma
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }

    // =========================================================================
    // Top-Level Parsing
    // =========================================================================

    /// Parse the whole token stream.
    ///
    /// Syntax errors become suggestions and error stubs; only running out of
    /// input mid-construct (or too many errors) aborts with [`ParserError`].
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse(mut self) -> Result<ParseOutput, ParserError> {
        match self.parse_file() {
            Ok(stmts) => {
                debug!(stmts = stmts.len(), errors = self.error_count, "parsed");
                Ok(ParseOutput { stmts, suggestions: self.suggestions })
            }
            Err(error) => {
                debug!(errors = self.error_count + 1, "parse aborted");
                let message = error.message.clone();
                let span = error.span;
                self.suggestions.push(error.to_suggestion());
                Err(ParserError { message, span, suggestions: self.suggestions })
            }
        }
    }

    fn parse_file(&mut self) -> PResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        self.skip_semis();
        while !self.at_end() {
            if self.check(&TokenKind::RBrace) {
                let span = self.current().span;
                self.record_error(ParseError::new("Unexpected '}' with no block to close", span));
                self.bump();
                self.skip_semis();
                continue;
            }
            stmts.push(self.parse_stmt_recovering()?);
            self.skip_semis();
        }
        Ok(stmts)
    }

    /// Statements up to the closing `}` of the current block.
    fn parse_stmt_list(&mut self) -> PResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        self.skip_semis();
        while !self.at_end() && !self.check(&TokenKind::RBrace) {
            stmts.push(self.parse_stmt_recovering()?);
            self.skip_semis();
        }
        Ok(stmts)
    }

    fn parse_stmt_recovering(&mut self) -> PResult<Stmt> {
        let start = self.current().span;
        match self.recovering(Self::parse_stmt)? {
            Some(stmt) => Ok(stmt),
            None => {
                let span = self.span_from(start);
                Ok(Stmt { id: self.next_id(), kind: StmtKind::Error, span })
            }
        }
    }

    /// Run `parse` for one statement-like construct and restore a sane state
    /// if it reported errors: skip to the next statement boundary without
    /// reporting the missing terminator again. `None` means the construct
    /// was abandoned.
    fn recovering<T>(&mut self, parse: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<Option<T>> {
        let start_pos = self.pos;
        let errors_before = self.error_count;
        let groups = self.groups.len();
        let allow_brace_expr = self.allow_brace_expr;

        let result = match parse(self) {
            Ok(node) => Some(node),
            Err(error) if error.fatal => return Err(error),
            Err(error) => {
                self.record_error(error);
                None
            }
        };

        if self.error_count > errors_before {
            self.groups.truncate(groups);
            self.allow_brace_expr = allow_brace_expr;
            self.pending_gt = false;
            self.synchronize(start_pos);
        } else if let Err(error) = self.expect_terminator() {
            self.record_error(error);
            self.synchronize(start_pos);
        }

        if self.error_count >= MAX_ERRORS {
            return Err(ParseError::fatal("Too many errors, stopping", self.current().span));
        }
        Ok(result)
    }

    /// Skip to the next statement boundary at the current nesting depth.
    fn synchronize(&mut self, start_pos: usize) {
        if self.pos == start_pos {
            self.bump();
        }
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::Eof => break,
                TokenKind::Nl | TokenKind::Semi if depth == 0 => {
                    self.bump();
                    break;
                }
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => {
                    depth += 1;
                    self.bump();
                }
                TokenKind::RBrace if depth == 0 => break,
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                    self.bump();
                }
                TokenKind::Val
                | TokenKind::Var
                | TokenKind::Func
                | TokenKind::Class
                | TokenKind::Struct
                | TokenKind::Enum
                | TokenKind::Trait
                | TokenKind::Object
                | TokenKind::For
                | TokenKind::While
                | TokenKind::At
                    if depth == 0 =>
                {
                    break
                }
                _ => self.bump(),
            }
        }
        trace!(pos = self.pos, "synchronized");
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current().span;
        let kind = match self.current_kind() {
            TokenKind::Var | TokenKind::Val => StmtKind::VarDecl(self.parse_var_decl()?),
            TokenKind::For => self.parse_for_stmt()?,
            TokenKind::While => self.parse_while_stmt()?,
            _ if Self::starts_item(self.current_kind()) => StmtKind::Item(self.parse_item(false)?),
            _ => StmtKind::Expr(self.parse_expr()?),
        };
        Ok(Stmt { id: self.next_id(), kind, span: self.span_from(start) })
    }

    fn starts_item(kind: &TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::At
                | TokenKind::Pub
                | TokenKind::Pri
                | TokenKind::Static
                | TokenKind::Mut
                | TokenKind::Move
                | TokenKind::Const
                | TokenKind::Infix
                | TokenKind::Func
                | TokenKind::Class
                | TokenKind::Struct
                | TokenKind::Enum
                | TokenKind::Trait
                | TokenKind::Type
                | TokenKind::Object
                | TokenKind::Init
        )
    }

    fn parse_var_decl(&mut self) -> PResult<VarDecl> {
        let kind = if self.match_token(&TokenKind::Var) {
            VarKind::Var
        } else {
            self.expect(&TokenKind::Val)?;
            VarKind::Val
        };
        let name = self.expect_ident()?;
        let ty = if self.match_token(&TokenKind::Colon) {
            self.skip_nls();
            Some(self.parse_type()?)
        } else {
            None
        };
        let init = if self.match_token(&TokenKind::Assign) {
            self.skip_nls();
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(VarDecl { kind, name, ty, init })
    }

    fn parse_for_stmt(&mut self) -> PResult<StmtKind> {
        self.expect(&TokenKind::For)?;
        let binding = self.expect_ident()?;
        self.expect(&TokenKind::In)?;
        let iter = self.parse_expr_no_braces()?;
        let body = self.parse_block()?;
        Ok(StmtKind::For { binding, iter, body })
    }

    fn parse_while_stmt(&mut self) -> PResult<StmtKind> {
        self.expect(&TokenKind::While)?;
        let cond = self.parse_expr_no_braces()?;
        let body = self.parse_block()?;
        Ok(StmtKind::While { cond, body })
    }

    fn parse_block(&mut self) -> PResult<Block> {
        let start = self.expect(&TokenKind::LBrace)?;
        self.enter_group(false);
        let stmts = self.parse_stmt_list()?;
        self.exit_group();
        self.expect(&TokenKind::RBrace)?;
        Ok(Block { id: self.next_id(), stmts, span: self.span_from(start) })
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn mk_expr(&mut self, kind: ExprKind, span: Span) -> Expr {
        Expr { id: self.next_id(), kind, span }
    }

    fn error_expr(&mut self) -> Expr {
        let span = self.current().span;
        self.mk_expr(ExprKind::Error, span)
    }

    /// Record an "expected" error at the current token unless it is the end
    /// of input, which aborts.
    fn report_expected(&mut self, expected: &str) -> PResult<()> {
        let error = self.error_expected(expected);
        if error.fatal {
            return Err(error);
        }
        self.record_error(error);
        Ok(())
    }

    pub(crate) fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_assignment()
    }

    /// Parse an expression where `{` must start the following body.
    fn parse_expr_no_braces(&mut self) -> PResult<Expr> {
        let allow = std::mem::replace(&mut self.allow_brace_expr, false);
        let expr = self.parse_expr();
        self.allow_brace_expr = allow;
        expr
    }

    fn parse_assignment(&mut self) -> PResult<Expr> {
        let target = self.parse_binary(0)?;
        let Some(op) = assign_op(self.current_kind()) else {
            return Ok(target);
        };
        self.advance();
        self.skip_nls();
        let value = self.parse_assignment()?;
        let span = target.span.to(value.span);
        Ok(self.mk_expr(ExprKind::Assign { target: Box::new(target), op, value: Box::new(value) }, span))
    }

    /// One left-associative binary level; `level` indexes [`LEVELS`].
    fn parse_binary(&mut self, level: usize) -> PResult<Expr> {
        let Some(&current) = LEVELS.get(level) else {
            return self.parse_power();
        };
        let mut left = self.parse_binary(level + 1)?;
        while let Some(op) = self.infix_op(current) {
            let op_span = self.current().span;
            self.advance();
            self.skip_nls();
            if matches!(op, InfixOp::Custom(_)) {
                self.record_error(ParseError::new(
                    "Custom infix operators feature is reserved, but not implemented",
                    op_span,
                ));
            }
            let right = self.parse_binary(level + 1)?;
            let span = left.span.to(right.span);
            left = self.mk_expr(ExprKind::Infix { left: Box::new(left), op, right: Box::new(right) }, span);
        }
        Ok(left)
    }

    fn infix_op(&self, level: Level) -> Option<InfixOp> {
        let op = match (level, self.current_kind()) {
            (Level::Pipe, TokenKind::Pipe) => InfixOp::Pipe,
            (Level::Or, TokenKind::Or) => InfixOp::Or,
            (Level::And, TokenKind::And) => InfixOp::And,
            (Level::BitOr, TokenKind::BitOr) => InfixOp::BitOr,
            (Level::Xor, TokenKind::Xor) => InfixOp::Xor,
            (Level::BitAnd, TokenKind::Ampersand) => InfixOp::BitAnd,
            (Level::Equality, TokenKind::Eq) => InfixOp::Eq,
            (Level::Equality, TokenKind::NotEq) => InfixOp::NotEq,
            (Level::Equality, TokenKind::RefEq) => InfixOp::RefEq,
            (Level::Equality, TokenKind::RefNotEq) => InfixOp::RefNotEq,
            (Level::Comparison, TokenKind::LAngle) => InfixOp::Lt,
            (Level::Comparison, TokenKind::RAngle) => InfixOp::Gt,
            (Level::Comparison, TokenKind::LE) => InfixOp::Le,
            (Level::Comparison, TokenKind::GE) => InfixOp::Ge,
            (Level::Spaceship, TokenKind::Spaceship) => InfixOp::Spaceship,
            (Level::NamedChecks, TokenKind::Is) => InfixOp::Is,
            (Level::NamedChecks, TokenKind::NotIs) => InfixOp::NotIs,
            (Level::NamedChecks, TokenKind::In) => InfixOp::In,
            (Level::NamedChecks, TokenKind::NotIn) => InfixOp::NotIn,
            (Level::NullCoalesce, TokenKind::NullCoalesce) => InfixOp::NullCoalesce,
            (Level::Shift, TokenKind::Shl) => InfixOp::Shl,
            (Level::Shift, TokenKind::Shr) => InfixOp::Shr,
            (Level::CustomInfix, TokenKind::Id(name)) => InfixOp::Custom(Ident::new(name.clone(), self.current().span)),
            (Level::Range, TokenKind::Range) => InfixOp::Range,
            (Level::Range, TokenKind::RangeRE) => InfixOp::RangeRE,
            (Level::Range, TokenKind::RangeInc) => InfixOp::RangeInc,
            (Level::Range, TokenKind::RangeLE) => InfixOp::RangeLE,
            (Level::Range, TokenKind::RangeBothE) => InfixOp::RangeBothE,
            (Level::Additive, TokenKind::Add) => InfixOp::Add,
            (Level::Additive, TokenKind::Sub) => InfixOp::Sub,
            (Level::Multiplicative, TokenKind::Mul) => InfixOp::Mul,
            (Level::Multiplicative, TokenKind::Div) => InfixOp::Div,
            (Level::Multiplicative, TokenKind::Mod) => InfixOp::Mod,
            _ => return None,
        };
        Some(op)
    }

    /// `**` is right-associative and binds looser than casts.
    fn parse_power(&mut self) -> PResult<Expr> {
        let left = self.parse_cast()?;
        if !self.check(&TokenKind::Power) {
            return Ok(left);
        }
        self.advance();
        self.skip_nls();
        let right = self.parse_power()?;
        let span = left.span.to(right.span);
        Ok(self.mk_expr(ExprKind::Infix { left: Box::new(left), op: InfixOp::Power, right: Box::new(right) }, span))
    }

    fn parse_cast(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_prefix()?;
        while matches!(self.current_kind(), TokenKind::As | TokenKind::AsQM) {
            let safe = self.check(&TokenKind::AsQM);
            self.advance();
            let ty = self.parse_type()?;
            let span = expr.span.to(ty.span);
            expr = self.mk_expr(ExprKind::Cast { expr: Box::new(expr), ty: Box::new(ty), safe }, span);
        }
        Ok(expr)
    }

    fn parse_prefix(&mut self) -> PResult<Expr> {
        let start = self.current().span;
        let op = match self.current_kind() {
            TokenKind::Sub => PrefixOp::Neg,
            TokenKind::Not => PrefixOp::Not,
            TokenKind::Inv => PrefixOp::Inv,
            TokenKind::Mul => PrefixOp::Deref,
            TokenKind::Inc => PrefixOp::Inc,
            TokenKind::Dec => PrefixOp::Dec,
            TokenKind::Ampersand => {
                if matches!(self.peek(1), TokenKind::Mut) {
                    self.advance();
                    PrefixOp::BorrowMut
                } else {
                    PrefixOp::Borrow
                }
            }
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_prefix()?;
        let span = start.to(operand.span);
        Ok(self.mk_expr(ExprKind::Prefix { op, operand: Box::new(operand) }, span))
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.check(&TokenKind::Nl)
                && self.next_after_nls(|k| matches!(k, TokenKind::Dot | TokenKind::SafeCall))
            {
                self.skip_nls();
            }
            let start = expr.span;
            expr = match self.current_kind() {
                TokenKind::LParen => {
                    self.advance();
                    self.enter_group(true);
                    let args = self.parse_named_list(&TokenKind::RParen)?;
                    if !self.close_group(&TokenKind::RParen)? {
                        return Ok(self.mk_expr(ExprKind::Error, start));
                    }
                    let span = self.span_from(start);
                    self.mk_expr(ExprKind::Invoke { callee: Box::new(expr), args }, span)
                }
                TokenKind::LBracket => {
                    self.advance();
                    self.enter_group(true);
                    let indices = self.parse_expr_list(&TokenKind::RBracket)?;
                    if !self.close_group(&TokenKind::RBracket)? {
                        return Ok(self.mk_expr(ExprKind::Error, start));
                    }
                    let span = self.span_from(start);
                    self.mk_expr(ExprKind::Subscript { target: Box::new(expr), indices }, span)
                }
                TokenKind::Dot | TokenKind::SafeCall => {
                    let safe = self.check(&TokenKind::SafeCall);
                    self.advance();
                    self.skip_nls();
                    let field = self.expect_ident()?;
                    let span = start.to(field.span);
                    self.mk_expr(ExprKind::MemberAccess { target: Box::new(expr), field, safe }, span)
                }
                TokenKind::Inc | TokenKind::Dec | TokenKind::Quest => {
                    let op = match self.current_kind() {
                        TokenKind::Inc => PostfixOp::Inc,
                        TokenKind::Dec => PostfixOp::Dec,
                        _ => PostfixOp::Quest,
                    };
                    let span = start.to(self.current().span);
                    self.advance();
                    self.mk_expr(ExprKind::Postfix { op, operand: Box::new(expr) }, span)
                }
                _ => return Ok(expr),
            };
        }
    }

    /// `(name:)? expr` elements up to `close`, which is left unconsumed.
    fn parse_named_list(&mut self, close: &TokenKind) -> PResult<Vec<NamedElement>> {
        let mut elements = Vec::new();
        while !self.check(close) && !self.at_end() {
            elements.push(self.parse_named_element()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        Ok(elements)
    }

    fn parse_named_element(&mut self) -> PResult<NamedElement> {
        let start = self.current().span;
        let name = if matches!(self.current_kind(), TokenKind::Id(_)) && matches!(self.peek(1), TokenKind::Colon) {
            let name = self.expect_ident()?;
            self.advance();
            Some(name)
        } else {
            None
        };
        let value = self.parse_expr()?;
        let span = start.to(value.span);
        Ok(NamedElement { name, value, span })
    }

    fn parse_expr_list(&mut self, close: &TokenKind) -> PResult<Vec<Expr>> {
        let mut exprs = Vec::new();
        while !self.check(close) && !self.at_end() {
            exprs.push(self.parse_expr()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        Ok(exprs)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let start = self.current().span;
        let kind = match self.current_kind().clone() {
            TokenKind::DecLiteral(v) => self.literal(LitKind::Dec, v),
            TokenKind::BinLiteral(v) => self.literal(LitKind::Bin, v),
            TokenKind::OctLiteral(v) => self.literal(LitKind::Oct, v),
            TokenKind::HexLiteral(v) => self.literal(LitKind::Hex, v),
            TokenKind::FloatLiteral(v) => self.literal(LitKind::Float, v),
            TokenKind::SQStringLiteral(v) => self.literal(LitKind::SQString, v),
            TokenKind::DQStringLiteral(v) => self.literal(LitKind::DQString, v),
            TokenKind::True => self.literal(LitKind::Bool, "true".to_string()),
            TokenKind::False => self.literal(LitKind::Bool, "false".to_string()),
            TokenKind::This => {
                self.advance();
                ExprKind::This
            }
            TokenKind::Super => {
                self.advance();
                ExprKind::Super
            }
            TokenKind::Id(_) | TokenKind::Path => return self.parse_path_or_struct(),
            TokenKind::LParen => return self.parse_paren(),
            TokenKind::LBracket => {
                self.advance();
                self.enter_group(true);
                let items = self.parse_expr_list(&TokenKind::RBracket)?;
                if !self.close_group(&TokenKind::RBracket)? {
                    return Ok(self.mk_expr(ExprKind::Error, start));
                }
                ExprKind::List(items)
            }
            TokenKind::LBrace => ExprKind::Block(self.parse_block()?),
            TokenKind::If => return self.parse_if(),
            TokenKind::Loop => {
                self.advance();
                ExprKind::Loop(self.parse_block()?)
            }
            TokenKind::When => return self.parse_when(),
            TokenKind::BitOr | TokenKind::Or => return self.parse_lambda(),
            TokenKind::Break => {
                self.advance();
                ExprKind::Break(self.parse_optional_value()?)
            }
            TokenKind::Continue => {
                self.advance();
                ExprKind::Continue
            }
            TokenKind::Return => {
                self.advance();
                ExprKind::Return(self.parse_optional_value()?)
            }
            TokenKind::Throw => {
                self.advance();
                ExprKind::Throw(Box::new(self.parse_expr()?))
            }
            TokenKind::Try => return self.parse_try(),
            TokenKind::Spread => {
                self.advance();
                ExprKind::Spread(Box::new(self.parse_prefix()?))
            }
            _ => {
                self.report_expected("expression")?;
                return Ok(self.error_expr());
            }
        };
        let span = self.span_from(start);
        Ok(self.mk_expr(kind, span))
    }

    fn literal(&mut self, kind: LitKind, value: String) -> ExprKind {
        self.advance();
        ExprKind::Literal(Literal { kind, value })
    }

    /// Value of `break`/`return`, absent at the end of the statement.
    fn parse_optional_value(&mut self) -> PResult<Option<Box<Expr>>> {
        if Self::can_start_expr(self.current_kind()) {
            Ok(Some(Box::new(self.parse_expr()?)))
        } else {
            Ok(None)
        }
    }

    fn parse_path_or_struct(&mut self) -> PResult<Expr> {
        let path = self.parse_path(false)?;
        if self.allow_brace_expr && self.check(&TokenKind::LBrace) {
            return self.parse_struct_expr(path);
        }
        let span = path.span;
        if path.is_simple() {
            let ident = path.first().ident.clone();
            return Ok(self.mk_expr(ExprKind::Id { ident, res: ResSlot::new() }, span));
        }
        Ok(self.mk_expr(ExprKind::Path(path), span))
    }

    /// `::`? ID (`::` ID)*. In types generics follow a segment directly,
    /// in expressions they need a leading `::`.
    fn parse_path(&mut self, in_type: bool) -> PResult<PathExpr> {
        let start = self.current().span;
        let global = self.match_token(&TokenKind::Path);
        let mut segments = Vec::new();
        loop {
            let ident = self.expect_ident()?;
            let mut generics = Vec::new();
            if in_type && self.check(&TokenKind::LAngle) {
                generics = self.parse_type_args()?;
            }
            if !self.check(&TokenKind::Path) {
                segments.push(PathSeg { ident, generics });
                break;
            }
            self.advance();
            if !in_type && self.check(&TokenKind::LAngle) {
                generics = self.parse_type_args()?;
                segments.push(PathSeg { ident, generics });
                if !self.match_token(&TokenKind::Path) {
                    break;
                }
                continue;
            }
            segments.push(PathSeg { ident, generics });
        }
        Ok(PathExpr { global, segments, span: self.span_from(start), res: ResSlot::new() })
    }

    fn parse_struct_expr(&mut self, path: PathExpr) -> PResult<Expr> {
        let start = path.span;
        self.advance();
        self.enter_group(true);
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            fields.push(self.parse_struct_field()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        if !self.close_group(&TokenKind::RBrace)? {
            return Ok(self.mk_expr(ExprKind::Error, start));
        }
        let span = self.span_from(start);
        Ok(self.mk_expr(ExprKind::Struct { path, fields }, span))
    }

    fn parse_struct_field(&mut self) -> PResult<StructField> {
        if self.match_token(&TokenKind::Spread) {
            return Ok(StructField::Base(self.parse_expr()?));
        }
        if matches!(self.current_kind(), TokenKind::Id(_)) && matches!(self.peek(1), TokenKind::Colon) {
            let name = self.expect_ident()?;
            self.advance();
            let value = self.parse_expr()?;
            return Ok(StructField::Raw { name, value });
        }
        Ok(StructField::Shortcut(self.parse_expr()?))
    }

    /// Unit, parenthesized expression or tuple.
    fn parse_paren(&mut self) -> PResult<Expr> {
        let start = self.current().span;
        self.advance();
        self.enter_group(true);
        if self.check(&TokenKind::RParen) {
            self.exit_group();
            self.advance();
            let span = self.span_from(start);
            return Ok(self.mk_expr(ExprKind::Unit, span));
        }

        let first = self.parse_named_element()?;
        if first.name.is_none() && !self.check(&TokenKind::Comma) {
            if !self.close_group(&TokenKind::RParen)? {
                return Ok(self.mk_expr(ExprKind::Error, start));
            }
            let span = self.span_from(start);
            self.check_useless_parens(&first.value, span);
            return Ok(self.mk_expr(ExprKind::Paren(Box::new(first.value)), span));
        }

        let mut elements = vec![first];
        while self.match_token(&TokenKind::Comma) {
            if self.check(&TokenKind::RParen) {
                break;
            }
            elements.push(self.parse_named_element()?);
        }
        if !self.close_group(&TokenKind::RParen)? {
            return Ok(self.mk_expr(ExprKind::Error, start));
        }
        let span = self.span_from(start);
        Ok(self.mk_expr(ExprKind::Tuple(elements), span))
    }

    fn check_useless_parens(&mut self, inner: &Expr, span: Span) {
        match inner.kind {
            ExprKind::Paren(_) => self.warn("Useless double-wrapped parenthesized expression", span),
            ExprKind::Literal(_) | ExprKind::Id { .. } | ExprKind::Path(_) | ExprKind::This | ExprKind::Super => {
                self.warn("Useless parentheses around simple expression", span)
            }
            _ => {}
        }
    }

    fn parse_if(&mut self) -> PResult<Expr> {
        let start = self.current().span;
        self.advance();
        let cond = self.parse_expr_no_braces()?;
        let then_block = self.parse_block()?;

        let else_branch = if self.next_after_nls(|k| matches!(k, TokenKind::Elif)) {
            self.skip_nls();
            Some(Box::new(self.parse_if()?))
        } else if self.next_after_nls(|k| matches!(k, TokenKind::Else)) {
            self.skip_nls();
            self.advance();
            if self.check(&TokenKind::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                let block_start = self.current().span;
                let block = self.parse_block()?;
                let span = self.span_from(block_start);
                Some(Box::new(self.mk_expr(ExprKind::Block(block), span)))
            }
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(self.mk_expr(ExprKind::If { cond: Box::new(cond), then_block, else_branch }, span))
    }

    fn parse_when(&mut self) -> PResult<Expr> {
        let start = self.current().span;
        self.advance();
        let subject = self.parse_expr_no_braces()?;
        self.expect(&TokenKind::LBrace)?;
        self.enter_group(false);

        let mut entries = Vec::new();
        self.skip_entry_separators();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            entries.push(self.parse_when_entry()?);
            self.skip_entry_separators();
        }

        self.exit_group();
        self.expect(&TokenKind::RBrace)?;
        let span = self.span_from(start);
        Ok(self.mk_expr(ExprKind::When { subject: Box::new(subject), entries }, span))
    }

    fn skip_entry_separators(&mut self) {
        while matches!(self.current_kind(), TokenKind::Nl | TokenKind::Semi | TokenKind::Comma) {
            self.bump();
        }
    }

    fn parse_when_entry(&mut self) -> PResult<WhenEntry> {
        let start = self.current().span;
        let mut conditions = Vec::new();
        if !self.match_token(&TokenKind::Else) {
            loop {
                conditions.push(self.parse_expr()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
                self.skip_nls();
            }
        }
        self.expect(&TokenKind::DoubleArrow)?;
        self.skip_nls();
        let body = self.parse_expr()?;
        let span = self.span_from(start);
        Ok(WhenEntry { id: self.next_id(), conditions, body: Box::new(body), span })
    }

    fn parse_lambda(&mut self) -> PResult<Expr> {
        let start = self.current().span;
        let mut params = Vec::new();
        if self.match_token(&TokenKind::BitOr) {
            self.skip_nls();
            while !self.check(&TokenKind::BitOr) && !self.at_end() {
                let name = self.expect_ident()?;
                let ty = if self.match_token(&TokenKind::Colon) {
                    self.skip_nls();
                    Some(self.parse_type()?)
                } else {
                    None
                };
                params.push(LambdaParam { id: self.next_id(), name, ty });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
                self.skip_nls();
            }
            self.expect(&TokenKind::BitOr)?;
        } else {
            self.expect(&TokenKind::Or)?;
        }

        let ret = if self.match_token(&TokenKind::Arrow) {
            Some(Box::new(self.parse_type()?))
        } else {
            None
        };
        self.skip_nls();
        let body = self.parse_expr()?;
        let span = start.to(body.span);
        Ok(self.mk_expr(ExprKind::Lambda { params, ret, body: Box::new(body) }, span))
    }

    fn parse_try(&mut self) -> PResult<Expr> {
        let start = self.current().span;
        self.advance();
        let body = self.parse_block()?;
        if self.next_after_nls(|k| matches!(k, TokenKind::Catch)) {
            self.skip_nls();
        }
        self.expect(&TokenKind::Catch)?;
        let binding = self.expect_ident()?;
        let catch_body = self.parse_block()?;
        let catch = CatchClause { id: self.next_id(), binding, body: catch_body };
        let span = self.span_from(start);
        Ok(self.mk_expr(ExprKind::TryCatch { body, catch }, span))
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn mk_type(&mut self, kind: TypeKind, span: Span) -> Type {
        Type { id: self.next_id(), kind, span }
    }

    fn parse_type(&mut self) -> PResult<Type> {
        let start = self.current().span;
        match self.current_kind() {
            TokenKind::Id(_) | TokenKind::Path => {
                let path = self.parse_path(true)?;
                let span = path.span;
                Ok(self.mk_type(TypeKind::Path(path), span))
            }
            TokenKind::LParen => self.parse_paren_type(),
            TokenKind::LBracket => {
                self.advance();
                self.enter_group(true);
                let elem = Box::new(self.parse_type()?);
                let kind = if self.match_token(&TokenKind::Semi) {
                    let size = Box::new(self.parse_expr()?);
                    TypeKind::Array { elem, size }
                } else {
                    TypeKind::Slice(elem)
                };
                if !self.close_group(&TokenKind::RBracket)? {
                    return Ok(self.mk_type(TypeKind::Error, start));
                }
                let span = self.span_from(start);
                Ok(self.mk_type(kind, span))
            }
            _ => {
                self.report_expected("type")?;
                let span = self.current().span;
                Ok(self.mk_type(TypeKind::Error, span))
            }
        }
    }

    /// `()`, `(T)`, `(A, B)` and function types `(A, B) -> R`.
    fn parse_paren_type(&mut self) -> PResult<Type> {
        let start = self.current().span;
        self.advance();
        self.enter_group(true);
        let mut elements = Vec::new();
        let mut trailing_comma = false;
        while !self.check(&TokenKind::RParen) && !self.at_end() {
            elements.push(self.parse_type()?);
            trailing_comma = self.match_token(&TokenKind::Comma);
            if !trailing_comma {
                break;
            }
        }
        if !self.close_group(&TokenKind::RParen)? {
            return Ok(self.mk_type(TypeKind::Error, start));
        }

        if self.match_token(&TokenKind::Arrow) {
            let ret = Box::new(self.parse_type()?);
            let span = start.to(ret.span);
            return Ok(self.mk_type(TypeKind::Func { params: elements, ret }, span));
        }

        let span = self.span_from(start);
        let kind = match elements.len() {
            0 => TypeKind::Unit,
            1 if !trailing_comma => match elements.pop() {
                Some(inner) => TypeKind::Paren(Box::new(inner)),
                None => TypeKind::Unit,
            },
            _ => TypeKind::Tuple(elements),
        };
        Ok(self.mk_type(kind, span))
    }

    /// `<` type % `,` `>`
    fn parse_type_args(&mut self) -> PResult<Vec<Type>> {
        self.expect(&TokenKind::LAngle)?;
        self.skip_nls();
        let mut args = Vec::new();
        while !self.closes_generics() && !self.at_end() {
            args.push(self.parse_type()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
            self.skip_nls();
        }
        self.expect_gt()?;
        Ok(args)
    }

    fn closes_generics(&self) -> bool {
        matches!(self.current_kind(), TokenKind::RAngle | TokenKind::Shr)
    }

    /// Consume one `>`, splitting `>>` across two nested generic lists.
    fn expect_gt(&mut self) -> PResult<()> {
        match self.current_kind() {
            TokenKind::RAngle => self.advance(),
            TokenKind::Shr if self.pending_gt => {
                self.pending_gt = false;
                self.advance();
            }
            TokenKind::Shr => self.pending_gt = true,
            _ => return Err(self.error_expected("'>'")),
        }
        Ok(())
    }

    fn parse_type_params(&mut self) -> PResult<Vec<TypeParam>> {
        if !self.check(&TokenKind::LAngle) {
            return Ok(Vec::new());
        }
        self.advance();
        self.skip_nls();
        let mut params = Vec::new();
        while !self.closes_generics() && !self.at_end() {
            let start = self.current().span;
            let (name, kind) = if let TokenKind::Lifetime(name) = self.current_kind() {
                let name = Ident::new(name.clone(), self.current().span);
                self.advance();
                (name, TypeParamKind::Lifetime)
            } else if self.match_token(&TokenKind::Const) {
                let name = self.expect_ident()?;
                self.expect(&TokenKind::Colon)?;
                let ty = self.parse_type()?;
                let default = if self.match_token(&TokenKind::Assign) { Some(self.parse_expr()?) } else { None };
                (name, TypeParamKind::Const { ty, default })
            } else {
                let name = self.expect_ident()?;
                let bound = if self.match_token(&TokenKind::Colon) { Some(self.parse_type()?) } else { None };
                (name, TypeParamKind::Type { bound })
            };
            let span = self.span_from(start);
            params.push(TypeParam { id: self.next_id(), name, kind, span });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
            self.skip_nls();
        }
        self.expect_gt()?;
        Ok(params)
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// `in_class` admits `init`, which only a class or struct body may hold.
    fn parse_item(&mut self, in_class: bool) -> PResult<Item> {
        let start = self.current().span;
        let attrs = self.parse_attrs()?;
        let modifiers = self.parse_modifiers();
        let kind = match self.current_kind() {
            TokenKind::Func => ItemKind::Func(self.parse_func()?),
            TokenKind::Class | TokenKind::Struct => ItemKind::Class(self.parse_class()?),
            TokenKind::Enum => ItemKind::Enum(self.parse_enum()?),
            TokenKind::Trait => ItemKind::Trait(self.parse_trait()?),
            TokenKind::Type => ItemKind::TypeAlias(self.parse_type_alias()?),
            TokenKind::Object => ItemKind::Object(self.parse_object()?),
            TokenKind::Init => {
                if !in_class {
                    let span = self.current().span;
                    self.record_error(ParseError::new("`init` is only allowed inside a class", span));
                }
                ItemKind::Init(self.parse_init()?)
            }
            _ => return Err(self.error_expected("declaration after attributes or modifiers")),
        };
        Ok(Item { id: self.next_id(), attrs, modifiers, kind, span: self.span_from(start) })
    }

    fn parse_attrs(&mut self) -> PResult<Vec<Attr>> {
        let mut attrs = Vec::new();
        while self.check(&TokenKind::At) {
            let start = self.current().span;
            self.advance();
            let name = self.expect_ident()?;
            let mut args = Vec::new();
            if self.check(&TokenKind::LParen) {
                self.advance();
                self.enter_group(true);
                args = self.parse_named_list(&TokenKind::RParen)?;
                self.exit_group();
                self.expect(&TokenKind::RParen)?;
            }
            attrs.push(Attr { name, args, span: self.span_from(start) });
            self.skip_semis();
        }
        Ok(attrs)
    }

    fn parse_modifiers(&mut self) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        loop {
            let modifier = match self.current_kind() {
                TokenKind::Pub => Modifier::Pub,
                TokenKind::Pri => Modifier::Pri,
                TokenKind::Static => Modifier::Static,
                TokenKind::Mut => Modifier::Mut,
                TokenKind::Move => Modifier::Move,
                TokenKind::Const => Modifier::Const,
                TokenKind::Infix => Modifier::Infix,
                _ => return modifiers,
            };
            modifiers.push(modifier);
            self.advance();
        }
    }

    fn parse_func(&mut self) -> PResult<Func> {
        self.expect(&TokenKind::Func)?;
        let name = self.expect_ident()?;
        let generics = self.parse_type_params()?;
        let params = self.parse_params()?;
        let ret = if self.match_token(&TokenKind::Colon) { Some(self.parse_type()?) } else { None };
        let body = match self.current_kind() {
            TokenKind::LBrace => Some(FuncBody::Block(self.parse_block()?)),
            TokenKind::DoubleArrow => {
                self.advance();
                self.skip_nls();
                Some(FuncBody::Expr(Box::new(self.parse_expr()?)))
            }
            _ => None,
        };
        Ok(Func { name, generics, params, ret, body })
    }

    fn parse_params(&mut self) -> PResult<Vec<Param>> {
        self.expect(&TokenKind::LParen)?;
        self.enter_group(true);
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.at_end() {
            let start = self.current().span;
            let name = self.expect_ident()?;
            self.expect(&TokenKind::Colon)?;
            let ty = self.parse_type()?;
            let default = if self.match_token(&TokenKind::Assign) { Some(self.parse_expr()?) } else { None };
            let span = self.span_from(start);
            params.push(Param { id: self.next_id(), name, ty, default, span });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.exit_group();
        self.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_supers(&mut self) -> PResult<Vec<Type>> {
        let mut supers = Vec::new();
        if self.match_token(&TokenKind::Colon) {
            loop {
                self.skip_nls();
                supers.push(self.parse_type()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        Ok(supers)
    }

    fn parse_class(&mut self) -> PResult<Class> {
        let is_struct = self.check(&TokenKind::Struct);
        self.advance();
        let name = self.expect_ident()?;
        let generics = self.parse_type_params()?;
        let supers = if is_struct { Vec::new() } else { self.parse_supers()? };
        let members = self.parse_members(true)?;
        Ok(Class { name, is_struct, generics, supers, members })
    }

    fn parse_trait(&mut self) -> PResult<Trait> {
        self.expect(&TokenKind::Trait)?;
        let name = self.expect_ident()?;
        let generics = self.parse_type_params()?;
        let supers = self.parse_supers()?;
        let members = self.parse_members(false)?;
        Ok(Trait { name, generics, supers, members })
    }

    fn parse_object(&mut self) -> PResult<Object> {
        self.expect(&TokenKind::Object)?;
        let name = self.expect_ident()?;
        let supers = self.parse_supers()?;
        let members = self.parse_members(false)?;
        Ok(Object { name, supers, members })
    }

    fn parse_type_alias(&mut self) -> PResult<TypeAlias> {
        self.expect(&TokenKind::Type)?;
        let name = self.expect_ident()?;
        let generics = self.parse_type_params()?;
        self.expect(&TokenKind::Assign)?;
        self.skip_nls();
        let ty = self.parse_type()?;
        Ok(TypeAlias { name, generics, ty })
    }

    fn parse_init(&mut self) -> PResult<Init> {
        self.expect(&TokenKind::Init)?;
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        Ok(Init { params, body })
    }

    /// `{` (field | item)* `}`. A member with a syntax error is dropped.
    fn parse_members(&mut self, in_class: bool) -> PResult<Vec<Item>> {
        self.expect(&TokenKind::LBrace)?;
        self.enter_group(false);
        let mut members = Vec::new();
        self.skip_semis();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if let Some(member) = self.recovering(|p| p.parse_member(in_class))? {
                members.push(member);
            }
            self.skip_semis();
        }
        self.exit_group();
        self.expect(&TokenKind::RBrace)?;
        Ok(members)
    }

    fn parse_member(&mut self, in_class: bool) -> PResult<Item> {
        let start = self.current().span;
        let attrs = self.parse_attrs()?;
        let modifiers = self.parse_modifiers();
        if matches!(self.current_kind(), TokenKind::Var | TokenKind::Val | TokenKind::Id(_)) {
            let field = self.parse_field()?;
            let span = self.span_from(start);
            return Ok(Item { id: self.next_id(), attrs, modifiers, kind: ItemKind::Field(field), span });
        }
        let mut item = self.parse_item(in_class)?;
        item.attrs.splice(0..0, attrs);
        item.modifiers.splice(0..0, modifiers);
        item.span = self.span_from(start);
        Ok(item)
    }

    fn parse_field(&mut self) -> PResult<Field> {
        let kind = match self.current_kind() {
            TokenKind::Var => Some(VarKind::Var),
            TokenKind::Val => Some(VarKind::Val),
            _ => None,
        };
        if kind.is_some() {
            self.advance();
        }
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        self.skip_nls();
        let ty = self.parse_type()?;
        let default = if self.match_token(&TokenKind::Assign) {
            self.skip_nls();
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Field { kind, name, ty, default })
    }

    fn parse_enum(&mut self) -> PResult<Enum> {
        self.expect(&TokenKind::Enum)?;
        let name = self.expect_ident()?;
        let generics = self.parse_type_params()?;
        self.expect(&TokenKind::LBrace)?;
        self.enter_group(false);

        let mut entries = Vec::new();
        self.skip_entry_separators();
        while matches!(self.current_kind(), TokenKind::Id(_)) {
            entries.push(self.parse_enum_entry()?);
            if !matches!(self.current_kind(), TokenKind::Comma | TokenKind::Nl) {
                break;
            }
            while matches!(self.current_kind(), TokenKind::Comma | TokenKind::Nl) {
                self.bump();
            }
        }

        let mut members = Vec::new();
        if self.match_token(&TokenKind::Semi) {
            self.skip_semis();
            while !self.check(&TokenKind::RBrace) && !self.at_end() {
                if let Some(member) = self.recovering(|p| p.parse_member(false))? {
                    members.push(member);
                }
                self.skip_semis();
            }
        }

        self.exit_group();
        self.skip_semis();
        self.expect(&TokenKind::RBrace)?;
        Ok(Enum { name, generics, entries, members })
    }

    fn parse_enum_entry(&mut self) -> PResult<EnumEntry> {
        let start = self.current().span;
        let name = self.expect_ident()?;
        let kind = match self.current_kind() {
            TokenKind::Assign => {
                self.advance();
                EnumEntryKind::Discriminant(self.parse_expr()?)
            }
            TokenKind::LParen => {
                self.advance();
                self.enter_group(true);
                let mut types = Vec::new();
                while !self.check(&TokenKind::RParen) && !self.at_end() {
                    types.push(self.parse_type()?);
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.exit_group();
                self.expect(&TokenKind::RParen)?;
                EnumEntryKind::Tuple(types)
            }
            TokenKind::LBrace => {
                self.advance();
                self.enter_group(true);
                let mut fields = Vec::new();
                while !self.check(&TokenKind::RBrace) && !self.at_end() {
                    let field = self.expect_ident()?;
                    self.expect(&TokenKind::Colon)?;
                    fields.push((field, self.parse_type()?));
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.exit_group();
                self.expect(&TokenKind::RBrace)?;
                EnumEntryKind::Struct(fields)
            }
            _ => EnumEntryKind::Raw,
        };
        let span = self.span_from(start);
        Ok(EnumEntry { id: self.next_id(), name, kind, span })
    }
}

fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Assign => AssignOp::Assign,
        TokenKind::AddAssign => AssignOp::Add,
        TokenKind::SubAssign => AssignOp::Sub,
        TokenKind::MulAssign => AssignOp::Mul,
        TokenKind::DivAssign => AssignOp::Div,
        TokenKind::ModAssign => AssignOp::Mod,
        TokenKind::PowerAssign => AssignOp::Power,
        TokenKind::ShlAssign => AssignOp::Shl,
        TokenKind::ShrAssign => AssignOp::Shr,
        TokenKind::BitAndAssign => AssignOp::BitAnd,
        TokenKind::BitOrAssign => AssignOp::BitOr,
        TokenKind::XorAssign => AssignOp::Xor,
        TokenKind::NullishAssign => AssignOp::Nullish,
        _ => return None,
    };
    Some(op)
}

// =============================================================================
// Results and Errors
// =============================================================================

/// Statements of one file plus every diagnostic raised while parsing it.
#[derive(Debug)]
pub struct ParseOutput {
    pub stmts: Vec<Stmt>,
    pub suggestions: Vec<Suggestion>,
}

/// A single syntax error.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
    /// Input ended inside the construct; parsing can not continue.
    pub fatal: bool,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self { span, message: message.into(), hint: None, fatal: false }
    }

    pub fn fatal(message: impl Into<String>, span: Span) -> Self {
        Self { fatal: true, ..Self::new(message, span) }
    }

    pub fn expected(expected: &str, found: &TokenKind, span: Span) -> Self {
        Self {
            span,
            message: format!("Expected {}, found {}", expected, found.display_name()),
            hint: crate::hints::for_expected(expected, found).map(str::to_string),
            fatal: matches!(found, TokenKind::Eof),
        }
    }
}

impl ToSuggestion for ParseError {
    fn to_suggestion(&self) -> Suggestion {
        let sugg = Suggestion::error(self.message.clone(), self.span);
        match &self.hint {
            Some(hint) => sugg.with_help(hint.clone()),
            None => sugg,
        }
    }
}

/// Parsing stopped before the end of the file.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ParserError {
    pub message: String,
    pub span: Span,
    /// Everything collected up to the abort, the fatal error last.
    pub suggestions: Vec<Suggestion>,
}
