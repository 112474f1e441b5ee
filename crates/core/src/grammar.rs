//! Grammar engine: decides whether a token stream is exactly one statement.
//!
//! Statements are chosen by one token of lookahead. Binary-operator chains go
//! through an explicit shift/reduce stack that consults [`crate::precedence`].
//! No syntax tree is kept; accepted statements are only classified.
//!
//! Tokens are pulled from the [`Lexer`] on demand. The first token that
//! cannot extend a valid prefix of the grammar triggers the error production,
//! and parsing stops there.

use crate::error::Diagnostic;
use crate::lexer::{Lexer, Spanned, Token};
use crate::precedence::{reduce_before, BinaryOp};
use serde::Serialize;
use std::fmt;
use tracing::{debug, trace};

// ──────────────────────────────────────────────
// Statement classification
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopKind {
    While,
    For,
    /// `until` has one form only; it is a loop, not a separate condition.
    Until,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    If,
    IfElse,
    IfElseifElse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "category", content = "form", rename_all = "snake_case")]
pub enum StatementKind {
    Expression,
    Assignment,
    FunctionCall,
    StructDeclaration,
    Loop(LoopKind),
    Condition(ConditionKind),
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatementKind::Expression => "expression",
            StatementKind::Assignment => "assignment",
            StatementKind::FunctionCall => "function call",
            StatementKind::StructDeclaration => "struct declaration",
            StatementKind::Loop(LoopKind::While) => "while loop",
            StatementKind::Loop(LoopKind::For) => "for loop",
            StatementKind::Loop(LoopKind::Until) => "until loop",
            StatementKind::Condition(ConditionKind::If) => "if",
            StatementKind::Condition(ConditionKind::IfElse) => "if/else",
            StatementKind::Condition(ConditionKind::IfElseifElse) => "if/elseif/else",
        };
        f.write_str(s)
    }
}

// ──────────────────────────────────────────────
// Expression grouping
// ──────────────────────────────────────────────

/// Fully parenthesized rendering of how an expression nests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouping(String);

impl Grouping {
    fn atom(tok: &Spanned) -> Self {
        Grouping(tok.lexeme.clone())
    }

    fn binary(lhs: &Grouping, op: BinaryOp, rhs: &Grouping) -> Self {
        Grouping(format!("({} {} {})", lhs.0, op, rhs.0))
    }

    fn print(args: &[Grouping]) -> Self {
        let inner: Vec<&str> = args.iter().map(|g| g.0.as_str()).collect();
        Grouping(format!("print({})", inner.join(", ")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operand/operator stack for one expression. `pending` holds each shifted
/// operator with the operand to its right; `bottom` is the leftmost operand.
/// `awaiting` is a shifted operator whose right operand is not read yet.
struct ExprStack {
    bottom: Option<Grouping>,
    pending: Vec<(BinaryOp, Grouping)>,
    awaiting: Option<BinaryOp>,
    /// Build groupings on reduce; plain validation skips it.
    render: bool,
}

impl ExprStack {
    fn new(render: bool) -> Self {
        ExprStack {
            bottom: None,
            pending: Vec::new(),
            awaiting: None,
            render,
        }
    }

    fn wants_operand(&self) -> bool {
        self.bottom.is_none() || self.awaiting.is_some()
    }

    fn operand(&mut self, operand: Grouping) {
        match self.awaiting.take() {
            Some(op) => self.pending.push((op, operand)),
            None => self.bottom = Some(operand),
        }
    }

    /// Shift `op`, reducing first whatever the table says binds before it.
    fn operator(&mut self, op: BinaryOp) {
        while let Some((top, _)) = self.pending.last() {
            if !reduce_before(*top, op) {
                break;
            }
            self.reduce();
        }
        trace!(%op, "shift");
        self.awaiting = Some(op);
    }

    /// Reduce the topmost `lhs op rhs`. Returns false when nothing is left.
    fn reduce(&mut self) -> bool {
        let Some((op, rhs)) = self.pending.pop() else {
            return false;
        };
        trace!(%op, "reduce");
        let lhs = match self.pending.last_mut() {
            Some((_, operand)) => operand,
            None => match &mut self.bottom {
                Some(operand) => operand,
                None => return false,
            },
        };
        if self.render {
            *lhs = Grouping::binary(lhs, op, &rhs);
        }
        true
    }

    fn finish(mut self) -> Grouping {
        while self.reduce() {}
        self.bottom.unwrap_or_default()
    }
}

/// A `print(` whose arguments are still being read, with the expression it
/// is an operand of.
struct OpenPrint {
    outer: ExprStack,
    args: Vec<Grouping>,
}

// ──────────────────────────────────────────────
// Block nesting
// ──────────────────────────────────────────────

/// A compound statement whose body is still being read.
#[derive(Debug, Clone, Copy)]
enum OpenBody {
    /// `while`, `until` or `for`; closed by `end`.
    Loop(LoopKind),
    /// First arm of an `if`; closed by `end`, `else` or `elseif`.
    If { parenthesized: bool },
    /// The `elseif` arm; only `else` may follow it.
    Elseif,
    /// The final `else` arm of the chain it completes.
    Else(ConditionKind),
}

enum Step {
    /// A whole statement has been read.
    Complete(StatementKind),
    /// The next statement belongs to this body.
    Enter(OpenBody),
}

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

/// Open blocks and open `print(` calls are kept on heap stacks, so input
/// nesting depth is bounded by memory rather than by the thread's stack.
pub struct Parser {
    lexer: Lexer,
    cur: Spanned,
    diagnostics: Vec<Diagnostic>,
    render: bool,
}

impl Parser {
    pub fn new(src: &str) -> Self {
        let mut lexer = Lexer::new(src);
        let cur = lexer.next_token();
        let diagnostics = lexer.take_defects();
        Parser {
            lexer,
            cur,
            diagnostics,
            render: false,
        }
    }

    fn peek(&self) -> &Token {
        &self.cur.token
    }

    fn at(&self, token: &Token) -> bool {
        self.peek() == token
    }

    fn advance(&mut self) -> Spanned {
        let next = self.lexer.next_token();
        self.diagnostics.extend(self.lexer.take_defects());
        std::mem::replace(&mut self.cur, next)
    }

    fn err(&self) -> Diagnostic {
        match self.peek() {
            Token::Eof => Diagnostic::unexpected_eof(self.cur.line),
            _ => Diagnostic::unexpected_token(self.cur.lexeme.clone(), self.cur.line),
        }
    }

    fn expect(&mut self, token: Token) -> Result<(), Diagnostic> {
        if self.at(&token) {
            self.advance();
            Ok(())
        } else {
            Err(self.err())
        }
    }

    fn expect_name(&mut self) -> Result<(), Diagnostic> {
        if matches!(self.peek(), Token::Name(_)) {
            self.advance();
            Ok(())
        } else {
            Err(self.err())
        }
    }

    fn expect_eof(&self) -> Result<(), Diagnostic> {
        if self.at(&Token::Eof) {
            Ok(())
        } else {
            Err(self.err())
        }
    }

    /// Record a grammar defect. Nothing after it is parsed.
    fn error_production(&mut self, diagnostic: Diagnostic) {
        debug!(%diagnostic, line = diagnostic.line(), "syntax error");
        self.diagnostics.push(diagnostic);
    }

    // -- Entry points --------------------------------------------

    /// Parse the whole input as exactly one statement. `None` means the
    /// error production fired; its diagnostic has been recorded.
    pub fn parse_fragment(&mut self) -> Option<StatementKind> {
        let outcome = self.parse_statement().and_then(|kind| {
            self.expect_eof()?;
            Ok(kind)
        });
        match outcome {
            Ok(kind) => {
                debug!(statement = %kind, "fragment accepted");
                Some(kind)
            }
            Err(diagnostic) => {
                self.error_production(diagnostic);
                None
            }
        }
    }

    /// Parse the whole input as exactly one expression.
    pub fn parse_lone_expression(&mut self) -> Option<Grouping> {
        self.render = true;
        let outcome = self.parse_expression().and_then(|grouping| {
            self.expect_eof()?;
            Ok(grouping)
        });
        match outcome {
            Ok(grouping) => Some(grouping),
            Err(diagnostic) => {
                self.error_production(diagnostic);
                None
            }
        }
    }

    /// Drain the remaining input so every lexical defect is reported, then
    /// hand back all diagnostics in detection order.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        while !self.at(&Token::Eof) {
            self.advance();
        }
        self.diagnostics
    }

    // -- Statements ----------------------------------------------

    fn parse_statement(&mut self) -> Result<StatementKind, Diagnostic> {
        let mut open: Vec<OpenBody> = Vec::new();
        loop {
            let mut step = self.parse_statement_head()?;
            loop {
                match step {
                    Step::Enter(body) => {
                        open.push(body);
                        break;
                    }
                    Step::Complete(kind) => match open.pop() {
                        None => return Ok(kind),
                        Some(body) => step = self.continue_body(body)?,
                    },
                }
            }
        }
    }

    /// A statement up to the start of its body, or all of it when it has
    /// no body.
    fn parse_statement_head(&mut self) -> Result<Step, Diagnostic> {
        let step = match self.peek() {
            Token::While => self.open_guarded_loop(LoopKind::While)?,
            Token::Until => self.open_guarded_loop(LoopKind::Until)?,
            Token::For => self.open_for()?,
            Token::If => self.open_if()?,
            Token::Struct => Step::Complete(self.parse_struct()?),
            Token::Name(_) => Step::Complete(self.parse_name_statement()?),
            _ => {
                self.parse_expression()?;
                Step::Complete(StatementKind::Expression)
            }
        };
        Ok(step)
    }

    /// After a statement inside `body`: close the body, move on to its next
    /// arm, or stay for another adjacent statement.
    fn continue_body(&mut self, body: OpenBody) -> Result<Step, Diagnostic> {
        let step = match body {
            OpenBody::Loop(kind) if self.at(&Token::End) => {
                self.advance();
                Step::Complete(StatementKind::Loop(kind))
            }
            OpenBody::If { .. } if self.at(&Token::End) => {
                self.advance();
                Step::Complete(StatementKind::Condition(ConditionKind::If))
            }
            OpenBody::If { .. } if self.at(&Token::Else) => {
                self.open_else(ConditionKind::IfElse)?
            }
            OpenBody::If { parenthesized } if self.at(&Token::Elseif) => {
                self.advance();
                self.parse_condition(parenthesized)?;
                self.expect(Token::Colon)?;
                Step::Enter(OpenBody::Elseif)
            }
            OpenBody::Elseif if self.at(&Token::Else) => {
                self.open_else(ConditionKind::IfElseifElse)?
            }
            OpenBody::Else(kind) if self.at(&Token::End) => {
                self.advance();
                Step::Complete(StatementKind::Condition(kind))
            }
            _ => Step::Enter(body),
        };
        Ok(step)
    }

    fn parse_condition(&mut self, parenthesized: bool) -> Result<(), Diagnostic> {
        if parenthesized {
            self.expect(Token::LParen)?;
            self.parse_expression()?;
            self.expect(Token::RParen)
        } else {
            self.parse_expression().map(|_| ())
        }
    }

    /// `while`/`until`, with a bare or parenthesized condition.
    fn open_guarded_loop(&mut self, kind: LoopKind) -> Result<Step, Diagnostic> {
        self.advance();
        let parenthesized = self.at(&Token::LParen);
        self.parse_condition(parenthesized)?;
        self.expect(Token::Colon)?;
        Ok(Step::Enter(OpenBody::Loop(kind)))
    }

    fn open_for(&mut self) -> Result<Step, Diagnostic> {
        self.advance();
        self.expect_name()?;
        self.expect(Token::In)?;
        self.parse_expression()?;
        self.expect(Token::Colon)?;
        Ok(Step::Enter(OpenBody::Loop(LoopKind::For)))
    }

    fn open_if(&mut self) -> Result<Step, Diagnostic> {
        self.advance();
        // The elseif condition must use the same form as the if condition.
        let parenthesized = self.at(&Token::LParen);
        self.parse_condition(parenthesized)?;
        self.expect(Token::Colon)?;
        Ok(Step::Enter(OpenBody::If { parenthesized }))
    }

    fn open_else(&mut self, completes: ConditionKind) -> Result<Step, Diagnostic> {
        self.advance();
        self.expect(Token::Colon)?;
        Ok(Step::Enter(OpenBody::Else(completes)))
    }

    fn parse_struct(&mut self) -> Result<StatementKind, Diagnostic> {
        self.advance();
        self.expect_name()?;
        self.expect(Token::Colon)?;
        loop {
            self.expect_name()?;
            self.expect(Token::Assign)?;
            self.parse_expression()?;
            if self.at(&Token::End) {
                break;
            }
        }
        self.advance();
        Ok(StatementKind::StructDeclaration)
    }

    /// A leading name opens an assignment, a call, or an expression.
    fn parse_name_statement(&mut self) -> Result<StatementKind, Diagnostic> {
        let name = self.advance();
        match self.peek() {
            Token::Assign => {
                self.advance();
                self.parse_expression()?;
                Ok(StatementKind::Assignment)
            }
            Token::LParen => {
                self.parse_call_arguments()?;
                Ok(StatementKind::FunctionCall)
            }
            _ => {
                let mut expr = ExprStack::new(self.render);
                expr.operand(Grouping::atom(&name));
                self.parse_chain(expr)?;
                Ok(StatementKind::Expression)
            }
        }
    }

    /// `( expr, ... )` after a called name. The list may be empty.
    fn parse_call_arguments(&mut self) -> Result<(), Diagnostic> {
        self.expect(Token::LParen)?;
        if self.at(&Token::RParen) {
            self.advance();
            return Ok(());
        }
        self.parse_expression()?;
        while self.at(&Token::Comma) {
            self.advance();
            self.parse_expression()?;
        }
        self.expect(Token::RParen)
    }

    // -- Expressions ---------------------------------------------

    fn parse_expression(&mut self) -> Result<Grouping, Diagnostic> {
        self.parse_chain(ExprStack::new(self.render))
    }

    /// Read operands and operators into `expr` until the expression ends.
    /// `print` takes one or more arguments; open calls wait on `calls`.
    fn parse_chain(&mut self, mut expr: ExprStack) -> Result<Grouping, Diagnostic> {
        let mut calls: Vec<OpenPrint> = Vec::new();
        loop {
            if expr.wants_operand() {
                match self.peek() {
                    Token::Name(_)
                    | Token::Int(_)
                    | Token::Float(_)
                    | Token::Str(_)
                    | Token::True
                    | Token::False => {
                        let tok = self.advance();
                        expr.operand(Grouping::atom(&tok));
                    }
                    Token::Print => {
                        self.advance();
                        self.expect(Token::LParen)?;
                        let outer = std::mem::replace(&mut expr, ExprStack::new(self.render));
                        calls.push(OpenPrint {
                            outer,
                            args: Vec::new(),
                        });
                    }
                    _ => return Err(self.err()),
                }
                continue;
            }

            if let Some(op) = BinaryOp::from_token(self.peek()) {
                trace!(%op, line = self.cur.line, "operator");
                expr.operator(op);
                self.advance();
                continue;
            }

            // `expr` is complete: either the whole result or a print argument.
            let Some(mut call) = calls.pop() else {
                return Ok(expr.finish());
            };
            let arg = std::mem::replace(&mut expr, ExprStack::new(self.render)).finish();
            call.args.push(arg);
            if self.at(&Token::Comma) {
                self.advance();
                calls.push(call);
                continue;
            }
            self.expect(Token::RParen)?;
            let printed = if self.render {
                Grouping::print(&call.args)
            } else {
                Grouping::default()
            };
            expr = call.outer;
            expr.operand(printed);
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
