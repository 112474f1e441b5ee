//! Binary operators and the precedence/associativity table.
//!
//! The table only decides how operator chains nest. It never decides whether
//! a chain is well-formed: every operator sequence `a op b op c ...` is
//! accepted regardless of the operators involved.

use crate::lexer::Token;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Gt,
    Lt,
    Gte,
    Lte,
}

/// Levels from lowest to highest binding power.
pub type PrecedenceTable = [(Assoc, &'static [BinaryOp])];

/// The language's operator table.
pub const PRECEDENCE: &PrecedenceTable = &[
    (Assoc::Left, &[BinaryOp::Add, BinaryOp::Sub]),
    (Assoc::Left, &[BinaryOp::Mul, BinaryOp::Div, BinaryOp::Mod]),
    (
        Assoc::Left,
        &[
            BinaryOp::Eq,
            BinaryOp::NotEq,
            BinaryOp::Gt,
            BinaryOp::Lt,
            BinaryOp::Gte,
            BinaryOp::Lte,
        ],
    ),
];

impl BinaryOp {
    pub fn from_token(token: &Token) -> Option<BinaryOp> {
        let op = match token {
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Sub,
            Token::Star => BinaryOp::Mul,
            Token::Slash => BinaryOp::Div,
            Token::Percent => BinaryOp::Mod,
            Token::EqEq => BinaryOp::Eq,
            Token::NotEq => BinaryOp::NotEq,
            Token::Gt => BinaryOp::Gt,
            Token::Lt => BinaryOp::Lt,
            Token::Gte => BinaryOp::Gte,
            Token::Lte => BinaryOp::Lte,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::Gte => ">=",
            BinaryOp::Lte => "<=",
        }
    }

    /// 1-based level in [`PRECEDENCE`] plus its associativity.
    pub fn level(self) -> (usize, Assoc) {
        self.level_in(PRECEDENCE)
    }

    /// Level 0 means `table` does not list the operator.
    pub fn level_in(self, table: &PrecedenceTable) -> (usize, Assoc) {
        table
            .iter()
            .enumerate()
            .find(|(_, (_, ops))| ops.contains(&self))
            .map(|(i, (assoc, _))| (i + 1, *assoc))
            .unwrap_or((0, Assoc::Left))
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Shift/reduce conflict resolution: with `stacked` on top of the operator
/// stack and `incoming` as lookahead, reduce first iff this returns true.
pub fn reduce_before(stacked: BinaryOp, incoming: BinaryOp) -> bool {
    reduce_before_in(PRECEDENCE, stacked, incoming)
}

/// [`reduce_before`] against an arbitrary table. Equal levels reduce only
/// when left-associative.
pub fn reduce_before_in(table: &PrecedenceTable, stacked: BinaryOp, incoming: BinaryOp) -> bool {
    let (top, assoc) = stacked.level_in(table);
    let (next, _) = incoming.level_in(table);
    top > next || (top == next && assoc == Assoc::Left)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_operator_has_exactly_one_level() {
        let all = [
            BinaryOp::Add,
            BinaryOp::Sub,
            BinaryOp::Mul,
            BinaryOp::Div,
            BinaryOp::Mod,
            BinaryOp::Eq,
            BinaryOp::NotEq,
            BinaryOp::Gt,
            BinaryOp::Lt,
            BinaryOp::Gte,
            BinaryOp::Lte,
        ];
        for op in all {
            let hits = PRECEDENCE
                .iter()
                .filter(|(_, ops)| ops.contains(&op))
                .count();
            assert_eq!(hits, 1, "{} appears {} times", op, hits);
            assert!(op.level().0 >= 1);
        }
    }

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        assert!(reduce_before(BinaryOp::Mul, BinaryOp::Add));
        assert!(!reduce_before(BinaryOp::Add, BinaryOp::Mul));
    }

    #[test]
    fn comparisons_bind_tightest() {
        assert!(reduce_before(BinaryOp::Lt, BinaryOp::Mod));
        assert!(!reduce_before(BinaryOp::Sub, BinaryOp::Gte));
    }

    #[test]
    fn same_level_is_left_associative() {
        assert!(reduce_before(BinaryOp::Sub, BinaryOp::Add));
        assert!(reduce_before(BinaryOp::Div, BinaryOp::Mul));
        assert!(reduce_before(BinaryOp::Eq, BinaryOp::NotEq));
    }

    #[test]
    fn right_associative_level_shifts_on_tie() {
        let table: &PrecedenceTable = &[
            (Assoc::Left, &[BinaryOp::Add]),
            (Assoc::Right, &[BinaryOp::Sub, BinaryOp::Mul]),
        ];
        assert!(!reduce_before_in(table, BinaryOp::Sub, BinaryOp::Sub));
        assert!(!reduce_before_in(table, BinaryOp::Mul, BinaryOp::Sub));
        assert!(reduce_before_in(table, BinaryOp::Mul, BinaryOp::Add));
        assert!(reduce_before_in(table, BinaryOp::Add, BinaryOp::Add));
        assert_eq!(BinaryOp::Sub.level_in(table), (2, Assoc::Right));
        assert_eq!(BinaryOp::Div.level_in(table).0, 0);
    }

    #[test]
    fn from_token_ignores_non_operators() {
        assert_eq!(BinaryOp::from_token(&Token::Assign), None);
        assert_eq!(BinaryOp::from_token(&Token::Colon), None);
        assert_eq!(BinaryOp::from_token(&Token::Percent), Some(BinaryOp::Mod));
    }
}
