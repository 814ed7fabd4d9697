//! Convenience constructors for building trees without a parser.

use super::{
    Access, BinaryOperation, BinaryOperator, Block, BooleanLiteral, Conditional, Delete, Evaluate,
    Expr, FunctionDefinition, Insert, ListLiteral, NumberLiteral, Reference, StructureDefinition,
    TextLiteral, UnaryOperation, UnaryOperator, Unparsable,
};
use crate::node::{Bind, Language, NodeId, Token, TokenKind, TypeInput};
use crate::types::{Type, Unit};
use crate::{Vec, format, vec};
use ecow::EcoString;

impl Expr {
    pub fn boolean(value: bool) -> Expr {
        let text = if value { "⊤" } else { "⊥" };
        Expr::from(BooleanLiteral {
            id: NodeId::fresh(),
            token: Token::new(text, TokenKind::Boolean),
            value,
        })
    }

    pub fn number(amount: f64) -> Expr {
        Expr::measure(amount, Unit::empty())
    }

    pub fn measure(amount: f64, unit: Unit) -> Expr {
        Expr::from(NumberLiteral {
            id: NodeId::fresh(),
            token: Token::new(format!("{amount}{unit}"), TokenKind::Number),
            amount,
            unit,
        })
    }

    /// A text literal from its token, quotes included: `Expr::text("\"hi\"")`.
    pub fn text(token: impl Into<EcoString>) -> Expr {
        Expr::from(TextLiteral {
            id: NodeId::fresh(),
            text: Token::new(token, TokenKind::Text),
            language: None,
        })
    }

    pub fn text_in(token: impl Into<EcoString>, language: impl Into<EcoString>) -> Expr {
        Expr::from(TextLiteral {
            id: NodeId::fresh(),
            text: Token::new(token, TokenKind::Text),
            language: Some(Language::new(language)),
        })
    }

    pub fn list(values: Vec<Expr>) -> Expr {
        Expr::from(ListLiteral {
            id: NodeId::fresh(),
            open: Token::new("[", TokenKind::ListOpen),
            values,
            close: Token::new("]", TokenKind::ListClose),
        })
    }

    pub fn conditional(condition: Expr, yes: Expr, no: Expr) -> Expr {
        Expr::from(Conditional {
            id: NodeId::fresh(),
            condition,
            question: Token::new("?", TokenKind::Conditional),
            yes,
            no,
        })
    }

    pub fn evaluate(func: Expr, inputs: Vec<Expr>) -> Expr {
        Expr::evaluate_with_types(Vec::new(), func, inputs)
    }

    /// An evaluation with explicit type inputs, as in `f⸨#⸩(1)`.
    pub fn evaluate_with_types(type_inputs: Vec<Type>, func: Expr, inputs: Vec<Expr>) -> Expr {
        Expr::from(Evaluate {
            id: NodeId::fresh(),
            type_inputs: type_inputs.into_iter().map(TypeInput::new).collect(),
            func,
            open: Token::new("(", TokenKind::EvalOpen),
            inputs,
            close: Token::new(")", TokenKind::EvalClose),
        })
    }

    pub fn delete(table: Expr, query: Expr) -> Expr {
        Expr::from(Delete {
            id: NodeId::fresh(),
            table,
            del: Token::new("⌫", TokenKind::Delete),
            query,
        })
    }

    pub fn insert(table: Expr, cells: Vec<Bind>) -> Expr {
        Expr::from(Insert {
            id: NodeId::fresh(),
            table,
            insert: Token::new("+", TokenKind::Insert),
            cells,
        })
    }

    pub fn reference(name: impl Into<EcoString>) -> Expr {
        Expr::from(Reference {
            id: NodeId::fresh(),
            name: Token::new(name, TokenKind::Name),
        })
    }

    pub fn access(subject: Expr, name: impl Into<EcoString>) -> Expr {
        Expr::from(Access {
            id: NodeId::fresh(),
            subject,
            dot: Token::new(".", TokenKind::Access),
            name: Token::new(name, TokenKind::Name),
        })
    }

    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
        Expr::from(BinaryOperation {
            id: NodeId::fresh(),
            left,
            operator: Token::new(op.symbol(), TokenKind::Operator),
            op,
            right,
        })
    }

    pub fn unary(op: UnaryOperator, operand: Expr) -> Expr {
        Expr::from(UnaryOperation {
            id: NodeId::fresh(),
            operator: Token::new(op.symbol(), TokenKind::Operator),
            op,
            operand,
        })
    }

    pub fn function(definition: FunctionDefinition) -> Expr {
        Expr::from(definition)
    }

    pub fn structure(definition: StructureDefinition) -> Expr {
        Expr::from(definition)
    }

    pub fn block(statements: Vec<Expr>) -> Expr {
        Expr::from(Block {
            id: NodeId::fresh(),
            statements,
        })
    }

    pub fn bind(bind: Bind) -> Expr {
        Expr::from(bind)
    }

    pub fn unparsable(text: impl Into<EcoString>) -> Expr {
        Expr::from(Unparsable {
            id: NodeId::fresh(),
            tokens: vec![Token::new(text, TokenKind::Unknown)],
        })
    }
}
