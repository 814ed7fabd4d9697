use super::{Expr, Expression, finish, start};
use crate::conflict::{Conflict, ConflictKind};
use crate::context::Context;
use crate::node::{Node, NodeId, NodeRef, Replace, Replacement, Token};
use crate::types::{NumberType, Type, Unit, UnitOp};
use crate::values::{ExceptionKind, Number, Value};
use crate::vm::{Evaluator, Instructions};
use crate::{Rc, ToString, Vec, vec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Equal,
    NotEqual,
    Less,
    Greater,
    And,
    Or,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "·",
            BinaryOperator::Divide => "÷",
            BinaryOperator::Power => "^",
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "≠",
            BinaryOperator::Less => "<",
            BinaryOperator::Greater => ">",
            BinaryOperator::And => "∧",
            BinaryOperator::Or => "∨",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<BinaryOperator> {
        Some(match symbol {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Subtract,
            "·" | "*" => BinaryOperator::Multiply,
            "÷" | "/" => BinaryOperator::Divide,
            "^" => BinaryOperator::Power,
            "=" => BinaryOperator::Equal,
            "≠" => BinaryOperator::NotEqual,
            "<" => BinaryOperator::Less,
            ">" => BinaryOperator::Greater,
            "∧" | "&" => BinaryOperator::And,
            "∨" | "|" => BinaryOperator::Or,
            _ => return None,
        })
    }

    fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
                | BinaryOperator::Power
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Not,
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Negate => "-",
            UnaryOperator::Not => "¬",
        }
    }
}

fn any_number() -> Type {
    Type::Number(NumberType::wildcard())
}

fn incompatible(operator: &str, expected: Type, given: Type, operand: NodeId) -> Conflict {
    Conflict::new(
        ConflictKind::IncompatibleOperand {
            operator: operator.into(),
            expected,
            given,
        },
        [operand],
    )
}

/// `left operator right`
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperation {
    pub id: NodeId,
    pub left: Expr,
    pub operator: Token,
    pub op: BinaryOperator,
    pub right: Expr,
}

impl Node for BinaryOperation {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![
            NodeRef::Expr(&self.left),
            NodeRef::Token(&self.operator),
            NodeRef::Expr(&self.right),
        ]
    }
}

impl Replace for BinaryOperation {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        Self {
            id: self.id,
            left: self.left.replace(target, with),
            operator: self.operator.replace(target, with),
            op: self.op,
            right: self.right.replace(target, with),
        }
    }
}

impl Expression for BinaryOperation {
    fn conflicts(&self, ctx: &Context) -> Vec<Conflict> {
        let left = ctx.type_of(&self.left);
        let right = ctx.type_of(&self.right);
        if left.is_unknown() || right.is_unknown() {
            return Vec::new();
        }
        let symbol = self.op.symbol();

        let mut conflicts = Vec::new();
        match self.op {
            BinaryOperator::Equal | BinaryOperator::NotEqual => {}
            BinaryOperator::And | BinaryOperator::Or => {
                for (ty, operand) in [(left, &self.left), (right, &self.right)] {
                    if !Type::Boolean.accepts(&ty, ctx) {
                        conflicts.push(incompatible(symbol, Type::Boolean, ty, operand.id()));
                    }
                }
            }
            _ => {
                if !any_number().accepts(&left, ctx) {
                    conflicts.push(incompatible(symbol, any_number(), left, self.left.id()));
                    return conflicts;
                }
                let expected = match self.op {
                    // Same unit on both sides.
                    BinaryOperator::Add
                    | BinaryOperator::Subtract
                    | BinaryOperator::Less
                    | BinaryOperator::Greater => left,
                    BinaryOperator::Power => Type::number(),
                    _ => any_number(),
                };
                if !expected.accepts(&right, ctx) {
                    conflicts.push(incompatible(symbol, expected, right, self.right.id()));
                }
            }
        }
        conflicts
    }

    /// Arithmetic derives its unit from the operand types.
    fn compute_type(self: &Rc<Self>, ctx: &Context) -> Type {
        if !self.op.is_arithmetic() {
            return Type::Boolean;
        }
        let left = ctx.type_of(&self.left);
        let right = ctx.type_of(&self.right);
        if !matches!(left, Type::Number(_)) {
            return any_number();
        }

        let number = match self.op {
            BinaryOperator::Add | BinaryOperator::Subtract => {
                NumberType::derived(UnitOp::Same, left, None, None)
            }
            BinaryOperator::Multiply | BinaryOperator::Divide => {
                if !matches!(right, Type::Number(_)) {
                    return any_number();
                }
                let op = if self.op == BinaryOperator::Multiply {
                    UnitOp::Product
                } else {
                    UnitOp::Quotient
                };
                NumberType::derived(op, left, Some(right), None)
            }
            _ => {
                let exponent = match &self.right {
                    Expr::Number(literal) => Some(literal.amount),
                    _ => None,
                };
                NumberType::derived(UnitOp::Power, left, None, exponent)
            }
        };
        Type::Number(number)
    }

    fn lower(self: &Rc<Self>, ctx: &Context) -> Instructions {
        let mut instructions = Instructions::new();
        instructions.push(start(self));
        instructions.append(self.left.lower(ctx));
        instructions.append(self.right.lower(ctx));
        instructions.push(finish(self));
        instructions
    }

    fn execute(self: &Rc<Self>, evaluator: &mut Evaluator<'_>) -> Option<Value> {
        let right = pop_or_return!(evaluator);
        let left = pop_or_return!(evaluator);
        let result = apply(self.op, left, right)
            .unwrap_or_else(|kind| Value::Exception(evaluator.exception(kind).at(self.id)));
        Some(result)
    }
}

fn number(value: Value) -> Result<Number, ExceptionKind> {
    match value {
        Value::Number(number) => Ok(number),
        other => Err(ExceptionKind::TypeMismatch {
            expected: "number",
            received: other.kind(),
        }),
    }
}

fn boolean(value: Value) -> Result<bool, ExceptionKind> {
    match value {
        Value::Boolean(value) => Ok(value),
        other => Err(ExceptionKind::TypeMismatch {
            expected: "boolean",
            received: other.kind(),
        }),
    }
}

fn same_unit(left: &Number, right: &Number) -> Result<(), ExceptionKind> {
    if left.unit == right.unit {
        Ok(())
    } else {
        Err(ExceptionKind::IncompatibleUnits {
            left: left.unit.to_string().into(),
            right: right.unit.to_string().into(),
        })
    }
}

fn overflow(unit: &Unit) -> ExceptionKind {
    ExceptionKind::UnitOverflow {
        unit: unit.to_string().into(),
    }
}

/// `base^exponent` for integer exponents.
fn power(base: Number, exponent: &Number) -> Result<Number, ExceptionKind> {
    let whole = exponent.amount as i32;
    if !exponent.unit.is_unitless() || whole as f64 != exponent.amount {
        return Err(ExceptionKind::TypeMismatch {
            expected: "unitless integer exponent",
            received: "number",
        });
    }
    let unit = base.unit.power(whole).ok_or_else(|| overflow(&base.unit))?;

    // Square and multiply.
    let mut amount = 1.0;
    let mut factor = base.amount;
    let mut remaining = whole.unsigned_abs();
    while remaining > 0 {
        if remaining & 1 == 1 {
            amount *= factor;
        }
        factor *= factor;
        remaining >>= 1;
    }
    if whole < 0 {
        amount = 1.0 / amount;
    }
    Ok(Number { amount, unit })
}

fn apply(op: BinaryOperator, left: Value, right: Value) -> Result<Value, ExceptionKind> {
    Ok(match op {
        BinaryOperator::Equal => Value::Boolean(left == right),
        BinaryOperator::NotEqual => Value::Boolean(left != right),
        BinaryOperator::And => Value::Boolean(boolean(left)? && boolean(right)?),
        BinaryOperator::Or => Value::Boolean(boolean(left)? || boolean(right)?),
        _ => {
            let left = number(left)?;
            let right = number(right)?;
            match op {
                BinaryOperator::Add | BinaryOperator::Subtract => {
                    same_unit(&left, &right)?;
                    let amount = if op == BinaryOperator::Add {
                        left.amount + right.amount
                    } else {
                        left.amount - right.amount
                    };
                    Value::measure(amount, left.unit)
                }
                BinaryOperator::Less => {
                    same_unit(&left, &right)?;
                    Value::Boolean(left.amount < right.amount)
                }
                BinaryOperator::Greater => {
                    same_unit(&left, &right)?;
                    Value::Boolean(left.amount > right.amount)
                }
                BinaryOperator::Multiply => {
                    let unit = left
                        .unit
                        .product(&right.unit)
                        .ok_or_else(|| overflow(&left.unit))?;
                    Value::measure(left.amount * right.amount, unit)
                }
                BinaryOperator::Divide => {
                    let unit = left
                        .unit
                        .quotient(&right.unit)
                        .ok_or_else(|| overflow(&left.unit))?;
                    Value::measure(left.amount / right.amount, unit)
                }
                _ => Value::Number(power(left, &right)?),
            }
        }
    })
}

/// `operator operand`
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperation {
    pub id: NodeId,
    pub operator: Token,
    pub op: UnaryOperator,
    pub operand: Expr,
}

impl Node for UnaryOperation {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![NodeRef::Token(&self.operator), NodeRef::Expr(&self.operand)]
    }
}

impl Replace for UnaryOperation {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        Self {
            id: self.id,
            operator: self.operator.replace(target, with),
            op: self.op,
            operand: self.operand.replace(target, with),
        }
    }
}

impl Expression for UnaryOperation {
    fn conflicts(&self, ctx: &Context) -> Vec<Conflict> {
        let ty = ctx.type_of(&self.operand);
        if ty.is_unknown() {
            return Vec::new();
        }
        let expected = match self.op {
            UnaryOperator::Negate => any_number(),
            UnaryOperator::Not => Type::Boolean,
        };
        if expected.accepts(&ty, ctx) {
            Vec::new()
        } else {
            vec![incompatible(self.op.symbol(), expected, ty, self.operand.id())]
        }
    }

    fn compute_type(self: &Rc<Self>, ctx: &Context) -> Type {
        match self.op {
            UnaryOperator::Not => Type::Boolean,
            UnaryOperator::Negate => match ctx.type_of(&self.operand) {
                operand @ Type::Number(_) => {
                    Type::Number(NumberType::derived(UnitOp::Same, operand, None, None))
                }
                _ => any_number(),
            },
        }
    }

    fn lower(self: &Rc<Self>, ctx: &Context) -> Instructions {
        let mut instructions = Instructions::new();
        instructions.push(start(self));
        instructions.append(self.operand.lower(ctx));
        instructions.push(finish(self));
        instructions
    }

    fn execute(self: &Rc<Self>, evaluator: &mut Evaluator<'_>) -> Option<Value> {
        let operand = pop_or_return!(evaluator);
        let result = match self.op {
            UnaryOperator::Negate => {
                number(operand).map(|number| Value::measure(-number.amount, number.unit))
            }
            UnaryOperator::Not => boolean(operand).map(|value| Value::Boolean(!value)),
        };
        Some(result.unwrap_or_else(|kind| {
            Value::Exception(evaluator.exception(kind).at(self.id))
        }))
    }
}
