//! Expressions: the closed set of evaluable forms.
//!
//! Every variant answers the same questions: its children, its conflicts, its
//! type, its lowered instructions, and what it does when its `Finish`
//! instruction executes. [`Expr`] dispatches these exhaustively.

/// Pops a value for the current frame, or returns the exception from
/// `execute`.
macro_rules! pop_or_return {
    ($evaluator:expr) => {
        match $evaluator.pop_value() {
            Ok($crate::values::Value::Exception(exception)) | Err(exception) => {
                return Some($crate::values::Value::Exception(exception));
            }
            Ok(value) => value,
        }
    };
}

mod block;
mod builder;
mod conditional;
mod definition;
mod delete;
mod evaluate;
mod list;
mod literal;
mod operation;
mod reference;
mod text;
mod unparsable;

pub use block::Block;
pub use conditional::Conditional;
pub use definition::{FunctionDefinition, StructureDefinition};
pub use delete::{Delete, Insert};
pub use evaluate::Evaluate;
pub use list::ListLiteral;
pub use literal::{BooleanLiteral, NumberLiteral};
pub use operation::{BinaryOperation, BinaryOperator, UnaryOperation, UnaryOperator};
pub use reference::{Access, Reference};
pub use text::{CLOSING_QUOTES, TextLiteral};
pub use unparsable::Unparsable;

use crate::conflict::Conflict;
use crate::context::Context;
use crate::node::{Bind, Node, NodeId, NodeRef, Replace, Replacement};
use crate::types::Type;
use crate::values::Value;
use crate::vm::{Evaluator, Instruction, Instructions};
use crate::{Rc, Vec, format};
use ecow::EcoString;

/// The per-variant behavior behind [`Expr`].
pub trait Expression: Node {
    fn conflicts(&self, ctx: &Context) -> Vec<Conflict>;

    /// The type of this expression; callers go through [`Context::type_of`],
    /// which memoizes and guards against cycles.
    fn compute_type(self: &Rc<Self>, ctx: &Context) -> Type;

    fn lower(self: &Rc<Self>, ctx: &Context) -> Instructions;

    /// Runs when this expression's `Finish` instruction executes. Returns
    /// the value to push, or `None` when a new frame will produce it.
    fn execute(self: &Rc<Self>, evaluator: &mut Evaluator<'_>) -> Option<Value>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Boolean(Rc<BooleanLiteral>),
    Number(Rc<NumberLiteral>),
    Text(Rc<TextLiteral>),
    List(Rc<ListLiteral>),
    Conditional(Rc<Conditional>),
    Evaluate(Rc<Evaluate>),
    Delete(Rc<Delete>),
    Insert(Rc<Insert>),
    Reference(Rc<Reference>),
    Access(Rc<Access>),
    Binary(Rc<BinaryOperation>),
    Unary(Rc<UnaryOperation>),
    Function(Rc<FunctionDefinition>),
    Structure(Rc<StructureDefinition>),
    Block(Rc<Block>),
    Bind(Rc<Bind>),
    Unparsable(Rc<Unparsable>),
}

macro_rules! dispatch {
    ($expr:expr, $node:ident => $body:expr) => {
        match $expr {
            Expr::Boolean($node) => $body,
            Expr::Number($node) => $body,
            Expr::Text($node) => $body,
            Expr::List($node) => $body,
            Expr::Conditional($node) => $body,
            Expr::Evaluate($node) => $body,
            Expr::Delete($node) => $body,
            Expr::Insert($node) => $body,
            Expr::Reference($node) => $body,
            Expr::Access($node) => $body,
            Expr::Binary($node) => $body,
            Expr::Unary($node) => $body,
            Expr::Function($node) => $body,
            Expr::Structure($node) => $body,
            Expr::Block($node) => $body,
            Expr::Bind($node) => $body,
            Expr::Unparsable($node) => $body,
        }
    };
}

macro_rules! impl_from_variant {
    ($($variant:ident($node:ty)),* $(,)?) => {
        $(
            impl From<Rc<$node>> for Expr {
                fn from(node: Rc<$node>) -> Self {
                    Expr::$variant(node)
                }
            }

            impl From<$node> for Expr {
                fn from(node: $node) -> Self {
                    Expr::$variant(Rc::new(node))
                }
            }
        )*
    };
}

impl_from_variant! {
    Boolean(BooleanLiteral),
    Number(NumberLiteral),
    Text(TextLiteral),
    List(ListLiteral),
    Conditional(Conditional),
    Evaluate(Evaluate),
    Delete(Delete),
    Insert(Insert),
    Reference(Reference),
    Access(Access),
    Binary(BinaryOperation),
    Unary(UnaryOperation),
    Function(FunctionDefinition),
    Structure(StructureDefinition),
    Block(Block),
    Bind(Bind),
    Unparsable(Unparsable),
}

impl Expr {
    pub fn id(&self) -> NodeId {
        dispatch!(self, node => Node::id(node.as_ref()))
    }

    pub fn children(&self) -> Vec<NodeRef<'_>> {
        dispatch!(self, node => Node::children(node.as_ref()))
    }

    pub fn conflicts(&self, ctx: &Context) -> Vec<Conflict> {
        dispatch!(self, node => Expression::conflicts(node.as_ref(), ctx))
    }

    /// Shorthand for [`Context::type_of`].
    pub fn ty(&self, ctx: &Context) -> Type {
        ctx.type_of(self)
    }

    pub(crate) fn compute_type(&self, ctx: &Context) -> Type {
        dispatch!(self, node => Expression::compute_type(node, ctx))
    }

    pub fn lower(&self, ctx: &Context) -> Instructions {
        dispatch!(self, node => Expression::lower(node, ctx))
    }

    pub fn execute(&self, evaluator: &mut Evaluator<'_>) -> Option<Value> {
        dispatch!(self, node => Expression::execute(node, evaluator))
    }

    pub fn is_unparsable(&self) -> bool {
        matches!(self, Expr::Unparsable(_))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Boolean(_) => "Boolean",
            Expr::Number(_) => "Number",
            Expr::Text(_) => "Text",
            Expr::List(_) => "List",
            Expr::Conditional(_) => "Conditional",
            Expr::Evaluate(_) => "Evaluate",
            Expr::Delete(_) => "Delete",
            Expr::Insert(_) => "Insert",
            Expr::Reference(_) => "Reference",
            Expr::Access(_) => "Access",
            Expr::Binary(_) => "Binary",
            Expr::Unary(_) => "Unary",
            Expr::Function(_) => "Function",
            Expr::Structure(_) => "Structure",
            Expr::Block(_) => "Block",
            Expr::Bind(_) => "Bind",
            Expr::Unparsable(_) => "Unparsable",
        }
    }

    /// A short rendering for messages, like `cat.name` or `ƒ double`.
    pub fn describe(&self) -> EcoString {
        match self {
            Expr::Reference(reference) => reference.name().into(),
            Expr::Access(access) => {
                format!("{}.{}", access.subject.describe(), access.name()).into()
            }
            Expr::Function(function) => format!("ƒ {}", function.name()).into(),
            Expr::Structure(structure) => format!("•{}", structure.name()).into(),
            Expr::Text(text) => text.text.text.clone(),
            Expr::Number(number) => number.token.text.clone(),
            Expr::Boolean(boolean) => boolean.token.text.clone(),
            other => other.kind_name().into(),
        }
    }
}

impl Node for Expr {
    fn id(&self) -> NodeId {
        Expr::id(self)
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        Expr::children(self)
    }
}

impl Replace for Expr {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        match with {
            Replacement::Expr(expr) if self.id() == target => return expr.clone(),
            _ => {}
        }
        dispatch!(self, node => Expr::from(node.as_ref().replace(target, with)))
    }
}

pub(crate) fn start<T>(node: &Rc<T>) -> Instruction
where
    Expr: From<Rc<T>>,
{
    Instruction::Start(Expr::from(node.clone()))
}

pub(crate) fn finish<T>(node: &Rc<T>) -> Instruction
where
    Expr: From<Rc<T>>,
{
    Instruction::Finish(Expr::from(node.clone()))
}
