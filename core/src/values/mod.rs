//! Runtime values.

mod exception;
mod scope;

pub use exception::{Exception, ExceptionKind};
pub use scope::Scope;

use crate::expr::{FunctionDefinition, StructureDefinition};
use crate::types::Unit;
use crate::{Rc, Vec};
use core::fmt;
use ecow::EcoString;

/// The closed set of runtime results.
///
/// Exceptions are values too: they travel through the value stack like any
/// other result and end an evaluation when they reach the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Text(Text),
    Number(Number),
    List(Vec<Value>),
    Function(FunctionValue),
    StructureDefinition(StructureDefinitionValue),
    Structure(StructureValue),
    Exception(Exception),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub text: EcoString,
    pub language: Option<EcoString>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    pub amount: f64,
    pub unit: Unit,
}

/// A function closed over the scope it was defined in.
#[derive(Clone)]
pub struct FunctionValue {
    pub definition: Rc<FunctionDefinition>,
    pub scope: Rc<Scope>,
}

#[derive(Clone)]
pub struct StructureDefinitionValue {
    pub definition: Rc<StructureDefinition>,
    pub scope: Rc<Scope>,
}

/// An instance of a structure: its inputs and block binds live in `scope`.
#[derive(Clone)]
pub struct StructureValue {
    pub definition: Rc<StructureDefinition>,
    pub scope: Rc<Scope>,
}

impl Value {
    pub fn number(amount: f64) -> Value {
        Value::Number(Number {
            amount,
            unit: Unit::empty(),
        })
    }

    pub fn measure(amount: f64, unit: Unit) -> Value {
        Value::Number(Number { amount, unit })
    }

    pub fn text(text: impl Into<EcoString>) -> Value {
        Value::Text(Text {
            text: text.into(),
            language: None,
        })
    }

    pub fn is_exception(&self) -> bool {
        matches!(self, Value::Exception(_))
    }

    /// A short description of the value's kind, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::List(_) => "list",
            Value::Function(_) => "function",
            Value::StructureDefinition(_) => "structure definition",
            Value::Structure(_) => "structure",
            Value::Exception(_) => "exception",
        }
    }
}

impl From<Exception> for Value {
    fn from(exception: Exception) -> Self {
        Value::Exception(exception)
    }
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.definition, &other.definition) && Rc::ptr_eq(&self.scope, &other.scope)
    }
}

impl PartialEq for StructureDefinitionValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.definition, &other.definition) && Rc::ptr_eq(&self.scope, &other.scope)
    }
}

impl PartialEq for StructureValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.definition, &other.definition) && Rc::ptr_eq(&self.scope, &other.scope)
    }
}

// Scopes can hold the value itself, so Debug stays shallow.
impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("name", &self.definition.name())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for StructureDefinitionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructureDefinitionValue")
            .field("name", &self.definition.name())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for StructureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructureValue")
            .field("name", &self.definition.name())
            .field("scope", &self.scope)
            .finish()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(true) => write!(f, "⊤"),
            Value::Boolean(false) => write!(f, "⊥"),
            Value::Text(text) => write!(f, "\"{}\"", text.text),
            Value::Number(number) => write!(f, "{}{}", number.amount, number.unit),
            Value::List(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Function(function) => write!(f, "ƒ {}", function.definition.name()),
            Value::StructureDefinition(structure) => {
                write!(f, "•{}", structure.definition.name())
            }
            Value::Structure(structure) => {
                write!(f, "{}(", structure.definition.name())?;
                for (index, input) in structure.definition.inputs.iter().enumerate() {
                    if index > 0 {
                        write!(f, " ")?;
                    }
                    let name = input.primary_name();
                    match structure.scope.lookup(name) {
                        Some(value) => write!(f, "{name}: {value}")?,
                        None => write!(f, "{name}")?,
                    }
                }
                write!(f, ")")
            }
            Value::Exception(exception) => write!(f, "!{exception}"),
        }
    }
}
