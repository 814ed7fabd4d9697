use super::{Expression, finish};
use crate::conflict::Conflict;
use crate::context::Context;
use crate::node::{Language, Node, NodeId, NodeRef, Replace, Replacement, Token};
use crate::types::{TextType, Type};
use crate::values::{Text, Value};
use crate::vm::{Evaluator, Instructions};
use crate::{Rc, Vec, vec};

/// Glyphs that may close a text literal.
pub const CLOSING_QUOTES: [char; 8] = ['』', '」', '»', '›', '\'', '’', '”', '"'];

/// A quoted text literal. The token keeps its quotes; the opening quote is
/// always dropped, and the last character is dropped when it closes.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLiteral {
    pub id: NodeId,
    pub text: Token,
    pub language: Option<Language>,
}

impl TextLiteral {
    /// The text without its quotes.
    pub fn unquoted(&self) -> &str {
        let text = self.text.text();
        let mut chars = text.chars();
        let Some(first) = chars.next() else {
            return "";
        };
        let rest = chars.as_str();
        // A lone closing glyph is both the opening and the closing quote;
        // it is kept as written.
        if rest.is_empty() && CLOSING_QUOTES.contains(&first) {
            return text;
        }
        match rest.chars().next_back() {
            Some(last) if CLOSING_QUOTES.contains(&last) => &rest[..rest.len() - last.len_utf8()],
            _ => rest,
        }
    }
}

impl Node for TextLiteral {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        let mut children = vec![NodeRef::Token(&self.text)];
        if let Some(language) = &self.language {
            children.push(NodeRef::Language(language));
        }
        children
    }
}

impl Replace for TextLiteral {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        Self {
            id: self.id,
            text: self.text.replace(target, with),
            language: self.language.replace(target, with),
        }
    }
}

impl Expression for TextLiteral {
    fn conflicts(&self, _ctx: &Context) -> Vec<Conflict> {
        Vec::new()
    }

    fn compute_type(self: &Rc<Self>, _ctx: &Context) -> Type {
        Type::Text(TextType {
            language: self.language.as_ref().map(|language| language.code.clone()),
        })
    }

    fn lower(self: &Rc<Self>, _ctx: &Context) -> Instructions {
        Instructions::from(vec![finish(self)])
    }

    fn execute(self: &Rc<Self>, _evaluator: &mut Evaluator<'_>) -> Option<Value> {
        Some(Value::Text(Text {
            text: self.unquoted().into(),
            language: self.language.as_ref().map(|language| language.code.clone()),
        }))
    }
}
