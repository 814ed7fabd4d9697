//! Static findings about a program tree.
//!
//! Conflicts are derived data: they never change the tree and can be
//! recomputed at any time. Explanation text lives outside this crate; each
//! implicated role carries a locale-neutral key instead.

use crate::api::{Diagnostic, RelatedInfo, Severity};
use crate::context::Context;
use crate::expr::Expr;
use crate::node::{Node, NodeId, NodeRef};
use crate::types::Type;
use crate::{String, ToString, Vec, format};
use core::fmt;
use ecow::EcoString;
use smallvec::SmallVec;

/// The kinds of static problems analysis can find.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictKind {
    /// The callee of an evaluation is neither a function nor a structure.
    NotCallable { ty: Type },
    /// The structure declares functions without bodies.
    NotInstantiable {
        structure: EcoString,
        abstract_functions: Vec<EcoString>,
    },
    MissingInput { name: EcoString },
    /// A named argument in a required position names a different input.
    UnexpectedInput { expected: EcoString, given: EcoString },
    /// Arguments left over after every input was matched.
    UnexpectedInputs { count: usize },
    IncompatibleInput {
        name: EcoString,
        expected: Type,
        given: Type,
    },
    NotATable { ty: Type },
    NonBooleanQuery { ty: Type },
    DuplicateLanguages { languages: Vec<EcoString> },
    UnknownColumn { name: EcoString },
    IncompatibleCell {
        name: EcoString,
        expected: Type,
        given: Type,
    },
    ExpectedBooleanCondition { ty: Type },
    IncompatibleBranches { yes: Type, no: Type },
    UnknownName { name: EcoString },
    IncompatibleOperand {
        operator: EcoString,
        expected: Type,
        given: Type,
    },
    RequiredAfterOptional { name: EcoString },
    VariableLengthNotLast { name: EcoString },
}

macro_rules! conflict_table {
    ($($variant:ident => $code:literal),* $(,)?) => {
        impl ConflictKind {
            /// The variant name, stable across releases.
            pub fn name(&self) -> &'static str {
                match self {
                    $(ConflictKind::$variant { .. } => stringify!($variant),)*
                }
            }

            pub fn code(&self) -> &'static str {
                match self {
                    $(ConflictKind::$variant { .. } => $code,)*
                }
            }

            pub fn primary_key(&self) -> &'static str {
                match self {
                    $(ConflictKind::$variant { .. } => concat!("conflict.", stringify!($variant), ".primary"),)*
                }
            }

            pub fn secondary_key(&self) -> &'static str {
                match self {
                    $(ConflictKind::$variant { .. } => concat!("conflict.", stringify!($variant), ".secondary"),)*
                }
            }
        }
    };
}

conflict_table! {
    NotCallable => "C001",
    NotInstantiable => "C002",
    MissingInput => "C003",
    UnexpectedInput => "C004",
    UnexpectedInputs => "C005",
    IncompatibleInput => "C006",
    NotATable => "C007",
    NonBooleanQuery => "C008",
    DuplicateLanguages => "C009",
    UnknownColumn => "C010",
    IncompatibleCell => "C011",
    ExpectedBooleanCondition => "C012",
    IncompatibleBranches => "C013",
    UnknownName => "C014",
    IncompatibleOperand => "C015",
    RequiredAfterOptional => "C016",
    VariableLengthNotLast => "C017",
}

/// The nodes playing one role in a conflict, and the key that explains it.
#[derive(Debug, Clone, PartialEq)]
pub struct Implicated {
    pub nodes: SmallVec<[NodeId; 2]>,
    pub explanation: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub primary: Implicated,
    pub secondary: Option<Implicated>,
    /// Minor conflicts are advisory and never block evaluation.
    pub minor: bool,
}

impl Conflict {
    pub fn new(kind: ConflictKind, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        let explanation = kind.primary_key();
        Self {
            kind,
            primary: Implicated {
                nodes: nodes.into_iter().collect(),
                explanation,
            },
            secondary: None,
            minor: false,
        }
    }

    pub fn with_secondary(mut self, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        self.secondary = Some(Implicated {
            nodes: nodes.into_iter().collect(),
            explanation: self.kind.secondary_key(),
        });
        self
    }

    pub fn minor(mut self) -> Self {
        self.minor = true;
        self
    }

    pub fn is_minor(&self) -> bool {
        self.minor
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Every implicated node, primary first.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.primary
            .nodes
            .iter()
            .chain(self.secondary.iter().flat_map(|secondary| secondary.nodes.iter()))
            .copied()
    }

    pub fn implicates(&self, node: NodeId) -> bool {
        self.nodes().any(|id| id == node)
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (message, help) = match &self.kind {
            ConflictKind::NotCallable { ty } => (
                format!("A value of type {ty} cannot be evaluated"),
                Some("Only functions and structures can be evaluated"),
            ),
            ConflictKind::NotInstantiable {
                structure,
                abstract_functions,
            } => (
                format!(
                    "{structure} cannot be created because {} have no body",
                    abstract_functions.join(", ")
                ),
                Some("Define a structure that implements these functions"),
            ),
            ConflictKind::MissingInput { name } => (format!("Expected an input for {name}"), None),
            ConflictKind::UnexpectedInput { expected, given } => (
                format!("Expected an input for {expected}, but was given {given}"),
                None,
            ),
            ConflictKind::UnexpectedInputs { count } => (
                format!("{count} more inputs than expected"),
                Some("Remove the extra inputs"),
            ),
            ConflictKind::IncompatibleInput {
                name,
                expected,
                given,
            } => (format!("{name} expects {expected}, but was given {given}"), None),
            ConflictKind::NotATable { ty } => (format!("Expected a table, found {ty}"), None),
            ConflictKind::NonBooleanQuery { ty } => (
                format!("Table queries must be ?, found {ty}"),
                None,
            ),
            ConflictKind::DuplicateLanguages { languages } => (
                format!("More than one name for {}", languages.join(", ")),
                Some("Give each language a single name"),
            ),
            ConflictKind::UnknownColumn { name } => {
                (format!("The table has no column named {name}"), None)
            }
            ConflictKind::IncompatibleCell {
                name,
                expected,
                given,
            } => (format!("Column {name} holds {expected}, but was given {given}"), None),
            ConflictKind::ExpectedBooleanCondition { ty } => {
                (format!("Conditions must be ?, found {ty}"), None)
            }
            ConflictKind::IncompatibleBranches { yes, no } => (
                format!("The branches have different types, {yes} and {no}"),
                None,
            ),
            ConflictKind::UnknownName { name } => (
                format!("{name} is not defined"),
                Some("Make sure the name is declared before use"),
            ),
            ConflictKind::IncompatibleOperand {
                operator,
                expected,
                given,
            } => (format!("{operator} expects {expected}, found {given}"), None),
            ConflictKind::RequiredAfterOptional { name } => (
                format!("Required input {name} comes after an optional one"),
                Some("Move required inputs before optional ones"),
            ),
            ConflictKind::VariableLengthNotLast { name } => (
                format!("Variable-length input {name} must be last"),
                None,
            ),
        };

        let related = match &self.secondary {
            Some(secondary) => Vec::from([RelatedInfo {
                nodes: secondary.nodes.to_vec(),
                message: secondary.explanation.to_string(),
            }]),
            None => Vec::new(),
        };

        Diagnostic {
            severity: if self.minor {
                Severity::Warning
            } else {
                Severity::Error
            },
            message,
            nodes: self.primary.nodes.to_vec(),
            related,
            help: help.map(String::from),
            code: Some(self.code().to_string()),
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diagnostic = self.to_diagnostic();
        write!(f, "{}: {} [{}]", diagnostic.severity, diagnostic.message, self.code())
    }
}

/// Every conflict in the tree rooted at `root`, in pre-order.
pub fn analyze(root: &Expr, ctx: &Context) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    analyze_expr(root, ctx, &mut conflicts);
    conflicts
}

fn analyze_expr(expr: &Expr, ctx: &Context, out: &mut Vec<Conflict>) {
    out.extend(expr.conflicts(ctx));
    match expr {
        // Queries see the table's columns as names.
        Expr::Delete(delete) => {
            analyze_expr(&delete.table, ctx, out);
            let query_context = delete.query_context(ctx);
            analyze_expr(&delete.query, &query_context, out);
        }
        _ => {
            for child in expr.children() {
                analyze_node(child, ctx, out);
            }
        }
    }
}

fn analyze_node(node: NodeRef<'_>, ctx: &Context, out: &mut Vec<Conflict>) {
    match node {
        NodeRef::Expr(expr) => analyze_expr(expr, ctx, out),
        NodeRef::Bind(bind) => {
            out.extend(bind.conflicts(ctx));
            for child in bind.children() {
                analyze_node(child, ctx, out);
            }
        }
        other => {
            for child in other.children() {
                analyze_node(child, ctx, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec;
    use pretty_assertions::assert_eq;

    #[test]
    fn codes_and_keys() {
        let conflict = Conflict::new(
            ConflictKind::MissingInput { name: "a".into() },
            [NodeId::fresh()],
        );
        assert_eq!(conflict.name(), "MissingInput");
        assert_eq!(conflict.code(), "C003");
        assert_eq!(conflict.primary.explanation, "conflict.MissingInput.primary");
        assert!(conflict.secondary.is_none());
    }

    #[test]
    fn secondary_nodes_are_implicated() {
        let primary = NodeId::fresh();
        let secondary = NodeId::fresh();
        let conflict = Conflict::new(ConflictKind::UnexpectedInputs { count: 1 }, [primary])
            .with_secondary([secondary]);

        assert!(conflict.implicates(primary));
        assert!(conflict.implicates(secondary));
        assert_eq!(conflict.nodes().collect::<Vec<_>>(), vec![primary, secondary]);
        assert_eq!(
            conflict.secondary.as_ref().map(|s| s.explanation),
            Some("conflict.UnexpectedInputs.secondary")
        );
    }

    #[test]
    fn to_diagnostic() {
        let node = NodeId::fresh();
        let diagnostic = Conflict::new(ConflictKind::UnknownName { name: "x".into() }, [node])
            .to_diagnostic();

        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.message, "x is not defined");
        assert_eq!(diagnostic.code.as_deref(), Some("C014"));
        assert_eq!(diagnostic.nodes, vec![node]);
    }

    #[test]
    fn analyze_walks_into_inputs() {
        use crate::context::Lexicon;
        use crate::expr::FunctionDefinition;
        use crate::node::{Bind, Name};

        // ƒ f(a/fr,b/fr: missing) 1
        let input = Bind::named("a")
            .with_alias(Name::localized("a", "fr"))
            .with_alias(Name::localized("b", "fr"))
            .with_value(Expr::reference("missing"));
        let localized = [input.names[1].id, input.names[2].id];
        let root = Expr::function(
            FunctionDefinition::new("f")
                .with_input(input)
                .with_body(Expr::number(1.0)),
        );
        let lexicon = Lexicon::collect(&root);
        let ctx = Context::new(&lexicon);

        let conflicts = analyze(&root, &ctx);
        let names: Vec<_> = conflicts.iter().map(Conflict::name).collect();
        assert_eq!(names, vec!["DuplicateLanguages", "UnknownName"]);
        assert!(localized.iter().all(|id| conflicts[0].implicates(*id)));
    }
}
