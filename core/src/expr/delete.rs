use super::{Expr, Expression, finish, start};
use crate::conflict::{Conflict, ConflictKind};
use crate::context::{Context, Definition};
use crate::node::{Bind, Node, NodeId, NodeRef, Replace, Replacement, Token};
use crate::types::{TableType, Type};
use crate::values::{ExceptionKind, Value};
use crate::vm::{Evaluator, Halt, HaltKind, Instruction, Instructions};
use crate::{Rc, Vec, vec};
use ecow::EcoString;

fn table_type(table: &Expr, ctx: &Context) -> Option<TableType> {
    match ctx.type_of(table).resolve_names(ctx) {
        Type::Table(table) => Some(table),
        _ => None,
    }
}

/// Reports a table operand that is not a table. Unknown operands were
/// already reported where they came from.
fn not_a_table(table: &Expr, ctx: &Context) -> Option<Conflict> {
    if table.is_unparsable() {
        return None;
    }
    match ctx.type_of(table).resolve_names(ctx) {
        Type::Table(_) | Type::Unknown(_) => None,
        ty => Some(Conflict::new(ConflictKind::NotATable { ty }, [table.id()])),
    }
}

/// `table ⌫ query`: the rows of a table for which the query is false.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub id: NodeId,
    pub table: Expr,
    pub del: Token,
    pub query: Expr,
}

impl Delete {
    /// A context in which the table's column names resolve, for the query.
    pub fn query_context<'s>(&self, ctx: &'s Context<'_>) -> Context<'s> {
        let columns = table_type(&self.table, ctx)
            .map(|table| table.columns)
            .unwrap_or_default();
        ctx.scoped(columns.into_iter().flat_map(|column| {
            let names: Vec<EcoString> = column.names().map(EcoString::from).collect();
            names
                .into_iter()
                .map(move |name| (name, Definition::Bind(column.clone())))
        }))
    }
}

impl Node for Delete {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![
            NodeRef::Expr(&self.table),
            NodeRef::Token(&self.del),
            NodeRef::Expr(&self.query),
        ]
    }
}

impl Replace for Delete {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        Self {
            id: self.id,
            table: self.table.replace(target, with),
            del: self.del.replace(target, with),
            query: self.query.replace(target, with),
        }
    }
}

impl Expression for Delete {
    fn conflicts(&self, ctx: &Context) -> Vec<Conflict> {
        let mut conflicts: Vec<Conflict> = not_a_table(&self.table, ctx).into_iter().collect();

        let query_context = self.query_context(ctx);
        let query = query_context.type_of(&self.query);
        if !query.is_unknown() && !Type::Boolean.accepts(&query, &query_context) {
            conflicts.push(Conflict::new(
                ConflictKind::NonBooleanQuery { ty: query },
                [self.query.id()],
            ));
        }

        conflicts
    }

    /// Same columns as the table.
    fn compute_type(self: &Rc<Self>, ctx: &Context) -> Type {
        ctx.type_of(&self.table)
    }

    fn lower(self: &Rc<Self>, ctx: &Context) -> Instructions {
        let mut instructions = Instructions::new();
        instructions.push(start(self));
        instructions.append(self.table.lower(ctx));
        instructions.push(finish(self));
        instructions
    }

    // Tables have no runtime representation yet.
    fn execute(self: &Rc<Self>, evaluator: &mut Evaluator<'_>) -> Option<Value> {
        let _table = pop_or_return!(evaluator);
        Some(Value::Exception(
            evaluator.exception(ExceptionKind::NotImplemented).at(self.id),
        ))
    }
}

/// `table + cells`: a table with one more row.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub id: NodeId,
    pub table: Expr,
    pub insert: Token,
    /// One named value per column.
    pub cells: Vec<Bind>,
}

impl Node for Insert {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        let mut children = vec![NodeRef::Expr(&self.table), NodeRef::Token(&self.insert)];
        children.extend(self.cells.iter().map(NodeRef::Bind));
        children
    }
}

impl Replace for Insert {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        Self {
            id: self.id,
            table: self.table.replace(target, with),
            insert: self.insert.replace(target, with),
            cells: self.cells.replace(target, with),
        }
    }
}

impl Expression for Insert {
    fn conflicts(&self, ctx: &Context) -> Vec<Conflict> {
        let mut conflicts: Vec<Conflict> = not_a_table(&self.table, ctx).into_iter().collect();
        let Some(table) = table_type(&self.table, ctx) else {
            return conflicts;
        };

        for cell in &self.cells {
            let Some(column) = table.columns.iter().find(|column| column.shares_name(cell)) else {
                conflicts.push(Conflict::new(
                    ConflictKind::UnknownColumn {
                        name: cell.primary_name().into(),
                    },
                    [cell.id],
                ));
                continue;
            };
            let Some(value) = &cell.value else {
                continue;
            };
            if value.is_unparsable() {
                continue;
            }
            let expected = column.ty(ctx);
            let given = ctx.type_of(value);
            if !given.is_unknown() && !expected.accepts(&given, ctx) {
                conflicts.push(
                    Conflict::new(
                        ConflictKind::IncompatibleCell {
                            name: cell.primary_name().into(),
                            expected,
                            given,
                        },
                        [value.id()],
                    )
                    .with_secondary([column.id]),
                );
            }
        }

        conflicts
    }

    fn compute_type(self: &Rc<Self>, ctx: &Context) -> Type {
        ctx.type_of(&self.table)
    }

    fn lower(self: &Rc<Self>, ctx: &Context) -> Instructions {
        let mut instructions = Instructions::new();
        instructions.push(start(self));
        instructions.append(self.table.lower(ctx));
        for cell in &self.cells {
            match &cell.value {
                Some(value) => instructions.append(value.lower(ctx)),
                None => instructions.push(Instruction::Halt(Halt::new(
                    cell.id,
                    HaltKind::MissingValue {
                        name: cell.primary_name().into(),
                    },
                ))),
            }
        }
        instructions.push(finish(self));
        instructions
    }

    fn execute(self: &Rc<Self>, evaluator: &mut Evaluator<'_>) -> Option<Value> {
        Some(Value::Exception(
            evaluator.exception(ExceptionKind::NotImplemented).at(self.id),
        ))
    }
}
