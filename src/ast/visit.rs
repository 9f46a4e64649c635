//! Name-occurrence walker shared by every analysis.
//!
//! Each statement and expression kind is matched exhaustively, so adding a new
//! node kind to [`crate::ast`] fails to compile here until its reads and writes
//! are classified.
//!
//! Evaluation order is preserved: the value of an assignment is walked before its
//! targets, decorators and defaults before the name they bind. Consumers that care
//! about the first occurrence of a name within a block (see
//! [`crate::analysis::BlockUsage`]) rely on this.

use strum::{Display, EnumCount, EnumIter};

use crate::ast::{Arguments, Expr, ExprKind, Stmt, StmtKind};

/// How a name occurrence interacts with the local binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
pub enum NameAccess {
    /// The current value of the binding is read.
    Load,
    /// The binding is (re)established.
    Store,
}

/// Receives every name occurrence found by [`walk_stmt`], [`walk_expr`] and
/// [`walk_arguments`], in evaluation order.
pub trait NameVisitor {
    /// Called once per occurrence of `name`.
    fn visit_name(&mut self, name: &str, access: NameAccess);
}

/// Walks a statement, reporting the names it reads and binds.
///
/// Bodies of nested functions and classes are not entered.
///
/// # Panics
///
/// Panics if an assignment target is not a name, tuple, list, attribute or
/// subscript. Such a statement can not come out of a well-formed lowering.
pub fn walk_stmt<V: NameVisitor + ?Sized>(visitor: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Expr(value) => walk_expr(visitor, value),
        StmtKind::Assign { targets, value } => {
            walk_expr(visitor, value);
            for target in targets {
                walk_target(visitor, target);
            }
        }
        StmtKind::AugAssign { target, value, .. } => {
            // The target is read, combined with the value, then written back.
            walk_expr(visitor, target);
            walk_expr(visitor, value);
            walk_target(visitor, target);
        }
        StmtKind::Return(value) | StmtKind::Raise(value) => {
            if let Some(value) = value {
                walk_expr(visitor, value);
            }
        }
        StmtKind::Pass | StmtKind::Global(_) | StmtKind::Jump { .. } => {}
        StmtKind::Import(names) => {
            for alias in names {
                if let Some(bound) = alias.bound_name_for_import() {
                    visitor.visit_name(bound, NameAccess::Store);
                }
            }
        }
        StmtKind::ImportFrom { names, .. } => {
            for alias in names {
                if let Some(bound) = alias.bound_name_for_import_from() {
                    visitor.visit_name(bound, NameAccess::Store);
                }
            }
        }
        StmtKind::FunctionDef {
            name,
            args,
            decorators,
            ..
        } => {
            for decorator in decorators {
                walk_expr(visitor, decorator);
            }
            walk_defaults(visitor, args);
            visitor.visit_name(name, NameAccess::Store);
        }
        StmtKind::ClassDef {
            name,
            bases,
            decorators,
            ..
        } => {
            for decorator in decorators {
                walk_expr(visitor, decorator);
            }
            for base in bases {
                walk_expr(visitor, base);
            }
            visitor.visit_name(name, NameAccess::Store);
        }
        StmtKind::Assert { test, msg } => {
            walk_expr(visitor, test);
            if let Some(msg) = msg {
                walk_expr(visitor, msg);
            }
        }
        StmtKind::Print { dest, values } => {
            if let Some(dest) = dest {
                walk_expr(visitor, dest);
            }
            for value in values {
                walk_expr(visitor, value);
            }
        }
        StmtKind::Branch { test, .. } => walk_expr(visitor, test),
    }
}

/// Walks an expression in load context.
///
/// # Panics
///
/// Panics if a dict literal has a different number of keys and values.
pub fn walk_expr<V: NameVisitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::None => {}
        ExprKind::Name(id) => visitor.visit_name(id, NameAccess::Load),
        ExprKind::Tuple(elts) | ExprKind::List(elts) => {
            for elt in elts {
                walk_expr(visitor, elt);
            }
        }
        ExprKind::Dict { keys, values } => {
            assert_eq!(
                keys.len(),
                values.len(),
                "Dict with {} keys and {} values",
                keys.len(),
                values.len()
            );
            for (key, value) in keys.iter().zip(values) {
                walk_expr(visitor, key);
                walk_expr(visitor, value);
            }
        }
        ExprKind::Attribute { value, .. } => walk_expr(visitor, value),
        ExprKind::Subscript { value, index } => {
            walk_expr(visitor, value);
            walk_expr(visitor, index);
        }
        ExprKind::BinOp { left, right, .. } => {
            walk_expr(visitor, left);
            walk_expr(visitor, right);
        }
        ExprKind::UnaryOp { operand, .. } => walk_expr(visitor, operand),
        ExprKind::BoolOp { values, .. } => {
            for value in values {
                walk_expr(visitor, value);
            }
        }
        ExprKind::Compare {
            left, comparators, ..
        } => {
            walk_expr(visitor, left);
            for comparator in comparators {
                walk_expr(visitor, comparator);
            }
        }
        ExprKind::Call {
            func,
            args,
            keywords,
        } => {
            walk_expr(visitor, func);
            for arg in args {
                walk_expr(visitor, arg);
            }
            for keyword in keywords {
                walk_expr(visitor, &keyword.value);
            }
        }
        ExprKind::IfExp { test, body, orelse } => {
            walk_expr(visitor, test);
            walk_expr(visitor, body);
            walk_expr(visitor, orelse);
        }
        ExprKind::Lambda { args, .. } => walk_defaults(visitor, args),
    }
}

/// Reports every formal parameter as a [`NameAccess::Store`].
///
/// Used at function entry, where the caller has bound all parameters.
pub fn walk_arguments<V: NameVisitor + ?Sized>(visitor: &mut V, args: &Arguments) {
    for name in args.names() {
        visitor.visit_name(name, NameAccess::Store);
    }
}

fn walk_defaults<V: NameVisitor + ?Sized>(visitor: &mut V, args: &Arguments) {
    for default in &args.defaults {
        walk_expr(visitor, default);
    }
}

/// Walks an expression in store context.
///
/// Attribute and subscript targets mutate an existing object; their base and index
/// are only read and no local name is bound.
fn walk_target<V: NameVisitor + ?Sized>(visitor: &mut V, target: &Expr) {
    match &target.kind {
        ExprKind::Name(id) => visitor.visit_name(id, NameAccess::Store),
        ExprKind::Tuple(elts) | ExprKind::List(elts) => {
            for elt in elts {
                walk_target(visitor, elt);
            }
        }
        ExprKind::Attribute { value, .. } => walk_expr(visitor, value),
        ExprKind::Subscript { value, index } => {
            walk_expr(visitor, value);
            walk_expr(visitor, index);
        }
        other => panic!("Unknown assignment target for name walker: {other:?}"),
    }
}
