//! Statement and expression model for basic block bodies.
//!
//! The CFG-construction stage lowers a function body into basic blocks whose
//! statements are expressed with the types in this module. Compound control flow
//! (`if`, `while`, `for`, `try`) has already been broken up into blocks joined by
//! [`StmtKind::Branch`] and [`StmtKind::Jump`] terminators, so only straight-line
//! statements remain.
//!
//! Nested scopes (`def`, `class`, `lambda`) keep their bodies attached to the
//! defining node. Those bodies are analysed as separate functions with their own
//! graphs; the enclosing function only sees the binding of the defined name and
//! the expressions that evaluate in the enclosing scope (decorators, base
//! classes, parameter defaults).
//!
//! # Key Types
//!
//! - [`Stmt`] / [`StmtKind`] - Statements found in a block body
//! - [`Expr`] / [`ExprKind`] - Expressions
//! - [`Arguments`] - Formal parameter list of a function or lambda
//! - [`Alias`] - One `name as asname` clause of an import
//!
//! # Examples
//!
//! ```rust
//! use bindscope::ast::{Expr, Stmt};
//!
//! // x = y + 1
//! let stmt = Stmt::assign(Expr::name("x"), Expr::add(Expr::name("y"), Expr::int(1)));
//! assert!(stmt.is_binding());
//! ```

mod visit;

pub use visit::{walk_arguments, walk_expr, walk_stmt, NameAccess, NameVisitor};

use crate::cfg::BlockId;

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    /// The statement kind.
    pub kind: StmtKind,
}

/// Statement kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Expression statement.
    Expr(Box<Expr>),
    /// Assignment: `a = b = value`
    Assign {
        /// Assignment targets, bound left to right.
        targets: Vec<Expr>,
        /// Value being assigned.
        value: Box<Expr>,
    },
    /// Augmented assignment: `target += value`
    AugAssign {
        /// Target.
        target: Box<Expr>,
        /// Operator.
        op: BinOp,
        /// Value.
        value: Box<Expr>,
    },
    /// Return statement.
    Return(Option<Box<Expr>>),
    /// Pass statement.
    Pass,
    /// Global declaration.
    Global(Vec<String>),
    /// Import statement: `import a.b as c, d`
    Import(Vec<Alias>),
    /// From import: `from m import a as b`
    ImportFrom {
        /// Module path.
        module: String,
        /// Imported names.
        names: Vec<Alias>,
    },
    /// Function definition.
    FunctionDef {
        /// Function name.
        name: String,
        /// Formal parameters.
        args: Box<Arguments>,
        /// Decorators, applied in the enclosing scope.
        decorators: Vec<Expr>,
        /// Function body (a separate scope).
        body: Vec<Stmt>,
    },
    /// Class definition.
    ClassDef {
        /// Class name.
        name: String,
        /// Base classes.
        bases: Vec<Expr>,
        /// Decorators, applied in the enclosing scope.
        decorators: Vec<Expr>,
        /// Class body (a separate scope).
        body: Vec<Stmt>,
    },
    /// Raise statement.
    Raise(Option<Box<Expr>>),
    /// Assert statement.
    Assert {
        /// Test expression.
        test: Box<Expr>,
        /// Optional message.
        msg: Option<Box<Expr>>,
    },
    /// Print statement.
    Print {
        /// Optional destination stream (`print >>dest, ...`).
        dest: Option<Box<Expr>>,
        /// Printed values.
        values: Vec<Expr>,
    },
    /// Conditional block terminator.
    Branch {
        /// Condition.
        test: Box<Expr>,
        /// Block taken when the condition holds.
        if_true: BlockId,
        /// Block taken otherwise.
        if_false: BlockId,
    },
    /// Unconditional block terminator.
    Jump {
        /// Target block.
        target: BlockId,
    },
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// The expression kind.
    pub kind: ExprKind,
}

/// Expression kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    Str(String),
    /// Bool literal.
    Bool(bool),
    /// None literal.
    None,
    /// Identifier reference.
    Name(String),
    /// Tuple: `(a, b)`
    Tuple(Vec<Expr>),
    /// List: `[a, b]`
    List(Vec<Expr>),
    /// Dict: `{k: v}`
    Dict {
        /// Keys.
        keys: Vec<Expr>,
        /// Values.
        values: Vec<Expr>,
    },
    /// Attribute access: `value.attr`
    Attribute {
        /// Object.
        value: Box<Expr>,
        /// Attribute name.
        attr: String,
    },
    /// Subscript: `value[index]`
    Subscript {
        /// Container.
        value: Box<Expr>,
        /// Index.
        index: Box<Expr>,
    },
    /// Binary operation.
    BinOp {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: BinOp,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Unary operation.
    UnaryOp {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// Boolean operation: `a and b and c`
    BoolOp {
        /// Operator.
        op: BoolOp,
        /// Operands.
        values: Vec<Expr>,
    },
    /// Comparison chain: `a < b <= c`
    Compare {
        /// Leftmost operand.
        left: Box<Expr>,
        /// Operators.
        ops: Vec<CmpOp>,
        /// Remaining operands.
        comparators: Vec<Expr>,
    },
    /// Call: `func(args, key=value)`
    Call {
        /// Callee.
        func: Box<Expr>,
        /// Positional arguments.
        args: Vec<Expr>,
        /// Keyword arguments.
        keywords: Vec<Keyword>,
    },
    /// Conditional expression: `body if test else orelse`
    IfExp {
        /// Condition.
        test: Box<Expr>,
        /// Value when true.
        body: Box<Expr>,
        /// Value when false.
        orelse: Box<Expr>,
    },
    /// Lambda: `lambda args: body`
    Lambda {
        /// Formal parameters.
        args: Box<Arguments>,
        /// Body (a separate scope).
        body: Box<Expr>,
    },
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mult,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `**`
    Pow,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `not`
    Not,
    /// `-`
    USub,
}

/// Boolean operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    /// `and`
    And,
    /// `or`
    Or,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `in`
    In,
    /// `is`
    Is,
}

/// Function arguments specification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    /// Positional parameters.
    pub args: Vec<Arg>,
    /// `*args`.
    pub vararg: Option<Arg>,
    /// `**kwargs`.
    pub kwarg: Option<Arg>,
    /// Defaults for the trailing positional parameters.
    pub defaults: Vec<Expr>,
}

/// A single formal parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    /// Parameter name.
    pub name: String,
}

/// A keyword argument in a call.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    /// Argument name (None for `**kwargs`).
    pub arg: Option<String>,
    /// Value.
    pub value: Expr,
}

/// An import alias: `name as asname`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// Imported name, possibly dotted.
    pub name: String,
    /// Alias (optional).
    pub asname: Option<String>,
}

impl Alias {
    /// Creates an alias without a rename.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asname: None,
        }
    }

    /// Creates an alias with a rename.
    #[must_use]
    pub fn renamed(name: impl Into<String>, asname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asname: Some(asname.into()),
        }
    }

    /// Returns the local name bound by `import <alias>`.
    ///
    /// `import a.b` binds `a`; `import a.b as c` binds `c`. Returns `None` for
    /// the `*` of a star import, which binds nothing the analyses can track.
    #[must_use]
    pub fn bound_name_for_import(&self) -> Option<&str> {
        match &self.asname {
            Some(asname) => Some(asname),
            None => self.name.split('.').next().filter(|n| *n != "*"),
        }
    }

    /// Returns the local name bound by `from m import <alias>`.
    #[must_use]
    pub fn bound_name_for_import_from(&self) -> Option<&str> {
        match &self.asname {
            Some(asname) => Some(asname),
            None if self.name == "*" => None,
            None => Some(&self.name),
        }
    }
}

impl Arguments {
    /// Creates a parameter list of plain positional parameters.
    #[must_use]
    pub fn positional<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: names.into_iter().map(|name| Arg { name: name.into() }).collect(),
            ..Self::default()
        }
    }

    /// Sets the `*args` parameter.
    #[must_use]
    pub fn with_vararg(mut self, name: impl Into<String>) -> Self {
        self.vararg = Some(Arg { name: name.into() });
        self
    }

    /// Sets the `**kwargs` parameter.
    #[must_use]
    pub fn with_kwarg(mut self, name: impl Into<String>) -> Self {
        self.kwarg = Some(Arg { name: name.into() });
        self
    }

    /// Returns every parameter name in declaration order: positional, `*args`, `**kwargs`.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.args
            .iter()
            .chain(self.vararg.iter())
            .chain(self.kwarg.iter())
            .map(|arg| arg.name.as_str())
    }
}

impl Stmt {
    /// Create a new statement.
    #[must_use]
    pub fn new(kind: StmtKind) -> Self {
        Self { kind }
    }

    /// `target = value`
    #[must_use]
    pub fn assign(target: Expr, value: Expr) -> Self {
        Self::new(StmtKind::Assign {
            targets: vec![target],
            value: Box::new(value),
        })
    }

    /// `target op= value`
    #[must_use]
    pub fn aug_assign(target: Expr, op: BinOp, value: Expr) -> Self {
        Self::new(StmtKind::AugAssign {
            target: Box::new(target),
            op,
            value: Box::new(value),
        })
    }

    /// Expression statement.
    #[must_use]
    pub fn expr(value: Expr) -> Self {
        Self::new(StmtKind::Expr(Box::new(value)))
    }

    /// `return value`
    #[must_use]
    pub fn ret(value: Option<Expr>) -> Self {
        Self::new(StmtKind::Return(value.map(Box::new)))
    }

    /// `pass`
    #[must_use]
    pub fn pass() -> Self {
        Self::new(StmtKind::Pass)
    }

    /// `global a, b`
    #[must_use]
    pub fn global<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(StmtKind::Global(names.into_iter().map(Into::into).collect()))
    }

    /// `import ...`
    #[must_use]
    pub fn import(names: Vec<Alias>) -> Self {
        Self::new(StmtKind::Import(names))
    }

    /// `from module import ...`
    #[must_use]
    pub fn import_from(module: impl Into<String>, names: Vec<Alias>) -> Self {
        Self::new(StmtKind::ImportFrom {
            module: module.into(),
            names,
        })
    }

    /// `def name(args): body`
    #[must_use]
    pub fn function_def(name: impl Into<String>, args: Arguments, body: Vec<Stmt>) -> Self {
        Self::new(StmtKind::FunctionDef {
            name: name.into(),
            args: Box::new(args),
            decorators: Vec::new(),
            body,
        })
    }

    /// `class name(bases): body`
    #[must_use]
    pub fn class_def(name: impl Into<String>, bases: Vec<Expr>, body: Vec<Stmt>) -> Self {
        Self::new(StmtKind::ClassDef {
            name: name.into(),
            bases,
            decorators: Vec::new(),
            body,
        })
    }

    /// `if test: goto if_true else: goto if_false`
    #[must_use]
    pub fn branch(test: Expr, if_true: BlockId, if_false: BlockId) -> Self {
        Self::new(StmtKind::Branch {
            test: Box::new(test),
            if_true,
            if_false,
        })
    }

    /// `goto target`
    #[must_use]
    pub fn jump(target: BlockId) -> Self {
        Self::new(StmtKind::Jump { target })
    }

    /// Returns a short lowercase name for the statement kind, used in DOT labels.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            StmtKind::Expr(_) => "expr",
            StmtKind::Assign { .. } => "assign",
            StmtKind::AugAssign { .. } => "augassign",
            StmtKind::Return(_) => "return",
            StmtKind::Pass => "pass",
            StmtKind::Global(_) => "global",
            StmtKind::Import(_) => "import",
            StmtKind::ImportFrom { .. } => "importfrom",
            StmtKind::FunctionDef { .. } => "functiondef",
            StmtKind::ClassDef { .. } => "classdef",
            StmtKind::Raise(_) => "raise",
            StmtKind::Assert { .. } => "assert",
            StmtKind::Print { .. } => "print",
            StmtKind::Branch { .. } => "branch",
            StmtKind::Jump { .. } => "jump",
        }
    }

    /// Returns `true` if this statement binds at least one local name.
    #[must_use]
    pub fn is_binding(&self) -> bool {
        struct AnyStore(bool);
        impl NameVisitor for AnyStore {
            fn visit_name(&mut self, _name: &str, access: NameAccess) {
                self.0 |= access == NameAccess::Store;
            }
        }

        let mut visitor = AnyStore(false);
        walk_stmt(&mut visitor, self);
        visitor.0
    }

    /// Returns the control flow targets named by a terminator statement.
    ///
    /// Non-terminators return an empty vector.
    #[must_use]
    pub fn branch_targets(&self) -> Vec<BlockId> {
        match &self.kind {
            StmtKind::Branch {
                if_true, if_false, ..
            } => vec![*if_true, *if_false],
            StmtKind::Jump { target } => vec![*target],
            _ => Vec::new(),
        }
    }
}

impl Expr {
    /// Create a new expression.
    #[must_use]
    pub fn new(kind: ExprKind) -> Self {
        Self { kind }
    }

    /// A name reference.
    #[must_use]
    pub fn name(id: impl Into<String>) -> Self {
        Self::new(ExprKind::Name(id.into()))
    }

    /// An integer literal.
    #[must_use]
    pub fn int(value: i64) -> Self {
        Self::new(ExprKind::Int(value))
    }

    /// A string literal.
    #[must_use]
    pub fn str(value: impl Into<String>) -> Self {
        Self::new(ExprKind::Str(value.into()))
    }

    /// The `None` literal.
    #[must_use]
    pub fn none() -> Self {
        Self::new(ExprKind::None)
    }

    /// A tuple.
    #[must_use]
    pub fn tuple(elts: Vec<Expr>) -> Self {
        Self::new(ExprKind::Tuple(elts))
    }

    /// A list.
    #[must_use]
    pub fn list(elts: Vec<Expr>) -> Self {
        Self::new(ExprKind::List(elts))
    }

    /// `value.attr`
    #[must_use]
    pub fn attribute(value: Expr, attr: impl Into<String>) -> Self {
        Self::new(ExprKind::Attribute {
            value: Box::new(value),
            attr: attr.into(),
        })
    }

    /// `value[index]`
    #[must_use]
    pub fn subscript(value: Expr, index: Expr) -> Self {
        Self::new(ExprKind::Subscript {
            value: Box::new(value),
            index: Box::new(index),
        })
    }

    /// `left + right`
    #[must_use]
    pub fn add(left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::BinOp {
            left: Box::new(left),
            op: BinOp::Add,
            right: Box::new(right),
        })
    }

    /// `left < right`
    #[must_use]
    pub fn lt(left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::Compare {
            left: Box::new(left),
            ops: vec![CmpOp::Lt],
            comparators: vec![right],
        })
    }

    /// `func(args...)`
    #[must_use]
    pub fn call(func: Expr, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Call {
            func: Box::new(func),
            args,
            keywords: Vec::new(),
        })
    }

    /// `lambda args: body`
    #[must_use]
    pub fn lambda(args: Arguments, body: Expr) -> Self {
        Self::new(ExprKind::Lambda {
            args: Box::new(args),
            body: Box::new(body),
        })
    }
}
