//! Tree-walking evaluator for sluice configuration files.
//!
//! An [`Evaluator`] binds a parsed AST node to host values: expressions
//! evaluate into dynamically-typed [`Value`]s and decode through the
//! conversion lattice, while blocks and file bodies decode into host
//! records via their tagged schemas. Identifiers resolve through a chain of
//! [`Scope`]s, falling back to the [`stdlib`].

mod literal;
pub mod stdlib;

use std::collections::HashSet;
use std::sync::Arc;

use sluice_ast::{
    AttributeStmt, BlockStmt, Body, Expr, File, Pos, Position, SourceFile, Stmt,
};
use sluice_value::{
    binop, decode_record, unary, BlockCardinality, FromValue, Kind, Record, ToValue, Value,
};

pub use sluice_diag::Error;

/// A set of identifiers available when evaluating a node.
///
/// Lookups walk from the child scope towards the root, returning the first
/// match; the standard library is consulted last.
#[derive(Debug, Default)]
pub struct Scope<'a> {
    /// Optional parent scope holding more identifiers.
    pub parent: Option<&'a Scope<'a>>,
    variables: std::collections::HashMap<String, Value>,
}

impl<'a> Scope<'a> {
    pub fn new() -> Scope<'a> {
        Scope::default()
    }

    /// A child scope whose lookups fall back to `parent`.
    pub fn with_parent(parent: &'a Scope<'a>) -> Scope<'a> {
        Scope {
            parent: Some(parent),
            variables: Default::default(),
        }
    }

    /// Encodes a host value into the scope. Encoding deep-copies, so later
    /// mutation of the source cannot be observed by evaluation.
    pub fn insert(&mut self, name: impl Into<String>, value: impl ToValue) {
        self.variables.insert(name.into(), value.to_value());
    }

    /// Inserts an already-encoded value.
    pub fn insert_value(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Looks up an identifier in this scope or any parent.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(value) = current.variables.get(name) {
                return Some(value);
            }
            scope = current.parent;
        }
        None
    }
}

/// The AST node an [`Evaluator`] is bound to.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    File(&'a File),
    Block(&'a BlockStmt),
    Expr(&'a Expr),
}

impl<'a> From<&'a File> for Node<'a> {
    fn from(file: &'a File) -> Node<'a> {
        Node::File(file)
    }
}

impl<'a> From<&'a BlockStmt> for Node<'a> {
    fn from(block: &'a BlockStmt) -> Node<'a> {
        Node::Block(block)
    }
}

impl<'a> From<&'a Expr> for Node<'a> {
    fn from(expr: &'a Expr) -> Node<'a> {
        Node::Expr(expr)
    }
}

impl Node<'_> {
    fn start_pos(&self) -> Pos {
        match self {
            Node::File(file) => file.start_pos(),
            Node::Block(block) => block.name_pos,
            Node::Expr(expr) => expr.start_pos(),
        }
    }
}

/// An evaluation failure carrying the position it originated at.
struct Fail {
    pos: Pos,
    message: String,
}

impl Fail {
    fn at(pos: Pos, message: impl Into<String>) -> Fail {
        Fail {
            pos,
            message: message.into(),
        }
    }
}

/// Converts AST nodes into host values.
///
/// Each evaluator is bound to a single node: an entire file, a block
/// statement, or any expression. Evaluating the same evaluator repeatedly
/// against different scopes is allowed; a single evaluation is not
/// reentrant.
pub struct Evaluator<'a> {
    node: Node<'a>,
    source: Option<Arc<SourceFile>>,
}

impl<'a> Evaluator<'a> {
    /// Creates a new evaluator for the given node. File nodes carry their
    /// own line table; for block and expression nodes, attach one with
    /// [`Evaluator::with_source`] to get positioned errors.
    pub fn new(node: impl Into<Node<'a>>) -> Evaluator<'a> {
        let node = node.into();
        let source = match node {
            Node::File(file) => Some(Arc::clone(&file.source)),
            _ => None,
        };
        Evaluator { node, source }
    }

    /// Attaches a line table used to resolve error positions.
    pub fn with_source(mut self, source: Arc<SourceFile>) -> Evaluator<'a> {
        self.source = Some(source);
        self
    }

    /// Evaluates an expression node and decodes the result into `T`.
    ///
    /// Panics when the evaluator is bound to a file or block node; those
    /// decode into records through [`Evaluator::evaluate_into`].
    pub fn evaluate<T: FromValue>(&self, scope: &Scope<'_>) -> Result<T, Error> {
        let expr = match self.node {
            Node::Expr(expr) => expr,
            _ => panic!("evaluate called on a body node; use evaluate_into"),
        };

        let value = self.eval_expr(scope, expr).map_err(|fail| self.finish(fail))?;
        T::from_value(&value)
            .map_err(|err| self.finish(Fail::at(expr.start_pos(), err.to_string())))
    }

    /// Evaluates the node into a host record.
    ///
    /// File bodies and blocks decode through the record's tagged schema;
    /// expression nodes must evaluate to an object, which then decodes by
    /// key.
    pub fn evaluate_into(&self, scope: &Scope<'_>, target: &mut dyn Record) -> Result<(), Error> {
        let result = match self.node {
            Node::File(file) => self.eval_body(scope, &file.body, target, Pos::NONE),
            Node::Block(block) => self.eval_block(scope, block, target),
            Node::Expr(expr) => self.eval_expr(scope, expr).and_then(|value| {
                decode_record(&value, target)
                    .map_err(|err| Fail::at(expr.start_pos(), err.to_string()))
            }),
        };
        result.map_err(|fail| self.finish(fail))
    }

    /// Resolves a failure into a positioned error. Failures without a
    /// position fall back to the node's starting position, where valid.
    fn finish(&self, fail: Fail) -> Error {
        let pos = if fail.pos.is_valid() {
            fail.pos
        } else {
            self.node.start_pos()
        };
        let position = match &self.source {
            Some(source) => source.position_for(pos),
            None => Position::default(),
        };
        Error::new(position, fail.message)
    }

    // -- Expressions --

    fn eval_expr(&self, scope: &Scope<'_>, expr: &Expr) -> Result<Value, Fail> {
        match expr {
            Expr::Literal(lit) => literal::value_from_literal(lit.kind, &lit.value)
                .map_err(|message| Fail::at(lit.pos, message)),

            Expr::Identifier(ident) => match scope.lookup(&ident.name) {
                Some(value) => Ok(value.clone()),
                None => stdlib::lookup(&ident.name).ok_or_else(|| {
                    Fail::at(
                        ident.pos,
                        format!("identifier {:?} does not exist", ident.name),
                    )
                }),
            },

            Expr::Array(array) => {
                let mut elements = Vec::with_capacity(array.elements.len());
                for element in &array.elements {
                    elements.push(self.eval_expr(scope, element)?);
                }
                Ok(Value::Array(elements))
            }

            Expr::Object(object) => {
                let mut fields = sluice_value::Object::new();
                for field in &object.fields {
                    let value = self.eval_expr(scope, &field.value)?;
                    fields.insert(field.name.name.clone(), value);
                }
                Ok(Value::Object(fields))
            }

            Expr::Access(access) => {
                let value = self.eval_expr(scope, &access.value)?;
                match &value {
                    Value::Object(_) => match value.key(&access.name.name) {
                        Some(entry) => Ok(entry.clone()),
                        None => Err(Fail::at(
                            access.name.pos,
                            format!("field {:?} does not exist", access.name.name),
                        )),
                    },
                    other => Err(Fail::at(
                        access.name.pos,
                        format!(
                            "cannot access field {:?} on non-object type {}",
                            access.name.name,
                            other.ty()
                        ),
                    )),
                }
            }

            Expr::Index(index) => {
                let value = self.eval_expr(scope, &index.value)?;
                let index_value = self.eval_expr(scope, &index.index)?;

                if value.kind() != Kind::Array {
                    return Err(Fail::at(
                        expr.start_pos(),
                        format!("cannot take an index of non-array type {}", value.ty()),
                    ));
                }
                if index_value.kind() != Kind::Number {
                    return Err(Fail::at(
                        index.index.start_pos(),
                        format!(
                            "type {} cannot be used to index arrays",
                            index_value.ty()
                        ),
                    ));
                }

                // Floor the index toward zero and bounds-check it.
                let at = index_value.number().as_i64();
                let len = value.len();
                if at < 0 || at as usize >= len {
                    return Err(Fail::at(
                        index.index.start_pos(),
                        format!("index {at} out of range [0, {len})"),
                    ));
                }
                Ok(value.index(at as usize).clone())
            }

            Expr::Call(call) => {
                let callee = self.eval_expr(scope, &call.value)?;
                if callee.kind() != Kind::Function {
                    return Err(Fail::at(
                        expr.start_pos(),
                        format!("cannot call non-function type {}", callee.ty()),
                    ));
                }

                let mut args = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    args.push(self.eval_expr(scope, arg)?);
                }

                callee
                    .call(&args)
                    .map_err(|err| Fail::at(expr.start_pos(), err.to_string()))
            }

            Expr::Unary(unary_expr) => {
                let operand = self.eval_expr(scope, &unary_expr.operand)?;
                unary(unary_expr.op, &operand)
                    .map_err(|err| Fail::at(unary_expr.op_pos, err.to_string()))
            }

            Expr::Binary(binary) => {
                let lhs = self.eval_expr(scope, &binary.lhs)?;
                let rhs = self.eval_expr(scope, &binary.rhs)?;
                binop(&lhs, binary.op, &rhs)
                    .map_err(|err| Fail::at(binary.op_pos, err.to_string()))
            }

            Expr::Paren(paren) => self.eval_expr(scope, &paren.inner),
        }
    }

    // -- Blocks --

    fn eval_block(
        &self,
        scope: &Scope<'_>,
        block: &BlockStmt,
        target: &mut dyn Record,
    ) -> Result<(), Fail> {
        // Decode the block label first.
        let fields = target.fields();
        match (&block.label, fields.label()) {
            (None, Some(_)) => {
                return Err(Fail::at(
                    block.name_pos,
                    format!("block {:?} requires non-empty label", block.joined_name()),
                ));
            }
            (Some(_), None) => {
                return Err(Fail::at(
                    block.label_pos,
                    format!(
                        "block {:?} does not support specifying labels",
                        block.joined_name()
                    ),
                ));
            }
            (Some(label), Some(_)) => target.set_label(label),
            (None, None) => {}
        }

        self.eval_body(scope, &block.body, target, block.name_pos)
    }

    /// Decodes the statements of a body into a record: attributes evaluate
    /// into value slots and nested blocks decode recursively into block
    /// slots. `ctx_pos` anchors errors that have no more precise position.
    fn eval_body(
        &self,
        scope: &Scope<'_>,
        body: &Body,
        target: &mut dyn Record,
        ctx_pos: Pos,
    ) -> Result<(), Fail> {
        let fields = target.fields();

        // Partition the body into attributes and blocks by name, preserving
        // source order. Blocks may repeat; attributes may not.
        let (attrs, blocks) = partition(body);

        let mut consumed: HashSet<&str> = HashSet::new();

        for field in fields.iter() {
            if field.is_ignored() || !(field.is_attr() || field.is_block()) {
                continue;
            }
            consumed.insert(field.name);

            let found_attrs = find(&attrs, field.name);
            let found_blocks = find(&blocks, field.name);

            // Validity checks for attributes and blocks.
            if found_attrs.is_empty() && found_blocks.is_empty() {
                if field.is_optional() {
                    continue;
                }
                let what = if field.is_attr() { "attribute" } else { "block" };
                return Err(Fail::at(
                    ctx_pos,
                    format!("missing required {what} {:?}", field.name),
                ));
            }

            if field.is_attr() {
                if let Some(block) = found_blocks.first() {
                    return Err(Fail::at(
                        block.name_pos,
                        format!("{:?} must be an attribute, but is used as a block", field.name),
                    ));
                }
                if found_attrs.len() > 1 {
                    // Blocks may repeat when the slot accepts a sequence;
                    // attributes may only ever be set once.
                    return Err(Fail::at(
                        found_attrs[1].name.pos,
                        format!("attribute {:?} may only be set once", field.name),
                    ));
                }

                let attr = found_attrs[0];
                let value = self.eval_expr(scope, &attr.value)?;
                target
                    .set_field(field.index, &value)
                    .map_err(|err| Fail::at(attr.value.start_pos(), err.to_string()))?;
                continue;
            }

            // Block field.
            if let Some(attr) = found_attrs.first() {
                return Err(Fail::at(
                    attr.name.pos,
                    format!("{:?} must be a block, but is used as an attribute", field.name),
                ));
            }

            let slot = target.block_slot(field.index);
            match slot.cardinality() {
                BlockCardinality::Single => {
                    if found_blocks.len() > 1 {
                        return Err(Fail::at(
                            found_blocks[1].name_pos,
                            format!("block {:?} may only be specified once", field.name),
                        ));
                    }
                    slot.prepare(1);
                    self.eval_block(scope, found_blocks[0], slot.block(0))?;
                }
                BlockCardinality::Sequence => {
                    slot.prepare(found_blocks.len());
                    for (i, nested) in found_blocks.iter().enumerate() {
                        self.eval_block(scope, nested, slot.block(i))?;
                    }
                }
                BlockCardinality::Fixed(capacity) => {
                    // Blocks past the slot capacity are dropped; the unused
                    // remainder of the slot resets to defaults.
                    let take = found_blocks.len().min(capacity);
                    slot.prepare(take);
                    for (i, nested) in found_blocks.iter().take(take).enumerate() {
                        self.eval_block(scope, nested, slot.block(i))?;
                    }
                }
            }
        }

        // Everything the source provided must have matched a schema field.
        for (name, stmts) in &attrs {
            if !consumed.contains(name.as_str()) {
                return Err(Fail::at(
                    stmts[0].name.pos,
                    format!("unrecognized attribute name {name:?}"),
                ));
            }
        }
        for (name, stmts) in &blocks {
            if !consumed.contains(name.as_str()) {
                return Err(Fail::at(
                    stmts[0].name_pos,
                    format!("unrecognized block name {name:?}"),
                ));
            }
        }

        Ok(())
    }
}

/// Groups the statements of a body by name, preserving first-seen order.
#[allow(clippy::type_complexity)]
fn partition(body: &Body) -> (Vec<(String, Vec<&AttributeStmt>)>, Vec<(String, Vec<&BlockStmt>)>) {
    let mut attrs: Vec<(String, Vec<&AttributeStmt>)> = Vec::new();
    let mut blocks: Vec<(String, Vec<&BlockStmt>)> = Vec::new();

    for stmt in body {
        match stmt {
            Stmt::Attribute(attr) => push_group(&mut attrs, attr.name.name.clone(), attr),
            Stmt::Block(block) => push_group(&mut blocks, block.joined_name(), block),
        }
    }

    (attrs, blocks)
}

fn push_group<'b, T>(groups: &mut Vec<(String, Vec<&'b T>)>, name: String, stmt: &'b T) {
    match groups.iter_mut().find(|(key, _)| *key == name) {
        Some((_, list)) => list.push(stmt),
        None => groups.push((name, vec![stmt])),
    }
}

fn find<'g, 'b, T>(groups: &'g [(String, Vec<&'b T>)], name: &str) -> &'g [&'b T] {
    groups
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, list)| list.as_slice())
        .unwrap_or(&[])
}
