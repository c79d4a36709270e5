//! AST node definitions and source positions for sluice.
//!
//! This crate defines the abstract syntax tree produced by the parser along
//! with the position machinery used to report locations: a compact byte
//! offset ([`Pos`]), a resolved location ([`Position`]), and the per-file
//! line table ([`SourceFile`]) that maps one to the other.

use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A compact encoding of a byte offset within a [`SourceFile`].
///
/// The zero value is reserved to mean "no position"; a valid `Pos` encodes
/// `offset + 1` so that positions remain cheap to store on every node while
/// still having an unambiguous invalid state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos(u32);

impl Pos {
    /// The invalid position.
    pub const NONE: Pos = Pos(0);

    /// Create a `Pos` from a byte offset.
    pub fn from_offset(offset: usize) -> Pos {
        Pos(offset as u32 + 1)
    }

    /// Returns true if the position refers to an actual offset.
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// The byte offset this position refers to. Panics if the position is
    /// invalid.
    pub fn offset(self) -> usize {
        debug_assert!(self.is_valid(), "offset called on invalid Pos");
        self.0 as usize - 1
    }

    /// Returns the position `n` bytes after `self`. Invalid positions stay
    /// invalid.
    pub fn add(self, n: usize) -> Pos {
        if !self.is_valid() {
            return self;
        }
        Pos(self.0 + n as u32)
    }
}

/// A resolved source position.
///
/// Lines and columns are 1-based; offsets are 0-based. A `Position` with
/// `line == 0` is invalid and renders without location information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    pub filename: String,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Reports whether the position has a valid line number.
    pub fn is_valid(&self) -> bool {
        self.line >= 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            if self.filename.is_empty() {
                return f.write_str("-");
            }
            return f.write_str(&self.filename);
        }
        if self.filename.is_empty() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}:{}:{}", self.filename, self.line, self.column)
        }
    }
}

/// Position information for a single source file.
///
/// A `SourceFile` owns the file name and a monotonically increasing table of
/// line start offsets, so any [`Pos`] can be resolved to a [`Position`] by
/// binary search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    name: String,
    lines: Vec<u32>,
}

impl SourceFile {
    /// Create a new `SourceFile` for storing position information.
    pub fn new(name: impl Into<String>) -> SourceFile {
        SourceFile {
            name: name.into(),
            // Line 1 always starts at offset 0.
            lines: vec![0],
        }
    }

    /// The name of the file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Track a new line starting at a byte offset. Offsets that do not
    /// increase the line table are ignored, which makes the call idempotent.
    pub fn add_line(&mut self, offset: usize) {
        let offset = offset as u32;
        if let Some(&last) = self.lines.last() {
            if offset <= last {
                return;
            }
        }
        self.lines.push(offset);
    }

    /// Resolve `pos` to a full [`Position`]. An invalid `pos` resolves to the
    /// zero position.
    pub fn position_for(&self, pos: Pos) -> Position {
        if !pos.is_valid() {
            return Position::default();
        }
        let offset = pos.offset();
        let idx = self.lines.partition_point(|&start| start as usize <= offset) - 1;
        Position {
            filename: self.name.clone(),
            offset,
            line: idx + 1,
            column: offset - self.lines[idx] as usize + 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinOp {
    /// The source text of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::Lt => "<",
            BinOp::Lte => "<=",
            BinOp::Gt => ">",
            BinOp::Gte => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "^",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl UnaryOp {
    /// The source text of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// A parsed file.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// Filename provided to the parser.
    pub name: String,
    /// Statements in the file.
    pub body: Body,
    /// Comment groups collected during parsing, in source order.
    pub comments: Vec<CommentGroup>,
    /// Line table for resolving node positions.
    pub source: Arc<SourceFile>,
}

/// An ordered series of statements.
pub type Body = Vec<Stmt>;

/// A statement within the body of a file or block.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Attribute(AttributeStmt),
    Block(BlockStmt),
}

/// A name-value pair being set in a body.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeStmt {
    pub name: Ident,
    pub value: Expr,
}

/// A block declaration inside a body.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    /// Dotted name fragments (`a.b.c` stores three fragments). Never empty.
    pub name: Vec<String>,
    pub name_pos: Pos,
    /// Optional user label, stored unquoted.
    pub label: Option<String>,
    pub label_pos: Pos,
    pub body: Body,
    pub lcurly: Pos,
    pub rcurly: Pos,
}

impl BlockStmt {
    /// The dotted form of the block name.
    pub fn joined_name(&self) -> String {
        self.name.join(".")
    }
}

/// An identifier with its position.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub pos: Pos,
}

/// The kind of a literal expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LitKind {
    Number,
    Float,
    String,
    Bool,
    Null,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralExpr),
    Identifier(Ident),
    Array(ArrayExpr),
    Object(ObjectExpr),
    Access(AccessExpr),
    Index(IndexExpr),
    Call(CallExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Paren(ParenExpr),
}

/// A constant value of a specific kind. The literal text is kept as scanned.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub kind: LitKind,
    pub value: String,
    pub pos: Pos,
}

/// An array of values.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpr {
    pub elements: Vec<Expr>,
    pub lbrack: Pos,
    pub rbrack: Pos,
}

/// An object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectExpr {
    pub fields: Vec<ObjectField>,
    pub lcurly: Pos,
    pub rcurly: Pos,
}

/// A single field within an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    pub name: Ident,
    /// True when the field name was written as a quoted string. Preserved so
    /// printing can reproduce the original spelling.
    pub quoted: bool,
    pub value: Expr,
}

/// Field access: `value.name`.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessExpr {
    pub value: Box<Expr>,
    pub name: Ident,
}

/// Array indexing: `value[index]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub value: Box<Expr>,
    pub index: Box<Expr>,
    pub lbrack: Pos,
    pub rbrack: Pos,
}

/// Function invocation: `value(args)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub value: Box<Expr>,
    pub args: Vec<Expr>,
    pub lparen: Pos,
    pub rparen: Pos,
}

/// A unary operation on a single operand.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub op_pos: Pos,
    pub operand: Box<Expr>,
}

/// A binary operation on two operands.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub op_pos: Pos,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

/// A parenthesized expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub lparen: Pos,
    pub inner: Box<Expr>,
    pub rparen: Pos,
}

/// A single comment (`# ...`), without the trailing newline.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub pos: Pos,
    pub text: String,
}

/// A group of comments on adjacent lines with no other tokens in between.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentGroup(pub Vec<Comment>);

impl CommentGroup {
    pub fn start_pos(&self) -> Pos {
        self.0.first().map_or(Pos::NONE, |c| c.pos)
    }

    pub fn end_pos(&self) -> Pos {
        self.0.last().map_or(Pos::NONE, |c| c.pos.add(c.text.len()))
    }
}

// ---------------------------------------------------------------------------
// Position visitors
// ---------------------------------------------------------------------------

impl Expr {
    /// The position of the first character belonging to the expression.
    pub fn start_pos(&self) -> Pos {
        match self {
            Expr::Literal(lit) => lit.pos,
            Expr::Identifier(ident) => ident.pos,
            Expr::Array(arr) => arr.lbrack,
            Expr::Object(obj) => obj.lcurly,
            Expr::Access(access) => access.value.start_pos(),
            Expr::Index(index) => index.value.start_pos(),
            Expr::Call(call) => call.value.start_pos(),
            Expr::Unary(unary) => unary.op_pos,
            Expr::Binary(binary) => binary.lhs.start_pos(),
            Expr::Paren(paren) => paren.lparen,
        }
    }

    /// The position of the first character immediately following the
    /// expression.
    pub fn end_pos(&self) -> Pos {
        match self {
            Expr::Literal(lit) => lit.pos.add(lit.value.len()),
            Expr::Identifier(ident) => ident.pos.add(ident.name.len()),
            Expr::Array(arr) => arr.rbrack.add(1),
            Expr::Object(obj) => obj.rcurly.add(1),
            Expr::Access(access) => access.name.pos.add(access.name.name.len()),
            Expr::Index(index) => index.rbrack.add(1),
            Expr::Call(call) => call.rparen.add(1),
            Expr::Unary(unary) => unary.operand.end_pos(),
            Expr::Binary(binary) => binary.rhs.end_pos(),
            Expr::Paren(paren) => paren.rparen.add(1),
        }
    }
}

impl Stmt {
    /// The position of the first character belonging to the statement.
    pub fn start_pos(&self) -> Pos {
        match self {
            Stmt::Attribute(attr) => attr.name.pos,
            Stmt::Block(block) => block.name_pos,
        }
    }

    /// The position of the first character immediately following the
    /// statement.
    pub fn end_pos(&self) -> Pos {
        match self {
            Stmt::Attribute(attr) => attr.value.end_pos(),
            Stmt::Block(block) => block.rcurly.add(1),
        }
    }
}

impl File {
    /// The position of the first statement, or [`Pos::NONE`] for an empty
    /// file.
    pub fn start_pos(&self) -> Pos {
        self.body.first().map_or(Pos::NONE, Stmt::start_pos)
    }

    /// The position immediately following the last statement, or
    /// [`Pos::NONE`] for an empty file.
    pub fn end_pos(&self) -> Pos {
        self.body.last().map_or(Pos::NONE, Stmt::end_pos)
    }
}
