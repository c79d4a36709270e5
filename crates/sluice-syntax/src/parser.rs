//! Recursive descent parser for sluice configuration files.
//!
//! Each parse method documents the LL(1) grammar for its nonterminal. The
//! parser continues on errors to report as complete a list as possible; the
//! partial AST is discarded when any error was encountered.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use sluice_ast::{
    ArrayExpr, AttributeStmt, BinOp, BinaryExpr, BlockStmt, Body, CallExpr, Comment, CommentGroup,
    Expr, File, Ident, IndexExpr, LitKind, LiteralExpr, ObjectExpr, ObjectField, ParenExpr, Pos,
    SourceFile, Stmt, UnaryExpr, UnaryOp, AccessExpr,
};
use sluice_diag::{Error, ErrorList};

use crate::scanner::{unquote, Mode, Scanner};
use crate::token::Token;

/// Parses an entire configuration file. `data` holds the file content to
/// parse, while `filename` is used for reporting errors.
///
/// If any error was encountered, the returned error list holds everything
/// found during scanning and parsing.
pub fn parse_file(filename: &str, data: &[u8]) -> Result<File, ErrorList> {
    let mut p = Parser::new(filename, data);
    let file = p.parse_file();
    p.finish(file)
}

/// Parses a single expression from `src`.
pub fn parse_expression(src: &str) -> Result<Expr, ErrorList> {
    let mut p = Parser::new("", src.as_bytes());
    let expr = p.parse_expr();
    p.finish(expr)
}

/// Tokens which synchronize expression-level error recovery.
const STATEMENT_END: &[Token] = &[
    Token::Terminator,
    Token::RParen,
    Token::RCurly,
    Token::RBrack,
    Token::Comma,
];

/// Tokens which may begin an object field.
const FIELD_START: &[Token] = &[Token::String, Token::Ident];

struct Parser<'a> {
    scanner: Scanner<'a>,
    errors: Rc<RefCell<Vec<(Pos, String)>>>,
    comments: Vec<CommentGroup>,

    pos: Pos,     // current token position
    tok: Token,   // current token
    lit: String,  // current token literal
}

impl<'a> Parser<'a> {
    fn new(filename: &str, src: &'a [u8]) -> Parser<'a> {
        let errors: Rc<RefCell<Vec<(Pos, String)>>> = Rc::default();

        let sink = Rc::clone(&errors);
        let scanner = Scanner::new(
            SourceFile::new(filename),
            src,
            Some(Box::new(move |pos, msg| {
                sink.borrow_mut().push((pos, msg.to_string()));
            })),
            Mode::include_comments(),
        );

        let mut p = Parser {
            scanner,
            errors,
            comments: Vec::new(),
            pos: Pos::NONE,
            tok: Token::Eof,
            lit: String::new(),
        };
        p.next();
        p
    }

    /// Resolve accumulated error positions and produce the parse result.
    fn finish<T>(self, value: T) -> Result<T, ErrorList> {
        let raw = self.errors.borrow();
        if raw.is_empty() {
            return Ok(value);
        }

        let file = self.scanner.file();
        let mut list = ErrorList::new();
        for (pos, message) in raw.iter() {
            list.add(Error::new(file.position_for(*pos), message.clone()));
        }
        Err(list)
    }

    /// Advances the parser to the next non-comment token.
    fn next(&mut self) {
        self.next0();
        while self.tok == Token::Comment {
            self.consume_comment_group();
        }
    }

    /// Advances the parser to the next token. Parse methods call [`next`]
    /// instead so comments are collected.
    fn next0(&mut self) {
        let (pos, tok, lit) = self.scanner.scan();
        self.pos = pos;
        self.tok = tok;
        self.lit = lit;
    }

    /// Consumes a group of comments on adjacent lines.
    fn consume_comment_group(&mut self) {
        let mut list = Vec::new();

        let mut endline = self.line_of(self.pos);
        while self.tok == Token::Comment && self.line_of(self.pos) <= endline + 1 {
            endline = self.line_of(self.pos);
            list.push(Comment {
                pos: self.pos,
                text: self.lit.clone(),
            });
            self.next0();
        }

        self.comments.push(CommentGroup(list));
    }

    fn line_of(&self, pos: Pos) -> usize {
        self.scanner.file().position_for(pos).line
    }

    /// Consumes tokens up to (but not including) the specified token, or EOF.
    fn advance(&mut self, to: Token) {
        while self.tok != Token::Eof {
            if self.tok == to {
                return;
            }
            self.next();
        }
    }

    /// Consumes tokens up to (but not including) any token in `to`, or EOF.
    fn advance_any(&mut self, to: &[Token]) {
        while self.tok != Token::Eof {
            if to.contains(&self.tok) {
                return;
            }
            self.next();
        }
    }

    /// Consumes the current token, recording an error if it was not `t`.
    fn expect(&mut self, t: Token) -> (Pos, Token, String) {
        let current = (self.pos, self.tok, std::mem::take(&mut self.lit));
        if current.1 != t {
            self.add_error(current.0, format!("expected {t}, got {}", current.1));
        }
        self.next();
        current
    }

    fn add_error(&mut self, pos: Pos, message: String) {
        self.errors.borrow_mut().push((pos, message));
    }

    /// Parses an entire file.
    ///
    ///     File = Body
    fn parse_file(&mut self) -> File {
        let body = self.parse_body(Token::Eof);

        File {
            name: self.scanner.file().name().to_string(),
            body,
            comments: std::mem::take(&mut self.comments),
            source: Arc::new(self.scanner.file().clone()),
        }
    }

    /// Parses a series of statements up to the `until` token.
    ///
    ///     Body = [ Statement { terminator Statement } ]
    fn parse_body(&mut self, until: Token) -> Body {
        let mut body = Body::new();

        while self.tok != until && self.tok != Token::Eof {
            if let Some(stmt) = self.parse_statement() {
                body.push(stmt);
            }

            if self.tok == until {
                break;
            }
            self.expect(Token::Terminator);
        }

        body
    }

    /// Parses an individual statement within a body.
    ///
    ///     Statement = Attribute | Block
    ///     Attribute = identifier "=" Expression
    ///     Block     = BlockName "{" Body "}"
    fn parse_statement(&mut self) -> Option<Stmt> {
        let name = match self.parse_block_name() {
            Some(name) => name,
            None => {
                // Skip to the next identifier which could start a statement.
                self.advance(Token::Ident);
                return None;
            }
        };

        // The current token is now the first token after the name.
        match self.tok {
            Token::Assign => {
                self.next(); // consume "="

                if name.fragments.len() != 1 {
                    self.add_error(
                        name.start,
                        "attribute names may only consist of a single identifier with no \".\""
                            .to_string(),
                    );
                } else if name.label_pos.is_valid() {
                    self.add_error(
                        name.label_pos,
                        "attribute names may not have labels".to_string(),
                    );
                }

                Some(Stmt::Attribute(AttributeStmt {
                    name: Ident {
                        name: name.fragments.into_iter().next().unwrap_or_default(),
                        pos: name.start,
                    },
                    value: self.parse_expr(),
                }))
            }

            Token::LCurly => {
                let (lcurly, _, _) = self.expect(Token::LCurly);
                let body = self.parse_body(Token::RCurly);
                let (rcurly, _, _) = self.expect(Token::RCurly);

                Some(Stmt::Block(BlockStmt {
                    name: name.fragments,
                    name_pos: name.start,
                    label: name.label,
                    label_pos: name.label_pos,
                    body,
                    lcurly,
                    rcurly,
                }))
            }

            _ => {
                if name.valid_attribute() {
                    // The name could start either form, so mention both.
                    self.add_error(
                        self.pos,
                        format!("expected attribute assignment or block body, got {}", self.tok),
                    );
                } else {
                    self.add_error(self.pos, format!("expected block body, got {}", self.tok));
                }

                // Give up on this statement and skip to the next identifier.
                self.advance(Token::Ident);
                None
            }
        }
    }

    /// Parses the name used for a block.
    ///
    ///     BlockName = identifier { "." identifier } [ string ]
    fn parse_block_name(&mut self) -> Option<BlockName> {
        if self.tok != Token::Ident {
            self.add_error(self.pos, format!("expected identifier, got {}", self.tok));
            return None;
        }

        let mut name = BlockName {
            fragments: vec![std::mem::take(&mut self.lit)],
            label: None,
            start: self.pos,
            label_pos: Pos::NONE,
        };
        self.next();

        // { "." identifier }
        while self.tok == Token::Dot {
            self.next(); // consume "."

            if self.tok != Token::Ident {
                self.add_error(self.pos, format!("expected identifier, got {}", self.tok));
                // Continue to parse as much as possible even though the block
                // name will be malformed.
            }

            name.fragments.push(std::mem::take(&mut self.lit));
            self.next();
        }

        // [ string ]
        if self.tok != Token::Assign && self.tok != Token::LCurly {
            if self.tok == Token::String && self.lit.len() > 2 {
                match unquote(&self.lit) {
                    Ok(label) => name.label = Some(label),
                    Err(err) => self.add_error(self.pos, err),
                }
                name.label_pos = self.pos;
            } else {
                self.add_error(self.pos, format!("expected block label, got {}", self.tok));
            }
            self.next();
        }

        Some(name)
    }

    /// Parses a single expression.
    ///
    ///     Expression = BinOpExpr
    fn parse_expr(&mut self) -> Expr {
        self.parse_bin_op(1)
    }

    /// The entrypoint for binary expressions. Returns a single operand when
    /// no binary expression is present.
    ///
    ///     BinOpExpr = OrExpr
    ///     OrExpr    = AndExpr { "||"   AndExpr }
    ///     AndExpr   = CmpExpr { "&&"   CmpExpr }
    ///     CmpExpr   = AddExpr { cmp_op AddExpr }
    ///     AddExpr   = MulExpr { add_op MulExpr }
    ///     MulExpr   = PowExpr { mul_op PowExpr }
    ///
    /// A single recursive function handles every left-associative level;
    /// `in_prec` holds the incoming operator precedence, starting at 1. The
    /// right-associative pow operator is handled by [`Parser::parse_pow_expr`].
    fn parse_bin_op(&mut self, in_prec: u8) -> Expr {
        // Collect everything at the same precedence level into the LHS while
        // recursing with a higher precedence for the RHS, which keeps
        // operators at one level from being handled in the recursive call.
        let mut lhs = self.parse_pow_expr();

        loop {
            let (tok, pos, prec) = (self.tok, self.pos, self.tok.binary_precedence());
            if prec < in_prec {
                // The next operator is lower precedence; drop up a level in
                // the call stack.
                return lhs;
            }
            self.next(); // consume the operator

            let rhs = self.parse_bin_op(prec + 1);

            lhs = Expr::Binary(BinaryExpr {
                op: binop_from_token(tok),
                op_pos: pos,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            });
        }
    }

    /// Like [`Parser::parse_bin_op`], but for the right-associative pow
    /// operator.
    ///
    ///     PowExpr = UnaryExpr [ "^" PowExpr ]
    fn parse_pow_expr(&mut self) -> Expr {
        let lhs = self.parse_unary_expr();

        if self.tok == Token::Pow {
            let pos = self.pos;
            self.next(); // consume ^

            return Expr::Binary(BinaryExpr {
                op: BinOp::Pow,
                op_pos: pos,
                lhs: Box::new(lhs),
                rhs: Box::new(self.parse_pow_expr()),
            });
        }

        lhs
    }

    /// Parses a unary expression.
    ///
    ///     UnaryExpr = OperExpr | unary_op UnaryExpr
    ///
    ///     OperExpr   = PrimaryExpr { AccessExpr | IndexExpr | CallExpr }
    ///     AccessExpr = "." identifier
    ///     IndexExpr  = "[" Expression "]"
    ///     CallExpr   = "(" [ ExpressionList ] ")"
    fn parse_unary_expr(&mut self) -> Expr {
        if self.tok.is_unary_op() {
            let (op, pos) = (self.tok, self.pos);
            self.next(); // consume op

            return Expr::Unary(UnaryExpr {
                op: match op {
                    Token::Not => UnaryOp::Not,
                    _ => UnaryOp::Neg,
                },
                op_pos: pos,
                operand: Box::new(self.parse_unary_expr()),
            });
        }

        let mut primary = self.parse_primary_expr();

        loop {
            match self.tok {
                Token::Dot => {
                    self.next();
                    let (name_pos, _, name) = self.expect(Token::Ident);

                    primary = Expr::Access(AccessExpr {
                        value: Box::new(primary),
                        name: Ident {
                            name,
                            pos: name_pos,
                        },
                    });
                }

                Token::LBrack => {
                    let (lbrack, _, _) = self.expect(Token::LBrack);
                    let index = self.parse_expr();
                    let (rbrack, _, _) = self.expect(Token::RBrack);

                    primary = Expr::Index(IndexExpr {
                        value: Box::new(primary),
                        index: Box::new(index),
                        lbrack,
                        rbrack,
                    });
                }

                Token::LParen => {
                    let (lparen, _, _) = self.expect(Token::LParen);
                    let mut args = Vec::new();
                    if self.tok != Token::RParen {
                        args = self.parse_expr_list(Token::RParen);
                    }
                    let (rparen, _, _) = self.expect(Token::RParen);

                    primary = Expr::Call(CallExpr {
                        value: Box::new(primary),
                        args,
                        lparen,
                        rparen,
                    });
                }

                _ => return primary,
            }
        }
    }

    /// Parses a primary expression.
    ///
    ///     PrimaryExpr = LiteralValue | ArrayExpr | ObjectExpr
    ///
    ///     LiteralValue = identifier | string | number | float | bool | null |
    ///                    "(" Expression ")"
    ///
    ///     ArrayExpr  = "[" [ ExpressionList ] "]"
    ///     ObjectExpr = "{" [ FieldList ] "}"
    fn parse_primary_expr(&mut self) -> Expr {
        match self.tok {
            Token::Ident => {
                let res = Expr::Identifier(Ident {
                    name: std::mem::take(&mut self.lit),
                    pos: self.pos,
                });
                self.next();
                res
            }

            Token::String | Token::Number | Token::Float | Token::Bool | Token::Null => {
                let res = Expr::Literal(LiteralExpr {
                    kind: match self.tok {
                        Token::Number => LitKind::Number,
                        Token::Float => LitKind::Float,
                        Token::String => LitKind::String,
                        Token::Bool => LitKind::Bool,
                        _ => LitKind::Null,
                    },
                    value: std::mem::take(&mut self.lit),
                    pos: self.pos,
                });
                self.next();
                res
            }

            Token::LParen => {
                let (lparen, _, _) = self.expect(Token::LParen);
                let inner = self.parse_expr();
                let (rparen, _, _) = self.expect(Token::RParen);

                Expr::Paren(ParenExpr {
                    lparen,
                    inner: Box::new(inner),
                    rparen,
                })
            }

            Token::LBrack => {
                let (lbrack, _, _) = self.expect(Token::LBrack);
                let mut elements = Vec::new();
                if self.tok != Token::RBrack {
                    elements = self.parse_expr_list(Token::RBrack);
                }
                let (rbrack, _, _) = self.expect(Token::RBrack);

                Expr::Array(ArrayExpr {
                    elements,
                    lbrack,
                    rbrack,
                })
            }

            Token::LCurly => {
                let (lcurly, _, _) = self.expect(Token::LCurly);
                let mut fields = Vec::new();
                if self.tok != Token::RCurly {
                    fields = self.parse_field_list(Token::RCurly);
                }
                let (rcurly, _, _) = self.expect(Token::RCurly);

                Expr::Object(ObjectExpr {
                    fields,
                    lcurly,
                    rcurly,
                })
            }

            _ => {
                self.add_error(self.pos, format!("expected expression, got {}", self.tok));
                let res = Expr::Literal(LiteralExpr {
                    kind: LitKind::Null,
                    value: "null".to_string(),
                    pos: self.pos,
                });
                self.advance_any(STATEMENT_END); // eat up the rest of the line
                res
            }
        }
    }

    /// Parses a list of expressions.
    ///
    ///     ExpressionList = Expression { "," Expression } [ "," ]
    fn parse_expr_list(&mut self, until: Token) -> Vec<Expr> {
        let mut exprs = Vec::new();

        while self.tok != until && self.tok != Token::Eof {
            exprs.push(self.parse_expr());

            if self.tok == until {
                break;
            }
            if self.tok != Token::Comma {
                self.add_error(self.pos, "missing ',' in expression list".to_string());
            }
            self.next();
        }

        exprs
    }

    /// Parses a list of fields in an object.
    ///
    ///     FieldList = Field { "," Field } [ "," ]
    fn parse_field_list(&mut self, until: Token) -> Vec<ObjectField> {
        let mut fields = Vec::new();

        while self.tok != until && self.tok != Token::Eof {
            if let Some(field) = self.parse_field() {
                fields.push(field);
            }

            if self.tok == until {
                break;
            }
            if self.tok != Token::Comma {
                self.add_error(self.pos, "missing ',' in field list".to_string());
            }
            self.next();
        }

        fields
    }

    /// Parses a field in an object.
    ///
    ///     Field = ( string | identifier ) "=" Expression
    fn parse_field(&mut self) -> Option<ObjectField> {
        if self.tok != Token::String && self.tok != Token::Ident {
            self.add_error(
                self.pos,
                format!("expected field name (string or identifier), got {}", self.tok),
            );
            self.advance_any(FIELD_START);
            return None;
        }

        let mut name = Ident {
            name: std::mem::take(&mut self.lit),
            pos: self.pos,
        };
        let mut quoted = false;
        if self.tok == Token::String && name.name.len() > 2 {
            // The field name is a string literal; unwrap the quotes.
            match unquote(&name.name) {
                Ok(text) => name.name = text,
                Err(err) => self.add_error(self.pos, err),
            }
            quoted = true;
        }
        self.next(); // consume the field name

        self.expect(Token::Assign);

        Some(ObjectField {
            name,
            quoted,
            value: self.parse_expr(),
        })
    }
}

fn binop_from_token(tok: Token) -> BinOp {
    match tok {
        Token::Or => BinOp::Or,
        Token::And => BinOp::And,
        Token::Eq => BinOp::Eq,
        Token::Neq => BinOp::Neq,
        Token::Lt => BinOp::Lt,
        Token::Lte => BinOp::Lte,
        Token::Gt => BinOp::Gt,
        Token::Gte => BinOp::Gte,
        Token::Add => BinOp::Add,
        Token::Sub => BinOp::Sub,
        Token::Mul => BinOp::Mul,
        Token::Div => BinOp::Div,
        Token::Mod => BinOp::Mod,
        Token::Pow => BinOp::Pow,
        _ => unreachable!("binop_from_token called with non-operator {tok}"),
    }
}

/// Name parsed for a block or attribute statement.
struct BlockName {
    fragments: Vec<String>,
    label: Option<String>,

    start: Pos,
    label_pos: Pos,
}

impl BlockName {
    /// Whether the name could be used as an attribute name.
    fn valid_attribute(&self) -> bool {
        self.fragments.len() == 1 && self.label.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(src: &str) -> Expr {
        parse_expression(src).expect("expression should parse")
    }

    fn file(src: &str) -> File {
        parse_file("test.slc", src.as_bytes()).expect("file should parse")
    }

    fn binary(e: &Expr) -> (&Expr, BinOp, &Expr) {
        match e {
            Expr::Binary(b) => (&b.lhs, b.op, &b.rhs),
            other => panic!("expected binary expr, got {other:?}"),
        }
    }

    #[test]
    fn parse_attributes_without_separators() {
        let f = file("a = 1\nb = 2");
        assert_eq!(f.body.len(), 2);
        for (stmt, want) in f.body.iter().zip(["a", "b"]) {
            match stmt {
                Stmt::Attribute(attr) => assert_eq!(attr.name.name, want),
                other => panic!("expected attribute, got {other:?}"),
            }
        }
    }

    #[test]
    fn parse_block_names() {
        let f = file("metrics.remote \"primary\" {\n  url = \"http://localhost\"\n}");
        match &f.body[0] {
            Stmt::Block(block) => {
                assert_eq!(block.name, vec!["metrics", "remote"]);
                assert_eq!(block.joined_name(), "metrics.remote");
                assert_eq!(block.label.as_deref(), Some("primary"));
                assert_eq!(block.body.len(), 1);
            }
            other => panic!("expected block, got {other:?}"),
        }
    }

    #[test]
    fn nested_blocks() {
        let f = file("outer {\n  inner {\n    a = 1\n  }\n}");
        let Stmt::Block(outer) = &f.body[0] else {
            panic!("expected block");
        };
        let Stmt::Block(inner) = &outer.body[0] else {
            panic!("expected nested block");
        };
        assert_eq!(inner.name, vec!["inner"]);
    }

    #[test]
    fn precedence_mul_binds_tighter() {
        // 3 + 5 * 2 parses as 3 + (5 * 2)
        let e = expr("3 + 5 * 2");
        let (lhs, op, rhs) = binary(&e);
        assert_eq!(op, BinOp::Add);
        assert!(matches!(lhs, Expr::Literal(_)));
        let (_, inner_op, _) = binary(rhs);
        assert_eq!(inner_op, BinOp::Mul);
    }

    #[test]
    fn parens_override_precedence() {
        let e = expr("(3 + 5) * 2");
        let (lhs, op, _) = binary(&e);
        assert_eq!(op, BinOp::Mul);
        assert!(matches!(lhs, Expr::Paren(_)));
    }

    #[test]
    fn pow_is_right_associative() {
        // 2 ^ 3 ^ 2 parses as 2 ^ (3 ^ 2)
        let e = expr("2 ^ 3 ^ 2");
        let (lhs, op, rhs) = binary(&e);
        assert_eq!(op, BinOp::Pow);
        assert!(matches!(lhs, Expr::Literal(_)));
        let (_, inner_op, _) = binary(rhs);
        assert_eq!(inner_op, BinOp::Pow);
    }

    #[test]
    fn left_associative_chain() {
        // 1 - 2 - 3 parses as (1 - 2) - 3
        let e = expr("1 - 2 - 3");
        let (lhs, op, rhs) = binary(&e);
        assert_eq!(op, BinOp::Sub);
        assert!(matches!(rhs, Expr::Literal(_)));
        let (_, inner_op, _) = binary(lhs);
        assert_eq!(inner_op, BinOp::Sub);
    }

    #[test]
    fn oper_expr_chains() {
        let e = expr("obj.field[0](1, 2)");
        let Expr::Call(call) = &e else {
            panic!("expected call");
        };
        assert_eq!(call.args.len(), 2);
        let Expr::Index(index) = call.value.as_ref() else {
            panic!("expected index");
        };
        let Expr::Access(access) = index.value.as_ref() else {
            panic!("expected access");
        };
        assert_eq!(access.name.name, "field");
    }

    #[test]
    fn object_fields_preserve_quoting() {
        let e = expr("{ a = 1, \"b c\" = 2, }");
        let Expr::Object(obj) = &e else {
            panic!("expected object");
        };
        assert_eq!(obj.fields.len(), 2);
        assert!(!obj.fields[0].quoted);
        assert!(obj.fields[1].quoted);
        assert_eq!(obj.fields[1].name.name, "b c");
    }

    #[test]
    fn array_with_trailing_comma() {
        let e = expr("[1, 2, 3, ]");
        let Expr::Array(arr) = &e else {
            panic!("expected array");
        };
        assert_eq!(arr.elements.len(), 3);
    }

    #[test]
    fn unary_chain() {
        let e = expr("!!true");
        let Expr::Unary(outer) = &e else {
            panic!("expected unary");
        };
        assert_eq!(outer.op, UnaryOp::Not);
        assert!(matches!(outer.operand.as_ref(), Expr::Unary(_)));
    }

    #[test]
    fn attribute_with_dotted_name_is_rejected() {
        let err = parse_file("t", b"a.b = 5").unwrap_err();
        assert!(
            err.to_string().contains("single identifier"),
            "got: {err}"
        );
    }

    #[test]
    fn attribute_with_label_is_rejected() {
        let err = parse_file("t", b"a \"label\" = 5").unwrap_err();
        assert!(err.to_string().contains("may not have labels"), "got: {err}");
    }

    #[test]
    fn missing_body_reports_both_options() {
        let err = parse_file("t", b"a\n").unwrap_err();
        assert!(
            err.iter()
                .any(|e| e.message.contains("expected attribute assignment or block body")),
            "got: {err:?}"
        );
    }

    #[test]
    fn error_positions_are_resolved() {
        let err = parse_file("cfg.slc", b"a = 1\nb = ]\n").unwrap_err();
        let first = err.iter().next().unwrap();
        assert_eq!(first.position.line, 2);
        assert_eq!(first.position.filename, "cfg.slc");
    }

    #[test]
    fn recovery_continues_past_bad_statement() {
        // Both errors are reported rather than stopping at the first.
        let err = parse_file("t", b"a = ]\nb = [\n").unwrap_err();
        assert!(err.len() >= 2, "expected multiple errors, got {err}");
    }

    #[test]
    fn comments_are_grouped_by_adjacent_lines() {
        let f = file("# one\n# two\n\n# three\na = 1");
        assert_eq!(f.comments.len(), 2);
        assert_eq!(f.comments[0].0.len(), 2);
        assert_eq!(f.comments[0].0[0].text, "# one");
        assert_eq!(f.comments[1].0.len(), 1);
        assert_eq!(f.comments[1].0[0].text, "# three");
    }

    #[test]
    fn block_label_is_unquoted() {
        let f = file("b \"with \\\"quotes\\\"\" {\n}");
        let Stmt::Block(block) = &f.body[0] else {
            panic!("expected block");
        };
        assert_eq!(block.label.as_deref(), Some("with \"quotes\""));
    }

    #[test]
    fn empty_file_parses() {
        let f = file("");
        assert!(f.body.is_empty());
        assert_eq!(f.start_pos(), Pos::NONE);
    }

    #[test]
    fn statement_positions_nest_in_source() {
        let src = "outer {\n  a = 1 + 2\n}\n";
        let f = file(src);
        let stmt = &f.body[0];
        let Stmt::Block(block) = stmt else {
            panic!("expected block");
        };
        let inner = &block.body[0];

        assert!(stmt.start_pos() <= inner.start_pos());
        assert!(inner.start_pos() < inner.end_pos());
        assert!(inner.end_pos() <= stmt.end_pos());
        assert_eq!(stmt.end_pos().offset(), src.trim_end().len());
    }
}
