//! Walks an AST, sending lexical tokens and formatting information to a
//! printer.

use sluice_ast::{
    ArrayExpr, AttributeStmt, BinOp, BlockStmt, Expr, File, LitKind, ObjectExpr, Stmt, UnaryOp,
};
use sluice_syntax::{quote, Token};

use crate::printer::{Printer, Ws};

pub(crate) fn walk_file(p: &mut Printer<'_>, file: &File) {
    walk_stmts(p, &file.body);
}

fn walk_stmts(p: &mut Printer<'_>, stmts: &[Stmt]) {
    for (i, stmt) in stmts.iter().enumerate() {
        let mut added_spacing = false;

        // Two successive blocks are always separated by a blank line.
        if i > 0 && matches!(stmt, Stmt::Block(_)) {
            p.write_ws(Ws::Newline);
            added_spacing = true;
        }

        // A blank line in the source between two statements is kept.
        if i > 0 && !added_spacing {
            let prev_line = p.line_of(stmts[i - 1].end_pos());
            let cur_line = p.line_of(stmt.start_pos());
            if cur_line.saturating_sub(prev_line) > 1 {
                p.write_ws(Ws::Formfeed);
            }
        }

        walk_stmt(p, stmt);

        // Statements which cross multiple lines don't belong to the same
        // alignment run; end the run with a formfeed.
        if node_lines(p, stmt) > 1 {
            p.write_ws(Ws::Formfeed);
        } else {
            p.write_ws(Ws::Newline);
        }
    }
}

fn node_lines(p: &Printer<'_>, stmt: &Stmt) -> usize {
    let start = p.line_of(stmt.start_pos());
    let end = p.line_of(stmt.end_pos());
    end.saturating_sub(start) + 1
}

fn walk_stmt(p: &mut Printer<'_>, stmt: &Stmt) {
    match stmt {
        Stmt::Attribute(attr) => walk_attribute(p, attr),
        Stmt::Block(block) => walk_block(p, block),
    }
}

fn walk_attribute(p: &mut Printer<'_>, attr: &AttributeStmt) {
    p.write_ident(&attr.name.name, attr.name.pos);
    p.write_ws(Ws::VTab);
    p.write_token(Token::Assign);
    p.write_ws(Ws::Blank);
    walk_expr(p, &attr.value);
}

fn walk_block(p: &mut Printer<'_>, block: &BlockStmt) {
    p.write_ident(&block.joined_name(), block.name_pos);

    if let Some(label) = &block.label {
        p.write_ws(Ws::Blank);
        p.write_literal(Token::String, &quote(label), block.label_pos);
    }

    p.write_ws(Ws::Blank);
    p.write_token_at(Token::LCurly, block.lcurly);
    p.write_ws(Ws::Indent);
    p.write_ws(Ws::Newline);

    walk_stmts(p, &block.body);

    p.write_ws(Ws::Unindent);
    p.write_token_at(Token::RCurly, block.rcurly);
}

fn walk_expr(p: &mut Printer<'_>, expr: &Expr) {
    match expr {
        Expr::Literal(lit) => {
            p.write_literal(literal_token(lit.kind), &lit.value, lit.pos);
        }

        Expr::Identifier(ident) => p.write_ident(&ident.name, ident.pos),

        Expr::Array(array) => walk_array(p, array),

        Expr::Object(object) => walk_object(p, object),

        Expr::Access(access) => {
            walk_expr(p, &access.value);
            p.write_token(Token::Dot);
            p.write_ident(&access.name.name, access.name.pos);
        }

        Expr::Index(index) => {
            walk_expr(p, &index.value);
            p.write_token_at(Token::LBrack, index.lbrack);
            walk_expr(p, &index.index);
            p.write_token_at(Token::RBrack, index.rbrack);
        }

        Expr::Call(call) => {
            walk_expr(p, &call.value);
            p.write_token_at(Token::LParen, call.lparen);
            for (i, arg) in call.args.iter().enumerate() {
                walk_expr(p, arg);
                if i + 1 < call.args.len() {
                    p.write_token(Token::Comma);
                    p.write_ws(Ws::Blank);
                }
            }
            p.write_token_at(Token::RParen, call.rparen);
        }

        Expr::Unary(unary) => {
            p.write_token_at(unary_token(unary.op), unary.op_pos);
            walk_expr(p, &unary.operand);
        }

        Expr::Binary(binary) => {
            walk_expr(p, &binary.lhs);
            p.write_ws(Ws::Blank);
            p.write_token_at(binop_token(binary.op), binary.op_pos);
            p.write_ws(Ws::Blank);
            walk_expr(p, &binary.rhs);
        }

        Expr::Paren(paren) => {
            p.write_token_at(Token::LParen, paren.lparen);
            walk_expr(p, &paren.inner);
            p.write_token_at(Token::RParen, paren.rparen);
        }
    }
}

fn walk_array(p: &mut Printer<'_>, array: &ArrayExpr) {
    p.write_token_at(Token::LBrack, array.lbrack);
    let mut prev_pos = array.lbrack;

    for (i, element) in array.elements.iter().enumerate() {
        let mut added_newline = false;

        // Elements starting on a new line keep their line, indented.
        if p.different_lines(prev_pos, element.start_pos()) {
            p.write_ws(Ws::Formfeed);
            p.write_ws(Ws::Indent);
            added_newline = true;
        } else if i > 0 {
            p.write_ws(Ws::Blank);
        }
        prev_pos = element.end_pos();

        walk_expr(p, element);

        if i + 1 < array.elements.len() {
            p.write_token(Token::Comma);
        }
        if added_newline {
            p.write_ws(Ws::Unindent);
        }
    }

    // A closing bracket on its own line gets a trailing comma.
    if !array.elements.is_empty() && p.different_lines(prev_pos, array.rbrack) {
        p.write_token(Token::Comma);
        p.write_ws(Ws::Formfeed);
    }

    p.write_token_at(Token::RBrack, array.rbrack);
}

fn walk_object(p: &mut Printer<'_>, object: &ObjectExpr) {
    p.write_token_at(Token::LCurly, object.lcurly);
    p.write_ws(Ws::Indent);

    let mut prev_pos = object.lcurly;

    for (i, field) in object.fields.iter().enumerate() {
        if p.different_lines(prev_pos, field.name.pos) {
            p.write_ws(Ws::Formfeed);
        } else if i > 0 {
            p.write_ws(Ws::Blank);
        }
        prev_pos = field.name.pos.add(field.name.name.len());

        // Quoted field names keep their quotes.
        if field.quoted {
            p.write_literal(Token::String, &quote(&field.name.name), field.name.pos);
        } else {
            p.write_ident(&field.name.name, field.name.pos);
        }

        p.write_ws(Ws::VTab);
        p.write_token(Token::Assign);
        p.write_ws(Ws::Blank);
        walk_expr(p, &field.value);

        if i + 1 < object.fields.len() {
            p.write_token(Token::Comma);
        }
    }

    // A closing brace on its own line gets a trailing comma.
    if !object.fields.is_empty() && p.different_lines(prev_pos, object.rcurly) {
        p.write_token(Token::Comma);
        p.write_ws(Ws::Formfeed);
    }

    p.write_ws(Ws::Unindent);
    p.write_token_at(Token::RCurly, object.rcurly);
}

fn literal_token(kind: LitKind) -> Token {
    match kind {
        LitKind::Number => Token::Number,
        LitKind::Float => Token::Float,
        LitKind::String => Token::String,
        LitKind::Bool => Token::Bool,
        LitKind::Null => Token::Null,
    }
}

fn unary_token(op: UnaryOp) -> Token {
    match op {
        UnaryOp::Not => Token::Not,
        UnaryOp::Neg => Token::Sub,
    }
}

fn binop_token(op: BinOp) -> Token {
    match op {
        BinOp::Or => Token::Or,
        BinOp::And => Token::And,
        BinOp::Eq => Token::Eq,
        BinOp::Neq => Token::Neq,
        BinOp::Lt => Token::Lt,
        BinOp::Lte => Token::Lte,
        BinOp::Gt => Token::Gt,
        BinOp::Gte => Token::Gte,
        BinOp::Add => Token::Add,
        BinOp::Sub => Token::Sub,
        BinOp::Mul => Token::Mul,
        BinOp::Div => Token::Div,
        BinOp::Mod => Token::Mod,
        BinOp::Pow => Token::Pow,
    }
}
