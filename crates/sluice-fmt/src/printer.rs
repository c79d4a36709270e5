//! The low-level printing machinery.
//!
//! The printer writes lexical tokens and whitespace into an internal buffer
//! which is post-processed by the [tab writer](crate::tabwriter).
//! Whitespace is queued and only written immediately before the next
//! non-whitespace token, which is where pending comments are interleaved.

use sluice_ast::{CommentGroup, Pos, SourceFile};
use sluice_syntax::Token;

use crate::tabwriter::ESCAPE;

/// Maximum number of consecutive line breaks between text blocks.
const MAX_NEWLINES: usize = 2;

fn nlimit(n: usize) -> usize {
    n.min(MAX_NEWLINES)
}

/// Queued whitespace instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ws {
    Blank,
    /// Column separator understood by the tab writer.
    VTab,
    Newline,
    /// Line break that also ends the current alignment run.
    Formfeed,
    Indent,
    Unindent,
}

/// A lightweight text position.
#[derive(Debug, Clone, Copy)]
struct LineCol {
    offset: usize,
    line: usize,
    column: usize,
}

impl LineCol {
    fn start() -> LineCol {
        LineCol {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

pub(crate) struct Printer<'a> {
    file: &'a SourceFile,
    comments: &'a [CommentGroup],
    next_comment: usize,

    pub(crate) output: Vec<u8>,
    indent: usize,
    whitespace: Vec<Ws>,
    /// When set, a line break at this point implies a statement terminator,
    /// so source line gaps must not be reproduced here.
    implied_term: bool,
    /// Last token printed (Illegal when it was whitespace).
    last_tok: Token,

    pos: LineCol, // position in AST space
    out: LineCol, // position in output space
}

impl<'a> Printer<'a> {
    pub(crate) fn new(file: &'a SourceFile, comments: &'a [CommentGroup]) -> Printer<'a> {
        Printer {
            file,
            comments,
            next_comment: 0,
            output: Vec::new(),
            indent: 0,
            whitespace: Vec::with_capacity(16),
            implied_term: false,
            last_tok: Token::Illegal,
            pos: LineCol::start(),
            out: LineCol::start(),
        }
    }

    pub(crate) fn line_of(&self, pos: Pos) -> usize {
        self.file.position_for(pos).line
    }

    pub(crate) fn different_lines(&self, a: Pos, b: Pos) -> bool {
        self.line_of(a) != self.line_of(b)
    }

    // -- Writing --

    pub(crate) fn write_ws(&mut self, ws: Ws) {
        if matches!(ws, Ws::Newline | Ws::Formfeed) {
            self.implied_term = false;
        }
        self.last_tok = Token::Illegal;
        self.whitespace.push(ws);
    }

    pub(crate) fn write_ident(&mut self, name: &str, pos: Pos) {
        self.last_tok = Token::Ident;
        self.write_text(pos, name, false, true);
    }

    /// Writes a literal. The text is escaped so the tab writer leaves it
    /// untouched, and `tok` records the literal's class for token-combination
    /// checks.
    pub(crate) fn write_literal(&mut self, tok: Token, text: &str, pos: Pos) {
        self.last_tok = tok;
        self.write_text(pos, text, true, true);
    }

    pub(crate) fn write_token(&mut self, tok: Token) {
        self.write_token_at(tok, Pos::NONE);
    }

    pub(crate) fn write_token_at(&mut self, tok: Token, pos: Pos) {
        let text = tok.as_str();
        if may_combine(self.last_tok, text.as_bytes()[0]) && self.whitespace.is_empty() {
            // Combining the tokens would form a different token sequence.
            self.whitespace.push(Ws::Blank);
        }

        // A closing delimiter followed by a newline implies a terminator.
        let implied = matches!(tok, Token::RBrack | Token::RParen | Token::RCurly);
        self.last_tok = tok;
        self.write_text(pos, text, false, implied);
    }

    fn write_text(&mut self, pos: Pos, data: &str, is_lit: bool, implied_after: bool) {
        let next = if pos.is_valid() {
            let position = self.file.position_for(pos);
            LineCol {
                offset: position.offset,
                line: position.line,
                column: position.column,
            }
        } else {
            self.pos
        };

        let wrote_newline = self.flush(pos.is_valid().then_some(next.offset));

        // Intersperse extra line breaks present in the source, as long as
        // they don't create synthetic terminators.
        if !self.implied_term {
            let mut n = nlimit(next.line.saturating_sub(self.pos.line));
            if wrote_newline && n == MAX_NEWLINES {
                n = MAX_NEWLINES - 1;
            }
            if n > 0 {
                self.write_byte(b'\n', n);
            }
        }

        self.write_string(next, data, is_lit);
        self.implied_term = implied_after;
    }

    /// Prints pending comments occurring textually before `next_offset`,
    /// then any queued whitespace. Reports whether a line break was written.
    fn flush(&mut self, next_offset: Option<usize>) -> bool {
        let mut wrote_newline = false;
        if let Some(limit) = next_offset {
            let comments = self.comments;
            while self.next_comment < comments.len() {
                let group = &comments[self.next_comment];
                let start = group.start_pos();
                if !start.is_valid() || start.offset() >= limit {
                    break;
                }
                wrote_newline |= self.write_comment_group(group);
                self.next_comment += 1;
            }
        }
        wrote_newline |= self.write_whitespace(self.whitespace.len());
        wrote_newline
    }

    fn write_comment_group(&mut self, group: &CommentGroup) -> bool {
        let mut wrote_newline = false;
        for comment in &group.0 {
            let loc = self.file.position_for(comment.pos);
            let next = LineCol {
                offset: loc.offset,
                line: loc.line,
                column: loc.column,
            };

            if self.out.column > 1 && loc.line == self.pos.line {
                // Trailing comment: attach it to the current line.
                self.write_byte(b' ', 1);
            } else {
                // The comment sits on its own line: emit whatever whitespace
                // is queued, then pad down to the comment's line.
                wrote_newline |= self.write_whitespace(self.whitespace.len());
                let n = nlimit(loc.line.saturating_sub(self.pos.line));
                if n > 0 {
                    self.write_byte(b'\n', n);
                    wrote_newline = true;
                }
            }

            self.write_string(next, &comment.text, true);
            self.last_tok = Token::Comment;
        }
        wrote_newline
    }

    /// Emits every remaining comment. Queued whitespace after the last
    /// token is intentionally dropped.
    pub(crate) fn finish(&mut self) {
        let comments = self.comments;
        while self.next_comment < comments.len() {
            let group = &comments[self.next_comment];
            self.write_comment_group(group);
            self.next_comment += 1;
        }
    }

    fn write_whitespace(&mut self, n: usize) -> bool {
        let mut wrote_newline = false;
        for i in 0..n {
            match self.whitespace[i] {
                Ws::Indent => self.indent += 1,
                Ws::Unindent => {
                    self.indent = self
                        .indent
                        .checked_sub(1)
                        .expect("negative indentation");
                }
                Ws::Blank => self.write_byte(b' ', 1),
                Ws::VTab => self.write_byte(b'\x0b', 1),
                Ws::Newline => {
                    self.write_byte(b'\n', 1);
                    wrote_newline = true;
                }
                Ws::Formfeed => {
                    self.write_byte(b'\x0c', 1);
                    wrote_newline = true;
                }
            }
        }
        self.whitespace.drain(..n);
        wrote_newline
    }

    /// Writes the literal string `data` into the output. Text marked as a
    /// literal is escaped so the tab writer does not interpret it.
    fn write_string(&mut self, next: LineCol, data: &str, is_lit: bool) {
        if self.out.column == 1 {
            // Nothing written on this line yet; prepend the indentation.
            self.write_indent();
        }

        // Interpret `next` as the literal position of `data`, after the
        // indentation updated our own idea of the position.
        self.pos = next;

        if is_lit {
            self.output.push(ESCAPE);
        }
        self.output.extend_from_slice(data.as_bytes());
        if is_lit {
            self.output.push(ESCAPE);
        }

        let width = data.chars().count();
        self.pos.offset += data.len();
        self.pos.column += width;
        self.out.column += width;
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push(b'\t');
        }
        self.pos.offset += self.indent;
        self.pos.column += self.indent;
        self.out.column += self.indent;
    }

    /// Writes `ch` `n` times. Only used for whitespace characters.
    fn write_byte(&mut self, ch: u8, n: usize) {
        if self.out.column == 1 {
            self.write_indent();
        }

        for _ in 0..n {
            self.output.push(ch);
        }

        self.pos.offset += n;
        if ch == b'\n' || ch == b'\x0c' {
            self.pos.line += n;
            self.out.line += n;
            self.pos.column = 1;
            self.out.column = 1;
            return;
        }
        self.pos.column += n;
        self.out.column += n;
    }
}

/// True when `prev` directly followed by `next` would scan as a different
/// token sequence (`1.` then `.` or `/` then `*`).
fn may_combine(prev: Token, next: u8) -> bool {
    match prev {
        Token::Number => next == b'.',
        Token::Div => next == b'*',
        _ => false,
    }
}
