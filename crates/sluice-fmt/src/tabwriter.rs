//! A column-aligning writer.
//!
//! Input text is a stream of cells: horizontal tabs (`\t`) and vertical tabs
//! (`\v`) terminate cells, newlines terminate lines, and form feeds (`\f`)
//! terminate lines and end the current alignment section. Adjacent cells in
//! the same column of consecutive lines are padded to equal width. Cells
//! wrapped in [`ESCAPE`] bytes pass through uninterpreted (the escape bytes
//! themselves are stripped).
//!
//! Leading empty tab-terminated cells are indentation and are emitted as tab
//! characters; empty columns terminated entirely by vertical tabs are
//! discarded.

/// Bracket for text that must not be interpreted by the tab writer.
pub const ESCAPE: u8 = 0xff;

const TAB_WIDTH: usize = 8;
const PADDING: usize = 1;

#[derive(Default)]
struct Cell {
    text: Vec<u8>,
    /// Width in characters, excluding escape brackets.
    width: usize,
    /// True when the cell was terminated by a horizontal tab.
    htab: bool,
}

#[derive(Default)]
struct Line {
    cells: Vec<Cell>,
    /// False only for a final partial line with no trailing line break.
    terminated: bool,
}

/// Buffers cell-structured text and aligns columns on [`TabWriter::finish`].
#[derive(Default)]
pub struct TabWriter {
    lines: Vec<Line>,
    current: Vec<Cell>,
    cell: Cell,
    in_escape: bool,

    widths: Vec<usize>,
    out: Vec<u8>,
}

impl TabWriter {
    pub fn new() -> TabWriter {
        TabWriter::default()
    }

    /// Appends input text to the buffer.
    pub fn write(&mut self, data: &[u8]) {
        for &byte in data {
            if byte == ESCAPE {
                self.in_escape = !self.in_escape;
                continue;
            }
            if self.in_escape {
                self.push_byte(byte);
                continue;
            }
            match byte {
                b'\t' => self.terminate_cell(true),
                b'\x0b' => self.terminate_cell(false),
                b'\n' => self.terminate_line(true),
                b'\x0c' => {
                    self.terminate_line(true);
                    self.format_section();
                }
                _ => self.push_byte(byte),
            }
        }
    }

    /// Formats everything buffered and returns the aligned output.
    pub fn finish(mut self) -> Vec<u8> {
        if !self.cell.text.is_empty() || !self.current.is_empty() {
            // A trailing partial line with no line break.
            self.terminate_cell(false);
            self.lines.push(Line {
                cells: std::mem::take(&mut self.current),
                terminated: false,
            });
        }
        self.format_section();
        self.out
    }

    fn push_byte(&mut self, byte: u8) {
        // Count characters, not bytes: UTF-8 continuation bytes have no
        // width of their own.
        if byte & 0xC0 != 0x80 {
            self.cell.width += 1;
        }
        self.cell.text.push(byte);
    }

    fn terminate_cell(&mut self, htab: bool) {
        let mut cell = std::mem::take(&mut self.cell);
        cell.htab = htab;
        self.current.push(cell);
    }

    fn terminate_line(&mut self, terminated: bool) {
        self.terminate_cell(false);
        self.lines.push(Line {
            cells: std::mem::take(&mut self.current),
            terminated,
        });
    }

    fn format_section(&mut self) {
        let lines = std::mem::take(&mut self.lines);
        self.widths.clear();
        self.format(&lines, 0, lines.len());
    }

    /// Formats lines `[line0, line1)`, discovering one column per recursion
    /// level. A column block is a maximal run of consecutive lines which all
    /// have a cell in the current column; its width is the widest such cell
    /// plus padding.
    fn format(&mut self, lines: &[Line], line0: usize, line1: usize) {
        let column = self.widths.len();
        let mut line0 = line0;
        let mut this = line0;

        while this < line1 {
            if lines[this].cells.len() > column + 1 {
                // Column block begins: print everything up to this line.
                self.write_lines(lines, line0, this);
                line0 = this;

                let mut width = 0; // minwidth
                let mut discardable = true;
                while this < line1 {
                    let line = &lines[this];
                    if line.cells.len() <= column + 1 {
                        break;
                    }
                    let cell = &line.cells[column];
                    if cell.width + PADDING > width {
                        width = cell.width + PADDING;
                    }
                    if cell.width > 0 || cell.htab {
                        discardable = false;
                    }
                    this += 1;
                }

                if discardable {
                    // Empty columns terminated by vertical tabs vanish.
                    width = 0;
                }

                self.widths.push(width);
                self.format(lines, line0, this);
                self.widths.pop();
                line0 = this;

                // The breaking line has no cell in this column; skip it.
                if this < line1 {
                    this += 1;
                }
            } else {
                this += 1;
            }
        }

        self.write_lines(lines, line0, line1);
    }

    fn write_lines(&mut self, lines: &[Line], line0: usize, line1: usize) {
        for line in &lines[line0..line1] {
            // Leading empty cells are indentation, padded with tabs.
            let mut use_tabs = true;
            for (j, cell) in line.cells.iter().enumerate() {
                if j < self.widths.len() {
                    if use_tabs {
                        if cell.width == 0 {
                            self.write_padding(cell.width, self.widths[j], true);
                            continue;
                        }
                        use_tabs = false;
                    }
                    self.out.extend_from_slice(&cell.text);
                    self.write_padding(cell.width, self.widths[j], false);
                } else {
                    // The last cell of a line is never padded.
                    self.out.extend_from_slice(&cell.text);
                }
            }
            if line.terminated {
                self.out.push(b'\n');
            }
        }
    }

    fn write_padding(&mut self, text_width: usize, cell_width: usize, use_tabs: bool) {
        if use_tabs {
            // Round the cell up to a multiple of the tab width and emit one
            // tab per stop.
            let cell_width = cell_width.div_ceil(TAB_WIDTH) * TAB_WIDTH;
            let missing = cell_width.saturating_sub(text_width);
            for _ in 0..missing.div_ceil(TAB_WIDTH) {
                self.out.push(b'\t');
            }
            return;
        }

        for _ in 0..cell_width.saturating_sub(text_width) {
            self.out.push(b' ');
        }
    }
}
