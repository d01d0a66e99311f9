//! TM machine instructions and assembly listings
//!
//! Instructions come in two formats:
//! - register only (RO): `OP r,s,t`
//! - register memory (RM): `OP r,d(s)`
//!
//! A [`Listing`] is an ordered mix of instructions and comment lines.
//! Instructions are numbered from 0 in order, so an instruction's number is
//! its address. Column widths are computed over the whole listing before
//! anything is rendered.

use super::constants::REG_ZERO;
use std::fmt;

/// Register-only operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoOp {
    In,
    Out,
    Add,
    Sub,
    Mul,
    Div,
    Halt,
}

/// Register-memory operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RmOp {
    Ld,
    Lda,
    Ldc,
    St,
    Jlt,
    Jle,
    Jeq,
    Jne,
    Jge,
    Jgt,
}

impl RoOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            RoOp::In => "IN",
            RoOp::Out => "OUT",
            RoOp::Add => "ADD",
            RoOp::Sub => "SUB",
            RoOp::Mul => "MUL",
            RoOp::Div => "DIV",
            RoOp::Halt => "HALT",
        }
    }
}

impl RmOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            RmOp::Ld => "LD",
            RmOp::Lda => "LDA",
            RmOp::Ldc => "LDC",
            RmOp::St => "ST",
            RmOp::Jlt => "JLT",
            RmOp::Jle => "JLE",
            RmOp::Jeq => "JEQ",
            RmOp::Jne => "JNE",
            RmOp::Jge => "JGE",
            RmOp::Jgt => "JGT",
        }
    }
}

/// A single machine instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Ro { op: RoOp, r: u8, s: u8, t: u8 },
    Rm { op: RmOp, r: u8, d: i64, s: u8 },
}

impl Instruction {
    /// `reg[r] = value`
    pub fn ldc(r: u8, value: i64) -> Self {
        Instruction::Rm {
            op: RmOp::Ldc,
            r,
            d: value,
            s: REG_ZERO,
        }
    }

    /// `reg[r] = mem[d + reg[s]]`
    pub fn ld(r: u8, d: i64, s: u8) -> Self {
        Instruction::Rm { op: RmOp::Ld, r, d, s }
    }

    /// `reg[r] = d + reg[s]`
    pub fn lda(r: u8, d: i64, s: u8) -> Self {
        Instruction::Rm { op: RmOp::Lda, r, d, s }
    }

    /// `mem[d + reg[s]] = reg[r]`
    pub fn st(r: u8, d: i64, s: u8) -> Self {
        Instruction::Rm { op: RmOp::St, r, d, s }
    }

    pub fn add(r: u8, s: u8, t: u8) -> Self {
        Instruction::Ro { op: RoOp::Add, r, s, t }
    }

    pub fn out(r: u8) -> Self {
        Instruction::Ro { op: RoOp::Out, r, s: 0, t: 0 }
    }

    pub fn halt() -> Self {
        Instruction::Ro { op: RoOp::Halt, r: 0, s: 0, t: 0 }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Ro { op, .. } => op.mnemonic(),
            Instruction::Rm { op, .. } => op.mnemonic(),
        }
    }

    /// Operand field, `r,s,t` or `r,d(s)`
    pub fn operands(&self) -> String {
        match self {
            Instruction::Ro { r, s, t, .. } => format!("{},{},{}", r, s, t),
            Instruction::Rm { r, d, s, .. } => format!("{},{}({})", r, d, s),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.mnemonic(), self.operands())
    }
}

/// One line of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Instruction {
        instruction: Instruction,
        comment: Option<String>,
    },
    Comment(String),
}

/// Ordered assembly listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    lines: Vec<Line>,
}

impl Listing {
    pub fn new() -> Self {
        Listing::default()
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.lines.push(Line::Instruction {
            instruction,
            comment: None,
        });
    }

    pub fn push_commented(&mut self, instruction: Instruction, comment: impl Into<String>) {
        self.lines.push(Line::Instruction {
            instruction,
            comment: Some(comment.into()),
        });
    }

    pub fn comment(&mut self, text: impl Into<String>) {
        self.lines.push(Line::Comment(text.into()));
    }

    pub fn append(&mut self, other: Listing) {
        self.lines.extend(other.lines);
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Instructions in address order
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.lines.iter().filter_map(|line| match line {
            Line::Instruction { instruction, .. } => Some(instruction),
            Line::Comment(_) => None,
        })
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions().count()
    }

    fn widths(&self) -> ColumnWidths {
        let count = self.instruction_count();
        let mut widths = ColumnWidths {
            number: count.saturating_sub(1).to_string().len(),
            mnemonic: 0,
            operands: 0,
        };
        for instruction in self.instructions() {
            widths.mnemonic = widths.mnemonic.max(instruction.mnemonic().len());
            widths.operands = widths.operands.max(instruction.operands().len());
        }
        widths
    }
}

/// Column widths shared by every line of one listing
struct ColumnWidths {
    number: usize,
    mnemonic: usize,
    operands: usize,
}

/// Renders `N: MNEMONIC OPERANDS ; comment` per instruction and `* text` per
/// comment line, aligned across the listing.
impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        let mut address = 0;

        for line in &self.lines {
            let rendered = match line {
                Line::Comment(text) => format!("* {}", text),
                Line::Instruction {
                    instruction,
                    comment,
                } => {
                    let mut text = format!(
                        "{:>number$}: {:<mnemonic$} {:<operands$}",
                        address,
                        instruction.mnemonic(),
                        instruction.operands(),
                        number = widths.number,
                        mnemonic = widths.mnemonic,
                        operands = widths.operands,
                    );
                    if let Some(comment) = comment {
                        text.push_str(" ; ");
                        text.push_str(comment);
                    }
                    address += 1;
                    text
                }
            };
            writeln!(f, "{}", rendered.trim_end())?;
        }
        Ok(())
    }
}
