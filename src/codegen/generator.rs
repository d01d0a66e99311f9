//! TM code generation
//!
//! The generator walks the annotated program and lays out one flat listing:
//! the prologue, the built-in `print`, then every definition in source order.
//! Calls jump to absolute addresses, so the layout runs twice:
//! 1. Sizing: emit everything with placeholder call targets and record where
//!    each function starts.
//! 2. Emission: emit again with the recorded addresses.
//!
//! Instruction counts never depend on a call target, so both passes lay out
//! the same code.
//!
//! Calling convention for a callee with `n` parameters and frame base `F`:
//!
//! | slot          | contents                       |
//! |---------------|--------------------------------|
//! | `F-1-n`       | result                         |
//! | `F-n .. F-1`  | arguments, first one at `F-1`  |
//! | `F+0`         | return address                 |
//! | `F+1 .. F+3`  | saved scratch registers        |
//! | `F+4`         | caller's status register       |
//! | `F+5`         | caller's top register          |
//!
//! Only integer literals generate code for now. Any other expression fails
//! with [`CodeGenerationError::UnsupportedExpression`].

use super::constants::*;
use super::tm::{Instruction, Listing};
use crate::parser::ast::{Body, Definition, Expr, FunctionCall, Program};
use crate::semantic::analyzer::{MAIN, PRINT};
use crate::semantic::SymbolTable;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Code generation error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeGenerationError {
    #[error("Klein Code Generation Error: Generating code for expression of type {node} is not yet implemented")]
    UnsupportedExpression { node: &'static str },

    #[error("Klein Code Generation Error: Missing {name} function")]
    MissingFunction { name: String },

    #[error("Klein Code Generation Error: {name} function symbol type is not a function")]
    NotAFunction { name: String },

    #[error("Klein Code Generation Error: Integer literal {text} does not fit in a machine word")]
    InvalidLiteral { text: String },
}

impl CodeGenerationError {
    /// Code generation errors are never anchored to a source position.
    pub fn position(&self) -> Option<crate::scanner::position::Position> {
        None
    }

    /// The message without its stage prefix
    pub fn message(&self) -> String {
        match self {
            CodeGenerationError::UnsupportedExpression { node } => format!(
                "Generating code for expression of type {} is not yet implemented",
                node
            ),
            CodeGenerationError::MissingFunction { name } => format!("Missing {} function", name),
            CodeGenerationError::NotAFunction { name } => {
                format!("{} function symbol type is not a function", name)
            }
            CodeGenerationError::InvalidLiteral { text } => {
                format!("Integer literal {} does not fit in a machine word", text)
            }
        }
    }
}

/// Generate the TM listing for an analyzed program.
///
/// `symbols` must be the table produced by semantic analysis of `program`.
pub fn generate(program: &Program, symbols: &SymbolTable) -> Result<Listing, CodeGenerationError> {
    let mut sizing = Generator::new(program, symbols, Pass::Sizing, FxHashMap::default());
    let draft = sizing.run()?;
    log::debug!(
        "sizing pass laid out {} instruction(s) over {} function(s)",
        draft.instruction_count(),
        sizing.addresses.len()
    );

    let mut emission = Generator::new(program, symbols, Pass::Emission, sizing.addresses);
    let listing = emission.run()?;
    log::info!(
        "code generation emitted {} instruction(s)",
        listing.instruction_count()
    );
    Ok(listing)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Sizing,
    Emission,
}

struct Generator<'a> {
    program: &'a Program,
    symbols: &'a SymbolTable,
    pass: Pass,
    /// Entry address of every function placed so far
    addresses: FxHashMap<String, i64>,
}

impl<'a> Generator<'a> {
    fn new(
        program: &'a Program,
        symbols: &'a SymbolTable,
        pass: Pass,
        addresses: FxHashMap<String, i64>,
    ) -> Self {
        Self {
            program,
            symbols,
            pass,
            addresses,
        }
    }

    fn run(&mut self) -> Result<Listing, CodeGenerationError> {
        let mut listing = self.prologue()?;

        self.place(PRINT, &listing);
        listing.append(self.print_function()?);

        for definition in &self.program.definitions.definitions {
            self.place(&definition.name.name, &listing);
            listing.append(self.function(definition)?);
        }
        Ok(listing)
    }

    // ===== Layout =====

    /// Record that `name` starts right after the code laid out so far.
    /// A name placed twice keeps its first address.
    fn place(&mut self, name: &str, listing: &Listing) {
        let address = listing.instruction_count() as i64;
        if self.pass == Pass::Sizing {
            log::trace!("function {} starts at {}", name, address);
        }
        self.addresses.entry(name.to_string()).or_insert(address);
    }

    fn address(&self, name: &str) -> Result<i64, CodeGenerationError> {
        match (self.addresses.get(name), self.pass) {
            (Some(address), _) => Ok(*address),
            (None, Pass::Sizing) => Ok(0),
            (None, Pass::Emission) => Err(CodeGenerationError::MissingFunction {
                name: name.to_string(),
            }),
        }
    }

    fn parameter_count(&self, name: &str) -> Result<usize, CodeGenerationError> {
        let symbol = self
            .symbols
            .lookup(name)
            .ok_or_else(|| CodeGenerationError::MissingFunction {
                name: name.to_string(),
            })?;
        symbol
            .parameter_types()
            .map(|parameters| parameters.len())
            .ok_or_else(|| CodeGenerationError::NotAFunction {
                name: name.to_string(),
            })
    }

    // ===== Sections =====

    fn prologue(&self) -> Result<Listing, CodeGenerationError> {
        let mut code = Listing::new();
        code.push(Instruction::ldc(REG_STATUS, INITIAL_STATUS));
        code.push(Instruction::ldc(REG_TOP, INITIAL_TOP));
        code.append(self.call(MAIN, &[])?);
        code.push_commented(
            Instruction::out(REG_RETURN_VALUE),
            "Printing main return value",
        );
        code.push(Instruction::halt());
        Ok(code)
    }

    fn print_function(&self) -> Result<Listing, CodeGenerationError> {
        let parameters = self.parameter_count(PRINT)?;

        let mut code = Listing::new();
        code.comment("");
        code.comment("Print function");
        code.comment("");
        code.append(entry_sequence());
        code.push_commented(Instruction::ld(REG_ARGUMENT, -1, REG_STATUS), "Load argument");
        code.push_commented(Instruction::out(REG_ARGUMENT), "Print value");
        code.comment("Nothing to do with return value");
        code.append(return_sequence(parameters));
        Ok(code)
    }

    fn function(&self, definition: &Definition) -> Result<Listing, CodeGenerationError> {
        let parameters = definition.parameters.parameters.len() as i64;

        let mut code = Listing::new();
        code.comment("");
        code.comment(format!("Function: {}", definition.name.name));
        code.comment("");
        code.append(entry_sequence());
        code.append(self.body(&definition.body)?);
        code.push_commented(
            Instruction::st(REG_RETURN_VALUE, -1 - parameters, REG_STATUS),
            "Store result",
        );
        code.append(return_sequence(definition.parameters.parameters.len()));
        Ok(code)
    }

    fn body(&self, body: &Body) -> Result<Listing, CodeGenerationError> {
        let mut code = Listing::new();
        for print in &body.prints {
            code.append(self.print_call(print)?);
        }
        code.append(self.expression(&body.tail, REG_RETURN_VALUE)?);
        Ok(code)
    }

    fn print_call(&self, print: &FunctionCall) -> Result<Listing, CodeGenerationError> {
        let argument = match print.arguments.arguments.as_slice() {
            [argument] => argument,
            _ => {
                return Err(CodeGenerationError::UnsupportedExpression {
                    node: "FunctionCallExpression",
                })
            }
        };

        let mut code = self.expression(&argument.value, REG_ARGUMENT)?;
        code.append(self.call(PRINT, &[REG_ARGUMENT])?);
        Ok(code)
    }

    fn expression(&self, expr: &Expr, register: u8) -> Result<Listing, CodeGenerationError> {
        match expr {
            Expr::IntegerLiteral(literal) => {
                let value = literal.text.parse::<i64>().map_err(|_| {
                    CodeGenerationError::InvalidLiteral {
                        text: literal.text.clone(),
                    }
                })?;
                let mut code = Listing::new();
                code.push(Instruction::ldc(register, value));
                Ok(code)
            }
            other => Err(CodeGenerationError::UnsupportedExpression {
                node: other.node_name(),
            }),
        }
    }

    // ===== Calling sequences =====

    /// Caller side of a call to `name`, with arguments already held in
    /// `arguments`, first argument first.
    ///
    /// The new frame always reserves the callee's declared argument slots,
    /// so its return sequence finds the return address even when fewer
    /// arguments are passed, as when the prologue calls `main`.
    fn call(&self, name: &str, arguments: &[u8]) -> Result<Listing, CodeGenerationError> {
        let target = self.address(name)?;
        let arity = self.parameter_count(name)?.max(arguments.len()) as i64;
        let frame = 1 + arity;

        let mut code = Listing::new();
        code.comment(format!("Calling {}", name));
        code.push_commented(
            Instruction::st(REG_STATUS, frame + SAVED_STATUS_SLOT, REG_TOP),
            "Store current status",
        );
        code.push_commented(
            Instruction::st(REG_TOP, frame + SAVED_TOP_SLOT, REG_TOP),
            "Store current top",
        );
        for (slot, register) in arguments.iter().rev().enumerate() {
            code.push_commented(
                Instruction::st(*register, slot as i64 + 1, REG_TOP),
                "Load value from register into arg slot",
            );
        }
        code.push_commented(Instruction::lda(REG_STATUS, frame, REG_TOP), "Update status");
        code.comment("Compute the return address in the top register, restored below");
        code.push(Instruction::ldc(REG_TOP, 3));
        code.push(Instruction::add(REG_TOP, REG_TOP, REG_PC));
        code.push_commented(
            Instruction::st(REG_TOP, RETURN_ADDRESS_SLOT, REG_STATUS),
            "Store return address",
        );
        code.push_commented(
            Instruction::lda(REG_TOP, FRAME_SIZE, REG_STATUS),
            "Restore top reg to its real value",
        );
        code.push_commented(Instruction::ldc(REG_PC, target), format!("Jump to {}", name));
        code.comment(format!("Returning from {}", name));
        Ok(code)
    }
}

/// Callee side on entry: save the scratch registers into the frame.
fn entry_sequence() -> Listing {
    let mut code = Listing::new();
    for register in SCRATCH_REGISTERS {
        code.push(Instruction::st(register, register as i64, REG_STATUS));
    }
    code
}

/// Callee side on return: restore the scratch registers and the caller's
/// pointers, then jump back.
fn return_sequence(parameters: usize) -> Listing {
    let mut code = Listing::new();
    for register in SCRATCH_REGISTERS {
        code.push(Instruction::ld(register, register as i64, REG_STATUS));
    }
    code.push_commented(
        Instruction::ld(REG_TOP, SAVED_TOP_SLOT, REG_STATUS),
        "Restore top pointer",
    );
    code.push_commented(
        Instruction::ld(REG_STATUS, SAVED_STATUS_SLOT, REG_STATUS),
        "Restore status pointer",
    );
    code.push_commented(
        Instruction::ld(REG_PC, 1 + parameters as i64, REG_TOP),
        "Restore the pc",
    );
    code
}
