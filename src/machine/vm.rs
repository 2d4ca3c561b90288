//! Core virtual machine implementation.
//!
//! The machine executes a program image with a register-based architecture:
//! eight 32-bit registers, a program counter, and an identifier-addressed
//! array table. All arithmetic uses wrapping semantics, and every fault ends
//! execution.

mod arrays;
mod registers;

use crate::machine::console::Console;
use crate::machine::errors::VmError;
use crate::machine::isa::{self, Opcode, Word};
use crate::machine::program::Program;
use arrays::ArrayTable;
use registers::Registers;

/// Value `inp` stores when the input stream is exhausted.
pub const EOF_SENTINEL: Word = 0xffff_ffff;

/// Signal returned by instruction execution to the dispatch loop.
enum Step {
    Continue,
    Halt,
}

/// Register machine executing a UM32 program image.
///
/// The machine owns its registers, program counter, array table, and
/// console for its whole lifetime; nothing outside it can observe or
/// mutate them.
pub struct Machine<C: Console> {
    arrays: ArrayTable,
    registers: Registers,
    pc: Word,
    console: C,
}

impl<C: Console> Machine<C> {
    /// Creates a machine with the given initial program image.
    ///
    /// Registers and the program counter start at zero; array identifier 0
    /// refers to the image.
    pub fn new(program: Program, console: C) -> Machine<C> {
        Machine {
            arrays: ArrayTable::new(program),
            registers: Registers::new(),
            pc: 0,
            console,
        }
    }

    /// Runs the fetch-decode-execute loop until `hlt` or a fault.
    pub fn run(&mut self) -> Result<(), VmError> {
        loop {
            if let Step::Halt = self.step()? {
                return Ok(());
            }
        }
    }

    /// Executes a single instruction cycle.
    fn step(&mut self) -> Result<Step, VmError> {
        let address = self.pc;
        let word = self
            .arrays
            .program()
            .word(address)
            .ok_or(VmError::PcOutOfBounds {
                pc: address,
                len: self.arrays.program().len(),
            })?;
        self.pc = address.wrapping_add(1);

        let opcode =
            Opcode::from_word(word).ok_or(VmError::InvalidInstruction { word, address })?;
        let (a, b, c) = (isa::reg_a(word), isa::reg_b(word), isa::reg_c(word));

        match opcode {
            Opcode::Mov => self.op_mov(a, b, c),
            Opcode::Lda => self.op_lda(a, b, c)?,
            Opcode::Sta => self.op_sta(a, b, c)?,
            Opcode::Add => self.op_add(a, b, c),
            Opcode::Mul => self.op_mul(a, b, c),
            Opcode::Div => self.op_div(a, b, c)?,
            Opcode::Nan => self.op_nan(a, b, c),
            Opcode::Hlt => return Ok(Step::Halt),
            Opcode::New => self.op_new(b, c),
            Opcode::Del => self.op_del(c)?,
            Opcode::Out => self.op_out(c)?,
            Opcode::Inp => self.op_inp(c)?,
            Opcode::Prg => self.op_prg(b, c)?,
            Opcode::Ldi => self.op_ldi(isa::ldi_reg(word), isa::ldi_imm(word)),
        }
        Ok(Step::Continue)
    }

    fn op_mov(&mut self, a: u8, b: u8, c: u8) {
        if self.registers.get(c) != 0 {
            self.registers.set(a, self.registers.get(b));
        }
    }

    fn op_lda(&mut self, a: u8, b: u8, c: u8) -> Result<(), VmError> {
        let value = self
            .arrays
            .read(self.registers.get(b), self.registers.get(c))?;
        self.registers.set(a, value);
        Ok(())
    }

    fn op_sta(&mut self, a: u8, b: u8, c: u8) -> Result<(), VmError> {
        self.arrays.write(
            self.registers.get(a),
            self.registers.get(b),
            self.registers.get(c),
        )
    }

    fn op_add(&mut self, a: u8, b: u8, c: u8) {
        let sum = self.registers.get(b).wrapping_add(self.registers.get(c));
        self.registers.set(a, sum);
    }

    fn op_mul(&mut self, a: u8, b: u8, c: u8) {
        let product = self.registers.get(b).wrapping_mul(self.registers.get(c));
        self.registers.set(a, product);
    }

    fn op_div(&mut self, a: u8, b: u8, c: u8) -> Result<(), VmError> {
        let divisor = self.registers.get(c);
        if divisor == 0 {
            return Err(VmError::DivisionByZero);
        }
        self.registers.set(a, self.registers.get(b) / divisor);
        Ok(())
    }

    fn op_nan(&mut self, a: u8, b: u8, c: u8) {
        let value = !(self.registers.get(b) & self.registers.get(c));
        self.registers.set(a, value);
    }

    fn op_new(&mut self, b: u8, c: u8) {
        let id = self.arrays.allocate(self.registers.get(c));
        self.registers.set(b, id);
    }

    fn op_del(&mut self, c: u8) -> Result<(), VmError> {
        self.arrays.free(self.registers.get(c))
    }

    fn op_out(&mut self, c: u8) -> Result<(), VmError> {
        let value = self.registers.get(c);
        if value > 0xff {
            return Err(VmError::CharacterRange { value });
        }
        self.console.output(value as u8)
    }

    fn op_inp(&mut self, c: u8) -> Result<(), VmError> {
        let value = match self.console.input()? {
            Some(byte) => byte as Word,
            None => EOF_SENTINEL,
        };
        self.registers.set(c, value);
        Ok(())
    }

    fn op_prg(&mut self, b: u8, c: u8) -> Result<(), VmError> {
        let id = self.registers.get(b);
        // With a zero source the image is untouched and prg is an absolute
        // jump.
        if id != 0 {
            self.arrays.load_program(id)?;
        }
        self.pc = self.registers.get(c);
        Ok(())
    }

    fn op_ldi(&mut self, reg: u8, imm: Word) {
        self.registers.set(reg, imm);
    }
}
