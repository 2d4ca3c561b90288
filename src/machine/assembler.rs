//! Assembly and disassembly of UM32 program images.
//!
//! One statement per line: a mnemonic with comma-separated operands, or a
//! raw `0x`-prefixed word. `;` starts a comment; blank lines are skipped.
//!
//! # Assembly Format
//!
//! - Mnemonics are case-insensitive; each opcode is also reachable through
//!   its descriptive alias (`cmov`, `aidx`, `alloc`, ...).
//! - Register operands fill the trailing fields of the word: three operands
//!   populate A, B, C; two populate B, C; one populates C.
//! - Operands are integers (`0x`, `0o`, and `0b` prefixes accepted) or a
//!   character literal `'c'` standing for its code point.
//! - `ldi` takes a register and a 25-bit immediate.
//!
//! ```text
//! ldi 0, 'A'    ; r0 = 0x41
//! out 0         ; write it
//! hlt
//! ```

use crate::machine::errors::VmError;
use crate::machine::isa::{self, IMMEDIATE_MASK, Opcode, Word};
use std::fs;
use std::path::Path;

/// Assembles a source file into a program image.
pub fn assemble_file(path: impl AsRef<Path>) -> Result<Vec<Word>, VmError> {
    let source = fs::read_to_string(path)?;
    assemble_source(&source)
}

/// Assembles source text into a program image.
///
/// Errors carry the one-based line number of the offending statement.
pub fn assemble_source(source: &str) -> Result<Vec<Word>, VmError> {
    let mut words = Vec::new();
    for (index, line) in source.lines().enumerate() {
        if let Some(word) = assemble_line(index + 1, line)? {
            words.push(word);
        }
    }
    Ok(words)
}

/// Assembles one line; `None` for blank and comment-only lines.
fn assemble_line(line_no: usize, line: &str) -> Result<Option<Word>, VmError> {
    let code = line.split(';').next().unwrap_or("").trim();
    if code.is_empty() {
        return Ok(None);
    }

    let (head, rest) = match code.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (code, ""),
    };

    // A bare hex literal emits the raw word.
    if head.starts_with("0x") || head.starts_with("0X") {
        if !rest.is_empty() {
            return Err(VmError::InvalidOperand {
                line: line_no,
                token: rest.to_string(),
            });
        }
        let word = Word::from_str_radix(&head[2..], 16).map_err(|_| VmError::InvalidOperand {
            line: line_no,
            token: head.to_string(),
        })?;
        return Ok(Some(word));
    }

    let opcode = Opcode::from_mnemonic(&head.to_ascii_lowercase()).ok_or_else(|| {
        VmError::UnknownMnemonic {
            line: line_no,
            mnemonic: head.to_string(),
        }
    })?;

    let operands: Vec<Word> = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(',')
            .map(|token| parse_operand(line_no, token.trim()))
            .collect::<Result<_, _>>()?
    };

    if operands.len() != opcode.operand_count() {
        return Err(VmError::OperandCount {
            line: line_no,
            mnemonic: opcode.mnemonic(),
            expected: opcode.operand_count(),
            actual: operands.len(),
        });
    }

    let word = match opcode {
        Opcode::Ldi => {
            let reg = register_field(line_no, operands[0])?;
            let imm = operands[1];
            if imm > IMMEDIATE_MASK {
                return Err(VmError::InvalidOperand {
                    line: line_no,
                    token: format!("{imm:#x}"),
                });
            }
            isa::encode_ldi(reg, imm)
        }
        _ => {
            let mut fields = [0u8; 3];
            let start = 3 - operands.len();
            for (field, value) in fields[start..].iter_mut().zip(&operands) {
                *field = register_field(line_no, *value)?;
            }
            isa::encode(opcode, fields[0], fields[1], fields[2])
        }
    };
    Ok(Some(word))
}

/// Parses an integer or character-literal operand.
fn parse_operand(line_no: usize, token: &str) -> Result<Word, VmError> {
    let mut chars = token.chars();
    if let (Some('\''), Some(ch), Some('\''), None) =
        (chars.next(), chars.next(), chars.next(), chars.next())
    {
        return Ok(ch as Word);
    }

    let (digits, radix) = match token.get(..2) {
        Some("0x") | Some("0X") => (&token[2..], 16),
        Some("0o") | Some("0O") => (&token[2..], 8),
        Some("0b") | Some("0B") => (&token[2..], 2),
        _ => (token, 10),
    };
    Word::from_str_radix(digits, radix).map_err(|_| VmError::InvalidOperand {
        line: line_no,
        token: token.to_string(),
    })
}

/// Checks that a register operand fits its 3-bit field.
fn register_field(line_no: usize, value: Word) -> Result<u8, VmError> {
    if value > 7 {
        return Err(VmError::InvalidOperand {
            line: line_no,
            token: value.to_string(),
        });
    }
    Ok(value as u8)
}

/// Renders a program image as text, one statement per line.
pub fn disassemble(words: &[Word]) -> String {
    let mut out = String::new();
    for &word in words {
        out.push_str(&disassemble_word(word));
        out.push('\n');
    }
    out
}

/// Renders one instruction word in the assembly syntax.
///
/// Words with an undefined selector come back as raw hex so a disassembled
/// image still reassembles to the same words.
pub fn disassemble_word(word: Word) -> String {
    let Some(opcode) = Opcode::from_word(word) else {
        return format!("0x{word:08x} ; invalid opcode");
    };
    match opcode {
        Opcode::Ldi => {
            let reg = isa::ldi_reg(word);
            let imm = isa::ldi_imm(word);
            if (0x20..0x7f).contains(&imm) {
                format!("ldi {reg}, {imm:#x} ; '{}'", imm as u8 as char)
            } else {
                format!("ldi {reg}, {imm:#x}")
            }
        }
        _ => {
            let fields = [isa::reg_a(word), isa::reg_b(word), isa::reg_c(word)];
            let used = &fields[3 - opcode.operand_count()..];
            if used.is_empty() {
                opcode.mnemonic().to_string()
            } else {
                let operands: Vec<String> = used.iter().map(|field| field.to_string()).collect();
                format!("{} {}", opcode.mnemonic(), operands.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_the_smallest_program() {
        assert_eq!(assemble_source("hlt").unwrap(), vec![0x7000_0000]);
    }

    #[test]
    fn assembles_mnemonics_with_operands() {
        let words = assemble_source("ldi 0, 'A'\nout 0\nhlt").unwrap();
        assert_eq!(words, vec![0xD000_0041, 0xA000_0000, 0x7000_0000]);
    }

    #[test]
    fn operands_fill_trailing_fields() {
        // Three operands: A, B, C.
        assert_eq!(assemble_source("sta 1, 2, 3").unwrap(), vec![0x2000_0053]);
        // Two operands: B, C.
        assert_eq!(assemble_source("new 2, 1").unwrap(), vec![0x8000_0011]);
        // One operand: C.
        assert_eq!(assemble_source("del 5").unwrap(), vec![0x9000_0005]);
    }

    #[test]
    fn accepts_aliases_and_mixed_case() {
        assert_eq!(
            assemble_source("halt").unwrap(),
            assemble_source("HLT").unwrap()
        );
        assert_eq!(
            assemble_source("alloc 2, 1").unwrap(),
            assemble_source("new 2, 1").unwrap()
        );
        assert_eq!(
            assemble_source("nand 1, 2, 3").unwrap(),
            assemble_source("nan 1, 2, 3").unwrap()
        );
    }

    #[test]
    fn skips_blank_lines_and_comments() {
        let source = "\n; a comment\nhlt ; trailing\n\n";
        assert_eq!(assemble_source(source).unwrap(), vec![0x7000_0000]);
    }

    #[test]
    fn raw_hex_words_pass_through() {
        let words = assemble_source("0xE0000000\n0xdeadbeef").unwrap();
        assert_eq!(words, vec![0xE000_0000, 0xDEAD_BEEF]);
    }

    #[test]
    fn operand_radix_prefixes() {
        assert_eq!(
            assemble_source("ldi 0, 0x41").unwrap(),
            assemble_source("ldi 0, 65").unwrap()
        );
        assert_eq!(
            assemble_source("ldi 0, 0b1000001").unwrap(),
            assemble_source("ldi 0, 0o101").unwrap()
        );
    }

    #[test]
    fn unknown_mnemonic_reports_the_line() {
        let err = assemble_source("hlt\nbogus 1").unwrap_err();
        assert!(matches!(
            err,
            VmError::UnknownMnemonic { line: 2, ref mnemonic } if mnemonic == "bogus"
        ));
    }

    #[test]
    fn operand_count_is_checked() {
        assert!(matches!(
            assemble_source("add 1, 2").unwrap_err(),
            VmError::OperandCount {
                line: 1,
                mnemonic: "add",
                expected: 3,
                actual: 2,
            }
        ));
    }

    #[test]
    fn register_operands_must_fit_three_bits() {
        assert!(matches!(
            assemble_source("out 8").unwrap_err(),
            VmError::InvalidOperand { line: 1, .. }
        ));
    }

    #[test]
    fn ldi_immediate_must_fit_25_bits() {
        assert!(assemble_source("ldi 0, 0x1ffffff").is_ok());
        assert!(matches!(
            assemble_source("ldi 0, 0x2000000").unwrap_err(),
            VmError::InvalidOperand { line: 1, .. }
        ));
    }

    #[test]
    fn disassembles_known_words() {
        assert_eq!(disassemble_word(0x7000_0000), "hlt");
        assert_eq!(disassemble_word(0x2000_0053), "sta 1, 2, 3");
        assert_eq!(disassemble_word(0xD000_0041), "ldi 0, 0x41 ; 'A'");
        assert_eq!(disassemble_word(0xD000_0007), "ldi 0, 0x7");
        assert_eq!(disassemble_word(0xE000_0000), "0xe0000000 ; invalid opcode");
    }

    #[test]
    fn disassembly_reassembles_to_the_same_words() {
        let words = vec![
            0xD000_0041,
            0xA000_0000,
            0x8000_0011,
            0x2000_0053,
            0xE000_0001,
            0x7000_0000,
        ];
        let text = disassemble(&words);
        assert_eq!(assemble_source(&text).unwrap(), words);
    }
}
