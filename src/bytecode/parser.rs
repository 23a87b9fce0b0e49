//! Decoder for the textual `tbcload` container.
//!
//! The container starts with a [`Header`] line and is followed by one [`Bytecode`] unit. Every
//! unit begins with thirteen size fields, then carries its instruction bytes and
//! command-location tables base-85 encoded, followed by its literal, exception range and
//! auxiliary data arrays. Procedure bodies append their argument count and local table.
//! Nested script and procedure literals recurse into the same layout.

use crate::{
    bytecode::{
        AuxData, AuxDataType, Bytecode, BytecodeInfo, BytecodeKind, DictUpdateInfo,
        ExceptionRange, ExceptionType, ForeachInfo, Header, JumptableInfo, Literal, LiteralType,
        Local, LocalFlags, Version,
    },
    code::CodeRange,
    file::{parser::Parser, reader::BytecodeReader},
    Result,
};

/// Magic string every container starts with.
pub const TCL_BYTECODE_MAGIC: &str = "TclPro ByteCode";

/// Parser for a complete `tbcload` payload.
///
/// The header is decoded eagerly by [`BytecodeParser::new`]; [`BytecodeParser::parse`] then
/// decodes the top-level unit.
///
/// # Examples
///
/// ```rust
/// use tclscope::bytecode::BytecodeParser;
///
/// let parser = BytecodeParser::new("TclPro ByteCode 2 0 1.4 8.6\n1 0 0 0 0 0 0 0 0 0 0 0 0\n0\n0\n0\n0")?;
/// assert_eq!(parser.header().tcl_version.to_string(), "8.6");
/// # Ok::<(), tclscope::Error>(())
/// ```
pub struct BytecodeParser<'a> {
    reader: BytecodeReader<'a>,
    header: Header,
}

impl<'a> BytecodeParser<'a> {
    /// Creates a parser and decodes the container header.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the magic string or version fields are missing.
    pub fn new(text: &'a str) -> Result<Self> {
        let mut reader = BytecodeReader::new(text.trim_start());
        let header = Self::parse_header(&mut reader)?;
        Ok(BytecodeParser { reader, header })
    }

    /// The decoded container header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Decodes the top-level bytecode unit.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] or [`crate::Error::OutOfBounds`] if the unit is
    /// damaged or truncated.
    pub fn parse(&mut self) -> Result<Bytecode> {
        self.parse_bytecode(BytecodeKind::Code)
    }

    fn parse_header(reader: &mut BytecodeReader<'_>) -> Result<Header> {
        if !reader.matches(TCL_BYTECODE_MAGIC) {
            return Err(malformed_error!("Missing '{}' header", TCL_BYTECODE_MAGIC));
        }

        let format = reader.read_integer()?;
        let build = reader.read_integer()?;
        let compiler_version = Self::parse_version(reader)?;
        let tcl_version = Self::parse_version(reader)?;

        Ok(Header {
            format,
            build,
            compiler_version,
            tcl_version,
        })
    }

    fn parse_version(reader: &mut BytecodeReader<'_>) -> Result<Version> {
        let major = reader.read_integer()?;
        if !reader.matches(".") {
            return Err(malformed_error!("Expected '.' in version number"));
        }
        let minor = reader.read_integer()?;

        Ok(Version::new(major, minor))
    }

    fn parse_bytecode(&mut self, kind: BytecodeKind) -> Result<Bytecode> {
        let info = self.parse_info()?;
        let code = self.reader.decode_data(Some(info.num_code_bytes as usize))?;

        let code_ranges = self.parse_code_ranges(
            info.num_commands,
            info.code_delta_size,
            info.code_length_size,
        )?;
        let source_ranges = self.parse_code_ranges(
            info.num_commands,
            info.src_delta_size,
            info.src_length_size,
        )?;

        let literals = self.parse_array(info.num_lit_objects, Self::parse_literal)?;
        let exception_ranges =
            self.parse_array(info.num_except_ranges, Self::parse_exception_range)?;
        let aux_data = self.parse_array(info.num_aux_data_items, Self::parse_aux_data)?;

        let mut num_args = 0;
        let mut locals = Vec::new();
        if kind == BytecodeKind::Proc {
            num_args = self.read_count()?;
            let num_locals = self.read_count()?;

            locals.reserve(self.reader.capacity_for(num_locals as usize));
            for _ in 0..num_locals {
                locals.push(self.parse_local()?);
            }
        }

        log::trace!(
            "decoded {} unit: {} code bytes, {} literals, {} locals",
            kind,
            code.len(),
            literals.len(),
            locals.len()
        );

        Ok(Bytecode {
            kind,
            info,
            code,
            code_ranges,
            source_ranges,
            literals,
            exception_ranges,
            aux_data,
            num_args,
            locals,
        })
    }

    fn parse_info(&mut self) -> Result<BytecodeInfo> {
        Ok(BytecodeInfo {
            num_commands: self.read_count()?,
            num_src_bytes: self.read_count()?,
            num_code_bytes: self.read_count()?,
            num_lit_objects: self.read_count()?,
            num_except_ranges: self.read_count()?,
            num_aux_data_items: self.read_count()?,
            num_cmd_loc_bytes: self.read_count()?,
            max_except_depth: self.read_count()?,
            max_stack_depth: self.read_count()?,
            code_delta_size: self.read_count()?,
            code_length_size: self.read_count()?,
            src_delta_size: self.read_count()?,
            src_length_size: self.read_count()?,
        })
    }

    /// Decodes a pair of delta/length tables into absolute ranges.
    fn parse_code_ranges(
        &mut self,
        count: u32,
        delta_size: u32,
        length_size: u32,
    ) -> Result<Vec<CodeRange>> {
        let deltas = if delta_size > 0 {
            self.reader.decode_data(Some(delta_size as usize))?
        } else {
            Vec::new()
        };
        let lengths = if length_size > 0 {
            self.reader.decode_data(Some(length_size as usize))?
        } else {
            Vec::new()
        };

        if deltas.is_empty() || lengths.is_empty() || count == 0 {
            return Ok(Vec::new());
        }

        let mut delta_parser = Parser::new(&deltas);
        let mut length_parser = Parser::new(&lengths);
        let mut offset: i64 = 0;
        let mut ranges = Vec::with_capacity((count as usize).min(deltas.len()));

        for _ in 0..count {
            offset += i64::from(delta_parser.read_escaped_int()?);
            let length = length_parser.read_escaped_int()?;

            let (Ok(start), Ok(length)) = (u32::try_from(offset), u32::try_from(length)) else {
                return Err(malformed_error!(
                    "Invalid command location {} (length {})",
                    offset,
                    length
                ));
            };
            ranges.push(CodeRange::new(start, length));
        }

        Ok(ranges)
    }

    fn parse_array<T>(
        &mut self,
        expected: u32,
        mut element: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let count = self.read_count()?;
        if count != expected {
            return Err(malformed_error!(
                "Array has {} elements, expected {}",
                count,
                expected
            ));
        }

        let mut items = Vec::with_capacity(self.reader.capacity_for(count as usize));
        for _ in 0..count {
            items.push(element(self)?);
        }
        Ok(items)
    }

    fn parse_literal(&mut self) -> Result<Literal> {
        let tag = self.reader.read_char()?;
        let Some(literal_type) = LiteralType::from_char(tag) else {
            return Err(malformed_error!("Unknown literal type '{}'", tag));
        };

        Ok(match literal_type {
            LiteralType::Boolean => Literal::Boolean(self.reader.read_word()),
            LiteralType::Bytecode => {
                Literal::Bytecode(Box::new(self.parse_bytecode(BytecodeKind::Code)?))
            }
            LiteralType::Double => Literal::Double(self.reader.read_double()?),
            LiteralType::Int => Literal::Int(self.reader.read_integer()?),
            LiteralType::ProcBody => {
                Literal::ProcBody(Box::new(self.parse_bytecode(BytecodeKind::Proc)?))
            }
            LiteralType::String => Literal::String(self.reader.read_string()?),
            LiteralType::XString => Literal::XString(self.reader.decode_string()?),
        })
    }

    fn parse_exception_range(&mut self) -> Result<ExceptionRange> {
        let tag = self.reader.read_char()?;
        let Some(kind) = ExceptionType::from_char(tag) else {
            return Err(malformed_error!("Unknown exception range type '{}'", tag));
        };

        Ok(ExceptionRange {
            kind,
            nesting_level: self.reader.read_integer()?,
            code_offset: self.read_count()?,
            num_code_bytes: self.read_count()?,
            break_offset: self.reader.read_integer()?,
            continue_offset: self.reader.read_integer()?,
            catch_offset: self.reader.read_integer()?,
        })
    }

    fn parse_aux_data(&mut self) -> Result<AuxData> {
        let tag = self.reader.read_char()?;
        let Some(aux_type) = AuxDataType::from_char(tag) else {
            return Err(malformed_error!("Unknown aux data type '{}'", tag));
        };

        Ok(match aux_type {
            AuxDataType::Foreach => AuxData::Foreach(self.parse_foreach_info()?),
            AuxDataType::NewForeach => AuxData::NewForeach(self.parse_foreach_info()?),
            AuxDataType::DictUpdate => AuxData::DictUpdate(self.parse_dict_update_info()?),
            AuxDataType::JumpTable => AuxData::JumpTable(self.parse_jumptable_info()?),
        })
    }

    fn parse_foreach_info(&mut self) -> Result<ForeachInfo> {
        let num_lists = self.read_count()?;
        let first_value = self.reader.read_integer()?;
        let loop_counter = self.reader.read_integer()?;

        let mut lists = Vec::with_capacity(self.reader.capacity_for(num_lists as usize));
        for _ in 0..num_lists {
            let num_vars = self.read_count()?;
            let mut vars = Vec::with_capacity(self.reader.capacity_for(num_vars as usize));
            for _ in 0..num_vars {
                vars.push(self.reader.read_integer()?);
            }
            lists.push(vars);
        }

        Ok(ForeachInfo {
            first_value,
            loop_counter,
            lists,
        })
    }

    fn parse_dict_update_info(&mut self) -> Result<DictUpdateInfo> {
        let count = self.read_count()?;
        let mut indices = Vec::with_capacity(self.reader.capacity_for(count as usize));
        for _ in 0..count {
            indices.push(self.reader.read_integer()?);
        }

        Ok(DictUpdateInfo { indices })
    }

    fn parse_jumptable_info(&mut self) -> Result<JumptableInfo> {
        let count = self.read_count()?;
        let mut entries = Vec::with_capacity(self.reader.capacity_for(count as usize));
        for _ in 0..count {
            let offset = self.reader.read_integer()?;
            let key = self.reader.decode_string()?;
            entries.push((key, offset));
        }

        Ok(JumptableInfo { entries })
    }

    fn parse_local(&mut self) -> Result<Local> {
        let name = self.reader.decode_string()?;
        let frame_index = self.reader.read_integer()?;
        let has_default = self.reader.read_integer()? != 0;
        let flag_mask = self.reader.read_integer()?;
        let default_value = if has_default {
            Some(self.parse_literal()?)
        } else {
            None
        };

        Ok(Local {
            name,
            frame_index,
            flags: LocalFlags::from_bits_retain(flag_mask as u32),
            default_value,
        })
    }

    /// Reads a non-negative count or offset.
    fn read_count(&mut self) -> Result<u32> {
        let value = self.reader.read_integer()?;
        u32::try_from(value).map_err(|_| malformed_error!("Unexpected negative value {}", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn header() {
        let parser = BytecodeParser::new("  TclPro ByteCode 2 0 1.4 8.6\n").unwrap();
        let header = parser.header();

        assert_eq!(header.format, 2);
        assert_eq!(header.build, 0);
        assert_eq!(header.compiler_version, Version::new(1, 4));
        assert_eq!(header.tcl_version, Version::new(8, 6));
    }

    #[test]
    fn bad_header() {
        assert!(matches!(
            BytecodeParser::new("TclPro Bytecode 2 0 1.4 8.6"),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            BytecodeParser::new("TclPro ByteCode 2 0 1 4 8.6"),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn empty_unit() {
        let mut parser = BytecodeParser::new(
            "TclPro ByteCode 2 0 1.4 8.5\n0 0 0 0 0 0 0 0 0 0 0 0 0\n0\n0\n0\n0",
        )
        .unwrap();
        let bytecode = parser.parse().unwrap();

        assert_eq!(bytecode.kind, BytecodeKind::Code);
        assert!(bytecode.code.is_empty());
        assert!(bytecode.literals.is_empty());
        assert!(bytecode.code_ranges.is_empty());
    }

    #[test]
    fn count_mismatch() {
        // One literal declared, none stored
        let mut parser = BytecodeParser::new(
            "TclPro ByteCode 2 0 1.4 8.5\n0 0 0 1 0 0 0 0 0 0 0 0 0\n0\n0\n0\n0",
        )
        .unwrap();
        assert!(matches!(parser.parse(), Err(Error::Malformed { .. })));
    }

    #[test]
    fn huge_declared_count() {
        // Two billion literals declared, one stored
        let mut parser = BytecodeParser::new(
            "TclPro ByteCode 2 0 1.4 8.5\n0 0 0 2000000000 0 0 0 0 0 0 0 0 0\n\
             0\n2000000000\nx 4 *dmID",
        )
        .unwrap();
        assert!(parser.parse().is_err());
    }

    #[test]
    fn huge_jump_table() {
        // One aux item whose jump table claims two billion entries
        let mut parser = BytecodeParser::new(
            "TclPro ByteCode 2 0 1.4 8.5\n0 0 0 0 0 1 0 0 0 0 0 0 0\n0\n0\n0\n1\nJ 2000000000\n",
        )
        .unwrap();
        assert!(parser.parse().is_err());
    }
}
