//! Static metadata for the Tcl 8.6 instruction set.
//!
//! Every [`Opcode`] owns one [`InstrDesc`] describing its display name, how many stack values
//! it consumes, its encoded size and its net effect on the evaluation stack. Instructions whose
//! arity depends on their first operand (`invokeStk1`, `list`, `strcat`, ...) carry
//! [`Arity::Variable`] and [`StackEffect::Variable`]; the concrete values are resolved per
//! instruction from operand 0.
//!
//! # Examples
//!
//! ```rust
//! use tclscope::disassembler::{Arity, Opcode, StackEffect};
//!
//! let add = Opcode::Add.desc();
//! assert_eq!(add.name, "add");
//! assert_eq!(add.argc, Arity::Fixed(2));
//! assert_eq!(add.stack_effect, StackEffect::Fixed(-1));
//!
//! assert_eq!(Opcode::from_repr(34), Some(Opcode::Jump1));
//! assert!(Opcode::Jump1.is_unconditional_branch());
//! ```

use strum::{Display, EnumCount, EnumIter, FromRepr};

/// Encodings of instruction operands. Code is big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandType {
    /// Signed 8-bit immediate
    Int1,
    /// Signed 32-bit immediate
    Int4,
    /// Unsigned 8-bit immediate
    UInt1,
    /// Unsigned 32-bit immediate
    UInt4,
    /// Signed 32-bit list or string index, `end` relative when negative
    Idx4,
    /// Unsigned 8-bit index into the local variable table
    Lvt1,
    /// Unsigned 32-bit index into the local variable table
    Lvt4,
    /// Signed 32-bit index into the aux data table
    Aux4,
    /// Signed 8-bit jump distance relative to the instruction
    Offset1,
    /// Signed 32-bit jump distance relative to the instruction
    Offset4,
    /// Unsigned 8-bit index into the literal pool
    Lit1,
    /// Unsigned 32-bit index into the literal pool
    Lit4,
    /// Unsigned 8-bit [`StringClass`] selector
    Scls1,
}

impl OperandType {
    /// Returns the encoded size of this operand in bytes.
    #[must_use]
    pub const fn size(&self) -> u32 {
        match self {
            OperandType::Int1
            | OperandType::UInt1
            | OperandType::Lvt1
            | OperandType::Offset1
            | OperandType::Lit1
            | OperandType::Scls1 => 1,
            OperandType::Int4
            | OperandType::UInt4
            | OperandType::Idx4
            | OperandType::Lvt4
            | OperandType::Aux4
            | OperandType::Offset4
            | OperandType::Lit4 => 4,
        }
    }
}

/// Number of stack values an instruction consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// A fixed count. Negative counts mark opcodes whose arity is not statically known.
    Fixed(i32),
    /// Equal to the value of operand 0
    Variable,
}

/// Net change of the stack depth after an instruction ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackEffect {
    /// A fixed change
    Fixed(i32),
    /// `1 - operand0`
    Variable,
}

/// Descriptor of a single opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrDesc {
    /// Display name, as printed by Tcl's own disassembler
    pub name: &'static str,
    /// Consumed stack values
    pub argc: Arity,
    /// Encoded size in bytes, opcode byte included
    pub size: u32,
    /// Net stack effect
    pub stack_effect: StackEffect,
    /// Operand encodings in stream order
    pub operands: &'static [OperandType],
}

/// The Tcl 8.6 opcodes, numbered as they appear in the instruction stream.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, FromRepr, EnumIter, EnumCount,
)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    Done = 0,
    Push1,
    Push4,
    Pop,
    Dup,
    StrCat,
    InvokeStk1,
    InvokeStk4,
    EvalStk,
    ExprStk,
    LoadScalar1,
    LoadScalar4,
    LoadScalarStk,
    LoadArray1,
    LoadArray4,
    LoadArrayStk,
    LoadStk,
    StoreScalar1,
    StoreScalar4,
    StoreScalarStk,
    StoreArray1,
    StoreArray4,
    StoreArrayStk,
    StoreStk,
    IncrScalar1,
    IncrScalarStk,
    IncrArray1,
    IncrArrayStk,
    IncrStk,
    IncrScalar1Imm,
    IncrScalarStkImm,
    IncrArray1Imm,
    IncrArrayStkImm,
    IncrStkImm,
    Jump1,
    Jump4,
    JumpTrue1,
    JumpTrue4,
    JumpFalse1,
    JumpFalse4,
    Lor,
    Land,
    Bitor,
    Bitxor,
    Bitand,
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,
    Lshift,
    Rshift,
    Add,
    Sub,
    Mult,
    Div,
    Mod,
    Uplus,
    Uminus,
    Bitnot,
    Not,
    CallBuiltinFunc1,
    CallFunc1,
    TryCvtToNumeric,
    Break,
    Continue,
    ForeachStart4,
    ForeachStep4,
    BeginCatch4,
    EndCatch,
    PushResult,
    PushReturnCode,
    StrEq,
    StrNeq,
    StrCmp,
    StrLen,
    StrIndex,
    StrMatch,
    List,
    ListIndex,
    ListLength,
    AppendScalar1,
    AppendScalar4,
    AppendArray1,
    AppendArray4,
    AppendArrayStk,
    AppendStk,
    LappendScalar1,
    LappendScalar4,
    LappendArray1,
    LappendArray4,
    LappendArrayStk,
    LappendStk,
    LindexMulti,
    Over,
    LsetList,
    LsetFlat,
    ReturnImm,
    Expon,
    ExpandStart,
    ExpandStkTop,
    InvokeExpanded,
    ListIndexImm,
    ListRangeImm,
    StartCommand,
    ListIn,
    ListNotIn,
    PushReturnOpts,
    ReturnStk,
    DictGet,
    DictSet,
    DictUnset,
    DictIncrImm,
    DictAppend,
    DictLappend,
    DictFirst,
    DictNext,
    DictDone,
    DictUpdateStart,
    DictUpdateEnd,
    JumpTable,
    Upvar,
    Nsupvar,
    Variable,
    Syntax,
    Reverse,
    Regexp,
    ExistScalar,
    ExistArray,
    ExistArrayStk,
    ExistStk,
    Nop,
    ReturnCodeBranch,
    UnsetScalar,
    UnsetArray,
    UnsetArrayStk,
    UnsetStk,
    DictExpand,
    DictRecombineStk,
    DictRecombineImm,
    DictExists,
    VerifyDict,
    StrMap,
    StrFind,
    StrRfind,
    StrRangeImm,
    StrRange,
    Yield,
    CoroName,
    Tailcall,
    CurrentNamespace,
    InfoLevelNumber,
    InfoLevelArgs,
    ResolveCmd,
    TclooSelf,
    TclooClass,
    TclooNamespace,
    TclooIsObject,
    ArrayExistsStk,
    ArrayExistsImm,
    ArrayMakeStk,
    ArrayMakeImm,
    InvokeReplace,
    ListConcat,
    ExpandDrop,
    ForeachStart,
    ForeachStep,
    ForeachEnd,
    LmapCollect,
    StrTrim,
    StrTrimLeft,
    StrTrimRight,
    ConcatStk,
    StrUpper,
    StrLower,
    StrTitle,
    StrReplace,
    OriginCmd,
    TclooNext,
    TclooNextClass,
    YieldToInvoke,
    NumericType,
    TryCvtToBoolean,
    StrClass,
    LappendList,
    LappendListArray,
    LappendListArrayStk,
    LappendListStk,
    ClockRead,
}

impl Opcode {
    /// Returns the static descriptor of this opcode.
    #[must_use]
    pub fn desc(self) -> &'static InstrDesc {
        &INSTRUCTIONS[self as usize]
    }

    /// Returns the display name of this opcode.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.desc().name
    }

    /// Returns `true` for every opcode that transfers control to a relative target.
    #[must_use]
    pub fn is_branch(self) -> bool {
        self.is_conditional_branch() || self.is_unconditional_branch()
    }

    /// `jumpTrue` and `jumpFalse` in both widths.
    #[must_use]
    pub fn is_conditional_branch(self) -> bool {
        matches!(
            self,
            Opcode::JumpTrue1 | Opcode::JumpTrue4 | Opcode::JumpFalse1 | Opcode::JumpFalse4
        )
    }

    /// `jump`, `break` and `continue`.
    #[must_use]
    pub fn is_unconditional_branch(self) -> bool {
        matches!(
            self,
            Opcode::Jump1 | Opcode::Jump4 | Opcode::Break | Opcode::Continue
        )
    }
}

/// Functions reachable through `callBuiltinFunc1`, in operand order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter, EnumCount)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
#[allow(missing_docs)]
pub enum BuiltinMathFunction {
    Acos = 0,
    Asin,
    Atan,
    Atan2,
    Ceil,
    Cos,
    Cosh,
    Exp,
    Floor,
    Fmod,
    Hypot,
    Log,
    Log10,
    Pow,
    Sin,
    Sinh,
    Sqrt,
    Tan,
    Tanh,
    Abs,
    Double,
    Int,
    Rand,
    Round,
    Srand,
    Wide,
}

impl BuiltinMathFunction {
    /// Number of arguments the function takes.
    #[must_use]
    pub fn argc(self) -> u32 {
        match self {
            BuiltinMathFunction::Rand => 0,
            BuiltinMathFunction::Atan2
            | BuiltinMathFunction::Fmod
            | BuiltinMathFunction::Hypot
            | BuiltinMathFunction::Pow => 2,
            _ => 1,
        }
    }
}

/// Character classes accepted by `string is`, in `Scls1` operand order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter, EnumCount)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
#[allow(missing_docs)]
pub enum StringClass {
    Alnum = 0,
    Alpha,
    Ascii,
    Control,
    Digit,
    Graph,
    Lower,
    Print,
    Punct,
    Space,
    Upper,
    Word,
    Xdigit,
}

/// Marks a variable arity or stack effect in the table below.
const V: i32 = i32::MIN;

const fn op(
    name: &'static str,
    argc: i32,
    size: u32,
    effect: i32,
    operands: &'static [OperandType],
) -> InstrDesc {
    InstrDesc {
        name,
        argc: if argc == V {
            Arity::Variable
        } else {
            Arity::Fixed(argc)
        },
        size,
        stack_effect: if effect == V {
            StackEffect::Variable
        } else {
            StackEffect::Fixed(effect)
        },
        operands,
    }
}

use OperandType::{
    Aux4, Idx4, Int1, Int4, Lit1, Lit4, Lvt1, Lvt4, Offset1, Offset4, Scls1, UInt1, UInt4,
};

/// Descriptors indexed by opcode value.
pub static INSTRUCTIONS: [InstrDesc; Opcode::COUNT] = [
    op("done", 1, 1, -1, &[]),
    op("push1", 0, 2, 1, &[Lit1]),
    op("push4", 0, 5, 1, &[Lit4]),
    op("pop", 1, 1, -1, &[]),
    op("dup", 1, 1, 1, &[]),
    op("strcat", V, 2, V, &[UInt1]),
    op("invokeStk1", V, 2, V, &[UInt1]),
    op("invokeStk4", V, 5, V, &[UInt4]),
    op("evalStk", 1, 1, 0, &[]),
    op("exprStk", 1, 1, 0, &[]),
    // Variable access
    op("loadScalar1", 0, 2, 1, &[Lvt1]),
    op("loadScalar4", 0, 5, 1, &[Lvt4]),
    op("loadScalarStk", 1, 1, 0, &[]),
    op("loadArray1", 1, 2, 0, &[Lvt1]),
    op("loadArray4", 1, 5, 0, &[Lvt4]),
    op("loadArrayStk", 2, 1, -1, &[]),
    op("loadStk", 1, 1, 0, &[]),
    op("storeScalar1", 1, 2, 0, &[Lvt1]),
    op("storeScalar4", 1, 5, 0, &[Lvt4]),
    op("storeScalarStk", 2, 1, -1, &[]),
    op("storeArray1", 2, 2, -1, &[Lvt1]),
    op("storeArray4", 2, 5, -1, &[Lvt4]),
    op("storeArrayStk", 3, 1, -2, &[]),
    op("storeStk", 2, 1, -1, &[]),
    op("incrScalar1", 1, 2, 0, &[Lvt1]),
    op("incrScalarStk", 2, 1, -1, &[]),
    op("incrArray1", 2, 2, -1, &[Lvt1]),
    op("incrArrayStk", 3, 1, -2, &[]),
    op("incrStk", 2, 1, -1, &[]),
    op("incrScalar1Imm", 0, 3, 1, &[Lvt1, Int1]),
    op("incrScalarStkImm", 1, 2, 0, &[Int1]),
    op("incrArray1Imm", 1, 3, 0, &[Lvt1, Int1]),
    op("incrArrayStkImm", 2, 2, -1, &[Int1]),
    op("incrStkImm", 1, 2, 0, &[Int1]),
    // Jumps
    op("jump1", 0, 2, 0, &[Offset1]),
    op("jump4", 0, 5, 0, &[Offset4]),
    op("jumpTrue1", 1, 2, -1, &[Offset1]),
    op("jumpTrue4", 1, 5, -1, &[Offset4]),
    op("jumpFalse1", 1, 2, -1, &[Offset1]),
    op("jumpFalse4", 1, 5, -1, &[Offset4]),
    // Expression operators
    op("lor", 2, 1, -1, &[]),
    op("land", 2, 1, -1, &[]),
    op("bitor", 2, 1, -1, &[]),
    op("bitxor", 2, 1, -1, &[]),
    op("bitand", 2, 1, -1, &[]),
    op("eq", 2, 1, -1, &[]),
    op("neq", 2, 1, -1, &[]),
    op("lt", 2, 1, -1, &[]),
    op("gt", 2, 1, -1, &[]),
    op("le", 2, 1, -1, &[]),
    op("ge", 2, 1, -1, &[]),
    op("lshift", 2, 1, -1, &[]),
    op("rshift", 2, 1, -1, &[]),
    op("add", 2, 1, -1, &[]),
    op("sub", 2, 1, -1, &[]),
    op("mult", 2, 1, -1, &[]),
    op("div", 2, 1, -1, &[]),
    op("mod", 2, 1, -1, &[]),
    op("uplus", 1, 1, 0, &[]),
    op("uminus", 1, 1, 0, &[]),
    op("bitnot", 1, 1, 0, &[]),
    op("not", 1, 1, 0, &[]),
    op("callBuiltinFunc1", 0, 2, 1, &[UInt1]),
    op("callFunc1", V, 2, V, &[UInt1]),
    op("tryCvtToNumeric", 1, 1, 0, &[]),
    // Loops and exceptions
    op("break", 0, 1, 0, &[]),
    op("continue", 0, 1, 0, &[]),
    op("foreach_start4", 0, 5, 0, &[Aux4]),
    op("foreach_step4", 0, 5, 1, &[Aux4]),
    op("beginCatch4", 0, 5, 0, &[UInt4]),
    op("endCatch", 0, 1, 0, &[]),
    op("pushResult", 0, 1, 1, &[]),
    op("pushReturnCode", 0, 1, 1, &[]),
    // String and list builtins
    op("streq", 2, 1, -1, &[]),
    op("strneq", 2, 1, -1, &[]),
    op("strcmp", 2, 1, -1, &[]),
    op("strlen", 1, 1, 0, &[]),
    op("strindex", 2, 1, -1, &[]),
    op("strmatch", 2, 2, -1, &[Int1]),
    op("list", V, 5, V, &[UInt4]),
    op("listIndex", 2, 1, -1, &[]),
    op("listLength", 1, 1, 0, &[]),
    op("appendScalar1", 1, 2, 0, &[Lvt1]),
    op("appendScalar4", 1, 5, 0, &[Lvt4]),
    op("appendArray1", 2, 2, -1, &[Lvt1]),
    op("appendArray4", 2, 5, -1, &[Lvt4]),
    op("appendArrayStk", 3, 1, -2, &[]),
    op("appendStk", 2, 1, -1, &[]),
    op("lappendScalar1", 1, 2, 0, &[Lvt1]),
    op("lappendScalar4", 1, 5, 0, &[Lvt4]),
    op("lappendArray1", 2, 2, -1, &[Lvt1]),
    op("lappendArray4", 2, 5, -1, &[Lvt4]),
    op("lappendArrayStk", 3, 1, -2, &[]),
    op("lappendStk", 2, 1, -1, &[]),
    op("lindexMulti", V, 5, V, &[UInt4]),
    op("over", -1, 5, 1, &[UInt4]),
    op("lsetList", 4, 1, -2, &[]),
    op("lsetFlat", V, 5, V, &[UInt4]),
    op("returnImm", 2, 9, -1, &[Int4, UInt4]),
    op("expon", 2, 1, -1, &[]),
    // Argument expansion
    op("expandStart", -1, 1, 0, &[]),
    op("expandStkTop", -1, 5, 0, &[UInt4]),
    op("invokeExpanded", -1, 1, 0, &[]),
    op("listIndexImm", 1, 5, 0, &[Idx4]),
    op("listRangeImm", 1, 9, 0, &[Idx4, Idx4]),
    op("startCommand", -1, 9, 0, &[Offset4, UInt4]),
    op("listIn", 2, 1, -1, &[]),
    op("listNotIn", 2, 1, -1, &[]),
    op("pushReturnOpts", 0, 1, 1, &[]),
    op("returnStk", 2, 1, -1, &[]),
    // Dictionaries
    op("dictGet", V, 5, V, &[UInt4]),
    op("dictSet", V, 9, V, &[UInt4, Lvt4]),
    op("dictUnset", V, 9, V, &[UInt4, Lvt4]),
    op("dictIncrImm", 1, 9, 0, &[Int4, Lvt4]),
    op("dictAppend", 2, 5, -1, &[Lvt4]),
    op("dictLappend", 2, 5, -1, &[Lvt4]),
    op("dictFirst", 1, 5, 2, &[Lvt4]),
    op("dictNext", 0, 5, 3, &[Lvt4]),
    op("dictDone", 0, 5, 0, &[Lvt4]),
    op("dictUpdateStart", 1, 9, 0, &[Lvt4, Aux4]),
    op("dictUpdateEnd", 1, 9, -1, &[Lvt4, Aux4]),
    op("jumpTable", 1, 5, -1, &[Aux4]),
    op("upvar", 2, 5, -1, &[Lvt4]),
    op("nsupvar", 2, 5, -1, &[Lvt4]),
    op("variable", 2, 5, -1, &[Lvt4]),
    op("syntax", 1, 9, -1, &[Int4, UInt4]),
    op("reverse", V, 5, 0, &[UInt4]),
    op("regexp", 2, 2, -1, &[Int1]),
    op("existScalar", 0, 5, 1, &[Lvt4]),
    op("existArray", 1, 5, 0, &[Lvt4]),
    op("existArrayStk", 2, 1, -1, &[]),
    op("existStk", 1, 1, 0, &[]),
    op("nop", 0, 1, 0, &[]),
    op("returnCodeBranch", 1, 1, -1, &[]),
    op("unsetScalar", 0, 6, 0, &[UInt1, Lvt4]),
    op("unsetArray", 1, 6, -1, &[UInt1, Lvt4]),
    op("unsetArrayStk", 2, 2, -2, &[UInt1]),
    op("unsetStk", 1, 2, -1, &[UInt1]),
    op("dictExpand", 2, 1, -1, &[]),
    op("dictRecombineStk", 3, 1, -3, &[]),
    op("dictRecombineImm", 2, 5, -2, &[Lvt4]),
    op("dictExists", V, 5, V, &[UInt4]),
    op("verifyDict", 1, 1, -1, &[]),
    op("strmap", 3, 1, -2, &[]),
    op("strfind", 2, 1, -1, &[]),
    op("strrfind", 2, 1, -1, &[]),
    op("strrangeImm", 1, 9, 0, &[Idx4, Idx4]),
    op("strrange", 3, 1, -2, &[]),
    // Coroutines, namespaces and TclOO
    op("yield", 1, 1, 0, &[]),
    op("coroName", 0, 1, 1, &[]),
    op("tailcall", V, 2, V, &[UInt1]),
    op("currentNamespace", 0, 1, 1, &[]),
    op("infoLevelNumber", 0, 1, 1, &[]),
    op("infoLevelArgs", 1, 1, 0, &[]),
    op("resolveCmd", 1, 1, 0, &[]),
    op("tclooSelf", 0, 1, 1, &[]),
    op("tclooClass", 1, 1, 0, &[]),
    op("tclooNamespace", 0, 1, 0, &[]),
    op("tclooIsObject", 1, 1, 0, &[]),
    op("arrayExistsStk", 1, 1, 0, &[]),
    op("arrayExistsImm", 0, 5, 1, &[Lvt4]),
    op("arrayMakeStk", 1, 1, -1, &[]),
    op("arrayMakeImm", 0, 5, 0, &[Lvt4]),
    op("invokeReplace", V, 6, V, &[UInt4, UInt1]),
    op("listConcat", 2, 1, -1, &[]),
    op("expandDrop", -1, 1, 0, &[]),
    op("foreach_start", 1, 5, 2, &[Aux4]),
    op("foreach_step", 3, 1, 0, &[]),
    op("foreach_end", 3, 1, 0, &[]),
    op("lmap_collect", 5, 1, -1, &[]),
    op("strtrim", 2, 1, -1, &[]),
    op("strtrimLeft", 2, 1, -1, &[]),
    op("strtrimRight", 2, 1, -1, &[]),
    op("concatStk", V, 5, V, &[UInt4]),
    op("strcaseUpper", 1, 1, 0, &[]),
    op("strcaseLower", 1, 1, 0, &[]),
    op("strcaseTitle", 1, 1, 0, &[]),
    op("strreplace", 4, 1, -3, &[]),
    op("originCmd", 1, 1, 0, &[]),
    op("tclooNext", V, 2, V, &[UInt1]),
    op("tclooNextClass", V, 2, V, &[UInt1]),
    op("yieldToInvoke", 1, 1, 0, &[]),
    op("numericType", 1, 1, 0, &[]),
    op("tryCvtToBoolean", 1, 1, 1, &[]),
    op("strclass", 1, 2, 0, &[Scls1]),
    op("lappendList", 1, 5, 0, &[Lvt4]),
    op("lappendListArray", 2, 5, -1, &[Lvt4]),
    op("lappendListArrayStk", 3, 1, -2, &[]),
    op("lappendListStk", 2, 1, -1, &[]),
    op("clockRead", 0, 2, 1, &[UInt1]),
];

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn table_matches_enum() {
        assert_eq!(INSTRUCTIONS.len(), 190);
        assert_eq!(Opcode::COUNT, 190);

        for opcode in Opcode::iter() {
            assert_eq!(Opcode::from_repr(opcode as u8), Some(opcode));
        }
        assert_eq!(Opcode::from_repr(190), None);
        assert_eq!(Opcode::ClockRead.name(), "clockRead");
        assert_eq!(Opcode::StrClass.name(), "strclass");
    }

    #[test]
    fn sizes_cover_operands() {
        for opcode in Opcode::iter() {
            let desc = opcode.desc();
            let operands: u32 = desc.operands.iter().map(OperandType::size).sum();
            assert_eq!(desc.size, 1 + operands, "{}", desc.name);
        }
    }

    #[test]
    fn variable_arity_has_count_operand() {
        for opcode in Opcode::iter() {
            let desc = opcode.desc();
            if desc.argc == Arity::Variable {
                assert!(
                    matches!(desc.operands.first(), Some(UInt1 | UInt4)),
                    "{}",
                    desc.name
                );
            }
        }
    }

    #[test]
    fn branch_classification() {
        let branches: Vec<Opcode> = Opcode::iter().filter(|op| op.is_branch()).collect();
        assert_eq!(branches.len(), 8);
        assert!(Opcode::JumpFalse4.is_conditional_branch());
        assert!(!Opcode::JumpFalse4.is_unconditional_branch());
        assert!(Opcode::Continue.is_unconditional_branch());
        assert!(!Opcode::JumpTable.is_branch());
    }

    #[test]
    fn name_tables() {
        assert_eq!(BuiltinMathFunction::Atan2.to_string(), "atan2");
        assert_eq!(BuiltinMathFunction::from_repr(12), Some(BuiltinMathFunction::Log10));
        assert_eq!(BuiltinMathFunction::Rand.argc(), 0);
        assert_eq!(BuiltinMathFunction::Hypot.argc(), 2);
        assert_eq!(BuiltinMathFunction::Wide.argc(), 1);
        assert_eq!(BuiltinMathFunction::COUNT, 26);

        assert_eq!(StringClass::Xdigit.to_string(), "xdigit");
        assert_eq!(StringClass::from_repr(0), Some(StringClass::Alnum));
        assert_eq!(StringClass::COUNT, 13);
    }
}
