//! Auxiliary data items referenced by `Aux4` operands.

use strum::{Display, EnumIter, FromRepr};

/// Type tag of an auxiliary data item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(u8)]
pub enum AuxDataType {
    /// Legacy `foreach` loop layout
    Foreach = b'F',
    /// `foreach`/`lmap` loop layout used since Tcl 8.6
    NewForeach = b'f',
    /// Variable list of a `dict update`
    DictUpdate = b'D',
    /// Jump table of a compiled `switch`
    JumpTable = b'J',
}

impl AuxDataType {
    /// Looks up the aux data type for a container tag character.
    #[must_use]
    pub fn from_char(tag: char) -> Option<Self> {
        u8::try_from(tag).ok().and_then(Self::from_repr)
    }
}

/// Loop variable layout of a compiled `foreach`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForeachInfo {
    /// Local index of the first temporary holding a value list
    pub first_value: i32,
    /// Local index of the iteration counter
    pub loop_counter: i32,
    /// For each value list, the local indices of its loop variables
    pub lists: Vec<Vec<i32>>,
}

/// Local indices bound by a `dict update`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DictUpdateInfo {
    /// Local index of each updated variable
    pub indices: Vec<i32>,
}

/// Key to offset mapping of a compiled `switch`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JumptableInfo {
    /// `(key, relative jump offset)` pairs in container order
    pub entries: Vec<(String, i32)>,
}

impl JumptableInfo {
    /// The jump offset recorded for `key`. Later entries win, as in a Tcl hash table.
    #[must_use]
    pub fn offset(&self, key: &str) -> Option<i32> {
        self.entries
            .iter()
            .rev()
            .find(|(entry, _)| entry == key)
            .map(|(_, offset)| *offset)
    }
}

/// One auxiliary data item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuxData {
    /// Legacy `foreach` layout
    Foreach(ForeachInfo),
    /// Tcl 8.6 `foreach` layout
    NewForeach(ForeachInfo),
    /// `dict update` variables
    DictUpdate(DictUpdateInfo),
    /// `switch` jump table
    JumpTable(JumptableInfo),
}

impl AuxData {
    /// The type tag of this item.
    #[must_use]
    pub fn aux_type(&self) -> AuxDataType {
        match self {
            AuxData::Foreach(_) => AuxDataType::Foreach,
            AuxData::NewForeach(_) => AuxDataType::NewForeach,
            AuxData::DictUpdate(_) => AuxDataType::DictUpdate,
            AuxData::JumpTable(_) => AuxDataType::JumpTable,
        }
    }
}
