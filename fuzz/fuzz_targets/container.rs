#![no_main]

use libfuzzer_sys::fuzz_target;
use tclscope::{Decompiler, TbcFile};

fuzz_target!(|data: &[u8]| {
    if let Ok(file) = TbcFile::from_mem(data.to_vec()) {
        let _ = Decompiler::default().decompile_file(&file);
    }
});
