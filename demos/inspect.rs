use std::fs;

use datkit::Result;
use datkit::compression::at6p::{At6pHeader, decompress_if_at6p, is_at6p};
use datkit::formats::sir0::Sir0;

fn main() -> Result<()> {
    let raw = fs::read("bg_list.dat")?;
    if is_at6p(&raw) {
        let header = At6pHeader::parse(&raw)?;
        println!(
            "AT6P: {} -> {} bytes, seed {:#04x}",
            header.compressed_len, header.decompressed_len, header.seed
        );
    }

    let data = decompress_if_at6p(&raw)?;
    let sir0 = Sir0::parse(&data)?;
    println!("main data:   {:#x}", sir0.main_data_offset());
    println!("reloc table: {:#x}", sir0.reloc_table_offset());
    for offset in sir0.pointer_offsets()? {
        println!("  {offset:#08x} -> {:#x}", sir0.read_u32(offset as usize)?);
    }

    Ok(())
}
