//! Property-based and scenario tests for building and reading SIR0 containers.

use datkit::Error;
use datkit::formats::sir0::{Pointer, SegmentId, Sir0, Sir0Builder};
use datkit::text::{Codepage, TextConfig, TextKind};
use proptest::prelude::*;

const ENTRY_STRIDE: usize = 8;

proptest! {
    #[test]
    fn prop_entries_survive_build_and_parse(
        entries in prop::collection::vec(("[A-Z][A-Z0-9_]{0,15}", any::<u32>()), 0..40)
    ) {
        let mut b = Sir0Builder::new();
        let table = b.add_segment("entries");
        for (name, value) in &entries {
            let ptr = b.add_identifier(name).unwrap();
            b.write_pointer(table, ptr).unwrap();
            b.write_u32(table, *value).unwrap();
        }
        b.write_bytes(table, &[0; ENTRY_STRIDE]).unwrap();

        b.write_pointer(SegmentId::Root, Pointer::to(table, 0)).unwrap();
        b.write_u32(SegmentId::Root, entries.len() as u32).unwrap();
        b.write_pointer(SegmentId::Root, Pointer::Null).unwrap();

        let layout = b.layout().unwrap();
        let table_base = layout.base(table).unwrap();
        let root_base = layout.main_data_offset();
        let file = b.build().unwrap();

        prop_assert_eq!(file.len() % 16, 0);
        let sir0 = Sir0::parse(&file).unwrap();
        prop_assert_eq!(sir0.main_data_offset(), root_base as usize);
        prop_assert_eq!(sir0.reloc_table_offset(), layout.reloc_table_offset() as usize);

        let root = sir0.main_data_offset();
        let start = sir0.read_pointer(root).unwrap();
        prop_assert_eq!(start, Some(table_base as usize));
        prop_assert_eq!(sir0.read_u32(root + 4).unwrap() as usize, entries.len());
        prop_assert_eq!(sir0.read_pointer(root + 8).unwrap(), None);

        let records = sir0.terminated_records(table_base as usize, ENTRY_STRIDE).unwrap();
        prop_assert_eq!(records.len(), entries.len());
        for (at, (name, value)) in records.iter().zip(&entries) {
            let read = sir0.read_string_at_pointer(*at, Codepage::ShiftJis).unwrap();
            prop_assert_eq!(read.as_deref(), Some(name.as_str()));
            prop_assert_eq!(sir0.read_u32(at + 4).unwrap(), *value);
        }

        let mut expected = vec![4, 8];
        expected.extend((0..entries.len()).map(|i| table_base + (i * ENTRY_STRIDE) as u32));
        expected.push(root_base);
        expected.sort_unstable();
        prop_assert_eq!(sir0.pointer_offsets().unwrap(), expected);
    }

    #[test]
    fn prop_segments_are_word_aligned(
        lens in prop::collection::vec(0usize..19, 1..6),
        names in prop::collection::vec("[a-z]{0,7}", 0..5)
    ) {
        let mut b = Sir0Builder::new();
        for name in &names {
            b.add_identifier(name).unwrap();
        }
        let segments: Vec<_> = lens
            .iter()
            .map(|&len| {
                let id = b.add_segment("blob");
                b.write_bytes(id, &vec![0x11; len]).unwrap();
                id
            })
            .collect();
        b.write_u32(SegmentId::Root, 1).unwrap();

        let layout = b.layout().unwrap();
        let file = b.build().unwrap();
        for (id, len) in segments.iter().zip(&lens) {
            let base = layout.base(*id).unwrap() as usize;
            prop_assert_eq!(base % 4, 0);
            prop_assert!(file[base..base + len].iter().all(|&x| x == 0x11));
        }
        prop_assert_eq!(layout.main_data_offset() % 4, 0);
        prop_assert_eq!(layout.reloc_table_offset() % 16, 0);
    }
}

#[test]
fn display_text_follows_the_configured_code_page() {
    let config = TextConfig::with_display(Codepage::Latin1);
    let mut b = Sir0Builder::with_text_config(config);
    let id = b.add_text("ITEM_CAFE", TextKind::Identifier).unwrap();
    let name = b.add_text("Café Élan", TextKind::Display).unwrap();
    b.write_pointer(SegmentId::Root, id).unwrap();
    b.write_pointer(SegmentId::Root, name).unwrap();
    let file = b.build().unwrap();

    let sir0 = Sir0::parse(&file).unwrap();
    let root = sir0.main_data_offset();
    let id_at = sir0.read_pointer(root).unwrap().unwrap();
    let name_at = sir0.read_pointer(root + 4).unwrap().unwrap();

    assert_eq!(sir0.read_bytes(name_at, 4).unwrap(), [b'C', b'a', b'f', 0xE9]);
    assert_eq!(
        sir0.read_text(name_at, TextKind::Display, &config).unwrap(),
        "Café Élan"
    );
    assert_eq!(sir0.read_identifier(id_at).unwrap(), "ITEM_CAFE");
}

#[test]
fn shift_jis_display_text_by_default() {
    let mut b = Sir0Builder::new();
    let name = b.add_text("ピカチュウ", TextKind::Display).unwrap();
    b.write_pointer(SegmentId::Root, name).unwrap();
    let file = b.build().unwrap();

    let sir0 = Sir0::parse(&file).unwrap();
    let at = sir0.read_pointer(sir0.main_data_offset()).unwrap().unwrap();
    assert_eq!(at, 0x10);
    assert_eq!(
        sir0.read_text(at, TextKind::Display, &TextConfig::default())
            .unwrap(),
        "ピカチュウ"
    );
}

#[test]
fn pointer_lists_stop_at_null() {
    let mut b = Sir0Builder::new();
    let a = b.add_identifier("A").unwrap();
    let c = b.add_identifier("C").unwrap();
    let list = b.add_segment("list");
    b.write_pointer(list, a).unwrap();
    b.write_pointer(list, c).unwrap();
    b.write_pointer(list, Pointer::Null).unwrap();
    b.write_pointer(SegmentId::Root, Pointer::to(list, 0)).unwrap();
    let file = b.build().unwrap();

    let sir0 = Sir0::parse(&file).unwrap();
    let list_at = sir0.read_pointer(sir0.main_data_offset()).unwrap().unwrap();
    let names: Vec<String> = sir0
        .read_pointer_list(list_at)
        .unwrap()
        .into_iter()
        .map(|p| sir0.read_identifier(p).unwrap())
        .collect();
    assert_eq!(names, ["A", "C"]);
}

#[test]
fn sir1_is_an_unsupported_version() {
    let mut file = b"SIR1".to_vec();
    file.extend_from_slice(&[0; 12]);
    assert!(matches!(Sir0::parse(&file), Err(Error::UnsupportedVersion(b'1'))));
}

#[test]
fn foreign_signature_is_bad_magic() {
    let mut file = b"AT6P".to_vec();
    file.extend_from_slice(&[0; 28]);
    match Sir0::parse(&file) {
        Err(Error::BadMagic { expected, found }) => {
            assert_eq!(&expected, b"SIR0");
            assert_eq!(&found, b"AT6P");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn short_header_is_out_of_bounds() {
    assert!(matches!(
        Sir0::parse(b"SIR0\x10\0\0\0"),
        Err(Error::OutOfBounds { .. })
    ));
}
