//! Tests for RecordStore
//!
//! These tests verify:
//! - Region formatting and reuse on begin
//! - Typed and raw record round-trips
//! - In-place updates and lookup by (key, size)
//! - Payload size limits per field width
//! - Out-of-space and corruption handling

use nvrecord::{Config, FieldWidth, InMemoryMedium, RecordError, RecordStore, StorageMedium};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_store(len: usize) -> RecordStore<InMemoryMedium> {
    let mut store = RecordStore::new(InMemoryMedium::new(len), Config::default());
    store.begin().unwrap();
    store
}

fn setup_store_with_widths(len: usize, key: FieldWidth, length: FieldWidth) -> RecordStore<InMemoryMedium> {
    let config = Config::builder().key_width(key).length_width(length).build();
    let mut store = RecordStore::new(InMemoryMedium::new(len), config);
    store.begin().unwrap();
    store
}

// =============================================================================
// Begin / Header Tests
// =============================================================================

#[test]
fn test_begin_formats_erased_region() {
    let store = setup_store(64);
    let data = store.medium().data();

    assert_eq!(data[0], 0xFF); // reserved byte untouched
    assert_eq!(&data[1..4], b"CAS");
    assert_eq!(data[4], 0);
    assert_eq!(data[5], 0); // empty chain sentinel
    assert_eq!(data[6], 0xFF);
    assert!(store.is_begun());
}

#[test]
fn test_begin_keeps_existing_records() {
    let mut store = setup_store(64);
    store.set_typed(3, &0xBEEFu16).unwrap();

    let medium = store.into_medium();
    let mut reopened = RecordStore::new(medium, Config::default());
    reopened.begin().unwrap();

    assert_eq!(reopened.get_typed(3, 0u16).unwrap(), 0xBEEF);
}

#[test]
fn test_begin_does_not_rewrite_formatted_region() {
    let store = setup_store(64);
    let mut medium = store.into_medium();
    let writes = medium.physical_writes();

    let mut reopened = RecordStore::new(&mut medium, Config::default());
    reopened.begin().unwrap();

    assert_eq!(medium.physical_writes(), writes);
}

#[test]
fn test_begin_range_places_header_at_region_start() {
    let mut store = RecordStore::new(InMemoryMedium::new(64), Config::default());
    store.begin_range(10..40).unwrap();
    store.set_raw(1, &[7]).unwrap();

    let data = store.medium().data();
    assert!(data[..10].iter().all(|&b| b == 0xFF));
    assert_eq!(&data[11..14], b"CAS");
    assert_eq!(&data[15..19], &[3, 1, 7, 0]);
    assert!(data[40..].iter().all(|&b| b == 0xFF));
    assert_eq!(store.region(), Some(10..40));
}

#[test]
fn test_configured_region_is_used_by_begin() {
    let config = Config::builder().region(32, 64).build();
    let mut store = RecordStore::new(InMemoryMedium::new(64), config);
    store.begin().unwrap();

    assert_eq!(&store.medium().data()[33..36], b"CAS");
    assert_eq!(store.free_bytes().unwrap(), 32 - 5 - 1);
}

#[test]
fn test_begin_rejects_bad_regions() {
    let mut store = RecordStore::new(InMemoryMedium::new(64), Config::default());

    assert!(matches!(store.begin_range(0..100), Err(RecordError::Config(_))));
    assert!(matches!(store.begin_range(0..5), Err(RecordError::Config(_))));
    assert!(matches!(store.begin_range(40..20), Err(RecordError::Config(_))));
    assert!(!store.is_begun());
}

#[test]
fn test_operations_before_begin_fail() {
    let mut store = RecordStore::new(InMemoryMedium::new(64), Config::default());

    assert!(matches!(store.set_raw(1, &[1]), Err(RecordError::NotInitialized)));
    assert!(matches!(store.get_typed(1, 0u8), Err(RecordError::NotInitialized)));
    assert!(matches!(
        store.find_record_address(1, 1, None),
        Err(RecordError::NotInitialized)
    ));
    assert!(matches!(store.used_bytes(), Err(RecordError::NotInitialized)));

    // Nothing was written
    assert!(store.medium().data().iter().all(|&b| b == 0xFF));
}

// =============================================================================
// Typed Record Tests
// =============================================================================

#[test]
fn test_typed_round_trip() {
    let mut store = setup_store(128);

    store.set_typed(1, &0x1234_5678u32).unwrap();
    store.set_typed(2, &(7u16, 9u8)).unwrap();
    store.set_typed(3, &[1u8, 2, 3, 4, 5, 6, 7, 8]).unwrap();

    assert_eq!(store.get_typed(1, 0u32).unwrap(), 0x1234_5678);
    assert_eq!(store.get_typed(2, (0u16, 0u8)).unwrap(), (7, 9));
    assert_eq!(store.get_typed(3, [0u8; 8]).unwrap(), [1, 2, 3, 4, 5, 6, 7, 8]);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Calibration {
    offset: i16,
    gain: u32,
    enabled: bool,
}

#[test]
fn test_typed_struct_round_trip() {
    let mut store = setup_store(64);
    let cal = Calibration {
        offset: -12,
        gain: 1_000_000,
        enabled: true,
    };
    let default = Calibration {
        offset: 0,
        gain: 1,
        enabled: false,
    };

    assert_eq!(store.get_typed(6, default).unwrap(), default);
    store.set_typed(6, &cal).unwrap();

    // 2 + 4 + 1 bytes, fields in declaration order
    let found = store.find_record_address(6, 0, None).unwrap().unwrap();
    assert_eq!(found.size, 7);
    assert_eq!(store.get_typed(6, default).unwrap(), cal);
}

#[test]
fn test_typed_value_is_little_endian() {
    let mut store = setup_store(64);
    store.set_typed(4, &0x0102u16).unwrap();

    let found = store.find_record_address(4, 2, None).unwrap().unwrap();
    assert_eq!(
        store.medium().read_bytes(found.data_address, 2).unwrap(),
        vec![0x02, 0x01]
    );
}

#[test]
fn test_get_typed_missing_returns_default() {
    let store = setup_store(64);
    assert_eq!(store.get_typed(9, 1234u32).unwrap(), 1234);
}

#[test]
fn test_get_typed_requires_exact_size() {
    let mut store = setup_store(64);
    store.set_typed(3, &5u16).unwrap();

    assert_eq!(store.get_typed(3, 77u32).unwrap(), 77);
    assert_eq!(store.get_typed(3, 0u16).unwrap(), 5);
}

#[test]
fn test_set_byte() {
    let mut store = setup_store(64);
    store.set_byte(8, 0x5A).unwrap();

    assert_eq!(store.get_typed(8, 0u8).unwrap(), 0x5A);
    assert_eq!(store.read_raw(8).unwrap(), Some(vec![0x5A]));
}

proptest! {
    #[test]
    fn prop_typed_round_trip(entries in proptest::collection::btree_map(0u16..=255, any::<u32>(), 1..20)) {
        let mut store = setup_store(512);
        for (key, value) in &entries {
            store.set_typed(*key, value).unwrap();
        }
        for (key, value) in &entries {
            prop_assert_eq!(store.get_typed(*key, 0u32).unwrap(), *value);
        }
    }
}

// =============================================================================
// Raw Record / Lookup Tests
// =============================================================================

#[test]
fn test_record_layout_one_byte_fields() {
    let mut store = setup_store(64);
    store.set_raw(5, &[0xAA]).unwrap();

    // length 3 = length(1) + key(1) + data(1), then a new sentinel
    assert_eq!(&store.medium().data()[5..9], &[3, 5, 0xAA, 0]);

    let first = store.find_record_address(5, 1, None).unwrap().unwrap();
    let second = store.find_record_address(5, 1, None).unwrap().unwrap();
    assert_eq!(first.data_address, 7);
    assert_eq!(first, second);
}

#[test]
fn test_record_layout_two_byte_key() {
    let mut store = setup_store_with_widths(64, FieldWidth::Two, FieldWidth::One);
    store.set_raw(0x1234, &[0x01]).unwrap();

    assert_eq!(&store.medium().data()[5..10], &[4, 0x34, 0x12, 0x01, 0]);
    assert_eq!(store.read_raw(0x1234).unwrap(), Some(vec![0x01]));
}

#[test]
fn test_record_layout_two_byte_length() {
    let mut store = setup_store_with_widths(64, FieldWidth::One, FieldWidth::Two);
    store.set_raw(7, &[0x0A, 0x0B]).unwrap();

    assert_eq!(&store.medium().data()[5..12], &[5, 0, 7, 0x0A, 0x0B, 0, 0]);
}

#[test]
fn test_set_raw_updates_in_place() {
    let mut store = setup_store(64);
    store.set_raw(5, &[1, 2, 3]).unwrap();
    let before = store.find_record_address(5, 3, None).unwrap().unwrap();
    let used = store.used_bytes().unwrap();

    store.set_raw(5, &[4, 5, 6]).unwrap();

    let after = store.find_record_address(5, 3, None).unwrap().unwrap();
    assert_eq!(before, after);
    assert_eq!(store.used_bytes().unwrap(), used);
    assert_eq!(store.read_raw(5).unwrap(), Some(vec![4, 5, 6]));
}

#[test]
fn test_same_key_different_size_is_separate_record() {
    let mut store = setup_store(64);
    store.set_raw(5, &[1]).unwrap();
    store.set_raw(5, &[2, 3]).unwrap();

    let first = store.find_record_address(5, 0, None).unwrap().unwrap();
    assert_eq!(first.size, 1);

    let next = store
        .find_record_address(5, 0, Some(first.data_address))
        .unwrap()
        .unwrap();
    assert_eq!(next.size, 2);
    assert!(next.data_address > first.data_address);

    assert_eq!(
        store.find_record_address(5, 0, Some(next.data_address)).unwrap(),
        None
    );
}

#[test]
fn test_find_missing_key() {
    let mut store = setup_store(64);
    store.set_raw(1, &[1]).unwrap();

    assert_eq!(store.find_record_address(2, 0, None).unwrap(), None);
    assert_eq!(store.find_record_address(1, 2, None).unwrap(), None);
    assert_eq!(store.read_raw(2).unwrap(), None);
}

#[test]
fn test_rewrite_same_bytes_is_noop_on_medium() {
    let mut store = setup_store(64);
    store.set_raw(5, &[9, 8, 7]).unwrap();
    let writes = store.medium().physical_writes();
    let snapshot = store.medium().data().to_vec();

    store.set_raw(5, &[9, 8, 7]).unwrap();
    store.set_raw(5, &[9, 8, 7]).unwrap();

    assert_eq!(store.medium().physical_writes(), writes);
    assert_eq!(store.medium().data(), snapshot.as_slice());
}

#[test]
fn test_records_iterates_in_address_order() {
    let mut store = setup_store(64);
    store.set_raw(3, &[1]).unwrap();
    store.set_raw(1, &[1, 2]).unwrap();
    store.set_raw(2, &[1, 2, 3]).unwrap();

    let records: Vec<_> = store.records().unwrap().map(|r| r.unwrap()).collect();
    let keys: Vec<u16> = records.iter().map(|r| r.key).collect();
    let sizes: Vec<usize> = records.iter().map(|r| r.size).collect();

    assert_eq!(keys, vec![3, 1, 2]);
    assert_eq!(sizes, vec![1, 2, 3]);
    assert_eq!(records[1].address, records[0].address + records[0].total_len());
}

// =============================================================================
// Argument Validation Tests
// =============================================================================

#[test]
fn test_zero_size_write_rejected() {
    let mut store = setup_store(64);
    assert!(matches!(store.set_raw(1, &[]), Err(RecordError::InvalidArgument(_))));
}

#[test]
fn test_key_too_wide_rejected() {
    let mut store = setup_store(64);
    assert!(matches!(store.set_raw(256, &[1]), Err(RecordError::InvalidArgument(_))));
    store.set_raw(255, &[1]).unwrap();
}

#[test]
fn test_capacity_boundary_one_byte_length() {
    let mut store = setup_store(300);
    assert_eq!(store.config().max_payload(), 253);

    let max = vec![0x11u8; 253];
    store.set_raw(1, &max).unwrap();
    assert_eq!(store.read_raw(1).unwrap(), Some(max));

    let result = store.set_raw(2, &[0x22u8; 254]);
    assert!(matches!(
        result,
        Err(RecordError::PayloadTooLarge { size: 254, max: 253 })
    ));
}

#[test]
fn test_capacity_boundary_two_byte_fields() {
    let mut store = setup_store_with_widths(70_000, FieldWidth::Two, FieldWidth::Two);
    assert_eq!(store.config().max_payload(), 65_531);

    store.set_raw(1, &vec![0x33u8; 65_531]).unwrap();
    let found = store.find_record_address(1, 65_531, None).unwrap().unwrap();
    assert_eq!(found.total_len(), 65_535);

    let result = store.set_raw(2, &vec![0x44u8; 65_532]);
    assert!(matches!(result, Err(RecordError::PayloadTooLarge { .. })));
}

// =============================================================================
// Space / Corruption Tests
// =============================================================================

#[test]
fn test_used_and_free_bytes() {
    let mut store = setup_store(64);
    assert_eq!(store.used_bytes().unwrap(), 6);
    assert_eq!(store.free_bytes().unwrap(), 58);

    store.set_raw(1, &[1, 2, 3, 4]).unwrap();
    assert_eq!(store.used_bytes().unwrap(), 12);
    assert_eq!(store.free_bytes().unwrap(), 52);
}

#[test]
fn test_record_exactly_fills_region() {
    let mut store = setup_store(16);
    assert_eq!(store.free_bytes().unwrap(), 10);

    store.set_raw(1, &[0u8; 8]).unwrap();
    assert_eq!(store.free_bytes().unwrap(), 0);
    assert_eq!(store.medium().data()[15], 0);
}

#[test]
fn test_out_of_space_leaves_region_unchanged() {
    let mut store = setup_store(16);
    store.set_raw(1, &[0u8; 8]).unwrap();
    let snapshot = store.medium().data().to_vec();

    let result = store.set_raw(2, &[1]);
    assert!(matches!(
        result,
        Err(RecordError::OutOfSpace { needed: 4, available: 1 })
    ));
    assert_eq!(store.medium().data(), snapshot.as_slice());

    // In-place updates still work on a full region
    store.set_raw(1, &[5u8; 8]).unwrap();
    assert_eq!(store.read_raw(1).unwrap(), Some(vec![5u8; 8]));
}

#[test]
fn test_chain_overrunning_region_is_corruption() {
    let mut data = setup_store(64).into_medium().data().to_vec();
    data[5] = 200; // record length reaching far past the end

    let mut store = RecordStore::new(InMemoryMedium::with_data(data), Config::default());
    store.begin().unwrap();

    assert!(matches!(
        store.find_record_address(1, 0, None),
        Err(RecordError::Corrupted(_))
    ));
    assert!(matches!(store.set_raw(1, &[1]), Err(RecordError::Corrupted(_))));
    assert!(matches!(store.free_bytes(), Err(RecordError::Corrupted(_))));
}

#[test]
fn test_impossible_record_length_is_corruption() {
    let mut data = setup_store(64).into_medium().data().to_vec();
    data[5] = 1; // shorter than length + key

    let mut store = RecordStore::new(InMemoryMedium::with_data(data), Config::default());
    store.begin().unwrap();

    let mut records = store.records().unwrap();
    assert!(matches!(records.next(), Some(Err(RecordError::Corrupted(_)))));
    assert!(records.next().is_none());
}
