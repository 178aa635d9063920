use bip39::Mnemonic;
use proptest::prelude::*;
use solstice_core::types::{decimal_to_base_units, format_base_units, Chain};
use solstice_core::{keccak256, to_checksum_address, ChainDeriver};

/// Entropy sizes permitted by BIP39: 128..256 bits in 32-bit steps
fn any_entropy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 16..=16),
        prop::collection::vec(any::<u8>(), 20..=20),
        prop::collection::vec(any::<u8>(), 24..=24),
        prop::collection::vec(any::<u8>(), 28..=28),
        prop::collection::vec(any::<u8>(), 32..=32),
    ]
}

proptest! {
    #[test]
    fn mnemonic_checksums_hold(entropy in any_entropy()) {
        let mnemonic = Mnemonic::from_entropy(&entropy).expect("valid entropy size");
        // A generated phrase always passes its own checksum validation
        let reparsed = Mnemonic::parse(mnemonic.to_string()).expect("round trip");
        prop_assert_eq!(reparsed.to_entropy(), entropy);
    }

    #[test]
    fn derivation_is_deterministic(entropy in prop::collection::vec(any::<u8>(), 16..=16)) {
        let phrase = Mnemonic::from_entropy(&entropy).unwrap().to_string();

        for chain in [Chain::Ethereum, Chain::Solana] {
            let deriver = ChainDeriver::for_chain(chain);
            let first = deriver.derive_phrase(&phrase).unwrap();
            let second = deriver.derive_phrase(&phrase).unwrap();
            prop_assert_eq!(first.address, second.address);
            prop_assert_eq!(first.private_key, second.private_key);
        }
    }

    #[test]
    fn checksum_addresses_roundtrip(bytes in prop::array::uniform20(any::<u8>())) {
        let checksummed = to_checksum_address(&bytes);
        prop_assert!(checksummed.starts_with("0x"));

        let tail = checksummed.trim_start_matches("0x");
        let lower_expected = hex::encode(bytes);
        prop_assert_eq!(tail.to_ascii_lowercase(), lower_expected.clone());

        let hash = keccak256(lower_expected.as_bytes());
        let mut expected = String::from("0x");
        for (i, ch) in lower_expected.chars().enumerate() {
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if ch.is_ascii_digit() || nibble < 8 {
                expected.push(ch);
            } else {
                expected.push(ch.to_ascii_uppercase());
            }
        }
        prop_assert_eq!(checksummed, expected);
    }

    #[test]
    fn base_unit_conversion_round_trips(units in 1u64..1_000_000_000_000) {
        // base units -> decimal -> base units is exact at asset precision
        let display = format_base_units(units, 9);
        let parsed = decimal_to_base_units(&display, 9).unwrap();
        prop_assert_eq!(parsed, units);
    }
}
