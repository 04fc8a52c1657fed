use proptest::prelude::*;

use oryn::codec::{decode_epoch, decode_peers, encode_epoch, encode_peers, peers_hash};
use oryn::types::{Address, Epoch, PeerRecord, PublicKey};

fn arb_peer() -> impl Strategy<Value = PeerRecord> {
    (any::<[u8; 33]>(), any::<[u8; 20]>())
        .prop_map(|(pk, addr)| PeerRecord { public_key: PublicKey(pk), address: Address(addr) })
}

fn arb_peers() -> impl Strategy<Value = Vec<PeerRecord>> {
    proptest::collection::vec(arb_peer(), 0..12)
}

proptest! {
    #[test]
    fn peer_list_round_trips(peers in arb_peers()) {
        let raw = encode_peers(&peers);
        prop_assert_eq!(decode_peers(&raw).unwrap(), peers);
    }

    #[test]
    fn encoding_is_deterministic(peers in arb_peers()) {
        prop_assert_eq!(encode_peers(&peers), encode_peers(&peers));
        prop_assert_eq!(peers_hash(&peers), peers_hash(&peers));
    }

    #[test]
    fn epoch_envelope_round_trips(peers in arb_peers(), id in any::<u64>(), start in any::<u64>()) {
        let epoch = Epoch { id, hash: peers_hash(&peers), peers, start_height: start };
        prop_assert_eq!(decode_epoch(&encode_epoch(&epoch)).unwrap(), epoch);
    }

    #[test]
    fn distinct_peer_lists_encode_distinctly(a in arb_peers(), b in arb_peers()) {
        prop_assume!(a != b);
        prop_assert_ne!(encode_peers(&a), encode_peers(&b));
        prop_assert_ne!(peers_hash(&a), peers_hash(&b));
    }

    #[test]
    fn decode_never_panics_on_arbitrary_bytes(raw in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode_peers(&raw);
        let _ = decode_epoch(&raw);
    }
}
