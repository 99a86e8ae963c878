use afl::*;

use pppos::accm::Accm;
use pppos::decode::ReceiveState;

fn main() {
    fuzz!(|data: &[u8]| {
        let mut rx = ReceiveState::new();
        let accm = Accm::default_escaping();

        // Split the input into arbitrary chunks so chunk-boundary handling
        // gets exercised too, not just whole-buffer calls.
        let mut offset = 0;
        while offset < data.len() {
            let take = 1 + (data[offset] as usize % 7);
            let end = (offset + take).min(data.len());
            let _ = rx.input(&data[offset..end], &accm);
            offset = end;
        }
    })
}
