#![no_main]

use libfuzzer_sys::fuzz_target;
use wire_io::core::codec::Input;
use wire_io::core::stream::Stream;
use wire_io::io;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    // First byte picks the byte order, second splits terminator from payload
    let inverted = data[0] & 1 == 1;
    let split = 2 + (data[1] as usize % 4).min(data.len() - 2);
    let (terminator, payload) = data[2..].split_at(split - 2);

    let mut input = io::array_input(payload.to_vec());
    input.set_inverted(inverted);
    while input.has_remaining().unwrap_or(false) {
        if input.read_until(terminator).is_err() {
            break;
        }
        let _ = input.read_string();
        let _ = input.read_long();
    }
});
