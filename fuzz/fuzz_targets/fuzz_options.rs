#![no_main]

use libfuzzer_sys::fuzz_target;
use wire_io::core::options::OptionInput;
use wire_io::io;

fuzz_target!(|data: &[u8]| {
    // Option decoding must reject garbage with an error, never panic
    let mut input = io::array_input(data.to_vec());
    let _ = OptionInput::read(&mut input);
});
