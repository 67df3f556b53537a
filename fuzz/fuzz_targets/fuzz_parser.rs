#![no_main]

use esfront::{ParseOptions, Parser, StringDict};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only process valid UTF-8
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    // Limit input size to avoid timeout
    if source.len() > 100_000 {
        return;
    }

    // Parse as both goal symbols; each should return Ok or Err, never panic
    for options in [ParseOptions::default(), ParseOptions::module()] {
        let mut dict = StringDict::new();
        let mut parser = Parser::new(source, &mut dict, options);
        if let Ok(program) = parser.parse_program() {
            let _ = esfront::estree::to_estree(&program, source, &ParseOptions::default());
        }
    }
});
