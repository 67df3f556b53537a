#![no_main]

use esfront::StringDict;
use esfront::lexer::{Lexer, TokenKind};
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

    let mut dict = StringDict::new();
    let mut lexer = Lexer::new(source, &mut dict);

    // Consume all tokens, stopping at the first error; must never panic
    loop {
        match lexer.next_token() {
            Ok(token) => {
                assert!(token.span.start <= token.span.end);
                assert!(token.span.end <= source.len());
                if matches!(token.kind, TokenKind::Eof) {
                    break;
                }
                // Exercise the regexp rescan on every slash
                if matches!(token.kind, TokenKind::Slash | TokenKind::SlashEq) {
                    let checkpoint = lexer.checkpoint();
                    let _ = lexer.rescan_as_regexp(token.span);
                    lexer.restore(checkpoint);
                }
            }
            Err(_) => break,
        }
    }
});
