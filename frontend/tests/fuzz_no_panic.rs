use frontend::parser::{parse_program, parse_term};
use std::panic::{catch_unwind, AssertUnwindSafe};

struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u64 {
        // Constants from Numerical Recipes
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    fn gen_range(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next() as usize) % max
    }
}

fn random_source(rng: &mut Lcg) -> String {
    const TOKENS: &[&str] = &[
        "(", ")", "@(", "%", "#", ":", "=", ";", "*", "!", "$", "{", "}", "+", "^", "'", "\"", "\\", "\\u{",
        "0", "42", "#t", "#f", "x", "y", "Nat", "Nat.succ", "λ", "//", " ", "\n", "\t",
    ];

    let token_count = 1 + rng.gen_range(48);
    let mut out = String::new();
    for _ in 0..token_count {
        out.push_str(TOKENS[rng.gen_range(TOKENS.len())]);
        if rng.gen_range(4) == 0 {
            out.push(' ');
        }
    }
    out
}

#[test]
fn fuzz_program_parser_no_panic() {
    let mut rng = Lcg::new(0x5EED_F00D);

    for _ in 0..500 {
        let input = format!("x : * = {}", random_source(&mut rng));
        let result = catch_unwind(AssertUnwindSafe(|| parse_program(&input).map(|_| ())));
        assert!(result.is_ok(), "parser panicked on input: {:?}", input);

        // Every rejection points inside the input.
        if let Ok(Err(err)) = result {
            assert!(err.span().start <= input.len(), "span past the end for {:?}: {:?}", input, err);
        }
    }
}

#[test]
fn fuzz_term_parser_no_panic() {
    let mut rng = Lcg::new(0xC0FF_EE);

    for _ in 0..500 {
        let input = random_source(&mut rng);
        let result = catch_unwind(AssertUnwindSafe(|| parse_term(&input).map(|_| ())));
        assert!(result.is_ok(), "parser panicked on input: {:?}", input);
    }
}
