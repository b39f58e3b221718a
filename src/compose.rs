//! Compose-intent links built from the promotional templates.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::feed::roster::PROMO_TEMPLATES;

pub const INTENT_BASE: &str = "https://x.com/intent/tweet";

/// Characters a browser's `encodeURIComponent` leaves untouched.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn intent_url(text: &str) -> String {
    format!("{INTENT_BASE}?text={}", utf8_percent_encode(text, COMPONENT))
}

pub fn pick_template<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    PROMO_TEMPLATES
        .choose(rng)
        .copied()
        .unwrap_or(PROMO_TEMPLATES[0])
}

pub fn compose_intent_url<R: Rng + ?Sized>(rng: &mut R) -> String {
    intent_url(pick_template(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn text_is_component_encoded() {
        assert_eq!(intent_url("Hi @x #y"), "https://x.com/intent/tweet?text=Hi%20%40x%20%23y");
        assert_eq!(intent_url("it's (ok)!"), "https://x.com/intent/tweet?text=it's%20(ok)!");
        assert_eq!(intent_url("🚀"), "https://x.com/intent/tweet?text=%F0%9F%9A%80");
    }

    #[test]
    fn links_come_from_the_template_pool() {
        let mut rng = StdRng::seed_from_u64(12);
        let encoded: Vec<String> = PROMO_TEMPLATES.iter().map(|t| intent_url(t)).collect();
        for _ in 0..32 {
            let link = compose_intent_url(&mut rng);
            assert!(encoded.contains(&link));
            assert!(link.contains("%40monad_xyz"));
        }
    }
}
