//! Codec selection from `Accept` and `Content-Type`.

use std::sync::Arc;

use actix_web::http::header::{Quality, QualityItem};
use actix_web::mime::{self, Mime};

use super::codec::{Codec, CodecRegistry, DEFAULT_CONTENT_TYPE};

/// Codec chosen for one request, with the media type to advertise.
#[derive(Debug, Clone)]
pub struct Negotiated {
    /// Media type written to the `Content-Type` response header.
    pub content_type: String,
    /// Codec used for the request body and the response body.
    pub codec: Arc<dyn Codec>,
}

impl CodecRegistry {
    /// Select the codec for a request.
    ///
    /// `Accept` is negotiated against the registered media types when
    /// present. Otherwise `Content-Type` is looked up exactly. Any selection
    /// without a registered codec resolves to the default media type.
    #[must_use]
    pub fn select(&self, accept: Option<&str>, content_type: Option<&str>) -> Negotiated {
        let chosen = match (accept, content_type) {
            (Some(accept), _) => negotiate_content_type(accept, self.content_types(), DEFAULT_CONTENT_TYPE),
            (None, Some(content_type)) => content_type.to_owned(),
            (None, None) => DEFAULT_CONTENT_TYPE.to_owned(),
        };
        match self.get(&chosen) {
            Some(codec) => Negotiated {
                content_type: chosen,
                codec,
            },
            None => Negotiated {
                content_type: DEFAULT_CONTENT_TYPE.to_owned(),
                codec: self.fallback(),
            },
        }
    }
}

/// Pick the best of `offers` for an `Accept` header.
///
/// Higher quality wins; at equal quality an exact match beats `type/*`, which
/// beats `*/*`. Ranges with `q=0` are ignored. `default` is returned when no
/// offer matches.
///
/// # Examples
/// ```
/// use jsonapi_server::inbound::http::negotiation::negotiate_content_type;
///
/// let offers = ["application/vnd.api+json", "text/html"];
/// let chosen = negotiate_content_type("text/*;q=0.5, */*;q=0.1", offers, "application/vnd.api+json");
/// assert_eq!(chosen, "text/html");
/// ```
pub fn negotiate_content_type<'a>(
    accept: &str,
    offers: impl IntoIterator<Item = &'a str>,
    default: &str,
) -> String {
    let ranges = parse_accept(accept);
    let mut best_offer = default;
    let mut best_quality = None;
    let mut best_wild = 3;
    for offer in offers {
        for range in &ranges {
            if range.quality == Quality::ZERO || best_quality.is_some_and(|best| range.quality < best) {
                continue;
            }
            let Some(wild) = wildness(&range.item, offer) else {
                continue;
            };
            if best_quality.is_none_or(|best| range.quality > best) || best_wild > wild {
                best_quality = Some(range.quality);
                best_wild = wild;
                best_offer = offer;
            }
        }
    }
    best_offer.to_owned()
}

/// How generically `range` matches `offer`: 0 exact, 1 `type/*`, 2 `*/*`.
fn wildness(range: &Mime, offer: &str) -> Option<u8> {
    if range.type_() == mime::STAR {
        return Some(2);
    }
    if range.subtype() == mime::STAR {
        let (kind, _) = offer.split_once('/')?;
        return kind.eq_ignore_ascii_case(range.type_().as_str()).then_some(1);
    }
    range.essence_str().eq_ignore_ascii_case(offer).then_some(0)
}

/// Media ranges of an `Accept` header; malformed ranges are dropped.
fn parse_accept(header: &str) -> Vec<QualityItem<Mime>> {
    header
        .split(',')
        .filter_map(|range| range.trim().parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::codec::JsonCodec;
    use rstest::{fixture, rstest};

    const OFFERS: [&str; 3] = ["application/vnd.api+json", "application/json", "text/html"];

    #[fixture]
    fn registry() -> CodecRegistry {
        let mut registry = CodecRegistry::new();
        registry.insert("application/json", JsonCodec);
        registry
    }

    #[rstest]
    #[case("application/json", "application/json")]
    #[case("text/html;q=0.9, application/json;q=0.8", "text/html")]
    #[case("application/*;q=0.5, text/html;q=0.5", "text/html")]
    #[case("*/*", "application/vnd.api+json")]
    #[case("image/png", "application/vnd.api+json")]
    #[case("application/json;q=0", "application/vnd.api+json")]
    #[case("*/*;q=0.1, text/*", "text/html")]
    #[case("", "application/vnd.api+json")]
    #[case("application/json;q=bogus", "application/vnd.api+json")]
    #[case("application/json;q=1.5", "application/vnd.api+json")]
    #[case("text/html;level=1;q=0.4, application/json;q=0.3", "text/html")]
    #[case("TEXT/HTML", "text/html")]
    fn negotiates_offers(#[case] accept: &str, #[case] expected: &str) {
        let chosen = negotiate_content_type(accept, OFFERS, DEFAULT_CONTENT_TYPE);
        assert_eq!(chosen, expected);
    }

    #[rstest]
    fn accept_takes_precedence(registry: CodecRegistry) {
        let negotiated = registry.select(Some("application/json"), Some("text/html"));
        assert_eq!(negotiated.content_type, "application/json");
    }

    #[rstest]
    #[case(Some("application/json"), "application/json")]
    #[case(Some("application/json; charset=utf-8"), DEFAULT_CONTENT_TYPE)]
    #[case(Some("text/xml"), DEFAULT_CONTENT_TYPE)]
    #[case(None, DEFAULT_CONTENT_TYPE)]
    fn content_type_is_matched_exactly(
        registry: CodecRegistry,
        #[case] content_type: Option<&str>,
        #[case] expected: &str,
    ) {
        let negotiated = registry.select(None, content_type);
        assert_eq!(negotiated.content_type, expected);
    }

    #[rstest]
    fn unregistered_negotiation_result_uses_default(registry: CodecRegistry) {
        let negotiated = registry.select(Some("text/html"), None);
        assert_eq!(negotiated.content_type, DEFAULT_CONTENT_TYPE);
    }
}
