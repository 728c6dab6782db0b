// tests/resolve_pipeline.rs
use std::sync::Arc;

use image::DynamicImage;
use ptr_claim::{
    claim::{ClaimRecord, CoordSource},
    error::MethodFailure,
    grid::Cell,
    methods::{
        CorrectionMethod, ImageMethod, ImageSource, Method, MethodSequence, MethodTag, OcrEngine, TitleMethod,
        UrlMethod,
    },
    methods::image::OcrText,
    resolve::{CorrectionPolicy, Resolver},
    tables::{Corrections, NameHints, ShiftRule, UrlHints},
};

const CLAIM_URL: &str = "https://www.tamriel-rebuilt.org/claims/interiors/firewatch-guild";

struct NoImages;
impl ImageSource for NoImages {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, MethodFailure> {
        Err(MethodFailure::Fetch { reference: reference.into(), reason: "offline".into() })
    }
}

struct Blind;
impl OcrEngine for Blind {
    fn recognize(&self, _: &DynamicImage) -> Result<OcrText, MethodFailure> {
        Ok(OcrText { text: String::new(), confidence: 0.0 })
    }
}

fn tables() -> (Arc<NameHints>, Arc<UrlHints>, Arc<Corrections>) {
    let names = NameHints::from_pairs([("Firewatch", (18, 7))]);
    let urls = UrlHints::from_pairs([(CLAIM_URL, (30, 3))]);
    let ito = ShiftRule { title_contains: "[ITO]".into(), min_x: Some(101), min_y: None, offset: (-100, 0) };
    let fixes = Corrections::new([("Mournhold Temple", (-1, -1))], vec![ito]);
    (Arc::new(names), Arc::new(urls), Arc::new(fixes))
}

fn resolver(seq: &str, policy: CorrectionPolicy) -> Resolver {
    let (names, urls, fixes) = tables();
    let seq: MethodSequence = seq.parse().unwrap();
    let methods: Vec<Box<dyn Method>> = seq
        .iter()
        .map(|tag| -> Box<dyn Method> {
            match tag {
                MethodTag::Image => Box::new(ImageMethod::new(Box::new(NoImages), Box::new(Blind))),
                MethodTag::Title => Box::new(TitleMethod::new(names.clone())),
                MethodTag::Url => Box::new(UrlMethod::new(urls.clone())),
                MethodTag::Correction => Box::new(CorrectionMethod::new(fixes.clone())),
            }
        })
        .collect();
    Resolver::new(methods, policy)
}

fn claim(id: &str, title: &str) -> ClaimRecord {
    let mut c = ClaimRecord::new(id, title);
    c.detail_url = Some(id.into());
    c
}

#[test]
fn bracketed_title_is_read() {
    let r = resolver("t", CorrectionPolicy::Override);
    let mut claims = vec![claim("a", "Claim [12,-5] interior"), claim("b", "Random claim name")];
    let report = r.resolve_all(&mut claims, None);

    assert_eq!(claims[0].coord, Some(Cell::new(12, -5)));
    assert_eq!(claims[0].coord_source, CoordSource::Title);
    assert_eq!(claims[1].coord, None);
    assert_eq!(claims[1].coord_source, CoordSource::Unresolved);
    assert_eq!(report.unresolved, vec!["b".to_string()]);
}

#[test]
fn first_method_in_sequence_wins() {
    let mut tu = vec![claim(CLAIM_URL, "Firewatch, Guild of Mages")];
    resolver("tu", CorrectionPolicy::Override).resolve_all(&mut tu, None);
    assert_eq!(tu[0].coord, Some(Cell::new(18, 7)));
    assert_eq!(tu[0].coord_source, CoordSource::Title);

    let mut ut = vec![claim(CLAIM_URL, "Firewatch, Guild of Mages")];
    resolver("ut", CorrectionPolicy::Override).resolve_all(&mut ut, None);
    assert_eq!(ut[0].coord, Some(Cell::new(30, 3)));
    assert_eq!(ut[0].coord_source, CoordSource::Url);
}

#[test]
fn corrections_override_whatever_came_before() {
    for seq in ["e", "et", "te", "tue", "eut", "itue"] {
        let mut c = claim("https://x.org/claims/temple", "Mournhold Temple [3,4]");
        c.set_scraped(Cell::new(50, 50));
        let mut claims = vec![c];
        let report = resolver(seq, CorrectionPolicy::Override).resolve_all(&mut claims, None);

        assert_eq!(claims[0].coord, Some(Cell::new(-1, -1)), "sequence {seq}");
        assert_eq!(claims[0].coord_source, CoordSource::Correction, "sequence {seq}");
        assert_eq!(report.corrected, 1);
    }
}

#[test]
fn fill_only_respects_located_claims() {
    let mut located = claim("https://x.org/claims/temple", "Mournhold Temple");
    located.set_scraped(Cell::new(50, 50));
    let mut claims = vec![located, claim("https://x.org/claims/temple2", "Mournhold Temple, Crypt")];

    resolver("e", CorrectionPolicy::FillOnly).resolve_all(&mut claims, None);
    assert_eq!(claims[0].coord, Some(Cell::new(50, 50)));
    assert_eq!(claims[0].coord_source, CoordSource::Scraped);
    assert_eq!(claims[1].coord, Some(Cell::new(-1, -1)));
}

#[test]
fn ito_shift_applies_to_the_found_cell() {
    let mut claims = vec![claim("https://x.org/claims/ito", "[ITO] Old Ebonheart [112,-3]")];
    resolver("te", CorrectionPolicy::Override).resolve_all(&mut claims, None);
    assert_eq!(claims[0].coord, Some(Cell::new(12, -3)));
    assert_eq!(claims[0].coord_source, CoordSource::Correction);
}

#[test]
fn permutations_only_report_their_own_sources() {
    let perms = ["tue", "teu", "ute", "uet", "etu", "eut", "iu", "ui", "t", ""];
    for seq in perms {
        let parsed: MethodSequence = seq.parse().unwrap();
        let mut claims = vec![
            claim(CLAIM_URL, "Firewatch, Guild of Mages"),
            claim("https://x.org/claims/b", "Shack [1,2]"),
            claim("https://x.org/claims/c", "Mournhold Temple"),
            claim("https://x.org/claims/d", "[ITO] Teyn [105, 0]"),
            claim("https://x.org/claims/e", "Nowhere in particular"),
        ];
        claims[4].set_scraped(Cell::new(9, 9));

        resolver(seq, CorrectionPolicy::Override).resolve_all(&mut claims, None);

        for c in &claims {
            let allowed = match c.coord_source {
                CoordSource::Scraped | CoordSource::Unresolved => true,
                src => parsed.iter().any(|t| t.source() == src),
            };
            assert!(allowed, "{seq}: {} ended as {}", c.id, c.coord_source);
            assert_eq!(c.coord.is_none(), c.coord_source == CoordSource::Unresolved);
        }
    }
}

#[test]
fn nothing_matches_means_unresolved() {
    let mut c = claim("https://x.org/claims/unknown", "Random claim name");
    c.image_ref = Some("https://x.org/img/missing.png".into());
    let mut claims = vec![c];

    let report = resolver("itue", CorrectionPolicy::Override).resolve_all(&mut claims, None);
    assert_eq!(claims[0].coord, None);
    assert_eq!(claims[0].coord_source, CoordSource::Unresolved);
    assert_eq!(report.failures, 1);
    assert_eq!(report.located(), 0);
}
