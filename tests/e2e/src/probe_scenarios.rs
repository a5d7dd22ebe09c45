//! Host-facing probe behavior: `is_extractable` over arbitrary fragments.

use refract_engine::{ComponentExtractor, ExtractorOptions};

fn extractor() -> ComponentExtractor {
    ComponentExtractor::new(ExtractorOptions::default())
}

#[test]
fn every_valid_fragment_is_extractable() {
    let extractor = extractor();
    for fragment in [
        "<div>hello</div>",
        "<Widget a={1} b=\"two\" />",
        "<></>",
        "<ul>\n  <li>one</li>\n  <li>two</li>\n</ul>",
        "  <span>{value}</span>  ",
    ] {
        assert!(
            extractor.is_extractable(fragment),
            "expected extractable: {}",
            fragment
        );
    }
}

#[test]
fn non_jsx_text_is_not_extractable() {
    let extractor = extractor();
    for fragment in [
        "just text",
        "someIdentifier",
        "f(x) + 1",
        "<div",
        "<div>",
        "</div>",
        "{value}",
        "",
    ] {
        assert!(
            !extractor.is_extractable(fragment),
            "expected not extractable: {}",
            fragment
        );
    }
}

#[test]
fn dialect_changes_apply_to_later_probes() {
    let mut extractor = extractor();
    assert!(extractor.is_extractable("<div>x</div>"));

    // Without the jsx plugin, angle brackets are just operators.
    extractor.set_dialect_plugins(&[]);
    assert!(!extractor.is_extractable("<div>x</div>"));
}
