use specsync_core::article::bend::bend_template;
use specsync_core::article::builder::build_article_as;
use specsync_core::article::special::{
    connector_article, reducer_article, ConnectorLine, ReducerDirection,
};
use specsync_core::build_article;

#[test]
fn documented_examples_build_expected_codes() {
    let cases = [
        ("GE-KT2-", 200, 100, 1.2, "Сендзимір", None, "GE-KT2-20-A100-1,2-PG"),
        ("GE-KTK1-", 200, 100, 1.2, "Сендзимір", None, "GE-KTK1-20-1,2-PG"),
        ("GE-DK-", 200, 0, 1.2, "занурення", Some(45.0), "GE-DK45-20-1,2-HDG"),
        ("GE-D-", 300, 60, 1.5, "Сендзимір", Some(30.0), "GE-D-30-30-A60-1,5-PG"),
        ("GE-IB-", 200, 100, 2.0, "Алюміній", Some(90.0), "GE-IB90-20-A100-2,0-AL"),
        ("GE-OB-", 200, 100, 1.2, "Сендзимір", Some(30.0), "GE-OB-20-A100-1,2-PG"),
        ("GE-KT2-", 0, 0, 0.0, "", None, "GE-KT2-1-A100-1,0-PG"),
    ];

    for (base, width, height, thickness, coating, angle, expected) in cases {
        assert_eq!(
            build_article(base, width, height, thickness, coating, angle),
            expected,
            "base={base} angle={angle:?}"
        );
    }
}

#[test]
fn bend_archetypes_extend_to_full_codes() {
    let (prefix, kind) = bend_template("470_DKC_S5_Horizontal Bend Cover", Some(45.0)).unwrap();
    assert_eq!(
        build_article_as(kind, prefix, 300, 100, 1.2, "Сендзимір", None),
        "GE-DK45-30-1,2-PG"
    );

    let (prefix, kind) = bend_template("470_DKC_S5_Ext Vertical Bend", None).unwrap();
    assert_eq!(
        build_article_as(kind, prefix, 200, 60, 1.2, "Сендзимір", None),
        "GE-OB90-20-A60-1,2-PG"
    );
}

#[test]
fn special_rules_ignore_thickness_selection() {
    assert_eq!(
        reducer_article(100, 400, ReducerDirection::Left, "Сендзимір").unwrap(),
        "GE-KT2-RL-10-40-A100-2,0-PG"
    );
    assert_eq!(
        connector_article(ConnectorLine::Yde, 100, "Сендзимір").unwrap(),
        "GE-YDE-100-2,0-PG"
    );
}

#[test]
fn codes_are_well_formed_for_any_input() {
    let bases = ["GE-KT2-", "GE-DK", "GE-IBK-", "GE-OBK--", "GE-D-", "-GE-IB-", "x"];
    let coatings = ["", "Сендзимір", "занурення", "unknown"];
    for base in bases {
        for coating in coatings {
            for angle in [None, Some(0.0), Some(44.5), Some(90.0), Some(359.0)] {
                for thickness in [-1.0, 0.8, 1.25, 2.0] {
                    let code = build_article(base, 150, 75, thickness, coating, angle);
                    assert!(!code.is_empty());
                    assert!(!code.contains("--"), "{code}");
                    assert!(!code.starts_with('-'), "{code}");
                    assert!(!code.ends_with('-'), "{code}");
                }
            }
        }
    }
}
