//! Dedup registry tests: shared string budgets and style id idempotence.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use xlwrite::{
    BookContext, BorderStyle, CellValue, SharedStringBudget, SharedStrings, Style, Styles,
};

#[test]
fn same_string_yields_the_same_id_both_times() {
    let mut table = SharedStrings::new();
    let first = table.try_register("repeated").unwrap();
    let second = table.try_register("repeated").unwrap();
    assert_eq!(first, second);
}

#[test]
fn exhausted_count_budget_declines_while_force_register_keeps_counting() {
    let mut table = SharedStrings::with_budget(SharedStringBudget {
        max_count: 3,
        ..SharedStringBudget::default()
    });
    for i in 0..3 {
        assert_eq!(table.try_register(&format!("s{i}")), Some(i));
    }
    assert_eq!(table.try_register("overflow"), None);
    assert_eq!(table.try_register("another"), None);

    // Forced ids keep increasing strictly with no gaps.
    let a = table.force_register("overflow");
    let b = table.force_register("another");
    assert_eq!(a, 3);
    assert_eq!(b, 4);
    assert_eq!(table.len(), 5);

    let ids: Vec<usize> = table.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
}

#[test]
fn shared_string_xml_preserves_significant_whitespace() {
    let mut table = SharedStrings::new();
    table.try_register("  padded  ").unwrap();
    table.try_register("plain").unwrap();

    let mut out = Vec::new();
    table.write_xml(&mut out).unwrap();
    let xml = String::from_utf8(out).unwrap();
    assert!(xml.contains(r#"<t xml:space="preserve">  padded  </t>"#));
    assert!(xml.contains("<t>plain</t>"));
    assert!(xml.contains(r#"count="2""#));
}

#[test]
fn style_registration_is_idempotent_under_structural_equality() {
    let mut registry = Styles::new();
    let make = || Style {
        bold: true,
        border: Some(BorderStyle::Thin),
        num_fmt: Some("#,##0.00".to_string()),
        ..Style::default()
    };
    // Two separately constructed but equal values.
    let id = registry.register(make());
    assert_eq!(registry.register(make()), id);
    assert_eq!(registry.len(), 2); // default + one custom
    assert_ne!(id, 0);
}

#[test]
fn book_context_text_falls_back_to_inline_when_budget_is_spent() {
    let mut context = BookContext::with_string_budget(SharedStringBudget {
        max_count: 1,
        ..SharedStringBudget::default()
    });
    assert_eq!(context.text("kept"), CellValue::Shared(0));
    assert_eq!(
        context.text("spilled"),
        CellValue::Inline("spilled".to_string())
    );
    // Forced registration still goes through the table.
    assert_eq!(context.text_forced("spilled"), CellValue::Shared(1));
}
