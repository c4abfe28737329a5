//! Tests for parsing capability strings

use mccs_capabilities::{FeatureTree, MAX_DEPTH, MalformedCapabilityString, parse};

#[test]
fn bare_tokens_are_leaves() {
    let tree = parse("(A B C)").unwrap();

    let mut keys: Vec<&str> = tree.keys().collect();
    keys.sort();
    assert_eq!(keys, ["A", "B", "C"]);

    for key in ["A", "B", "C"] {
        assert!(tree.has(key));
        assert!(tree.get(key).is_none(), "{key} should be a leaf");
    }
    assert_eq!(tree.depth(), 1);
}

#[test]
fn keyed_groups_nest() {
    let tree = parse("(vcp(60(01 03 0F 11)))").unwrap();

    let modes = tree.path(&["vcp", "60"]).expect("vcp(60(...)) should exist");
    let mut keys: Vec<&str> = modes.keys().collect();
    keys.sort();

    assert_eq!(keys, ["01", "03", "0F", "11"]);
    assert_eq!(tree.depth(), 3);
}

#[test]
fn empty_group() {
    let tree = parse("()").unwrap();
    assert!(tree.is_empty());
    assert_eq!(tree.depth(), 1);
}

#[test]
fn repeated_whitespace_adds_no_empty_keys() {
    let tree = parse("(  A   B  )").unwrap();
    assert_eq!(tree.len(), 2);
    assert!(!tree.has(""));
}

#[test]
fn groups_without_separating_space() {
    let tree = parse("(prot(monitor)type(lcd)model(U2720Q)mccs_ver(2.1))").unwrap();

    assert_eq!(tree.len(), 4);
    assert!(tree.get("prot").unwrap().has("monitor"));
    assert!(tree.get("type").unwrap().has("lcd"));
    assert!(tree.get("model").unwrap().has("U2720Q"));
    assert!(tree.get("mccs_ver").unwrap().has("2.1"));
}

#[test]
fn real_capability_string() {
    let source = "(prot(monitor)type(LCD)model(DELL U2415)cmds(01 02 03 07 0C E3 F3)\
                  vcp(02 04 05 08 10 12 14(01 04 05 06 08 09 0B 0C) 16 18 1A 52 \
                  60(01 0F 11) AA(01 02) AC AE B2 B6 C6 C8 C9 D6(01 04 05) DC(00 02 03 05) \
                  DF E0 E1 E2(00 01 02 04 0E 12 14) F0(00 08) F1(01) F2 FD)mswhql(1)asset_eep(40)mccs_ver(2.1))";

    let tree = parse(source).unwrap();

    let vcp = tree.get("vcp").unwrap();
    assert!(vcp.has("10"));
    assert!(vcp.get("10").is_none());
    assert_eq!(vcp.get("60").unwrap().len(), 3);
    assert_eq!(vcp.get("14").unwrap().len(), 8);
    assert_eq!(tree.get("model").unwrap().len(), 2);
    assert_eq!(tree.depth(), 3);
}

#[test]
fn trailing_content_is_ignored() {
    let tree = parse("(A B) trailing (garbage").unwrap();
    assert_eq!(tree.len(), 2);
}

#[test]
fn leading_whitespace_is_skipped() {
    let tree = parse("  \r\n(A)").unwrap();
    assert!(tree.has("A"));
}

#[test]
fn unbalanced_is_malformed() {
    assert_eq!(
        parse("(A(B C"),
        Err(MalformedCapabilityString::Unterminated { depth: 2 })
    );
    assert_eq!(
        parse("(A B"),
        Err(MalformedCapabilityString::Unterminated { depth: 1 })
    );
}

fn nested(levels: usize) -> String {
    format!("({}{})", "a(".repeat(levels), ")".repeat(levels))
}

#[test]
fn nesting_up_to_the_limit() {
    let tree = parse(&nested(MAX_DEPTH - 1)).unwrap();
    assert_eq!(tree.depth(), MAX_DEPTH);
}

#[test]
fn nesting_past_the_limit_is_malformed() {
    // Every level adds two bytes, the group past the limit opens at byte 2 * MAX_DEPTH.
    let too_deep = Err(MalformedCapabilityString::TooDeep {
        position: 2 * MAX_DEPTH,
    });

    assert_eq!(parse(&nested(MAX_DEPTH)), too_deep);
    assert_eq!(parse(&nested(50_000)), too_deep);
    assert_eq!(parse(&format!("({}", "a(".repeat(50_000))), too_deep);
}

#[test]
fn missing_opening_parenthesis() {
    assert_eq!(
        parse("A B C)"),
        Err(MalformedCapabilityString::MissingOpeningParenthesis)
    );
    assert_eq!(
        parse(""),
        Err(MalformedCapabilityString::MissingOpeningParenthesis)
    );
}

#[test]
fn group_without_key() {
    assert_eq!(
        parse("(A (B))"),
        Err(MalformedCapabilityString::UnnamedGroup { position: 3 })
    );
    assert_eq!(
        parse("(A(B)(C))"),
        Err(MalformedCapabilityString::UnnamedGroup { position: 5 })
    );
}

#[test]
fn duplicate_keys_keep_first() {
    let tree = parse("(A(1) A(2))").unwrap();
    assert_eq!(tree.len(), 1);
    assert!(tree.get("A").unwrap().has("1"));
}

#[test]
fn structure_survives_reserialization() {
    let sources = [
        "(A B C)",
        "(vcp(60(01 03 0F 11)))",
        "(prot(monitor)  type(lcd) vcp(02 10 60(0F 11 12) D6(01 04)) mccs_ver(2.2))",
        "()",
    ];

    for source in sources {
        let tree = parse(source).unwrap();
        let serialized = tree.to_string();
        let reparsed = parse(&serialized).unwrap();

        assert_eq!(tree, reparsed, "{source} -> {serialized}");
        assert_eq!(tree.depth(), reparsed.depth());
    }
}

#[test]
fn serializes_sorted() {
    let mut tree = FeatureTree::new();
    let mut child = FeatureTree::new();
    child.insert("b", None);
    child.insert("a", None);
    tree.insert("z", None);
    tree.insert("x", Some(child));

    assert_eq!(tree.to_string(), "(x(a b) z)");
}
