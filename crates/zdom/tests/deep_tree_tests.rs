use zdom::{from_str_with_config, Config, Document, NodeId};

/// A single chain `root > n > n > ...` with `depth` elements and text in the leaf
fn chain(depth: usize) -> zdom::Result<(Document, NodeId)> {
    let mut doc = Document::new();
    let root = doc.create_element("root")?;
    let mut cursor = root;
    for _ in 1..depth {
        cursor = doc.add_element(cursor, "n")?;
    }
    doc.set_data(cursor, "end")?;
    Ok((doc, root))
}

#[test]
fn test_render_deep_chain() -> Result<(), Box<dyn std::error::Error>> {
    let depth = 3_000;
    let (doc, root) = chain(depth)?;
    let xml = doc.to_xml(root)?;

    // declaration, one line per opening tag, one per closing tag but the leaf's
    assert_eq!(xml.lines().count(), 2 * depth);
    let leaf_indent = "    ".repeat(depth - 1);
    assert!(xml.contains(&format!("\n{leaf_indent}<n>end</n>\n")));
    assert!(xml.ends_with("    </n>\n</root>"));

    let reparsed = from_str_with_config(&xml, Config::unlimited())?;
    let again = reparsed.root().ok_or("missing root")?;
    assert_eq!(reparsed.to_xml(again)?, xml);
    Ok(())
}

#[test]
fn test_clone_and_text_of_deep_chain() -> Result<(), Box<dyn std::error::Error>> {
    let depth = 10_000;
    let (mut doc, root) = chain(depth)?;

    let copy = doc.clone_subtree(root)?;
    assert_eq!(doc.len(), 2 * depth);
    assert!(!doc.has_parent(copy));
    assert_eq!(doc.text_content(copy)?, "end");
    assert_eq!(doc.text_content(root)?, "end");

    let mut cursor = copy;
    for _ in 1..depth {
        let next = doc.child(cursor, 0)?;
        assert_eq!(doc.parent(next)?, cursor);
        assert_eq!(doc.position(next)?, 0);
        cursor = next;
    }
    assert_eq!(doc.data(cursor), Some("end"));

    doc.discard(copy)?;
    assert_eq!(doc.len(), depth);
    Ok(())
}

#[test]
fn test_parse_deep_input_without_limits() -> Result<(), Box<dyn std::error::Error>> {
    let depth = 3_000;
    let xml = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
    let doc = from_str_with_config(&xml, Config::unlimited())?;
    let root = doc.root().ok_or("missing root")?;

    assert_eq!(doc.len(), depth);
    assert!(doc.to_xml(root)?.ends_with("    <a />\n</a>"));
    Ok(())
}

#[cfg(feature = "serde")]
#[test]
fn test_serialize_depth_is_bounded() -> Result<(), Box<dyn std::error::Error>> {
    let (doc, root) = chain(10_000)?;
    let err = serde_json::to_string(&doc.subtree(root)).err();
    assert!(err.is_some_and(|e| e.to_string().contains("nests deeper than")));

    let (doc, root) = chain(zdom::MAX_SERIALIZE_DEPTH)?;
    let json = serde_json::to_string(&doc.subtree(root))?;
    assert!(json.contains("\"text\":\"end\""));
    Ok(())
}
