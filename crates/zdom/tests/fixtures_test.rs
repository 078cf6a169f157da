use std::fs;
use zdom::from_str;

#[test]
fn test_valid_fixtures() -> Result<(), Box<dyn std::error::Error>> {
    let valid_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/valid");
    for entry in fs::read_dir(valid_dir)? {
        let entry = entry?;
        let path = entry.path();
        let content = fs::read_to_string(&path)?;
        let result = from_str(&content);
        if let Err(err) = result {
            return Err(std::io::Error::other(format!(
                "Failed to parse valid file: {path:?}: {err}"
            ))
            .into());
        }
    }
    Ok(())
}

#[test]
fn test_invalid_fixtures() -> Result<(), Box<dyn std::error::Error>> {
    let invalid_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/invalid");
    for entry in fs::read_dir(invalid_dir)? {
        let entry = entry?;
        let path = entry.path();
        let content = fs::read_to_string(&path)?;
        match from_str(&content) {
            Ok(_) => {
                return Err(std::io::Error::other(format!(
                    "Should fail to parse invalid file: {path:?}"
                ))
                .into());
            }
            Err(err) if !err.is_parse() => {
                return Err(std::io::Error::other(format!(
                    "Expected a parse error for {path:?}, got {err}"
                ))
                .into());
            }
            Err(_) => {}
        }
    }
    Ok(())
}

#[test]
fn test_catalog_fixture_shape() -> Result<(), Box<dyn std::error::Error>> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/valid/catalog.xml");
    let doc = zdom::parse_file(path)?;
    let catalog = doc.root().ok_or("missing root")?;

    assert_eq!(doc.name(catalog), Some("catalog"));
    assert_eq!(doc.attribute(catalog, "version"), Some("2"));

    let products = doc.children(catalog, Some("product"));
    assert_eq!(products.len(), 2);

    let first = products[0];
    let attrs: Vec<_> = doc.attributes(first).collect();
    assert_eq!(attrs, vec![("id", "p1"), ("currency", "EUR")]);
    let name = doc.first(first, Some("name")).ok_or("missing name")?;
    assert_eq!(doc.data(name), Some("Widget & Co"));
    let tags = doc.first(first, Some("tags")).ok_or("missing tags")?;
    let tag_text: Vec<_> = doc
        .children(tags, Some("tag"))
        .into_iter()
        .filter_map(|tag| doc.data(tag))
        .collect();
    assert_eq!(tag_text, vec!["tools", "home"]);

    let second = products[1];
    let name = doc.child(second, 0)?;
    assert_eq!(doc.data(name), Some("<Gadget>"));
    let discontinued = doc.next(name, None).ok_or("missing sibling")?;
    assert_eq!(doc.name(discontinued), Some("discontinued"));
    assert!(!doc.has_data(discontinued));
    assert!(!doc.has_children(discontinued, None));
    Ok(())
}

#[test]
fn test_mixed_fixture_keeps_text_order() -> Result<(), Box<dyn std::error::Error>> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/valid/mixed.xml");
    let doc = zdom::parse_file(path)?;
    let p = doc.root().ok_or("missing root")?;

    let children = doc.children(p, None);
    assert_eq!(children.len(), 3);
    assert_eq!(doc.data(children[0]), Some("Hello "));
    assert_eq!(doc.data(children[1]), Some("bold"));
    assert_eq!(doc.data(children[2]), Some(" world \u{263A}"));
    assert_eq!(doc.text_content(p)?, "Hello bold world \u{263A}");
    Ok(())
}
