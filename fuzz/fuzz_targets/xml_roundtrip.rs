#![no_main]
use libfuzzer_sys::fuzz_target;
use zdom::{Document, NodeId};

fn has_data_children(doc: &Document, id: NodeId) -> bool {
    doc.children(id, None)
        .into_iter()
        .any(|child| doc.is_data(child) || has_data_children(doc, child))
}

// Trees without mixed content render to text that parses back to the same tree.
fuzz_target!(|data: &[u8]| {
    let Ok(doc) = zdom::from_bytes(data) else {
        return;
    };
    let Some(root) = doc.root() else {
        return;
    };
    if has_data_children(&doc, root) {
        return;
    }
    let Ok(first) = doc.to_xml(root) else {
        return;
    };

    let reparsed = match zdom::from_str(&first) {
        Ok(doc) => doc,
        Err(err) => panic!("rendered output failed to parse: {err}\n{first}"),
    };
    let second = reparsed.root().and_then(|again| reparsed.to_xml(again).ok());
    assert_eq!(second.as_deref(), Some(first.as_str()));
});
