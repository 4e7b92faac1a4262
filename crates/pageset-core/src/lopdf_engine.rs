//! lopdf-backed document engine
//!
//! Copies pages between documents by whitelist: each selected page is
//! extracted as a self-contained bundle (the page dictionary plus every
//! object transitively reachable from it), then spliced into the
//! destination with remapped object ids. Bundles are independent, so the
//! same source page can be appended any number of times and appended in
//! any order.

use crate::engine::DocumentEngine;
use crate::error::TransformError;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;

/// Production engine over `lopdf::Document`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfEngine;

/// A detached copy of one page: the page dictionary (parent link severed)
/// and its transitive object dependencies, still under source object ids.
pub struct PageBundle {
    root: ObjectId,
    objects: BTreeMap<ObjectId, Object>,
}

impl DocumentEngine for LopdfEngine {
    type Document = Document;
    type Page = PageBundle;

    fn load(&self, bytes: &[u8]) -> Result<Document, TransformError> {
        Document::load_mem(bytes).map_err(|e| TransformError::Load(e.to_string()))
    }

    fn page_count(&self, doc: &Document) -> u32 {
        doc.get_pages().len() as u32
    }

    fn create_empty(&self) -> Document {
        let mut doc = Document::with_version("1.7");

        let pages_id = doc.new_object_id();
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(0)),
            ("Kids", Object::Array(Vec::new())),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        doc
    }

    fn copy_pages(
        &self,
        source: &Document,
        indices: &[u32],
    ) -> Result<Vec<PageBundle>, TransformError> {
        // get_pages is keyed by 1-based page number, ascending
        let ordered: Vec<ObjectId> = source.get_pages().values().copied().collect();

        let mut bundles = Vec::with_capacity(indices.len());
        for &idx in indices {
            let page_id = ordered.get(idx as usize).copied().ok_or_else(|| {
                TransformError::Copy(format!(
                    "page index {} out of range (document has {} pages)",
                    idx,
                    ordered.len()
                ))
            })?;
            bundles.push(extract_bundle(source, page_id)?);
        }

        Ok(bundles)
    }

    fn append_page(&self, doc: &mut Document, page: PageBundle) -> Result<(), TransformError> {
        let offset = doc.max_id;

        let mut bundle_max = 0;
        for (id, mut object) in page.objects {
            bundle_max = bundle_max.max(id.0);
            remap_refs(&mut object, offset);
            doc.objects.insert((id.0 + offset, id.1), object);
        }
        doc.max_id = offset + bundle_max;

        let new_page_id = (page.root.0 + offset, page.root.1);
        let pages_id = pages_node_id(doc)?;

        // Reattach the copied page to the destination page tree
        match doc.objects.get_mut(&new_page_id) {
            Some(Object::Dictionary(page_dict)) => {
                page_dict.set("Parent", Object::Reference(pages_id));
            }
            _ => {
                return Err(TransformError::Copy(
                    "copied page root is not a dictionary".into(),
                ))
            }
        }

        let kid_count = match doc.objects.get_mut(&pages_id) {
            Some(Object::Dictionary(pages_dict)) => {
                let kids = match pages_dict.get_mut(b"Kids") {
                    Ok(Object::Array(kids)) => kids,
                    _ => {
                        return Err(TransformError::Copy(
                            "destination Pages node has no Kids array".into(),
                        ))
                    }
                };
                kids.push(Object::Reference(new_page_id));
                kids.len() as i64
            }
            _ => {
                return Err(TransformError::Copy(
                    "destination Pages node is not a dictionary".into(),
                ))
            }
        };

        if let Some(Object::Dictionary(pages_dict)) = doc.objects.get_mut(&pages_id) {
            pages_dict.set("Count", Object::Integer(kid_count));
        }

        Ok(())
    }

    fn serialize(&self, doc: &mut Document) -> Result<Vec<u8>, TransformError> {
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| TransformError::Serialize(e.to_string()))?;

        Ok(buffer)
    }

    fn file_extension(&self) -> &'static str {
        "pdf"
    }
}

/// Extract one page and everything reachable from it as a detached bundle.
fn extract_bundle(doc: &Document, page_id: ObjectId) -> Result<PageBundle, TransformError> {
    let page_obj = doc
        .objects
        .get(&page_id)
        .ok_or_else(|| TransformError::Copy(format!("page object {:?} missing", page_id)))?;

    let mut page_dict = page_obj
        .as_dict()
        .map_err(|_| TransformError::Copy(format!("page object {:?} is not a dictionary", page_id)))?
        .clone();

    // Sever the uplink into the source page tree; the destination sets its
    // own Parent on append.
    page_dict.remove(b"Parent");

    let root_obj = Object::Dictionary(page_dict);
    let mut pending = Vec::new();
    collect_refs(&root_obj, &mut pending);

    let mut objects = BTreeMap::new();
    objects.insert(page_id, root_obj);

    while let Some(id) = pending.pop() {
        if objects.contains_key(&id) {
            continue;
        }
        // Dangling references occur in real files; the reference stays and
        // simply resolves to nothing in the output, same as in the source.
        let Some(object) = doc.objects.get(&id) else {
            continue;
        };
        objects.insert(id, object.clone());
        collect_refs(object, &mut pending);
    }

    Ok(PageBundle {
        root: page_id,
        objects,
    })
}

/// Collect every object id referenced by `obj`.
fn collect_refs(obj: &Object, out: &mut Vec<ObjectId>) {
    match obj {
        Object::Reference(id) => out.push(*id),
        Object::Array(items) => {
            for item in items {
                collect_refs(item, out);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter() {
                collect_refs(value, out);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter() {
                collect_refs(value, out);
            }
        }
        _ => {}
    }
}

/// Shift every reference in `obj` by `offset`, in place.
fn remap_refs(obj: &mut Object, offset: u32) {
    match obj {
        Object::Reference(id) => id.0 += offset,
        Object::Array(items) => {
            for item in items {
                remap_refs(item, offset);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                remap_refs(value, offset);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                remap_refs(value, offset);
            }
        }
        _ => {}
    }
}

/// Resolve trailer Root -> catalog -> Pages.
fn pages_node_id(doc: &Document) -> Result<ObjectId, TransformError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(|root| root.as_reference())
        .map_err(|_| TransformError::Copy("document trailer has no Root reference".into()))?;

    let catalog = doc
        .objects
        .get(&catalog_id)
        .ok_or_else(|| TransformError::Copy("catalog object missing".into()))?
        .as_dict()
        .map_err(|_| TransformError::Copy("catalog is not a dictionary".into()))?;

    catalog
        .get(b"Pages")
        .and_then(|pages| pages.as_reference())
        .map_err(|_| TransformError::Copy("catalog has no Pages reference".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{content::Content, content::Operation, Stream};

    /// Build an in-memory PDF with `num_pages` pages, each carrying a
    /// recognizable content stream ("Sheet 1", "Sheet 2", ...).
    fn build_test_pdf(num_pages: u32) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::new();
        for i in 0..num_pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new(
                        "Tf",
                        vec![Object::Name(b"F1".to_vec()), Object::Integer(11)],
                    ),
                    Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(
                            format!("Sheet {}", i + 1).into_bytes(),
                            lopdf::StringFormat::Literal,
                        )],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

            let page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(595),
                        Object::Integer(842),
                    ]),
                ),
                ("Contents", Object::Reference(content_id)),
            ]);
            kids.push(Object::Reference(doc.add_object(page)));
        }

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(num_pages as i64)),
            ("Kids", Object::Array(kids)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    /// Decompressed content of the Nth page (1-based) of a serialized PDF.
    fn page_content(bytes: &[u8], page_num: u32) -> Vec<u8> {
        let doc = Document::load_mem(bytes).unwrap();
        let page_id = *doc.get_pages().get(&page_num).unwrap();
        doc.get_page_content(page_id).unwrap()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_load_and_page_count() {
        let engine = LopdfEngine;
        let doc = engine.load(&build_test_pdf(4)).unwrap();
        assert_eq!(engine.page_count(&doc), 4);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let engine = LopdfEngine;
        let result = engine.load(b"definitely not a pdf");
        assert!(matches!(result, Err(TransformError::Load(_))));
    }

    #[test]
    fn test_create_empty_has_no_pages() {
        let engine = LopdfEngine;
        let doc = engine.create_empty();
        assert_eq!(engine.page_count(&doc), 0);
    }

    #[test]
    fn test_copy_pages_out_of_range_fails() {
        let engine = LopdfEngine;
        let doc = engine.load(&build_test_pdf(3)).unwrap();
        let result = engine.copy_pages(&doc, &[3]);
        assert!(matches!(result, Err(TransformError::Copy(_))));
    }

    #[test]
    fn test_copy_and_append_single_page() {
        let engine = LopdfEngine;
        let source = engine.load(&build_test_pdf(5)).unwrap();

        let mut out = engine.create_empty();
        for page in engine.copy_pages(&source, &[2]).unwrap() {
            engine.append_page(&mut out, page).unwrap();
        }
        let bytes = engine.serialize(&mut out).unwrap();

        assert!(bytes.starts_with(b"%PDF-"));
        let reloaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), 1);
        assert!(contains(&page_content(&bytes, 1), b"Sheet 3"));
    }

    #[test]
    fn test_append_preserves_selection_order() {
        let engine = LopdfEngine;
        let source = engine.load(&build_test_pdf(5)).unwrap();

        let mut out = engine.create_empty();
        for page in engine.copy_pages(&source, &[4, 0, 2]).unwrap() {
            engine.append_page(&mut out, page).unwrap();
        }
        let bytes = engine.serialize(&mut out).unwrap();

        assert!(contains(&page_content(&bytes, 1), b"Sheet 5"));
        assert!(contains(&page_content(&bytes, 2), b"Sheet 1"));
        assert!(contains(&page_content(&bytes, 3), b"Sheet 3"));
    }

    #[test]
    fn test_duplicate_indices_yield_independent_pages() {
        let engine = LopdfEngine;
        let source = engine.load(&build_test_pdf(2)).unwrap();

        let mut out = engine.create_empty();
        for page in engine.copy_pages(&source, &[1, 1, 1]).unwrap() {
            engine.append_page(&mut out, page).unwrap();
        }
        let bytes = engine.serialize(&mut out).unwrap();

        let reloaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), 3);
        for page_num in 1..=3 {
            assert!(contains(&page_content(&bytes, page_num), b"Sheet 2"));
        }
    }

    #[test]
    fn test_source_document_is_untouched() {
        let engine = LopdfEngine;
        let source = engine.load(&build_test_pdf(3)).unwrap();

        let mut out = engine.create_empty();
        for page in engine.copy_pages(&source, &[0, 1, 2]).unwrap() {
            engine.append_page(&mut out, page).unwrap();
        }

        assert_eq!(engine.page_count(&source), 3);
    }

    #[test]
    fn test_repeat_runs_produce_equivalent_page_content() {
        let engine = LopdfEngine;
        let source = engine.load(&build_test_pdf(4)).unwrap();

        let run = || {
            let mut out = engine.create_empty();
            for page in engine.copy_pages(&source, &[3, 1]).unwrap() {
                engine.append_page(&mut out, page).unwrap();
            }
            engine.serialize(&mut out).unwrap()
        };

        let first = run();
        let second = run();
        assert_eq!(page_content(&first, 1), page_content(&second, 1));
        assert_eq!(page_content(&first, 2), page_content(&second, 2));
    }

    #[test]
    fn test_output_reloads_through_engine() {
        let engine = LopdfEngine;
        let source = engine.load(&build_test_pdf(4)).unwrap();

        let mut out = engine.create_empty();
        for page in engine.copy_pages(&source, &[1, 3]).unwrap() {
            engine.append_page(&mut out, page).unwrap();
        }
        let bytes = engine.serialize(&mut out).unwrap();

        let reloaded = engine.load(&bytes).unwrap();
        assert_eq!(engine.page_count(&reloaded), 2);
    }
}
