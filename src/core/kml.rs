//! KML rendering.

use crate::domain::model::{KmlDocument, Placemark};
use crate::utils::error::Result;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";
pub const GX_NAMESPACE: &str = "http://www.google.com/kml/ext/2.2";
pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Name of the KML entry inside a KMZ archive.
pub const KMZ_ENTRY: &str = "doc.kml";

fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_placemark<W: Write>(writer: &mut Writer<W>, placemark: &Placemark) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("Placemark")))?;
    write_text_element(writer, "name", &placemark.name)?;
    write_text_element(writer, "description", &placemark.description)?;
    writer.write_event(Event::Start(BytesStart::new("Point")))?;
    write_text_element(writer, "coordinates", &placemark.coordinates.to_string())?;
    writer.write_event(Event::End(BytesEnd::new("Point")))?;
    writer.write_event(Event::End(BytesEnd::new("Placemark")))?;
    Ok(())
}

/// Renders the document as tab-indented UTF-8 KML with an XML declaration.
pub fn render_kml(document: &KmlDocument) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("kml").with_attributes([("xmlns", KML_NAMESPACE)]),
    ))?;
    // Downstream viewers expect the extension namespaces on the folder.
    writer.write_event(Event::Start(BytesStart::new("Folder").with_attributes([
        ("xmlns:gx", GX_NAMESPACE),
        ("xmlns:atom", ATOM_NAMESPACE),
        ("xmlns", KML_NAMESPACE),
    ])))?;

    for placemark in &document.placemarks {
        write_placemark(&mut writer, placemark)?;
    }

    writer.write_event(Event::End(BytesEnd::new("Folder")))?;
    writer.write_event(Event::End(BytesEnd::new("kml")))?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

/// Wraps rendered KML into a KMZ archive.
pub fn pack_kmz(kml: &[u8]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    zip.start_file::<_, ()>(KMZ_ENTRY, FileOptions::default())?;
    zip.write_all(kml)?;
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Coordinates;
    use std::io::Read;

    fn placemark(name: &str, description: &str, lon: f64, lat: f64) -> Placemark {
        Placemark {
            name: name.to_string(),
            description: description.to_string(),
            coordinates: Coordinates { lon, lat },
        }
    }

    #[test]
    fn test_render_document_layout() {
        let mut doc = KmlDocument::default();
        doc.push(placemark("OH_T1", "Bridge", -85.5, 40.0));
        let text = String::from_utf8(render_kml(&doc).unwrap()).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("<kml xmlns=\"http://www.opengis.net/kml/2.2\">"));
        assert!(text.contains(
            "<Folder xmlns:gx=\"http://www.google.com/kml/ext/2.2\" xmlns:atom=\"http://www.w3.org/2005/Atom\" xmlns=\"http://www.opengis.net/kml/2.2\">"
        ));
        assert!(text.contains("\t\t<Placemark>"));
        assert!(text.contains("<name>OH_T1</name>"));
        assert!(text.contains("<description>Bridge</description>"));
        assert!(text.contains("<Point>"));
        assert!(text.contains("<coordinates>-85.5,40.0</coordinates>"));
        assert!(text.ends_with("</kml>\n"));
    }

    #[test]
    fn test_render_escapes_markup_and_keeps_order() {
        let mut doc = KmlDocument::default();
        doc.push(placemark("A_1_START", "Fish & <Game>", -80.0, 41.0));
        doc.push(placemark("A_1_STOP", "Fish & <Game>", -80.5, 41.5));
        let text = String::from_utf8(render_kml(&doc).unwrap()).unwrap();

        assert!(text.contains("Fish &amp; &lt;Game&gt;"));
        let start = text.find("A_1_START").unwrap();
        let stop = text.find("A_1_STOP").unwrap();
        assert!(start < stop);
    }

    #[test]
    fn test_empty_document_still_has_folder() {
        let text = String::from_utf8(render_kml(&KmlDocument::default()).unwrap()).unwrap();
        assert!(text.contains("<Folder"));
        assert!(!text.contains("<Placemark>"));
    }

    #[test]
    fn test_pack_kmz_contains_doc_kml() {
        let kml = render_kml(&KmlDocument::default()).unwrap();
        let kmz = pack_kmz(&kml).unwrap();

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(kmz)).unwrap();
        assert_eq!(archive.len(), 1);
        let mut entry = archive.by_name(KMZ_ENTRY).unwrap();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        assert_eq!(content, kml);
    }
}
