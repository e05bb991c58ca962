//! Streaming RDF/XML reader.
//!
//! Covers the subset of the [RDF/XML grammar][grammar] that Cellar notices
//! actually use: node elements (`rdf:Description` and typed nodes), property
//! attributes, property elements pointing at resources, blank nodes or
//! literals, nested node elements, `rdf:parseType="Resource"`/`"Literal"` and
//! `rdf:li` container membership. Reification (`rdf:ID` on property
//! elements), `rdf:parseType="Collection"` and `xml:base` resolution are not
//! supported; relative IRIs are stored as written.
//!
//! [grammar]: https://www.w3.org/TR/rdf-syntax-grammar/

use crate::consts::{RDF, RDF_TYPE, XML};
use crate::error::{ErrorKind, Result};
use crate::graph::{Graph, Literal, Term};
use exn::ResultExt;
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use std::str;
use tracing::instrument;

const XML_LITERAL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral";

/// Parses an RDF/XML document into a [`Graph`], preserving document order.
///
/// # Errors
/// - [`ErrorKind::MalformedXml`] if the bytes are not well-formed UTF-8 XML,
///   including documents that end with elements still open.
/// - [`ErrorKind::InvalidRdf`] if the XML doesn't follow the RDF/XML grammar.
#[instrument(skip_all, fields(size = xml.as_ref().len()))]
pub fn parse(xml: impl AsRef<[u8]>) -> Result<Graph> {
    let xml = str::from_utf8(xml.as_ref()).or_raise(|| ErrorKind::MalformedXml)?;
    let mut reader = NsReader::from_str(xml);
    let mut parser = Parser::default();
    loop {
        match reader.read_event().or_raise(|| ErrorKind::MalformedXml)? {
            Event::Start(e) => parser.start(Element::resolve(&reader, &e)?)?,
            Event::Empty(e) => {
                parser.start(Element::resolve(&reader, &e)?)?;
                parser.end()?;
            },
            Event::End(_) => parser.end()?,
            Event::Text(t) => parser.text(&t.unescape().or_raise(|| ErrorKind::MalformedXml)?),
            Event::CData(c) => parser.text(str::from_utf8(&c).or_raise(|| ErrorKind::MalformedXml)?),
            Event::Eof if parser.stack.is_empty() => break,
            Event::Eof => exn::bail!(ErrorKind::MalformedXml),
            // Declarations, comments, processing instructions, doctypes.
            _ => {},
        }
    }
    tracing::debug!(triples = parser.graph.len(), "Parsed RDF/XML document");
    Ok(parser.graph)
}

/// An attribute with its namespace resolved.
struct Attribute {
    namespace: String,
    local: String,
    value: String,
}

/// An element start tag with its namespace (and its attributes' namespaces) resolved.
struct Element {
    namespace: String,
    local: String,
    attributes: Vec<Attribute>,
}
impl Element {
    fn resolve(reader: &NsReader<&[u8]>, start: &BytesStart<'_>) -> Result<Self> {
        let (namespace, local) = reader.resolve_element(start.name());
        let namespace = namespace_of(namespace)?.unwrap_or_default();
        let local = str::from_utf8(local.as_ref()).or_raise(|| ErrorKind::MalformedXml)?.to_string();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.or_raise(|| ErrorKind::MalformedXml)?;
            let key = attr.key.as_ref();
            if key == b"xmlns" || key.starts_with(b"xmlns:") {
                continue;
            }
            let (namespace, name) = reader.resolve_attribute(attr.key);
            // Unqualified attributes have no meaning in RDF/XML.
            let Some(namespace) = namespace_of(namespace)? else {
                continue;
            };
            attributes.push(Attribute {
                namespace,
                local: str::from_utf8(name.as_ref()).or_raise(|| ErrorKind::MalformedXml)?.to_string(),
                value: attr.unescape_value().or_raise(|| ErrorKind::MalformedXml)?.into_owned(),
            });
        }
        Ok(Self { namespace, local, attributes })
    }

    fn iri(&self) -> String {
        format!("{}{}", self.namespace, self.local)
    }

    fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace == namespace && self.local == local
    }

    fn attribute(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace == namespace && a.local == local)
            .map(|a| a.value.as_str())
    }

    /// Attributes that aren't RDF syntax or XML attributes: these are
    /// property attributes, each one a literal-valued triple.
    fn property_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|a| a.namespace != RDF && a.namespace != XML)
    }
}

fn namespace_of(result: ResolveResult<'_>) -> Result<Option<String>> {
    match result {
        ResolveResult::Bound(ns) => {
            Ok(Some(str::from_utf8(ns.as_ref()).or_raise(|| ErrorKind::MalformedXml)?.to_string()))
        },
        ResolveResult::Unbound => Ok(None),
        // The `xml` prefix is always bound, whether the reader knows it or not.
        ResolveResult::Unknown(prefix) if prefix == b"xml" => Ok(Some(XML.to_string())),
        ResolveResult::Unknown(_) => exn::bail!(ErrorKind::MalformedXml),
    }
}

enum Frame {
    /// Inside `rdf:RDF`, expecting node elements.
    Root { language: Option<String> },
    /// Inside a node element, expecting property elements.
    Node { subject: Term, language: Option<String>, li: u32 },
    /// Inside a property element, expecting text or a single node element.
    Property {
        subject: Term,
        predicate: String,
        language: Option<String>,
        datatype: Option<String>,
        text: String,
        object: Option<Term>,
    },
    /// Inside a `rdf:parseType="Literal"` property; `depth` counts nested markup.
    Literal { subject: Term, predicate: String, text: String, depth: usize },
}
impl Frame {
    fn language(&self) -> Option<&String> {
        match self {
            Self::Root { language } | Self::Node { language, .. } | Self::Property { language, .. } => {
                language.as_ref()
            },
            Self::Literal { .. } => None,
        }
    }
}

enum Expecting {
    Document,
    Node,
    Property,
    Markup,
}

#[derive(Default)]
struct Parser {
    graph: Graph,
    stack: Vec<Frame>,
    blank_nodes: u64,
}
impl Parser {
    fn start(&mut self, element: Element) -> Result<()> {
        let expecting = match self.stack.last() {
            None => Expecting::Document,
            Some(Frame::Root { .. } | Frame::Property { .. }) => Expecting::Node,
            Some(Frame::Node { .. }) => Expecting::Property,
            Some(Frame::Literal { .. }) => Expecting::Markup,
        };
        match expecting {
            Expecting::Document if element.is(RDF, "RDF") => {
                let language = self.language_for(&element);
                self.stack.push(Frame::Root { language });
            },
            Expecting::Document | Expecting::Node => self.node_element(element)?,
            Expecting::Property => self.property_element(element)?,
            Expecting::Markup => {
                if let Some(Frame::Literal { depth, .. }) = self.stack.last_mut() {
                    *depth += 1;
                }
            },
        }
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        let Some(frame) = self.stack.pop() else {
            exn::bail!(ErrorKind::InvalidRdf("unexpected closing tag".to_string()));
        };
        match frame {
            Frame::Property { subject, predicate, object: Some(object), .. } => {
                self.graph.insert(subject, predicate, object);
            },
            Frame::Property { subject, predicate, language, datatype, text, object: None } => {
                // A datatype takes precedence over any inherited language tag.
                let language = if datatype.is_some() { None } else { language };
                let literal = Term::Literal(Literal { value: text, language, datatype });
                self.graph.insert(subject, predicate, literal);
            },
            Frame::Literal { subject, predicate, text, depth: 0 } => {
                let datatype = Some(XML_LITERAL.to_string());
                let literal = Term::Literal(Literal { value: text, language: None, datatype });
                self.graph.insert(subject, predicate, literal);
            },
            Frame::Literal { subject, predicate, text, depth } => {
                self.stack.push(Frame::Literal { subject, predicate, text, depth: depth - 1 });
            },
            Frame::Root { .. } | Frame::Node { .. } => {},
        }
        Ok(())
    }

    fn text(&mut self, content: &str) {
        match self.stack.last_mut() {
            Some(Frame::Property { text, object: None, .. } | Frame::Literal { text, .. }) => text.push_str(content),
            // Whitespace between elements.
            _ => {},
        }
    }

    fn node_element(&mut self, element: Element) -> Result<()> {
        let language = self.language_for(&element);
        let subject = match (
            element.attribute(RDF, "about"),
            element.attribute(RDF, "ID"),
            element.attribute(RDF, "nodeID"),
        ) {
            (Some(about), None, None) => Term::iri(about),
            (None, Some(id), None) => Term::iri(format!("#{id}")),
            (None, None, Some(node_id)) => Term::blank(node_id),
            (None, None, None) => self.fresh_blank_node(),
            _ => exn::bail!(ErrorKind::InvalidRdf(format!(
                "node element <{}> has more than one of rdf:about, rdf:ID, rdf:nodeID",
                element.iri()
            ))),
        };

        if let Some(Frame::Property { object, predicate, .. }) = self.stack.last_mut() {
            if object.is_some() {
                exn::bail!(ErrorKind::InvalidRdf(format!("property <{predicate}> has more than one object")));
            }
            *object = Some(subject.clone());
        }

        if !element.is(RDF, "Description") {
            self.graph.insert(subject.clone(), RDF_TYPE, Term::iri(element.iri()));
        }
        if let Some(kind) = element.attribute(RDF, "type") {
            self.graph.insert(subject.clone(), RDF_TYPE, Term::iri(kind));
        }
        for attribute in element.property_attributes() {
            let literal = Literal { value: attribute.value.clone(), language: language.clone(), datatype: None };
            self.graph.insert(
                subject.clone(),
                format!("{}{}", attribute.namespace, attribute.local),
                Term::Literal(literal),
            );
        }

        self.stack.push(Frame::Node { subject, language, li: 0 });
        Ok(())
    }

    fn property_element(&mut self, element: Element) -> Result<()> {
        let language = self.language_for(&element);
        let Some(Frame::Node { subject, li, .. }) = self.stack.last_mut() else {
            exn::bail!(ErrorKind::InvalidRdf("property element outside of a node element".to_string()));
        };
        let subject = subject.clone();
        let predicate = if element.is(RDF, "li") {
            *li += 1;
            format!("{RDF}_{li}")
        } else {
            element.iri()
        };

        match element.attribute(RDF, "parseType") {
            Some("Resource") => {
                let object = self.fresh_blank_node();
                self.graph.insert(subject, predicate, object.clone());
                self.stack.push(Frame::Node { subject: object, language, li: 0 });
                return Ok(());
            },
            // "Literal", and per the grammar any unknown parse type.
            Some(_) => {
                self.stack.push(Frame::Literal { subject, predicate, text: String::new(), depth: 0 });
                return Ok(());
            },
            None => {},
        }

        let mut object = match (element.attribute(RDF, "resource"), element.attribute(RDF, "nodeID")) {
            (Some(resource), None) => Some(Term::iri(resource)),
            (None, Some(node_id)) => Some(Term::blank(node_id)),
            (None, None) => None,
            (Some(_), Some(_)) => exn::bail!(ErrorKind::InvalidRdf(format!(
                "property <{predicate}> has both rdf:resource and rdf:nodeID"
            ))),
        };
        // Property attributes on a property element describe its (possibly anonymous) object.
        if element.property_attributes().next().is_some() {
            let target = object.take().unwrap_or_else(|| self.fresh_blank_node());
            for attribute in element.property_attributes() {
                let literal = Literal { value: attribute.value.clone(), language: language.clone(), datatype: None };
                self.graph.insert(
                    target.clone(),
                    format!("{}{}", attribute.namespace, attribute.local),
                    Term::Literal(literal),
                );
            }
            object = Some(target);
        }

        self.stack.push(Frame::Property {
            subject,
            predicate,
            language,
            datatype: element.attribute(RDF, "datatype").map(str::to_string),
            text: String::new(),
            object,
        });
        Ok(())
    }

    /// The `xml:lang` in scope for `element`: its own attribute if present
    /// (where an empty value clears it), otherwise inherited from the parent.
    fn language_for(&self, element: &Element) -> Option<String> {
        match element.attribute(XML, "lang") {
            Some("") => None,
            Some(lang) => Some(lang.to_string()),
            None => self.stack.last().and_then(Frame::language).cloned(),
        }
    }

    fn fresh_blank_node(&mut self) -> Term {
        self.blank_nodes += 1;
        Term::blank(format!("genid{}", self.blank_nodes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:ex="http://example.org/ns#"
         xmlns:owl="http://www.w3.org/2002/07/owl#">
  <!-- a comment -->
  <rdf:Description rdf:about="http://example.org/a" ex:short="inline">
    <owl:sameAs rdf:resource="http://example.org/b"/>
    <ex:title xml:lang="en">Hello &amp; welcome</ex:title>
    <ex:year rdf:datatype="http://www.w3.org/2001/XMLSchema#gYear">2020</ex:year>
    <ex:link rdf:nodeID="n1"/>
    <ex:nested>
      <ex:Thing rdf:about="http://example.org/c">
        <ex:name>Nested</ex:name>
      </ex:Thing>
    </ex:nested>
  </rdf:Description>
</rdf:RDF>"#;

    fn ex(local: &str) -> String {
        format!("http://example.org/ns#{local}")
    }

    #[test]
    fn test_resource_and_literal_properties() {
        let graph = parse(DOC).unwrap();
        let a = Term::iri("http://example.org/a");
        assert_eq!(
            graph.object(&a, "http://www.w3.org/2002/07/owl#sameAs"),
            Some(&Term::iri("http://example.org/b"))
        );
        assert_eq!(graph.object(&a, &ex("short")), Some(&Term::literal("inline")));
        assert_eq!(graph.object(&a, &ex("link")), Some(&Term::blank("n1")));
    }

    #[test]
    fn test_language_and_datatype() {
        let graph = parse(DOC).unwrap();
        let a = Term::iri("http://example.org/a");
        let Some(Term::Literal(title)) = graph.object(&a, &ex("title")) else {
            panic!("title should be a literal");
        };
        assert_eq!(title.value, "Hello & welcome");
        assert_eq!(title.language.as_deref(), Some("en"));
        let Some(Term::Literal(year)) = graph.object(&a, &ex("year")) else {
            panic!("year should be a literal");
        };
        assert_eq!(year.value, "2020");
        assert_eq!(year.datatype.as_deref(), Some("http://www.w3.org/2001/XMLSchema#gYear"));
    }

    #[test]
    fn test_nested_typed_node() {
        let graph = parse(DOC).unwrap();
        let a = Term::iri("http://example.org/a");
        let c = Term::iri("http://example.org/c");
        assert_eq!(graph.object(&a, &ex("nested")), Some(&c));
        assert_eq!(graph.object(&c, RDF_TYPE), Some(&Term::iri(ex("Thing"))));
        assert_eq!(graph.object(&c, &ex("name")), Some(&Term::literal("Nested")));
    }

    #[test]
    fn test_parse_type_resource_and_li() {
        let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.org/ns#">
  <rdf:Description rdf:about="urn:s">
    <ex:address rdf:parseType="Resource"><ex:city>Luxembourg</ex:city></ex:address>
    <ex:list><rdf:Bag><rdf:li>x</rdf:li><rdf:li>y</rdf:li></rdf:Bag></ex:list>
  </rdf:Description>
</rdf:RDF>"#;
        let graph = parse(doc).unwrap();
        let s = Term::iri("urn:s");
        let address = graph.object(&s, &ex("address")).unwrap();
        assert!(matches!(address, Term::Blank(_)));
        assert_eq!(graph.object(address, &ex("city")), Some(&Term::literal("Luxembourg")));
        let bag = graph.object(&s, &ex("list")).unwrap();
        assert_eq!(graph.object(bag, &format!("{RDF}_1")), Some(&Term::literal("x")));
        assert_eq!(graph.object(bag, &format!("{RDF}_2")), Some(&Term::literal("y")));
    }

    #[test]
    fn test_bare_node_element_without_rdf_root() {
        let doc = r#"<ex:Thing xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
            xmlns:ex="http://example.org/ns#" rdf:about="urn:x"><ex:p>v</ex:p></ex:Thing>"#;
        let graph = parse(doc).unwrap();
        assert_eq!(graph.object(&Term::iri("urn:x"), &ex("p")), Some(&Term::literal("v")));
    }

    #[test]
    fn test_inherited_language() {
        let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.org/ns#" xml:lang="fr">
  <rdf:Description rdf:about="urn:s"><ex:p>bonjour</ex:p><ex:q xml:lang="">plain</ex:q></rdf:Description>
</rdf:RDF>"#;
        let graph = parse(doc).unwrap();
        let s = Term::iri("urn:s");
        let Some(Term::Literal(p)) = graph.object(&s, &ex("p")) else { panic!("literal expected") };
        assert_eq!(p.language.as_deref(), Some("fr"));
        assert_eq!(graph.object(&s, &ex("q")), Some(&Term::literal("plain")));
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse("<rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\"><a></b></rdf:RDF>")
            .unwrap_err();
        assert_eq!(*err, ErrorKind::MalformedXml);
        let err = parse("<undeclared:thing/>").unwrap_err();
        assert_eq!(*err, ErrorKind::MalformedXml);
        let err = parse(b"\xff\xfe".as_slice()).unwrap_err();
        assert_eq!(*err, ErrorKind::MalformedXml);
    }

    #[test]
    fn test_truncated_document() {
        let cut = DOC.find("<ex:nested>").unwrap();
        let err = parse(&DOC[..cut]).unwrap_err();
        assert_eq!(*err, ErrorKind::MalformedXml);
        let err = parse(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.org/ns#">
  <rdf:Description rdf:about="urn:s"><ex:p>v</ex:p>"#,
        )
        .unwrap_err();
        assert_eq!(*err, ErrorKind::MalformedXml);
        // Cut inside a parseType="Literal" property.
        let err = parse(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.org/ns#">
  <rdf:Description rdf:about="urn:s"><ex:p rdf:parseType="Literal"><b>bold</b>"#,
        )
        .unwrap_err();
        assert_eq!(*err, ErrorKind::MalformedXml);
    }

    #[test]
    fn test_rdf_id_subject() {
        let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.org/ns#">
  <rdf:Description rdf:ID="local"><ex:p>v</ex:p></rdf:Description>
</rdf:RDF>"#;
        let graph = parse(doc).unwrap();
        assert_eq!(graph.object(&Term::iri("#local"), &ex("p")), Some(&Term::literal("v")));
    }

    #[test]
    fn test_parse_type_literal() {
        let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.org/ns#">
  <rdf:Description rdf:about="urn:s">
    <ex:body rdf:parseType="Literal"><b>bold</b> and <i>italic</i></ex:body>
    <ex:after>still parsed</ex:after>
  </rdf:Description>
</rdf:RDF>"#;
        let graph = parse(doc).unwrap();
        let s = Term::iri("urn:s");
        let Some(Term::Literal(body)) = graph.object(&s, &ex("body")) else {
            panic!("body should be a literal");
        };
        assert_eq!(body.value, "bold and italic");
        assert_eq!(body.datatype.as_deref(), Some(XML_LITERAL));
        assert_eq!(body.language, None);
        assert_eq!(graph.object(&s, &ex("after")), Some(&Term::literal("still parsed")));
    }

    #[test]
    fn test_property_attributes_on_property_element() {
        let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.org/ns#">
  <rdf:Description rdf:about="urn:s">
    <ex:author ex:name="Ann"/>
    <ex:editor rdf:resource="urn:bob" ex:name="Bob"/>
  </rdf:Description>
</rdf:RDF>"#;
        let graph = parse(doc).unwrap();
        let s = Term::iri("urn:s");
        let author = graph.object(&s, &ex("author")).unwrap();
        assert!(matches!(author, Term::Blank(_)));
        assert_eq!(graph.object(author, &ex("name")), Some(&Term::literal("Ann")));
        let editor = Term::iri("urn:bob");
        assert_eq!(graph.object(&s, &ex("editor")), Some(&editor));
        assert_eq!(graph.object(&editor, &ex("name")), Some(&Term::literal("Bob")));
    }

    #[test]
    fn test_conflicting_subject_attributes() {
        let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about="urn:a" rdf:nodeID="b"/>
</rdf:RDF>"#;
        let err = parse(doc).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidRdf(_)));
    }
}
