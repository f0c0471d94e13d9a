use std::sync::LazyLock;

use fardel_common::{EdgeType, Format, Item, ModuleId, RawDependency, StrOrBytes};
use fardel_error::BuildDiagnostic;
use memchr::{memchr, memmem};
use regex::Regex;
use string_wizard::MagicString;

use crate::{
  adapter::is_external_reference, source_text, EdgeResolver, ExtractedModule, FormatAdapter,
  ResolvedEdge,
};

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
    .expect("attribute pattern is valid")
});

/// HTML documents. References in tag attributes are edges; everything else is left as written.
pub struct MarkupAdapter;

struct Attribute<'s> {
  name: String,
  value: &'s str,
  /// Byte range of the value, without quotes.
  start: usize,
  end: usize,
}

struct Tag<'s> {
  name: String,
  attributes: Vec<Attribute<'s>>,
}

impl<'s> Tag<'s> {
  fn attribute(&self, name: &str) -> Option<&Attribute<'s>> {
    self.attributes.iter().find(|attribute| attribute.name == name)
  }

  /// The attribute holding a reference, with the edge it declares.
  fn reference(&self) -> Option<(&Attribute<'s>, EdgeType, Option<Format>)> {
    let (attribute, edge_type, format) = match self.name.as_str() {
      "script" => ("src", EdgeType::StaticImportExport, Some(Format::Script)),
      "link" => {
        let rel = self.attribute("rel")?.value.to_ascii_lowercase();
        let mut tokens = rel.split_ascii_whitespace();
        if tokens.clone().any(|token| token == "stylesheet") {
          ("href", EdgeType::StaticImportExport, Some(Format::Style))
        } else if tokens.clone().any(|token| token == "manifest") {
          ("href", EdgeType::WebManifest, Some(Format::WebManifest))
        } else if tokens.any(|token| matches!(token, "icon" | "apple-touch-icon")) {
          ("href", EdgeType::Fetch, None)
        } else {
          return None;
        }
      }
      "img" | "source" | "video" | "audio" => ("src", EdgeType::Fetch, None),
      _ => return None,
    };

    let attribute = self.attribute(attribute)?;
    (!is_external_reference(attribute.value)).then_some((attribute, edge_type, format))
  }
}

fn scan_tags(source: &str) -> Vec<Tag<'_>> {
  let bytes = source.as_bytes();
  let mut tags = vec![];
  let mut pointer = 0;

  while let Some(offset) = memchr(b'<', &bytes[pointer..]) {
    let start = pointer + offset;
    if bytes[start..].starts_with(b"<!--") {
      pointer = memmem::find(&bytes[start..], b"-->").map_or(bytes.len(), |end| start + end + 3);
      continue;
    }

    let name_end = bytes[start + 1..]
      .iter()
      .position(|byte| !byte.is_ascii_alphanumeric())
      .map_or(bytes.len(), |position| start + 1 + position);
    // Closing tags, doctypes and stray `<`.
    if name_end == start + 1 {
      pointer = start + 1;
      continue;
    }
    let Some(tag_end) = find_tag_end(bytes, name_end) else {
      break;
    };

    let name = source[start + 1..name_end].to_ascii_lowercase();
    let attributes = ATTRIBUTE
      .captures_iter(&source[name_end..tag_end])
      .filter_map(|captures| {
        let value = captures.get(2).or_else(|| captures.get(3)).or_else(|| captures.get(4))?;
        Some(Attribute {
          name: captures[1].to_ascii_lowercase(),
          value: &source[name_end + value.start()..name_end + value.end()],
          start: name_end + value.start(),
          end: name_end + value.end(),
        })
      })
      .collect();
    pointer = tag_end + 1;

    // Raw text elements may contain anything but their closing tag.
    if matches!(name.as_str(), "script" | "style") {
      let closing = if name == "script" { b"</script".as_slice() } else { b"</style".as_slice() };
      pointer = memmem::find(&bytes[pointer..], closing).map_or(bytes.len(), |end| pointer + end);
    }

    tags.push(Tag { name, attributes });
  }

  tags
}

/// Position of the `>` closing the tag that starts before `from`, skipping quoted values.
fn find_tag_end(bytes: &[u8], from: usize) -> Option<usize> {
  let mut quote = None;
  for (idx, byte) in bytes.iter().enumerate().skip(from) {
    match (quote, byte) {
      (None, b'"' | b'\'') => quote = Some(*byte),
      (Some(open), _) if open == *byte => quote = None,
      (None, b'>') => return Some(idx),
      _ => {}
    }
  }
  None
}

impl FormatAdapter for MarkupAdapter {
  fn name(&self) -> &'static str {
    "markup"
  }

  fn test(&self, item: &Item) -> bool {
    matches!(item.format, Format::Markup)
  }

  fn extract(
    &self,
    id: &ModuleId,
    source: &StrOrBytes,
  ) -> Result<ExtractedModule, BuildDiagnostic> {
    let text = source_text(id, source)?;
    let dependencies = scan_tags(text)
      .iter()
      .filter_map(Tag::reference)
      .map(|(attribute, edge_type, format)| {
        let mut dependency = RawDependency::new(attribute.value, edge_type);
        dependency.format = format;
        dependency
      })
      .collect();

    Ok(ExtractedModule { dependencies, ..ExtractedModule::default() })
  }

  fn rewrite(
    &self,
    _id: &ModuleId,
    source: &str,
    resolve: &EdgeResolver,
  ) -> Result<String, BuildDiagnostic> {
    let mut magic_string = MagicString::new(source);
    for tag in scan_tags(source) {
      let Some((attribute, edge_type, _)) = tag.reference() else {
        continue;
      };
      if let Some(ResolvedEdge::Path(path)) = resolve(attribute.value, edge_type) {
        if attribute.start < attribute.end {
          magic_string.update(attribute.start, attribute.end, path);
        }
      }
    }
    Ok(magic_string.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const PAGE: &str = r#"<!doctype html>
<html>
  <head>
    <!-- <script src="./commented.js"></script> -->
    <link rel="stylesheet" href="./style.css">
    <link rel="manifest" href='./site.webmanifest'>
    <link rel="shortcut icon" href=./favicon.ico>
    <link rel="preconnect" href="https://cdn.test">
    <script type="module" src="./main.ts"></script>
    <script>if (a < b) { document.write('<img src="./inline.png">'); }</script>
  </head>
  <body>
    <img alt="logo" src="./logo.png">
    <img src="data:image/png;base64,AAAA">
  </body>
</html>
"#;

  #[test]
  fn extracts_tag_references() {
    let source = StrOrBytes::Str(PAGE.into());
    let module = MarkupAdapter.extract(&ModuleId::from("/src/index.html"), &source).unwrap();
    let edges = module
      .dependencies
      .iter()
      .map(|dep| (dep.request.as_str(), dep.edge_type, dep.format))
      .collect::<Vec<_>>();
    assert_eq!(
      edges,
      [
        ("./style.css", EdgeType::StaticImportExport, Some(Format::Style)),
        ("./site.webmanifest", EdgeType::WebManifest, Some(Format::WebManifest)),
        ("./favicon.ico", EdgeType::Fetch, None),
        ("./main.ts", EdgeType::StaticImportExport, Some(Format::Script)),
        ("./logo.png", EdgeType::Fetch, None),
      ]
    );
  }

  #[test]
  fn rewrites_attribute_values() {
    let output = MarkupAdapter
      .rewrite(&ModuleId::from("/src/index.html"), PAGE, &|request, _| {
        Some(ResolvedEdge::Path(request.replace("./", "./deps/")))
      })
      .unwrap();
    assert!(output.contains(r#"<script type="module" src="./deps/main.ts"></script>"#));
    assert!(output.contains("href='./deps/site.webmanifest'"));
    assert!(output.contains("href=./deps/favicon.ico>"));
    assert!(output.contains(r#"<script src="./commented.js"></script>"#));
    assert!(output.contains(r#"'<img src="./inline.png">'"#));
  }
}
