use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::error::{Error, Result};

/// 要素の入れ子の上限
pub const MAX_DEPTH: usize = 1024;

/// 名前空間付きタグ名からローカル名を取り出す
///
/// `{uri}local` と `prefix:local` の両方に対応し、区切りがなければそのまま返す。
pub fn local_name(tag: &str) -> &str {
    let tag = match tag.rfind('}') {
        Some(pos) => &tag[pos + 1..],
        None => tag,
    };
    match tag.rfind(':') {
        Some(pos) => &tag[pos + 1..],
        None => tag,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// 名前空間に属する場合は `{uri}local` 形式
    pub tag: String,
    /// 直下のテキスト（子要素のテキストは含まない）
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn new(tag: String) -> Self {
        Self {
            tag,
            text: String::new(),
            children: Vec::new(),
        }
    }

    // CDATAとテキストが混在した場合も前後の空白を取り除く
    fn finish(mut self) -> Self {
        let trimmed = self.text.trim();
        if trimmed.len() != self.text.len() {
            self.text = trimmed.to_string();
        }
        self
    }

    pub fn local_name(&self) -> &str {
        local_name(&self.tag)
    }

    /// 自身を含む全要素を文書順（先行順）で辿る
    pub fn iter(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementTree {
    root: Element,
}

impl ElementTree {
    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn iter(&self) -> Descendants<'_> {
        self.root.iter()
    }
}

fn qualified_name(ns: &ResolveResult, start: &BytesStart) -> Result<String> {
    let local = std::str::from_utf8(start.local_name().into_inner())
        .map_err(|e| Error::parse(format!("tag name is not valid UTF-8: {}", e)))?;

    match ns {
        ResolveResult::Bound(Namespace(uri)) => {
            let uri = String::from_utf8_lossy(uri);
            Ok(format!("{{{}}}{}", uri, local))
        }
        ResolveResult::Unbound => Ok(local.to_string()),
        ResolveResult::Unknown(prefix) => Err(Error::parse(format!(
            "unbound namespace prefix '{}' on <{}>",
            String::from_utf8_lossy(prefix),
            local
        ))),
    }
}

/// XML文字列を要素ツリーに変換する
pub fn parse(xml: &str) -> Result<ElementTree> {
    tracing::debug!("Parsing XML record ({} bytes)", xml.len());

    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    // 開いている要素のスタック
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        match event {
            Event::Start(e) => {
                let tag = qualified_name(&ns, &e)?;
                if stack.is_empty() && root.is_some() {
                    return Err(Error::parse(format!("extra root element <{}>", tag)));
                }
                if stack.len() >= MAX_DEPTH {
                    return Err(Error::parse(format!(
                        "nesting too deep (more than {} levels)",
                        MAX_DEPTH
                    )));
                }
                stack.push(Element::new(tag));
            }
            Event::Empty(e) => {
                let element = Element::new(qualified_name(&ns, &e)?);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if root.is_none() => root = Some(element),
                    None => {
                        return Err(Error::parse(format!(
                            "extra root element <{}>",
                            element.tag
                        )))
                    }
                }
            }
            Event::End(_) => {
                // 終了タグの名前一致は quick-xml が検査する
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::parse("unexpected closing tag"))?
                    .finish();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&text),
                    None => {
                        return Err(Error::parse(format!(
                            "text outside of root element: {:?}",
                            text
                        )))
                    }
                }
            }
            Event::CData(e) => {
                let text = String::from_utf8(e.into_inner().into_owned())
                    .map_err(|e| Error::parse(format!("CDATA is not valid UTF-8: {}", e)))?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&text),
                    None => return Err(Error::parse("CDATA outside of root element")),
                }
            }
            Event::Eof => break,
            // コメント、宣言、処理命令、DOCTYPEは無視
            _ => (),
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::parse(format!("unclosed element <{}>", open.tag)));
    }

    let root = root.ok_or_else(|| Error::parse("document has no root element"))?;
    Ok(ElementTree { root })
}
