//! WordprocessingML 段落处理
//!
//! 只处理 `word/document.xml` 中的 `<w:p>` 段落：读取文本、整体改写文本、设置两端对齐

use std::ops::Range;

use regex::Regex;
use thiserror::Error;

const JUSTIFY: &str = r#"<w:jc w:val="both"/>"#;

/// 段落处理错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WordXmlError {
    /// `<w:p>` 与 `</w:p>` 不配对
    #[error("段落标签不配对 (位置 {offset})")]
    Unbalanced { offset: usize },
    /// 文本含有 XML 1.0 不允许的字符
    #[error("文本含有 XML 不允许的字符 U+{code:04X}")]
    ForbiddenChar { code: u32 },
}

/// 一个非空的 `<w:p>` 元素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    /// 开始标签，含属性
    pub open_tag: String,
    /// 开始与结束标签之间的内容
    pub inner: String,
}

/// 顶层段落在文档中的位置
enum Span {
    /// `<w:p/>`
    Empty(Range<usize>),
    Element {
        open: Range<usize>,
        inner: Range<usize>,
        end: usize,
        /// 内部还有段落（文本框等）
        nested: bool,
    },
}

impl Span {
    fn range(&self) -> Range<usize> {
        match self {
            Span::Empty(range) => range.clone(),
            Span::Element { open, end, .. } => open.start..*end,
        }
    }
}

/// 段落解析器，预编译所需的正则
pub struct WordXml {
    paragraph_tag: Regex,
    text_item: Regex,
    properties: Regex,
    run_properties: Regex,
    alignment: Regex,
    after_alignment: Regex,
}

impl WordXml {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            paragraph_tag: Regex::new(r"<w:p(?:\s[^>]*)?/>|<w:p(?:\s[^>]*)?>|</w:p>")?,
            text_item: Regex::new(
                r"(?s)<w:t(?:\s[^>]*)?/>|<w:t(?:\s[^>]*)?>(.*?)</w:t>|<w:tab/>|<w:br(?:\s[^>]*)?/>|<w:cr/>",
            )?,
            properties: Regex::new(r"(?s)<w:pPr/>|<w:pPr>.*?</w:pPr>")?,
            run_properties: Regex::new(r"(?s)<w:r(?:\s[^>]*)?>\s*(<w:rPr>.*?</w:rPr>)")?,
            alignment: Regex::new(r"<w:jc\s[^>]*/>")?,
            after_alignment: Regex::new(
                r"<w:(?:textDirection|textAlignment|textboxTightWrap|outlineLvl|divId|cnfStyle|rPr|sectPr|pPrChange)[\s/>]",
            )?,
        })
    }

    /// 按嵌套深度找出顶层段落
    fn scan(&self, xml: &str) -> Result<Vec<Span>, WordXmlError> {
        let mut spans = Vec::new();
        let mut depth = 0usize;
        let mut open: Option<Range<usize>> = None;
        let mut nested = false;

        for tag in self.paragraph_tag.find_iter(xml) {
            let text = tag.as_str();
            if text.starts_with("</") {
                depth = depth
                    .checked_sub(1)
                    .ok_or(WordXmlError::Unbalanced { offset: tag.start() })?;
                if depth == 0 {
                    if let Some(open) = open.take() {
                        spans.push(Span::Element {
                            inner: open.end..tag.start(),
                            open,
                            end: tag.end(),
                            nested,
                        });
                    }
                }
            } else if text.ends_with("/>") {
                if depth == 0 {
                    spans.push(Span::Empty(tag.range()));
                } else {
                    nested = true;
                }
            } else {
                if depth == 0 {
                    open = Some(tag.range());
                    nested = false;
                } else {
                    nested = true;
                }
                depth += 1;
            }
        }

        if depth != 0 {
            return Err(WordXmlError::Unbalanced { offset: xml.len() });
        }
        Ok(spans)
    }

    /// 逐个段落改写文档
    ///
    /// 自闭合的空段落和含有内嵌段落（文本框）的段落原样保留，不交给 `edit`
    pub fn rewrite_paragraphs<F>(&self, xml: &str, mut edit: F) -> Result<String, WordXmlError>
    where
        F: FnMut(&mut Paragraph) -> Result<(), WordXmlError>,
    {
        let mut out = String::with_capacity(xml.len());
        let mut last = 0;

        for span in self.scan(xml)? {
            let Span::Element {
                open,
                inner,
                end,
                nested: false,
            } = span
            else {
                continue;
            };
            let mut para = Paragraph {
                open_tag: xml[open.clone()].to_string(),
                inner: xml[inner].to_string(),
            };
            edit(&mut para)?;

            out.push_str(&xml[last..open.start]);
            out.push_str(&para.open_tag);
            out.push_str(&para.inner);
            out.push_str("</w:p>");
            last = end;
        }

        out.push_str(&xml[last..]);
        Ok(out)
    }

    /// 文档中每个顶层段落的文本，自闭合段落为空字符串
    ///
    /// 文本框中的段落不计入外层段落的文本
    pub fn paragraph_texts(&self, xml: &str) -> Result<Vec<String>, WordXmlError> {
        self.scan(xml)?
            .into_iter()
            .map(|span| match span {
                Span::Empty(_) => Ok(String::new()),
                Span::Element {
                    inner,
                    nested: false,
                    ..
                } => Ok(self.text(&xml[inner])),
                Span::Element { inner, .. } => self.own_text(&xml[inner]),
            })
            .collect()
    }

    /// 去掉内嵌段落后的文本
    fn own_text(&self, inner: &str) -> Result<String, WordXmlError> {
        let mut own = String::with_capacity(inner.len());
        let mut last = 0;
        for span in self.scan(inner)? {
            let range = span.range();
            own.push_str(&inner[last..range.start]);
            last = range.end;
        }
        own.push_str(&inner[last..]);
        Ok(self.text(&own))
    }

    /// 段落文本：拼接所有 `<w:t>`，制表符为 `\t`，换行为 `\n`
    pub fn text(&self, inner: &str) -> String {
        let mut text = String::new();
        for caps in self.text_item.captures_iter(inner) {
            let item = &caps[0];
            if item.starts_with("<w:tab") {
                text.push('\t');
            } else if item.starts_with("<w:br") || item.starts_with("<w:cr") {
                text.push('\n');
            } else if let Some(content) = caps.get(1) {
                text.push_str(&unescape_xml(content.as_str()));
            }
        }
        text
    }

    /// 用单个文本运行替换段落内容
    ///
    /// 保留段落属性和第一个运行的格式，其余运行丢弃。
    /// 文本含有 XML 不允许的控制字符时不做修改并返回错误
    pub fn set_text(&self, para: &mut Paragraph, text: &str) -> Result<(), WordXmlError> {
        if let Some(c) = text.chars().find(|&c| !is_xml_char(c)) {
            return Err(WordXmlError::ForbiddenChar { code: c as u32 });
        }

        let (properties, runs) = match self.properties.find(&para.inner) {
            Some(m) => (m.as_str(), &para.inner[m.end()..]),
            None => ("", para.inner.as_str()),
        };
        let run_properties = self
            .run_properties
            .captures(runs)
            .and_then(|caps| caps.get(1))
            .map_or("", |m| m.as_str());

        para.inner = format!("{}{}", properties, build_run(run_properties, text));
        Ok(())
    }

    /// 设置段落两端对齐
    pub fn justify(&self, para: &mut Paragraph) {
        let Some(range) = self.properties.find(&para.inner).map(|m| m.range()) else {
            para.inner.insert_str(0, &format!("<w:pPr>{JUSTIFY}</w:pPr>"));
            return;
        };

        let properties = &para.inner[range.clone()];
        let updated = if properties == "<w:pPr/>" {
            format!("<w:pPr>{JUSTIFY}</w:pPr>")
        } else if self.alignment.is_match(properties) {
            self.alignment.replace(properties, JUSTIFY).into_owned()
        } else {
            // <w:jc> 必须位于这些元素之前
            let at = self
                .after_alignment
                .find(properties)
                .map_or(properties.len() - "</w:pPr>".len(), |m| m.start());
            format!("{}{}{}", &properties[..at], JUSTIFY, &properties[at..])
        };

        para.inner.replace_range(range, &updated);
    }
}

/// XML 1.0 允许的字符
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..)
}

fn build_run(run_properties: &str, text: &str) -> String {
    let mut run = String::from("<w:r>");
    run.push_str(run_properties);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            run.push_str("<w:br/>");
        }
        for (j, chunk) in line.split('\t').enumerate() {
            if j > 0 {
                run.push_str("<w:tab/>");
            }
            if !chunk.is_empty() {
                run.push_str(r#"<w:t xml:space="preserve">"#);
                run.push_str(&escape_xml(chunk));
                run.push_str("</w:t>");
            }
        }
    }
    run.push_str("</w:r>");
    run
}

/// 转义文本节点
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// 还原实体引用，无法识别的引用原样保留
pub fn unescape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail.find(';').and_then(|end| {
            let entity = &tail[1..end];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, end + 1))
        });
        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
