//! 文档渲染服务 - 业务能力层
//!
//! 只负责"把替换表填进模板"能力，不关心模板从哪里来、结果存到哪里

use std::io::Cursor;

use regex::{Captures, Regex};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::{DocxPackage, WordXml, DOCUMENT_PART};
use crate::models::Substitutions;

/// 文档渲染器
///
/// 每个段落只扫描一遍：所有占位符合并成一个正则（长的在前），
/// 替换进去的文本不会再被当作占位符处理
pub struct DocumentRenderer {
    justify: bool,
}

impl DocumentRenderer {
    /// # 参数
    /// - `justify`: 替换后是否把非空段落设为两端对齐
    pub fn new(justify: bool) -> Self {
        Self { justify }
    }

    /// 渲染模板
    ///
    /// 模板本身不会被修改。返回的缓冲区位于起始位置。
    /// 任何打开、替换或序列化错误都是 `AppError::Render`
    pub fn render(&self, template: &DocxPackage, subs: &Substitutions) -> AppResult<Cursor<Vec<u8>>> {
        let xml = template.document_xml()?;
        let rendered = self.render_xml(&xml, subs)?;

        let mut output = template.clone();
        output.replace_part(DOCUMENT_PART, rendered.into_bytes());
        Ok(Cursor::new(output.to_bytes()?))
    }

    /// 对 `document.xml` 内容做替换和对齐
    pub fn render_xml(&self, xml: &str, subs: &Substitutions) -> AppResult<String> {
        let word = WordXml::new()?;
        let pattern = token_pattern(subs)?;
        let mut replaced = 0usize;

        let output = word
            .rewrite_paragraphs(xml, |para| {
                let mut text = word.text(&para.inner);

                if let Some(re) = &pattern {
                    if re.is_match(&text) {
                        let substituted = re
                            .replace_all(&text, |caps: &Captures| {
                                subs.value_for_token(&caps[0]).unwrap_or(&caps[0]).to_string()
                            })
                            .into_owned();
                        word.set_text(para, &substituted)?;
                        text = substituted;
                        replaced += 1;
                    }
                }

                if self.justify && !text.trim().is_empty() {
                    word.justify(para);
                }
                Ok(())
            })
            .map_err(AppError::render)?;

        debug!("替换了 {} 个段落中的占位符", replaced);
        Ok(output)
    }
}

impl Default for DocumentRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

/// 替换表中所有占位符组成的正则，长的在前
fn token_pattern(subs: &Substitutions) -> AppResult<Option<Regex>> {
    let mut tokens: Vec<&str> = subs.placeholders().map(|p| p.token()).collect();
    if tokens.is_empty() {
        return Ok(None);
    }
    tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    let alternation = tokens
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    Ok(Some(Regex::new(&alternation)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Placeholder;

    fn doc(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
        )
    }

    fn texts(xml: &str) -> Vec<String> {
        WordXml::new().unwrap().paragraph_texts(xml).unwrap()
    }

    #[test]
    fn replaces_tokens_in_paragraph() {
        let xml = doc("<w:p><w:r><w:t>Aluno: NOME_ALUNO, Mãe: NOME_MAE</w:t></w:r></w:p>");
        let subs = Substitutions::new()
            .with(Placeholder::StudentName, "Ana")
            .with(Placeholder::MotherName, "Maria");

        let out = DocumentRenderer::new(false).render_xml(&xml, &subs).unwrap();
        assert_eq!(texts(&out), vec!["Aluno: Ana, Mãe: Maria"]);
    }

    #[test]
    fn tokens_split_across_runs_are_found() {
        let xml = doc(
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>NOME_</w:t></w:r><w:r><w:t>ALUNO</w:t></w:r><w:r><w:t xml:space="preserve"> e NOME_ALUNO</w:t></w:r></w:p>"#,
        );
        let subs = Substitutions::new().with(Placeholder::StudentName, "Ana");

        let out = DocumentRenderer::new(false).render_xml(&xml, &subs).unwrap();
        assert_eq!(texts(&out), vec!["Ana e Ana"]);
        assert!(out.contains("<w:rPr><w:b/></w:rPr>"));
    }

    #[test]
    fn literal_text_is_unchanged() {
        let xml = doc(
            r#"<w:p><w:r><w:t>Relatório individual</w:t></w:r></w:p><w:p/><w:p><w:r><w:t xml:space="preserve">  </w:t></w:r></w:p>"#,
        );
        let subs = Substitutions::new().with(Placeholder::StudentName, "Ana");

        let out = DocumentRenderer::new(true).render_xml(&xml, &subs).unwrap();
        assert_eq!(texts(&out), texts(&xml));
        // 只有非空段落被两端对齐
        assert_eq!(out.matches(r#"<w:jc w:val="both"/>"#).count(), 1);

        let untouched = DocumentRenderer::new(false).render_xml(&xml, &subs).unwrap();
        assert_eq!(untouched, xml);
    }

    #[test]
    fn replacement_values_are_not_rescanned() {
        let xml = doc("<w:p><w:r><w:t>NOME_ALUNO / NOME_MAE</w:t></w:r></w:p>");
        let subs = Substitutions::new()
            .with(Placeholder::StudentName, "NOME_MAE")
            .with(Placeholder::MotherName, "Maria");

        let out = DocumentRenderer::new(false).render_xml(&xml, &subs).unwrap();
        assert_eq!(texts(&out), vec!["NOME_MAE / Maria"]);
    }

    #[test]
    fn tokens_without_values_stay_literal() {
        let xml = doc("<w:p><w:r><w:t>NOME_ESCOLA - NOME_ALUNO</w:t></w:r></w:p>");
        let subs = Substitutions::new().with(Placeholder::StudentName, "Ana & <Bia>");

        let out = DocumentRenderer::new(false).render_xml(&xml, &subs).unwrap();
        assert_eq!(texts(&out), vec!["NOME_ESCOLA - Ana & <Bia>"]);
        assert!(out.contains("Ana &amp; &lt;Bia&gt;"));
    }

    #[test]
    fn multiline_values_become_breaks() {
        let xml = doc("<w:p><w:r><w:t>PARECER_TEXTO</w:t></w:r></w:p>");
        let subs = Substitutions::new().with(Placeholder::EvaluationText, "Linha 1\nLinha 2");

        let out = DocumentRenderer::new(true).render_xml(&xml, &subs).unwrap();
        assert_eq!(texts(&out), vec!["Linha 1\nLinha 2"]);
        assert!(out.contains("<w:br/>"));
        assert!(out.contains(r#"<w:jc w:val="both"/>"#));
    }

    #[test]
    fn text_box_paragraphs_stay_well_formed() {
        let xml = doc(
            r#"<w:p><w:r><w:t>Cabeçalho</w:t></w:r><w:r><w:pict><v:shape><v:textbox><w:txbxContent><w:p><w:r><w:t>NOME_ALUNO</w:t></w:r></w:p></w:txbxContent></v:textbox></v:shape></w:pict></w:r></w:p><w:p><w:r><w:t>Aluno: NOME_ALUNO</w:t></w:r></w:p>"#,
        );
        let subs = Substitutions::new().with(Placeholder::StudentName, "Ana");

        let out = DocumentRenderer::new(true).render_xml(&xml, &subs).unwrap();
        assert_eq!(out.matches("<w:p>").count(), out.matches("</w:p>").count());
        assert_eq!(out.matches("<w:txbxContent>").count(), 1);
        assert_eq!(out.matches("</w:txbxContent>").count(), 1);
        assert!(out.contains("<w:t>Cabeçalho</w:t>"));
        assert_eq!(texts(&out), vec!["Cabeçalho", "Aluno: Ana"]);
    }

    #[test]
    fn control_characters_in_values_fail_the_render() {
        let xml = doc("<w:p><w:r><w:t>PARECER_TEXTO</w:t></w:r></w:p>");
        let subs = Substitutions::new().with(Placeholder::EvaluationText, "Linha\u{0c}fim\u{0b}x");

        let err = DocumentRenderer::new(false).render_xml(&xml, &subs).unwrap_err();
        assert!(matches!(err, AppError::Render { .. }));
    }

    #[test]
    fn unbalanced_document_fails_the_render() {
        let xml = doc("<w:p><w:r><w:t>NOME_ALUNO</w:t></w:r>");
        let subs = Substitutions::new().with(Placeholder::StudentName, "Ana");

        let err = DocumentRenderer::new(false).render_xml(&xml, &subs).unwrap_err();
        assert!(matches!(err, AppError::Render { .. }));
    }

    #[test]
    fn render_produces_docx_at_start() {
        let template = DocxPackage::from_parts([
            ("[Content_Types].xml", b"<Types/>".to_vec()),
            (
                DOCUMENT_PART,
                doc("<w:p><w:r><w:t>Turno: TURNO</w:t></w:r></w:p>").into_bytes(),
            ),
        ]);
        let subs = Substitutions::new().with(Placeholder::Shift, "Tarde");

        let cursor = DocumentRenderer::default().render(&template, &subs).unwrap();
        assert_eq!(cursor.position(), 0);

        let rendered = DocxPackage::from_bytes(cursor.get_ref()).unwrap();
        assert_eq!(rendered.paragraph_texts().unwrap(), vec!["Turno: Tarde"]);
        assert_eq!(rendered.part("[Content_Types].xml"), Some(&b"<Types/>"[..]));
        // 模板不变
        assert_eq!(template.paragraph_texts().unwrap(), vec!["Turno: TURNO"]);
    }
}
