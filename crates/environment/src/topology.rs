//! 토폴로지 템플릿 재작성 -- 플랫폼 테스트 호스트 구성 XSLT 문서 수정
//!
//! 루트 요소의 직계 자식인 `xsl:template` 중 `match` 속성이 고정 키와
//! 정확히 일치하는 요소의 텍스트 내용을 해당 값으로 덮어씁니다.
//! 같은 키에 일치하는 템플릿이 여러 개면 모두 덮어씁니다.
//!
//! 텍스트 내용은 시작 태그 뒤, 첫 번째 자식 노드 앞의 텍스트입니다.
//! 자식 요소와 주석은 그대로 유지됩니다.
//! 일치하는 템플릿이 하나도 없으면 파일을 다시 쓰지 않습니다.

use std::io::ErrorKind;
use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::{NsReader, Writer};
use tracing::{debug, info};

use crate::error::EnvironmentError;

/// XSLT 네임스페이스
pub const XSL_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Transform";

/// 호스트가 대상 호스트로 고정되는 인스턴스 역할
pub const INSTANCE_ROLES: [&str; 6] = [
    "store",
    "publisher",
    "keyManager",
    "gateway-mgt",
    "gateway-wrk",
    "backend-server",
];

/// 포트 유형별 고정 포트
pub const INSTANCE_PORTS: [(&str, &str); 4] = [
    ("http", "80"),
    ("https", "443"),
    ("nhttp", "8780"),
    ("nhttps", "8743"),
];

/// `match` 키와 덮어쓸 값의 목록
pub fn topology_values(host: &str) -> Vec<(String, String)> {
    let mut values = vec![("xs:coverage/text()".to_owned(), "true".to_owned())];
    values.extend(INSTANCE_ROLES.iter().map(|role| {
        (
            format!("xs:instance[@name='{role}']/xs:hosts/xs:host/text()"),
            host.to_owned(),
        )
    }));
    values.extend(INSTANCE_PORTS.iter().map(|(kind, port)| {
        (
            format!("xs:instance/xs:ports/xs:port[@type='{kind}']/text()"),
            (*port).to_owned(),
        )
    }));
    values
}

/// 템플릿 파일을 대상 호스트 기준으로 재작성합니다.
///
/// # Returns
/// 덮어쓴 템플릿 요소 수
pub async fn rewrite_topology(template: &Path, host: &str) -> Result<usize, EnvironmentError> {
    let path = template.display().to_string();

    let content = match tokio::fs::read_to_string(template).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(EnvironmentError::TemplateNotFound { path });
        }
        Err(e) => return Err(e.into()),
    };

    let values = topology_values(host);
    let (rewritten, count) = rewrite_document(&content, &values)
        .map_err(|reason| EnvironmentError::TemplateRewrite {
            path: path.clone(),
            reason,
        })?;

    if count == 0 {
        info!(path = %path, "no topology template matched; file left unchanged");
        return Ok(0);
    }

    tokio::fs::write(template, rewritten).await?;
    info!(path = %path, rewritten = count, "platform test host configuration completed");
    Ok(count)
}

/// 문서 문자열을 재작성합니다.
///
/// # Returns
/// (재작성된 문서, 덮어쓴 템플릿 요소 수). 실패 시 사유 문자열.
pub fn rewrite_document(
    content: &str,
    values: &[(String, String)],
) -> Result<(String, usize), String> {
    let mut reader = NsReader::from_str(content);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(content.len()));

    let mut depth = 0usize;
    let mut count = 0usize;
    // 덮어쓴 템플릿의 기존 선행 텍스트를 건너뛰는 중
    let mut skipping_text = false;

    loop {
        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|e| format!("malformed XML: {e}"))?;

        if skipping_text {
            if matches!(event, Event::Text(_) | Event::CData(_)) {
                continue;
            }
            skipping_text = false;
        }

        match event {
            Event::Start(start) => {
                let replacement = if depth == 1 {
                    matching_value(&ns, &start, values)?
                } else {
                    None
                };
                depth += 1;
                write(&mut writer, Event::Start(start))?;
                if let Some(value) = replacement {
                    write(&mut writer, Event::Text(BytesText::new(value)))?;
                    skipping_text = true;
                    count += 1;
                }
            }
            Event::Empty(start) => {
                let replacement = if depth == 1 {
                    matching_value(&ns, &start, values)?
                } else {
                    None
                };
                match replacement {
                    Some(value) => {
                        let end: BytesEnd<'static> = start.to_end().into_owned();
                        write(&mut writer, Event::Start(start))?;
                        write(&mut writer, Event::Text(BytesText::new(value)))?;
                        write(&mut writer, Event::End(end))?;
                        count += 1;
                    }
                    None => write(&mut writer, Event::Empty(start))?,
                }
            }
            Event::End(end) => {
                depth = depth.saturating_sub(1);
                write(&mut writer, Event::End(end))?;
            }
            Event::Eof => break,
            other => write(&mut writer, other)?,
        }
    }

    let output = String::from_utf8(writer.into_inner())
        .map_err(|e| format!("rewritten document is not UTF-8: {e}"))?;
    debug!(rewritten = count, "topology document processed");
    Ok((output, count))
}

/// 요소가 XSLT `template`이고 `match`가 키와 일치하면 값을 반환합니다.
fn matching_value<'v>(
    ns: &ResolveResult<'_>,
    start: &BytesStart<'_>,
    values: &'v [(String, String)],
) -> Result<Option<&'v str>, String> {
    let is_template = matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == XSL_NAMESPACE.as_bytes())
        && start.local_name().as_ref() == b"template";
    if !is_template {
        return Ok(None);
    }

    let Some(attr) = start
        .try_get_attribute("match")
        .map_err(|e| format!("invalid attribute: {e}"))?
    else {
        return Ok(None);
    };
    let key = attr
        .unescape_value()
        .map_err(|e| format!("invalid match attribute: {e}"))?;

    Ok(values
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.as_str()))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), String> {
    writer
        .write_event(event)
        .map_err(|e| format!("failed to write event: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
    <xsl:template match="xs:coverage/text()">false</xsl:template>
    <xsl:template match="xs:instance[@name='store']/xs:hosts/xs:host/text()">localhost</xsl:template>
    <xsl:template match="xs:instance/xs:ports/xs:port[@type='https']/text()">9443</xsl:template>
    <xsl:template match="@*|node()">
        <xsl:copy><xsl:apply-templates select="@*|node()"/></xsl:copy>
    </xsl:template>
</xsl:stylesheet>
"#;

    fn values() -> Vec<(String, String)> {
        topology_values("test.local")
    }

    #[test]
    fn value_table_covers_roles_and_ports() {
        let values = values();
        assert_eq!(values.len(), 1 + INSTANCE_ROLES.len() + INSTANCE_PORTS.len());
        assert!(values.contains(&(
            "xs:instance[@name='gateway-wrk']/xs:hosts/xs:host/text()".to_owned(),
            "test.local".to_owned()
        )));
        assert!(values.contains(&(
            "xs:instance/xs:ports/xs:port[@type='nhttps']/text()".to_owned(),
            "8743".to_owned()
        )));
    }

    #[test]
    fn coverage_becomes_true() {
        let (doc, count) = rewrite_document(TEMPLATE, &values()).unwrap();
        assert_eq!(count, 3);
        assert!(doc.contains(r#"<xsl:template match="xs:coverage/text()">true</xsl:template>"#));
        assert!(doc.contains(
            r#"<xsl:template match="xs:instance[@name='store']/xs:hosts/xs:host/text()">test.local</xsl:template>"#
        ));
        assert!(doc.contains(
            r#"<xsl:template match="xs:instance/xs:ports/xs:port[@type='https']/text()">443</xsl:template>"#
        ));
    }

    #[test]
    fn unmatched_templates_are_preserved() {
        let (doc, _) = rewrite_document(TEMPLATE, &values()).unwrap();
        assert!(doc.contains(r#"<xsl:template match="@*|node()">"#));
        assert!(doc.contains(r#"<xsl:apply-templates select="@*|node()"/>"#));
        assert!(doc.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    }

    #[test]
    fn document_without_matches_is_unchanged() {
        let doc = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="other">x</xsl:template>
</xsl:stylesheet>"#;
        let (out, count) = rewrite_document(doc, &values()).unwrap();
        assert_eq!(count, 0);
        assert_eq!(out, doc);
    }

    #[test]
    fn duplicate_matches_are_all_overwritten() {
        let doc = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="xs:coverage/text()">false</xsl:template>
  <xsl:template match="xs:coverage/text()">no</xsl:template>
</xsl:stylesheet>"#;
        let (out, count) = rewrite_document(doc, &values()).unwrap();
        assert_eq!(count, 2);
        assert_eq!(out.matches(">true</xsl:template>").count(), 2);
    }

    #[test]
    fn self_closing_template_gains_text() {
        let doc = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform"><xsl:template match="xs:coverage/text()"/></xsl:stylesheet>"#;
        let (out, count) = rewrite_document(doc, &values()).unwrap();
        assert_eq!(count, 1);
        assert!(out.contains(r#"<xsl:template match="xs:coverage/text()">true</xsl:template>"#));
    }

    #[test]
    fn nested_templates_are_not_touched() {
        let doc = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <wrapper><xsl:template match="xs:coverage/text()">false</xsl:template></wrapper>
</xsl:stylesheet>"#;
        let (_, count) = rewrite_document(doc, &values()).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn template_in_other_namespace_is_ignored() {
        let doc = r#"<root xmlns:xsl="urn:not-xslt">
  <xsl:template match="xs:coverage/text()">false</xsl:template>
</root>"#;
        let (_, count) = rewrite_document(doc, &values()).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn child_elements_follow_replaced_text() {
        let doc = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform"><xsl:template match="xs:coverage/text()">old<xsl:value-of select="."/></xsl:template></xsl:stylesheet>"#;
        let (out, _) = rewrite_document(doc, &values()).unwrap();
        assert!(out.contains(
            r#"<xsl:template match="xs:coverage/text()">true<xsl:value-of select="."/></xsl:template>"#
        ));
    }

    #[tokio::test]
    async fn rewrites_file_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("platform-test-host-config.xsl");
        std::fs::write(&path, TEMPLATE).unwrap();

        let count = rewrite_topology(&path, "test.local").await.unwrap();

        assert_eq!(count, 3);
        let doc = std::fs::read_to_string(&path).unwrap();
        assert!(doc.contains(">true</xsl:template>"));
        assert!(!doc.contains(">9443<"));
    }

    #[tokio::test]
    async fn missing_template_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = rewrite_topology(&dir.path().join("missing.xsl"), "test.local")
            .await
            .unwrap_err();
        assert!(matches!(err, EnvironmentError::TemplateNotFound { .. }));
    }
}
