// src/models/pdf.rs
use crate::store::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pdf {
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    // Data URL: "data:application/pdf;base64,...."
    #[serde(rename = "dados")]
    pub payload: String,
    #[serde(rename = "bloqueado", default)]
    pub locked: bool,
    #[serde(rename = "uploadedBy")]
    pub uploaded_by: String,
    #[serde(rename = "uploadedAt")]
    pub uploaded_at: DateTime<Utc>,
    #[serde(rename = "deletedAt", default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(rename = "deletedBy", default, skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
}

impl Entity for Pdf {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Pdf {
    /// Parte base64 do payload, sem o prefixo da data URL.
    pub fn base64_body(&self) -> &str {
        match self.payload.split_once(";base64,") {
            Some((_, body)) => body,
            None => &self.payload,
        }
    }

    pub fn size_hint(&self) -> usize {
        self.base64_body().len() / 4 * 3
    }
}

/// Listagem sem o conteúdo do ficheiro.
#[derive(Debug, Clone, Serialize)]
pub struct PdfSummary {
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "bloqueado")]
    pub locked: bool,
    #[serde(rename = "uploadedBy")]
    pub uploaded_by: String,
    #[serde(rename = "uploadedAt")]
    pub uploaded_at: DateTime<Utc>,
    #[serde(rename = "tamanho")]
    pub size: usize,
    #[serde(rename = "deletedAt", skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<&Pdf> for PdfSummary {
    fn from(pdf: &Pdf) -> Self {
        Self {
            id: pdf.id.clone(),
            name: pdf.name.clone(),
            locked: pdf.locked,
            uploaded_by: pdf.uploaded_by.clone(),
            uploaded_at: pdf.uploaded_at,
            size: pdf.size_hint(),
            deleted_at: pdf.deleted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_body_strips_data_url_prefix() {
        let pdf = Pdf {
            id: "p".into(),
            name: "a.pdf".into(),
            payload: "data:application/pdf;base64,JVBERi0=".into(),
            locked: false,
            uploaded_by: "admin".into(),
            uploaded_at: Utc::now(),
            deleted_at: None,
            deleted_by: None,
        };
        assert_eq!(pdf.base64_body(), "JVBERi0=");
        let summary = serde_json::to_value(PdfSummary::from(&pdf)).unwrap();
        assert!(summary.get("dados").is_none());
    }
}
